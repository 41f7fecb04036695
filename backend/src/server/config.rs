//! Server settings loaded via OrthoConfig and the derived server
//! configuration object.

use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use workshop::domain::{DEFAULT_BOARD_REFRESH, PASSWORD_HASH_COST, TransitionPolicy, UserId};
use workshop::outbound::persistence::DbPool;
use workshop::outbound::vision::VisionGatewayConfig;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_OCR_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_POOL_SIZE: u32 = 10;
/// Work factors bcrypt accepts.
const HASH_COST_RANGE: RangeInclusive<u32> = 4..=31;

/// Settings layered from defaults, a config file, `WORKSHOP_*` environment
/// variables and the command line.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "WORKSHOP")]
pub struct WorkshopSettings {
    /// Socket address to listen on.
    pub bind_address: Option<String>,
    /// PostgreSQL URL; without one the server runs on in-memory storage.
    pub database_url: Option<String>,
    pub database_pool_size: Option<u32>,
    /// Promotion secret used when `admin_settings` holds none.
    pub admin_password: Option<String>,
    /// Account allowed to call `hash-password`; it cannot be deleted,
    /// demoted or disabled by other admins.
    pub super_admin_id: Option<String>,
    /// Reject backwards workflow moves.
    #[ortho_config(default = true)]
    pub strict_transitions: bool,
    /// Seconds between periodic TV board refreshes.
    pub board_refresh_secs: Option<u64>,
    /// bcrypt cost for the `hash-password` function.
    pub password_hash_cost: Option<u32>,
    /// Base URL of the OpenAI-compatible vision gateway.
    pub ocr_base_url: Option<String>,
    pub ocr_api_key: Option<String>,
    pub ocr_model: Option<String>,
    pub ocr_timeout_secs: Option<u64>,
}

/// Raised when settings are present but unusable.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value}: {source}")]
    BindAddress {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid super admin id {value}")]
    SuperAdmin { value: String },
    #[error("invalid OCR gateway url {value}: {source}")]
    OcrUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("password hash cost {value} is outside bcrypt's range 4..=31")]
    HashCost { value: u32 },
    #[error("OCR gateway is configured without {missing}")]
    OcrIncomplete { missing: &'static str },
}

impl WorkshopSettings {
    /// Parsed listen address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_address.as_deref().unwrap_or(DEFAULT_BIND_ADDRESS);
        raw.parse().map_err(|source| SettingsError::BindAddress {
            value: raw.to_owned(),
            source,
        })
    }

    pub fn pool_size(&self) -> u32 {
        self.database_pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }

    /// Workshop behaviour derived from the settings.
    pub fn options(&self) -> Result<WorkshopOptions, SettingsError> {
        let super_admin = self
            .super_admin_id
            .as_deref()
            .map(|raw| {
                UserId::new(raw).map_err(|_| SettingsError::SuperAdmin {
                    value: raw.to_owned(),
                })
            })
            .transpose()?;
        let password_hash_cost = self.password_hash_cost.unwrap_or(PASSWORD_HASH_COST);
        if !HASH_COST_RANGE.contains(&password_hash_cost) {
            return Err(SettingsError::HashCost {
                value: password_hash_cost,
            });
        }
        Ok(WorkshopOptions {
            admin_password: self
                .admin_password
                .clone()
                .filter(|secret| !secret.is_empty())
                .map(Zeroizing::new),
            super_admin,
            transition_policy: if self.strict_transitions {
                TransitionPolicy::Strict
            } else {
                TransitionPolicy::Advisory
            },
            board_refresh: self
                .board_refresh_secs
                .filter(|secs| *secs > 0)
                .map_or(DEFAULT_BOARD_REFRESH, Duration::from_secs),
            password_hash_cost,
            vision: self.vision()?,
        })
    }

    fn vision(&self) -> Result<Option<VisionGatewayConfig>, SettingsError> {
        let Some(raw_url) = self.ocr_base_url.as_deref() else {
            return Ok(None);
        };
        let base_url = Url::parse(raw_url).map_err(|source| SettingsError::OcrUrl {
            value: raw_url.to_owned(),
            source,
        })?;
        let api_key = self
            .ocr_api_key
            .clone()
            .ok_or(SettingsError::OcrIncomplete { missing: "an API key" })?;
        let model = self
            .ocr_model
            .clone()
            .ok_or(SettingsError::OcrIncomplete { missing: "a model" })?;
        Ok(Some(VisionGatewayConfig {
            base_url,
            api_key: Zeroizing::new(api_key),
            model,
            timeout: self
                .ocr_timeout_secs
                .map_or(DEFAULT_OCR_TIMEOUT, Duration::from_secs),
        }))
    }
}

/// Workshop behaviour switches handed to the services.
pub struct WorkshopOptions {
    pub admin_password: Option<Zeroizing<String>>,
    pub super_admin: Option<UserId>,
    pub transition_policy: TransitionPolicy,
    pub board_refresh: Duration,
    pub password_hash_cost: u32,
    pub vision: Option<VisionGatewayConfig>,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) options: WorkshopOptions,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, options: WorkshopOptions) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            options,
        }
    }

    /// Attach a database connection pool.
    ///
    /// Without one, every driven port is served from memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}

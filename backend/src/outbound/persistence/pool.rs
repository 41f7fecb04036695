//! PostgreSQL connection pool (`diesel-async` over `bb8`) and the embedded
//! schema migrations applied at startup.

use std::fmt;
use std::time::Duration;

use diesel::{Connection, PgConnection};
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{info, warn};
use url::Url;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Pool and migration failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("no database connection available: {message}")]
    Checkout { message: String },

    #[error("could not open database pool: {message}")]
    Build { message: String },

    #[error("schema migration failed: {message}")]
    Migration { message: String },
}

impl PoolError {
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }

    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration {
            message: message.into(),
        }
    }
}

/// Pool sizing and checkout timeout.
///
/// A workshop has a handful of tablets and one TV, so the defaults are
/// small: 10 connections with 1 kept warm, and a 5 second checkout timeout
/// so a stalled database surfaces as `503` quickly instead of hanging the
/// request.
///
/// ```
/// use workshop::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://werkplaats:geheim@db/workshop").with_max_size(4);
/// assert!(!format!("{config:?}").contains("geheim"));
/// ```
#[derive(Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    min_idle: u32,
    connection_timeout: Duration,
}

impl PoolConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: 10,
            min_idle: 1,
            connection_timeout: Duration::from_secs(5),
        }
    }

    #[must_use]
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size.max(1);
        self.min_idle = self.min_idle.min(self.max_size);
        self
    }

    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

impl fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfig")
            .field("database_url", &redact_url(&self.database_url))
            .field("max_size", &self.max_size)
            .field("min_idle", &self.min_idle)
            .field("connection_timeout", &self.connection_timeout)
            .finish()
    }
}

/// Strip the password from a connection URL for logs.
fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) if url.password().is_some() => {
            // `set_password` only fails for URLs that cannot carry credentials.
            let _ = url.set_password(Some("***"));
            url.to_string()
        }
        Ok(url) => url.to_string(),
        Err(_) => "<unparseable database url>".to_owned(),
    }
}

/// Shared handle to the pool; cheap to clone into each repository.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Open the pool.
    ///
    /// # Errors
    ///
    /// [`PoolError::Build`] when the manager cannot be constructed.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        info!(config = ?config, "opening database pool");
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);
        let inner = Pool::builder()
            .max_size(config.max_size)
            .min_idle(Some(config.min_idle))
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        Ok(Self { inner })
    }

    /// Check out a connection.
    ///
    /// # Errors
    ///
    /// [`PoolError::Checkout`] when none frees up within the timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}

/// Attempts made to reach the database before migrating.
const MIGRATION_CONNECT_ATTEMPTS: u32 = 5;

/// Apply pending embedded migrations.
///
/// Runs on a blocking thread with a synchronous connection. The database
/// may still be starting when the backend container comes up, so the
/// connection is retried a few times with a linear back-off.
///
/// # Errors
///
/// [`PoolError::Build`] when the database stays unreachable,
/// [`PoolError::Migration`] when a migration fails.
pub async fn run_migrations(database_url: &str) -> Result<(), PoolError> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || {
        let mut conn = connect_with_retry(&url)?;
        conn.run_pending_migrations(MIGRATIONS)
            .map(|versions| {
                versions
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
            })
            .map_err(|err| PoolError::migration(err.to_string()))
    })
    .await
    .map_err(|err| PoolError::migration(format!("migration task aborted: {err}")))??;
    if applied.is_empty() {
        info!("database schema up to date");
    } else {
        info!(?applied, "database migrations applied");
    }
    Ok(())
}

fn connect_with_retry(url: &str) -> Result<PgConnection, PoolError> {
    let mut attempt = 1;
    loop {
        match PgConnection::establish(url) {
            Ok(conn) => return Ok(conn),
            Err(err) if attempt < MIGRATION_CONNECT_ATTEMPTS => {
                warn!(attempt, error = %err, "database not reachable yet");
                std::thread::sleep(Duration::from_secs(u64::from(attempt)));
                attempt += 1;
            }
            Err(err) => return Err(PoolError::build(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 1)]
    #[case(0, 1)]
    #[case(20, 1)]
    fn sizes_are_clamped(#[case] requested: u32, #[case] idle: u32) {
        let config = PoolConfig::new("postgres://localhost/workshop").with_max_size(requested);
        assert!(config.max_size >= 1);
        assert_eq!(config.min_idle, idle);
    }

    #[rstest]
    #[case(
        "postgres://werkplaats:geheim@db:5432/workshop",
        "postgres://werkplaats:***@db:5432/workshop"
    )]
    #[case("postgres://db/workshop", "postgres://db/workshop")]
    #[case("not a url", "<unparseable database url>")]
    fn urls_are_redacted(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(redact_url(raw), expected);
    }
}

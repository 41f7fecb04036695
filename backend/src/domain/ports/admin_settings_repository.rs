//! Port for the `admin_settings` key/value table.

use async_trait::async_trait;

use super::define_port_error;

/// Setting holding the admin promotion secret.
pub const ADMIN_PROMOTION_PASSWORD_KEY: &str = "admin_promotion_password";

define_port_error! {
    /// Errors raised by settings adapters.
    pub enum AdminSettingsRepositoryError {
        Connection { message: String } =>
            "admin settings connection failed: {message}",
        Query { message: String } =>
            "admin settings query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminSettingsRepository: Send + Sync {
    /// Value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, AdminSettingsRepositoryError>;
}

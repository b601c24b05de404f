use thiserror::Error;

use crate::config::ConfigError;

/// Process-level failures: anything that prevents the authorization server
/// from starting or serving. Protocol errors on the token endpoint are
/// `OAuthError`s and never surface here.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("invalid client registrations: {0}")]
    InvalidClients(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

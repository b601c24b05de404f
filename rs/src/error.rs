use thiserror::Error;

use crate::config::ConfigError;
use crate::services::auth::access_jwt::AccessJwtError;

/// Failures while resolving what an identity may access.
///
/// Every variant fails the request closed: callers deny rather than fall back
/// to an unrestricted project set.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// The entitlement claim has a shape other than a string or a flat list of strings.
    #[error("Failed to convert claim {0}")]
    ClaimConversion(String),

    #[error("invalid project authorization config: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot verify access tokens: {0}")]
    Verifier(#[from] AccessJwtError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

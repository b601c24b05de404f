use std::net::SocketAddr;
use std::path::PathBuf;
use std::{env, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        let raw = env::var("APP_ENV").unwrap_or_default();
        if raw.eq_ignore_ascii_case("production") || raw.eq_ignore_ascii_case("prod") {
            Self::Production
        } else {
            Self::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    // Issued tokens carry this as `iss` and as their sole audience. When unset
    // it is derived from the incoming request (scheme + Host).
    pub issuer: Option<String>,
    // Ed25519 PKCS#8 PEM. The public half verifies codes and refresh tokens we minted.
    pub access_jwt_private_key_pem: String,
    pub access_jwt_public_key_pem: String,
    // Token lifetimes (seconds)
    pub access_token_ttl_seconds: u64,
    pub refresh_token_ttl_seconds: u64,
    // Stripped from every requested scope before it is granted.
    pub requested_scope_prefix: String,
    pub clients_path: Option<PathBuf>,
}

/// Longest accepted token lifespan: one year.
pub const MAX_LIFESPAN_SECONDS: u64 = 366 * 24 * 60 * 60;

/// Seconds from `key`, or `default` when unset. Zero, garbage and anything
/// above `MAX_LIFESPAN_SECONDS` are rejected.
fn lifespan_from_env(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if (1..=MAX_LIFESPAN_SECONDS).contains(&secs) => Ok(secs),
            _ => Err(ConfigError::Invalid(key)),
        },
        Err(_) => Ok(default),
    }
}

/// PEM from env; `\n` escapes are honoured so keys fit on one line in `.env`.
fn pem_from_env(key: &'static str) -> Result<String, ConfigError> {
    let pem = env::var(key).map_err(|_| ConfigError::Missing(key))?;
    Ok(pem.replace("\\n", "\n"))
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port = match env::var("AUTH_PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid("AUTH_PORT"))?,
            Err(_) => 4000,
        };

        let issuer = env::var("AUTH_ISSUER")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());

        let clients_path = env::var("OAUTH_CLIENTS_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Config {
            addr: SocketAddr::from(([0, 0, 0, 0], port)),
            app_env: AppEnv::from_env(),
            issuer,
            access_jwt_private_key_pem: pem_from_env("ACCESS_JWT_PRIVATE_KEY_PEM")?,
            access_jwt_public_key_pem: pem_from_env("ACCESS_JWT_PUBLIC_KEY_PEM")?,
            access_token_ttl_seconds: lifespan_from_env("ACCESS_TOKEN_TTL_SECONDS", 1_800)?,
            refresh_token_ttl_seconds: lifespan_from_env("REFRESH_TOKEN_TTL_SECONDS", 3_600)?,
            requested_scope_prefix: env::var("REQUESTED_SCOPE_PREFIX").unwrap_or_default(),
            clients_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test owns its variable name; env is process-global.
    #[test]
    fn test_lifespan_default_and_override() {
        assert_eq!(lifespan_from_env("TEST_LIFESPAN_UNSET", 1_800).unwrap(), 1_800);

        unsafe { env::set_var("TEST_LIFESPAN_SET", "90") };
        assert_eq!(lifespan_from_env("TEST_LIFESPAN_SET", 1_800).unwrap(), 90);
    }

    #[test]
    fn test_lifespan_rejects_zero_and_garbage() {
        unsafe { env::set_var("TEST_LIFESPAN_ZERO", "0") };
        assert!(matches!(
            lifespan_from_env("TEST_LIFESPAN_ZERO", 1_800),
            Err(ConfigError::Invalid("TEST_LIFESPAN_ZERO"))
        ));

        unsafe { env::set_var("TEST_LIFESPAN_GARBAGE", "soon") };
        assert!(lifespan_from_env("TEST_LIFESPAN_GARBAGE", 1_800).is_err());
    }

    #[test]
    fn test_lifespan_upper_bound() {
        unsafe { env::set_var("TEST_LIFESPAN_YEAR", MAX_LIFESPAN_SECONDS.to_string()) };
        assert_eq!(
            lifespan_from_env("TEST_LIFESPAN_YEAR", 1_800).unwrap(),
            MAX_LIFESPAN_SECONDS
        );

        unsafe { env::set_var("TEST_LIFESPAN_HUGE", u64::MAX.to_string()) };
        assert!(matches!(
            lifespan_from_env("TEST_LIFESPAN_HUGE", 1_800),
            Err(ConfigError::Invalid("TEST_LIFESPAN_HUGE"))
        ));
    }

    #[test]
    fn test_pem_newline_escapes() {
        unsafe { env::set_var("TEST_PEM_ESCAPED", "-----BEGIN-----\\nabc\\n-----END-----") };
        assert_eq!(
            pem_from_env("TEST_PEM_ESCAPED").unwrap(),
            "-----BEGIN-----\nabc\n-----END-----"
        );
        assert!(matches!(
            pem_from_env("TEST_PEM_UNSET"),
            Err(ConfigError::Missing("TEST_PEM_UNSET"))
        ));
    }
}

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::{env, fmt};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::AuthzError;

/// Claim that carries a human user's entitlement group(s) unless configured otherwise.
pub const DEFAULT_ENTITLEMENT_CLAIM: &str = "entitlement_group";

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

/// Maps entitlements and app clients onto the projects they may access.
///
/// ```json
/// {
///   "project_sets": { "sandbox-editors": ["flytesnacks", "sandbox"] },
///   "app_auth": { "mappings": [{ "client_id": "cleaner", "project_sets": ["sandbox-editors"] }] },
///   "user_auth": { "claim": "entitlement_group" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectAuthorizationConfig {
    /// Entitlement name (lower-case) to project ids.
    #[serde(default)]
    pub project_sets: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub app_auth: AppAuth,
    #[serde(default)]
    pub user_auth: UserAuth,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppAuth {
    /// Order matters: the first mapping for a client wins.
    #[serde(default)]
    pub mappings: Vec<ClientProjectSetMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientProjectSetMapping {
    pub client_id: String,
    #[serde(default)]
    pub project_sets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserAuth {
    #[serde(default = "default_claim")]
    pub claim: String,
}

impl Default for UserAuth {
    fn default() -> Self {
        Self {
            claim: default_claim(),
        }
    }
}

fn default_claim() -> String {
    DEFAULT_ENTITLEMENT_CLAIM.to_string()
}

impl ProjectAuthorizationConfig {
    pub fn from_json(raw: &str) -> Result<Self, AuthzError> {
        let config: Self = serde_json::from_str(raw)?;
        Ok(config.normalized())
    }

    pub fn from_file(path: &Path) -> Result<Self, AuthzError> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            project_sets = config.project_sets.len(),
            app_mappings = config.app_auth.mappings.len(),
            "loaded project authorization config"
        );
        Ok(config)
    }

    /// Lower-cases entitlement keys so lookups can lower-case theirs. Sets whose
    /// names differ only by case are merged.
    pub fn normalized(self) -> Self {
        let mut project_sets: HashMap<String, Vec<String>> = HashMap::new();
        for (name, projects) in self.project_sets {
            project_sets
                .entry(name.to_lowercase())
                .or_default()
                .extend(projects);
        }

        let user_auth = if self.user_auth.claim.trim().is_empty() {
            UserAuth::default()
        } else {
            self.user_auth
        };

        let mut app_auth = self.app_auth;
        app_auth.mappings.retain(|mapping| {
            let keep = !mapping.client_id.trim().is_empty();
            if !keep {
                warn!("ignoring app_auth mapping with an empty client_id");
            }
            keep
        });

        Self {
            project_sets,
            app_auth,
            user_auth,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ResourceServerConfig {
    // Expected `iss` of access tokens.
    pub issuer: String,
    // Expected `aud`; defaults to the issuer, which is what the token endpoint grants.
    pub audience: String,
    // Ed25519 SPKI PEM
    pub access_jwt_public_key_pem: String,
    pub access_token_leeway_seconds: u64,
    pub project_authorization_config_path: Option<PathBuf>,
}

impl ResourceServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let issuer = env::var("AUTH_ISSUER")
            .map_err(|_| ConfigError::Missing("AUTH_ISSUER"))?
            .trim()
            .trim_end_matches('/')
            .to_string();
        if issuer.is_empty() {
            return Err(ConfigError::Invalid("AUTH_ISSUER"));
        }

        let audience = env::var("AUTH_AUDIENCE")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| issuer.clone());

        let access_jwt_public_key_pem = env::var("ACCESS_JWT_PUBLIC_KEY_PEM")
            .map_err(|_| ConfigError::Missing("ACCESS_JWT_PUBLIC_KEY_PEM"))?
            .replace("\\n", "\n");

        let access_token_leeway_seconds = match env::var("ACCESS_TOKEN_LEEWAY_SECONDS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("ACCESS_TOKEN_LEEWAY_SECONDS"))?,
            Err(_) => 60,
        };

        let project_authorization_config_path = env::var("PROJECT_AUTHORIZATION_CONFIG_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            issuer,
            audience,
            access_jwt_public_key_pem,
            access_token_leeway_seconds,
            project_authorization_config_path,
        })
    }

    /// An unset path yields an empty config, under which no project is accessible.
    pub fn load_project_authorization(&self) -> Result<ProjectAuthorizationConfig, AuthzError> {
        match &self.project_authorization_config_path {
            Some(path) => ProjectAuthorizationConfig::from_file(path),
            None => Ok(ProjectAuthorizationConfig::default()),
        }
    }
}

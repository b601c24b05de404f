use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::AppError;
use crate::services::auth::error::OAuthError;

/// A registered OAuth2 client.
///
/// Confidential clients authenticate with a secret whose SHA-256 digest
/// (lower-case hex) is stored here; public clients carry no secret.
#[derive(Clone, Deserialize)]
pub struct ClientRegistration {
    pub id: String,
    #[serde(default)]
    pub secret_sha256: Option<String>,
    #[serde(default)]
    pub public: bool,
    pub grant_types: Vec<String>,
    pub scopes: Vec<String>,
}

impl std::fmt::Debug for ClientRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRegistration")
            .field("id", &self.id)
            .field("public", &self.public)
            .field("grant_types", &self.grant_types)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

impl ClientRegistration {
    pub fn allows_grant_type(&self, grant_type: &str) -> bool {
        self.grant_types.iter().any(|g| g == grant_type)
    }

    pub fn allows_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

/// Read-only client registry, built once at startup.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<String, Arc<ClientRegistration>>,
}

impl ClientRegistry {
    pub fn new(registrations: Vec<ClientRegistration>) -> Self {
        let clients = registrations
            .into_iter()
            .map(|mut c| {
                c.secret_sha256 = c.secret_sha256.map(|d| d.trim().to_ascii_lowercase());
                (c.id.clone(), Arc::new(c))
            })
            .collect();
        Self { clients }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)?;
        let registrations: Vec<ClientRegistration> =
            serde_json::from_str(&raw).map_err(|e| AppError::InvalidClients(e.to_string()))?;

        for client in &registrations {
            if !client.public && client.secret_sha256.is_none() {
                return Err(AppError::InvalidClients(format!(
                    "confidential client {} has no secret",
                    client.id
                )));
            }
        }

        info!(count = registrations.len(), path = %path.display(), "loaded OAuth2 clients");
        Ok(Self::new(registrations))
    }

    /// The command-line tool (public, interactive login) and the workflow
    /// engine (confidential, machine-to-machine).
    pub fn defaults() -> Self {
        Self::new(vec![
            ClientRegistration {
                id: "flytectl".to_string(),
                secret_sha256: None,
                public: true,
                grant_types: vec!["authorization_code".into(), "refresh_token".into()],
                scopes: vec!["all".into(), "offline".into(), "access_token".into()],
            },
            ClientRegistration {
                id: "flytepropeller".to_string(),
                secret_sha256: Some(hash_secret("foobar")),
                public: false,
                grant_types: vec!["client_credentials".into(), "refresh_token".into()],
                scopes: vec!["all".into(), "offline".into()],
            },
        ])
    }

    pub fn get(&self, client_id: &str) -> Option<Arc<ClientRegistration>> {
        self.clients.get(client_id).cloned()
    }

    /// Resolve and authenticate a client. Public clients are accepted on id alone.
    pub fn authenticate(
        &self,
        client_id: &str,
        secret: Option<&str>,
    ) -> Result<Arc<ClientRegistration>, OAuthError> {
        let client = self.get(client_id).ok_or_else(|| {
            debug!(client_id = %client_id, "unknown client");
            OAuthError::invalid_client("client authentication failed")
        })?;

        if client.public {
            return Ok(client);
        }

        let presented = secret.map(hash_secret);
        match (presented, client.secret_sha256.as_deref()) {
            (Some(presented), Some(expected))
                if constant_time_eq(presented.as_bytes(), expected.as_bytes()) =>
            {
                Ok(client)
            }
            _ => {
                debug!(client_id = %client_id, "client secret mismatch");
                Err(OAuthError::invalid_client("client authentication failed"))
            }
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (left, right) in a.iter().zip(b.iter()) {
        diff |= left ^ right;
    }
    diff == 0
}

pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_secret() {
        assert_eq!(
            hash_secret("foobar"),
            "c3ab8ff13720e8ad9047dd39466b3c8974e592c2fa383d4a3960714caef0c4f2"
        );
    }

    #[test]
    fn test_confidential_client_requires_secret() {
        let registry = ClientRegistry::defaults();

        assert!(registry.authenticate("flytepropeller", Some("foobar")).is_ok());
        assert_eq!(
            registry
                .authenticate("flytepropeller", Some("wrong"))
                .unwrap_err()
                .code(),
            "invalid_client"
        );
        assert!(registry.authenticate("flytepropeller", None).is_err());
    }

    #[test]
    fn test_public_client_needs_no_secret() {
        let registry = ClientRegistry::defaults();

        assert!(registry.authenticate("flytectl", None).is_ok());
        assert!(registry.authenticate("flytectl", Some("anything")).is_ok());
    }

    #[test]
    fn test_unknown_client() {
        let registry = ClientRegistry::defaults();
        assert!(registry.authenticate("nobody", Some("x")).is_err());
    }

    #[test]
    fn test_upper_case_digest_is_normalized() {
        let registry = ClientRegistry::new(vec![ClientRegistration {
            id: "cleaner".into(),
            secret_sha256: Some(hash_secret("s3cret").to_ascii_uppercase()),
            public: false,
            grant_types: vec!["client_credentials".into()],
            scopes: vec!["all".into()],
        }]);

        assert!(registry.authenticate("cleaner", Some("s3cret")).is_ok());
        assert!(registry.authenticate("cleaner", Some("S3CRET")).is_err());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }

    #[test]
    fn test_registration_json() {
        let raw = r#"[{"id":"cleaner","secret_sha256":"ab","grant_types":["client_credentials"],"scopes":["all"]}]"#;
        let regs: Vec<ClientRegistration> = serde_json::from_str(raw).unwrap();
        let registry = ClientRegistry::new(regs);

        let client = registry.get("cleaner").unwrap();
        assert!(!client.public);
        assert!(client.allows_grant_type("client_credentials"));
        assert!(!client.allows_grant_type("authorization_code"));
        assert!(client.allows_scope("all"));
    }
}

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::services::auth::error::OAuthError;

/// Claim names this server controls. Extra session claims with these names are dropped.
pub const RESERVED_CLAIMS: [&str; 10] = [
    "iss",
    "aud",
    "sub",
    "client_id",
    "scp",
    "iat",
    "exp",
    "nbf",
    "jti",
    "token_use",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenUse {
    Access,
    Refresh,
    Code,
}

/// Claims shared by every JWT this server mints: access tokens, refresh tokens
/// and authorization codes. `token_use` keeps one kind from being replayed as another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub iss: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aud: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sub: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub scp: Vec<String>,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub token_use: TokenUse,
    #[serde(flatten)]
    pub ext: Map<String, Value>,
}

impl TokenClaims {
    pub fn new(token_use: TokenUse, client_id: &str, now: i64, ttl_seconds: u64) -> Self {
        Self {
            iss: String::new(),
            aud: Vec::new(),
            sub: String::new(),
            client_id: client_id.to_string(),
            scp: Vec::new(),
            iat: now,
            exp: now.saturating_add(i64::try_from(ttl_seconds).unwrap_or(i64::MAX)),
            jti: Uuid::new_v4().to_string(),
            token_use,
            ext: Map::new(),
        }
    }
}

/// Removes claims that would collide with the registered ones on serialization.
pub fn without_reserved_claims(mut ext: Map<String, Value>) -> Map<String, Value> {
    ext.retain(|k, _| !RESERVED_CLAIMS.contains(&k.as_str()));
    ext
}

#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenSigner")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenSigner {
    /// Both keys must be Ed25519 in PEM format (PKCS#8 private, SPKI public).
    pub fn new(private_key_pem: &str, public_key_pem: &str) -> Result<Self, AppError> {
        let encoding_key = EncodingKey::from_ed_pem(private_key_pem.as_bytes()).map_err(|e| {
            warn!(error = %e, "failed to parse access JWT private key PEM (expected Ed25519 PKCS#8 PEM)");
            AppError::InvalidKey(e.to_string())
        })?;
        let decoding_key = DecodingKey::from_ed_pem(public_key_pem.as_bytes()).map_err(|e| {
            warn!(error = %e, "failed to parse access JWT public key PEM");
            AppError::InvalidKey(e.to_string())
        })?;

        // Codes and refresh tokens are checked for signature, expiry and
        // `token_use`; their issuer may have been derived from an earlier request.
        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
        })
    }

    pub fn sign<T: Serialize>(&self, claims: &T) -> Result<String, OAuthError> {
        let mut header = Header::new(Algorithm::EdDSA);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            OAuthError::ServerError
        })
    }

    pub fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<T, jsonwebtoken::errors::Error> {
        jsonwebtoken::decode::<T>(token, &self.decoding_key, &self.validation).map(|d| d.claims)
    }

    /// Verify one of our own tokens and check it was minted for `expected` use.
    pub fn verify_claims(&self, token: &str, expected: TokenUse) -> Result<TokenClaims, OAuthError> {
        let claims: TokenClaims = self.verify(token).map_err(|e| {
            warn!(error = %e, token_use = ?expected, "token verification failed");
            OAuthError::invalid_grant("the provided grant is invalid or expired")
        })?;

        if claims.token_use != expected {
            warn!(token_use = ?claims.token_use, expected = ?expected, "token used for the wrong purpose");
            return Err(OAuthError::invalid_grant(
                "the provided grant is invalid or expired",
            ));
        }

        Ok(claims)
    }

    /// Mint an authorization code for a consented user session.
    ///
    /// Used by the authorize flow once the user has logged in and approved
    /// `scopes` for `client_id`; `ext` carries the user's identity claims into
    /// the tokens later exchanged for this code.
    pub fn sign_authorization_code(
        &self,
        client_id: &str,
        subject: &str,
        scopes: &[String],
        ext: Map<String, Value>,
        ttl_seconds: u64,
    ) -> Result<String, OAuthError> {
        let now = chrono::Utc::now().timestamp();
        let mut claims = TokenClaims::new(TokenUse::Code, client_id, now, ttl_seconds);
        claims.sub = subject.to_string();
        claims.scp = scopes.to_vec();
        claims.ext = without_reserved_claims(ext);

        self.sign(&claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVATE_KEY: &str = include_str!("../../../tests/fixtures/signing_key.pem");
    const PUBLIC_KEY: &str = include_str!("../../../tests/fixtures/signing_key.pub.pem");

    fn signer() -> TokenSigner {
        TokenSigner::new(PRIVATE_KEY, PUBLIC_KEY).expect("fixture keys parse")
    }

    #[test]
    fn test_rejects_garbage_key() {
        let err = TokenSigner::new("not a pem", PUBLIC_KEY).unwrap_err();
        assert!(matches!(err, AppError::InvalidKey(_)));
    }

    #[test]
    fn test_authorization_code_round_trip() {
        let signer = signer();
        let mut ext = Map::new();
        ext.insert("entitlement_group".into(), Value::from(vec!["r1"]));
        ext.insert("sub".into(), Value::from("spoofed"));

        let code = signer
            .sign_authorization_code("flytectl", "alice", &["all".into()], ext, 60)
            .unwrap();
        let claims = signer.verify_claims(&code, TokenUse::Code).unwrap();

        assert_eq!(claims.client_id, "flytectl");
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.scp, vec!["all"]);
        assert!(claims.ext.contains_key("entitlement_group"));
        assert!(!claims.ext.contains_key("sub"));
    }

    #[test]
    fn test_code_cannot_be_used_as_refresh_token() {
        let signer = signer();
        let code = signer
            .sign_authorization_code("flytectl", "alice", &[], Map::new(), 60)
            .unwrap();

        let err = signer.verify_claims(&code, TokenUse::Refresh).unwrap_err();
        assert_eq!(err.code(), "invalid_grant");
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let signer = signer();
        let code = signer
            .sign_authorization_code("flytectl", "alice", &[], Map::new(), 60)
            .unwrap();
        let mut parts: Vec<&str> = code.split('.').collect();
        parts[2] = "AAAA";
        let tampered = parts.join(".");

        assert!(signer.verify_claims(&tampered, TokenUse::Code).is_err());
    }

    #[test]
    fn test_expiry_saturates_instead_of_wrapping() {
        let claims = TokenClaims::new(TokenUse::Access, "flytectl", 1_700_000_000, u64::MAX);
        assert_eq!(claims.exp, i64::MAX);

        let claims = TokenClaims::new(TokenUse::Access, "flytectl", 1_700_000_000, 1_800);
        assert_eq!(claims.exp, 1_700_001_800);
    }

    #[test]
    fn test_debug_does_not_print_keys() {
        let rendered = format!("{:?}", signer());
        assert!(!rendered.contains("PRIVATE"));
    }
}

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::{error::Error as StdError, fmt};

// Errors returned by access-token verification + strict claim validation.
#[derive(Debug)]
pub enum AccessJwtError {
    InvalidKey(jsonwebtoken::errors::Error),
    Jwt(jsonwebtoken::errors::Error),
    Claims(serde_json::Error),
    MissingOrInvalidAud,
    EmptyClaim(&'static str),
    MissingPrincipal,
    WrongTokenUse(String),
}

impl fmt::Display for AccessJwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKey(e) => write!(f, "invalid ed25519 public key pem: {}", e),
            Self::Jwt(e) => write!(f, "jwt verification failed: {}", e),
            Self::Claims(e) => write!(f, "malformed claims: {}", e),
            Self::MissingOrInvalidAud => write!(f, "missing or invalid 'aud' claim"),
            Self::EmptyClaim(name) => write!(f, "empty '{}' claim", name),
            Self::MissingPrincipal => write!(f, "token names neither a subject nor a client"),
            Self::WrongTokenUse(token_use) => {
                write!(f, "token_use '{}' is not an access token", token_use)
            }
        }
    }
}

impl StdError for AccessJwtError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::InvalidKey(e) | Self::Jwt(e) => Some(e),
            Self::Claims(e) => Some(e),
            _ => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AccessJwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::Jwt(e)
    }
}

const ACCESS_TOKEN_USE: &str = "access";

fn aud_is_present_and_valid(aud: &Value) -> bool {
    match aud {
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(arr) => arr.iter().any(|v| match v {
            Value::String(s) => !s.trim().is_empty(),
            _ => false,
        }),
        // Missing claim ends up as Null due to #[serde(default)]
        _ => false,
    }
}

/// Access token (JWT) claims this service reads.
///
/// NOTE:
/// - `aud` can be either string or array; jsonwebtoken validates it via `Validation::set_audience`.
/// - Scopes arrive as a `scp` array from our own issuer, or as a space-separated
///   `scope` string from other OAuth2 servers.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    pub iss: String,
    #[serde(default)]
    pub aud: Value,

    // Empty for app-to-app tokens
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub client_id: String,
    pub exp: u64,

    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default)]
    pub jti: Option<String>,

    #[serde(default)]
    pub scp: Vec<String>,
    #[serde(default)]
    pub scope: Option<String>,

    // Set by our own issuer on every token it signs; absent from third-party tokens.
    #[serde(default)]
    pub token_use: Option<String>,
}

/// A token that passed signature, `iss`, `aud` and `exp` checks.
#[derive(Debug, Clone)]
pub struct VerifiedAccessToken {
    pub claims: AccessTokenClaims,
    /// Every top-level claim, including ones this service does not model.
    pub raw_claims: Map<String, Value>,
}

impl VerifiedAccessToken {
    pub fn audience(&self) -> Option<&str> {
        match &self.claims.aud {
            Value::String(s) => Some(s.as_str()),
            Value::Array(arr) => arr.iter().find_map(Value::as_str),
            _ => None,
        }
    }

    pub fn scopes(&self) -> Vec<String> {
        let mut scopes = self.claims.scp.clone();
        if let Some(scope) = &self.claims.scope {
            for s in scope.split_whitespace() {
                if !scopes.iter().any(|existing| existing == s) {
                    scopes.push(s.to_string());
                }
            }
        }
        scopes
    }
}

/// EdDSA (Ed25519) access-token verifier.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct AccessTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for AccessTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("AccessTokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl AccessTokenVerifier {
    pub fn new(
        access_public_key_pem: &str,
        issuer: &str,
        audience: &str,
        leeway_seconds: u64,
    ) -> Result<Self, AccessJwtError> {
        let decoding_key = DecodingKey::from_ed_pem(access_public_key_pem.as_bytes())
            .map_err(AccessJwtError::InvalidKey)?;

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.leeway = leeway_seconds;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Verify and decode a JWT access token.
    ///
    /// `jsonwebtoken::Validation` checks the signature, `exp`, `iss` and `aud`.
    /// On top of that the required claims must be non-empty, and the token must
    /// name a user (`sub`) or a client (`client_id`). A `token_use` other than
    /// `access` (refresh tokens, authorization codes) is rejected.
    pub fn verify(&self, token: &str) -> Result<VerifiedAccessToken, AccessJwtError> {
        let raw_claims = jsonwebtoken::decode::<Map<String, Value>>(
            token,
            &self.decoding_key,
            &self.validation,
        )?
        .claims;

        let claims: AccessTokenClaims = serde_json::from_value(Value::Object(raw_claims.clone()))
            .map_err(AccessJwtError::Claims)?;

        if claims.iss.trim().is_empty() {
            return Err(AccessJwtError::EmptyClaim("iss"));
        }
        if claims.exp == 0 {
            return Err(AccessJwtError::EmptyClaim("exp"));
        }
        if !aud_is_present_and_valid(&claims.aud) {
            return Err(AccessJwtError::MissingOrInvalidAud);
        }
        if claims.sub.trim().is_empty() && claims.client_id.trim().is_empty() {
            return Err(AccessJwtError::MissingPrincipal);
        }
        match claims.token_use.as_deref() {
            None | Some(ACCESS_TOKEN_USE) => {}
            Some(other) => return Err(AccessJwtError::WrongTokenUse(other.to_string())),
        }

        Ok(VerifiedAccessToken { claims, raw_claims })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    const PRIVATE_KEY: &str = include_str!("../../../tests/fixtures/signing_key.pem");
    const PUBLIC_KEY: &str = include_str!("../../../tests/fixtures/signing_key.pub.pem");
    const ISSUER: &str = "https://admin.example.com";

    fn sign(claims: Value) -> String {
        let key = EncodingKey::from_ed_pem(PRIVATE_KEY.as_bytes()).unwrap();
        jsonwebtoken::encode(&Header::new(Algorithm::EdDSA), &claims, &key).unwrap()
    }

    fn verifier() -> AccessTokenVerifier {
        AccessTokenVerifier::new(PUBLIC_KEY, ISSUER, ISSUER, 0).unwrap()
    }

    fn now() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    #[test]
    fn test_verify_user_token() {
        let token = sign(json!({
            "iss": ISSUER,
            "aud": [ISSUER],
            "sub": "alice",
            "client_id": "flytectl",
            "scp": ["all", "offline"],
            "exp": now() + 60,
            "entitlement_group": ["r1"],
        }));

        let verified = verifier().verify(&token).unwrap();
        assert_eq!(verified.claims.sub, "alice");
        assert_eq!(verified.audience(), Some(ISSUER));
        assert_eq!(verified.scopes(), vec!["all", "offline"]);
        assert_eq!(verified.raw_claims["entitlement_group"], json!(["r1"]));
    }

    #[test]
    fn test_space_separated_scope() {
        let token = sign(json!({
            "iss": ISSUER,
            "aud": ISSUER,
            "client_id": "flytepropeller",
            "scope": "all offline",
            "exp": now() + 60,
        }));

        let verified = verifier().verify(&token).unwrap();
        assert_eq!(verified.scopes(), vec!["all", "offline"]);
    }

    #[test]
    fn test_rejects_wrong_audience() {
        let token = sign(json!({
            "iss": ISSUER,
            "aud": "https://elsewhere.example.com",
            "sub": "alice",
            "exp": now() + 60,
        }));

        assert!(matches!(verifier().verify(&token), Err(AccessJwtError::Jwt(_))));
    }

    #[test]
    fn test_rejects_expired() {
        let token = sign(json!({
            "iss": ISSUER,
            "aud": ISSUER,
            "sub": "alice",
            "exp": now() - 600,
        }));

        assert!(verifier().verify(&token).is_err());
    }

    #[test]
    fn test_rejects_token_without_principal() {
        let token = sign(json!({
            "iss": ISSUER,
            "aud": ISSUER,
            "exp": now() + 60,
        }));

        assert!(matches!(
            verifier().verify(&token),
            Err(AccessJwtError::MissingPrincipal)
        ));
    }

    #[test]
    fn test_rejects_refresh_token() {
        let claims = |token_use: &str| {
            json!({
                "iss": ISSUER,
                "aud": [ISSUER],
                "sub": "alice",
                "client_id": "flytectl",
                "scp": ["all", "offline"],
                "exp": now() + 60,
                "token_use": token_use,
            })
        };

        for token_use in ["refresh", "code"] {
            let err = verifier().verify(&sign(claims(token_use))).unwrap_err();
            assert!(
                matches!(&err, AccessJwtError::WrongTokenUse(u) if u == token_use),
                "{token_use}: {err}"
            );
        }
        assert!(verifier().verify(&sign(claims("access"))).is_ok());
    }

    #[test]
    fn test_debug_does_not_print_keys() {
        let rendered = format!("{:?}", verifier());
        assert!(!rendered.contains("PUBLIC KEY"));
    }
}

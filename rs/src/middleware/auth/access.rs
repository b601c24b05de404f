//! Bearer access token verification for incoming gRPC requests.
//!
//! The verified caller is stored in the request extensions as an
//! `IdentityContext`, where `InterceptorChain::unary` picks it up.

use std::sync::Arc;

use tonic::metadata::MetadataMap;
use tonic::service::Interceptor;
use tonic::{Request, Status};
use tracing::{debug, warn};

use crate::services::auth::access_jwt::AccessTokenVerifier;
use crate::services::auth::identity_context::IdentityContext;

/// Builds the caller's `IdentityContext` from `authorization: Bearer <jwt>`.
///
/// A request without the header proceeds with the empty identity; whether
/// that is acceptable is up to the interceptors behind it. A header that is
/// present but not a valid bearer token fails with `Unauthenticated`.
#[derive(Clone, Debug)]
pub struct Authentication {
    verifier: Arc<AccessTokenVerifier>,
}

impl Authentication {
    pub fn new(verifier: Arc<AccessTokenVerifier>) -> Self {
        Self { verifier }
    }

    fn identify(&self, metadata: &MetadataMap) -> Result<IdentityContext, Status> {
        let Some(header) = metadata.get("authorization") else {
            debug!("no authorization header, continuing unauthenticated");
            return Ok(IdentityContext::default());
        };

        let header = header.to_str().map_err(|e| {
            warn!(error = %e, "invalid authorization header encoding");
            Status::unauthenticated("Invalid authorization header")
        })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            warn!("invalid authorization format (expected 'Bearer <token>')");
            Status::unauthenticated("Invalid authorization format")
        })?;

        let verified = self.verifier.verify(token.trim()).map_err(|e| {
            warn!(error = %e, "access token rejected");
            Status::unauthenticated("Invalid access token")
        })?;

        let identity = IdentityContext::from_token(verified);
        debug!(
            user_id = %identity.user_id(),
            app_id = %identity.app_id(),
            "access token verified"
        );
        Ok(identity)
    }
}

impl Interceptor for Authentication {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        let identity = self.identify(request.metadata())?;
        request.extensions_mut().insert(identity);
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{Algorithm, EncodingKey, Header};
    use serde_json::{Value, json};

    const PRIVATE_KEY: &str = include_str!("../../../tests/fixtures/signing_key.pem");
    const PUBLIC_KEY: &str = include_str!("../../../tests/fixtures/signing_key.pub.pem");
    const ISSUER: &str = "https://admin.example.com";

    fn interceptor() -> Authentication {
        let verifier = AccessTokenVerifier::new(PUBLIC_KEY, ISSUER, ISSUER, 0).unwrap();
        Authentication::new(Arc::new(verifier))
    }

    fn sign(claims: Value) -> String {
        let key = EncodingKey::from_ed_pem(PRIVATE_KEY.as_bytes()).unwrap();
        jsonwebtoken::encode(&Header::new(Algorithm::EdDSA), &claims, &key).unwrap()
    }

    fn request_with(authorization: &str) -> Request<()> {
        let mut request = Request::new(());
        request
            .metadata_mut()
            .insert("authorization", authorization.parse().unwrap());
        request
    }

    fn exp() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + 300
    }

    #[test]
    fn test_missing_header_is_empty_identity() {
        let request = interceptor().call(Request::new(())).unwrap();
        let identity = request.extensions().get::<IdentityContext>().unwrap();
        assert!(identity.is_empty());
    }

    #[test]
    fn test_valid_token() {
        let token = sign(json!({
            "iss": ISSUER,
            "aud": [ISSUER],
            "sub": "alice",
            "client_id": "flytectl",
            "scp": ["all"],
            "exp": exp(),
            "entitlement_group": "r1",
        }));

        let request = interceptor()
            .call(request_with(&format!("Bearer {token}")))
            .unwrap();
        let identity = request.extensions().get::<IdentityContext>().unwrap();

        assert_eq!(identity.user_id(), "alice");
        assert_eq!(identity.app_id(), "flytectl");
        assert_eq!(identity.audience(), ISSUER);
        assert!(identity.has_scope("all"));
        assert_eq!(identity.claims().unwrap()["entitlement_group"], json!("r1"));
    }

    #[test]
    fn test_non_bearer_header() {
        let status = interceptor().call(request_with("Basic Zm9vOmJhcg==")).unwrap_err();
        assert_eq!(status.code(), tonic::Code::Unauthenticated);
    }

    #[test]
    fn test_garbage_token() {
        let status = interceptor().call(request_with("Bearer not-a-jwt")).unwrap_err();
        assert_eq!(status.code(), tonic::Code::Unauthenticated);
    }
}

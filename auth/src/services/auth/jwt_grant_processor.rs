use std::sync::Arc;

use axum::http::HeaderMap;
use tracing::{debug, error, warn};

use crate::services::auth::clients::{ClientRegistration, ClientRegistry};
use crate::services::auth::error::OAuthError;
use crate::services::auth::form::{BasicCredentials, TokenRequestForm};
use crate::services::auth::grant::{
    AccessRequest, AccessResponse, BoxFuture, GrantProcessor, GrantType, Session, resolve_issuer,
};
use crate::services::auth::jwt::{TokenClaims, TokenSigner, TokenUse, without_reserved_claims};
use crate::services::auth::replay::{InMemoryReplayStore, ReplayStore};

/// Granting either of these to a user grant also issues a refresh token.
const OFFLINE_SCOPES: [&str; 2] = ["offline", "offline_access"];

#[derive(Debug, Clone, Copy)]
pub struct TokenLifespans {
    pub access_token_seconds: u64,
    pub refresh_token_seconds: u64,
}

/// A code or refresh token that verified, before it is marked used.
struct RestoredGrant {
    scopes: Vec<String>,
    jti: String,
    exp: i64,
}

/// Grant processor that mints Ed25519-signed JWTs for access and refresh
/// tokens and accepts authorization codes minted by `TokenSigner`.
///
/// Codes and refresh tokens are single use: each redemption records the
/// grant's `jti` in the replay store, and a refresh grant answers with a new
/// refresh token.
#[derive(Debug, Clone)]
pub struct JwtGrantProcessor {
    clients: Arc<ClientRegistry>,
    signer: Arc<TokenSigner>,
    lifespans: TokenLifespans,
    issuer: Option<String>,
    replay: Arc<dyn ReplayStore>,
    requested_scope_prefix: String,
}

impl JwtGrantProcessor {
    pub fn new(
        clients: Arc<ClientRegistry>,
        signer: Arc<TokenSigner>,
        lifespans: TokenLifespans,
        issuer: Option<String>,
    ) -> Self {
        Self {
            clients,
            signer,
            lifespans,
            issuer,
            replay: Arc::new(InMemoryReplayStore::new()),
            requested_scope_prefix: String::new(),
        }
    }

    pub fn with_replay_store(mut self, replay: Arc<dyn ReplayStore>) -> Self {
        self.replay = replay;
        self
    }

    /// Requested scopes are checked against registrations with this prefix removed.
    pub fn with_requested_scope_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.requested_scope_prefix = prefix.into();
        self
    }

    fn unprefixed_scopes(&self, scopes: &[String]) -> Vec<String> {
        scopes
            .iter()
            .map(|s| {
                s.strip_prefix(self.requested_scope_prefix.as_str())
                    .unwrap_or(s)
                    .to_string()
            })
            .collect()
    }

    fn authenticate_client(
        &self,
        form: &TokenRequestForm,
        headers: &HeaderMap,
    ) -> Result<Arc<ClientRegistration>, OAuthError> {
        let (client_id, secret) = match BasicCredentials::from_headers(headers) {
            Some(creds) => (creds.username, Some(creds.password)),
            None => (
                form.client_id.clone().unwrap_or_default(),
                form.client_secret.clone(),
            ),
        };

        if client_id.is_empty() {
            return Err(OAuthError::invalid_client(
                "client authentication failed: no client credentials",
            ));
        }

        self.clients.authenticate(&client_id, secret.as_deref())
    }

    fn ensure_grant_allowed(
        client: &ClientRegistration,
        grant_type: &GrantType,
    ) -> Result<(), OAuthError> {
        if client.allows_grant_type(grant_type.as_str()) {
            Ok(())
        } else {
            Err(OAuthError::unauthorized_client(format!(
                "client {} is not allowed to use grant type {}",
                client.id,
                grant_type.as_str()
            )))
        }
    }

    fn check_scopes(client: &ClientRegistration, scopes: &[String]) -> Result<(), OAuthError> {
        match scopes.iter().find(|s| !client.allows_scope(s)) {
            Some(scope) => Err(OAuthError::invalid_scope(format!(
                "the requested scope '{scope}' is not allowed for client {}",
                client.id
            ))),
            None => Ok(()),
        }
    }

    /// Load the user session a code or refresh token was minted for.
    fn restore_grant(
        &self,
        client: &ClientRegistration,
        token: Option<&str>,
        token_use: TokenUse,
        session: &mut Session,
    ) -> Result<RestoredGrant, OAuthError> {
        let token = token.ok_or_else(|| {
            OAuthError::invalid_request(match token_use {
                TokenUse::Refresh => "the request is missing the refresh_token parameter",
                _ => "the request is missing the code parameter",
            })
        })?;

        let claims = self.signer.verify_claims(token, token_use)?;
        if claims.client_id != client.id {
            debug!(expected = %client.id, actual = %claims.client_id, "grant issued to another client");
            return Err(OAuthError::invalid_grant(
                "the provided grant was issued to another client",
            ));
        }

        session.subject = claims.sub;
        session.ext = without_reserved_claims(claims.ext);
        Ok(RestoredGrant {
            scopes: claims.scp,
            jti: claims.jti,
            exp: claims.exp,
        })
    }

    /// Mark a grant used. A second redemption is `invalid_grant`; a store
    /// failure refuses the grant as well.
    async fn redeem(&self, grant: &RestoredGrant) -> Result<(), OAuthError> {
        let remaining = grant.exp.saturating_sub(chrono::Utc::now().timestamp());
        let ttl = u64::try_from(remaining).unwrap_or(0).max(1);

        match self.replay.check_and_store(&grant.jti, ttl).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                warn!(jti = %grant.jti, "grant redeemed more than once");
                Err(OAuthError::invalid_grant(
                    "the provided grant has already been used",
                ))
            }
            Err(e) => {
                error!(error = %e, "replay check failed");
                Err(OAuthError::ServerError)
            }
        }
    }
}

impl GrantProcessor for JwtGrantProcessor {
    fn new_access_request<'a>(
        &'a self,
        form: &'a TokenRequestForm,
        headers: &'a HeaderMap,
        mut session: Session,
    ) -> BoxFuture<'a, Result<AccessRequest, OAuthError>> {
        Box::pin(async move {
            let grant_type = form
                .grant_type()
                .filter(|g| !g.is_empty())
                .map(GrantType::parse)
                .ok_or_else(|| {
                    OAuthError::invalid_request("the request is missing the grant_type parameter")
                })?;

            let client = self.authenticate_client(form, headers)?;
            session.client_id = client.id.clone();

            let form_scopes = self.unprefixed_scopes(&form.scopes);
            let mut restored = None;

            let requested_scopes = match &grant_type {
                GrantType::Other(raw) => {
                    // No handler; the token endpoint decides how to reject it.
                    debug!(grant_type = %raw, "no handler for grant type");
                    form_scopes
                }
                GrantType::ClientCredentials => {
                    Self::ensure_grant_allowed(&client, &grant_type)?;
                    if client.public {
                        return Err(OAuthError::unauthorized_client(
                            "public clients cannot use the client_credentials grant",
                        ));
                    }
                    form_scopes
                }
                GrantType::AuthorizationCode => {
                    Self::ensure_grant_allowed(&client, &grant_type)?;
                    // The consented scopes travel with the code.
                    let grant =
                        self.restore_grant(&client, form.code.as_deref(), TokenUse::Code, &mut session)?;
                    let scopes = grant.scopes.clone();
                    restored = Some(grant);
                    scopes
                }
                GrantType::RefreshToken => {
                    Self::ensure_grant_allowed(&client, &grant_type)?;
                    let grant = self.restore_grant(
                        &client,
                        form.refresh_token.as_deref(),
                        TokenUse::Refresh,
                        &mut session,
                    )?;
                    if let Some(extra) = form_scopes.iter().find(|s| !grant.scopes.contains(s)) {
                        return Err(OAuthError::invalid_scope(format!(
                            "the requested scope '{extra}' exceeds the original grant"
                        )));
                    }
                    let scopes = if form_scopes.is_empty() {
                        grant.scopes.clone()
                    } else {
                        form_scopes
                    };
                    restored = Some(grant);
                    scopes
                }
            };

            Self::check_scopes(&client, &requested_scopes)?;
            if let Some(grant) = &restored {
                self.redeem(grant).await?;
            }

            Ok(AccessRequest::new(
                grant_type,
                client,
                requested_scopes,
                session,
            ))
        })
    }

    fn new_access_response<'a>(
        &'a self,
        request: &'a AccessRequest,
    ) -> BoxFuture<'a, Result<AccessResponse, OAuthError>> {
        Box::pin(async move {
            let now = chrono::Utc::now().timestamp();
            let issuer = match (&self.issuer, request.granted_audience().first()) {
                (Some(issuer), _) => issuer.clone(),
                (None, Some(audience)) => audience.clone(),
                (None, None) => resolve_issuer(None, &HeaderMap::new()),
            };

            let stamp = |token_use, ttl| {
                let mut claims = TokenClaims::new(token_use, &request.client.id, now, ttl);
                claims.iss = issuer.clone();
                claims.aud = request.granted_audience().to_vec();
                claims.sub = request.session.subject.clone();
                claims.scp = request.granted_scopes().to_vec();
                claims.ext = request.session.ext.clone();
                claims
            };

            let access_claims = stamp(TokenUse::Access, self.lifespans.access_token_seconds);
            let access_token = self.signer.sign(&access_claims)?;

            let wants_refresh = matches!(
                request.grant_type,
                GrantType::AuthorizationCode | GrantType::RefreshToken
            ) && OFFLINE_SCOPES.iter().any(|s| request.has_granted_scope(s));

            let refresh_token = if wants_refresh {
                let refresh_claims = stamp(TokenUse::Refresh, self.lifespans.refresh_token_seconds);
                Some(self.signer.sign(&refresh_claims)?)
            } else {
                None
            };

            Ok(AccessResponse {
                access_token,
                token_type: "bearer",
                expires_in: self.lifespans.access_token_seconds,
                refresh_token,
                scope: request.granted_scopes().join(" "),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header};
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde_json::{Map, Value};

    const PRIVATE_KEY: &str = include_str!("../../../tests/fixtures/signing_key.pem");
    const PUBLIC_KEY: &str = include_str!("../../../tests/fixtures/signing_key.pub.pem");

    fn processor() -> (JwtGrantProcessor, Arc<TokenSigner>) {
        let signer = Arc::new(TokenSigner::new(PRIVATE_KEY, PUBLIC_KEY).unwrap());
        let processor = JwtGrantProcessor::new(
            Arc::new(ClientRegistry::defaults()),
            signer.clone(),
            TokenLifespans {
                access_token_seconds: 1800,
                refresh_token_seconds: 3600,
            },
            Some("https://admin.example.com".into()),
        );
        (processor, signer)
    }

    fn basic(user: &str, password: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let encoded = STANDARD.encode(format!("{user}:{password}"));
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
        );
        headers
    }

    fn form(grant_type: &str, scopes: &[&str]) -> TokenRequestForm {
        TokenRequestForm {
            grant_type: Some(grant_type.into()),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_grant_type() {
        let (processor, _) = processor();
        let err = processor
            .new_access_request(&TokenRequestForm::default(), &HeaderMap::new(), Session::default())
            .await
            .unwrap_err();

        assert_eq!(err.code(), "invalid_request");
    }

    #[tokio::test]
    async fn test_client_credentials_request() {
        let (processor, _) = processor();
        let form = form("client_credentials", &["all", "offline"]);

        let req = processor
            .new_access_request(&form, &basic("flytepropeller", "foobar"), Session::default())
            .await
            .unwrap();

        assert_eq!(req.grant_type, GrantType::ClientCredentials);
        assert_eq!(req.requested_scopes, vec!["all", "offline"]);
        assert_eq!(req.session.client_id, "flytepropeller");
        assert!(req.granted_scopes().is_empty());
    }

    #[tokio::test]
    async fn test_client_credentials_rejects_unregistered_scope() {
        let (processor, _) = processor();
        let form = form("client_credentials", &["all", "admin"]);

        let err = processor
            .new_access_request(&form, &basic("flytepropeller", "foobar"), Session::default())
            .await
            .unwrap_err();

        assert_eq!(err.code(), "invalid_scope");
    }

    #[tokio::test]
    async fn test_client_credentials_rejects_public_client() {
        let (processor, _) = processor();
        let form = form("client_credentials", &["all"]);

        let err = processor
            .new_access_request(&form, &basic("flytectl", ""), Session::default())
            .await
            .unwrap_err();

        assert_eq!(err.code(), "unauthorized_client");
    }

    #[tokio::test]
    async fn test_unknown_grant_passes_through() {
        let (processor, _) = processor();
        let form = form("password", &[]);

        let req = processor
            .new_access_request(&form, &basic("flytepropeller", "foobar"), Session::default())
            .await
            .unwrap();

        assert!(!req.grant_type.is_supported());
    }

    #[tokio::test]
    async fn test_authorization_code_restores_user_session() {
        let (processor, signer) = processor();
        let mut ext = Map::new();
        ext.insert("entitlement_group".into(), Value::from("r1"));
        let code = signer
            .sign_authorization_code(
                "flytectl",
                "alice",
                &["all".into(), "offline".into()],
                ext,
                300,
            )
            .unwrap();

        let mut form = form("authorization_code", &[]);
        form.code = Some(code);
        let req = processor
            .new_access_request(&form, &basic("flytectl", "foobar"), Session::default())
            .await
            .unwrap();

        assert_eq!(req.session.subject, "alice");
        assert_eq!(req.requested_scopes, vec!["all", "offline"]);
        assert_eq!(req.session.ext.get("entitlement_group"), Some(&Value::from("r1")));
    }

    #[tokio::test]
    async fn test_authorization_code_for_other_client() {
        let (processor, signer) = processor();
        let code = signer
            .sign_authorization_code("someone-else", "alice", &[], Map::new(), 300)
            .unwrap();

        let mut form = form("authorization_code", &[]);
        form.code = Some(code);
        let err = processor
            .new_access_request(&form, &basic("flytectl", ""), Session::default())
            .await
            .unwrap_err();

        assert_eq!(err.code(), "invalid_grant");
    }

    #[tokio::test]
    async fn test_refresh_issued_only_with_offline_scope() {
        let (processor, signer) = processor();
        let code = signer
            .sign_authorization_code("flytectl", "alice", &["all".into()], Map::new(), 300)
            .unwrap();

        let mut form = form("authorization_code", &[]);
        form.code = Some(code);
        let mut req = processor
            .new_access_request(&form, &basic("flytectl", ""), Session::default())
            .await
            .unwrap();
        req.grant_scope("all");
        req.grant_audience("https://admin.example.com");

        let resp = processor.new_access_response(&req).await.unwrap();
        assert!(resp.refresh_token.is_none());
        assert_eq!(resp.scope, "all");
        assert_eq!(resp.expires_in, 1800);
    }

    #[tokio::test]
    async fn test_refresh_grant_cannot_widen_scopes() {
        let (processor, signer) = processor();
        let mut claims = TokenClaims::new(TokenUse::Refresh, "flytectl", chrono::Utc::now().timestamp(), 3600);
        claims.sub = "alice".into();
        claims.scp = vec!["offline".into()];
        let refresh = signer.sign(&claims).unwrap();

        let mut form = form("refresh_token", &["all"]);
        form.refresh_token = Some(refresh);
        let err = processor
            .new_access_request(&form, &basic("flytectl", ""), Session::default())
            .await
            .unwrap_err();

        assert_eq!(err.code(), "invalid_scope");
    }

    #[derive(Debug)]
    struct UnavailableStore;

    impl ReplayStore for UnavailableStore {
        fn check_and_store<'a>(
            &'a self,
            _key: &'a str,
            _ttl_secs: u64,
        ) -> BoxFuture<'a, Result<bool, crate::services::auth::replay::ReplayError>> {
            Box::pin(async {
                Err::<bool, _>(crate::services::auth::replay::ReplayError::Unavailable(
                    "down".into(),
                ))
            })
        }
    }

    fn code_form(signer: &TokenSigner) -> TokenRequestForm {
        let code = signer
            .sign_authorization_code("flytectl", "alice", &["all".into()], Map::new(), 300)
            .unwrap();
        let mut form = form("authorization_code", &[]);
        form.code = Some(code);
        form
    }

    #[tokio::test]
    async fn test_authorization_code_is_single_use() {
        let (processor, signer) = processor();
        let form = code_form(&signer);

        processor
            .new_access_request(&form, &basic("flytectl", ""), Session::default())
            .await
            .unwrap();
        let err = processor
            .new_access_request(&form, &basic("flytectl", ""), Session::default())
            .await
            .unwrap_err();

        assert_eq!(err.code(), "invalid_grant");
    }

    #[tokio::test]
    async fn test_rejected_refresh_does_not_burn_the_token() {
        let (processor, signer) = processor();
        let mut claims = TokenClaims::new(TokenUse::Refresh, "flytectl", chrono::Utc::now().timestamp(), 3600);
        claims.sub = "alice".into();
        claims.scp = vec!["all".into(), "offline".into()];
        let refresh = signer.sign(&claims).unwrap();

        let mut wide = form("refresh_token", &["access_token"]);
        wide.refresh_token = Some(refresh.clone());
        let err = processor
            .new_access_request(&wide, &basic("flytectl", ""), Session::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_scope");

        let mut narrow = form("refresh_token", &["all"]);
        narrow.refresh_token = Some(refresh);
        let req = processor
            .new_access_request(&narrow, &basic("flytectl", ""), Session::default())
            .await
            .unwrap();
        assert_eq!(req.requested_scopes, vec!["all"]);

        let err = processor
            .new_access_request(&narrow, &basic("flytectl", ""), Session::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_grant");
    }

    #[tokio::test]
    async fn test_replay_store_failure_refuses_grant() {
        let (processor, signer) = processor();
        let processor = processor.with_replay_store(Arc::new(UnavailableStore));

        let err = processor
            .new_access_request(&code_form(&signer), &basic("flytectl", ""), Session::default())
            .await
            .unwrap_err();

        assert_eq!(err.code(), "server_error");
    }

    #[tokio::test]
    async fn test_prefixed_scopes_are_checked_without_prefix() {
        let (processor, _) = processor();
        let processor = processor.with_requested_scope_prefix("https://admin.example.com/");
        let form = form(
            "client_credentials",
            &["https://admin.example.com/all", "offline"],
        );

        let req = processor
            .new_access_request(&form, &basic("flytepropeller", "foobar"), Session::default())
            .await
            .unwrap();

        assert_eq!(req.requested_scopes, vec!["all", "offline"]);
    }
}

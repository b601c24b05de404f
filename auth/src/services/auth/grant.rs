use std::{future::Future, pin::Pin, sync::Arc};

use axum::http::{HeaderMap, header};
use serde_json::{Map, Value};

use crate::services::auth::clients::ClientRegistration;
use crate::services::auth::error::OAuthError;
use crate::services::auth::form::TokenRequestForm;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantType {
    AuthorizationCode,
    ClientCredentials,
    RefreshToken,
    Other(String),
}

/// Grant types the token endpoint issues tokens for.
pub const SUPPORTED_GRANT_TYPES: [GrantType; 3] = [
    GrantType::ClientCredentials,
    GrantType::RefreshToken,
    GrantType::AuthorizationCode,
];

impl GrantType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "authorization_code" => Self::AuthorizationCode,
            "client_credentials" => Self::ClientCredentials,
            "refresh_token" => Self::RefreshToken,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::ClientCredentials => "client_credentials",
            Self::RefreshToken => "refresh_token",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_supported(&self) -> bool {
        SUPPORTED_GRANT_TYPES.contains(self)
    }
}

/// Per-request session handed to the grant processor. The processor fills in
/// the subject and claims when the grant identifies a user.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub subject: String,
    pub username: String,
    pub client_id: String,
    pub ext: Map<String, Value>,
}

impl Session {
    pub fn new(subject: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            username: String::new(),
            client_id: client_id.into(),
            ext: Map::new(),
        }
    }
}

/// A validated token request. Scopes and audience start out requested but
/// ungranted; the token issuer decides what to grant.
#[derive(Debug, Clone)]
pub struct AccessRequest {
    pub grant_type: GrantType,
    pub client: Arc<ClientRegistration>,
    pub requested_scopes: Vec<String>,
    pub session: Session,
    granted_scopes: Vec<String>,
    granted_audience: Vec<String>,
}

impl AccessRequest {
    pub fn new(
        grant_type: GrantType,
        client: Arc<ClientRegistration>,
        requested_scopes: Vec<String>,
        session: Session,
    ) -> Self {
        Self {
            grant_type,
            client,
            requested_scopes,
            session,
            granted_scopes: Vec::new(),
            granted_audience: Vec::new(),
        }
    }

    pub fn grant_scope(&mut self, scope: &str) {
        if !scope.is_empty() && !self.granted_scopes.iter().any(|s| s == scope) {
            self.granted_scopes.push(scope.to_string());
        }
    }

    pub fn grant_audience(&mut self, audience: &str) {
        if !audience.is_empty() && !self.granted_audience.iter().any(|a| a == audience) {
            self.granted_audience.push(audience.to_string());
        }
    }

    pub fn granted_scopes(&self) -> &[String] {
        &self.granted_scopes
    }

    pub fn granted_audience(&self) -> &[String] {
        &self.granted_audience
    }

    pub fn has_granted_scope(&self, scope: &str) -> bool {
        self.granted_scopes.iter().any(|s| s == scope)
    }
}

/// Tokens produced for an access request.
#[derive(Debug, Clone)]
pub struct AccessResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub refresh_token: Option<String>,
    pub scope: String,
}

/// The OAuth2 protocol engine behind the token endpoint: client
/// authentication, grant validation and token minting.
pub trait GrantProcessor: Send + Sync {
    /// Validate the raw request into an `AccessRequest`.
    ///
    /// Must verify that every requested scope is permitted for the client (and,
    /// for user grants, was consented). Grant types the processor has no
    /// handler for are returned as `GrantType::Other` rather than rejected.
    fn new_access_request<'a>(
        &'a self,
        form: &'a TokenRequestForm,
        headers: &'a HeaderMap,
        session: Session,
    ) -> BoxFuture<'a, Result<AccessRequest, OAuthError>>;

    /// Mint the tokens for a request whose scopes and audience have been granted.
    fn new_access_response<'a>(
        &'a self,
        request: &'a AccessRequest,
    ) -> BoxFuture<'a, Result<AccessResponse, OAuthError>>;
}

/// The issuer identifier for this deployment: the configured value, or the
/// public base URL the request was addressed to.
pub fn resolve_issuer(configured: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(issuer) = configured {
        return issuer.trim_end_matches('/').to_string();
    }

    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get(header::HOST))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");

    format!("{scheme}://{host}")
}

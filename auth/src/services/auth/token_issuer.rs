use std::sync::Arc;

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, error, info};

use crate::api::v1::dto::token_response::TokenResponse;
use crate::services::auth::error::OAuthError;
use crate::services::auth::form::{BasicCredentials, TokenRequestForm};
use crate::services::auth::grant::{AccessResponse, GrantProcessor, Session, resolve_issuer};

/// The token endpoint: dispatches on grant type, grants the requested scopes
/// and audience, and leaves validation and signing to the grant processor.
#[derive(Clone)]
pub struct TokenIssuer {
    processor: Arc<dyn GrantProcessor>,
    issuer: Option<String>,
    requested_scope_prefix: String,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("requested_scope_prefix", &self.requested_scope_prefix)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(
        processor: Arc<dyn GrantProcessor>,
        issuer: Option<String>,
        requested_scope_prefix: impl Into<String>,
    ) -> Self {
        Self {
            processor,
            issuer,
            requested_scope_prefix: requested_scope_prefix.into(),
        }
    }

    /// Handle one token request end to end and produce the HTTP response.
    ///
    /// Every processor error is written back unchanged as an RFC 6749 error
    /// response; nothing is retried.
    pub async fn issue_token(&self, headers: &HeaderMap, body: &[u8]) -> Response {
        // A body we cannot parse is not fatal here: the processor rejects the
        // (empty) request with a proper protocol error.
        let form = TokenRequestForm::parse(headers, body).unwrap_or_else(|e| {
            error!(error = %e, "failed to parse token request form");
            TokenRequestForm::default()
        });

        // Associate client_credentials tokens with the calling client.
        let client_id = if form.grant_type() == Some("client_credentials") {
            BasicCredentials::from_headers(headers)
                .map(|c| c.username)
                .unwrap_or_default()
        } else {
            String::new()
        };

        let session = Session::new("", client_id);

        let mut request = match self
            .processor
            .new_access_request(&form, headers, session)
            .await
        {
            Ok(request) => request,
            Err(err) => {
                info!(error = %err, code = err.code(), "token request rejected");
                return err.into_response();
            }
        };

        if !request.grant_type.is_supported() {
            info!(grant_type = %request.grant_type.as_str(), "unsupported grant type");
            return OAuthError::UnsupportedGrantType.into_response();
        }

        // The processor has already checked each requested scope against what
        // the client (or the consenting user) may have.
        for scope in request.requested_scopes.clone() {
            let scope = scope
                .strip_prefix(self.requested_scope_prefix.as_str())
                .unwrap_or(&scope);
            request.grant_scope(scope);
        }

        let audience = resolve_issuer(self.issuer.as_deref(), headers);
        request.grant_audience(&audience);

        debug!(
            client_id = %request.client.id,
            grant_type = %request.grant_type.as_str(),
            scopes = ?request.granted_scopes(),
            audience = %audience,
            "granting token request"
        );

        match self.processor.new_access_response(&request).await {
            Ok(response) => write_access_response(response),
            Err(err) => {
                info!(error = %err, code = err.code(), "failed to create access response");
                err.into_response()
            }
        }
    }
}

fn write_access_response(response: AccessResponse) -> Response {
    let body = TokenResponse {
        access_token: response.access_token,
        token_type: response.token_type.to_string(),
        expires_in: response.expires_in,
        refresh_token: response.refresh_token,
        scope: Some(response.scope).filter(|s| !s.is_empty()),
    };

    let mut response = (StatusCode::OK, Json(body)).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    response
}

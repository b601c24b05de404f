use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;

use crate::state::AppState;

/// POST /token
///
/// The body is taken raw: a form that fails to parse is still handed to the
/// issuer so the client gets an OAuth2 error rather than an extractor rejection.
pub async fn issue_token(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    state.tokens.issue_token(&headers, &body).await
}

use std::sync::Arc;

use crate::services::auth::TokenIssuer;

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(tokens: Arc<TokenIssuer>) -> Self {
        Self { tokens }
    }
}

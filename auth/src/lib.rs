//! OAuth2 authorization server: the token endpoint for client credentials,
//! authorization code and refresh token grants.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

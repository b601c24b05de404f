pub mod auth;
pub mod chain;

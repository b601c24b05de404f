pub mod config;
pub mod error;
pub mod middleware;
pub mod proto;
pub mod services;
pub mod state;

pub mod admin;
pub mod service;

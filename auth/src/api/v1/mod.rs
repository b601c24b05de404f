/*
 * Responsibility
 * - public surface of v1: the token route and its wire types
 */
pub mod dto;
pub mod handlers;
mod routes;

pub use routes::routes;

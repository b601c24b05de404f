pub mod clients;
pub mod error;
pub mod form;
pub mod grant;
pub mod jwt;
pub mod jwt_grant_processor;
pub mod replay;
pub mod token_issuer;

pub use error::OAuthError;
pub use grant::GrantProcessor;
pub use token_issuer::TokenIssuer;

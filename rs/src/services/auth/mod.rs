pub mod access_jwt;
pub mod entitlements;
pub mod identity_context;
pub mod project_authz;
pub mod project_id;

pub use access_jwt::{AccessJwtError, AccessTokenVerifier};
pub use identity_context::{IdentityContext, SCOPE_ALL, UserInfo};
pub use project_authz::ProjectAuthorizer;
pub use project_id::ProjectIdResolver;

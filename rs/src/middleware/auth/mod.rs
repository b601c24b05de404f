pub mod access;
pub mod blanket;
pub mod execution_identity;
pub mod project;

pub use access::Authentication;
pub use blanket::BlanketAuthorization;
pub use execution_identity::ExecutionUserIdentifier;
pub use project::ProjectAuthorization;

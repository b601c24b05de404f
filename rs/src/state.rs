use std::sync::Arc;

use crate::config::ResourceServerConfig;
use crate::error::AuthzError;
use crate::middleware::auth::{
    Authentication, BlanketAuthorization, ExecutionUserIdentifier, ProjectAuthorization,
};
use crate::middleware::chain::InterceptorChain;
use crate::services::auth::{AccessTokenVerifier, ProjectAuthorizer, ProjectIdResolver};

/// Everything the admin service needs to authenticate and authorize calls.
#[derive(Clone, Debug)]
pub struct AuthzState {
    pub verifier: Arc<AccessTokenVerifier>,
    pub authorizer: Arc<ProjectAuthorizer>,
    pub resolver: Arc<ProjectIdResolver>,
}

impl AuthzState {
    pub fn new(verifier: AccessTokenVerifier, authorizer: ProjectAuthorizer) -> Self {
        Self {
            verifier: Arc::new(verifier),
            authorizer: Arc::new(authorizer),
            resolver: Arc::new(ProjectIdResolver::admin()),
        }
    }

    pub fn from_config(config: &ResourceServerConfig) -> Result<Self, AuthzError> {
        let verifier = AccessTokenVerifier::new(
            &config.access_jwt_public_key_pem,
            &config.issuer,
            &config.audience,
            config.access_token_leeway_seconds,
        )?;
        let authorizer = ProjectAuthorizer::new(config.load_project_authorization()?);

        Ok(Self::new(verifier, authorizer))
    }

    /// The tonic interceptor to install on the admin service.
    pub fn authentication(&self) -> Authentication {
        Authentication::new(self.verifier.clone())
    }

    /// blanket scope check -> execution identity -> project authorization
    pub fn interceptor_chain(&self) -> InterceptorChain {
        InterceptorChain::new()
            .with(BlanketAuthorization)
            .with(ExecutionUserIdentifier)
            .with(ProjectAuthorization::new(
                self.resolver.clone(),
                self.authorizer.clone(),
            ))
    }
}

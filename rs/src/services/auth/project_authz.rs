use std::collections::HashSet;
use std::sync::Arc;

use crate::config::ProjectAuthorizationConfig;
use crate::error::AuthzError;
use crate::proto::admin::Project;
use crate::services::auth::entitlements::resolve_entitlements;
use crate::services::auth::identity_context::IdentityContext;

/// Resolves which projects an identity may access.
///
/// The config is fixed at construction; picking up a changed file means
/// building a new authorizer.
#[derive(Debug)]
pub struct ProjectAuthorizer {
    config: Arc<ProjectAuthorizationConfig>,
}

impl ProjectAuthorizer {
    pub fn new(config: ProjectAuthorizationConfig) -> Self {
        Self {
            config: Arc::new(config.normalized()),
        }
    }

    pub fn config(&self) -> Arc<ProjectAuthorizationConfig> {
        Arc::clone(&self.config)
    }

    /// Projects the identity is entitled to.
    ///
    /// An app client with a configured mapping gets exactly the project sets of
    /// the first matching mapping. Everyone else gets the union of the project
    /// sets named by their entitlement claim; unknown names add nothing.
    pub fn eligible_projects(&self, identity: &IdentityContext) -> Result<HashSet<String>, AuthzError> {
        let config = &self.config;

        if let Some(mapping) = config
            .app_auth
            .mappings
            .iter()
            .find(|m| m.client_id == identity.app_id())
        {
            return Ok(projects_by_entitlements(config, &mapping.project_sets));
        }

        let entitlements = resolve_entitlements(identity, &config.user_auth.claim)?;
        Ok(projects_by_entitlements(config, &entitlements))
    }

    /// Keeps only the projects the identity is entitled to, in their original order.
    pub fn filter_projects(
        &self,
        identity: &IdentityContext,
        projects: Vec<Project>,
    ) -> Result<Vec<Project>, AuthzError> {
        let eligible = self.eligible_projects(identity)?;
        Ok(projects
            .into_iter()
            .filter(|p| eligible.contains(&p.id))
            .collect())
    }
}

pub fn projects_by_entitlements(
    config: &ProjectAuthorizationConfig,
    entitlements: &[String],
) -> HashSet<String> {
    entitlements
        .iter()
        .filter_map(|e| config.project_sets.get(&e.to_lowercase()))
        .flatten()
        .cloned()
        .collect()
}

use std::sync::Arc;

use tonic::Status;
use tracing::debug;

use crate::middleware::chain::{
    BoxFuture, Message, Next, Reply, RequestContext, UnaryInterceptor, UnaryResult,
};
use crate::services::auth::project_authz::ProjectAuthorizer;
use crate::services::auth::project_id::ProjectIdResolver;

/// Only lets a request through when its caller is entitled to the project it
/// targets. Requests that target no project are not checked.
#[derive(Clone, Debug)]
pub struct ProjectAuthorization {
    resolver: Arc<ProjectIdResolver>,
    authorizer: Arc<ProjectAuthorizer>,
}

impl ProjectAuthorization {
    pub fn new(resolver: Arc<ProjectIdResolver>, authorizer: Arc<ProjectAuthorizer>) -> Self {
        Self {
            resolver,
            authorizer,
        }
    }

    fn authorize(&self, ctx: &RequestContext, request: &Message) -> Result<(), Status> {
        let project = self.resolver.resolve(ctx.full_method(), &**request);
        if project.is_empty() {
            return Ok(());
        }

        let identity = ctx.identity();
        let projects = self.authorizer.eligible_projects(identity).map_err(|e| {
            let msg = format!(
                "Failed to authorize user {} due to error: {}",
                identity.user_id(),
                e
            );
            debug!("{msg}");
            Status::unauthenticated(msg)
        })?;
        debug!(
            user_id = %identity.user_id(),
            projects = ?projects,
            "found eligible projects"
        );

        if projects.contains(&project) {
            return Ok(());
        }

        let msg = format!(
            "User {} not permitted to access project {}",
            identity.user_id(),
            project
        );
        debug!("{msg}");
        Err(Status::unauthenticated(msg))
    }
}

impl UnaryInterceptor for ProjectAuthorization {
    fn intercept<'a>(
        &'a self,
        ctx: RequestContext,
        request: Message,
        next: Next<'a>,
    ) -> BoxFuture<'a, UnaryResult> {
        match self.authorize(&ctx, &request) {
            Ok(()) => next.run(ctx, request),
            Err(status) => Box::pin(async move { Err::<Reply, _>(status) }),
        }
    }
}

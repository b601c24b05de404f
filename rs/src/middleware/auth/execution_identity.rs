use crate::middleware::chain::{BoxFuture, Message, Next, RequestContext, UnaryInterceptor, UnaryResult};

/// Attributes actions taken by the request to the calling user.
///
/// Never denies; later interceptors and the handler see the derived identity.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExecutionUserIdentifier;

impl UnaryInterceptor for ExecutionUserIdentifier {
    fn intercept<'a>(
        &'a self,
        ctx: RequestContext,
        request: Message,
        next: Next<'a>,
    ) -> BoxFuture<'a, UnaryResult> {
        let identity = ctx.identity();
        let derived = identity.with_execution_user_identifier(identity.user_id());
        next.run(ctx.with_identity(derived), request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tonic::Status;

    use crate::middleware::chain::{InterceptorChain, Reply};
    use crate::services::auth::identity_context::IdentityContext;

    #[tokio::test]
    async fn test_execution_identity_is_user_id() {
        let handler = |ctx: RequestContext, _: Message| async move {
            Ok::<Reply, Status>(Box::new(ctx.identity().execution_identity().to_string()))
        };
        let identity = IdentityContext::new("", "alice", "flytectl", ["all"], None, None);

        let reply = InterceptorChain::new()
            .with(ExecutionUserIdentifier)
            .run(RequestContext::new("/svc/Any", identity), Arc::new(()), &handler)
            .await
            .unwrap();

        assert_eq!(*reply.downcast::<String>().unwrap(), "alice");
    }

    #[tokio::test]
    async fn test_app_caller_gets_empty_execution_identity() {
        let handler = |ctx: RequestContext, _: Message| async move {
            Ok::<Reply, Status>(Box::new(ctx.identity().execution_identity().is_empty()))
        };
        let identity = IdentityContext::new("", "", "flytepropeller", ["all"], None, None);

        let reply = InterceptorChain::new()
            .with(ExecutionUserIdentifier)
            .run(RequestContext::new("/svc/Any", identity), Arc::new(()), &handler)
            .await
            .unwrap();

        assert!(*reply.downcast::<bool>().unwrap());
    }
}

use tonic::Status;
use tracing::debug;

use crate::middleware::chain::{
    BoxFuture, Message, Next, Reply, RequestContext, UnaryInterceptor, UnaryResult,
};
use crate::services::auth::identity_context::SCOPE_ALL;

/// Requires the `all` scope from every authenticated caller.
///
/// Unauthenticated requests pass through untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlanketAuthorization;

impl UnaryInterceptor for BlanketAuthorization {
    fn intercept<'a>(
        &'a self,
        ctx: RequestContext,
        request: Message,
        next: Next<'a>,
    ) -> BoxFuture<'a, UnaryResult> {
        let identity = ctx.identity();
        if !identity.is_empty() && !identity.has_scope(SCOPE_ALL) {
            debug!(
                user_id = %identity.user_id(),
                app_id = %identity.app_id(),
                "authenticated user doesn't have required scope"
            );
            return Box::pin(async {
                Err::<Reply, _>(Status::unauthenticated(
                    "authenticated user doesn't have required scope",
                ))
            });
        }

        next.run(ctx, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::middleware::chain::InterceptorChain;
    use crate::services::auth::identity_context::IdentityContext;

    async fn run(identity: IdentityContext) -> (Result<Reply, Status>, bool) {
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();
        let handler = move |_: RequestContext, _: Message| {
            flag.store(true, Ordering::SeqCst);
            async { Ok::<Reply, Status>(Box::new(())) }
        };

        let result = InterceptorChain::new()
            .with(BlanketAuthorization)
            .run(RequestContext::new("/svc/Any", identity), Arc::new(()), &handler)
            .await;
        (result, called.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_empty_identity_passes() {
        let (result, called) = run(IdentityContext::default()).await;
        assert!(result.is_ok());
        assert!(called);
    }

    #[tokio::test]
    async fn test_scope_all_passes() {
        let identity = IdentityContext::new("", "alice", "", ["all"], None, None);
        let (result, called) = run(identity).await;
        assert!(result.is_ok());
        assert!(called);
    }

    #[tokio::test]
    async fn test_missing_scope_is_denied() {
        let identity = IdentityContext::new("", "alice", "", ["offline"], None, None);
        let (result, called) = run(identity).await;

        let status = result.unwrap_err();
        assert_eq!(status.code(), tonic::Code::Unauthenticated);
        assert_eq!(status.message(), "authenticated user doesn't have required scope");
        assert!(!called);
    }
}

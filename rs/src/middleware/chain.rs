//! Unary interceptor chain for the admin gRPC service.
//!
//! Interceptors run in registration order around a handler, each deciding
//! whether to call `next` and with which `RequestContext`. The chain is
//! framework-agnostic; `InterceptorChain::unary` adapts it to tonic requests.

use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tonic::Status;

use crate::services::auth::identity_context::IdentityContext;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A decoded request message of any type.
pub type Message = Arc<dyn Any + Send + Sync>;
/// A handler's reply of any type.
pub type Reply = Box<dyn Any + Send>;
pub type UnaryResult = Result<Reply, Status>;

/// Request-scoped context threaded through the chain.
#[derive(Debug, Clone)]
pub struct RequestContext {
    full_method: Arc<str>,
    identity: Arc<IdentityContext>,
}

impl RequestContext {
    pub fn new(full_method: impl Into<Arc<str>>, identity: IdentityContext) -> Self {
        Self {
            full_method: full_method.into(),
            identity: Arc::new(identity),
        }
    }

    /// e.g. `/flyteidl.service.AdminService/CreateExecution`
    pub fn full_method(&self) -> &str {
        &self.full_method
    }

    pub fn identity(&self) -> &IdentityContext {
        &self.identity
    }

    /// The same request, seen by later interceptors and the handler as `identity`.
    pub fn with_identity(&self, identity: IdentityContext) -> Self {
        Self {
            full_method: self.full_method.clone(),
            identity: Arc::new(identity),
        }
    }
}

pub trait UnaryHandler: Send + Sync {
    fn call(&self, ctx: RequestContext, request: Message) -> BoxFuture<'static, UnaryResult>;
}

impl<F, Fut> UnaryHandler for F
where
    F: Fn(RequestContext, Message) -> Fut + Send + Sync,
    Fut: Future<Output = UnaryResult> + Send + 'static,
{
    fn call(&self, ctx: RequestContext, request: Message) -> BoxFuture<'static, UnaryResult> {
        Box::pin(self(ctx, request))
    }
}

pub trait UnaryInterceptor: Send + Sync {
    fn intercept<'a>(
        &'a self,
        ctx: RequestContext,
        request: Message,
        next: Next<'a>,
    ) -> BoxFuture<'a, UnaryResult>;
}

/// The rest of the chain after the current interceptor.
pub struct Next<'a> {
    rest: &'a [Arc<dyn UnaryInterceptor>],
    handler: &'a dyn UnaryHandler,
}

impl<'a> Next<'a> {
    pub fn run(self, ctx: RequestContext, request: Message) -> BoxFuture<'a, UnaryResult> {
        match self.rest.split_first() {
            Some((first, rest)) => first.intercept(
                ctx,
                request,
                Next {
                    rest,
                    handler: self.handler,
                },
            ),
            None => self.handler.call(ctx, request),
        }
    }
}

#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn UnaryInterceptor>>,
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, interceptor: impl UnaryInterceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub async fn run(
        &self,
        ctx: RequestContext,
        request: Message,
        handler: &dyn UnaryHandler,
    ) -> UnaryResult {
        Next {
            rest: &self.interceptors,
            handler,
        }
        .run(ctx, request)
        .await
    }

    /// Run a tonic unary call through the chain.
    ///
    /// The caller's identity is read from the request extensions, where the
    /// authentication interceptor stored it; a request without one runs as the
    /// empty identity.
    pub async fn unary<T, R, H, Fut>(
        &self,
        full_method: &str,
        request: tonic::Request<T>,
        handler: H,
    ) -> Result<tonic::Response<R>, Status>
    where
        T: Send + Sync + 'static,
        R: Send + 'static,
        H: Fn(RequestContext, Arc<T>) -> Fut + Send + Sync,
        Fut: Future<Output = Result<R, Status>> + Send + 'static,
    {
        let identity = request
            .extensions()
            .get::<IdentityContext>()
            .cloned()
            .unwrap_or_default();
        let ctx = RequestContext::new(full_method, identity);
        let message: Message = Arc::new(request.into_inner());

        let typed = |ctx: RequestContext, message: Message| -> BoxFuture<'static, UnaryResult> {
            match message.downcast::<T>() {
                Ok(request) => {
                    let reply = handler(ctx, request);
                    Box::pin(async move { reply.await.map(|r| Box::new(r) as Reply) })
                }
                Err(_) => Box::pin(async { Err::<Reply, _>(Status::invalid_argument("unexpected request type")) }),
            }
        };

        let reply = self.run(ctx, message, &typed).await?;
        reply
            .downcast::<R>()
            .map(|r| tonic::Response::new(*r))
            .map_err(|_| Status::internal("unexpected response type"))
    }
}

/* src/middleware.rs */

use axum::{
    extract::{ConnectInfo, FromRequestParts, OptionalFromRequestParts, Request},
    http::{StatusCode, request::Parts},
    response::Response,
};
use futures_util::future::BoxFuture;
use std::{
    convert::Infallible,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    task::{Context, Poll},
};
use tower::{Layer, Service};
use tracing::debug;

use crate::address::Address;
use crate::strategy::{RemoteAddrStrategy, Strategy};

/// Extension that holds the client address chosen by the layer's strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub Address);

impl ClientIp {
    /// Get the IP address.
    pub fn ip(&self) -> IpAddr {
        self.0.ip()
    }

    /// Get the full address, including any zone.
    pub fn address(&self) -> &Address {
        &self.0
    }
}

/// Layer that resolves the client address of each request with a [`Strategy`].
///
/// The peer address comes from `ConnectInfo<SocketAddr>`, so serve the app
/// with `into_make_service_with_connect_info::<SocketAddr>()`. When the
/// strategy finds no trustworthy address, no extension is inserted.
///
/// # Examples
///
/// ```rust,no_run
/// use axum::{Router, routing::get};
/// use real_client_ip::{
///     ChainStrategy, ClientIp, ClientIpLayer, RemoteAddrStrategy, RightmostNonPrivateStrategy,
/// };
///
/// async fn handler(ClientIp(addr): ClientIp) -> String {
///     addr.to_string()
/// }
///
/// let strategy = ChainStrategy::default()
///     .with(RightmostNonPrivateStrategy::new("X-Forwarded-For").unwrap())
///     .with(RemoteAddrStrategy);
///
/// let app: Router = Router::new()
///     .route("/", get(handler))
///     .layer(ClientIpLayer::new(strategy));
/// ```
#[derive(Debug, Clone)]
pub struct ClientIpLayer {
    strategy: Arc<dyn Strategy>,
}

impl Default for ClientIpLayer {
    fn default() -> Self {
        Self::new(RemoteAddrStrategy)
    }
}

impl ClientIpLayer {
    /// Create a layer with the given strategy.
    pub fn new<S: Strategy + 'static>(strategy: S) -> Self {
        Self {
            strategy: Arc::new(strategy),
        }
    }

    /// Create a layer sharing an existing strategy.
    pub fn from_shared(strategy: Arc<dyn Strategy>) -> Self {
        Self { strategy }
    }
}

impl<S> Layer<S> for ClientIpLayer {
    type Service = ClientIpService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ClientIpService {
            inner,
            strategy: Arc::clone(&self.strategy),
        }
    }
}

/// Service that resolves client addresses.
#[derive(Debug, Clone)]
pub struct ClientIpService<S> {
    inner: S,
    strategy: Arc<dyn Strategy>,
}

impl<S> Service<Request> for ClientIpService<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let remote_addr = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|connect_info| connect_info.0.to_string())
            .unwrap_or_default();

        match self.strategy.resolve(req.headers(), &remote_addr) {
            Some(addr) => {
                req.extensions_mut().insert(ClientIp(addr));
            }
            None => debug!(remote_addr = %remote_addr, "could not determine client IP"),
        }

        let future = self.inner.call(req);
        Box::pin(future)
    }
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<ClientIp>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Could not determine client IP",
        ))
    }
}

impl<S> OptionalFromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<ClientIp>().cloned())
    }
}

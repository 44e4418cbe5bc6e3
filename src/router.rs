//! [`Router`](crate::Router) dispatches hyper requests to handlers.
//!
//! Routes are registered per method during setup:
//!
//! ```rust,no_run
//! use jumprouter::{Router, PathParams};
//! use hyper::{Request, Response, Body, Error};
//!
//! async fn index(_: Request<Body>) -> Result<Response<Body>, Error> {
//!     Ok(Response::new("Hello, World!".into()))
//! }
//!
//! async fn hello(req: Request<Body>) -> Result<Response<Body>, Error> {
//!     let user = req.extensions().get::<PathParams>().and_then(|p| p.get("user")).unwrap_or("");
//!     Ok(Response::new(format!("Hello, {}", user).into()))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut router = Router::default();
//!     router.get("/", index)?;
//!     router.get("/hello/:user", hello)?;
//!
//!     hyper::Server::bind(&([127, 0, 0, 1], 3000).into())
//!         .serve(router.into_service())
//!         .await?;
//!     Ok(())
//! }
//!```
//!
//! The registered path, against which the router matches incoming requests, can
//! contain two types of parameters:
//! ```ignore
//!  Syntax    Type
//!  :name     named parameter
//!  *name     wildcard parameter
//! ```
//!
//! Named parameters match exactly one path segment, possibly empty:
//! ```ignore
//!  Path: /blog/:category/:post
//!
//!   /blog/rust/request-routers            match: category="rust", post="request-routers"
//!   /blog/rust/                           match: category="rust", post=""
//!   /blog/rust/request-routers/comments   no match
//! ```
//!
//! Wildcard parameters match the rest of the path, `/` included, and must be
//! the last element of the pattern:
//! ```ignore
//!  Path: /files/*filepath
//!
//!   /files                              match, filepath not set
//!   /files/                             match: filepath=""
//!   /files/LICENSE                      match: filepath="LICENSE"
//!   /files/templates/article.html       match: filepath="templates/article.html"
//! ```
//!
//! Handlers find the captured values in the request extensions as
//! [`PathParams`](crate::PathParams). That is an owned copy, since the handler
//! future outlives the lookup, so only direct [`RouteTable`](crate::RouteTable)
//! users read parameters straight out of the pooled buffers.
use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::future::{self, BoxFuture};
use futures_util::ready;
use hyper::header::{self, HeaderName, HeaderValue};
use hyper::service::Service;
use hyper::{Body, Method, Request, Response, StatusCode};
use tracing::{error, trace};

use crate::config::Config;
use crate::error::RouteError;
use crate::params::ParamsPool;
use crate::path::clean;
use crate::table::{Match, RouteTable};

/// Router dispatches requests to different handlers via configurable routes.
pub struct Router {
    table: RouteTable<Box<dyn Handler>>,
    config: Config,
    global_options: Option<Box<dyn Handler>>,
    not_found: Option<Box<dyn Handler>>,
    method_not_allowed: Option<Box<dyn Handler>>,
}

impl Router {
    pub fn new(config: Config) -> Self {
        let pool = Arc::new(ParamsPool::new(config.max_idle_params));
        Self::with_pool(config, pool)
    }

    /// Creates a router whose parameter buffers come from `pool`.
    pub fn with_pool(config: Config, pool: Arc<ParamsPool>) -> Self {
        Router {
            table: RouteTable::with_pool(pool),
            config,
            global_options: None,
            not_found: None,
            method_not_allowed: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registers a handler for `path` under `method`.
    ///
    /// An invalid pattern panics when `Config::strict` is set, and is
    /// returned as an error otherwise.
    /// ```rust
    /// use jumprouter::{Config, RouteError, Router};
    /// use hyper::{Response, Body, Method};
    ///
    /// let mut router = Router::new(Config::default().strict(false));
    /// router.add_route(Method::GET, "/teapot", |_| async {
    ///     Ok(Response::new(Body::from("I am a teapot!")))
    /// }).unwrap();
    ///
    /// let err = router.add_route(Method::GET, "/a/*b/*c", |_| async {
    ///     Ok(Response::new(Body::empty()))
    /// });
    /// assert!(matches!(err, Err(RouteError::TooManyWildcards { .. })));
    /// ```
    pub fn add_route(
        &mut self,
        method: Method,
        path: &str,
        handler: impl Handler + 'static,
    ) -> Result<(), RouteError> {
        match self.table.insert(method, path, Box::new(handler)) {
            Err(err) if self.config.strict => {
                error!(error = %err, "invalid route");
                panic!("{}", err);
            }
            res => res,
        }
    }

    /// Register a handler for `GET` requests
    pub fn get(&mut self, path: &str, handler: impl Handler + 'static) -> Result<(), RouteError> {
        self.add_route(Method::GET, path, handler)
    }

    /// Register a handler for `HEAD` requests
    pub fn head(&mut self, path: &str, handler: impl Handler + 'static) -> Result<(), RouteError> {
        self.add_route(Method::HEAD, path, handler)
    }

    /// Register a handler for `OPTIONS` requests
    pub fn options(&mut self, path: &str, handler: impl Handler + 'static) -> Result<(), RouteError> {
        self.add_route(Method::OPTIONS, path, handler)
    }

    /// Register a handler for `POST` requests
    pub fn post(&mut self, path: &str, handler: impl Handler + 'static) -> Result<(), RouteError> {
        self.add_route(Method::POST, path, handler)
    }

    /// Register a handler for `PUT` requests
    pub fn put(&mut self, path: &str, handler: impl Handler + 'static) -> Result<(), RouteError> {
        self.add_route(Method::PUT, path, handler)
    }

    /// Register a handler for `PATCH` requests
    pub fn patch(&mut self, path: &str, handler: impl Handler + 'static) -> Result<(), RouteError> {
        self.add_route(Method::PATCH, path, handler)
    }

    /// Register a handler for `DELETE` requests
    pub fn delete(&mut self, path: &str, handler: impl Handler + 'static) -> Result<(), RouteError> {
        self.add_route(Method::DELETE, path, handler)
    }

    /// An optional handler that is called on automatic `OPTIONS` requests.
    /// The handler is only called if `handle_options` is true and no `OPTIONS`
    /// handler for the specific path was set.
    pub fn global_options(mut self, handler: impl Handler + 'static) -> Self {
        self.global_options = Some(Box::new(handler));
        self
    }

    /// Configurable handler which is called when no matching route is
    /// found. Without one the router answers with an empty 404.
    pub fn not_found(mut self, handler: impl Handler + 'static) -> Self {
        self.not_found = Some(Box::new(handler));
        self
    }

    /// A configurable handler which is called when a request
    /// cannot be routed and `handle_method_not_allowed` is true.
    pub fn method_not_allowed(mut self, handler: impl Handler + 'static) -> Self {
        self.method_not_allowed = Some(Box::new(handler));
        self
    }

    /// Lookup allows the manual lookup of the handler for a specific method and path.
    ///
    /// `HEAD` requests fall back to the `GET` routes when
    /// `Config::head_to_get` is set.
    /// ```rust
    /// use jumprouter::Router;
    /// use hyper::{Response, Body, Method};
    ///
    /// let mut router = Router::default();
    /// router.get("/home/:section", |_| async {
    ///     Ok(Response::new(Body::from("Welcome!")))
    /// }).unwrap();
    ///
    /// let res = router.lookup(&Method::GET, "/home/news").unwrap();
    /// assert_eq!(res.params.get("section"), Some("news"));
    /// assert!(router.lookup(&Method::HEAD, "/home/news").is_some());
    /// ```
    pub fn lookup<'a>(
        &'a self,
        method: &Method,
        path: &'a str,
    ) -> Option<Match<'a, Box<dyn Handler>>> {
        self.table.lookup(method, path).or_else(|| {
            if self.falls_back_to_get(method) {
                self.table.lookup(&Method::GET, path)
            } else {
                None
            }
        })
    }

    fn contains(&self, method: &Method, path: &str) -> bool {
        self.table.contains(method, path)
            || (self.falls_back_to_get(method) && self.table.contains(&Method::GET, path))
    }

    fn falls_back_to_get(&self, method: &Method) -> bool {
        self.config.head_to_get && *method == Method::HEAD
    }

    /// Every registered `(method, pattern)` pair.
    pub fn routes(&self) -> impl Iterator<Item = (&Method, &str)> {
        self.table.routes()
    }

    /// Returns a list of the allowed methods for a specific path
    /// ```rust
    /// use jumprouter::Router;
    /// use hyper::{Response, Body, Method};
    ///
    /// let mut router = Router::default();
    /// router.get("/home", |_| async {
    ///     Ok(Response::new(Body::from("Welcome!")))
    /// }).unwrap();
    /// router.post("/home", |_| async {
    ///     Ok(Response::new(Body::from("Welcome!")))
    /// }).unwrap();
    ///
    /// let allowed = router.allowed("/home");
    /// assert!(allowed.contains(&"GET"));
    /// assert!(allowed.contains(&"HEAD"));
    /// assert!(allowed.contains(&"POST"));
    /// assert!(allowed.contains(&"OPTIONS"));
    /// # assert_eq!(allowed.len(), 4);
    /// ```
    pub fn allowed(&self, path: &str) -> Vec<&str> {
        let mut allowed = self
            .table
            .methods()
            .filter(|&method| method != Method::OPTIONS)
            .filter(|&method| path == "*" || self.table.contains(method, path))
            .map(Method::as_str)
            .collect::<Vec<_>>();

        if self.config.head_to_get && allowed.contains(&"GET") && !allowed.contains(&"HEAD") {
            allowed.push("HEAD");
        }

        if !allowed.is_empty() {
            allowed.push("OPTIONS");
        }

        allowed
    }
}

/// The default jumprouter configuration
impl Default for Router {
    fn default() -> Self {
        Router::new(Config::default())
    }
}

/// Something the router can dispatch a request to.
///
/// Any `Fn(Request<Body>) -> impl Future<Output = hyper::Result<Response<Body>>>`
/// that is `Send + Sync` qualifies, so plain async functions work:
/// ```rust
/// # use jumprouter::Handler;
/// # use hyper::{Request, Response, Body};
/// async fn hello(_: Request<Body>) -> Result<Response<Body>, hyper::Error> {
///     Ok(Response::new(Body::empty()))
/// }
///
/// let handler: Box<dyn Handler> = Box::new(hello);
/// ```
pub trait Handler: Send + Sync {
    fn handle(&self, req: Request<Body>) -> BoxFuture<'static, hyper::Result<Response<Body>>>;
}

impl<F, R> Handler for F
where
    F: Fn(Request<Body>) -> R + Send + Sync,
    R: Future<Output = Result<Response<Body>, hyper::Error>> + Send + 'static,
{
    fn handle(&self, req: Request<Body>) -> BoxFuture<'static, hyper::Result<Response<Body>>> {
        Box::pin(self(req))
    }
}

/// Hands every new connection a [`RouterService`] sharing the same router.
#[doc(hidden)]
pub struct MakeRouterService(RouterService);

impl<T> Service<T> for MakeRouterService {
    type Response = RouterService;
    type Error = hyper::Error;
    type Future = future::Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _: T) -> Self::Future {
        future::ok(self.0.clone())
    }
}

/// Per-connection service; each call goes through [`Router::serve`].
#[doc(hidden)]
#[derive(Clone)]
pub struct RouterService(Arc<Router>);

impl Service<Request<Body>> for RouterService {
    type Response = Response<Body>;
    type Error = hyper::Error;
    type Future = ResponseFut;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        self.0.serve(req)
    }
}

impl Router {
    /// Freezes the router behind an `Arc` and wraps it in a make-service for
    /// `hyper::Server`. To mount it inside a service of your own, call
    /// [`Router::serve`](crate::Router::serve) instead.
    /// ```rust,no_run
    /// # use jumprouter::Router;
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let router = Router::default();
    ///
    /// hyper::Server::bind(&([127, 0, 0, 1], 3030).into())
    ///     .serve(router.into_service())
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn into_service(self) -> MakeRouterService {
        MakeRouterService(RouterService(Arc::new(self)))
    }

    /// Routes a single request.
    ///
    /// The path is cleaned first when `clean_path` is set. A match copies its
    /// parameters into the request extensions as [`PathParams`](crate::PathParams)
    /// and calls the handler. Otherwise, in order: a trailing-slash redirect,
    /// the automatic `OPTIONS` answer, 405 Method Not Allowed, and finally the
    /// not found handler or an empty 404.
    /// ```rust,no_run
    /// # use jumprouter::Router;
    /// # use hyper::service::{make_service_fn, service_fn};
    /// # use hyper::{Request, Body, Server};
    /// # use std::convert::Infallible;
    /// # use std::sync::Arc;
    ///
    /// # async fn run() {
    /// let router = Arc::new(Router::default());
    ///
    /// let make_svc = make_service_fn(move |_| {
    ///     let router = router.clone();
    ///     async move {
    ///         Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
    ///             let router = router.clone();
    ///             async move { router.serve(req).await }
    ///         }))
    ///     }
    /// });
    ///
    /// let server = Server::bind(&([127, 0, 0, 1], 3000).into())
    ///     .serve(make_svc)
    ///     .await;
    /// # }
    /// ```
    pub fn serve(&self, mut req: Request<Body>) -> ResponseFut {
        let method = req.method().clone();
        let uri = req.uri().clone();
        let path = if self.config.clean_path {
            clean(uri.path())
        } else {
            Cow::Borrowed(uri.path())
        };

        if let Some(found) = self.lookup(&method, &path) {
            req.extensions_mut().insert(found.params.to_owned_params());
            return ResponseFutKind::Boxed(found.value.handle(req)).into();
        }

        if method != Method::CONNECT && path != "/" && self.config.redirect_trailing_slash {
            let alternate = match path.strip_suffix('/') {
                Some(trimmed) => trimmed.to_owned(),
                None => [&*path, "/"].concat(),
            };

            if self.contains(&method, &alternate) {
                let code = match method {
                    // Moved Permanently, request with GET method
                    Method::GET => StatusCode::MOVED_PERMANENTLY,
                    // Permanent Redirect, request with same method
                    _ => StatusCode::PERMANENT_REDIRECT,
                };
                trace!(%method, from = %path, to = %alternate, "trailing slash redirect");
                return ResponseFutKind::Redirect(alternate, code).into();
            }
        }

        if method == Method::OPTIONS && self.config.handle_options {
            let allow = self.allowed(&path);

            if !allow.is_empty() {
                return match self.global_options {
                    Some(ref handler) => ResponseFutKind::Boxed(handler.handle(req)).into(),
                    None => ResponseFutKind::Options(allow.join(", ")).into(),
                };
            }
        } else if self.config.handle_method_not_allowed {
            let allow = self.allowed(&path);

            if !allow.is_empty() {
                trace!(%method, path = %path, "method not allowed");
                return match self.method_not_allowed {
                    Some(ref handler) => ResponseFutKind::Boxed(handler.handle(req)).into(),
                    None => ResponseFutKind::MethodNotAllowed(allow.join(", ")).into(),
                };
            }
        }

        match self.not_found {
            Some(ref handler) => ResponseFutKind::Boxed(handler.handle(req)).into(),
            None => ResponseFutKind::NotFound.into(),
        }
    }
}

pub struct ResponseFut {
    kind: ResponseFutKind,
}

impl From<ResponseFutKind> for ResponseFut {
    fn from(kind: ResponseFutKind) -> Self {
        Self { kind }
    }
}

enum ResponseFutKind {
    Boxed(BoxFuture<'static, hyper::Result<Response<Body>>>),
    Redirect(String, StatusCode),
    MethodNotAllowed(String),
    Options(String),
    NotFound,
}

impl Future for ResponseFut {
    type Output = hyper::Result<Response<Body>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let ready = match self.kind {
            ResponseFutKind::Boxed(ref mut fut) => ready!(fut.as_mut().poll(cx)),
            ResponseFutKind::Redirect(ref path, code) => {
                Ok(empty_response(code, Some((header::LOCATION, path.as_str()))))
            }
            ResponseFutKind::NotFound => Ok(empty_response(StatusCode::NOT_FOUND, None)),
            ResponseFutKind::Options(ref allowed) => {
                Ok(empty_response(StatusCode::OK, Some((header::ALLOW, allowed.as_str()))))
            }
            ResponseFutKind::MethodNotAllowed(ref allowed) => Ok(empty_response(
                StatusCode::METHOD_NOT_ALLOWED,
                Some((header::ALLOW, allowed.as_str())),
            )),
        };

        Poll::Ready(ready)
    }
}

fn empty_response(status: StatusCode, header: Option<(HeaderName, &str)>) -> Response<Body> {
    let mut res = Response::new(Body::empty());
    *res.status_mut() = status;
    if let Some((name, value)) = header {
        if let Ok(value) = HeaderValue::from_str(value) {
            res.headers_mut().insert(name, value);
        }
    }
    res
}

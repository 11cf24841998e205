//! Route declarations.
//!
//! A [`Route`] binds an optional method and a [`SegmentChain`] to the
//! fields that validate its query, headers and body, the response it
//! promises, and the handler that produces that response.
//!
//! # Example
//!
//! ```rust
//! use ratify_core::Field;
//! use ratify_router::SegmentChain;
//! use ratify_server::{AppError, Reply, Request, ResponseSpec, Route};
//! use serde_json::{json, Value};
//!
//! let items = SegmentChain::root().literal("/items/");
//! let route = Route::get(items.capture("id", Field::number()))
//!     .response(ResponseSpec::data(Field::object([("id", Field::number())])))
//!     .handler(|req: Request<Value>| async move {
//!         Ok::<_, AppError>(Reply::new(json!({"id": req.path_params["id"]})))
//!     });
//!
//! assert_eq!(route.chain().pattern(), "/items/{id}");
//! assert!(route.matches(&http::Method::GET, "/items/3").is_some());
//! assert!(route.matches(&http::Method::POST, "/items/3").is_none());
//! ```

use std::fmt;
use std::future::Future;

use http::{Method, StatusCode};
use indexmap::IndexMap;
use ratify_core::{Field, SpecUnion};
use ratify_router::{PathParams, SegmentChain};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::config::StatusDefault;
use crate::handler::{erase, AppError, ErasedHandler, Reply, Request, RequestTypes};

/// Errors raised while declaring responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// Two variants declare the same status.
    #[error("response status {0} is declared more than once")]
    DuplicateStatus(StatusCode),

    /// A multi-variant response without any variant.
    #[error("a response needs at least one variant")]
    NoVariants,
}

/// Fields validating the parts of an incoming request.
///
/// A part without a field is not read and reaches the handler as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestSpec {
    /// Field for the decoded query string.
    pub query: Option<Field>,
    /// Field for the headers, keyed by lowercase name.
    pub headers: Option<Field>,
    /// Field for the deserialized body.
    pub data: Option<Field>,
}

/// One status a route may answer with.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseVariant {
    status: StatusCode,
    data: Option<Field>,
    headers: Option<Field>,
    description: Option<String>,
}

impl ResponseVariant {
    /// Creates a variant for `status` with no data or headers.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            data: None,
            headers: None,
            description: None,
        }
    }

    /// Creates a `200 OK` variant.
    #[must_use]
    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// Sets the field serializing the response data.
    #[must_use]
    pub fn data(mut self, spec: impl Into<SpecUnion>) -> Self {
        self.data = Some(spec.into().into_field());
        self
    }

    /// Sets the field serializing the response headers.
    #[must_use]
    pub fn headers(mut self, spec: impl Into<SpecUnion>) -> Self {
        self.headers = Some(spec.into().into_field());
        self
    }

    /// Attaches a description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the data field, if any.
    #[must_use]
    pub fn data_field(&self) -> Option<&Field> {
        self.data.as_ref()
    }

    /// Returns the headers field, if any.
    #[must_use]
    pub fn headers_field(&self) -> Option<&Field> {
        self.headers.as_ref()
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// The response a route promises.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseSpec {
    /// One shape for every status the handler picks.
    Single(ResponseVariant),
    /// A shape per status; other statuses are faults.
    Variants(IndexMap<StatusCode, ResponseVariant>),
}

impl ResponseSpec {
    /// A `200 OK` response with no body.
    #[must_use]
    pub fn empty() -> Self {
        Self::Single(ResponseVariant::ok())
    }

    /// A `200 OK` response carrying data described by `spec`.
    #[must_use]
    pub fn data(spec: impl Into<SpecUnion>) -> Self {
        Self::Single(ResponseVariant::ok().data(spec))
    }

    /// A single-variant response.
    #[must_use]
    pub fn single(variant: ResponseVariant) -> Self {
        Self::Single(variant)
    }

    /// A response with one variant per status.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::DuplicateStatus`] if two variants share a
    /// status, or [`RouteError::NoVariants`] if none is given.
    pub fn variants(variants: impl IntoIterator<Item = ResponseVariant>) -> Result<Self, RouteError> {
        let mut by_status = IndexMap::new();
        for variant in variants {
            let status = variant.status();
            if by_status.insert(status, variant).is_some() {
                return Err(RouteError::DuplicateStatus(status));
            }
        }
        if by_status.is_empty() {
            return Err(RouteError::NoVariants);
        }
        Ok(Self::Variants(by_status))
    }

    /// Iterates over the declared variants.
    pub fn iter(&self) -> impl Iterator<Item = &ResponseVariant> {
        let (single, many) = match self {
            Self::Single(variant) => (Some(variant), None),
            Self::Variants(map) => (None, Some(map.values())),
        };
        single.into_iter().chain(many.into_iter().flatten())
    }

    /// Picks the status and variant for a handler reply.
    ///
    /// `chosen` is the handler's explicit status; when absent, `rule`
    /// decides. Returns the status that matched no variant as the error.
    pub(crate) fn resolve(
        &self,
        chosen: Option<StatusCode>,
        rule: StatusDefault,
        has_data: bool,
    ) -> Result<(StatusCode, &ResponseVariant), StatusCode> {
        let status = chosen.unwrap_or_else(|| match rule {
            StatusDefault::FromBody {
                with_data,
                without_data,
            } => {
                if has_data {
                    with_data
                } else {
                    without_data
                }
            }
            StatusDefault::Declared => self.declared_status(),
        });

        match self {
            Self::Single(variant) => Ok((status, variant)),
            Self::Variants(map) => map.get(&status).map(|v| (status, v)).ok_or(status),
        }
    }

    fn declared_status(&self) -> StatusCode {
        match self {
            Self::Single(variant) => variant.status(),
            Self::Variants(map) => map
                .first()
                .map_or(StatusCode::OK, |(status, _)| *status),
        }
    }
}

impl Default for ResponseSpec {
    fn default() -> Self {
        Self::empty()
    }
}

/// A routable endpoint.
#[derive(Clone)]
pub struct Route {
    method: Option<Method>,
    chain: SegmentChain,
    request: RequestSpec,
    response: ResponseSpec,
    pub(crate) handler: ErasedHandler,
}

macro_rules! method_constructors {
    ($($(#[$doc:meta])* $name:ident => $method:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(chain: SegmentChain) -> RouteBuilder {
                RouteBuilder::new(Some(Method::$method), chain)
            }
        )*
    };
}

impl Route {
    method_constructors! {
        /// Starts a `GET` route.
        get => GET;
        /// Starts a `HEAD` route.
        head => HEAD;
        /// Starts a `POST` route.
        post => POST;
        /// Starts a `PUT` route.
        put => PUT;
        /// Starts a `DELETE` route.
        delete => DELETE;
        /// Starts a `CONNECT` route.
        connect => CONNECT;
        /// Starts an `OPTIONS` route.
        options => OPTIONS;
        /// Starts a `TRACE` route.
        trace => TRACE;
        /// Starts a `PATCH` route.
        patch => PATCH;
    }

    /// Starts a route matching every method.
    pub fn any(chain: SegmentChain) -> RouteBuilder {
        RouteBuilder::new(None, chain)
    }

    /// Starts a route for an arbitrary method.
    pub fn with_method(method: Method, chain: SegmentChain) -> RouteBuilder {
        RouteBuilder::new(Some(method), chain)
    }

    /// Returns the method, or `None` for any method.
    #[must_use]
    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    /// Returns the segment chain.
    #[must_use]
    pub fn chain(&self) -> &SegmentChain {
        &self.chain
    }

    /// Returns the request fields.
    #[must_use]
    pub fn request_spec(&self) -> &RequestSpec {
        &self.request
    }

    /// Returns the promised response.
    #[must_use]
    pub fn response_spec(&self) -> &ResponseSpec {
        &self.response
    }

    /// Matches a method and path, returning the captured parameters.
    #[must_use]
    pub fn matches(&self, method: &Method, path: &str) -> Option<PathParams> {
        if self.method.as_ref().is_some_and(|m| m != method) {
            return None;
        }
        self.chain.match_path(path).ok()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("chain", &self.chain)
            .field("request", &self.request)
            .field("response", &self.response)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Route`]; finished by [`handler`](RouteBuilder::handler).
#[derive(Debug, Clone)]
#[must_use = "a route builder does nothing until a handler is attached"]
pub struct RouteBuilder {
    method: Option<Method>,
    chain: SegmentChain,
    request: RequestSpec,
    response: ResponseSpec,
}

impl RouteBuilder {
    fn new(method: Option<Method>, chain: SegmentChain) -> Self {
        Self {
            method,
            chain,
            request: RequestSpec::default(),
            response: ResponseSpec::default(),
        }
    }

    /// Validates the query string with `spec`.
    pub fn query(mut self, spec: impl Into<SpecUnion>) -> Self {
        self.request.query = Some(spec.into().into_field());
        self
    }

    /// Validates the headers with `spec`.
    pub fn headers(mut self, spec: impl Into<SpecUnion>) -> Self {
        self.request.headers = Some(spec.into().into_field());
        self
    }

    /// Reads the body and validates it with `spec`.
    pub fn data(mut self, spec: impl Into<SpecUnion>) -> Self {
        self.request.data = Some(spec.into().into_field());
        self
    }

    /// Declares the response.
    pub fn response(mut self, response: ResponseSpec) -> Self {
        self.response = response;
        self
    }

    /// Attaches the handler and finishes the route.
    pub fn handler<P, Q, D, H, RD, RH, F, Fut>(self, handler: F) -> Route
    where
        P: DeserializeOwned + Send + 'static,
        Q: DeserializeOwned + Send + 'static,
        D: DeserializeOwned + Send + 'static,
        H: DeserializeOwned + Send + 'static,
        RD: Serialize + Send + 'static,
        RH: Serialize + Send + 'static,
        F: Fn(Request<P, Q, D, H>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Reply<RD, RH>, AppError>> + Send + 'static,
    {
        let types = RequestTypes::for_route(&self.chain, &self.request);
        Route {
            method: self.method,
            chain: self.chain,
            request: self.request,
            response: self.response,
            handler: erase(types, handler),
        }
    }
}

/// Several routes sharing one segment chain.
///
/// # Example
///
/// ```rust
/// use ratify_router::SegmentChain;
/// use ratify_server::{AppError, Reply, Request, Resource};
///
/// let routes = Resource::new(SegmentChain::root().literal("/ping"))
///     .get(|route| route.handler(|_: Request| async { Ok::<_, AppError>(Reply::empty()) }))
///     .delete(|route| route.handler(|_: Request| async { Ok::<_, AppError>(Reply::empty()) }))
///     .into_routes();
///
/// assert_eq!(routes.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Resource {
    chain: SegmentChain,
    routes: IndexMap<Option<Method>, Route>,
}

impl Resource {
    /// Starts a resource at `chain`.
    #[must_use]
    pub fn new(chain: SegmentChain) -> Self {
        Self {
            chain,
            routes: IndexMap::new(),
        }
    }

    /// Adds the route for `method`, replacing an earlier one.
    #[must_use]
    pub fn on(mut self, method: Method, build: impl FnOnce(RouteBuilder) -> Route) -> Self {
        let route = build(Route::with_method(method.clone(), self.chain.clone()));
        self.routes.insert(Some(method), route);
        self
    }

    /// Adds a route for every method.
    #[must_use]
    pub fn any(mut self, build: impl FnOnce(RouteBuilder) -> Route) -> Self {
        let route = build(Route::any(self.chain.clone()));
        self.routes.insert(None, route);
        self
    }

    /// Adds the `GET` route.
    #[must_use]
    pub fn get(self, build: impl FnOnce(RouteBuilder) -> Route) -> Self {
        self.on(Method::GET, build)
    }

    /// Adds the `POST` route.
    #[must_use]
    pub fn post(self, build: impl FnOnce(RouteBuilder) -> Route) -> Self {
        self.on(Method::POST, build)
    }

    /// Adds the `PUT` route.
    #[must_use]
    pub fn put(self, build: impl FnOnce(RouteBuilder) -> Route) -> Self {
        self.on(Method::PUT, build)
    }

    /// Adds the `PATCH` route.
    #[must_use]
    pub fn patch(self, build: impl FnOnce(RouteBuilder) -> Route) -> Self {
        self.on(Method::PATCH, build)
    }

    /// Adds the `DELETE` route.
    #[must_use]
    pub fn delete(self, build: impl FnOnce(RouteBuilder) -> Route) -> Self {
        self.on(Method::DELETE, build)
    }

    /// Returns the shared chain.
    #[must_use]
    pub fn chain(&self) -> &SegmentChain {
        &self.chain
    }

    /// Returns the routes in declaration order.
    ///
    /// A method-less route is tried after the method-specific ones.
    #[must_use]
    pub fn into_routes(mut self) -> Vec<Route> {
        let fallback = self.routes.shift_remove(&None);
        self.routes.into_values().chain(fallback).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratify_core::FieldKind;
    use serde_json::json;

    fn noop(builder: RouteBuilder) -> Route {
        builder.handler(|_: Request| async { Ok::<_, AppError>(Reply::empty()) })
    }

    fn items() -> SegmentChain {
        SegmentChain::root().literal("/items")
    }

    #[test]
    fn test_method_constructors() {
        assert_eq!(noop(Route::get(items())).method(), Some(&Method::GET));
        assert_eq!(noop(Route::head(items())).method(), Some(&Method::HEAD));
        assert_eq!(noop(Route::patch(items())).method(), Some(&Method::PATCH));
        assert_eq!(noop(Route::trace(items())).method(), Some(&Method::TRACE));
        assert_eq!(noop(Route::any(items())).method(), None);

        let custom = Method::from_bytes(b"PURGE").unwrap();
        assert_eq!(noop(Route::with_method(custom.clone(), items())).method(), Some(&custom));
    }

    #[test]
    fn test_matches_method_and_path() {
        let route = noop(Route::put(items().literal("/").capture("id", Field::number())));

        let params = route.matches(&Method::PUT, "/items/12").unwrap();
        assert_eq!(params.get("id"), Some(&json!(12)));

        assert!(route.matches(&Method::GET, "/items/12").is_none());
        assert!(route.matches(&Method::PUT, "/items/x").is_none());
        assert!(route.matches(&Method::PUT, "/items/12/extra").is_none());
    }

    #[test]
    fn test_any_matches_every_method() {
        let route = noop(Route::any(items()));
        assert!(route.matches(&Method::DELETE, "/items").is_some());
        assert!(route.matches(&Method::OPTIONS, "/items").is_some());
    }

    #[test]
    fn test_builder_records_request_spec() {
        let route = noop(
            Route::post(items())
                .query(SpecUnion::record([("page", Field::number().optional().into())]))
                .headers(Field::object([("x-token", Field::string())]))
                .data(Field::object([("title", Field::string())])),
        );

        let spec = route.request_spec();
        assert!(matches!(spec.query.as_ref().map(Field::kind), Some(FieldKind::Object(_))));
        assert!(spec.headers.is_some());
        assert!(spec.data.is_some());
    }

    #[test]
    fn test_default_response_is_empty_ok() {
        let route = noop(Route::get(items()));
        assert_eq!(route.response_spec(), &ResponseSpec::empty());
    }

    #[test]
    fn test_variants_reject_duplicates() {
        let err = ResponseSpec::variants([
            ResponseVariant::ok(),
            ResponseVariant::new(StatusCode::NOT_FOUND),
            ResponseVariant::ok().describe("again"),
        ])
        .unwrap_err();
        assert_eq!(err, RouteError::DuplicateStatus(StatusCode::OK));

        assert_eq!(ResponseSpec::variants([]).unwrap_err(), RouteError::NoVariants);
    }

    #[test]
    fn test_resolve_single() {
        let spec = ResponseSpec::single(ResponseVariant::new(StatusCode::CREATED).data(Field::string()));

        let (status, variant) = spec.resolve(None, StatusDefault::Declared, true).unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(variant.data_field().is_some());

        let (status, _) = spec.resolve(Some(StatusCode::ACCEPTED), StatusDefault::Declared, true).unwrap();
        assert_eq!(status, StatusCode::ACCEPTED);
    }

    #[test]
    fn test_resolve_from_body_rule() {
        let spec = ResponseSpec::empty();
        let rule = StatusDefault::legacy();

        assert_eq!(spec.resolve(None, rule, true).unwrap().0, StatusCode::OK);
        assert_eq!(spec.resolve(None, rule, false).unwrap().0, StatusCode::CREATED);
    }

    #[test]
    fn test_resolve_variants() {
        let spec = ResponseSpec::variants([
            ResponseVariant::ok().data(Field::string()),
            ResponseVariant::new(StatusCode::NOT_FOUND).describe("missing"),
        ])
        .unwrap();

        let (status, variant) = spec.resolve(None, StatusDefault::Declared, true).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(variant.data_field().is_some());

        let (_, variant) = spec
            .resolve(Some(StatusCode::NOT_FOUND), StatusDefault::Declared, false)
            .unwrap();
        assert_eq!(variant.description(), Some("missing"));

        assert_eq!(
            spec.resolve(Some(StatusCode::IM_A_TEAPOT), StatusDefault::Declared, false),
            Err(StatusCode::IM_A_TEAPOT)
        );
    }

    #[test]
    fn test_response_iter() {
        assert_eq!(ResponseSpec::empty().iter().count(), 1);
        let spec = ResponseSpec::variants([
            ResponseVariant::ok(),
            ResponseVariant::new(StatusCode::GONE),
        ])
        .unwrap();
        let statuses: Vec<_> = spec.iter().map(ResponseVariant::status).collect();
        assert_eq!(statuses, vec![StatusCode::OK, StatusCode::GONE]);
    }

    #[test]
    fn test_resource_expands_in_order() {
        let routes = Resource::new(items())
            .any(noop)
            .get(noop)
            .post(noop)
            .get(|b| noop(b.query(Field::wildcard_object())))
            .into_routes();

        let methods: Vec<_> = routes.iter().map(Route::method).collect();
        assert_eq!(methods, vec![Some(&Method::GET), Some(&Method::POST), None]);
        assert!(routes[0].request_spec().query.is_some());
        assert!(routes.iter().all(|r| r.chain().pattern() == "/items"));
    }

    #[test]
    fn test_response_variant_headers() {
        let variant = ResponseVariant::new(StatusCode::CREATED)
            .headers(SpecUnion::record([("location", Field::string().into())]));
        let field = variant.headers_field().unwrap();
        assert_eq!(
            field.serialize(&json!({"location": "/items/1", "x": 1})),
            json!({"location": "/items/1"})
        );
    }
}

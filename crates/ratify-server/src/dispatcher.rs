//! Request dispatch.
//!
//! The [`Dispatcher`] owns the route table and the configuration, and turns
//! one incoming request into one [`Outcome`]:
//!
//! 1. The first route whose method and segment chain match is selected;
//!    none gives `404`.
//! 2. The query is decoded and validated, then the headers, then the body
//!    (read only when the route declares a data field). A rejection gives
//!    the validation error status with a description of the failure.
//! 3. The handler runs with the validated values.
//! 4. The reply's status selects a response variant, whose fields
//!    serialize the reply headers and data.
//!
//! Handler errors and internal faults are classified as described on
//! [`AppError`] and [`DispatchFault`]. Unexpected ones are handed to the
//! configured reporting hook exactly once.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::FutureExt;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use ratify_core::{Field, FieldKind};
use ratify_router::PathParams;
use serde_json::{json, Map, Value};
use tracing::Instrument;

use crate::config::ServerConfig;
use crate::error::{DispatchFault, ReportedError, RequestPart, ValidationFailure};
use crate::handler::{AppError, HandlerFailure, RawReply, RawRequest};
use crate::query::parse_query;
use crate::route::Route;
use crate::transport::{IncomingRequest, OutgoingResponse, ResponseWriter};

/// How a request was concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// No route matched.
    NotFound,
    /// Request input was rejected.
    ValidationFailed,
    /// The handler succeeded.
    Handled,
    /// The handler returned an error.
    HandlerFailed,
    /// The dispatcher itself failed.
    Fault,
}

impl Disposition {
    /// Returns a short label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::ValidationFailed => "validation_failed",
            Self::Handled => "handled",
            Self::HandlerFailed => "handler_failed",
            Self::Fault => "fault",
        }
    }
}

/// The response produced for one request.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Response status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body; `None` writes no body.
    pub body: Option<Bytes>,
    /// How the request was concluded.
    pub disposition: Disposition,
}

impl Outcome {
    fn bare(status: StatusCode, disposition: Disposition) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: None,
            disposition,
        }
    }

    /// Writes the outcome to a response sink.
    pub fn write_to<W: OutgoingResponse>(self, mut out: W) -> W::Output {
        out.set_status(self.status);
        for (name, value) in &self.headers {
            out.append_header(name.clone(), value.clone());
        }
        if let Some(body) = &self.body {
            out.write_body(body);
        }
        out.end()
    }

    /// Converts the outcome into an HTTP response.
    #[must_use]
    pub fn into_response(self) -> http::Response<http_body_util::Full<Bytes>> {
        self.write_to(ResponseWriter::new())
    }
}

enum Failure {
    Validation(ValidationFailure),
    App(AppError),
    Fault(DispatchFault),
}

impl From<HandlerFailure> for Failure {
    fn from(failure: HandlerFailure) -> Self {
        match failure {
            HandlerFailure::App(err) => Self::App(err),
            HandlerFailure::Fault(fault) => Self::Fault(fault),
        }
    }
}

impl From<DispatchFault> for Failure {
    fn from(fault: DispatchFault) -> Self {
        Self::Fault(fault)
    }
}

/// Matches requests against routes and runs the request lifecycle.
///
/// Cloning is cheap; clones share the route table.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    routes: Arc<[Route]>,
    config: ServerConfig,
}

impl Dispatcher {
    /// Creates a dispatcher over `routes`, tried in order.
    pub fn new(config: ServerConfig, routes: impl IntoIterator<Item = Route>) -> Self {
        Self {
            routes: routes.into_iter().collect(),
            config,
        }
    }

    /// Returns the routes in match order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Finds the first route matching `method` and `path`.
    #[must_use]
    pub fn find_route(&self, method: &Method, path: &str) -> Option<(&Route, PathParams)> {
        self.routes
            .iter()
            .find_map(|route| route.matches(method, path).map(|params| (route, params)))
    }

    /// Runs one request through the lifecycle.
    ///
    /// Never fails: every error becomes an outcome with the appropriate
    /// status.
    pub async fn dispatch<R: IncomingRequest>(&self, request: R) -> Outcome {
        let method = request.method().clone();
        let uri = request.uri().clone();
        let span = tracing::debug_span!(
            "dispatch",
            http.method = %method,
            http.path = %uri.path(),
            http.status_code = tracing::field::Empty,
        );

        async {
            let outcome = match self.find_route(&method, uri.path()) {
                None => {
                    tracing::debug!("no route matched");
                    Outcome::bare(StatusCode::NOT_FOUND, Disposition::NotFound)
                }
                Some((route, params)) => {
                    match self.run(route, params, request, uri.query().unwrap_or("")).await {
                        Ok(outcome) => outcome,
                        Err(failure) => self.classify(failure).await,
                    }
                }
            };

            tracing::Span::current().record("http.status_code", outcome.status.as_u16());
            tracing::debug!(disposition = outcome.disposition.as_str(), "request dispatched");
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run<R: IncomingRequest>(
        &self,
        route: &Route,
        params: PathParams,
        mut request: R,
        raw_query: &str,
    ) -> Result<Outcome, Failure> {
        let spec = route.request_spec();

        let query = match &spec.query {
            Some(field) => {
                let raw = parse_query(raw_query).map_err(|e| {
                    Failure::Validation(ValidationFailure::malformed(RequestPart::Query, e, raw_query))
                })?;
                validate_part(field, RequestPart::Query, &raw)?
            }
            None => Value::Null,
        };

        let path_params = if route.chain().capture_names().next().is_some() {
            params.to_value()
        } else {
            Value::Null
        };

        let headers = match &spec.headers {
            Some(field) => validate_part(field, RequestPart::Headers, &headers_to_value(request.headers()))?,
            None => Value::Null,
        };

        let data = match &spec.data {
            Some(field) => {
                let bytes = request.read_body().await.map_err(DispatchFault::BodyRead)?;
                let raw = self.decode_body(&bytes)?;
                field.validate(&raw).map_err(|e| {
                    Failure::Validation(ValidationFailure::new(RequestPart::Body, e))
                })?
            }
            None => Value::Null,
        };

        let raw = RawRequest {
            method: request.method().clone(),
            path_params,
            query,
            data,
            headers,
        };

        let reply = AssertUnwindSafe((route.handler)(raw))
            .catch_unwind()
            .await
            .map_err(|panic| DispatchFault::Panicked(panic_message(panic.as_ref())))??;

        self.assemble(route, reply)
    }

    fn decode_body(&self, bytes: &[u8]) -> Result<Value, Failure> {
        let text = self.config.encoding().decode(bytes).map_err(|e| {
            Failure::Validation(ValidationFailure::malformed(
                RequestPart::Body,
                e,
                &String::from_utf8_lossy(bytes),
            ))
        })?;
        self.config.protocol().deserialize(&text).map_err(|e| {
            Failure::Validation(ValidationFailure::malformed(RequestPart::Body, e, &text))
        })
    }

    fn assemble(&self, route: &Route, reply: RawReply) -> Result<Outcome, Failure> {
        let (status, variant) = route
            .response_spec()
            .resolve(reply.status, self.config.status_default(), !reply.data.is_null())
            .map_err(DispatchFault::UndeclaredStatus)?;

        let mut headers = HeaderMap::new();
        let raw_headers = match variant.headers_field() {
            Some(field) => field.serialize(&reply.headers),
            None => reply.headers,
        };
        append_headers(&mut headers, &raw_headers)?;

        let body = match variant.data_field() {
            Some(field) if !matches!(field.kind(), FieldKind::Undefined) => {
                let body = self.encode(&field.serialize(&reply.data))?;
                headers.insert(CONTENT_TYPE, self.content_type()?);
                Some(body)
            }
            _ => None,
        };

        Ok(Outcome {
            status,
            headers,
            body,
            disposition: Disposition::Handled,
        })
    }

    async fn classify(&self, failure: Failure) -> Outcome {
        match failure {
            Failure::Validation(failure) => {
                tracing::debug!(
                    part = failure.part.as_str(),
                    path = %failure.error.path,
                    message = %failure.error.message,
                    "request rejected"
                );
                let body = serde_json::to_value(&failure).unwrap_or(Value::Null);
                self.with_body(self.config.validation_error_status(), Disposition::ValidationFailed, &body)
            }

            Failure::App(err) if err.is_public() => {
                let status = err.status().unwrap_or_else(|| self.config.app_error_status());
                tracing::debug!(status = status.as_u16(), reason = err.reason(), "handler refused request");
                self.with_body(status, Disposition::HandlerFailed, &json!({"reason": err.reason()}))
            }

            Failure::App(err) => {
                self.report(ReportedError::App(err)).await;
                Outcome::bare(self.config.app_error_status(), Disposition::HandlerFailed)
            }

            Failure::Fault(fault) => {
                self.report(ReportedError::Fault(fault)).await;
                Outcome::bare(self.config.framework_error_status(), Disposition::Fault)
            }
        }
    }

    /// Builds an error outcome with a body, dropping the body if it cannot
    /// be encoded.
    fn with_body(&self, status: StatusCode, disposition: Disposition, body: &Value) -> Outcome {
        let mut outcome = Outcome::bare(status, disposition);
        match (self.encode(body), self.content_type()) {
            (Ok(bytes), Ok(content_type)) => {
                outcome.headers.insert(CONTENT_TYPE, content_type);
                outcome.body = Some(bytes);
            }
            (Err(fault), _) | (_, Err(fault)) => {
                tracing::warn!(error = %fault, "failed to encode error body");
            }
        }
        outcome
    }

    async fn report(&self, err: ReportedError) {
        let hook = Arc::clone(self.config.reporter());
        match AssertUnwindSafe(async move { hook(err).await }).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(hook_err)) => {
                tracing::error!(error = %hook_err, "error reporter failed");
            }
            Err(panic) => {
                tracing::error!(panic = %panic_message(panic.as_ref()), "error reporter panicked");
            }
        }
    }

    fn encode(&self, value: &Value) -> Result<Bytes, DispatchFault> {
        let text = self.config.protocol().serialize(value)?;
        Ok(self.config.encoding().encode(&text)?)
    }

    fn content_type(&self) -> Result<HeaderValue, DispatchFault> {
        let value = format!(
            "{}; charset={}",
            self.config.protocol().media_type(),
            self.config.encoding().label()
        );
        HeaderValue::from_str(&value).map_err(|e| DispatchFault::invalid_header(CONTENT_TYPE.as_str(), e))
    }
}

fn validate_part(field: &Field, part: RequestPart, raw: &Value) -> Result<Value, Failure> {
    field
        .validate_text(raw)
        .map_err(|e| Failure::Validation(ValidationFailure::new(part, e)))
}

/// Collects headers into an object keyed by lowercase name.
///
/// Repeated headers become arrays, in arrival order.
fn headers_to_value(headers: &HeaderMap) -> Value {
    let mut out = Map::new();
    for name in headers.keys() {
        let mut values: Vec<Value> = headers
            .get_all(name)
            .iter()
            .map(|v| Value::String(String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();
        let value = if values.len() == 1 {
            values.swap_remove(0)
        } else {
            Value::Array(values)
        };
        out.insert(name.as_str().to_string(), value);
    }
    Value::Object(out)
}

fn append_headers(headers: &mut HeaderMap, raw: &Value) -> Result<(), DispatchFault> {
    let Value::Object(entries) = raw else {
        return Ok(());
    };

    for (name, value) in entries {
        let header = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| DispatchFault::invalid_header(name.as_str(), e))?;
        let values = match value {
            Value::Null => continue,
            Value::Array(items) => items.iter().collect(),
            single => vec![single],
        };
        for item in values {
            let text = match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let value = HeaderValue::from_str(&text)
                .map_err(|e| DispatchFault::invalid_header(name.as_str(), e))?;
            headers.append(header.clone(), value);
        }
    }
    Ok(())
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http_body_util::Full;
    use ratify_router::SegmentChain;
    use serde::{Deserialize, Serialize};

    use crate::config::StatusDefault;
    use crate::handler::{Reply, Request};
    use crate::protocol::TextEncoding;
    use crate::route::{ResponseSpec, ResponseVariant};

    #[derive(Debug, Deserialize)]
    struct ItemId {
        id: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct Item {
        id: i64,
        title: String,
    }

    fn item_field() -> Field {
        Field::object([("id", Field::number()), ("title", Field::string())])
    }

    fn request(method: Method, uri: &str, body: &str) -> http::Request<Full<Bytes>> {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    fn counting_config(calls: &Arc<AtomicUsize>) -> ServerConfig {
        let calls = Arc::clone(calls);
        ServerConfig::builder()
            .error_reporter(move |_err| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .build()
    }

    fn item_routes() -> Vec<Route> {
        let items = SegmentChain::root().literal("/items");
        let by_id = items.literal("/").capture("id", Field::number());
        vec![
            Route::get(by_id.clone())
                .response(ResponseSpec::data(item_field()))
                .handler(|req: Request<ItemId>| async move {
                    Ok::<_, AppError>(Reply::new(Item {
                        id: req.path_params.id,
                        title: "Milk".into(),
                    }))
                }),
            Route::post(items.clone())
                .data(Field::object([("title", Field::string())]))
                .response(ResponseSpec::single(
                    ResponseVariant::new(StatusCode::CREATED).data(item_field()),
                ))
                .handler(|req: Request<(), (), Value>| async move {
                    Ok::<_, AppError>(Reply::new(json!({"id": 1, "title": req.data["title"]})))
                }),
            Route::get(items)
                .query(Field::object([("page", Field::number().optional())]))
                .response(ResponseSpec::data(Field::wildcard_object()))
                .handler(|req: Request<(), Value>| async move {
                    Ok::<_, AppError>(Reply::new(json!({"query": req.query})))
                }),
        ]
    }

    fn body_json(outcome: &Outcome) -> Value {
        serde_json::from_slice(outcome.body.as_ref().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_not_found() {
        let dispatcher = Dispatcher::new(ServerConfig::default(), item_routes());
        let outcome = dispatcher.dispatch(request(Method::GET, "/nothing", "")).await;
        assert_eq!(outcome.status, StatusCode::NOT_FOUND);
        assert_eq!(outcome.disposition, Disposition::NotFound);
        assert!(outcome.body.is_none());
    }

    #[tokio::test]
    async fn test_rejected_capture_is_not_found() {
        let dispatcher = Dispatcher::new(ServerConfig::default(), item_routes());
        let outcome = dispatcher.dispatch(request(Method::GET, "/items/1.5", "")).await;
        assert_eq!(outcome.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_handled_with_typed_params() {
        let dispatcher = Dispatcher::new(ServerConfig::default(), item_routes());
        let outcome = dispatcher.dispatch(request(Method::GET, "/items/12", "")).await;

        assert_eq!(outcome.status, StatusCode::OK);
        assert_eq!(outcome.disposition, Disposition::Handled);
        assert_eq!(outcome.headers[CONTENT_TYPE], "application/json; charset=utf-8");
        assert_eq!(body_json(&outcome), json!({"id": 12, "title": "Milk"}));
    }

    #[tokio::test]
    async fn test_empty_optional_capture_reaches_handler() {
        #[derive(Debug, Deserialize)]
        struct Tag {
            tag: Option<String>,
        }

        let chain = SegmentChain::root()
            .literal("/tags/")
            .capture("tag", Field::string().optional());
        let route = Route::get(chain)
            .response(ResponseSpec::data(Field::string()))
            .handler(|req: Request<Tag>| async move {
                Ok::<_, AppError>(Reply::new(req.path_params.tag.unwrap_or_else(|| "all".into())))
            });
        let dispatcher = Dispatcher::new(ServerConfig::default(), [route]);

        let every = dispatcher.dispatch(request(Method::GET, "/tags/", "")).await;
        assert_eq!(every.status, StatusCode::OK);
        assert_eq!(every.disposition, Disposition::Handled);
        assert_eq!(body_json(&every), json!("all"));

        let one = dispatcher.dispatch(request(Method::GET, "/tags/rust", "")).await;
        assert_eq!(body_json(&one), json!("rust"));
    }

    #[tokio::test]
    async fn test_declared_status_and_body_validation() {
        let dispatcher = Dispatcher::new(ServerConfig::default(), item_routes());

        let created = dispatcher
            .dispatch(request(Method::POST, "/items", r#"{"title":"Eggs","extra":true}"#))
            .await;
        assert_eq!(created.status, StatusCode::CREATED);
        assert_eq!(body_json(&created), json!({"id": 1, "title": "Eggs"}));

        let rejected = dispatcher
            .dispatch(request(Method::POST, "/items", r#"{"title":3}"#))
            .await;
        assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
        assert_eq!(rejected.disposition, Disposition::ValidationFailed);
        let body = body_json(&rejected);
        assert_eq!(body["part"], "body");
        assert_eq!(body["path"], "body.title");
        assert_eq!(body["message"], "Not a string");
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let dispatcher = Dispatcher::new(ServerConfig::default(), item_routes());
        let outcome = dispatcher.dispatch(request(Method::POST, "/items", "{nope")).await;
        assert_eq!(outcome.status, StatusCode::BAD_REQUEST);
        let body = body_json(&outcome);
        assert!(body["message"].as_str().unwrap().starts_with("Malformed body"));
    }

    #[tokio::test]
    async fn test_query_coercion_and_rejection() {
        let dispatcher = Dispatcher::new(ServerConfig::default(), item_routes());

        let outcome = dispatcher.dispatch(request(Method::GET, "/items?page=3&x=1", "")).await;
        assert_eq!(outcome.status, StatusCode::OK);
        assert_eq!(body_json(&outcome), json!({"query": {"page": 3}}));

        let outcome = dispatcher.dispatch(request(Method::GET, "/items", "")).await;
        assert_eq!(body_json(&outcome), json!({"query": {}}));

        let outcome = dispatcher.dispatch(request(Method::GET, "/items?page=two", "")).await;
        assert_eq!(outcome.status, StatusCode::BAD_REQUEST);
        assert_eq!(body_json(&outcome)["path"], "query.page");
    }

    #[tokio::test]
    async fn test_public_error_not_reported() {
        let calls = Arc::new(AtomicUsize::new(0));
        let route = Route::get(SegmentChain::root().literal("/expected"))
            .handler(|_: Request| async {
                Err::<Reply, _>(AppError::public(StatusCode::from_u16(442).unwrap(), "Boom!"))
            });
        let dispatcher = Dispatcher::new(counting_config(&calls), [route]);

        let outcome = dispatcher.dispatch(request(Method::GET, "/expected", "")).await;
        assert_eq!(outcome.status.as_u16(), 442);
        assert_eq!(outcome.disposition, Disposition::HandlerFailed);
        assert_eq!(body_json(&outcome), json!({"reason": "Boom!"}));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_private_error_reported_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let route = Route::get(SegmentChain::root().literal("/unexpected"))
            .handler(|_: Request| async {
                Err::<Reply, _>(AppError::internal("secret detail").with_source(anyhow::anyhow!("db")))
            });
        let dispatcher = Dispatcher::new(counting_config(&calls), [route]);

        let outcome = dispatcher.dispatch(request(Method::GET, "/unexpected", "")).await;
        assert_eq!(outcome.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(outcome.body.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_undeclared_status_is_fault() {
        let calls = Arc::new(AtomicUsize::new(0));
        let response = ResponseSpec::variants([
            ResponseVariant::ok().data(Field::string()),
            ResponseVariant::new(StatusCode::NOT_FOUND),
        ])
        .unwrap();
        let route = Route::get(SegmentChain::root().literal("/teapot"))
            .response(response)
            .handler(|_: Request| async {
                Ok::<_, AppError>(Reply::new("tea").with_status(StatusCode::IM_A_TEAPOT))
            });
        let dispatcher = Dispatcher::new(counting_config(&calls), [route]);

        let outcome = dispatcher.dispatch(request(Method::GET, "/teapot", "")).await;
        assert_eq!(outcome.status, StatusCode::BAD_GATEWAY);
        assert_eq!(outcome.disposition, Disposition::Fault);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_handler_is_fault() {
        let route = Route::get(SegmentChain::root().literal("/panic")).handler(|_: Request| async {
            if true {
                panic!("handler exploded");
            }
            Ok::<_, AppError>(Reply::empty())
        });
        let dispatcher = Dispatcher::new(ServerConfig::default(), [route]);

        let outcome = dispatcher.dispatch(request(Method::GET, "/panic", "")).await;
        assert_eq!(outcome.status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_failing_reporter_does_not_break_request() {
        let config = ServerConfig::builder()
            .error_reporter(|_err| async { Err(anyhow::anyhow!("reporter offline")) })
            .build();
        let route = Route::get(SegmentChain::root().literal("/fail"))
            .handler(|_: Request| async { Err::<Reply, _>(AppError::internal("boom")) });
        let dispatcher = Dispatcher::new(config, [route]);

        let outcome = dispatcher.dispatch(request(Method::GET, "/fail", "")).await;
        assert_eq!(outcome.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_headers_in_and_out() {
        let route = Route::get(SegmentChain::root().literal("/echo"))
            .headers(Field::object([("x-count", Field::number())]))
            .response(ResponseSpec::single(
                ResponseVariant::ok().headers(Field::object([("x-doubled", Field::number())])),
            ))
            .handler(|req: Request<(), (), (), Value>| async move {
                let doubled = req.headers["x-count"].as_i64().unwrap_or(0) * 2;
                Ok::<_, AppError>(Reply::empty().with_headers(json!({"x-doubled": doubled, "x-dropped": "1"})))
            });
        let dispatcher = Dispatcher::new(ServerConfig::default(), [route]);

        let mut req = request(Method::GET, "/echo", "");
        req.headers_mut().insert("x-count", HeaderValue::from_static("21"));
        let outcome = dispatcher.dispatch(req).await;

        assert_eq!(outcome.status, StatusCode::OK);
        assert_eq!(outcome.headers["x-doubled"], "42");
        assert!(outcome.headers.get("x-dropped").is_none());
        assert!(outcome.body.is_none());
        assert!(outcome.headers.get(CONTENT_TYPE).is_none());
    }

    #[tokio::test]
    async fn test_missing_required_header() {
        let route = Route::get(SegmentChain::root().literal("/secure"))
            .headers(Field::object([("x-token", Field::string())]))
            .handler(|_: Request| async { Ok::<_, AppError>(Reply::empty()) });
        let dispatcher = Dispatcher::new(ServerConfig::default(), [route]);

        let outcome = dispatcher.dispatch(request(Method::GET, "/secure", "")).await;
        assert_eq!(outcome.status, StatusCode::BAD_REQUEST);
        assert_eq!(body_json(&outcome)["path"], "headers.x-token");
    }

    #[tokio::test]
    async fn test_from_body_status_rule() {
        let config = ServerConfig::builder().status_default(StatusDefault::legacy()).build();
        let route = Route::delete(SegmentChain::root().literal("/items"))
            .handler(|_: Request| async { Ok::<_, AppError>(Reply::empty()) });
        let dispatcher = Dispatcher::new(config, [route]);

        let outcome = dispatcher.dispatch(request(Method::DELETE, "/items", "")).await;
        assert_eq!(outcome.status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_latin1_round_trip() {
        let config = ServerConfig::builder().encoding(TextEncoding::Latin1).build();
        let route = Route::post(SegmentChain::root().literal("/echo"))
            .data(Field::string())
            .response(ResponseSpec::data(Field::string()))
            .handler(|req: Request<(), (), String>| async move { Ok::<_, AppError>(Reply::new(req.data)) });
        let dispatcher = Dispatcher::new(config, [route]);

        let body = http::Request::builder()
            .method(Method::POST)
            .uri("/echo")
            .body(Full::new(Bytes::from_static(b"\"caf\xe9\"")))
            .unwrap();
        let outcome = dispatcher.dispatch(body).await;

        assert_eq!(outcome.status, StatusCode::OK);
        assert_eq!(outcome.body.as_deref(), Some(&b"\"caf\xe9\""[..]));
        assert_eq!(outcome.headers[CONTENT_TYPE], "application/json; charset=iso-8859-1");
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let chain = SegmentChain::root().literal("/a");
        let first = Route::any(chain.clone())
            .response(ResponseSpec::data(Field::string()))
            .handler(|_: Request| async { Ok::<_, AppError>(Reply::new("first")) });
        let second = Route::get(chain)
            .response(ResponseSpec::data(Field::string()))
            .handler(|_: Request| async { Ok::<_, AppError>(Reply::new("second")) });
        let dispatcher = Dispatcher::new(ServerConfig::default(), [first, second]);

        let outcome = dispatcher.dispatch(request(Method::GET, "/a", "")).await;
        assert_eq!(body_json(&outcome), json!("first"));
    }

    #[test]
    fn test_outcome_into_response() {
        let mut outcome = Outcome::bare(StatusCode::ACCEPTED, Disposition::Handled);
        outcome.body = Some(Bytes::from_static(b"ok"));
        let response = outcome.into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[test]
    fn test_headers_to_value_groups_repeats() {
        let mut headers = HeaderMap::new();
        headers.append("x-tag", HeaderValue::from_static("a"));
        headers.append("x-tag", HeaderValue::from_static("b"));
        headers.insert("x-one", HeaderValue::from_static("1"));

        assert_eq!(
            headers_to_value(&headers),
            json!({"x-tag": ["a", "b"], "x-one": "1"})
        );
    }

    #[test]
    fn test_append_headers_rejects_invalid_names() {
        let mut headers = HeaderMap::new();
        let err = append_headers(&mut headers, &json!({"bad name": "x"})).unwrap_err();
        assert!(matches!(err, DispatchFault::InvalidHeader { .. }));
    }
}

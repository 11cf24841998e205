//! # Ratify Server
//!
//! Routes, handlers and the request lifecycle for Ratify services.
//!
//! - [`Route`] and [`Resource`] declare endpoints over a
//!   [`SegmentChain`](ratify_router::SegmentChain) with fields for the
//!   query, headers, body and response
//! - [`Dispatcher`] runs matching, validation, the handler and response
//!   serialization, and classifies every failure
//! - [`Server`] serves a dispatcher over HTTP/1 with graceful shutdown
//!
//! ## Example
//!
//! ```rust
//! use ratify_core::Field;
//! use ratify_router::SegmentChain;
//! use ratify_server::{AppError, Dispatcher, Reply, Request, ResponseSpec, Route, ServerConfig};
//! use serde_json::{json, Value};
//!
//! # tokio_test::block_on(async {
//! let route = Route::get(SegmentChain::root().literal("/items/").capture("id", Field::number()))
//!     .response(ResponseSpec::data(Field::object([("id", Field::number())])))
//!     .handler(|req: Request<Value>| async move {
//!         Ok::<_, AppError>(Reply::new(json!({"id": req.path_params["id"]})))
//!     });
//!
//! let dispatcher = Dispatcher::new(ServerConfig::default(), [route]);
//! let request = http::Request::get("/items/7")
//!     .body(http_body_util::Full::new(bytes::Bytes::new()))
//!     .unwrap();
//! let outcome = dispatcher.dispatch(request).await;
//! assert_eq!(outcome.status, http::StatusCode::OK);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/ratify-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod dispatcher;
mod error;
mod handler;
mod protocol;
mod query;
mod route;
mod server;
mod shutdown;
mod transport;

pub use config::{
    ErrorReporter, ReportFuture, ServerConfig, ServerConfigBuilder, StatusDefault, DEFAULT_APP_ERROR_STATUS,
    DEFAULT_BASE_URL, DEFAULT_FRAMEWORK_ERROR_STATUS, DEFAULT_SHUTDOWN_TIMEOUT_SECS,
    DEFAULT_VALIDATION_ERROR_STATUS,
};
pub use dispatcher::{Disposition, Dispatcher, Outcome};
pub use error::{BoxError, DispatchFault, ReportedError, RequestPart, ValidationFailure};
pub use handler::{AppError, Reply, Request};
pub use protocol::{JsonProtocol, ProtocolError, TextEncoding, WireProtocol};
pub use query::{parse_query, QueryError};
pub use route::{RequestSpec, Resource, ResponseSpec, ResponseVariant, Route, RouteBuilder, RouteError};
pub use server::{serve, serve_with_shutdown, Server, ServerError};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
pub use transport::{BodyFuture, IncomingRequest, OutgoingResponse, ResponseWriter};

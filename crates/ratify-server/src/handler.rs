//! Typed handlers.
//!
//! A handler is an async function from [`Request`] to
//! `Result<Reply, AppError>`. Its type parameters are plain serde types:
//! the dispatcher validates each part of the request with the route's
//! fields, then converts the validated values into the handler's types.
//! Handlers that prefer to work with raw structures can use
//! [`serde_json::Value`] for any part.
//!
//! # Example
//!
//! ```rust
//! use ratify_server::{AppError, Reply, Request};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct ItemId { id: i64 }
//!
//! #[derive(Serialize)]
//! struct Item { id: i64, title: String }
//!
//! async fn get_item(req: Request<ItemId>) -> Result<Reply<Item>, AppError> {
//!     if req.path_params.id == 0 {
//!         return Err(AppError::public(http::StatusCode::NOT_FOUND, "No such item"));
//!     }
//!     Ok(Reply::new(Item { id: req.path_params.id, title: "Milk".into() }))
//! }
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::{Method, StatusCode};
use ratify_core::{Field, Typed};
use ratify_router::SegmentChain;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::DispatchFault;
use crate::route::RequestSpec;

/// The validated input of a matched route.
///
/// Parts without a declared field arrive as `()`.
#[derive(Debug, Clone)]
pub struct Request<P = (), Q = (), D = (), H = ()> {
    /// The request method.
    pub method: Method,
    /// Values captured by the route's segment chain.
    pub path_params: P,
    /// The validated query.
    pub query: Q,
    /// The validated body.
    pub data: D,
    /// The validated headers.
    pub headers: H,
}

/// What a handler returns on success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply<D = (), H = ()> {
    /// Explicit status; `None` applies the configured default rule.
    pub status: Option<StatusCode>,
    /// Response data.
    pub data: D,
    /// Response headers.
    pub headers: H,
}

impl<D> Reply<D> {
    /// Creates a reply carrying `data` with the default status.
    pub fn new(data: D) -> Self {
        Self {
            status: None,
            data,
            headers: (),
        }
    }
}

impl Reply {
    /// Creates a reply with no data.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

impl<D, H> Reply<D, H> {
    /// Sets an explicit status.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Replaces the response headers.
    #[must_use]
    pub fn with_headers<H2>(self, headers: H2) -> Reply<D, H2> {
        Reply {
            status: self.status,
            data: self.data,
            headers,
        }
    }
}

/// An error raised by a handler.
///
/// A *public* error is an expected outcome: its status and reason are
/// sent to the caller as `{"reason": ...}` and it is not reported. Any
/// other error is internal; the caller only sees the configured
/// application error status, and the error goes to the reporting hook.
///
/// ```rust
/// use ratify_server::AppError;
/// use http::StatusCode;
///
/// let expected = AppError::public(StatusCode::from_u16(442).unwrap(), "Boom!");
/// assert!(expected.is_public());
///
/// let unexpected: AppError = anyhow::anyhow!("connection reset").into();
/// assert!(!unexpected.is_public());
/// assert_eq!(unexpected.reason(), "connection reset");
/// ```
pub struct AppError {
    status: Option<StatusCode>,
    public: bool,
    reason: String,
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Creates a public error with its own status.
    pub fn public(status: StatusCode, reason: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            public: true,
            reason: reason.into(),
            source: None,
        }
    }

    /// Creates a public error answered with the application error status.
    pub fn public_reason(reason: impl Into<String>) -> Self {
        Self {
            status: None,
            public: true,
            reason: reason.into(),
            source: None,
        }
    }

    /// Creates an internal error.
    pub fn internal(reason: impl Into<String>) -> Self {
        Self {
            status: None,
            public: false,
            reason: reason.into(),
            source: None,
        }
    }

    /// Attaches an underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Returns `true` if the error may be shown to the caller.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.public
    }

    /// Returns the reason text.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppError")
            .field("status", &self.status)
            .field("public", &self.public)
            .field("reason", &self.reason)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            status: None,
            public: false,
            reason: err.to_string(),
            source: Some(err),
        }
    }
}

/// Request data after validation, before conversion to handler types.
#[derive(Debug, Clone)]
pub(crate) struct RawRequest {
    pub(crate) method: Method,
    pub(crate) path_params: Value,
    pub(crate) query: Value,
    pub(crate) data: Value,
    pub(crate) headers: Value,
}

/// A handler reply converted back to structured values.
#[derive(Debug, Clone)]
pub(crate) struct RawReply {
    pub(crate) status: Option<StatusCode>,
    pub(crate) data: Value,
    pub(crate) headers: Value,
}

/// Why an erased handler did not produce a reply.
#[derive(Debug)]
pub(crate) enum HandlerFailure {
    App(AppError),
    Fault(DispatchFault),
}

/// Future returned by an erased handler.
pub(crate) type BoxedReply = Pin<Box<dyn Future<Output = Result<RawReply, HandlerFailure>> + Send>>;

/// A handler with its serde conversions folded in.
pub(crate) type ErasedHandler = Arc<dyn Fn(RawRequest) -> BoxedReply + Send + Sync>;

/// The handler's input types, each bound to the field that validates it.
///
/// A part without a declared field converts from `null`.
pub(crate) struct RequestTypes<P, Q, D, H> {
    path_params: Typed<P>,
    query: Typed<Q>,
    data: Typed<D>,
    headers: Typed<H>,
}

impl<P, Q, D, H> RequestTypes<P, Q, D, H>
where
    P: DeserializeOwned,
    Q: DeserializeOwned,
    D: DeserializeOwned,
    H: DeserializeOwned,
{
    pub(crate) fn for_route(chain: &SegmentChain, spec: &RequestSpec) -> Self {
        let declared = |field: Option<&Field>| field.cloned().unwrap_or_else(Field::undefined);
        let path_params = if chain.capture_names().next().is_some() {
            chain.params_field()
        } else {
            Field::undefined()
        };
        Self {
            path_params: path_params.typed(),
            query: declared(spec.query.as_ref()).typed(),
            data: declared(spec.data.as_ref()).typed(),
            headers: declared(spec.headers.as_ref()).typed(),
        }
    }

    fn convert(&self, raw: RawRequest) -> Result<Request<P, Q, D, H>, HandlerFailure> {
        Ok(Request {
            method: raw.method,
            path_params: convert("path parameters", &self.path_params, raw.path_params)?,
            query: convert("query", &self.query, raw.query)?,
            data: convert("data", &self.data, raw.data)?,
            headers: convert("headers", &self.headers, raw.headers)?,
        })
    }
}

/// Wraps a typed handler so the dispatcher can call it with raw values.
pub(crate) fn erase<P, Q, D, H, RD, RH, F, Fut>(types: RequestTypes<P, Q, D, H>, handler: F) -> ErasedHandler
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
    let handler = Arc::new(handler);
    let types = Arc::new(types);
    Arc::new(move |raw: RawRequest| {
        let handler = Arc::clone(&handler);
        let types = Arc::clone(&types);
        Box::pin(async move {
            let request = types.convert(raw)?;
            let reply = handler(request).await.map_err(HandlerFailure::App)?;

            Ok(RawReply {
                status: reply.status,
                data: serde_json::to_value(&reply.data)
                    .map_err(|e| HandlerFailure::Fault(DispatchFault::reply_shape("data", e)))?,
                headers: serde_json::to_value(&reply.headers)
                    .map_err(|e| HandlerFailure::Fault(DispatchFault::reply_shape("headers", e)))?,
            })
        }) as BoxedReply
    })
}

fn convert<T: DeserializeOwned>(
    part: &'static str,
    typed: &Typed<T>,
    value: Value,
) -> Result<T, HandlerFailure> {
    typed
        .convert(value)
        .map_err(|e| HandlerFailure::Fault(DispatchFault::request_shape(part, e)))
}

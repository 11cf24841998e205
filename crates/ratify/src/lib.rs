//! # Ratify
//!
//! **Typed request validation and path routing for HTTP services**
//!
//! Ratify describes every part of an HTTP exchange with composable
//! [`Field`](ratify_core::Field)s and checks it at the boundary:
//!
//! - **Fields** validate untrusted input into canonical values and serialize
//!   them back, in JSON mode or the string-coercing text mode used for
//!   query strings, headers and path segments
//! - **Segment chains** match paths into typed parameters and project typed
//!   parameters back into paths
//! - **Routes** bind a method, a chain, request and response declarations and
//!   an async handler; the dispatcher classifies every failure as a
//!   validation failure, an application error or a framework fault
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ratify::prelude::*;
//! use serde_json::Value;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let item = Route::get(SegmentChain::root().literal("/items/").capture("id", Field::number()))
//!         .response(ResponseSpec::data(Field::object([("id", Field::number())])))
//!         .handler(|req: Request<Value>| async move {
//!             Ok::<_, AppError>(Reply::new(serde_json::json!({"id": req.path_params["id"]})))
//!         });
//!
//!     serve(ServerConfig::default(), [item]).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Request Flow
//!
//! ```text
//! Request → match route → query → path params → headers → body → handler
//!                                                                   ↓
//! Response ← content-type + body ← serialize ← pick status ←────────┘
//! ```

#![doc(html_root_url = "https://docs.rs/ratify/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export field types
pub use ratify_core as core;

// Re-export path matching types
pub use ratify_router as router;

// Re-export routes, dispatcher and server
pub use ratify_server as server;

// Re-export settings loader
pub use ratify_config as config;

// Re-export logging setup
pub use ratify_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// ```rust
/// use ratify::prelude::*;
///
/// let chain = SegmentChain::root().literal("/items/").capture("id", Field::number());
/// assert_eq!(chain.pattern(), "/items/{id}");
/// ```
pub mod prelude {
    pub use ratify_core::{Field, SpecUnion, Typed, ValidationError, ValidationMode};

    pub use ratify_router::{PathParams, SegmentChain};

    pub use ratify_server::{
        serve, serve_with_shutdown, AppError, Dispatcher, Reply, ReportedError, Request, Resource,
        ResponseSpec, ResponseVariant, Route, ServerConfig, ShutdownSignal, StatusDefault,
    };

    pub use ratify_config::{ConfigLoader, RatifySettings};

    pub use ratify_telemetry::{init_logging, LogConfig};
}

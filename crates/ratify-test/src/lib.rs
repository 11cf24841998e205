//! # Ratify Test
//!
//! In-memory testing for Ratify routes. A [`TestClient`] feeds requests
//! straight into a [`Dispatcher`](ratify_server::Dispatcher), so tests
//! exercise routing, validation, status selection and error classification
//! without binding a port.
//!
//! ## Example
//!
//! ```
//! use ratify_core::Field;
//! use ratify_router::SegmentChain;
//! use ratify_server::{AppError, Reply, Request, ResponseSpec, Route, ServerConfig};
//! use ratify_test::TestClient;
//! use serde_json::{json, Value};
//!
//! # tokio_test::block_on(async {
//! let create = Route::post(SegmentChain::root().literal("/items"))
//!     .data(Field::object([("title", Field::string())]))
//!     .response(ResponseSpec::data(Field::object([("title", Field::string())])))
//!     .handler(|req: Request<(), (), Value>| async move { Ok::<_, AppError>(Reply::new(req.data)) });
//!
//! let client = TestClient::new(ServerConfig::default(), [create]);
//!
//! client
//!     .post("/items")
//!     .json(&json!({"title": "Milk"}))
//!     .send()
//!     .await
//!     .assert_status(200)
//!     .assert_json(&json!({"title": "Milk"}));
//!
//! let rejected = client.post("/items").json(&json!({"title": 7})).send().await;
//! assert_eq!(rejected.status_code(), 400);
//! assert_eq!(rejected.json_value().unwrap()["path"], "body.title");
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/ratify-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;

//! Typed path segment chains for ratify.
//!
//! A [`SegmentChain`] is a compiled URL path pattern built from literal text
//! and named captures bound to [`Field`](ratify_core::Field)s. It parses a
//! concrete path into validated [`PathParams`], rebuilds a path from
//! parameters, and exposes its segment list for documentation.
//!
//! # Features
//!
//! - **Persistent Construction**: Builders never mutate; prefixes are shared
//! - **Typed Captures**: Each capture is validated by its own field
//! - **Recoverable Misses**: A failed match is a [`NoMatch`] value, not a panic
//! - **Inverse Projection**: Parameters project back into a matching path
//!
//! # Example
//!
//! ```rust
//! use ratify_core::Field;
//! use ratify_router::SegmentChain;
//! use serde_json::json;
//!
//! let chain = SegmentChain::root()
//!     .literal("/users/")
//!     .capture("user", Field::string())
//!     .literal("/posts/")
//!     .capture("post", Field::number());
//!
//! let params = chain.match_path("/users/ada/posts/3").unwrap();
//! assert_eq!(params.to_value(), json!({"user": "ada", "post": 3}));
//! assert_eq!(chain.pattern(), "/users/{user}/posts/{post}");
//! ```
//!
//! # Structure
//!
//! ```text
//!   "/users/"   {user: string}   "/posts/"   {post: number}
//!   ────────┬── ───────┬──────── ────┬────── ───────┬───────
//!        literal     capture      literal        capture
//! ```

#![doc(html_root_url = "https://docs.rs/ratify-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod chain;
mod error;
mod params;
mod segment;

pub use chain::SegmentChain;
pub use error::{ChainError, NoMatch, ProjectError};
pub use params::PathParams;
pub use segment::Segment;

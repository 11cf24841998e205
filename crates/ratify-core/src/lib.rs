//! # Ratify Core
//!
//! Field validators, serializers and spec types for ratify.
//!
//! This crate provides the leaf types every other ratify crate builds on:
//!
//! - [`Field`] - Composable validate/serialize descriptor over JSON values
//! - [`FieldKind`] - The closed set of field kinds, for exhaustive inspection
//! - [`SpecUnion`] - A single field or a named record of fields
//! - [`Typed`] - A field lifted to a Rust type through serde
//! - [`ValidationError`] - Structured rejection with path and received value
//!
//! Every field satisfies the round-trip law: if `validate(raw)` yields `v`,
//! then `validate(serialize(v))` yields `v` again.

#![doc(html_root_url = "https://docs.rs/ratify-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod field;
mod spec;
mod typed;

pub use error::{
    ValidationError, ValidationResult, DIDNT_MATCH, NOT_AN_INT, NOT_A_NUMBER, ROOT_PATH,
};
pub use field::{Field, FieldKind, NumberOptions, ValidationMode, MISSING_KEY};
pub use spec::SpecUnion;
pub use typed::{Typed, TypedError};

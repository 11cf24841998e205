//! Validation error type.
//!
//! Every [`Field`](crate::Field) rejects raw input with a [`ValidationError`]
//! carrying the JSON path of the offending value, a short message and the
//! value that was received. Validation errors are always recoverable.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Path of the root value in error paths.
pub const ROOT_PATH: &str = "$";

/// Message for a fractional number given to an integer field.
pub const NOT_AN_INT: &str = "Not an int";

/// Message for a non-numeric value given to a number field.
pub const NOT_A_NUMBER: &str = "Not a number";

/// Message for text that does not fit the textual form of a field.
pub const DIDNT_MATCH: &str = "Didn't match";

/// Result type alias using [`ValidationError`].
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Raw input did not satisfy a field's contract.
///
/// # Example
///
/// ```
/// use ratify_core::{Field, ValidationError};
/// use serde_json::json;
///
/// let err = Field::number().validate(&json!(1.2)).unwrap_err();
/// assert_eq!(err.path, "$");
/// assert_eq!(err.message, "Not an int");
/// assert_eq!(err.received, json!(1.2));
/// ```
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("validation error at '{path}': {message}")]
pub struct ValidationError {
    /// The JSON path where the error occurred (`$`, `$.title`, `$[2]`).
    pub path: String,
    /// The error message.
    pub message: String,
    /// The raw value that was rejected.
    pub received: Value,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(path: impl Into<String>, message: impl Into<String>, received: &Value) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            received: received.clone(),
        }
    }

    /// Creates an error at the root path.
    pub fn at_root(message: impl Into<String>, received: &Value) -> Self {
        Self::new(ROOT_PATH, message, received)
    }

    /// Re-roots this error under a named prefix.
    ///
    /// Used when a value was validated on its own and the failure needs to be
    /// reported in terms of an enclosing structure, such as a path capture or
    /// a query parameter.
    ///
    /// ```
    /// use ratify_core::ValidationError;
    /// use serde_json::json;
    ///
    /// let err = ValidationError::at_root("Not a string", &json!(1)).within("query");
    /// assert_eq!(err.path, "query");
    ///
    /// let err = ValidationError::new("$.page", "Not a number", &json!("x")).within("query");
    /// assert_eq!(err.path, "query.page");
    /// ```
    #[must_use]
    pub fn within(mut self, prefix: &str) -> Self {
        self.path = match self.path.strip_prefix(ROOT_PATH) {
            Some(rest) => format!("{prefix}{rest}"),
            None => format!("{prefix}.{}", self.path),
        };
        self
    }
}

/// Returns a human-readable name for a JSON value type.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

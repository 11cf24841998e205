//! Segment chain error types.

use ratify_core::ValidationError;
use thiserror::Error;

/// Invalid chain declaration.
///
/// Declaration errors are programming mistakes found at startup, never
/// while serving a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// A capture was declared with an empty name.
    #[error("capture name must not be empty")]
    EmptyName,

    /// Two captures share a name.
    #[error("duplicate capture name '{0}'")]
    DuplicateCapture(String),

    /// A capture directly follows another capture.
    #[error("capture '{name}' directly follows capture '{previous}'; separate them with a literal")]
    AdjacentCaptures {
        /// The earlier capture.
        previous: String,
        /// The capture being added.
        name: String,
    },
}

/// A path did not match a chain.
///
/// This is a recoverable outcome: the caller moves on to the next route.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NoMatch {
    /// A literal token did not align with the input.
    #[error("expected '{expected}' at '{remaining}'")]
    Literal {
        /// The literal text the chain expected.
        expected: String,
        /// The unconsumed input at that point.
        remaining: String,
    },

    /// A required capture consumed no characters.
    #[error("capture '{0}' is empty")]
    EmptyCapture(String),

    /// A capture span is not valid percent-encoded UTF-8.
    #[error("capture '{0}' is not valid percent-encoded UTF-8")]
    Encoding(String),

    /// A capture field rejected its span.
    #[error("capture '{name}' rejected: {error}")]
    Rejected {
        /// The capture name.
        name: String,
        /// Why the field rejected the span.
        #[source]
        error: ValidationError,
    },

    /// Input remained after the last segment.
    #[error("unexpected trailing input '{0}'")]
    TrailingInput(String),
}

/// Parameters could not be projected back into a path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectError {
    /// The parameters are not a JSON object.
    #[error("path parameters must be an object")]
    NotAnObject,

    /// A required capture has no value.
    #[error("missing path parameter '{0}'")]
    Missing(String),

    /// A capture value was rejected by its field.
    #[error("invalid path parameter '{name}': {error}")]
    Invalid {
        /// The capture name.
        name: String,
        /// Why the field rejected the value.
        #[source]
        error: ValidationError,
    },

    /// A capture serialized to something other than a scalar.
    #[error("path parameter '{0}' does not serialize to a scalar")]
    NotScalar(String),

    /// A capture value has no text form that matches back to it, such as
    /// empty text or text that cannot avoid the following literal.
    #[error("path parameter '{0}' cannot be written into the path unambiguously")]
    Unrepresentable(String),
}

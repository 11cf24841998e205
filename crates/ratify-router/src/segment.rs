//! Chain segments.

use std::borrow::Cow;

use ratify_core::Field;

/// One node of a [`SegmentChain`](crate::SegmentChain).
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text matched exactly (case-sensitive).
    Literal(String),
    /// A named capture validated by a field.
    Capture {
        /// Parameter name, unique within its chain.
        name: String,
        /// Field validating the captured text.
        field: Field,
    },
}

impl Segment {
    /// Returns the literal text, if this is a literal segment.
    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(text) => Some(text),
            Self::Capture { .. } => None,
        }
    }

    /// Returns the capture name, if this is a capture segment.
    #[must_use]
    pub fn capture_name(&self) -> Option<&str> {
        match self {
            Self::Literal(_) => None,
            Self::Capture { name, .. } => Some(name),
        }
    }

    /// Returns this segment as it appears in a path pattern.
    ///
    /// Captures render as `{name}` placeholders.
    #[must_use]
    pub fn placeholder(&self) -> Cow<'_, str> {
        match self {
            Self::Literal(text) => Cow::Borrowed(text),
            Self::Capture { name, .. } => Cow::Owned(format!("{{{name}}}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder() {
        let literal = Segment::Literal("/users/".to_string());
        assert_eq!(literal.placeholder(), "/users/");
        assert_eq!(literal.as_literal(), Some("/users/"));
        assert_eq!(literal.capture_name(), None);

        let capture = Segment::Capture {
            name: "id".to_string(),
            field: Field::number(),
        };
        assert_eq!(capture.placeholder(), "{id}");
        assert_eq!(capture.capture_name(), Some("id"));
        assert_eq!(capture.as_literal(), None);
    }
}

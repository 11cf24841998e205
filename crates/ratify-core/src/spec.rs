//! "One field or a record of fields".

use indexmap::IndexMap;

use crate::Field;

/// Either a single [`Field`] or a named mapping of specs.
///
/// Used wherever a contract may describe one value or a record of named
/// values, such as query parameters, headers and response bodies. A record
/// converts into an object field whose children are the converted entries.
///
/// ```
/// use ratify_core::{Field, SpecUnion};
/// use serde_json::json;
///
/// let headers = SpecUnion::record([
///     ("x-request-id", SpecUnion::from(Field::string())),
///     ("x-trace", Field::string().optional().into()),
/// ]);
///
/// let field = headers.into_field();
/// assert_eq!(field.tag(), "ratify.ObjectField");
/// assert!(field.validate(&json!({"x-request-id": "abc"})).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SpecUnion {
    /// A single field.
    Field(Field),
    /// Named entries, each itself a spec.
    Record(IndexMap<String, SpecUnion>),
}

impl SpecUnion {
    /// Builds a record spec from ordered entries.
    #[must_use]
    pub fn record<K: Into<String>>(entries: impl IntoIterator<Item = (K, SpecUnion)>) -> Self {
        Self::Record(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Returns `true` if this spec is a single field.
    #[must_use]
    pub fn is_field(&self) -> bool {
        matches!(self, Self::Field(_))
    }

    /// Converts this spec into a field.
    #[must_use]
    pub fn into_field(self) -> Field {
        match self {
            Self::Field(field) => field,
            Self::Record(entries) => Field::object(
                entries
                    .into_iter()
                    .map(|(key, spec)| (key, spec.into_field())),
            ),
        }
    }
}

impl From<Field> for SpecUnion {
    fn from(field: Field) -> Self {
        Self::Field(field)
    }
}

impl From<SpecUnion> for Field {
    fn from(spec: SpecUnion) -> Self {
        spec.into_field()
    }
}

//! Validated path parameter storage.
//!
//! Most routes capture one to four parameters, so values are stored in a
//! small vector to avoid heap allocation for the common case.

use serde_json::{Map, Value};
use smallvec::SmallVec;

/// Maximum number of parameters stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// Path parameters produced by a successful match.
///
/// Values are the output of each capture's field, in declaration order.
/// Captures that matched an empty span for an optional field are absent.
///
/// # Example
///
/// ```rust
/// use ratify_router::PathParams;
/// use serde_json::json;
///
/// let mut params = PathParams::new();
/// params.push("userId", json!(123));
/// params.push("action", json!("view"));
///
/// assert_eq!(params.get("userId"), Some(&json!(123)));
/// assert_eq!(params.get("unknown"), None);
/// assert_eq!(params.to_value(), json!({"userId": 123, "action": "view"}));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathParams {
    inner: SmallVec<[(String, Value); INLINE_PARAMS]>,
}

impl PathParams {
    /// Creates a new empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parameter set with the given capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: SmallVec::with_capacity(capacity),
        }
    }

    /// Adds a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.inner.push((name.into(), value));
    }

    /// Returns the value of a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.inner.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Returns the parameters as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.inner
                .iter()
                .map(|(n, v)| (n.clone(), v.clone()))
                .collect::<Map<_, _>>(),
        )
    }
}

impl From<PathParams> for Value {
    fn from(params: PathParams) -> Self {
        Value::Object(params.inner.into_iter().collect())
    }
}

impl FromIterator<(String, Value)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

//! Segment chain construction, matching and projection.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use ratify_core::{Field, FieldKind};
use serde_json::Value;

use crate::error::{ChainError, NoMatch, ProjectError};
use crate::params::PathParams;
use crate::segment::Segment;

/// A compiled path pattern made of literal and typed-capture segments.
///
/// Chains are persistent values: every builder method returns a new chain
/// and leaves the receiver untouched, so one chain can serve as the shared
/// prefix of many routes.
///
/// # Matching
///
/// Matching is anchored and case-sensitive. Literal segments consume exactly
/// their text. A capture consumes input up to the first occurrence of the
/// next literal (or to the end of the input), percent-decodes it and
/// validates it in text mode with its field, so a [`Field::number`] capture
/// accepts `"42"`.
///
/// # Example
///
/// ```rust
/// use ratify_core::Field;
/// use ratify_router::SegmentChain;
/// use serde_json::json;
///
/// let items = SegmentChain::root().literal("/items");
/// let item = items.literal("/").capture("id", Field::number());
///
/// assert_eq!(item.pattern(), "/items/{id}");
///
/// let params = item.match_path("/items/42").unwrap();
/// assert_eq!(params.get("id"), Some(&json!(42)));
/// assert!(item.match_path("/items/abc").is_err());
///
/// assert_eq!(item.project(&json!({"id": 42})).unwrap(), "/items/42");
/// ```
#[derive(Clone, Default, PartialEq)]
pub struct SegmentChain {
    segments: Arc<[Segment]>,
}

impl SegmentChain {
    /// Creates an empty chain, matching only the empty path.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new chain with a literal segment appended.
    ///
    /// Appending empty text returns an equal chain.
    #[must_use]
    pub fn literal(&self, text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return self.clone();
        }
        self.append(Segment::Literal(text))
    }

    /// Returns a new chain with a named capture appended.
    ///
    /// # Panics
    ///
    /// Panics if the declaration is invalid; see [`SegmentChain::try_capture`].
    /// Chains are declared once at startup, where a bad declaration is a
    /// programming error.
    #[must_use]
    pub fn capture(&self, name: impl Into<String>, field: Field) -> Self {
        match self.try_capture(name, field) {
            Ok(chain) => chain,
            Err(e) => panic!("invalid segment chain '{self}': {e}"),
        }
    }

    /// Returns a new chain with a named capture appended.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] if the name is empty, already used in this
    /// chain, or if the previous segment is also a capture.
    pub fn try_capture(&self, name: impl Into<String>, field: Field) -> Result<Self, ChainError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ChainError::EmptyName);
        }
        if self.capture_names().any(|existing| existing == name) {
            return Err(ChainError::DuplicateCapture(name));
        }
        if let Some(previous) = self.segments.last().and_then(Segment::capture_name) {
            return Err(ChainError::AdjacentCaptures {
                previous: previous.to_string(),
                name,
            });
        }
        Ok(self.append(Segment::Capture { name, field }))
    }

    /// Returns a new chain with all of `suffix`'s segments appended.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] under the same rules as
    /// [`SegmentChain::try_capture`].
    pub fn try_join(&self, suffix: &SegmentChain) -> Result<Self, ChainError> {
        suffix
            .segments
            .iter()
            .try_fold(self.clone(), |chain, segment| match segment {
                Segment::Literal(text) => Ok(chain.literal(text.clone())),
                Segment::Capture { name, field } => chain.try_capture(name.clone(), field.clone()),
            })
    }

    fn append(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment);
        Self {
            segments: segments.into(),
        }
    }

    /// Returns the ordered segment list.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns `true` if the chain has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the capture names in declaration order.
    pub fn capture_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(Segment::capture_name)
    }

    /// Returns the path pattern, with captures rendered as `{name}`.
    #[must_use]
    pub fn pattern(&self) -> String {
        self.segments.iter().map(Segment::placeholder).collect()
    }

    /// Returns each capture's field keyed by capture name.
    #[must_use]
    pub fn param_fields(&self) -> IndexMap<String, Field> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Capture { name, field } => Some((name.clone(), field.clone())),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Returns an object field describing the path parameters.
    #[must_use]
    pub fn params_field(&self) -> Field {
        Field::object(self.param_fields())
    }

    /// Matches a path (without query string) against this chain.
    ///
    /// # Errors
    ///
    /// Returns [`NoMatch`] if a literal does not align, a required capture
    /// is empty, a capture field rejects its text, or input remains after
    /// the last segment.
    pub fn match_path(&self, path: &str) -> Result<PathParams, NoMatch> {
        let mut rest = path;
        let mut params = PathParams::with_capacity(self.segments.len());

        for (idx, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(text) => {
                    rest = rest.strip_prefix(text.as_str()).ok_or_else(|| NoMatch::Literal {
                        expected: text.clone(),
                        remaining: rest.to_string(),
                    })?;
                }
                Segment::Capture { name, field } => {
                    let end = match self.next_literal(idx) {
                        Some(next) => rest.find(next).ok_or_else(|| NoMatch::Literal {
                            expected: next.to_string(),
                            remaining: rest.to_string(),
                        })?,
                        None => rest.len(),
                    };
                    let (span, remaining) = rest.split_at(end);
                    rest = remaining;

                    if let Some(value) = Self::capture_value(name, field, span)? {
                        params.push(name.clone(), value);
                    }
                }
            }
        }

        if !rest.is_empty() {
            return Err(NoMatch::TrailingInput(rest.to_string()));
        }
        Ok(params)
    }

    fn next_literal(&self, idx: usize) -> Option<&str> {
        self.segments[idx + 1..].iter().find_map(Segment::as_literal)
    }

    fn capture_value(name: &str, field: &Field, span: &str) -> Result<Option<Value>, NoMatch> {
        if span.is_empty() {
            if field.is_required() {
                return Err(NoMatch::EmptyCapture(name.to_string()));
            }
            return Ok(None);
        }
        let decoded =
            urlencoding::decode(span).map_err(|_| NoMatch::Encoding(name.to_string()))?;
        let value = field
            .validate_text(&Value::String(decoded.into_owned()))
            .map_err(|error| NoMatch::Rejected {
                name: name.to_string(),
                error: error.within(name),
            })?;
        Ok((!value.is_null()).then_some(value))
    }

    /// Rebuilds a path from parameter values.
    ///
    /// Each capture value is validated and serialized by its field, rendered
    /// as text and percent-encoded. Numbers are written in plain decimal
    /// form. When the encoded text would contain the literal that follows
    /// the capture, every byte of it is percent-encoded instead. The result
    /// matches this chain again and yields the same parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError`] if `params` is not an object, a required
    /// capture is missing, a value is rejected by its field, a value does
    /// not serialize to a scalar, or a value has no text form that matches
    /// back.
    pub fn project(&self, params: &Value) -> Result<String, ProjectError> {
        let values = params.as_object().ok_or(ProjectError::NotAnObject)?;
        let mut path = String::new();

        for (idx, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(text) => path.push_str(text),
                Segment::Capture { name, field } => {
                    let value = values.get(name).unwrap_or(&Value::Null);
                    let valid = field.validate(value).map_err(|error| ProjectError::Invalid {
                        name: name.clone(),
                        error: error.within(name),
                    })?;
                    let text = match field.serialize(&valid) {
                        Value::Null if field.is_required() => {
                            return Err(ProjectError::Missing(name.clone()));
                        }
                        Value::Null => continue,
                        Value::String(text) => text,
                        Value::Number(n) => number_text(&n),
                        Value::Bool(b) => b.to_string(),
                        Value::Array(_) | Value::Object(_) => {
                            return Err(ProjectError::NotScalar(name.clone()));
                        }
                    };
                    let encoded = encode_capture(&text, self.next_literal(idx))
                        .ok_or_else(|| ProjectError::Unrepresentable(name.clone()))?;
                    path.push_str(&encoded);
                }
            }
        }
        Ok(path)
    }

    /// Returns `true` if any capture is bound to a field of the given kind tag.
    ///
    /// Useful for documentation generators that render some kinds specially.
    #[must_use]
    pub fn has_capture_of(&self, tag: &str) -> bool {
        self.param_fields().values().any(|field| match field.kind() {
            FieldKind::Optional(inner) => inner.tag() == tag,
            _ => field.tag() == tag,
        })
    }
}

// Rust's float formatting never uses exponent notation and round-trips.
fn number_text(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string())
    }
}

/// Percent-encodes capture text so that matching stops exactly after it.
///
/// Matching ends a capture at the first occurrence of `next`, so that
/// occurrence must be the one right after the encoded text.
fn encode_capture(text: &str, next: Option<&str>) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let Some(next) = next else {
        return Some(urlencoding::encode(text).into_owned());
    };
    let ends_cleanly = |encoded: &str| format!("{encoded}{next}").find(next) == Some(encoded.len());

    let encoded = urlencoding::encode(text).into_owned();
    if ends_cleanly(&encoded) {
        return Some(encoded);
    }
    let escaped: String = text.bytes().map(|b| format!("%{b:02X}")).collect();
    ends_cleanly(&escaped).then_some(escaped)
}

impl fmt::Display for SegmentChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in self.segments.iter() {
            f.write_str(&segment.placeholder())?;
        }
        Ok(())
    }
}

impl fmt::Debug for SegmentChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SegmentChain").field(&self.pattern()).finish()
    }
}

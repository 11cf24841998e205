//! Field validators and serializers.
//!
//! A [`Field`] is an immutable descriptor that turns raw wire data into a
//! validated value ([`Field::validate`]) and turns a validated value back into
//! raw data ([`Field::serialize`]). Fields are built from a small set of
//! combinators and can be nested freely:
//!
//! ```
//! use ratify_core::Field;
//! use serde_json::json;
//!
//! let item = Field::object([
//!     ("id", Field::number()),
//!     ("title", Field::string()),
//!     ("tags", Field::array(Field::string()).optional()),
//! ]);
//!
//! let valid = item.validate(&json!({"id": 1, "title": "Milk", "extra": true})).unwrap();
//! assert_eq!(valid, json!({"id": 1, "title": "Milk"}));
//!
//! let err = item.validate(&json!({"id": 1})).unwrap_err();
//! assert_eq!(err.path, "$.title");
//! ```
//!
//! # Absent values
//!
//! A missing object key and JSON `null` are both treated as an absent value.
//! Only [`Field::optional`] wrappers (and the [`Field::undefined`] sentinel)
//! accept it.
//!
//! # Text mode
//!
//! Values taken from a URL path, a query string or a header always arrive as
//! text. Validating with [`ValidationMode::Text`] lets number, boolean,
//! constant and choice fields coerce their textual form, so `"42"` satisfies
//! [`Field::number`]. Text that does not have the expected form is rejected
//! with `"Didn't match"`.

use std::fmt;
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::error::{
    value_type_name, ValidationError, ValidationResult, DIDNT_MATCH, NOT_AN_INT, NOT_A_NUMBER,
    ROOT_PATH,
};

/// Namespace prefix of every field tag.
pub const TAG_NAMESPACE: &str = "ratify";

/// Message for a missing required object key.
pub const MISSING_KEY: &str = "Missing required key";

/// How raw scalars are interpreted during validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Raw values are structured wire data (decoded JSON bodies).
    #[default]
    Json,
    /// Raw scalars are text (path captures, query parameters, headers).
    Text,
}

/// Options for [`Field::number_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumberOptions {
    /// Whether values with a fractional part are accepted.
    pub can_be_float: bool,
}

impl NumberOptions {
    /// Options accepting any finite number.
    #[must_use]
    pub const fn float() -> Self {
        Self { can_be_float: true }
    }
}

/// The closed set of field kinds.
///
/// Consumers such as documentation generators match on this enum to render
/// a field without calling into it.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// A JSON number, integral unless floats are allowed.
    Number(NumberOptions),
    /// A string.
    String,
    /// A boolean.
    Boolean,
    /// Exactly one literal value.
    Constant(Value),
    /// One of a closed set of literal values.
    Choice(Vec<Value>),
    /// The wrapped field, or an absent value.
    Optional(Field),
    /// A record with a fixed, ordered set of keys.
    Object(IndexMap<String, Field>),
    /// A sequence sharing one element field.
    Array(Field),
    /// Alternatives tried in declaration order.
    Union(Vec<Field>),
    /// A free-form object passed through untouched.
    WildcardObject,
    /// Always absent; used for contracts without a body.
    Undefined,
}

impl FieldKind {
    /// Returns the stable capability tag of this kind.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Number(_) => "ratify.NumberField",
            Self::String => "ratify.StringField",
            Self::Boolean => "ratify.BooleanField",
            Self::Constant(_) => "ratify.ConstantField",
            Self::Choice(_) => "ratify.ChoiceField",
            Self::Optional(_) => "ratify.OptionalField",
            Self::Object(_) => "ratify.ObjectField",
            Self::Array(_) => "ratify.ArrayField",
            Self::Union(_) => "ratify.UnionField",
            Self::WildcardObject => "ratify.WildcardObjectField",
            Self::Undefined => "ratify.UndefinedField",
        }
    }
}

/// A composable validate/serialize descriptor for one shape of data.
///
/// Fields are cheap to clone; clones share the same definition.
#[derive(Clone, PartialEq)]
pub struct Field {
    kind: Arc<FieldKind>,
    description: Option<String>,
}

impl Field {
    fn from_kind(kind: FieldKind) -> Self {
        Self {
            kind: Arc::new(kind),
            description: None,
        }
    }

    /// An integer field.
    ///
    /// ```
    /// use ratify_core::Field;
    /// use serde_json::json;
    ///
    /// let field = Field::number();
    /// assert_eq!(field.validate(&json!(-1)).unwrap(), json!(-1));
    /// assert_eq!(field.validate(&json!(1.2)).unwrap_err().message, "Not an int");
    /// assert_eq!(field.validate(&json!("1")).unwrap_err().message, "Not a number");
    /// ```
    #[must_use]
    pub fn number() -> Self {
        Self::number_with(NumberOptions::default())
    }

    /// A number field with explicit options.
    #[must_use]
    pub fn number_with(options: NumberOptions) -> Self {
        Self::from_kind(FieldKind::Number(options))
    }

    /// A string field.
    #[must_use]
    pub fn string() -> Self {
        Self::from_kind(FieldKind::String)
    }

    /// A boolean field.
    #[must_use]
    pub fn boolean() -> Self {
        Self::from_kind(FieldKind::Boolean)
    }

    /// A field accepting exactly `value`.
    #[must_use]
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::from_kind(FieldKind::Constant(value.into()))
    }

    /// A field accepting any one of `values`.
    #[must_use]
    pub fn choice<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::from_kind(FieldKind::Choice(values.into_iter().map(Into::into).collect()))
    }

    /// An object field with the given ordered shape.
    ///
    /// A later entry with a repeated key replaces the earlier one.
    #[must_use]
    pub fn object<K: Into<String>>(shape: impl IntoIterator<Item = (K, Field)>) -> Self {
        Self::from_kind(FieldKind::Object(
            shape.into_iter().map(|(k, f)| (k.into(), f)).collect(),
        ))
    }

    /// An array field whose elements all satisfy `element`.
    #[must_use]
    pub fn array(element: Field) -> Self {
        Self::from_kind(FieldKind::Array(element))
    }

    /// A field accepting the first of `alternatives` that validates.
    #[must_use]
    pub fn union(alternatives: impl IntoIterator<Item = Field>) -> Self {
        Self::from_kind(FieldKind::Union(alternatives.into_iter().collect()))
    }

    /// A free-form object field.
    ///
    /// Accepts an object, or a string holding the JSON text of an object.
    #[must_use]
    pub fn wildcard_object() -> Self {
        Self::from_kind(FieldKind::WildcardObject)
    }

    /// A field that always yields an absent value.
    #[must_use]
    pub fn undefined() -> Self {
        Self::from_kind(FieldKind::Undefined)
    }

    /// Wraps this field so an absent value is also accepted.
    ///
    /// Wrapping an already optional field returns it unchanged.
    #[must_use]
    pub fn optional(self) -> Self {
        if matches!(self.kind(), FieldKind::Optional(_)) {
            return self;
        }
        let description = self.description.clone();
        Self {
            kind: Arc::new(FieldKind::Optional(self)),
            description,
        }
    }

    /// Attaches a human-readable description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the kind of this field.
    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Returns the stable capability tag, e.g. `"ratify.NumberField"`.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        self.kind.tag()
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns `false` exactly when this field is optional.
    #[must_use]
    pub fn is_required(&self) -> bool {
        !matches!(self.kind(), FieldKind::Optional(_))
    }

    /// Validates structured raw data.
    pub fn validate(&self, raw: &Value) -> ValidationResult<Value> {
        self.validate_with(raw, ValidationMode::Json)
    }

    /// Validates raw data whose scalars are text.
    ///
    /// ```
    /// use ratify_core::Field;
    /// use serde_json::json;
    ///
    /// assert_eq!(Field::number().validate_text(&json!("12")).unwrap(), json!(12));
    /// assert_eq!(
    ///     Field::number().validate_text(&json!("1.2")).unwrap_err().message,
    ///     "Didn't match"
    /// );
    /// ```
    pub fn validate_text(&self, raw: &Value) -> ValidationResult<Value> {
        self.validate_with(raw, ValidationMode::Text)
    }

    /// Validates raw data in the given mode.
    pub fn validate_with(&self, raw: &Value, mode: ValidationMode) -> ValidationResult<Value> {
        self.validate_at_path(raw, ROOT_PATH, mode)
    }

    fn validate_at_path(&self, raw: &Value, path: &str, mode: ValidationMode) -> ValidationResult<Value> {
        match self.kind() {
            FieldKind::Number(options) => validate_number(raw, path, *options, mode),

            FieldKind::String => match raw {
                Value::String(_) => Ok(raw.clone()),
                _ => Err(ValidationError::new(path, "Not a string", raw)),
            },

            FieldKind::Boolean => match (raw, mode) {
                (Value::Bool(_), _) => Ok(raw.clone()),
                (Value::String(text), ValidationMode::Text) => match text.as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    _ => Err(ValidationError::new(path, DIDNT_MATCH, raw)),
                },
                _ => Err(ValidationError::new(path, "Not a boolean", raw)),
            },

            FieldKind::Constant(expected) => {
                if literal_matches(expected, raw, mode) {
                    Ok(expected.clone())
                } else {
                    Err(ValidationError::new(path, format!("Expected {expected}"), raw))
                }
            }

            FieldKind::Choice(values) => values
                .iter()
                .find(|v| literal_matches(v, raw, mode))
                .cloned()
                .ok_or_else(|| ValidationError::new(path, "Not one of the allowed values", raw)),

            FieldKind::Optional(inner) => {
                if raw.is_null() {
                    Ok(Value::Null)
                } else {
                    inner.validate_at_path(raw, path, mode)
                }
            }

            FieldKind::Object(shape) => {
                let obj = raw
                    .as_object()
                    .ok_or_else(|| ValidationError::new(path, "Not an object", raw))?;

                let mut out = Map::new();
                for (key, child) in shape {
                    let child_path = format!("{path}.{key}");
                    let child_raw = obj.get(key).unwrap_or(&Value::Null);
                    if child_raw.is_null()
                        && child.is_required()
                        && !matches!(child.kind(), FieldKind::Undefined)
                    {
                        return Err(ValidationError::new(child_path, MISSING_KEY, child_raw));
                    }
                    let value = child.validate_at_path(child_raw, &child_path, mode)?;
                    if !value.is_null() {
                        out.insert(key.clone(), value);
                    }
                }
                Ok(Value::Object(out))
            }

            FieldKind::Array(element) => {
                let items = match (raw, mode) {
                    (Value::Array(items), _) => items.as_slice(),
                    // A lone text value stands for a one-element sequence.
                    (Value::String(_), ValidationMode::Text) => std::slice::from_ref(raw),
                    _ => return Err(ValidationError::new(path, "Not an array", raw)),
                };
                items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| element.validate_at_path(item, &format!("{path}[{idx}]"), mode))
                    .collect::<ValidationResult<Vec<_>>>()
                    .map(Value::Array)
            }

            FieldKind::Union(alternatives) => alternatives
                .iter()
                .find_map(|alt| alt.validate_at_path(raw, path, mode).ok())
                .ok_or_else(|| {
                    ValidationError::new(
                        path,
                        format!("No alternative matched {}", value_type_name(raw)),
                        raw,
                    )
                }),

            FieldKind::WildcardObject => match raw {
                Value::Object(_) => Ok(raw.clone()),
                Value::String(text) => match serde_json::from_str::<Value>(text) {
                    Ok(parsed @ Value::Object(_)) => Ok(parsed),
                    _ => Err(ValidationError::new(path, "Not an object", raw)),
                },
                _ => Err(ValidationError::new(path, "Not an object", raw)),
            },

            FieldKind::Undefined => Ok(Value::Null),
        }
    }

    /// Serializes a validated value back into raw data.
    ///
    /// Never fails for values produced by [`Field::validate`]. Object keys
    /// whose serialized value is absent are omitted.
    ///
    /// ```
    /// use ratify_core::Field;
    /// use serde_json::json;
    ///
    /// let field = Field::object([
    ///     ("name", Field::string()),
    ///     ("nick", Field::string().optional()),
    /// ]);
    /// assert_eq!(
    ///     field.serialize(&json!({"name": "Ada", "nick": null})),
    ///     json!({"name": "Ada"})
    /// );
    /// ```
    #[must_use]
    pub fn serialize(&self, value: &Value) -> Value {
        match self.kind() {
            FieldKind::Optional(inner) => {
                if value.is_null() {
                    Value::Null
                } else {
                    inner.serialize(value)
                }
            }

            FieldKind::Object(shape) => {
                let Value::Object(obj) = value else {
                    return value.clone();
                };
                let mut out = Map::new();
                for (key, child) in shape {
                    if let Some(child_value) = obj.get(key) {
                        let raw = child.serialize(child_value);
                        if !raw.is_null() {
                            out.insert(key.clone(), raw);
                        }
                    }
                }
                Value::Object(out)
            }

            FieldKind::Array(element) => match value {
                Value::Array(items) => Value::Array(items.iter().map(|v| element.serialize(v)).collect()),
                other => other.clone(),
            },

            FieldKind::Union(alternatives) => alternatives
                .iter()
                .find(|alt| alt.validate(value).is_ok_and(|v| &v == value))
                .map_or_else(|| value.clone(), |alt| alt.serialize(value)),

            FieldKind::Undefined => Value::Null,

            FieldKind::Number(_)
            | FieldKind::String
            | FieldKind::Boolean
            | FieldKind::Constant(_)
            | FieldKind::Choice(_)
            | FieldKind::WildcardObject => value.clone(),
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Field");
        out.field("kind", &self.kind);
        if let Some(description) = &self.description {
            out.field("description", description);
        }
        out.finish()
    }
}

fn validate_number(
    raw: &Value,
    path: &str,
    options: NumberOptions,
    mode: ValidationMode,
) -> ValidationResult<Value> {
    match raw {
        Value::Number(n) => {
            normalize_number(n, options).ok_or_else(|| ValidationError::new(path, NOT_AN_INT, raw))
        }
        Value::String(text) if mode == ValidationMode::Text => {
            parse_numeric_text(text, options).ok_or_else(|| ValidationError::new(path, DIDNT_MATCH, raw))
        }
        _ => Err(ValidationError::new(path, NOT_A_NUMBER, raw)),
    }
}

// Exclusive upper bounds of the integer ranges; both are exact in f64.
const I64_END: f64 = 9_223_372_036_854_775_808.0;
const U64_END: f64 = 18_446_744_073_709_551_616.0;

// Integral values are stored as i64, then u64, so equal numbers compare
// equal whichever way they arrived. Integral floats beyond u64 stay floats.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn normalize_number(n: &Number, options: NumberOptions) -> Option<Value> {
    if n.is_i64() || n.is_u64() {
        return Some(Value::Number(n.clone()));
    }
    let f = n.as_f64()?;
    if f.fract() != 0.0 {
        return options.can_be_float.then(|| Value::Number(n.clone()));
    }
    if (-I64_END..I64_END).contains(&f) {
        Some(Value::from(f as i64))
    } else if (0.0..U64_END).contains(&f) {
        Some(Value::from(f as u64))
    } else {
        Some(Value::Number(n.clone()))
    }
}

fn parse_numeric_text(text: &str, options: NumberOptions) -> Option<Value> {
    let integral = int_pattern().is_match(text);
    if !integral && !(options.can_be_float && float_pattern().is_match(text)) {
        return None;
    }
    if integral {
        if let Ok(n) = text.parse::<i64>() {
            return Some(Value::from(n));
        }
        if let Ok(n) = text.parse::<u64>() {
            return Some(Value::from(n));
        }
    }
    let n = text.parse::<f64>().ok().and_then(Number::from_f64)?;
    normalize_number(&n, options)
}

fn int_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^-?[0-9]+$").expect("integer pattern is valid"))
}

fn float_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("float pattern is valid"))
}

fn literal_matches(expected: &Value, raw: &Value, mode: ValidationMode) -> bool {
    if expected == raw {
        return true;
    }
    match (mode, raw) {
        (ValidationMode::Text, Value::String(text)) if !expected.is_string() => {
            expected.to_string() == *text
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ok(field: &Field, raw: Value, expected: Value) {
        assert_eq!(field.validate(&raw).unwrap(), expected, "validating {raw}");
    }

    fn err(field: &Field, raw: Value, message: &str) {
        let error = field.validate(&raw).unwrap_err();
        assert_eq!(error.message, message, "validating {raw}");
    }

    fn text_ok(field: &Field, raw: &str, expected: Value) {
        assert_eq!(field.validate_text(&json!(raw)).unwrap(), expected, "validating {raw:?}");
    }

    fn text_err(field: &Field, raw: &str, message: &str) {
        let error = field.validate_text(&json!(raw)).unwrap_err();
        assert_eq!(error.message, message, "validating {raw:?}");
    }

    #[test]
    fn test_int_field_signed() {
        let field = Field::number();
        ok(&field, json!(12), json!(12));
        ok(&field, json!(0), json!(0));
        ok(&field, json!(-1), json!(-1));

        err(&field, json!(-1.2), NOT_AN_INT);
        err(&field, json!(1.2), NOT_AN_INT);
        err(&field, json!("1"), NOT_A_NUMBER);
    }

    #[test]
    fn test_float_field_signed() {
        let field = Field::number_with(NumberOptions::float());
        ok(&field, json!(12), json!(12));
        ok(&field, json!(0), json!(0));
        ok(&field, json!(-1), json!(-1));
        ok(&field, json!(-1.2), json!(-1.2));
        ok(&field, json!(1.2), json!(1.2));
        err(&field, json!("1"), NOT_A_NUMBER);
    }

    #[test]
    fn test_integral_float_normalized() {
        ok(&Field::number(), json!(3.0), json!(3));
        ok(&Field::number(), json!(1e16_f64), json!(10_000_000_000_000_000_i64));
        ok(&Field::number(), json!(-9.223_372_036_854_775_808e18_f64), json!(i64::MIN));
        ok(&Field::number(), json!(1e19_f64), json!(10_000_000_000_000_000_000_u64));
        ok(&Field::number(), json!(1e300_f64), json!(1e300_f64));
    }

    #[test]
    fn test_tiny_fraction_is_not_an_int() {
        err(&Field::number(), json!(1e-17_f64), NOT_AN_INT);
        err(&Field::number(), json!(-5e-324_f64), NOT_AN_INT);
        ok(&Field::number_with(NumberOptions::float()), json!(1e-17_f64), json!(1e-17_f64));
    }

    #[test]
    fn test_large_integral_text() {
        let field = Field::number();
        text_ok(&field, "18446744073709551615", json!(u64::MAX));
        text_ok(&field, "100000000000000000000", json!(1e20_f64));
        text_ok(
            &Field::number_with(NumberOptions::float()),
            "0.0000001",
            json!(1e-7_f64),
        );
    }

    #[test]
    fn test_int_field_text() {
        let field = Field::number();
        text_ok(&field, "12", json!(12));
        text_ok(&field, "0", json!(0));
        text_ok(&field, "-1", json!(-1));

        text_err(&field, "-1.2", DIDNT_MATCH);
        text_err(&field, "1.2", DIDNT_MATCH);
        text_err(&field, "A", DIDNT_MATCH);
    }

    #[test]
    fn test_float_field_text() {
        let field = Field::number_with(NumberOptions::float());
        text_ok(&field, "12", json!(12));
        text_ok(&field, "0", json!(0));
        text_ok(&field, "-1", json!(-1));
        text_ok(&field, "-1.2", json!(-1.2));
        text_ok(&field, "1.2", json!(1.2));
        text_err(&field, "A", DIDNT_MATCH);
    }

    #[test]
    fn test_string_and_boolean() {
        ok(&Field::string(), json!("a"), json!("a"));
        err(&Field::string(), json!(1), "Not a string");
        ok(&Field::boolean(), json!(false), json!(false));
        err(&Field::boolean(), json!("true"), "Not a boolean");
        text_ok(&Field::boolean(), "true", json!(true));
        text_err(&Field::boolean(), "yes", DIDNT_MATCH);
    }

    #[test]
    fn test_constant_and_choice() {
        let get = Field::constant("GET");
        ok(&get, json!("GET"), json!("GET"));
        err(&get, json!("POST"), "Expected \"GET\"");

        let status = Field::choice([200, 404]);
        ok(&status, json!(404), json!(404));
        err(&status, json!(500), "Not one of the allowed values");
        text_ok(&status, "200", json!(200));
    }

    #[test]
    fn test_optional() {
        let field = Field::string().optional();
        assert!(!field.is_required());
        assert!(Field::string().is_required());
        ok(&field, Value::Null, Value::Null);
        ok(&field, json!("x"), json!("x"));
        err(&field, json!(1), "Not a string");
        assert_eq!(field.clone().optional(), field);
    }

    #[test]
    fn test_object_required_and_optional_keys() {
        let field = Field::object([
            ("title", Field::string()),
            ("note", Field::string().optional()),
        ]);

        let error = field.validate(&json!({"note": "x"})).unwrap_err();
        assert_eq!(error.path, "$.title");
        assert_eq!(error.message, MISSING_KEY);

        ok(&field, json!({"title": "a"}), json!({"title": "a"}));
        ok(
            &field,
            json!({"title": "a", "note": "b", "other": 1}),
            json!({"title": "a", "note": "b"}),
        );
        err(&field, json!([]), "Not an object");
    }

    #[test]
    fn test_nested_error_paths() {
        let field = Field::object([("items", Field::array(Field::object([("id", Field::number())])))]);
        let error = field
            .validate(&json!({"items": [{"id": 1}, {"id": 2.5}]}))
            .unwrap_err();
        assert_eq!(error.path, "$.items[1].id");
        assert_eq!(error.received, json!(2.5));
    }

    #[test]
    fn test_array() {
        let field = Field::array(Field::number());
        ok(&field, json!([3, 1, 2]), json!([3, 1, 2]));
        err(&field, json!({}), "Not an array");
        text_ok(&field, "7", json!([7]));
        assert_eq!(
            field.validate_text(&json!(["1", "2"])).unwrap(),
            json!([1, 2])
        );
    }

    #[test]
    fn test_union_first_match_wins() {
        let field = Field::union([Field::number(), Field::string()]);
        ok(&field, json!(4), json!(4));
        ok(&field, json!("four"), json!("four"));
        err(&field, json!(true), "No alternative matched boolean");
    }

    #[test]
    fn test_wildcard_object() {
        let field = Field::wildcard_object();
        ok(&field, json!({"a": [1]}), json!({"a": [1]}));
        ok(&field, json!("{\"a\": 1}"), json!({"a": 1}));
        err(&field, json!("[1]"), "Not an object");
        assert_eq!(field.serialize(&json!({"a": 1})), json!({"a": 1}));
    }

    #[test]
    fn test_undefined() {
        let field = Field::undefined();
        ok(&field, json!({"anything": true}), Value::Null);
        assert_eq!(field.serialize(&json!(1)), Value::Null);

        let body = Field::object([("payload", Field::undefined())]);
        ok(&body, json!({}), json!({}));
    }

    #[test]
    fn test_tags() {
        assert_eq!(Field::number().tag(), "ratify.NumberField");
        assert_eq!(Field::string().optional().tag(), "ratify.OptionalField");
        assert_eq!(Field::wildcard_object().tag(), "ratify.WildcardObjectField");
        assert!(Field::undefined().tag().starts_with(TAG_NAMESPACE));
    }

    #[test]
    fn test_description_survives_optional() {
        let field = Field::string().describe("Display name").optional();
        assert_eq!(field.description(), Some("Display name"));
        let FieldKind::Optional(inner) = field.kind() else {
            panic!("expected optional");
        };
        assert_eq!(inner.description(), Some("Display name"));
    }

    #[test]
    fn test_union_serialize_uses_accepting_alternative() {
        let field = Field::union([
            Field::object([("kind", Field::constant("a")), ("n", Field::number())]),
            Field::object([("kind", Field::constant("b")), ("s", Field::string().optional())]),
        ]);
        let value = field.validate(&json!({"kind": "b"})).unwrap();
        assert_eq!(field.serialize(&value), json!({"kind": "b"}));
    }
}

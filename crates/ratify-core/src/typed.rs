//! Fields lifted to Rust types through serde.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::{Field, ValidationError, ValidationMode};

/// Errors from [`Typed`] conversions.
#[derive(Debug, Error)]
pub enum TypedError {
    /// The raw value was rejected by the field.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The field and the Rust type disagree about the shape of the value.
    #[error("value does not fit the declared type: {0}")]
    Mismatch(#[from] serde_json::Error),
}

impl TypedError {
    /// Returns the validation error, if the raw value was rejected.
    #[must_use]
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Mismatch(_) => None,
        }
    }
}

/// A [`Field`] producing values of type `T`.
///
/// Validation runs the field and then deserializes its output into `T`;
/// serialization goes the other way.
///
/// ```
/// use ratify_core::Field;
/// use serde::{Deserialize, Serialize};
/// use serde_json::json;
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Item {
///     id: i64,
///     title: String,
/// }
///
/// let field = Field::object([("id", Field::number()), ("title", Field::string())])
///     .typed::<Item>();
///
/// let item = field.validate(&json!({"id": 7, "title": "Milk"})).unwrap();
/// assert_eq!(item, Item { id: 7, title: "Milk".into() });
/// assert_eq!(field.serialize(&item).unwrap(), json!({"id": 7, "title": "Milk"}));
/// ```
pub struct Typed<T> {
    field: Field,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Typed<T> {
    /// Wraps a field.
    #[must_use]
    pub fn new(field: Field) -> Self {
        Self {
            field,
            _marker: PhantomData,
        }
    }

    /// Returns the underlying field.
    #[must_use]
    pub fn field(&self) -> &Field {
        &self.field
    }
}

impl<T: DeserializeOwned> Typed<T> {
    /// Validates structured raw data into a `T`.
    pub fn validate(&self, raw: &Value) -> Result<T, TypedError> {
        self.validate_with(raw, ValidationMode::Json)
    }

    /// Validates raw data in the given mode into a `T`.
    pub fn validate_with(&self, raw: &Value, mode: ValidationMode) -> Result<T, TypedError> {
        let valid = self.field.validate_with(raw, mode)?;
        Ok(self.convert(valid)?)
    }

    /// Converts a value the field has already accepted into a `T`.
    ///
    /// The value is not validated again.
    pub fn convert(&self, valid: Value) -> Result<T, serde_json::Error> {
        serde_json::from_value(valid)
    }
}

impl<T: Serialize> Typed<T> {
    /// Serializes a `T` into raw data.
    ///
    /// Fails only when `T` does not serialize into a JSON value.
    pub fn serialize(&self, value: &T) -> Result<Value, TypedError> {
        let raw = serde_json::to_value(value)?;
        Ok(self.field.serialize(&raw))
    }
}

impl<T> Clone for Typed<T> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Typed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Typed")
            .field("type", &std::any::type_name::<T>())
            .field("field", &self.field)
            .finish()
    }
}

impl Field {
    /// Lifts this field to the Rust type `T`.
    #[must_use]
    pub fn typed<T>(self) -> Typed<T> {
        Typed::new(self)
    }
}

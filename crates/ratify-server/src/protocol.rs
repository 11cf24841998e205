//! Wire protocols and text encodings.
//!
//! A [`WireProtocol`] turns structured values into text and back. The
//! dispatcher only ever calls these two operations, so another encoding can
//! be plugged in through [`ServerConfig`](crate::ServerConfig) without
//! touching routes or handlers.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;

/// Errors raised by wire protocols and text encodings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The payload text could not be parsed.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// A value could not be written as text.
    #[error("failed to serialize payload: {0}")]
    Serialize(String),

    /// Bytes or text do not fit the configured encoding.
    #[error("payload is not valid {encoding}: {reason}")]
    Encoding {
        /// Encoding label.
        encoding: &'static str,
        /// What went wrong.
        reason: String,
    },
}

/// Converts structured values to and from wire text.
pub trait WireProtocol: Send + Sync + fmt::Debug {
    /// Media type sent in the `content-type` header.
    fn media_type(&self) -> &'static str;

    /// Writes a value as text.
    fn serialize(&self, value: &Value) -> Result<String, ProtocolError>;

    /// Parses text into a value.
    ///
    /// Empty (or all-whitespace) text is an absent value.
    fn deserialize(&self, text: &str) -> Result<Value, ProtocolError>;
}

/// JSON text protocol.
///
/// # Example
///
/// ```rust
/// use ratify_server::{JsonProtocol, WireProtocol};
/// use serde_json::json;
///
/// let protocol = JsonProtocol;
/// assert_eq!(protocol.serialize(&json!({"id": 1})).unwrap(), r#"{"id":1}"#);
/// assert_eq!(protocol.deserialize("").unwrap(), json!(null));
/// assert!(protocol.deserialize("{").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonProtocol;

impl WireProtocol for JsonProtocol {
    fn media_type(&self) -> &'static str {
        "application/json"
    }

    fn serialize(&self, value: &Value) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(|e| ProtocolError::Serialize(e.to_string()))
    }

    fn deserialize(&self, text: &str) -> Result<Value, ProtocolError> {
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
}

/// Character encoding of request and response bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8.
    #[default]
    Utf8,
    /// ISO-8859-1; every byte is one character.
    Latin1,
}

impl TextEncoding {
    /// Returns the charset label used in `content-type`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "iso-8859-1",
        }
    }

    /// Decodes body bytes into text.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Encoding`] if the bytes are not valid UTF-8.
    pub fn decode(self, bytes: &[u8]) -> Result<String, ProtocolError> {
        match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|e| ProtocolError::Encoding {
                encoding: self.label(),
                reason: e.to_string(),
            }),
            Self::Latin1 => Ok(bytes.iter().copied().map(char::from).collect()),
        }
    }

    /// Encodes text into body bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Encoding`] if a character cannot be
    /// represented in Latin-1.
    pub fn encode(self, text: &str) -> Result<Bytes, ProtocolError> {
        match self {
            Self::Utf8 => Ok(Bytes::copy_from_slice(text.as_bytes())),
            Self::Latin1 => text
                .chars()
                .map(|c| {
                    u8::try_from(u32::from(c)).map_err(|_| ProtocolError::Encoding {
                        encoding: self.label(),
                        reason: format!("character {c:?} is outside Latin-1"),
                    })
                })
                .collect::<Result<Vec<u8>, _>>()
                .map(Bytes::from),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "latin1" | "latin-1" | "iso-8859-1" => Ok(Self::Latin1),
            other => Err(format!("unsupported text encoding '{other}'")),
        }
    }
}

//! Test response wrapper.

use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use ratify_server::{Disposition, Outcome};
use serde::de::DeserializeOwned;

use crate::error::TestError;

/// A dispatched response with helpers for assertions.
#[derive(Debug, Clone)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<Bytes>,
    disposition: Disposition,
}

impl TestResponse {
    /// Wraps a dispatcher outcome.
    #[must_use]
    pub fn from_outcome(outcome: Outcome) -> Self {
        Self {
            status: outcome.status,
            headers: outcome.headers,
            body: outcome.body,
            disposition: outcome.disposition,
        }
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the status code as a u16.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns how the dispatcher concluded the request.
    #[must_use]
    pub fn disposition(&self) -> Disposition {
        self.disposition
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets a header value by name.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// Gets a header value as a string.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(header::CONTENT_TYPE.as_str())
    }

    /// Returns `true` if a body was written.
    #[must_use]
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Returns the body bytes, empty when none was written.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        self.body.as_deref().unwrap_or_default()
    }

    /// Returns the body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body().to_vec()).map_err(|e| TestError::BodyRead(format!("invalid UTF-8: {e}")))
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if no body was written or it does not deserialize.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        let body = self
            .body
            .as_ref()
            .ok_or_else(|| TestError::BodyRead("response has no body".to_string()))?;
        Ok(serde_json::from_slice(body)?)
    }

    /// Deserializes the body as a JSON value.
    ///
    /// # Errors
    ///
    /// See [`json`](Self::json).
    pub fn json_value(&self) -> Result<serde_json::Value, TestError> {
        self.json()
    }

    /// Asserts the status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status(&self, expected: u16) -> &Self {
        assert_eq!(
            self.status.as_u16(),
            expected,
            "expected status {expected}, got {} ({})",
            self.status,
            self.disposition.as_str()
        );
        self
    }

    /// Asserts the disposition.
    ///
    /// # Panics
    ///
    /// Panics if the disposition doesn't match.
    pub fn assert_disposition(&self, expected: Disposition) -> &Self {
        assert_eq!(self.disposition, expected, "unexpected disposition for status {}", self.status);
        self
    }

    /// Asserts that a header exists with the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the header doesn't exist or doesn't match.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let expected = expected.as_ref();
        let actual = self
            .header_str(name)
            .unwrap_or_else(|| panic!("header '{name}' not found"));
        assert_eq!(actual, expected, "header '{name}': expected '{expected}', got '{actual}'");
        self
    }

    /// Asserts that the body is JSON equal to `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the body is missing, not JSON, or different.
    pub fn assert_json(&self, expected: &serde_json::Value) -> &Self {
        match self.json_value() {
            Ok(actual) => assert_eq!(&actual, expected, "unexpected JSON body"),
            Err(e) => panic!("expected JSON body: {e}"),
        }
        self
    }

    /// Asserts that no body was written.
    ///
    /// # Panics
    ///
    /// Panics if a body was written.
    pub fn assert_no_body(&self) -> &Self {
        assert!(self.body.is_none(), "expected no body, got {:?}", self.text());
        self
    }
}

//! Transport seams.
//!
//! The dispatcher reads requests through [`IncomingRequest`] and writes
//! responses through [`OutgoingResponse`], so it can run behind hyper, in
//! memory for tests, or behind any other HTTP stack.

use std::future::Future;
use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Response, StatusCode, Uri};
use http_body_util::{BodyExt, Full};

use crate::error::BoxError;

/// Future resolving to a full request body.
pub type BodyFuture<'a> = Pin<Box<dyn Future<Output = Result<Bytes, BoxError>> + Send + 'a>>;

/// A request as seen by the dispatcher.
pub trait IncomingRequest: Send {
    /// Returns the request method.
    fn method(&self) -> &Method;

    /// Returns the request target, path and query.
    fn uri(&self) -> &Uri;

    /// Returns the request headers.
    fn headers(&self) -> &HeaderMap;

    /// Reads the whole body.
    ///
    /// Called at most once, and only for routes that declare a data field.
    fn read_body(&mut self) -> BodyFuture<'_>;
}

impl<B> IncomingRequest for http::Request<B>
where
    B: hyper::body::Body + Send + Unpin,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    fn method(&self) -> &Method {
        self.method()
    }

    fn uri(&self) -> &Uri {
        self.uri()
    }

    fn headers(&self) -> &HeaderMap {
        self.headers()
    }

    fn read_body(&mut self) -> BodyFuture<'_> {
        Box::pin(async move {
            let collected = self.body_mut().collect().await.map_err(Into::into)?;
            Ok(collected.to_bytes())
        })
    }
}

/// A response sink.
pub trait OutgoingResponse {
    /// What the sink produces once finished.
    type Output;

    /// Sets the status line.
    fn set_status(&mut self, status: StatusCode);

    /// Appends a header.
    fn append_header(&mut self, name: HeaderName, value: HeaderValue);

    /// Appends body bytes.
    fn write_body(&mut self, chunk: &[u8]);

    /// Finishes the response.
    fn end(self) -> Self::Output;
}

/// Buffers a response into an [`http::Response`].
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
}

impl ResponseWriter {
    /// Creates an empty `200 OK` writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutgoingResponse for ResponseWriter {
    type Output = Response<Full<Bytes>>;

    fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn append_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.append(name, value);
    }

    fn write_body(&mut self, chunk: &[u8]) {
        self.body.extend_from_slice(chunk);
    }

    fn end(self) -> Self::Output {
        let mut response = Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::CONTENT_TYPE;

    #[tokio::test]
    async fn test_http_request_reads_body() {
        let mut request = http::Request::builder()
            .method(Method::POST)
            .uri("/items?page=2")
            .header("x-token", "abc")
            .body(Full::new(Bytes::from_static(b"{\"title\":\"Milk\"}")))
            .unwrap();

        assert_eq!(IncomingRequest::method(&request), Method::POST);
        assert_eq!(IncomingRequest::uri(&request).query(), Some("page=2"));
        assert_eq!(IncomingRequest::headers(&request)["x-token"], "abc");

        let body = request.read_body().await.unwrap();
        assert_eq!(body, Bytes::from_static(b"{\"title\":\"Milk\"}"));
    }

    #[test]
    fn test_response_writer() {
        let mut writer = ResponseWriter::new();
        writer.set_status(StatusCode::CREATED);
        writer.append_header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        writer.append_header(HeaderName::from_static("x-tag"), HeaderValue::from_static("a"));
        writer.append_header(HeaderName::from_static("x-tag"), HeaderValue::from_static("b"));
        writer.write_body(b"{\"id\":");
        writer.write_body(b"1}");

        let response = writer.end();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get_all("x-tag").iter().count(), 2);

        let body = tokio_test::block_on(response.into_body().collect()).unwrap().to_bytes();
        assert_eq!(body, Bytes::from_static(b"{\"id\":1}"));
    }
}

//! In-memory test client.

use http::Method;
use ratify_server::{Dispatcher, Route, ServerConfig};
use serde::Serialize;

use crate::error::TestError;
use crate::request::TestRequestBuilder;
use crate::response::TestResponse;

/// Dispatches requests to routes without a socket.
///
/// Requests go through the same [`Dispatcher`] the HTTP server uses, so
/// validation, status selection and error classification are identical.
///
/// # Example
///
/// ```
/// use ratify_core::Field;
/// use ratify_router::SegmentChain;
/// use ratify_server::{AppError, Reply, Request, ResponseSpec, Route, ServerConfig};
/// use ratify_test::TestClient;
///
/// # tokio_test::block_on(async {
/// let ping = Route::get(SegmentChain::root().literal("/ping"))
///     .response(ResponseSpec::data(Field::string()))
///     .handler(|_: Request| async { Ok::<_, AppError>(Reply::new("pong")) });
///
/// let client = TestClient::new(ServerConfig::default(), [ping]);
/// let response = client.get("/ping").send().await;
/// assert_eq!(response.status_code(), 200);
/// assert_eq!(response.text().unwrap(), "\"pong\"");
/// # });
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct TestClient {
    dispatcher: Dispatcher,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a client for `routes`.
    pub fn new(config: ServerConfig, routes: impl IntoIterator<Item = Route>) -> Self {
        Self::from_dispatcher(Dispatcher::new(config, routes))
    }

    /// Creates a client around an existing dispatcher.
    pub fn from_dispatcher(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            default_headers: Vec::new(),
        }
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Starts a GET request.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Starts a PUT request.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Starts a PATCH request.
    pub fn patch(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PATCH, uri)
    }

    /// Starts a DELETE request.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        let mut builder = TestRequestBuilder::new(method, uri);
        for (name, value) in &self.default_headers {
            builder = builder.header(name, value);
        }
        TestClientRequest { client: self, builder }
    }
}

/// A request builder bound to a [`TestClient`].
#[derive(Debug)]
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl TestClientRequest<'_> {
    /// Appends a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.builder = self.builder.content_type(content_type);
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<bytes::Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sets a form-urlencoded body.
    pub fn form<T: Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.form(value);
        self
    }

    /// Dispatches the request.
    ///
    /// # Panics
    ///
    /// Panics if the request could not be built; use
    /// [`try_send`](Self::try_send) to get the error instead.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(e) => panic!("failed to build test request: {e}"),
        }
    }

    /// Dispatches the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be built.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?.into_http_request();
        let outcome = self.client.dispatcher.dispatch(request).await;
        Ok(TestResponse::from_outcome(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratify_core::Field;
    use ratify_router::SegmentChain;
    use ratify_server::{AppError, Disposition, Reply, Request, ResponseSpec};
    use serde_json::{json, Value};

    fn echo_headers() -> Route {
        Route::get(SegmentChain::root().literal("/whoami"))
            .headers(Field::object([("x-user", Field::string())]))
            .response(ResponseSpec::data(Field::string()))
            .handler(|req: Request<(), (), (), Value>| async move {
                let user = req.headers["x-user"].as_str().unwrap_or_default().to_string();
                Ok::<_, AppError>(Reply::new(user))
            })
    }

    fn create_item() -> Route {
        Route::post(SegmentChain::root().literal("/items"))
            .data(Field::object([("title", Field::string())]))
            .response(ResponseSpec::data(Field::object([("title", Field::string())])))
            .handler(|req: Request<(), (), Value>| async move { Ok::<_, AppError>(Reply::new(req.data)) })
    }

    #[tokio::test]
    async fn test_default_headers() {
        let client = TestClient::new(ServerConfig::default(), [echo_headers()]).with_default_header("x-user", "ada");
        let response = client.get("/whoami").send().await;
        response.assert_status(200).assert_json(&json!("ada"));
    }

    #[tokio::test]
    async fn test_missing_header_is_validation_failure() {
        let client = TestClient::new(ServerConfig::default(), [echo_headers()]);
        let response = client.get("/whoami").send().await;
        response
            .assert_status(400)
            .assert_disposition(Disposition::ValidationFailed);
        assert_eq!(response.json_value().unwrap()["part"], "headers");
    }

    #[tokio::test]
    async fn test_json_body_round_trip() {
        let client = TestClient::new(ServerConfig::default(), [create_item()]);
        let response = client.post("/items").json(&json!({"title": "Milk"})).send().await;
        response.assert_status(200).assert_json(&json!({"title": "Milk"}));
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let client = TestClient::new(ServerConfig::default(), [create_item()]);
        let response = client.delete("/items").send().await;
        response.assert_status(404).assert_no_body();
    }

    #[tokio::test]
    async fn test_try_send_reports_build_errors() {
        let client = TestClient::new(ServerConfig::default(), Vec::<Route>::new());
        let result = client.get("/").header("bad header", "x").try_send().await;
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }
}

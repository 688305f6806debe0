//! In-process HTTP client and response assertions
//!
//! Requests are dispatched straight into the host's router; no port is bound.

use std::collections::HashMap;

use axum::body::Body;
use axum::http::{header, Method, Request};
use http_body_util::BodyExt;
use serde_json::Value as JsonValue;
use stagehand_http::WebHost;

use crate::{TestError, TestResult};

/// Fluent client bound to a single host
#[derive(Debug, Clone)]
pub struct TestClient {
    host: WebHost,
    headers: HashMap<String, String>,
}

impl TestClient {
    pub fn new(host: WebHost) -> Self {
        Self {
            host,
            headers: HashMap::new(),
        }
    }

    /// Set a header for all requests
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Send `Authorization: Bearer {token}` with all requests
    pub fn bearer_token(self, token: impl AsRef<str>) -> Self {
        let value = format!("Bearer {}", token.as_ref());
        self.header(header::AUTHORIZATION.as_str(), value)
    }

    pub fn get(&self, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(self.clone(), Method::GET, path.into())
    }

    pub fn post(&self, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(self.clone(), Method::POST, path.into())
    }

    pub fn put(&self, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(self.clone(), Method::PUT, path.into())
    }

    pub fn patch(&self, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(self.clone(), Method::PATCH, path.into())
    }

    pub fn delete(&self, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(self.clone(), Method::DELETE, path.into())
    }
}

/// Request under construction
pub struct RequestBuilder {
    client: TestClient,
    method: Method,
    path: String,
    headers: HashMap<String, String>,
    query: Vec<(String, String)>,
    body: Option<String>,
}

impl RequestBuilder {
    fn new(client: TestClient, method: Method, path: String) -> Self {
        Self {
            client,
            method,
            path,
            headers: HashMap::new(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn bearer_token(self, token: impl AsRef<str>) -> Self {
        let value = format!("Bearer {}", token.as_ref());
        self.header(header::AUTHORIZATION.as_str(), value)
    }

    /// Serialize `data` as the JSON body
    pub fn json<T: serde::Serialize>(mut self, data: &T) -> TestResult<Self> {
        self.body = Some(serde_json::to_string(data)?);
        Ok(self.header(header::CONTENT_TYPE.as_str(), "application/json"))
    }

    /// Plain text body
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    fn uri(&self) -> TestResult<String> {
        with_query(&self.path, &self.query)
    }

    /// Dispatch the request through the host's router
    pub async fn send(self) -> TestResult<TestResponse> {
        let mut request = Request::builder().method(self.method.clone()).uri(self.uri()?);
        for (name, value) in self.client.headers.iter().chain(self.headers.iter()) {
            request = request.header(name.as_str(), value.as_str());
        }
        let request = request
            .body(self.body.map(Body::from).unwrap_or_else(Body::empty))
            .map_err(|e| TestError::Request(e.to_string()))?;

        let response = self.client.host.handle(request).await;
        let status_code = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| TestError::Request(e.to_string()))?
            .to_bytes();

        Ok(TestResponse {
            status_code,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// Buffered response with assertion methods
#[derive(Debug, Clone)]
pub struct TestResponse {
    status_code: u16,
    /// Header names are lowercase
    headers: HashMap<String, String>,
    body: String,
}

impl TestResponse {
    pub fn status(&self) -> u16 {
        self.status_code
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Get response body as JSON
    pub fn json(&self) -> TestResult<JsonValue> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Deserialize the body into `T`
    pub fn json_as<T: serde::de::DeserializeOwned>(&self) -> TestResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Assert the response status code
    pub fn assert_status(self, expected_status: u16) -> Self {
        if self.status_code != expected_status {
            panic!(
                "Expected status {}, got {}: {}",
                expected_status, self.status_code, self.body
            );
        }
        self
    }

    /// Assert a 200 status
    pub fn assert_ok(self) -> Self {
        self.assert_status(200)
    }

    /// Assert the response status is successful (2xx)
    pub fn assert_success(self) -> Self {
        if !(200..300).contains(&self.status_code) {
            panic!("Expected successful status, got {}: {}", self.status_code, self.body);
        }
        self
    }

    pub fn assert_header(self, name: &str, expected_value: &str) -> Self {
        match self.header(name) {
            Some(value) if value == expected_value => {}
            Some(value) => panic!(
                "Expected header '{}' to be '{}', got '{}'",
                name, expected_value, value
            ),
            None => panic!("Expected header '{}' not found", name),
        }
        self
    }

    /// Assert JSON response contains specific fields/values
    pub fn assert_json_contains(self, expected: JsonValue) -> TestResult<Self> {
        let actual = self.json()?;
        if !json_contains(&actual, &expected) {
            return Err(TestError::Assertion {
                message: format!("Expected JSON to contain: {}, got: {}", expected, actual),
            });
        }
        Ok(self)
    }

    /// Assert the error code of a `{ "error": { "code" } }` body
    pub fn assert_error_code(self, expected_code: &str) -> TestResult<Self> {
        let actual = self.json()?;
        match actual.pointer("/error/code").and_then(JsonValue::as_str) {
            Some(code) if code == expected_code => Ok(self),
            _ => Err(TestError::Assertion {
                message: format!("Expected error code '{}', got: {}", expected_code, actual),
            }),
        }
    }

    pub fn assert_body_contains(self, expected_text: &str) -> TestResult<Self> {
        if !self.body.contains(expected_text) {
            return Err(TestError::Assertion {
                message: format!(
                    "Expected body to contain '{}', got: {}",
                    expected_text, self.body
                ),
            });
        }
        Ok(self)
    }
}

/// Objects match on the expected keys; arrays match when every expected item
/// is found somewhere in the actual array.
fn json_contains(actual: &JsonValue, expected: &JsonValue) -> bool {
    match (actual, expected) {
        (JsonValue::Object(actual_map), JsonValue::Object(expected_map)) => {
            expected_map.iter().all(|(key, expected_value)| {
                actual_map
                    .get(key)
                    .map_or(false, |actual_value| json_contains(actual_value, expected_value))
            })
        }
        (JsonValue::Array(actual_arr), JsonValue::Array(expected_arr)) => {
            expected_arr.iter().all(|expected_item| {
                actual_arr
                    .iter()
                    .any(|actual_item| json_contains(actual_item, expected_item))
            })
        }
        _ => actual == expected,
    }
}

/// Append percent-encoded `pairs` to `path`
fn with_query(path: &str, pairs: &[(String, String)]) -> TestResult<String> {
    if pairs.is_empty() {
        return Ok(path.to_string());
    }
    let query =
        serde_urlencoded::to_string(pairs).map_err(|e| TestError::Request(e.to_string()))?;
    Ok(format!("{}?{}", path, query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status_code: u16, body: JsonValue) -> TestResponse {
        TestResponse {
            status_code,
            headers: HashMap::from([("content-type".to_string(), "application/json".to_string())]),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_json_contains() {
        let actual = json!({"name": "Widget", "quantity": 3, "tags": ["a", "b"]});

        assert!(json_contains(&actual, &json!({"name": "Widget"})));
        assert!(json_contains(&actual, &json!({"tags": ["b"]})));
        assert!(!json_contains(&actual, &json!({"name": "Gadget"})));
        assert!(!json_contains(&actual, &json!({"missing": 1})));
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let response = response(200, json!({}));
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        response.assert_header("content-type", "application/json");
    }

    #[test]
    fn test_error_code_assertion() {
        let response = response(401, json!({"error": {"code": "UNAUTHORIZED_ACCESS"}}));
        let response = response.assert_status(401).assert_error_code("UNAUTHORIZED_ACCESS").unwrap();
        assert!(matches!(
            response.assert_error_code("ACCESS_FORBIDDEN"),
            Err(TestError::Assertion { .. })
        ));
    }

    #[test]
    fn test_query_pairs_are_encoded() {
        let pairs = vec![
            ("q".to_string(), "desk lamp".to_string()),
            ("tag".to_string(), "a&b=c".to_string()),
        ];
        assert_eq!(
            with_query("/products", &pairs).unwrap(),
            "/products?q=desk+lamp&tag=a%26b%3Dc"
        );
        assert_eq!(with_query("/products", &[]).unwrap(), "/products");
    }

    #[test]
    #[should_panic(expected = "Expected status 200, got 404")]
    fn test_status_assertion_panics() {
        response(404, json!({})).assert_ok();
    }
}

//! Request options and response values for the executor

use pawsit_domain::constants::LOGGED_OUT_MESSAGE;
use pawsit_domain::{PawsitError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Per-call options: method, headers, JSON body and an optional abort signal
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    /// Caller-side cancellation, merged with the executor's own timeout
    pub cancel: Option<CancellationToken>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self { method: Method::GET, headers: HeaderMap::new(), body: None, cancel: None }
    }
}

impl RequestOptions {
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn post(body: Value) -> Self {
        Self { method: Method::POST, body: Some(body), ..Self::default() }
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a header; invalid names or values are rejected up front
    ///
    /// # Errors
    /// Returns `PawsitError::Config` for a malformed header.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| PawsitError::Config(format!("invalid header name '{name}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| PawsitError::Config(format!("invalid value for header '{name}': {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    #[must_use]
    pub fn cancel_with(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// A response handed back to the caller, success or not
///
/// Non-2xx statuses are values, not errors; only transport failures,
/// expired authentication and cancellation surface as `Err`.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
    /// Produced locally without touching the network
    pub synthetic: bool,
}

impl ApiResponse {
    /// The local 403 returned for non-auth calls after logout
    #[must_use]
    pub fn logged_out() -> Self {
        Self {
            status: 403,
            headers: HeaderMap::new(),
            body: serde_json::json!({ "message": LOGGED_OUT_MESSAGE }).to_string(),
            synthetic: true,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON
    ///
    /// # Errors
    /// Returns `PawsitError::Serialization` if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Join a base URL and an endpoint path with exactly one slash between them
#[must_use]
pub fn join_url(base_url: &str, endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        return endpoint.to_string();
    }
    let base = base_url.trim_end_matches('/');
    let path = endpoint.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_with_single_slash() {
        assert_eq!(join_url("http://h/api", "/users"), "http://h/api/users");
        assert_eq!(join_url("http://h/api/", "users"), "http://h/api/users");
        assert_eq!(join_url("http://h/api", ""), "http://h/api");
        assert_eq!(join_url("http://h/api", "https://other/x"), "https://other/x");
    }

    #[test]
    fn logged_out_response_shape() {
        let response = ApiResponse::logged_out();
        assert_eq!(response.status, 403);
        assert!(response.synthetic);
        let body: Value = response.json().unwrap();
        assert_eq!(body["message"], "User is logged out");
    }

    #[test]
    fn rejects_bad_header() {
        assert!(RequestOptions::get().header("bad header", "x").is_err());
        let options = RequestOptions::get().header("X-Trace", "abc").unwrap();
        assert_eq!(options.headers["x-trace"], "abc");
    }
}

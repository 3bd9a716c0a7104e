//! HTTP transport for the lock vault REST API.
//!
//! Every endpoint in this crate goes through [`ApiClient::call`], which owns
//! the rules shared by all requests:
//!
//! - Only `GET`, `POST` and `PUT` are supported
//! - Exactly HTTP 200 is success; any other status (other 2xx included) is
//!   an [`ApiError::Status`] carrying the raw body text
//! - Successful bodies are parsed as JSON and logged at debug level
//!
//! # Example Usage
//!
//! ```no_run
//! use lockvault_network::{ApiClient, ApiClientConfig, HttpMethod};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(ApiClientConfig::default())?;
//! let locks = client
//!     .call(
//!         HttpMethod::Get,
//!         "v4/kmsdevicekey/",
//!         &[("username", "alice"), ("apikey", "token")],
//!         None::<&()>,
//!     )
//!     .await?;
//! println!("{locks}");
//! # Ok(())
//! # }
//! ```
//!
//! # Design Principles
//!
//! The client is a thin transport layer:
//! - **No automatic retry**: callers decide what a failure means
//! - **No ambient state**: base URL and client id live in the client value
//! - **Typed decoding at the edges**: endpoint modules turn JSON into records
//!   and report missing fields as [`ApiError::MalformedResponse`]

use lockvault_core::constants::{DEFAULT_BASE_URL, DEFAULT_CLIENT_ID};
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, trace};

/// Configuration for the API client
///
/// # Example
///
/// ```
/// use lockvault_network::ApiClientConfig;
/// use std::time::Duration;
///
/// let config = ApiClientConfig::default()
///     .base_url("http://127.0.0.1:8080")
///     .timeout(Duration::from_secs(5));
/// assert_eq!(config.base_url, "http://127.0.0.1:8080/");
/// ```
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL, always ending with `/`
    pub base_url: String,

    /// Client identifier sent as `apikey` before a token exists
    pub client_id: String,

    /// Timeout for a whole request (connect, send, receive).
    ///
    /// `None` leaves requests bounded only by the transport's own defaults.
    pub timeout: Option<Duration>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            timeout: None,
        }
    }
}

impl ApiClientConfig {
    /// Set the base URL. A trailing `/` is added when missing.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.base_url = url;
        self
    }

    /// Set the client identifier
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// HTTP verbs the transport accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, ApiError> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            other => Err(ApiError::UnsupportedMethod {
                method: other.to_string(),
            }),
        }
    }
}

/// Errors that can occur while talking to the API
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP verb outside GET/POST/PUT
    #[error("HTTP method '{method}' is not supported")]
    UnsupportedMethod { method: String },

    /// Server answered with anything but 200
    #[error("{method} to '{url}' failed with error '{status}':\n{body}")]
    Status {
        method: HttpMethod,
        url: String,
        status: u16,
        body: String,
    },

    /// Request could not be sent or the body could not be read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 200 response whose body is not JSON
    #[error("Response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// JSON response missing an expected field
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// Endpoint known upstream but not verified to work
    #[error("Operation not implemented: {operation}")]
    Unimplemented { operation: String },
}

impl ApiError {
    /// Create a new malformed response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a new unimplemented operation error.
    pub fn unimplemented(operation: impl Into<String>) -> Self {
        Self::Unimplemented {
            operation: operation.into(),
        }
    }

    /// Status code carried by a [`ApiError::Status`] error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Decode a JSON value into a typed response record.
///
/// Missing or mistyped fields become [`ApiError::MalformedResponse`] naming
/// the response shape that failed.
pub(crate) fn decode<T: DeserializeOwned>(value: Value, shape: &str) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::malformed(format!("{shape}: {e}")))
}

/// HTTP client for the lock vault REST API
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
}

impl ApiClient {
    /// Create a new API client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (TLS backend
    /// initialisation failure).
    pub fn new(config: ApiClientConfig) -> Result<Self, ApiError> {
        debug!("Creating API client for {}", config.base_url);

        let mut builder =
            reqwest::Client::builder().user_agent(format!("lockvault/{}", lockvault_core::VERSION));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        let mut base_url = config.base_url;
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            http,
            base_url,
            client_id: config.client_id,
        })
    }

    /// Base URL every endpoint path is appended to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client identifier used for unauthenticated account calls
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Absolute URL for an endpoint path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Issue one request and return the parsed JSON body
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The request cannot be sent (`ApiError::Http`)
    /// - The status is not exactly 200 (`ApiError::Status`)
    /// - The body of a 200 response is not JSON (`ApiError::Decode`)
    pub async fn call<B>(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path);
        trace!(%method, %url, params = query.len(), "Sending request");

        let mut request = self.http.request(method.to_reqwest(), &url).query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!("{} to '{}' could not be sent: {}", method, url, e);
            ApiError::Http(e)
        })?;

        let status = response.status();
        let text = response.text().await?;

        if status != StatusCode::OK {
            return Err(ApiError::Status {
                method,
                url,
                status: status.as_u16(),
                body: text,
            });
        }

        let json: Value = serde_json::from_str(&text)?;
        debug!(
            "{} to '{}' returned:\n{}",
            method,
            url,
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| text.clone())
        );

        Ok(json)
    }
}

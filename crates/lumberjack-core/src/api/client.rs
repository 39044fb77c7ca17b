use crate::api::pagination::{DEFAULT_PAGE_SIZE, Page};
use crate::api::url::{Endpoint, QueryParams};
use crate::error::ApiError;
use crate::utils::error_helpers::convert_request_error;
use crate::utils::validation::validate_url;
use once_cell::sync::OnceCell;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "https://treeherder.mozilla.org";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("lumberjack/", env!("CARGO_PKG_VERSION"));
const MAX_ERROR_MESSAGE_LEN: usize = 300;

/// Settings shared by both execution modes of a [`TreeherderClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub timeout: Duration,
    pub api_key: Option<String>,
    pub page_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            api_key: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

/// Whether a response body is consumed as JSON or as plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Text,
}

/// Method, URL, query and headers of one call, shared by both modes.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub query: QueryParams,
    pub format: BodyFormat,
}

impl RequestSpec {
    pub fn get_json(url: impl Into<String>, query: QueryParams) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            query,
            format: BodyFormat::Json,
        }
    }

    pub fn get_text(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            query: Vec::new(),
            format: BodyFormat::Text,
        }
    }
}

/// Client for the Treeherder REST API.
///
/// Holds one lazily created transport per execution mode. The async
/// transport is created on the first `async` call, the blocking one on the
/// first call made through [`TreeherderClient::blocking`]. Both are released
/// by [`TreeherderClient::close`] or when the client is dropped.
///
/// The blocking transport must not be used from inside an async runtime.
#[derive(Debug)]
pub struct TreeherderClient {
    config: ClientConfig,
    async_http: OnceCell<reqwest::Client>,
    blocking_http: OnceCell<reqwest::blocking::Client>,
}

impl Default for TreeherderClient {
    fn default() -> Self {
        Self::from_validated(ClientConfig::default())
    }
}

impl TreeherderClient {
    pub fn new(server_url: impl Into<String>) -> crate::Result<Self> {
        Self::with_config(ClientConfig::new(server_url))
    }

    /// Fails with a usage error unless the server URL is http(s).
    pub fn with_config(config: ClientConfig) -> crate::Result<Self> {
        validate_url(&config.server_url)?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(mut config: ClientConfig) -> Self {
        config.server_url = config.server_url.trim_end_matches('/').to_string();
        config.page_size = config.page_size.max(1);
        Self {
            config,
            async_http: OnceCell::new(),
            blocking_http: OnceCell::new(),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.config.server_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_authenticated(&self) -> bool {
        self.config.api_key.is_some()
    }

    pub fn has_async_connection(&self) -> bool {
        self.async_http.get().is_some()
    }

    pub fn has_blocking_connection(&self) -> bool {
        self.blocking_http.get().is_some()
    }

    /// Release both transports. A later call recreates the one it needs.
    pub fn close(&mut self) {
        self.async_http.take();
        self.blocking_http.take();
    }

    /// Absolute URL of an endpoint on this client's server.
    pub fn build_url(&self, endpoint: &Endpoint) -> String {
        endpoint.url(&self.config.server_url)
    }

    /// Whether `url` lives on the configured API server. Only those
    /// requests carry the API key; log artifacts are hosted elsewhere.
    fn is_api_url(&self, url: &str) -> bool {
        match url.strip_prefix(self.config.server_url.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
            None => false,
        }
    }

    fn api_key_for(&self, spec: &RequestSpec) -> Option<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|_| self.is_api_url(&spec.url))
    }

    fn timeout_secs(&self) -> u64 {
        self.config.timeout.as_secs()
    }

    fn default_headers(&self, format: BodyFormat) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if format == BodyFormat::Json {
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }
        headers
    }

    fn async_http(&self) -> Result<&reqwest::Client, ApiError> {
        self.async_http.get_or_try_init(|| {
            reqwest::Client::builder()
                .timeout(self.config.timeout)
                .user_agent(USER_AGENT)
                .build()
                .map_err(|e| convert_request_error(e, "client_init", self.timeout_secs()))
        })
    }

    fn blocking_http(&self) -> Result<&reqwest::blocking::Client, ApiError> {
        self.blocking_http.get_or_try_init(|| {
            reqwest::blocking::Client::builder()
                .timeout(self.config.timeout)
                .user_agent(USER_AGENT)
                .build()
                .map_err(|e| convert_request_error(e, "client_init", self.timeout_secs()))
        })
    }

    /// Send `spec` and return the body of a successful response.
    pub async fn send(&self, spec: &RequestSpec) -> Result<String, ApiError> {
        let mut request = self
            .async_http()?
            .request(spec.method.clone(), &spec.url)
            .headers(self.default_headers(spec.format))
            .query(&spec.query);
        if let Some(api_key) = self.api_key_for(spec) {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| convert_request_error(e, &spec.url, self.timeout_secs()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| convert_request_error(e, &spec.url, self.timeout_secs()))?;

        check_status(status, &spec.url, body)
    }

    /// Blocking twin of [`TreeherderClient::send`].
    pub fn send_blocking(&self, spec: &RequestSpec) -> Result<String, ApiError> {
        let mut request = self
            .blocking_http()?
            .request(spec.method.clone(), &spec.url)
            .headers(self.default_headers(spec.format))
            .query(&spec.query);
        if let Some(api_key) = self.api_key_for(spec) {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .map_err(|e| convert_request_error(e, &spec.url, self.timeout_secs()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| convert_request_error(e, &spec.url, self.timeout_secs()))?;

        check_status(status, &spec.url, body)
    }

    /// Issue a request and decode the body as JSON.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        params: &[(String, String)],
    ) -> Result<Value, ApiError> {
        let spec = RequestSpec {
            method,
            url: url.to_string(),
            query: params.to_vec(),
            format: BodyFormat::Json,
        };
        let body = self.send(&spec).await?;
        decode_json(&body, url)
    }

    pub fn request_blocking(
        &self,
        method: Method,
        url: &str,
        params: &[(String, String)],
    ) -> Result<Value, ApiError> {
        let spec = RequestSpec {
            method,
            url: url.to_string(),
            query: params.to_vec(),
            format: BodyFormat::Json,
        };
        let body = self.send_blocking(&spec)?;
        decode_json(&body, url)
    }

    /// GET an absolute URL and return the raw text body.
    pub async fn request_text(&self, url: &str) -> Result<String, ApiError> {
        self.send(&RequestSpec::get_text(url)).await
    }

    pub fn request_text_blocking(&self, url: &str) -> Result<String, ApiError> {
        self.send_blocking(&RequestSpec::get_text(url))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: QueryParams,
    ) -> Result<T, ApiError> {
        let body = self.send(&RequestSpec::get_json(url, query)).await?;
        decode_json(&body, url)
    }

    pub(crate) fn get_json_blocking<T: DeserializeOwned>(
        &self,
        url: &str,
        query: QueryParams,
    ) -> Result<T, ApiError> {
        let body = self.send_blocking(&RequestSpec::get_json(url, query))?;
        decode_json(&body, url)
    }

    pub(crate) async fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
        query: QueryParams,
    ) -> Result<Page<T>, ApiError> {
        let value: Value = self.get_json(url, query).await?;
        Page::from_value(value, url)
    }

    pub(crate) fn get_page_blocking<T: DeserializeOwned>(
        &self,
        url: &str,
        query: QueryParams,
    ) -> Result<Page<T>, ApiError> {
        let value: Value = self.get_json_blocking(url, query)?;
        Page::from_value(value, url)
    }
}

fn decode_json<T: DeserializeOwned>(body: &str, endpoint: &str) -> Result<T, ApiError> {
    crate::map_json_error!(serde_json::from_str(body), endpoint)
}

/// Map a completed HTTP exchange onto the error taxonomy.
pub fn check_status(status: StatusCode, endpoint: &str, body: String) -> Result<String, ApiError> {
    if status.is_success() {
        return Ok(body);
    }

    let message = error_message(status, &body);
    match status.as_u16() {
        404 => Err(ApiError::NotFound {
            status: Some(404),
            endpoint: endpoint.to_string(),
            message,
        }),
        401 | 403 => Err(ApiError::Unauthorized {
            status: status.as_u16(),
            endpoint: endpoint.to_string(),
            server_message: message,
        }),
        code => Err(ApiError::Http {
            status: code,
            endpoint: endpoint.to_string(),
            message,
        }),
    }
}

/// Prefer the `detail` field Treeherder puts in JSON error bodies.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(detail) = map.get("detail").and_then(Value::as_str) {
            return detail.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string();
    }
    crate::utils::text::truncate_text(trimmed, MAX_ERROR_MESSAGE_LEN)
}

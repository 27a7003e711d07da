//! HTTP client for the school backend.
//!
//! Owns base URL resolution, JSON headers, the bearer token, and the mapping
//! of non-success responses onto [`ClientError::Http`]. No retries, no cache.

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;
use url::Url;

use super::endpoints::Endpoint;
use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::logging::log_request_completed;
use crate::request_span;
use crate::session::Session;

/// Per-request options
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    /// Attach the session's bearer token
    pub auth: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            headers: Vec::new(),
            auth: false,
        }
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self { method, ..Self::default() }
    }

    pub fn with_body<B: Serialize>(mut self, body: &B) -> ClientResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn authenticated(mut self) -> Self {
        self.auth = true;
        self
    }
}

/// Shared REST client
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    session: Session,
}

impl ApiClient {
    /// Build a client against the configured API base
    pub fn new(config: &Config, session: Session) -> ClientResult<Self> {
        let base = config.api_base()?;
        Self::with_base_url(base.as_str(), session, config.request_timeout_duration())
    }

    pub fn with_base_url(base: &str, session: Session, timeout: Duration) -> ClientResult<Self> {
        // Parsed once so a malformed base fails here, not on the first call
        let parsed = Url::parse(base)?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base: parsed.as_str().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Base URL concatenated with the endpoint path
    pub fn url_for(&self, endpoint: &str) -> ClientResult<Url> {
        let path = if endpoint.starts_with('/') {
            endpoint.to_string()
        } else {
            format!("/{endpoint}")
        };
        Ok(Url::parse(&format!("{}{}", self.base, path))?)
    }

    /// Perform one request and decode the JSON response
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> ClientResult<T> {
        let span = request_span!(options.method, endpoint);
        self.send(endpoint, options).instrument(span).await
    }

    async fn send<T: DeserializeOwned>(&self, endpoint: &str, options: RequestOptions) -> ClientResult<T> {
        let url = self.url_for(endpoint)?;
        let headers = self.build_headers(&options)?;
        let started = Instant::now();

        let mut builder = self.http.request(options.method.clone(), url).headers(headers);
        if let Some(body) = &options.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::Span::current().record("status_code", status.as_u16());
        tracing::Span::current().record("duration_ms", elapsed);
        log_request_completed(options.method.as_str(), endpoint, status.as_u16(), elapsed);

        if !status.is_success() {
            let body = serde_json::from_slice::<Value>(&bytes).ok();
            return Err(ClientError::from_response(status, body.as_ref()));
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// `Content-Type` first, then the bearer token, then caller headers,
    /// each later entry overriding an earlier one with the same name.
    fn build_headers(&self, options: &RequestOptions) -> ClientResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if options.auth {
            let token = self.session.token()?.ok_or(ClientError::Unauthenticated)?;
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ClientError::TokenStore("stored token is not a valid header value".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ClientError::Validation(format!("invalid header name: {name}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ClientError::Validation(format!("invalid value for header {name}")))?;
            headers.insert(name, value);
        }

        Ok(headers)
    }

    /// Authenticated GET
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> ClientResult<T> {
        self.request(&endpoint.path(), RequestOptions::default().authenticated())
            .await
    }

    /// Authenticated POST with a JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, endpoint: &Endpoint, body: &B) -> ClientResult<T> {
        let options = RequestOptions::new(Method::POST).with_body(body)?.authenticated();
        self.request(&endpoint.path(), options).await
    }

    /// Authenticated PUT with a JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, endpoint: &Endpoint, body: &B) -> ClientResult<T> {
        let options = RequestOptions::new(Method::PUT).with_body(body)?.authenticated();
        self.request(&endpoint.path(), options).await
    }

    /// Authenticated DELETE
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> ClientResult<T> {
        self.request(&endpoint.path(), RequestOptions::new(Method::DELETE).authenticated())
            .await
    }

    /// Unauthenticated health probe
    pub async fn health(&self) -> ClientResult<Value> {
        self.request(&Endpoint::Health.path(), RequestOptions::default())
            .await
    }
}

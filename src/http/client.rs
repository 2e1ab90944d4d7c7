// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Platform HTTP client
//!
//! The un-instrumented transport both network surfaces bottom out in. Request
//! bodies are encoded here; timeouts are reported as structured
//! [`Error::Timeout`] so the capture layer can classify them without parsing
//! reqwest's messages.

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::Client;

use super::request::Request;
use super::response::Response;
use super::DEFAULT_USER_AGENT;
use crate::error::{Error, Result};

/// Transport settings for [`HttpClient`]
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub user_agent: String,
    /// Applied when a request carries no timeout of its own
    pub timeout: Duration,
    pub max_redirects: usize,
    /// Accept invalid certificates (dangerous!)
    pub accept_invalid_certs: bool,
    pub default_headers: HeaderMap,
    pub proxy: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert("accept", HeaderValue::from_static("*/*"));

        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_redirects: 10,
            accept_invalid_certs: false,
            default_headers,
            proxy: None,
        }
    }
}

impl HttpClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    pub fn proxy(mut self, url: impl Into<String>) -> Self {
        self.proxy = Some(url.into());
        self
    }

    /// Add a header sent with every request; invalid names or values are an error
    pub fn default_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::try_from(name)
            .map_err(|e| Error::config(format!("Invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::try_from(value)
            .map_err(|e| Error::config(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }
}

/// Platform HTTP client, the passthrough both network surfaces end up in
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(Policy::limited(config.max_redirects))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .default_headers(config.default_headers.clone());

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    /// Send a request and buffer the whole response body
    pub async fn execute(&self, request: Request) -> Result<Response> {
        let start = Instant::now();
        let timeout = request.timeout.unwrap_or(self.config.timeout);

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .timeout(timeout);

        if let Some(ref body) = request.body {
            if !request.headers.contains_key("content-type") {
                if let Some(content_type) = body.content_type() {
                    builder = builder.header("content-type", content_type);
                }
            }
            builder = builder.body(body.to_bytes()?);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(e, &request, timeout))?;

        let status = response.status();
        let headers = response.headers().clone();
        let final_url = response.url().clone();
        let redirected = final_url != request.url;

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, &request, timeout))?;
        let elapsed = start.elapsed().as_millis() as u64;

        tracing::trace!(
            method = %request.method,
            url = %request.url,
            status = status.as_u16(),
            elapsed_ms = elapsed,
            "Platform call finished"
        );

        Ok(Response::new(
            status, headers, body, final_url, redirected, elapsed,
        ))
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

fn transport_error(err: reqwest::Error, request: &Request, timeout: Duration) -> Error {
    if err.is_timeout() {
        Error::timeout_with_url(
            format!("{} request", request.method),
            timeout.as_millis() as u64,
            request.url.as_str(),
        )
    } else {
        Error::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new().unwrap();
        assert_eq!(client.config().user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_config_builder() {
        let config = HttpClientConfig::new()
            .user_agent("probe/1.0")
            .timeout(Duration::from_secs(5))
            .max_redirects(0)
            .default_header("x-trace", "on")
            .unwrap();
        assert_eq!(config.user_agent, "probe/1.0");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.default_headers["x-trace"], "on");

        assert!(matches!(
            HttpClientConfig::new().default_header("bad header", "v"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_invalid_proxy_is_config_error() {
        let config = HttpClientConfig::new().proxy("not a proxy url");
        assert!(matches!(
            HttpClient::with_config(config),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_refused_connection_is_network_failure() {
        let client = HttpClient::new().unwrap();
        let err = client
            .execute(Request::get("http://127.0.0.1:1/").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::Network));
    }
}

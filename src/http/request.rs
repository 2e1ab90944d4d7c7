// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Outbound call descriptor for the promise surface

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use url::Url;

use super::body::Body;
use crate::error::Result;

/// Per-request deadline unless the caller sets one
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A call as handed to [`crate::network::Network::fetch`]
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Absolute target URL
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Body>,
    pub timeout: Option<Duration>,
}

impl Request {
    pub fn get(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::POST, url)
    }

    /// Fails with [`crate::Error::Url`] unless `url` is absolute
    pub fn new(method: Method, url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            method,
            url: Url::parse(url.as_ref())?,
            headers: HeaderMap::new(),
            body: None,
            timeout: Some(DEFAULT_TIMEOUT),
        })
    }

    /// Set a header; names or values the HTTP layer cannot carry are skipped
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        match (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::debug!(header = name.as_ref(), "Skipping invalid request header"),
        }
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Structured body; the value is kept as-is for the capture layer and only
    /// encoded when the call is sent
    pub fn json<T: Serialize>(self, data: &T) -> Result<Self> {
        let value = serde_json::to_value(data)?;
        Ok(self
            .body(Body::json(value))
            .header("content-type", "application/json"))
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn url_str(&self) -> &str {
        self.url.as_str()
    }
}

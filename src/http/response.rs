// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Buffered response returned by the platform client
//!
//! The body is held as [`Bytes`], so the capture layer reads it through a
//! refcounted clone and the caller's copy is never consumed.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use url::Url;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Final URL after redirects
    pub url: Url,
    pub redirected: bool,
    /// Wall time spent in the platform client
    pub elapsed_ms: u64,
}

impl Response {
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
        url: Url,
        redirected: bool,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            url,
            redirected,
            elapsed_ms,
        }
    }

    /// Response with no headers, for adapters that synthesize replies
    pub fn from_status(status: u16, url: Url, body: impl Into<Bytes>) -> Result<Self> {
        let status = StatusCode::from_u16(status)
            .map_err(|e| Error::other(format!("Invalid status code: {}", e)))?;
        Ok(Self::new(status, HeaderMap::new(), body.into(), url, false, 0))
    }

    /// Replace a header; values the HTTP layer cannot carry are ignored
    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// `ok` in entries: 2xx
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Canonical reason phrase, empty for unregistered codes
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Decode the body as UTF-8
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| Error::other(e.to_string()))
    }

    pub fn url_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://example.com").unwrap()
    }

    #[test]
    fn test_synthesized_response() {
        let resp = Response::from_status(404, url(), "nope")
            .unwrap()
            .with_header("content-type", "text/plain");
        assert!(!resp.is_success());
        assert_eq!(resp.status_code(), 404);
        assert_eq!(resp.status_text(), "Not Found");
        assert_eq!(resp.content_type(), Some("text/plain"));
        assert!(!resp.redirected);
    }

    #[test]
    fn test_invalid_status_rejected() {
        assert!(Response::from_status(1000, url(), "").is_err());
    }

    #[test]
    fn test_unregistered_status_has_empty_text() {
        let resp = Response::from_status(599, url(), "").unwrap();
        assert_eq!(resp.status_text(), "");
    }

    #[test]
    fn test_body_text_and_clone_share_bytes() {
        let resp = Response::from_status(200, url(), "Hello, World!").unwrap();
        let copy = resp.bytes().clone();
        assert_eq!(resp.text().unwrap(), "Hello, World!");
        assert_eq!(copy.as_ptr(), resp.body.as_ptr());

        let bad = Response::from_status(200, url(), vec![0xff, 0xfe]).unwrap();
        assert!(bad.text().is_err());
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for netcapture
//!
//! Network failures carry a structured [`FailureKind`] wherever the underlying
//! client exposes one, so classification does not have to rely on message text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for netcapture operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for netcapture
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport-level failure with a known kind
    #[error("Network error: {message}")]
    Network { kind: FailureKind, message: String },

    /// Timeout error
    #[error("Operation timed out after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        url: Option<String>,
    },

    /// CORS blocked
    #[error("CORS blocked: {url} from {origin}")]
    CorsBlocked { url: String, origin: String },

    /// Request aborted by the caller
    #[error("Request aborted: {0}")]
    Aborted(String),

    /// Event surface used out of order (send before open, ...)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Instrumentation-internal failure
    #[error("Capture error: {0}")]
    Capture(String),

    /// Listener failure
    #[error("Listener error: {0}")]
    Listener(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Structured classification of a failed network call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Blocked by cross-origin policy
    Cors,
    /// Deadline exceeded
    Timeout,
    /// Cancelled by the caller
    Abort,
    /// The fetch itself failed (bad request construction, body errors)
    Fetch,
    /// Connection, DNS or other transport failure
    Network,
}

impl FailureKind {
    /// Lowercase name used in tags and analysis output
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Cors => "cors",
            FailureKind::Timeout => "timeout",
            FailureKind::Abort => "abort",
            FailureKind::Fetch => "fetch",
            FailureKind::Network => "network",
        }
    }
}

impl Error {
    /// Create a network error of the given kind
    pub fn network(kind: FailureKind, msg: impl Into<String>) -> Self {
        Error::Network {
            kind,
            message: msg.into(),
        }
    }

    /// Create a timeout error with URL
    pub fn timeout_with_url(
        operation: impl Into<String>,
        duration_ms: u64,
        url: impl Into<String>,
    ) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
            url: Some(url.into()),
        }
    }

    /// Create a CORS error
    pub fn cors(url: impl Into<String>, origin: impl Into<String>) -> Self {
        Error::CorsBlocked {
            url: url.into(),
            origin: origin.into(),
        }
    }

    /// Create an abort error
    pub fn aborted(msg: impl Into<String>) -> Self {
        Error::Aborted(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a capture-internal error
    pub fn capture(msg: impl Into<String>) -> Self {
        Error::Capture(msg.into())
    }

    /// Create a listener error
    pub fn listener(msg: impl Into<String>) -> Self {
        Error::Listener(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Structured failure kind, if the error carries one.
    ///
    /// Returns `None` for errors that only have a message; those are
    /// classified by text downstream.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Error::Network { kind, .. } => Some(*kind),
            Error::Timeout { .. } => Some(FailureKind::Timeout),
            Error::CorsBlocked { .. } => Some(FailureKind::Cors),
            Error::Aborted(_) => Some(FailureKind::Abort),
            Error::Http(e) => {
                if e.is_timeout() {
                    Some(FailureKind::Timeout)
                } else if e.is_connect() || e.is_request() {
                    Some(FailureKind::Network)
                } else if e.is_builder() || e.is_body() || e.is_decode() {
                    Some(FailureKind::Fetch)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Short variant name, reported as the error "name" in entries
    pub fn name(&self) -> &'static str {
        match self {
            Error::Http(_) => "HttpError",
            Error::Url(_) => "UrlError",
            Error::Serialization(_) => "SerializationError",
            Error::Network { .. } => "NetworkError",
            Error::Timeout { .. } => "TimeoutError",
            Error::CorsBlocked { .. } => "CorsError",
            Error::Aborted(_) => "AbortError",
            Error::InvalidState(_) => "InvalidStateError",
            Error::Config(_) => "ConfigError",
            Error::Capture(_) => "CaptureError",
            Error::Listener(_) => "ListenerError",
            Error::Other(_) => "Error",
        }
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        self.failure_kind() == Some(FailureKind::Timeout)
    }

    /// Get URL if available
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Timeout { url: Some(u), .. } => Some(u),
            Error::CorsBlocked { url, .. } => Some(url),
            Error::Http(e) => e.url().map(|u| u.as_str()),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

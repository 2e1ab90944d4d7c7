// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # netcapture - Network Traffic Capture
//!
//! Instruments outbound network calls and turns every request, response and
//! transport failure into a sanitized, classified, JSON-serializable entry.
//!
//! ## Features
//!
//! - Two call surfaces: promise-style `fetch` and event-driven XHR with ready states
//! - Swappable adapters: capture installs as a decorator and restores the originals
//! - Request/terminal correlation through an in-flight registry
//! - Redaction of sensitive headers and query parameters, length caps
//! - Categories, severity scores and tags for every entry
//! - Listener fan-out with a bounded queue of recent entries
//!
//! ## Example
//!
//! ```rust,no_run
//! use netcapture::{CaptureConfig, HttpClient, Network, NetworkCapture, Request};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let network = Network::new(HttpClient::new()?);
//!     let capture = NetworkCapture::new(CaptureConfig::for_development())?;
//!
//!     capture.on_entry(|entry| {
//!         println!("{}", serde_json::to_string(entry)?);
//!         Ok(())
//!     });
//!     capture.start(&network);
//!
//!     network.fetch(Request::get("https://api.example.com/users")?).await?;
//!
//!     capture.stop(&network);
//!     Ok(())
//! }
//! ```

pub mod capture;
pub mod error;
pub mod http;
pub mod network;

// Re-exports for convenience

// Capture
pub use capture::{
    AppContext, CaptureConfig, CaptureStats, EntryListener, ListenerId, NetworkCapture,
    SanitizePolicy,
};
pub use capture::{channel_listener, json_lines_listener, tracing_listener};
pub use capture::{Analyzer, Category, Formatter, Sanitizer, Severity, SeverityLevel};

// Errors
pub use error::{Error, FailureKind, Result};

// HTTP
pub use http::{Body, HttpClient, HttpClientConfig, Request, Response};

// Network
pub use network::{Entry, EntryLevel, RequestKind, Subtype, Timing};
pub use network::{Interceptor, Network, NetworkClient};
pub use network::{ReadyState, XhrBackend, XhrState, XmlHttpRequest};

/// netcapture version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

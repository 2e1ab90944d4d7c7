// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP layer for netcapture
//!
//! The platform's real network client. The capture pipeline never talks to
//! reqwest directly; it wraps [`HttpClient`] behind the network surfaces in
//! [`crate::network`].

mod body;
mod client;
mod request;
mod response;

pub use body::{Body, Structured};
pub use client::{HttpClient, HttpClientConfig};
pub use request::Request;
pub use response::Response;

/// User agent sent by the platform client and recorded in entries
pub const DEFAULT_USER_AGENT: &str = concat!("netcapture/", env!("CARGO_PKG_VERSION"));

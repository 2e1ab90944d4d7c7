// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Capture entry types
//!
//! One [`Entry`] is emitted per lifecycle stage of a captured call. The
//! serialized field names are the collector-facing wire contract; keep them
//! stable.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capture::analyzer::{Analysis, Category, Severity};
use crate::capture::config::AppContext;
use crate::capture::util::PerformanceSnapshot;
use crate::error::FailureKind;
use crate::http::Body;

/// Which network surface issued the call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    /// Promise-returning call (`fetch`-like)
    #[serde(rename = "promise-call")]
    Fetch,
    /// Event-driven object with a ready state (XHR-like)
    #[serde(rename = "event-driven-call")]
    Xhr,
}

/// Everything known about a call when it is issued.
///
/// Values are raw; sanitization happens in the formatter.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// Request id
    pub id: String,
    /// Request URL
    pub url: String,
    /// HTTP method
    pub method: String,
    /// Normalized request headers
    pub headers: BTreeMap<String, String>,
    /// Request body
    pub body: Option<Body>,
    /// Issuing surface
    pub kind: RequestKind,
    /// Start marker (ms on the capture clock)
    pub start_time: f64,
}

/// Start/end markers of a completed call, in ms on the capture clock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    pub start: f64,
    pub end: f64,
    pub duration: f64,
}

impl Timing {
    /// Build from two clock markers
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            duration: (end - start).max(0.0),
        }
    }
}

/// Always `"network"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Network,
}

/// Lifecycle stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subtype {
    Request,
    Response,
    Error,
}

/// Log level of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryLevel {
    Info,
    Warn,
    Error,
}

/// Sanitized request section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInfo {
    /// Request id
    pub id: String,
    /// Sanitized URL
    pub url: String,
    /// HTTP method
    pub method: String,
    /// Sanitized headers (absent when header capture is off)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// Sanitized body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Issuing surface
    pub kind: RequestKind,
    /// Start marker
    pub start_time: f64,
}

/// Sanitized response section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseInfo {
    /// Originating request id
    pub request_id: String,
    /// Sanitized URL
    pub url: String,
    /// HTTP method of the request
    pub method: String,
    /// Status code
    pub status: u16,
    /// Status text
    pub status_text: String,
    /// 2xx status
    pub ok: bool,
    /// Final URL differs from the requested one
    pub redirected: bool,
    /// Sanitized headers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// Sanitized body or placeholder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Content type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Final ready state (event surface only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_state: Option<u8>,
    /// Issuing surface
    pub kind: RequestKind,
}

/// Failure section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    /// Originating request id
    pub request_id: String,
    /// Sanitized URL
    pub url: String,
    /// HTTP method
    pub method: String,
    /// Error name
    pub name: String,
    /// Error message
    pub message: String,
    /// Classified failure kind
    pub failure: FailureKind,
    /// Issuing surface
    pub kind: RequestKind,
}

/// Entry metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub user_agent: String,
    pub timestamp: DateTime<Utc>,
}

/// Capture entry (envelope)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Entry id
    pub id: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Entry type
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Lifecycle stage
    pub subtype: Subtype,
    /// Log level
    pub level: EntryLevel,
    /// Application context
    pub application: AppContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
    /// Derived category
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Deduplicated tags
    pub tags: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
    /// Metadata
    pub metadata: Metadata,
}

impl Entry {
    /// Create an empty entry of the given stage
    pub fn new(
        subtype: Subtype,
        level: EntryLevel,
        category: Category,
        application: AppContext,
        user_agent: impl Into<String>,
    ) -> Self {
        let timestamp = Utc::now();
        Self {
            id: format!("entry_{}", uuid::Uuid::new_v4().simple()),
            timestamp,
            entry_type: EntryType::Network,
            subtype,
            level,
            application,
            request: None,
            response: None,
            error: None,
            timing: None,
            category,
            severity: None,
            tags: BTreeSet::new(),
            performance: None,
            analysis: None,
            metadata: Metadata {
                user_agent: user_agent.into(),
                timestamp,
            },
        }
    }

    /// Id of the request this entry belongs to
    pub fn request_id(&self) -> Option<&str> {
        if let Some(ref request) = self.request {
            return Some(&request.id);
        }
        if let Some(ref response) = self.response {
            return Some(&response.request_id);
        }
        self.error.as_ref().map(|e| e.request_id.as_str())
    }

    /// Terminal entries close a request lifecycle
    pub fn is_terminal(&self) -> bool {
        matches!(self.subtype, Subtype::Response | Subtype::Error)
    }

    /// Serialize to a JSON value
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let mut entry = Entry::new(
            Subtype::Request,
            EntryLevel::Info,
            Category::ApiRequest,
            AppContext::new("shop").session_id("s1"),
            "agent/1.0",
        );
        entry.request = Some(RequestInfo {
            id: "req_1".to_string(),
            url: "https://api.example.com/users".to_string(),
            method: "GET".to_string(),
            headers: None,
            body: None,
            kind: RequestKind::Fetch,
            start_time: 1.5,
        });

        let json = entry.to_json().unwrap();
        assert_eq!(json["type"], "network");
        assert_eq!(json["subtype"], "request");
        assert_eq!(json["level"], "info");
        assert_eq!(json["category"], "API Request");
        assert_eq!(json["application"]["sessionId"], "s1");
        assert_eq!(json["request"]["kind"], "promise-call");
        assert_eq!(json["request"]["startTime"], 1.5);
        assert_eq!(json["metadata"]["userAgent"], "agent/1.0");
        assert!(json.get("timing").is_none());
        assert_eq!(entry.request_id(), Some("req_1"));
        assert!(!entry.is_terminal());
    }

    #[test]
    fn test_timing_never_negative() {
        let timing = Timing::new(10.0, 4.0);
        assert_eq!(timing.duration, 0.0);
        assert_eq!(Timing::new(1.0, 3.5).duration, 2.5);
    }
}

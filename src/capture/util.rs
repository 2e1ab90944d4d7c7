// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Capture helpers: ids, URL filtering, header normalization, snapshots

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

use super::config::SanitizePolicy;

/// Placeholder for a header value that is not valid visible ASCII/UTF-8
pub const UNREADABLE_HEADER: &str = "[unreadable header value]";

const BINARY_MEDIA_PREFIXES: &[&str] = &["image/", "video/", "audio/", "application/octet-stream"];

/// Monotonic clock shared by one capture session
#[derive(Debug, Clone, Copy)]
pub struct CaptureClock {
    origin: Instant,
}

impl Default for CaptureClock {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureClock {
    /// Start a clock now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Milliseconds since the clock started
    pub fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Point-in-time view of the capture session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSnapshot {
    /// Wall clock time of the snapshot
    pub captured_at: DateTime<Utc>,
    /// Time since the capture clock started
    pub uptime_ms: f64,
    /// Requests issued but not yet resolved
    pub active_requests: usize,
    /// Entries emitted so far
    pub entries_emitted: u64,
}

/// Collect a performance snapshot
pub fn collect_performance_snapshot(
    clock: &CaptureClock,
    active_requests: usize,
    entries_emitted: u64,
) -> PerformanceSnapshot {
    PerformanceSnapshot {
        captured_at: Utc::now(),
        uptime_ms: clock.now_ms(),
        active_requests,
        entries_emitted,
    }
}

/// Generate a request id: base36 time component plus random suffix
pub fn generate_request_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("req_{}_{}", to_base36(millis), &random[..9])
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Decide whether a URL is captured.
///
/// Exclude patterns win over include patterns. A non-empty include list is an
/// allow-list; an empty one does not restrict anything.
pub fn should_capture(url: &str, policy: &SanitizePolicy) -> bool {
    if policy.exclude_patterns.iter().any(|p| p.is_match(url)) {
        return false;
    }

    if policy.include_patterns.is_empty() {
        return true;
    }

    policy.include_patterns.iter().any(|p| p.is_match(url))
}

/// Binary media types are never captured as bodies
pub fn should_capture_body(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return true;
    };
    let content_type = content_type.trim().to_ascii_lowercase();
    !BINARY_MEDIA_PREFIXES
        .iter()
        .any(|prefix| content_type.starts_with(prefix))
}

/// Lowercase header names; join repeated headers with ", "
pub fn normalize_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut normalized: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers.iter() {
        let value = value.to_str().unwrap_or(UNREADABLE_HEADER);
        normalized
            .entry(name.as_str().to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    normalized
}

/// Parse a raw `name: value` header block (one header per line)
pub fn parse_raw_headers(raw: &str) -> BTreeMap<String, String> {
    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    for line in raw.lines() {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        if name.is_empty() {
            continue;
        }
        let value = value.trim();
        headers
            .entry(name)
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    headers
}

/// Content type from normalized headers
pub fn content_type(headers: &BTreeMap<String, String>) -> Option<&str> {
    headers.get("content-type").map(|s| s.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use reqwest::header::HeaderValue;

    fn policy(exclude: &[&str], include: &[&str]) -> SanitizePolicy {
        SanitizePolicy {
            exclude_patterns: exclude.iter().map(|p| Regex::new(p).unwrap()).collect(),
            include_patterns: include.iter().map(|p| Regex::new(p).unwrap()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let policy = policy(&["x"], &["y"]);
        assert!(!should_capture("https://example.com/x/y", &policy));
        assert!(should_capture("https://example.com/y", &policy));
        assert!(!should_capture("https://example.com/z", &policy));
    }

    #[test]
    fn test_empty_include_means_no_restriction() {
        let policy = policy(&["/health"], &[]);
        assert!(should_capture("https://example.com/users", &policy));
        assert!(!should_capture("https://example.com/health", &policy));
    }

    #[test]
    fn test_should_capture_body() {
        assert!(should_capture_body(Some("application/json")));
        assert!(should_capture_body(None));
        assert!(!should_capture_body(Some("image/png")));
        assert!(!should_capture_body(Some("Video/MP4")));
        assert!(!should_capture_body(Some("audio/ogg")));
        assert!(!should_capture_body(Some("application/octet-stream")));
    }

    #[test]
    fn test_request_ids_are_unique() {
        let ids: std::collections::HashSet<String> =
            (0..1000).map(|_| generate_request_id()).collect();
        assert_eq!(ids.len(), 1000);
        assert!(ids.iter().all(|id| id.starts_with("req_")));
    }

    #[test]
    fn test_normalize_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.append("accept", HeaderValue::from_static("text/html"));
        headers.append("accept", HeaderValue::from_static("application/json"));
        headers.insert("x-raw", HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap());

        let normalized = normalize_headers(&headers);
        assert_eq!(normalized["content-type"], "application/json");
        assert_eq!(normalized["accept"], "text/html, application/json");
        assert_eq!(normalized["x-raw"], UNREADABLE_HEADER);
    }

    #[test]
    fn test_parse_raw_headers() {
        let raw = "Content-Type: application/json\r\nX-Request-Id: abc\r\nmalformed\r\n";
        let headers = parse_raw_headers(raw);
        assert_eq!(headers.len(), 2);
        assert_eq!(content_type(&headers), Some("application/json"));
        assert_eq!(headers["x-request-id"], "abc");
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn test_performance_snapshot() {
        let clock = CaptureClock::new();
        let snapshot = collect_performance_snapshot(&clock, 2, 7);
        assert_eq!(snapshot.active_requests, 2);
        assert_eq!(snapshot.entries_emitted, 7);
        assert!(snapshot.uptime_ms >= 0.0);
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Redaction and truncation of captured data
//!
//! Everything that leaves the process goes through here first. The sanitizer
//! never fails: anything it cannot render becomes a fixed placeholder.

use std::collections::BTreeMap;
use std::sync::Arc;

use url::Url;

use super::config::SanitizePolicy;
use crate::http::Body;

/// Replacement for redacted values
pub const REDACTED: &str = "[REDACTED]";
/// Suffix of truncated values
pub const TRUNCATED: &str = "...[TRUNCATED]";
/// Rendering of an empty form body
pub const EMPTY_FORM: &str = "[Empty form data]";
/// Rendering of a body that could not be serialized
pub const UNSERIALIZABLE: &str = "[Unserializable body]";

/// Sanitizer bound to one policy
#[derive(Debug, Clone)]
pub struct Sanitizer {
    policy: Arc<SanitizePolicy>,
}

impl Sanitizer {
    /// Create a sanitizer for a policy
    pub fn new(policy: Arc<SanitizePolicy>) -> Self {
        Self { policy }
    }

    /// Policy in use
    pub fn policy(&self) -> &SanitizePolicy {
        &self.policy
    }

    /// Redact sensitive headers and truncate long values.
    ///
    /// Idempotent: sanitizing the output again yields the same map.
    pub fn sanitize_headers(&self, headers: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        headers
            .iter()
            .map(|(name, value)| {
                let lower = name.to_ascii_lowercase();
                let value = if self.policy.sensitive_headers.contains(&lower) {
                    REDACTED.to_string()
                } else {
                    truncate(value, self.policy.max_header_length)
                };
                (lower, value)
            })
            .collect()
    }

    /// Render a body by payload kind, capped at the body limit
    pub fn sanitize_body(&self, body: &Body) -> String {
        let rendered = match body {
            Body::Text(text) => text.clone(),
            Body::Structured(structured) => match structured.to_json() {
                Ok(json) => json,
                Err(e) => {
                    tracing::debug!(error = %e, "Structured body could not be serialized");
                    return UNSERIALIZABLE.to_string();
                }
            },
            Body::Form(pairs) => {
                if pairs.is_empty() {
                    return EMPTY_FORM.to_string();
                }
                pairs
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<_>>()
                    .join("&")
            }
            Body::Binary(bytes) => return format!("[{} bytes]", bytes.len()),
        };
        self.sanitize_text(&rendered)
    }

    /// Cap free text at the body limit
    pub fn sanitize_text(&self, text: &str) -> String {
        truncate(text, self.policy.max_body_length)
    }

    /// Redact sensitive query parameters in place.
    ///
    /// URLs that fail to parse get the same treatment on their raw `?query`
    /// part instead of an error.
    pub fn sanitize_url(&self, raw: &str) -> String {
        match Url::parse(raw) {
            Ok(mut url) => {
                if let Some(query) = url.query() {
                    let redacted = self.redact_query(query);
                    url.set_query(Some(&redacted));
                }
                url.to_string()
            }
            Err(_) => self.sanitize_url_best_effort(raw),
        }
    }

    fn sanitize_url_best_effort(&self, raw: &str) -> String {
        let Some((base, rest)) = raw.split_once('?') else {
            return raw.to_string();
        };
        let (query, fragment) = match rest.split_once('#') {
            Some((query, fragment)) => (query, Some(fragment)),
            None => (rest, None),
        };

        let mut out = format!("{}?{}", base, self.redact_query(query));
        if let Some(fragment) = fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }

    fn redact_query(&self, query: &str) -> String {
        query
            .split('&')
            .map(|pair| {
                let (raw_name, has_value) = match pair.split_once('=') {
                    Some((name, _)) => (name, true),
                    None => (pair, false),
                };
                if has_value && self.is_sensitive_param(raw_name) {
                    format!("{}={}", raw_name, REDACTED)
                } else {
                    pair.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    fn is_sensitive_param(&self, raw_name: &str) -> bool {
        let name: String = url::form_urlencoded::parse(raw_name.as_bytes())
            .map(|(k, _)| k.into_owned())
            .next()
            .unwrap_or_else(|| raw_name.to_string())
            .to_ascii_lowercase();
        self.policy
            .sensitive_params
            .iter()
            .any(|p| name.contains(p.as_str()))
    }
}

/// Truncate to at most `max` characters, ending in [`TRUNCATED`].
///
/// When `max` is smaller than the marker the result is the bare marker.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(TRUNCATED.chars().count());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(TRUNCATED);
    out
}

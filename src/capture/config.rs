// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Capture configuration
//!
//! Built once, validated, and shared read-only (`Arc`) by every component of
//! the pipeline.

use std::collections::BTreeSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::http::DEFAULT_USER_AGENT;

/// Header names redacted by default
pub const DEFAULT_SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "proxy-authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
    "x-auth-token",
    "x-csrf-token",
    "x-xsrf-token",
];

/// Query parameter name fragments redacted by default
pub const DEFAULT_SENSITIVE_PARAMS: &[&str] = &[
    "token",
    "api_key",
    "apikey",
    "secret",
    "password",
    "passwd",
    "auth",
    "session",
    "signature",
];

/// Application context copied verbatim into every entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppContext {
    /// Application name
    pub name: String,
    /// Session identifier
    pub session_id: String,
    /// Deployment environment
    pub environment: String,
    /// Developer running the session
    pub developer: Option<String>,
    /// Source branch
    pub branch: Option<String>,
}

impl Default for AppContext {
    fn default() -> Self {
        Self {
            name: "app".to_string(),
            session_id: format!("session_{}", uuid::Uuid::new_v4().simple()),
            environment: "development".to_string(),
            developer: None,
            branch: None,
        }
    }
}

impl AppContext {
    /// Create a context with a generated session id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set session id
    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    /// Set environment
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Set developer
    pub fn developer(mut self, developer: impl Into<String>) -> Self {
        self.developer = Some(developer.into());
        self
    }

    /// Set branch
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

/// Redaction, truncation and URL filtering rules
#[derive(Debug, Clone)]
pub struct SanitizePolicy {
    /// Header names (lowercase) whose values are redacted
    pub sensitive_headers: BTreeSet<String>,
    /// Query parameter name fragments (lowercase) whose values are redacted
    pub sensitive_params: Vec<String>,
    /// Maximum header value length in characters
    pub max_header_length: usize,
    /// Maximum body length in characters
    pub max_body_length: usize,
    /// URLs matching any of these are never captured
    pub exclude_patterns: Vec<Regex>,
    /// When non-empty, only URLs matching one of these are captured
    pub include_patterns: Vec<Regex>,
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        Self {
            sensitive_headers: DEFAULT_SENSITIVE_HEADERS
                .iter()
                .map(|h| h.to_string())
                .collect(),
            sensitive_params: DEFAULT_SENSITIVE_PARAMS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            max_header_length: 1_000,
            max_body_length: 10_000,
            exclude_patterns: Vec::new(),
            include_patterns: Vec::new(),
        }
    }
}

/// Capture configuration
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Instrument the promise surface
    pub capture_fetch: bool,
    /// Instrument the event surface
    pub capture_xhr: bool,
    /// Include headers in entries
    pub capture_headers: bool,
    /// Include request bodies in entries
    pub capture_request_body: bool,
    /// Include response bodies in entries
    pub capture_response_body: bool,
    /// Attach a performance snapshot to entries
    pub include_performance: bool,
    /// Attach the analysis sub-object to entries
    pub include_analysis: bool,
    /// Bounded queue size in the capture facade
    pub max_queue_size: usize,
    /// User agent reported in entry metadata
    pub user_agent: String,
    /// Sanitization and filtering rules
    pub policy: SanitizePolicy,
    /// Application context
    pub app: AppContext,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            capture_fetch: true,
            capture_xhr: true,
            capture_headers: true,
            capture_request_body: true,
            capture_response_body: true,
            include_performance: false,
            include_analysis: true,
            max_queue_size: 1_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            policy: SanitizePolicy::default(),
            app: AppContext::default(),
        }
    }
}

impl CaptureConfig {
    /// Create a new capture config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set application context
    pub fn app(mut self, app: AppContext) -> Self {
        self.app = app;
        self
    }

    /// Enable/disable promise surface capture
    pub fn capture_fetch(mut self, enabled: bool) -> Self {
        self.capture_fetch = enabled;
        self
    }

    /// Enable/disable event surface capture
    pub fn capture_xhr(mut self, enabled: bool) -> Self {
        self.capture_xhr = enabled;
        self
    }

    /// Enable/disable header capture
    pub fn capture_headers(mut self, enabled: bool) -> Self {
        self.capture_headers = enabled;
        self
    }

    /// Set body capture toggles
    pub fn capture_bodies(mut self, request: bool, response: bool) -> Self {
        self.capture_request_body = request;
        self.capture_response_body = response;
        self
    }

    /// Set body and header length limits
    pub fn limits(mut self, max_body_length: usize, max_header_length: usize) -> Self {
        self.policy.max_body_length = max_body_length;
        self.policy.max_header_length = max_header_length;
        self
    }

    /// Attach performance snapshots
    pub fn include_performance(mut self, enabled: bool) -> Self {
        self.include_performance = enabled;
        self
    }

    /// Attach analysis sub-objects
    pub fn include_analysis(mut self, enabled: bool) -> Self {
        self.include_analysis = enabled;
        self
    }

    /// Set queue size
    pub fn max_queue_size(mut self, size: usize) -> Self {
        self.max_queue_size = size;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a sensitive header name
    pub fn sensitive_header(mut self, name: impl AsRef<str>) -> Self {
        self.policy
            .sensitive_headers
            .insert(name.as_ref().to_ascii_lowercase());
        self
    }

    /// Add a sensitive query parameter fragment
    pub fn sensitive_param(mut self, name: impl AsRef<str>) -> Self {
        self.policy
            .sensitive_params
            .push(name.as_ref().to_ascii_lowercase());
        self
    }

    /// Add an exclude pattern
    pub fn exclude_pattern(mut self, pattern: &str) -> Result<Self> {
        self.policy.exclude_patterns.push(compile(pattern)?);
        Ok(self)
    }

    /// Add an include pattern
    pub fn include_pattern(mut self, pattern: &str) -> Result<Self> {
        self.policy.include_patterns.push(compile(pattern)?);
        Ok(self)
    }

    /// Verbose capture for local debugging
    pub fn for_development() -> Self {
        Self {
            include_performance: true,
            include_analysis: true,
            ..Default::default()
        }
    }

    /// Lean capture: no bodies, tight limits
    pub fn for_production() -> Self {
        let mut config = Self {
            capture_request_body: false,
            capture_response_body: false,
            include_performance: false,
            include_analysis: false,
            max_queue_size: 200,
            ..Default::default()
        };
        config.app.environment = "production".to_string();
        config.policy.max_header_length = 256;
        config
    }

    /// Check limits and names
    pub fn validate(&self) -> Result<()> {
        if self.policy.max_body_length == 0 {
            return Err(Error::config("max_body_length must be greater than zero"));
        }
        if self.policy.max_header_length == 0 {
            return Err(Error::config("max_header_length must be greater than zero"));
        }
        if self.max_queue_size == 0 {
            return Err(Error::config("max_queue_size must be greater than zero"));
        }
        if self.app.name.trim().is_empty() {
            return Err(Error::config("application name must not be empty"));
        }
        if self.policy.sensitive_params.iter().any(|p| p.is_empty()) {
            return Err(Error::config("sensitive parameter names must not be empty"));
        }
        Ok(())
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::config(format!("Invalid URL pattern '{}': {}", pattern, e)))
}

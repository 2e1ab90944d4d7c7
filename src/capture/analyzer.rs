// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Classification of captured traffic
//!
//! Deterministic rules only: categories, severity scores and tags are pure
//! functions of the URL, method, status, failure and duration.

use std::collections::BTreeSet;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use super::config::AppContext;
use crate::error::FailureKind;

/// Above this a call is "slow"
pub const SLOW_THRESHOLD_MS: f64 = 5000.0;
/// Above this a call is "delayed"
pub const DELAYED_THRESHOLD_MS: f64 = 2000.0;
/// Below this a call is "fast"
pub const FAST_THRESHOLD_MS: f64 = 500.0;

lazy_static! {
    static ref API_PATH: Regex = Regex::new(r"(?i)/(api|rest|v\d+)(/|$)").unwrap();
    static ref AUTH_PATH: Regex = Regex::new(
        r"(?i)/(auth|oauth2?|login|logout|signin|signout|signup|register|token|sessions?|sso)(/|$)"
    )
    .unwrap();
    static ref ASSET_EXT: Regex = Regex::new(
        r"(?i)\.(m?js|css|png|jpe?g|gif|svg|webp|ico|avif|woff2?|ttf|otf|eot|mp4|webm|mp3|wav|ogg|map)$"
    )
    .unwrap();
}

/// Entry category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "GraphQL Request")]
    GraphqlRequest,
    #[serde(rename = "API Request")]
    ApiRequest,
    #[serde(rename = "Static Asset")]
    StaticAsset,
    #[serde(rename = "Authentication")]
    Authentication,
    #[serde(rename = "Data Fetch")]
    DataFetch,
    #[serde(rename = "Data Mutation")]
    DataMutation,
    #[serde(rename = "Data Deletion")]
    DataDeletion,
    #[serde(rename = "HTTP Request")]
    HttpRequest,
    #[serde(rename = "Server Error")]
    ServerError,
    #[serde(rename = "Client Error")]
    ClientError,
    #[serde(rename = "Redirect")]
    Redirect,
    #[serde(rename = "API Success")]
    ApiSuccess,
    #[serde(rename = "Success")]
    Success,
    #[serde(rename = "Unknown")]
    Unknown,
    #[serde(rename = "CORS Error")]
    CorsError,
    #[serde(rename = "Timeout Error")]
    TimeoutError,
    #[serde(rename = "Request Aborted")]
    RequestAborted,
    #[serde(rename = "Fetch Error")]
    FetchError,
    #[serde(rename = "Network Error")]
    NetworkError,
}

impl Category {
    /// Display name, identical to the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::GraphqlRequest => "GraphQL Request",
            Category::ApiRequest => "API Request",
            Category::StaticAsset => "Static Asset",
            Category::Authentication => "Authentication",
            Category::DataFetch => "Data Fetch",
            Category::DataMutation => "Data Mutation",
            Category::DataDeletion => "Data Deletion",
            Category::HttpRequest => "HTTP Request",
            Category::ServerError => "Server Error",
            Category::ClientError => "Client Error",
            Category::Redirect => "Redirect",
            Category::ApiSuccess => "API Success",
            Category::Success => "Success",
            Category::Unknown => "Unknown",
            Category::CorsError => "CORS Error",
            Category::TimeoutError => "Timeout Error",
            Category::RequestAborted => "Request Aborted",
            Category::FetchError => "Fetch Error",
            Category::NetworkError => "Network Error",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity level band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityLevel {
    /// Band a score: >=8 critical, >=6 high, >=4 medium
    pub fn from_score(score: u8) -> Self {
        match score {
            8..=u8::MAX => SeverityLevel::Critical,
            6..=7 => SeverityLevel::High,
            4..=5 => SeverityLevel::Medium,
            _ => SeverityLevel::Low,
        }
    }
}

/// Severity score with the factors that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Severity {
    pub score: u8,
    pub level: SeverityLevel,
    pub factors: Vec<String>,
}

impl Severity {
    fn new(score: u8, factor: impl Into<String>) -> Self {
        Self {
            score,
            level: SeverityLevel::from_score(score),
            factors: vec![factor.into()],
        }
    }

    /// Raise (never lower) the score to `floor`
    fn raise_to(&mut self, floor: u8, factor: impl Into<String>) {
        if self.score < floor {
            self.score = floor;
            self.level = SeverityLevel::from_score(floor);
            self.factors.push(factor.into());
        }
    }
}

/// Static asset kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Script,
    Style,
    Image,
    Font,
    Media,
    Sourcemap,
}

impl AssetKind {
    fn from_extension(ext: &str) -> Option<Self> {
        Some(match ext.to_ascii_lowercase().as_str() {
            "js" | "mjs" => AssetKind::Script,
            "css" => AssetKind::Style,
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico" | "avif" => AssetKind::Image,
            "woff" | "woff2" | "ttf" | "otf" | "eot" => AssetKind::Font,
            "mp4" | "webm" | "mp3" | "wav" | "ogg" => AssetKind::Media,
            "map" => AssetKind::Sourcemap,
            _ => return None,
        })
    }

    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Script => "script",
            AssetKind::Style => "style",
            AssetKind::Image => "image",
            AssetKind::Font => "font",
            AssetKind::Media => "media",
            AssetKind::Sourcemap => "sourcemap",
        }
    }
}

/// Duration bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceBucket {
    Fast,
    Normal,
    Delayed,
    Slow,
}

impl PerformanceBucket {
    /// Bucket a duration in ms
    pub fn from_duration(duration_ms: f64) -> Self {
        if duration_ms > SLOW_THRESHOLD_MS {
            PerformanceBucket::Slow
        } else if duration_ms > DELAYED_THRESHOLD_MS {
            PerformanceBucket::Delayed
        } else if duration_ms < FAST_THRESHOLD_MS {
            PerformanceBucket::Fast
        } else {
            PerformanceBucket::Normal
        }
    }

    fn tag(&self) -> Option<&'static str> {
        match self {
            PerformanceBucket::Fast => Some("fast"),
            PerformanceBucket::Delayed => Some("delayed"),
            PerformanceBucket::Slow => Some("slow"),
            PerformanceBucket::Normal => None,
        }
    }
}

/// Optional analysis attached to entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub host: Option<String>,
    pub path: String,
    pub query_params: usize,
    pub is_api: bool,
    pub is_graphql: bool,
    pub is_auth: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_kind: Option<AssetKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceBucket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

/// Inputs for tag generation and analysis
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    pub url: &'a str,
    pub method: &'a str,
    pub status: Option<u16>,
    pub duration_ms: Option<f64>,
    pub content_type: Option<&'a str>,
    pub failure: Option<FailureKind>,
}

impl<'a> Observation<'a> {
    /// Observation of an issued request
    pub fn request(url: &'a str, method: &'a str) -> Self {
        Self {
            url,
            method,
            status: None,
            duration_ms: None,
            content_type: None,
            failure: None,
        }
    }
}

/// URL features the rules look at
#[derive(Debug, Clone)]
struct UrlSignals {
    host: Option<String>,
    path: String,
    query: String,
}

impl UrlSignals {
    fn parse(raw: &str) -> Self {
        if let Ok(url) = Url::parse(raw) {
            return Self {
                host: url.host_str().map(|h| h.to_ascii_lowercase()),
                path: url.path().to_string(),
                query: url.query().unwrap_or("").to_string(),
            };
        }
        let without_fragment = raw.split('#').next().unwrap_or(raw);
        let (path, query) = without_fragment
            .split_once('?')
            .unwrap_or((without_fragment, ""));
        Self {
            host: None,
            path: path.to_string(),
            query: query.to_string(),
        }
    }

    fn is_graphql(&self) -> bool {
        self.path.to_ascii_lowercase().contains("graphql")
    }

    fn is_api(&self) -> bool {
        API_PATH.is_match(&self.path)
            || self
                .host
                .as_deref()
                .map(|h| h.starts_with("api."))
                .unwrap_or(false)
    }

    fn is_auth(&self) -> bool {
        AUTH_PATH.is_match(&self.path)
    }

    fn asset_kind(&self) -> Option<AssetKind> {
        ASSET_EXT
            .captures(&self.path)
            .and_then(|c| c.get(1))
            .and_then(|m| AssetKind::from_extension(m.as_str()))
    }

    fn has_query_param(&self, name: &str) -> bool {
        url::form_urlencoded::parse(self.query.as_bytes()).any(|(k, _)| k == name)
    }

    fn query_param_count(&self) -> usize {
        if self.query.is_empty() {
            return 0;
        }
        url::form_urlencoded::parse(self.query.as_bytes()).count()
    }
}

fn status_class(status: u16) -> Option<&'static str> {
    match status {
        200..=299 => Some("2xx"),
        300..=399 => Some("3xx"),
        400..=499 => Some("4xx"),
        500..=599 => Some("5xx"),
        _ => None,
    }
}

fn content_family(content_type: &str) -> Option<&'static str> {
    let ct = content_type.to_ascii_lowercase();
    if ct.contains("json") {
        Some("json")
    } else if ct.contains("html") {
        Some("html")
    } else if ct.contains("xml") {
        Some("xml")
    } else {
        None
    }
}

/// Rule-based analyzer
#[derive(Debug, Clone, Copy, Default)]
pub struct Analyzer;

impl Analyzer {
    /// Create an analyzer
    pub fn new() -> Self {
        Self
    }

    /// Categorize an issued request; first matching rule wins
    pub fn categorize_request(&self, url: &str, method: &str) -> Category {
        let signals = UrlSignals::parse(url);
        let method = method.to_ascii_uppercase();

        if signals.is_graphql()
            && (method == "POST" || (method == "GET" && signals.has_query_param("query")))
        {
            return Category::GraphqlRequest;
        }
        if signals.is_api() {
            return Category::ApiRequest;
        }
        if signals.asset_kind().is_some() {
            return Category::StaticAsset;
        }
        if signals.is_auth() {
            return Category::Authentication;
        }

        match method.as_str() {
            "GET" => Category::DataFetch,
            "POST" | "PUT" | "PATCH" => Category::DataMutation,
            "DELETE" => Category::DataDeletion,
            _ => Category::HttpRequest,
        }
    }

    /// Categorize a response from the promise surface
    pub fn categorize_response(&self, status: u16, url: &str) -> Category {
        match status {
            500..=599 => Category::ServerError,
            400..=499 => Category::ClientError,
            300..=399 => Category::Redirect,
            200..=299 => {
                let signals = UrlSignals::parse(url);
                if signals.is_api() || signals.is_graphql() {
                    Category::ApiSuccess
                } else {
                    Category::Success
                }
            }
            _ => Category::Unknown,
        }
    }

    /// Categorize a response from the event surface
    pub fn categorize_xhr_response(&self, status: u16, url: &str) -> Category {
        self.categorize_response(status, url)
    }

    /// Classify a failure: structured kind first, message text otherwise.
    ///
    /// Text matching is only a fallback for errors that carry no kind; the
    /// order (cors, timeout, abort, fetch) is fixed.
    pub fn classify_failure(&self, kind: Option<FailureKind>, message: &str) -> FailureKind {
        if let Some(kind) = kind {
            return kind;
        }
        let message = message.to_ascii_lowercase();
        if message.contains("cors") {
            FailureKind::Cors
        } else if message.contains("timeout") || message.contains("timed out") {
            FailureKind::Timeout
        } else if message.contains("abort") {
            FailureKind::Abort
        } else if message.contains("fetch") {
            FailureKind::Fetch
        } else {
            FailureKind::Network
        }
    }

    /// Category of a classified failure
    pub fn categorize_error(&self, failure: FailureKind) -> Category {
        match failure {
            FailureKind::Cors => Category::CorsError,
            FailureKind::Timeout => Category::TimeoutError,
            FailureKind::Abort => Category::RequestAborted,
            FailureKind::Fetch => Category::FetchError,
            FailureKind::Network => Category::NetworkError,
        }
    }

    /// Severity of a completed response
    pub fn response_severity(&self, status: u16, duration_ms: f64) -> Severity {
        let mut severity = match status {
            500..=599 => Severity::new(8, format!("server error ({})", status)),
            401 | 403 => Severity::new(5, format!("authorization failure ({})", status)),
            429 => Severity::new(5, "rate limited (429)"),
            400..=499 => Severity::new(5, format!("client error ({})", status)),
            300..=399 => Severity::new(2, format!("redirect ({})", status)),
            200..=299 => Severity::new(1, "success"),
            _ => Severity::new(3, format!("unrecognized status ({})", status)),
        };
        apply_duration(&mut severity, duration_ms);
        severity
    }

    /// Severity of a failed call
    pub fn error_severity(&self, failure: FailureKind, duration_ms: f64) -> Severity {
        let mut severity = match failure {
            FailureKind::Network => Severity::new(7, "network failure"),
            FailureKind::Fetch => Severity::new(7, "fetch failure"),
            FailureKind::Timeout => Severity::new(6, "timeout"),
            FailureKind::Cors => Severity::new(5, "cors blocked"),
            FailureKind::Abort => Severity::new(3, "aborted"),
        };
        apply_duration(&mut severity, duration_ms);
        severity
    }

    /// Deduplicated tag set
    pub fn generate_tags(&self, obs: &Observation<'_>, app: &AppContext) -> BTreeSet<String> {
        let signals = UrlSignals::parse(obs.url);
        let mut tags = BTreeSet::new();

        tags.insert(obs.method.to_ascii_lowercase());

        if signals.is_api() {
            tags.insert("api".to_string());
        }
        if signals.is_graphql() {
            tags.insert("graphql".to_string());
        }
        if signals.is_auth() {
            tags.insert("authentication".to_string());
        }
        if let Some(kind) = signals.asset_kind() {
            tags.insert("asset".to_string());
            tags.insert(format!("asset:{}", kind.as_str()));
        }

        if let Some(status) = obs.status {
            if let Some(class) = status_class(status) {
                tags.insert(class.to_string());
            }
            let outcome = match status {
                200..=299 => Some("success"),
                300..=399 => Some("redirect"),
                400..=499 => Some("client-error"),
                500..=599 => Some("server-error"),
                _ => None,
            };
            if let Some(outcome) = outcome {
                tags.insert(outcome.to_string());
            }
        }

        if let Some(duration) = obs.duration_ms {
            if let Some(tag) = PerformanceBucket::from_duration(duration).tag() {
                tags.insert(tag.to_string());
            }
        }

        if let Some(family) = obs.content_type.and_then(content_family) {
            tags.insert(family.to_string());
        }

        if let Some(failure) = obs.failure {
            tags.insert("error".to_string());
            tags.insert(format!("error:{}", failure.as_str()));
        }

        tags.insert(format!("env:{}", app.environment));
        if let Some(ref branch) = app.branch {
            tags.insert(format!("branch:{}", branch));
        }

        tags
    }

    /// Build the analysis sub-object
    pub fn analyze(&self, obs: &Observation<'_>) -> Analysis {
        let signals = UrlSignals::parse(obs.url);
        Analysis {
            host: signals.host.clone(),
            path: signals.path.clone(),
            query_params: signals.query_param_count(),
            is_api: signals.is_api(),
            is_graphql: signals.is_graphql(),
            is_auth: signals.is_auth(),
            asset_kind: signals.asset_kind(),
            status_class: obs
                .status
                .and_then(status_class)
                .map(|class| class.to_string()),
            performance: obs.duration_ms.map(PerformanceBucket::from_duration),
            failure: obs.failure,
        }
    }
}

fn apply_duration(severity: &mut Severity, duration_ms: f64) {
    if duration_ms > SLOW_THRESHOLD_MS {
        severity.raise_to(6, format!("slow response ({:.0}ms)", duration_ms));
    } else if duration_ms > DELAYED_THRESHOLD_MS {
        severity.raise_to(4, format!("delayed response ({:.0}ms)", duration_ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphql_outranks_api() {
        let analyzer = Analyzer::new();
        assert_eq!(
            analyzer.categorize_request("https://api.example.com/graphql", "POST"),
            Category::GraphqlRequest
        );
        assert_eq!(
            analyzer.categorize_request("https://example.com/graphql?query={me}", "GET"),
            Category::GraphqlRequest
        );
    }

    #[test]
    fn test_request_precedence() {
        let analyzer = Analyzer::new();
        assert_eq!(
            analyzer.categorize_request("https://api.example.com/users", "GET"),
            Category::ApiRequest
        );
        assert_eq!(
            analyzer.categorize_request("https://example.com/api/login", "POST"),
            Category::ApiRequest
        );
        assert_eq!(
            analyzer.categorize_request("https://cdn.example.com/app.min.js", "GET"),
            Category::StaticAsset
        );
        assert_eq!(
            analyzer.categorize_request("https://example.com/login", "POST"),
            Category::Authentication
        );
        assert_eq!(
            analyzer.categorize_request("https://example.com/items", "get"),
            Category::DataFetch
        );
        assert_eq!(
            analyzer.categorize_request("https://example.com/items/1", "PATCH"),
            Category::DataMutation
        );
        assert_eq!(
            analyzer.categorize_request("https://example.com/items/1", "DELETE"),
            Category::DataDeletion
        );
        assert_eq!(
            analyzer.categorize_request("https://example.com/items", "OPTIONS"),
            Category::HttpRequest
        );
    }

    #[test]
    fn test_categorize_response() {
        let analyzer = Analyzer::new();
        let api = "https://api.example.com/users";
        let page = "https://example.com/about";
        assert_eq!(analyzer.categorize_response(503, api), Category::ServerError);
        assert_eq!(analyzer.categorize_response(404, api), Category::ClientError);
        assert_eq!(analyzer.categorize_response(301, page), Category::Redirect);
        assert_eq!(analyzer.categorize_response(200, api), Category::ApiSuccess);
        assert_eq!(analyzer.categorize_response(200, page), Category::Success);
        assert_eq!(analyzer.categorize_response(0, page), Category::Unknown);
        assert_eq!(analyzer.categorize_xhr_response(101, page), Category::Unknown);
    }

    #[test]
    fn test_failure_classification_priority() {
        let analyzer = Analyzer::new();
        assert_eq!(
            analyzer.classify_failure(None, "CORS request timeout"),
            FailureKind::Cors
        );
        assert_eq!(
            analyzer.classify_failure(None, "request timed out"),
            FailureKind::Timeout
        );
        assert_eq!(
            analyzer.classify_failure(None, "The user aborted a request"),
            FailureKind::Abort
        );
        assert_eq!(
            analyzer.classify_failure(None, "Failed to fetch"),
            FailureKind::Fetch
        );
        assert_eq!(
            analyzer.classify_failure(None, "connection reset"),
            FailureKind::Network
        );
        assert_eq!(
            analyzer.classify_failure(Some(FailureKind::Timeout), "Failed to fetch"),
            FailureKind::Timeout
        );
        assert_eq!(
            analyzer.categorize_error(FailureKind::Abort),
            Category::RequestAborted
        );
    }

    #[test]
    fn test_severity_bands() {
        let analyzer = Analyzer::new();
        assert_eq!(analyzer.response_severity(500, 10.0).level, SeverityLevel::Critical);
        assert_eq!(analyzer.response_severity(404, 10.0).level, SeverityLevel::Medium);
        assert_eq!(analyzer.response_severity(302, 10.0).level, SeverityLevel::Low);
        assert_eq!(analyzer.response_severity(200, 10.0).level, SeverityLevel::Low);
        assert_eq!(
            analyzer.error_severity(FailureKind::Network, 10.0).level,
            SeverityLevel::High
        );
        assert_eq!(
            analyzer.error_severity(FailureKind::Cors, 10.0).level,
            SeverityLevel::Medium
        );
    }

    #[test]
    fn test_duration_raises_severity() {
        let analyzer = Analyzer::new();
        let delayed = analyzer.response_severity(200, 2500.0);
        assert_eq!(delayed.level, SeverityLevel::Medium);
        assert_eq!(delayed.factors.len(), 2);

        let slow = analyzer.response_severity(200, 6000.0);
        assert_eq!(slow.level, SeverityLevel::High);

        let critical = analyzer.response_severity(500, 6000.0);
        assert_eq!(critical.score, 8);
        assert_eq!(critical.factors.len(), 1);
    }

    #[test]
    fn test_client_errors_are_medium() {
        let analyzer = Analyzer::new();
        for status in [400u16, 401, 403, 404, 429] {
            let severity = analyzer.response_severity(status, 10.0);
            assert_eq!(severity.score, 5, "status {}", status);
            assert_eq!(severity.level, SeverityLevel::Medium, "status {}", status);
        }
        let rate_limited = analyzer.response_severity(429, 10.0);
        assert_eq!(rate_limited.factors, vec!["rate limited (429)".to_string()]);
    }

    #[test]
    fn test_severity_monotonic_in_duration() {
        let analyzer = Analyzer::new();
        let durations = [0.0, 100.0, 1999.0, 2000.0, 2001.0, 4999.0, 5000.0, 5001.0, 60000.0];
        for status in [0u16, 101, 200, 204, 301, 400, 401, 429, 500, 599] {
            let mut last = 0;
            for d in durations {
                let score = analyzer.response_severity(status, d).score;
                assert!(score >= last, "status {} duration {}", status, d);
                last = score;
            }
        }
    }

    #[test]
    fn test_level_from_score() {
        assert_eq!(SeverityLevel::from_score(10), SeverityLevel::Critical);
        assert_eq!(SeverityLevel::from_score(8), SeverityLevel::Critical);
        assert_eq!(SeverityLevel::from_score(6), SeverityLevel::High);
        assert_eq!(SeverityLevel::from_score(4), SeverityLevel::Medium);
        assert_eq!(SeverityLevel::from_score(3), SeverityLevel::Low);
    }

    #[test]
    fn test_tags() {
        let analyzer = Analyzer::new();
        let app = AppContext::new("shop").environment("staging").branch("main");
        let obs = Observation {
            url: "https://api.example.com/graphql",
            method: "POST",
            status: Some(200),
            duration_ms: Some(120.0),
            content_type: Some("application/json; charset=utf-8"),
            failure: None,
        };
        let tags = analyzer.generate_tags(&obs, &app);
        for expected in [
            "post", "api", "graphql", "2xx", "success", "fast", "json", "env:staging",
            "branch:main",
        ] {
            assert!(tags.contains(expected), "missing tag {}", expected);
        }
        assert!(!tags.contains("slow"));
    }

    #[test]
    fn test_auth_endpoint_tag() {
        let analyzer = Analyzer::new();
        let obs = Observation::request("https://example.com/oauth/token", "POST");
        let tags = analyzer.generate_tags(&obs, &AppContext::new("shop"));
        assert!(tags.contains("authentication"));
        assert!(!tags.contains("auth"));
    }

    #[test]
    fn test_asset_tags_and_analysis() {
        let analyzer = Analyzer::new();
        let obs = Observation {
            duration_ms: Some(6000.0),
            ..Observation::request("https://cdn.example.com/img/logo.PNG?v=3", "GET")
        };
        let tags = analyzer.generate_tags(&obs, &AppContext::new("shop"));
        assert!(tags.contains("asset"));
        assert!(tags.contains("asset:image"));
        assert!(tags.contains("slow"));

        let analysis = analyzer.analyze(&obs);
        assert_eq!(analysis.host.as_deref(), Some("cdn.example.com"));
        assert_eq!(analysis.asset_kind, Some(AssetKind::Image));
        assert_eq!(analysis.query_params, 1);
        assert_eq!(analysis.performance, Some(PerformanceBucket::Slow));
    }

    #[test]
    fn test_category_serializes_as_display_name() {
        assert_eq!(
            serde_json::to_string(&Category::ApiSuccess).unwrap(),
            "\"API Success\""
        );
        assert_eq!(Category::GraphqlRequest.to_string(), "GraphQL Request");
    }
}

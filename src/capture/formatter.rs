// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Entry construction
//!
//! Turns raw call data into [`Entry`] values: sanitize first, then classify.

use std::sync::Arc;

use bytes::Bytes;
use url::Url;

use super::analyzer::{Analyzer, Category, Observation};
use super::config::CaptureConfig;
use super::metrics::CaptureMetrics;
use super::sanitizer::Sanitizer;
use super::util::{
    collect_performance_snapshot, content_type, normalize_headers, parse_raw_headers,
    should_capture_body, CaptureClock,
};
use crate::error::{Error, FailureKind, Result};
use crate::http::Response;
use crate::network::{
    Entry, EntryLevel, ErrorInfo, ReadyState, RequestDescriptor, RequestInfo, ResponseInfo,
    Subtype, Timing, XhrState,
};

/// Builds entries for one capture session
#[derive(Debug, Clone)]
pub struct Formatter {
    config: Arc<CaptureConfig>,
    sanitizer: Sanitizer,
    analyzer: Analyzer,
    clock: CaptureClock,
    metrics: Arc<CaptureMetrics>,
}

impl Formatter {
    pub fn new(config: Arc<CaptureConfig>, clock: CaptureClock, metrics: Arc<CaptureMetrics>) -> Self {
        let sanitizer = Sanitizer::new(Arc::new(config.policy.clone()));
        Self {
            config,
            sanitizer,
            analyzer: Analyzer::new(),
            clock,
            metrics,
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn sanitizer(&self) -> &Sanitizer {
        &self.sanitizer
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Entry for an issued request
    pub fn format_request(&self, descriptor: &RequestDescriptor) -> Entry {
        let category = self
            .analyzer
            .categorize_request(&descriptor.url, &descriptor.method);
        let mut entry = self.envelope(Subtype::Request, EntryLevel::Info, category);

        entry.request = Some(self.request_info(descriptor));
        self.classify(
            &mut entry,
            &Observation::request(&descriptor.url, &descriptor.method),
        );
        entry
    }

    /// Terminal entry for a promise-surface response
    pub fn format_response(
        &self,
        descriptor: &RequestDescriptor,
        response: &Response,
        timing: Timing,
    ) -> Entry {
        let headers = normalize_headers(&response.headers);
        let content_type = content_type(&headers).map(str::to_string);
        let status = response.status_code();

        let info = ResponseInfo {
            request_id: descriptor.id.clone(),
            url: self.sanitizer.sanitize_url(response.url_str()),
            method: descriptor.method.clone(),
            status,
            status_text: response.status_text().to_string(),
            ok: response.is_success(),
            redirected: response.redirected,
            headers: self
                .config
                .capture_headers
                .then(|| self.sanitizer.sanitize_headers(&headers)),
            body: self.response_body(response.bytes(), content_type.as_deref()),
            content_type: content_type.clone(),
            ready_state: None,
            kind: descriptor.kind,
        };

        let category = self.analyzer.categorize_response(status, &descriptor.url);
        self.terminal_response(descriptor, info, category, content_type.as_deref(), timing)
    }

    /// Terminal entry for an event-surface call that reached `Done` with a response
    pub fn format_xhr_response(
        &self,
        descriptor: &RequestDescriptor,
        xhr: &XhrState,
        timing: Timing,
    ) -> Result<Entry> {
        if xhr.ready_state() != ReadyState::Done {
            return Err(Error::InvalidState(format!(
                "response formatted in state {:?}",
                xhr.ready_state()
            )));
        }

        let headers = parse_raw_headers(&xhr.all_response_headers());
        let content_type = content_type(&headers).map(str::to_string);
        let status = xhr.status();
        let final_url = xhr
            .response_url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| descriptor.url.clone());

        let info = ResponseInfo {
            request_id: descriptor.id.clone(),
            url: self.sanitizer.sanitize_url(&final_url),
            method: descriptor.method.clone(),
            status,
            status_text: xhr.status_text().to_string(),
            ok: (200..=299).contains(&status),
            redirected: match (xhr.response_url(), Url::parse(&descriptor.url)) {
                (Some(response_url), Ok(opened)) => *response_url != opened,
                _ => false,
            },
            headers: self
                .config
                .capture_headers
                .then(|| self.sanitizer.sanitize_headers(&headers)),
            body: self.response_body(xhr.response_bytes(), content_type.as_deref()),
            content_type: content_type.clone(),
            ready_state: Some(xhr.ready_state().as_u8()),
            kind: descriptor.kind,
        };

        let category = self
            .analyzer
            .categorize_xhr_response(status, &descriptor.url);
        Ok(self.terminal_response(descriptor, info, category, content_type.as_deref(), timing))
    }

    /// Terminal entry for a failed call
    pub fn format_error(&self, descriptor: &RequestDescriptor, error: &Error, timing: Timing) -> Entry {
        let raw = error.to_string();
        let failure = self.analyzer.classify_failure(error.failure_kind(), &raw);

        // transport messages embed the target URL verbatim
        let mut message = raw;
        for url in error.url().into_iter().chain([descriptor.url.as_str()]) {
            if !url.is_empty() && message.contains(url) {
                message = message.replace(url, &self.sanitizer.sanitize_url(url));
            }
        }
        self.format_failure(descriptor, error.name(), &message, failure, timing)
    }

    /// Terminal entry for a failure already reduced to name, message and kind
    pub fn format_failure(
        &self,
        descriptor: &RequestDescriptor,
        name: &str,
        message: &str,
        failure: FailureKind,
        timing: Timing,
    ) -> Entry {
        let level = match failure {
            FailureKind::Abort => EntryLevel::Warn,
            _ => EntryLevel::Error,
        };
        let mut entry = self.envelope(
            Subtype::Error,
            level,
            self.analyzer.categorize_error(failure),
        );

        entry.error = Some(ErrorInfo {
            request_id: descriptor.id.clone(),
            url: self.sanitizer.sanitize_url(&descriptor.url),
            method: descriptor.method.clone(),
            name: name.to_string(),
            message: self.sanitizer.sanitize_text(message),
            failure,
            kind: descriptor.kind,
        });
        entry.timing = Some(timing);
        entry.severity = Some(self.analyzer.error_severity(failure, timing.duration));

        let observation = Observation {
            duration_ms: Some(timing.duration),
            failure: Some(failure),
            ..Observation::request(&descriptor.url, &descriptor.method)
        };
        self.classify(&mut entry, &observation);
        entry
    }

    fn terminal_response(
        &self,
        descriptor: &RequestDescriptor,
        info: ResponseInfo,
        category: Category,
        content_type: Option<&str>,
        timing: Timing,
    ) -> Entry {
        let status = info.status;
        let level = match status {
            500..=599 => EntryLevel::Error,
            400..=499 => EntryLevel::Warn,
            _ => EntryLevel::Info,
        };
        let mut entry = self.envelope(Subtype::Response, level, category);

        entry.response = Some(info);
        entry.timing = Some(timing);
        entry.severity = Some(self.analyzer.response_severity(status, timing.duration));

        let observation = Observation {
            status: Some(status),
            duration_ms: Some(timing.duration),
            content_type,
            ..Observation::request(&descriptor.url, &descriptor.method)
        };
        self.classify(&mut entry, &observation);
        entry
    }

    fn envelope(&self, subtype: Subtype, level: EntryLevel, category: Category) -> Entry {
        let mut entry = Entry::new(
            subtype,
            level,
            category,
            self.config.app.clone(),
            self.config.user_agent.clone(),
        );
        if self.config.include_performance {
            entry.performance = Some(collect_performance_snapshot(
                &self.clock,
                self.metrics.active_requests() as usize,
                self.metrics.entries_emitted(),
            ));
        }
        entry
    }

    fn classify(&self, entry: &mut Entry, observation: &Observation<'_>) {
        entry.tags = self.analyzer.generate_tags(observation, &self.config.app);
        if self.config.include_analysis {
            entry.analysis = Some(self.analyzer.analyze(observation));
        }
    }

    fn request_info(&self, descriptor: &RequestDescriptor) -> RequestInfo {
        RequestInfo {
            id: descriptor.id.clone(),
            url: self.sanitizer.sanitize_url(&descriptor.url),
            method: descriptor.method.clone(),
            headers: self
                .config
                .capture_headers
                .then(|| self.sanitizer.sanitize_headers(&descriptor.headers)),
            body: if self.config.capture_request_body {
                descriptor
                    .body
                    .as_ref()
                    .map(|body| self.sanitizer.sanitize_body(body))
            } else {
                None
            },
            kind: descriptor.kind,
            start_time: descriptor.start_time,
        }
    }

    /// Reads from a clone of the buffer; the caller's copy is never consumed
    fn response_body(&self, body: &Bytes, content_type: Option<&str>) -> Option<String> {
        if !self.config.capture_response_body || !should_capture_body(content_type) {
            return None;
        }
        let body = body.clone();
        Some(match std::str::from_utf8(&body) {
            Ok(text) => self.sanitizer.sanitize_text(text),
            Err(e) => format!("[Unable to read response body: {}]", e),
        })
    }
}

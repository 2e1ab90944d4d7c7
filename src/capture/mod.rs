// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Capture pipeline
//!
//! Configuration, sanitization, classification and entry construction, plus
//! the [`NetworkCapture`] facade that owns listeners and the entry queue.

pub mod analyzer;
pub mod config;
pub mod facade;
pub mod formatter;
pub mod listener;
pub mod metrics;
pub mod sanitizer;
pub mod util;

pub use analyzer::{Analysis, Analyzer, Category, Observation, Severity, SeverityLevel};
pub use config::{AppContext, CaptureConfig, SanitizePolicy};
pub use facade::NetworkCapture;
pub use formatter::Formatter;
pub use listener::{
    channel_listener, json_lines_listener, tracing_listener, EntryListener, ListenerId,
};
pub use metrics::{CaptureMetrics, CaptureStats};
pub use sanitizer::{truncate, Sanitizer, REDACTED, TRUNCATED};
pub use util::{
    collect_performance_snapshot, generate_request_id, should_capture, should_capture_body,
    CaptureClock, PerformanceSnapshot,
};

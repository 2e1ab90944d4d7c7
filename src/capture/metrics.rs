// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Capture counters
//!
//! Shared by the interceptor (lifecycle counts) and the facade (queue and
//! listener counts). All counters are relaxed atomics; a report is a
//! best-effort snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::network::Subtype;

const MAX_LATENCY_SAMPLES: usize = 10_000;

/// Capture metrics collector
#[derive(Debug)]
pub struct CaptureMetrics {
    requests_intercepted: AtomicU64,
    responses: AtomicU64,
    errors: AtomicU64,
    cancellations: AtomicU64,
    format_failures: AtomicU64,
    entries_emitted: AtomicU64,
    entries_dropped: AtomicU64,
    listener_failures: AtomicU64,
    active_requests: AtomicU64,
    start_time: Instant,
    /// Terminal latencies for percentile calculation
    latencies: RwLock<Vec<u64>>,
}

impl Default for CaptureMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the capture counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureStats {
    pub uptime_secs: u64,
    pub requests_intercepted: u64,
    pub responses: u64,
    pub errors: u64,
    pub cancellations: u64,
    pub format_failures: u64,
    pub emitted: u64,
    pub dropped: u64,
    pub listener_failures: u64,
    pub active_requests: u64,
    /// Entries currently held in the facade queue
    pub queued: usize,
    pub latency_p50_ms: u64,
    pub latency_p95_ms: u64,
    pub latency_p99_ms: u64,
}

impl CaptureMetrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self {
            requests_intercepted: AtomicU64::new(0),
            responses: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            cancellations: AtomicU64::new(0),
            format_failures: AtomicU64::new(0),
            entries_emitted: AtomicU64::new(0),
            entries_dropped: AtomicU64::new(0),
            listener_failures: AtomicU64::new(0),
            active_requests: AtomicU64::new(0),
            start_time: Instant::now(),
            latencies: RwLock::new(Vec::new()),
        }
    }

    /// A request entered the registry
    pub fn record_request_started(&self) {
        self.requests_intercepted.fetch_add(1, Ordering::Relaxed);
        self.active_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// A request left the registry
    pub fn record_request_finished(&self, duration_ms: f64) {
        let _ = self
            .active_requests
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));

        let mut latencies = self.latencies.write();
        latencies.push(duration_ms.max(0.0) as u64);
        if latencies.len() > MAX_LATENCY_SAMPLES {
            latencies.drain(0..MAX_LATENCY_SAMPLES / 2);
        }
    }

    /// An entry was handed to the sink
    pub fn record_emitted(&self, subtype: Subtype) {
        self.entries_emitted.fetch_add(1, Ordering::Relaxed);
        match subtype {
            Subtype::Response => {
                self.responses.fetch_add(1, Ordering::Relaxed);
            }
            Subtype::Error => {
                self.errors.fetch_add(1, Ordering::Relaxed);
            }
            Subtype::Request => {}
        }
    }

    /// In-flight call dropped by its caller
    pub fn record_cancellation(&self) {
        self.cancellations.fetch_add(1, Ordering::Relaxed);
    }

    /// Terminal entry construction failed
    pub fn record_format_failure(&self) {
        self.format_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Queue overflow evicted an entry
    pub fn record_dropped(&self) {
        self.entries_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// A listener returned an error or panicked
    pub fn record_listener_failure(&self) {
        self.listener_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Requests issued and not yet resolved
    pub fn active_requests(&self) -> u64 {
        self.active_requests.load(Ordering::Relaxed)
    }

    /// Entries emitted so far
    pub fn entries_emitted(&self) -> u64 {
        self.entries_emitted.load(Ordering::Relaxed)
    }

    /// Build a report; `queued` comes from the facade
    pub fn report(&self, queued: usize) -> CaptureStats {
        let latencies = self.latencies.read();
        let (p50, p95, p99) = calculate_percentiles(&latencies);

        CaptureStats {
            uptime_secs: self.start_time.elapsed().as_secs(),
            requests_intercepted: self.requests_intercepted.load(Ordering::Relaxed),
            responses: self.responses.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
            format_failures: self.format_failures.load(Ordering::Relaxed),
            emitted: self.entries_emitted.load(Ordering::Relaxed),
            dropped: self.entries_dropped.load(Ordering::Relaxed),
            listener_failures: self.listener_failures.load(Ordering::Relaxed),
            active_requests: self.active_requests.load(Ordering::Relaxed),
            queued,
            latency_p50_ms: p50,
            latency_p95_ms: p95,
            latency_p99_ms: p99,
        }
    }
}

/// Calculate percentiles from latencies
fn calculate_percentiles(latencies: &[u64]) -> (u64, u64, u64) {
    if latencies.is_empty() {
        return (0, 0, 0);
    }

    let mut sorted: Vec<u64> = latencies.to_vec();
    sorted.sort_unstable();

    let len = sorted.len();
    let last = len - 1;
    let p50 = sorted[len / 2];
    let p95 = sorted[(len * 95 / 100).min(last)];
    let p99 = sorted[(len * 99 / 100).min(last)];

    (p50, p95, p99)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_counts() {
        let metrics = CaptureMetrics::new();

        metrics.record_request_started();
        metrics.record_request_started();
        metrics.record_emitted(Subtype::Request);
        metrics.record_emitted(Subtype::Request);
        assert_eq!(metrics.active_requests(), 2);

        metrics.record_request_finished(120.0);
        metrics.record_emitted(Subtype::Response);
        metrics.record_request_finished(80.0);
        metrics.record_emitted(Subtype::Error);

        let report = metrics.report(3);
        assert_eq!(report.requests_intercepted, 2);
        assert_eq!(report.active_requests, 0);
        assert_eq!(report.responses, 1);
        assert_eq!(report.errors, 1);
        assert_eq!(report.emitted, 4);
        assert_eq!(report.queued, 3);
    }

    #[test]
    fn test_active_never_underflows() {
        let metrics = CaptureMetrics::new();
        metrics.record_request_finished(1.0);
        assert_eq!(metrics.active_requests(), 0);
    }

    #[test]
    fn test_percentiles() {
        let latencies: Vec<u64> = (1..=100).collect();
        let (p50, p95, p99) = calculate_percentiles(&latencies);

        assert_eq!(p50, 51);
        assert_eq!(p95, 96);
        assert_eq!(p99, 100);
        assert_eq!(calculate_percentiles(&[7]), (7, 7, 7));
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Capture interceptor
//!
//! Decorates the adapters in a [`Network`]'s slots so that every captured call
//! produces one request entry and exactly one terminal entry. Correlation goes
//! through a registry of in-flight requests keyed by request id: whoever
//! removes the id from the registry owns the terminal entry.

use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use reqwest::Method;

use super::client::{Network, NetworkClient};
use super::event::{Entry, RequestDescriptor, RequestKind, Timing};
use super::xhr::{CaptureTag, ReadyState, XhrBackend, XhrState};
use crate::capture::config::CaptureConfig;
use crate::capture::formatter::Formatter;
use crate::capture::metrics::CaptureMetrics;
use crate::capture::util::{generate_request_id, normalize_headers, should_capture, CaptureClock};
use crate::error::{Error, FailureKind, Result};
use crate::http::{Body, Request, Response};

/// Message of the entry emitted when a caller drops an in-flight call
pub const CANCELLED_MESSAGE: &str = "Request cancelled before completion";

/// Receives every entry the interceptor produces
pub type EntrySink = Arc<dyn Fn(Entry) + Send + Sync>;

/// Registry record of an unresolved request
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveRequest {
    pub method: String,
    pub url: String,
    pub kind: RequestKind,
    pub start_time: f64,
}

struct InterceptorCore {
    config: Arc<CaptureConfig>,
    formatter: Formatter,
    registry: DashMap<String, ActiveRequest>,
    metrics: Arc<CaptureMetrics>,
    clock: CaptureClock,
    sink: EntrySink,
}

impl InterceptorCore {
    fn emit(&self, entry: Entry) {
        self.metrics.record_emitted(entry.subtype);
        (self.sink)(entry);
    }

    /// Register the call and emit its request entry
    fn begin(self: &Arc<Self>, descriptor: RequestDescriptor) -> InFlight {
        self.registry.insert(
            descriptor.id.clone(),
            ActiveRequest {
                method: descriptor.method.clone(),
                url: descriptor.url.clone(),
                kind: descriptor.kind,
                start_time: descriptor.start_time,
            },
        );
        self.metrics.record_request_started();

        tracing::debug!(
            request_id = %descriptor.id,
            method = %descriptor.method,
            url = %self.formatter.sanitizer().sanitize_url(&descriptor.url),
            kind = ?descriptor.kind,
            "Request captured"
        );

        self.emit(self.formatter.format_request(&descriptor));

        InFlight {
            core: Arc::clone(self),
            descriptor,
        }
    }

    /// Emit the terminal entry if this caller is the one to resolve the id.
    ///
    /// A failing or panicking `build` still produces a terminal entry.
    fn finish<F>(&self, descriptor: &RequestDescriptor, build: F) -> bool
    where
        F: FnOnce(&Formatter, &RequestDescriptor, Timing) -> Result<Entry>,
    {
        let Some((_, active)) = self.registry.remove(&descriptor.id) else {
            return false;
        };
        let timing = Timing::new(active.start_time, self.clock.now_ms());
        self.metrics.record_request_finished(timing.duration);

        let built = panic::catch_unwind(AssertUnwindSafe(|| {
            build(&self.formatter, descriptor, timing)
        }));
        let entry = match built {
            Ok(Ok(entry)) => entry,
            Ok(Err(e)) => {
                tracing::warn!(request_id = %descriptor.id, error = %e, "Failed to build terminal entry");
                self.metrics.record_format_failure();
                let error = Error::capture(format!("Failed to build terminal entry: {}", e));
                self.formatter.format_error(descriptor, &error, timing)
            }
            Err(_) => {
                tracing::warn!(request_id = %descriptor.id, "Terminal entry construction panicked");
                self.metrics.record_format_failure();
                let error = Error::capture("Terminal entry construction panicked");
                self.formatter.format_error(descriptor, &error, timing)
            }
        };

        tracing::debug!(
            request_id = %descriptor.id,
            subtype = ?entry.subtype,
            duration_ms = timing.duration,
            "Request settled"
        );
        self.emit(entry);
        true
    }
}

/// Guard over one registered call.
///
/// Dropping it while the id is still registered (the caller dropped the
/// future) emits an `abort` error entry.
struct InFlight {
    core: Arc<InterceptorCore>,
    descriptor: RequestDescriptor,
}

impl InFlight {
    fn finish<F>(self, build: F)
    where
        F: FnOnce(&Formatter, &RequestDescriptor, Timing) -> Result<Entry>,
    {
        self.core.finish(&self.descriptor, build);
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let cancelled = self.core.finish(&self.descriptor, |formatter, descriptor, timing| {
            Ok(formatter.format_failure(
                descriptor,
                "AbortError",
                CANCELLED_MESSAGE,
                FailureKind::Abort,
                timing,
            ))
        });
        if cancelled {
            self.core.metrics.record_cancellation();
            tracing::debug!(request_id = %self.descriptor.id, "In-flight request cancelled");
        }
    }
}

/// Promise-surface adapter that captures around an inner adapter
pub struct CapturingClient {
    inner: Arc<dyn NetworkClient>,
    core: Arc<InterceptorCore>,
}

impl CapturingClient {
    /// The wrapped adapter
    pub fn inner(&self) -> &Arc<dyn NetworkClient> {
        &self.inner
    }
}

#[async_trait]
impl NetworkClient for CapturingClient {
    async fn issue(&self, request: Request) -> Result<Response> {
        if !should_capture(request.url_str(), &self.core.config.policy) {
            return self.inner.issue(request).await;
        }

        let descriptor = RequestDescriptor {
            id: generate_request_id(),
            url: request.url_str().to_string(),
            method: request.method.to_string(),
            headers: normalize_headers(&request.headers),
            body: request.body.clone(),
            kind: RequestKind::Fetch,
            start_time: self.core.clock.now_ms(),
        };
        let in_flight = self.core.begin(descriptor);

        let result = self.inner.issue(request).await;

        in_flight.finish(|formatter, descriptor, timing| {
            Ok(match &result {
                Ok(response) => formatter.format_response(descriptor, response, timing),
                Err(error) => formatter.format_error(descriptor, error, timing),
            })
        });
        result
    }
}

/// Event-surface backend that captures around an inner backend
pub struct CapturingXhr {
    inner: Arc<dyn XhrBackend>,
    core: Arc<InterceptorCore>,
}

impl CapturingXhr {
    /// The wrapped backend
    pub fn inner(&self) -> &Arc<dyn XhrBackend> {
        &self.inner
    }
}

#[async_trait]
impl XhrBackend for CapturingXhr {
    fn open(&self, xhr: &mut XhrState, method: Method, url: &str) -> Result<()> {
        if let Some(previous) = xhr.capture_tag().and_then(|tag| tag.observer) {
            xhr.observers_mut().remove(previous);
        }
        xhr.set_capture_tag(Some(CaptureTag {
            request_id: generate_request_id(),
            method: method.to_string(),
            url: url.to_string(),
            observer: None,
        }));

        let result = self.inner.open(xhr, method, url);
        match &result {
            Ok(()) => {
                // record the URL the backend will actually request
                let opened = xhr.url().map(|u| u.to_string());
                if let (Some(opened), Some(tag)) = (opened, xhr.capture_tag_mut()) {
                    tag.url = opened;
                }
            }
            Err(_) => xhr.set_capture_tag(None),
        }
        result
    }

    async fn send(&self, xhr: &mut XhrState, body: Option<Body>) -> Result<()> {
        // a tag whose observer is already set belongs to a call that was sent
        let tag = xhr
            .capture_tag()
            .filter(|tag| tag.observer.is_none())
            .cloned();
        let Some(tag) = tag else {
            return self.inner.send(xhr, body).await;
        };
        if !should_capture(&tag.url, &self.core.config.policy) {
            return self.inner.send(xhr, body).await;
        }

        let descriptor = RequestDescriptor {
            id: tag.request_id,
            url: tag.url,
            method: tag.method,
            headers: normalize_headers(xhr.request_headers()),
            body: body.clone(),
            kind: RequestKind::Xhr,
            start_time: self.core.clock.now_ms(),
        };
        let in_flight = self.core.begin(descriptor.clone());

        let core = Arc::clone(&self.core);
        let observer = xhr.observers_mut().prepend(Arc::new(move |state: &XhrState| {
            if state.ready_state() != ReadyState::Done {
                return;
            }
            core.finish(&descriptor, |formatter, descriptor, timing| match state.error() {
                Some(error) => Ok(formatter.format_error(descriptor, error, timing)),
                None => formatter.format_xhr_response(descriptor, state, timing),
            });
        }));
        if let Some(tag) = xhr.capture_tag_mut() {
            tag.observer = Some(observer);
        }

        let result = self.inner.send(xhr, body).await;
        if let Err(ref error) = result {
            in_flight.finish(|formatter, descriptor, timing| {
                Ok(formatter.format_error(descriptor, error, timing))
            });
        }
        result
    }
}

struct Originals {
    network: Weak<Network>,
    fetch: Option<Arc<dyn NetworkClient>>,
    xhr: Option<Arc<dyn XhrBackend>>,
}

/// Installs and removes capturing adapters on a [`Network`]
pub struct Interceptor {
    core: Arc<InterceptorCore>,
    originals: Mutex<Option<Originals>>,
}

impl Interceptor {
    pub fn new(
        config: Arc<CaptureConfig>,
        formatter: Formatter,
        metrics: Arc<CaptureMetrics>,
        clock: CaptureClock,
        sink: EntrySink,
    ) -> Self {
        Self {
            core: Arc::new(InterceptorCore {
                config,
                formatter,
                registry: DashMap::new(),
                metrics,
                clock,
                sink,
            }),
            originals: Mutex::new(None),
        }
    }

    /// Swap capturing adapters into the enabled slots.
    ///
    /// Returns `false` (and changes nothing) when already installed.
    pub fn install(&self, network: &Arc<Network>) -> bool {
        let mut originals = self.originals.lock();
        if originals.is_some() {
            tracing::debug!("Interceptor already installed");
            return false;
        }

        let fetch = self.core.config.capture_fetch.then(|| {
            network.decorate_fetch_client(|inner| {
                let wrapped: Arc<dyn NetworkClient> = Arc::new(self.wrap_client(inner));
                wrapped
            })
        });
        let xhr = self.core.config.capture_xhr.then(|| {
            network.decorate_xhr_backend(|inner| {
                let wrapped: Arc<dyn XhrBackend> = Arc::new(self.wrap_xhr(inner));
                wrapped
            })
        });

        tracing::info!(
            fetch = fetch.is_some(),
            xhr = xhr.is_some(),
            "Network capture installed"
        );
        *originals = Some(Originals {
            network: Arc::downgrade(network),
            fetch,
            xhr,
        });
        true
    }

    /// Put the original adapters back.
    ///
    /// Returns `false` when nothing was installed, or when `network` is not
    /// the one the adapters were installed on.
    pub fn uninstall(&self, network: &Arc<Network>) -> bool {
        let mut slot = self.originals.lock();
        let Some(installed) = slot.as_ref() else {
            return false;
        };
        if !ptr::eq(installed.network.as_ptr(), Arc::as_ptr(network)) {
            tracing::warn!("Interceptor is installed on a different network");
            return false;
        }
        let Some(originals) = slot.take() else {
            return false;
        };
        drop(slot);
        if let Some(fetch) = originals.fetch {
            network.replace_fetch_client(fetch);
        }
        if let Some(xhr) = originals.xhr {
            network.replace_xhr_backend(xhr);
        }
        tracing::info!(
            in_flight = self.core.registry.len(),
            "Network capture uninstalled"
        );
        true
    }

    pub fn is_installed(&self) -> bool {
        self.originals.lock().is_some()
    }

    /// Decorate a promise adapter without going through a [`Network`]
    pub fn wrap_client(&self, inner: Arc<dyn NetworkClient>) -> CapturingClient {
        CapturingClient {
            inner,
            core: Arc::clone(&self.core),
        }
    }

    /// Decorate an event backend without going through a [`Network`]
    pub fn wrap_xhr(&self, inner: Arc<dyn XhrBackend>) -> CapturingXhr {
        CapturingXhr {
            inner,
            core: Arc::clone(&self.core),
        }
    }

    /// Number of unresolved requests
    pub fn active_requests(&self) -> usize {
        self.core.registry.len()
    }

    /// Registry record of an unresolved request
    pub fn active_request(&self, id: &str) -> Option<ActiveRequest> {
        self.core.registry.get(id).map(|r| r.value().clone())
    }
}

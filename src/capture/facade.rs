// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Capture facade
//!
//! [`NetworkCapture`] wires config, formatter and interceptor together, keeps
//! a bounded queue of recent entries and fans every entry out to listeners.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::config::CaptureConfig;
use super::formatter::Formatter;
use super::listener::{EntryListener, ListenerId};
use super::metrics::{CaptureMetrics, CaptureStats};
use super::util::CaptureClock;
use crate::error::Result;
use crate::network::{
    CapturingClient, CapturingXhr, Entry, EntrySink, Interceptor, Network, NetworkClient,
    XhrBackend,
};

/// Listener registry plus bounded queue
struct EntryHub {
    listeners: RwLock<Vec<(ListenerId, EntryListener)>>,
    queue: Mutex<VecDeque<Entry>>,
    capacity: usize,
    next_listener: AtomicU64,
    metrics: Arc<CaptureMetrics>,
}

impl EntryHub {
    fn new(capacity: usize, metrics: Arc<CaptureMetrics>) -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            queue: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
            next_listener: AtomicU64::new(0),
            metrics,
        }
    }

    fn publish(&self, entry: Entry) {
        // listeners may add or remove listeners; never call them under the lock
        let listeners: Vec<(ListenerId, EntryListener)> = self.listeners.read().clone();

        for (id, listener) in listeners {
            match panic::catch_unwind(AssertUnwindSafe(|| listener(&entry))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    self.metrics.record_listener_failure();
                    tracing::warn!(listener = id.0, entry_id = %entry.id, error = %e, "Listener failed");
                }
                Err(_) => {
                    self.metrics.record_listener_failure();
                    tracing::warn!(listener = id.0, entry_id = %entry.id, "Listener panicked");
                }
            }
        }

        let mut queue = self.queue.lock();
        if queue.len() >= self.capacity {
            queue.pop_front();
            self.metrics.record_dropped();
        }
        queue.push_back(entry);
    }

    fn add(&self, listener: EntryListener) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed) + 1);
        self.listeners.write().push((id, listener));
        id
    }

    fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }
}

/// Network capture session
pub struct NetworkCapture {
    config: Arc<CaptureConfig>,
    formatter: Formatter,
    interceptor: Interceptor,
    hub: Arc<EntryHub>,
    metrics: Arc<CaptureMetrics>,
}

impl NetworkCapture {
    /// Validate the config and build the pipeline; nothing is installed yet
    pub fn new(config: CaptureConfig) -> Result<Self> {
        config.validate()?;

        let config = Arc::new(config);
        let metrics = Arc::new(CaptureMetrics::new());
        let clock = CaptureClock::new();
        let formatter = Formatter::new(Arc::clone(&config), clock, Arc::clone(&metrics));
        let hub = Arc::new(EntryHub::new(config.max_queue_size, Arc::clone(&metrics)));

        let sink_hub = Arc::clone(&hub);
        let sink: EntrySink = Arc::new(move |entry| sink_hub.publish(entry));
        let interceptor = Interceptor::new(
            Arc::clone(&config),
            formatter.clone(),
            Arc::clone(&metrics),
            clock,
            sink,
        );

        tracing::debug!(
            app = %config.app.name,
            session_id = %config.app.session_id,
            max_queue_size = config.max_queue_size,
            "Network capture created"
        );

        Ok(Self {
            config,
            formatter,
            interceptor,
            hub,
            metrics,
        })
    }

    /// Install on a network; `false` when already active
    pub fn start(&self, network: &Arc<Network>) -> bool {
        self.interceptor.install(network)
    }

    /// Restore the network's original adapters; `false` when not active or
    /// when `network` is not the one passed to `start`
    pub fn stop(&self, network: &Arc<Network>) -> bool {
        self.interceptor.uninstall(network)
    }

    pub fn is_active(&self) -> bool {
        self.interceptor.is_installed()
    }

    /// Register a listener
    pub fn add_listener(&self, listener: EntryListener) -> ListenerId {
        self.hub.add(listener)
    }

    /// Register a closure as listener
    pub fn on_entry<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Entry) -> Result<()> + Send + Sync + 'static,
    {
        self.hub.add(Arc::new(listener))
    }

    /// Unregister a listener; `false` when unknown
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.hub.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.hub.listeners.read().len()
    }

    /// Copy of the queued entries, oldest first
    pub fn entries(&self) -> Vec<Entry> {
        self.hub.queue.lock().iter().cloned().collect()
    }

    /// Take all queued entries, oldest first
    pub fn drain(&self) -> Vec<Entry> {
        self.hub.queue.lock().drain(..).collect()
    }

    pub fn clear(&self) {
        self.hub.queue.lock().clear();
    }

    pub fn queue_len(&self) -> usize {
        self.hub.queue.lock().len()
    }

    /// Requests issued and not yet resolved
    pub fn active_requests(&self) -> usize {
        self.interceptor.active_requests()
    }

    pub fn stats(&self) -> CaptureStats {
        self.metrics.report(self.queue_len())
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    /// Decorate a promise adapter directly, for callers that inject clients
    pub fn wrap_client(&self, inner: Arc<dyn NetworkClient>) -> CapturingClient {
        self.interceptor.wrap_client(inner)
    }

    /// Decorate an event backend directly
    pub fn wrap_xhr(&self, inner: Arc<dyn XhrBackend>) -> CapturingXhr {
        self.interceptor.wrap_xhr(inner)
    }
}

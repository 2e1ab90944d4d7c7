// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Entry listeners
//!
//! A listener is called synchronously for every emitted entry. Returning an
//! error (or panicking) is logged and counted by the facade; other listeners
//! still run.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::network::{Entry, EntryLevel};

/// Listener callback
pub type EntryListener = Arc<dyn Fn(&Entry) -> Result<()> + Send + Sync>;

/// Handle returned by `add_listener`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

/// Forward entries into an unbounded channel
pub fn channel_listener(sender: mpsc::UnboundedSender<Entry>) -> EntryListener {
    Arc::new(move |entry: &Entry| {
        sender
            .send(entry.clone())
            .map_err(|_| Error::listener("entry channel closed"))
    })
}

/// Log each entry through `tracing` at its own level
pub fn tracing_listener() -> EntryListener {
    Arc::new(|entry: &Entry| {
        let request_id = entry.request_id().unwrap_or("-");
        let url = entry
            .request
            .as_ref()
            .map(|r| r.url.as_str())
            .or_else(|| entry.response.as_ref().map(|r| r.url.as_str()))
            .or_else(|| entry.error.as_ref().map(|e| e.url.as_str()))
            .unwrap_or("-");
        let status = entry.response.as_ref().map(|r| r.status);
        let category = entry.category.as_str();

        match entry.level {
            EntryLevel::Error => {
                tracing::error!(request_id, url, ?status, category, subtype = ?entry.subtype, "network entry")
            }
            EntryLevel::Warn => {
                tracing::warn!(request_id, url, ?status, category, subtype = ?entry.subtype, "network entry")
            }
            EntryLevel::Info => {
                tracing::info!(request_id, url, ?status, category, subtype = ?entry.subtype, "network entry")
            }
        }
        Ok(())
    })
}

/// Write each entry as one JSON line
pub fn json_lines_listener<W>(writer: W) -> EntryListener
where
    W: Write + Send + 'static,
{
    let writer = Mutex::new(writer);
    Arc::new(move |entry: &Entry| {
        let mut writer = writer.lock();
        serde_json::to_writer(&mut *writer, entry)?;
        writer
            .write_all(b"\n")
            .and_then(|_| writer.flush())
            .map_err(|e| Error::listener(format!("failed to write entry: {}", e)))
    })
}

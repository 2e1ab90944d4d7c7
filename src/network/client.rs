// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Promise-style network surface and the swappable adapter slots

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::xhr::{PlatformXhr, XhrBackend, XmlHttpRequest};
use crate::error::Result;
use crate::http::{HttpClient, Request, Response};

/// Adapter that issues one call and resolves to its response
#[async_trait]
pub trait NetworkClient: Send + Sync {
    async fn issue(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl NetworkClient for HttpClient {
    async fn issue(&self, request: Request) -> Result<Response> {
        self.execute(request).await
    }
}

/// Process-wide network surfaces.
///
/// Both surfaces resolve their adapter at call time, so swapping a slot
/// affects every call issued afterwards and none already in flight.
pub struct Network {
    fetch: RwLock<Arc<dyn NetworkClient>>,
    xhr: RwLock<Arc<dyn XhrBackend>>,
}

impl Network {
    /// Surfaces backed by one platform client
    pub fn new(client: HttpClient) -> Arc<Self> {
        Self::with_adapters(
            Arc::new(client.clone()),
            Arc::new(PlatformXhr::new(client)),
        )
    }

    /// Surfaces backed by arbitrary adapters
    pub fn with_adapters(fetch: Arc<dyn NetworkClient>, xhr: Arc<dyn XhrBackend>) -> Arc<Self> {
        Arc::new(Self {
            fetch: RwLock::new(fetch),
            xhr: RwLock::new(xhr),
        })
    }

    /// Issue a promise-style call
    pub async fn fetch(&self, request: Request) -> Result<Response> {
        let client = self.fetch_client();
        client.issue(request).await
    }

    /// New event-driven call bound to this network
    pub fn xhr(self: &Arc<Self>) -> XmlHttpRequest {
        XmlHttpRequest::new(Arc::clone(self))
    }

    /// Adapter currently in the promise slot
    pub fn fetch_client(&self) -> Arc<dyn NetworkClient> {
        Arc::clone(&self.fetch.read())
    }

    /// Backend currently in the event slot
    pub fn xhr_backend(&self) -> Arc<dyn XhrBackend> {
        Arc::clone(&self.xhr.read())
    }

    /// Replace the promise adapter, returning the previous one
    pub fn replace_fetch_client(&self, client: Arc<dyn NetworkClient>) -> Arc<dyn NetworkClient> {
        std::mem::replace(&mut *self.fetch.write(), client)
    }

    /// Replace the event backend, returning the previous one
    pub fn replace_xhr_backend(&self, backend: Arc<dyn XhrBackend>) -> Arc<dyn XhrBackend> {
        std::mem::replace(&mut *self.xhr.write(), backend)
    }

    /// Wrap the promise adapter under one write lock, returning the original
    pub fn decorate_fetch_client<F>(&self, decorate: F) -> Arc<dyn NetworkClient>
    where
        F: FnOnce(Arc<dyn NetworkClient>) -> Arc<dyn NetworkClient>,
    {
        let mut slot = self.fetch.write();
        let original = Arc::clone(&slot);
        *slot = decorate(Arc::clone(&original));
        original
    }

    /// Wrap the event backend under one write lock, returning the original
    pub fn decorate_xhr_backend<F>(&self, decorate: F) -> Arc<dyn XhrBackend>
    where
        F: FnOnce(Arc<dyn XhrBackend>) -> Arc<dyn XhrBackend>,
    {
        let mut slot = self.xhr.write();
        let original = Arc::clone(&slot);
        *slot = decorate(Arc::clone(&original));
        original
    }
}

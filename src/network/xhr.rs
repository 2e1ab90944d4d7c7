// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Event-driven network surface
//!
//! An [`XmlHttpRequest`] is opened, configured and sent; progress is reported
//! by moving its [`ReadyState`] forward and notifying every observer in its
//! [`ObserverList`]. The work itself is done by the [`XhrBackend`] installed
//! in the owning [`Network`](super::Network), which is the seam the capture
//! interceptor decorates.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use url::Url;

use super::client::Network;
use crate::error::{Error, Result};
use crate::http::{Body, HttpClient, Request, Response};

/// Lifecycle of an event-driven call
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ReadyState {
    Unsent = 0,
    Opened = 1,
    HeadersReceived = 2,
    Loading = 3,
    Done = 4,
}

impl ReadyState {
    /// Numeric value as reported on the wire
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Ready-state observer
pub type ReadyStateObserver = Arc<dyn Fn(&XhrState) + Send + Sync>;

/// Handle returned when registering an observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Ordered multicast list of ready-state observers
#[derive(Clone, Default)]
pub struct ObserverList {
    observers: Vec<(ObserverId, ReadyStateObserver)>,
    next_id: u64,
}

impl fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("len", &self.observers.len())
            .finish()
    }
}

impl ObserverList {
    fn allocate(&mut self) -> ObserverId {
        self.next_id += 1;
        ObserverId(self.next_id)
    }

    /// Append an observer
    pub fn push(&mut self, observer: ReadyStateObserver) -> ObserverId {
        let id = self.allocate();
        self.observers.push((id, observer));
        id
    }

    /// Insert an observer ahead of every existing one
    pub fn prepend(&mut self, observer: ReadyStateObserver) -> ObserverId {
        let id = self.allocate();
        self.observers.insert(0, (id, observer));
        id
    }

    /// Remove an observer; returns whether it was present
    pub fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    fn snapshot(&self) -> Vec<ReadyStateObserver> {
        self.observers.iter().map(|(_, o)| Arc::clone(o)).collect()
    }
}

/// Capture metadata recorded on an instance when it is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureTag {
    pub request_id: String,
    pub method: String,
    pub url: String,
    /// Observer installed for this call, if it was sent
    pub observer: Option<ObserverId>,
}

/// Mutable state of one event-driven call
#[derive(Debug)]
pub struct XhrState {
    method: Option<Method>,
    url: Option<Url>,
    request_headers: HeaderMap,
    timeout: Option<Duration>,
    ready_state: ReadyState,
    status: u16,
    status_text: String,
    response_headers: HeaderMap,
    response_body: Bytes,
    response_url: Option<Url>,
    error: Option<Error>,
    observers: ObserverList,
    capture: Option<CaptureTag>,
}

impl Default for XhrState {
    fn default() -> Self {
        Self::new()
    }
}

impl XhrState {
    /// Fresh, unsent state
    pub fn new() -> Self {
        Self {
            method: None,
            url: None,
            request_headers: HeaderMap::new(),
            timeout: None,
            ready_state: ReadyState::Unsent,
            status: 0,
            status_text: String::new(),
            response_headers: HeaderMap::new(),
            response_body: Bytes::new(),
            response_url: None,
            error: None,
            observers: ObserverList::default(),
            capture: None,
        }
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn request_headers(&self) -> &HeaderMap {
        &self.request_headers
    }

    /// Status code; 0 until headers are received or after a failure
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn response_bytes(&self) -> &Bytes {
        &self.response_body
    }

    /// Response body as text
    pub fn response_text(&self) -> Result<&str> {
        std::str::from_utf8(&self.response_body)
            .map_err(|e| Error::other(format!("Response body is not valid UTF-8: {}", e)))
    }

    /// Final URL of the response, falling back to the requested one
    pub fn response_url(&self) -> Option<&Url> {
        self.response_url.as_ref().or(self.url.as_ref())
    }

    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.response_headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// All response headers as a raw `name: value\r\n` block
    pub fn all_response_headers(&self) -> String {
        let mut out = String::new();
        for (name, value) in self.response_headers.iter() {
            out.push_str(name.as_str());
            out.push_str(": ");
            out.push_str(value.to_str().unwrap_or(crate::capture::util::UNREADABLE_HEADER));
            out.push_str("\r\n");
        }
        out
    }

    /// Transport failure, if the call failed
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    pub fn capture_tag(&self) -> Option<&CaptureTag> {
        self.capture.as_ref()
    }

    pub fn set_capture_tag(&mut self, tag: Option<CaptureTag>) {
        self.capture = tag;
    }

    pub fn capture_tag_mut(&mut self) -> Option<&mut CaptureTag> {
        self.capture.as_mut()
    }

    pub fn observers(&self) -> &ObserverList {
        &self.observers
    }

    pub fn observers_mut(&mut self) -> &mut ObserverList {
        &mut self.observers
    }

    /// Reset for a new call and move to `Opened`
    pub fn open(&mut self, method: Method, url: &str) -> Result<()> {
        let url = Url::parse(url)?;
        self.method = Some(method);
        self.url = Some(url);
        self.request_headers.clear();
        self.status = 0;
        self.status_text.clear();
        self.response_headers.clear();
        self.response_body = Bytes::new();
        self.response_url = None;
        self.error = None;
        self.set_ready_state(ReadyState::Opened);
        Ok(())
    }

    /// Add a request header; only valid while `Opened`
    pub fn set_request_header(&mut self, name: &str, value: &str) -> Result<()> {
        if self.ready_state != ReadyState::Opened {
            return Err(Error::InvalidState(format!(
                "set_request_header called in state {:?}",
                self.ready_state
            )));
        }
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::other(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::other(format!("Invalid header value: {}", e)))?;
        self.request_headers.append(name, value);
        Ok(())
    }

    /// Build the outgoing request; only valid while `Opened`
    pub fn build_request(&self, body: Option<Body>) -> Result<Request> {
        let (Some(method), Some(url), ReadyState::Opened) =
            (self.method.clone(), self.url.clone(), self.ready_state)
        else {
            return Err(Error::InvalidState(format!(
                "send called in state {:?}",
                self.ready_state
            )));
        };

        let mut request = Request::new(method, url.as_str())?;
        request.headers = self.request_headers.clone();
        request.body = body;
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        Ok(request)
    }

    /// Move to `state` and notify observers
    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_state = state;
        for observer in self.observers.snapshot() {
            observer(self);
        }
    }

    /// Record a response, stepping through the remaining states up to `Done`
    pub fn complete(&mut self, response: Response) {
        self.status = response.status_code();
        self.status_text = response.status_text().to_string();
        self.response_headers = response.headers;
        self.response_url = Some(response.url);
        self.set_ready_state(ReadyState::HeadersReceived);

        self.response_body = response.body;
        self.set_ready_state(ReadyState::Loading);
        self.set_ready_state(ReadyState::Done);
    }

    /// Record a transport failure and move to `Done`
    pub fn fail(&mut self, error: Error) {
        self.status = 0;
        self.status_text.clear();
        self.error = Some(error);
        self.set_ready_state(ReadyState::Done);
    }
}

/// Backend that performs event-driven calls
#[async_trait]
pub trait XhrBackend: Send + Sync {
    /// Prepare the instance for a call
    fn open(&self, xhr: &mut XhrState, method: Method, url: &str) -> Result<()>;

    /// Perform the call, driving the instance to `Done`.
    ///
    /// Transport failures are recorded on the instance (`Done` with an
    /// error) and are not returned; `Err` means the call could not be sent.
    async fn send(&self, xhr: &mut XhrState, body: Option<Body>) -> Result<()>;
}

/// Backend on top of the platform HTTP client
#[derive(Clone)]
pub struct PlatformXhr {
    client: HttpClient,
}

impl PlatformXhr {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl XhrBackend for PlatformXhr {
    fn open(&self, xhr: &mut XhrState, method: Method, url: &str) -> Result<()> {
        xhr.open(method, url)
    }

    async fn send(&self, xhr: &mut XhrState, body: Option<Body>) -> Result<()> {
        let request = xhr.build_request(body)?;
        match self.client.execute(request).await {
            Ok(response) => xhr.complete(response),
            Err(e) => {
                tracing::debug!(error = %e, "Event-driven call failed");
                xhr.fail(e);
            }
        }
        Ok(())
    }
}

/// Event-driven call bound to a [`Network`]
pub struct XmlHttpRequest {
    network: Arc<Network>,
    state: XhrState,
}

impl XmlHttpRequest {
    pub(crate) fn new(network: Arc<Network>) -> Self {
        Self {
            network,
            state: XhrState::new(),
        }
    }

    /// Open through the network's current backend
    pub fn open(&mut self, method: Method, url: &str) -> Result<()> {
        let backend = self.network.xhr_backend();
        backend.open(&mut self.state, method, url)
    }

    pub fn set_request_header(&mut self, name: &str, value: &str) -> Result<()> {
        self.state.set_request_header(name, value)
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.state.set_timeout(timeout);
    }

    /// Register an observer, called on every ready-state change
    pub fn on_ready_state_change<F>(&mut self, observer: F) -> ObserverId
    where
        F: Fn(&XhrState) + Send + Sync + 'static,
    {
        self.state.observers_mut().push(Arc::new(observer))
    }

    /// Send through the network's current backend
    pub async fn send(&mut self, body: Option<Body>) -> Result<()> {
        let backend = self.network.xhr_backend();
        backend.send(&mut self.state, body).await
    }

    pub fn state(&self) -> &XhrState {
        &self.state
    }

    pub fn ready_state(&self) -> ReadyState {
        self.state.ready_state()
    }

    pub fn status(&self) -> u16 {
        self.state.status()
    }

    pub fn response_text(&self) -> Result<&str> {
        self.state.response_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_ready_state_values() {
        assert_eq!(ReadyState::Unsent.as_u8(), 0);
        assert_eq!(ReadyState::Done.as_u8(), 4);
        assert!(ReadyState::Loading < ReadyState::Done);
    }

    #[test]
    fn test_observer_order_and_removal() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut list = ObserverList::default();

        let s = seen.clone();
        let first = list.push(Arc::new(move |_: &XhrState| s.lock().push("pushed")));
        let s = seen.clone();
        list.prepend(Arc::new(move |_: &XhrState| s.lock().push("prepended")));

        let state = XhrState::new();
        for observer in list.snapshot() {
            observer(&state);
        }
        assert_eq!(*seen.lock(), vec!["prepended", "pushed"]);

        assert!(list.remove(first));
        assert!(!list.remove(first));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_complete_walks_states_in_order() {
        let states = Arc::new(Mutex::new(Vec::new()));
        let mut xhr = XhrState::new();
        let s = states.clone();
        xhr.observers_mut()
            .push(Arc::new(move |x: &XhrState| s.lock().push(x.ready_state())));

        xhr.open(Method::GET, "https://example.com/data").unwrap();
        let url = Url::parse("https://example.com/data").unwrap();
        let response = Response::from_status(200, url, "hello")
            .unwrap()
            .with_header("content-type", "text/plain");
        xhr.complete(response);

        assert_eq!(
            *states.lock(),
            vec![
                ReadyState::Opened,
                ReadyState::HeadersReceived,
                ReadyState::Loading,
                ReadyState::Done
            ]
        );
        assert_eq!(xhr.status(), 200);
        assert_eq!(xhr.status_text(), "OK");
        assert_eq!(xhr.response_text().unwrap(), "hello");
        assert_eq!(xhr.all_response_headers(), "content-type: text/plain\r\n");
    }

    #[test]
    fn test_fail_reaches_done_with_error() {
        let mut xhr = XhrState::new();
        xhr.open(Method::GET, "https://example.com/").unwrap();
        xhr.fail(Error::aborted("stopped"));
        assert_eq!(xhr.ready_state(), ReadyState::Done);
        assert_eq!(xhr.status(), 0);
        assert!(xhr.error().is_some());
    }

    #[test]
    fn test_send_requires_open() {
        let xhr = XhrState::new();
        let err = xhr.build_request(None).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }

    #[test]
    fn test_request_headers_only_while_opened() {
        let mut xhr = XhrState::new();
        assert!(xhr.set_request_header("x-a", "1").is_err());
        xhr.open(Method::POST, "https://example.com/").unwrap();
        xhr.set_request_header("x-a", "1").unwrap();
        let request = xhr.build_request(Some(Body::text("hi"))).unwrap();
        assert_eq!(request.headers.get("x-a").unwrap(), "1");
        assert_eq!(request.method, Method::POST);
    }
}

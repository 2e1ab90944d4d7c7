// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network surfaces and capture interception
//!
//! [`Network`] owns the two call surfaces: promise-style calls through a
//! [`NetworkClient`] and event-driven calls through an [`XhrBackend`]. The
//! [`Interceptor`] decorates both and emits one [`Entry`] per lifecycle stage.

mod client;
mod event;
mod interceptor;
mod xhr;

pub use client::{Network, NetworkClient};
pub use event::{
    Entry, EntryLevel, EntryType, ErrorInfo, Metadata, RequestDescriptor, RequestInfo,
    RequestKind, ResponseInfo, Subtype, Timing,
};
pub use interceptor::{
    ActiveRequest, CapturingClient, CapturingXhr, EntrySink, Interceptor, CANCELLED_MESSAGE,
};
pub use xhr::{
    CaptureTag, ObserverId, ObserverList, PlatformXhr, ReadyState, ReadyStateObserver,
    XhrBackend, XhrState, XmlHttpRequest,
};

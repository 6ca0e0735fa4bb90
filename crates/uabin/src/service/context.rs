// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::message::RequestHeader;
use super::ServiceId;
use crate::types::NodeId;

/// Per-request information handed to the endpoint and the handler.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub channel_id: u32,
    /// Secure-channel request id of the message.
    pub request_id: u32,
    /// `None` when the request matched no service.
    pub service: Option<ServiceId>,
    pub request_handle: u32,
    /// Authentication token of the session the request belongs to.
    pub session: NodeId,
    pub timeout_hint: Option<Duration>,
    pub received: Instant,
    cancelled: Arc<AtomicBool>,
}

impl RequestContext {
    pub fn new(channel_id: u32, request_id: u32, service: Option<ServiceId>, header: &RequestHeader) -> Self {
        Self {
            channel_id,
            request_id,
            service,
            request_handle: header.request_handle,
            session: header.authentication_token.clone(),
            timeout_hint: header.timeout(),
            received: Instant::now(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Set once a `Cancel` request targeted this request. Handlers check it
    /// and finish early; nothing is aborted for them.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// When the client stops waiting, from the header's timeout hint.
    pub fn deadline(&self) -> Option<Instant> {
        self.timeout_hint.map(|t| self.received + t)
    }

    pub(crate) fn cancel_flag(&self) -> &Arc<AtomicBool> {
        &self.cancelled
    }
}

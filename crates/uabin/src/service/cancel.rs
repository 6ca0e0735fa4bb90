// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Cooperative cancellation of in-flight requests.
//!
//! The dispatcher registers every request it has validated. A `Cancel`
//! request marks the requests of the same session carrying the targeted
//! request handle; their handlers see [`RequestContext::is_cancelled`] and
//! decide how to finish.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::context::RequestContext;
use super::handler::{HandlerFuture, ServiceHandler};
use super::message::{ServiceRequest, ServiceResponse};
use crate::types::{NodeId, StatusCode, Value};

struct PendingEntry {
    session: NodeId,
    request_handle: u32,
    cancelled: Arc<AtomicBool>,
}

/// In-flight requests keyed by `(channel id, request id)`.
pub struct PendingRequests {
    entries: DashMap<(u32, u32), PendingEntry>,
    /// Reserved slots; never exceeds `max_entries`.
    count: AtomicUsize,
    max_entries: usize,
}

impl PendingRequests {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            count: AtomicUsize::new(0),
            max_entries,
        }
    }

    /// Track `ctx` for cancellation. Returns `false` when the table is full
    /// or another request with the same `(channel id, request id)` is
    /// already tracked; the request then runs without being cancellable.
    pub fn register(&self, ctx: &RequestContext) -> bool {
        let reserved = self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.max_entries).then_some(n + 1)
            });
        if let Err(in_flight) = reserved {
            log::warn!(
                "[cancel] {} requests in flight, request {} not tracked",
                in_flight,
                ctx.request_handle
            );
            return false;
        }
        match self.entries.entry((ctx.channel_id, ctx.request_id)) {
            Entry::Occupied(_) => {
                self.count.fetch_sub(1, Ordering::AcqRel);
                log::debug!(
                    "[cancel] request id {} already in flight on channel {}, request {} not tracked",
                    ctx.request_id,
                    ctx.channel_id,
                    ctx.request_handle
                );
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(PendingEntry {
                    session: ctx.session.clone(),
                    request_handle: ctx.request_handle,
                    cancelled: Arc::clone(ctx.cancel_flag()),
                });
                true
            }
        }
    }

    pub fn unregister(&self, channel_id: u32, request_id: u32) {
        if self.entries.remove(&(channel_id, request_id)).is_some() {
            self.count.fetch_sub(1, Ordering::AcqRel);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mark every request of `session` with `request_handle`, skipping the
    /// request `except`. Returns how many were marked.
    pub fn cancel(&self, session: &NodeId, request_handle: u32, except: (u32, u32)) -> u32 {
        let mut count = 0;
        for entry in self.entries.iter() {
            let pending = entry.value();
            if *entry.key() == except || pending.request_handle != request_handle || pending.session != *session {
                continue;
            }
            if !pending.cancelled.swap(true, Ordering::AcqRel) {
                log::warn!(
                    "[cancel] request {} on channel {} cancelled by client",
                    request_handle,
                    entry.key().0
                );
                count += 1;
            }
        }
        count
    }
}

/// Built-in `Cancel` service.
pub struct CancelHandler {
    pending: Arc<PendingRequests>,
}

impl CancelHandler {
    pub fn new(pending: Arc<PendingRequests>) -> Self {
        Self { pending }
    }
}

impl ServiceHandler for CancelHandler {
    fn call<'a>(
        &'a self,
        ctx: &'a RequestContext,
        request: &'a ServiceRequest,
        response: &'a mut ServiceResponse,
    ) -> HandlerFuture<'a> {
        let status = match request.scalar("RequestHandle").and_then(Value::as_u32) {
            None => StatusCode::BAD_INVALID_ARGUMENT,
            Some(handle) => {
                let count = self
                    .pending
                    .cancel(&ctx.session, handle, (ctx.channel_id, ctx.request_id));
                match response.set("CancelCount", Value::UInt32(count)) {
                    Ok(()) => StatusCode::GOOD,
                    Err(status) => status,
                }
            }
        };
        Box::pin(std::future::ready(status))
    }
}

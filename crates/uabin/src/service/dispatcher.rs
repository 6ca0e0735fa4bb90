// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Request dispatcher and fault engine.
//!
//! Each request walks
//! `Received -> Validated -> ResponseContextOpen -> Invoked -> [Faulted ->] Sent -> Closed`.
//! Validation happens before any side effect, so a malformed request never
//! reaches its handler. A bad status from the handler replaces the response
//! with a `ServiceFault` that keeps the response's diagnostics and string
//! table. Exactly one response object is alive after the response context is
//! opened, and every request ends `Closed` whatever failed on the way.

use std::mem;
use std::sync::Arc;

use tokio::task::JoinHandle;

use super::cancel::{CancelHandler, PendingRequests};
use super::context::RequestContext;
use super::endpoint::Endpoint;
use super::fault::create_fault;
use super::handler::ServiceHandler;
use super::message::{decode_request, RequestHeader, ServiceRequest, ServiceResponse};
use super::table::{body_members, service_table, ServiceType};
use super::ServiceId;
use crate::config::{EncodingLimits, UaConfig};
use crate::debug;
use crate::types::{runtime, DateTime, DiagnosticInfo, StatusCode, TypeTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Received,
    Validated,
    ResponseContextOpen,
    Invoked,
    Faulted,
    Sent,
    Closed,
}

/// Outcome of one dispatched request.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
    pub service: Option<ServiceId>,
    pub request_handle: u32,
    /// Service result, or the status that replaced it.
    pub status: StatusCode,
    pub handler_called: bool,
    /// A `ServiceFault` was sent in place of the response.
    pub faulted: bool,
    /// The endpoint accepted the response.
    pub sent: bool,
    /// States the request went through, ending in `Closed`.
    pub path: Vec<RequestState>,
}

struct Transitions {
    request_handle: u32,
    path: Vec<RequestState>,
}

impl Transitions {
    fn new(request_handle: u32) -> Self {
        let mut t = Self {
            request_handle,
            path: Vec::with_capacity(6),
        };
        t.enter(RequestState::Received);
        t
    }

    fn enter(&mut self, state: RequestState) {
        log::trace!(
            "[dispatch] request {}: {:?} -> {:?}",
            self.request_handle,
            self.path.last(),
            state
        );
        self.path.push(state);
    }
}

/// Unregisters a request from the pending table when dropped.
struct PendingGuard<'a> {
    pending: &'a PendingRequests,
    key: Option<(u32, u32)>,
}

impl<'a> PendingGuard<'a> {
    fn new(pending: &'a PendingRequests, ctx: &RequestContext) -> Self {
        let key = pending
            .register(ctx)
            .then_some((ctx.channel_id, ctx.request_id));
        Self { pending, key }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if let Some((channel_id, request_id)) = self.key {
            self.pending.unregister(channel_id, request_id);
        }
    }
}

/// Drives requests from decode to sent response.
#[derive(Clone)]
pub struct Dispatcher {
    endpoint: Arc<dyn Endpoint>,
    types: Arc<TypeTable>,
    pending: Arc<PendingRequests>,
    cancel: Arc<dyn ServiceHandler>,
    limits: EncodingLimits,
    log_buffers: bool,
}

impl Dispatcher {
    pub fn new(endpoint: Arc<dyn Endpoint>, config: &UaConfig) -> Self {
        let pending = Arc::new(PendingRequests::new(config.dispatcher.max_pending_requests));
        Self {
            endpoint,
            types: Arc::new(TypeTable::new()),
            cancel: Arc::new(CancelHandler::new(Arc::clone(&pending))),
            pending,
            limits: config.encoding,
            log_buffers: config.dispatcher.log_buffers,
        }
    }

    /// Use `types` to decode ExtensionObjects of custom types.
    pub fn with_types(mut self, types: Arc<TypeTable>) -> Self {
        self.types = types;
        self
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn pending(&self) -> &PendingRequests {
        &self.pending
    }

    /// Decode `bytes` and dispatch the request. Messages that cannot be
    /// decoded are answered with a fault carrying the decode status.
    pub async fn process_message(&self, channel_id: u32, request_id: u32, bytes: &[u8]) -> DispatchReport {
        if self.log_buffers {
            debug::log_buffer(&format!("request {} on channel {}", request_id, channel_id), bytes);
        }
        match decode_request(bytes, &self.types, self.limits) {
            Ok(request) => self.dispatch(channel_id, request_id, request).await,
            Err(rejected) => {
                log::debug!("[dispatch] channel {}: {}", channel_id, rejected);
                let header = rejected.header.unwrap_or_default();
                let path = Transitions::new(header.request_handle);
                self.reject(channel_id, request_id, None, &header, rejected.status, path)
            }
        }
    }

    /// Run `request` to completion on a tokio task. Must be called from
    /// within a runtime.
    pub fn spawn(&self, channel_id: u32, request_id: u32, request: ServiceRequest) -> JoinHandle<DispatchReport> {
        let this = self.clone();
        tokio::spawn(async move { this.dispatch(channel_id, request_id, request).await })
    }

    pub async fn dispatch(&self, channel_id: u32, request_id: u32, request: ServiceRequest) -> DispatchReport {
        let mut path = Transitions::new(request.header.request_handle);

        let service = match validate(&request) {
            Ok(service) => service,
            Err((id, status)) => {
                return self.reject(channel_id, request_id, id, &request.header, status, path);
            }
        };
        path.enter(RequestState::Validated);

        let ctx = RequestContext::new(channel_id, request_id, Some(service.id), &request.header);
        let _pending = PendingGuard::new(&self.pending, &ctx);

        let mut response = match self.endpoint.begin_send_response(&ctx, service) {
            Ok(response) => response,
            Err(status) => {
                log::warn!(
                    "[dispatch] request {}: no response context: {}",
                    ctx.request_handle,
                    status
                );
                let sent = self.send(&ctx, status, None, &mut path);
                return report(&ctx, status, false, false, sent, path);
            }
        };
        if *response.encodeable_type != *service.response_type {
            log::warn!(
                "[dispatch] request {}: endpoint opened {} for {}",
                ctx.request_handle,
                response.encodeable_type.name,
                service.response_type.name
            );
            drop(response);
            let status = StatusCode::BAD_INTERNAL_ERROR;
            let sent = self.send(&ctx, status, None, &mut path);
            return report(&ctx, status, false, false, sent, path);
        }
        response.header.request_handle = request.header.request_handle;
        if response.header.timestamp.is_null() {
            response.header.timestamp = DateTime::now();
        }
        path.enter(RequestState::ResponseContextOpen);

        let handler = self
            .endpoint
            .service_function(&ctx, service.id)
            .or_else(|| (service.id == ServiceId::Cancel).then(|| Arc::clone(&self.cancel)));
        let (status, called) = match handler {
            Some(handler) => (handler.call(&ctx, &request, &mut response).await, true),
            None => {
                log::debug!("[dispatch] no handler for {}", service.id);
                (StatusCode::BAD_NOT_IMPLEMENTED, false)
            }
        };
        path.enter(RequestState::Invoked);

        if !status.is_bad() {
            response.header.service_result = status;
            let sent = self.send(&ctx, status, Some(response), &mut path);
            return report(&ctx, status, called, false, sent, path);
        }

        let diagnostics = mem::take(&mut response.header.service_diagnostics);
        let string_table = response.header.string_table.take();
        match create_fault(&request.header, status, diagnostics, string_table) {
            Ok(fault) => {
                // The fault replaces the response in one step; the response is dropped here.
                response = fault;
                path.enter(RequestState::Faulted);
                let sent = self.send(&ctx, status, Some(response), &mut path);
                report(&ctx, status, called, true, sent, path)
            }
            Err(fault_status) => {
                drop(response);
                let sent = self.send(&ctx, fault_status, None, &mut path);
                report(&ctx, fault_status, called, false, sent, path)
            }
        }
    }

    /// Answer a request that failed before its response context was opened.
    fn reject(
        &self,
        channel_id: u32,
        request_id: u32,
        service: Option<ServiceId>,
        header: &RequestHeader,
        status: StatusCode,
        mut path: Transitions,
    ) -> DispatchReport {
        let ctx = RequestContext::new(channel_id, request_id, service, header);
        match create_fault(header, status, DiagnosticInfo::default(), None) {
            Ok(fault) => {
                path.enter(RequestState::Faulted);
                let sent = self.send(&ctx, status, Some(fault), &mut path);
                report(&ctx, status, false, true, sent, path)
            }
            Err(fault_status) => {
                let sent = self.send(&ctx, fault_status, None, &mut path);
                report(&ctx, fault_status, false, false, sent, path)
            }
        }
    }

    /// Hand `response` to the endpoint, then close. A failed send is
    /// reported once more as a transport error without a body.
    fn send(
        &self,
        ctx: &RequestContext,
        status: StatusCode,
        response: Option<ServiceResponse>,
        path: &mut Transitions,
    ) -> bool {
        let sent = match self.endpoint.end_send_response(ctx, status, response.as_ref()) {
            Ok(()) => {
                path.enter(RequestState::Sent);
                true
            }
            Err(err) => {
                log::warn!(
                    "[dispatch] request {}: sending {} failed: {}",
                    ctx.request_handle,
                    status,
                    err
                );
                if let Err(err) = self.endpoint.end_send_response(ctx, err, None) {
                    log::warn!(
                        "[dispatch] request {}: error response failed: {}",
                        ctx.request_handle,
                        err
                    );
                }
                false
            }
        };
        drop(response);
        path.enter(RequestState::Closed);
        sent
    }
}

/// Find the service of `request` and check the request against it.
fn validate(request: &ServiceRequest) -> Result<&'static ServiceType, (Option<ServiceId>, StatusCode)> {
    let Some(service) = service_table().find_by_request_type(&request.request_type_id) else {
        log::debug!("[dispatch] no service for type {}", request.request_type_id);
        return Err((None, StatusCode::BAD_SERVICE_UNSUPPORTED));
    };
    if *request.encodeable_type != *service.request_type {
        log::debug!(
            "[dispatch] {} request carries type {}",
            service.id,
            request.encodeable_type.name
        );
        return Err((Some(service.id), StatusCode::BAD_INVALID_ARGUMENT));
    }
    runtime::check_fields(&request.body.fields, body_members(&service.request_type)).map_err(|status| {
        log::debug!("[dispatch] {} request rejected: {}", service.id, status);
        (Some(service.id), status)
    })?;
    Ok(service)
}

fn report(
    ctx: &RequestContext,
    status: StatusCode,
    handler_called: bool,
    faulted: bool,
    sent: bool,
    path: Transitions,
) -> DispatchReport {
    DispatchReport {
        service: ctx.service,
        request_handle: ctx.request_handle,
        status,
        handler_called,
        faulted,
        sent,
        path: path.path,
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transport side of the dispatcher.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::context::RequestContext;
use super::handler::{HandlerRegistry, ServiceHandler};
use super::message::{encode_response, ServiceResponse};
use super::table::ServiceType;
use super::ServiceId;
use crate::config::EncodingLimits;
use crate::debug;
use crate::types::{StatusCode, UaResult};

/// What the dispatcher needs from the transport.
///
/// `begin_send_response` opens the response for a request,
/// `service_function` resolves the implementation to call and
/// `end_send_response` takes the finished response (or `None` when only a
/// transport-level error can be reported).
pub trait Endpoint: Send + Sync {
    fn begin_send_response(&self, _ctx: &RequestContext, service: &ServiceType) -> UaResult<ServiceResponse> {
        Ok(ServiceResponse::new(&service.response_type))
    }

    fn service_function(&self, ctx: &RequestContext, service: ServiceId) -> Option<Arc<dyn ServiceHandler>>;

    fn end_send_response(
        &self,
        ctx: &RequestContext,
        status: StatusCode,
        response: Option<&ServiceResponse>,
    ) -> UaResult<()>;
}

/// One message handed to the channel.
#[derive(Debug, Clone, PartialEq)]
pub struct SentResponse {
    pub channel_id: u32,
    pub request_id: u32,
    pub status: StatusCode,
    /// Encoded response or fault; `None` for a transport-level error.
    pub bytes: Option<Vec<u8>>,
}

/// In-process endpoint: encodes each response and queues the bytes on a
/// tokio channel.
pub struct ChannelEndpoint {
    handlers: HandlerRegistry,
    limits: EncodingLimits,
    log_buffers: bool,
    tx: mpsc::UnboundedSender<SentResponse>,
}

impl ChannelEndpoint {
    pub fn new(limits: EncodingLimits) -> (Self, mpsc::UnboundedReceiver<SentResponse>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let endpoint = Self {
            handlers: HandlerRegistry::new(),
            limits,
            log_buffers: false,
            tx,
        };
        (endpoint, rx)
    }

    /// Hex-dump every encoded response under the `hex` log target.
    pub fn with_log_buffers(mut self, enabled: bool) -> Self {
        self.log_buffers = enabled;
        self
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }
}

impl Endpoint for ChannelEndpoint {
    fn service_function(&self, _ctx: &RequestContext, service: ServiceId) -> Option<Arc<dyn ServiceHandler>> {
        self.handlers.get(service)
    }

    fn end_send_response(
        &self,
        ctx: &RequestContext,
        status: StatusCode,
        response: Option<&ServiceResponse>,
    ) -> UaResult<()> {
        let bytes = match response {
            Some(response) => {
                let bytes = encode_response(response, self.limits)?;
                if self.log_buffers {
                    debug::log_buffer(&format!("response {}", ctx.request_handle), &bytes);
                }
                Some(bytes)
            }
            None => None,
        };
        self.tx
            .send(SentResponse {
                channel_id: ctx.channel_id,
                request_id: ctx.request_id,
                status,
                bytes,
            })
            .map_err(|_| {
                log::warn!("[endpoint] channel {} closed", ctx.channel_id);
                StatusCode::BAD_COMMUNICATION_ERROR
            })
    }
}

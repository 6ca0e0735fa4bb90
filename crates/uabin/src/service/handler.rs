// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Service implementations.
//!
//! A [`ServiceHandler`] fills the response for one request and returns the
//! service result. Handlers may complete asynchronously; the dispatcher
//! awaits the returned future before sending.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use parking_lot::RwLock;

use super::context::RequestContext;
use super::message::{ServiceRequest, ServiceResponse};
use super::ServiceId;
use crate::types::StatusCode;

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = StatusCode> + Send + 'a>>;

/// Service logic for one or more services.
///
/// Implement this trait directly for asynchronous handlers:
///
/// ```rust
/// use uabin::service::{HandlerFuture, RequestContext, ServiceHandler, ServiceRequest, ServiceResponse};
/// use uabin::types::StatusCode;
///
/// struct Slow;
///
/// impl ServiceHandler for Slow {
///     fn call<'a>(
///         &'a self,
///         ctx: &'a RequestContext,
///         _request: &'a ServiceRequest,
///         _response: &'a mut ServiceResponse,
///     ) -> HandlerFuture<'a> {
///         Box::pin(async move {
///             tokio::task::yield_now().await;
///             if ctx.is_cancelled() {
///                 StatusCode::BAD_REQUEST_CANCELLED_BY_CLIENT
///             } else {
///                 StatusCode::GOOD
///             }
///         })
///     }
/// }
/// ```
///
/// Synchronous closures `Fn(&RequestContext, &ServiceRequest, &mut
/// ServiceResponse) -> StatusCode` are handlers as well.
pub trait ServiceHandler: Send + Sync + 'static {
    fn call<'a>(
        &'a self,
        ctx: &'a RequestContext,
        request: &'a ServiceRequest,
        response: &'a mut ServiceResponse,
    ) -> HandlerFuture<'a>;
}

impl<F> ServiceHandler for F
where
    F: Fn(&RequestContext, &ServiceRequest, &mut ServiceResponse) -> StatusCode + Send + Sync + 'static,
{
    fn call<'a>(
        &'a self,
        ctx: &'a RequestContext,
        request: &'a ServiceRequest,
        response: &'a mut ServiceResponse,
    ) -> HandlerFuture<'a> {
        let status = self(ctx, request, response);
        Box::pin(std::future::ready(status))
    }
}

/// Handlers keyed by service. Services without a handler answer
/// `BadNotImplemented`.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<ServiceId, Arc<dyn ServiceHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handler` for `id`, returning the one it replaces.
    pub fn register<H: ServiceHandler>(&self, id: ServiceId, handler: H) -> Option<Arc<dyn ServiceHandler>> {
        self.register_arc(id, Arc::new(handler))
    }

    pub fn register_arc(&self, id: ServiceId, handler: Arc<dyn ServiceHandler>) -> Option<Arc<dyn ServiceHandler>> {
        log::debug!("[handlers] registered {}", id);
        self.handlers.write().insert(id, handler)
    }

    pub fn unregister(&self, id: ServiceId) -> Option<Arc<dyn ServiceHandler>> {
        let removed = self.handlers.write().remove(&id);
        if removed.is_some() {
            log::debug!("[handlers] unregistered {}", id);
        }
        removed
    }

    pub fn get(&self, id: ServiceId) -> Option<Arc<dyn ServiceHandler>> {
        self.handlers.read().get(&id).cloned()
    }

    pub fn contains(&self, id: ServiceId) -> bool {
        self.handlers.read().contains_key(&id)
    }

    /// Services with a handler, in declaration order.
    pub fn services(&self) -> Vec<ServiceId> {
        let mut ids: Vec<_> = self.handlers.read().keys().copied().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::message::RequestHeader;
    use crate::service::table::service_table;

    fn ok(_: &RequestContext, _: &ServiceRequest, _: &mut ServiceResponse) -> StatusCode {
        StatusCode::GOOD
    }

    #[test]
    fn test_register_replace_unregister() {
        let registry = HandlerRegistry::new();
        assert!(registry.register(ServiceId::Read, ok).is_none());
        assert!(registry.register(ServiceId::Read, ok).is_some());
        registry.register(ServiceId::Browse, ok);
        assert_eq!(registry.services(), vec![ServiceId::Browse, ServiceId::Read]);

        assert!(registry.unregister(ServiceId::Read).is_some());
        assert!(!registry.contains(ServiceId::Read));
        assert!(registry.get(ServiceId::Read).is_none());
    }

    #[tokio::test]
    async fn test_closure_handler_runs() {
        let handler = |_: &RequestContext, _: &ServiceRequest, resp: &mut ServiceResponse| {
            resp.header.request_handle = 99;
            StatusCode::BAD_NOT_WRITABLE
        };
        let mut request = ServiceRequest::for_service(ServiceId::Write).expect("write");
        request.header = RequestHeader::new(1);
        let ty = &service_table().get(ServiceId::Write).expect("write").response_type;
        let mut response = ServiceResponse::new(ty);
        let ctx = RequestContext::new(0, 1, Some(ServiceId::Write), &request.header);
        let status = ServiceHandler::call(&handler, &ctx, &request, &mut response).await;
        assert_eq!(status, StatusCode::BAD_NOT_WRITABLE);
        assert_eq!(response.header.request_handle, 99);
    }
}

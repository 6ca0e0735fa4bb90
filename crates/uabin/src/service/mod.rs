// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Service layer: the service table, request/response messages and the
//! dispatcher that turns a decoded request into exactly one sent response
//! or `ServiceFault`.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use uabin::config::UaConfig;
//! use uabin::service::{
//!     decode_response, encode_request, ChannelEndpoint, Dispatcher, RequestContext, ServiceId,
//!     ServiceRequest, ServiceResponse,
//! };
//! use uabin::types::{StatusCode, TypeTable};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = UaConfig::default();
//! let (endpoint, mut sent) = ChannelEndpoint::new(config.encoding);
//! endpoint.handlers().register(
//!     ServiceId::Read,
//!     |_: &RequestContext, _: &ServiceRequest, _: &mut ServiceResponse| StatusCode::BAD_NOT_READABLE,
//! );
//! let dispatcher = Dispatcher::new(Arc::new(endpoint), &config);
//!
//! let request = ServiceRequest::for_service(ServiceId::Read).expect("read");
//! let bytes = encode_request(&request, config.encoding).expect("encode");
//! let report = dispatcher.process_message(1, 1, &bytes).await;
//! assert!(report.faulted);
//!
//! let out = sent.recv().await.expect("response");
//! let fault = decode_response(&out.bytes.expect("body"), &TypeTable::new(), config.encoding).expect("decode");
//! assert!(fault.is_fault());
//! assert_eq!(fault.header.service_result, StatusCode::BAD_NOT_READABLE);
//! # }
//! ```

mod cancel;
mod context;
mod dispatcher;
mod endpoint;
mod fault;
mod handler;
mod ids;
mod message;
mod table;


pub use cancel::{CancelHandler, PendingRequests};
pub use context::RequestContext;
pub use dispatcher::{DispatchReport, Dispatcher, RequestState};
pub use endpoint::{ChannelEndpoint, Endpoint, SentResponse};
pub use fault::{create_fault, fault_type};
pub use handler::{HandlerFuture, HandlerRegistry, ServiceHandler};
pub use ids::ServiceId;
pub use message::{
    decode_request, decode_response, encode_request, encode_response, RejectedRequest, RequestHeader,
    ResponseHeader, ServiceRequest, ServiceResponse,
};
pub use table::{service_table, ServiceTable, ServiceType};

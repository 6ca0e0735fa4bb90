// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

//! End-to-end dispatch: encoded requests in, encoded responses or faults out
//! through a `ChannelEndpoint`.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use uabin::config::UaConfig;
use uabin::service::{
    decode_response, encode_request, ChannelEndpoint, Dispatcher, HandlerFuture, RequestContext,
    RequestHeader, SentResponse, ServiceHandler, ServiceId, ServiceRequest, ServiceResponse,
};
use uabin::types::{
    DataValue, DiagnosticInfo, Field, NodeId, QualifiedName, StatusCode, StructValue, TypeTable,
    UaString, Value, Variant,
};

fn setup(config: &UaConfig) -> (Arc<ChannelEndpoint>, UnboundedReceiver<SentResponse>, Dispatcher) {
    let (endpoint, rx) = ChannelEndpoint::new(config.encoding);
    let endpoint = Arc::new(endpoint);
    let dispatcher = Dispatcher::new(endpoint.clone(), config);
    (endpoint, rx, dispatcher)
}

fn decode(sent: &SentResponse) -> ServiceResponse {
    let bytes = sent.bytes.as_deref().expect("body");
    decode_response(bytes, &TypeTable::new(), UaConfig::default().encoding).expect("decode")
}

fn read_value_id(ns: u16, id: u32) -> Value {
    Value::Structure(StructValue::new(vec![
        Field::Scalar(Value::NodeId(NodeId::numeric(ns, id))),
        Field::Scalar(Value::UInt32(13)),
        Field::Scalar(Value::String(UaString::null())),
        Field::Scalar(Value::QualifiedName(QualifiedName::default())),
    ]))
}

fn read_request(handle: u32, nodes: Vec<Value>) -> Vec<u8> {
    let mut request = ServiceRequest::for_service(ServiceId::Read).expect("read");
    request.header = RequestHeader::new(handle);
    request.set("MaxAge", Value::Double(0.0)).expect("max age");
    request.set("NodesToRead", nodes).expect("nodes");
    encode_request(&request, UaConfig::default().encoding).expect("encode")
}

/// Answers every node with its numeric id, unknown nodes with a bad status.
fn read_node_ids(_: &RequestContext, request: &ServiceRequest, response: &mut ServiceResponse) -> StatusCode {
    let Some(Field::Array(Some(nodes))) = request.get("NodesToRead") else {
        return StatusCode::BAD_NOTHING_TO_DO;
    };
    let results: Vec<Value> = nodes
        .iter()
        .map(|node| match node {
            Value::Structure(s) => match s.fields.first() {
                Some(Field::Scalar(Value::NodeId(id))) => match id.as_ns0() {
                    Some(_) => DataValue::from_status(StatusCode::BAD_NODE_ID_UNKNOWN),
                    None => DataValue::new(Variant::from(id.namespace)),
                },
                _ => DataValue::from_status(StatusCode::BAD_NODE_ID_INVALID),
            },
            _ => DataValue::from_status(StatusCode::BAD_NODE_ID_INVALID),
        })
        .map(Value::from)
        .collect();
    match response.set("Results", results) {
        Ok(()) => StatusCode::GOOD,
        Err(status) => status,
    }
}

#[tokio::test]
async fn test_read_end_to_end() {
    let config = UaConfig::default();
    let (endpoint, mut rx, dispatcher) = setup(&config);
    endpoint.handlers().register(ServiceId::Read, read_node_ids);

    let bytes = read_request(21, vec![read_value_id(2, 10), read_value_id(0, 2256), read_value_id(5, 11)]);
    let report = dispatcher.process_message(3, 100, &bytes).await;
    assert_eq!(report.status, StatusCode::GOOD);
    assert!(report.sent && !report.faulted);

    let sent = rx.recv().await.expect("sent");
    assert_eq!((sent.channel_id, sent.request_id), (3, 100));
    let response = decode(&sent);
    assert!(!response.is_fault());
    assert_eq!(response.header.request_handle, 21);
    assert_eq!(response.header.service_result, StatusCode::GOOD);

    let Some(Field::Array(Some(results))) = response.get("Results") else {
        panic!("results missing");
    };
    let statuses: Vec<Option<StatusCode>> = results
        .iter()
        .map(|v| match v {
            Value::DataValue(dv) => dv.status,
            _ => panic!("not a data value"),
        })
        .collect();
    assert_eq!(statuses, vec![None, Some(StatusCode::BAD_NODE_ID_UNKNOWN), None]);
}

#[tokio::test]
async fn test_fault_keeps_diagnostics_and_string_table() {
    let config = UaConfig::default();
    let (endpoint, mut rx, dispatcher) = setup(&config);
    endpoint.handlers().register(
        ServiceId::Read,
        |_: &RequestContext, _: &ServiceRequest, response: &mut ServiceResponse| {
            response.header.service_diagnostics = DiagnosticInfo {
                symbolic_id: Some(0),
                additional_info: Some("sensor offline".into()),
                ..Default::default()
            };
            response.header.string_table = Some(vec!["BadSensor".into()]);
            StatusCode::BAD_NOT_READABLE
        },
    );

    let bytes = read_request(8, vec![read_value_id(2, 1)]);
    let report = dispatcher.process_message(1, 1, &bytes).await;
    assert!(report.faulted);

    let fault = decode(&rx.recv().await.expect("sent"));
    assert!(fault.is_fault());
    assert_eq!(fault.header.request_handle, 8);
    assert_eq!(fault.header.service_result, StatusCode::BAD_NOT_READABLE);
    assert_eq!(fault.header.service_diagnostics.symbolic_id, Some(0));
    assert_eq!(
        fault.header.service_diagnostics.additional_info,
        Some(UaString::from("sensor offline"))
    );
    assert_eq!(fault.header.string_table, Some(vec![UaString::from("BadSensor")]));
}

#[tokio::test]
async fn test_unknown_encoding_id_answered_with_fault() {
    let config = UaConfig::default();
    let (_endpoint, mut rx, dispatcher) = setup(&config);

    // Swap the ReadRequest encoding id for ns=0;i=1 in two-byte form.
    let read = read_request(42, Vec::new());
    let mut bytes = vec![0x00, 0x01];
    bytes.extend_from_slice(&read[4..]);

    let report = dispatcher.process_message(1, 9, &bytes).await;
    assert_eq!(report.service, None);
    assert_eq!(report.status, StatusCode::BAD_SERVICE_UNSUPPORTED);
    assert!(!report.handler_called);

    let fault = decode(&rx.recv().await.expect("sent"));
    assert!(fault.is_fault());
    assert_eq!(fault.header.request_handle, 42);
    assert_eq!(fault.header.service_result, StatusCode::BAD_SERVICE_UNSUPPORTED);
}

#[tokio::test]
async fn test_empty_body_request() {
    let config = UaConfig::default();
    let (endpoint, mut rx, dispatcher) = setup(&config);
    endpoint.handlers().register(
        ServiceId::CloseSecureChannel,
        |_: &RequestContext, request: &ServiceRequest, _: &mut ServiceResponse| {
            assert!(request.body.fields.is_empty());
            StatusCode::GOOD
        },
    );

    let mut request = ServiceRequest::for_service(ServiceId::CloseSecureChannel).expect("close");
    request.header = RequestHeader::new(5);
    let bytes = encode_request(&request, config.encoding).expect("encode");
    let report = dispatcher.process_message(1, 2, &bytes).await;
    assert!(report.handler_called);
    assert_eq!(report.status, StatusCode::GOOD);

    let response = decode(&rx.recv().await.expect("sent"));
    assert!(!response.is_fault());
    assert_eq!(response.header.request_handle, 5);
}

/// Waits on a slow backend until the client's timeout hint expires.
struct SlowBackend;

impl ServiceHandler for SlowBackend {
    fn call<'a>(
        &'a self,
        ctx: &'a RequestContext,
        _request: &'a ServiceRequest,
        _response: &'a mut ServiceResponse,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            let work = tokio::time::sleep(Duration::from_secs(30));
            match ctx.deadline() {
                Some(deadline) => {
                    let deadline = tokio::time::Instant::from_std(deadline);
                    match tokio::time::timeout_at(deadline, work).await {
                        Ok(()) => StatusCode::GOOD,
                        Err(_) => StatusCode::BAD_TIMEOUT,
                    }
                }
                None => {
                    work.await;
                    StatusCode::GOOD
                }
            }
        })
    }
}

#[tokio::test]
async fn test_timeout_hint_reaches_handler() {
    let config = UaConfig::default();
    let (endpoint, mut rx, dispatcher) = setup(&config);
    endpoint.handlers().register(ServiceId::Browse, SlowBackend);

    let mut request = ServiceRequest::for_service(ServiceId::Browse).expect("browse");
    request.header = RequestHeader::new(77);
    request.header.timeout_hint = 20;
    let bytes = encode_request(&request, config.encoding).expect("encode");

    let report = dispatcher.process_message(1, 1, &bytes).await;
    assert_eq!(report.status, StatusCode::BAD_TIMEOUT);
    assert!(report.faulted);

    let fault = decode(&rx.recv().await.expect("sent"));
    assert_eq!(fault.header.service_result, StatusCode::BAD_TIMEOUT);
    assert_eq!(fault.header.request_handle, 77);
}

/// Yields a few times before answering.
struct Yielding;

impl ServiceHandler for Yielding {
    fn call<'a>(
        &'a self,
        ctx: &'a RequestContext,
        _request: &'a ServiceRequest,
        _response: &'a mut ServiceResponse,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            for _ in 0..(ctx.request_handle % 4) {
                tokio::task::yield_now().await;
            }
            if ctx.request_handle % 5 == 0 {
                StatusCode::BAD_NOT_FOUND
            } else {
                StatusCode::GOOD
            }
        })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_each_answered_once() {
    let config = UaConfig::default();
    let (endpoint, mut rx, dispatcher) = setup(&config);
    endpoint.handlers().register(ServiceId::Read, Yielding);

    let tasks: Vec<_> = (1..=64u32)
        .map(|id| {
            let dispatcher = dispatcher.clone();
            let bytes = read_request(id, vec![read_value_id(2, id)]);
            tokio::spawn(async move { dispatcher.process_message(7, id, &bytes).await })
        })
        .collect();
    for task in tasks {
        let report = task.await.expect("join");
        assert_eq!(report.faulted, report.request_handle % 5 == 0);
        assert_eq!(report.path.last(), Some(&uabin::service::RequestState::Closed));
    }
    assert!(dispatcher.pending().is_empty());

    let mut seen = BTreeSet::new();
    while let Ok(sent) = rx.try_recv() {
        let response = decode(&sent);
        assert_eq!(response.header.request_handle, sent.request_id);
        assert_eq!(response.is_fault(), sent.request_id % 5 == 0);
        assert!(seen.insert(sent.request_id), "request {} answered twice", sent.request_id);
    }
    assert_eq!(seen.len(), 64);
}

#[tokio::test]
async fn test_log_buffers_config_does_not_change_output() {
    let config = UaConfig::from_toml_str("[dispatcher]\nlog_buffers = true\n").expect("config");
    assert!(config.dispatcher.log_buffers);
    let (endpoint, mut rx, dispatcher) = setup(&config);
    endpoint.handlers().register(ServiceId::Read, read_node_ids);

    let bytes = read_request(3, vec![read_value_id(1, 1)]);
    let report = dispatcher.process_message(1, 1, &bytes).await;
    assert_eq!(report.status, StatusCode::GOOD);
    assert!(!decode(&rx.recv().await.expect("sent")).is_fault());
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `ServiceFault` construction.

use std::sync::Arc;

use super::message::{RequestHeader, ResponseHeader, ServiceResponse};
use crate::types::{catalog, DataType, DiagnosticInfo, StatusCode, UaResult, UaString};

/// Encodeable type of a fault.
pub fn fault_type() -> &'static Arc<DataType> {
    &catalog().service_fault
}

/// Build the fault answering `request` with `status`.
///
/// `diagnostics` and `string_table` are moved into the fault header as they
/// are; the string table indices in `diagnostics` stay valid. A status that
/// is not bad yields `BadInternalError`.
pub fn create_fault(
    request: &RequestHeader,
    status: StatusCode,
    diagnostics: DiagnosticInfo,
    string_table: Option<Vec<UaString>>,
) -> UaResult<ServiceResponse> {
    if !status.is_bad() {
        log::debug!("[fault] refusing fault for non-bad status {}", status);
        return Err(StatusCode::BAD_INTERNAL_ERROR);
    }
    let mut fault = ServiceResponse::new(fault_type());
    fault.header = ResponseHeader {
        service_diagnostics: diagnostics,
        string_table,
        ..ResponseHeader::for_request(request, status)
    };
    log::debug!(
        "[fault] request {} -> {}",
        request.request_handle,
        status
    );
    Ok(fault)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_carries_status_and_diagnostics() {
        let header = RequestHeader::new(9);
        let diagnostics = DiagnosticInfo {
            symbolic_id: Some(0),
            additional_info: Some(UaString::from("node gone")),
            ..Default::default()
        };
        let table = Some(vec![UaString::from("BadNodeIdUnknown")]);
        let fault = create_fault(&header, StatusCode::BAD_NODE_ID_UNKNOWN, diagnostics.clone(), table.clone())
            .expect("fault");
        assert!(fault.is_fault());
        assert!(fault.body.fields.is_empty());
        assert_eq!(fault.header.request_handle, 9);
        assert_eq!(fault.header.service_result, StatusCode::BAD_NODE_ID_UNKNOWN);
        assert_eq!(fault.header.service_diagnostics, diagnostics);
        assert_eq!(fault.header.string_table, table);
    }

    #[test]
    fn test_fault_needs_bad_status() {
        let header = RequestHeader::default();
        for status in [StatusCode::GOOD, StatusCode::UNCERTAIN] {
            assert_eq!(
                create_fault(&header, status, DiagnosticInfo::default(), None),
                Err(StatusCode::BAD_INTERNAL_ERROR)
            );
        }
    }
}

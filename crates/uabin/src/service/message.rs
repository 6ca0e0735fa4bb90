// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Service request and response messages.
//!
//! On the wire a message is the binary encoding id of its structure followed
//! by the structure itself. The leading header member is kept typed
//! ([`RequestHeader`], [`ResponseHeader`]); the remaining members travel as a
//! generic [`StructValue`] described by the message's encodeable type.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::table::{body_members, service_table};
use super::ServiceId;
use crate::config::EncodingLimits;
use crate::encoding::{decode_fields, encode_fields, BinaryDecoder, BinaryEncodable, BinaryEncoder};
use crate::types::{
    catalog, runtime, DataType, DateTime, DiagnosticInfo, ExtensionObject, Field, NodeId,
    StatusCode, StructValue, TypeTable, UaResult, UaString, Value,
};

/// Leading member of every request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestHeader {
    pub authentication_token: NodeId,
    pub timestamp: DateTime,
    pub request_handle: u32,
    /// Bit mask of the diagnostics the client asks for.
    pub return_diagnostics: u32,
    pub audit_entry_id: UaString,
    /// Milliseconds; 0 means no hint.
    pub timeout_hint: u32,
    pub additional_header: ExtensionObject,
}

impl RequestHeader {
    pub fn new(request_handle: u32) -> Self {
        Self {
            timestamp: DateTime::now(),
            request_handle,
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_hint > 0).then(|| Duration::from_millis(u64::from(self.timeout_hint)))
    }
}

impl BinaryEncodable for RequestHeader {
    fn byte_len(&self) -> UaResult<usize> {
        Ok(self.authentication_token.byte_len()?
            + 8
            + 4
            + 4
            + self.audit_entry_id.byte_len()?
            + 4
            + self.additional_header.byte_len()?)
    }

    fn encode(&self, enc: &mut BinaryEncoder) -> UaResult<()> {
        self.authentication_token.encode(enc)?;
        self.timestamp.encode(enc)?;
        enc.write_u32(self.request_handle)?;
        enc.write_u32(self.return_diagnostics)?;
        self.audit_entry_id.encode(enc)?;
        enc.write_u32(self.timeout_hint)?;
        self.additional_header.encode(enc)
    }

    fn decode(dec: &mut BinaryDecoder<'_>) -> UaResult<Self> {
        Ok(Self {
            authentication_token: NodeId::decode(dec)?,
            timestamp: DateTime::decode(dec)?,
            request_handle: dec.read_u32()?,
            return_diagnostics: dec.read_u32()?,
            audit_entry_id: UaString::decode(dec)?,
            timeout_hint: dec.read_u32()?,
            additional_header: ExtensionObject::decode(dec)?,
        })
    }
}

/// Leading member of every response and of a `ServiceFault`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseHeader {
    pub timestamp: DateTime,
    pub request_handle: u32,
    pub service_result: StatusCode,
    pub service_diagnostics: DiagnosticInfo,
    /// `None` is the null array.
    pub string_table: Option<Vec<UaString>>,
    pub additional_header: ExtensionObject,
}

impl ResponseHeader {
    /// Header answering `request`, stamped now.
    pub fn for_request(request: &RequestHeader, service_result: StatusCode) -> Self {
        Self {
            timestamp: DateTime::now(),
            request_handle: request.request_handle,
            service_result,
            ..Default::default()
        }
    }
}

impl BinaryEncodable for ResponseHeader {
    fn byte_len(&self) -> UaResult<usize> {
        let mut strings = 4;
        for s in self.string_table.iter().flatten() {
            strings += s.byte_len()?;
        }
        Ok(8 + 4 + 4 + self.service_diagnostics.byte_len()? + strings + self.additional_header.byte_len()?)
    }

    fn encode(&self, enc: &mut BinaryEncoder) -> UaResult<()> {
        self.timestamp.encode(enc)?;
        enc.write_u32(self.request_handle)?;
        self.service_result.encode(enc)?;
        self.service_diagnostics.encode(enc)?;
        enc.write_length(self.string_table.as_ref().map(Vec::len))?;
        for s in self.string_table.iter().flatten() {
            s.encode(enc)?;
        }
        self.additional_header.encode(enc)
    }

    fn decode(dec: &mut BinaryDecoder<'_>) -> UaResult<Self> {
        let timestamp = DateTime::decode(dec)?;
        let request_handle = dec.read_u32()?;
        let service_result = StatusCode::decode(dec)?;
        let service_diagnostics = DiagnosticInfo::decode(dec)?;
        let string_table = match dec.read_array_length(4)? {
            None => None,
            Some(len) => {
                let mut strings = Vec::new();
                strings.try_reserve_exact(len)?;
                for _ in 0..len {
                    strings.push(UaString::decode(dec)?);
                }
                Some(strings)
            }
        };
        Ok(Self {
            timestamp,
            request_handle,
            service_result,
            service_diagnostics,
            string_table,
            additional_header: ExtensionObject::decode(dec)?,
        })
    }
}

/// Body fields after the header, at their zero values.
fn init_body(ty: &DataType) -> StructValue {
    match runtime::init(ty) {
        Value::Structure(mut s) if !s.fields.is_empty() => {
            s.fields.remove(0);
            s
        }
        _ => StructValue::default(),
    }
}

fn body_index(ty: &DataType, name: &str) -> Option<usize> {
    ty.member_index(name)?.checked_sub(1)
}

fn set_body_field(ty: &DataType, body: &mut StructValue, name: &str, field: Field) -> UaResult<()> {
    let idx = body_index(ty, name).ok_or(StatusCode::BAD_INVALID_ARGUMENT)?;
    let member = body_members(ty)
        .get(idx)
        .ok_or(StatusCode::BAD_INVALID_ARGUMENT)?;
    runtime::check_fields(std::slice::from_ref(&field), std::slice::from_ref(member))?;
    let slot = body
        .fields
        .get_mut(idx)
        .ok_or(StatusCode::BAD_INVALID_ARGUMENT)?;
    *slot = field;
    Ok(())
}

/// A decoded request: its runtime type tag, typed header and body fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRequest {
    /// Type id the request claims to be.
    pub request_type_id: NodeId,
    /// Descriptor the body was decoded with.
    pub encodeable_type: Arc<DataType>,
    pub header: RequestHeader,
    pub body: StructValue,
}

impl ServiceRequest {
    /// Zero-valued request of type `ty`.
    pub fn new(ty: &Arc<DataType>) -> Self {
        Self {
            request_type_id: ty.type_id.clone(),
            encodeable_type: Arc::clone(ty),
            header: RequestHeader::default(),
            body: init_body(ty),
        }
    }

    pub fn for_service(id: ServiceId) -> Option<Self> {
        service_table().get(id).map(|s| Self::new(&s.request_type))
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.body.fields.get(body_index(&self.encodeable_type, name)?)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field> {
        let idx = body_index(&self.encodeable_type, name)?;
        self.body.fields.get_mut(idx)
    }

    pub fn scalar(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(Field::as_scalar)
    }

    /// Replace a body field. The field must fit the member.
    pub fn set(&mut self, name: &str, field: impl Into<Field>) -> UaResult<()> {
        set_body_field(&self.encodeable_type, &mut self.body, name, field.into())
    }
}

/// A response (or fault) being built for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceResponse {
    pub encodeable_type: Arc<DataType>,
    pub header: ResponseHeader,
    pub body: StructValue,
}

impl ServiceResponse {
    pub fn new(ty: &Arc<DataType>) -> Self {
        Self {
            encodeable_type: Arc::clone(ty),
            header: ResponseHeader::default(),
            body: init_body(ty),
        }
    }

    pub fn is_fault(&self) -> bool {
        self.encodeable_type.type_id == catalog().service_fault.type_id
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.body.fields.get(body_index(&self.encodeable_type, name)?)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field> {
        let idx = body_index(&self.encodeable_type, name)?;
        self.body.fields.get_mut(idx)
    }

    pub fn scalar(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(Field::as_scalar)
    }

    pub fn set(&mut self, name: &str, field: impl Into<Field>) -> UaResult<()> {
        set_body_field(&self.encodeable_type, &mut self.body, name, field.into())
    }
}

/// A request that could not be decoded or is not served.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRequest {
    pub status: StatusCode,
    /// Present when the header itself was readable.
    pub header: Option<RequestHeader>,
}

impl fmt::Display for RejectedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.header {
            Some(h) => write!(f, "request {} rejected: {}", h.request_handle, self.status),
            None => write!(f, "request rejected: {}", self.status),
        }
    }
}

impl std::error::Error for RejectedRequest {}

fn encode_message(
    ty: &DataType,
    header: &impl BinaryEncodable,
    body: &StructValue,
    limits: EncodingLimits,
) -> UaResult<Vec<u8>> {
    if ty.binary_encoding_id.is_null() {
        log::debug!("[service] {} has no binary encoding id", ty.name);
        return Err(StatusCode::BAD_ENCODING_ERROR);
    }
    let mut enc = BinaryEncoder::new(limits);
    ty.binary_encoding_id.encode(&mut enc)?;
    header.encode(&mut enc)?;
    encode_fields(&mut enc, &body.fields, body_members(ty))?;
    Ok(enc.into_bytes())
}

pub fn encode_request(request: &ServiceRequest, limits: EncodingLimits) -> UaResult<Vec<u8>> {
    encode_message(&request.encodeable_type, &request.header, &request.body, limits)
}

pub fn encode_response(response: &ServiceResponse, limits: EncodingLimits) -> UaResult<Vec<u8>> {
    encode_message(&response.encodeable_type, &response.header, &response.body, limits)
}

/// Decode a request message. Unknown encoding ids are rejected with
/// `BadServiceUnsupported`, keeping the header when it is readable so the
/// caller can still answer with a fault.
pub fn decode_request(
    bytes: &[u8],
    types: &TypeTable,
    limits: EncodingLimits,
) -> Result<ServiceRequest, RejectedRequest> {
    let mut dec = BinaryDecoder::new(bytes, types, limits);
    let encoding_id = NodeId::decode(&mut dec).map_err(|status| RejectedRequest {
        status,
        header: None,
    })?;
    let service = service_table().find_by_request_encoding(&encoding_id);
    let header = RequestHeader::decode(&mut dec);

    let (service, header) = match (service, header) {
        (None, header) => {
            log::debug!("[service] no service for encoding id {}", encoding_id);
            return Err(RejectedRequest {
                status: StatusCode::BAD_SERVICE_UNSUPPORTED,
                header: header.ok(),
            });
        }
        (Some(_), Err(status)) => return Err(RejectedRequest { status, header: None }),
        (Some(service), Ok(header)) => (service, header),
    };

    let ty = &service.request_type;
    let body = decode_fields(&mut dec, body_members(ty)).and_then(|fields| {
        if dec.is_eof() {
            Ok(StructValue::new(fields))
        } else {
            Err(dec.fail("trailing bytes after request"))
        }
    });
    match body {
        Ok(body) => Ok(ServiceRequest {
            request_type_id: ty.type_id.clone(),
            encodeable_type: Arc::clone(ty),
            header,
            body,
        }),
        Err(status) => Err(RejectedRequest {
            status,
            header: Some(header),
        }),
    }
}

/// Decode a response message, which may be a `ServiceFault`.
pub fn decode_response(bytes: &[u8], types: &TypeTable, limits: EncodingLimits) -> UaResult<ServiceResponse> {
    let mut dec = BinaryDecoder::new(bytes, types, limits);
    let encoding_id = NodeId::decode(&mut dec)?;
    let fault = &catalog().service_fault;
    let ty = if encoding_id == fault.binary_encoding_id {
        Arc::clone(fault)
    } else {
        match service_table().find_by_response_encoding(&encoding_id) {
            Some(service) => Arc::clone(&service.response_type),
            None => {
                log::debug!("[service] unknown response encoding id {}", encoding_id);
                return Err(StatusCode::BAD_UNKNOWN_RESPONSE);
            }
        }
    };
    let header = ResponseHeader::decode(&mut dec)?;
    let fields = decode_fields(&mut dec, body_members(&ty))?;
    if !dec.is_eof() {
        return Err(dec.fail("trailing bytes after response"));
    }
    Ok(ServiceResponse {
        encodeable_type: ty,
        header,
        body: StructValue::new(fields),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> EncodingLimits {
        EncodingLimits::default()
    }

    #[test]
    fn test_request_header_layout() {
        let header = RequestHeader {
            request_handle: 7,
            timeout_hint: 1500,
            ..Default::default()
        };
        let mut enc = BinaryEncoder::new(limits());
        header.encode(&mut enc).expect("encode");
        let bytes = enc.into_bytes();
        // Two-byte null NodeId, DateTime, handle, diagnostics, null string,
        // timeout, null ExtensionObject.
        assert_eq!(bytes.len(), 2 + 8 + 4 + 4 + 4 + 4 + 3);
        assert_eq!(header.byte_len(), Ok(bytes.len()));
        assert_eq!(&bytes[10..14], &7u32.to_le_bytes());
        assert_eq!(header.timeout(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_response_header_string_table() {
        let header = ResponseHeader {
            request_handle: 3,
            service_result: StatusCode::BAD_NODE_ID_UNKNOWN,
            string_table: Some(vec![UaString::from("missing")]),
            ..Default::default()
        };
        let mut enc = BinaryEncoder::new(limits());
        header.encode(&mut enc).expect("encode");
        let bytes = enc.into_bytes();
        assert_eq!(header.byte_len(), Ok(bytes.len()));

        let table = TypeTable::new();
        let mut dec = BinaryDecoder::new(&bytes, &table, limits());
        assert_eq!(ResponseHeader::decode(&mut dec), Ok(header));
        assert!(dec.is_eof());
    }

    #[test]
    fn test_request_roundtrip() {
        let mut request = ServiceRequest::for_service(ServiceId::Read).expect("read");
        request.header = RequestHeader::new(11);
        request.set("MaxAge", Value::Double(100.0)).expect("set");
        let bytes = encode_request(&request, limits()).expect("encode");
        // Four-byte NodeId form of the ReadRequest encoding id 631.
        assert_eq!(&bytes[..4], &[0x01, 0x00, 0x77, 0x02]);

        let decoded = decode_request(&bytes, &TypeTable::new(), limits()).expect("decode");
        assert_eq!(decoded, request);
        assert_eq!(decoded.scalar("MaxAge"), Some(&Value::Double(100.0)));
    }

    #[test]
    fn test_set_checks_member_shape() {
        let mut request = ServiceRequest::for_service(ServiceId::Read).expect("read");
        assert_eq!(
            request.set("MaxAge", Value::from("soon")),
            Err(StatusCode::BAD_TYPE_MISMATCH)
        );
        assert_eq!(
            request.set("NoSuchField", Value::Double(1.0)),
            Err(StatusCode::BAD_INVALID_ARGUMENT)
        );
        assert_eq!(request.scalar("MaxAge"), Some(&Value::Double(0.0)));
    }

    #[test]
    fn test_unknown_service_keeps_header() {
        let mut request = ServiceRequest::for_service(ServiceId::Read).expect("read");
        request.header.request_handle = 42;
        let mut bytes = encode_request(&request, limits()).expect("encode");
        // Rewrite the encoding id to ns=0;i=9 (four-byte form).
        bytes[2] = 9;
        bytes[3] = 0;
        let rejected = decode_request(&bytes, &TypeTable::new(), limits()).expect_err("unknown");
        assert_eq!(rejected.status, StatusCode::BAD_SERVICE_UNSUPPORTED);
        assert_eq!(rejected.header.map(|h| h.request_handle), Some(42));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let request = ServiceRequest::for_service(ServiceId::CloseSession).expect("close");
        let mut bytes = encode_request(&request, limits()).expect("encode");
        bytes.push(0xAA);
        let rejected = decode_request(&bytes, &TypeTable::new(), limits()).expect_err("trailing");
        assert_eq!(rejected.status, StatusCode::BAD_DECODING_ERROR);
        assert!(rejected.header.is_some());
    }

    #[test]
    fn test_response_roundtrip_and_unknown_id() {
        let ty = &service_table().get(ServiceId::Cancel).expect("cancel").response_type;
        let mut response = ServiceResponse::new(ty);
        response.set("CancelCount", Value::UInt32(2)).expect("set");
        let bytes = encode_response(&response, limits()).expect("encode");
        let decoded = decode_response(&bytes, &TypeTable::new(), limits()).expect("decode");
        assert_eq!(decoded, response);
        assert!(!decoded.is_fault());

        // A request encoding id is not a response.
        let request = ServiceRequest::for_service(ServiceId::Cancel).expect("cancel");
        let bytes = encode_request(&request, limits()).expect("encode");
        assert_eq!(
            decode_response(&bytes, &TypeTable::new(), limits()),
            Err(StatusCode::BAD_UNKNOWN_RESPONSE)
        );
    }
}

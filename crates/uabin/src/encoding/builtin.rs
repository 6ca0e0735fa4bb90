// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary encodings of the builtin types.

use std::sync::Arc;

use super::cursor::{BinaryDecoder, BinaryEncoder};
use super::generic::{decode_value, encode_value, encoded_size};
use crate::types::{
    ByteString, DataType, DataValue, DateTime, DiagnosticInfo, ExpandedNodeId, ExtensionBody,
    ExtensionObject, Guid, Identifier, LocalizedText, NodeId, QualifiedName, StatusCode, TypeKind,
    UaResult, UaString, Value, Variant, VariantData,
};

/// A type with a fixed binary representation.
pub trait BinaryEncodable: Sized {
    /// Number of bytes [`BinaryEncodable::encode`] writes.
    fn byte_len(&self) -> UaResult<usize>;

    fn encode(&self, enc: &mut BinaryEncoder) -> UaResult<()>;

    fn decode(dec: &mut BinaryDecoder<'_>) -> UaResult<Self>;
}

macro_rules! impl_encodable_le {
    ($($ty:ty => $write:ident, $read:ident;)*) => {
        $(
            impl BinaryEncodable for $ty {
                fn byte_len(&self) -> UaResult<usize> {
                    Ok(std::mem::size_of::<$ty>())
                }

                fn encode(&self, enc: &mut BinaryEncoder) -> UaResult<()> {
                    enc.$write(*self)
                }

                fn decode(dec: &mut BinaryDecoder<'_>) -> UaResult<Self> {
                    dec.$read()
                }
            }
        )*
    };
}

impl_encodable_le! {
    bool => write_bool, read_bool;
    i8 => write_i8, read_i8;
    u8 => write_u8, read_u8;
    i16 => write_i16, read_i16;
    u16 => write_u16, read_u16;
    i32 => write_i32, read_i32;
    u32 => write_u32, read_u32;
    i64 => write_i64, read_i64;
    u64 => write_u64, read_u64;
    f32 => write_f32, read_f32;
    f64 => write_f64, read_f64;
}

/// Run `f` one nesting level deeper.
pub(crate) fn nested_decode<'a, T>(
    dec: &mut BinaryDecoder<'a>,
    f: impl FnOnce(&mut BinaryDecoder<'a>) -> UaResult<T>,
) -> UaResult<T> {
    dec.enter()?;
    let result = f(dec);
    dec.leave();
    result
}

pub(crate) fn nested_encode(
    enc: &mut BinaryEncoder,
    f: impl FnOnce(&mut BinaryEncoder) -> UaResult<()>,
) -> UaResult<()> {
    enc.enter()?;
    let result = f(enc);
    enc.leave();
    result
}

fn write_counted(enc: &mut BinaryEncoder, bytes: Option<&[u8]>, max: u32) -> UaResult<()> {
    match bytes {
        None => enc.write_length(None),
        Some(bytes) => {
            if bytes.len() > max as usize {
                return Err(StatusCode::BAD_ENCODING_LIMITS_EXCEEDED);
            }
            enc.write_length(Some(bytes.len()))?;
            enc.write_bytes(bytes)
        }
    }
}

fn read_counted(dec: &mut BinaryDecoder<'_>, max: u32) -> UaResult<Option<Vec<u8>>> {
    match dec.read_length(max)? {
        None => Ok(None),
        Some(len) => {
            let bytes = dec.read_bytes(len)?;
            let mut out = Vec::new();
            out.try_reserve_exact(len)?;
            out.extend_from_slice(bytes);
            Ok(Some(out))
        }
    }
}

impl BinaryEncodable for UaString {
    fn byte_len(&self) -> UaResult<usize> {
        Ok(4 + self.len())
    }

    fn encode(&self, enc: &mut BinaryEncoder) -> UaResult<()> {
        let max = enc.limits().max_string_length;
        write_counted(enc, self.as_str().map(str::as_bytes), max)
    }

    fn decode(dec: &mut BinaryDecoder<'_>) -> UaResult<Self> {
        let max = dec.limits().max_string_length;
        match read_counted(dec, max)? {
            None => Ok(UaString::null()),
            Some(bytes) => String::from_utf8(bytes)
                .map(UaString::from)
                .map_err(|_| dec.fail("string is not valid UTF-8")),
        }
    }
}

impl BinaryEncodable for ByteString {
    fn byte_len(&self) -> UaResult<usize> {
        Ok(4 + self.len())
    }

    fn encode(&self, enc: &mut BinaryEncoder) -> UaResult<()> {
        let max = enc.limits().max_bytestring_length;
        write_counted(enc, self.as_bytes(), max)
    }

    fn decode(dec: &mut BinaryDecoder<'_>) -> UaResult<Self> {
        let max = dec.limits().max_bytestring_length;
        Ok(ByteString::from(read_counted(dec, max)?))
    }
}

impl BinaryEncodable for DateTime {
    fn byte_len(&self) -> UaResult<usize> {
        Ok(8)
    }

    fn encode(&self, enc: &mut BinaryEncoder) -> UaResult<()> {
        enc.write_i64(self.0)
    }

    fn decode(dec: &mut BinaryDecoder<'_>) -> UaResult<Self> {
        Ok(DateTime(dec.read_i64()?))
    }
}

impl BinaryEncodable for Guid {
    fn byte_len(&self) -> UaResult<usize> {
        Ok(16)
    }

    fn encode(&self, enc: &mut BinaryEncoder) -> UaResult<()> {
        enc.write_bytes(&self.to_bytes())
    }

    fn decode(dec: &mut BinaryDecoder<'_>) -> UaResult<Self> {
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(dec.read_bytes(16)?);
        Ok(Guid::from_bytes(bytes))
    }
}

impl BinaryEncodable for StatusCode {
    fn byte_len(&self) -> UaResult<usize> {
        Ok(4)
    }

    fn encode(&self, enc: &mut BinaryEncoder) -> UaResult<()> {
        enc.write_u32(self.bits())
    }

    fn decode(dec: &mut BinaryDecoder<'_>) -> UaResult<Self> {
        Ok(StatusCode(dec.read_u32()?))
    }
}

// NodeId encoding bytes
const NODE_ID_TWO_BYTE: u8 = 0x00;
const NODE_ID_FOUR_BYTE: u8 = 0x01;
const NODE_ID_NUMERIC: u8 = 0x02;
const NODE_ID_STRING: u8 = 0x03;
const NODE_ID_GUID: u8 = 0x04;
const NODE_ID_BYTE_STRING: u8 = 0x05;

// ExpandedNodeId flags, or'ed into the NodeId encoding byte
const EXPANDED_URI: u8 = 0x80;
const EXPANDED_SERVER_INDEX: u8 = 0x40;

fn node_id_len(id: &NodeId) -> usize {
    match &id.identifier {
        Identifier::Numeric(v) if id.namespace == 0 && *v <= 0xFF => 2,
        Identifier::Numeric(v) if id.namespace <= 0xFF && *v <= 0xFFFF => 4,
        Identifier::Numeric(_) => 7,
        Identifier::String(s) => 3 + 4 + s.len(),
        Identifier::Guid(_) => 3 + 16,
        Identifier::ByteString(b) => 3 + 4 + b.len(),
    }
}

fn encode_node_id(id: &NodeId, flags: u8, enc: &mut BinaryEncoder) -> UaResult<()> {
    match &id.identifier {
        Identifier::Numeric(v) if id.namespace == 0 && *v <= 0xFF => {
            enc.write_u8(NODE_ID_TWO_BYTE | flags)?;
            enc.write_u8(*v as u8)
        }
        Identifier::Numeric(v) if id.namespace <= 0xFF && *v <= 0xFFFF => {
            enc.write_u8(NODE_ID_FOUR_BYTE | flags)?;
            enc.write_u8(id.namespace as u8)?;
            enc.write_u16(*v as u16)
        }
        Identifier::Numeric(v) => {
            enc.write_u8(NODE_ID_NUMERIC | flags)?;
            enc.write_u16(id.namespace)?;
            enc.write_u32(*v)
        }
        Identifier::String(s) => {
            enc.write_u8(NODE_ID_STRING | flags)?;
            enc.write_u16(id.namespace)?;
            s.encode(enc)
        }
        Identifier::Guid(g) => {
            enc.write_u8(NODE_ID_GUID | flags)?;
            enc.write_u16(id.namespace)?;
            g.encode(enc)
        }
        Identifier::ByteString(b) => {
            enc.write_u8(NODE_ID_BYTE_STRING | flags)?;
            enc.write_u16(id.namespace)?;
            b.encode(enc)
        }
    }
}

/// Decode a NodeId body, returning it with the flag bits of its encoding byte.
fn decode_node_id(dec: &mut BinaryDecoder<'_>) -> UaResult<(NodeId, u8)> {
    let byte = dec.read_u8()?;
    let flags = byte & (EXPANDED_URI | EXPANDED_SERVER_INDEX);
    let id = match byte & 0x3F {
        NODE_ID_TWO_BYTE => NodeId::numeric(0, u32::from(dec.read_u8()?)),
        NODE_ID_FOUR_BYTE => {
            let ns = dec.read_u8()?;
            NodeId::numeric(u16::from(ns), u32::from(dec.read_u16()?))
        }
        NODE_ID_NUMERIC => {
            let ns = dec.read_u16()?;
            NodeId::numeric(ns, dec.read_u32()?)
        }
        NODE_ID_STRING => {
            let ns = dec.read_u16()?;
            NodeId::string(ns, UaString::decode(dec)?)
        }
        NODE_ID_GUID => {
            let ns = dec.read_u16()?;
            NodeId::guid(ns, Guid::decode(dec)?)
        }
        NODE_ID_BYTE_STRING => {
            let ns = dec.read_u16()?;
            NodeId::byte_string(ns, ByteString::decode(dec)?)
        }
        _ => return Err(dec.fail("unknown NodeId encoding")),
    };
    Ok((id, flags))
}

impl BinaryEncodable for NodeId {
    fn byte_len(&self) -> UaResult<usize> {
        Ok(node_id_len(self))
    }

    fn encode(&self, enc: &mut BinaryEncoder) -> UaResult<()> {
        encode_node_id(self, 0, enc)
    }

    fn decode(dec: &mut BinaryDecoder<'_>) -> UaResult<Self> {
        let (id, flags) = decode_node_id(dec)?;
        if flags != 0 {
            return Err(dec.fail("expanded flags on a NodeId"));
        }
        Ok(id)
    }
}

impl BinaryEncodable for ExpandedNodeId {
    fn byte_len(&self) -> UaResult<usize> {
        let mut len = node_id_len(&self.node_id);
        if !self.namespace_uri.is_null() {
            len += self.namespace_uri.byte_len()?;
        }
        if self.server_index != 0 {
            len += 4;
        }
        Ok(len)
    }

    fn encode(&self, enc: &mut BinaryEncoder) -> UaResult<()> {
        let mut flags = 0;
        if !self.namespace_uri.is_null() {
            flags |= EXPANDED_URI;
        }
        if self.server_index != 0 {
            flags |= EXPANDED_SERVER_INDEX;
        }
        encode_node_id(&self.node_id, flags, enc)?;
        if !self.namespace_uri.is_null() {
            self.namespace_uri.encode(enc)?;
        }
        if self.server_index != 0 {
            enc.write_u32(self.server_index)?;
        }
        Ok(())
    }

    fn decode(dec: &mut BinaryDecoder<'_>) -> UaResult<Self> {
        let (node_id, flags) = decode_node_id(dec)?;
        let namespace_uri = if flags & EXPANDED_URI != 0 {
            UaString::decode(dec)?
        } else {
            UaString::null()
        };
        let server_index = if flags & EXPANDED_SERVER_INDEX != 0 {
            dec.read_u32()?
        } else {
            0
        };
        Ok(ExpandedNodeId {
            node_id,
            namespace_uri,
            server_index,
        })
    }
}

impl BinaryEncodable for QualifiedName {
    fn byte_len(&self) -> UaResult<usize> {
        Ok(2 + self.name.byte_len()?)
    }

    fn encode(&self, enc: &mut BinaryEncoder) -> UaResult<()> {
        enc.write_u16(self.namespace_index)?;
        self.name.encode(enc)
    }

    fn decode(dec: &mut BinaryDecoder<'_>) -> UaResult<Self> {
        let namespace_index = dec.read_u16()?;
        Ok(QualifiedName {
            namespace_index,
            name: UaString::decode(dec)?,
        })
    }
}

const TEXT_LOCALE: u8 = 0x01;
const TEXT_TEXT: u8 = 0x02;

impl BinaryEncodable for LocalizedText {
    fn byte_len(&self) -> UaResult<usize> {
        let mut len = 1;
        if !self.locale.is_null() {
            len += self.locale.byte_len()?;
        }
        if !self.text.is_null() {
            len += self.text.byte_len()?;
        }
        Ok(len)
    }

    fn encode(&self, enc: &mut BinaryEncoder) -> UaResult<()> {
        let mut mask = 0;
        if !self.locale.is_null() {
            mask |= TEXT_LOCALE;
        }
        if !self.text.is_null() {
            mask |= TEXT_TEXT;
        }
        enc.write_u8(mask)?;
        if !self.locale.is_null() {
            self.locale.encode(enc)?;
        }
        if !self.text.is_null() {
            self.text.encode(enc)?;
        }
        Ok(())
    }

    fn decode(dec: &mut BinaryDecoder<'_>) -> UaResult<Self> {
        let mask = dec.read_u8()?;
        let locale = if mask & TEXT_LOCALE != 0 {
            UaString::decode(dec)?
        } else {
            UaString::null()
        };
        let text = if mask & TEXT_TEXT != 0 {
            UaString::decode(dec)?
        } else {
            UaString::null()
        };
        Ok(LocalizedText { locale, text })
    }
}

fn read_index(mask: u8, bit: u8, dec: &mut BinaryDecoder<'_>) -> UaResult<Option<i32>> {
    if mask & bit != 0 {
        Ok(Some(dec.read_i32()?))
    } else {
        Ok(None)
    }
}

impl BinaryEncodable for DiagnosticInfo {
    fn byte_len(&self) -> UaResult<usize> {
        let mut len = 1;
        len += 4 * [
            self.symbolic_id,
            self.namespace_uri,
            self.locale,
            self.localized_text,
        ]
        .iter()
        .filter(|f| f.is_some())
        .count();
        if let Some(info) = &self.additional_info {
            len += info.byte_len()?;
        }
        if self.inner_status_code.is_some() {
            len += 4;
        }
        if let Some(inner) = &self.inner_diagnostic_info {
            len += inner.byte_len()?;
        }
        Ok(len)
    }

    fn encode(&self, enc: &mut BinaryEncoder) -> UaResult<()> {
        enc.write_u8(self.encoding_mask())?;
        for field in [
            self.symbolic_id,
            self.namespace_uri,
            self.locale,
            self.localized_text,
        ]
        .into_iter()
        .flatten()
        {
            enc.write_i32(field)?;
        }
        if let Some(info) = &self.additional_info {
            info.encode(enc)?;
        }
        if let Some(status) = self.inner_status_code {
            status.encode(enc)?;
        }
        if let Some(inner) = &self.inner_diagnostic_info {
            nested_encode(enc, |enc| inner.encode(enc))?;
        }
        Ok(())
    }

    fn decode(dec: &mut BinaryDecoder<'_>) -> UaResult<Self> {
        let mask = dec.read_u8()?;
        if mask & 0x80 != 0 {
            return Err(dec.fail("unknown DiagnosticInfo mask bit"));
        }
        let symbolic_id = read_index(mask, DiagnosticInfo::SYMBOLIC_ID, dec)?;
        let namespace_uri = read_index(mask, DiagnosticInfo::NAMESPACE_URI, dec)?;
        let locale = read_index(mask, DiagnosticInfo::LOCALE, dec)?;
        let localized_text = read_index(mask, DiagnosticInfo::LOCALIZED_TEXT, dec)?;
        let additional_info = if mask & DiagnosticInfo::ADDITIONAL_INFO != 0 {
            Some(UaString::decode(dec)?)
        } else {
            None
        };
        let inner_status_code = if mask & DiagnosticInfo::INNER_STATUS_CODE != 0 {
            Some(StatusCode::decode(dec)?)
        } else {
            None
        };
        let inner_diagnostic_info = if mask & DiagnosticInfo::INNER_DIAGNOSTIC_INFO != 0 {
            Some(Box::new(nested_decode(dec, DiagnosticInfo::decode)?))
        } else {
            None
        };
        Ok(DiagnosticInfo {
            symbolic_id,
            namespace_uri,
            locale,
            localized_text,
            additional_info,
            inner_status_code,
            inner_diagnostic_info,
        })
    }
}

impl BinaryEncodable for DataValue {
    fn byte_len(&self) -> UaResult<usize> {
        let mut len = 1;
        if let Some(value) = &self.value {
            len += value.byte_len()?;
        }
        len += 4 * usize::from(self.status.is_some());
        len += 8 * usize::from(self.source_timestamp.is_some());
        len += 2 * usize::from(self.source_picoseconds.is_some());
        len += 8 * usize::from(self.server_timestamp.is_some());
        len += 2 * usize::from(self.server_picoseconds.is_some());
        Ok(len)
    }

    fn encode(&self, enc: &mut BinaryEncoder) -> UaResult<()> {
        enc.write_u8(self.encoding_mask())?;
        if let Some(value) = &self.value {
            nested_encode(enc, |enc| value.encode(enc))?;
        }
        if let Some(status) = self.status {
            status.encode(enc)?;
        }
        if let Some(ts) = self.source_timestamp {
            ts.encode(enc)?;
        }
        if let Some(pico) = self.source_picoseconds {
            enc.write_u16(pico)?;
        }
        if let Some(ts) = self.server_timestamp {
            ts.encode(enc)?;
        }
        if let Some(pico) = self.server_picoseconds {
            enc.write_u16(pico)?;
        }
        Ok(())
    }

    fn decode(dec: &mut BinaryDecoder<'_>) -> UaResult<Self> {
        let mask = dec.read_u8()?;
        if mask & 0xC0 != 0 {
            return Err(dec.fail("unknown DataValue mask bit"));
        }
        let value = if mask & DataValue::VALUE != 0 {
            Some(nested_decode(dec, Variant::decode)?)
        } else {
            None
        };
        let status = if mask & DataValue::STATUS != 0 {
            Some(StatusCode::decode(dec)?)
        } else {
            None
        };
        let source_timestamp = if mask & DataValue::SOURCE_TIMESTAMP != 0 {
            Some(DateTime::decode(dec)?)
        } else {
            None
        };
        let source_picoseconds = if mask & DataValue::SOURCE_PICOSECONDS != 0 {
            Some(dec.read_u16()?)
        } else {
            None
        };
        let server_timestamp = if mask & DataValue::SERVER_TIMESTAMP != 0 {
            Some(DateTime::decode(dec)?)
        } else {
            None
        };
        let server_picoseconds = if mask & DataValue::SERVER_PICOSECONDS != 0 {
            Some(dec.read_u16()?)
        } else {
            None
        };
        Ok(DataValue {
            value,
            status,
            source_timestamp,
            source_picoseconds,
            server_timestamp,
            server_picoseconds,
        })
    }
}

/// Encoding id of a decoded body; types without one cannot travel in an
/// ExtensionObject.
fn body_encoding_id(data_type: &DataType) -> UaResult<&NodeId> {
    if data_type.binary_encoding_id.is_null() {
        log::debug!("[encoding] {} has no binary encoding id", data_type.name);
        return Err(StatusCode::BAD_ENCODING_ERROR);
    }
    Ok(&data_type.binary_encoding_id)
}

fn encode_structure_body(enc: &mut BinaryEncoder, value: &Value, data_type: &DataType) -> UaResult<()> {
    encode_node_id(body_encoding_id(data_type)?, 0, enc)?;
    enc.write_u8(0x01)?;
    let at = enc.begin_length()?;
    nested_encode(enc, |enc| encode_value(enc, value, data_type))?;
    enc.patch_length(at)
}

fn structure_body_len(value: &Value, data_type: &DataType) -> UaResult<usize> {
    Ok(node_id_len(body_encoding_id(data_type)?) + 1 + 4 + encoded_size(value, data_type)?)
}

impl BinaryEncodable for ExtensionObject {
    fn byte_len(&self) -> UaResult<usize> {
        match self {
            ExtensionObject::Encoded { type_id, body } => {
                let body_len = match body {
                    ExtensionBody::None => 0,
                    ExtensionBody::Binary(b) => b.byte_len()?,
                    ExtensionBody::Xml(x) => x.byte_len()?,
                };
                Ok(node_id_len(type_id) + 1 + body_len)
            }
            ExtensionObject::Decoded { data_type, value } => structure_body_len(value, data_type),
        }
    }

    fn encode(&self, enc: &mut BinaryEncoder) -> UaResult<()> {
        match self {
            ExtensionObject::Encoded { type_id, body } => {
                encode_node_id(type_id, 0, enc)?;
                enc.write_u8(body.encoding_byte())?;
                match body {
                    ExtensionBody::None => Ok(()),
                    ExtensionBody::Binary(b) => b.encode(enc),
                    ExtensionBody::Xml(x) => x.encode(enc),
                }
            }
            ExtensionObject::Decoded { data_type, value } => {
                encode_structure_body(enc, value, data_type)
            }
        }
    }

    fn decode(dec: &mut BinaryDecoder<'_>) -> UaResult<Self> {
        let type_id = NodeId::decode(dec)?;
        match dec.read_u8()? {
            0x00 => Ok(ExtensionObject::Encoded {
                type_id,
                body: ExtensionBody::None,
            }),
            0x01 => {
                let max = dec.limits().max_bytestring_length;
                let Some(len) = dec.read_length(max)? else {
                    return Ok(ExtensionObject::Encoded {
                        type_id,
                        body: ExtensionBody::Binary(ByteString::null()),
                    });
                };
                let body = dec.read_bytes(len)?;
                match dec.types().find_by_encoding_id(&type_id) {
                    Some(data_type) => {
                        let value = nested_decode(dec, |dec| {
                            let mut inner = dec.nested(body);
                            let value = decode_value(&mut inner, &data_type)?;
                            if inner.remaining() != 0 {
                                return Err(inner.fail("trailing bytes after body"));
                            }
                            Ok(value)
                        })?;
                        Ok(ExtensionObject::from_value(data_type, value))
                    }
                    None => {
                        log::trace!("[encoding] keeping opaque body of {}", type_id);
                        let mut raw = Vec::new();
                        raw.try_reserve_exact(len)?;
                        raw.extend_from_slice(body);
                        Ok(ExtensionObject::Encoded {
                            type_id,
                            body: ExtensionBody::Binary(ByteString::from(raw)),
                        })
                    }
                }
            }
            0x02 => Ok(ExtensionObject::Encoded {
                type_id,
                body: ExtensionBody::Xml(UaString::decode(dec)?),
            }),
            _ => Err(dec.fail("unknown ExtensionObject encoding")),
        }
    }
}

// Variant encoding mask
const VARIANT_TYPE_MASK: u8 = 0x3F;
const VARIANT_ARRAY_DIMENSIONS: u8 = 0x40;
const VARIANT_ARRAY: u8 = 0x80;

const EXTENSION_OBJECT_ID: u8 = 22;
const VARIANT_ID: u8 = 24;

/// Builtin id a variant of this type is encoded with.
fn wire_type_id(ty: &DataType) -> UaResult<u8> {
    match ty.kind {
        TypeKind::Enum => Ok(6),
        TypeKind::Structure | TypeKind::OptStruct | TypeKind::Union => Ok(EXTENSION_OBJECT_ID),
        kind => kind.builtin_id().ok_or(StatusCode::BAD_ENCODING_ERROR),
    }
}

fn encode_variant_element(enc: &mut BinaryEncoder, value: &Value, ty: &DataType) -> UaResult<()> {
    match ty.kind {
        TypeKind::Structure | TypeKind::OptStruct | TypeKind::Union => {
            encode_structure_body(enc, value, ty)
        }
        _ => encode_value(enc, value, ty),
    }
}

fn variant_element_len(value: &Value, ty: &DataType) -> UaResult<usize> {
    match ty.kind {
        TypeKind::Structure | TypeKind::OptStruct | TypeKind::Union => structure_body_len(value, ty),
        _ => encoded_size(value, ty),
    }
}

impl BinaryEncodable for Variant {
    fn byte_len(&self) -> UaResult<usize> {
        let Some(ty) = self.data_type() else {
            return Ok(1);
        };
        let mut len = 1;
        match self.data() {
            VariantData::Empty => return Ok(1),
            VariantData::Scalar(v) => len += variant_element_len(v, ty)?,
            VariantData::UndefinedArray | VariantData::EmptyArray => len += 4,
            VariantData::Array(values) => {
                len += 4;
                for v in values {
                    len += variant_element_len(v, ty)?;
                }
            }
        }
        if let Some(dims) = self.array_dimensions() {
            len += 4 + 4 * dims.len();
        }
        Ok(len)
    }

    fn encode(&self, enc: &mut BinaryEncoder) -> UaResult<()> {
        let (Some(ty), data) = (self.data_type(), self.data()) else {
            return enc.write_u8(0);
        };
        let mut mask = wire_type_id(ty)?;
        match data {
            VariantData::Empty => enc.write_u8(0),
            VariantData::Scalar(value) => {
                if mask == VARIANT_ID {
                    log::debug!("[encoding] variant cannot hold a scalar variant");
                    return Err(StatusCode::BAD_ENCODING_ERROR);
                }
                enc.write_u8(mask)?;
                encode_variant_element(enc, value, ty)
            }
            array => {
                mask |= VARIANT_ARRAY;
                if self.array_dimensions().is_some() {
                    mask |= VARIANT_ARRAY_DIMENSIONS;
                }
                enc.write_u8(mask)?;
                match array {
                    VariantData::Array(values) => {
                        enc.write_length(Some(values.len()))?;
                        for value in values {
                            encode_variant_element(enc, value, ty)?;
                        }
                    }
                    VariantData::EmptyArray => enc.write_length(Some(0))?,
                    _ => enc.write_length(None)?,
                }
                if let Some(dims) = self.array_dimensions() {
                    enc.write_length(Some(dims.len()))?;
                    for &dim in dims {
                        let dim = i32::try_from(dim).map_err(|_| StatusCode::BAD_ENCODING_ERROR)?;
                        enc.write_i32(dim)?;
                    }
                }
                Ok(())
            }
        }
    }

    fn decode(dec: &mut BinaryDecoder<'_>) -> UaResult<Self> {
        let mask = dec.read_u8()?;
        let type_id = mask & VARIANT_TYPE_MASK;
        if type_id == 0 {
            if mask != 0 {
                return Err(dec.fail("array bits on an empty variant"));
            }
            return Ok(Variant::empty());
        }
        let Some(ty) = dec.types().builtin_by_id(type_id) else {
            return Err(dec.fail("unknown variant type id"));
        };

        if mask & VARIANT_ARRAY == 0 {
            if mask & VARIANT_ARRAY_DIMENSIONS != 0 {
                return Err(dec.fail("array dimensions on a scalar variant"));
            }
            if type_id == VARIANT_ID {
                return Err(dec.fail("variant cannot hold a scalar variant"));
            }
            let value = decode_value(dec, &ty)?;
            return Ok(match value {
                Value::ExtensionObject(eo) if eo.is_decoded() => match eo.into_decoded() {
                    Some((data_type, value)) => Variant::scalar(data_type, value),
                    None => Variant::empty(),
                },
                value => Variant::scalar(ty, value),
            });
        }

        let mut variant = match dec.read_array_length(ty.min_wire_size())? {
            None => Variant::undefined_array(ty),
            Some(len) => {
                let values = super::generic::decode_elements(dec, len, &ty)?;
                if ty.kind == TypeKind::ExtensionObject {
                    unwrap_extension_objects(ty, values)
                } else {
                    Variant::array(ty, values)
                }
            }
        };

        if mask & VARIANT_ARRAY_DIMENSIONS != 0 {
            let Some(count) = dec.read_array_length(4)? else {
                return Ok(variant);
            };
            let mut dims = Vec::new();
            dims.try_reserve_exact(count)?;
            for _ in 0..count {
                let dim = dec.read_i32()?;
                let dim = u32::try_from(dim).map_err(|_| dec.fail("negative array dimension"))?;
                dims.push(dim);
            }
            variant
                .set_array_dimensions(dims)
                .map_err(|_| dec.fail("array dimensions do not match length"))?;
        }
        Ok(variant)
    }
}

/// Unwrap an ExtensionObject array into a structure array when every
/// element decoded to the same known type.
fn unwrap_extension_objects(eo_type: Arc<DataType>, values: Vec<Value>) -> Variant {
    let common = match values.first() {
        Some(Value::ExtensionObject(ExtensionObject::Decoded { data_type, .. })) => {
            Arc::clone(data_type)
        }
        _ => return Variant::array(eo_type, values),
    };
    let uniform = values.iter().all(|v| {
        matches!(v, Value::ExtensionObject(ExtensionObject::Decoded { data_type, .. })
            if Arc::ptr_eq(data_type, &common) || **data_type == *common)
    });
    if !uniform {
        return Variant::array(eo_type, values);
    }
    let unwrapped = values
        .into_iter()
        .filter_map(|v| match v {
            Value::ExtensionObject(eo) => eo.into_decoded().map(|(_, value)| value),
            _ => None,
        })
        .collect();
    Variant::array(common, unwrapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EncodingLimits;
    use crate::types::TypeTable;

    fn encode<T: BinaryEncodable>(value: &T) -> Vec<u8> {
        let mut enc = BinaryEncoder::new(EncodingLimits::default());
        value.encode(&mut enc).expect("encode");
        let bytes = enc.into_bytes();
        assert_eq!(value.byte_len().expect("byte_len"), bytes.len());
        bytes
    }

    fn decode<T: BinaryEncodable>(bytes: &[u8]) -> UaResult<T> {
        let table = TypeTable::new();
        let mut dec = BinaryDecoder::new(bytes, &table, EncodingLimits::default());
        let value = T::decode(&mut dec)?;
        assert_eq!(dec.remaining(), 0, "unconsumed bytes");
        Ok(value)
    }

    #[test]
    fn test_string_null_vs_empty() {
        assert_eq!(encode(&UaString::null()), vec![0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(encode(&UaString::from("")), vec![0, 0, 0, 0]);
        assert_eq!(encode(&UaString::from("ab")), vec![2, 0, 0, 0, b'a', b'b']);
        assert!(decode::<UaString>(&[0xFF; 4]).expect("null").is_null());
        let empty = decode::<UaString>(&[0; 4]).expect("empty");
        assert!(!empty.is_null() && empty.is_empty());
    }

    #[test]
    fn test_string_rejects_invalid_utf8_and_truncation() {
        assert_eq!(
            decode::<UaString>(&[1, 0, 0, 0, 0xFF]),
            Err(StatusCode::BAD_DECODING_ERROR)
        );
        assert_eq!(
            decode::<UaString>(&[5, 0, 0, 0, b'a']),
            Err(StatusCode::BAD_DECODING_ERROR)
        );
    }

    #[test]
    fn test_node_id_compact_forms() {
        assert_eq!(encode(&NodeId::ns0(85)), vec![0x00, 85]);
        assert_eq!(encode(&NodeId::numeric(2, 1025)), vec![0x01, 2, 0x01, 0x04]);
        assert_eq!(
            encode(&NodeId::numeric(300, 7)),
            vec![0x02, 0x2C, 0x01, 7, 0, 0, 0]
        );
        assert_eq!(
            encode(&NodeId::string(1, "ab")),
            vec![0x03, 1, 0, 2, 0, 0, 0, b'a', b'b']
        );
        assert_eq!(decode::<NodeId>(&[0x01, 2, 0x01, 0x04]), Ok(NodeId::numeric(2, 1025)));
        assert_eq!(decode::<NodeId>(&[0x09, 0]), Err(StatusCode::BAD_DECODING_ERROR));
        assert_eq!(decode::<NodeId>(&[0x80, 0]), Err(StatusCode::BAD_DECODING_ERROR));
    }

    #[test]
    fn test_expanded_node_id_flags() {
        let id = ExpandedNodeId {
            node_id: NodeId::ns0(1),
            namespace_uri: UaString::from("urn:x"),
            server_index: 3,
        };
        let bytes = encode(&id);
        assert_eq!(bytes[0], 0xC0);
        assert_eq!(decode::<ExpandedNodeId>(&bytes), Ok(id));
    }

    #[test]
    fn test_localized_text_mask() {
        assert_eq!(encode(&LocalizedText::default()), vec![0]);
        let text = LocalizedText::text("hi");
        assert_eq!(encode(&text), vec![0x02, 2, 0, 0, 0, b'h', b'i']);
    }

    #[test]
    fn test_diagnostic_info_field_order() {
        let info = DiagnosticInfo {
            symbolic_id: Some(1),
            locale: Some(2),
            localized_text: Some(3),
            inner_status_code: Some(StatusCode::BAD_TIMEOUT),
            inner_diagnostic_info: Some(Box::new(DiagnosticInfo {
                additional_info: Some(UaString::from("x")),
                ..Default::default()
            })),
            ..Default::default()
        };
        let bytes = encode(&info);
        assert_eq!(bytes[0], 0x01 | 0x04 | 0x08 | 0x20 | 0x40);
        // symbolic id, then locale before localized text
        assert_eq!(&bytes[1..13], &[1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0]);
        assert_eq!(decode::<DiagnosticInfo>(&bytes), Ok(info));
    }

    #[test]
    fn test_data_value_layout() {
        let dv = DataValue {
            value: Some(Variant::from(7u8)),
            status: Some(StatusCode::BAD_NOT_READABLE),
            source_timestamp: Some(DateTime(1)),
            source_picoseconds: Some(9),
            ..Default::default()
        };
        let bytes = encode(&dv);
        assert_eq!(bytes[0], 0x01 | 0x02 | 0x04 | 0x10);
        assert_eq!(&bytes[1..3], &[3, 7]);
        assert_eq!(decode::<DataValue>(&bytes), Ok(dv));
    }

    #[test]
    fn test_variant_masks() {
        assert_eq!(encode(&Variant::empty()), vec![0]);
        assert_eq!(encode(&Variant::from(true)), vec![1, 1]);

        let ty = Arc::clone(&crate::types::catalog().builtins.uint16);
        let array = Variant::array(Arc::clone(&ty), vec![Value::UInt16(1), Value::UInt16(2)]);
        assert_eq!(encode(&array), vec![0x85, 2, 0, 0, 0, 1, 0, 2, 0]);

        let undefined = Variant::undefined_array(ty);
        assert_eq!(encode(&undefined), vec![0x85, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert!(decode::<Variant>(&encode(&undefined)).expect("decode").is_undefined_array());
    }

    #[test]
    fn test_variant_matrix_dimensions() {
        let ty = Arc::clone(&crate::types::catalog().builtins.byte);
        let mut v = Variant::array(ty, (0..6).map(Value::Byte).collect());
        v.set_array_dimensions(vec![2, 3]).expect("dims");
        let bytes = encode(&v);
        assert_eq!(bytes[0], 0x80 | 0x40 | 3);
        assert_eq!(decode::<Variant>(&bytes), Ok(v));

        // Dimensions that disagree with the length are rejected.
        let mut bad = bytes.clone();
        let last = bad.len() - 4;
        bad[last] = 4;
        assert_eq!(decode::<Variant>(&bad), Err(StatusCode::BAD_DECODING_ERROR));
    }

    #[test]
    fn test_variant_rejects_malformed_masks() {
        assert_eq!(decode::<Variant>(&[0x80]), Err(StatusCode::BAD_DECODING_ERROR));
        assert_eq!(decode::<Variant>(&[30]), Err(StatusCode::BAD_DECODING_ERROR));
        assert_eq!(decode::<Variant>(&[0x40 | 1, 1]), Err(StatusCode::BAD_DECODING_ERROR));
        assert_eq!(decode::<Variant>(&[24, 0]), Err(StatusCode::BAD_DECODING_ERROR));
    }

    #[test]
    fn test_unknown_extension_object_survives_byte_for_byte() {
        let mut bytes = vec![0x01, 5, 0x39, 0x30, 0x01];
        bytes.extend_from_slice(&3i32.to_le_bytes());
        bytes.extend_from_slice(&[0xAA, 0xBB, 0xCC]);
        let eo = decode::<ExtensionObject>(&bytes).expect("decode");
        assert!(!eo.is_decoded());
        assert_eq!(encode(&eo), bytes);
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor-driven encode/decode of [`Value`]s.
//!
//! Structures encode their members in declaration order with no padding and
//! no length prefix. Array members carry an Int32 length (`-1` null array).
//! Optional-field structures lead with a 32-bit presence mask, unions with a
//! 32-bit switch.
//!
//! Overlayable types (fixed-width little-endian members only) take a fast
//! path when [`EncodingLimits::overlayable_fast_path`] is set: one bounds
//! check for the whole instance or array, then slice parsing. The bytes
//! produced and accepted are identical to the member-by-member path.
//!
//! [`EncodingLimits::overlayable_fast_path`]: crate::config::EncodingLimits

use super::builtin::{nested_decode, nested_encode, BinaryEncodable};
use super::cursor::{BinaryDecoder, BinaryEncoder};
use crate::types::{
    ByteString, DataType, DataTypeMember, DataValue, DateTime, DiagnosticInfo, ExpandedNodeId,
    ExtensionObject, Field, Guid, LocalizedText, NodeId, QualifiedName, StatusCode, StructValue,
    TypeKind, UaResult, UaString, UnionValue, Value, Variant,
};

fn mismatch(value: &Value, ty: &DataType) -> StatusCode {
    log::debug!(
        "[encoding] value of kind {:?} does not fit {}",
        value.builtin_kind(),
        ty.name
    );
    StatusCode::BAD_ENCODING_ERROR
}

/// Encode `value` as an instance of `ty`.
pub fn encode_value(enc: &mut BinaryEncoder, value: &Value, ty: &DataType) -> UaResult<()> {
    match (ty.kind, value) {
        (TypeKind::Boolean, Value::Boolean(v)) => v.encode(enc),
        (TypeKind::SByte, Value::SByte(v)) => v.encode(enc),
        (TypeKind::Byte, Value::Byte(v)) => v.encode(enc),
        (TypeKind::Int16, Value::Int16(v)) => v.encode(enc),
        (TypeKind::UInt16, Value::UInt16(v)) => v.encode(enc),
        (TypeKind::Int32, Value::Int32(v)) => v.encode(enc),
        (TypeKind::UInt32, Value::UInt32(v)) => v.encode(enc),
        (TypeKind::Int64, Value::Int64(v)) => v.encode(enc),
        (TypeKind::UInt64, Value::UInt64(v)) => v.encode(enc),
        (TypeKind::Float, Value::Float(v)) => v.encode(enc),
        (TypeKind::Double, Value::Double(v)) => v.encode(enc),
        (TypeKind::String, Value::String(v)) => v.encode(enc),
        (TypeKind::DateTime, Value::DateTime(v)) => v.encode(enc),
        (TypeKind::Guid, Value::Guid(v)) => v.encode(enc),
        (TypeKind::ByteString, Value::ByteString(v)) => v.encode(enc),
        (TypeKind::XmlElement, Value::XmlElement(v)) => v.encode(enc),
        (TypeKind::NodeId, Value::NodeId(v)) => v.encode(enc),
        (TypeKind::ExpandedNodeId, Value::ExpandedNodeId(v)) => v.encode(enc),
        (TypeKind::StatusCode, Value::StatusCode(v)) => v.encode(enc),
        (TypeKind::QualifiedName, Value::QualifiedName(v)) => v.encode(enc),
        (TypeKind::LocalizedText, Value::LocalizedText(v)) => v.encode(enc),
        (TypeKind::ExtensionObject, Value::ExtensionObject(v)) => v.encode(enc),
        (TypeKind::DataValue, Value::DataValue(v)) => nested_encode(enc, |enc| v.encode(enc)),
        (TypeKind::Variant, Value::Variant(v)) => nested_encode(enc, |enc| v.encode(enc)),
        (TypeKind::DiagnosticInfo, Value::DiagnosticInfo(v)) => v.encode(enc),
        (TypeKind::Enum, Value::Enum(v)) => enc.write_i32(*v),
        (TypeKind::Structure, Value::Structure(s)) => encode_structure(enc, s, ty),
        (TypeKind::OptStruct, Value::Structure(s)) => encode_optional_structure(enc, s, ty),
        (TypeKind::Union, Value::Union(u)) => encode_union(enc, u, ty),
        _ => Err(mismatch(value, ty)),
    }
}

fn encode_structure(enc: &mut BinaryEncoder, s: &StructValue, ty: &DataType) -> UaResult<()> {
    if s.fields.len() != ty.members.len() {
        log::debug!(
            "[encoding] {} expects {} fields, got {}",
            ty.name,
            ty.members.len(),
            s.fields.len()
        );
        return Err(StatusCode::BAD_ENCODING_ERROR);
    }
    if enc.limits().overlayable_fast_path && ty.overlayable() {
        let mut out = Vec::new();
        out.try_reserve_exact(ty.fixed_wire_size().unwrap_or(0))?;
        write_fixed_struct(&mut out, s, ty)?;
        return enc.write_bytes(&out);
    }
    nested_encode(enc, |enc| {
        for (member, field) in ty.members.iter().zip(&s.fields) {
            encode_field(enc, field, member)?;
        }
        Ok(())
    })
}

fn encode_optional_structure(enc: &mut BinaryEncoder, s: &StructValue, ty: &DataType) -> UaResult<()> {
    if s.fields.len() != ty.members.len() {
        return Err(StatusCode::BAD_ENCODING_ERROR);
    }
    let mut mask = 0u32;
    let mut bit = 0u32;
    for (member, field) in ty.members.iter().zip(&s.fields) {
        if member.is_optional {
            let flag = optional_flag(bit)?;
            if !field.is_absent() {
                mask |= flag;
            }
            bit += 1;
        } else if field.is_absent() {
            log::debug!("[encoding] {}.{} is mandatory", ty.name, member.name);
            return Err(StatusCode::BAD_ENCODING_ERROR);
        }
    }
    nested_encode(enc, |enc| {
        enc.write_u32(mask)?;
        for (member, field) in ty.members.iter().zip(&s.fields) {
            if !field.is_absent() {
                encode_field(enc, field, member)?;
            }
        }
        Ok(())
    })
}

/// Mask bit of the `bit`-th optional member; the mask holds 32 of them.
fn optional_flag(bit: u32) -> UaResult<u32> {
    1u32.checked_shl(bit).ok_or_else(|| {
        log::debug!("[encoding] more than 32 optional members");
        StatusCode::BAD_ENCODING_LIMITS_EXCEEDED
    })
}

fn encode_union(enc: &mut BinaryEncoder, u: &UnionValue, ty: &DataType) -> UaResult<()> {
    match (u.switch, &u.value) {
        (0, None) => enc.write_u32(0),
        (switch, Some(field)) if switch > 0 && switch as usize <= ty.members.len() => {
            nested_encode(enc, |enc| {
                enc.write_u32(switch)?;
                encode_field(enc, field, &ty.members[switch as usize - 1])
            })
        }
        _ => {
            log::debug!("[encoding] {}: invalid union switch {}", ty.name, u.switch);
            Err(StatusCode::BAD_ENCODING_ERROR)
        }
    }
}

fn encode_field(enc: &mut BinaryEncoder, field: &Field, member: &DataTypeMember) -> UaResult<()> {
    match (field, member.is_array) {
        (Field::Scalar(v), false) => encode_value(enc, v, &member.member_type),
        (Field::Array(values), true) => encode_array(enc, values.as_deref(), &member.member_type),
        _ => {
            log::debug!("[encoding] field shape does not match member {}", member.name);
            Err(StatusCode::BAD_ENCODING_ERROR)
        }
    }
}

/// Encode consecutive structure members without a mask or switch. Used for
/// message bodies whose leading header member is encoded separately.
pub fn encode_fields(enc: &mut BinaryEncoder, fields: &[Field], members: &[DataTypeMember]) -> UaResult<()> {
    if fields.len() != members.len() {
        log::debug!(
            "[encoding] expected {} fields, got {}",
            members.len(),
            fields.len()
        );
        return Err(StatusCode::BAD_ENCODING_ERROR);
    }
    nested_encode(enc, |enc| {
        for (member, field) in members.iter().zip(fields) {
            encode_field(enc, field, member)?;
        }
        Ok(())
    })
}

/// Encode an array with its Int32 length prefix; `None` is the null array.
pub fn encode_array(enc: &mut BinaryEncoder, values: Option<&[Value]>, ty: &DataType) -> UaResult<()> {
    let Some(values) = values else {
        return enc.write_length(None);
    };
    if values.len() > enc.limits().max_array_length as usize {
        return Err(StatusCode::BAD_ENCODING_LIMITS_EXCEEDED);
    }
    enc.write_length(Some(values.len()))?;
    if enc.limits().overlayable_fast_path && ty.overlayable() && !values.is_empty() {
        let size = ty.fixed_wire_size().unwrap_or(0);
        let mut out = Vec::new();
        out.try_reserve_exact(size.saturating_mul(values.len()))?;
        for value in values {
            write_fixed(&mut out, value, ty)?;
        }
        return enc.write_bytes(&out);
    }
    for value in values {
        encode_value(enc, value, ty)?;
    }
    Ok(())
}

/// Decode one instance of `ty`.
pub fn decode_value(dec: &mut BinaryDecoder<'_>, ty: &DataType) -> UaResult<Value> {
    let value = match ty.kind {
        TypeKind::Boolean => Value::Boolean(dec.read_bool()?),
        TypeKind::SByte => Value::SByte(dec.read_i8()?),
        TypeKind::Byte => Value::Byte(dec.read_u8()?),
        TypeKind::Int16 => Value::Int16(dec.read_i16()?),
        TypeKind::UInt16 => Value::UInt16(dec.read_u16()?),
        TypeKind::Int32 => Value::Int32(dec.read_i32()?),
        TypeKind::UInt32 => Value::UInt32(dec.read_u32()?),
        TypeKind::Int64 => Value::Int64(dec.read_i64()?),
        TypeKind::UInt64 => Value::UInt64(dec.read_u64()?),
        TypeKind::Float => Value::Float(dec.read_f32()?),
        TypeKind::Double => Value::Double(dec.read_f64()?),
        TypeKind::String => Value::String(UaString::decode(dec)?),
        TypeKind::DateTime => Value::DateTime(DateTime::decode(dec)?),
        TypeKind::Guid => Value::Guid(Guid::decode(dec)?),
        TypeKind::ByteString => Value::ByteString(ByteString::decode(dec)?),
        TypeKind::XmlElement => Value::XmlElement(UaString::decode(dec)?),
        TypeKind::NodeId => Value::NodeId(NodeId::decode(dec)?),
        TypeKind::ExpandedNodeId => Value::ExpandedNodeId(ExpandedNodeId::decode(dec)?),
        TypeKind::StatusCode => Value::StatusCode(StatusCode::decode(dec)?),
        TypeKind::QualifiedName => Value::QualifiedName(QualifiedName::decode(dec)?),
        TypeKind::LocalizedText => Value::LocalizedText(LocalizedText::decode(dec)?),
        TypeKind::ExtensionObject => Value::ExtensionObject(ExtensionObject::decode(dec)?),
        TypeKind::DataValue => Value::DataValue(Box::new(nested_decode(dec, DataValue::decode)?)),
        TypeKind::Variant => Value::Variant(Box::new(nested_decode(dec, Variant::decode)?)),
        TypeKind::DiagnosticInfo => Value::DiagnosticInfo(DiagnosticInfo::decode(dec)?),
        TypeKind::Enum => Value::Enum(dec.read_i32()?),
        TypeKind::Structure => decode_structure(dec, ty)?,
        TypeKind::OptStruct => decode_optional_structure(dec, ty)?,
        TypeKind::Union => decode_union(dec, ty)?,
    };
    Ok(value)
}

fn decode_structure(dec: &mut BinaryDecoder<'_>, ty: &DataType) -> UaResult<Value> {
    if dec.limits().overlayable_fast_path && ty.overlayable() {
        let size = ty.fixed_wire_size().unwrap_or(0);
        let bytes = dec.read_bytes(size)?;
        let mut at = 0;
        return read_fixed(bytes, &mut at, ty);
    }
    nested_decode(dec, |dec| {
        let mut fields = Vec::new();
        fields.try_reserve_exact(ty.members.len())?;
        for member in &ty.members {
            fields.push(decode_field(dec, member)?);
        }
        Ok(Value::Structure(StructValue::new(fields)))
    })
}

fn decode_optional_structure(dec: &mut BinaryDecoder<'_>, ty: &DataType) -> UaResult<Value> {
    nested_decode(dec, |dec| {
        let mask = dec.read_u32()?;
        let optional = ty.members.iter().filter(|m| m.is_optional).count() as u32;
        if optional < 32 && mask >> optional != 0 {
            return Err(dec.fail("unknown bits in optional field mask"));
        }
        let mut fields = Vec::new();
        fields.try_reserve_exact(ty.members.len())?;
        let mut bit = 0u32;
        for member in &ty.members {
            if member.is_optional {
                let present = mask & optional_flag(bit)? != 0;
                bit += 1;
                if !present {
                    fields.push(Field::Absent);
                    continue;
                }
            }
            fields.push(decode_field(dec, member)?);
        }
        Ok(Value::Structure(StructValue::new(fields)))
    })
}

fn decode_union(dec: &mut BinaryDecoder<'_>, ty: &DataType) -> UaResult<Value> {
    nested_decode(dec, |dec| {
        let switch = dec.read_u32()?;
        if switch == 0 {
            return Ok(Value::Union(UnionValue::default()));
        }
        let Some(member) = ty.members.get(switch as usize - 1) else {
            return Err(dec.fail("union switch out of range"));
        };
        let field = decode_field(dec, member)?;
        Ok(Value::Union(UnionValue {
            switch,
            value: Some(Box::new(field)),
        }))
    })
}

fn decode_field(dec: &mut BinaryDecoder<'_>, member: &DataTypeMember) -> UaResult<Field> {
    if member.is_array {
        Ok(Field::Array(decode_array(dec, &member.member_type)?))
    } else {
        Ok(Field::Scalar(decode_value(dec, &member.member_type)?))
    }
}

/// Decode consecutive structure members, the counterpart of [`encode_fields`].
pub fn decode_fields(dec: &mut BinaryDecoder<'_>, members: &[DataTypeMember]) -> UaResult<Vec<Field>> {
    nested_decode(dec, |dec| {
        let mut fields = Vec::new();
        fields.try_reserve_exact(members.len())?;
        for member in members {
            fields.push(decode_field(dec, member)?);
        }
        Ok(fields)
    })
}

/// Decode a length-prefixed array; `None` is the null array.
pub fn decode_array(dec: &mut BinaryDecoder<'_>, ty: &DataType) -> UaResult<Option<Vec<Value>>> {
    match dec.read_array_length(ty.min_wire_size())? {
        None => Ok(None),
        Some(len) => Ok(Some(decode_elements(dec, len, ty)?)),
    }
}

/// Decode `len` consecutive elements of `ty`. The length has already been
/// checked against the limits.
pub(crate) fn decode_elements(dec: &mut BinaryDecoder<'_>, len: usize, ty: &DataType) -> UaResult<Vec<Value>> {
    let mut values = Vec::new();
    values.try_reserve_exact(len)?;
    if len > 0 && dec.limits().overlayable_fast_path && ty.overlayable() {
        let size = ty.fixed_wire_size().unwrap_or(0);
        let total = size
            .checked_mul(len)
            .ok_or(StatusCode::BAD_ENCODING_LIMITS_EXCEEDED)?;
        log::trace!("[decoder] overlay read of {} x {}", len, ty.name);
        let bytes = dec.read_bytes(total)?;
        let mut at = 0;
        for _ in 0..len {
            values.push(read_fixed(bytes, &mut at, ty)?);
        }
        return Ok(values);
    }
    for _ in 0..len {
        values.push(decode_value(dec, ty)?);
    }
    Ok(values)
}

fn le_array<const N: usize>(chunk: &[u8]) -> UaResult<[u8; N]> {
    let mut out = [0u8; N];
    out.copy_from_slice(chunk.get(..N).ok_or(StatusCode::BAD_INTERNAL_ERROR)?);
    Ok(out)
}

/// Parse one overlayable instance from a pre-checked slice.
fn read_fixed(bytes: &[u8], at: &mut usize, ty: &DataType) -> UaResult<Value> {
    if ty.kind == TypeKind::Structure {
        let mut fields = Vec::new();
        fields.try_reserve_exact(ty.members.len())?;
        for member in &ty.members {
            fields.push(Field::Scalar(read_fixed(bytes, at, &member.member_type)?));
        }
        return Ok(Value::Structure(StructValue::new(fields)));
    }
    let size = ty.kind.fixed_size().ok_or(StatusCode::BAD_INTERNAL_ERROR)?;
    let chunk = bytes
        .get(*at..*at + size)
        .ok_or(StatusCode::BAD_INTERNAL_ERROR)?;
    *at += size;
    let value = match ty.kind {
        TypeKind::Boolean => Value::Boolean(chunk[0] != 0),
        TypeKind::SByte => Value::SByte(i8::from_le_bytes(le_array(chunk)?)),
        TypeKind::Byte => Value::Byte(chunk[0]),
        TypeKind::Int16 => Value::Int16(i16::from_le_bytes(le_array(chunk)?)),
        TypeKind::UInt16 => Value::UInt16(u16::from_le_bytes(le_array(chunk)?)),
        TypeKind::Int32 => Value::Int32(i32::from_le_bytes(le_array(chunk)?)),
        TypeKind::UInt32 => Value::UInt32(u32::from_le_bytes(le_array(chunk)?)),
        TypeKind::Int64 => Value::Int64(i64::from_le_bytes(le_array(chunk)?)),
        TypeKind::UInt64 => Value::UInt64(u64::from_le_bytes(le_array(chunk)?)),
        TypeKind::Float => Value::Float(f32::from_le_bytes(le_array(chunk)?)),
        TypeKind::Double => Value::Double(f64::from_le_bytes(le_array(chunk)?)),
        TypeKind::DateTime => Value::DateTime(DateTime(i64::from_le_bytes(le_array(chunk)?))),
        TypeKind::StatusCode => Value::StatusCode(StatusCode(u32::from_le_bytes(le_array(chunk)?))),
        TypeKind::Guid => Value::Guid(Guid::from_bytes(le_array(chunk)?)),
        TypeKind::Enum => Value::Enum(i32::from_le_bytes(le_array(chunk)?)),
        _ => return Err(StatusCode::BAD_INTERNAL_ERROR),
    };
    Ok(value)
}

fn write_fixed_struct(out: &mut Vec<u8>, s: &StructValue, ty: &DataType) -> UaResult<()> {
    if s.fields.len() != ty.members.len() {
        return Err(StatusCode::BAD_ENCODING_ERROR);
    }
    for (member, field) in ty.members.iter().zip(&s.fields) {
        match field {
            Field::Scalar(v) => write_fixed(out, v, &member.member_type)?,
            _ => return Err(StatusCode::BAD_ENCODING_ERROR),
        }
    }
    Ok(())
}

/// Append one overlayable instance.
fn write_fixed(out: &mut Vec<u8>, value: &Value, ty: &DataType) -> UaResult<()> {
    match (ty.kind, value) {
        (TypeKind::Boolean, Value::Boolean(v)) => out.push(u8::from(*v)),
        (TypeKind::SByte, Value::SByte(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (TypeKind::Byte, Value::Byte(v)) => out.push(*v),
        (TypeKind::Int16, Value::Int16(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (TypeKind::UInt16, Value::UInt16(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (TypeKind::Int32, Value::Int32(v)) | (TypeKind::Enum, Value::Enum(v)) => {
            out.extend_from_slice(&v.to_le_bytes())
        }
        (TypeKind::UInt32, Value::UInt32(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (TypeKind::Int64, Value::Int64(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (TypeKind::UInt64, Value::UInt64(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (TypeKind::Float, Value::Float(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (TypeKind::Double, Value::Double(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (TypeKind::DateTime, Value::DateTime(v)) => out.extend_from_slice(&v.0.to_le_bytes()),
        (TypeKind::StatusCode, Value::StatusCode(v)) => out.extend_from_slice(&v.bits().to_le_bytes()),
        (TypeKind::Guid, Value::Guid(v)) => out.extend_from_slice(&v.to_bytes()),
        (TypeKind::Structure, Value::Structure(s)) => write_fixed_struct(out, s, ty)?,
        _ => return Err(mismatch(value, ty)),
    }
    Ok(())
}

/// Binary size of `value` encoded as `ty`.
pub fn encoded_size(value: &Value, ty: &DataType) -> UaResult<usize> {
    match (ty.kind, value) {
        (TypeKind::Boolean, Value::Boolean(v)) => v.byte_len(),
        (TypeKind::SByte, Value::SByte(v)) => v.byte_len(),
        (TypeKind::Byte, Value::Byte(v)) => v.byte_len(),
        (TypeKind::Int16, Value::Int16(v)) => v.byte_len(),
        (TypeKind::UInt16, Value::UInt16(v)) => v.byte_len(),
        (TypeKind::Int32, Value::Int32(v)) => v.byte_len(),
        (TypeKind::UInt32, Value::UInt32(v)) => v.byte_len(),
        (TypeKind::Int64, Value::Int64(v)) => v.byte_len(),
        (TypeKind::UInt64, Value::UInt64(v)) => v.byte_len(),
        (TypeKind::Float, Value::Float(v)) => v.byte_len(),
        (TypeKind::Double, Value::Double(v)) => v.byte_len(),
        (TypeKind::String, Value::String(v)) => v.byte_len(),
        (TypeKind::DateTime, Value::DateTime(v)) => v.byte_len(),
        (TypeKind::Guid, Value::Guid(v)) => v.byte_len(),
        (TypeKind::ByteString, Value::ByteString(v)) => v.byte_len(),
        (TypeKind::XmlElement, Value::XmlElement(v)) => v.byte_len(),
        (TypeKind::NodeId, Value::NodeId(v)) => v.byte_len(),
        (TypeKind::ExpandedNodeId, Value::ExpandedNodeId(v)) => v.byte_len(),
        (TypeKind::StatusCode, Value::StatusCode(v)) => v.byte_len(),
        (TypeKind::QualifiedName, Value::QualifiedName(v)) => v.byte_len(),
        (TypeKind::LocalizedText, Value::LocalizedText(v)) => v.byte_len(),
        (TypeKind::ExtensionObject, Value::ExtensionObject(v)) => v.byte_len(),
        (TypeKind::DataValue, Value::DataValue(v)) => v.byte_len(),
        (TypeKind::Variant, Value::Variant(v)) => v.byte_len(),
        (TypeKind::DiagnosticInfo, Value::DiagnosticInfo(v)) => v.byte_len(),
        (TypeKind::Enum, Value::Enum(_)) => Ok(4),
        (TypeKind::Structure | TypeKind::OptStruct, Value::Structure(s)) => {
            if s.fields.len() != ty.members.len() {
                return Err(StatusCode::BAD_ENCODING_ERROR);
            }
            let mut size = if ty.kind == TypeKind::OptStruct { 4 } else { 0 };
            for (member, field) in ty.members.iter().zip(&s.fields) {
                size += field_size(field, member)?;
            }
            Ok(size)
        }
        (TypeKind::Union, Value::Union(u)) => match (u.switch, &u.value) {
            (0, None) => Ok(4),
            (switch, Some(field)) if switch > 0 && switch as usize <= ty.members.len() => {
                Ok(4 + field_size(field, &ty.members[switch as usize - 1])?)
            }
            _ => Err(StatusCode::BAD_ENCODING_ERROR),
        },
        _ => Err(mismatch(value, ty)),
    }
}

fn field_size(field: &Field, member: &DataTypeMember) -> UaResult<usize> {
    match (field, member.is_array) {
        (Field::Absent, _) if member.is_optional => Ok(0),
        (Field::Scalar(v), false) => encoded_size(v, &member.member_type),
        (Field::Array(None), true) => Ok(4),
        (Field::Array(Some(values)), true) => {
            let mut size = 4;
            for v in values {
                size += encoded_size(v, &member.member_type)?;
            }
            Ok(size)
        }
        _ => Err(StatusCode::BAD_ENCODING_ERROR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EncodingLimits;
    use crate::types::{catalog, DataTypeBuilder, TypeTable};
    use std::sync::Arc;

    fn roundtrip(value: &Value, ty: &DataType, limits: EncodingLimits) -> (Vec<u8>, Value) {
        let mut enc = BinaryEncoder::new(limits);
        encode_value(&mut enc, value, ty).expect("encode");
        let bytes = enc.into_bytes();
        assert_eq!(encoded_size(value, ty).expect("size"), bytes.len());
        let table = TypeTable::new();
        let mut dec = BinaryDecoder::new(&bytes, &table, limits);
        let decoded = decode_value(&mut dec, ty).expect("decode");
        assert_eq!(dec.remaining(), 0);
        (bytes, decoded)
    }

    fn point() -> Arc<DataType> {
        let bt = &catalog().builtins;
        DataTypeBuilder::structure("Point", NodeId::numeric(2, 1))
            .binary_encoding_id(NodeId::numeric(2, 2))
            .field("X", &bt.double)
            .field("Y", &bt.double)
            .field("Valid", &bt.boolean)
            .build()
            .expect("point")
    }

    #[test]
    fn test_overlay_path_matches_generic_path() {
        let ty = point();
        assert!(ty.overlayable());
        let value = Value::Structure(StructValue::new(vec![
            Field::Scalar(Value::Double(1.5)),
            Field::Scalar(Value::Double(-2.0)),
            Field::Scalar(Value::Boolean(true)),
        ]));
        let (fast, fast_value) = roundtrip(&value, &ty, EncodingLimits::default());
        let (slow, slow_value) = roundtrip(&value, &ty, EncodingLimits::default().generic_only());
        assert_eq!(fast, slow);
        assert_eq!(fast.len(), 17);
        assert_eq!(fast_value, value);
        assert_eq!(slow_value, value);
    }

    #[test]
    fn test_optional_structure_mask() {
        let bt = &catalog().builtins;
        let ty = DataTypeBuilder::optional_structure("Opt", NodeId::numeric(2, 10))
            .field("Id", &bt.uint32)
            .optional_field("Name", &bt.string)
            .optional_array_field("Tags", &bt.string)
            .build()
            .expect("opt");
        let value = Value::Structure(StructValue::new(vec![
            Field::Scalar(Value::UInt32(5)),
            Field::Absent,
            Field::Array(Some(vec![Value::from("a")])),
        ]));
        let (bytes, decoded) = roundtrip(&value, &ty, EncodingLimits::default());
        assert_eq!(&bytes[..4], &[0b10, 0, 0, 0]);
        assert_eq!(decoded, value);

        // Mask bits for optional members that do not exist are rejected.
        let mut bad = bytes.clone();
        bad[0] = 0b100;
        let table = TypeTable::new();
        let mut dec = BinaryDecoder::new(&bad, &table, EncodingLimits::default());
        assert_eq!(decode_value(&mut dec, &ty), Err(StatusCode::BAD_DECODING_ERROR));
    }

    #[test]
    fn test_union_switch() {
        let bt = &catalog().builtins;
        let ty = DataTypeBuilder::union("Choice", NodeId::numeric(2, 20))
            .field("Number", &bt.int32)
            .field("Text", &bt.string)
            .build()
            .expect("union");
        let value = Value::Union(UnionValue {
            switch: 2,
            value: Some(Box::new(Field::Scalar(Value::from("x")))),
        });
        let (bytes, decoded) = roundtrip(&value, &ty, EncodingLimits::default());
        assert_eq!(&bytes[..4], &[2, 0, 0, 0]);
        assert_eq!(decoded, value);

        let none = Value::Union(UnionValue::default());
        assert_eq!(roundtrip(&none, &ty, EncodingLimits::default()).0, vec![0, 0, 0, 0]);

        let table = TypeTable::new();
        let mut dec = BinaryDecoder::new(&[3, 0, 0, 0], &table, EncodingLimits::default());
        assert_eq!(decode_value(&mut dec, &ty), Err(StatusCode::BAD_DECODING_ERROR));
    }

    #[test]
    fn test_null_and_empty_arrays_differ() {
        let bt = &catalog().builtins;
        let ty = DataTypeBuilder::structure("Holder", NodeId::numeric(2, 30))
            .array_field("Values", &bt.int32)
            .build()
            .expect("holder");
        let null = Value::Structure(StructValue::new(vec![Field::Array(None)]));
        let empty = Value::Structure(StructValue::new(vec![Field::Array(Some(Vec::new()))]));
        let (null_bytes, null_back) = roundtrip(&null, &ty, EncodingLimits::default());
        let (empty_bytes, empty_back) = roundtrip(&empty, &ty, EncodingLimits::default());
        assert_eq!(null_bytes, vec![0xFF; 4]);
        assert_eq!(empty_bytes, vec![0; 4]);
        assert_eq!(null_back, null);
        assert_eq!(empty_back, empty);
    }

    #[test]
    fn test_type_mismatch_is_encoding_error() {
        let mut enc = BinaryEncoder::new(EncodingLimits::default());
        assert_eq!(
            encode_value(&mut enc, &Value::from("x"), &catalog().builtins.int32),
            Err(StatusCode::BAD_ENCODING_ERROR)
        );
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generic value runtime.
//!
//! `init`, `copy`, `clear`, `delete` and the array equivalents, driven by a
//! [`DataType`] only. Copies allocate through `try_reserve_exact` so that
//! allocation failure surfaces as `BadOutOfMemory`. A copy is assembled in
//! fresh buffers and only handed out once every allocation succeeded, so a
//! failed copy never leaves a half-built value behind.

use super::{
    ByteString, DataType, DataTypeMember, DataValue, DiagnosticInfo, ExpandedNodeId, ExtensionBody,
    ExtensionObject, Field, Identifier, LocalizedText, NodeId, QualifiedName, StatusCode,
    StructValue, TypeKind, UaResult, UaString, UnionValue, Value, Variant, VariantData,
};

/// Zero value of a type: numeric zero, null strings, null ids, empty
/// variant, every structure field at its own zero value and arrays null.
pub fn init(ty: &DataType) -> Value {
    match ty.kind {
        TypeKind::Boolean => Value::Boolean(false),
        TypeKind::SByte => Value::SByte(0),
        TypeKind::Byte => Value::Byte(0),
        TypeKind::Int16 => Value::Int16(0),
        TypeKind::UInt16 => Value::UInt16(0),
        TypeKind::Int32 => Value::Int32(0),
        TypeKind::UInt32 => Value::UInt32(0),
        TypeKind::Int64 => Value::Int64(0),
        TypeKind::UInt64 => Value::UInt64(0),
        TypeKind::Float => Value::Float(0.0),
        TypeKind::Double => Value::Double(0.0),
        TypeKind::String => Value::String(UaString::null()),
        TypeKind::DateTime => Value::DateTime(Default::default()),
        TypeKind::Guid => Value::Guid(Default::default()),
        TypeKind::ByteString => Value::ByteString(ByteString::null()),
        TypeKind::XmlElement => Value::XmlElement(UaString::null()),
        TypeKind::NodeId => Value::NodeId(NodeId::null()),
        TypeKind::ExpandedNodeId => Value::ExpandedNodeId(Default::default()),
        TypeKind::StatusCode => Value::StatusCode(StatusCode::GOOD),
        TypeKind::QualifiedName => Value::QualifiedName(Default::default()),
        TypeKind::LocalizedText => Value::LocalizedText(Default::default()),
        TypeKind::ExtensionObject => Value::ExtensionObject(ExtensionObject::null()),
        TypeKind::DataValue => Value::DataValue(Box::default()),
        TypeKind::Variant => Value::Variant(Box::default()),
        TypeKind::DiagnosticInfo => Value::DiagnosticInfo(DiagnosticInfo::default()),
        TypeKind::Enum => Value::Enum(0),
        TypeKind::Structure | TypeKind::OptStruct => Value::Structure(StructValue {
            fields: ty
                .members
                .iter()
                .map(|m| {
                    if m.is_optional {
                        Field::Absent
                    } else if m.is_array {
                        Field::Array(None)
                    } else {
                        Field::Scalar(init(&m.member_type))
                    }
                })
                .collect(),
        }),
        TypeKind::Union => Value::Union(UnionValue::default()),
    }
}

/// Allocate a zero-initialized value.
pub fn new_value(ty: &DataType) -> Box<Value> {
    Box::new(init(ty))
}

/// Deep copy of `src`, interpreted as `ty`.
///
/// Pointer-free types are copied bitwise; everything else is rebuilt member
/// by member. Fails with `BadTypeMismatch` when `src` does not fit `ty` and
/// with `BadOutOfMemory` when an allocation fails.
pub fn copy(src: &Value, ty: &DataType) -> UaResult<Value> {
    if ty.pointer_free() {
        if !src.fits_kind(ty.kind) {
            return Err(StatusCode::BAD_TYPE_MISMATCH);
        }
        return Ok(src.clone());
    }
    match (ty.kind, src) {
        (TypeKind::Structure | TypeKind::OptStruct, Value::Structure(s)) => {
            if s.fields.len() != ty.members.len() {
                return Err(StatusCode::BAD_TYPE_MISMATCH);
            }
            let mut fields = Vec::new();
            fields.try_reserve_exact(s.fields.len())?;
            for (field, member) in s.fields.iter().zip(&ty.members) {
                fields.push(copy_field(field, &member.member_type)?);
            }
            Ok(Value::Structure(StructValue { fields }))
        }
        (TypeKind::Union, Value::Union(u)) => {
            let value = match (&u.value, u.switch) {
                (None, _) => None,
                (Some(field), switch) => {
                    let member = switch
                        .checked_sub(1)
                        .and_then(|idx| ty.members.get(idx as usize))
                        .ok_or(StatusCode::BAD_TYPE_MISMATCH)?;
                    Some(Box::new(copy_field(field, &member.member_type)?))
                }
            };
            Ok(Value::Union(UnionValue {
                switch: u.switch,
                value,
            }))
        }
        (kind, value) if kind.is_builtin() && value.builtin_kind() == Some(kind) => copy_builtin(value),
        (TypeKind::Enum, Value::Enum(v)) => Ok(Value::Enum(*v)),
        _ => Err(StatusCode::BAD_TYPE_MISMATCH),
    }
}

/// Copy into an existing slot. On failure `dst` is left at `init(ty)`.
pub fn copy_into(src: &Value, dst: &mut Value, ty: &DataType) -> UaResult<()> {
    match copy(src, ty) {
        Ok(value) => {
            *dst = value;
            Ok(())
        }
        Err(status) => {
            *dst = init(ty);
            Err(status)
        }
    }
}

/// Release owned data and reset to the zero value. Safe to call repeatedly.
pub fn clear(value: &mut Value, ty: &DataType) {
    // Dropping the old value releases every owned member.
    *value = init(ty);
}

/// Consume and release a value.
pub fn delete(mut value: Box<Value>, ty: &DataType) {
    clear(&mut value, ty);
}

/// Array of `len` zero values.
pub fn array_new(len: usize, ty: &DataType) -> UaResult<Vec<Value>> {
    let mut out = Vec::new();
    out.try_reserve_exact(len)?;
    for _ in 0..len {
        out.push(init(ty));
    }
    Ok(out)
}

/// All-or-nothing deep copy of an array.
pub fn array_copy(src: &[Value], ty: &DataType) -> UaResult<Vec<Value>> {
    let mut out = Vec::new();
    out.try_reserve_exact(src.len())?;
    for value in src {
        out.push(copy(value, ty)?);
    }
    Ok(out)
}

/// Consume and release an array and every element in it.
pub fn array_delete(values: Vec<Value>) {
    drop(values);
}

/// Append one element, growing the buffer fallibly.
pub fn array_append(values: &mut Vec<Value>, value: Value, ty: &DataType) -> UaResult<()> {
    if !value.fits_kind(ty.kind) {
        return Err(StatusCode::BAD_TYPE_MISMATCH);
    }
    values.try_reserve(1)?;
    values.push(value);
    Ok(())
}

/// Grow with zero values or truncate to `len`.
pub fn array_resize(values: &mut Vec<Value>, len: usize, ty: &DataType) -> UaResult<()> {
    if len <= values.len() {
        values.truncate(len);
        return Ok(());
    }
    values.try_reserve_exact(len - values.len())?;
    values.resize_with(len, || init(ty));
    Ok(())
}

/// Check that `value` conforms to `ty`, recursively.
///
/// Missing required fields (an absent mandatory member, a short field list,
/// a union switch pointing nowhere) are argument errors; values of the wrong
/// kind are type mismatches.
pub fn check_value(value: &Value, ty: &DataType) -> UaResult<()> {
    match (ty.kind, value) {
        (TypeKind::Structure | TypeKind::OptStruct, Value::Structure(s)) => check_struct(s, ty),
        (TypeKind::Union, Value::Union(u)) => match (u.switch, &u.value) {
            (0, None) => Ok(()),
            (0, Some(_)) | (_, None) => Err(StatusCode::BAD_INVALID_ARGUMENT),
            (switch, Some(field)) => {
                let member = ty
                    .members
                    .get(switch as usize - 1)
                    .ok_or(StatusCode::BAD_INVALID_ARGUMENT)?;
                check_field(field, member.is_array, false, &member.member_type)
            }
        },
        (TypeKind::Variant, Value::Variant(v)) => check_variant(v),
        (TypeKind::DataValue, Value::DataValue(dv)) => match &dv.value {
            Some(v) => check_variant(v),
            None => Ok(()),
        },
        (TypeKind::ExtensionObject, Value::ExtensionObject(ExtensionObject::Decoded { data_type, value })) => {
            check_value(value, data_type)
        }
        (kind, v) if v.fits_kind(kind) => Ok(()),
        (_, v) => {
            log::debug!("[runtime] {} does not fit {}", v, ty.name);
            Err(StatusCode::BAD_TYPE_MISMATCH)
        }
    }
}

fn check_struct(s: &StructValue, ty: &DataType) -> UaResult<()> {
    if s.fields.len() != ty.members.len() {
        log::debug!(
            "[runtime] {}: {} fields for {} members",
            ty.name,
            s.fields.len(),
            ty.members.len()
        );
        return Err(StatusCode::BAD_INVALID_ARGUMENT);
    }
    for (field, member) in s.fields.iter().zip(&ty.members) {
        check_field(field, member.is_array, member.is_optional, &member.member_type).map_err(|status| {
            log::debug!("[runtime] {}.{}: {}", ty.name, member.name, status);
            status
        })?;
    }
    Ok(())
}

/// [`check_value`] over a member list, for message bodies checked apart
/// from their header.
pub fn check_fields(fields: &[Field], members: &[DataTypeMember]) -> UaResult<()> {
    if fields.len() != members.len() {
        return Err(StatusCode::BAD_INVALID_ARGUMENT);
    }
    for (field, member) in fields.iter().zip(members) {
        check_field(field, member.is_array, member.is_optional, &member.member_type).map_err(|status| {
            log::debug!("[runtime] {}: {}", member.name, status);
            status
        })?;
    }
    Ok(())
}

fn check_field(field: &Field, is_array: bool, is_optional: bool, ty: &DataType) -> UaResult<()> {
    match (field, is_array) {
        (Field::Absent, _) if is_optional => Ok(()),
        (Field::Absent, _) => Err(StatusCode::BAD_INVALID_ARGUMENT),
        (Field::Scalar(v), false) => check_value(v, ty),
        (Field::Array(None), true) => Ok(()),
        (Field::Array(Some(values)), true) => values.iter().try_for_each(|v| check_value(v, ty)),
        _ => Err(StatusCode::BAD_TYPE_MISMATCH),
    }
}

fn check_variant(v: &Variant) -> UaResult<()> {
    let Some(ty) = v.data_type() else {
        return Ok(());
    };
    match v.data() {
        VariantData::Scalar(value) => check_value(value, ty),
        VariantData::Array(values) => values.iter().try_for_each(|value| check_value(value, ty)),
        VariantData::Empty | VariantData::UndefinedArray | VariantData::EmptyArray => Ok(()),
    }
}

fn copy_field(field: &Field, ty: &DataType) -> UaResult<Field> {
    Ok(match field {
        Field::Absent => Field::Absent,
        Field::Scalar(v) => Field::Scalar(copy(v, ty)?),
        Field::Array(None) => Field::Array(None),
        Field::Array(Some(values)) => Field::Array(Some(array_copy(values, ty)?)),
    })
}

fn copy_builtin(value: &Value) -> UaResult<Value> {
    Ok(match value {
        Value::String(s) => Value::String(s.try_clone()?),
        Value::XmlElement(s) => Value::XmlElement(s.try_clone()?),
        Value::ByteString(b) => Value::ByteString(b.try_clone()?),
        Value::NodeId(id) => Value::NodeId(copy_node_id(id)?),
        Value::ExpandedNodeId(id) => Value::ExpandedNodeId(copy_expanded_node_id(id)?),
        Value::QualifiedName(q) => Value::QualifiedName(QualifiedName {
            namespace_index: q.namespace_index,
            name: q.name.try_clone()?,
        }),
        Value::LocalizedText(t) => Value::LocalizedText(copy_localized_text(t)?),
        Value::ExtensionObject(eo) => Value::ExtensionObject(copy_extension_object(eo)?),
        Value::DataValue(dv) => Value::DataValue(Box::new(copy_data_value(dv)?)),
        Value::Variant(v) => Value::Variant(Box::new(copy_variant(v)?)),
        Value::DiagnosticInfo(d) => Value::DiagnosticInfo(copy_diagnostic_info(d)?),
        other => other.clone(),
    })
}

pub(crate) fn copy_node_id(id: &NodeId) -> UaResult<NodeId> {
    let identifier = match &id.identifier {
        Identifier::String(s) => Identifier::String(s.try_clone()?),
        Identifier::ByteString(b) => Identifier::ByteString(b.try_clone()?),
        other => other.clone(),
    };
    Ok(NodeId {
        namespace: id.namespace,
        identifier,
    })
}

fn copy_expanded_node_id(id: &ExpandedNodeId) -> UaResult<ExpandedNodeId> {
    Ok(ExpandedNodeId {
        node_id: copy_node_id(&id.node_id)?,
        namespace_uri: id.namespace_uri.try_clone()?,
        server_index: id.server_index,
    })
}

fn copy_localized_text(t: &LocalizedText) -> UaResult<LocalizedText> {
    Ok(LocalizedText {
        locale: t.locale.try_clone()?,
        text: t.text.try_clone()?,
    })
}

fn copy_extension_object(eo: &ExtensionObject) -> UaResult<ExtensionObject> {
    Ok(match eo {
        ExtensionObject::Encoded { type_id, body } => ExtensionObject::Encoded {
            type_id: copy_node_id(type_id)?,
            body: match body {
                ExtensionBody::None => ExtensionBody::None,
                ExtensionBody::Binary(b) => ExtensionBody::Binary(b.try_clone()?),
                ExtensionBody::Xml(x) => ExtensionBody::Xml(x.try_clone()?),
            },
        },
        ExtensionObject::Decoded { data_type, value } => ExtensionObject::Decoded {
            data_type: std::sync::Arc::clone(data_type),
            value: Box::new(copy(value, data_type)?),
        },
    })
}

fn copy_data_value(dv: &DataValue) -> UaResult<DataValue> {
    Ok(DataValue {
        value: dv.value.as_ref().map(copy_variant).transpose()?,
        ..data_value_metadata(dv)
    })
}

pub(crate) fn copy_variant(v: &Variant) -> UaResult<Variant> {
    v.try_clone()
}

pub(crate) fn copy_diagnostic_info(d: &DiagnosticInfo) -> UaResult<DiagnosticInfo> {
    Ok(DiagnosticInfo {
        symbolic_id: d.symbolic_id,
        namespace_uri: d.namespace_uri,
        locale: d.locale,
        localized_text: d.localized_text,
        additional_info: d.additional_info.as_ref().map(UaString::try_clone).transpose()?,
        inner_status_code: d.inner_status_code,
        inner_diagnostic_info: match &d.inner_diagnostic_info {
            Some(inner) => Some(Box::new(copy_diagnostic_info(inner)?)),
            None => None,
        },
    })
}

/// Everything but the value.
fn data_value_metadata(dv: &DataValue) -> DataValue {
    DataValue {
        value: None,
        status: dv.status,
        source_timestamp: dv.source_timestamp,
        source_picoseconds: dv.source_picoseconds,
        server_timestamp: dv.server_timestamp,
        server_picoseconds: dv.server_picoseconds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{catalog, DataTypeBuilder};
    use std::sync::Arc;

    fn read_value_id() -> Arc<DataType> {
        Arc::clone(catalog().find_by_name("ReadValueId").expect("ReadValueId"))
    }

    #[test]
    fn test_init_structure() {
        let ty = read_value_id();
        let value = init(&ty);
        let s = value.as_struct().expect("struct");
        assert_eq!(s.fields.len(), 4);
        assert_eq!(s.scalar(&ty, "NodeId"), Some(&Value::NodeId(NodeId::null())));
        assert_eq!(s.scalar(&ty, "IndexRange"), Some(&Value::String(UaString::null())));
        assert!(check_value(&value, &ty).is_ok());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let ty = read_value_id();
        let mut value = init(&ty);
        if let Some(Field::Scalar(v)) = value.as_struct_mut().and_then(|s| s.fields.get_mut(0)) {
            *v = Value::NodeId(NodeId::string(2, "Temperature"));
        }
        clear(&mut value, &ty);
        let once = value.clone();
        clear(&mut value, &ty);
        assert_eq!(value, once);
        assert_eq!(value, init(&ty));
    }

    #[test]
    fn test_copy_is_independent() {
        let bt = &catalog().builtins;
        let ty = DataTypeBuilder::structure("Tagged", NodeId::numeric(1, 1))
            .field("Name", &bt.string)
            .array_field("Tags", &bt.string)
            .build()
            .expect("build");
        let src = Value::Structure(StructValue::new(vec![
            Field::Scalar(Value::from("pump")),
            Field::Array(Some(vec![Value::from("a"), Value::from("b")])),
        ]));
        let mut dst = copy(&src, &ty).expect("copy");
        if let Some(Field::Array(Some(tags))) = dst.as_struct_mut().and_then(|s| s.fields.get_mut(1)) {
            tags[0] = Value::from("changed");
        }
        clear(&mut dst, &ty);
        let s = src.as_struct().expect("struct");
        assert_eq!(s.array(&ty, "Tags").map(<[Value]>::len), Some(2));
        assert_eq!(s.array(&ty, "Tags").and_then(|t| t[0].as_str()), Some("a"));
    }

    #[test]
    fn test_copy_into_resets_on_failure() {
        let ty = read_value_id();
        let mut dst = Value::Int32(7);
        let result = copy_into(&Value::Boolean(true), &mut dst, &ty);
        assert_eq!(result, Err(StatusCode::BAD_TYPE_MISMATCH));
        assert_eq!(dst, init(&ty));
    }

    #[test]
    fn test_array_helpers() {
        let bt = &catalog().builtins;
        let mut values = array_new(3, &bt.uint32).expect("new");
        assert_eq!(values, vec![Value::UInt32(0); 3]);
        array_append(&mut values, Value::UInt32(9), &bt.uint32).expect("append");
        assert_eq!(values.len(), 4);
        assert_eq!(
            array_append(&mut values, Value::Int32(1), &bt.uint32),
            Err(StatusCode::BAD_TYPE_MISMATCH)
        );
        array_resize(&mut values, 2, &bt.uint32).expect("shrink");
        array_resize(&mut values, 5, &bt.uint32).expect("grow");
        assert_eq!(values[4], Value::UInt32(0));
        let copied = array_copy(&values, &bt.uint32).expect("copy");
        assert_eq!(copied, values);
        array_delete(copied);
    }

    #[test]
    fn test_array_copy_is_all_or_nothing() {
        let bt = &catalog().builtins;
        let mixed = vec![Value::from("ok"), Value::UInt32(1)];
        assert_eq!(array_copy(&mixed, &bt.string), Err(StatusCode::BAD_TYPE_MISMATCH));
    }

    #[test]
    fn test_check_value_reports_missing_fields() {
        let ty = read_value_id();
        let short = Value::Structure(StructValue::new(vec![Field::Scalar(Value::NodeId(NodeId::null()))]));
        assert_eq!(check_value(&short, &ty), Err(StatusCode::BAD_INVALID_ARGUMENT));

        let mut absent = init(&ty);
        if let Some(s) = absent.as_struct_mut() {
            s.fields[2] = Field::Absent;
        }
        assert_eq!(check_value(&absent, &ty), Err(StatusCode::BAD_INVALID_ARGUMENT));

        let mut wrong = init(&ty);
        if let Some(s) = wrong.as_struct_mut() {
            s.fields[1] = Field::Scalar(Value::Int64(13));
        }
        assert_eq!(check_value(&wrong, &ty), Err(StatusCode::BAD_TYPE_MISMATCH));
    }

    #[test]
    fn test_union_copy_and_check() {
        let bt = &catalog().builtins;
        let ty = DataTypeBuilder::union("Choice", NodeId::numeric(1, 20))
            .field("Number", &bt.int32)
            .array_field("Names", &bt.string)
            .build()
            .expect("build");
        let value = Value::Union(UnionValue {
            switch: 2,
            value: Some(Box::new(Field::Array(Some(vec![Value::from("x")])))),
        });
        assert!(check_value(&value, &ty).is_ok());
        assert_eq!(copy(&value, &ty).expect("copy"), value);

        let dangling = Value::Union(UnionValue {
            switch: 3,
            value: Some(Box::new(Field::Scalar(Value::Int32(1)))),
        });
        assert_eq!(check_value(&dangling, &ty), Err(StatusCode::BAD_INVALID_ARGUMENT));
    }

    #[test]
    fn test_numeric_predicate() {
        let bt = &catalog().builtins;
        assert!(bt.boolean.is_numeric());
        assert!(bt.float.is_numeric());
        assert!(!bt.date_time.is_numeric());
        assert!(!bt.status_code.is_numeric());
        assert!(!bt.string.is_numeric());
    }
}

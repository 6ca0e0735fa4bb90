// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generic values.
//!
//! A [`Value`] is interpreted against a [`DataType`]: the descriptor says how
//! many fields a structure has and which of them are arrays, the value only
//! holds the data. Keeping the two apart lets one descriptor graph describe
//! many values without duplicating metadata in each of them.

use std::fmt;

use super::{
    ByteString, DataType, DataValue, DateTime, DiagnosticInfo, ExpandedNodeId, ExtensionObject,
    Guid, LocalizedText, NodeId, QualifiedName, StatusCode, TypeKind, UaString, Variant,
};

/// A value of any type that a [`DataType`] can describe.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    SByte(i8),
    Byte(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(UaString),
    DateTime(DateTime),
    Guid(Guid),
    ByteString(ByteString),
    XmlElement(UaString),
    NodeId(NodeId),
    ExpandedNodeId(ExpandedNodeId),
    StatusCode(StatusCode),
    QualifiedName(QualifiedName),
    LocalizedText(LocalizedText),
    ExtensionObject(ExtensionObject),
    DataValue(Box<DataValue>),
    Variant(Box<Variant>),
    DiagnosticInfo(DiagnosticInfo),
    Enum(i32),
    Structure(StructValue),
    Union(UnionValue),
}

/// Field values of a structure, in member order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructValue {
    pub fields: Vec<Field>,
}

/// One structure field.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Scalar(Value),
    /// `None` is the null array (wire length `-1`), distinct from `Some(vec![])`.
    Array(Option<Vec<Value>>),
    /// Optional member that is not present.
    Absent,
}

/// Union value: `switch` 0 selects nothing, `k` selects member `k - 1`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnionValue {
    pub switch: u32,
    pub value: Option<Box<Field>>,
}

impl Value {
    /// Builtin kind of this value, `None` for enums, structures and unions.
    pub fn builtin_kind(&self) -> Option<TypeKind> {
        let kind = match self {
            Value::Boolean(_) => TypeKind::Boolean,
            Value::SByte(_) => TypeKind::SByte,
            Value::Byte(_) => TypeKind::Byte,
            Value::Int16(_) => TypeKind::Int16,
            Value::UInt16(_) => TypeKind::UInt16,
            Value::Int32(_) => TypeKind::Int32,
            Value::UInt32(_) => TypeKind::UInt32,
            Value::Int64(_) => TypeKind::Int64,
            Value::UInt64(_) => TypeKind::UInt64,
            Value::Float(_) => TypeKind::Float,
            Value::Double(_) => TypeKind::Double,
            Value::String(_) => TypeKind::String,
            Value::DateTime(_) => TypeKind::DateTime,
            Value::Guid(_) => TypeKind::Guid,
            Value::ByteString(_) => TypeKind::ByteString,
            Value::XmlElement(_) => TypeKind::XmlElement,
            Value::NodeId(_) => TypeKind::NodeId,
            Value::ExpandedNodeId(_) => TypeKind::ExpandedNodeId,
            Value::StatusCode(_) => TypeKind::StatusCode,
            Value::QualifiedName(_) => TypeKind::QualifiedName,
            Value::LocalizedText(_) => TypeKind::LocalizedText,
            Value::ExtensionObject(_) => TypeKind::ExtensionObject,
            Value::DataValue(_) => TypeKind::DataValue,
            Value::Variant(_) => TypeKind::Variant,
            Value::DiagnosticInfo(_) => TypeKind::DiagnosticInfo,
            Value::Enum(_) | Value::Structure(_) | Value::Union(_) => return None,
        };
        Some(kind)
    }

    /// Whether the value's shape fits a type kind (members are not inspected).
    pub fn fits_kind(&self, kind: TypeKind) -> bool {
        match (self, kind) {
            (Value::Enum(_), TypeKind::Enum) => true,
            (Value::Structure(_), TypeKind::Structure | TypeKind::OptStruct) => true,
            (Value::Union(_), TypeKind::Union) => true,
            _ => self.builtin_kind() == Some(kind),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::UInt32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) | Value::Enum(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            Value::Float(v) => Some(f64::from(*v)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::XmlElement(s) => s.as_str(),
            _ => None,
        }
    }

    pub fn as_node_id(&self) -> Option<&NodeId> {
        match self {
            Value::NodeId(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Structure(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_struct_mut(&mut self) -> Option<&mut StructValue> {
        match self {
            Value::Structure(s) => Some(s),
            _ => None,
        }
    }
}

impl StructValue {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Field by member name, resolved through the descriptor.
    pub fn get<'a>(&'a self, ty: &DataType, name: &str) -> Option<&'a Field> {
        ty.member_index(name).and_then(|idx| self.fields.get(idx))
    }

    pub fn get_mut<'a>(&'a mut self, ty: &DataType, name: &str) -> Option<&'a mut Field> {
        ty.member_index(name).and_then(move |idx| self.fields.get_mut(idx))
    }

    /// Scalar field value by member name.
    pub fn scalar<'a>(&'a self, ty: &DataType, name: &str) -> Option<&'a Value> {
        match self.get(ty, name)? {
            Field::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Array field elements by member name; `None` also for the null array.
    pub fn array<'a>(&'a self, ty: &DataType, name: &str) -> Option<&'a [Value]> {
        match self.get(ty, name)? {
            Field::Array(Some(values)) => Some(values),
            _ => None,
        }
    }
}

impl Field {
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Field::Scalar(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_for_value! {
    bool => Boolean,
    i8 => SByte,
    u8 => Byte,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float,
    f64 => Double,
    UaString => String,
    DateTime => DateTime,
    Guid => Guid,
    ByteString => ByteString,
    NodeId => NodeId,
    ExpandedNodeId => ExpandedNodeId,
    StatusCode => StatusCode,
    QualifiedName => QualifiedName,
    LocalizedText => LocalizedText,
    ExtensionObject => ExtensionObject,
    DiagnosticInfo => DiagnosticInfo,
    StructValue => Structure,
    UnionValue => Union,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(UaString::from(v))
    }
}

impl From<Variant> for Value {
    fn from(v: Variant) -> Self {
        Value::Variant(Box::new(v))
    }
}

impl From<DataValue> for Value {
    fn from(v: DataValue) -> Self {
        Value::DataValue(Box::new(v))
    }
}

impl From<Value> for Field {
    fn from(v: Value) -> Self {
        Field::Scalar(v)
    }
}

impl From<Vec<Value>> for Field {
    fn from(v: Vec<Value>) -> Self {
        Field::Array(Some(v))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(v) => write!(f, "{}", v),
            Value::SByte(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::UInt16(v) => write!(f, "{}", v),
            Value::Int32(v) | Value::Enum(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::UInt64(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(v) | Value::XmlElement(v) => write!(f, "{:?}", v),
            Value::DateTime(v) => write!(f, "{}", v),
            Value::Guid(v) => write!(f, "{}", v),
            Value::ByteString(v) => write!(f, "{}", v),
            Value::NodeId(v) => write!(f, "{}", v),
            Value::ExpandedNodeId(v) => write!(f, "{}", v),
            Value::StatusCode(v) => write!(f, "{}", v),
            Value::QualifiedName(v) => write!(f, "{}", v),
            Value::LocalizedText(v) => write!(f, "{}", v),
            Value::ExtensionObject(v) => write!(f, "{}", v),
            Value::DataValue(v) => write!(f, "DataValue({:?})", v.value),
            Value::Variant(v) => write!(f, "{}", v),
            Value::DiagnosticInfo(v) => write!(f, "{:?}", v),
            Value::Structure(s) => write!(f, "{{{} fields}}", s.fields.len()),
            Value::Union(u) => write!(f, "union(switch={})", u.switch),
        }
    }
}

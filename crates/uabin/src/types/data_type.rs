// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type descriptors.
//!
//! A [`DataType`] describes one builtin, enumeration, structure or union type
//! well enough for the generic runtime and the binary codec to handle its
//! values without per-type code. Structure members reference their own
//! descriptor through an `Arc`, so a descriptor graph is built bottom-up and
//! shared freely between threads once constructed.

use std::fmt;
use std::sync::Arc;

use super::NodeId;

/// Discriminator selecting the handling routine for a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Boolean,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float,
    Double,
    String,
    DateTime,
    Guid,
    ByteString,
    XmlElement,
    NodeId,
    ExpandedNodeId,
    StatusCode,
    QualifiedName,
    LocalizedText,
    ExtensionObject,
    DataValue,
    Variant,
    DiagnosticInfo,
    /// Enumeration, encoded as Int32.
    Enum,
    /// Structure with mandatory members.
    Structure,
    /// Structure with optional members selected by a 32-bit mask.
    OptStruct,
    /// Union selected by a 32-bit switch field.
    Union,
}

/// Builtin kinds in wire id order (id = index + 1).
const BUILTIN_KINDS: [TypeKind; 25] = [
    TypeKind::Boolean,
    TypeKind::SByte,
    TypeKind::Byte,
    TypeKind::Int16,
    TypeKind::UInt16,
    TypeKind::Int32,
    TypeKind::UInt32,
    TypeKind::Int64,
    TypeKind::UInt64,
    TypeKind::Float,
    TypeKind::Double,
    TypeKind::String,
    TypeKind::DateTime,
    TypeKind::Guid,
    TypeKind::ByteString,
    TypeKind::XmlElement,
    TypeKind::NodeId,
    TypeKind::ExpandedNodeId,
    TypeKind::StatusCode,
    TypeKind::QualifiedName,
    TypeKind::LocalizedText,
    TypeKind::ExtensionObject,
    TypeKind::DataValue,
    TypeKind::Variant,
    TypeKind::DiagnosticInfo,
];

impl TypeKind {
    /// Builtin type id (1..=25) used in Variant encoding masks.
    pub fn builtin_id(&self) -> Option<u8> {
        BUILTIN_KINDS
            .iter()
            .position(|k| k == self)
            .map(|idx| (idx + 1) as u8)
    }

    pub fn from_builtin_id(id: u8) -> Option<TypeKind> {
        if id == 0 {
            return None;
        }
        BUILTIN_KINDS.get(usize::from(id) - 1).copied()
    }

    pub fn all_builtins() -> &'static [TypeKind] {
        &BUILTIN_KINDS
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin_id().is_some()
    }

    /// Structure, optional-field structure or union.
    pub fn is_structured(&self) -> bool {
        matches!(self, TypeKind::Structure | TypeKind::OptStruct | TypeKind::Union)
    }

    /// Protocol-level numeric classification.
    ///
    /// DateTime and StatusCode are integers on the wire but are not numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TypeKind::Boolean
                | TypeKind::SByte
                | TypeKind::Byte
                | TypeKind::Int16
                | TypeKind::UInt16
                | TypeKind::Int32
                | TypeKind::UInt32
                | TypeKind::Int64
                | TypeKind::UInt64
                | TypeKind::Float
                | TypeKind::Double
        )
    }

    /// Encoded size for fixed-width kinds.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            TypeKind::Boolean | TypeKind::SByte | TypeKind::Byte => Some(1),
            TypeKind::Int16 | TypeKind::UInt16 => Some(2),
            TypeKind::Int32
            | TypeKind::UInt32
            | TypeKind::Float
            | TypeKind::StatusCode
            | TypeKind::Enum => Some(4),
            TypeKind::Int64 | TypeKind::UInt64 | TypeKind::Double | TypeKind::DateTime => Some(8),
            TypeKind::Guid => Some(16),
            _ => None,
        }
    }
}

/// One member of a structured type.
#[derive(Clone)]
pub struct DataTypeMember {
    pub name: String,
    pub member_type: Arc<DataType>,
    pub is_array: bool,
    /// Only meaningful for [`TypeKind::OptStruct`] members.
    pub is_optional: bool,
}

impl DataTypeMember {
    pub fn scalar(name: impl Into<String>, member_type: &Arc<DataType>) -> Self {
        Self {
            name: name.into(),
            member_type: Arc::clone(member_type),
            is_array: false,
            is_optional: false,
        }
    }

    pub fn array(name: impl Into<String>, member_type: &Arc<DataType>) -> Self {
        Self {
            is_array: true,
            ..Self::scalar(name, member_type)
        }
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }
}

impl fmt::Debug for DataTypeMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.member_type.name)?;
        if self.is_array {
            f.write_str("[]")?;
        }
        if self.is_optional {
            f.write_str("?")?;
        }
        Ok(())
    }
}

/// A complete type descriptor.
pub struct DataType {
    pub name: String,
    pub type_id: NodeId,
    /// Id tagging the binary form inside an ExtensionObject. Null for builtins.
    pub binary_encoding_id: NodeId,
    pub kind: TypeKind,
    pub members: Vec<DataTypeMember>,
    pointer_free: bool,
    overlayable: bool,
}

impl DataType {
    pub fn new(
        name: impl Into<String>,
        type_id: NodeId,
        binary_encoding_id: NodeId,
        kind: TypeKind,
        members: Vec<DataTypeMember>,
    ) -> Self {
        let pointer_free = compute_pointer_free(kind, &members);
        let overlayable = compute_overlayable(kind, &members);
        Self {
            name: name.into(),
            type_id,
            binary_encoding_id,
            kind,
            members,
            pointer_free,
            overlayable,
        }
    }

    /// No member (transitively) owns heap memory.
    pub fn pointer_free(&self) -> bool {
        self.pointer_free
    }

    /// Wire layout is a plain concatenation of little-endian fixed-width
    /// fields and the host is little-endian.
    pub fn overlayable(&self) -> bool {
        self.overlayable
    }

    pub fn is_numeric(&self) -> bool {
        self.kind.is_numeric()
    }

    pub fn is_structured(&self) -> bool {
        self.kind.is_structured()
    }

    pub fn member_index(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m.name == name)
    }

    pub fn member(&self, name: &str) -> Option<&DataTypeMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Encoded size of one instance, for overlayable types only.
    pub fn fixed_wire_size(&self) -> Option<usize> {
        if !self.overlayable {
            return None;
        }
        if self.kind == TypeKind::Structure {
            return self
                .members
                .iter()
                .map(|m| m.member_type.fixed_wire_size())
                .sum();
        }
        self.kind.fixed_size()
    }

    /// Lower bound on the encoded size of one instance.
    ///
    /// The decoder multiplies claimed array lengths by this before
    /// allocating anything.
    pub fn min_wire_size(&self) -> usize {
        if let Some(size) = self.kind.fixed_size() {
            return size;
        }
        match self.kind {
            TypeKind::String | TypeKind::ByteString | TypeKind::XmlElement => 4,
            TypeKind::NodeId | TypeKind::ExpandedNodeId => 2,
            TypeKind::QualifiedName => 6,
            TypeKind::LocalizedText
            | TypeKind::DataValue
            | TypeKind::Variant
            | TypeKind::DiagnosticInfo => 1,
            TypeKind::ExtensionObject => 3,
            TypeKind::Structure => self
                .members
                .iter()
                .map(|m| if m.is_array { 4 } else { m.member_type.min_wire_size() })
                .sum(),
            TypeKind::OptStruct => {
                4 + self
                    .members
                    .iter()
                    .filter(|m| !m.is_optional)
                    .map(|m| if m.is_array { 4 } else { m.member_type.min_wire_size() })
                    .sum::<usize>()
            }
            TypeKind::Union => 4,
            _ => 1,
        }
    }
}

fn compute_pointer_free(kind: TypeKind, members: &[DataTypeMember]) -> bool {
    match kind {
        TypeKind::Structure => members
            .iter()
            .all(|m| !m.is_array && m.member_type.pointer_free()),
        TypeKind::OptStruct | TypeKind::Union => false,
        other => other.fixed_size().is_some(),
    }
}

fn compute_overlayable(kind: TypeKind, members: &[DataTypeMember]) -> bool {
    if !cfg!(target_endian = "little") {
        return false;
    }
    match kind {
        TypeKind::Structure => {
            !members.is_empty()
                && members
                    .iter()
                    .all(|m| !m.is_array && !m.is_optional && m.member_type.overlayable())
        }
        TypeKind::OptStruct | TypeKind::Union => false,
        other => other.fixed_size().is_some(),
    }
}

impl PartialEq for DataType {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
            || (self.kind == other.kind
                && self.type_id == other.type_id
                && self.binary_encoding_id == other.binary_encoding_id
                && self.name == other.name
                && self.members.len() == other.members.len())
    }
}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("DataType");
        s.field("name", &self.name)
            .field("type_id", &format_args!("{}", self.type_id))
            .field("kind", &self.kind);
        if !self.members.is_empty() {
            s.field("members", &self.members);
        }
        s.finish()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

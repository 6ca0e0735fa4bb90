// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for custom DataType descriptors.

use std::collections::HashSet;
use std::sync::Arc;

use super::data_type::{DataType, DataTypeMember, TypeKind};
use super::{NodeId, StatusCode, UaResult};

/// Builder for structure, optional-field structure, union and enumeration
/// descriptors outside namespace zero.
#[derive(Debug)]
pub struct DataTypeBuilder {
    name: String,
    type_id: NodeId,
    binary_encoding_id: NodeId,
    kind: TypeKind,
    members: Vec<DataTypeMember>,
}

impl DataTypeBuilder {
    fn new(name: impl Into<String>, type_id: NodeId, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            type_id,
            binary_encoding_id: NodeId::null(),
            kind,
            members: Vec::new(),
        }
    }

    /// Create a builder for a structure type.
    pub fn structure(name: impl Into<String>, type_id: NodeId) -> Self {
        Self::new(name, type_id, TypeKind::Structure)
    }

    /// Structure whose optional members are selected by an encoding mask.
    pub fn optional_structure(name: impl Into<String>, type_id: NodeId) -> Self {
        Self::new(name, type_id, TypeKind::OptStruct)
    }

    pub fn union(name: impl Into<String>, type_id: NodeId) -> Self {
        Self::new(name, type_id, TypeKind::Union)
    }

    pub fn enumeration(name: impl Into<String>, type_id: NodeId) -> Self {
        Self::new(name, type_id, TypeKind::Enum)
    }

    /// Id used to tag the binary body inside an ExtensionObject.
    pub fn binary_encoding_id(mut self, id: NodeId) -> Self {
        self.binary_encoding_id = id;
        self
    }

    /// Add a scalar field.
    pub fn field(mut self, name: impl Into<String>, ty: &Arc<DataType>) -> Self {
        self.members.push(DataTypeMember::scalar(name, ty));
        self
    }

    /// Add an array field.
    pub fn array_field(mut self, name: impl Into<String>, ty: &Arc<DataType>) -> Self {
        self.members.push(DataTypeMember::array(name, ty));
        self
    }

    /// Add an optional scalar field (optional-field structures only).
    pub fn optional_field(mut self, name: impl Into<String>, ty: &Arc<DataType>) -> Self {
        self.members.push(DataTypeMember::scalar(name, ty).optional());
        self
    }

    /// Add an optional array field (optional-field structures only).
    pub fn optional_array_field(mut self, name: impl Into<String>, ty: &Arc<DataType>) -> Self {
        self.members.push(DataTypeMember::array(name, ty).optional());
        self
    }

    /// Build the descriptor.
    ///
    /// Rejects duplicate member names, members on enumerations, empty unions,
    /// optional members outside optional-field structures and more than 32
    /// optional members.
    pub fn build(self) -> UaResult<Arc<DataType>> {
        let mut names = HashSet::new();
        for member in &self.members {
            if !names.insert(member.name.as_str()) {
                log::debug!("[builder] {}: duplicate member {}", self.name, member.name);
                return Err(StatusCode::BAD_INVALID_ARGUMENT);
            }
        }

        let optional = self.members.iter().filter(|m| m.is_optional).count();
        let valid = match self.kind {
            TypeKind::Enum => self.members.is_empty(),
            TypeKind::Structure => optional == 0,
            TypeKind::OptStruct => optional <= 32,
            TypeKind::Union => !self.members.is_empty() && optional == 0,
            _ => false,
        };
        if !valid {
            log::debug!("[builder] {}: invalid member layout for {:?}", self.name, self.kind);
            return Err(StatusCode::BAD_INVALID_ARGUMENT);
        }

        Ok(Arc::new(DataType::new(
            self.name,
            self.type_id,
            self.binary_encoding_id,
            self.kind,
            self.members,
        )))
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type lookup for the codec: the namespace-zero catalog plus custom types.

use std::collections::HashMap;
use std::sync::Arc;

use super::catalog::{catalog, TypeCatalog};
use super::{DataType, NodeId, StatusCode, TypeKind, UaResult};

/// Resolves descriptors by type id and by binary encoding id.
///
/// Custom types are registered during setup; the table is then shared
/// read-only (typically behind an `Arc`).
pub struct TypeTable {
    catalog: &'static TypeCatalog,
    by_type_id: HashMap<NodeId, Arc<DataType>>,
    by_encoding_id: HashMap<NodeId, Arc<DataType>>,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeTable {
    pub fn new() -> Self {
        Self {
            catalog: catalog(),
            by_type_id: HashMap::new(),
            by_encoding_id: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> &'static TypeCatalog {
        self.catalog
    }

    /// Register a custom type and, recursively, any custom member types not
    /// yet known.
    ///
    /// Fails with `BadInvalidArgument` for builtin kinds and for ids that
    /// are already taken by a different type.
    pub fn register(&mut self, ty: Arc<DataType>) -> UaResult<()> {
        if ty.kind.is_builtin() {
            return Err(StatusCode::BAD_INVALID_ARGUMENT);
        }
        for member in &ty.members {
            let member_ty = &member.member_type;
            if !member_ty.kind.is_builtin() && self.find_by_type_id(&member_ty.type_id).is_none() {
                self.register(Arc::clone(member_ty))?;
            }
        }
        if let Some(existing) = self.find_by_type_id(&ty.type_id) {
            if *existing == *ty {
                return Ok(());
            }
            log::debug!("[types] type id {} already used by {}", ty.type_id, existing.name);
            return Err(StatusCode::BAD_INVALID_ARGUMENT);
        }
        if !ty.binary_encoding_id.is_null() && self.find_by_encoding_id(&ty.binary_encoding_id).is_some() {
            log::debug!("[types] encoding id {} already registered", ty.binary_encoding_id);
            return Err(StatusCode::BAD_INVALID_ARGUMENT);
        }

        log::debug!("[types] registered {} ({})", ty.name, ty.type_id);
        if !ty.binary_encoding_id.is_null() {
            self.by_encoding_id
                .insert(ty.binary_encoding_id.clone(), Arc::clone(&ty));
        }
        self.by_type_id.insert(ty.type_id.clone(), ty);
        Ok(())
    }

    pub fn find_by_type_id(&self, id: &NodeId) -> Option<Arc<DataType>> {
        self.catalog
            .find_by_type_id(id)
            .or_else(|| self.by_type_id.get(id))
            .cloned()
    }

    pub fn find_by_encoding_id(&self, id: &NodeId) -> Option<Arc<DataType>> {
        self.catalog
            .find_by_encoding_id(id)
            .or_else(|| self.by_encoding_id.get(id))
            .cloned()
    }

    pub fn builtin(&self, kind: TypeKind) -> Option<Arc<DataType>> {
        self.catalog.builtins.get(kind).cloned()
    }

    pub fn builtin_by_id(&self, id: u8) -> Option<Arc<DataType>> {
        self.catalog.builtins.by_id(id).cloned()
    }

    /// Number of custom types.
    pub fn custom_len(&self) -> usize {
        self.by_type_id.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataTypeBuilder;

    #[test]
    fn test_register_custom_type() {
        let mut table = TypeTable::new();
        let cat = table.catalog();
        let point = DataTypeBuilder::structure("Point", NodeId::numeric(2, 100))
            .binary_encoding_id(NodeId::numeric(2, 101))
            .field("X", &cat.builtins.double)
            .field("Y", &cat.builtins.double)
            .build()
            .expect("build");

        table.register(Arc::clone(&point)).expect("register");
        assert_eq!(table.custom_len(), 1);
        assert_eq!(
            table.find_by_encoding_id(&NodeId::numeric(2, 101)).map(|t| t.name.clone()),
            Some("Point".to_string())
        );
        // Idempotent for the same descriptor.
        table.register(point).expect("re-register");
        assert_eq!(table.custom_len(), 1);
    }

    #[test]
    fn test_register_rejects_collisions() {
        let mut table = TypeTable::new();
        let cat = table.catalog();
        let clash = DataTypeBuilder::structure("NotReadValueId", NodeId::ns0(626))
            .field("X", &cat.builtins.int32)
            .build()
            .expect("build");
        assert_eq!(table.register(clash), Err(StatusCode::BAD_INVALID_ARGUMENT));

        let builtin = Arc::clone(&cat.builtins.int32);
        assert_eq!(table.register(builtin), Err(StatusCode::BAD_INVALID_ARGUMENT));
    }

    #[test]
    fn test_register_pulls_in_member_types() {
        let mut table = TypeTable::new();
        let cat = table.catalog();
        let inner = DataTypeBuilder::structure("Inner", NodeId::numeric(3, 1))
            .binary_encoding_id(NodeId::numeric(3, 2))
            .field("A", &cat.builtins.uint16)
            .build()
            .expect("inner");
        let outer = DataTypeBuilder::structure("Outer", NodeId::numeric(3, 3))
            .binary_encoding_id(NodeId::numeric(3, 4))
            .array_field("Items", &inner)
            .build()
            .expect("outer");
        table.register(outer).expect("register");
        assert!(table.find_by_type_id(&NodeId::numeric(3, 1)).is_some());
        assert_eq!(table.custom_len(), 2);
    }
}

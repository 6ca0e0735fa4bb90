// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Service table.
//!
//! One entry per service, built once from the namespace-zero catalog and
//! read-only afterwards. Lookups are linear scans.

use std::sync::{Arc, OnceLock};

use super::ServiceId;
use crate::types::{catalog, DataType, DataTypeMember, NodeId};

static TABLE: OnceLock<ServiceTable> = OnceLock::new();

/// The process-wide service table.
pub fn service_table() -> &'static ServiceTable {
    TABLE.get_or_init(ServiceTable::build)
}

/// Binds a request type to its response type.
#[derive(Debug, Clone)]
pub struct ServiceType {
    pub id: ServiceId,
    pub request_type: Arc<DataType>,
    pub response_type: Arc<DataType>,
}

impl ServiceType {
    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    pub fn request_type_id(&self) -> &NodeId {
        &self.request_type.type_id
    }

    pub fn request_encoding_id(&self) -> &NodeId {
        &self.request_type.binary_encoding_id
    }

    pub fn response_encoding_id(&self) -> &NodeId {
        &self.response_type.binary_encoding_id
    }
}

pub struct ServiceTable {
    entries: Vec<ServiceType>,
}

impl ServiceTable {
    fn build() -> Self {
        let entries = catalog()
            .services
            .iter()
            .map(|s| ServiceType {
                id: s.id,
                request_type: Arc::clone(&s.request),
                response_type: Arc::clone(&s.response),
            })
            .collect::<Vec<_>>();
        log::debug!("[service] table built with {} entries", entries.len());
        Self { entries }
    }

    pub fn entries(&self) -> &[ServiceType] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: ServiceId) -> Option<&ServiceType> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entry whose request structure has type id `id`.
    pub fn find_by_request_type(&self, id: &NodeId) -> Option<&ServiceType> {
        self.entries.iter().find(|e| e.request_type_id() == id)
    }

    /// Entry whose request structure is tagged `id` on the wire.
    pub fn find_by_request_encoding(&self, id: &NodeId) -> Option<&ServiceType> {
        self.entries.iter().find(|e| e.request_encoding_id() == id)
    }

    pub fn find_by_response_encoding(&self, id: &NodeId) -> Option<&ServiceType> {
        self.entries.iter().find(|e| e.response_encoding_id() == id)
    }
}

/// Members of a request or response after the leading header.
pub(crate) fn body_members(ty: &DataType) -> &[DataTypeMember] {
    ty.members.get(1..).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_service_has_an_entry() {
        let table = service_table();
        assert_eq!(table.len(), ServiceId::ALL.len());
        for id in ServiceId::ALL {
            let entry = table.get(id).expect("entry");
            assert_eq!(entry.request_type.name, format!("{}Request", id.name()));
            assert_eq!(entry.response_type.name, format!("{}Response", id.name()));
        }
    }

    #[test]
    fn test_lookups() {
        let table = service_table();
        let read = table.find_by_request_type(&NodeId::ns0(629)).expect("read");
        assert_eq!(read.id, ServiceId::Read);
        assert_eq!(
            table.find_by_request_encoding(&NodeId::ns0(631)).map(|e| e.id),
            Some(ServiceId::Read)
        );
        assert_eq!(
            table.find_by_response_encoding(&NodeId::ns0(634)).map(|e| e.id),
            Some(ServiceId::Read)
        );
        // Type id and encoding id are not interchangeable.
        assert!(table.find_by_request_encoding(&NodeId::ns0(629)).is_none());
        assert!(table.find_by_request_type(&NodeId::ns0(9999)).is_none());
    }

    #[test]
    fn test_body_members_skip_header() {
        let read = service_table().get(ServiceId::Read).expect("read");
        let names: Vec<_> = body_members(&read.request_type)
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, ["MaxAge", "TimestampsToReturn", "NodesToRead"]);
    }
}

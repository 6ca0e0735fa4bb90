// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::fmt;

/// The request/response services of the binary protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceId {
    // Discovery
    FindServers,
    FindServersOnNetwork,
    GetEndpoints,
    RegisterServer,
    RegisterServer2,
    // SecureChannel
    OpenSecureChannel,
    CloseSecureChannel,
    // Session
    CreateSession,
    ActivateSession,
    CloseSession,
    Cancel,
    // NodeManagement
    AddNodes,
    AddReferences,
    DeleteNodes,
    DeleteReferences,
    // View
    Browse,
    BrowseNext,
    TranslateBrowsePathsToNodeIds,
    RegisterNodes,
    UnregisterNodes,
    // Query
    QueryFirst,
    QueryNext,
    // Attribute
    Read,
    HistoryRead,
    Write,
    HistoryUpdate,
    // Method
    Call,
    // MonitoredItem
    CreateMonitoredItems,
    ModifyMonitoredItems,
    SetMonitoringMode,
    SetTriggering,
    DeleteMonitoredItems,
    // Subscription
    CreateSubscription,
    ModifySubscription,
    SetPublishingMode,
    Publish,
    Republish,
    TransferSubscriptions,
    DeleteSubscriptions,
}

impl ServiceId {
    pub const ALL: [ServiceId; 39] = [
        ServiceId::FindServers,
        ServiceId::FindServersOnNetwork,
        ServiceId::GetEndpoints,
        ServiceId::RegisterServer,
        ServiceId::RegisterServer2,
        ServiceId::OpenSecureChannel,
        ServiceId::CloseSecureChannel,
        ServiceId::CreateSession,
        ServiceId::ActivateSession,
        ServiceId::CloseSession,
        ServiceId::Cancel,
        ServiceId::AddNodes,
        ServiceId::AddReferences,
        ServiceId::DeleteNodes,
        ServiceId::DeleteReferences,
        ServiceId::Browse,
        ServiceId::BrowseNext,
        ServiceId::TranslateBrowsePathsToNodeIds,
        ServiceId::RegisterNodes,
        ServiceId::UnregisterNodes,
        ServiceId::QueryFirst,
        ServiceId::QueryNext,
        ServiceId::Read,
        ServiceId::HistoryRead,
        ServiceId::Write,
        ServiceId::HistoryUpdate,
        ServiceId::Call,
        ServiceId::CreateMonitoredItems,
        ServiceId::ModifyMonitoredItems,
        ServiceId::SetMonitoringMode,
        ServiceId::SetTriggering,
        ServiceId::DeleteMonitoredItems,
        ServiceId::CreateSubscription,
        ServiceId::ModifySubscription,
        ServiceId::SetPublishingMode,
        ServiceId::Publish,
        ServiceId::Republish,
        ServiceId::TransferSubscriptions,
        ServiceId::DeleteSubscriptions,
    ];

    /// Service name, the request type name without the `Request` suffix.
    pub fn name(&self) -> &'static str {
        match self {
            ServiceId::FindServers => "FindServers",
            ServiceId::FindServersOnNetwork => "FindServersOnNetwork",
            ServiceId::GetEndpoints => "GetEndpoints",
            ServiceId::RegisterServer => "RegisterServer",
            ServiceId::RegisterServer2 => "RegisterServer2",
            ServiceId::OpenSecureChannel => "OpenSecureChannel",
            ServiceId::CloseSecureChannel => "CloseSecureChannel",
            ServiceId::CreateSession => "CreateSession",
            ServiceId::ActivateSession => "ActivateSession",
            ServiceId::CloseSession => "CloseSession",
            ServiceId::Cancel => "Cancel",
            ServiceId::AddNodes => "AddNodes",
            ServiceId::AddReferences => "AddReferences",
            ServiceId::DeleteNodes => "DeleteNodes",
            ServiceId::DeleteReferences => "DeleteReferences",
            ServiceId::Browse => "Browse",
            ServiceId::BrowseNext => "BrowseNext",
            ServiceId::TranslateBrowsePathsToNodeIds => "TranslateBrowsePathsToNodeIds",
            ServiceId::RegisterNodes => "RegisterNodes",
            ServiceId::UnregisterNodes => "UnregisterNodes",
            ServiceId::QueryFirst => "QueryFirst",
            ServiceId::QueryNext => "QueryNext",
            ServiceId::Read => "Read",
            ServiceId::HistoryRead => "HistoryRead",
            ServiceId::Write => "Write",
            ServiceId::HistoryUpdate => "HistoryUpdate",
            ServiceId::Call => "Call",
            ServiceId::CreateMonitoredItems => "CreateMonitoredItems",
            ServiceId::ModifyMonitoredItems => "ModifyMonitoredItems",
            ServiceId::SetMonitoringMode => "SetMonitoringMode",
            ServiceId::SetTriggering => "SetTriggering",
            ServiceId::DeleteMonitoredItems => "DeleteMonitoredItems",
            ServiceId::CreateSubscription => "CreateSubscription",
            ServiceId::ModifySubscription => "ModifySubscription",
            ServiceId::SetPublishingMode => "SetPublishingMode",
            ServiceId::Publish => "Publish",
            ServiceId::Republish => "Republish",
            ServiceId::TransferSubscriptions => "TransferSubscriptions",
            ServiceId::DeleteSubscriptions => "DeleteSubscriptions",
        }
    }

    /// Secure channel services are answered by the channel layer itself.
    pub fn is_secure_channel(&self) -> bool {
        matches!(self, ServiceId::OpenSecureChannel | ServiceId::CloseSecureChannel)
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

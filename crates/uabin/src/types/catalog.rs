// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Namespace-zero type catalog.
//!
//! Descriptors for the builtin types and for every structure the service set
//! exchanges, with their standard type ids and `DefaultBinary` encoding ids.
//! The catalog is built once on first use and is read-only afterwards.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use super::data_type::{DataType, DataTypeMember, TypeKind};
use super::NodeId;
use crate::service::ServiceId;

static CATALOG: OnceLock<TypeCatalog> = OnceLock::new();

/// The process-wide namespace-zero catalog.
pub fn catalog() -> &'static TypeCatalog {
    CATALOG.get_or_init(TypeCatalog::build)
}

/// Descriptors of the 25 builtin types.
pub struct Builtins {
    pub boolean: Arc<DataType>,
    pub sbyte: Arc<DataType>,
    pub byte: Arc<DataType>,
    pub int16: Arc<DataType>,
    pub uint16: Arc<DataType>,
    pub int32: Arc<DataType>,
    pub uint32: Arc<DataType>,
    pub int64: Arc<DataType>,
    pub uint64: Arc<DataType>,
    pub float: Arc<DataType>,
    pub double: Arc<DataType>,
    pub string: Arc<DataType>,
    pub date_time: Arc<DataType>,
    pub guid: Arc<DataType>,
    pub byte_string: Arc<DataType>,
    pub xml_element: Arc<DataType>,
    pub node_id: Arc<DataType>,
    pub expanded_node_id: Arc<DataType>,
    pub status_code: Arc<DataType>,
    pub qualified_name: Arc<DataType>,
    pub localized_text: Arc<DataType>,
    pub extension_object: Arc<DataType>,
    pub data_value: Arc<DataType>,
    pub variant: Arc<DataType>,
    pub diagnostic_info: Arc<DataType>,
}

impl Builtins {
    fn new() -> Self {
        let b = |kind: TypeKind, name: &str| {
            let id = kind.builtin_id().map_or(0, u32::from);
            Arc::new(DataType::new(name, NodeId::ns0(id), NodeId::null(), kind, Vec::new()))
        };
        Self {
            boolean: b(TypeKind::Boolean, "Boolean"),
            sbyte: b(TypeKind::SByte, "SByte"),
            byte: b(TypeKind::Byte, "Byte"),
            int16: b(TypeKind::Int16, "Int16"),
            uint16: b(TypeKind::UInt16, "UInt16"),
            int32: b(TypeKind::Int32, "Int32"),
            uint32: b(TypeKind::UInt32, "UInt32"),
            int64: b(TypeKind::Int64, "Int64"),
            uint64: b(TypeKind::UInt64, "UInt64"),
            float: b(TypeKind::Float, "Float"),
            double: b(TypeKind::Double, "Double"),
            string: b(TypeKind::String, "String"),
            date_time: b(TypeKind::DateTime, "DateTime"),
            guid: b(TypeKind::Guid, "Guid"),
            byte_string: b(TypeKind::ByteString, "ByteString"),
            xml_element: b(TypeKind::XmlElement, "XmlElement"),
            node_id: b(TypeKind::NodeId, "NodeId"),
            expanded_node_id: b(TypeKind::ExpandedNodeId, "ExpandedNodeId"),
            status_code: b(TypeKind::StatusCode, "StatusCode"),
            qualified_name: b(TypeKind::QualifiedName, "QualifiedName"),
            localized_text: b(TypeKind::LocalizedText, "LocalizedText"),
            extension_object: b(TypeKind::ExtensionObject, "ExtensionObject"),
            data_value: b(TypeKind::DataValue, "DataValue"),
            variant: b(TypeKind::Variant, "Variant"),
            diagnostic_info: b(TypeKind::DiagnosticInfo, "DiagnosticInfo"),
        }
    }

    /// Descriptor for a builtin kind; `None` for enum and structured kinds.
    pub fn get(&self, kind: TypeKind) -> Option<&Arc<DataType>> {
        let ty = match kind {
            TypeKind::Boolean => &self.boolean,
            TypeKind::SByte => &self.sbyte,
            TypeKind::Byte => &self.byte,
            TypeKind::Int16 => &self.int16,
            TypeKind::UInt16 => &self.uint16,
            TypeKind::Int32 => &self.int32,
            TypeKind::UInt32 => &self.uint32,
            TypeKind::Int64 => &self.int64,
            TypeKind::UInt64 => &self.uint64,
            TypeKind::Float => &self.float,
            TypeKind::Double => &self.double,
            TypeKind::String => &self.string,
            TypeKind::DateTime => &self.date_time,
            TypeKind::Guid => &self.guid,
            TypeKind::ByteString => &self.byte_string,
            TypeKind::XmlElement => &self.xml_element,
            TypeKind::NodeId => &self.node_id,
            TypeKind::ExpandedNodeId => &self.expanded_node_id,
            TypeKind::StatusCode => &self.status_code,
            TypeKind::QualifiedName => &self.qualified_name,
            TypeKind::LocalizedText => &self.localized_text,
            TypeKind::ExtensionObject => &self.extension_object,
            TypeKind::DataValue => &self.data_value,
            TypeKind::Variant => &self.variant,
            TypeKind::DiagnosticInfo => &self.diagnostic_info,
            TypeKind::Enum | TypeKind::Structure | TypeKind::OptStruct | TypeKind::Union => {
                return None
            }
        };
        Some(ty)
    }

    pub fn by_id(&self, id: u8) -> Option<&Arc<DataType>> {
        TypeKind::from_builtin_id(id).and_then(|kind| self.get(kind))
    }
}

/// Request and response descriptors of one service.
#[derive(Debug, Clone)]
pub struct ServiceTypes {
    pub id: ServiceId,
    pub request: Arc<DataType>,
    pub response: Arc<DataType>,
}

pub struct TypeCatalog {
    pub builtins: Builtins,
    pub request_header: Arc<DataType>,
    pub response_header: Arc<DataType>,
    pub service_fault: Arc<DataType>,
    pub services: Vec<ServiceTypes>,
    types: Vec<Arc<DataType>>,
    by_type_id: HashMap<NodeId, usize>,
    by_encoding_id: HashMap<NodeId, usize>,
}

impl TypeCatalog {
    /// All non-builtin descriptors, in registration order.
    pub fn types(&self) -> &[Arc<DataType>] {
        &self.types
    }

    pub fn find_by_type_id(&self, id: &NodeId) -> Option<&Arc<DataType>> {
        if let Some(builtin) = id
            .as_ns0()
            .and_then(|v| u8::try_from(v).ok())
            .and_then(|v| self.builtins.by_id(v))
        {
            return Some(builtin);
        }
        self.by_type_id.get(id).map(|&idx| &self.types[idx])
    }

    pub fn find_by_encoding_id(&self, id: &NodeId) -> Option<&Arc<DataType>> {
        self.by_encoding_id.get(id).map(|&idx| &self.types[idx])
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Arc<DataType>> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn service(&self, id: ServiceId) -> Option<&ServiceTypes> {
        self.services.iter().find(|s| s.id == id)
    }

    fn build() -> Self {
        let mut c = CatalogBuilder::new();
        let bt = Builtins::new();

        // Enumerations
        let node_class = c.enumeration("NodeClass", 257);
        let message_security_mode = c.enumeration("MessageSecurityMode", 302);
        let user_token_type = c.enumeration("UserTokenType", 303);
        let application_type = c.enumeration("ApplicationType", 307);
        let security_token_request_type = c.enumeration("SecurityTokenRequestType", 315);
        let browse_direction = c.enumeration("BrowseDirection", 510);
        let filter_operator = c.enumeration("FilterOperator", 576);
        let timestamps_to_return = c.enumeration("TimestampsToReturn", 625);
        let monitoring_mode = c.enumeration("MonitoringMode", 716);

        // Headers
        let request_header = c.structure(
            "RequestHeader",
            389,
            391,
            vec![
                s("AuthenticationToken", &bt.node_id),
                s("Timestamp", &bt.date_time),
                s("RequestHandle", &bt.uint32),
                s("ReturnDiagnostics", &bt.uint32),
                s("AuditEntryId", &bt.string),
                s("TimeoutHint", &bt.uint32),
                s("AdditionalHeader", &bt.extension_object),
            ],
        );
        let response_header = c.structure(
            "ResponseHeader",
            392,
            394,
            vec![
                s("Timestamp", &bt.date_time),
                s("RequestHandle", &bt.uint32),
                s("ServiceResult", &bt.status_code),
                s("ServiceDiagnostics", &bt.diagnostic_info),
                a("StringTable", &bt.string),
                s("AdditionalHeader", &bt.extension_object),
            ],
        );
        let service_fault = c.structure(
            "ServiceFault",
            395,
            397,
            vec![s("ResponseHeader", &response_header)],
        );

        // Discovery
        let application_description = c.structure(
            "ApplicationDescription",
            308,
            310,
            vec![
                s("ApplicationUri", &bt.string),
                s("ProductUri", &bt.string),
                s("ApplicationName", &bt.localized_text),
                s("ApplicationType", &application_type),
                s("GatewayServerUri", &bt.string),
                s("DiscoveryProfileUri", &bt.string),
                a("DiscoveryUrls", &bt.string),
            ],
        );
        let user_token_policy = c.structure(
            "UserTokenPolicy",
            304,
            306,
            vec![
                s("PolicyId", &bt.string),
                s("TokenType", &user_token_type),
                s("IssuedTokenType", &bt.string),
                s("IssuerEndpointUrl", &bt.string),
                s("SecurityPolicyUri", &bt.string),
            ],
        );
        let endpoint_description = c.structure(
            "EndpointDescription",
            312,
            314,
            vec![
                s("EndpointUrl", &bt.string),
                s("Server", &application_description),
                s("ServerCertificate", &bt.byte_string),
                s("SecurityMode", &message_security_mode),
                s("SecurityPolicyUri", &bt.string),
                a("UserIdentityTokens", &user_token_policy),
                s("TransportProfileUri", &bt.string),
                s("SecurityLevel", &bt.byte),
            ],
        );
        let server_on_network = c.structure(
            "ServerOnNetwork",
            12189,
            12207,
            vec![
                s("RecordId", &bt.uint32),
                s("ServerName", &bt.string),
                s("DiscoveryUrl", &bt.string),
                a("ServerCapabilities", &bt.string),
            ],
        );
        let registered_server = c.structure(
            "RegisteredServer",
            432,
            434,
            vec![
                s("ServerUri", &bt.string),
                s("ProductUri", &bt.string),
                a("ServerNames", &bt.localized_text),
                s("ServerType", &application_type),
                s("GatewayServerUri", &bt.string),
                a("DiscoveryUrls", &bt.string),
                s("SemaphoreFilePath", &bt.string),
                s("IsOnline", &bt.boolean),
            ],
        );

        // SecureChannel and Session
        let channel_security_token = c.structure(
            "ChannelSecurityToken",
            441,
            443,
            vec![
                s("ChannelId", &bt.uint32),
                s("TokenId", &bt.uint32),
                s("CreatedAt", &bt.date_time),
                s("RevisedLifetime", &bt.uint32),
            ],
        );
        let signed_software_certificate = c.structure(
            "SignedSoftwareCertificate",
            344,
            346,
            vec![
                s("CertificateData", &bt.byte_string),
                s("Signature", &bt.byte_string),
            ],
        );
        let signature_data = c.structure(
            "SignatureData",
            456,
            458,
            vec![s("Algorithm", &bt.string), s("Signature", &bt.byte_string)],
        );

        // NodeManagement
        let add_nodes_item = c.structure(
            "AddNodesItem",
            376,
            378,
            vec![
                s("ParentNodeId", &bt.expanded_node_id),
                s("ReferenceTypeId", &bt.node_id),
                s("RequestedNewNodeId", &bt.expanded_node_id),
                s("BrowseName", &bt.qualified_name),
                s("NodeClass", &node_class),
                s("NodeAttributes", &bt.extension_object),
                s("TypeDefinition", &bt.expanded_node_id),
            ],
        );
        let add_nodes_result = c.structure(
            "AddNodesResult",
            483,
            485,
            vec![s("StatusCode", &bt.status_code), s("AddedNodeId", &bt.node_id)],
        );
        let add_references_item = c.structure(
            "AddReferencesItem",
            379,
            381,
            vec![
                s("SourceNodeId", &bt.node_id),
                s("ReferenceTypeId", &bt.node_id),
                s("IsForward", &bt.boolean),
                s("TargetServerUri", &bt.string),
                s("TargetNodeId", &bt.expanded_node_id),
                s("TargetNodeClass", &node_class),
            ],
        );
        let delete_nodes_item = c.structure(
            "DeleteNodesItem",
            382,
            384,
            vec![s("NodeId", &bt.node_id), s("DeleteTargetReferences", &bt.boolean)],
        );
        let delete_references_item = c.structure(
            "DeleteReferencesItem",
            385,
            387,
            vec![
                s("SourceNodeId", &bt.node_id),
                s("ReferenceTypeId", &bt.node_id),
                s("IsForward", &bt.boolean),
                s("TargetNodeId", &bt.expanded_node_id),
                s("DeleteBidirectional", &bt.boolean),
            ],
        );

        // View
        let view_description = c.structure(
            "ViewDescription",
            511,
            513,
            vec![
                s("ViewId", &bt.node_id),
                s("Timestamp", &bt.date_time),
                s("ViewVersion", &bt.uint32),
            ],
        );
        let browse_description = c.structure(
            "BrowseDescription",
            514,
            516,
            vec![
                s("NodeId", &bt.node_id),
                s("BrowseDirection", &browse_direction),
                s("ReferenceTypeId", &bt.node_id),
                s("IncludeSubtypes", &bt.boolean),
                s("NodeClassMask", &bt.uint32),
                s("ResultMask", &bt.uint32),
            ],
        );
        let reference_description = c.structure(
            "ReferenceDescription",
            518,
            520,
            vec![
                s("ReferenceTypeId", &bt.node_id),
                s("IsForward", &bt.boolean),
                s("NodeId", &bt.expanded_node_id),
                s("BrowseName", &bt.qualified_name),
                s("DisplayName", &bt.localized_text),
                s("NodeClass", &node_class),
                s("TypeDefinition", &bt.expanded_node_id),
            ],
        );
        let browse_result = c.structure(
            "BrowseResult",
            522,
            524,
            vec![
                s("StatusCode", &bt.status_code),
                s("ContinuationPoint", &bt.byte_string),
                a("References", &reference_description),
            ],
        );
        let relative_path_element = c.structure(
            "RelativePathElement",
            537,
            539,
            vec![
                s("ReferenceTypeId", &bt.node_id),
                s("IsInverse", &bt.boolean),
                s("IncludeSubtypes", &bt.boolean),
                s("TargetName", &bt.qualified_name),
            ],
        );
        let relative_path = c.structure(
            "RelativePath",
            540,
            542,
            vec![a("Elements", &relative_path_element)],
        );
        let browse_path = c.structure(
            "BrowsePath",
            543,
            545,
            vec![s("StartingNode", &bt.node_id), s("RelativePath", &relative_path)],
        );
        let browse_path_target = c.structure(
            "BrowsePathTarget",
            546,
            548,
            vec![
                s("TargetId", &bt.expanded_node_id),
                s("RemainingPathIndex", &bt.uint32),
            ],
        );
        let browse_path_result = c.structure(
            "BrowsePathResult",
            549,
            551,
            vec![s("StatusCode", &bt.status_code), a("Targets", &browse_path_target)],
        );

        // Query
        let query_data_description = c.structure(
            "QueryDataDescription",
            570,
            572,
            vec![
                s("RelativePath", &relative_path),
                s("AttributeId", &bt.uint32),
                s("IndexRange", &bt.string),
            ],
        );
        let node_type_description = c.structure(
            "NodeTypeDescription",
            573,
            575,
            vec![
                s("TypeDefinitionNode", &bt.expanded_node_id),
                s("IncludeSubTypes", &bt.boolean),
                a("DataToReturn", &query_data_description),
            ],
        );
        let query_data_set = c.structure(
            "QueryDataSet",
            577,
            579,
            vec![
                s("NodeId", &bt.expanded_node_id),
                s("TypeDefinitionNode", &bt.expanded_node_id),
                a("Values", &bt.variant),
            ],
        );
        let content_filter_element = c.structure(
            "ContentFilterElement",
            583,
            585,
            vec![
                s("FilterOperator", &filter_operator),
                a("FilterOperands", &bt.extension_object),
            ],
        );
        let content_filter = c.structure(
            "ContentFilter",
            586,
            588,
            vec![a("Elements", &content_filter_element)],
        );
        let content_filter_element_result = c.structure(
            "ContentFilterElementResult",
            604,
            606,
            vec![
                s("StatusCode", &bt.status_code),
                a("OperandStatusCodes", &bt.status_code),
                a("OperandDiagnosticInfos", &bt.diagnostic_info),
            ],
        );
        let content_filter_result = c.structure(
            "ContentFilterResult",
            607,
            609,
            vec![
                a("ElementResults", &content_filter_element_result),
                a("ElementDiagnosticInfos", &bt.diagnostic_info),
            ],
        );
        let parsing_result = c.structure(
            "ParsingResult",
            610,
            612,
            vec![
                s("StatusCode", &bt.status_code),
                a("DataStatusCodes", &bt.status_code),
                a("DataDiagnosticInfos", &bt.diagnostic_info),
            ],
        );

        // Attribute
        let read_value_id = c.structure(
            "ReadValueId",
            626,
            628,
            vec![
                s("NodeId", &bt.node_id),
                s("AttributeId", &bt.uint32),
                s("IndexRange", &bt.string),
                s("DataEncoding", &bt.qualified_name),
            ],
        );
        let history_read_value_id = c.structure(
            "HistoryReadValueId",
            635,
            637,
            vec![
                s("NodeId", &bt.node_id),
                s("IndexRange", &bt.string),
                s("DataEncoding", &bt.qualified_name),
                s("ContinuationPoint", &bt.byte_string),
            ],
        );
        let history_read_result = c.structure(
            "HistoryReadResult",
            638,
            640,
            vec![
                s("StatusCode", &bt.status_code),
                s("ContinuationPoint", &bt.byte_string),
                s("HistoryData", &bt.extension_object),
            ],
        );
        let write_value = c.structure(
            "WriteValue",
            668,
            670,
            vec![
                s("NodeId", &bt.node_id),
                s("AttributeId", &bt.uint32),
                s("IndexRange", &bt.string),
                s("Value", &bt.data_value),
            ],
        );
        let history_update_result = c.structure(
            "HistoryUpdateResult",
            695,
            697,
            vec![
                s("StatusCode", &bt.status_code),
                a("OperationResults", &bt.status_code),
                a("DiagnosticInfos", &bt.diagnostic_info),
            ],
        );

        // Method
        let call_method_request = c.structure(
            "CallMethodRequest",
            704,
            706,
            vec![
                s("ObjectId", &bt.node_id),
                s("MethodId", &bt.node_id),
                a("InputArguments", &bt.variant),
            ],
        );
        let call_method_result = c.structure(
            "CallMethodResult",
            707,
            709,
            vec![
                s("StatusCode", &bt.status_code),
                a("InputArgumentResults", &bt.status_code),
                a("InputArgumentDiagnosticInfos", &bt.diagnostic_info),
                a("OutputArguments", &bt.variant),
            ],
        );

        // MonitoredItem
        let monitoring_parameters = c.structure(
            "MonitoringParameters",
            740,
            742,
            vec![
                s("ClientHandle", &bt.uint32),
                s("SamplingInterval", &bt.double),
                s("Filter", &bt.extension_object),
                s("QueueSize", &bt.uint32),
                s("DiscardOldest", &bt.boolean),
            ],
        );
        let monitored_item_create_request = c.structure(
            "MonitoredItemCreateRequest",
            743,
            745,
            vec![
                s("ItemToMonitor", &read_value_id),
                s("MonitoringMode", &monitoring_mode),
                s("RequestedParameters", &monitoring_parameters),
            ],
        );
        let monitored_item_create_result = c.structure(
            "MonitoredItemCreateResult",
            746,
            748,
            vec![
                s("StatusCode", &bt.status_code),
                s("MonitoredItemId", &bt.uint32),
                s("RevisedSamplingInterval", &bt.double),
                s("RevisedQueueSize", &bt.uint32),
                s("FilterResult", &bt.extension_object),
            ],
        );
        let monitored_item_modify_request = c.structure(
            "MonitoredItemModifyRequest",
            755,
            757,
            vec![
                s("MonitoredItemId", &bt.uint32),
                s("RequestedParameters", &monitoring_parameters),
            ],
        );
        let monitored_item_modify_result = c.structure(
            "MonitoredItemModifyResult",
            758,
            760,
            vec![
                s("StatusCode", &bt.status_code),
                s("RevisedSamplingInterval", &bt.double),
                s("RevisedQueueSize", &bt.uint32),
                s("FilterResult", &bt.extension_object),
            ],
        );

        // Subscription
        let notification_message = c.structure(
            "NotificationMessage",
            803,
            805,
            vec![
                s("SequenceNumber", &bt.uint32),
                s("PublishTime", &bt.date_time),
                a("NotificationData", &bt.extension_object),
            ],
        );
        let subscription_acknowledgement = c.structure(
            "SubscriptionAcknowledgement",
            821,
            823,
            vec![s("SubscriptionId", &bt.uint32), s("SequenceNumber", &bt.uint32)],
        );
        let transfer_result = c.structure(
            "TransferResult",
            836,
            838,
            vec![
                s("StatusCode", &bt.status_code),
                a("AvailableSequenceNumbers", &bt.uint32),
            ],
        );

        let results = || a("Results", &bt.status_code);
        let diagnostics = || a("DiagnosticInfos", &bt.diagnostic_info);

        let mut sv = ServiceBuilder {
            catalog: &mut c,
            request_header: &request_header,
            response_header: &response_header,
            services: Vec::new(),
        };

        sv.add(
            ServiceId::FindServers,
            (420, 422),
            vec![
                s("EndpointUrl", &bt.string),
                a("LocaleIds", &bt.string),
                a("ServerUris", &bt.string),
            ],
            (423, 425),
            vec![a("Servers", &application_description)],
        );
        sv.add(
            ServiceId::FindServersOnNetwork,
            (12190, 12208),
            vec![
                s("StartingRecordId", &bt.uint32),
                s("MaxRecordsToReturn", &bt.uint32),
                a("ServerCapabilityFilter", &bt.string),
            ],
            (12191, 12209),
            vec![
                s("LastCounterResetTime", &bt.date_time),
                a("Servers", &server_on_network),
            ],
        );
        sv.add(
            ServiceId::GetEndpoints,
            (426, 428),
            vec![
                s("EndpointUrl", &bt.string),
                a("LocaleIds", &bt.string),
                a("ProfileUris", &bt.string),
            ],
            (429, 431),
            vec![a("Endpoints", &endpoint_description)],
        );
        sv.add(
            ServiceId::RegisterServer,
            (435, 437),
            vec![s("Server", &registered_server)],
            (438, 440),
            vec![],
        );
        sv.add(
            ServiceId::RegisterServer2,
            (12193, 12211),
            vec![
                s("Server", &registered_server),
                a("DiscoveryConfiguration", &bt.extension_object),
            ],
            (12194, 12212),
            vec![a("ConfigurationResults", &bt.status_code), diagnostics()],
        );
        sv.add(
            ServiceId::OpenSecureChannel,
            (444, 446),
            vec![
                s("ClientProtocolVersion", &bt.uint32),
                s("RequestType", &security_token_request_type),
                s("SecurityMode", &message_security_mode),
                s("ClientNonce", &bt.byte_string),
                s("RequestedLifetime", &bt.uint32),
            ],
            (447, 449),
            vec![
                s("ServerProtocolVersion", &bt.uint32),
                s("SecurityToken", &channel_security_token),
                s("ServerNonce", &bt.byte_string),
            ],
        );
        sv.add(ServiceId::CloseSecureChannel, (450, 452), vec![], (453, 455), vec![]);
        sv.add(
            ServiceId::CreateSession,
            (459, 461),
            vec![
                s("ClientDescription", &application_description),
                s("ServerUri", &bt.string),
                s("EndpointUrl", &bt.string),
                s("SessionName", &bt.string),
                s("ClientNonce", &bt.byte_string),
                s("ClientCertificate", &bt.byte_string),
                s("RequestedSessionTimeout", &bt.double),
                s("MaxResponseMessageSize", &bt.uint32),
            ],
            (462, 464),
            vec![
                s("SessionId", &bt.node_id),
                s("AuthenticationToken", &bt.node_id),
                s("RevisedSessionTimeout", &bt.double),
                s("ServerNonce", &bt.byte_string),
                s("ServerCertificate", &bt.byte_string),
                a("ServerEndpoints", &endpoint_description),
                a("ServerSoftwareCertificates", &signed_software_certificate),
                s("ServerSignature", &signature_data),
                s("MaxRequestMessageSize", &bt.uint32),
            ],
        );
        sv.add(
            ServiceId::ActivateSession,
            (465, 467),
            vec![
                s("ClientSignature", &signature_data),
                a("ClientSoftwareCertificates", &signed_software_certificate),
                a("LocaleIds", &bt.string),
                s("UserIdentityToken", &bt.extension_object),
                s("UserTokenSignature", &signature_data),
            ],
            (468, 470),
            vec![s("ServerNonce", &bt.byte_string), results(), diagnostics()],
        );
        sv.add(
            ServiceId::CloseSession,
            (471, 473),
            vec![s("DeleteSubscriptions", &bt.boolean)],
            (474, 476),
            vec![],
        );
        sv.add(
            ServiceId::Cancel,
            (477, 479),
            vec![s("RequestHandle", &bt.uint32)],
            (480, 482),
            vec![s("CancelCount", &bt.uint32)],
        );
        sv.add(
            ServiceId::AddNodes,
            (486, 488),
            vec![a("NodesToAdd", &add_nodes_item)],
            (489, 491),
            vec![a("Results", &add_nodes_result), diagnostics()],
        );
        sv.add(
            ServiceId::AddReferences,
            (492, 494),
            vec![a("ReferencesToAdd", &add_references_item)],
            (495, 497),
            vec![results(), diagnostics()],
        );
        sv.add(
            ServiceId::DeleteNodes,
            (498, 500),
            vec![a("NodesToDelete", &delete_nodes_item)],
            (501, 503),
            vec![results(), diagnostics()],
        );
        sv.add(
            ServiceId::DeleteReferences,
            (504, 506),
            vec![a("ReferencesToDelete", &delete_references_item)],
            (507, 509),
            vec![results(), diagnostics()],
        );
        sv.add(
            ServiceId::Browse,
            (525, 527),
            vec![
                s("View", &view_description),
                s("RequestedMaxReferencesPerNode", &bt.uint32),
                a("NodesToBrowse", &browse_description),
            ],
            (528, 530),
            vec![a("Results", &browse_result), diagnostics()],
        );
        sv.add(
            ServiceId::BrowseNext,
            (531, 533),
            vec![
                s("ReleaseContinuationPoints", &bt.boolean),
                a("ContinuationPoints", &bt.byte_string),
            ],
            (534, 536),
            vec![a("Results", &browse_result), diagnostics()],
        );
        sv.add(
            ServiceId::TranslateBrowsePathsToNodeIds,
            (552, 554),
            vec![a("BrowsePaths", &browse_path)],
            (555, 557),
            vec![a("Results", &browse_path_result), diagnostics()],
        );
        sv.add(
            ServiceId::RegisterNodes,
            (558, 560),
            vec![a("NodesToRegister", &bt.node_id)],
            (561, 563),
            vec![a("RegisteredNodeIds", &bt.node_id)],
        );
        sv.add(
            ServiceId::UnregisterNodes,
            (564, 566),
            vec![a("NodesToUnregister", &bt.node_id)],
            (567, 569),
            vec![],
        );
        sv.add(
            ServiceId::QueryFirst,
            (613, 615),
            vec![
                s("View", &view_description),
                a("NodeTypes", &node_type_description),
                s("Filter", &content_filter),
                s("MaxDataSetsToReturn", &bt.uint32),
                s("MaxReferencesToReturn", &bt.uint32),
            ],
            (616, 618),
            vec![
                a("QueryDataSets", &query_data_set),
                s("ContinuationPoint", &bt.byte_string),
                a("ParsingResults", &parsing_result),
                diagnostics(),
                s("FilterResult", &content_filter_result),
            ],
        );
        sv.add(
            ServiceId::QueryNext,
            (619, 621),
            vec![
                s("ReleaseContinuationPoint", &bt.boolean),
                s("ContinuationPoint", &bt.byte_string),
            ],
            (622, 624),
            vec![
                a("QueryDataSets", &query_data_set),
                s("RevisedContinuationPoint", &bt.byte_string),
            ],
        );
        sv.add(
            ServiceId::Read,
            (629, 631),
            vec![
                s("MaxAge", &bt.double),
                s("TimestampsToReturn", &timestamps_to_return),
                a("NodesToRead", &read_value_id),
            ],
            (632, 634),
            vec![a("Results", &bt.data_value), diagnostics()],
        );
        sv.add(
            ServiceId::HistoryRead,
            (662, 664),
            vec![
                s("HistoryReadDetails", &bt.extension_object),
                s("TimestampsToReturn", &timestamps_to_return),
                s("ReleaseContinuationPoints", &bt.boolean),
                a("NodesToRead", &history_read_value_id),
            ],
            (665, 667),
            vec![a("Results", &history_read_result), diagnostics()],
        );
        sv.add(
            ServiceId::Write,
            (671, 673),
            vec![a("NodesToWrite", &write_value)],
            (674, 676),
            vec![results(), diagnostics()],
        );
        sv.add(
            ServiceId::HistoryUpdate,
            (698, 700),
            vec![a("HistoryUpdateDetails", &bt.extension_object)],
            (701, 703),
            vec![a("Results", &history_update_result), diagnostics()],
        );
        sv.add(
            ServiceId::Call,
            (710, 712),
            vec![a("MethodsToCall", &call_method_request)],
            (713, 715),
            vec![a("Results", &call_method_result), diagnostics()],
        );
        sv.add(
            ServiceId::CreateMonitoredItems,
            (749, 751),
            vec![
                s("SubscriptionId", &bt.uint32),
                s("TimestampsToReturn", &timestamps_to_return),
                a("ItemsToCreate", &monitored_item_create_request),
            ],
            (752, 754),
            vec![a("Results", &monitored_item_create_result), diagnostics()],
        );
        sv.add(
            ServiceId::ModifyMonitoredItems,
            (761, 763),
            vec![
                s("SubscriptionId", &bt.uint32),
                s("TimestampsToReturn", &timestamps_to_return),
                a("ItemsToModify", &monitored_item_modify_request),
            ],
            (764, 766),
            vec![a("Results", &monitored_item_modify_result), diagnostics()],
        );
        sv.add(
            ServiceId::SetMonitoringMode,
            (767, 769),
            vec![
                s("SubscriptionId", &bt.uint32),
                s("MonitoringMode", &monitoring_mode),
                a("MonitoredItemIds", &bt.uint32),
            ],
            (770, 772),
            vec![results(), diagnostics()],
        );
        sv.add(
            ServiceId::SetTriggering,
            (773, 775),
            vec![
                s("SubscriptionId", &bt.uint32),
                s("TriggeringItemId", &bt.uint32),
                a("LinksToAdd", &bt.uint32),
                a("LinksToRemove", &bt.uint32),
            ],
            (776, 778),
            vec![
                a("AddResults", &bt.status_code),
                a("AddDiagnosticInfos", &bt.diagnostic_info),
                a("RemoveResults", &bt.status_code),
                a("RemoveDiagnosticInfos", &bt.diagnostic_info),
            ],
        );
        sv.add(
            ServiceId::DeleteMonitoredItems,
            (779, 781),
            vec![
                s("SubscriptionId", &bt.uint32),
                a("MonitoredItemIds", &bt.uint32),
            ],
            (782, 784),
            vec![results(), diagnostics()],
        );
        sv.add(
            ServiceId::CreateSubscription,
            (785, 787),
            vec![
                s("RequestedPublishingInterval", &bt.double),
                s("RequestedLifetimeCount", &bt.uint32),
                s("RequestedMaxKeepAliveCount", &bt.uint32),
                s("MaxNotificationsPerPublish", &bt.uint32),
                s("PublishingEnabled", &bt.boolean),
                s("Priority", &bt.byte),
            ],
            (788, 790),
            vec![
                s("SubscriptionId", &bt.uint32),
                s("RevisedPublishingInterval", &bt.double),
                s("RevisedLifetimeCount", &bt.uint32),
                s("RevisedMaxKeepAliveCount", &bt.uint32),
            ],
        );
        sv.add(
            ServiceId::ModifySubscription,
            (791, 793),
            vec![
                s("SubscriptionId", &bt.uint32),
                s("RequestedPublishingInterval", &bt.double),
                s("RequestedLifetimeCount", &bt.uint32),
                s("RequestedMaxKeepAliveCount", &bt.uint32),
                s("MaxNotificationsPerPublish", &bt.uint32),
                s("Priority", &bt.byte),
            ],
            (794, 796),
            vec![
                s("RevisedPublishingInterval", &bt.double),
                s("RevisedLifetimeCount", &bt.uint32),
                s("RevisedMaxKeepAliveCount", &bt.uint32),
            ],
        );
        sv.add(
            ServiceId::SetPublishingMode,
            (797, 799),
            vec![
                s("PublishingEnabled", &bt.boolean),
                a("SubscriptionIds", &bt.uint32),
            ],
            (800, 802),
            vec![results(), diagnostics()],
        );
        sv.add(
            ServiceId::Publish,
            (824, 826),
            vec![a("SubscriptionAcknowledgements", &subscription_acknowledgement)],
            (827, 829),
            vec![
                s("SubscriptionId", &bt.uint32),
                a("AvailableSequenceNumbers", &bt.uint32),
                s("MoreNotifications", &bt.boolean),
                s("NotificationMessage", &notification_message),
                results(),
                diagnostics(),
            ],
        );
        sv.add(
            ServiceId::Republish,
            (830, 832),
            vec![
                s("SubscriptionId", &bt.uint32),
                s("RetransmitSequenceNumber", &bt.uint32),
            ],
            (833, 835),
            vec![s("NotificationMessage", &notification_message)],
        );
        sv.add(
            ServiceId::TransferSubscriptions,
            (839, 841),
            vec![
                a("SubscriptionIds", &bt.uint32),
                s("SendInitialValues", &bt.boolean),
            ],
            (842, 844),
            vec![a("Results", &transfer_result), diagnostics()],
        );
        sv.add(
            ServiceId::DeleteSubscriptions,
            (845, 847),
            vec![a("SubscriptionIds", &bt.uint32)],
            (848, 850),
            vec![results(), diagnostics()],
        );

        let services = sv.services;
        let CatalogBuilder {
            types,
            by_type_id,
            by_encoding_id,
        } = c;

        log::debug!(
            "[catalog] built {} namespace-zero types, {} services",
            types.len(),
            services.len()
        );

        Self {
            builtins: bt,
            request_header,
            response_header,
            service_fault,
            services,
            types,
            by_type_id,
            by_encoding_id,
        }
    }
}

fn s(name: &str, ty: &Arc<DataType>) -> DataTypeMember {
    DataTypeMember::scalar(name, ty)
}

fn a(name: &str, ty: &Arc<DataType>) -> DataTypeMember {
    DataTypeMember::array(name, ty)
}

struct CatalogBuilder {
    types: Vec<Arc<DataType>>,
    by_type_id: HashMap<NodeId, usize>,
    by_encoding_id: HashMap<NodeId, usize>,
}

impl CatalogBuilder {
    fn new() -> Self {
        Self {
            types: Vec::new(),
            by_type_id: HashMap::new(),
            by_encoding_id: HashMap::new(),
        }
    }

    fn add(&mut self, ty: DataType) -> Arc<DataType> {
        let idx = self.types.len();
        self.by_type_id.insert(ty.type_id.clone(), idx);
        if !ty.binary_encoding_id.is_null() {
            self.by_encoding_id.insert(ty.binary_encoding_id.clone(), idx);
        }
        let ty = Arc::new(ty);
        self.types.push(Arc::clone(&ty));
        ty
    }

    fn enumeration(&mut self, name: &str, id: u32) -> Arc<DataType> {
        self.add(DataType::new(name, NodeId::ns0(id), NodeId::null(), TypeKind::Enum, Vec::new()))
    }

    fn structure(&mut self, name: &str, id: u32, encoding: u32, members: Vec<DataTypeMember>) -> Arc<DataType> {
        self.add(DataType::new(
            name,
            NodeId::ns0(id),
            NodeId::ns0(encoding),
            TypeKind::Structure,
            members,
        ))
    }
}

struct ServiceBuilder<'a> {
    catalog: &'a mut CatalogBuilder,
    request_header: &'a Arc<DataType>,
    response_header: &'a Arc<DataType>,
    services: Vec<ServiceTypes>,
}

impl ServiceBuilder<'_> {
    /// Registers `<Name>Request`/`<Name>Response`, prefixing the headers.
    fn add(
        &mut self,
        id: ServiceId,
        request_ids: (u32, u32),
        request_members: Vec<DataTypeMember>,
        response_ids: (u32, u32),
        response_members: Vec<DataTypeMember>,
    ) {
        let mut req = vec![s("RequestHeader", self.request_header)];
        req.extend(request_members);
        let mut resp = vec![s("ResponseHeader", self.response_header)];
        resp.extend(response_members);

        let request = self.catalog.structure(
            &format!("{}Request", id.name()),
            request_ids.0,
            request_ids.1,
            req,
        );
        let response = self.catalog.structure(
            &format!("{}Response", id.name()),
            response_ids.0,
            response_ids.1,
            resp,
        );
        self.services.push(ServiceTypes {
            id,
            request,
            response,
        });
    }
}

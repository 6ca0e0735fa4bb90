// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! NodeId and ExpandedNodeId.

use std::fmt;
use std::str::FromStr;

use super::{ByteString, Guid, StatusCode, UaString};

/// Identifier part of a [`NodeId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Identifier {
    Numeric(u32),
    String(UaString),
    Guid(Guid),
    ByteString(ByteString),
}

/// Namespace-qualified identifier of a node or type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub namespace: u16,
    pub identifier: Identifier,
}

impl Default for NodeId {
    fn default() -> Self {
        Self::null()
    }
}

impl NodeId {
    /// `ns=0;i=0`.
    pub const fn null() -> Self {
        Self {
            namespace: 0,
            identifier: Identifier::Numeric(0),
        }
    }

    pub const fn numeric(namespace: u16, value: u32) -> Self {
        Self {
            namespace,
            identifier: Identifier::Numeric(value),
        }
    }

    /// Namespace-zero numeric id.
    pub const fn ns0(value: u32) -> Self {
        Self::numeric(0, value)
    }

    pub fn string(namespace: u16, value: impl Into<UaString>) -> Self {
        Self {
            namespace,
            identifier: Identifier::String(value.into()),
        }
    }

    pub fn guid(namespace: u16, value: Guid) -> Self {
        Self {
            namespace,
            identifier: Identifier::Guid(value),
        }
    }

    pub fn byte_string(namespace: u16, value: impl Into<ByteString>) -> Self {
        Self {
            namespace,
            identifier: Identifier::ByteString(value.into()),
        }
    }

    pub fn is_null(&self) -> bool {
        if self.namespace != 0 {
            return false;
        }
        match &self.identifier {
            Identifier::Numeric(v) => *v == 0,
            Identifier::String(s) => s.is_empty(),
            Identifier::Guid(g) => g.is_null(),
            Identifier::ByteString(b) => b.is_empty(),
        }
    }

    /// Numeric identifier in namespace zero, if that is what this is.
    pub fn as_ns0(&self) -> Option<u32> {
        match (self.namespace, &self.identifier) {
            (0, Identifier::Numeric(v)) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace != 0 {
            write!(f, "ns={};", self.namespace)?;
        }
        match &self.identifier {
            Identifier::Numeric(v) => write!(f, "i={}", v),
            Identifier::String(s) => write!(f, "s={}", s),
            Identifier::Guid(g) => write!(f, "g={}", g),
            Identifier::ByteString(b) => write!(f, "b={}", b),
        }
    }
}

impl FromStr for NodeId {
    type Err = StatusCode;

    /// Parses `[ns=<u16>;]i=<u32>|s=<text>|g=<guid>|b=<hex>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, rest) = match s.strip_prefix("ns=") {
            Some(tail) => {
                let (ns, rest) = tail.split_once(';').ok_or(StatusCode::BAD_NODE_ID_INVALID)?;
                let ns = ns.parse::<u16>().map_err(|_| StatusCode::BAD_NODE_ID_INVALID)?;
                (ns, rest)
            }
            None => (0, s),
        };
        let (kind, value) = rest.split_once('=').ok_or(StatusCode::BAD_NODE_ID_INVALID)?;
        let identifier = match kind {
            "i" => Identifier::Numeric(value.parse().map_err(|_| StatusCode::BAD_NODE_ID_INVALID)?),
            "s" => Identifier::String(UaString::from(value)),
            "g" => Identifier::Guid(value.parse().map_err(|_| StatusCode::BAD_NODE_ID_INVALID)?),
            "b" => Identifier::ByteString(ByteString::from(parse_hex(value)?)),
            _ => return Err(StatusCode::BAD_NODE_ID_INVALID),
        };
        Ok(Self {
            namespace,
            identifier,
        })
    }
}

fn parse_hex(text: &str) -> Result<Vec<u8>, StatusCode> {
    if text.len() % 2 != 0 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(StatusCode::BAD_NODE_ID_INVALID);
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).map_err(|_| StatusCode::BAD_NODE_ID_INVALID))
        .collect()
}

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        Self::ns0(value)
    }
}

/// NodeId extended with an optional namespace URI and server index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ExpandedNodeId {
    pub node_id: NodeId,
    pub namespace_uri: UaString,
    pub server_index: u32,
}

impl ExpandedNodeId {
    pub fn is_local(&self) -> bool {
        self.server_index == 0
    }
}

impl From<NodeId> for ExpandedNodeId {
    fn from(node_id: NodeId) -> Self {
        Self {
            node_id,
            namespace_uri: UaString::null(),
            server_index: 0,
        }
    }
}

impl fmt::Display for ExpandedNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.server_index != 0 {
            write!(f, "svr={};", self.server_index)?;
        }
        if let Some(uri) = self.namespace_uri.as_str() {
            write!(f, "nsu={};", uri)?;
        }
        write!(f, "{}", self.node_id)
    }
}

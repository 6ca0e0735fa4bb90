// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ExtensionObject: a value whose type may be unknown to the receiver.
//!
//! An extension object is either decoded (descriptor plus value) or encoded
//! (type id plus raw body). Moving between the two forms always goes through
//! the binary codec; an encoded body whose type id matches no known binary
//! encoding id stays encoded and is re-emitted byte for byte.

use std::fmt;
use std::sync::Arc;

use super::{ByteString, DataType, NodeId, StatusCode, TypeTable, UaResult, UaString, Value};
use crate::config::EncodingLimits;
use crate::encoding::{self, BinaryDecoder, BinaryEncoder};

/// Body of an encoded extension object.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ExtensionBody {
    #[default]
    None,
    Binary(ByteString),
    Xml(UaString),
}

impl ExtensionBody {
    /// Encoding byte written after the type id.
    pub fn encoding_byte(&self) -> u8 {
        match self {
            ExtensionBody::None => 0x00,
            ExtensionBody::Binary(_) => 0x01,
            ExtensionBody::Xml(_) => 0x02,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionObject {
    /// Raw form. `type_id` is the id found on the wire, normally a binary
    /// encoding id.
    Encoded { type_id: NodeId, body: ExtensionBody },
    /// Value of a known type.
    Decoded {
        data_type: Arc<DataType>,
        value: Box<Value>,
    },
}

impl Default for ExtensionObject {
    fn default() -> Self {
        Self::null()
    }
}

impl ExtensionObject {
    /// Null id, no body.
    pub fn null() -> Self {
        ExtensionObject::Encoded {
            type_id: NodeId::null(),
            body: ExtensionBody::None,
        }
    }

    pub fn from_value(data_type: Arc<DataType>, value: Value) -> Self {
        ExtensionObject::Decoded {
            data_type,
            value: Box::new(value),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(
            self,
            ExtensionObject::Encoded { type_id, body: ExtensionBody::None } if type_id.is_null()
        )
    }

    pub fn is_decoded(&self) -> bool {
        matches!(self, ExtensionObject::Decoded { .. })
    }

    /// The id written on the wire for this object.
    pub fn encoding_id(&self) -> &NodeId {
        match self {
            ExtensionObject::Encoded { type_id, .. } => type_id,
            ExtensionObject::Decoded { data_type, .. } => &data_type.binary_encoding_id,
        }
    }

    pub fn data_type(&self) -> Option<&Arc<DataType>> {
        match self {
            ExtensionObject::Decoded { data_type, .. } => Some(data_type),
            ExtensionObject::Encoded { .. } => None,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            ExtensionObject::Decoded { value, .. } => Some(value),
            ExtensionObject::Encoded { .. } => None,
        }
    }

    pub fn into_decoded(self) -> Option<(Arc<DataType>, Value)> {
        match self {
            ExtensionObject::Decoded { data_type, value } => Some((data_type, *value)),
            ExtensionObject::Encoded { .. } => None,
        }
    }

    /// Re-encode into the binary-body form. Encoded objects are returned as is.
    pub fn to_encoded(&self, limits: &EncodingLimits) -> UaResult<ExtensionObject> {
        match self {
            ExtensionObject::Encoded { type_id, body } => Ok(ExtensionObject::Encoded {
                type_id: type_id.clone(),
                body: body.clone(),
            }),
            ExtensionObject::Decoded { data_type, value } => {
                let mut encoder = BinaryEncoder::new(*limits);
                encoding::encode_value(&mut encoder, value, data_type)?;
                Ok(ExtensionObject::Encoded {
                    type_id: data_type.binary_encoding_id.clone(),
                    body: ExtensionBody::Binary(ByteString::from(encoder.into_bytes())),
                })
            }
        }
    }

    /// Promote a binary body to the decoded form when `types` knows its
    /// encoding id. Unknown bodies, XML bodies and decoded objects are
    /// returned unchanged.
    pub fn to_decoded(&self, types: &TypeTable, limits: &EncodingLimits) -> UaResult<ExtensionObject> {
        if let ExtensionObject::Encoded {
            type_id,
            body: ExtensionBody::Binary(bytes),
        } = self
        {
            if let Some(data_type) = types.find_by_encoding_id(type_id) {
                let body = bytes.as_bytes().unwrap_or(&[]);
                let mut decoder = BinaryDecoder::new(body, types, *limits);
                let value = encoding::decode_value(&mut decoder, &data_type)?;
                if decoder.remaining() != 0 {
                    log::debug!(
                        "[ext] {} trailing bytes after {} body",
                        decoder.remaining(),
                        data_type.name
                    );
                    return Err(StatusCode::BAD_DECODING_ERROR);
                }
                return Ok(ExtensionObject::from_value(data_type, value));
            }
        }
        Ok(self.clone())
    }
}

impl fmt::Display for ExtensionObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionObject::Decoded { data_type, .. } => write!(f, "ExtensionObject({})", data_type.name),
            ExtensionObject::Encoded { type_id, body } => match body {
                ExtensionBody::None => write!(f, "ExtensionObject({}, no body)", type_id),
                ExtensionBody::Binary(b) => write!(f, "ExtensionObject({}, {} bytes)", type_id, b.len()),
                ExtensionBody::Xml(x) => write!(f, "ExtensionObject({}, xml {} bytes)", type_id, x.len()),
            },
        }
    }
}

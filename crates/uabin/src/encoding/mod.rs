// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! OPC UA binary encoding.
//!
//! [`BinaryEncoder`]/[`BinaryDecoder`] are the byte cursors,
//! [`BinaryEncodable`] covers the builtin types and [`encode_value`] /
//! [`decode_value`] handle any value described by a [`DataType`].
//!
//! Decoding never trusts a length field: lengths are checked against
//! [`EncodingLimits`] and against the bytes actually left before anything is
//! allocated, and a failed decode drops whatever was built so far.
//!
//! [`DataType`]: crate::types::DataType
//! [`EncodingLimits`]: crate::config::EncodingLimits

mod builtin;
mod cursor;
mod generic;

#[cfg(test)]
mod tests;

pub use builtin::BinaryEncodable;
pub use cursor::{BinaryDecoder, BinaryEncoder};
pub use generic::{
    decode_array, decode_fields, decode_value, encode_array, encode_fields, encode_value,
    encoded_size,
};

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary encoder and decoder cursors.
//!
//! All integers are little-endian. Every read is bounds-checked; a read past
//! the end fails with `BadDecodingError` and never touches memory outside
//! the input slice.

use crate::config::EncodingLimits;
use crate::types::{StatusCode, TypeTable, UaResult};

/// Generate write methods for primitive types.
macro_rules! impl_write_le {
    ($name:ident, $type:ty) => {
        pub fn $name(&mut self, value: $type) -> UaResult<()> {
            self.write_bytes(&value.to_le_bytes())
        }
    };
}

/// Generate read methods for primitive types.
///
/// Each generated method checks the bounds, copies N bytes and advances the
/// offset.
macro_rules! impl_read_le {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> UaResult<$type> {
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(self.read_bytes($size)?);
            Ok(<$type>::from_le_bytes(bytes))
        }
    };
}

/// Growable output buffer.
pub struct BinaryEncoder {
    buffer: Vec<u8>,
    limits: EncodingLimits,
    depth: u16,
}

impl BinaryEncoder {
    pub fn new(limits: EncodingLimits) -> Self {
        Self {
            buffer: Vec::new(),
            limits,
            depth: 0,
        }
    }

    pub fn limits(&self) -> &EncodingLimits {
        &self.limits
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    impl_write_le!(write_u8, u8);
    impl_write_le!(write_i8, i8);
    impl_write_le!(write_u16, u16);
    impl_write_le!(write_i16, i16);
    impl_write_le!(write_u32, u32);
    impl_write_le!(write_i32, i32);
    impl_write_le!(write_u64, u64);
    impl_write_le!(write_i64, i64);
    impl_write_le!(write_f32, f32);
    impl_write_le!(write_f64, f64);

    pub fn write_bool(&mut self, value: bool) -> UaResult<()> {
        self.write_u8(u8::from(value))
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> UaResult<()> {
        let end = self.buffer.len() + data.len();
        if end > self.limits.max_message_size as usize {
            log::debug!(
                "[encoding] message size {} exceeds limit {}",
                end,
                self.limits.max_message_size
            );
            return Err(StatusCode::BAD_ENCODING_LIMITS_EXCEEDED);
        }
        self.buffer.try_reserve(data.len())?;
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    /// Int32 length prefix; `None` is written as `-1`.
    pub fn write_length(&mut self, len: Option<usize>) -> UaResult<()> {
        match len {
            None => self.write_i32(-1),
            Some(len) => {
                let len = i32::try_from(len).map_err(|_| StatusCode::BAD_ENCODING_LIMITS_EXCEEDED)?;
                self.write_i32(len)
            }
        }
    }

    /// Reserve an Int32 length slot to be filled by [`Self::patch_length`].
    pub fn begin_length(&mut self) -> UaResult<usize> {
        let at = self.buffer.len();
        self.write_i32(0)?;
        Ok(at)
    }

    /// Write the number of bytes emitted since [`Self::begin_length`].
    pub fn patch_length(&mut self, at: usize) -> UaResult<()> {
        let body = self.buffer.len() - at - 4;
        let len = i32::try_from(body).map_err(|_| StatusCode::BAD_ENCODING_LIMITS_EXCEEDED)?;
        self.buffer[at..at + 4].copy_from_slice(&len.to_le_bytes());
        Ok(())
    }

    pub fn enter(&mut self) -> UaResult<()> {
        if self.depth >= self.limits.max_recursion_depth {
            return Err(StatusCode::BAD_ENCODING_LIMITS_EXCEEDED);
        }
        self.depth += 1;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Bounds-checked reader over a borrowed buffer.
pub struct BinaryDecoder<'a> {
    buffer: &'a [u8],
    offset: usize,
    types: &'a TypeTable,
    limits: EncodingLimits,
    depth: u16,
}

impl<'a> BinaryDecoder<'a> {
    pub fn new(buffer: &'a [u8], types: &'a TypeTable, limits: EncodingLimits) -> Self {
        Self {
            buffer,
            offset: 0,
            types,
            limits,
            depth: 0,
        }
    }

    /// Decoder over an embedded body (an ExtensionObject payload), sharing
    /// the type table, limits and current nesting depth.
    pub fn nested(&self, body: &'a [u8]) -> BinaryDecoder<'a> {
        BinaryDecoder {
            buffer: body,
            offset: 0,
            types: self.types,
            limits: self.limits,
            depth: self.depth,
        }
    }

    pub fn types(&self) -> &'a TypeTable {
        self.types
    }

    pub fn limits(&self) -> &EncodingLimits {
        &self.limits
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    /// Log the failure position and return `BadDecodingError`.
    pub fn fail(&self, reason: &str) -> StatusCode {
        log::debug!("[decoder] offset {}: {}", self.offset, reason);
        StatusCode::BAD_DECODING_ERROR
    }

    impl_read_le!(read_u8, u8, 1);
    impl_read_le!(read_i8, i8, 1);
    impl_read_le!(read_u16, u16, 2);
    impl_read_le!(read_i16, i16, 2);
    impl_read_le!(read_u32, u32, 4);
    impl_read_le!(read_i32, i32, 4);
    impl_read_le!(read_u64, u64, 8);
    impl_read_le!(read_i64, i64, 8);
    impl_read_le!(read_f32, f32, 4);
    impl_read_le!(read_f64, f64, 8);

    /// Any non-zero byte is `true`.
    pub fn read_bool(&mut self) -> UaResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_bytes(&mut self, len: usize) -> UaResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(self.fail("unexpected end of buffer"));
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    /// Int32 length prefix: `-1` is `None`, other negative values are
    /// malformed, values above `max` exceed the limits.
    pub fn read_length(&mut self, max: u32) -> UaResult<Option<usize>> {
        let len = self.read_i32()?;
        if len == -1 {
            return Ok(None);
        }
        if len < 0 {
            return Err(self.fail("negative length"));
        }
        if len as u32 > max {
            log::debug!("[decoder] offset {}: length {} above limit {}", self.offset, len, max);
            return Err(StatusCode::BAD_ENCODING_LIMITS_EXCEEDED);
        }
        Ok(Some(len as usize))
    }

    /// Array length prefix, checked against `max_array_length` and against
    /// the bytes left in the buffer (each element needs at least
    /// `min_element_size` bytes) before anything is allocated. Elements
    /// that encode to nothing, such as member-less structures, are bounded
    /// by `max_array_length` alone.
    pub fn read_array_length(&mut self, min_element_size: usize) -> UaResult<Option<usize>> {
        let len = self.read_length(self.limits.max_array_length)?;
        if let Some(len) = len {
            let needed = len.saturating_mul(min_element_size);
            if needed > self.remaining() {
                return Err(self.fail("array length exceeds remaining bytes"));
            }
        }
        Ok(len)
    }

    pub fn enter(&mut self) -> UaResult<()> {
        if self.depth >= self.limits.max_recursion_depth {
            log::debug!("[decoder] offset {}: nesting too deep", self.offset);
            return Err(StatusCode::BAD_ENCODING_LIMITS_EXCEEDED);
        }
        self.depth += 1;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_U16: u16 = 0xCDEF;
    const TEST_U32: u32 = 0x1234_5678;
    const TEST_U64: u64 = 0x1122_3344_5566_7788;

    #[test]
    fn test_write_little_endian() {
        let mut enc = BinaryEncoder::new(EncodingLimits::default());
        enc.write_u16(TEST_U16).expect("u16");
        enc.write_u32(TEST_U32).expect("u32");
        enc.write_u64(TEST_U64).expect("u64");
        assert_eq!(
            enc.as_bytes(),
            &[
                0xEF, 0xCD, 0x78, 0x56, 0x34, 0x12, 0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11
            ]
        );
    }

    #[test]
    fn test_read_overflow_keeps_offset() {
        let table = TypeTable::new();
        let buffer = [0u8; 3];
        let mut dec = BinaryDecoder::new(&buffer, &table, EncodingLimits::default());
        assert_eq!(dec.read_u16().expect("u16"), 0);
        assert_eq!(dec.read_u32(), Err(StatusCode::BAD_DECODING_ERROR));
        assert_eq!(dec.offset(), 2);
        assert_eq!(dec.remaining(), 1);
    }

    #[test]
    fn test_read_length_sentinels() {
        let table = TypeTable::new();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(-1i32).to_le_bytes());
        bytes.extend_from_slice(&0i32.to_le_bytes());
        bytes.extend_from_slice(&(-2i32).to_le_bytes());
        let mut dec = BinaryDecoder::new(&bytes, &table, EncodingLimits::default());
        assert_eq!(dec.read_length(10), Ok(None));
        assert_eq!(dec.read_length(10), Ok(Some(0)));
        assert_eq!(dec.read_length(10), Err(StatusCode::BAD_DECODING_ERROR));
    }

    #[test]
    fn test_hostile_array_length_rejected_before_allocation() {
        let table = TypeTable::new();
        let limits = EncodingLimits::default();

        // Within the array limit, but far more than the 4 bytes that follow.
        let mut bytes = 50_000i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 4]);
        let mut dec = BinaryDecoder::new(&bytes, &table, limits);
        assert_eq!(dec.read_array_length(4), Err(StatusCode::BAD_DECODING_ERROR));

        let bytes = i32::MAX.to_le_bytes();
        let mut dec = BinaryDecoder::new(&bytes, &table, limits);
        assert_eq!(
            dec.read_array_length(1),
            Err(StatusCode::BAD_ENCODING_LIMITS_EXCEEDED)
        );
    }

    #[test]
    fn test_zero_size_elements_bounded_by_array_limit() {
        let table = TypeTable::new();
        let limits = EncodingLimits::default();

        let bytes = 3i32.to_le_bytes();
        let mut dec = BinaryDecoder::new(&bytes, &table, limits);
        assert_eq!(dec.read_array_length(0), Ok(Some(3)));
        assert!(dec.is_eof());

        let bytes = (limits.max_array_length as i32 + 1).to_le_bytes();
        let mut dec = BinaryDecoder::new(&bytes, &table, limits);
        assert_eq!(
            dec.read_array_length(0),
            Err(StatusCode::BAD_ENCODING_LIMITS_EXCEEDED)
        );
    }

    #[test]
    fn test_patch_length() {
        let mut enc = BinaryEncoder::new(EncodingLimits::default());
        let at = enc.begin_length().expect("begin");
        enc.write_bytes(&[1, 2, 3]).expect("body");
        enc.patch_length(at).expect("patch");
        assert_eq!(enc.into_bytes(), vec![3, 0, 0, 0, 1, 2, 3]);
    }

    #[test]
    fn test_message_size_limit() {
        let limits = EncodingLimits {
            max_message_size: 4,
            ..EncodingLimits::default()
        };
        let mut enc = BinaryEncoder::new(limits);
        enc.write_u32(1).expect("fits");
        assert_eq!(enc.write_u8(1), Err(StatusCode::BAD_ENCODING_LIMITS_EXCEEDED));
    }

    #[test]
    fn test_depth_limit() {
        let limits = EncodingLimits {
            max_recursion_depth: 2,
            ..EncodingLimits::default()
        };
        let mut enc = BinaryEncoder::new(limits);
        enc.enter().expect("1");
        enc.enter().expect("2");
        assert_eq!(enc.enter(), Err(StatusCode::BAD_ENCODING_LIMITS_EXCEEDED));
        enc.leave();
        enc.enter().expect("2 again");
    }
}

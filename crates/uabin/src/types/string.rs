// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! String and ByteString.
//!
//! Both distinguish a null value (wire length `-1`) from an empty one
//! (wire length `0`).

use std::fmt;

/// UTF-8 string that may be null.
#[derive(Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct UaString(Option<String>);

impl UaString {
    pub fn null() -> Self {
        Self(None)
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// True for null and for zero-length strings.
    pub fn is_empty(&self) -> bool {
        self.0.as_deref().map_or(true, str::is_empty)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Byte length, 0 for null.
    pub fn len(&self) -> usize {
        self.0.as_ref().map_or(0, String::len)
    }

    pub fn into_inner(self) -> Option<String> {
        self.0
    }

    /// Fallible deep copy.
    pub fn try_clone(&self) -> Result<Self, std::collections::TryReserveError> {
        match &self.0 {
            None => Ok(Self(None)),
            Some(s) => {
                let mut out = String::new();
                out.try_reserve_exact(s.len())?;
                out.push_str(s);
                Ok(Self(Some(out)))
            }
        }
    }
}

impl From<&str> for UaString {
    fn from(value: &str) -> Self {
        Self(Some(value.to_string()))
    }
}

impl From<String> for UaString {
    fn from(value: String) -> Self {
        Self(Some(value))
    }
}

impl From<Option<String>> for UaString {
    fn from(value: Option<String>) -> Self {
        Self(value)
    }
}

impl fmt::Display for UaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(s) => f.write_str(s),
            None => f.write_str("<null>"),
        }
    }
}

impl fmt::Debug for UaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(s) => write!(f, "{:?}", s),
            None => f.write_str("null"),
        }
    }
}

/// Opaque byte sequence that may be null.
#[derive(Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ByteString(Option<Vec<u8>>);

impl ByteString {
    pub fn null() -> Self {
        Self(None)
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.0.as_ref().map_or(true, Vec::is_empty)
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.0.as_deref()
    }

    pub fn len(&self) -> usize {
        self.0.as_ref().map_or(0, Vec::len)
    }

    pub fn into_inner(self) -> Option<Vec<u8>> {
        self.0
    }

    /// Fallible deep copy.
    pub fn try_clone(&self) -> Result<Self, std::collections::TryReserveError> {
        match &self.0 {
            None => Ok(Self(None)),
            Some(b) => {
                let mut out = Vec::new();
                out.try_reserve_exact(b.len())?;
                out.extend_from_slice(b);
                Ok(Self(Some(out)))
            }
        }
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(value: Vec<u8>) -> Self {
        Self(Some(value))
    }
}

impl From<&[u8]> for ByteString {
    fn from(value: &[u8]) -> Self {
        Self(Some(value.to_vec()))
    }
}

impl From<Option<Vec<u8>>> for ByteString {
    fn from(value: Option<Vec<u8>>) -> Self {
        Self(value)
    }
}

impl fmt::Display for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => f.write_str("<null>"),
            Some(bytes) => {
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => f.write_str("null"),
            Some(_) => write!(f, "0x{}", self),
        }
    }
}

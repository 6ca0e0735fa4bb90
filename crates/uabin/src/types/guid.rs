// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::fmt;
use std::str::FromStr;

use super::StatusCode;

/// 16-byte GUID in OPC UA field layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl Guid {
    pub const fn null() -> Self {
        Self {
            data1: 0,
            data2: 0,
            data3: 0,
            data4: [0; 8],
        }
    }

    pub fn is_null(&self) -> bool {
        *self == Self::null()
    }

    /// Wire order: data1..data3 little-endian, data4 verbatim.
    pub fn to_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[0..4].copy_from_slice(&self.data1.to_le_bytes());
        out[4..6].copy_from_slice(&self.data2.to_le_bytes());
        out[6..8].copy_from_slice(&self.data3.to_le_bytes());
        out[8..16].copy_from_slice(&self.data4);
        out
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        let mut data4 = [0u8; 8];
        data4.copy_from_slice(&bytes[8..16]);
        Self {
            data1: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            data2: u16::from_le_bytes([bytes[4], bytes[5]]),
            data3: u16::from_le_bytes([bytes[6], bytes[7]]),
            data4,
        }
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-",
            self.data1, self.data2, self.data3, self.data4[0], self.data4[1]
        )?;
        for b in &self.data4[2..] {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl FromStr for Guid {
    type Err = StatusCode;

    /// Parses `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.bytes().all(|b| b.is_ascii_hexdigit() || b == b'-') {
            return Err(StatusCode::BAD_INVALID_ARGUMENT);
        }
        let parts: Vec<&str> = s.split('-').collect();
        let lens = [8, 4, 4, 4, 12];
        if parts.len() != 5 || parts.iter().zip(lens).any(|(p, l)| p.len() != l) {
            return Err(StatusCode::BAD_INVALID_ARGUMENT);
        }
        let hex = |t: &str| u64::from_str_radix(t, 16).map_err(|_| StatusCode::BAD_INVALID_ARGUMENT);
        let tail = format!("{}{}", parts[3], parts[4]);
        let mut data4 = [0u8; 8];
        for (i, slot) in data4.iter_mut().enumerate() {
            *slot = hex(&tail[i * 2..i * 2 + 2])? as u8;
        }
        Ok(Self {
            data1: hex(parts[0])? as u32,
            data2: hex(parts[1])? as u16,
            data3: hex(parts[2])? as u16,
            data4,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let text = "72962b91-fa75-4ae6-8d28-b404dc7daf63";
        let guid: Guid = text.parse().expect("parse");
        assert_eq!(guid.data1, 0x72962b91);
        assert_eq!(guid.data4[0], 0x8d);
        assert_eq!(guid.to_string(), text);
    }

    #[test]
    fn test_wire_layout() {
        let guid: Guid = "72962b91-fa75-4ae6-8d28-b404dc7daf63".parse().expect("parse");
        let bytes = guid.to_bytes();
        assert_eq!(&bytes[0..4], &[0x91, 0x2b, 0x96, 0x72]);
        assert_eq!(Guid::from_bytes(bytes), guid);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!("not-a-guid".parse::<Guid>().is_err());
        assert!("72962b91-fa75-4ae6-8d28-b404dc7daf6z".parse::<Guid>().is_err());
    }
}

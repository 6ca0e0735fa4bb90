// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{DateTime, StatusCode, Variant};

/// A value with status and timestamps, as returned by Read.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataValue {
    pub value: Option<Variant>,
    pub status: Option<StatusCode>,
    pub source_timestamp: Option<DateTime>,
    pub source_picoseconds: Option<u16>,
    pub server_timestamp: Option<DateTime>,
    pub server_picoseconds: Option<u16>,
}

impl DataValue {
    pub const VALUE: u8 = 0x01;
    pub const STATUS: u8 = 0x02;
    pub const SOURCE_TIMESTAMP: u8 = 0x04;
    pub const SERVER_TIMESTAMP: u8 = 0x08;
    pub const SOURCE_PICOSECONDS: u8 = 0x10;
    pub const SERVER_PICOSECONDS: u8 = 0x20;

    pub fn new(value: Variant) -> Self {
        Self {
            value: Some(value),
            ..Default::default()
        }
    }

    /// Value-less result carrying only a status.
    pub fn from_status(status: StatusCode) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn encoding_mask(&self) -> u8 {
        let mut mask = 0;
        if self.value.is_some() {
            mask |= Self::VALUE;
        }
        if self.status.is_some() {
            mask |= Self::STATUS;
        }
        if self.source_timestamp.is_some() {
            mask |= Self::SOURCE_TIMESTAMP;
        }
        if self.server_timestamp.is_some() {
            mask |= Self::SERVER_TIMESTAMP;
        }
        if self.source_picoseconds.is_some() {
            mask |= Self::SOURCE_PICOSECONDS;
        }
        if self.server_picoseconds.is_some() {
            mask |= Self::SERVER_PICOSECONDS;
        }
        mask
    }

    /// Status, defaulting to Good when absent.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::GOOD)
    }
}

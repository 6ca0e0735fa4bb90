// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{StatusCode, UaString};

/// Vendor diagnostics attached to a result.
///
/// The integer fields index into the string table of the enclosing
/// `ResponseHeader`. Every field is optional; absent fields are not encoded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiagnosticInfo {
    pub symbolic_id: Option<i32>,
    pub namespace_uri: Option<i32>,
    pub locale: Option<i32>,
    pub localized_text: Option<i32>,
    pub additional_info: Option<UaString>,
    pub inner_status_code: Option<StatusCode>,
    pub inner_diagnostic_info: Option<Box<DiagnosticInfo>>,
}

impl DiagnosticInfo {
    pub const SYMBOLIC_ID: u8 = 0x01;
    pub const NAMESPACE_URI: u8 = 0x02;
    pub const LOCALIZED_TEXT: u8 = 0x04;
    pub const LOCALE: u8 = 0x08;
    pub const ADDITIONAL_INFO: u8 = 0x10;
    pub const INNER_STATUS_CODE: u8 = 0x20;
    pub const INNER_DIAGNOSTIC_INFO: u8 = 0x40;

    /// Wire encoding mask for the fields that are present.
    pub fn encoding_mask(&self) -> u8 {
        let mut mask = 0;
        if self.symbolic_id.is_some() {
            mask |= Self::SYMBOLIC_ID;
        }
        if self.namespace_uri.is_some() {
            mask |= Self::NAMESPACE_URI;
        }
        if self.localized_text.is_some() {
            mask |= Self::LOCALIZED_TEXT;
        }
        if self.locale.is_some() {
            mask |= Self::LOCALE;
        }
        if self.additional_info.is_some() {
            mask |= Self::ADDITIONAL_INFO;
        }
        if self.inner_status_code.is_some() {
            mask |= Self::INNER_STATUS_CODE;
        }
        if self.inner_diagnostic_info.is_some() {
            mask |= Self::INNER_DIAGNOSTIC_INFO;
        }
        mask
    }

    pub fn is_empty(&self) -> bool {
        self.encoding_mask() == 0
    }

    /// Nesting depth of the inner diagnostic chain (0 without inner info).
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.inner_diagnostic_info.as_deref();
        while let Some(inner) = cursor {
            depth += 1;
            cursor = inner.inner_diagnostic_info.as_deref();
        }
        depth
    }
}

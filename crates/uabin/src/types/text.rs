// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::fmt;

use super::UaString;

/// Name qualified by a namespace index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct QualifiedName {
    pub namespace_index: u16,
    pub name: UaString,
}

impl QualifiedName {
    pub fn new(namespace_index: u16, name: impl Into<UaString>) -> Self {
        Self {
            namespace_index,
            name: name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace_index, self.name)
    }
}

/// Human readable text with an optional locale.
///
/// On the wire both parts are optional; a null part is simply omitted from
/// the encoding mask.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct LocalizedText {
    pub locale: UaString,
    pub text: UaString,
}

impl LocalizedText {
    pub fn new(locale: impl Into<UaString>, text: impl Into<UaString>) -> Self {
        Self {
            locale: locale.into(),
            text: text.into(),
        }
    }

    /// Text without locale.
    pub fn text(text: impl Into<UaString>) -> Self {
        Self {
            locale: UaString::null(),
            text: text.into(),
        }
    }
}

impl fmt::Display for LocalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.locale.as_str() {
            Some(locale) => write!(f, "[{}] {}", locale, self.text),
            None => write!(f, "{}", self.text),
        }
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec and dispatcher configuration.
//!
//! Supports both programmatic and file-based (TOML) configuration. Every
//! field has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UaConfig {
    #[serde(default)]
    pub encoding: EncodingLimits,

    #[serde(default)]
    pub dispatcher: DispatcherConfig,
}

/// Limits applied by the binary encoder and decoder.
///
/// Decoding fails with `BadEncodingLimitsExceeded` when a peer claims more
/// than these limits allow, before anything is allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingLimits {
    /// Maximum number of elements in one array.
    #[serde(default = "default_max_array_length")]
    pub max_array_length: u32,

    /// Maximum byte length of a String or XmlElement.
    #[serde(default = "default_max_string_length")]
    pub max_string_length: u32,

    /// Maximum byte length of a ByteString.
    #[serde(default = "default_max_bytestring_length")]
    pub max_bytestring_length: u32,

    /// Maximum nesting of structures, variants, extension objects and
    /// diagnostic infos.
    #[serde(default = "default_max_recursion_depth")]
    pub max_recursion_depth: u16,

    /// Maximum size of one encoded message.
    #[serde(default = "default_max_message_size")]
    pub max_message_size: u32,

    /// Encode and decode overlayable types with a single bounds check.
    #[serde(default = "default_true")]
    pub overlayable_fast_path: bool,
}

fn default_max_array_length() -> u32 {
    100_000
}

fn default_max_string_length() -> u32 {
    1 << 20
}

fn default_max_bytestring_length() -> u32 {
    16 << 20
}

fn default_max_recursion_depth() -> u16 {
    64
}

fn default_max_message_size() -> u32 {
    16 << 20
}

fn default_true() -> bool {
    true
}

impl Default for EncodingLimits {
    fn default() -> Self {
        Self {
            max_array_length: default_max_array_length(),
            max_string_length: default_max_string_length(),
            max_bytestring_length: default_max_bytestring_length(),
            max_recursion_depth: default_max_recursion_depth(),
            max_message_size: default_max_message_size(),
            overlayable_fast_path: true,
        }
    }
}

impl EncodingLimits {
    /// Same limits with the overlayable fast path turned off.
    pub fn generic_only(self) -> Self {
        Self {
            overlayable_fast_path: false,
            ..self
        }
    }
}

/// Dispatcher settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// In-flight requests tracked for cancellation. Requests beyond this
    /// bound are still served but cannot be cancelled.
    #[serde(default = "default_max_pending_requests")]
    pub max_pending_requests: usize,

    /// Hex-dump inbound and outbound messages under the `hex` log target.
    #[serde(default)]
    pub log_buffers: bool,
}

fn default_max_pending_requests() -> usize {
    4096
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_pending_requests: default_max_pending_requests(),
            log_buffers: false,
        }
    }
}

impl UaConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let enc = &self.encoding;
        if enc.max_array_length == 0 {
            return Err(ConfigError::Invalid("encoding.max_array_length must be > 0".into()));
        }
        if enc.max_string_length == 0 || enc.max_bytestring_length == 0 {
            return Err(ConfigError::Invalid(
                "encoding string limits must be > 0".into(),
            ));
        }
        if enc.max_recursion_depth == 0 {
            return Err(ConfigError::Invalid(
                "encoding.max_recursion_depth must be > 0".into(),
            ));
        }
        if enc.max_message_size < 1024 {
            return Err(ConfigError::Invalid(format!(
                "encoding.max_message_size {} is below 1024",
                enc.max_message_size
            )));
        }
        if enc.max_string_length > enc.max_message_size
            || enc.max_bytestring_length > enc.max_message_size
        {
            return Err(ConfigError::Invalid(
                "string limits exceed encoding.max_message_size".into(),
            ));
        }
        Ok(())
    }
}

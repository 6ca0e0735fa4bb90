// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # uabin - OPC UA binary service dispatch
//!
//! The server-side core of the OPC UA binary protocol: a descriptor-driven
//! type runtime, the Variant and ExtensionObject containers, the binary
//! codec, the table of request/response services and the dispatcher that
//! turns every request into exactly one response or `ServiceFault`.
//!
//! ## Quick Start
//!
//! ```rust
//! use uabin::config::EncodingLimits;
//! use uabin::encoding::{BinaryDecoder, BinaryEncodable, BinaryEncoder};
//! use uabin::types::{TypeTable, Variant};
//!
//! let value = Variant::from(42i32);
//! let mut enc = BinaryEncoder::new(EncodingLimits::default());
//! value.encode(&mut enc).expect("encode");
//! let bytes = enc.into_bytes();
//! assert_eq!(bytes, [0x06, 42, 0, 0, 0]);
//!
//! let table = TypeTable::new();
//! let mut dec = BinaryDecoder::new(&bytes, &table, EncodingLimits::default());
//! assert_eq!(Variant::decode(&mut dec), Ok(value));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +----------------------------------------------------------------+
//! |  service   ServiceTable | Dispatcher | Endpoint | Handlers     |
//! +----------------------------------------------------------------+
//! |  encoding  BinaryEncoder/Decoder | builtin | descriptor-driven |
//! +----------------------------------------------------------------+
//! |  types     DataType | runtime | Variant | ExtensionObject      |
//! |            namespace-zero catalog | TypeTable | NumericRange   |
//! +----------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`types`] - Type descriptors, values and the generic runtime
//! - [`encoding`] - OPC UA binary encoding
//! - [`service`] - Service table, messages and dispatcher
//! - [`config`] - Encoding limits and dispatcher settings
//! - [`debug`] - Hex dumps of wire buffers

/// Encoding limits and dispatcher settings, loadable from TOML.
pub mod config;
/// Hex dumps of wire buffers under the `hex` log target.
pub mod debug;
/// OPC UA binary encoding of builtin and described types.
pub mod encoding;
/// Service table, request/response messages and the dispatcher.
pub mod service;
/// Type descriptors, values, Variant/ExtensionObject and the type runtime.
pub mod types;

pub use config::{ConfigError, DispatcherConfig, EncodingLimits, UaConfig};
pub use service::{Dispatcher, ServiceId, ServiceRequest, ServiceResponse};
pub use types::{StatusCode, UaResult, Value, Variant};

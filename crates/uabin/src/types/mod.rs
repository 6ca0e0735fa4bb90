// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type system: builtin types, descriptors and the generic runtime.
//!
//! Every value the codec handles is a [`Value`] interpreted against an
//! `Arc<DataType>` descriptor. Descriptors for namespace zero live in the
//! process-wide [`catalog()`]; custom descriptors are built with
//! [`DataTypeBuilder`] and registered in a [`TypeTable`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use uabin::types::{catalog, runtime, Value, Variant};
//!
//! let ty = Arc::clone(&catalog().builtins.double);
//! let v = Variant::scalar(Arc::clone(&ty), Value::Double(21.5));
//! assert!(v.has_scalar_type(&ty));
//! let copy = runtime::copy(&Value::from(v), &catalog().builtins.variant).unwrap();
//! assert!(matches!(copy, Value::Variant(_)));
//! ```

mod builder;
mod catalog;
mod data_type;
mod data_value;
mod date_time;
mod diagnostic_info;
mod extension_object;
mod guid;
mod node_id;
mod numeric_range;
pub mod runtime;
mod status_code;
mod string;
mod text;
mod type_table;
mod value;
mod variant;


pub use builder::DataTypeBuilder;
pub use catalog::{catalog, Builtins, ServiceTypes, TypeCatalog};
pub use data_type::{DataType, DataTypeMember, TypeKind};
pub use data_value::DataValue;
pub use date_time::DateTime;
pub use diagnostic_info::DiagnosticInfo;
pub use extension_object::{ExtensionBody, ExtensionObject};
pub use guid::Guid;
pub use node_id::{ExpandedNodeId, Identifier, NodeId};
pub use numeric_range::{NumericRange, RangeDimension};
pub use status_code::{StatusCode, UaResult};
pub use string::{ByteString, UaString};
pub use text::{LocalizedText, QualifiedName};
pub use type_table::TypeTable;
pub use value::{Field, StructValue, UnionValue, Value};
pub use variant::{Variant, VariantData};

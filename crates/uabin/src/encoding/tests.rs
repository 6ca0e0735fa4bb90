// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec tests spanning builtin encodings, the generic path and the type
//! table.

use std::sync::Arc;

use super::*;
use crate::config::EncodingLimits;
use crate::types::{
    catalog, runtime, DataType, DataTypeBuilder, DataTypeMember, ExtensionBody, ExtensionObject,
    Field, NodeId, StatusCode, StructValue, TypeKind, TypeTable, UaResult, Value, Variant,
};

fn point_type() -> Arc<DataType> {
    let bt = &catalog().builtins;
    DataTypeBuilder::structure("Point", NodeId::numeric(2, 5001))
        .binary_encoding_id(NodeId::numeric(2, 5002))
        .field("X", &bt.int32)
        .field("Label", &bt.string)
        .build()
        .expect("point")
}

fn point(x: i32, label: &str) -> Value {
    Value::Structure(StructValue::new(vec![
        Field::Scalar(Value::Int32(x)),
        Field::Scalar(Value::from(label)),
    ]))
}

fn encode<T: BinaryEncodable>(value: &T) -> Vec<u8> {
    let mut enc = BinaryEncoder::new(EncodingLimits::default());
    value.encode(&mut enc).expect("encode");
    enc.into_bytes()
}

fn decode_with<T: BinaryEncodable>(bytes: &[u8], table: &TypeTable) -> UaResult<T> {
    let mut dec = BinaryDecoder::new(bytes, table, EncodingLimits::default());
    T::decode(&mut dec)
}

#[test]
fn test_structure_variant_travels_as_extension_object() {
    let ty = point_type();
    let mut table = TypeTable::new();
    table.register(Arc::clone(&ty)).expect("register");

    let variant = Variant::scalar(Arc::clone(&ty), point(7, "p"));
    let bytes = encode(&variant);
    assert_eq!(bytes[0], 22);

    let known: Variant = decode_with(&bytes, &table).expect("known");
    assert_eq!(known, variant);

    // A receiver without the type keeps the body opaque and re-emits it as is.
    let unknown: Variant = decode_with(&bytes, &TypeTable::new()).expect("unknown");
    assert!(unknown.has_scalar_type(&catalog().builtins.extension_object));
    assert_eq!(encode(&unknown), bytes);
}

#[test]
fn test_structure_array_unwrapped_only_when_uniform() {
    let ty = point_type();
    let mut table = TypeTable::new();
    table.register(Arc::clone(&ty)).expect("register");

    let variant = Variant::array(Arc::clone(&ty), vec![point(1, "a"), point(2, "b")]);
    let decoded: Variant = decode_with(&encode(&variant), &table).expect("decode");
    assert_eq!(decoded, variant);

    let eo_type = Arc::clone(&catalog().builtins.extension_object);
    let mixed = Variant::array(
        Arc::clone(&eo_type),
        vec![
            Value::ExtensionObject(ExtensionObject::from_value(Arc::clone(&ty), point(1, "a"))),
            Value::ExtensionObject(ExtensionObject::null()),
        ],
    );
    let decoded: Variant = decode_with(&encode(&mixed), &table).expect("mixed");
    assert!(decoded.has_array_type(&eo_type));
    assert_eq!(decoded.array_length(), 2);
}

#[test]
fn test_extension_object_promotion() {
    let ty = point_type();
    let mut table = TypeTable::new();
    table.register(Arc::clone(&ty)).expect("register");
    let limits = EncodingLimits::default();

    let decoded = ExtensionObject::from_value(Arc::clone(&ty), point(3, "z"));
    let encoded = decoded.to_encoded(&limits).expect("to_encoded");
    assert!(!encoded.is_decoded());
    assert_eq!(encoded.encoding_id(), &NodeId::numeric(2, 5002));

    // Unknown to an empty table: unchanged.
    let still_encoded = encoded
        .to_decoded(&TypeTable::new(), &limits)
        .expect("passthrough");
    assert_eq!(still_encoded, encoded);

    let promoted = encoded.to_decoded(&table, &limits).expect("promote");
    assert_eq!(promoted, decoded);

    // Trailing garbage after a known body is rejected.
    let ExtensionObject::Encoded {
        type_id,
        body: ExtensionBody::Binary(body),
    } = encoded
    else {
        panic!("expected binary body");
    };
    let mut padded = body.as_bytes().unwrap_or(&[]).to_vec();
    padded.push(0);
    let padded = ExtensionObject::Encoded {
        type_id,
        body: ExtensionBody::Binary(padded.into()),
    };
    assert_eq!(
        padded.to_decoded(&table, &limits),
        Err(StatusCode::BAD_DECODING_ERROR)
    );
}

#[test]
fn test_nesting_limit_on_decode() {
    // Variant arrays of variants, 80 levels deep.
    let mut bytes = Vec::new();
    for _ in 0..80 {
        bytes.push(0x80 | 24);
        bytes.extend_from_slice(&1i32.to_le_bytes());
    }
    bytes.push(0);
    let result: UaResult<Variant> = decode_with(&bytes, &TypeTable::new());
    assert_eq!(result, Err(StatusCode::BAD_ENCODING_LIMITS_EXCEEDED));
}

#[test]
fn test_nesting_limit_on_encode() {
    let variant_ty = Arc::clone(&catalog().builtins.variant);
    let mut v = Variant::from(1i32);
    for _ in 0..80 {
        v = Variant::array(Arc::clone(&variant_ty), vec![Value::from(v)]);
    }
    let mut enc = BinaryEncoder::new(EncodingLimits::default());
    assert_eq!(v.encode(&mut enc), Err(StatusCode::BAD_ENCODING_LIMITS_EXCEEDED));
}

#[test]
fn test_catalog_request_roundtrip() {
    let cat = catalog();
    let read = cat.find_by_name("ReadRequest").expect("ReadRequest");
    let mut value = runtime::init(read);
    if let Some(s) = value.as_struct_mut() {
        if let Some(Field::Scalar(Value::Double(max_age))) = s.get_mut(read, "MaxAge") {
            *max_age = 250.0;
        }
    }
    let mut enc = BinaryEncoder::new(EncodingLimits::default());
    encode_value(&mut enc, &value, read).expect("encode");
    let bytes = enc.into_bytes();
    assert_eq!(encoded_size(&value, read), Ok(bytes.len()));

    let table = TypeTable::new();
    let mut dec = BinaryDecoder::new(&bytes, &table, EncodingLimits::default());
    assert_eq!(decode_value(&mut dec, read), Ok(value));
    assert!(dec.is_eof());
}

#[test]
fn test_array_of_empty_structures_roundtrip() {
    let empty = DataTypeBuilder::structure("Empty", NodeId::numeric(2, 5101))
        .build()
        .expect("empty");
    let holder = DataTypeBuilder::structure("Holder", NodeId::numeric(2, 5102))
        .array_field("Items", &empty)
        .build()
        .expect("holder");
    assert_eq!(empty.min_wire_size(), 0);

    let item = Value::Structure(StructValue::new(Vec::new()));
    let value = Value::Structure(StructValue::new(vec![Field::Array(Some(vec![item; 3]))]));
    let table = TypeTable::new();
    for limits in [EncodingLimits::default(), EncodingLimits::default().generic_only()] {
        let mut enc = BinaryEncoder::new(limits);
        encode_value(&mut enc, &value, &holder).expect("encode");
        let bytes = enc.into_bytes();
        assert_eq!(bytes, vec![3, 0, 0, 0]);

        let mut dec = BinaryDecoder::new(&bytes, &table, limits);
        assert_eq!(decode_value(&mut dec, &holder), Ok(value.clone()));
        assert!(dec.is_eof());
    }
}

#[test]
fn test_optional_mask_overflow_is_an_error() {
    let bt = &catalog().builtins;
    let members = (0..33)
        .map(|i| DataTypeMember::scalar(format!("F{}", i), &bt.int32).optional())
        .collect();
    let wide = DataType::new(
        "Wide",
        NodeId::numeric(2, 5201),
        NodeId::numeric(2, 5202),
        TypeKind::OptStruct,
        members,
    );
    let value = Value::Structure(StructValue::new(vec![Field::Absent; 33]));

    let mut enc = BinaryEncoder::new(EncodingLimits::default());
    assert_eq!(
        encode_value(&mut enc, &value, &wide),
        Err(StatusCode::BAD_ENCODING_LIMITS_EXCEEDED)
    );

    let bytes = 0u32.to_le_bytes();
    let table = TypeTable::new();
    let mut dec = BinaryDecoder::new(&bytes, &table, EncodingLimits::default());
    assert_eq!(
        decode_value(&mut dec, &wide),
        Err(StatusCode::BAD_ENCODING_LIMITS_EXCEEDED)
    );
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

//! Codec integration tests: nested service messages, custom types registered
//! in a type table and agreement between the overlay and generic paths.

use std::sync::Arc;

use uabin::config::EncodingLimits;
use uabin::encoding::{decode_value, encode_value, encoded_size, BinaryDecoder, BinaryEncoder};
use uabin::service::{decode_request, encode_request, ServiceId, ServiceRequest};
use uabin::types::{
    catalog, DataType, DataTypeBuilder, DataValue, DateTime, Field, LocalizedText, NodeId,
    QualifiedName, StatusCode, StructValue, TypeTable, UnionValue, Value, Variant,
};

fn limits() -> EncodingLimits {
    EncodingLimits::default()
}

fn encode(value: &Value, ty: &DataType, limits: EncodingLimits) -> Vec<u8> {
    let mut enc = BinaryEncoder::new(limits);
    encode_value(&mut enc, value, ty).expect("encode");
    enc.into_bytes()
}

fn decode(bytes: &[u8], ty: &DataType, table: &TypeTable, limits: EncodingLimits) -> Value {
    let mut dec = BinaryDecoder::new(bytes, table, limits);
    let value = decode_value(&mut dec, ty).expect("decode");
    assert!(dec.is_eof(), "{} left {} bytes", ty.name, dec.remaining());
    value
}

fn matrix() -> Variant {
    let int32 = Arc::clone(&catalog().builtins.int32);
    let mut v = Variant::array(int32, (1..=6).map(Value::Int32).collect());
    v.set_array_dimensions(vec![2, 3]).expect("dims");
    v
}

fn write_value(node: NodeId, range: &str, value: DataValue) -> Value {
    Value::Structure(StructValue::new(vec![
        Field::Scalar(Value::NodeId(node)),
        Field::Scalar(Value::UInt32(13)),
        Field::Scalar(Value::from(range)),
        Field::Scalar(Value::from(value)),
    ]))
}

fn write_request() -> ServiceRequest {
    let mut request = ServiceRequest::for_service(ServiceId::Write).expect("write");
    request.header.request_handle = 4711;
    request.header.timestamp = DateTime(133_000_000_000_000_000);
    request.header.timeout_hint = 2500;

    let matrix_value = DataValue {
        value: Some(matrix()),
        status: Some(StatusCode::GOOD),
        source_timestamp: Some(DateTime(133_000_000_000_000_001)),
        source_picoseconds: Some(7),
        ..Default::default()
    };
    let text_value = DataValue::new(Variant::scalar(
        Arc::clone(&catalog().builtins.localized_text),
        Value::LocalizedText(LocalizedText::new("en", "pump")),
    ));
    request
        .set(
            "NodesToWrite",
            vec![
                write_value(NodeId::string(2, "Line1.Pump.Setpoints"), "0:1,1:2", matrix_value),
                write_value(NodeId::numeric(3, 1001), "", text_value),
            ],
        )
        .expect("nodes");
    request
}

#[test]
fn test_nested_write_request_roundtrip() {
    let request = write_request();
    let bytes = encode_request(&request, limits()).expect("encode");
    // WriteRequest binary encoding id 673 in four-byte form.
    assert_eq!(&bytes[..4], &[0x01, 0x00, 0xA1, 0x02]);

    let decoded = decode_request(&bytes, &TypeTable::new(), limits()).expect("decode");
    assert_eq!(decoded, request);

    let Some(Field::Array(Some(nodes))) = decoded.get("NodesToWrite") else {
        panic!("NodesToWrite missing");
    };
    let Value::Structure(first) = &nodes[0] else {
        panic!("not a structure");
    };
    let Field::Scalar(Value::DataValue(dv)) = &first.fields[3] else {
        panic!("not a data value");
    };
    let variant = dv.value.as_ref().expect("value");
    assert_eq!(variant.array_dimensions(), Some(&[2u32, 3][..]));
    assert_eq!(variant.array_length(), 6);
}

#[test]
fn test_encoded_size_matches_bytes() {
    let request = write_request();
    let ty = &request.encodeable_type;
    let body_type = DataType::new(
        "WriteBody",
        NodeId::null(),
        NodeId::null(),
        ty.kind,
        ty.members[1..].to_vec(),
    );
    let value = Value::Structure(request.body.clone());
    let bytes = encode(&value, &body_type, limits());
    assert_eq!(encoded_size(&value, &body_type), Ok(bytes.len()));

    let dv_type = &catalog().builtins.data_value;
    let dv = Value::from(DataValue::from_status(StatusCode::BAD_NOT_READABLE));
    assert_eq!(encoded_size(&dv, dv_type), Ok(5));
}

#[test]
fn test_call_request_with_custom_argument() {
    let bt = &catalog().builtins;
    let setpoint = DataTypeBuilder::structure("Setpoint", NodeId::numeric(2, 3001))
        .binary_encoding_id(NodeId::numeric(2, 3002))
        .field("Name", &bt.qualified_name)
        .field("Target", &bt.double)
        .array_field("Steps", &bt.uint16)
        .build()
        .expect("setpoint");
    let mut table = TypeTable::new();
    table.register(Arc::clone(&setpoint)).expect("register");

    let argument = Variant::scalar(
        Arc::clone(&setpoint),
        Value::Structure(StructValue::new(vec![
            Field::Scalar(Value::QualifiedName(QualifiedName::new(2, "Flow"))),
            Field::Scalar(Value::Double(12.5)),
            Field::Array(Some(vec![Value::UInt16(1), Value::UInt16(2)])),
        ])),
    );
    let method = Value::Structure(StructValue::new(vec![
        Field::Scalar(Value::NodeId(NodeId::numeric(2, 50))),
        Field::Scalar(Value::NodeId(NodeId::numeric(2, 51))),
        Field::Array(Some(vec![Value::from(argument), Value::from(Variant::from("manual"))])),
    ]));

    let mut request = ServiceRequest::for_service(ServiceId::Call).expect("call");
    request.header.request_handle = 9;
    request.set("MethodsToCall", vec![method]).expect("methods");
    let bytes = encode_request(&request, limits()).expect("encode");

    let known = decode_request(&bytes, &table, limits()).expect("known");
    assert_eq!(known, request);

    // Without the type the argument stays an opaque ExtensionObject, and
    // re-encoding reproduces the original bytes.
    let opaque = decode_request(&bytes, &TypeTable::new(), limits()).expect("opaque");
    assert_ne!(opaque, request);
    assert_eq!(encode_request(&opaque, limits()).expect("re-encode"), bytes);
}

#[test]
fn test_optional_fields_and_union() {
    let bt = &catalog().builtins;
    let opt = DataTypeBuilder::optional_structure("Limits", NodeId::numeric(2, 4001))
        .binary_encoding_id(NodeId::numeric(2, 4002))
        .field("Id", &bt.uint32)
        .optional_field("Low", &bt.double)
        .optional_array_field("Tags", &bt.string)
        .optional_field("High", &bt.double)
        .build()
        .expect("limits");
    let value = Value::Structure(StructValue::new(vec![
        Field::Scalar(Value::UInt32(5)),
        Field::Absent,
        Field::Array(Some(vec![Value::from("a")])),
        Field::Scalar(Value::Double(9.0)),
    ]));
    let bytes = encode(&value, &opt, limits());
    // Mask: Tags (bit 1) and High (bit 2).
    assert_eq!(&bytes[..4], &[0b110, 0, 0, 0]);
    assert_eq!(decode(&bytes, &opt, &TypeTable::new(), limits()), value);

    let choice = DataTypeBuilder::union("Choice", NodeId::numeric(2, 4003))
        .binary_encoding_id(NodeId::numeric(2, 4004))
        .field("Count", &bt.int32)
        .array_field("Names", &bt.string)
        .build()
        .expect("choice");
    let names = Value::Union(UnionValue {
        switch: 2,
        value: Some(Box::new(Field::Array(Some(vec![Value::from("x"), Value::from("y")])))),
    });
    let bytes = encode(&names, &choice, limits());
    assert_eq!(&bytes[..4], &[2, 0, 0, 0]);
    assert_eq!(decode(&bytes, &choice, &TypeTable::new(), limits()), names);

    let empty = Value::Union(UnionValue::default());
    assert_eq!(encode(&empty, &choice, limits()), vec![0, 0, 0, 0]);
}

#[test]
fn test_overlay_and_generic_paths_agree() {
    let bt = &catalog().builtins;
    let sample = DataTypeBuilder::structure("Sample", NodeId::numeric(2, 6001))
        .binary_encoding_id(NodeId::numeric(2, 6002))
        .field("Id", &bt.uint16)
        .field("Value", &bt.double)
        .field("Count", &bt.int64)
        .build()
        .expect("sample");
    assert!(sample.overlayable());

    let samples: Vec<Value> = (0..32)
        .map(|i| {
            Value::Structure(StructValue::new(vec![
                Field::Scalar(Value::UInt16(i)),
                Field::Scalar(Value::Double(f64::from(i) * 0.25)),
                Field::Scalar(Value::Int64(-i64::from(i))),
            ]))
        })
        .collect();
    let holder = DataTypeBuilder::structure("Batch", NodeId::numeric(2, 6003))
        .binary_encoding_id(NodeId::numeric(2, 6004))
        .array_field("Samples", &sample)
        .array_field("Raw", &bt.float)
        .build()
        .expect("batch");
    let batch = Value::Structure(StructValue::new(vec![
        Field::Array(Some(samples)),
        Field::Array(Some(vec![Value::Float(1.5), Value::Float(-0.0)])),
    ]));

    let fast = encode(&batch, &holder, limits());
    let slow = encode(&batch, &holder, limits().generic_only());
    assert_eq!(fast, slow);
    assert_eq!(fast.len(), 4 + 32 * 18 + 4 + 2 * 4);

    let table = TypeTable::new();
    let a = decode(&fast, &holder, &table, limits());
    let b = decode(&fast, &holder, &table, limits().generic_only());
    assert_eq!(a, batch);
    assert_eq!(a, b);

    // Both paths reject the same short buffer.
    for limits in [limits(), limits().generic_only()] {
        let mut dec = BinaryDecoder::new(&fast[..fast.len() - 3], &table, limits);
        assert_eq!(decode_value(&mut dec, &holder), Err(StatusCode::BAD_DECODING_ERROR));
    }
}

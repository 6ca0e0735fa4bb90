// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use uabin::config::EncodingLimits;
use uabin::encoding::{BinaryDecoder, BinaryEncodable, BinaryEncoder};
use uabin::types::{DataValue, TypeTable, Variant};

fuzz_target!(|data: &[u8]| {
    let types = TypeTable::new();

    // Where both codec paths accept the input they must agree.
    let fast = {
        let mut dec = BinaryDecoder::new(data, &types, EncodingLimits::default());
        Variant::decode(&mut dec)
    };
    let generic = {
        let mut dec = BinaryDecoder::new(data, &types, EncodingLimits::default().generic_only());
        Variant::decode(&mut dec)
    };
    if let (Ok(a), Ok(b)) = (&fast, &generic) {
        assert_eq!(a, b);
    }

    if let Ok(variant) = fast {
        let mut enc = BinaryEncoder::new(EncodingLimits::default());
        let _ = variant.encode(&mut enc);
    }

    let mut dec = BinaryDecoder::new(data, &types, EncodingLimits::default());
    let _ = DataValue::decode(&mut dec);
});

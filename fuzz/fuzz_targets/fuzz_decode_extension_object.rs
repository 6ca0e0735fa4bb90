// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use uabin::config::EncodingLimits;
use uabin::encoding::{BinaryDecoder, BinaryEncodable};
use uabin::types::{DiagnosticInfo, ExtensionObject, TypeTable};

fuzz_target!(|data: &[u8]| {
    let types = TypeTable::new();
    let limits = EncodingLimits::default();

    let mut dec = BinaryDecoder::new(data, &types, limits);
    if let Ok(eo) = ExtensionObject::decode(&mut dec) {
        // Opaque bodies of catalog types may decode further; neither form may panic.
        if let Ok(decoded) = eo.to_decoded(&types, &limits) {
            let _ = decoded.to_encoded(&limits);
        }
    }

    let mut dec = BinaryDecoder::new(data, &types, limits);
    let _ = DiagnosticInfo::decode(&mut dec);
});

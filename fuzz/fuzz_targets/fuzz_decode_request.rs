// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use uabin::config::EncodingLimits;
use uabin::service::{decode_request, decode_response, encode_request};
use uabin::types::TypeTable;

fuzz_target!(|data: &[u8]| {
    let types = TypeTable::new();
    let limits = EncodingLimits::default();

    // Anything that decodes must encode again.
    if let Ok(request) = decode_request(data, &types, limits) {
        let _ = encode_request(&request, limits).expect("decoded request re-encodes");
    }

    let _ = decode_response(data, &types, limits);
});

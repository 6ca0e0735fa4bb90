// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Hex dumps of wire buffers.

use std::fmt::Write;

/// Log target of [`log_buffer`].
pub const HEX_TARGET: &str = "hex";

const ROW: usize = 16;

/// Dump `bytes` in rows of 16 (offset, hex, ASCII) under the `hex` target.
/// Does nothing unless that target is enabled at trace level.
pub fn log_buffer(message: &str, bytes: &[u8]) {
    if !log::log_enabled!(target: HEX_TARGET, log::Level::Trace) {
        return;
    }
    log::trace!(target: HEX_TARGET, "{} ({} bytes)", message, bytes.len());
    for (row, chunk) in bytes.chunks(ROW).enumerate() {
        log::trace!(target: HEX_TARGET, "{}", format_row(row * ROW, chunk));
    }
}

/// One dump row: `0010: 01 02 .. |..|`.
pub fn format_row(offset: usize, row: &[u8]) -> String {
    let mut line = String::with_capacity(8 + ROW * 4 + 2);
    let _ = write!(line, "{:04x}: ", offset);
    for byte in row {
        let _ = write!(line, "{:02x} ", byte);
    }
    // Padding if incomplete row
    for _ in row.len()..ROW {
        line.push_str("   ");
    }
    line.push('|');
    for &byte in row {
        line.push(if (0x20..=0x7e).contains(&byte) {
            byte as char
        } else {
            '.'
        });
    }
    line.push('|');
    line
}

/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Fixed-size byte buffers used as Bloom-style sets of bit positions.
//!
//! Bit `i` lives in byte `(i / 8) % buffer.len()` at bit `i % 8`. Indices past the end
//! wrap around, so a buffer never grows beyond its configured size no matter how large
//! the hash range is. Wrapping aliases distinct indices onto the same bit, which can
//! only add false positives.

/// Returns `(byte, mask)` for a bit index in a buffer of `number_of_bytes` bytes.
#[inline(always)]
fn locate(number_of_bytes: usize, bit_index: u32) -> (usize, u8) {
    let wrap_over_byte_index = (bit_index / 8) as usize;
    (
        wrap_over_byte_index % number_of_bytes,
        1u8 << (bit_index % 8),
    )
}

/// `true` iff every index in `bit_indices` is set in `buffer`.
///
/// An empty index list is vacuously contained. An empty buffer contains nothing else.
pub fn contains(buffer: &[u8], bit_indices: &[u32]) -> bool {
    if buffer.is_empty() {
        return bit_indices.is_empty();
    }
    bit_indices.iter().all(|&bit_index| {
        let (byte, mask) = locate(buffer.len(), bit_index);
        buffer[byte] & mask != 0
    })
}

/// `true` iff at least one group of indices is fully contained in `buffer`.
pub fn contains_any<'a, I>(buffer: &[u8], groups: I) -> bool
where
    I: IntoIterator<Item = &'a [u32]>,
{
    groups
        .into_iter()
        .any(|bit_indices| contains(buffer, bit_indices))
}

/// Builds a buffer of exactly `number_of_bytes` bytes with the given bits set.
///
/// # Panics
///
/// Panics when `number_of_bytes` is zero; configuration validation rejects that size.
pub fn construct<I>(number_of_bytes: usize, bit_indices: I) -> Vec<u8>
where
    I: IntoIterator<Item = u32>,
{
    assert!(number_of_bytes > 0, "bit vector needs at least one byte");

    let mut buffer = vec![0u8; number_of_bytes];
    for bit_index in bit_indices {
        let (byte, mask) = locate(number_of_bytes, bit_index);
        buffer[byte] |= mask;
    }
    buffer
}

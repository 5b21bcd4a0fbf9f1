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

//! Topic hash representations and their membership tests.

use crate::approximation::bit_vector_set;
use ddata_api::ReplicatedValue;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

/// Hash of one topic, and the elements it contributes to a replicated binding.
///
/// A binding is the set union of the elements of every live topic. Two topics may
/// share elements; the binding keeps an element while any live topic contributes it.
pub trait TopicHash: Clone + Debug + Eq + Hash + Send + Sync + 'static {
    type Element: ReplicatedValue;

    /// Distinct, non-empty.
    fn elements(&self) -> Vec<Self::Element>;
}

impl TopicHash for String {
    type Element = String;

    fn elements(&self) -> Vec<String> {
        vec![self.clone()]
    }
}

/// Deterministic mapping from topics to a replicable hash representation.
///
/// `hash` must be pure: the same topic yields the same hash on every member for as long
/// as the hasher configuration is unchanged. `matches` must never report `false` for a
/// query hash whose elements are all in `bound`.
pub trait TopicHasher: Send + Sync + 'static {
    type Hash: TopicHash;

    fn hash(&self, topic: &str) -> Self::Hash;

    /// Whether a binding holding `bound` may be interested in any of `query`.
    fn matches(
        &self,
        bound: &HashSet<<Self::Hash as TopicHash>::Element>,
        query: &[Self::Hash],
    ) -> bool;
}

/// Bit positions derived from one topic, each below the hasher's bit count.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct TopicBits(Vec<u32>);

impl TopicBits {
    pub fn indices(&self) -> &[u32] {
        &self.0
    }
}

impl TopicHash for TopicBits {
    type Element = u32;

    fn elements(&self) -> Vec<u32> {
        let mut elements = self.0.clone();
        elements.sort_unstable();
        elements.dedup();
        elements
    }
}

/// Bloom-style hasher over a `number_of_bytes` bit vector.
///
/// Each topic sets `hash_count` bit positions. A binding replicates the set bit
/// positions, so it never holds more than `8 * number_of_bytes` elements however many
/// topics a member subscribes to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BloomTopicHasher {
    number_of_bytes: usize,
    hash_count: usize,
}

impl BloomTopicHasher {
    /// # Panics
    ///
    /// Panics when either parameter is zero.
    pub fn new(number_of_bytes: usize, hash_count: usize) -> Self {
        assert!(number_of_bytes > 0, "bloom buffer needs at least one byte");
        assert!(hash_count > 0, "bloom hasher needs at least one hash");
        Self {
            number_of_bytes,
            hash_count,
        }
    }

    pub fn number_of_bytes(&self) -> usize {
        self.number_of_bytes
    }

    pub fn hash_count(&self) -> usize {
        self.hash_count
    }

    /// Upper bound on the elements of one binding.
    pub fn bit_count(&self) -> usize {
        self.number_of_bytes * 8
    }

    /// Materializes a binding's bit positions as its `number_of_bytes` bit vector.
    pub fn compact<I>(&self, bits: I) -> Vec<u8>
    where
        I: IntoIterator<Item = u32>,
    {
        bit_vector_set::construct(self.number_of_bytes, bits)
    }
}

impl TopicHasher for BloomTopicHasher {
    type Hash = TopicBits;

    fn hash(&self, topic: &str) -> TopicBits {
        let mut hasher = blake3::Hasher::new();
        hasher.update(topic.as_bytes());
        let mut output = hasher.finalize_xof();

        let mut bytes = vec![0u8; self.hash_count * 4];
        output.fill(&mut bytes);

        // Same bit as the wrapped index, kept in range so bindings stay bounded.
        let bit_count = self.bit_count() as u64;
        TopicBits(
            bytes
                .chunks_exact(4)
                .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .map(|index| (u64::from(index) % bit_count) as u32)
                .collect(),
        )
    }

    fn matches(&self, bound: &HashSet<u32>, query: &[TopicBits]) -> bool {
        if bound.is_empty() {
            return false;
        }
        let buffer = self.compact(bound.iter().copied());
        bit_vector_set::contains_any(&buffer, query.iter().map(TopicBits::indices))
    }
}

/// Exact hasher: the hash of a topic is the topic itself.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LiteralTopicHasher;

impl TopicHasher for LiteralTopicHasher {
    type Hash = String;

    fn hash(&self, topic: &str) -> String {
        topic.to_string()
    }

    fn matches(&self, bound: &HashSet<String>, query: &[String]) -> bool {
        query.iter().any(|topic| bound.contains(topic))
    }
}

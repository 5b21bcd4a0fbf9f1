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

use std::collections::BTreeSet;

/// Local subscribers of one topic together with the topic's hash.
///
/// Lives in the registry only while `subscribers` is non-empty.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct TopicEntry<S: Ord, H> {
    subscribers: BTreeSet<S>,
    hash: H,
}

impl<S: Ord, H> TopicEntry<S, H> {
    pub fn first_subscriber(subscriber: S, hash: H) -> Self {
        Self {
            subscribers: BTreeSet::from([subscriber]),
            hash,
        }
    }

    /// Returns `true` only when the subscriber was not present yet.
    pub fn add_subscriber(&mut self, subscriber: S) -> bool {
        self.subscribers.insert(subscriber)
    }

    /// Returns `true` only when the subscriber was present.
    pub fn remove_subscriber(&mut self, subscriber: &S) -> bool {
        self.subscribers.remove(subscriber)
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn subscribers(&self) -> &BTreeSet<S> {
        &self.subscribers
    }

    pub fn hash(&self) -> &H {
        &self.hash
    }
}

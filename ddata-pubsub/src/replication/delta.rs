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

//! Net binding-element changes accumulated between two flushes.

use ddata_api::{BindingUpdate, ReplicatedValue};
use std::collections::HashSet;
use std::hash::Hash;

/// Pending inserts and deletes for one member's binding.
///
/// `inserts` and `deletes` never share an element: recording one side cancels the other.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubscriptionDelta<V: Eq + Hash> {
    inserts: HashSet<V>,
    deletes: HashSet<V>,
    replace_all: bool,
}

impl<V: Eq + Hash> SubscriptionDelta<V> {
    pub fn new() -> Self {
        Self {
            inserts: HashSet::new(),
            deletes: HashSet::new(),
            replace_all: false,
        }
    }

    /// A delta that overwrites the whole binding with `live`.
    pub fn replacing(live: HashSet<V>) -> Self {
        Self {
            inserts: live,
            deletes: HashSet::new(),
            replace_all: true,
        }
    }

    pub fn insert(&mut self, element: V) {
        self.deletes.remove(&element);
        self.inserts.insert(element);
    }

    pub fn delete(&mut self, element: V) {
        self.inserts.remove(&element);
        self.deletes.insert(element);
    }

    pub fn inserts(&self) -> &HashSet<V> {
        &self.inserts
    }

    pub fn deletes(&self) -> &HashSet<V> {
        &self.deletes
    }

    pub fn should_replace_all(&self) -> bool {
        self.replace_all
    }

    /// Nothing to write. A replacing delta is never empty, even with no inserts.
    pub fn is_empty(&self) -> bool {
        !self.replace_all && self.inserts.is_empty() && self.deletes.is_empty()
    }

    /// Hands out the accumulated changes and leaves an empty delta behind.
    pub fn export_and_reset(&mut self) -> Self {
        std::mem::replace(self, Self::new())
    }
}

impl<V: ReplicatedValue> SubscriptionDelta<V> {
    pub fn into_binding_update(self) -> BindingUpdate<V> {
        BindingUpdate {
            removes: self.deletes,
            adds: self.inserts,
            replace_all: self.replace_all,
        }
    }
}

impl<V: Eq + Hash> Default for SubscriptionDelta<V> {
    fn default() -> Self {
        Self::new()
    }
}

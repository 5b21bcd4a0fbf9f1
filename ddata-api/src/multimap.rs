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

//! Replicated key -> set-of-values map contract.

use crate::{
    MemberAddress, ReadConsistency, ReplicationError, SubscriberAddress, WriteConsistency,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use tokio::sync::broadcast;

/// Values a replicated map can carry: hashable for set semantics, serializable for the wire.
pub trait ReplicatedValue:
    Clone + Debug + Eq + Hash + Send + Sync + Serialize + DeserializeOwned + 'static
{
}

impl<T> ReplicatedValue for T where
    T: Clone + Debug + Eq + Hash + Send + Sync + Serialize + DeserializeOwned + 'static
{
}

/// One atomic change to the binding of a single key.
///
/// Removes are applied before adds. With `replace_all` the existing binding is
/// discarded first and `removes` is irrelevant.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BindingUpdate<V: ReplicatedValue> {
    pub removes: HashSet<V>,
    pub adds: HashSet<V>,
    pub replace_all: bool,
}

impl<V: ReplicatedValue> BindingUpdate<V> {
    /// Applies this update to a binding's current value set.
    pub fn apply_to(&self, binding: &mut HashSet<V>) {
        if self.replace_all {
            binding.clear();
        } else {
            for value in &self.removes {
                binding.remove(value);
            }
        }
        binding.extend(self.adds.iter().cloned());
    }
}

/// Pushed after a replicated change became visible locally.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ChangeNotification {
    Updated(SubscriberAddress),
    Removed(SubscriberAddress),
    /// All bindings owned by a member were dropped.
    OwnerRemoved(MemberAddress),
}

/// Replicated multimap from subscriber keys to sets of values.
///
/// Each key is written only by the member in [`SubscriberAddress::member`].
#[async_trait]
pub trait ReplicatedMultimap<V: ReplicatedValue>: Send + Sync {
    /// Reads the whole map at the requested consistency.
    async fn read_all(
        &self,
        consistency: ReadConsistency,
    ) -> Result<HashMap<SubscriberAddress, HashSet<V>>, ReplicationError>;

    /// Applies `update` to the binding of `key` atomically.
    async fn update_binding(
        &self,
        key: &SubscriberAddress,
        update: BindingUpdate<V>,
        consistency: WriteConsistency,
    ) -> Result<(), ReplicationError>;

    async fn remove_binding(
        &self,
        key: &SubscriberAddress,
        consistency: WriteConsistency,
    ) -> Result<(), ReplicationError>;

    /// Removes every binding whose key is owned by `owner`.
    async fn remove_owner(
        &self,
        owner: &MemberAddress,
        consistency: WriteConsistency,
    ) -> Result<(), ReplicationError>;

    fn subscribe_changes(&self) -> broadcast::Receiver<ChangeNotification>;
}

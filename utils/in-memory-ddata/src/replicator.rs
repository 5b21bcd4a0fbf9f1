/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
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

use async_trait::async_trait;
use ddata_api::{
    BindingUpdate, ChangeNotification, MemberAddress, ReadConsistency, ReplicatedMultimap,
    ReplicatedValue, ReplicationError, SubscriberAddress, WriteConsistency,
};
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::{self, canonicalize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, warn};

const CHANGE_NOTIFICATION_CAPACITY: usize = 256;

/// Failures while seeding a replicator from a static JSON file.
#[derive(Debug)]
pub enum SeedError {
    NotFound(String),
    Unreadable(String),
    InvalidJson(String),
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedError::NotFound(reason) => write!(f, "static seed file not found: {reason}"),
            SeedError::Unreadable(reason) => write!(f, "unable to read seed file: {reason}"),
            SeedError::InvalidJson(reason) => write!(f, "unable to parse seed file: {reason}"),
        }
    }
}

impl Error for SeedError {}

struct ReplicaState<V: ReplicatedValue> {
    bindings: HashMap<SubscriberAddress, HashSet<V>>,
    cluster_size: usize,
    reachable: usize,
    writes: usize,
    reads: usize,
    injected_write_failures: VecDeque<ReplicationError>,
    injected_read_failures: VecDeque<ReplicationError>,
}

impl<V: ReplicatedValue> ReplicaState<V> {
    fn required_for_write(&self, consistency: WriteConsistency) -> usize {
        match consistency {
            WriteConsistency::Local => 1,
            WriteConsistency::To { n, .. } => n,
            WriteConsistency::Majority { .. } => self.cluster_size / 2 + 1,
            WriteConsistency::All { .. } => self.cluster_size,
        }
    }

    fn required_for_read(&self, consistency: ReadConsistency) -> usize {
        match consistency {
            ReadConsistency::Local => 1,
            ReadConsistency::From { n, .. } => n,
            ReadConsistency::Majority { .. } => self.cluster_size / 2 + 1,
            ReadConsistency::All { .. } => self.cluster_size,
        }
    }

    fn admit_write(&mut self, consistency: WriteConsistency) -> Result<(), ReplicationError> {
        if let Some(injected) = self.injected_write_failures.pop_front() {
            return Err(injected);
        }
        let required = self.required_for_write(consistency);
        if required > self.reachable {
            return Err(ReplicationError::ConsistencyNotMet {
                required,
                reachable: self.reachable,
            });
        }
        self.writes += 1;
        Ok(())
    }

    fn admit_read(&mut self, consistency: ReadConsistency) -> Result<(), ReplicationError> {
        if let Some(injected) = self.injected_read_failures.pop_front() {
            return Err(injected);
        }
        let required = self.required_for_read(consistency);
        if required > self.reachable {
            return Err(ReplicationError::ConsistencyNotMet {
                required,
                reachable: self.reachable,
            });
        }
        self.reads += 1;
        Ok(())
    }
}

/// Shared in-process replica. Clones observe the same bindings.
pub struct InMemoryReplicator<V: ReplicatedValue> {
    state: Arc<Mutex<ReplicaState<V>>>,
    changes: broadcast::Sender<ChangeNotification>,
}

impl<V: ReplicatedValue> Clone for InMemoryReplicator<V> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            changes: self.changes.clone(),
        }
    }
}

impl<V: ReplicatedValue> Default for InMemoryReplicator<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: ReplicatedValue> InMemoryReplicator<V> {
    /// Creates an empty single-replica map.
    pub fn new() -> Self {
        Self::with_bindings(HashMap::new())
    }

    fn with_bindings(bindings: HashMap<SubscriberAddress, HashSet<V>>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_NOTIFICATION_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(ReplicaState {
                bindings,
                cluster_size: 1,
                reachable: 1,
                writes: 0,
                reads: 0,
                injected_write_failures: VecDeque::new(),
                injected_read_failures: VecDeque::new(),
            })),
            changes,
        }
    }

    /// Seeds bindings from a JSON object of `"<subscriber address>": [values...]`.
    ///
    /// Entries with an unparsable key or value are logged and skipped.
    pub fn from_static_file(static_file: impl Into<PathBuf>) -> Result<Self, SeedError> {
        let static_file = static_file.into();
        debug!("seed file: {static_file:?}");

        let static_file =
            canonicalize(static_file).map_err(|e| SeedError::NotFound(format!("{e:?}")))?;
        let data =
            fs::read_to_string(static_file).map_err(|e| SeedError::Unreadable(format!("{e:?}")))?;
        let res: Value =
            serde_json::from_str(&data).map_err(|e| SeedError::InvalidJson(format!("{e:?}")))?;

        let Some(obj) = res.as_object() else {
            return Err(SeedError::InvalidJson(
                "top level must be an object".to_string(),
            ));
        };

        let mut bindings = HashMap::new();
        for (key, value) in obj {
            let subscriber = match key.parse::<SubscriberAddress>() {
                Ok(subscriber) => subscriber,
                Err(error) => {
                    error!("Error with deserializing key: {error}");
                    continue;
                }
            };

            let Some(array) = value.as_array() else {
                warn!("Binding for '{key}' is not an array, skipping");
                continue;
            };

            let mut values = HashSet::new();
            for item in array {
                match serde_json::from_value::<V>(item.clone()) {
                    Ok(parsed) => {
                        values.insert(parsed);
                    }
                    Err(error) => {
                        error!("Error with deserializing value '{item}' for '{key}': {error}");
                    }
                }
            }
            bindings.insert(subscriber, values);
        }
        debug!("Finished reading {} seeded bindings", bindings.len());

        Ok(Self::with_bindings(bindings))
    }

    /// Simulates a cluster of `cluster_size` replicas of which `reachable` answer.
    pub async fn set_reachable_replicas(&self, cluster_size: usize, reachable: usize) {
        let cluster_size = cluster_size.max(1);
        let mut state = self.state.lock().await;
        state.cluster_size = cluster_size;
        state.reachable = reachable.clamp(1, cluster_size);
    }

    /// Makes the next writes fail with the given errors, in order.
    pub async fn fail_next_writes(&self, errors: impl IntoIterator<Item = ReplicationError>) {
        self.state
            .lock()
            .await
            .injected_write_failures
            .extend(errors);
    }

    pub async fn fail_next_reads(&self, errors: impl IntoIterator<Item = ReplicationError>) {
        self.state
            .lock()
            .await
            .injected_read_failures
            .extend(errors);
    }

    /// Number of writes that reached the map.
    pub async fn write_count(&self) -> usize {
        self.state.lock().await.writes
    }

    pub async fn read_count(&self) -> usize {
        self.state.lock().await.reads
    }

    pub async fn binding(&self, key: &SubscriberAddress) -> Option<HashSet<V>> {
        self.state.lock().await.bindings.get(key).cloned()
    }

    pub async fn keys(&self) -> HashSet<SubscriberAddress> {
        self.state.lock().await.bindings.keys().cloned().collect()
    }

    fn notify(&self, change: ChangeNotification) {
        // No receivers is fine; nobody asked to be told.
        let _ = self.changes.send(change);
    }
}

#[async_trait]
impl<V: ReplicatedValue> ReplicatedMultimap<V> for InMemoryReplicator<V> {
    async fn read_all(
        &self,
        consistency: ReadConsistency,
    ) -> Result<HashMap<SubscriberAddress, HashSet<V>>, ReplicationError> {
        let mut state = self.state.lock().await;
        state.admit_read(consistency)?;
        Ok(state.bindings.clone())
    }

    async fn update_binding(
        &self,
        key: &SubscriberAddress,
        update: BindingUpdate<V>,
        consistency: WriteConsistency,
    ) -> Result<(), ReplicationError> {
        {
            let mut state = self.state.lock().await;
            state.admit_write(consistency)?;

            let binding = state.bindings.entry(key.clone()).or_default();
            update.apply_to(binding);
            if binding.is_empty() {
                state.bindings.remove(key);
            }
        }
        self.notify(ChangeNotification::Updated(key.clone()));
        Ok(())
    }

    async fn remove_binding(
        &self,
        key: &SubscriberAddress,
        consistency: WriteConsistency,
    ) -> Result<(), ReplicationError> {
        let removed = {
            let mut state = self.state.lock().await;
            state.admit_write(consistency)?;
            state.bindings.remove(key).is_some()
        };
        if removed {
            self.notify(ChangeNotification::Removed(key.clone()));
        }
        Ok(())
    }

    async fn remove_owner(
        &self,
        owner: &MemberAddress,
        consistency: WriteConsistency,
    ) -> Result<(), ReplicationError> {
        let removed = {
            let mut state = self.state.lock().await;
            state.admit_write(consistency)?;
            let before = state.bindings.len();
            state.bindings.retain(|key, _| key.member() != owner);
            before - state.bindings.len()
        };
        debug!(owner = %owner, removed, "removed bindings of owner");
        if removed > 0 {
            self.notify(ChangeNotification::OwnerRemoved(owner.clone()));
        }
        Ok(())
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<ChangeNotification> {
        self.changes.subscribe()
    }
}

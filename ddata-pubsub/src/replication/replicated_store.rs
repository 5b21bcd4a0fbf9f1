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

//! Replicated topic store: binds member deltas into the cluster-wide multimap.

use crate::approximation::{TopicHash, TopicHasher};
use crate::observability::events;
use crate::replication::delta::SubscriptionDelta;
use async_trait::async_trait;
use ddata_api::{
    ChangeNotification, MemberAddress, ReadConsistency, ReplicatedMultimap, ReplicatedValue,
    ReplicationError, SubscriberAddress, WriteConsistency,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

const COMPONENT: &str = "replicated_store";

/// Resolves remote subscriber keys from topic hashes.
#[async_trait]
pub trait TopicReader<H: TopicHash>: Send + Sync {
    async fn get_subscribers(
        &self,
        hashes: &[H],
        consistency: ReadConsistency,
    ) -> Result<HashSet<SubscriberAddress>, ReplicationError>;

    fn receive_changes(&self) -> broadcast::Receiver<ChangeNotification>;
}

/// Publishes the local member's binding and removes departed bindings.
#[async_trait]
pub trait TopicWriter<V: ReplicatedValue>: Send + Sync {
    async fn put(
        &self,
        own_key: &SubscriberAddress,
        delta: SubscriptionDelta<V>,
        consistency: WriteConsistency,
    ) -> Result<(), ReplicationError>;

    async fn remove_subscriber(
        &self,
        key: &SubscriberAddress,
        consistency: WriteConsistency,
    ) -> Result<(), ReplicationError>;

    async fn remove_address(
        &self,
        member: &MemberAddress,
        consistency: WriteConsistency,
    ) -> Result<(), ReplicationError>;

    /// Members that currently own at least one binding.
    async fn binding_owners(
        &self,
        consistency: ReadConsistency,
    ) -> Result<HashSet<MemberAddress>, ReplicationError>;
}

/// Topic hashing plus the replicated multimap it writes into.
pub struct ReplicatedTopicStore<H: TopicHash> {
    hasher: Arc<dyn TopicHasher<Hash = H>>,
    replicator: Arc<dyn ReplicatedMultimap<H::Element>>,
}

impl<H: TopicHash> Clone for ReplicatedTopicStore<H> {
    fn clone(&self) -> Self {
        Self {
            hasher: Arc::clone(&self.hasher),
            replicator: Arc::clone(&self.replicator),
        }
    }
}

impl<H: TopicHash> ReplicatedTopicStore<H> {
    pub fn new(
        hasher: Arc<dyn TopicHasher<Hash = H>>,
        replicator: Arc<dyn ReplicatedMultimap<H::Element>>,
    ) -> Self {
        Self { hasher, replicator }
    }

    pub fn approximate(&self, topic: &str) -> H {
        self.hasher.hash(topic)
    }

    pub fn hasher(&self) -> Arc<dyn TopicHasher<Hash = H>> {
        Arc::clone(&self.hasher)
    }
}

#[async_trait]
impl<H: TopicHash> TopicReader<H> for ReplicatedTopicStore<H> {
    /// Every key whose binding may hold any of `hashes`. May include false positives.
    async fn get_subscribers(
        &self,
        hashes: &[H],
        consistency: ReadConsistency,
    ) -> Result<HashSet<SubscriberAddress>, ReplicationError> {
        if hashes.is_empty() {
            return Ok(HashSet::new());
        }

        let bindings = self.replicator.read_all(consistency).await.map_err(|err| {
            warn!(
                event = events::REPLICATED_READ_FAILED,
                component = COMPONENT,
                err = %err,
                retryable = err.is_retryable(),
                "replicated read failed"
            );
            err
        })?;

        Ok(bindings
            .into_iter()
            .filter(|(_, bound)| self.hasher.matches(bound, hashes))
            .map(|(key, _)| key)
            .collect())
    }

    fn receive_changes(&self) -> broadcast::Receiver<ChangeNotification> {
        self.replicator.subscribe_changes()
    }
}

#[async_trait]
impl<H: TopicHash> TopicWriter<H::Element> for ReplicatedTopicStore<H> {
    async fn put(
        &self,
        own_key: &SubscriberAddress,
        delta: SubscriptionDelta<H::Element>,
        consistency: WriteConsistency,
    ) -> Result<(), ReplicationError> {
        if delta.is_empty() {
            debug!(
                event = events::REPLICATED_PUT_SKIPPED_EMPTY,
                component = COMPONENT,
                key = %own_key,
                "empty delta; nothing to replicate"
            );
            return Ok(());
        }

        let inserts = delta.inserts().len();
        let deletes = delta.deletes().len();
        let replace_all = delta.should_replace_all();
        self.replicator
            .update_binding(own_key, delta.into_binding_update(), consistency)
            .await?;

        debug!(
            event = events::REPLICATED_PUT_OK,
            component = COMPONENT,
            key = %own_key,
            inserts,
            deletes,
            replace_all,
            "replicated binding updated"
        );
        Ok(())
    }

    async fn remove_subscriber(
        &self,
        key: &SubscriberAddress,
        consistency: WriteConsistency,
    ) -> Result<(), ReplicationError> {
        self.replicator.remove_binding(key, consistency).await
    }

    async fn remove_address(
        &self,
        member: &MemberAddress,
        consistency: WriteConsistency,
    ) -> Result<(), ReplicationError> {
        self.replicator.remove_owner(member, consistency).await
    }

    async fn binding_owners(
        &self,
        consistency: ReadConsistency,
    ) -> Result<HashSet<MemberAddress>, ReplicationError> {
        let bindings = self.replicator.read_all(consistency).await?;
        Ok(bindings
            .into_keys()
            .map(|key| key.member().clone())
            .collect())
    }
}

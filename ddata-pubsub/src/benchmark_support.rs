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

//! Deterministic benchmark fixtures for the Criterion harness.

use crate::approximation::{BloomTopicHasher, TopicBits, TopicHash, TopicHasher};
use crate::local::{LocalSubscriptionRegistry, SubscriptionSnapshot};
use crate::replication::{
    DeltaTracker, ReplicatedTopicStore, SubscriptionDelta, TopicReader, TopicWriter,
};
use ddata_api::{
    MemberAddress, ReadConsistency, ReplicatedMultimap, ReplicationError, SubscriberAddress,
    WriteConsistency,
};
use std::sync::Arc;

fn topic(index: usize) -> String {
    format!("fleet/{}/telemetry/{}", index % 97, index)
}

fn topics_of(subscriber: usize, per_subscriber: usize, topic_space: usize) -> Vec<String> {
    (0..per_subscriber)
        .map(|offset| topic((subscriber * 31 + offset * 7) % topic_space.max(1)))
        .collect()
}

/// Fixed fixture for `registry_churn/*` benchmark IDs.
pub struct RegistryChurnFixture {
    registry: LocalSubscriptionRegistry<usize, TopicBits>,
    tracker: DeltaTracker<TopicBits>,
    churn_topics: Vec<String>,
    churn_subscriber: usize,
}

impl RegistryChurnFixture {
    pub fn new(subscribers: usize, per_subscriber: usize) -> Self {
        let tracker = DeltaTracker::<TopicBits>::new();
        let mut registry = LocalSubscriptionRegistry::new(
            Arc::new(BloomTopicHasher::new(64, 3)),
            Box::new(tracker.clone()),
        );
        let topic_space = subscribers.max(1) * per_subscriber.max(1);
        for subscriber in 0..subscribers {
            registry.subscribe(
                subscriber,
                topics_of(subscriber, per_subscriber, topic_space),
                None,
            );
        }
        tracker.export_and_reset();

        Self {
            registry,
            tracker,
            churn_topics: topics_of(subscribers + 1, per_subscriber, topic_space * 2),
            churn_subscriber: subscribers + 1,
        }
    }

    /// Subscribes and fully unsubscribes one subscriber; returns the exported delta size.
    pub fn subscribe_unsubscribe_cycle(&mut self) -> usize {
        self.registry
            .subscribe(self.churn_subscriber, self.churn_topics.iter().cloned(), None);
        self.registry
            .unsubscribe(&self.churn_subscriber, &self.churn_topics);
        let delta = self.tracker.export_and_reset();
        delta.inserts().len() + delta.deletes().len()
    }
}

/// Fixed fixture for `snapshot_lookup/*` benchmark IDs.
pub struct SnapshotLookupFixture {
    snapshot: SubscriptionSnapshot<usize>,
    queries: Vec<Vec<String>>,
}

impl SnapshotLookupFixture {
    pub fn new(subscribers: usize, per_subscriber: usize) -> Self {
        let mut registry = LocalSubscriptionRegistry::new(
            Arc::new(BloomTopicHasher::new(64, 3)),
            Box::new(crate::local::NoopHooks),
        );
        let topic_space = subscribers.max(1) * per_subscriber.max(1) / 2 + 1;
        for subscriber in 0..subscribers {
            registry.subscribe(
                subscriber,
                topics_of(subscriber, per_subscriber, topic_space),
                None,
            );
        }
        let queries = (0..16)
            .map(|index| vec![topic(index * 13 % topic_space), topic(index % topic_space)])
            .collect();

        Self {
            snapshot: registry.snapshot(),
            queries,
        }
    }

    pub fn lookup_count(&self) -> usize {
        self.queries
            .iter()
            .map(|query| self.snapshot.get_subscribers(query).len())
            .sum()
    }
}

/// Fixed fixture for `remote_resolution/*` benchmark IDs.
pub struct RemoteResolutionFixture {
    store: ReplicatedTopicStore<TopicBits>,
    query: Vec<TopicBits>,
}

impl RemoteResolutionFixture {
    /// Seeds `members` bindings of `per_member` topics each into `replicator`.
    pub async fn new(
        replicator: Arc<dyn ReplicatedMultimap<u32>>,
        members: usize,
        per_member: usize,
    ) -> Result<Self, ReplicationError> {
        let hasher = BloomTopicHasher::new(64, 3);
        let store = ReplicatedTopicStore::new(Arc::new(hasher.clone()), replicator);
        let topic_space = members.max(1) * per_member.max(1);

        for member in 0..members {
            let key = SubscriberAddress::new(MemberAddress::new(format!("node-{member}")), 0);
            let mut delta = SubscriptionDelta::new();
            for topic in topics_of(member, per_member, topic_space) {
                for bit in hasher.hash(&topic).elements() {
                    delta.insert(bit);
                }
            }
            store.put(&key, delta, WriteConsistency::Local).await?;
        }

        Ok(Self {
            query: vec![hasher.hash(&topic(0)), hasher.hash(&topic(topic_space / 2))],
            store,
        })
    }

    pub async fn resolve_count(&self) -> Result<usize, ReplicationError> {
        Ok(self
            .store
            .get_subscribers(&self.query, ReadConsistency::Local)
            .await?
            .len())
    }
}

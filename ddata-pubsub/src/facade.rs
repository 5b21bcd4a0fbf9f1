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

//! Per-namespace composition root wiring registry, delta tracking, and store.

use crate::approximation::{TopicHash, TopicHasher};
use crate::config::PubSubConfig;
use crate::local::{
    LocalSubscriptionRegistry, NoopHooks, SnapshotDirectory, SubscriberHandle, SubscriptionSnapshot,
    TopicFilter,
};
use crate::observability::{events, fields};
use crate::replication::{DeltaTracker, ReplicatedTopicStore, TopicReader, TopicWriter};
use crate::runtime::{FlushContext, MembershipCleanup, SubscriptionFlusher};
use crate::FlushHealth;
use ddata_api::{
    ChangeNotification, ClusterMembership, ReplicatedMultimap, ReplicationError, SubscriberAddress,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, warn};

const COMPONENT: &str = "pubsub_facade";

/// Derives the member-local id of a namespace's replicated binding.
fn namespace_id(namespace: &str) -> u64 {
    let digest = blake3::hash(namespace.as_bytes());
    let mut id = [0u8; 8];
    id.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(id)
}

/// One topic namespace: a local registry paired with its replicated store.
///
/// Local subscribers are resolved from the latest snapshot without touching the
/// registry writer. Remote subscribers are binding keys of other members; a hit means
/// "forward to that member", which then resolves its own local subscribers.
pub struct PubSubFacade<S: SubscriberHandle, H: TopicHash> {
    namespace: String,
    own_key: SubscriberAddress,
    config: PubSubConfig,
    hasher: Arc<dyn TopicHasher<Hash = H>>,
    registry: Mutex<LocalSubscriptionRegistry<S, H>>,
    tracker: DeltaTracker<H>,
    directory: SnapshotDirectory<S>,
    store: Arc<ReplicatedTopicStore<H>>,
    flush: FlushContext<H>,
}

impl<S: SubscriberHandle, H: TopicHash> PubSubFacade<S, H> {
    pub fn new(
        namespace: &str,
        membership: &dyn ClusterMembership,
        hasher: Arc<dyn TopicHasher<Hash = H>>,
        replicator: Arc<dyn ReplicatedMultimap<H::Element>>,
        config: PubSubConfig,
    ) -> Self {
        let own_key = SubscriberAddress::new(membership.self_member(), namespace_id(namespace));
        let tracker = DeltaTracker::<H>::new();
        let registry = LocalSubscriptionRegistry::new(Arc::clone(&hasher), Box::new(tracker.clone()));
        let store = Arc::new(ReplicatedTopicStore::new(Arc::clone(&hasher), replicator));
        let writer: Arc<dyn TopicWriter<H::Element>> = store.clone();
        let flush = FlushContext::new(
            tracker.clone(),
            writer,
            own_key.clone(),
            config.write_consistency,
        );

        debug!(
            component = COMPONENT,
            namespace,
            key = %own_key,
            "created pubsub facade"
        );

        Self {
            namespace: namespace.to_string(),
            own_key,
            config,
            hasher,
            registry: Mutex::new(registry),
            tracker,
            directory: SnapshotDirectory::empty(),
            store,
            flush,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Key under which this member's binding for the namespace is replicated.
    pub fn own_key(&self) -> &SubscriberAddress {
        &self.own_key
    }

    pub fn config(&self) -> &PubSubConfig {
        &self.config
    }

    pub async fn subscribe<I, T>(
        &self,
        subscriber: S,
        topics: I,
        filter: Option<TopicFilter>,
    ) -> bool
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut registry = self.registry.lock().await;
        let changed = registry.subscribe(subscriber, topics, filter);
        self.publish_if_changed(&registry, changed, "subscribe");
        changed
    }

    pub async fn unsubscribe<I, T>(&self, subscriber: &S, topics: I) -> bool
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut registry = self.registry.lock().await;
        let changed = registry.unsubscribe(subscriber, topics);
        self.publish_if_changed(&registry, changed, "unsubscribe");
        changed
    }

    pub async fn remove_subscriber(&self, subscriber: &S) -> bool {
        let mut registry = self.registry.lock().await;
        let changed = registry.remove_subscriber(subscriber);
        self.publish_if_changed(&registry, changed, "remove_subscriber");
        changed
    }

    pub async fn contains(&self, subscriber: &S) -> bool {
        self.registry.lock().await.contains(subscriber)
    }

    pub async fn count_topics(&self) -> usize {
        self.registry.lock().await.count_topics()
    }

    // Called with the registry lock held so snapshot versions follow mutation order.
    fn publish_if_changed(
        &self,
        registry: &LocalSubscriptionRegistry<S, H>,
        changed: bool,
        operation: &'static str,
    ) {
        if !changed {
            return;
        }
        let version = self.directory.publish(registry.snapshot());
        debug!(
            event = events::SUBSCRIPTION_CHANGED,
            component = COMPONENT,
            namespace = self.namespace.as_str(),
            operation,
            snapshot_version = version,
            "local subscriptions changed"
        );
    }

    /// Latest published snapshot of local subscriptions.
    pub fn snapshot(&self) -> SubscriptionSnapshot<S> {
        self.directory.load().1
    }

    pub fn directory(&self) -> SnapshotDirectory<S> {
        self.directory.clone()
    }

    pub fn local_subscribers<T: AsRef<str>>(&self, topics: &[T]) -> HashSet<S> {
        self.snapshot().get_subscribers(topics)
    }

    /// Bindings of other members in this namespace that may want any of `topics`.
    pub async fn remote_subscribers<T: AsRef<str>>(
        &self,
        topics: &[T],
    ) -> Result<HashSet<SubscriberAddress>, ReplicationError> {
        let hashes: Vec<H> = topics
            .iter()
            .map(|topic| self.store.approximate(topic.as_ref()))
            .collect();
        let mut found = self
            .store
            .get_subscribers(&hashes, self.config.read_consistency)
            .await?;
        found.retain(|key| key.local_id() == self.own_key.local_id() && key != &self.own_key);
        Ok(found)
    }

    /// Like [`PubSubFacade::remote_subscribers`], but a failed read yields no remote subscribers.
    pub async fn remote_subscribers_best_effort<T: AsRef<str>>(
        &self,
        topics: &[T],
    ) -> HashSet<SubscriberAddress> {
        match self.remote_subscribers(topics).await {
            Ok(found) => found,
            Err(err) => {
                warn!(
                    event = events::REMOTE_LOOKUP_DEGRADED,
                    component = COMPONENT,
                    namespace = self.namespace.as_str(),
                    topics = fields::format_topics(topics).as_str(),
                    err = %err,
                    "remote lookup failed; publishing to local subscribers only"
                );
                HashSet::new()
            }
        }
    }

    /// Writes the pending delta now; on failure the next flush performs a full resync.
    pub async fn flush(&self) -> Result<(), ReplicationError> {
        self.flush.flush_once().await
    }

    pub fn request_resync(&self) {
        self.flush.force_resync(fields::REASON_REQUESTED);
    }

    pub fn has_pending_changes(&self) -> bool {
        self.tracker.has_pending()
    }

    pub fn flush_health(&self) -> watch::Receiver<FlushHealth> {
        self.flush.health()
    }

    /// Spawns the periodic flusher on the current tokio runtime.
    pub fn start_flusher(&self) -> SubscriptionFlusher {
        SubscriptionFlusher::spawn(self.flush.clone(), &self.config.flush)
    }

    /// Spawns eviction of departed members' bindings on the current tokio runtime.
    pub fn start_membership_cleanup(
        &self,
        membership: Arc<dyn ClusterMembership>,
    ) -> MembershipCleanup {
        let writer: Arc<dyn TopicWriter<H::Element>> = self.store.clone();
        MembershipCleanup::spawn(membership, writer, &self.config)
    }

    pub fn receive_changes(&self) -> broadcast::Receiver<ChangeNotification> {
        self.store.receive_changes()
    }

    /// Fresh, empty registry using this namespace's hasher and no delta tracking.
    pub fn new_registry(&self) -> LocalSubscriptionRegistry<S, H> {
        LocalSubscriptionRegistry::new(Arc::clone(&self.hasher), Box::new(NoopHooks))
    }

    pub fn reader(&self) -> Arc<dyn TopicReader<H>> {
        self.store.clone()
    }

    pub fn writer(&self) -> Arc<dyn TopicWriter<H::Element>> {
        self.store.clone()
    }
}

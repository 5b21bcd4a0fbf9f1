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

//! Periodic and on-demand delta flushing into the replicated store.

use crate::approximation::TopicHash;
use crate::config::FlushConfig;
use crate::observability::{events, fields};
use crate::replication::{DeltaTracker, TopicWriter};
use crate::FlushHealth;
use ddata_api::{ReplicationError, SubscriberAddress, WriteConsistency};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

const COMPONENT: &str = "flush_runtime";

/// Everything one flush needs; shared by the background flusher and explicit flushes.
pub(crate) struct FlushContext<H: TopicHash> {
    tracker: DeltaTracker<H>,
    writer: Arc<dyn TopicWriter<H::Element>>,
    own_key: SubscriberAddress,
    consistency: WriteConsistency,
    health: Arc<watch::Sender<FlushHealth>>,
    // Puts must reach the store in export order, or a later insert can be
    // overwritten by an earlier delete.
    in_flight: Arc<Mutex<()>>,
}

impl<H: TopicHash> Clone for FlushContext<H> {
    fn clone(&self) -> Self {
        Self {
            tracker: self.tracker.clone(),
            writer: Arc::clone(&self.writer),
            own_key: self.own_key.clone(),
            consistency: self.consistency,
            health: Arc::clone(&self.health),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<H: TopicHash> FlushContext<H> {
    pub(crate) fn new(
        tracker: DeltaTracker<H>,
        writer: Arc<dyn TopicWriter<H::Element>>,
        own_key: SubscriberAddress,
        consistency: WriteConsistency,
    ) -> Self {
        let (health, _) = watch::channel(FlushHealth::default());
        Self {
            tracker,
            writer,
            own_key,
            consistency,
            health: Arc::new(health),
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    pub(crate) fn health(&self) -> watch::Receiver<FlushHealth> {
        self.health.subscribe()
    }

    /// Exports the pending delta and writes it; a failure schedules a full resync.
    pub(crate) async fn flush_once(&self) -> Result<(), ReplicationError> {
        let _in_flight = self.in_flight.lock().await;
        let delta = self.tracker.export_and_reset();
        if delta.is_empty() {
            return Ok(());
        }

        let inserts = delta.inserts().len();
        let deletes = delta.deletes().len();
        let replace_all = delta.should_replace_all();
        debug!(
            event = events::DELTA_FLUSH_START,
            component = COMPONENT,
            key = %self.own_key,
            inserts,
            deletes,
            replace_all,
            "flushing subscription delta"
        );

        let result = self
            .writer
            .put(&self.own_key, delta, self.consistency)
            .await;
        match &result {
            Ok(()) => {
                debug!(
                    event = events::DELTA_FLUSH_OK,
                    component = COMPONENT,
                    key = %self.own_key,
                    "subscription delta flushed"
                );
                self.health
                    .send_modify(|health| health.record_attempt(true));
            }
            Err(err) => {
                warn!(
                    event = events::DELTA_FLUSH_FAILED,
                    component = COMPONENT,
                    key = %self.own_key,
                    err = %err,
                    retryable = err.is_retryable(),
                    "subscription delta flush failed; scheduling resync"
                );
                self.force_resync(fields::REASON_FLUSH_FAILED);
                self.health
                    .send_modify(|health| health.record_attempt(false));
            }
        }
        result
    }

    pub(crate) fn force_resync(&self, reason: &'static str) {
        self.tracker.request_resync();
        self.health.send_modify(FlushHealth::record_resync);
        debug!(
            event = events::DELTA_RESYNC_REQUESTED,
            component = COMPONENT,
            reason,
            "full resync scheduled"
        );
    }
}

/// Background task flushing the pending delta on every tick or nudge.
///
/// Dropping the flusher aborts the task; [`SubscriptionFlusher::shutdown`] stops it
/// after the flush in progress.
pub struct SubscriptionFlusher {
    nudge: Arc<Notify>,
    shutdown: watch::Sender<bool>,
    health: watch::Receiver<FlushHealth>,
    handle: JoinHandle<()>,
}

impl SubscriptionFlusher {
    pub(crate) fn spawn<H: TopicHash>(context: FlushContext<H>, config: &FlushConfig) -> Self {
        let nudge = Arc::new(Notify::new());
        let (shutdown, shutdown_rx) = watch::channel(false);
        let health = context.health();
        let handle = tokio::spawn(Self::flush_loop(
            context,
            config.interval(),
            config.force_resync_probability,
            Arc::clone(&nudge),
            shutdown_rx,
        ));

        Self {
            nudge,
            shutdown,
            health,
            handle,
        }
    }

    async fn flush_loop<H: TopicHash>(
        context: FlushContext<H>,
        interval: Duration,
        force_resync_probability: f64,
        nudge: Arc<Notify>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            event = events::FLUSHER_START,
            component = COMPONENT,
            interval_ms = interval.as_millis() as u64,
            force_resync_probability,
            "subscription flusher started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if rand::random::<f64>() < force_resync_probability {
                        context.force_resync(fields::REASON_RANDOM_RESYNC);
                    }
                }
                _ = nudge.notified() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            // Failures are recorded in health and retried by the next resync.
            let _ = context.flush_once().await;
        }

        info!(
            event = events::FLUSHER_STOP,
            component = COMPONENT,
            "subscription flusher stopped"
        );
    }

    /// Requests a flush without waiting for the next tick.
    pub fn flush_now(&self) {
        self.nudge.notify_one();
    }

    pub fn health(&self) -> watch::Receiver<FlushHealth> {
        self.health.clone()
    }

    pub async fn shutdown(mut self) {
        let _ = self.shutdown.send(true);
        let _ = (&mut self.handle).await;
    }
}

impl Drop for SubscriptionFlusher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::{FlushContext, SubscriptionFlusher};
    use crate::approximation::LiteralTopicHasher;
    use crate::config::FlushConfig;
    use crate::local::LocalSubscriptionRegistry;
    use crate::replication::{DeltaTracker, ReplicatedTopicStore};
    use ddata_api::{MemberAddress, ReplicationError, SubscriberAddress, WriteConsistency};
    use in_memory_ddata::InMemoryReplicator;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    struct Fixture {
        registry: LocalSubscriptionRegistry<u32, String>,
        replicator: InMemoryReplicator<String>,
        context: FlushContext<String>,
        own_key: SubscriberAddress,
    }

    fn fixture() -> Fixture {
        let tracker = DeltaTracker::<String>::new();
        let hasher = Arc::new(LiteralTopicHasher);
        let registry = LocalSubscriptionRegistry::new(hasher.clone(), Box::new(tracker.clone()));
        let replicator = InMemoryReplicator::<String>::new();
        let store: ReplicatedTopicStore<String> = ReplicatedTopicStore::new(hasher, Arc::new(replicator.clone()));
        let own_key = SubscriberAddress::new(MemberAddress::new("node-a"), 0);
        let context = FlushContext::new(
            tracker,
            Arc::new(store),
            own_key.clone(),
            WriteConsistency::Local,
        );
        Fixture {
            registry,
            replicator,
            context,
            own_key,
        }
    }

    fn strings(values: &[&str]) -> HashSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn flush_without_changes_writes_nothing() {
        let fixture = fixture();

        fixture.context.flush_once().await.unwrap();

        assert_eq!(fixture.replicator.write_count().await, 0);
        assert_eq!(fixture.context.health().borrow().last_attempt_at, None);
    }

    #[tokio::test]
    async fn failed_flush_is_healed_by_resync() {
        let mut fixture = fixture();
        fixture.registry.subscribe(1, ["x", "y"], None);
        fixture
            .replicator
            .fail_next_writes([ReplicationError::Unavailable("partitioned".to_string())])
            .await;

        assert!(fixture.context.flush_once().await.is_err());
        fixture.registry.unsubscribe(&1, ["y"]);
        fixture.context.flush_once().await.unwrap();

        assert_eq!(
            fixture.replicator.binding(&fixture.own_key).await,
            Some(strings(&["x"]))
        );
        let health = fixture.context.health().borrow().clone();
        assert!(health.recovered());
        assert_eq!(health.resyncs_requested, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn flusher_writes_on_tick_and_on_nudge() {
        let mut fixture = fixture();
        let config = FlushConfig {
            interval_ms: 60_000,
            force_resync_probability: 0.0,
        };
        let flusher = SubscriptionFlusher::spawn(fixture.context.clone(), &config);
        let mut health = flusher.health();

        fixture.registry.subscribe(1, ["x"], None);
        flusher.flush_now();
        health.changed().await.unwrap();
        assert_eq!(
            fixture.replicator.binding(&fixture.own_key).await,
            Some(strings(&["x"]))
        );

        fixture.registry.subscribe(2, ["y"], None);
        tokio::time::advance(Duration::from_secs(61)).await;
        health.changed().await.unwrap();
        assert_eq!(
            fixture.replicator.binding(&fixture.own_key).await,
            Some(strings(&["x", "y"]))
        );
        assert_eq!(health.borrow().successful_flushes, 2);

        flusher.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn certain_resync_probability_rewrites_binding_every_tick() {
        let fixture = fixture();
        let config = FlushConfig {
            interval_ms: 10,
            force_resync_probability: 1.0,
        };
        let flusher = SubscriptionFlusher::spawn(fixture.context.clone(), &config);
        let mut health = flusher.health();

        health.changed().await.unwrap();
        health.changed().await.unwrap();

        assert!(fixture.replicator.write_count().await >= 1);
        assert!(health.borrow().resyncs_requested >= 1);
        drop(flusher);
    }
}

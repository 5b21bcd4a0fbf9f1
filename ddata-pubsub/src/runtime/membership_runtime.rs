//! Evicts replicated bindings of departed cluster members.
//!
//! A removal that fails stays pending and is retried on the next membership
//! event or retry tick. A lagged receiver may have missed departures, so the
//! loop then reconciles binding owners against the live membership view.

use crate::config::PubSubConfig;
use crate::observability::{events, fields};
use crate::replication::TopicWriter;
use ddata_api::{
    ClusterMembership, MemberAddress, MembershipEvent, ReadConsistency, ReplicatedValue,
    WriteConsistency,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{error::RecvError, Receiver};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

const COMPONENT: &str = "membership_runtime";

/// Background task calling `remove_address` for every member that leaves the cluster.
pub struct MembershipCleanup {
    handle: JoinHandle<()>,
}

struct CleanupState<V: ReplicatedValue> {
    membership: Arc<dyn ClusterMembership>,
    self_member: MemberAddress,
    writer: Arc<dyn TopicWriter<V>>,
    write_consistency: WriteConsistency,
    read_consistency: ReadConsistency,
    pending: HashSet<MemberAddress>,
    needs_reconcile: bool,
}

impl MembershipCleanup {
    pub(crate) fn spawn<V: ReplicatedValue>(
        membership: Arc<dyn ClusterMembership>,
        writer: Arc<dyn TopicWriter<V>>,
        config: &PubSubConfig,
    ) -> Self {
        // Subscribe before spawning so no departure between now and the first poll is lost.
        let membership_events = membership.subscribe_events();
        let state = CleanupState {
            self_member: membership.self_member(),
            membership,
            writer,
            write_consistency: config.write_consistency,
            read_consistency: config.read_consistency,
            pending: HashSet::new(),
            needs_reconcile: false,
        };
        let handle = tokio::spawn(Self::cleanup_loop(
            state,
            membership_events,
            config.flush.interval(),
        ));
        Self { handle }
    }

    async fn cleanup_loop<V: ReplicatedValue>(
        mut state: CleanupState<V>,
        mut membership_events: Receiver<MembershipEvent>,
        retry_interval: Duration,
    ) {
        let mut retry = tokio::time::interval(retry_interval);
        retry.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                received = membership_events.recv() => match received {
                    Ok(MembershipEvent::MemberRemoved(member)) if member == state.self_member => {
                        debug!(
                            component = COMPONENT,
                            member = %member,
                            reason = fields::REASON_SELF_REMOVAL,
                            "ignoring removal of the local member"
                        );
                    }
                    Ok(MembershipEvent::MemberRemoved(member)) => {
                        state.pending.insert(member);
                    }
                    Ok(MembershipEvent::MemberUp(member)) => {
                        debug!(component = COMPONENT, member = %member, "member up");
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(
                            event = events::MEMBERSHIP_RECV_LAGGED,
                            component = COMPONENT,
                            skipped,
                            "membership receiver lagged; reconciling binding owners"
                        );
                        state.needs_reconcile = true;
                    }
                    Err(RecvError::Closed) => {
                        info!(
                            event = events::MEMBERSHIP_RECV_CLOSED,
                            component = COMPONENT,
                            reason = fields::REASON_BROADCAST_CLOSED,
                            "membership events closed; stopping cleanup loop"
                        );
                        break;
                    }
                },
                _ = retry.tick() => {}
            }

            if state.needs_reconcile {
                state.reconcile().await;
            }
            state.evict_pending().await;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<V: ReplicatedValue> CleanupState<V> {
    /// Queues every binding owner that is no longer a live member.
    async fn reconcile(&mut self) {
        let owners = match self.writer.binding_owners(self.read_consistency).await {
            Ok(owners) => owners,
            Err(err) => {
                warn!(
                    event = events::MEMBERSHIP_RECONCILE_FAILED,
                    component = COMPONENT,
                    err = %err,
                    "failed to read binding owners; retrying on next tick"
                );
                return;
            }
        };
        self.needs_reconcile = false;

        let live = self.membership.members();
        let before = self.pending.len();
        self.pending.extend(
            owners
                .into_iter()
                .filter(|owner| *owner != self.self_member && !live.contains(owner)),
        );
        info!(
            event = events::MEMBERSHIP_RECONCILED,
            component = COMPONENT,
            live_members = live.len(),
            queued = self.pending.len() - before,
            "reconciled binding owners against membership"
        );
    }

    async fn evict_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let members: Vec<MemberAddress> = self.pending.iter().cloned().collect();
        for member in members {
            match self
                .writer
                .remove_address(&member, self.write_consistency)
                .await
            {
                Ok(()) => {
                    self.pending.remove(&member);
                    info!(
                        event = events::MEMBER_REMOVED,
                        component = COMPONENT,
                        member = %member,
                        "removed bindings of departed member"
                    );
                }
                Err(err) => warn!(
                    event = events::MEMBER_REMOVE_FAILED,
                    component = COMPONENT,
                    member = %member,
                    err = %err,
                    pending = self.pending.len(),
                    "failed to remove bindings of departed member; will retry"
                ),
            }
        }
    }
}

impl Drop for MembershipCleanup {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

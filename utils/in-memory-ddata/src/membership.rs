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

use ddata_api::{ClusterMembership, MemberAddress, MembershipEvent};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

const MEMBERSHIP_EVENT_CAPACITY: usize = 64;

/// Membership view driven by the test or demo that owns it.
#[derive(Clone)]
pub struct InMemoryMembership {
    self_member: MemberAddress,
    members: Arc<Mutex<HashSet<MemberAddress>>>,
    events: broadcast::Sender<MembershipEvent>,
}

impl InMemoryMembership {
    pub fn new(self_member: MemberAddress) -> Self {
        let (events, _) = broadcast::channel(MEMBERSHIP_EVENT_CAPACITY);
        Self {
            members: Arc::new(Mutex::new(HashSet::from([self_member.clone()]))),
            self_member,
            events,
        }
    }

    pub fn member_up(&self, member: MemberAddress) {
        debug!(member = %member, "member up");
        self.members.lock().insert(member.clone());
        let _ = self.events.send(MembershipEvent::MemberUp(member));
    }

    pub fn member_removed(&self, member: MemberAddress) {
        debug!(member = %member, "member removed");
        self.members.lock().remove(&member);
        let _ = self.events.send(MembershipEvent::MemberRemoved(member));
    }
}

impl ClusterMembership for InMemoryMembership {
    fn self_member(&self) -> MemberAddress {
        self.self_member.clone()
    }

    fn members(&self) -> HashSet<MemberAddress> {
        self.members.lock().clone()
    }

    fn subscribe_events(&self) -> broadcast::Receiver<MembershipEvent> {
        self.events.subscribe()
    }
}

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

use crate::MemberAddress;
use std::collections::HashSet;
use tokio::sync::broadcast;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MembershipEvent {
    MemberUp(MemberAddress),
    /// The member left or was downed after a crash/partition.
    MemberRemoved(MemberAddress),
}

/// Cluster membership as seen from the local member.
pub trait ClusterMembership: Send + Sync {
    /// Identity of the local member, used as writer identity for replicated bindings.
    fn self_member(&self) -> MemberAddress;

    /// Members currently up, including the local member.
    fn members(&self) -> HashSet<MemberAddress>;

    /// Subscribes to membership events emitted from now on.
    fn subscribe_events(&self) -> broadcast::Receiver<MembershipEvent>;
}

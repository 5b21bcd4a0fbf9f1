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

//! # ddata-api
//!
//! Contracts for the cluster collaborators consumed by `ddata-pubsub`:
//!
//! - [`ReplicatedMultimap`]: a key -> set-of-values CRDT with configurable
//!   [`WriteConsistency`]/[`ReadConsistency`], change notification, and bulk removal of
//!   every binding owned by one cluster member.
//! - [`ClusterMembership`]: the local member identity plus membership events.
//!
//! The merge algorithm and wire format of the replicated map stay behind the trait;
//! `ddata-pubsub` only relies on the capabilities listed here.

mod address;
pub use address::{AddressParseError, MemberAddress, SubscriberAddress};

mod consistency;
pub use consistency::{ReadConsistency, WriteConsistency};

mod error;
pub use error::ReplicationError;

mod membership;
pub use membership::{ClusterMembership, MembershipEvent};

mod multimap;
pub use multimap::{BindingUpdate, ChangeNotification, ReplicatedMultimap, ReplicatedValue};

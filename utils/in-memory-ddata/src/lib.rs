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

//! In-process stand-ins for the cluster collaborators.
//!
//! [`InMemoryReplicator`] behaves like one replica of a replicated multimap whose
//! writes are immediately visible to every clone of the handle. Consistency levels are
//! checked against a configurable number of reachable replicas, and failures can be
//! injected to exercise retry paths.

mod membership;
pub use membership::InMemoryMembership;

mod replicator;
pub use replicator::{InMemoryReplicator, SeedError};

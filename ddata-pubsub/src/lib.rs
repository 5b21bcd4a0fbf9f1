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

//! # ddata-pubsub
//!
//! `ddata-pubsub` is the subscription-routing core of a clustered publish/subscribe
//! layer. It answers "which subscribers, local or on other members, care about these
//! topics" without a central broker and without false negatives.
//!
//! Local subscriptions live in an authoritative single-writer registry. Each member
//! compresses its topic interest into a lossy hash binding and replicates only the
//! changes through a replicated multimap; other members query those bindings to
//! decide where to forward a publish.
//!
//! ## Quick start
//!
//! ```
//! use std::sync::Arc;
//! use ddata_api::MemberAddress;
//! use ddata_pubsub::approximation::LiteralTopicHasher;
//! use ddata_pubsub::{PubSubConfig, PubSubFacade};
//! use in_memory_ddata::{InMemoryMembership, InMemoryReplicator};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! // Both members see the same in-process replica.
//! let replicator = InMemoryReplicator::<String>::new();
//!
//! let node_a = InMemoryMembership::new(MemberAddress::new("node-a"));
//! let node_b = InMemoryMembership::new(MemberAddress::new("node-b"));
//! let things_a = PubSubFacade::<u64, String>::new(
//!     "things",
//!     &node_a,
//!     Arc::new(LiteralTopicHasher),
//!     Arc::new(replicator.clone()),
//!     PubSubConfig::default(),
//! );
//! let things_b = PubSubFacade::<u64, String>::new(
//!     "things",
//!     &node_b,
//!     Arc::new(LiteralTopicHasher),
//!     Arc::new(replicator.clone()),
//!     PubSubConfig::default(),
//! );
//!
//! things_a.subscribe(1, ["things/created"], None).await;
//! things_b.subscribe(9, ["things/created"], None).await;
//! things_b.flush().await.unwrap();
//!
//! assert!(things_a.local_subscribers(&["things/created"]).contains(&1));
//! let remote = things_a.remote_subscribers(&["things/created"]).await.unwrap();
//! assert!(remote.contains(things_b.own_key()));
//! # });
//! ```
//!
//! ## Approximate matching
//!
//! With [`approximation::BloomTopicHasher`] a binding is the set of bit positions of an
//! `N`-byte bit vector, so it never holds more than `8 * N` elements. A remote lookup
//! may return members that do not actually subscribe (false positives) but never
//! misses one that does.
//!
//! ```
//! use std::collections::HashSet;
//! use ddata_pubsub::approximation::{BloomTopicHasher, TopicHash, TopicHasher};
//!
//! let hasher = BloomTopicHasher::new(64, 3);
//! let bound: HashSet<u32> = ["a", "b"]
//!     .iter()
//!     .flat_map(|topic| hasher.hash(topic).elements())
//!     .collect();
//!
//! assert!(bound.len() <= hasher.bit_count());
//! assert!(hasher.matches(&bound, &[hasher.hash("a")]));
//! ```
//!
//! ## Internal architecture map
//!
//! - Approximation: topic hashing and bit-vector membership tests
//! - Local: subscriber/topic/filter registry, snapshots, and the snapshot directory
//! - Replication: delta tracking and the replicated topic store
//! - Runtime: background delta flushing and departed-member cleanup
//! - API facade: one registry and store pairing per topic namespace
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events.
//! Library code emits events/spans and does not unconditionally initialize a global
//! subscriber. Binaries/tests are responsible for one-time `tracing_subscriber`
//! initialization at process boundaries.

pub mod approximation;
pub mod local;
pub mod replication;

mod config;
pub use config::{ApproximationConfig, ApproximationMode, ConfigError, FlushConfig, PubSubConfig};

mod flush_health;
pub use flush_health::FlushHealth;

#[doc(hidden)]
pub mod benchmark_support;
#[doc(hidden)]
pub mod observability;
mod runtime;
pub use runtime::{MembershipCleanup, SubscriptionFlusher};

mod facade;
pub use facade::PubSubFacade;

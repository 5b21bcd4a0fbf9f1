//! Runtime integration layer.
//!
//! Isolates the background tasks (delta flushing and membership cleanup) so async
//! scheduling stays localized and the registry writer never awaits the store.
//!
//! ```
//! use std::sync::Arc;
//! use ddata_api::MemberAddress;
//! use ddata_pubsub::approximation::LiteralTopicHasher;
//! use ddata_pubsub::{PubSubConfig, PubSubFacade};
//! use in_memory_ddata::{InMemoryMembership, InMemoryReplicator};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let membership = InMemoryMembership::new(MemberAddress::new("node-a"));
//! let facade = PubSubFacade::<u64, String>::new(
//!     "runtime-doc",
//!     &membership,
//!     Arc::new(LiteralTopicHasher),
//!     Arc::new(InMemoryReplicator::new()),
//!     PubSubConfig::default(),
//! );
//!
//! // Runtimes only move deltas and evictions; they carry no subscription policy.
//! let flusher = facade.start_flusher();
//! let _cleanup = facade.start_membership_cleanup(Arc::new(membership.clone()));
//! flusher.shutdown().await;
//! # });
//! ```

mod flush_runtime;
mod membership_runtime;

pub(crate) use flush_runtime::FlushContext;
pub use flush_runtime::SubscriptionFlusher;
pub use membership_runtime::MembershipCleanup;

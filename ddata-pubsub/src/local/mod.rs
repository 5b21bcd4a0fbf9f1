//! Local subscription layer.
//!
//! Owns the authoritative single-writer registry of local subscribers and the
//! immutable snapshots that the publish path reads concurrently.
//!
//! ```
//! use std::sync::Arc;
//! use ddata_pubsub::approximation::LiteralTopicHasher;
//! use ddata_pubsub::local::{LocalSubscriptionRegistry, NoopHooks};
//!
//! let mut registry = LocalSubscriptionRegistry::<u64, String>::new(
//!     Arc::new(LiteralTopicHasher),
//!     Box::new(NoopHooks),
//! );
//! assert!(registry.subscribe(1, ["orders/created"], None));
//!
//! let snapshot = registry.snapshot();
//! registry.remove_subscriber(&1);
//!
//! assert!(snapshot.get_subscribers(&["orders/created"]).contains(&1));
//! assert!(registry.snapshot().get_subscribers(&["orders/created"]).is_empty());
//! ```

mod filter;
mod hooks;
mod registry;
mod snapshot;
mod topic_entry;

pub use filter::TopicFilter;
pub use hooks::{NoopHooks, TopicHooks};
pub use registry::{LocalSubscriptionRegistry, SubscriberHandle};
pub use snapshot::{SnapshotDirectory, SubscriptionSnapshot};
pub use topic_entry::TopicEntry;

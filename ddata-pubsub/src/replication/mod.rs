//! Replication layer.
//!
//! Turns local topic lifecycle into per-member hash deltas and exchanges them with
//! the cluster through a [`ddata_api::ReplicatedMultimap`].
//!
//! ```
//! use ddata_pubsub::replication::SubscriptionDelta;
//!
//! let mut delta = SubscriptionDelta::new();
//! delta.insert("orders/created".to_string());
//! delta.delete("orders/created".to_string());
//!
//! assert!(delta.inserts().is_empty());
//! assert_eq!(delta.deletes().len(), 1);
//! ```

mod delta;
mod delta_tracker;
mod replicated_store;

pub use delta::SubscriptionDelta;
pub use delta_tracker::DeltaTracker;
pub use replicated_store::{ReplicatedTopicStore, TopicReader, TopicWriter};

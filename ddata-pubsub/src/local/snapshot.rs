//! Immutable registry exports and the directory that publishes them to readers.

use crate::local::filter::TopicFilter;
use crate::observability::events;
use arc_swap::ArcSwap;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

const COMPONENT: &str = "snapshot_directory";

#[derive(Debug)]
struct SnapshotContents<S> {
    topic_to_subscribers: HashMap<String, HashSet<S>>,
    subscriber_to_filter: HashMap<S, TopicFilter>,
}

/// Point-in-time copy of local subscriptions; cheap to clone and share across tasks.
#[derive(Debug)]
pub struct SubscriptionSnapshot<S> {
    contents: Arc<SnapshotContents<S>>,
}

impl<S> Clone for SubscriptionSnapshot<S> {
    fn clone(&self) -> Self {
        Self {
            contents: Arc::clone(&self.contents),
        }
    }
}

impl<S: Clone + Eq + Hash> SubscriptionSnapshot<S> {
    pub(crate) fn new(
        topic_to_subscribers: HashMap<String, HashSet<S>>,
        subscriber_to_filter: HashMap<S, TopicFilter>,
    ) -> Self {
        Self {
            contents: Arc::new(SnapshotContents {
                topic_to_subscribers,
                subscriber_to_filter,
            }),
        }
    }

    /// Local subscribers of any of `topics` whose filter accepts the whole collection.
    pub fn get_subscribers<T: AsRef<str>>(&self, topics: &[T]) -> HashSet<S> {
        let topics: Vec<&str> = topics.iter().map(AsRef::as_ref).collect();

        topics
            .iter()
            .filter_map(|topic| self.contents.topic_to_subscribers.get(*topic))
            .flatten()
            .filter(|subscriber| {
                self.contents
                    .subscriber_to_filter
                    .get(*subscriber)
                    .map_or(true, |filter| filter.test(&topics))
            })
            .cloned()
            .collect()
    }
}

impl<S> SubscriptionSnapshot<S> {
    pub fn count_topics(&self) -> usize {
        self.contents.topic_to_subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.topic_to_subscribers.is_empty()
    }
}

impl<S> Default for SubscriptionSnapshot<S> {
    fn default() -> Self {
        Self {
            contents: Arc::new(SnapshotContents {
                topic_to_subscribers: HashMap::new(),
                subscriber_to_filter: HashMap::new(),
            }),
        }
    }
}

struct VersionedSnapshot<S> {
    version: u64,
    snapshot: SubscriptionSnapshot<S>,
}

/// Lock-free publication point for the latest [`SubscriptionSnapshot`].
pub struct SnapshotDirectory<S> {
    current: Arc<ArcSwap<VersionedSnapshot<S>>>,
    next_version: Arc<AtomicU64>,
}

impl<S> Clone for SnapshotDirectory<S> {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
            next_version: Arc::clone(&self.next_version),
        }
    }
}

impl<S> SnapshotDirectory<S> {
    /// Creates a directory holding an empty snapshot at version 0.
    pub fn empty() -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(VersionedSnapshot {
                version: 0,
                snapshot: SubscriptionSnapshot::default(),
            })),
            next_version: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Replaces the current snapshot and returns the version assigned to it.
    pub fn publish(&self, snapshot: SubscriptionSnapshot<S>) -> u64 {
        let version = self.next_version.fetch_add(1, Ordering::Relaxed);
        self.current
            .store(Arc::new(VersionedSnapshot { version, snapshot }));
        debug!(
            event = events::SNAPSHOT_PUBLISHED,
            component = COMPONENT,
            snapshot_version = version,
            "published subscription snapshot"
        );
        version
    }

    /// Latest snapshot together with its version.
    pub fn load(&self) -> (u64, SubscriptionSnapshot<S>) {
        let current = self.current.load();
        (current.version, current.snapshot.clone())
    }

    pub fn current_version(&self) -> u64 {
        self.current.load().version
    }
}

impl<S> Default for SnapshotDirectory<S> {
    fn default() -> Self {
        Self::empty()
    }
}

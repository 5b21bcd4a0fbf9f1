//! Registry hooks that turn topic lifecycle into replicable binding deltas.

use crate::approximation::TopicHash;
use crate::local::{TopicEntry, TopicHooks};
use crate::observability::events;
use crate::replication::delta::SubscriptionDelta;
use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

const COMPONENT: &str = "delta_tracker";

struct TrackerState<H: TopicHash> {
    delta: SubscriptionDelta<H::Element>,
    /// Live topics per binding element; more than one means topics share the element.
    live: HashMap<H::Element, usize>,
}

/// Shared handle over the pending delta of one registry.
///
/// A clone is installed into the registry as its [`TopicHooks`]; the flusher keeps
/// another clone to export. All access goes through one mutex.
pub struct DeltaTracker<H: TopicHash> {
    state: Arc<Mutex<TrackerState<H>>>,
}

impl<H: TopicHash> Clone for DeltaTracker<H> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<H: TopicHash> DeltaTracker<H> {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(TrackerState {
                delta: SubscriptionDelta::new(),
                live: HashMap::new(),
            })),
        }
    }

    fn track(&self, hash: &H) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        for element in hash.elements() {
            let count = state.live.entry(element.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                state.delta.insert(element);
            }
        }
    }

    /// # Panics
    ///
    /// Panics when an element of `hash` is not tracked: a topic was removed that was
    /// never created.
    fn untrack(&self, hash: &H) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        for element in hash.elements() {
            match state.live.entry(element) {
                Entry::Occupied(mut occupied) => {
                    *occupied.get_mut() -= 1;
                    if *occupied.get() == 0 {
                        let (element, _) = occupied.remove_entry();
                        state.delta.delete(element);
                    }
                }
                Entry::Vacant(_) => panic!("removed topic hash was never tracked"),
            }
        }
    }

    /// Takes the pending delta, leaving an empty one for the next flush.
    pub fn export_and_reset(&self) -> SubscriptionDelta<H::Element> {
        self.state.lock().delta.export_and_reset()
    }

    /// Replaces the pending delta with a full overwrite by every live element.
    pub fn request_resync(&self) {
        let mut state = self.state.lock();
        let live = state.live.keys().cloned().collect();
        state.delta = SubscriptionDelta::replacing(live);
        debug!(
            event = events::DELTA_RESYNC_REQUESTED,
            component = COMPONENT,
            live_elements = state.live.len(),
            "pending delta replaced by full resync"
        );
    }

    /// Distinct elements of the binding this tracker maintains.
    pub fn live_element_count(&self) -> usize {
        self.state.lock().live.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.state.lock().delta.is_empty()
    }
}

impl<H: TopicHash> Default for DeltaTracker<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Ord, H: TopicHash> TopicHooks<S, H> for DeltaTracker<H> {
    fn on_new_topic(&mut self, topic: &str, entry: &TopicEntry<S, H>) {
        trace!(component = COMPONENT, topic, "tracking new topic");
        self.track(entry.hash());
    }

    fn on_removed_topic(&mut self, topic: &str, entry: &TopicEntry<S, H>) {
        trace!(component = COMPONENT, topic, "untracking removed topic");
        self.untrack(entry.hash());
    }
}

#[cfg(test)]
mod tests {
    use super::DeltaTracker;
    use crate::approximation::{BloomTopicHasher, LiteralTopicHasher, TopicBits, TopicHasher};
    use crate::local::LocalSubscriptionRegistry;
    use std::collections::HashSet;
    use std::sync::Arc;

    /// Maps every topic onto its first character.
    struct FirstCharHasher;

    impl TopicHasher for FirstCharHasher {
        type Hash = String;

        fn hash(&self, topic: &str) -> String {
            topic.chars().take(1).collect()
        }

        fn matches(&self, bound: &HashSet<String>, query: &[String]) -> bool {
            LiteralTopicHasher.matches(bound, query)
        }
    }

    fn strings(values: &[&str]) -> HashSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn registry_changes_flow_into_delta() {
        let tracker = DeltaTracker::<String>::new();
        let mut registry =
            LocalSubscriptionRegistry::new(Arc::new(LiteralTopicHasher), Box::new(tracker.clone()));

        registry.subscribe(1u32, ["x", "y"], None);
        registry.subscribe(2u32, ["y"], None);
        let first = tracker.export_and_reset();
        assert_eq!(first.inserts(), &strings(&["x", "y"]));
        assert!(first.deletes().is_empty());

        registry.remove_subscriber(&1);
        let second = tracker.export_and_reset();
        assert!(second.inserts().is_empty());
        assert_eq!(second.deletes(), &strings(&["x"]));
        assert!(!tracker.has_pending());
    }

    #[test]
    fn colliding_topics_keep_the_shared_hash_alive() {
        let tracker = DeltaTracker::<String>::new();
        let mut registry =
            LocalSubscriptionRegistry::new(Arc::new(FirstCharHasher), Box::new(tracker.clone()));

        registry.subscribe(1u32, ["apple", "avocado"], None);
        assert_eq!(tracker.export_and_reset().inserts(), &strings(&["a"]));

        registry.unsubscribe(&1, ["apple"]);
        assert!(tracker.export_and_reset().is_empty());

        registry.unsubscribe(&1, ["avocado"]);
        assert_eq!(tracker.export_and_reset().deletes(), &strings(&["a"]));
        assert_eq!(tracker.live_element_count(), 0);
    }

    #[test]
    fn resync_overwrites_pending_changes_with_live_hashes() {
        let tracker = DeltaTracker::<String>::new();
        let mut registry =
            LocalSubscriptionRegistry::new(Arc::new(LiteralTopicHasher), Box::new(tracker.clone()));
        registry.subscribe(1u32, ["x", "y"], None);
        tracker.export_and_reset();
        registry.unsubscribe(&1, ["y"]);

        tracker.request_resync();
        let delta = tracker.export_and_reset();

        assert!(delta.should_replace_all());
        assert_eq!(delta.inserts(), &strings(&["x"]));
        assert!(delta.deletes().is_empty());
    }

    #[test]
    fn resync_of_empty_registry_still_clears_the_binding() {
        let tracker = DeltaTracker::<String>::new();

        tracker.request_resync();

        assert!(tracker.has_pending());
        assert!(tracker.export_and_reset().should_replace_all());
    }

    #[test]
    fn bloom_topics_sharing_bits_keep_them_alive() {
        let hasher = BloomTopicHasher::new(1, 4);
        let tracker = DeltaTracker::<TopicBits>::new();
        let mut registry =
            LocalSubscriptionRegistry::new(Arc::new(hasher.clone()), Box::new(tracker.clone()));
        let topics: Vec<String> = (0..32).map(|i| format!("fleet/{i}")).collect();

        registry.subscribe(1u32, topics.iter().cloned(), None);
        let inserted = tracker.export_and_reset();
        assert!(inserted.inserts().len() <= hasher.bit_count());

        registry.unsubscribe(&1, &topics[1..]);
        let survivor = hasher.hash(&topics[0]);
        let delta = tracker.export_and_reset();
        assert!(survivor
            .indices()
            .iter()
            .all(|bit| !delta.deletes().contains(bit)));
        assert_eq!(
            tracker.live_element_count(),
            survivor.indices().iter().collect::<HashSet<_>>().len()
        );
    }
}

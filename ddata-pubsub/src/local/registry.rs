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

//! Authoritative local subscriber <-> topic <-> filter registry.

use crate::approximation::{TopicHash, TopicHasher};
use crate::local::filter::TopicFilter;
use crate::local::hooks::TopicHooks;
use crate::local::snapshot::SubscriptionSnapshot;
use crate::local::topic_entry::TopicEntry;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt::{Debug, Formatter};
use std::hash::Hash;
use std::sync::Arc;
use tracing::trace;

const COMPONENT: &str = "subscription_registry";

/// Bounds for local subscriber handles: opaque, comparable, hashable values.
pub trait SubscriberHandle: Clone + Debug + Eq + Hash + Ord + Send + Sync + 'static {}

impl<T> SubscriberHandle for T where T: Clone + Debug + Eq + Hash + Ord + Send + Sync + 'static {}

/// Single-writer registry of local subscriptions.
///
/// Keeps three maps consistent:
///
/// - every subscriber key maps to a non-empty topic set;
/// - a subscriber is in a topic's entry iff the topic is in the subscriber's set;
/// - only subscribers with topics may have a filter.
///
/// The registry is not synchronized. Mutations take `&mut self`; concurrent readers use
/// [`LocalSubscriptionRegistry::snapshot`] instead of sharing the live structure.
pub struct LocalSubscriptionRegistry<S: SubscriberHandle, H: TopicHash> {
    subscriber_to_topics: HashMap<S, HashSet<String>>,
    subscriber_to_filter: HashMap<S, TopicFilter>,
    topic_to_entry: HashMap<String, TopicEntry<S, H>>,
    hasher: Arc<dyn TopicHasher<Hash = H>>,
    hooks: Box<dyn TopicHooks<S, H>>,
}

impl<S: SubscriberHandle, H: TopicHash> LocalSubscriptionRegistry<S, H> {
    /// Creates an empty registry with `hooks` notified about topic lifecycle.
    pub fn new(
        hasher: Arc<dyn TopicHasher<Hash = H>>,
        hooks: Box<dyn TopicHooks<S, H>>,
    ) -> Self {
        Self {
            subscriber_to_topics: HashMap::new(),
            subscriber_to_filter: HashMap::new(),
            topic_to_entry: HashMap::new(),
            hasher,
            hooks,
        }
    }

    /// Adds `topics` to the subscriptions of `subscriber` and replaces its filter.
    ///
    /// With no topics this only updates the filter, and only for a subscriber that
    /// already has topics. Returns whether anything visible changed.
    pub fn subscribe<I, T>(&mut self, subscriber: S, topics: I, filter: Option<TopicFilter>) -> bool
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let topics: HashSet<String> = topics.into_iter().map(Into::into).collect();

        if topics.is_empty() {
            if !self.subscriber_to_topics.contains_key(&subscriber) {
                return false;
            }
            self.replace_filter(&subscriber, filter);
            return true;
        }

        let mut changed = self.replace_filter(&subscriber, filter);
        self.subscriber_to_topics
            .entry(subscriber.clone())
            .or_default()
            .extend(topics.iter().cloned());

        for topic in topics {
            changed |= self.add_subscriber_to_topic(&subscriber, topic);
        }

        trace!(component = COMPONENT, ?subscriber, changed, "subscribe");
        changed
    }

    /// Removes `topics` from the subscriptions of `subscriber`.
    ///
    /// A subscriber left without topics is dropped together with its filter.
    pub fn unsubscribe<I, T>(&mut self, subscriber: &S, topics: I) -> bool
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let Some(current) = self.subscriber_to_topics.remove(subscriber) else {
            return false;
        };
        let requested: HashSet<String> = topics
            .into_iter()
            .map(|topic| topic.as_ref().to_string())
            .collect();

        let (removed, remaining): (HashSet<String>, HashSet<String>) = current
            .into_iter()
            .partition(|topic| requested.contains(topic));

        let mut changed = false;
        for topic in &removed {
            changed |= self.remove_subscriber_from_topic(subscriber, topic);
        }

        if remaining.is_empty() {
            self.subscriber_to_filter.remove(subscriber);
        } else {
            self.subscriber_to_topics
                .insert(subscriber.clone(), remaining);
        }

        trace!(component = COMPONENT, ?subscriber, changed, "unsubscribe");
        changed
    }

    /// Drops every subscription and the filter of a terminated subscriber.
    pub fn remove_subscriber(&mut self, subscriber: &S) -> bool {
        let mut changed = self.subscriber_to_filter.remove(subscriber).is_some();

        if let Some(topics) = self.subscriber_to_topics.remove(subscriber) {
            for topic in &topics {
                changed |= self.remove_subscriber_from_topic(subscriber, topic);
            }
        }

        trace!(component = COMPONENT, ?subscriber, changed, "remove_subscriber");
        changed
    }

    pub fn contains(&self, subscriber: &S) -> bool {
        self.subscriber_to_topics.contains_key(subscriber)
    }

    /// Number of topics with at least one local subscriber.
    pub fn count_topics(&self) -> usize {
        self.topic_to_entry.len()
    }

    pub fn topics_of(&self, subscriber: &S) -> Option<&HashSet<String>> {
        self.subscriber_to_topics.get(subscriber)
    }

    pub fn hash_topic(&self, topic: &str) -> H {
        self.hasher.hash(topic)
    }

    /// Exports subscriber sets and filters into an immutable, shareable snapshot.
    pub fn snapshot(&self) -> SubscriptionSnapshot<S> {
        let topic_to_subscribers = self
            .topic_to_entry
            .iter()
            .map(|(topic, entry)| {
                (
                    topic.clone(),
                    entry.subscribers().iter().cloned().collect::<HashSet<S>>(),
                )
            })
            .collect();

        SubscriptionSnapshot::new(topic_to_subscribers, self.subscriber_to_filter.clone())
    }

    /// Returns whether the stored filter changed.
    fn replace_filter(&mut self, subscriber: &S, filter: Option<TopicFilter>) -> bool {
        match filter {
            Some(filter) => match self
                .subscriber_to_filter
                .insert(subscriber.clone(), filter.clone())
            {
                Some(previous) => previous != filter,
                None => true,
            },
            None => self.subscriber_to_filter.remove(subscriber).is_some(),
        }
    }

    /// Returns whether a topic was created or an existing entry grew.
    fn add_subscriber_to_topic(&mut self, subscriber: &S, topic: String) -> bool {
        match self.topic_to_entry.entry(topic) {
            Entry::Occupied(mut occupied) => occupied.get_mut().add_subscriber(subscriber.clone()),
            Entry::Vacant(vacant) => {
                let hash = self.hasher.hash(vacant.key());
                let topic = vacant.key().clone();
                let entry = vacant.insert(TopicEntry::first_subscriber(subscriber.clone(), hash));
                self.hooks.on_new_topic(&topic, entry);
                true
            }
        }
    }

    /// Returns whether the entry shrank.
    ///
    /// # Panics
    ///
    /// Panics when `topic` has no entry: the subscriber maps and the topic map disagree.
    fn remove_subscriber_from_topic(&mut self, subscriber: &S, topic: &str) -> bool {
        let Some(entry) = self.topic_to_entry.get_mut(topic) else {
            panic!("registry inconsistent: {subscriber:?} subscribed to {topic:?} without entry");
        };

        let removed = entry.remove_subscriber(subscriber);
        if entry.is_empty() {
            if let Some(entry) = self.topic_to_entry.remove(topic) {
                self.hooks.on_removed_topic(topic, &entry);
            }
        }
        removed
    }

    /// Checks the three cross-map invariants, describing the first violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        for (subscriber, topics) in &self.subscriber_to_topics {
            if topics.is_empty() {
                return Err(format!("{subscriber:?} has an empty topic set"));
            }
            for topic in topics {
                let listed = self
                    .topic_to_entry
                    .get(topic)
                    .is_some_and(|entry| entry.subscribers().contains(subscriber));
                if !listed {
                    return Err(format!("{subscriber:?} missing from entry of {topic:?}"));
                }
            }
        }

        for (topic, entry) in &self.topic_to_entry {
            if entry.is_empty() {
                return Err(format!("entry of {topic:?} is empty"));
            }
            for subscriber in entry.subscribers() {
                let listed = self
                    .subscriber_to_topics
                    .get(subscriber)
                    .is_some_and(|topics| topics.contains(topic));
                if !listed {
                    return Err(format!("{topic:?} missing from topics of {subscriber:?}"));
                }
            }
        }

        for subscriber in self.subscriber_to_filter.keys() {
            if !self.subscriber_to_topics.contains_key(subscriber) {
                return Err(format!("{subscriber:?} has a filter but no topics"));
            }
        }

        Ok(())
    }
}

impl<S: SubscriberHandle, H: TopicHash> PartialEq for LocalSubscriptionRegistry<S, H> {
    fn eq(&self, other: &Self) -> bool {
        self.subscriber_to_topics == other.subscriber_to_topics
            && self.subscriber_to_filter == other.subscriber_to_filter
            && self.topic_to_entry == other.topic_to_entry
    }
}

impl<S: SubscriberHandle, H: TopicHash> Debug for LocalSubscriptionRegistry<S, H> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSubscriptionRegistry")
            .field("subscriber_to_topics", &self.subscriber_to_topics)
            .field("subscriber_to_filter", &self.subscriber_to_filter)
            .field("topic_to_entry", &self.topic_to_entry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::LocalSubscriptionRegistry;
    use crate::approximation::LiteralTopicHasher;
    use crate::local::filter::TopicFilter;
    use crate::local::hooks::{NoopHooks, TopicHooks};
    use crate::local::topic_entry::TopicEntry;
    use parking_lot::Mutex;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct RecordingHooks {
        created: Arc<Mutex<Vec<String>>>,
        removed: Arc<Mutex<Vec<String>>>,
    }

    impl TopicHooks<&'static str, String> for RecordingHooks {
        fn on_new_topic(&mut self, topic: &str, entry: &TopicEntry<&'static str, String>) {
            assert_eq!(entry.hash(), topic);
            self.created.lock().push(topic.to_string());
        }

        fn on_removed_topic(&mut self, topic: &str, entry: &TopicEntry<&'static str, String>) {
            assert!(entry.is_empty());
            self.removed.lock().push(topic.to_string());
        }
    }

    fn registry() -> LocalSubscriptionRegistry<&'static str, String> {
        LocalSubscriptionRegistry::new(Arc::new(LiteralTopicHasher), Box::new(NoopHooks))
    }

    fn recording_registry() -> (LocalSubscriptionRegistry<&'static str, String>, RecordingHooks)
    {
        let hooks = RecordingHooks::default();
        let registry =
            LocalSubscriptionRegistry::new(Arc::new(LiteralTopicHasher), Box::new(hooks.clone()));
        (registry, hooks)
    }

    fn set(subscribers: &[&'static str]) -> HashSet<&'static str> {
        subscribers.iter().copied().collect()
    }

    #[test]
    fn repeated_subscribe_reports_no_change() {
        let mut registry = registry();
        let filter = TopicFilter::new(|_| true);

        assert!(registry.subscribe("s", ["t"], Some(filter.clone())));
        assert!(!registry.subscribe("s", ["t"], Some(filter)));
        assert!(registry.check_invariants().is_ok());
    }

    #[test]
    fn new_filter_alone_is_a_change() {
        let mut registry = registry();
        registry.subscribe("s", ["t"], None);

        assert!(registry.subscribe("s", ["t"], Some(TopicFilter::new(|_| true))));
        assert!(registry.subscribe("s", ["t"], None));
        assert!(!registry.subscribe("s", ["t"], None));
    }

    #[test]
    fn filter_only_update_needs_existing_topics() {
        let mut registry = registry();

        assert!(!registry.subscribe("s", Vec::<String>::new(), Some(TopicFilter::new(|_| true))));
        assert!(!registry.contains(&"s"));

        registry.subscribe("s", ["t"], None);
        assert!(registry.subscribe("s", Vec::<String>::new(), Some(TopicFilter::new(|_| false))));
        assert!(registry.snapshot().get_subscribers(&["t"]).is_empty());
        assert!(registry.check_invariants().is_ok());
    }

    #[test]
    fn unsubscribing_every_topic_drops_the_subscriber() {
        let mut registry = registry();
        registry.subscribe("s", ["a", "b"], Some(TopicFilter::new(|_| true)));

        assert!(registry.unsubscribe(&"s", ["a", "b"]));

        assert!(!registry.contains(&"s"));
        assert_eq!(registry.count_topics(), 0);
        assert!(registry.check_invariants().is_ok());
    }

    #[test]
    fn partial_unsubscribe_keeps_remaining_topics_and_filter() {
        let mut registry = registry();
        let filter = TopicFilter::new(|_| true);
        registry.subscribe("s", ["a", "b"], Some(filter.clone()));

        assert!(registry.unsubscribe(&"s", ["a", "unknown"]));

        assert_eq!(
            registry.topics_of(&"s"),
            Some(&["b".to_string()].into_iter().collect())
        );
        assert!(!registry.subscribe("s", ["b"], Some(filter)));
        assert!(registry.check_invariants().is_ok());
    }

    #[test]
    fn unsubscribe_of_unknown_subscriber_or_topic_is_no_change() {
        let mut registry = registry();
        registry.subscribe("s", ["a"], None);

        assert!(!registry.unsubscribe(&"other", ["a"]));
        assert!(!registry.unsubscribe(&"s", ["b"]));
        assert!(registry.contains(&"s"));
    }

    #[test]
    fn snapshot_resolves_union_of_topic_subscribers() {
        let mut registry = registry();
        registry.subscribe("s1", ["x", "y"], None);
        registry.subscribe("s2", ["y"], None);

        let snapshot = registry.snapshot();

        assert_eq!(snapshot.get_subscribers(&["y"]), set(&["s1", "s2"]));
        assert_eq!(snapshot.get_subscribers(&["x"]), set(&["s1"]));
        assert!(snapshot.get_subscribers(&["z"]).is_empty());
    }

    #[test]
    fn remove_subscriber_fires_removal_only_for_emptied_topics() {
        let (mut registry, hooks) = recording_registry();
        registry.subscribe("s1", ["x", "y"], None);
        registry.subscribe("s2", ["y"], None);

        assert!(registry.remove_subscriber(&"s1"));

        assert_eq!(registry.snapshot().get_subscribers(&["x", "y"]), set(&["s2"]));
        assert_eq!(*hooks.removed.lock(), vec!["x".to_string()]);
        let mut created = hooks.created.lock().clone();
        created.sort();
        assert_eq!(created, vec!["x".to_string(), "y".to_string()]);
        assert!(!registry.remove_subscriber(&"s1"));
    }

    #[test]
    fn snapshot_is_isolated_from_later_writes() {
        let mut registry = registry();
        registry.subscribe("s1", ["x"], None);
        let snapshot = registry.snapshot();

        registry.subscribe("s2", ["x"], None);
        registry.remove_subscriber(&"s1");

        assert_eq!(snapshot.get_subscribers(&["x"]), set(&["s1"]));
        assert_eq!(registry.snapshot().get_subscribers(&["x"]), set(&["s2"]));
    }

    #[test]
    fn equality_is_structural_over_the_maps() {
        let filter = TopicFilter::new(|_| true);
        let mut left = registry();
        let mut right = registry();

        left.subscribe("s1", ["a", "b"], Some(filter.clone()));
        left.subscribe("s2", ["b"], None);
        right.subscribe("s2", ["b"], None);
        right.subscribe("s1", ["b"], Some(filter.clone()));
        right.subscribe("s1", ["a"], Some(filter));

        assert_eq!(left, right);
        right.unsubscribe(&"s2", ["b"]);
        assert_ne!(left, right);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Subscribe(usize, Vec<usize>, bool),
        Unsubscribe(usize, Vec<usize>),
        Remove(usize),
    }

    const SUBSCRIBERS: [&str; 4] = ["s0", "s1", "s2", "s3"];
    const TOPICS: [&str; 5] = ["t0", "t1", "t2", "t3", "t4"];

    fn op() -> impl Strategy<Value = Op> {
        let topics = proptest::collection::vec(0..TOPICS.len(), 0..4);
        prop_oneof![
            (0..SUBSCRIBERS.len(), topics.clone(), any::<bool>())
                .prop_map(|(s, t, f)| Op::Subscribe(s, t, f)),
            (0..SUBSCRIBERS.len(), topics).prop_map(|(s, t)| Op::Unsubscribe(s, t)),
            (0..SUBSCRIBERS.len()).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn invariants_hold_after_every_operation(ops in proptest::collection::vec(op(), 1..60)) {
            let (mut registry, hooks) = recording_registry();
            let shared_filter = TopicFilter::new(|_| true);

            for op in ops {
                match op {
                    Op::Subscribe(s, topics, with_filter) => {
                        let filter = with_filter.then(|| shared_filter.clone());
                        registry.subscribe(SUBSCRIBERS[s], topics.iter().map(|t| TOPICS[*t]), filter);
                    }
                    Op::Unsubscribe(s, topics) => {
                        registry.unsubscribe(&SUBSCRIBERS[s], topics.iter().map(|t| TOPICS[*t]));
                    }
                    Op::Remove(s) => {
                        registry.remove_subscriber(&SUBSCRIBERS[s]);
                    }
                }
                prop_assert_eq!(registry.check_invariants(), Ok(()));
                prop_assert_eq!(
                    hooks.created.lock().len() - hooks.removed.lock().len(),
                    registry.count_topics()
                );
            }
        }
    }
}

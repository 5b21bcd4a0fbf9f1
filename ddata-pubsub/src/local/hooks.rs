//! Topic lifecycle callbacks injected into the registry.

use crate::local::topic_entry::TopicEntry;

/// Observer of topics appearing in and disappearing from a registry.
///
/// Invoked on the registry's writer path, after the registry maps are updated.
pub trait TopicHooks<S: Ord, H>: Send {
    /// A topic got its first local subscriber.
    fn on_new_topic(&mut self, topic: &str, entry: &TopicEntry<S, H>);

    /// A topic lost its last local subscriber; `entry` is already detached.
    fn on_removed_topic(&mut self, topic: &str, entry: &TopicEntry<S, H>);
}

/// Hooks for registries that need no delta tracking.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHooks;

impl<S: Ord, H> TopicHooks<S, H> for NoopHooks {
    fn on_new_topic(&mut self, _topic: &str, _entry: &TopicEntry<S, H>) {}

    fn on_removed_topic(&mut self, _topic: &str, _entry: &TopicEntry<S, H>) {}
}

//! Per-subscriber topic-collection predicates.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Predicate over the full topic collection of one publish.
///
/// Two filters are equal only when they are the same allocation; cloning keeps identity.
#[derive(Clone)]
pub struct TopicFilter(Arc<dyn Fn(&[&str]) -> bool + Send + Sync>);

impl TopicFilter {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&[&str]) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    pub fn test(&self, topics: &[&str]) -> bool {
        (self.0)(topics)
    }
}

impl PartialEq for TopicFilter {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for TopicFilter {}

impl Debug for TopicFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TopicFilter")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

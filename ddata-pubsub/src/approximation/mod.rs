//! Lossy topic approximation layer.
//!
//! Maps topics to compact hash representations and answers "may this binding want
//! one of these topics" without false negatives.
//!
//! ```
//! use ddata_pubsub::approximation::{bit_vector_set, BloomTopicHasher, TopicHash, TopicHasher};
//!
//! let hasher = BloomTopicHasher::new(32, 3);
//! let temperature = hasher.hash("sensors/temperature");
//! let buffer = hasher.compact(temperature.elements());
//!
//! assert_eq!(buffer.len(), 32);
//! assert!(bit_vector_set::contains(&buffer, temperature.indices()));
//! ```

pub mod bit_vector_set;

mod topic_hasher;
pub use topic_hasher::{BloomTopicHasher, LiteralTopicHasher, TopicBits, TopicHash, TopicHasher};

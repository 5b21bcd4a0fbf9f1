//! Structured logging vocabulary shared by every component of the crate.

pub mod events;
pub mod fields;

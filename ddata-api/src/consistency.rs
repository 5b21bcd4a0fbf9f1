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

//! Caller-chosen replica acknowledgement policies.
//!
//! Both policies are opaque to `ddata-pubsub`: they are threaded through to the
//! replicated map untouched.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How many replicas must acknowledge a write before it completes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum WriteConsistency {
    /// Apply locally, disseminate by gossip, no round trip.
    #[default]
    Local,
    /// At least `n` replicas, including the local one.
    To { n: usize, timeout_ms: u64 },
    Majority { timeout_ms: u64 },
    All { timeout_ms: u64 },
}

impl WriteConsistency {
    /// Time the replicated map may wait for acknowledgements; `None` for local writes.
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            WriteConsistency::Local => None,
            WriteConsistency::To { timeout_ms, .. }
            | WriteConsistency::Majority { timeout_ms }
            | WriteConsistency::All { timeout_ms } => Some(Duration::from_millis(*timeout_ms)),
        }
    }
}

/// How many replicas must be consulted before a read completes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum ReadConsistency {
    #[default]
    Local,
    From { n: usize, timeout_ms: u64 },
    Majority { timeout_ms: u64 },
    All { timeout_ms: u64 },
}

impl ReadConsistency {
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            ReadConsistency::Local => None,
            ReadConsistency::From { timeout_ms, .. }
            | ReadConsistency::Majority { timeout_ms }
            | ReadConsistency::All { timeout_ms } => Some(Duration::from_millis(*timeout_ms)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ReadConsistency, WriteConsistency};
    use std::time::Duration;

    #[test]
    fn tagged_representation_is_stable() {
        let write: WriteConsistency =
            serde_json::from_str(r#"{"kind":"majority","timeout_ms":2000}"#).unwrap();
        let read: ReadConsistency = serde_json::from_str(r#"{"kind":"local"}"#).unwrap();

        assert_eq!(write, WriteConsistency::Majority { timeout_ms: 2000 });
        assert_eq!(write.timeout(), Some(Duration::from_secs(2)));
        assert_eq!(read, ReadConsistency::Local);
        assert_eq!(read.timeout(), None);
    }
}

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

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Failures reported by a replicated map for reads and writes.
///
/// None of these leave local subscription state inconsistent; they only mean that
/// remote members may see stale data until the next successful write.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReplicationError {
    /// Not enough acknowledgements arrived within the consistency timeout.
    Timeout(Duration),
    /// Fewer reachable replicas than the consistency level requires.
    ConsistencyNotMet { required: usize, reachable: usize },
    /// The replicator could not be reached at all.
    Unavailable(String),
    /// The replicator refused the operation, for example an oversized value.
    Rejected(String),
}

impl ReplicationError {
    /// `true` when the same operation may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ReplicationError::Rejected(_))
    }
}

impl Display for ReplicationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplicationError::Timeout(elapsed) => {
                write!(f, "replication timed out after {elapsed:?}")
            }
            ReplicationError::ConsistencyNotMet {
                required,
                reachable,
            } => write!(
                f,
                "consistency not met: {required} replicas required, {reachable} reachable"
            ),
            ReplicationError::Unavailable(reason) => {
                write!(f, "replicator unavailable: {reason}")
            }
            ReplicationError::Rejected(reason) => write!(f, "replication rejected: {reason}"),
        }
    }
}

impl Error for ReplicationError {}

#[cfg(test)]
mod tests {
    use super::ReplicationError;
    use std::time::Duration;

    #[test]
    fn only_rejections_are_final() {
        assert!(ReplicationError::Timeout(Duration::from_millis(5)).is_retryable());
        assert!(ReplicationError::ConsistencyNotMet {
            required: 3,
            reachable: 1
        }
        .is_retryable());
        assert!(ReplicationError::Unavailable("partitioned".to_string()).is_retryable());
        assert!(!ReplicationError::Rejected("too large".to_string()).is_retryable());
    }

    #[test]
    fn display_is_stable() {
        let error = ReplicationError::ConsistencyNotMet {
            required: 2,
            reachable: 1,
        };

        assert_eq!(
            error.to_string(),
            "consistency not met: 2 replicas required, 1 reachable"
        );
    }
}

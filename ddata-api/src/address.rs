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

//! Stable value-type addresses for cluster members and subscriber handles.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Identity of one incarnation of a cluster member.
///
/// A restarted node reuses its `node` name but gets a fresh `incarnation`, so bindings
/// written by the previous incarnation can be evicted without touching the new one.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct MemberAddress {
    node: String,
    incarnation: Uuid,
}

impl MemberAddress {
    /// Creates an address for a new incarnation of `node`.
    pub fn new(node: impl Into<String>) -> Self {
        Self::with_incarnation(node, Uuid::new_v4())
    }

    pub fn with_incarnation(node: impl Into<String>, incarnation: Uuid) -> Self {
        Self {
            node: node.into(),
            incarnation,
        }
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn incarnation(&self) -> Uuid {
        self.incarnation
    }
}

impl Display for MemberAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.node, self.incarnation)
    }
}

/// Subscriber handle: the owning member plus a member-local sequence number.
///
/// Never a live connection; safe to hash, order, and replicate across processes.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct SubscriberAddress {
    member: MemberAddress,
    local_id: u64,
}

impl SubscriberAddress {
    pub fn new(member: MemberAddress, local_id: u64) -> Self {
        Self { member, local_id }
    }

    /// Member that owns (and is the only writer of) this address.
    pub fn member(&self) -> &MemberAddress {
        &self.member
    }

    pub fn local_id(&self) -> u64 {
        self.local_id
    }
}

impl Display for SubscriberAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.member, self.local_id)
    }
}

/// Failure to parse a `node#incarnation/local_id` address string.
#[derive(Debug, Eq, PartialEq)]
pub struct AddressParseError {
    input: String,
    reason: &'static str,
}

impl Display for AddressParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid subscriber address '{}': {}", self.input, self.reason)
    }
}

impl Error for AddressParseError {}

impl FromStr for MemberAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = |reason| AddressParseError {
            input: s.to_string(),
            reason,
        };

        let (node, incarnation) = s.rsplit_once('#').ok_or_else(|| error("missing '#'"))?;
        if node.is_empty() {
            return Err(error("empty node name"));
        }
        let incarnation =
            Uuid::parse_str(incarnation).map_err(|_| error("incarnation is not a UUID"))?;

        Ok(Self::with_incarnation(node, incarnation))
    }
}

impl FromStr for SubscriberAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (member, local_id) = s.rsplit_once('/').ok_or_else(|| AddressParseError {
            input: s.to_string(),
            reason: "missing '/'",
        })?;
        let local_id = local_id.parse::<u64>().map_err(|_| AddressParseError {
            input: s.to_string(),
            reason: "local id is not an unsigned integer",
        })?;

        Ok(Self::new(member.parse()?, local_id))
    }
}

#[cfg(test)]
mod tests {
    use super::{MemberAddress, SubscriberAddress};
    use std::collections::HashSet;
    use uuid::Uuid;

    #[test]
    fn display_and_parse_agree() {
        let member = MemberAddress::new("node-a");
        let subscriber = SubscriberAddress::new(member.clone(), 42);

        let parsed: SubscriberAddress = subscriber.to_string().parse().expect("should parse");

        assert_eq!(parsed, subscriber);
        assert_eq!(parsed.member(), &member);
        assert_eq!(parsed.local_id(), 42);
    }

    #[test]
    fn node_names_may_contain_separators() {
        let incarnation = Uuid::new_v4();
        let text = format!("pod/ns#a#{incarnation}/7");

        let parsed: SubscriberAddress = text.parse().expect("should parse");

        assert_eq!(parsed.member().node(), "pod/ns#a");
        assert_eq!(parsed.member().incarnation(), incarnation);
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!("node-a/1".parse::<SubscriberAddress>().is_err());
        assert!("node-a#not-a-uuid/1".parse::<SubscriberAddress>().is_err());
        assert!(format!("node-a#{}/x", Uuid::new_v4())
            .parse::<SubscriberAddress>()
            .is_err());
        assert!(format!("#{}/1", Uuid::new_v4())
            .parse::<SubscriberAddress>()
            .is_err());
    }

    #[test]
    fn restarted_member_is_a_distinct_address() {
        let first = MemberAddress::new("node-a");
        let second = MemberAddress::new("node-a");

        let mut seen = HashSet::new();
        seen.insert(SubscriberAddress::new(first, 1));
        seen.insert(SubscriberAddress::new(second, 1));

        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn serde_round_trip_keeps_identity() {
        let subscriber = SubscriberAddress::new(MemberAddress::new("node-b"), 3);

        let json = serde_json::to_string(&subscriber).expect("should serialize");
        let back: SubscriberAddress = serde_json::from_str(&json).expect("should deserialize");

        assert_eq!(back, subscriber);
    }
}

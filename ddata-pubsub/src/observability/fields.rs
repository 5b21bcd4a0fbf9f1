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

//! Canonical reason values and value-format helpers for log fields.

pub const NONE: &str = "none";
pub const REASON_BROADCAST_CLOSED: &str = "broadcast_closed";
pub const REASON_FLUSH_FAILED: &str = "flush_failed";
pub const REASON_RANDOM_RESYNC: &str = "random_resync";
pub const REASON_SELF_REMOVAL: &str = "self_removal";
pub const REASON_REQUESTED: &str = "requested";

/// Compact, bounded rendering of a topic collection for log fields.
pub fn format_topics<T: AsRef<str>>(topics: &[T]) -> String {
    const SHOWN: usize = 4;
    if topics.is_empty() {
        return NONE.to_string();
    }

    let mut rendered = topics
        .iter()
        .take(SHOWN)
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",");
    if topics.len() > SHOWN {
        rendered.push_str(&format!(",+{}", topics.len() - SHOWN));
    }
    rendered
}

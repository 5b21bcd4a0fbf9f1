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

mod support;

use ddata_api::{ChangeNotification, ClusterMembership, ReplicationError};
use in_memory_ddata::InMemoryReplicator;
use std::sync::Arc;

#[tokio::test]
async fn departed_member_stops_matching() {
    support::init_logging();
    let replicator = InMemoryReplicator::<u32>::new();
    let node_a = support::bloom_member("node-a", &replicator);
    let node_b = support::bloom_member("node-b", &replicator);

    node_a.facade.subscribe(1, ["doors/front"], None).await;
    node_b.facade.subscribe(2, ["doors/front"], None).await;
    node_a.facade.flush().await.expect("node-a flush");
    node_b.facade.flush().await.expect("node-b flush");
    assert_eq!(
        node_a
            .facade
            .remote_subscribers(&["doors/front"])
            .await
            .expect("remote lookup")
            .len(),
        1
    );

    let mut changes = node_a.facade.receive_changes();
    let cleanup = node_a
        .facade
        .start_membership_cleanup(Arc::new(node_a.membership.clone()));
    let departed = node_b.membership.self_member();
    node_a.membership.member_removed(departed.clone());

    assert_eq!(
        changes.recv().await.expect("owner removal"),
        ChangeNotification::OwnerRemoved(departed)
    );
    assert!(node_a
        .facade
        .remote_subscribers(&["doors/front"])
        .await
        .expect("remote lookup")
        .is_empty());
    assert!(replicator.binding(node_a.facade.own_key()).await.is_some());
    assert!(!cleanup.is_finished());
}

#[tokio::test]
async fn removal_of_the_local_member_keeps_its_binding() {
    support::init_logging();
    let replicator = InMemoryReplicator::<u32>::new();
    let node_a = support::bloom_member("node-a", &replicator);
    let node_b = support::bloom_member("node-b", &replicator);

    node_a.facade.subscribe(1, ["doors/back"], None).await;
    node_b.facade.subscribe(2, ["doors/back"], None).await;
    node_a.facade.flush().await.expect("node-a flush");
    node_b.facade.flush().await.expect("node-b flush");

    let mut changes = node_a.facade.receive_changes();
    let _cleanup = node_a
        .facade
        .start_membership_cleanup(Arc::new(node_a.membership.clone()));
    node_a
        .membership
        .member_removed(node_a.membership.self_member());
    // A later departure proves the self-removal was already handled.
    node_a
        .membership
        .member_removed(node_b.membership.self_member());

    assert_eq!(
        changes.recv().await.expect("notification"),
        ChangeNotification::OwnerRemoved(node_b.membership.self_member())
    );
    assert!(replicator.binding(node_a.facade.own_key()).await.is_some());
}

#[tokio::test(start_paused = true)]
async fn departure_survives_a_failed_removal() {
    support::init_logging();
    let replicator = InMemoryReplicator::<u32>::new();
    let node_a = support::bloom_member("node-a", &replicator);
    let node_b = support::bloom_member("node-b", &replicator);
    node_a.membership.member_up(node_b.membership.self_member());

    node_b.facade.subscribe(2, ["x"], None).await;
    node_b.facade.flush().await.expect("node-b flush");

    let mut changes = node_a.facade.receive_changes();
    let _cleanup = node_a
        .facade
        .start_membership_cleanup(Arc::new(node_a.membership.clone()));
    replicator
        .fail_next_writes([ReplicationError::Unavailable("partitioned".to_string())])
        .await;
    node_a
        .membership
        .member_removed(node_b.membership.self_member());

    assert_eq!(
        changes.recv().await.expect("owner removal"),
        ChangeNotification::OwnerRemoved(node_b.membership.self_member())
    );
    assert!(node_a
        .facade
        .remote_subscribers(&["x"])
        .await
        .expect("remote lookup")
        .is_empty());
}

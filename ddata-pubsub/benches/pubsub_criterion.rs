use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use ddata_pubsub::benchmark_support::{
    RegistryChurnFixture, RemoteResolutionFixture, SnapshotLookupFixture,
};
use in_memory_ddata::InMemoryReplicator;
use std::sync::Arc;
use tokio::runtime::Builder;

const CHURN_SUBSCRIBERS: usize = 512;
const CHURN_TOPICS_PER_SUBSCRIBER: usize = 8;
const LOOKUP_SUBSCRIBERS: usize = 1024;
const LOOKUP_TOPICS_PER_SUBSCRIBER: usize = 4;
const REMOTE_MEMBERS: usize = 64;
const REMOTE_TOPICS_PER_MEMBER: usize = 32;

fn pubsub_criterion(c: &mut Criterion) {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("benchmark runtime should build");

    let mut registry_churn_group = c.benchmark_group("registry_churn");
    registry_churn_group.bench_function("subscribe_unsubscribe_cycle", |b| {
        b.iter_batched(
            || RegistryChurnFixture::new(CHURN_SUBSCRIBERS, CHURN_TOPICS_PER_SUBSCRIBER),
            |mut fixture| {
                let exported = fixture.subscribe_unsubscribe_cycle();
                black_box(exported);
            },
            BatchSize::LargeInput,
        );
    });
    registry_churn_group.finish();

    let snapshot_fixture =
        SnapshotLookupFixture::new(LOOKUP_SUBSCRIBERS, LOOKUP_TOPICS_PER_SUBSCRIBER);

    let mut snapshot_lookup_group = c.benchmark_group("snapshot_lookup");
    snapshot_lookup_group.bench_function("union_over_topics", |b| {
        b.iter(|| {
            let count = snapshot_fixture.lookup_count();
            black_box(count);
        });
    });
    snapshot_lookup_group.finish();

    let remote_fixture = runtime
        .block_on(RemoteResolutionFixture::new(
            Arc::new(InMemoryReplicator::<u32>::new()),
            REMOTE_MEMBERS,
            REMOTE_TOPICS_PER_MEMBER,
        ))
        .expect("remote-resolution fixture should build");

    let mut remote_resolution_group = c.benchmark_group("remote_resolution");
    remote_resolution_group.bench_function("bloom_match_all_bindings", |b| {
        b.iter(|| {
            let count = runtime
                .block_on(remote_fixture.resolve_count())
                .expect("in-memory read should succeed");
            black_box(count);
        });
    });
    remote_resolution_group.finish();
}

criterion_group!(benches, pubsub_criterion);
criterion_main!(benches);

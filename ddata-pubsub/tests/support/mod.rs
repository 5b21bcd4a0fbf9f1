use ddata_api::MemberAddress;
use ddata_pubsub::approximation::{
    BloomTopicHasher, LiteralTopicHasher, TopicBits, TopicHash, TopicHasher,
};
use ddata_pubsub::{PubSubConfig, PubSubFacade};
use in_memory_ddata::{InMemoryMembership, InMemoryReplicator};
use std::sync::Arc;

#[allow(dead_code)]
pub(crate) const STATIC_SEED: &str = "../utils/in-memory-ddata/static-configs/testdata.json";
pub(crate) const NAMESPACE: &str = "things";

pub(crate) fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One simulated cluster member for a single namespace.
pub(crate) struct Member<H: TopicHash> {
    pub(crate) membership: InMemoryMembership,
    pub(crate) facade: PubSubFacade<u64, H>,
}

pub(crate) fn make_member<H: TopicHash>(
    node: &str,
    hasher: Arc<dyn TopicHasher<Hash = H>>,
    replicator: &InMemoryReplicator<H::Element>,
    config: PubSubConfig,
) -> Member<H> {
    let membership = InMemoryMembership::new(MemberAddress::new(node));
    let facade = PubSubFacade::new(
        NAMESPACE,
        &membership,
        hasher,
        Arc::new(replicator.clone()),
        config,
    );
    Member { membership, facade }
}

#[allow(dead_code)]
pub(crate) fn bloom_member(node: &str, replicator: &InMemoryReplicator<u32>) -> Member<TopicBits> {
    make_member(
        node,
        Arc::new(BloomTopicHasher::new(64, 3)),
        replicator,
        PubSubConfig::default(),
    )
}

#[allow(dead_code)]
pub(crate) fn literal_member(node: &str, replicator: &InMemoryReplicator<String>) -> Member<String> {
    make_member(
        node,
        Arc::new(LiteralTopicHasher),
        replicator,
        PubSubConfig::default(),
    )
}

//! Shared test utilities for resolver integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Duration;

use common::crypto::{PublicKey, SecretKey};
use common::ipns::IpnsRecord;
use common::linked_data::{Cid, DagNode, Link};
use common::store::{BlockStore, BlockStoreError, MemoryBlockStore};
use resolver::name::MemoryRecordSource;
use resolver::Resolver;

// this fixture module shadows the `common` crate at the test-binary root,
// so re-export what the test files themselves need
pub use common::ipns::RecordError;
pub use common::linked_data::{cid_for_block, RAW_CODE};

/// Install a test subscriber once, driven by RUST_LOG.
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Set up a resolver over fresh in-memory collaborators.
pub fn setup() -> (Resolver, MemoryBlockStore, MemoryRecordSource) {
    init_tracing();
    let store = MemoryBlockStore::new();
    let records = MemoryRecordSource::new();
    let resolver = Resolver::new(Arc::new(store.clone()), Arc::new(records.clone()));
    (resolver, store, records)
}

/// Store a raw leaf block.
pub async fn put_leaf(store: &MemoryBlockStore, data: &[u8]) -> Cid {
    store.put(RAW_CODE, Bytes::copy_from_slice(data)).await.unwrap()
}

/// Store a directory-shaped node with the given named links, in order.
pub async fn put_dir(store: &MemoryBlockStore, links: &[(&str, Cid)]) -> Cid {
    let links = links
        .iter()
        .map(|(name, cid)| Link::new(*name, *cid, 0))
        .collect();
    store.put_node(&DagNode::new(Vec::new(), links)).await.unwrap()
}

/// A deterministic keypair for name fixtures.
pub fn make_key(seed: u8) -> SecretKey {
    let mut bytes = [0u8; 32];
    bytes[0] = seed;
    SecretKey::from(bytes)
}

/// Sign a day-long record for `value` and publish it under the key's name.
pub fn publish_record(records: &MemoryRecordSource, key: &SecretKey, value: &str, sequence: u64) {
    let record = IpnsRecord::sign(key, value, Duration::hours(24), sequence, true);
    records.publish(&key.public(), &record);
}

/// Block store wrapper that counts fetches, for laziness assertions.
#[derive(Clone)]
pub struct CountingStore {
    inner: MemoryBlockStore,
    gets: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new(inner: MemoryBlockStore) -> Self {
        Self {
            inner,
            gets: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlockStore for CountingStore {
    async fn get(&self, cid: &Cid) -> Result<Bytes, BlockStoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(cid).await
    }

    async fn has(&self, cid: &Cid) -> Result<bool, BlockStoreError> {
        self.inner.has(cid).await
    }

    async fn put(&self, codec: u64, data: Bytes) -> Result<Cid, BlockStoreError> {
        self.inner.put(codec, data).await
    }
}

/// Record source wrapper that counts fetches, for termination assertions.
#[derive(Clone)]
pub struct CountingRecordSource {
    inner: MemoryRecordSource,
    gets: Arc<AtomicUsize>,
}

impl CountingRecordSource {
    pub fn new(inner: MemoryRecordSource) -> Self {
        Self {
            inner,
            gets: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl resolver::name::RecordSource for CountingRecordSource {
    async fn get(
        &self,
        name: &PublicKey,
        local_only: bool,
    ) -> Result<Bytes, resolver::name::RecordSourceError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        resolver::name::RecordSource::get(&self.inner, name, local_only).await
    }
}

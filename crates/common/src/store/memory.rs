use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use crate::linked_data::{cid_for_block, Cid};

use super::{BlockStore, BlockStoreError};

/// In-memory block store.
///
/// Backs tests and fixtures; computes CIDs on `put` so stored blocks are
/// genuinely content-addressed. Cheap to clone, internally synchronized.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlockStore {
    blocks: Arc<RwLock<BTreeMap<Cid, Bytes>>>,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blocks currently held.
    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }
}

#[async_trait]
impl BlockStore for MemoryBlockStore {
    async fn get(&self, cid: &Cid) -> Result<Bytes, BlockStoreError> {
        self.blocks
            .read()
            .get(cid)
            .cloned()
            .ok_or(BlockStoreError::NotFound(*cid))
    }

    async fn has(&self, cid: &Cid) -> Result<bool, BlockStoreError> {
        Ok(self.blocks.read().contains_key(cid))
    }

    async fn put(&self, codec: u64, data: Bytes) -> Result<Cid, BlockStoreError> {
        let cid = cid_for_block(codec, &data);
        self.blocks.write().insert(cid, data);
        tracing::trace!("stored block {}", cid);
        Ok(cid)
    }
}

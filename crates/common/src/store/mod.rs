//! Block storage contract
//!
//! The resolution engine never owns storage. It reads blocks through the
//! narrow [`BlockStore`] contract; whether the bytes come from local disk, a
//! network exchange protocol, or both is the implementation's business.
//! Implementations must be safe for concurrent use: many resolution calls
//! may read through the same store at once, and the engine does no locking
//! of its own.

mod memory;

use async_trait::async_trait;
use bytes::Bytes;

use crate::linked_data::{
    decode_node, BlockEncoded, Cid, CodecError, DagCborCodec, DagNode, DAG_CBOR_CODE,
};

pub use memory::MemoryBlockStore;

#[derive(Debug, thiserror::Error)]
pub enum BlockStoreError {
    /// The store has no block for this CID. Distinct from I/O failure:
    /// callers route these two differently.
    #[error("block not found: {0}")]
    NotFound(Cid),
    #[error("block store i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode error: {0}")]
    Codec(#[from] CodecError),
    #[error("block store error: {0}")]
    Default(#[from] anyhow::Error),
}

/// Storage/retrieval abstraction for content-addressed bytes.
///
/// A single `get` is a single attempt: retry policy, fallback endpoints,
/// and caching all belong to the implementation, never to callers.
#[async_trait]
pub trait BlockStore: Send + Sync + 'static {
    /// Fetch the raw bytes for a CID.
    async fn get(&self, cid: &Cid) -> Result<Bytes, BlockStoreError>;

    /// Whether the store currently holds a block for this CID.
    async fn has(&self, cid: &Cid) -> Result<bool, BlockStoreError>;

    /// Store a block under the given codec tag, returning its CID.
    async fn put(&self, codec: u64, data: Bytes) -> Result<Cid, BlockStoreError>;

    /// Fetch a block and decode it into the normalized node view.
    async fn get_node(&self, cid: &Cid) -> Result<DagNode, BlockStoreError> {
        let bytes = self.get(cid).await?;
        Ok(decode_node(cid, &bytes)?)
    }

    /// Store a canonical DAG-CBOR node, returning its CID.
    async fn put_node(&self, node: &DagNode) -> Result<Cid, BlockStoreError> {
        let bytes = BlockEncoded::<DagCborCodec>::encode(node)?;
        self.put(DAG_CBOR_CODE, bytes.into()).await
    }
}

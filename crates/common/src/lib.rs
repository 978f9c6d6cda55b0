/**
 * Cryptographic types and operations.
 *  - Public and Private key implementations
 *  - Signing and verification for name records
 */
pub mod crypto;
/**
 * Name record types for the mutable naming layer.
 *  A record maps a public-key-derived name to a signed,
 *  expiring path value.
 */
pub mod ipns;
/**
 * Internal wrapper around IPLD for linked data.
 *  Content identifiers, links, DAG nodes, and the
 *  codec strategies used to decode them.
 */
pub mod linked_data;
/**
 * Block storage contract.
 *  Narrow async interface over whatever actually holds
 *  content-addressed bytes, plus an in-memory
 *  implementation for tests and fixtures.
 */
pub mod store;

pub mod prelude {
    pub use crate::crypto::{PublicKey, SecretKey};
    pub use crate::ipns::{IpnsRecord, RecordError, Validity};
    pub use crate::linked_data::{Cid, CodecError, DagNode, Link};
    pub use crate::store::{BlockStore, BlockStoreError, MemoryBlockStore};
}

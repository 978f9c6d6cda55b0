//! Linked data primitives
//!
//! Everything here describes the immutable half of the system: blocks are
//! addressed by CID, reference each other only by CID, and carry an ordered
//! list of named links.
//!
//! - **[`Cid`]**: content identifier (version, codec tag, sha2-256 multihash)
//! - **[`Link`]**: one named edge of the DAG
//! - **[`DagNode`]**: the normalized view of a fetched block
//! - **[`NodeCodec`]**: decode strategy selected from the CID's codec tag
//! - **[`BlockEncoded`]**: DAG-CBOR encode/decode for block-shaped types

mod codec;
mod link;
mod node;

pub use codec::{BlockCodec, BlockEncoded, CodecError, DagCborCodec};
pub use link::{cid_for_block, Cid, Link, DAG_CBOR_CODE, RAW_CODE, SHA2_256_CODE};
pub use node::{decode_node, DagNode, NodeCodec};

use multihash::Multihash;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use cid::Cid;

/// Multicodec tag for DAG-CBOR blocks.
pub const DAG_CBOR_CODE: u64 = 0x71;
/// Multicodec tag for raw (opaque leaf) blocks.
pub const RAW_CODE: u64 = 0x55;
/// Multihash code for sha2-256.
pub const SHA2_256_CODE: u64 = 0x12;

/// Compute the CID for a block of bytes under the given codec tag.
///
/// Always CIDv1 with a sha2-256 multihash. Two byte-identical blocks
/// under the same codec always get the same CID.
pub fn cid_for_block(codec: u64, bytes: &[u8]) -> Cid {
    let digest = Sha256::digest(bytes);
    let multihash =
        Multihash::<64>::wrap(SHA2_256_CODE, &digest).expect("sha2-256 digest fits a multihash");
    Cid::new_v1(codec, multihash)
}

/// One named edge of the DAG.
///
/// `name` may be empty: non-directory DAG shapes chain blocks through
/// anonymous links. `size` is the cumulative byte size the target claims,
/// informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub target: Cid,
    pub size: u64,
}

impl Link {
    pub fn new(name: impl Into<String>, target: Cid, size: u64) -> Self {
        Self {
            name: name.into(),
            target,
            size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cid_for_block_deterministic() {
        let a = cid_for_block(RAW_CODE, b"hello");
        let b = cid_for_block(RAW_CODE, b"hello");
        assert_eq!(a, b);

        // different payloads or codecs address differently
        assert_ne!(a, cid_for_block(RAW_CODE, b"world"));
        assert_ne!(a, cid_for_block(DAG_CBOR_CODE, b"hello"));
    }

    #[test]
    fn test_cid_string_round_trip() {
        let cid = cid_for_block(DAG_CBOR_CODE, b"block");
        let parsed: Cid = cid.to_string().parse().unwrap();
        assert_eq!(cid, parsed);
        assert_eq!(parsed.codec(), DAG_CBOR_CODE);
    }
}

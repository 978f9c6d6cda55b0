use serde::de::DeserializeOwned;
use serde::Serialize;

/// Errors raised while encoding or decoding blocks.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("encode error: {0}")]
    Encode(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("unknown codec tag: {0:#x}")]
    UnknownCodec(u64),
}

/// A block-level codec: a multicodec tag plus serde-driven
///  encode/decode for any block-shaped type.
pub trait BlockCodec {
    const CODE: u64;

    fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError>;
    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError>;
}

/// DAG-CBOR, the codec every structured block in this system is written in.
pub struct DagCborCodec;

impl BlockCodec for DagCborCodec {
    const CODE: u64 = super::DAG_CBOR_CODE;

    fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
        serde_ipld_dagcbor::to_vec(value).map_err(|err| CodecError::Encode(err.to_string()))
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
        serde_ipld_dagcbor::from_slice(bytes).map_err(|err| CodecError::Decode(err.to_string()))
    }
}

/// Marker trait for types stored as content-addressed blocks under codec `C`.
///
/// Implementors get `encode`/`decode` for free:
///
/// ```ignore
/// impl BlockEncoded<DagCborCodec> for MyBlock {}
/// let bytes = my_block.encode()?;
/// let back = MyBlock::decode(&bytes)?;
/// ```
pub trait BlockEncoded<C: BlockCodec>: Serialize + DeserializeOwned {
    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        C::encode(self)
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        C::decode(bytes)
    }
}

use ipld_core::ipld::Ipld;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use super::codec::{BlockCodec, BlockEncoded, CodecError, DagCborCodec};
use super::link::{Cid, Link, DAG_CBOR_CODE, RAW_CODE};

/**
 * DAG nodes
 * =========
 * A node is the normalized view of one fetched block: an opaque data
 *  payload plus an ordered list of named links to other blocks.
 * Nodes written by this implementation are DAG-CBOR encoded in the
 *  canonical shape below, but the DAG may contain blocks written by
 *  other software; the codec strategy in [`NodeCodec`] normalizes every
 *  supported shape to the same `links` view.
 * Nodes are immutable once fetched: content addressing guarantees the
 *  bytes correspond to the CID they were fetched under.
 */
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DagNode {
    #[serde_as(as = "serde_with::Bytes")]
    pub data: Vec<u8>,
    pub links: Vec<Link>,
}

impl BlockEncoded<DagCborCodec> for DagNode {}

impl DagNode {
    pub fn new(data: Vec<u8>, links: Vec<Link>) -> Self {
        Self { data, links }
    }

    /// A leaf node: payload only, no links.
    pub fn leaf(data: Vec<u8>) -> Self {
        Self {
            data,
            links: Vec::new(),
        }
    }

    /// Find a link by name. Link order is preserved; the first match wins.
    pub fn link(&self, name: &str) -> Option<&Link> {
        self.links.iter().find(|link| link.name == name)
    }
}

/// Decode strategy for a fetched block, selected from the codec tag
/// carried in its CID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCodec {
    /// DAG-CBOR: canonical node shape, or a generic IPLD link scan for
    /// blocks written in some other shape.
    DagCbor,
    /// Raw bytes: a leaf, never has links.
    Raw,
}

impl NodeCodec {
    pub fn from_code(code: u64) -> Result<Self, CodecError> {
        match code {
            DAG_CBOR_CODE => Ok(NodeCodec::DagCbor),
            RAW_CODE => Ok(NodeCodec::Raw),
            other => Err(CodecError::UnknownCodec(other)),
        }
    }

    pub fn code(&self) -> u64 {
        match self {
            NodeCodec::DagCbor => DAG_CBOR_CODE,
            NodeCodec::Raw => RAW_CODE,
        }
    }

    /// Decode a block into the normalized [`DagNode`] view.
    pub fn decode(&self, bytes: &[u8]) -> Result<DagNode, CodecError> {
        match self {
            NodeCodec::Raw => Ok(DagNode::leaf(bytes.to_vec())),
            NodeCodec::DagCbor => match DagNode::decode(bytes) {
                Ok(node) => Ok(node),
                // Not our canonical shape. Fall back to scanning the
                // generic IPLD structure for CID links.
                Err(_) => {
                    let ipld: Ipld = DagCborCodec::decode(bytes)?;
                    let mut links = Vec::new();
                    collect_links(&ipld, String::new(), &mut links);
                    Ok(DagNode::new(Vec::new(), links))
                }
            },
        }
    }
}

/// Decode the block behind `cid` into the normalized node view.
pub fn decode_node(cid: &Cid, bytes: &[u8]) -> Result<DagNode, CodecError> {
    NodeCodec::from_code(cid.codec())?.decode(bytes)
}

// Walk nested maps and lists, naming each found link by the
//  /-joined path of keys (and list indices) leading to it.
fn collect_links(ipld: &Ipld, path: String, out: &mut Vec<Link>) {
    match ipld {
        Ipld::Link(cid) => {
            out.push(Link::new(path, *cid, 0));
        }
        Ipld::Map(map) => {
            for (key, value) in map {
                collect_links(value, join_path(&path, key), out);
            }
        }
        Ipld::List(list) => {
            for (index, value) in list.iter().enumerate() {
                collect_links(value, join_path(&path, &index.to_string()), out);
            }
        }
        _ => {}
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linked_data::cid_for_block;
    use std::collections::BTreeMap;

    #[test]
    fn test_node_encode_decode() {
        let child = cid_for_block(RAW_CODE, b"child");
        let node = DagNode::new(
            b"payload".to_vec(),
            vec![
                Link::new("a", child, 5),
                Link::new("", child, 5), // anonymous links are legal
            ],
        );

        let encoded = node.encode().unwrap();
        let decoded = DagNode::decode(&encoded).unwrap();

        assert_eq!(node, decoded);
    }

    #[test]
    fn test_raw_codec_is_a_leaf() {
        let node = NodeCodec::Raw.decode(b"just bytes").unwrap();
        assert_eq!(node.data, b"just bytes");
        assert!(node.links.is_empty());
    }

    #[test]
    fn test_dag_cbor_canonical_shape() {
        let child = cid_for_block(RAW_CODE, b"child");
        let node = DagNode::new(Vec::new(), vec![Link::new("dir", child, 0)]);
        let bytes = node.encode().unwrap();

        let decoded = NodeCodec::DagCbor.decode(&bytes).unwrap();
        assert_eq!(decoded.link("dir").unwrap().target, child);
    }

    #[test]
    fn test_dag_cbor_foreign_shape_scans_links() {
        // A block some other writer produced: links nested under maps
        // and lists rather than our canonical shape.
        let a = cid_for_block(RAW_CODE, b"a");
        let b = cid_for_block(RAW_CODE, b"b");

        let inner: BTreeMap<String, Ipld> =
            BTreeMap::from([("deep".to_string(), Ipld::Link(b))]);
        let outer: BTreeMap<String, Ipld> = BTreeMap::from([
            ("first".to_string(), Ipld::Link(a)),
            ("nested".to_string(), Ipld::Map(inner)),
            ("items".to_string(), Ipld::List(vec![Ipld::Link(a)])),
            ("noise".to_string(), Ipld::Integer(7)),
        ]);
        let bytes = DagCborCodec::encode(&Ipld::Map(outer)).unwrap();

        let node = NodeCodec::DagCbor.decode(&bytes).unwrap();
        let names: Vec<&str> = node.links.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["first", "items/0", "nested/deep"]);
    }

    #[test]
    fn test_unknown_codec_rejected() {
        assert!(matches!(
            NodeCodec::from_code(0x70),
            Err(CodecError::UnknownCodec(0x70))
        ));
    }

    #[test]
    fn test_decode_node_selects_by_cid_codec() {
        let node = DagNode::leaf(b"leafy".to_vec());
        let bytes = node.encode().unwrap();

        let as_cbor = cid_for_block(DAG_CBOR_CODE, &bytes);
        assert_eq!(decode_node(&as_cbor, &bytes).unwrap(), node);

        let as_raw = cid_for_block(RAW_CODE, b"leafy");
        let raw = decode_node(&as_raw, b"leafy").unwrap();
        assert_eq!(raw.data, b"leafy");
    }
}

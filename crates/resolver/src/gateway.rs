//! Gateway-style sequential path resolution
//!
//! HTTP-facing consumers want a little more than a final CID: they need to
//! know whether they landed on a directory (so they can look for an index
//! file) or a leaf. Directory detection is a link-shape heuristic, not a
//! format tag: a node whose links are non-empty and named reads as a
//! listing.

use common::linked_data::{Cid, Link};
use common::store::BlockStore;

use crate::error::ResolveError;
use crate::interrupt::Interrupt;

/// Index file names searched inside a directory, in priority order.
pub const INDEX_HTML_FILES: [&str; 3] = ["index.html", "index.htm", "index.shtml"];

/// What a sequential resolution landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayNode {
    /// A leaf: raw data or anonymous link chaining.
    File { cid: Cid },
    /// A directory listing: named links, in node order.
    Directory { cid: Cid, links: Vec<Link> },
}

impl GatewayNode {
    pub fn cid(&self) -> &Cid {
        match self {
            GatewayNode::File { cid } => cid,
            GatewayNode::Directory { cid, .. } => cid,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, GatewayNode::Directory { .. })
    }

    /// Find the directory's index file, by [`INDEX_HTML_FILES`] priority.
    ///
    /// Asking a leaf for an index file is a
    /// [`ResolveError::NotADirectory`].
    pub fn find_index(&self) -> Result<Option<&Link>, ResolveError> {
        match self {
            GatewayNode::File { cid } => Err(ResolveError::NotADirectory(*cid)),
            GatewayNode::Directory { links, .. } => Ok(INDEX_HTML_FILES
                .iter()
                .find_map(|name| links.iter().find(|link| link.name == *name))),
        }
    }
}

/// Resolve `segments` from `root` one node at a time, then classify the
/// terminal node.
///
/// Link matching is the same rule as the plain walk; the extra fetch at the
/// end is what lets the terminal node's link shape be inspected.
pub async fn resolve_sequential(
    store: &dyn BlockStore,
    root: &Cid,
    segments: &[String],
    interrupt: &Interrupt,
) -> Result<GatewayNode, ResolveError> {
    let mut current = *root;

    for segment in segments {
        let node = interrupt.guard(store.get_node(&current)).await?;
        let link = node.link(segment).ok_or_else(|| ResolveError::LinkNotFound {
            cid: current,
            name: segment.clone(),
        })?;
        current = link.target;
    }

    let terminal = interrupt.guard(store.get_node(&current)).await?;
    let is_directory = terminal
        .links
        .first()
        .map(|link| !link.name.is_empty())
        .unwrap_or(false);

    tracing::debug!(cid = %current, is_directory, "terminal node classified");

    if is_directory {
        Ok(GatewayNode::Directory {
            cid: current,
            links: terminal.links,
        })
    } else {
        Ok(GatewayNode::File { cid: current })
    }
}

//! Refs traversal engine
//!
//! Depth- and uniqueness-bounded enumeration of every link reachable from a
//! root, as a lazy pull-based stream. Consumers may stop consuming at any
//! point; no further blocks are fetched once they do. Re-consuming requires
//! a fresh traversal; nothing is cached across calls.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_stream::try_stream;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use common::linked_data::{Cid, Link};
use common::store::BlockStore;

use crate::error::ResolveError;
use crate::interrupt::Interrupt;

/// Default ref template: just the destination CID.
pub const FORMAT_DEFAULT: &str = "<dst>";
/// Edge template: human-readable arrow form.
pub const FORMAT_EDGES: &str = "<src> -> <dst>";

/// One traversal result: an edge of the DAG.
///
/// The root itself is never emitted; it has no parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefEntry {
    /// CID of the node the link hangs off.
    pub parent: Cid,
    /// CID the link points at.
    pub child: Cid,
    /// Link name; empty for anonymous links.
    pub name: String,
    /// Set when `unique` is requested and this child was already visited.
    /// Flagged entries are still emitted but never expanded.
    pub is_duplicate: bool,
}

/// Options for a refs traversal.
#[derive(Debug, Clone, Default)]
pub struct RefsOpts {
    /// Walk the whole reachable set instead of one level.
    pub recursive: bool,
    /// Explicit depth bound. Unset means unbounded when `recursive`,
    /// one level otherwise. `Some(0)` yields nothing and fetches nothing.
    pub max_depth: Option<u64>,
    /// Deduplicate by child CID: repeats are flagged and not expanded.
    pub unique: bool,
    /// Format entries as `<src> -> <dst>` edges. Mutually exclusive with
    /// a custom `format`.
    pub edges: bool,
    /// Custom template with `<src>`, `<dst>` and `<linkname>` placeholders.
    pub format: Option<String>,
    /// Caller's cancellation signal.
    pub cancel: CancellationToken,
    /// Optional deadline for the whole traversal.
    pub deadline: Option<Duration>,
}

impl RefsOpts {
    pub(crate) fn effective_max_depth(&self) -> u64 {
        match self.max_depth {
            Some(depth) => depth,
            None if self.recursive => u64::MAX,
            None => 1,
        }
    }

    /// The template the formatted surface should use.
    ///
    /// Fails when `edges` is combined with a custom format.
    pub(crate) fn effective_format(&self) -> Result<String, ResolveError> {
        match (&self.format, self.edges) {
            (Some(format), true) if format != FORMAT_DEFAULT => Err(ResolveError::EdgesAndFormat),
            (_, true) => Ok(FORMAT_EDGES.to_string()),
            (Some(format), false) => Ok(format.clone()),
            (None, false) => Ok(FORMAT_DEFAULT.to_string()),
        }
    }
}

/// Substitute one entry into a ref template.
pub fn format_ref(entry: &RefEntry, format: &str) -> String {
    format
        .replace("<src>", &entry.parent.to_string())
        .replace("<dst>", &entry.child.to_string())
        .replace("<linkname>", &entry.name)
}

/// Traverse the DAG under `root`, emitting one [`RefEntry`] per link.
///
/// Depth-first, pre-order, preserving each node's own link order: a parent
/// is always emitted before its descendants, and a node's subtree is fully
/// walked before its next sibling. The depth bound cuts *fetching*, not
/// just emission: links past the bound are never requested from the store.
/// With `unique`, a per-traversal visited set marks repeated children as
/// duplicates and leaves them unexpanded; without it the full link multiset
/// is walked with no cycle protection beyond the depth bound.
///
/// A fetch failure terminates the stream with an error tagged with the CID
/// that could not be produced; entries already yielded remain valid.
pub fn traverse_refs(
    store: Arc<dyn BlockStore>,
    root: Cid,
    opts: &RefsOpts,
) -> BoxStream<'static, Result<RefEntry, ResolveError>> {
    let max_depth = opts.effective_max_depth();
    let unique = opts.unique;
    let interrupt = Interrupt::new(opts.cancel.clone(), opts.deadline);

    tracing::debug!(%root, max_depth, unique, "starting refs traversal");

    struct Frame {
        parent: Cid,
        links: std::vec::IntoIter<Link>,
    }

    Box::pin(try_stream! {
        // a zero bound examines nothing, not even the root
        if max_depth > 0 {
            let mut seen: HashSet<Cid> = HashSet::new();

            let root_node = interrupt.guard(store.get_node(&root)).await?;
            let mut stack = vec![Frame {
                parent: root,
                links: root_node.links.into_iter(),
            }];

            loop {
                let Some(frame) = stack.last_mut() else {
                    break;
                };
                let parent = frame.parent;
                let Some(link) = frame.links.next() else {
                    stack.pop();
                    continue;
                };

                interrupt.check()?;

                // depth of the child we are about to emit
                let depth = stack.len() as u64;
                let is_duplicate = unique && !seen.insert(link.target);
                let child = link.target;

                yield RefEntry {
                    parent,
                    child,
                    name: link.name,
                    is_duplicate,
                };

                // duplicates are leaves; links past the bound are never fetched
                if !is_duplicate && depth < max_depth {
                    let node = interrupt.guard(store.get_node(&child)).await?;
                    stack.push(Frame {
                        parent: child,
                        links: node.links.into_iter(),
                    });
                }
            }
        }
    })
}

/// The formatted refs surface: duplicates filtered, entries rendered
/// through the template chosen by `opts`.
pub fn formatted_refs(
    store: Arc<dyn BlockStore>,
    root: Cid,
    opts: &RefsOpts,
) -> Result<BoxStream<'static, Result<String, ResolveError>>, ResolveError> {
    use futures::StreamExt;

    let format = opts.effective_format()?;
    let stream = traverse_refs(store, root, opts).filter_map(move |res| {
        futures::future::ready(match res {
            Ok(entry) if entry.is_duplicate => None,
            Ok(entry) => Some(Ok(format_ref(&entry, &format))),
            Err(err) => Some(Err(err)),
        })
    });
    Ok(Box::pin(stream))
}

//! The umbrella entry point
//!
//! [`Resolver`] bundles the two collaborators (block store, record source)
//! and composes parsing, name resolution, and link walking into the two
//! surfaces the rest of the system calls: [`resolve`](Resolver::resolve)
//! and [`refs`](Resolver::refs).

use std::sync::Arc;
use std::time::Duration;

use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use common::linked_data::Cid;
use common::store::BlockStore;

use crate::error::ResolveError;
use crate::gateway::{self, GatewayNode};
use crate::interrupt::Interrupt;
use crate::name::{resolve_name, NameResolveOpts, RecordSource};
use crate::path::{IpfsPath, Root};
use crate::refs::{formatted_refs, traverse_refs, RefEntry, RefsOpts};
use crate::walk::resolve_links;

/// Options for a [`Resolver::resolve`] call.
#[derive(Debug, Clone)]
pub struct ResolveOpts {
    /// Follow name-to-name indirection to a content root.
    pub recursive: bool,
    /// Restrict record lookups to the local datastore.
    pub local: bool,
    /// Hop bound for recursive name resolution.
    pub max_depth: Option<u32>,
    /// Caller's cancellation signal.
    pub cancel: CancellationToken,
    /// Optional deadline for the whole call.
    pub deadline: Option<Duration>,
}

impl Default for ResolveOpts {
    fn default() -> Self {
        Self {
            recursive: true,
            local: false,
            max_depth: None,
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }
}

/// Terminal output of a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// The path resolved all the way to a content identifier.
    Content { cid: Cid },
    /// Name resolution stopped while still name-addressed (non-recursive
    /// mode). The leftover, unwalked segments stay on the path.
    Name { path: IpfsPath },
}

impl Resolved {
    /// The resolved CID, if resolution reached content.
    pub fn cid(&self) -> Option<&Cid> {
        match self {
            Resolved::Content { cid } => Some(cid),
            Resolved::Name { .. } => None,
        }
    }
}

/// The resolution engine handle.
///
/// Cheap to clone; holds no mutable state of its own, so any number of
/// calls may run concurrently over the same handle. The collaborators are
/// shared and must be internally synchronized.
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn BlockStore>,
    records: Arc<dyn RecordSource>,
}

impl Resolver {
    pub fn new(store: Arc<dyn BlockStore>, records: Arc<dyn RecordSource>) -> Self {
        Self { store, records }
    }

    /// Resolve a path string to a concrete CID.
    ///
    /// Parses the input, resolves a name root through its records (bounded
    /// by `opts.max_depth`), then walks the remaining link segments. When a
    /// name's record points at a path with its own segments, those are
    /// walked first, then the caller's.
    pub async fn resolve(&self, path: &str, opts: &ResolveOpts) -> Result<Resolved, ResolveError> {
        let interrupt = Interrupt::new(opts.cancel.clone(), opts.deadline);
        let parsed: IpfsPath = path.parse()?;

        let (root, segments) = match *parsed.root() {
            Root::Cid(cid) => (cid, parsed.segments().to_vec()),
            Root::Name(name) => {
                let name_opts = NameResolveOpts {
                    recursive: opts.recursive,
                    local: opts.local,
                    max_depth: opts.max_depth,
                };
                let target =
                    resolve_name(self.records.as_ref(), &name, &name_opts, &interrupt).await?;

                match *target.root() {
                    // still a name: hand it back unresolved, segments intact
                    Root::Name(_) => {
                        return Ok(Resolved::Name {
                            path: target.join(parsed.segments()),
                        })
                    }
                    Root::Cid(cid) => {
                        let mut segments = target.segments().to_vec();
                        segments.extend_from_slice(parsed.segments());
                        (cid, segments)
                    }
                }
            }
        };

        let cid = resolve_links(self.store.as_ref(), &root, &segments, &interrupt).await?;
        tracing::debug!(path, %cid, "path resolved");
        Ok(Resolved::Content { cid })
    }

    /// Resolve a batch of paths, in order, failing on the first error.
    pub async fn resolve_many<I, S>(
        &self,
        paths: I,
        opts: &ResolveOpts,
    ) -> Result<Vec<Resolved>, ResolveError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Vec::new();
        for path in paths {
            out.push(self.resolve(path.as_ref(), opts).await?);
        }
        Ok(out)
    }

    /// Enumerate the links reachable from a path as formatted ref strings.
    ///
    /// The path is fully resolved to its target CID first; the traversal
    /// then streams lazily under `opts`' depth and uniqueness constraints,
    /// with duplicates filtered from this surface.
    pub async fn refs(
        &self,
        path: &str,
        opts: &RefsOpts,
    ) -> Result<BoxStream<'static, Result<String, ResolveError>>, ResolveError> {
        let cid = self.target_cid(path, opts.cancel.clone(), opts.deadline).await?;
        formatted_refs(self.store.clone(), cid, opts)
    }

    /// The raw traversal under a path: every edge, duplicates flagged
    /// rather than filtered.
    pub async fn refs_raw(
        &self,
        path: &str,
        opts: &RefsOpts,
    ) -> Result<BoxStream<'static, Result<RefEntry, ResolveError>>, ResolveError> {
        let cid = self.target_cid(path, opts.cancel.clone(), opts.deadline).await?;
        Ok(traverse_refs(self.store.clone(), cid, opts))
    }

    /// Sequentially resolve a path and classify its terminal node for
    /// HTTP-style consumption.
    pub async fn resolve_sequential(
        &self,
        path: &str,
        opts: &ResolveOpts,
    ) -> Result<GatewayNode, ResolveError> {
        let interrupt = Interrupt::new(opts.cancel.clone(), opts.deadline);
        let parsed: IpfsPath = path.parse()?;

        let (root, segments) = match parsed.root() {
            Root::Cid(cid) => (*cid, parsed.segments().to_vec()),
            Root::Name(name) => {
                let name_opts = NameResolveOpts {
                    recursive: true,
                    local: opts.local,
                    max_depth: opts.max_depth,
                };
                let target =
                    resolve_name(self.records.as_ref(), name, &name_opts, &interrupt).await?;
                let cid = *content_root(&target);
                let mut segments = target.segments().to_vec();
                segments.extend_from_slice(parsed.segments());
                (cid, segments)
            }
        };

        gateway::resolve_sequential(self.store.as_ref(), &root, &segments, &interrupt).await
    }

    // Resolve a path all the way to its target CID, names included.
    async fn target_cid(
        &self,
        path: &str,
        cancel: CancellationToken,
        deadline: Option<Duration>,
    ) -> Result<Cid, ResolveError> {
        let opts = ResolveOpts {
            recursive: true,
            cancel,
            deadline,
            ..Default::default()
        };
        match self.resolve(path, &opts).await? {
            Resolved::Content { cid } => Ok(cid),
            // recursive resolution either lands on content or errors
            Resolved::Name { .. } => unreachable!("recursive resolution returned a name"),
        }
    }
}

// Recursive name resolution only ever returns content roots.
fn content_root(path: &IpfsPath) -> &Cid {
    match path.root() {
        Root::Cid(cid) => cid,
        Root::Name(_) => unreachable!("recursive resolution returned a name"),
    }
}

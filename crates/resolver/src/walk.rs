//! DAG link walking
//!
//! The one primitive everything else builds on: starting from a root CID,
//! follow one named link per path segment until the segments run out.

use common::linked_data::Cid;
use common::store::BlockStore;

use crate::error::ResolveError;
use crate::interrupt::Interrupt;

/// Walk `segments` from `root`, one link per segment, returning the final
/// CID.
///
/// Empty `segments` returns `root` unchanged without touching the store.
/// A segment with no matching link fails with
/// [`ResolveError::LinkNotFound`] naming the node and the missing link; a
/// block the store cannot produce fails with [`ResolveError::NotFound`]
/// tagged with that CID. Read-only, no retries.
pub async fn resolve_links(
    store: &dyn BlockStore,
    root: &Cid,
    segments: &[String],
    interrupt: &Interrupt,
) -> Result<Cid, ResolveError> {
    let mut current = *root;

    for segment in segments {
        let node = interrupt.guard(store.get_node(&current)).await?;

        let link = node.link(segment).ok_or_else(|| ResolveError::LinkNotFound {
            cid: current,
            name: segment.clone(),
        })?;

        tracing::trace!(parent = %current, child = %link.target, name = %segment, "followed link");
        current = link.target;
    }

    Ok(current)
}

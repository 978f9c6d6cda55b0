use common::ipns::RecordError;
use common::linked_data::Cid;
use common::store::BlockStoreError;

use crate::name::RecordSourceError;
use crate::path::InvalidPathError;

/// Everything that can terminate a resolution call.
///
/// Every variant is terminal for the call it occurs in: the engine performs
/// no local recovery and no retries. Callers own retry policy and fallback
/// behavior.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Malformed path string, raised at parse time.
    #[error(transparent)]
    InvalidPath(#[from] InvalidPathError),
    /// The block layer has no data for this CID.
    #[error("could not find object with CID: {0}")]
    NotFound(Cid),
    /// The requested link name is absent under the given node.
    #[error("no link named {name:?} under {cid}")]
    LinkNotFound { cid: Cid, name: String },
    /// No record could be found for this name.
    #[error("record requested was not found for {0}")]
    NoRecord(String),
    /// A fetched record failed validation; carries which name it was for.
    #[error("invalid record for {name}: {source}")]
    Record {
        name: String,
        #[source]
        source: RecordError,
    },
    /// Name resolution exceeded its depth bound.
    #[error("could not resolve name (recursion limit of {0} exceeded)")]
    RecursionLimit(u32),
    /// Index-file search attempted on a leaf node.
    #[error("node {0} is not a directory")]
    NotADirectory(Cid),
    /// The caller's cancellation signal fired.
    #[error("resolution cancelled")]
    Cancelled,
    /// The caller's deadline expired.
    #[error("resolution timed out")]
    Timeout,
    /// `edges` and a custom `format` were both requested for refs.
    #[error("cannot set edges to true and also specify format")]
    EdgesAndFormat,
    /// Block layer failure other than not-found.
    #[error("block store error: {0}")]
    Store(BlockStoreError),
    /// Record source failure other than not-found.
    #[error("record source error: {0}")]
    RecordSource(RecordSourceError),
}

impl From<BlockStoreError> for ResolveError {
    fn from(err: BlockStoreError) -> Self {
        match err {
            BlockStoreError::NotFound(cid) => ResolveError::NotFound(cid),
            other => ResolveError::Store(other),
        }
    }
}

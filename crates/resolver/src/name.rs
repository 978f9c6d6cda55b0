//! Recursive name resolution
//!
//! A name resolves through a signed record to a path, which may itself
//! point at another name. This module fetches records through the
//! [`RecordSource`] collaborator, validates each hop cryptographically, and
//! follows name-to-name indirection inside an explicit depth-bounded loop,
//! so a name that resolves to itself (directly or through a cycle) can
//! never loop forever. Termination is structural: at most `max_depth`
//! fetch/validate rounds, regardless of what the records contain.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use common::crypto::PublicKey;
use common::ipns::{IpnsRecord, RecordError};
use common::linked_data::{BlockEncoded, DagCborCodec};

use crate::error::ResolveError;
use crate::interrupt::Interrupt;
use crate::path::IpfsPath;

/// How many name-to-name hops a recursive resolution will follow.
pub const DEFAULT_MAX_RECURSIVE_DEPTH: u32 = 32;

#[derive(Debug, thiserror::Error)]
pub enum RecordSourceError {
    /// No record is available for the requested name. Distinct from I/O
    /// failure.
    #[error("no record found")]
    NotFound,
    #[error("record source i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("record source error: {0}")]
    Default(#[from] anyhow::Error),
}

/// Retrieval abstraction for name records.
///
/// `local_only` restricts the lookup to whatever datastore the
/// implementation holds locally; otherwise it may consult routing. The
/// engine is retry-agnostic either way: one `get` is one attempt.
#[async_trait]
pub trait RecordSource: Send + Sync + 'static {
    /// Fetch the marshalled record bytes for a name.
    async fn get(&self, name: &PublicKey, local_only: bool) -> Result<Bytes, RecordSourceError>;
}

/// In-memory record source for tests and fixtures.
///
/// Keyed by the hex form of the name; always "local", so `local_only` is
/// irrelevant here.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordSource {
    records: Arc<RwLock<BTreeMap<String, Bytes>>>,
}

impl MemoryRecordSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the record currently published under `name`.
    pub fn publish(&self, name: &PublicKey, record: &IpnsRecord) {
        let bytes = BlockEncoded::<DagCborCodec>::encode(record)
            .expect("record encoding is infallible for valid records");
        self.records
            .write()
            .insert(name.to_hex(), Bytes::from(bytes));
    }
}

#[async_trait]
impl RecordSource for MemoryRecordSource {
    async fn get(&self, name: &PublicKey, _local_only: bool) -> Result<Bytes, RecordSourceError> {
        self.records
            .read()
            .get(&name.to_hex())
            .cloned()
            .ok_or(RecordSourceError::NotFound)
    }
}

/// Options for one name resolution.
///
/// Cancellation and deadline ride on the [`Interrupt`] the caller passes
/// alongside these.
#[derive(Debug, Clone)]
pub struct NameResolveOpts {
    /// Follow name-to-name indirection. Off means exactly one
    /// fetch/validate/classify pass, returning whatever namespace results.
    pub recursive: bool,
    /// Restrict record lookups to the local datastore.
    pub local: bool,
    /// Hop bound for recursive mode; defaults to
    /// [`DEFAULT_MAX_RECURSIVE_DEPTH`].
    pub max_depth: Option<u32>,
}

impl Default for NameResolveOpts {
    fn default() -> Self {
        Self {
            recursive: true,
            local: false,
            max_depth: None,
        }
    }
}

/// Resolve `name` to a path.
///
/// Each round fetches the current record, validates it against the name it
/// was fetched for, and classifies the validated value. A content-addressed
/// value ends resolution immediately, even with depth remaining; a
/// name-addressed value consumes one unit of depth and repeats. Running out
/// of depth while still name-addressed fails with
/// [`ResolveError::RecursionLimit`].
pub async fn resolve_name(
    source: &dyn RecordSource,
    name: &PublicKey,
    opts: &NameResolveOpts,
    interrupt: &Interrupt,
) -> Result<IpfsPath, ResolveError> {
    let limit = opts.max_depth.unwrap_or(DEFAULT_MAX_RECURSIVE_DEPTH);
    let mut depth = if opts.recursive { limit } else { 1 };
    let mut current = *name;

    loop {
        if depth == 0 {
            tracing::warn!(name = %name, limit, "name resolution exhausted its depth");
            return Err(ResolveError::RecursionLimit(limit));
        }
        depth -= 1;

        let bytes = interrupt
            .guard(source.get(&current, opts.local))
            .await
            .map_err(|err| match err {
                ResolveError::RecordSource(RecordSourceError::NotFound) => {
                    ResolveError::NoRecord(current.to_hex())
                }
                other => other,
            })?;

        let record = IpnsRecord::decode(&bytes).map_err(|err| ResolveError::Record {
            name: current.to_hex(),
            source: RecordError::Codec(err),
        })?;
        let value = record
            .validate(&current)
            .map_err(|err| ResolveError::Record {
                name: current.to_hex(),
                source: err,
            })?;

        let path: IpfsPath = value.parse()?;
        tracing::debug!(name = %current, value = %path, "record resolved");

        match path.root_name() {
            // landed on content: done, with depth to spare or not
            None => return Ok(path),
            Some(next) => {
                // a single non-recursive pass returns the name unresolved
                if !opts.recursive {
                    return Ok(path);
                }
                current = *next;
            }
        }
    }
}

impl From<RecordSourceError> for ResolveError {
    fn from(err: RecordSourceError) -> Self {
        ResolveError::RecordSource(err)
    }
}

//! Path and name resolution engine
//!
//! This crate turns human-supplied path strings into concrete, verified
//! CIDs:
//!
//! - **[`path`]**: parsing and normalizing `/ipfs/` and `/ipns/` path strings
//! - **[`walk`]**: descending a Merkle DAG one named link at a time
//! - **[`refs`]**: lazy, depth-bounded enumeration of every link reachable
//!   from a root
//! - **[`name`]**: depth-bounded recursive resolution of mutable names to
//!   immutable targets, with cryptographic record validation per hop
//! - **[`gateway`]**: the sequential path-resolution variant HTTP-facing
//!   consumers use, with directory/index-file detection
//! - **[`Resolver`]**: the umbrella handle combining all of the above
//!
//! # Architecture
//!
//! The engine is sequential per call and holds no state across calls; all
//! I/O happens through two collaborator contracts, the block store and the
//! record source. Every suspension point honors the caller's cancellation
//! token and deadline. Failures are terminal for the call they occur in:
//! the engine never retries a fetch and never silently skips a bad link.

mod error;
mod interrupt;
mod resolve;

pub mod gateway;
pub mod name;
pub mod path;
pub mod refs;
pub mod walk;

pub use error::ResolveError;
pub use interrupt::Interrupt;
pub use resolve::{Resolved, ResolveOpts, Resolver};

pub mod prelude {
    pub use crate::error::ResolveError;
    pub use crate::gateway::GatewayNode;
    pub use crate::name::{MemoryRecordSource, NameResolveOpts, RecordSource};
    pub use crate::path::{IpfsPath, Namespace, Root};
    pub use crate::refs::{RefEntry, RefsOpts};
    pub use crate::resolve::{Resolved, ResolveOpts, Resolver};
}

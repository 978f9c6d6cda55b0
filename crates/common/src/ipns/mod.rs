//! Mutable naming layer records
//!
//! A name is the hex form of an Ed25519 public key. The record published
//! under a name carries a path value, an expiry, and a sequence number, all
//! signed by the name's secret key. Records are fetched by collaborators
//! (datastore or routing); this module only defines the record itself and
//! its cryptographic validation.

mod record;

pub use record::{IpnsRecord, RecordError, Validity};

//! Key types for peer identity and record signing
//!
//! Names in the mutable naming layer are derived from Ed25519 public keys;
//! records published under a name are signed by the matching secret key.

mod keys;

pub use keys::{KeyError, PublicKey, SecretKey, PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE};

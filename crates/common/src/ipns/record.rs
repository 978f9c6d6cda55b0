use chrono::{DateTime, Duration, Utc};
use ed25519_dalek::Signature;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::crypto::{PublicKey, SecretKey};
use crate::linked_data::{BlockEncoded, CodecError, DagCborCodec};

/// Errors raised while validating a name record.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("could not extract a usable public key for the record")]
    PublicKeyExtraction,
    #[error("record signature did not verify")]
    InvalidRecord,
    #[error("record expired at {0}")]
    ExpiredRecord(DateTime<Utc>),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

/// When a record stops being acceptable.
///
/// One variant today; a variant enum so other validity conditions can be
/// added without a wire break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Validity {
    /// End-of-life: the record is valid strictly before this instant.
    Eol(DateTime<Utc>),
}

/// A signed record in the mutable naming layer.
///
/// Each fetched instance is immutable; newer records (higher `sequence`)
/// supersede older ones for the same name over time. Marshalled as DAG-CBOR.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpnsRecord {
    /// The path string this name currently resolves to.
    value: String,
    /// Expiry condition.
    validity: Validity,
    /// Monotonic publish counter.
    sequence: u64,
    /// Ed25519 signature over the canonical payload.
    #[serde_as(as = "serde_with::Bytes")]
    signature: Vec<u8>,
    /// Optional embedded copy of the signing public key.
    ///
    /// A hint only: when present it must match the name the record is
    /// validated against.
    #[serde_as(as = "Option<serde_with::Bytes>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    public_key: Option<Vec<u8>>,
}

impl BlockEncoded<DagCborCodec> for IpnsRecord {}

impl IpnsRecord {
    /// Create and sign a record.
    ///
    /// # Arguments
    /// * `key` - Secret key of the name the record is published under
    /// * `value` - Path string the name should resolve to
    /// * `lifetime` - How long from now the record stays valid
    /// * `sequence` - Publish counter, higher supersedes lower
    /// * `embed_key` - Whether to carry a copy of the public key in the record
    pub fn sign(
        key: &SecretKey,
        value: impl Into<String>,
        lifetime: Duration,
        sequence: u64,
        embed_key: bool,
    ) -> Self {
        let value = value.into();
        let validity = Validity::Eol(Utc::now() + lifetime);
        let signature = key
            .sign(&signable(&value, &validity, sequence))
            .to_bytes()
            .to_vec();

        Self {
            value,
            validity,
            sequence,
            signature,
            public_key: embed_key.then(|| key.public().to_bytes().to_vec()),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn validity(&self) -> &Validity {
        &self.validity
    }

    /// Derive the key to validate against: the embedded hint when present,
    /// the name's own key otherwise.
    ///
    /// An embedded key that does not parse, or that names a different key
    /// than the record claims to belong to, yields no usable key.
    pub fn extract_public_key(&self, name: &PublicKey) -> Result<PublicKey, RecordError> {
        match &self.public_key {
            None => Ok(*name),
            Some(bytes) => {
                let embedded = PublicKey::try_from(bytes.as_slice())
                    .map_err(|_| RecordError::PublicKeyExtraction)?;
                if embedded != *name {
                    return Err(RecordError::PublicKeyExtraction);
                }
                Ok(embedded)
            }
        }
    }

    /// Validate this record against the name it was fetched for.
    ///
    /// Three checks, in order: public key extraction, signature
    /// verification over the canonical payload, expiry. Pure verification:
    /// no I/O, the record is never mutated. Returns the validated path
    /// value on success.
    pub fn validate(&self, name: &PublicKey) -> Result<&str, RecordError> {
        self.validate_at(name, Utc::now())
    }

    /// [`validate`](Self::validate) against an explicit clock.
    pub fn validate_at(&self, name: &PublicKey, now: DateTime<Utc>) -> Result<&str, RecordError> {
        let key = self.extract_public_key(name)?;

        let signature =
            Signature::from_slice(&self.signature).map_err(|_| RecordError::InvalidRecord)?;
        key.verify(
            &signable(&self.value, &self.validity, self.sequence),
            &signature,
        )
        .map_err(|_| RecordError::InvalidRecord)?;

        match self.validity {
            Validity::Eol(eol) => {
                if now >= eol {
                    return Err(RecordError::ExpiredRecord(eol));
                }
            }
        }

        tracing::trace!(sequence = self.sequence, "record validated");
        Ok(&self.value)
    }

    #[cfg(test)]
    pub(crate) fn corrupt_signature(&mut self) {
        self.signature[0] ^= 0xff;
    }
}

// Canonical signed payload: value bytes, RFC 3339 expiry, big-endian
//  sequence, concatenated in that order.
fn signable(value: &str, validity: &Validity, sequence: u64) -> Vec<u8> {
    let Validity::Eol(eol) = validity;
    let mut payload = Vec::with_capacity(value.len() + 40);
    payload.extend_from_slice(value.as_bytes());
    payload.extend_from_slice(eol.to_rfc3339().as_bytes());
    payload.extend_from_slice(&sequence.to_be_bytes());
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_key(seed: u8) -> SecretKey {
        let mut bytes = [0u8; 32];
        bytes[0] = seed;
        SecretKey::from(bytes)
    }

    #[test]
    fn test_sign_and_validate() {
        let key = make_key(1);
        let record = IpnsRecord::sign(&key, "/ipfs/bafy", Duration::hours(24), 0, false);

        let value = record.validate(&key.public()).unwrap();
        assert_eq!(value, "/ipfs/bafy");
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let key = make_key(1);
        let mut record = IpnsRecord::sign(&key, "/ipfs/bafy", Duration::hours(24), 0, false);
        record.corrupt_signature();

        let err = record.validate(&key.public()).unwrap_err();
        assert!(matches!(err, RecordError::InvalidRecord));
    }

    #[test]
    fn test_tampered_value_rejected() {
        let key = make_key(1);
        let mut record = IpnsRecord::sign(&key, "/ipfs/bafy", Duration::hours(24), 0, false);
        record.value = "/ipfs/somewhere-else".to_string();

        let err = record.validate(&key.public()).unwrap_err();
        assert!(matches!(err, RecordError::InvalidRecord));
    }

    #[test]
    fn test_expired_record_rejected() {
        let key = make_key(1);
        let record = IpnsRecord::sign(&key, "/ipfs/bafy", Duration::hours(1), 0, false);

        let later = Utc::now() + Duration::hours(2);
        let err = record.validate_at(&key.public(), later).unwrap_err();
        assert!(matches!(err, RecordError::ExpiredRecord(_)));

        // expiry is checked only after the signature: a tampered expired
        // record still reports the signature failure first
        let mut tampered = record.clone();
        tampered.corrupt_signature();
        let err = tampered.validate_at(&key.public(), later).unwrap_err();
        assert!(matches!(err, RecordError::InvalidRecord));
    }

    #[test]
    fn test_embedded_key_must_match_name() {
        let key = make_key(1);
        let other = make_key(2);

        let record = IpnsRecord::sign(&key, "/ipfs/bafy", Duration::hours(24), 0, true);
        assert!(record.validate(&key.public()).is_ok());

        // same record, claimed for a different name
        let err = record.validate(&other.public()).unwrap_err();
        assert!(matches!(err, RecordError::PublicKeyExtraction));
    }

    #[test]
    fn test_wrong_key_without_hint_is_signature_failure() {
        let key = make_key(1);
        let other = make_key(2);

        // no embedded hint: the wrong name yields a usable (but wrong) key,
        // so the failure surfaces at signature verification
        let record = IpnsRecord::sign(&key, "/ipfs/bafy", Duration::hours(24), 0, false);
        let err = record.validate(&other.public()).unwrap_err();
        assert!(matches!(err, RecordError::InvalidRecord));
    }

    #[test]
    fn test_marshal_round_trip() {
        let key = make_key(3);
        let record = IpnsRecord::sign(&key, "/ipfs/bafy/a/b", Duration::hours(24), 7, true);

        let bytes = record.encode().unwrap();
        let back = IpnsRecord::decode(&bytes).unwrap();

        assert_eq!(record, back);
        // signatures stay valid across a marshal round trip
        assert!(back.validate(&key.public()).is_ok());
    }
}

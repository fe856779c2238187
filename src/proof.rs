//! Proof wire format and standalone validation.
//!
//! A proof reveals one leaf (property, value, salt — or a pre-computed hash
//! for hashed fields) plus the sibling hashes needed to recompute the root:
//! `hashes` with explicit left/right sides in positional mode, or the flat
//! `sorted_hashes` list in hash-sorted mode. The object round-trips through
//! JSON (bytes as base64) and through a pinned, versioned bincode form.

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TreeError};
use crate::hash::{hash_pair, hash_sorted_pair, HashFunction};
use crate::leaf::hash_leaf;
use crate::salt::validate_salt;

/// Base64 helpers for byte fields in human-readable formats; binary formats
/// keep native byte sequences.
pub(crate) mod b64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub mod bytes {
        use super::*;

        pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&STANDARD.encode(value))
            } else {
                value.serialize(serializer)
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<u8>, D::Error> {
            if deserializer.is_human_readable() {
                let encoded = String::deserialize(deserializer)?;
                STANDARD.decode(encoded).map_err(D::Error::custom)
            } else {
                Vec::<u8>::deserialize(deserializer)
            }
        }
    }

    pub mod opt {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<Vec<u8>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                value
                    .as_ref()
                    .map(|v| STANDARD.encode(v))
                    .serialize(serializer)
            } else {
                value.serialize(serializer)
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Vec<u8>>, D::Error> {
            if deserializer.is_human_readable() {
                let encoded = Option::<String>::deserialize(deserializer)?;
                encoded
                    .map(|v| STANDARD.decode(v).map_err(D::Error::custom))
                    .transpose()
            } else {
                Option::<Vec<u8>>::deserialize(deserializer)
            }
        }
    }

    pub mod list {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &[Vec<u8>],
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                value
                    .iter()
                    .map(|v| STANDARD.encode(v))
                    .collect::<Vec<_>>()
                    .serialize(serializer)
            } else {
                value.serialize(serializer)
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<Vec<u8>>, D::Error> {
            if deserializer.is_human_readable() {
                let encoded = Vec::<String>::deserialize(deserializer)?;
                encoded
                    .into_iter()
                    .map(|v| STANDARD.decode(v).map_err(D::Error::custom))
                    .collect()
            } else {
                Vec::<Vec<u8>>::deserialize(deserializer)
            }
        }
    }
}

/// Proof key: the leaf's identity in readable or compact form, matching the
/// naming mode the tree was built with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyRef {
    Readable(String),
    Compact(#[serde(with = "b64::bytes")] Vec<u8>),
}

impl PropertyRef {
    /// The bytes fed into the leaf hash as the property name.
    pub fn name_bytes(&self) -> &[u8] {
        match self {
            PropertyRef::Readable(name) => name.as_bytes(),
            PropertyRef::Compact(bytes) => bytes,
        }
    }
}

impl std::fmt::Display for PropertyRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyRef::Readable(name) => f.write_str(name),
            PropertyRef::Compact(bytes) => write!(f, "0x{}", hex::encode(bytes)),
        }
    }
}

/// One positional sibling; exactly one side is present.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SiblingHash {
    #[serde(default, with = "b64::opt")]
    pub left: Option<Vec<u8>>,
    #[serde(default, with = "b64::opt")]
    pub right: Option<Vec<u8>>,
}

impl SiblingHash {
    pub fn left(hash: Vec<u8>) -> Self {
        Self {
            left: Some(hash),
            right: None,
        }
    }

    pub fn right(hash: Vec<u8>) -> Self {
        Self {
            left: None,
            right: Some(hash),
        }
    }
}

/// A compact inclusion proof for one leaf field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Identity of the proven leaf.
    pub property: PropertyRef,
    /// Field value bytes; empty for pre-hashed leaves.
    #[serde(default, with = "b64::bytes")]
    pub value: Vec<u8>,
    /// Leaf salt; empty for unsalted and pre-hashed leaves.
    #[serde(default, with = "b64::bytes")]
    pub salt: Vec<u8>,
    /// Pre-computed leaf hash; set only when the leaf was a hashed field.
    #[serde(default, with = "b64::bytes")]
    pub hash: Vec<u8>,
    /// Positional sibling path, leaf to root.
    #[serde(default)]
    pub hashes: Vec<SiblingHash>,
    /// Hash-sorted sibling path, leaf to root.
    #[serde(default, with = "b64::list")]
    pub sorted_hashes: Vec<Vec<u8>>,
}

/// Pinned binary framing for proofs.
mod proof_format {
    /// Magic bytes identifying the precise-proofs wire format
    pub const MAGIC: &[u8] = b"PPRF";

    /// Current format version for forward compatibility
    pub const VERSION: u16 = 1;

    /// Header size in bytes: magic(4) + version(2) + length(4)
    pub const HEADER_SIZE: usize = 10;
}

fn bincode_options() -> impl bincode::Options {
    // Pinned so the wire format stays stable even if bincode's defaults
    // change in the future.
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

impl Proof {
    /// Serialize this proof to bytes for transport.
    ///
    /// The format is a magic number, a version, a length and the pinned
    /// bincode encoding of the proof.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut result = Vec::new();
        result.extend_from_slice(proof_format::MAGIC);
        result.extend_from_slice(&proof_format::VERSION.to_le_bytes());

        let proof_bytes = bincode_options().serialize(self).map_err(|e| {
            TreeError::Serialization(format!("failed to serialize proof: {}", e))
        })?;

        let length = proof_bytes.len() as u32;
        result.extend_from_slice(&length.to_le_bytes());
        result.extend_from_slice(&proof_bytes);
        Ok(result)
    }

    /// Deserialize a proof produced by [`Proof::to_bytes`], validating the
    /// magic number and version first.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < proof_format::HEADER_SIZE {
            return Err(TreeError::Serialization(
                "proof bytes too short for header".to_owned(),
            ));
        }
        if &bytes[0..4] != proof_format::MAGIC {
            return Err(TreeError::Serialization("bad proof magic".to_owned()));
        }
        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != proof_format::VERSION {
            return Err(TreeError::Serialization(format!(
                "unsupported proof version {}",
                version
            )));
        }
        let length = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]) as usize;
        let payload = &bytes[proof_format::HEADER_SIZE..];
        if payload.len() != length {
            return Err(TreeError::Serialization(format!(
                "proof length mismatch: header says {}, payload is {}",
                length,
                payload.len()
            )));
        }
        bincode_options()
            .deserialize(payload)
            .map_err(|e| TreeError::Serialization(format!("failed to deserialize proof: {}", e)))
    }
}

/// The starting hash of a proof's climb: the declared hash for pre-hashed
/// leaves, otherwise `H_leaf(name ‖ value ‖ salt)`.
pub(crate) fn proof_leaf_hash(proof: &Proof, leaf_hash: &dyn HashFunction) -> Result<Vec<u8>> {
    if !proof.hash.is_empty() {
        return Ok(proof.hash.clone());
    }
    validate_salt(&proof.salt)?;
    Ok(hash_leaf(
        leaf_hash,
        proof.property.name_bytes(),
        &proof.value,
        &proof.salt,
    ))
}

/// Validates a proof against a known root, without needing the tree.
///
/// Returns `Ok(true)` when climbing the sibling path from the leaf hash
/// reproduces `root`.
///
/// # Errors
///
/// Fails on malformed proofs: both sibling forms populated, a positional
/// entry without exactly one side, or an invalid salt length.
pub fn validate_proof_against_root(
    proof: &Proof,
    root: &[u8],
    leaf_hash: &dyn HashFunction,
    inner_hash: &dyn HashFunction,
) -> Result<bool> {
    if !proof.hashes.is_empty() && !proof.sorted_hashes.is_empty() {
        return Err(TreeError::Validation(
            "proof carries both positional and sorted sibling lists".to_owned(),
        ));
    }
    let mut current = proof_leaf_hash(proof, leaf_hash)?;
    for sibling in &proof.hashes {
        current = match (&sibling.left, &sibling.right) {
            (Some(left), None) => hash_pair(inner_hash, left, &current),
            (None, Some(right)) => hash_pair(inner_hash, &current, right),
            _ => {
                return Err(TreeError::Validation(
                    "positional sibling entry must have exactly one side".to_owned(),
                ))
            }
        };
    }
    for sibling in &proof.sorted_hashes {
        current = hash_sorted_pair(inner_hash, &current, sibling);
    }
    Ok(current == root)
}

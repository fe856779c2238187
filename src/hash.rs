//! Hash adapter for the precise-proofs library.
//!
//! Every hash the tree touches goes through the [`HashFunction`] trait: a
//! uniform byte-in/byte-out wrapper over a caller-chosen cryptographic hash.
//! Leaf hashing and inner-node hashing may use two different functions
//! (see `TreeOptions::leaf_hash`), so all combining helpers here take the
//! function as an argument instead of fixing one.

use sha2::Digest;

/// A byte-in/byte-out cryptographic hash function.
///
/// Implementations must be deterministic; digest length may vary between
/// implementations but must be constant for any one implementation.
pub trait HashFunction: Send + Sync {
    /// Hash `data` and return the digest.
    fn digest(&self, data: &[u8]) -> Vec<u8>;

    /// Digest length in bytes.
    fn output_len(&self) -> usize;
}

/// SHA-256 adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256;

impl HashFunction for Sha256 {
    fn digest(&self, data: &[u8]) -> Vec<u8> {
        sha2::Sha256::digest(data).to_vec()
    }

    fn output_len(&self) -> usize {
        32
    }
}

/// SHA-512 adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha512;

impl HashFunction for Sha512 {
    fn digest(&self, data: &[u8]) -> Vec<u8> {
        sha2::Sha512::digest(data).to_vec()
    }

    fn output_len(&self) -> usize {
        64
    }
}

/// Hashes an inner node from its two children in positional order.
pub fn hash_pair(hash: &dyn HashFunction, left: &[u8], right: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(left.len() + right.len());
    payload.extend_from_slice(left);
    payload.extend_from_slice(right);
    hash.digest(&payload)
}

/// Hashes an inner node from its two children with the smaller hash first.
///
/// This loses left/right identity but lets proofs omit side indicators.
pub fn hash_sorted_pair(hash: &dyn HashFunction, a: &[u8], b: &[u8]) -> Vec<u8> {
    if a <= b {
        hash_pair(hash, a, b)
    } else {
        hash_pair(hash, b, a)
    }
}

//! Leaf nodes and canonical leaf hashing.
//!
//! A non-hashed leaf hashes the byte concatenation `name ‖ value ‖ salt`
//! under the leaf-hash function, where `name` is the readable or compact
//! property per the tree's options. A hashed leaf (a `hashed_field`) carries
//! its hash verbatim and has semantically empty value and salt.

use crate::error::Result;
use crate::hash::HashFunction;
use crate::property::Property;
use crate::salt::validate_salt;

/// One flattened field of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafNode {
    /// The leaf's addressable identity.
    pub property: Property,
    /// Canonical byte encoding of the field value; empty for hashed leaves.
    pub value: Vec<u8>,
    /// 32-byte salt, or empty for unsalted and hashed leaves.
    pub salt: Vec<u8>,
    /// The leaf hash. Computed on demand for regular leaves; authoritative
    /// from the start for hashed leaves.
    pub hash: Vec<u8>,
    /// True when `hash` was supplied by the document rather than computed.
    pub hashed: bool,
}

impl LeafNode {
    /// A regular leaf whose hash is computed later from name, value and salt.
    pub fn new(property: Property, value: Vec<u8>, salt: Vec<u8>) -> Self {
        Self {
            property,
            value,
            salt,
            hash: Vec::new(),
            hashed: false,
        }
    }

    /// A pre-hashed leaf; the given hash is used verbatim.
    pub fn from_hash(property: Property, hash: Vec<u8>) -> Self {
        Self {
            property,
            value: Vec::new(),
            salt: Vec::new(),
            hash,
            hashed: true,
        }
    }

    /// The padding leaf used to fill fixed-depth trees: the hash of the
    /// empty byte string under the leaf-hash function.
    pub fn padding(leaf_hash: &dyn HashFunction) -> Self {
        Self::from_hash(Property::empty(), leaf_hash.digest(&[]))
    }

    /// Computes and stores this leaf's hash if it is not already set.
    ///
    /// # Errors
    ///
    /// Fails when the salt is neither empty nor exactly 32 bytes.
    pub fn ensure_hash(&mut self, leaf_hash: &dyn HashFunction, compact_mode: bool) -> Result<()> {
        if self.hashed || !self.hash.is_empty() {
            return Ok(());
        }
        validate_salt(&self.salt)?;
        self.hash = hash_leaf(
            leaf_hash,
            self.property.name_bytes(compact_mode),
            &self.value,
            &self.salt,
        );
        Ok(())
    }
}

/// Hashes the canonical leaf payload `name ‖ value ‖ salt`.
pub fn hash_leaf(
    leaf_hash: &dyn HashFunction,
    name: &[u8],
    value: &[u8],
    salt: &[u8],
) -> Vec<u8> {
    let mut payload = Vec::with_capacity(name.len() + value.len() + salt.len());
    payload.extend_from_slice(name);
    payload.extend_from_slice(value);
    payload.extend_from_slice(salt);
    leaf_hash.digest(&payload)
}

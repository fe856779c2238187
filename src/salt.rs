//! Salt management.
//!
//! Every non-hashed leaf carries a 32-byte salt so leaf hashes cannot be
//! inverted by dictionary search. Salts are looked up by the leaf's compact
//! name, which is stable across traversals; the generating provider memoizes
//! what it hands out so re-flattening the same document yields the same
//! leaves.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::error::{Result, TreeError};

/// Exact length of a leaf salt in bytes.
pub const SALT_LENGTH: usize = 32;

/// Checks that a salt slice is empty or exactly [`SALT_LENGTH`] bytes.
pub fn validate_salt(salt: &[u8]) -> Result<()> {
    if salt.is_empty() || salt.len() == SALT_LENGTH {
        Ok(())
    } else {
        Err(TreeError::InvalidSaltLength { length: salt.len() })
    }
}

/// Generates fresh salts on demand and memoizes them per compact name.
pub struct GeneratedSalts {
    rng: StdRng,
    issued: HashMap<Vec<u8>, [u8; SALT_LENGTH]>,
}

impl GeneratedSalts {
    /// Seeds the generator from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Uses the caller's RNG; lets tests pin the salt stream.
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            issued: HashMap::new(),
        }
    }

    fn salt_for(&mut self, compact_name: &[u8]) -> [u8; SALT_LENGTH] {
        if let Some(salt) = self.issued.get(compact_name) {
            return *salt;
        }
        let mut salt = [0u8; SALT_LENGTH];
        self.rng.fill_bytes(&mut salt);
        self.issued.insert(compact_name.to_vec(), salt);
        salt
    }
}

impl Default for GeneratedSalts {
    fn default() -> Self {
        Self::new()
    }
}

/// Source of per-leaf salts, keyed by compact property name.
pub enum SaltProvider {
    /// Generate on first request and memoize (the default).
    Generate(GeneratedSalts),
    /// Caller-supplied mapping; a missing entry is an error.
    Mapping(HashMap<Vec<u8>, [u8; SALT_LENGTH]>),
    /// Caller-supplied callable.
    Callback(Box<dyn FnMut(&[u8]) -> Result<[u8; SALT_LENGTH]> + Send>),
}

impl SaltProvider {
    /// The salt for the given compact name.
    pub fn salt_for(&mut self, compact_name: &[u8]) -> Result<[u8; SALT_LENGTH]> {
        match self {
            SaltProvider::Generate(gen) => Ok(gen.salt_for(compact_name)),
            SaltProvider::Mapping(map) => map.get(compact_name).copied().ok_or_else(|| {
                TreeError::Config(format!(
                    "no salt supplied for property 0x{}",
                    hex::encode(compact_name)
                ))
            }),
            SaltProvider::Callback(call) => call(compact_name),
        }
    }
}

impl Default for SaltProvider {
    fn default() -> Self {
        SaltProvider::Generate(GeneratedSalts::new())
    }
}

impl std::fmt::Debug for SaltProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaltProvider::Generate(gen) => f
                .debug_struct("Generate")
                .field("issued", &gen.issued.len())
                .finish(),
            SaltProvider::Mapping(map) => {
                f.debug_struct("Mapping").field("entries", &map.len()).finish()
            }
            SaltProvider::Callback(_) => f.debug_struct("Callback").finish_non_exhaustive(),
        }
    }
}

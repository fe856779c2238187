//! Multi-proof optimization for hash-sorted trees.
//!
//! Proofs sharing a root overlap: a sibling declared by one proof is often
//! an intermediate hash another proof computes on its own way up. The
//! optimizer drops such siblings to a fixed point; the trimmed bundle
//! validates as a whole, each proof borrowing the missing partners from the
//! combine steps of the others.

use std::collections::HashSet;

use tracing::{debug, debug_span};

use crate::error::{Result, TreeError};
use crate::hash::{hash_sorted_pair, HashFunction};
use crate::proof::{proof_leaf_hash, Proof};

/// Climb steps are bounded to keep malformed bundles from looping; far above
/// any real tree height.
const MAX_CLIMB_STEPS: usize = 256;

fn sorted_tuple(a: Vec<u8>, b: Vec<u8>) -> (Vec<u8>, Vec<u8>) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Attempts to climb one proof to `root`.
///
/// At each step the partner hash is taken from the already-recorded combine
/// pairs when one matches the current hash (a level another proof supplied),
/// falling back to the proof's own sibling list. Returns the combine pairs
/// of the successful climb, or `None` when the climb stalls and should be
/// retried after other proofs have contributed their pairs.
fn try_climb(
    proof: &Proof,
    root: &[u8],
    pairs: &[(Vec<u8>, Vec<u8>)],
    leaf_hash: &dyn HashFunction,
    inner_hash: &dyn HashFunction,
) -> Result<Option<Vec<(Vec<u8>, Vec<u8>)>>> {
    let mut current = proof_leaf_hash(proof, leaf_hash)?;
    let mut cursor = 0;
    let mut local: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();
    let mut steps = 0;

    loop {
        if current == root {
            // Leftover siblings mean the proof was built for another tree.
            return Ok((cursor == proof.sorted_hashes.len()).then_some(local));
        }
        steps += 1;
        if steps > MAX_CLIMB_STEPS {
            return Ok(None);
        }

        let pooled = pairs
            .iter()
            .chain(local.iter())
            .find(|(a, b)| *a == current || *b == current)
            .map(|(a, b)| if *a == current { b.clone() } else { a.clone() });

        let partner = match pooled {
            Some(partner) => {
                // Keep the cursor in sync when the proof still carries this
                // sibling itself.
                if proof.sorted_hashes.get(cursor) == Some(&partner) {
                    cursor += 1;
                }
                partner
            }
            None => match proof.sorted_hashes.get(cursor) {
                Some(sibling) => {
                    cursor += 1;
                    sibling.clone()
                }
                None => return Ok(None),
            },
        };

        let combined = hash_sorted_pair(inner_hash, &current, &partner);
        local.push(sorted_tuple(current, partner));
        current = combined;
    }
}

/// Validates a bundle of hash-sorted proofs against a shared root.
///
/// Proofs may have been trimmed by [`optimize_sorted_proofs`]; each climb
/// may use the combine pairs of proofs already validated this round, so the
/// bundle is processed to a fixed point.
pub fn validate_sorted_proofs(
    proofs: &[Proof],
    root: &[u8],
    leaf_hash: &dyn HashFunction,
    inner_hash: &dyn HashFunction,
) -> Result<bool> {
    if proofs.is_empty() {
        return Err(TreeError::Validation("empty proof bundle".to_owned()));
    }
    for proof in proofs {
        if !proof.hashes.is_empty() {
            return Err(TreeError::Validation(
                "bundle validation requires hash-sorted proofs".to_owned(),
            ));
        }
    }

    let mut pairs: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();
    let mut validated = vec![false; proofs.len()];
    loop {
        let mut progress = false;
        for (index, proof) in proofs.iter().enumerate() {
            if validated[index] {
                continue;
            }
            if let Some(local) = try_climb(proof, root, &pairs, leaf_hash, inner_hash)? {
                pairs.extend(local);
                validated[index] = true;
                progress = true;
            }
        }
        if !progress {
            break;
        }
    }
    Ok(validated.into_iter().all(|v| v))
}

/// The intermediate hashes (leaf hash plus every combine result) a full
/// proof produces while validating on its own.
fn intermediates(
    proof: &Proof,
    leaf_hash: &dyn HashFunction,
    inner_hash: &dyn HashFunction,
) -> Result<Vec<Vec<u8>>> {
    let mut current = proof_leaf_hash(proof, leaf_hash)?;
    let mut chain = vec![current.clone()];
    for sibling in &proof.sorted_hashes {
        current = hash_sorted_pair(inner_hash, &current, sibling);
        chain.push(current.clone());
    }
    Ok(chain)
}

/// Trims a bundle of hash-sorted proofs sharing `root`.
///
/// A sibling is dropped when it is an intermediate of another proof's climb
/// and the bundle still validates without it, iterated to a fixed point.
/// The input proofs must each validate standalone.
pub fn optimize_sorted_proofs(
    proofs: &[Proof],
    root: &[u8],
    leaf_hash: &dyn HashFunction,
    inner_hash: &dyn HashFunction,
) -> Result<Vec<Proof>> {
    let _span = debug_span!("optimize_sorted_proofs", proofs = proofs.len()).entered();

    for proof in proofs {
        if !crate::proof::validate_proof_against_root(proof, root, leaf_hash, inner_hash)? {
            return Err(TreeError::Validation(format!(
                "proof for {} does not reach the bundle root",
                proof.property
            )));
        }
    }

    // Removal candidates come from the untrimmed climbs; removals never add
    // intermediates, so this set stays valid across iterations.
    let mut shared: Vec<HashSet<Vec<u8>>> = Vec::with_capacity(proofs.len());
    for proof in proofs {
        shared.push(intermediates(proof, leaf_hash, inner_hash)?.into_iter().collect());
    }

    let mut optimized: Vec<Proof> = proofs.to_vec();
    let mut dropped = 0usize;
    loop {
        let mut changed = false;
        for index in 0..optimized.len() {
            let mut position = 0;
            while position < optimized[index].sorted_hashes.len() {
                let candidate = &optimized[index].sorted_hashes[position];
                let provided_elsewhere = shared
                    .iter()
                    .enumerate()
                    .any(|(other, set)| other != index && set.contains(candidate));
                if provided_elsewhere {
                    let mut trial = optimized.clone();
                    trial[index].sorted_hashes.remove(position);
                    if validate_sorted_proofs(&trial, root, leaf_hash, inner_hash)? {
                        optimized = trial;
                        dropped += 1;
                        changed = true;
                        continue;
                    }
                }
                position += 1;
            }
        }
        if !changed {
            break;
        }
    }
    debug!(dropped, "bundle trimmed");
    Ok(optimized)
}

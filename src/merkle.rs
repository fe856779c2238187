//! Binary Merkle tree over leaf hashes.
//!
//! Nodes live in one flat array filled level by level, leaves first, so a
//! node's sibling at any level is reachable arithmetically. Two construction
//! modes exist: positional (`H(left ‖ right)`, keeping left/right identity)
//! and hash-sorted (`H(min ‖ max)`, yielding proofs without side
//! indicators). When a level has an odd number of nodes, the trailing
//! singleton is carried up unchanged rather than paired with itself.

use crate::error::{Result, TreeError};
use crate::hash::{hash_pair, hash_sorted_pair, HashFunction};

/// One step of a sibling path, from leaf level towards the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    /// True when the sibling sits to the left of the climbing node.
    pub is_left: bool,
    /// Index of the sibling in the flat node array.
    pub node_index: usize,
}

/// Built Merkle tree: all levels concatenated, root last.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    nodes: Vec<Vec<u8>>,
    leaf_count: usize,
}

impl MerkleTree {
    /// Builds the tree bottom-up from pre-computed leaf hashes.
    pub fn build(
        leaf_hashes: Vec<Vec<u8>>,
        inner_hash: &dyn HashFunction,
        hash_sorted: bool,
    ) -> Result<Self> {
        if leaf_hashes.is_empty() {
            return Err(TreeError::TreeState(
                "cannot build a Merkle tree without leaves".to_owned(),
            ));
        }
        let leaf_count = leaf_hashes.len();
        let mut nodes = leaf_hashes;
        let mut level_start = 0;
        let mut level_size = leaf_count;
        while level_size > 1 {
            let mut index = 0;
            while index < level_size {
                if index + 1 < level_size {
                    let left = &nodes[level_start + index];
                    let right = &nodes[level_start + index + 1];
                    let combined = if hash_sorted {
                        hash_sorted_pair(inner_hash, left, right)
                    } else {
                        hash_pair(inner_hash, left, right)
                    };
                    nodes.push(combined);
                } else {
                    // Odd level: carry the trailing singleton up unchanged.
                    nodes.push(nodes[level_start + index].clone());
                }
                index += 2;
            }
            level_start += level_size;
            level_size = level_size / 2 + level_size % 2;
        }
        Ok(Self { nodes, leaf_count })
    }

    /// The root hash.
    pub fn root(&self) -> &[u8] {
        // build() guarantees at least one node
        self.nodes.last().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of leaves at the bottom level.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Hash of the node at `index` in the flat array.
    pub fn node(&self, index: usize) -> &[u8] {
        &self.nodes[index]
    }

    /// The sibling path for the leaf at `leaf_index`, ordered leaf to root.
    ///
    /// Levels where the leaf's ancestor is a carried singleton contribute no
    /// step. The returned indices point into the flat node array.
    pub fn sibling_path(&self, leaf_index: usize) -> Result<Vec<PathStep>> {
        if leaf_index >= self.leaf_count {
            return Err(TreeError::LeafNotFound {
                property: format!("leaf index {} of {}", leaf_index, self.leaf_count),
            });
        }
        let mut path = Vec::new();
        let mut index = leaf_index;
        let mut offset = 0;
        let mut level_size = self.leaf_count;
        while level_size > 1 {
            let last = level_size - 1;
            if index == last && level_size % 2 == 1 {
                // carried singleton, no sibling at this level
            } else if index % 2 == 0 {
                path.push(PathStep {
                    is_left: false,
                    node_index: offset + index + 1,
                });
            } else {
                path.push(PathStep {
                    is_left: true,
                    node_index: offset + index - 1,
                });
            }
            offset += level_size;
            index /= 2;
            level_size = level_size / 2 + level_size % 2;
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Sha256;

    fn leaves(n: usize) -> Vec<Vec<u8>> {
        (0..n).map(|i| Sha256.digest(&[i as u8])).collect()
    }

    #[test]
    fn four_leaves_build_the_expected_levels() {
        let hashes = leaves(4);
        let tree = MerkleTree::build(hashes.clone(), &Sha256, false).unwrap();

        let n01 = hash_pair(&Sha256, &hashes[0], &hashes[1]);
        let n23 = hash_pair(&Sha256, &hashes[2], &hashes[3]);
        let root = hash_pair(&Sha256, &n01, &n23);
        assert_eq!(tree.node(4), n01.as_slice());
        assert_eq!(tree.node(5), n23.as_slice());
        assert_eq!(tree.root(), root.as_slice());
    }

    #[test]
    fn odd_level_carries_trailing_singleton() {
        let hashes = leaves(3);
        let tree = MerkleTree::build(hashes.clone(), &Sha256, false).unwrap();

        let n01 = hash_pair(&Sha256, &hashes[0], &hashes[1]);
        // leaf 2 is carried, not self-paired
        assert_eq!(tree.node(4), hashes[2].as_slice());
        let root = hash_pair(&Sha256, &n01, &hashes[2]);
        assert_eq!(tree.root(), root.as_slice());

        // the carried leaf's path skips its own level
        let path = tree.sibling_path(2).unwrap();
        assert_eq!(path.len(), 1);
        assert!(path[0].is_left);
        assert_eq!(tree.node(path[0].node_index), n01.as_slice());
    }

    #[test]
    fn single_leaf_has_empty_path_and_is_its_own_root() {
        let hashes = leaves(1);
        let tree = MerkleTree::build(hashes.clone(), &Sha256, false).unwrap();
        assert_eq!(tree.root(), hashes[0].as_slice());
        assert!(tree.sibling_path(0).unwrap().is_empty());
    }

    #[test]
    fn sibling_path_rebuilds_the_root() {
        for n in [2usize, 5, 8, 11, 16] {
            let hashes = leaves(n);
            let tree = MerkleTree::build(hashes.clone(), &Sha256, false).unwrap();
            for leaf in 0..n {
                let mut current = hashes[leaf].clone();
                for step in tree.sibling_path(leaf).unwrap() {
                    let sibling = tree.node(step.node_index);
                    current = if step.is_left {
                        hash_pair(&Sha256, sibling, &current)
                    } else {
                        hash_pair(&Sha256, &current, sibling)
                    };
                }
                assert_eq!(
                    current.as_slice(),
                    tree.root(),
                    "leaf {} of {} must climb to the root",
                    leaf,
                    n
                );
            }
        }
    }

    #[test]
    fn hash_sorted_mode_rebuilds_without_side_information() {
        let hashes = leaves(11);
        let tree = MerkleTree::build(hashes.clone(), &Sha256, true).unwrap();
        for leaf in 0..hashes.len() {
            let mut current = hashes[leaf].clone();
            for step in tree.sibling_path(leaf).unwrap() {
                current = hash_sorted_pair(&Sha256, &current, tree.node(step.node_index));
            }
            assert_eq!(current.as_slice(), tree.root());
        }
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(MerkleTree::build(Vec::new(), &Sha256, false).is_err());
    }

    #[test]
    fn out_of_range_leaf_is_rejected() {
        let tree = MerkleTree::build(leaves(4), &Sha256, false).unwrap();
        assert!(tree.sibling_path(4).is_err());
    }
}

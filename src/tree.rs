//! The document tree: configuration, lifecycle and proof operations.
//!
//! A [`DocumentTree`] starts empty, accumulates leaves (directly or by
//! flattening a document), and [`generate`] seals it: leaves are sorted by
//! name, padded to a fixed depth when requested, hashed and assembled into
//! the Merkle tree. A sealed tree only creates and validates proofs; every
//! mutating call fails. [`DocumentTree::with_root`] builds a
//! verification-only tree bound to a known root.
//!
//! [`generate`]: DocumentTree::generate

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, debug_span};

use crate::document::Document;
use crate::error::{Result, TreeError};
use crate::flatten::{flatten_document, FlattenOptions};
use crate::hash::HashFunction;
use crate::leaf::LeafNode;
use crate::merkle::MerkleTree;
use crate::proof::{validate_proof_against_root, Proof, PropertyRef, SiblingHash};
use crate::property::Property;
use crate::salt::SaltProvider;

/// Deepest supported fixed-depth tree.
pub const MAX_TREE_DEPTH: u32 = 32;

/// Tree configuration; see the spec of each field.
pub struct TreeOptions {
    /// Inner-node hash function. Mandatory.
    pub hash: Option<Arc<dyn HashFunction>>,
    /// Leaf hash function; defaults to `hash`.
    pub leaf_hash: Option<Arc<dyn HashFunction>>,
    /// Sort each sibling pair before hashing; proofs then omit side
    /// indicators. Not combinable with `tree_depth`.
    pub enable_hash_sorting: bool,
    /// Source of per-leaf salts; defaults to on-demand generation.
    pub salts: SaltProvider,
    /// Readable suffix of collection-size leaves.
    pub length_suffix: String,
    /// Property prefixed to every derived name.
    pub parent_prefix: Property,
    /// Use compact-name bytes as the leaf-hash property input, the sort key
    /// and the proof key.
    pub compact_properties: bool,
    /// Pad fixed-length fields on the left instead of the right.
    pub fixed_length_left_padding: bool,
    /// When positive, pad with empty leaves to exactly `2^tree_depth`.
    pub tree_depth: u32,
}

impl TreeOptions {
    /// Options with the given hash for both inner nodes and leaves.
    pub fn new(hash: Arc<dyn HashFunction>) -> Self {
        Self {
            hash: Some(hash),
            ..Self::default()
        }
    }
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            hash: None,
            leaf_hash: None,
            enable_hash_sorting: false,
            salts: SaltProvider::default(),
            length_suffix: "length".to_owned(),
            parent_prefix: Property::empty(),
            compact_properties: false,
            fixed_length_left_padding: false,
            tree_depth: 0,
        }
    }
}

/// A deterministic Merkle tree over the flattened leaves of a document.
pub struct DocumentTree {
    inner_hash: Arc<dyn HashFunction>,
    leaf_hash: Arc<dyn HashFunction>,
    hash_sorted: bool,
    compact: bool,
    tree_depth: u32,
    length_suffix: String,
    parent_prefix: Property,
    left_padding: bool,
    salts: SaltProvider,
    leaves: Vec<LeafNode>,
    readable_names: HashSet<String>,
    compact_names: HashSet<Vec<u8>>,
    merkle: Option<MerkleTree>,
    root: Vec<u8>,
    filled: bool,
    poisoned: bool,
}

impl DocumentTree {
    /// An empty tree with the given options.
    ///
    /// # Errors
    ///
    /// Configuration errors: missing hash, `tree_depth` above
    /// [`MAX_TREE_DEPTH`], or hash sorting combined with a fixed depth.
    pub fn new(options: TreeOptions) -> Result<Self> {
        let (inner_hash, leaf_hash) = Self::validate_options(&options)?;
        Ok(Self {
            inner_hash,
            leaf_hash,
            hash_sorted: options.enable_hash_sorting,
            compact: options.compact_properties,
            tree_depth: options.tree_depth,
            length_suffix: options.length_suffix,
            parent_prefix: options.parent_prefix,
            left_padding: options.fixed_length_left_padding,
            salts: options.salts,
            leaves: Vec::new(),
            readable_names: HashSet::new(),
            compact_names: HashSet::new(),
            merkle: None,
            root: Vec::new(),
            filled: false,
            poisoned: false,
        })
    }

    /// A verification-only tree bound to a known root. It validates proofs
    /// but holds no leaves; mutation and proof creation fail.
    pub fn with_root(options: TreeOptions, root: Vec<u8>) -> Result<Self> {
        let mut tree = Self::new(options)?;
        tree.root = root;
        tree.filled = true;
        Ok(tree)
    }

    fn validate_options(
        options: &TreeOptions,
    ) -> Result<(Arc<dyn HashFunction>, Arc<dyn HashFunction>)> {
        let inner = options
            .hash
            .as_ref()
            .ok_or_else(|| TreeError::Config("a hash function is required".to_owned()))?
            .clone();
        if options.tree_depth > MAX_TREE_DEPTH {
            return Err(TreeError::Config(format!(
                "tree_depth {} exceeds the maximum of {}",
                options.tree_depth, MAX_TREE_DEPTH
            )));
        }
        if options.enable_hash_sorting && options.tree_depth > 0 {
            return Err(TreeError::Config(
                "hash sorting cannot be combined with a fixed tree depth".to_owned(),
            ));
        }
        let leaf = options.leaf_hash.as_ref().unwrap_or(&inner).clone();
        Ok((inner, leaf))
    }

    fn check_mutable(&self) -> Result<()> {
        if self.poisoned {
            return Err(TreeError::TreeState(
                "tree is in an error state after a failed operation; discard it".to_owned(),
            ));
        }
        if self.filled {
            return Err(TreeError::TreeState(
                "tree is already generated; leaves are frozen".to_owned(),
            ));
        }
        Ok(())
    }

    fn capacity(&self) -> Option<u64> {
        (self.tree_depth > 0).then(|| 1u64 << self.tree_depth)
    }

    /// Appends one leaf.
    ///
    /// # Errors
    ///
    /// Rejects duplicates of either name, leaves beyond a fixed-depth
    /// capacity, and any mutation of a generated or poisoned tree.
    pub fn add_leaf(&mut self, leaf: LeafNode) -> Result<()> {
        self.check_mutable()?;
        if let Some(capacity) = self.capacity() {
            if self.leaves.len() as u64 >= capacity {
                return Err(TreeError::CapacityExceeded {
                    depth: self.tree_depth,
                    max: capacity as usize,
                });
            }
        }
        let readable = leaf.property.readable().to_owned();
        let compact = leaf.property.compact().to_vec();
        if self.readable_names.contains(&readable) || self.compact_names.contains(&compact) {
            return Err(TreeError::DuplicateLeaf { name: readable });
        }
        self.readable_names.insert(readable);
        self.compact_names.insert(compact);
        self.leaves.push(leaf);
        Ok(())
    }

    /// Appends a batch of leaves; stops at the first rejected leaf.
    pub fn add_leaves(&mut self, leaves: impl IntoIterator<Item = LeafNode>) -> Result<()> {
        for leaf in leaves {
            self.add_leaf(leaf)?;
        }
        Ok(())
    }

    /// Flattens `document` under the configured prefix and appends the
    /// resulting leaves.
    ///
    /// A failure mid-flattening poisons the tree: the leaf set may be
    /// partial, so all further mutation and generation is refused.
    pub fn add_leaves_from_document(&mut self, document: &Document) -> Result<()> {
        self.check_mutable()?;
        let result = self.flatten_into(document);
        if result.is_err() {
            self.poisoned = true;
        }
        result
    }

    fn flatten_into(&mut self, document: &Document) -> Result<()> {
        let flatten_options = FlattenOptions {
            length_suffix: self.length_suffix.clone(),
            fixed_length_left_padding: self.left_padding,
        };
        let leaves = flatten_document(
            document,
            &self.parent_prefix,
            &mut self.salts,
            &flatten_options,
        )?;
        self.add_leaves(leaves)
    }

    /// Seals the tree: sorts leaves by name, pads to the fixed depth, hashes
    /// outstanding leaves and computes the root. One-shot.
    pub fn generate(&mut self) -> Result<()> {
        self.check_mutable()?;
        let _span = debug_span!("generate", leaves = self.leaves.len()).entered();
        if self.leaves.is_empty() && self.tree_depth == 0 {
            return Err(TreeError::TreeState(
                "cannot generate a tree without leaves".to_owned(),
            ));
        }

        let compact = self.compact;
        self.leaves
            .sort_by(|a, b| a.property.name_bytes(compact).cmp(b.property.name_bytes(compact)));

        if let Some(capacity) = self.capacity() {
            while (self.leaves.len() as u64) < capacity {
                self.leaves.push(LeafNode::padding(self.leaf_hash.as_ref()));
            }
        }

        match self.build_merkle(compact) {
            Ok(merkle) => {
                self.root = merkle.root().to_vec();
                self.merkle = Some(merkle);
                self.filled = true;
                debug!(root = %hex::encode(&self.root), "tree generated");
                Ok(())
            }
            Err(e) => {
                self.poisoned = true;
                Err(e)
            }
        }
    }

    fn build_merkle(&mut self, compact: bool) -> Result<MerkleTree> {
        let leaf_hash = Arc::clone(&self.leaf_hash);
        let mut hashes = Vec::with_capacity(self.leaves.len());
        for leaf in &mut self.leaves {
            leaf.ensure_hash(leaf_hash.as_ref(), compact)?;
            hashes.push(leaf.hash.clone());
        }
        MerkleTree::build(hashes, self.inner_hash.as_ref(), self.hash_sorted)
    }

    /// The frozen root hash.
    pub fn root(&self) -> Result<&[u8]> {
        if !self.filled {
            return Err(TreeError::TreeState(
                "tree root is not available before generate()".to_owned(),
            ));
        }
        Ok(&self.root)
    }

    /// The root as lowercase hex, for display.
    pub fn root_hex(&self) -> Result<String> {
        Ok(hex::encode(self.root()?))
    }

    /// Leaves in their final sorted order (traversal order before
    /// [`generate`](Self::generate)).
    pub fn leaves(&self) -> &[LeafNode] {
        &self.leaves
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Creates a proof for the leaf with the given readable name.
    pub fn create_proof(&self, readable_name: &str) -> Result<Proof> {
        let index = self
            .leaves
            .iter()
            .position(|leaf| leaf.property.readable() == readable_name)
            .ok_or_else(|| TreeError::LeafNotFound {
                property: readable_name.to_owned(),
            })?;
        self.proof_for_index(index)
    }

    /// Creates a proof for the leaf with the given compact name.
    pub fn create_proof_compact(&self, compact_name: &[u8]) -> Result<Proof> {
        let index = self
            .leaves
            .iter()
            .position(|leaf| leaf.property.compact() == compact_name)
            .ok_or_else(|| TreeError::LeafNotFound {
                property: format!("0x{}", hex::encode(compact_name)),
            })?;
        self.proof_for_index(index)
    }

    fn proof_for_index(&self, index: usize) -> Result<Proof> {
        let merkle = self.merkle.as_ref().ok_or_else(|| {
            TreeError::TreeState(
                "proofs require a generated tree with leaves, not a root-only tree".to_owned(),
            )
        })?;
        let leaf = &self.leaves[index];
        let path = merkle.sibling_path(index)?;

        let property = if self.compact {
            PropertyRef::Compact(leaf.property.compact().to_vec())
        } else {
            PropertyRef::Readable(leaf.property.readable().to_owned())
        };
        let mut proof = Proof {
            property,
            value: leaf.value.clone(),
            salt: leaf.salt.clone(),
            hash: if leaf.hashed { leaf.hash.clone() } else { Vec::new() },
            hashes: Vec::new(),
            sorted_hashes: Vec::new(),
        };
        if self.hash_sorted {
            proof.sorted_hashes = path
                .iter()
                .map(|step| merkle.node(step.node_index).to_vec())
                .collect();
        } else {
            proof.hashes = path
                .iter()
                .map(|step| {
                    let sibling = merkle.node(step.node_index).to_vec();
                    if step.is_left {
                        SiblingHash::left(sibling)
                    } else {
                        SiblingHash::right(sibling)
                    }
                })
                .collect();
        }
        debug!(property = %proof.property, siblings = path.len(), "proof created");
        Ok(proof)
    }

    /// Validates a proof against this tree's root.
    pub fn validate_proof(&self, proof: &Proof) -> Result<bool> {
        let root = self.root()?;
        validate_proof_against_root(
            proof,
            root,
            self.leaf_hash.as_ref(),
            self.inner_hash.as_ref(),
        )
    }
}

impl std::fmt::Debug for DocumentTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentTree")
            .field("leaves", &self.leaves.len())
            .field("filled", &self.filled)
            .field("hash_sorted", &self.hash_sorted)
            .field("compact", &self.compact)
            .field("tree_depth", &self.tree_depth)
            .field("root", &hex::encode(&self.root))
            .finish()
    }
}

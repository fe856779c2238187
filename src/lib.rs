//! Precise-proofs: deterministic Merkle trees over structured documents.
//!
//! This library flattens a schema-described document into a canonical set of
//! salted leaves, builds a binary Merkle tree over them, and produces compact
//! inclusion proofs for individual fields. A verifier holding only the root
//! hash, the hash function and a proof can confirm a field value was part of
//! the document without ever seeing the document.
//!
//! ## Main Components
//!
//! - [`tree`]: tree configuration, lifecycle and proof operations
//! - [`flatten`]: document traversal into `(property, value, salt)` leaves
//! - [`property`]: the dual readable/compact leaf naming scheme
//! - [`document`] and [`schema`]: the self-describing document model
//! - [`merkle`]: the underlying node array and sibling paths
//! - [`proof`]: the proof wire object and standalone validation
//! - [`multiproof`]: sibling deduplication across proof bundles
//!
//! ## Error Handling
//!
//! This library uses `Result` types for robust error handling. Operations
//! return `Result<T, TreeError>` with detailed error kinds: schema problems,
//! value-encoding failures, tree-state violations, failed lookups, proof
//! validation issues and configuration mistakes.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use precise_proofs::{
//!     Document, DocumentTree, FieldDescriptor, Scalar, Sha256, TreeError, TreeOptions, Value,
//! };
//!
//! // 1. Describe a document: every field carries its ordinal and name
//! let document = Document::new()
//!     .with_field(
//!         FieldDescriptor::new(1, "value_a"),
//!         Value::Scalar(Scalar::String("Foo".into())),
//!     )
//!     .with_field(
//!         FieldDescriptor::new(2, "value_b"),
//!         Value::Scalar(Scalar::String("Bar".into())),
//!     );
//!
//! // 2. Build the tree; salts are generated and memoized on demand
//! let mut tree = DocumentTree::new(TreeOptions::new(Arc::new(Sha256)))?;
//! tree.add_leaves_from_document(&document)?;
//! tree.generate()?;
//!
//! // 3. Prove one field and validate it against the root
//! let proof = tree.create_proof("value_a")?;
//! assert!(tree.validate_proof(&proof)?);
//! # Ok::<(), TreeError>(())
//! ```

pub mod document;
pub mod error;
pub mod flatten;
pub mod hash;
pub mod leaf;
pub mod merkle;
pub mod multiproof;
pub mod proof;
pub mod property;
pub mod salt;
pub mod schema;
pub mod tree;

// Re-export commonly used types and functions for convenience
pub use document::{encode_scalar, Document, Field, Scalar, Value};
pub use error::{Result, TreeError};
pub use flatten::{flatten_document, FlattenOptions};
pub use hash::{hash_pair, hash_sorted_pair, HashFunction, Sha256, Sha512};
pub use leaf::{hash_leaf, LeafNode};
pub use merkle::{MerkleTree, PathStep};
pub use multiproof::{optimize_sorted_proofs, validate_sorted_proofs};
pub use proof::{validate_proof_against_root, Proof, PropertyRef, SiblingHash};
pub use property::{escape_key_segment, unescape_key_segment, MapKey, Property};
pub use salt::{GeneratedSalts, SaltProvider, SALT_LENGTH};
pub use schema::FieldDescriptor;
pub use tree::{DocumentTree, TreeOptions, MAX_TREE_DEPTH};

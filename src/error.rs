//! Error types for the precise-proofs library

/// Error types for the precise-proofs library
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Schema-level problem: malformed field tag or an annotation applied to
    /// an incompatible field type
    #[error("schema error: {0}")]
    Schema(String),

    /// Map key of a kind that cannot be encoded
    #[error("unsupported map key type: {kind}")]
    UnsupportedKeyType { kind: &'static str },

    /// Map key longer than the declared key length
    #[error("map key too long: {length} bytes exceeds key length {max}")]
    KeyTooLong { length: usize, max: usize },

    /// Value encoding failed (padding overflow, incompatible type)
    #[error("value encoding error: {0}")]
    ValueEncoding(String),

    /// Value longer than its declared fixed length
    #[error("value too long: {length} bytes exceeds field length {max}")]
    ValueTooLong { length: usize, max: usize },

    /// Operation not permitted in the tree's current lifecycle state
    #[error("invalid tree state: {0}")]
    TreeState(String),

    /// A leaf with the same readable or compact name already exists
    #[error("duplicate leaf: {name}")]
    DuplicateLeaf { name: String },

    /// Fixed-depth tree is already at capacity
    #[error("tree capacity exceeded: fixed depth {depth} holds at most {max} leaves")]
    CapacityExceeded { depth: u32, max: usize },

    /// No leaf matches the requested property
    #[error("leaf not found: {property}")]
    LeafNotFound { property: String },

    /// Proof hashing did not reach the expected root, or the proof itself
    /// is malformed
    #[error("proof validation error: {0}")]
    Validation(String),

    /// Salt is neither empty nor exactly 32 bytes
    #[error("invalid salt length: {length} bytes (must be 0 or 32)")]
    InvalidSaltLength { length: usize },

    /// Tree options are inconsistent or incomplete
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization failed
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience Result type for precise-proofs operations
pub type Result<T> = std::result::Result<T, TreeError>;

//! Schema view consumed by the flattener.
//!
//! The on-wire schema format itself is out of scope; this module is the
//! in-memory surface the core reads from it: per field an ordinal, a name
//! and the per-field annotations that steer flattening.

use crate::error::{Result, TreeError};

/// Describes one field of a document message.
///
/// Annotations default to off; use the `with_*` builders to set them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldDescriptor {
    /// Field ordinal (the compact-name component). Must be non-zero.
    pub tag: u64,
    /// Field name, lowercase with underscores; the readable-name segment.
    /// Hash output is name-sensitive, so this must match the schema exactly.
    pub name: String,
    /// Omit this field (and everything under it) from the tree.
    pub exclude_from_tree: bool,
    /// The value is already a hash; it becomes the leaf hash verbatim.
    /// Only valid on bytes-typed fields.
    pub hashed_field: bool,
    /// Pad the value (or map key) to exactly this many bytes.
    pub field_length: Option<u64>,
    /// On a repeated message field: convert to a map keyed on the named
    /// sub-field.
    pub mapping_key: Option<String>,
    /// On a nested message: collapse it into one leaf whose value is the
    /// ordinal-sorted concatenation of its sub-field bytes.
    pub append_fields: bool,
    /// Omit the salt from this leaf and all its descendants.
    pub no_salt: bool,
}

impl FieldDescriptor {
    /// A plain field with no annotations.
    pub fn new(tag: u64, name: impl Into<String>) -> Self {
        Self {
            tag,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_exclude_from_tree(mut self) -> Self {
        self.exclude_from_tree = true;
        self
    }

    pub fn with_hashed_field(mut self) -> Self {
        self.hashed_field = true;
        self
    }

    pub fn with_field_length(mut self, length: u64) -> Self {
        self.field_length = Some(length);
        self
    }

    pub fn with_mapping_key(mut self, key_field: impl Into<String>) -> Self {
        self.mapping_key = Some(key_field.into());
        self
    }

    pub fn with_append_fields(mut self) -> Self {
        self.append_fields = true;
        self
    }

    pub fn with_no_salt(mut self) -> Self {
        self.no_salt = true;
        self
    }

    /// Rejects descriptors the flattener cannot address.
    pub fn validate(&self) -> Result<()> {
        if self.tag == 0 {
            return Err(TreeError::Schema(format!(
                "field '{}' has tag 0; tags must be positive",
                self.name
            )));
        }
        if self.name.is_empty() {
            return Err(TreeError::Schema(format!(
                "field with tag {} has an empty name",
                self.tag
            )));
        }
        Ok(())
    }
}

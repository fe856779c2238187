//! Document flattening: recursive descent from a structured document to an
//! unsorted list of leaves.
//!
//! Traversal policy (per field, driven by its descriptor):
//!
//! - scalars emit one leaf at the current property;
//! - nested messages recurse, or collapse into one concatenated leaf under
//!   `append_fields`;
//! - repeated fields emit a `length` leaf plus one subtree per element, or
//!   convert to a map under `mapping_key`;
//! - maps emit a `length` leaf plus one subtree per entry, keyed in sorted
//!   key order so the salt-provider call sequence is reproducible;
//! - one-of groups flatten their populated arm as a direct field of the
//!   parent.
//!
//! The traversal order is not the final leaf order; the tree sorts leaves by
//! name before hashing.

use std::collections::BTreeMap;

use tracing::{debug, debug_span};

use crate::document::{encode_scalar, Document, Field, Scalar, Value};
use crate::error::{Result, TreeError};
use crate::leaf::LeafNode;
use crate::property::{MapKey, Property};
use crate::salt::SaltProvider;
use crate::schema::FieldDescriptor;

/// Flattening knobs, a subset of `TreeOptions`.
#[derive(Debug, Clone)]
pub struct FlattenOptions {
    /// Readable suffix of collection-size leaves.
    pub length_suffix: String,
    /// Pad fixed-length fields on the left instead of the right.
    pub fixed_length_left_padding: bool,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            length_suffix: "length".to_owned(),
            fixed_length_left_padding: false,
        }
    }
}

/// Flattens `document` into leaves rooted at `prefix`.
///
/// Salts are resolved through `salts` keyed by each leaf's compact name;
/// fields under a `no_salt` annotation (and pre-hashed fields) get none.
pub fn flatten_document(
    document: &Document,
    prefix: &Property,
    salts: &mut SaltProvider,
    options: &FlattenOptions,
) -> Result<Vec<LeafNode>> {
    let _span = debug_span!("flatten", prefix = %prefix).entered();
    let mut flattener = Flattener {
        salts,
        options,
        leaves: Vec::new(),
    };
    flattener.message(document, prefix, false, None)?;
    debug!(leaves = flattener.leaves.len(), "document flattened");
    Ok(flattener.leaves)
}

struct Flattener<'a> {
    salts: &'a mut SaltProvider,
    options: &'a FlattenOptions,
    leaves: Vec<LeafNode>,
}

impl Flattener<'_> {
    fn message(
        &mut self,
        document: &Document,
        property: &Property,
        no_salt: bool,
        skip_field: Option<&str>,
    ) -> Result<()> {
        for field in document.fields() {
            // A field promoted to map key identifies its element; it is not
            // a leaf of its own.
            if skip_field == Some(field.descriptor.name.as_str()) {
                continue;
            }
            self.field(field, property, no_salt)?;
        }
        Ok(())
    }

    fn field(&mut self, field: &Field, parent: &Property, inherited_no_salt: bool) -> Result<()> {
        let descriptor = &field.descriptor;
        if descriptor.exclude_from_tree {
            return Ok(());
        }
        descriptor.validate()?;
        let no_salt = inherited_no_salt || descriptor.no_salt;

        // The populated one-of arm sits directly at the parent with its own
        // declared ordinal.
        if let Value::OneOf(arm) = &field.value {
            if let Some(inner) = arm {
                self.field(inner, parent, no_salt)?;
            }
            return Ok(());
        }

        let property = parent.field(&descriptor.name, descriptor.tag);
        self.value(&field.value, descriptor, property, no_salt)
    }

    fn value(
        &mut self,
        value: &Value,
        descriptor: &FieldDescriptor,
        property: Property,
        no_salt: bool,
    ) -> Result<()> {
        match value {
            Value::Scalar(scalar) => self.scalar_leaf(scalar, descriptor, property, no_salt),
            Value::Nil => self.emit(property, Vec::new(), no_salt),
            Value::Message(message) => {
                if descriptor.append_fields {
                    self.append_leaf(message, property, no_salt)
                } else {
                    self.message(message, &property, no_salt, None)
                }
            }
            Value::List(items) => {
                if descriptor.mapping_key.is_some() {
                    self.mapped_list(items, descriptor, &property, no_salt)
                } else {
                    self.sequence(items, descriptor, &property, no_salt)
                }
            }
            Value::Map(entries) => self.map(entries, descriptor, &property, no_salt),
            Value::OneOf(arm) => {
                // One-of nested in a sequence element: the arm hangs off the
                // element's property.
                if let Some(inner) = arm {
                    self.field(inner, &property, no_salt)?;
                }
                Ok(())
            }
        }
    }

    fn scalar_leaf(
        &mut self,
        scalar: &Scalar,
        descriptor: &FieldDescriptor,
        property: Property,
        no_salt: bool,
    ) -> Result<()> {
        if descriptor.hashed_field {
            let Scalar::Bytes(hash) = scalar else {
                return Err(TreeError::Schema(format!(
                    "hashed_field '{}' must be bytes-typed, found {}",
                    descriptor.name,
                    scalar.kind()
                )));
            };
            self.leaves.push(LeafNode::from_hash(property, hash.clone()));
            return Ok(());
        }
        let value = encode_scalar(
            scalar,
            descriptor.field_length,
            self.options.fixed_length_left_padding,
        )?;
        self.emit(property, value, no_salt)
    }

    fn sequence(
        &mut self,
        items: &[Value],
        descriptor: &FieldDescriptor,
        property: &Property,
        no_salt: bool,
    ) -> Result<()> {
        self.length_leaf(property, items.len(), no_salt)?;
        let elem_descriptor = FieldDescriptor {
            mapping_key: None,
            ..descriptor.clone()
        };
        for (index, item) in items.iter().enumerate() {
            let elem_property = property.elem(index as u64);
            self.value(item, &elem_descriptor, elem_property, no_salt)?;
        }
        Ok(())
    }

    fn map(
        &mut self,
        entries: &BTreeMap<MapKey, Value>,
        descriptor: &FieldDescriptor,
        property: &Property,
        no_salt: bool,
    ) -> Result<()> {
        self.length_leaf(property, entries.len(), no_salt)?;
        let key_length = descriptor.field_length.unwrap_or(0) as usize;
        // field_length pads the key here, not the values.
        let value_descriptor = FieldDescriptor {
            field_length: None,
            mapping_key: None,
            ..descriptor.clone()
        };
        for (key, value) in entries {
            let elem_property = property.map_elem(key, key_length)?;
            self.value(value, &value_descriptor, elem_property, no_salt)?;
        }
        Ok(())
    }

    /// Repeated-message field annotated with `mapping_key`: the named
    /// sub-field of each element becomes the map key, and is skipped when
    /// the element itself is flattened.
    fn mapped_list(
        &mut self,
        items: &[Value],
        descriptor: &FieldDescriptor,
        property: &Property,
        no_salt: bool,
    ) -> Result<()> {
        let key_field = descriptor.mapping_key.as_deref().unwrap_or_default();
        let mut entries: BTreeMap<MapKey, &Document> = BTreeMap::new();
        for item in items {
            let Value::Message(message) = item else {
                return Err(TreeError::Schema(format!(
                    "mapping_key '{}' requires message elements in field '{}'",
                    key_field, descriptor.name
                )));
            };
            let key_entry = message.field_by_name(key_field).ok_or_else(|| {
                TreeError::Schema(format!(
                    "mapping key field '{}' missing from element of '{}'",
                    key_field, descriptor.name
                ))
            })?;
            let Value::Scalar(scalar) = &key_entry.value else {
                return Err(TreeError::Schema(format!(
                    "mapping key field '{}' must be scalar",
                    key_field
                )));
            };
            let key = scalar.to_map_key()?;
            if entries.insert(key.clone(), message).is_some() {
                return Err(TreeError::Schema(format!(
                    "duplicate mapping key {} in field '{}'",
                    key.readable(),
                    descriptor.name
                )));
            }
        }

        self.length_leaf(property, entries.len(), no_salt)?;
        let key_length = descriptor.field_length.unwrap_or(0) as usize;
        for (key, message) in entries {
            let elem_property = property.map_elem(&key, key_length)?;
            self.message(message, &elem_property, no_salt, Some(key_field))?;
        }
        Ok(())
    }

    /// `append_fields` message: one leaf whose value is the ordinal-sorted
    /// concatenation of the sub-field byte encodings.
    fn append_leaf(
        &mut self,
        message: &Document,
        property: Property,
        no_salt: bool,
    ) -> Result<()> {
        let mut parts: BTreeMap<u64, Vec<u8>> = BTreeMap::new();
        for field in message.fields() {
            let descriptor = &field.descriptor;
            if descriptor.exclude_from_tree {
                continue;
            }
            descriptor.validate()?;
            let bytes = match &field.value {
                Value::Scalar(scalar) => encode_scalar(
                    scalar,
                    descriptor.field_length,
                    self.options.fixed_length_left_padding,
                )?,
                Value::Nil => Vec::new(),
                _ => {
                    return Err(TreeError::Schema(format!(
                        "append_fields supports scalar sub-fields, '{}' is not",
                        descriptor.name
                    )))
                }
            };
            if parts.insert(descriptor.tag, bytes).is_some() {
                return Err(TreeError::Schema(format!(
                    "duplicate tag {} under append_fields",
                    descriptor.tag
                )));
            }
        }
        let value = parts.into_values().flatten().collect();
        self.emit(property, value, no_salt)
    }

    fn length_leaf(&mut self, property: &Property, len: usize, no_salt: bool) -> Result<()> {
        let length_property = property.length(&self.options.length_suffix);
        let value = (len as u64).to_be_bytes().to_vec();
        self.emit(length_property, value, no_salt)
    }

    fn emit(&mut self, property: Property, value: Vec<u8>, no_salt: bool) -> Result<()> {
        let salt = if no_salt {
            Vec::new()
        } else {
            self.salts.salt_for(property.compact())?.to_vec()
        };
        self.leaves.push(LeafNode::new(property, value, salt));
        Ok(())
    }
}

//! Leaf addressing: the dual readable/compact naming scheme.
//!
//! Every leaf of a document tree is identified two ways at once:
//!
//! - a **readable name**, the dotted path a human would write
//!   (`valueD.valueA`, `valueC[1].valueA`, `entries[key]`, `entries.length`);
//! - a **compact name**, the concatenation of the big-endian encoded field
//!   ordinals (and map-key bytes) leading from the document root to the leaf.
//!
//! Both names are byte-exact identities: one of them (selected by
//! `TreeOptions::compact_properties`) is fed into the leaf hash and used as
//! the proof key, so the encoding rules here are load-bearing for root
//! compatibility.

use crate::error::{Result, TreeError};

/// Width in bytes of one compact-name component (a 64-bit big-endian
/// field ordinal or element index).
pub const COMPACT_COMPONENT_LEN: usize = 8;

/// Characters that must be escaped inside a readable map-key segment.
const ESCAPED: [char; 4] = ['\\', '.', '[', ']'];

/// Escapes `\`, `.`, `[` and `]` in a readable map-key segment by prefixing
/// each with a backslash.
pub fn escape_key_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        if ESCAPED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Reverses [`escape_key_segment`]. Unknown escapes pass the escaped
/// character through unchanged.
pub fn unescape_key_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// A map key as it appears in a document.
///
/// The derived `Ord` gives maps a deterministic traversal order, which keeps
/// the salt-provider call sequence reproducible between runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
}

impl MapKey {
    /// Readable form of the key as it appears between `[` and `]`.
    pub fn readable(&self) -> String {
        match self {
            MapKey::U8(v) => v.to_string(),
            MapKey::U16(v) => v.to_string(),
            MapKey::U32(v) => v.to_string(),
            MapKey::U64(v) => v.to_string(),
            MapKey::I8(v) => v.to_string(),
            MapKey::I16(v) => v.to_string(),
            MapKey::I32(v) => v.to_string(),
            MapKey::I64(v) => v.to_string(),
            MapKey::Bool(v) => v.to_string(),
            MapKey::String(v) => escape_key_segment(v),
            MapKey::Bytes(v) => format!("0x{}", hex::encode(v)),
        }
    }

    /// Compact byte form of the key.
    ///
    /// Integers encode big-endian over their native width and booleans as a
    /// single byte; `key_length` does not apply to them. Strings (escaped
    /// form) and byte strings are left-padded with zeros to `key_length`;
    /// a `key_length` of zero means no padding, the natural length is kept.
    ///
    /// # Errors
    ///
    /// Returns `KeyTooLong` if a string or byte key exceeds a non-zero
    /// `key_length`.
    pub fn compact_bytes(&self, key_length: usize) -> Result<Vec<u8>> {
        match self {
            MapKey::U8(v) => Ok(v.to_be_bytes().to_vec()),
            MapKey::U16(v) => Ok(v.to_be_bytes().to_vec()),
            MapKey::U32(v) => Ok(v.to_be_bytes().to_vec()),
            MapKey::U64(v) => Ok(v.to_be_bytes().to_vec()),
            MapKey::I8(v) => Ok(v.to_be_bytes().to_vec()),
            MapKey::I16(v) => Ok(v.to_be_bytes().to_vec()),
            MapKey::I32(v) => Ok(v.to_be_bytes().to_vec()),
            MapKey::I64(v) => Ok(v.to_be_bytes().to_vec()),
            MapKey::Bool(v) => Ok(vec![*v as u8]),
            MapKey::String(v) => pad_key_left(escape_key_segment(v).into_bytes(), key_length),
            MapKey::Bytes(v) => pad_key_left(v.clone(), key_length),
        }
    }

    /// Kind name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            MapKey::U8(_) => "u8",
            MapKey::U16(_) => "u16",
            MapKey::U32(_) => "u32",
            MapKey::U64(_) => "u64",
            MapKey::I8(_) => "i8",
            MapKey::I16(_) => "i16",
            MapKey::I32(_) => "i32",
            MapKey::I64(_) => "i64",
            MapKey::Bool(_) => "bool",
            MapKey::String(_) => "string",
            MapKey::Bytes(_) => "bytes",
        }
    }
}

fn pad_key_left(bytes: Vec<u8>, key_length: usize) -> Result<Vec<u8>> {
    if key_length == 0 {
        return Ok(bytes);
    }
    if bytes.len() > key_length {
        return Err(TreeError::KeyTooLong {
            length: bytes.len(),
            max: key_length,
        });
    }
    let mut out = vec![0u8; key_length - bytes.len()];
    out.extend_from_slice(&bytes);
    Ok(out)
}

/// The addressable identity of one leaf, carried through document traversal.
///
/// A `Property` accumulates the full readable name and the full compact byte
/// stream as the flattener descends; children are derived with [`field`],
/// [`elem`], [`map_elem`] and [`length`].
///
/// [`field`]: Property::field
/// [`elem`]: Property::elem
/// [`map_elem`]: Property::map_elem
/// [`length`]: Property::length
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Property {
    name: String,
    compact: Vec<u8>,
}

impl Property {
    /// The empty root property. Leaves derived from it have no prefix.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A named top-level property with the given compact ordinals.
    pub fn new(name: impl Into<String>, ordinals: &[u64]) -> Self {
        let mut compact = Vec::with_capacity(ordinals.len() * COMPACT_COMPONENT_LEN);
        for ordinal in ordinals {
            compact.extend_from_slice(&ordinal.to_be_bytes());
        }
        Self {
            name: name.into(),
            compact,
        }
    }

    /// The full readable name.
    pub fn readable(&self) -> &str {
        &self.name
    }

    /// The full compact name bytes.
    pub fn compact(&self) -> &[u8] {
        &self.compact
    }

    /// True for the unnamed root.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.compact.is_empty()
    }

    /// The byte identity used as leaf-hash input and proof key:
    /// readable UTF-8 bytes, or the compact stream in compact mode.
    pub fn name_bytes(&self, compact_mode: bool) -> &[u8] {
        if compact_mode {
            &self.compact
        } else {
            self.name.as_bytes()
        }
    }

    /// Descends into a struct field (`parent.child`).
    pub fn field(&self, name: &str, tag: u64) -> Property {
        let mut compact = self.compact.clone();
        compact.extend_from_slice(&tag.to_be_bytes());
        Property {
            name: if self.name.is_empty() {
                name.to_owned()
            } else {
                format!("{}.{}", self.name, name)
            },
            compact,
        }
    }

    /// Descends into a sequence element by positional index (`parent[3]`).
    pub fn elem(&self, index: u64) -> Property {
        let mut compact = self.compact.clone();
        compact.extend_from_slice(&index.to_be_bytes());
        Property {
            name: format!("{}[{}]", self.name, index),
            compact,
        }
    }

    /// Descends into a map element (`parent[key]`).
    ///
    /// `key_length` pads string/byte keys on the left; see
    /// [`MapKey::compact_bytes`].
    pub fn map_elem(&self, key: &MapKey, key_length: usize) -> Result<Property> {
        let key_bytes = key.compact_bytes(key_length)?;
        let mut compact = self.compact.clone();
        compact.extend_from_slice(&key_bytes);
        Ok(Property {
            name: format!("{}[{}]", self.name, key.readable()),
            compact,
        })
    }

    /// The sibling leaf carrying a collection's size (`parent.length`).
    ///
    /// The compact name is the parent's own compact name: the collection
    /// itself never emits a leaf, so the stream stays unique.
    pub fn length(&self, suffix: &str) -> Property {
        Property {
            name: if self.name.is_empty() {
                suffix.to_owned()
            } else {
                format!("{}.{}", self.name, suffix)
            },
            compact: self.compact.clone(),
        }
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

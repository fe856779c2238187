//! Dynamic document model walked by the flattener.
//!
//! Documents are self-describing: every field carries its own
//! [`FieldDescriptor`], so the flattener needs no external type registry
//! (descriptor state is per-document rather than global).

use std::collections::BTreeMap;

use crate::error::{Result, TreeError};
use crate::property::MapKey;
use crate::schema::FieldDescriptor;

/// A scalar field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    String(String),
    Bytes(Vec<u8>),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Bool(bool),
    /// Enumeration value; encodes as its 32-bit number.
    Enum(i32),
    /// Seconds since the Unix epoch. `None` is an invalid timestamp and
    /// encodes as empty bytes. Sub-second precision is not encoded.
    Timestamp(Option<i64>),
}

impl Scalar {
    /// Kind name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Scalar::String(_) => "string",
            Scalar::Bytes(_) => "bytes",
            Scalar::U8(_) => "u8",
            Scalar::U16(_) => "u16",
            Scalar::U32(_) => "u32",
            Scalar::U64(_) => "u64",
            Scalar::I8(_) => "i8",
            Scalar::I16(_) => "i16",
            Scalar::I32(_) => "i32",
            Scalar::I64(_) => "i64",
            Scalar::Bool(_) => "bool",
            Scalar::Enum(_) => "enum",
            Scalar::Timestamp(_) => "timestamp",
        }
    }

    /// Canonical byte encoding: UTF-8 for strings, big-endian fixed width
    /// for integers/enums/timestamps, a single byte for booleans, verbatim
    /// for bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Scalar::String(v) => v.as_bytes().to_vec(),
            Scalar::Bytes(v) => v.clone(),
            Scalar::U8(v) => v.to_be_bytes().to_vec(),
            Scalar::U16(v) => v.to_be_bytes().to_vec(),
            Scalar::U32(v) => v.to_be_bytes().to_vec(),
            Scalar::U64(v) => v.to_be_bytes().to_vec(),
            Scalar::I8(v) => v.to_be_bytes().to_vec(),
            Scalar::I16(v) => v.to_be_bytes().to_vec(),
            Scalar::I32(v) => v.to_be_bytes().to_vec(),
            Scalar::I64(v) => v.to_be_bytes().to_vec(),
            Scalar::Bool(v) => vec![*v as u8],
            Scalar::Enum(v) => v.to_be_bytes().to_vec(),
            Scalar::Timestamp(Some(seconds)) => seconds.to_be_bytes().to_vec(),
            Scalar::Timestamp(None) => Vec::new(),
        }
    }

    /// Converts a scalar into a map key, for `mapping_key` repeated→map
    /// conversion. Only key-capable kinds convert.
    pub fn to_map_key(&self) -> Result<MapKey> {
        match self {
            Scalar::String(v) => Ok(MapKey::String(v.clone())),
            Scalar::Bytes(v) => Ok(MapKey::Bytes(v.clone())),
            Scalar::U8(v) => Ok(MapKey::U8(*v)),
            Scalar::U16(v) => Ok(MapKey::U16(*v)),
            Scalar::U32(v) => Ok(MapKey::U32(*v)),
            Scalar::U64(v) => Ok(MapKey::U64(*v)),
            Scalar::I8(v) => Ok(MapKey::I8(*v)),
            Scalar::I16(v) => Ok(MapKey::I16(*v)),
            Scalar::I32(v) => Ok(MapKey::I32(*v)),
            Scalar::I64(v) => Ok(MapKey::I64(*v)),
            Scalar::Bool(v) => Ok(MapKey::Bool(*v)),
            Scalar::Enum(_) | Scalar::Timestamp(_) => Err(TreeError::UnsupportedKeyType {
                kind: self.kind(),
            }),
        }
    }
}

/// A field value of any shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Scalar(Scalar),
    Message(Document),
    List(Vec<Value>),
    Map(BTreeMap<MapKey, Value>),
    /// A one-of group. The populated arm is flattened as if it were a direct
    /// field of the parent with its own declared ordinal; `None` contributes
    /// nothing.
    OneOf(Option<Box<Field>>),
    /// Absent value; encodes as empty bytes.
    Nil,
}

/// One field: its descriptor plus its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub descriptor: FieldDescriptor,
    pub value: Value,
}

impl Field {
    pub fn new(descriptor: FieldDescriptor, value: Value) -> Self {
        Self { descriptor, value }
    }
}

/// A message: its fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    fields: Vec<Field>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field, builder style.
    pub fn with_field(mut self, descriptor: FieldDescriptor, value: Value) -> Self {
        self.fields.push(Field::new(descriptor, value));
        self
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks a field up by its schema name.
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.descriptor.name == name)
    }
}

/// Encodes a scalar to bytes, applying `field_length` padding.
///
/// Padding applies to strings and byte strings only: the value is padded
/// with zero bytes to exactly `field_length`, on the right by default or on
/// the left when `left_padding` is set. A longer value is an error, as is
/// `field_length` on any other scalar kind.
pub fn encode_scalar(
    scalar: &Scalar,
    field_length: Option<u64>,
    left_padding: bool,
) -> Result<Vec<u8>> {
    let bytes = scalar.to_bytes();
    let Some(target) = field_length else {
        return Ok(bytes);
    };
    if !matches!(scalar, Scalar::String(_) | Scalar::Bytes(_)) {
        return Err(TreeError::ValueEncoding(format!(
            "field_length applies to string and bytes values, not {}",
            scalar.kind()
        )));
    }
    let target = target as usize;
    if bytes.len() > target {
        return Err(TreeError::ValueTooLong {
            length: bytes.len(),
            max: target,
        });
    }
    let mut out = Vec::with_capacity(target);
    if left_padding {
        out.resize(target - bytes.len(), 0);
        out.extend_from_slice(&bytes);
    } else {
        out.extend_from_slice(&bytes);
        out.resize(target, 0);
    }
    Ok(out)
}

//! Test fixtures and scenario documents.
//!
//! Documents here mirror the shapes the library must handle: flat scalar
//! documents with annotations, nested and repeated messages, and maps with
//! typed keys. Trees built from them use a fixed salt so roots are
//! reproducible across runs.

#![allow(dead_code)]

use std::sync::Arc;

use precise_proofs::{
    Document, FieldDescriptor, MapKey, SaltProvider, Scalar, Sha256, TreeOptions, Value,
};

/// Fixed salt used wherever a test needs reproducible roots.
pub const FIXED_SALT: [u8; 32] = [0xd5; 32];

/// Installs a fmt subscriber honoring `RUST_LOG`; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Salt provider handing out [`FIXED_SALT`] for every property.
pub fn fixed_salts() -> SaltProvider {
    SaltProvider::Callback(Box::new(|_| Ok(FIXED_SALT)))
}

/// SHA-256 options with fixed salts; the baseline tree configuration.
pub fn sha256_options() -> TreeOptions {
    TreeOptions {
        salts: fixed_salts(),
        ..TreeOptions::new(Arc::new(Sha256))
    }
}

/// A flat document exercising every scalar kind plus the exclusion and
/// padding annotations. Eleven leaves: `value_ignored` never appears.
pub fn example_document() -> Document {
    Document::new()
        .with_field(
            FieldDescriptor::new(1, "valueA"),
            Value::Scalar(Scalar::String("Foo".into())),
        )
        .with_field(
            FieldDescriptor::new(2, "valueB"),
            Value::Scalar(Scalar::String("Bar".into())),
        )
        .with_field(
            FieldDescriptor::new(3, "value1"),
            Value::Scalar(Scalar::I64(1)),
        )
        .with_field(
            FieldDescriptor::new(4, "value2"),
            Value::Scalar(Scalar::I64(2)),
        )
        .with_field(
            FieldDescriptor::new(5, "value_bytes1"),
            Value::Scalar(Scalar::Bytes(vec![1, 2, 3])),
        )
        .with_field(
            FieldDescriptor::new(6, "enum_type"),
            Value::Scalar(Scalar::Enum(2)),
        )
        .with_field(
            FieldDescriptor::new(7, "value_bool"),
            Value::Scalar(Scalar::Bool(true)),
        )
        .with_field(
            FieldDescriptor::new(8, "padding_field").with_field_length(32),
            Value::Scalar(Scalar::String("abc".into())),
        )
        .with_field(
            FieldDescriptor::new(9, "value_ignored").with_exclude_from_tree(),
            Value::Scalar(Scalar::String("gone".into())),
        )
        .with_field(
            FieldDescriptor::new(10, "timestamp"),
            Value::Scalar(Scalar::Timestamp(Some(1_500_000_000))),
        )
        .with_field(
            FieldDescriptor::new(11, "value_u32"),
            Value::Scalar(Scalar::U32(7)),
        )
        .with_field(FieldDescriptor::new(12, "value_nil"), Value::Nil)
}

/// Two scalars plus a repeated message of two elements:
/// `valueC.length`, `valueC[0].valueA`, `valueC[1].valueA`.
pub fn repeated_document() -> Document {
    let elem = |text: &str| {
        Value::Message(Document::new().with_field(
            FieldDescriptor::new(1, "valueA"),
            Value::Scalar(Scalar::String(text.into())),
        ))
    };
    Document::new()
        .with_field(
            FieldDescriptor::new(1, "valueA"),
            Value::Scalar(Scalar::String("Foo".into())),
        )
        .with_field(
            FieldDescriptor::new(2, "valueB"),
            Value::Scalar(Scalar::String("Bar".into())),
        )
        .with_field(
            FieldDescriptor::new(3, "valueC"),
            Value::List(vec![elem("valueCA"), elem("valueCB")]),
        )
}

/// A single map field `value` holding `{42 → "value"}`.
pub fn map_document() -> Document {
    let mut entries = std::collections::BTreeMap::new();
    entries.insert(MapKey::U64(42), Value::Scalar(Scalar::String("value".into())));
    Document::new().with_field(FieldDescriptor::new(1, "value"), Value::Map(entries))
}

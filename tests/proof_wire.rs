//! Proof wire format: JSON and binary round-trips through the full
//! pipeline, and rejection of corrupted transport bytes.

mod common;

use std::sync::Arc;

use common::{example_document, fixed_salts, repeated_document, sha256_options};
use precise_proofs::{DocumentTree, Proof, PropertyRef, Sha256, TreeOptions};

fn example_tree() -> DocumentTree {
    let mut tree = DocumentTree::new(sha256_options()).unwrap();
    tree.add_leaves_from_document(&example_document()).unwrap();
    tree.generate().unwrap();
    tree
}

#[test]
fn json_round_trip_preserves_validity() {
    let tree = example_tree();
    let proof = tree.create_proof("valueA").unwrap();

    let json = serde_json::to_string_pretty(&proof).unwrap();
    let restored: Proof = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, proof);
    assert!(tree.validate_proof(&restored).unwrap());
}

#[test]
fn json_encodes_bytes_as_base64_strings() {
    let tree = example_tree();
    let proof = tree.create_proof("valueA").unwrap();
    let json = serde_json::to_string(&proof).unwrap();
    // "Foo" in base64; raw byte arrays would leak as JSON number lists
    assert!(json.contains("\"Rm9v\""), "unexpected encoding: {}", json);
    assert!(!json.contains("[70,111,111]"));
}

#[test]
fn binary_round_trip_preserves_validity() {
    let tree = example_tree();
    let proof = tree.create_proof("padding_field").unwrap();

    let bytes = proof.to_bytes().unwrap();
    let restored = Proof::from_bytes(&bytes).unwrap();
    assert_eq!(restored, proof);
    assert!(tree.validate_proof(&restored).unwrap());
}

#[test]
fn corrupted_transport_bytes_never_validate() {
    let tree = example_tree();
    let proof = tree.create_proof("valueB").unwrap();
    let bytes = proof.to_bytes().unwrap();

    for position in 0..bytes.len() {
        let mut corrupted = bytes.clone();
        corrupted[position] ^= 0x01;
        match Proof::from_bytes(&corrupted) {
            Err(_) => {}
            Ok(restored) => {
                let valid = tree.validate_proof(&restored).unwrap_or(false);
                assert!(
                    !valid,
                    "bit flip at byte {} must not yield a valid proof",
                    position
                );
            }
        }
    }
}

#[test]
fn sorted_proofs_round_trip_both_formats() {
    let options = TreeOptions {
        enable_hash_sorting: true,
        salts: fixed_salts(),
        ..TreeOptions::new(Arc::new(Sha256))
    };
    let mut tree = DocumentTree::new(options).unwrap();
    tree.add_leaves_from_document(&repeated_document()).unwrap();
    tree.generate().unwrap();

    let proof = tree.create_proof("valueC[0].valueA").unwrap();
    let json: Proof = serde_json::from_str(&serde_json::to_string(&proof).unwrap()).unwrap();
    let binary = Proof::from_bytes(&proof.to_bytes().unwrap()).unwrap();
    assert_eq!(json, proof);
    assert_eq!(binary, proof);
    assert!(tree.validate_proof(&json).unwrap());
}

#[test]
fn compact_keyed_proofs_round_trip() {
    let options = TreeOptions {
        compact_properties: true,
        salts: fixed_salts(),
        ..TreeOptions::new(Arc::new(Sha256))
    };
    let mut tree = DocumentTree::new(options).unwrap();
    tree.add_leaves_from_document(&example_document()).unwrap();
    tree.generate().unwrap();

    let proof = tree.create_proof("valueB").unwrap();
    assert!(matches!(proof.property, PropertyRef::Compact(_)));

    let restored: Proof =
        serde_json::from_str(&serde_json::to_string(&proof).unwrap()).unwrap();
    assert_eq!(restored, proof);
    assert!(tree.validate_proof(&restored).unwrap());

    let binary = Proof::from_bytes(&proof.to_bytes().unwrap()).unwrap();
    assert!(tree.validate_proof(&binary).unwrap());
}

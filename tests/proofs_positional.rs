//! Positional-mode proof creation and validation.

mod common;

use std::sync::Arc;

use common::{example_document, fixed_salts, sha256_options, FIXED_SALT};
use precise_proofs::{
    Document, DocumentTree, FieldDescriptor, LeafNode, Property, PropertyRef, Scalar, Sha256,
    TreeOptions, Value,
};

fn generated_example_tree() -> DocumentTree {
    common::init_tracing();
    let mut tree = DocumentTree::new(sha256_options()).unwrap();
    tree.add_leaves_from_document(&example_document()).unwrap();
    tree.generate().unwrap();
    tree
}

fn manual_tree(leaf_count: usize) -> DocumentTree {
    let mut tree = DocumentTree::new(sha256_options()).unwrap();
    for i in 0..leaf_count {
        tree.add_leaf(LeafNode::new(
            Property::new(format!("field{:02}", i), &[i as u64 + 1]),
            vec![i as u8],
            FIXED_SALT.to_vec(),
        ))
        .unwrap();
    }
    tree.generate().unwrap();
    tree
}

#[test]
fn every_leaf_of_the_example_document_proves() {
    let tree = generated_example_tree();
    for leaf in tree.leaves() {
        let proof = tree.create_proof(leaf.property.readable()).unwrap();
        assert!(
            tree.validate_proof(&proof).unwrap(),
            "proof for {} must validate",
            leaf.property
        );
        assert!(proof.sorted_hashes.is_empty(), "positional mode only");
    }
}

#[test]
fn roots_are_deterministic_under_equal_salts() {
    let first = generated_example_tree();
    let second = generated_example_tree();
    assert_eq!(first.root().unwrap(), second.root().unwrap());
}

#[test]
fn generated_salts_differ_but_proofs_still_validate() {
    let build = || {
        let mut tree = DocumentTree::new(TreeOptions::new(Arc::new(Sha256))).unwrap();
        tree.add_leaves_from_document(&example_document()).unwrap();
        tree.generate().unwrap();
        tree
    };
    let first = build();
    let second = build();
    assert_ne!(
        first.root().unwrap(),
        second.root().unwrap(),
        "fresh random salts must move the root"
    );
    let proof = first.create_proof("valueA").unwrap();
    assert!(first.validate_proof(&proof).unwrap());
    assert!(!second.validate_proof(&proof).unwrap());
}

#[test]
fn single_leaf_tree_root_is_the_leaf_hash() {
    let tree = manual_tree(1);
    let proof = tree.create_proof("field00").unwrap();
    assert!(proof.hashes.is_empty(), "no siblings in a single-leaf tree");
    assert!(tree.validate_proof(&proof).unwrap());
    assert_eq!(tree.root().unwrap(), tree.leaves()[0].hash.as_slice());
}

#[test]
fn eleven_leaf_tree_carries_odd_singletons() {
    let tree = manual_tree(11);
    for i in 0..11 {
        let name = format!("field{:02}", i);
        let proof = tree.create_proof(&name).unwrap();
        assert!(
            tree.validate_proof(&proof).unwrap(),
            "leaf {} must validate",
            name
        );
    }
    // the last leaf is a carried singleton at two levels, so its path is
    // shorter than the full height
    let full = tree.create_proof("field00").unwrap();
    let carried = tree.create_proof("field10").unwrap();
    assert_eq!(full.hashes.len(), 4);
    assert_eq!(carried.hashes.len(), 2);
}

#[test]
fn proofs_validate_across_many_widths() {
    for leaf_count in [2usize, 3, 5, 7, 8, 13, 16] {
        let tree = manual_tree(leaf_count);
        for i in 0..leaf_count {
            let proof = tree.create_proof(&format!("field{:02}", i)).unwrap();
            assert!(
                tree.validate_proof(&proof).unwrap(),
                "leaf {} of {} must validate",
                i,
                leaf_count
            );
        }
    }
}

#[test]
fn tampering_with_any_proof_component_fails_validation() {
    let tree = generated_example_tree();
    let proof = tree.create_proof("valueA").unwrap();
    assert!(tree.validate_proof(&proof).unwrap());

    let mut bad_value = proof.clone();
    bad_value.value[0] ^= 0x01;
    assert!(!tree.validate_proof(&bad_value).unwrap());

    let mut bad_salt = proof.clone();
    bad_salt.salt[0] ^= 0x01;
    assert!(!tree.validate_proof(&bad_salt).unwrap());

    let mut bad_property = proof.clone();
    bad_property.property = PropertyRef::Readable("valueX".into());
    assert!(!tree.validate_proof(&bad_property).unwrap());

    for i in 0..proof.hashes.len() {
        let mut bad_sibling = proof.clone();
        let entry = &mut bad_sibling.hashes[i];
        if let Some(left) = entry.left.as_mut() {
            left[0] ^= 0x01;
        }
        if let Some(right) = entry.right.as_mut() {
            right[0] ^= 0x01;
        }
        assert!(
            !tree.validate_proof(&bad_sibling).unwrap(),
            "tampered sibling {} must fail",
            i
        );
    }
}

#[test]
fn compact_mode_sorts_by_ordinal_and_keys_proofs_compactly() {
    let compact_options = TreeOptions {
        compact_properties: true,
        salts: fixed_salts(),
        ..TreeOptions::new(Arc::new(Sha256))
    };
    let mut compact_tree = DocumentTree::new(compact_options).unwrap();
    compact_tree
        .add_leaves_from_document(&example_document())
        .unwrap();
    compact_tree.generate().unwrap();

    let readable_tree = generated_example_tree();
    assert_ne!(
        compact_tree.root().unwrap(),
        readable_tree.root().unwrap(),
        "naming mode is part of the hash input"
    );

    // ordinal order puts valueA (tag 1) first; readable order does not
    assert_eq!(compact_tree.leaves()[0].property.readable(), "valueA");
    assert_ne!(readable_tree.leaves()[0].property.readable(), "valueA");

    let proof = compact_tree.create_proof("valueA").unwrap();
    assert_eq!(
        proof.property,
        PropertyRef::Compact(vec![0, 0, 0, 0, 0, 0, 0, 1])
    );
    assert!(compact_tree.validate_proof(&proof).unwrap());

    let by_compact = compact_tree
        .create_proof_compact(&[0, 0, 0, 0, 0, 0, 0, 1])
        .unwrap();
    assert_eq!(by_compact, proof);
}

#[test]
fn hashed_field_bridges_an_inner_tree_to_an_outer_tree() {
    // inner document tree
    let mut inner = DocumentTree::new(sha256_options()).unwrap();
    inner.add_leaves_from_document(&example_document()).unwrap();
    inner.generate().unwrap();
    let inner_root = inner.root().unwrap().to_vec();
    let inner_proof = inner.create_proof("valueB").unwrap();

    // outer document embeds the inner root as a pre-hashed field
    let outer_document = Document::new()
        .with_field(
            FieldDescriptor::new(1, "inner_root").with_hashed_field(),
            Value::Scalar(Scalar::Bytes(inner_root.clone())),
        )
        .with_field(
            FieldDescriptor::new(2, "note"),
            Value::Scalar(Scalar::String("envelope".into())),
        );
    let mut outer = DocumentTree::new(sha256_options()).unwrap();
    outer.add_leaves_from_document(&outer_document).unwrap();
    outer.generate().unwrap();

    let outer_proof = outer.create_proof("inner_root").unwrap();
    assert_eq!(outer_proof.hash, inner_root);
    assert!(outer_proof.value.is_empty() && outer_proof.salt.is_empty());
    assert!(outer.validate_proof(&outer_proof).unwrap());

    // chaining: the inner field proof still validates against the root the
    // outer tree committed to
    assert!(inner.validate_proof(&inner_proof).unwrap());
    assert_eq!(outer_proof.hash, inner.root().unwrap());
}

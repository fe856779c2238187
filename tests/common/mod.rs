//! Common test utilities and shared infrastructure.
//!
//! This module provides the shared functionality used across the test suite:
//! - `fixtures`: sample documents and reproducible tree options

pub mod fixtures;

// Re-export commonly used test helpers
#[allow(unused_imports)]
pub use fixtures::{
    example_document, fixed_salts, init_tracing, map_document, repeated_document, sha256_options,
    FIXED_SALT,
};

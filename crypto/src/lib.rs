//! ACCTREG Cryptography Module
//!
//! Address derivation primitives:
//! - SHA-256 hashing
//! - Truncated-hash addresses for public keys and module accounts

pub mod hashing;
pub mod derivation;

pub use hashing::*;
pub use derivation::*;

//! ACCTREG State Management
//!
//! Provides ordered key-value backends, a transactional write cache, prefix
//! namespacing, and cursor-based pagination over range scans.

pub mod store;
pub mod memory;
pub mod persistent;
pub mod cache;
pub mod prefix;
pub mod pagination;

pub use store::*;
pub use memory::*;
pub use persistent::*;
pub use cache::*;
pub use prefix::*;
pub use pagination::*;

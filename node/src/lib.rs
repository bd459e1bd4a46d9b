//! ACCTREG Node
//!
//! Opens the on-disk registry and runs every mutation inside a write cache
//! that is committed only when the whole operation succeeds.

mod node;

pub use node::*;

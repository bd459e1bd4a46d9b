//! Account Registry Module for ACCTREG
//!
//! Maps addresses to polymorphic account records:
//! - Account number allocation
//! - Address-keyed storage and ordered iteration
//! - Module accounts
//! - Paginated, type-erased query surface
//! - Genesis import/export

pub mod keys;
pub mod account;
pub mod any;
pub mod codec;
pub mod address;
pub mod params;
pub mod sequence;
pub mod keeper;
pub mod query;
pub mod genesis;

pub use keys::*;
pub use account::*;
pub use any::*;
pub use codec::*;
pub use address::*;
pub use params::*;
pub use sequence::*;
pub use keeper::*;
pub use query::*;
pub use genesis::*;

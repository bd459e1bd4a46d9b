//! Address derivation for keys and module accounts

use acctreg_core::Address;

use crate::hashing::{address_hash, ADDRESS_HASH_LEN};

/// Address owned by a module account.
///
/// Module accounts have no key pair; their address is a pure function of the
/// module name so every node derives the same one.
pub fn module_address(name: &str) -> Address {
    from_hash(address_hash(name.as_bytes()))
}

/// Address controlled by a public key
pub fn address_from_public_key(public_key: &[u8]) -> Address {
    from_hash(address_hash(public_key))
}

/// Verify that an address matches a public key
pub fn verify_address(address: &Address, public_key: &[u8]) -> bool {
    address == &address_from_public_key(public_key)
}

fn from_hash(bytes: [u8; ADDRESS_HASH_LEN]) -> Address {
    // a 20-byte hash always satisfies the address length bounds
    Address::new(bytes.to_vec()).unwrap_or_default()
}

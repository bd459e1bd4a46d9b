//! Store key layout for the account registry
//!
//! ```text
//! 0x00                    -> params
//! 0x01 || address bytes   -> encoded account
//! "globalAccountNumber"   -> next account number (u64, big-endian)
//! ```

use acctreg_state::prefix_end_bytes;

/// Key holding the module params
pub const PARAMS_KEY: &[u8] = &[0x00];

/// Prefix shared by every account record key
pub const ADDRESS_STORE_KEY_PREFIX: &[u8] = &[0x01];

/// Key holding the account number counter
pub const GLOBAL_ACCOUNT_NUMBER_KEY: &[u8] = b"globalAccountNumber";

/// Build the store key of the account at `address`
pub fn address_store_key(address: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(ADDRESS_STORE_KEY_PREFIX.len() + address.len());
    key.extend_from_slice(ADDRESS_STORE_KEY_PREFIX);
    key.extend_from_slice(address);
    key
}

/// Address bytes of an account store key
pub fn address_from_store_key(key: &[u8]) -> Option<&[u8]> {
    key.strip_prefix(ADDRESS_STORE_KEY_PREFIX)
}

/// `[lower, upper)` bounding exactly the keys built by `address_store_key`
pub fn account_key_range() -> (Vec<u8>, Option<Vec<u8>>) {
    (
        ADDRESS_STORE_KEY_PREFIX.to_vec(),
        prefix_end_bytes(ADDRESS_STORE_KEY_PREFIX),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_key() {
        let address = [1u8; 20];
        let key = address_store_key(&address);
        assert_eq!(key[0], 0x01);
        assert_eq!(address_from_store_key(&key), Some(&address[..]));
        assert_eq!(address_from_store_key(GLOBAL_ACCOUNT_NUMBER_KEY), None);
    }

    #[test]
    fn test_key_range_covers_accounts_only() {
        let (lower, upper) = account_key_range();
        let upper = upper.unwrap();
        for address in [&[0x00][..], &[0xFF; 32][..], &[0x7F, 0x01][..]] {
            let key = address_store_key(address);
            assert!(key >= lower && key < upper);
        }
        assert!(PARAMS_KEY < lower.as_slice());
        assert!(GLOBAL_ACCOUNT_NUMBER_KEY >= upper.as_slice());
    }

    #[test]
    fn test_keys_preserve_address_order() {
        let a = address_store_key(&[0x01]);
        let b = address_store_key(&[0x01, 0x00]);
        let c = address_store_key(&[0xAA]);
        assert!(a < b && b < c);
    }
}

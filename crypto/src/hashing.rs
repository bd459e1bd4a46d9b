//! Hashing functions using SHA-256

use sha2::{Digest, Sha256};

/// Length of addresses produced by hash truncation
pub const ADDRESS_HASH_LEN: usize = 20;

/// Compute SHA-256 hash of data
pub fn sha256_hash(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 truncated to an address-sized prefix
pub fn address_hash(data: &[u8]) -> [u8; ADDRESS_HASH_LEN] {
    let digest = sha256_hash(data);
    let mut out = [0u8; ADDRESS_HASH_LEN];
    out.copy_from_slice(&digest[..ADDRESS_HASH_LEN]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hash() {
        let data = b"Hello, ACCTREG!";
        let hash1 = sha256_hash(data);
        let hash2 = sha256_hash(data);

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, [0u8; 32]);
    }

    #[test]
    fn test_address_hash_is_prefix() {
        let full = sha256_hash(b"mint");
        let short = address_hash(b"mint");
        assert_eq!(&full[..ADDRESS_HASH_LEN], &short[..]);
    }
}

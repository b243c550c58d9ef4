//! Stable hashing for attribute values.
//!
//! Goals:
//! - Use a stable, explicit hash (not std::DefaultHasher) so that bucket
//!   placement survives toolchain/platform changes.
//! - A file built with one hash kind must be read back with the same kind;
//!   no cross-kind compatibility is promised.

use std::fmt;
use std::hash::Hasher;
use twox_hash::XxHash32;

/// Fixed key for the attribute hash. Buckets on disk depend on it;
/// changing the key invalidates every existing relation.
const ATTR_HASH_SEED: u32 = 0x9747_b28c;

/// Kind of stable hash used for attribute digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashKind {
    /// 32-bit xxhash with a fixed crate-wide seed.
    Xx32Seeded,
}

impl fmt::Display for HashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashKind::Xx32Seeded => write!(f, "xxhash32(seeded)"),
        }
    }
}

/// Default hash kind for new relations.
pub const HASH_KIND_DEFAULT: HashKind = HashKind::Xx32Seeded;

/// Compute the 32-bit stable digest of a byte string for the given kind.
pub fn hash32(kind: HashKind, bytes: &[u8]) -> u32 {
    match kind {
        HashKind::Xx32Seeded => {
            let mut h = XxHash32::with_seed(ATTR_HASH_SEED);
            h.write(bytes);
            h.finish() as u32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_across_calls() {
        let a = hash32(HASH_KIND_DEFAULT, b"alpha");
        let b = hash32(HASH_KIND_DEFAULT, b"alpha");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_inputs_differ() {
        // Не гарантия, но для этих строк коллизии быть не должно.
        let a = hash32(HASH_KIND_DEFAULT, b"alpha");
        let b = hash32(HASH_KIND_DEFAULT, b"bravo");
        assert_ne!(a, b);
    }
}

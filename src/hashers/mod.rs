// mod.rs - Identity hashers module root

pub mod md5;
pub mod registry;
pub mod sha256;
pub mod traits;

// Re-export main types for convenience
pub use md5::Md5Hasher;
pub use registry::HasherRegistry;
pub use sha256::Sha256Hasher;
pub use traits::{normalize_sequence, IdentityHasher, HASH_LENGTH};

/// Identity key with the default (MD5) hasher
pub fn sequence_hash(sequence: &str) -> String {
    Md5Hasher.hash_sequence(sequence)
}

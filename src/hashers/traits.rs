// traits.rs - Core trait for sequence identity hashing

use std::fmt::Debug;

/// Number of hex characters kept from the full digest
pub const HASH_LENGTH: usize = 12;

/// Normalize a raw sequence body: drop all whitespace and upper-case it.
pub fn normalize_sequence(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Trait for content-identity strategies.
/// Implementations only provide the full hex digest; truncation and
/// normalization are shared so every hasher is case- and whitespace-insensitive.
pub trait IdentityHasher: Send + Sync + Debug {
    /// Full lowercase hex digest of the given bytes
    fn digest_hex(&self, bytes: &[u8]) -> String;

    /// Get a human-readable name for this hasher
    fn name(&self) -> &'static str;

    /// Get a description of this hasher
    fn description(&self) -> &'static str;

    /// Compute the 12-character identity key for a sequence
    fn hash_sequence(&self, sequence: &str) -> String {
        let already_normalized = sequence
            .chars()
            .all(|c| !c.is_whitespace() && !c.is_lowercase());
        let mut digest = if already_normalized {
            self.digest_hex(sequence.as_bytes())
        } else {
            self.digest_hex(normalize_sequence(sequence).as_bytes())
        };
        digest.truncate(HASH_LENGTH);
        digest
    }
}

// sha256.rs - SHA256 identity hasher implementation

use super::traits::IdentityHasher;

/// SHA256 hasher - alternative identity key with a wider digest
#[derive(Debug, Clone, Default)]
pub struct Sha256Hasher;

impl IdentityHasher for Sha256Hasher {
    fn digest_hex(&self, bytes: &[u8]) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }

    fn name(&self) -> &'static str {
        "SHA256"
    }

    fn description(&self) -> &'static str {
        "SHA256 digest truncated to 12 hex characters"
    }
}

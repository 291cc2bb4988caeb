// md5.rs - MD5 identity hasher implementation

use super::traits::IdentityHasher;

/// MD5 hasher - default identity key for sequence clustering
#[derive(Debug, Clone, Default)]
pub struct Md5Hasher;

impl IdentityHasher for Md5Hasher {
    fn digest_hex(&self, bytes: &[u8]) -> String {
        format!("{:x}", md5::compute(bytes))
    }

    fn name(&self) -> &'static str {
        "MD5"
    }

    fn description(&self) -> &'static str {
        "MD5 digest truncated to 12 hex characters (default)"
    }
}

// registry.rs - Hasher registry for managing available identity hashers

use super::traits::IdentityHasher;
use super::{Md5Hasher, Sha256Hasher};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry for available hashers
pub struct HasherRegistry {
    hashers: HashMap<String, Arc<dyn IdentityHasher>>,
}

impl HasherRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            hashers: HashMap::new(),
        };

        registry.register_hasher("md5", Arc::new(Md5Hasher));
        registry.register_hasher("sha256", Arc::new(Sha256Hasher));

        registry
    }

    /// Register a new hasher
    pub fn register_hasher(&mut self, name: &str, hasher: Arc<dyn IdentityHasher>) {
        self.hashers.insert(name.to_string(), hasher);
    }

    /// Get a shared handle to a hasher by name
    pub fn get_hasher(&self, name: &str) -> Option<Arc<dyn IdentityHasher>> {
        self.hashers.get(name).cloned()
    }

    /// List all available hashers as (registry key, description), sorted by key
    pub fn list_hashers(&self) -> Vec<(&str, &str)> {
        let mut listed: Vec<_> = self
            .hashers
            .iter()
            .map(|(key, h)| (key.as_str(), h.description()))
            .collect();
        listed.sort();
        listed
    }

    /// Get all registered keys, sorted
    pub fn get_hasher_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.hashers.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }
}

impl Default for HasherRegistry {
    fn default() -> Self {
        Self::new()
    }
}

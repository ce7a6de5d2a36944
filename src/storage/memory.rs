use std::collections::HashMap;
use std::sync::RwLock;

use super::repo::SaveStore;

/// Process-local store. Used by tests and when the database cannot be opened.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl SaveStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) -> Result<(), String> {
        let mut entries = self.entries.write().map_err(|e| e.to_string())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load() {
        let store = MemoryStore::default();
        assert_eq!(store.load("k"), None);
        store.save("k", "v1").unwrap();
        store.save("k", "v2").unwrap();
        assert_eq!(store.load("k").as_deref(), Some("v2"));
    }
}

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::KeyValueStore;
use crate::{Error, Result};

/// In-process store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(key: &str) -> Error {
    Error::storage(key, "store lock poisoned")
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| poisoned(key))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned(key))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned(key))?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = self.entries.read().map_err(|_| poisoned("*"))?;
        Ok(entries.keys().cloned().collect())
    }
}

// ============================================================================
// Module : store
// ============================================================================
// Persistance locale : un port clé-valeur et le magasin des favoris
//
// CONCEPT RUST : Injection de dépendance par trait
// - FavoritesStore<S: KeyValueStore> ne connaît pas le support réel
// - En production : JsonFileStore (fichier JSON)
// - En test : MemoryStore (HashMap en mémoire)
// ============================================================================

pub mod favorites;  // Magasin des favoris (write-through)
pub mod file;       // Implémentation fichier JSON

use std::collections::HashMap;

use crate::error::StoreError;

pub use favorites::{FavoritesStore, FAVORITES_KEY};
pub use file::JsonFileStore;

/// Port clé-valeur (chaînes → chaînes)
pub trait KeyValueStore {
    /// Lit une valeur ; Ok(None) si la clé est absente
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Écrit une valeur immédiatement
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

// CONCEPT RUST : Blanket impl
// - Box<dyn KeyValueStore> est lui-même un KeyValueStore
// - Permet à l'App de choisir le support à l'exécution
impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// Magasin en mémoire, sans persistance
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pré-remplit une entrée
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));

        let seeded = MemoryStore::new().with_entry("a", "1");
        assert_eq!(seeded.get("a").unwrap(), Some("1".to_string()));
    }
}

// ============================================================================
// Structure : JsonFileStore
// ============================================================================
// Magasin clé-valeur persisté dans un fichier JSON unique :
//   { "currencyFavorites": "[\"EUR\",\"GBP\"]" }
//
// CONCEPTS RUST :
// 1. PathBuf : chemin possédé, indépendant de la plateforme
// 2. std::fs : lecture/écriture complètes du fichier
// 3. Écriture atomique : fichier temporaire puis rename
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::store::KeyValueStore;

/// Nom du fichier dans le répertoire de données
pub const STORE_FILE_NAME: &str = "favorites.json";

/// Magasin clé-valeur sauvegardé sur disque
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Magasin pour un fichier donné (créé à la première écriture)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Magasin dans un répertoire de données (ex: ~/.local/share/lazyfx)
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STORE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lit toutes les entrées ; un fichier absent équivaut à un magasin vide
    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = ?self.path, entries = entries.len(), "Store file written");
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    /// Un fichier illisible est remplacé plutôt que de bloquer l'écriture
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            Err(StoreError::Serde(e)) => {
                warn!(path = ?self.path, error = %e, "Store file is corrupt, rewriting it");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn test_set_then_get_across_instances() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("lazyfx");

        let mut store = JsonFileStore::in_dir(&nested);
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.set("a", "3").unwrap();

        let reopened = JsonFileStore::in_dir(&nested);
        assert_eq!(reopened.get("a").unwrap(), Some("3".to_string()));
        assert_eq!(reopened.get("b").unwrap(), Some("2".to_string()));
        assert!(!nested.join("favorites.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.get("a"), Err(StoreError::Serde(_))));
    }

    #[test]
    fn test_set_rewrites_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        let mut store = JsonFileStore::new(&path);
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get("a").unwrap(), Some("1".to_string()));
        assert_eq!(reopened.get("b").unwrap(), Some("2".to_string()));
    }
}

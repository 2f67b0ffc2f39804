// ============================================================================
// Structure : FavoritesStore
// ============================================================================
// Favoris de l'utilisateur, chargés une fois au démarrage et réécrits à
// chaque basculement (write-through, pas de batch)
//
// CONCEPTS RUST :
// 1. Générique S: KeyValueStore : le support de persistance est injecté
// 2. Dégradation gracieuse : une donnée illisible donne un ensemble vide
// ============================================================================

use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::models::{currency, FavoritesSet};
use crate::store::KeyValueStore;

/// Clé sous laquelle la liste des favoris est enregistrée
pub const FAVORITES_KEY: &str = "currencyFavorites";

/// Magasin des devises favorites
#[derive(Debug)]
pub struct FavoritesStore<S: KeyValueStore> {
    store: S,
    favorites: FavoritesSet,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    /// Charge les favoris depuis le magasin
    ///
    /// Une clé absente donne un ensemble vide ; une valeur illisible aussi,
    /// avec un avertissement dans les logs. Les codes hors catalogue sont
    /// écartés, les autres sont normalisés en majuscules.
    pub fn load(store: S) -> Self {
        let favorites = match store.get(FAVORITES_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(codes) => FavoritesSet::from_codes(codes.into_iter().filter_map(|code| {
                    let found = currency::find(&code).map(|c| c.code);
                    if found.is_none() {
                        warn!(code = %code, "Ignoring unsupported stored favorite");
                    }
                    found
                })),
                Err(e) => {
                    warn!(error = %e, "Stored favorites are not a JSON list, starting empty");
                    FavoritesSet::new()
                }
            },
            Ok(None) => {
                debug!("No stored favorites");
                FavoritesSet::new()
            }
            Err(e) => {
                warn!(error = %e, "Failed to read favorites, starting empty");
                FavoritesSet::new()
            }
        };

        info!(count = favorites.len(), "Favorites loaded");
        Self { store, favorites }
    }

    /// Bascule un code et persiste immédiatement la nouvelle liste
    ///
    /// L'ensemble en mémoire est modifié même si l'écriture échoue.
    pub fn toggle(&mut self, code: &str) -> Result<&FavoritesSet, StoreError> {
        let now_favorite = self.favorites.toggle(code);
        info!(code = %code, favorite = now_favorite, "Favorite toggled");

        let serialized = serde_json::to_string(&self.favorites)?;
        self.store.set(FAVORITES_KEY, &serialized)?;
        Ok(&self.favorites)
    }

    pub fn is_favorite(&self, code: &str) -> bool {
        self.favorites.contains(code)
    }

    pub fn favorites(&self) -> &FavoritesSet {
        &self.favorites
    }

    #[cfg(test)]
    fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{JsonFileStore, MemoryStore};
    use tempfile::TempDir;

    #[test]
    fn test_absent_key_gives_empty_set() {
        let favorites = FavoritesStore::load(MemoryStore::new());
        assert!(favorites.favorites().is_empty());
    }

    #[test]
    fn test_corrupt_value_gives_empty_set() {
        let store = MemoryStore::new().with_entry(FAVORITES_KEY, "{oops");
        let favorites = FavoritesStore::load(store);
        assert!(favorites.favorites().is_empty());
    }

    #[test]
    fn test_load_existing_list() {
        let store = MemoryStore::new().with_entry(FAVORITES_KEY, r#"["EUR","JPY","EUR"]"#);
        let favorites = FavoritesStore::load(store);
        assert!(favorites.is_favorite("EUR"));
        assert!(favorites.is_favorite("JPY"));
        assert!(!favorites.is_favorite("USD"));
        assert_eq!(favorites.favorites().len(), 2);
    }

    #[test]
    fn test_load_drops_unsupported_codes() {
        let store = MemoryStore::new().with_entry(FAVORITES_KEY, r#"["BTC","EUR","usd","EUR"]"#);
        let favorites = FavoritesStore::load(store);
        assert_eq!(favorites.favorites().iter().collect::<Vec<_>>(), vec!["EUR", "USD"]);
    }

    #[test]
    fn test_corrupt_file_still_saves_toggles() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("favorites.json"), "{ not json").unwrap();

        let mut first = FavoritesStore::load(JsonFileStore::in_dir(dir.path()));
        assert!(first.favorites().is_empty());
        assert!(first.toggle("GBP").is_ok());
        assert!(first.toggle("EUR").is_ok());

        let second = FavoritesStore::load(JsonFileStore::in_dir(dir.path()));
        assert_eq!(second.favorites().iter().collect::<Vec<_>>(), vec!["GBP", "EUR"]);
    }

    #[test]
    fn test_toggle_writes_through() {
        let mut favorites = FavoritesStore::load(MemoryStore::new());
        favorites.toggle("GBP").unwrap();

        let stored = favorites.store().get(FAVORITES_KEY).unwrap();
        assert_eq!(stored.as_deref(), Some(r#"["GBP"]"#));
    }

    #[test]
    fn test_toggle_twice_restores_set() {
        let store = MemoryStore::new().with_entry(FAVORITES_KEY, r#"["EUR","JPY"]"#);
        let mut favorites = FavoritesStore::load(store);
        let before = favorites.favorites().clone();

        favorites.toggle("GBP").unwrap();
        assert!(favorites.is_favorite("GBP"));
        let after = favorites.toggle("GBP").unwrap().clone();

        assert_eq!(after, before);
        assert_eq!(
            favorites.store().get(FAVORITES_KEY).unwrap().as_deref(),
            Some(r#"["EUR","JPY"]"#)
        );
    }

    #[test]
    fn test_persisted_across_sessions() {
        let dir = TempDir::new().unwrap();

        let mut first = FavoritesStore::load(JsonFileStore::in_dir(dir.path()));
        first.toggle("CHF").unwrap();
        first.toggle("SEK").unwrap();

        let second = FavoritesStore::load(JsonFileStore::in_dir(dir.path()));
        assert_eq!(second.favorites().iter().collect::<Vec<_>>(), vec!["CHF", "SEK"]);
    }
}

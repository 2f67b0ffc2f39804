// ============================================================================
// Structure : FavoritesSet
// ============================================================================
// Liste ordonnée des devises favorites, sans doublon
//
// CONCEPTS RUST :
// 1. #[serde(transparent)] : sérialisé comme la liste interne ["EUR","GBP"]
// 2. Vec + retain : suppression en conservant l'ordre des autres éléments
// ============================================================================

use serde::{Deserialize, Serialize};

/// Ensemble ordonné de codes devise marqués par l'utilisateur
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoritesSet {
    codes: Vec<String>,
}

impl FavoritesSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construit l'ensemble depuis une liste, en ignorant les doublons
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for code in codes {
            let code = code.into();
            if !set.contains(&code) {
                set.codes.push(code);
            }
        }
        set
    }

    /// Ajoute le code en fin de liste s'il est absent, le retire sinon
    ///
    /// Retourne true si le code est favori après l'appel.
    pub fn toggle(&mut self, code: &str) -> bool {
        if self.contains(code) {
            self.codes.retain(|c| c != code);
            false
        } else {
            self.codes.push(code.to_string());
            true
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    /// N-ième favori (0-indexé)
    pub fn get(&self, index: usize) -> Option<&str> {
        self.codes.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

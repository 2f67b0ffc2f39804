// ============================================================================
// Types d'erreurs
// ============================================================================
// Toutes les erreurs de la bibliothèque sont typées et récupérables :
// - FetchError : échec de récupération des taux (remplacés par le fallback)
// - ParseError : montant saisi invalide (recalcul suspendu)
// - StoreError : échec de lecture/écriture des favoris (état mémoire conservé)
//
// CONCEPT RUST : thiserror
// - #[derive(Error)] génère l'implémentation de std::error::Error
// - #[error("...")] définit le message de Display
// - #[from] génère la conversion automatique utilisée par l'opérateur ?
// ============================================================================

use thiserror::Error;

/// Échec lors de la récupération des taux de change
#[derive(Debug, Error)]
pub enum FetchError {
    /// Erreur réseau (DNS, connexion, timeout, ...)
    #[error("Échec de la requête HTTP vers le service de taux : {0}")]
    Network(#[from] reqwest::Error),

    /// Le service a répondu avec un statut non-2xx
    #[error("Le service de taux a retourné une erreur : HTTP {0}")]
    Status(u16),

    /// Corps de réponse inattendu (pas de JSON, pas de champ `rates`, ...)
    #[error("Réponse du service de taux invalide : {0}")]
    Malformed(String),
}

/// Montant saisi qui ne représente pas un nombre fini
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Montant vide")]
    Empty,

    #[error("Montant invalide : {0:?}")]
    Invalid(String),

    #[error("Montant non fini : {0:?}")]
    NonFinite(String),
}

/// Raison pour laquelle un recalcul de conversion n'a pas eu lieu
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error(transparent)]
    Amount(#[from] ParseError),

    #[error("Aucun taux connu pour {0}")]
    MissingRate(String),
}

/// Échec du stockage clé-valeur local
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Erreur d'entrée/sortie : {0}")]
    Io(#[from] std::io::Error),

    #[error("Erreur de sérialisation : {0}")]
    Serde(#[from] serde_json::Error),
}

// ============================================================================
// LazyFx - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;       // Service de taux de change
pub mod app;       // État de l'application
pub mod config;    // Configuration (fichier TOML)
pub mod error;     // Types d'erreurs
pub mod models;    // Structures de données
pub mod store;     // Persistance des favoris
pub mod ui;        // Interface utilisateur

// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod conversion; // Machine à états de la conversion
pub mod currency;   // Catalogue des devises
pub mod favorites;  // Ensemble ordonné des favoris
pub mod money;      // Formatage monétaire
pub mod rates;      // Tables de taux et table de repli

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use lazyfx::models::conversion::ConversionState;
// On peut faire : use lazyfx::models::ConversionState;
pub use conversion::{ConversionState, FetchTicket, Phase};
pub use currency::CurrencyDescriptor;
pub use favorites::FavoritesSet;
pub use money::format_money;
pub use rates::{RateMapping, RateOrigin, RateOutcome};

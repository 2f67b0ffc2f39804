// ============================================================================
// Module : api
// ============================================================================
// Ce module contient le client du service de taux de change et la
// politique de repli en cas d'échec
// ============================================================================

pub mod exchange_rate;  // Client API taux de change

// Re-export des fonctions principales
pub use exchange_rate::{fetch_rates_or_fallback, ExchangeRateApi, RateSource};

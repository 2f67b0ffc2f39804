// ============================================================================
// API Client : service de taux de change
// ============================================================================
// Récupère tous les taux relatifs à une devise de base
// (GET <base_url>/<CODE> → { "rates": { "EUR": 0.85, ... } })
//
// CONCEPTS RUST AVANCÉS :
// 1. async-trait : trait async pour rendre la source interchangeable (tests)
// 2. Result<T, FetchError> : erreurs typées, récupérées par le fallback
// 3. Serde : désérialisation JSON du champ `rates`
// ============================================================================

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::error::FetchError;
use crate::models::{RateMapping, RateOrigin, RateOutcome};

/// URL par défaut du service de taux
pub const DEFAULT_API_BASE_URL: &str = "https://api.exchangerate-api.com/v4/latest";

// ============================================================================
// Trait : RateSource
// ============================================================================
// CONCEPT RUST : Trait objects + async
// - Les méthodes async dans les traits passent par #[async_trait]
// - Send + Sync : la source est partagée entre tâches tokio via Arc
// ============================================================================

/// Source de taux de change
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Récupère les taux relatifs à `base`
    async fn fetch_rates(&self, base: &str) -> Result<RateMapping, FetchError>;
}

// ============================================================================
// Structures pour parser la réponse JSON
// ============================================================================
// Seul le champ `rates` est lu, le reste de la réponse est ignoré.
// Les valeurs sont lues en serde_json::Value pour pouvoir écarter une
// entrée invalide sans rejeter toute la réponse.
// ============================================================================

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, serde_json::Value>,
}

/// Client HTTP du service de taux
pub struct ExchangeRateApi {
    client: reqwest::Client,
    base_url: String,
}

impl ExchangeRateApi {
    /// Crée un client pour `base_url` avec un timeout par requête
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("lazyfx/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Construit l'URL pour une devise de base
    fn url_for(&self, base: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), base)
    }
}

#[async_trait]
impl RateSource for ExchangeRateApi {
    #[instrument(skip(self))]
    async fn fetch_rates(&self, base: &str) -> Result<RateMapping, FetchError> {
        let url = self.url_for(base);
        debug!(url = %url, "Sending HTTP request to rate service");

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            error!(status = %status, "Rate service returned error status");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let rates = parse_rates_body(&body)?;

        info!(count = rates.len(), "Successfully fetched exchange rates");
        Ok(rates)
    }
}

/// Parse le corps JSON et extrait la table des taux
///
/// Les entrées non numériques, nulles ou négatives sont ignorées ;
/// une table vide est considérée comme une réponse invalide.
pub fn parse_rates_body(body: &str) -> Result<RateMapping, FetchError> {
    let response: RatesResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    let mut rates = RateMapping::new();
    let mut skipped = 0;

    for (code, value) in response.rates {
        let accepted = value
            .as_f64()
            .map_or(false, |rate| rates.insert(code.clone(), rate));

        if !accepted {
            skipped += 1;
            warn!(code = %code, value = %value, "Skipping invalid rate entry");
        }
    }

    if skipped > 0 {
        debug!(skipped, kept = rates.len(), "Finished parsing rates");
    }

    if rates.is_empty() {
        return Err(FetchError::Malformed("aucun taux exploitable".to_string()));
    }

    Ok(rates)
}

/// Récupère les taux, ou la table de repli en cas d'échec
///
/// CONCEPT : Dégradation gracieuse
/// - Ok(rates) → RateOrigin::Live
/// - Err(_)    → table de repli, identique quelle que soit la base
/// - Dans les deux cas, fetched_at est l'heure de fin de l'appel
pub async fn fetch_rates_or_fallback<S>(source: &S, base: &str) -> RateOutcome
where
    S: RateSource + ?Sized,
{
    let (rates, origin) = match source.fetch_rates(base).await {
        Ok(rates) => (rates, RateOrigin::Live),
        Err(e) => {
            warn!(base = %base, error = %e, "Rate fetch failed, using fallback rates");
            (RateMapping::fallback(), RateOrigin::Fallback)
        }
    };

    RateOutcome {
        base: base.to_string(),
        rates,
        origin,
        fetched_at: Local::now().format("%H:%M:%S").to_string(),
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

// ============================================================================
// Structure : RateMapping
// ============================================================================
// Table des taux de change relatifs à une unité de la devise de base
//
// CONCEPTS RUST :
// 1. Newtype pattern : encapsule un BTreeMap pour garantir l'invariant
//    (uniquement des taux positifs et finis)
// 2. BTreeMap : ordre déterministe des codes (affichage, logs, tests)
// 3. FromIterator : construire la table avec .collect()
// ============================================================================

use std::collections::BTreeMap;

/// Taux de repli utilisés quand le service est indisponible
///
/// Exprimés par rapport à l'USD, quelle que soit la base demandée.
pub const FALLBACK_RATES: [(&str, f64); 6] = [
    ("USD", 1.0),
    ("EUR", 0.85),
    ("GBP", 0.73),
    ("JPY", 110.0),
    ("AUD", 1.35),
    ("CAD", 1.25),
];

/// Table code devise → taux
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateMapping {
    rates: BTreeMap<String, f64>,
}

impl RateMapping {
    /// Crée une table vide
    pub fn new() -> Self {
        Self::default()
    }

    /// Table de repli, identique à chaque appel
    pub fn fallback() -> Self {
        FALLBACK_RATES
            .iter()
            .map(|&(code, rate)| (code.to_string(), rate))
            .collect()
    }

    /// Insère un taux s'il est strictement positif et fini
    ///
    /// Retourne false si le taux a été rejeté.
    pub fn insert(&mut self, code: impl Into<String>, rate: f64) -> bool {
        if rate.is_finite() && rate > 0.0 {
            self.rates.insert(code.into(), rate);
            true
        } else {
            false
        }
    }

    /// Taux pour un code, s'il est connu
    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

// ============================================================================
// Structure : RateOutcome
// ============================================================================
// Résultat d'une récupération de taux, succès ou repli
// ============================================================================

/// Provenance des taux d'un RateOutcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateOrigin {
    /// Taux récupérés depuis le service distant
    Live,

    /// Table de repli substituée après un échec
    Fallback,
}

/// Taux obtenus pour une devise de base, avec l'heure de fin de requête
#[derive(Debug, Clone, PartialEq)]
pub struct RateOutcome {
    pub base: String,
    pub rates: RateMapping,
    pub origin: RateOrigin,

    /// Heure locale de fin de la requête (ex: "14:32:05")
    pub fetched_at: String,
}

impl RateOutcome {
    pub fn is_fallback(&self) -> bool {
        self.origin == RateOrigin::Fallback
    }
}

// ============================================================================
// Trait FromIterator
// ============================================================================
// CONCEPT RUST : FromIterator
// - Permet d'écrire iter.collect::<RateMapping>()
// - Les taux invalides sont ignorés (même règle que insert)
// ============================================================================

impl FromIterator<(String, f64)> for RateMapping {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut mapping = RateMapping::new();
        for (code, rate) in iter {
            mapping.insert(code, rate);
        }
        mapping
    }
}

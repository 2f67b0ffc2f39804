// ============================================================================
// Structure : ConversionState
// ============================================================================
// Machine à états de la conversion : montant, devises, taux, résultat
//
// CONCEPTS RUST :
// 1. Enum Phase : état explicite (Idle, Loading, Ready, Degraded)
// 2. Result<T, E> : un recalcul impossible est une branche Err explicite,
//    l'utilisateur ne voit aucune erreur, l'ancien résultat est conservé
// 3. Ticket de requête : numéro croissant pour ignorer les réponses périmées
//
// TRANSITIONS :
// - Idle → Loading       : première requête de taux
// - Loading → Ready      : réponse du service appliquée
// - Loading → Degraded   : table de repli appliquée
// - Ready/Degraded       : montant et devise cible modifiables sans requête
// - * → Loading          : changement de devise source, swap, refresh
// ============================================================================

use tracing::{debug, warn};

use crate::error::{ConversionError, ParseError};
use crate::models::rates::{RateMapping, RateOrigin, RateOutcome};

/// Phase de la machine à états
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Aucune requête encore émise
    Idle,

    /// Requête de taux en cours
    Loading,

    /// Taux du service appliqués
    Ready,

    /// Table de repli appliquée
    Degraded,
}

/// Identifiant d'une requête de taux émise par la machine à états
///
/// Seule la réponse portant le ticket le plus récent est appliquée.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub base: String,
}

/// État de la conversion
#[derive(Debug, Clone)]
pub struct ConversionState {
    /// Montant saisi, conservé tel quel (jamais normalisé)
    amount: String,
    source_currency: String,
    target_currency: String,
    rates: RateMapping,
    converted_amount: f64,
    phase: Phase,

    /// Heure de la dernière réponse appliquée ("" avant la première)
    last_updated: String,

    /// Numéro du dernier ticket émis (0 = aucun)
    latest_request: u64,
}

impl ConversionState {
    /// Crée l'état initial
    pub fn new(
        amount: impl Into<String>,
        source_currency: impl Into<String>,
        target_currency: impl Into<String>,
    ) -> Self {
        Self {
            amount: amount.into(),
            source_currency: source_currency.into(),
            target_currency: target_currency.into(),
            rates: RateMapping::new(),
            converted_amount: 0.0,
            phase: Phase::Idle,
            last_updated: String::new(),
            latest_request: 0,
        }
    }

    // ========================================================================
    // Accesseurs
    // ========================================================================

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn source_currency(&self) -> &str {
        &self.source_currency
    }

    pub fn target_currency(&self) -> &str {
        &self.target_currency
    }

    pub fn rates(&self) -> &RateMapping {
        &self.rates
    }

    pub fn converted_amount(&self) -> f64 {
        self.converted_amount
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn last_updated(&self) -> &str {
        &self.last_updated
    }

    /// Taux de la devise cible dans la table courante
    pub fn rate_for_target(&self) -> Option<f64> {
        self.rates.get(&self.target_currency)
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Enregistre le montant brut et recalcule
    pub fn set_amount(&mut self, raw: impl Into<String>) {
        self.amount = raw.into();
        self.recompute_and_log();
    }

    /// Change la devise source et émet une nouvelle requête
    ///
    /// Sélectionner la devise déjà active ne déclenche rien (None).
    pub fn set_source_currency(&mut self, code: &str) -> Option<FetchTicket> {
        if self.source_currency == code {
            return None;
        }
        self.source_currency = code.to_string();
        Some(self.begin_fetch())
    }

    /// Change la devise cible et recalcule avec les taux existants
    pub fn set_target_currency(&mut self, code: &str) {
        self.target_currency = code.to_string();
        self.recompute_and_log();
    }

    /// Échange source et cible
    ///
    /// Le résultat est recalculé avec les taux courants pour la nouvelle
    /// cible, puis une requête est émise pour la nouvelle source.
    pub fn swap(&mut self) -> Option<FetchTicket> {
        if self.source_currency == self.target_currency {
            return None;
        }
        std::mem::swap(&mut self.source_currency, &mut self.target_currency);
        self.recompute_and_log();
        Some(self.begin_fetch())
    }

    /// Relance une requête pour la devise source courante
    pub fn refresh(&mut self) -> FetchTicket {
        self.begin_fetch()
    }

    /// Émet un ticket pour la devise source courante et passe en Loading
    ///
    /// CONCEPT : Jeton de séquence monotone
    /// - Chaque requête reçoit un numéro strictement croissant
    /// - Une réponse n'est appliquée que si son numéro est le dernier émis
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_request += 1;
        self.phase = Phase::Loading;
        FetchTicket {
            seq: self.latest_request,
            base: self.source_currency.clone(),
        }
    }

    /// Applique une réponse de taux si elle correspond au dernier ticket
    ///
    /// Retourne false si la réponse est périmée (ignorée).
    pub fn apply_rates(&mut self, seq: u64, outcome: RateOutcome) -> bool {
        if seq != self.latest_request {
            debug!(
                seq,
                latest = self.latest_request,
                base = %outcome.base,
                "Discarding stale rate response"
            );
            return false;
        }

        self.phase = match outcome.origin {
            RateOrigin::Live => Phase::Ready,
            RateOrigin::Fallback => Phase::Degraded,
        };
        self.rates = outcome.rates;
        self.last_updated = outcome.fetched_at;
        self.recompute_and_log();
        true
    }

    /// Recalcule le montant converti à partir de l'état courant
    ///
    /// En cas d'Err, converted_amount garde sa valeur précédente.
    pub fn recompute(&mut self) -> Result<f64, ConversionError> {
        let value = convert(&self.amount, &self.rates, &self.target_currency)?;
        self.converted_amount = value;
        Ok(value)
    }

    fn recompute_and_log(&mut self) {
        match self.recompute() {
            Ok(value) => debug!(converted = value, "Recomputed converted amount"),
            Err(ConversionError::Amount(e)) => {
                debug!(reason = %e, "Amount not usable, keeping previous result")
            }
            Err(e @ ConversionError::MissingRate(_)) => {
                warn!(reason = %e, "Target rate unavailable, keeping previous result")
            }
        }
    }
}

// ============================================================================
// Fonctions pures
// ============================================================================

/// Convertit un montant brut avec la table de taux
///
/// CONCEPT RUST : Opérateur ? sur des erreurs différentes
/// - parse_amount retourne ParseError
/// - ? le convertit en ConversionError grâce à #[from]
pub fn convert(raw: &str, rates: &RateMapping, target: &str) -> Result<f64, ConversionError> {
    let amount = parse_amount(raw)?;
    let rate = rates
        .get(target)
        .ok_or_else(|| ConversionError::MissingRate(target.to_string()))?;
    Ok(amount * rate)
}

/// Parse un montant saisi en nombre fini
pub fn parse_amount(raw: &str) -> Result<f64, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let value: f64 = trimmed
        .parse()
        .map_err(|_| ParseError::Invalid(raw.to_string()))?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParseError::NonFinite(raw.to_string()))
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn outcome(base: &str, rates: RateMapping, origin: RateOrigin) -> RateOutcome {
        RateOutcome {
            base: base.to_string(),
            rates,
            origin,
            fetched_at: "12:00:00".to_string(),
        }
    }

    fn rates(entries: &[(&str, f64)]) -> RateMapping {
        entries.iter().map(|&(c, r)| (c.to_string(), r)).collect()
    }

    #[test]
    fn test_initial_state() {
        let state = ConversionState::new("1", "USD", "EUR");
        assert_eq!(state.phase(), Phase::Idle);
        assert!(!state.is_loading());
        assert_eq!(state.converted_amount(), 0.0);
        assert_eq!(state.last_updated(), "");
    }

    #[test]
    fn test_scenario_usd_to_eur() {
        let mut state = ConversionState::new("100", "USD", "EUR");
        let ticket = state.begin_fetch();
        assert!(state.is_loading());

        let applied = state.apply_rates(
            ticket.seq,
            outcome("USD", rates(&[("EUR", 0.85)]), RateOrigin::Live),
        );

        assert!(applied);
        assert_eq!(state.phase(), Phase::Ready);
        assert_relative_eq!(state.converted_amount(), 85.0, epsilon = 1e-9);
        assert_eq!(
            crate::models::money::format_money(state.converted_amount(), state.target_currency()),
            "€85.00"
        );
        assert_eq!(state.last_updated(), "12:00:00");
    }

    #[test]
    fn test_scenario_fallback_then_jpy() {
        let mut state = ConversionState::new("3", "USD", "EUR");
        let ticket = state.begin_fetch();
        state.apply_rates(
            ticket.seq,
            outcome("USD", RateMapping::fallback(), RateOrigin::Fallback),
        );
        assert_eq!(state.phase(), Phase::Degraded);

        state.set_target_currency("JPY");
        assert_relative_eq!(state.converted_amount(), 330.0, epsilon = 1e-9);
        // Pas de nouvelle requête pour un changement de cible
        assert_eq!(state.phase(), Phase::Degraded);
    }

    #[test]
    fn test_converted_amount_tracks_amount_and_rate() {
        let mut state = ConversionState::new("1", "USD", "GBP");
        let ticket = state.begin_fetch();
        state.apply_rates(ticket.seq, outcome("USD", RateMapping::fallback(), RateOrigin::Live));

        for (raw, expected) in [("2", 1.46), ("10.5", 7.665), ("  4 ", 2.92), ("1e3", 730.0)] {
            state.set_amount(raw);
            assert_relative_eq!(state.converted_amount(), expected, epsilon = 1e-9);
            assert_eq!(state.amount(), raw);
        }
    }

    #[test]
    fn test_malformed_amount_keeps_previous_value() {
        let mut state = ConversionState::new("100", "USD", "EUR");
        let ticket = state.begin_fetch();
        state.apply_rates(ticket.seq, outcome("USD", RateMapping::fallback(), RateOrigin::Live));
        assert_relative_eq!(state.converted_amount(), 85.0, epsilon = 1e-9);

        for raw in ["", "   ", "abc", "12abc", "NaN", "inf", "-"] {
            state.set_amount(raw);
            assert_relative_eq!(state.converted_amount(), 85.0, epsilon = 1e-9);
            assert_eq!(state.amount(), raw);
        }
    }

    #[test]
    fn test_recompute_reports_reason() {
        let mut state = ConversionState::new("abc", "USD", "EUR");
        assert_eq!(
            state.recompute(),
            Err(ConversionError::Amount(ParseError::Invalid("abc".to_string())))
        );

        state.set_amount("5");
        assert_eq!(
            state.recompute(),
            Err(ConversionError::MissingRate("EUR".to_string()))
        );
    }

    #[test]
    fn test_missing_target_rate_keeps_previous_value() {
        let mut state = ConversionState::new("10", "USD", "EUR");
        let ticket = state.begin_fetch();
        state.apply_rates(ticket.seq, outcome("USD", RateMapping::fallback(), RateOrigin::Fallback));
        assert_relative_eq!(state.converted_amount(), 8.5, epsilon = 1e-9);

        // CHF absent de la table de repli
        state.set_target_currency("CHF");
        assert_eq!(state.target_currency(), "CHF");
        assert_relative_eq!(state.converted_amount(), 8.5, epsilon = 1e-9);
        assert_eq!(state.rate_for_target(), None);
    }

    #[test]
    fn test_swap_is_an_involution() {
        let mut state = ConversionState::new("1", "USD", "EUR");

        let first = state.swap().unwrap();
        assert_eq!(first.base, "EUR");
        assert_eq!((state.source_currency(), state.target_currency()), ("EUR", "USD"));

        let second = state.swap().unwrap();
        assert_eq!(second.base, "USD");
        assert_eq!((state.source_currency(), state.target_currency()), ("USD", "EUR"));
        assert!(second.seq > first.seq);
    }

    #[test]
    fn test_swap_recomputes_with_current_rates() {
        let mut state = ConversionState::new("100", "USD", "EUR");
        let ticket = state.begin_fetch();
        state.apply_rates(ticket.seq, outcome("USD", RateMapping::fallback(), RateOrigin::Fallback));
        assert_relative_eq!(state.converted_amount(), 85.0, epsilon = 1e-9);

        state.swap().unwrap();
        assert_eq!(state.target_currency(), "USD");
        assert!(state.is_loading());
        let expected = 100.0 * state.rate_for_target().unwrap();
        assert_relative_eq!(state.converted_amount(), expected, epsilon = 1e-9);
        assert_relative_eq!(state.converted_amount(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_swap_same_currency_is_noop() {
        let mut state = ConversionState::new("1", "USD", "USD");
        assert!(state.swap().is_none());
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_source_change_enters_loading() {
        let mut state = ConversionState::new("1", "USD", "EUR");
        let ticket = state.begin_fetch();
        state.apply_rates(ticket.seq, outcome("USD", RateMapping::fallback(), RateOrigin::Live));
        assert_eq!(state.phase(), Phase::Ready);

        assert!(state.set_source_currency("USD").is_none());
        assert_eq!(state.phase(), Phase::Ready);

        let ticket = state.set_source_currency("GBP").unwrap();
        assert_eq!(ticket.base, "GBP");
        assert!(state.is_loading());

        // Le montant reste modifiable pendant le chargement
        state.set_amount("2");
        assert!(state.is_loading());
        assert_relative_eq!(state.converted_amount(), 1.7, epsilon = 1e-9);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut state = ConversionState::new("1", "USD", "JPY");
        let old = state.set_source_currency("EUR").unwrap();
        let new = state.set_source_currency("GBP").unwrap();

        // La réponse la plus récente arrive en premier
        assert!(state.apply_rates(new.seq, outcome("GBP", rates(&[("JPY", 150.0)]), RateOrigin::Live)));
        assert!(!state.apply_rates(old.seq, outcome("EUR", rates(&[("JPY", 130.0)]), RateOrigin::Live)));

        assert_relative_eq!(state.converted_amount(), 150.0, epsilon = 1e-9);
        assert_eq!(state.phase(), Phase::Ready);
    }

    #[test]
    fn test_refresh_issues_new_ticket() {
        let mut state = ConversionState::new("1", "CAD", "EUR");
        let first = state.refresh();
        let second = state.refresh();
        assert_eq!(first.base, "CAD");
        assert_eq!(second.seq, first.seq + 1);
        assert!(!state.apply_rates(first.seq, outcome("CAD", RateMapping::fallback(), RateOrigin::Live)));
        assert!(state.is_loading());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("42"), Ok(42.0));
        assert_eq!(parse_amount(" 0.5 "), Ok(0.5));
        assert_eq!(parse_amount(""), Err(ParseError::Empty));
        assert_eq!(parse_amount("1,5"), Err(ParseError::Invalid("1,5".to_string())));
        assert_eq!(parse_amount("inf"), Err(ParseError::NonFinite("inf".to_string())));
    }
}

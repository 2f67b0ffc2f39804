// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Trait objects : le magasin des favoris est un Box<dyn KeyValueStore>
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - Les méthodes qui changent la devise source retournent un FetchTicket
//   que l'event loop transmet au runtime async
// ============================================================================

use tracing::{debug, error, info};

use crate::models::{currency, ConversionState, CurrencyDescriptor, FavoritesSet, FetchTicket, RateOutcome};
use crate::store::{FavoritesStore, KeyValueStore};

/// Nombre de ticks (250ms) pendant lesquels le résultat reste en surbrillance
pub const RESULT_PULSE_TICKS: u8 = 3;

/// Nombre de ticks de l'animation du bouton swap
pub const SWAP_SPIN_TICKS: u8 = 2;

/// Images du spinner de chargement
const SPINNER_FRAMES: [char; 4] = ['◐', '◓', '◑', '◒'];

/// Magasin de favoris choisi à l'exécution (fichier ou mémoire)
pub type DynFavorites = FavoritesStore<Box<dyn KeyValueStore>>;

// ============================================================================
// Enum : Screen
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Un seul écran actif à la fois
// - Picker porte le côté (source/cible) en cours d'édition
// ============================================================================

/// Côté de la conversion édité par un picker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerTarget {
    Source,
    Target,
}

/// Écrans de l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : montant, devises, résultat, favoris
    Dashboard,

    /// Saisie du montant : chaque touche recalcule immédiatement
    AmountInput,

    /// Liste du catalogue pour choisir une devise
    Picker(PickerTarget),
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Index surligné dans le picker (position dans le catalogue)
    pub picker_index: usize,

    /// Two-step quit : première pression de 'q' arme, seconde quitte
    pub confirm_quit: bool,

    /// État de la conversion (montant, devises, taux, résultat)
    pub conversion: ConversionState,

    /// Favoris persistés
    favorites: DynFavorites,

    /// Compteur de ticks (animations)
    pub tick_count: u64,

    /// Ticks restants de surbrillance du résultat
    pub result_pulse: u8,

    /// Ticks restants de l'animation du swap
    pub swap_spin: u8,
}

impl App {
    /// Crée l'application à partir d'un état de conversion et des favoris
    pub fn new(conversion: ConversionState, favorites: DynFavorites) -> Self {
        Self {
            running: true,
            current_screen: Screen::Dashboard,
            picker_index: 0,
            confirm_quit: false,
            conversion,
            favorites,
            tick_count: 0,
            result_pulse: 0,
            swap_spin: 0,
        }
    }

    /// Première requête de taux, émise au démarrage
    pub fn start(&mut self) -> FetchTicket {
        self.conversion.begin_fetch()
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Tick : appelé à chaque itération de la boucle (animations)
    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
        self.result_pulse = self.result_pulse.saturating_sub(1);
        self.swap_spin = self.swap_spin.saturating_sub(1);
    }

    /// Image courante du spinner de chargement
    pub fn spinner_frame(&self) -> char {
        SPINNER_FRAMES[(self.tick_count % SPINNER_FRAMES.len() as u64) as usize]
    }

    // ========================================================================
    // Quit confirmation
    // ========================================================================

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Conversion
    // ========================================================================

    /// Exécute une transition et déclenche l'animation si le résultat change
    ///
    /// CONCEPT RUST : Closures génériques
    /// - F: FnOnce(&mut ConversionState) -> R
    /// - Le résultat de la closure est retourné tel quel
    fn track_result<R>(&mut self, transition: impl FnOnce(&mut ConversionState) -> R) -> R {
        let before = self.conversion.converted_amount();
        let result = transition(&mut self.conversion);
        if self.conversion.converted_amount() != before {
            self.result_pulse = RESULT_PULSE_TICKS;
        }
        result
    }

    /// Applique une réponse de taux (ignorée si périmée)
    pub fn apply_rates(&mut self, seq: u64, outcome: RateOutcome) -> bool {
        let base = outcome.base.clone();
        let fallback = outcome.is_fallback();
        let applied = self.track_result(|c| c.apply_rates(seq, outcome));
        if applied {
            info!(seq, base = %base, fallback, "Rates applied");
        }
        applied
    }

    /// Change la devise source
    pub fn set_source_currency(&mut self, code: &str) -> Option<FetchTicket> {
        let ticket = self.conversion.set_source_currency(code);
        if ticket.is_some() {
            info!(code = %code, "Source currency changed");
        }
        ticket
    }

    /// Change la devise cible (pas de requête)
    pub fn set_target_currency(&mut self, code: &str) {
        info!(code = %code, "Target currency changed");
        self.track_result(|c| c.set_target_currency(code));
    }

    /// Échange source et cible
    pub fn swap(&mut self) -> Option<FetchTicket> {
        let ticket = self.track_result(|c| c.swap());
        if ticket.is_some() {
            self.swap_spin = SWAP_SPIN_TICKS;
            info!(
                source = %self.conversion.source_currency(),
                target = %self.conversion.target_currency(),
                "Currencies swapped"
            );
        }
        ticket
    }

    /// Rafraîchissement manuel, ignoré pendant un chargement
    pub fn refresh(&mut self) -> Option<FetchTicket> {
        if self.conversion.is_loading() {
            debug!("Refresh ignored while loading");
            return None;
        }
        info!(base = %self.conversion.source_currency(), "Manual refresh");
        Some(self.conversion.refresh())
    }

    // ========================================================================
    // Amount Input Management
    // ========================================================================

    pub fn start_amount_input(&mut self) {
        self.current_screen = Screen::AmountInput;
    }

    pub fn finish_amount_input(&mut self) {
        self.current_screen = Screen::Dashboard;
    }

    pub fn is_in_amount_input(&self) -> bool {
        self.current_screen == Screen::AmountInput
    }

    /// Ajoute un caractère au montant et recalcule
    pub fn append_amount_char(&mut self, c: char) {
        let mut amount = self.conversion.amount().to_string();
        amount.push(c);
        self.track_result(|conv| conv.set_amount(amount));
    }

    /// Supprime le dernier caractère du montant et recalcule
    pub fn amount_backspace(&mut self) {
        let mut amount = self.conversion.amount().to_string();
        amount.pop();
        self.track_result(|conv| conv.set_amount(amount));
    }

    // ========================================================================
    // Picker Management
    // ========================================================================

    /// Ouvre le picker, positionné sur la devise actuelle du côté choisi
    pub fn open_picker(&mut self, target: PickerTarget) {
        let current = match target {
            PickerTarget::Source => self.conversion.source_currency(),
            PickerTarget::Target => self.conversion.target_currency(),
        };
        self.picker_index = currency::index_of(current).unwrap_or(0);
        self.current_screen = Screen::Picker(target);
    }

    pub fn cancel_picker(&mut self) {
        self.current_screen = Screen::Dashboard;
    }

    pub fn picker_target(&self) -> Option<PickerTarget> {
        match self.current_screen {
            Screen::Picker(target) => Some(target),
            _ => None,
        }
    }

    pub fn picker_up(&mut self) {
        self.picker_index = self.picker_index.saturating_sub(1);
    }

    pub fn picker_down(&mut self) {
        let max_index = currency::catalog().len().saturating_sub(1);
        self.picker_index = (self.picker_index + 1).min(max_index);
    }

    /// Devise surlignée dans le picker
    pub fn picker_selected(&self) -> &'static CurrencyDescriptor {
        let catalog = currency::catalog();
        &catalog[self.picker_index.min(catalog.len() - 1)]
    }

    /// Valide le picker et applique la devise choisie
    pub fn confirm_picker(&mut self) -> Option<FetchTicket> {
        let code = self.picker_selected().code;
        let target = self.picker_target();
        self.current_screen = Screen::Dashboard;

        match target {
            Some(PickerTarget::Source) => self.set_source_currency(code),
            Some(PickerTarget::Target) => {
                self.set_target_currency(code);
                None
            }
            None => None,
        }
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    pub fn favorites(&self) -> &FavoritesSet {
        self.favorites.favorites()
    }

    pub fn is_favorite(&self, code: &str) -> bool {
        self.favorites.is_favorite(code)
    }

    /// Bascule un favori ; un échec d'écriture est seulement journalisé
    pub fn toggle_favorite(&mut self, code: &str) {
        if let Err(e) = self.favorites.toggle(code) {
            error!(code = %code, error = %e, "Failed to persist favorites");
        }
    }

    /// Bascule le favori de la devise surlignée dans le picker
    pub fn toggle_picker_favorite(&mut self) {
        let code = self.picker_selected().code;
        self.toggle_favorite(code);
    }

    /// Utilise le n-ième favori (0-indexé) comme devise source
    pub fn select_favorite_as_source(&mut self, index: usize) -> Option<FetchTicket> {
        let code = self.favorites().get(index)?.to_string();
        self.set_source_currency(&code)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RateMapping, RateOrigin};
    use crate::store::{MemoryStore, FAVORITES_KEY};
    use approx::assert_relative_eq;

    fn app_with(store: MemoryStore) -> App {
        let favorites = FavoritesStore::load(Box::new(store) as Box<dyn KeyValueStore>);
        App::new(ConversionState::new("100", "USD", "EUR"), favorites)
    }

    fn fallback(base: &str) -> RateOutcome {
        RateOutcome {
            base: base.to_string(),
            rates: RateMapping::fallback(),
            origin: RateOrigin::Fallback,
            fetched_at: "09:15:00".to_string(),
        }
    }

    #[test]
    fn test_app_creation() {
        let app = app_with(MemoryStore::new());
        assert!(app.is_running());
        assert_eq!(app.current_screen, Screen::Dashboard);
        assert!(app.favorites().is_empty());
    }

    #[test]
    fn test_app_quit() {
        let mut app = app_with(MemoryStore::new());
        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_start_and_apply_pulses_result() {
        let mut app = app_with(MemoryStore::new());
        let ticket = app.start();
        assert_eq!(ticket.base, "USD");
        assert!(app.conversion.is_loading());

        assert!(app.apply_rates(ticket.seq, fallback("USD")));
        assert_relative_eq!(app.conversion.converted_amount(), 85.0, epsilon = 1e-9);
        assert_eq!(app.result_pulse, RESULT_PULSE_TICKS);

        for _ in 0..RESULT_PULSE_TICKS {
            app.tick();
        }
        assert_eq!(app.result_pulse, 0);
    }

    #[test]
    fn test_swap_pulses_recomputed_result() {
        let mut app = app_with(MemoryStore::new());
        let ticket = app.start();
        app.apply_rates(ticket.seq, fallback("USD"));
        app.result_pulse = 0;

        let ticket = app.swap().unwrap();
        assert_eq!(ticket.base, "EUR");
        assert_eq!(app.swap_spin, SWAP_SPIN_TICKS);
        assert_eq!(app.result_pulse, RESULT_PULSE_TICKS);
        assert_relative_eq!(app.conversion.converted_amount(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_amount_editing_recomputes() {
        let mut app = app_with(MemoryStore::new());
        let ticket = app.start();
        app.apply_rates(ticket.seq, fallback("USD"));

        app.start_amount_input();
        assert!(app.is_in_amount_input());
        app.append_amount_char('0');
        assert_eq!(app.conversion.amount(), "1000");
        assert_relative_eq!(app.conversion.converted_amount(), 850.0, epsilon = 1e-9);

        app.append_amount_char('x');
        assert_relative_eq!(app.conversion.converted_amount(), 850.0, epsilon = 1e-9);

        app.amount_backspace();
        app.amount_backspace();
        assert_eq!(app.conversion.amount(), "100");
        assert_relative_eq!(app.conversion.converted_amount(), 85.0, epsilon = 1e-9);

        app.finish_amount_input();
        assert_eq!(app.current_screen, Screen::Dashboard);
    }

    #[test]
    fn test_picker_selects_target_without_fetch() {
        let mut app = app_with(MemoryStore::new());
        let ticket = app.start();
        app.apply_rates(ticket.seq, fallback("USD"));

        app.open_picker(PickerTarget::Target);
        assert_eq!(app.picker_selected().code, "EUR");
        app.picker_down();
        app.picker_down();
        assert_eq!(app.picker_selected().code, "JPY");

        assert!(app.confirm_picker().is_none());
        assert_eq!(app.conversion.target_currency(), "JPY");
        assert_relative_eq!(app.conversion.converted_amount(), 11000.0, epsilon = 1e-9);
        assert!(!app.conversion.is_loading());
    }

    #[test]
    fn test_picker_selects_source_with_fetch() {
        let mut app = app_with(MemoryStore::new());
        app.open_picker(PickerTarget::Source);
        app.picker_down();

        let ticket = app.confirm_picker().unwrap();
        assert_eq!(ticket.base, "EUR");
        assert!(app.conversion.is_loading());
        assert_eq!(app.current_screen, Screen::Dashboard);
    }

    #[test]
    fn test_picker_bounds() {
        let mut app = app_with(MemoryStore::new());
        app.open_picker(PickerTarget::Source);
        app.picker_up();
        assert_eq!(app.picker_index, 0);
        for _ in 0..50 {
            app.picker_down();
        }
        assert_eq!(app.picker_selected().code, "ZAR");
        app.cancel_picker();
        assert_eq!(app.conversion.source_currency(), "USD");
    }

    #[test]
    fn test_swap_animates_and_fetches() {
        let mut app = app_with(MemoryStore::new());
        let ticket = app.swap().unwrap();
        assert_eq!(ticket.base, "EUR");
        assert_eq!(app.swap_spin, SWAP_SPIN_TICKS);
    }

    #[test]
    fn test_refresh_ignored_while_loading() {
        let mut app = app_with(MemoryStore::new());
        let ticket = app.start();
        assert!(app.refresh().is_none());

        app.apply_rates(ticket.seq, fallback("USD"));
        let again = app.refresh().unwrap();
        assert_eq!(again.base, "USD");
        assert!(again.seq > ticket.seq);
    }

    #[test]
    fn test_favorites_from_picker_and_quick_select() {
        let store = MemoryStore::new().with_entry(FAVORITES_KEY, r#"["GBP"]"#);
        let mut app = app_with(store);
        assert!(app.is_favorite("GBP"));

        app.open_picker(PickerTarget::Source);
        app.toggle_picker_favorite(); // USD
        assert_eq!(app.favorites().iter().collect::<Vec<_>>(), vec!["GBP", "USD"]);

        let ticket = app.select_favorite_as_source(0).unwrap();
        assert_eq!(ticket.base, "GBP");
        assert!(app.select_favorite_as_source(5).is_none());
    }

    #[test]
    fn test_spinner_cycles() {
        let mut app = app_with(MemoryStore::new());
        let first = app.spinner_frame();
        app.tick();
        assert_ne!(app.spinner_frame(), first);
    }
}

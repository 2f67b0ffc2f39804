// ============================================================================
// Gestion des événements
// ============================================================================
// Gère les événements clavier et les ticks de l'application
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. matches! : tester un pattern en une expression booléenne
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

/// Intervalle entre deux ticks (animations)
pub const TICK_RATE: Duration = Duration::from_millis(250);

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (animations, réception des taux)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            tick_rate: TICK_RATE,
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend au plus un tick
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : Convertir KeyEvent en action
// ============================================================================

fn key_code(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) => Some(key.code),
        Event::Tick => None,
    }
}

/// 'q' : quitter (two-step)
pub fn is_quit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('q') | KeyCode::Char('Q')))
}

pub fn is_escape_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Esc))
}

pub fn is_enter_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Enter))
}

pub fn is_backspace_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Backspace))
}

/// Flèche vers le haut ou 'k' (vim)
pub fn is_up_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K')))
}

/// Flèche vers le bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J')))
}

/// 'a' ou 'e' : éditer le montant
pub fn is_edit_amount_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('a') | KeyCode::Char('e')))
}

/// 'f' : choisir la devise source ("from")
pub fn is_pick_source_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('f')))
}

/// 't' : choisir la devise cible ("to")
pub fn is_pick_target_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('t')))
}

/// 's' : échanger source et cible
pub fn is_swap_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('s')))
}

/// 'r' : rafraîchir les taux
pub fn is_refresh_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('r')))
}

/// '*' ou Espace : basculer le favori dans le picker
pub fn is_favorite_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('*') | KeyCode::Char(' ')))
}

/// Caractère acceptable dans le montant (chiffres, séparateur, exposant, signe)
pub fn get_amount_char(event: &Event) -> Option<char> {
    match key_code(event) {
        Some(KeyCode::Char(c)) if c.is_ascii_digit() || matches!(c, '.' | '-' | 'e' | 'E') => Some(c),
        _ => None,
    }
}

/// Chiffre 1..9 → index de favori 0..8
pub fn get_favorite_index(event: &Event) -> Option<usize> {
    match key_code(event) {
        Some(KeyCode::Char(c)) => match c.to_digit(10) {
            Some(d) if d >= 1 => Some(d as usize - 1),
            _ => None,
        },
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

// ============================================================================
// LazyFx - Convertisseur de devises dans le terminal
// ============================================================================
// Programme TUI : saisie d'un montant, choix des devises source et cible,
// taux récupérés depuis un service distant, favoris persistés localement
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle infinie qui gère événements et rendering
// 3. Runtime tokio : les requêtes de taux tournent en tâches async
// 4. Channels mpsc : les résultats reviennent vers l'event loop
// ============================================================================

use std::io;
use std::sync::{mpsc, Arc};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Handle;
use tracing::{debug, error, info};

use lazyfx::api::{fetch_rates_or_fallback, ExchangeRateApi, RateSource};
use lazyfx::app::{App, DynFavorites, PickerTarget};
use lazyfx::config::Config;
use lazyfx::models::{ConversionState, FetchTicket, RateOutcome};
use lazyfx::store::{FavoritesStore, JsonFileStore, KeyValueStore};
use lazyfx::ui::{events::EventHandler, render};

// ============================================================================
// AppResult : Résultats des tâches async
// ============================================================================

/// Résultat renvoyé par une tâche de récupération des taux
#[derive(Debug)]
enum AppResult {
    /// Taux reçus (ou table de repli) pour le ticket `seq`
    RatesFetched { seq: u64, outcome: RateOutcome },
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place, avec rotation quotidienne
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// tail -f ./logs/lazyfx.log
/// RUST_LOG=lazyfx=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = std::path::PathBuf::from("./logs");
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "lazyfx.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour lazyfx, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazyfx=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("LazyFx starting up");

    let config = Config::load()?;
    debug!(?config, "Configuration");

    // Favoris : chargés une seule fois, au démarrage
    let data_dir = config.data_dir()?;
    let file_store = JsonFileStore::in_dir(&data_dir);
    info!(path = ?file_store.path(), "Favorites store");
    let kv: Box<dyn KeyValueStore> = Box::new(file_store);
    let favorites: DynFavorites = FavoritesStore::load(kv);

    let source: Arc<dyn RateSource> = Arc::new(
        ExchangeRateApi::new(config.api_base_url.clone(), config.request_timeout())
            .context("Échec de la création du client HTTP")?,
    );

    // CONCEPT : Runtime multi-thread
    // - Les requêtes tournent sur les threads du runtime
    // - L'event loop reste sur le thread principal et ne bloque jamais
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;

    let conversion = ConversionState::new(
        config.default_amount.clone(),
        config.default_source.clone(),
        config.default_target.clone(),
    );
    let mut app = App::new(conversion, favorites);

    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    // Requête initiale pour la devise source par défaut
    let ticket = app.start();
    spawn_fetch(runtime.handle(), source.clone(), ticket, result_tx.clone());

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(
        &mut terminal,
        &mut app,
        &events,
        runtime.handle(),
        source,
        result_tx,
        result_rx,
    );

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    // Les requêtes encore en vol sont abandonnées
    runtime.shutdown_background();

    result
}

// ============================================================================
// Récupération des taux en tâche async
// ============================================================================
// CONCEPT RUST : tokio::spawn via Handle
// - Chaque changement de devise source lance une tâche indépendante
// - Pas d'annulation : le ticket permet d'ignorer les réponses périmées
// ============================================================================

/// Lance la récupération des taux pour un ticket
fn spawn_fetch(
    handle: &Handle,
    source: Arc<dyn RateSource>,
    ticket: FetchTicket,
    result_tx: mpsc::Sender<AppResult>,
) {
    debug!(seq = ticket.seq, base = %ticket.base, "Spawning rate fetch");

    handle.spawn(async move {
        let outcome = fetch_rates_or_fallback(source.as_ref(), &ticket.base).await;
        // L'event loop peut être terminée : le résultat est alors perdu
        let _ = result_tx.send(AppResult::RatesFetched {
            seq: ticket.seq,
            outcome,
        });
    });
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Appliquer les résultats reçus
//   1. Dessiner l'interface
//   2. Traiter les événements
//   3. Mettre à jour les animations
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    handle: &Handle,
    source: Arc<dyn RateSource>,
    result_tx: mpsc::Sender<AppResult>,
    result_rx: mpsc::Receiver<AppResult>,
) -> Result<()> {
    while app.is_running() {
        // ========================================
        // 0. RÉSULTATS : applique tous les résultats disponibles
        // ========================================
        while let Ok(result) = result_rx.try_recv() {
            match result {
                AppResult::RatesFetched { seq, outcome } => {
                    if !app.apply_rates(seq, outcome) {
                        debug!(seq, "Ignored stale rate response");
                    }
                }
            }
        }

        // ========================================
        // 1. RENDER
        // ========================================
        terminal.draw(|frame| render(frame, app))?;

        // ========================================
        // 2. INPUT
        // ========================================
        match events.next() {
            Ok(event) => {
                if let Some(ticket) = handle_event(app, event) {
                    spawn_fetch(handle, source.clone(), ticket, result_tx.clone());
                }
            }
            Err(e) => {
                error!(error = ?e, "Failed to read terminal event");
            }
        }

        // ========================================
        // 3. UPDATE
        // ========================================
        app.tick();
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// Retourne un ticket quand l'action exige une nouvelle requête de taux.
fn handle_event(app: &mut App, event: lazyfx::ui::events::Event) -> Option<FetchTicket> {
    use lazyfx::ui::events::{
        get_amount_char, get_favorite_index, is_backspace_event, is_down_event,
        is_edit_amount_event, is_enter_event, is_escape_event, is_favorite_event,
        is_pick_source_event, is_pick_target_event, is_quit_event, is_refresh_event,
        is_swap_event, is_up_event, Event,
    };

    if matches!(event, Event::Tick) {
        return None;
    }

    // ========================================
    // Saisie du montant
    // ========================================
    if app.is_in_amount_input() {
        if is_enter_event(&event) || is_escape_event(&event) {
            debug!(amount = %app.conversion.amount(), "Amount input finished");
            app.finish_amount_input();
        } else if is_backspace_event(&event) {
            app.amount_backspace();
        } else if let Some(c) = get_amount_char(&event) {
            app.append_amount_char(c);
        }
        return None;
    }

    // ========================================
    // Quit two-step
    // ========================================
    if is_quit_event(&event) {
        if app.is_awaiting_quit_confirmation() {
            info!("User confirmed quit");
            app.quit();
        } else {
            info!("User requested quit (awaiting confirmation)");
            app.request_quit();
        }
        return None;
    }

    // Toute autre touche annule la confirmation
    app.cancel_quit();

    // ========================================
    // Picker
    // ========================================
    if app.picker_target().is_some() {
        if is_escape_event(&event) {
            app.cancel_picker();
        } else if is_enter_event(&event) {
            return app.confirm_picker();
        } else if is_up_event(&event) {
            app.picker_up();
        } else if is_down_event(&event) {
            app.picker_down();
        } else if is_favorite_event(&event) {
            app.toggle_picker_favorite();
        }
        return None;
    }

    // ========================================
    // Dashboard
    // ========================================
    if is_edit_amount_event(&event) {
        app.start_amount_input();
        None
    } else if is_pick_source_event(&event) {
        app.open_picker(PickerTarget::Source);
        None
    } else if is_pick_target_event(&event) {
        app.open_picker(PickerTarget::Target);
        None
    } else if is_swap_event(&event) {
        app.swap()
    } else if is_refresh_event(&event) {
        app.refresh()
    } else if let Some(index) = get_favorite_index(&event) {
        app.select_favorite_as_source(index)
    } else {
        None
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

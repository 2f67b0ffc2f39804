// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine le convertisseur en utilisant les widgets de ratatui
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Widgets : composants UI (Block, Paragraph, List, etc.)
// 3. Layout : découpage de l'espace en zones
// 4. Style : couleurs et attributs de texte
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{App, PickerTarget, Screen};
use crate::models::{currency, format_money, Phase};

/// Dessine l'interface complète
///
/// Le picker est dessiné en popup par-dessus le dashboard.
pub fn render(frame: &mut Frame, app: &App) {
    render_dashboard(frame, app);

    if let Screen::Picker(target) = app.current_screen {
        render_picker(frame, app, target);
    }
}

/// Dessine le dashboard
fn render_dashboard(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);
    render_amount(frame, app, chunks[1]);
    render_currencies(frame, app, chunks[2]);
    render_result(frame, app, chunks[3]);
    render_favorites(frame, app, chunks[4]);
    render_footer(frame, app, chunks[5]);
}

/// Crée le layout principal
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Length(3), // Montant
            Constraint::Length(3), // Devises
            Constraint::Length(5), // Résultat
            Constraint::Min(3),    // Favoris
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

fn bordered(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title)
}

// ============================================================================
// Header
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = bordered(" LazyFx ", Color::Cyan).title_alignment(Alignment::Center);

    let text = vec![
        Line::from(Span::styled(
            "Currency Converter",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "Real-time exchange rates • Last updated: {}",
                app.conversion.last_updated()
            ),
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Montant
// ============================================================================

fn render_amount(frame: &mut Frame, app: &App, area: Rect) {
    let editing = app.is_in_amount_input();
    let color = if editing { Color::Green } else { Color::Cyan };

    let mut spans = vec![Span::styled(
        app.conversion.amount().to_string(),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )];
    if editing {
        spans.push(Span::styled(
            "█",
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(bordered(" Amount ", color));
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Devises source / cible et bouton swap
// ============================================================================

fn render_currencies(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(47),
            Constraint::Percentage(6),
            Constraint::Percentage(47),
        ])
        .split(area);

    render_currency_box(frame, app, chunks[0], " From [f] ", app.conversion.source_currency());
    render_swap(frame, app, chunks[1]);
    render_currency_box(frame, app, chunks[2], " To [t] ", app.conversion.target_currency());
}

fn render_currency_box(frame: &mut Frame, app: &App, area: Rect, title: &str, code: &str) {
    let line = match currency::find(code) {
        Some(descriptor) => Line::from(vec![
            Span::raw(format!("{} ", descriptor.flag())),
            Span::styled(
                descriptor.code,
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", descriptor.display_name), Style::default().fg(Color::Gray)),
            Span::styled(star(app.is_favorite(code)), Style::default().fg(Color::Yellow)),
        ]),
        None => Line::from(code.to_string()),
    };

    let paragraph = Paragraph::new(line).block(bordered(title, Color::Cyan));
    frame.render_widget(paragraph, area);
}

fn render_swap(frame: &mut Frame, app: &App, area: Rect) {
    // Animation : la flèche s'inverse brièvement après un swap
    let (arrow, style) = if app.swap_spin > 0 {
        ("⇵", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    } else {
        ("⇅", Style::default().fg(Color::Cyan))
    };

    let paragraph = Paragraph::new(vec![Line::from(""), Line::from(Span::styled(arrow, style))])
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn star(favorite: bool) -> &'static str {
    if favorite {
        "  ★"
    } else {
        "  ☆"
    }
}

// ============================================================================
// Résultat
// ============================================================================

fn render_result(frame: &mut Frame, app: &App, area: Rect) {
    let conversion = &app.conversion;

    let value_line = if conversion.is_loading() {
        Line::from(Span::styled(
            format!("{} Loading...", app.spinner_frame()),
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        ))
    } else {
        // Animation : surbrillance brève quand le résultat change
        let style = if app.result_pulse > 0 {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        };
        Line::from(Span::styled(
            format_money(conversion.converted_amount(), conversion.target_currency()),
            style,
        ))
    };

    let rate_line = match conversion.rate_for_target() {
        Some(rate) => Line::from(Span::styled(
            format!(
                "↗ 1 {} = {:.6} {}",
                conversion.source_currency(),
                rate,
                conversion.target_currency()
            ),
            Style::default().fg(Color::Gray),
        )),
        None => Line::from(""),
    };

    let status_line = if conversion.phase() == Phase::Degraded {
        Line::from(Span::styled(
            "fallback rates",
            Style::default().fg(Color::Red).add_modifier(Modifier::ITALIC),
        ))
    } else {
        Line::from("")
    };

    let paragraph = Paragraph::new(vec![value_line, rate_line, status_line])
        .block(bordered(" Converted Amount ", Color::Blue))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Favoris
// ============================================================================

fn render_favorites(frame: &mut Frame, app: &App, area: Rect) {
    let block = bordered(" ★ Favorite Currencies ", Color::Yellow);

    if app.favorites().is_empty() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "Aucun favori : [*] dans un picker pour en ajouter",
            Style::default().fg(Color::Gray),
        )))
        .block(block)
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    // Les codes absents du catalogue sont ignorés à l'affichage
    let mut spans = Vec::new();
    for (index, code) in app.favorites().iter().enumerate() {
        let Some(descriptor) = currency::find(code) else {
            continue;
        };
        spans.push(Span::styled(
            format!("[{}]", index + 1),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {} {}   ", descriptor.flag(), descriptor.code)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Footer : Instructions
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = bordered("", Color::Cyan);
    let key = |label: &'static str, color: Color| {
        Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD))
    };

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "⚠  Appuyez sur ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        match app.current_screen {
            Screen::AmountInput => Line::from(vec![
                key("[0-9 . -]", Color::Green),
                Span::raw(" Type  "),
                key("[Backspace]", Color::Yellow),
                Span::raw(" Erase  "),
                key("[Enter/ESC]", Color::Red),
                Span::raw(" Done"),
            ]),
            Screen::Picker(_) => Line::from(vec![
                key("[↑↓ / j k]", Color::Yellow),
                Span::raw(" Navigate  "),
                key("[Enter]", Color::Green),
                Span::raw(" Select  "),
                key("[*]", Color::Yellow),
                Span::raw(" Favorite  "),
                key("[ESC]", Color::Red),
                Span::raw(" Cancel"),
            ]),
            Screen::Dashboard => {
                let refresh_label = if app.conversion.is_loading() {
                    " Updating...  "
                } else {
                    " Refresh  "
                };
                Line::from(vec![
                    key("[q]", Color::Yellow),
                    Span::raw(" Quit  "),
                    key("[a]", Color::Green),
                    Span::raw(" Amount  "),
                    key("[f/t]", Color::Green),
                    Span::raw(" From/To  "),
                    key("[s]", Color::Cyan),
                    Span::raw(" Swap  "),
                    key("[r]", Color::Cyan),
                    Span::raw(refresh_label),
                    key("[1-9]", Color::Yellow),
                    Span::raw(" Favorite"),
                ])
            }
        }
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Picker : liste du catalogue en popup
// ============================================================================

fn render_picker(frame: &mut Frame, app: &App, target: PickerTarget) {
    let area = centered_rect(60, 70, frame.size());
    let title = match target {
        PickerTarget::Source => " From ",
        PickerTarget::Target => " To ",
    };

    let items: Vec<ListItem> = currency::catalog()
        .iter()
        .map(|descriptor| {
            let line = Line::from(vec![
                Span::raw(format!(" {} ", descriptor.flag())),
                Span::styled(descriptor.code, Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!("  {:<20}", descriptor.display_name),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(star(app.is_favorite(descriptor.code)), Style::default().fg(Color::Yellow)),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(bordered(title, Color::Green))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD));

    let mut state = ListState::default().with_selected(Some(app.picker_index));

    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut state);
}

/// Rectangle centré occupant un pourcentage de la zone
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

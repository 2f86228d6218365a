use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, AppState, EditField, LoginFocus, Tab};
use crate::labels::LabelType;

use super::styles;
use super::tabs::{alumni, dashboard, manage, queue, reports, tracker};

/// Label types offered by the print chooser, in display order
pub const LABEL_TYPE_OPTIONS: [LabelType; 3] =
    [LabelType::Minimal, LabelType::Single, LabelType::FourUp];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title bar
            Constraint::Length(2), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    render_toasts(frame, app);

    match app.state {
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::EditingShipping => render_edit_overlay(frame, app),
        AppState::ConfirmingBulk => render_bulk_overlay(frame, app),
        AppState::ChoosingLabelType => render_label_type_overlay(frame, app),
        AppState::ChoosingBatch => render_batch_overlay(frame, app),
        AppState::ViewingNotifications => render_notifications_overlay(frame, app),
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        _ => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  cardtrack";
    let college = app
        .config
        .college_name
        .clone()
        .unwrap_or_else(|| "Alumni Association".to_string());

    let mut spans = vec![
        Span::styled(title, styles::title_style()),
        Span::styled(format!("  {}", college), styles::muted_style()),
    ];
    if app.unread_count > 0 {
        spans.push(Span::styled(
            format!("  ({} unread)", app.unread_count),
            styles::search_style(),
        ));
    }

    let help_hint = "[?] Help";
    let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    spans.push(Span::raw(" ".repeat(
        (area.width as usize).saturating_sub(used + help_hint.len() + 2),
    )));
    spans.push(Span::styled(help_hint, styles::muted_style()));

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tabs = [
        Tab::Queue,
        Tab::Manage,
        Tab::Tracker,
        Tab::Dashboard,
        Tab::Alumni,
        Tab::Reports,
    ];

    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, tab.title());
        if *tab == app.current_tab {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Queue => queue::render(frame, app, area),
        Tab::Manage => manage::render(frame, app, area),
        Tab::Tracker => tracker::render(frame, app, area),
        Tab::Dashboard => dashboard::render(frame, app, area),
        Tab::Alumni => alumni::render(frame, app, area),
        Tab::Reports => reports::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();

    match app.session.data {
        Some(ref data) => {
            let name = data.display_name.as_deref().unwrap_or(&data.username);
            spans.push(Span::raw(format!(" {} ", name)));
            spans.push(Span::styled(
                format!("(session {}m) ", data.minutes_until_expiry()),
                styles::muted_style(),
            ));
        }
        None => spans.push(Span::styled(" not logged in ", styles::error_style())),
    }

    if app.updating || app.bulk_updating {
        spans.push(Span::styled("saving... ", styles::search_style()));
    }
    if app.printing {
        spans.push(Span::styled("printing... ", styles::search_style()));
    }
    if app.exporting {
        spans.push(Span::styled("exporting... ", styles::search_style()));
    }

    spans.push(Span::styled(
        "| q quit  / search  N notifications  L logout",
        styles::muted_style(),
    ));

    let paragraph = Paragraph::new(Line::from(spans)).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

/// Toasts stack in the top-right corner, oldest on top
fn render_toasts(frame: &mut Frame, app: &App) {
    if app.toasts.is_empty() {
        return;
    }

    let frame_area = frame.area();
    for (i, toast) in app.toasts.visible().iter().enumerate() {
        let width = (toast.message.chars().count() as u16 + 4)
            .min(frame_area.width / 2)
            .max(6);
        let area = Rect {
            x: frame_area.width.saturating_sub(width + 1),
            y: 1 + i as u16,
            width,
            height: 1,
        };
        frame.render_widget(Clear, area);
        let line = Line::from(Span::styled(
            format!(" {} ", crate::utils::truncate(&toast.message, width as usize - 2)),
            styles::toast_style(toast.kind),
        ));
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Right), area);
    }
}

// ============================================================================
// Overlays
// ============================================================================

/// Centered overlay rectangle of the given size, clamped to the frame
fn centered_rect(width: u16, height: u16, frame_area: Rect) -> Rect {
    let width = width.min(frame_area.width);
    let height = height.min(frame_area.height);
    Rect {
        x: (frame_area.width - width) / 2,
        y: (frame_area.height - height) / 2,
        width,
        height,
    }
}

fn overlay_block(title: &str) -> Block {
    Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .title(format!(" {} ", title))
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect(52, 11, frame.area());
    frame.render_widget(Clear, area);

    let field = |label: &str, value: &str, focused: bool| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", label), styles::muted_style()),
            Span::styled(
                format!("{}{}", value, if focused { "▏" } else { "" }),
                if focused {
                    styles::search_style()
                } else {
                    ratatui::style::Style::default()
                },
            ),
        ])
    };

    let masked: String = "*".repeat(app.login_password.chars().count());
    let mut lines = vec![
        Line::default(),
        field(
            "Username",
            &app.login_username,
            app.login_focus == LoginFocus::Username,
        ),
        field("Password", &masked, app.login_focus == LoginFocus::Password),
        Line::default(),
        Line::from(Span::styled(
            if app.login_focus == LoginFocus::Button {
                "  ▶ [ Log in ]"
            } else {
                "    [ Log in ]"
            },
            if app.login_focus == LoginFocus::Button {
                styles::title_style()
            } else {
                styles::muted_style()
            },
        )),
    ];

    if let Some(ref error) = app.login_error {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines).block(overlay_block("Admin login")),
        area,
    );
}

fn render_edit_overlay(frame: &mut Frame, app: &App) {
    let Some(form) = app.edit_form.as_ref() else {
        return;
    };
    let area = centered_rect(60, 13, frame.area());
    frame.render_widget(Clear, area);

    let focus_marker = |field: EditField| {
        if form.focus == field {
            "▶ "
        } else {
            "  "
        }
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("  {}", form.record_name),
            styles::title_style(),
        )),
        Line::from(Span::styled(
            format!("  current: {}", form.original_status),
            styles::muted_style(),
        )),
        Line::default(),
        Line::from(vec![
            Span::raw(focus_marker(EditField::Status)),
            Span::styled("Status    ", styles::muted_style()),
            Span::styled("◂ ", styles::muted_style()),
            Span::styled(form.status.to_string(), styles::shipping_status_style(form.status)),
            Span::styled(" ▸", styles::muted_style()),
        ]),
        Line::from(vec![
            Span::raw(focus_marker(EditField::Tracking)),
            Span::styled("Tracking  ", styles::muted_style()),
            Span::raw(form.tracking_number.clone()),
            Span::styled(
                if form.focus == EditField::Tracking { "▏" } else { "" },
                styles::search_style(),
            ),
        ]),
        Line::from(vec![
            Span::raw(focus_marker(EditField::Notes)),
            Span::styled("Notes     ", styles::muted_style()),
            Span::raw(form.notes.clone()),
            Span::styled(
                if form.focus == EditField::Notes { "▏" } else { "" },
                styles::search_style(),
            ),
        ]),
        Line::from(vec![
            Span::raw(focus_marker(EditField::Correction)),
            Span::styled("Correction mode ", styles::muted_style()),
            Span::styled(
                if form.correction { "[x]" } else { "[ ]" },
                if form.correction {
                    styles::error_style()
                } else {
                    styles::muted_style()
                },
            ),
            Span::styled("  (allows backward transitions)", styles::muted_style()),
        ]),
        Line::default(),
    ];

    lines.push(Line::from(Span::styled(
        if app.updating {
            "  saving..."
        } else {
            "  Tab next field - arrows change status - Enter save - Esc cancel"
        },
        styles::muted_style(),
    )));

    frame.render_widget(
        Paragraph::new(lines).block(overlay_block("Edit shipping")),
        area,
    );
}

fn render_bulk_overlay(frame: &mut Frame, app: &App) {
    let Some(form) = app.bulk_form.as_ref() else {
        return;
    };
    let area = centered_rect(58, 9, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::default(),
        Line::from(vec![
            Span::raw("  Set "),
            Span::styled(format!("{} records", form.count), styles::title_style()),
            Span::raw(" to "),
            Span::styled(form.status.to_string(), styles::shipping_status_style(form.status)),
        ]),
        Line::default(),
        Line::from(vec![
            Span::styled("  Notes  ", styles::muted_style()),
            Span::raw(form.notes.clone()),
            Span::styled("▏", styles::search_style()),
        ]),
        Line::default(),
        Line::from(Span::styled(
            if app.bulk_updating {
                "  updating..."
            } else {
                "  Enter confirm - Esc cancel"
            },
            styles::muted_style(),
        )),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(overlay_block("Bulk update")),
        area,
    );
}

fn render_label_type_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect(52, 9, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::default()];
    for (i, label_type) in LABEL_TYPE_OPTIONS.iter().enumerate() {
        let marker = if i == app.label_type_cursor { "▶ " } else { "  " };
        let style = if i == app.label_type_cursor {
            styles::title_style()
        } else {
            ratatui::style::Style::default()
        };
        lines.push(Line::from(vec![
            Span::raw(format!("  {}", marker)),
            Span::styled(label_type.to_string(), style),
        ]));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "  Enter print - Esc cancel",
        styles::muted_style(),
    )));

    frame.render_widget(
        Paragraph::new(lines).block(overlay_block("Print labels")),
        area,
    );
}

fn render_batch_overlay(frame: &mut Frame, app: &App) {
    let Some(chooser) = app.batch_chooser.as_ref() else {
        return;
    };
    let height = (chooser.batches.len() as u16 + 6).min(frame.area().height);
    let area = centered_rect(56, height, frame.area());
    frame.render_widget(Clear, area);

    let marker = |i: usize| if i == chooser.selected { "▶ " } else { "  " };
    let style = |i: usize| {
        if i == chooser.selected {
            styles::title_style()
        } else {
            ratatui::style::Style::default()
        }
    };

    let mut lines = vec![
        Line::from(vec![
            Span::raw(format!("  {}", marker(0))),
            Span::styled(
                format!("Print all {} sheets (staggered)", chooser.batches.len()),
                style(0),
            ),
        ]),
        Line::default(),
    ];
    for (i, batch) in chooser.batches.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::raw(format!("  {}", marker(i + 1))),
            Span::styled(format!("Sheet {} ({} labels)", i + 1, batch.len()), style(i + 1)),
        ]));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "  Enter print - Esc cancel",
        styles::muted_style(),
    )));

    frame.render_widget(
        Paragraph::new(lines).block(overlay_block("4-up sheets")),
        area,
    );
}

fn render_notifications_overlay(frame: &mut Frame, app: &App) {
    let frame_area = frame.area();
    let area = centered_rect(
        frame_area.width.saturating_sub(10).min(70),
        frame_area.height.saturating_sub(6),
        frame_area,
    );
    frame.render_widget(Clear, area);

    let items: Vec<ListItem> = app
        .notifications
        .iter()
        .enumerate()
        .map(|(i, n)| {
            let marker = if n.read { "  " } else { "● " };
            let mut spans = vec![
                Span::styled(marker, styles::search_style()),
                Span::raw(crate::utils::truncate(n.headline(), 50)),
            ];
            if let Some(ref kind) = n.kind {
                spans.push(Span::styled(format!("  [{}]", kind), styles::muted_style()));
            }
            if let Some(created) = n.created_at {
                spans.push(Span::styled(
                    format!("  {}", created.format("%d/%m %H:%M")),
                    styles::muted_style(),
                ));
            }
            let line = Line::from(spans);
            if i == app.notification_cursor {
                ListItem::new(line).style(styles::selected_style())
            } else {
                ListItem::new(line)
            }
        })
        .collect();

    let title = format!("Notifications ({} unread)", app.unread_count);
    if items.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "  No notifications",
                styles::muted_style(),
            )))
            .block(overlay_block(&title)),
            area,
        );
    } else {
        frame.render_widget(List::new(items).block(overlay_block(&title)), area);
    }
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect(62, 20, frame.area());
    frame.render_widget(Clear, area);

    let entries: &[(&str, &str)] = &[
        ("1-6 / Tab", "switch view"),
        ("j/k or arrows", "move cursor"),
        ("h/l or ←/→", "previous / next page"),
        ("/", "edit search filter"),
        ("f", "cycle status filter"),
        ("space", "select row"),
        ("a", "select / clear page"),
        ("c", "clear selection"),
        ("e", "edit shipping status (Shipping tab)"),
        ("t / d", "bulk mark in transit / delivered"),
        ("p", "print labels for selection"),
        ("A / X", "approve / reject (Alumni tab)"),
        ("x / s / m", "exports (Reports tab)"),
        ("r", "refresh view"),
        ("N", "notifications"),
        ("L", "log out"),
        ("q", "quit"),
    ];

    let mut lines = vec![Line::default()];
    for (key, desc) in entries {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<16}", key), styles::help_key_style()),
            Span::styled(*desc, styles::help_desc_style()),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).block(overlay_block("Help")), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect(34, 5, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::default(),
        Line::from(Span::raw("  Quit cardtrack? (y/n)")),
    ];
    frame.render_widget(Paragraph::new(lines).block(overlay_block("Quit")), area);
}

//! Tracker tab: read-only shipment lookup by name, ID card, phone, or
//! tracking number, with the record's shipping history inline.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table};
use ratatui::Frame;

use crate::app::{App, AppState, Tab};
use crate::ui::styles;
use crate::utils::{format_date, format_optional, truncate};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // search line
        Constraint::Min(3),    // results
        Constraint::Length(8), // history of the highlighted record
    ])
    .split(area);

    render_search_line(frame, app, chunks[0]);

    if app.tracker_loading {
        super::render_placeholder(frame, chunks[1], "Searching...", styles::muted_style());
    } else if app.tracker_rows.is_empty() {
        let text = if app.tracker_searched {
            "No shipping records matched the search"
        } else {
            "Press / and enter a name, ID card, or tracking number"
        };
        super::render_placeholder(frame, chunks[1], text, styles::muted_style());
    } else {
        render_results(frame, app, chunks[1]);
    }

    render_history(frame, app, chunks[2]);
}

fn render_search_line(frame: &mut Frame, app: &App, area: Rect) {
    let searching = app.state == AppState::Searching && app.current_tab == Tab::Tracker;
    let mut spans = vec![Span::styled("Search: ", styles::muted_style())];
    spans.push(Span::styled(
        app.tracker_filters.search.clone(),
        styles::search_style(),
    ));
    if searching {
        spans.push(Span::styled("▏", styles::search_style()));
    }
    spans.push(Span::styled("  (Enter to search)", styles::muted_style()));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_results(frame: &mut Frame, app: &App, area: Rect) {
    let header =
        Row::new(vec!["Name", "Status", "Tracking", "Shipped", "Updated"]).style(styles::title_style());

    let rows: Vec<Row> = app
        .tracker_rows
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let status = record.shipping_status_or_default();
            let row = Row::new(vec![
                Cell::from(truncate(&record.full_name(), 28)),
                Cell::from(Span::styled(status.to_string(), styles::shipping_status_style(status))),
                Cell::from(format_optional(&record.tracking_number, "-")),
                Cell::from(format_date(&record.shipped_date)),
                Cell::from(format_date(&record.updated_at)),
            ]);
            if i == app.tracker_cursor {
                row.style(styles::selected_style())
            } else {
                row
            }
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(28),
            Constraint::Length(18),
            Constraint::Length(16),
            Constraint::Length(11),
            Constraint::Length(11),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(true))
            .title(format!(" Results ({}) ", app.tracker_rows.len())),
    );

    frame.render_widget(table, area);
}

/// Shipping history of the highlighted record, newest first
fn render_history(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::muted_style())
        .title(" History ");

    let Some(record) = app.tracker_rows.get(app.tracker_cursor) else {
        frame.render_widget(block, area);
        return;
    };

    let items: Vec<ListItem> = record
        .shipping_history
        .iter()
        .rev()
        .map(|entry| {
            let mut spans = vec![
                Span::styled(
                    entry.updated_at.format("%d/%m/%Y %H:%M ").to_string(),
                    styles::muted_style(),
                ),
                Span::styled(entry.status.to_string(), styles::shipping_status_style(entry.status)),
            ];
            if let Some(ref tracking) = entry.tracking_number {
                if !tracking.is_empty() {
                    spans.push(Span::raw(format!("  {}", tracking)));
                }
            }
            if let Some(ref notes) = entry.notes {
                if !notes.is_empty() {
                    spans.push(Span::styled(format!("  {}", truncate(notes, 40)), styles::muted_style()));
                }
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    if items.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No shipping history yet",
            styles::muted_style(),
        )))
        .block(block);
        frame.render_widget(empty, area);
    } else {
        frame.render_widget(List::new(items).block(block), area);
    }
}

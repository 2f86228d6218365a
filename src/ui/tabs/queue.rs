//! Shipping queue tab: approved mail-delivery records still awaiting
//! shipment, with checkbox selection for bulk actions and label printing.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use crate::app::{App, AppState, Tab};
use crate::ui::styles;
use crate::utils::{format_date, format_optional, format_phone, truncate};

use super::{empty_state_text, render_filter_bar, render_placeholder};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // filter bar
        Constraint::Length(1), // selection summary
        Constraint::Min(3),    // table
    ])
    .split(area);

    let searching = app.state == AppState::Searching && app.current_tab == Tab::Queue;
    render_filter_bar(frame, &app.queue_filters, chunks[0], searching);
    render_selection_summary(frame, app, chunks[1]);

    if app.queue_loading && app.queue_rows.is_empty() {
        render_placeholder(frame, chunks[2], "Loading shipping queue...", styles::muted_style());
        return;
    }

    if app.queue_rows.is_empty() {
        let text = empty_state_text(&app.queue_filters, "Nothing waiting to ship");
        render_placeholder(frame, chunks[2], text, styles::muted_style());
        return;
    }

    let header = Row::new(vec!["", "Name", "Department / Year", "Phone", "Tracking", "Updated"])
        .style(styles::title_style());

    let rows: Vec<Row> = app
        .queue_rows
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let checked = if app.queue_selection.contains(&record.id) {
                "[x]"
            } else {
                "[ ]"
            };
            let dept = format!(
                "{} / {}",
                truncate(&format_optional(&record.department, "-"), 24),
                record
                    .graduation_year
                    .map(|y| y.to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
            let row = Row::new(vec![
                Cell::from(checked),
                Cell::from(truncate(&record.full_name(), 28)),
                Cell::from(dept),
                Cell::from(format_phone(&format_optional(&record.phone, "-"))),
                Cell::from(format_optional(&record.tracking_number, "-")),
                Cell::from(format_date(&record.updated_at)),
            ]);
            if i == app.queue_cursor {
                row.style(styles::selected_style())
            } else {
                row
            }
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Length(28),
            Constraint::Length(32),
            Constraint::Length(14),
            Constraint::Length(16),
            Constraint::Length(11),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(true))
            .title(" Awaiting shipment "),
    );

    frame.render_widget(table, chunks[2]);
}

fn render_selection_summary(frame: &mut Frame, app: &App, area: Rect) {
    let n = app.queue_selection.len();
    let line = if n == 0 {
        Line::from(Span::styled(
            " space: select   a: select page   t: mark in transit   d: mark delivered   p: print labels",
            styles::muted_style(),
        ))
    } else {
        let sheets = n.div_ceil(crate::labels::SHEET_SIZE);
        let sheet_note = if n > crate::labels::SHEET_SIZE {
            format!(" ({} sheets at 4-up)", sheets)
        } else {
            String::new()
        };
        Line::from(vec![
            Span::styled(format!(" {} selected{}", n, sheet_note), styles::success_style()),
            Span::styled(
                "   t: in transit   d: delivered   p: print   c: clear",
                styles::muted_style(),
            ),
        ])
    };
    frame.render_widget(Paragraph::new(line), area);
}

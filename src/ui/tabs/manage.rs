//! Shipping manager tab: every shipping-eligible record regardless of
//! status, with per-row editing (status + tracking number) and the same
//! bulk actions as the queue.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use crate::app::{App, AppState, Tab};
use crate::ui::styles;
use crate::utils::{format_date, format_optional, truncate};

use super::{empty_state_text, render_filter_bar, render_placeholder};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(3),
    ])
    .split(area);

    let searching = app.state == AppState::Searching && app.current_tab == Tab::Manage;
    render_filter_bar(frame, &app.manage_filters, chunks[0], searching);

    let hint = if app.manage_selection.is_empty() {
        " e: edit row   f: cycle status filter   space/a: select   t/d: bulk update   p: print".to_string()
    } else {
        format!(
            " {} selected   e: edit row   t: in transit   d: delivered   p: print   c: clear",
            app.manage_selection.len()
        )
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(hint, styles::muted_style()))),
        chunks[1],
    );

    if app.manage_loading && app.manage_rows.is_empty() {
        render_placeholder(frame, chunks[2], "Loading records...", styles::muted_style());
        return;
    }

    if app.manage_rows.is_empty() {
        let text = empty_state_text(&app.manage_filters, "No shipping records yet");
        render_placeholder(frame, chunks[2], text, styles::muted_style());
        return;
    }

    let header = Row::new(vec!["", "Name", "Department", "Status", "Tracking", "Updated"])
        .style(styles::title_style());

    let rows: Vec<Row> = app
        .manage_rows
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let checked = if app.manage_selection.contains(&record.id) {
                "[x]"
            } else {
                "[ ]"
            };
            let status = record.shipping_status_or_default();
            let row = Row::new(vec![
                Cell::from(checked),
                Cell::from(truncate(&record.full_name(), 28)),
                Cell::from(truncate(&format_optional(&record.department, "-"), 26)),
                Cell::from(Span::styled(status.to_string(), styles::shipping_status_style(status))),
                Cell::from(format_optional(&record.tracking_number, "-")),
                Cell::from(format_date(&record.updated_at)),
            ]);
            if i == app.manage_cursor {
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
            Constraint::Length(26),
            Constraint::Length(18),
            Constraint::Length(16),
            Constraint::Length(11),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(true))
            .title(" Shipping status "),
    );

    frame.render_widget(table, chunks[2]);
}

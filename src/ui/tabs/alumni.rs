//! Alumni management tab: the full roster with registration status
//! review (approve / reject).

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

    let searching = app.state == AppState::Searching && app.current_tab == Tab::Alumni;
    render_filter_bar(frame, &app.alumni_filters, chunks[0], searching);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            " A: approve   X: reject   f: cycle status filter",
            styles::muted_style(),
        ))),
        chunks[1],
    );

    if app.alumni_loading && app.alumni_rows.is_empty() {
        render_placeholder(frame, chunks[2], "Loading alumni...", styles::muted_style());
        return;
    }

    if app.alumni_rows.is_empty() {
        let text = empty_state_text(&app.alumni_filters, "No registrations yet");
        render_placeholder(frame, chunks[2], text, styles::muted_style());
        return;
    }

    let header = Row::new(vec!["Name", "Department / Year", "Delivery", "Status", "Registered"])
        .style(styles::title_style());

    let rows: Vec<Row> = app
        .alumni_rows
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let dept = format!(
                "{} / {}",
                truncate(&format_optional(&record.department, "-"), 24),
                record
                    .graduation_year
                    .map(|y| y.to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
            let delivery = record
                .delivery_option
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string());
            let row = Row::new(vec![
                Cell::from(truncate(&record.full_name(), 28)),
                Cell::from(dept),
                Cell::from(delivery),
                Cell::from(Span::styled(
                    record.status.to_string(),
                    styles::member_status_style(record.status),
                )),
                Cell::from(format_date(&record.created_at)),
            ]);
            if i == app.alumni_cursor {
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
            Constraint::Length(32),
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Length(11),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(true))
            .title(" Alumni "),
    );

    frame.render_widget(table, chunks[2]);
}

//! Reports tab: the detailed shipping report plus spreadsheet exports.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use crate::app::{App, AppState, Tab};
use crate::ui::styles;
use crate::utils::{format_date, format_optional, truncate};

use super::{render_filter_bar, render_placeholder};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // filter bar
        Constraint::Length(1), // export hint / stats line
        Constraint::Min(3),    // table
    ])
    .split(area);

    let searching = app.state == AppState::Searching && app.current_tab == Tab::Reports;
    render_filter_bar(frame, &app.report_filters, chunks[0], searching);
    render_summary_line(frame, app, chunks[1]);

    if app.report_loading && app.report.is_none() {
        render_placeholder(frame, chunks[2], "Loading report...", styles::muted_style());
        return;
    }

    let Some(report) = app.report.as_ref() else {
        render_placeholder(frame, chunks[2], "Press r to load the report", styles::muted_style());
        return;
    };

    if report.shipments.is_empty() {
        render_placeholder(frame, chunks[2], "No shipments in this report", styles::muted_style());
        return;
    }

    let header = Row::new(vec!["Name", "Department", "Status", "Tracking", "Shipped"])
        .style(styles::title_style());

    let rows: Vec<Row> = report
        .shipments
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let status_span = match row.shipping_status {
                Some(status) => Span::styled(status.to_string(), styles::shipping_status_style(status)),
                None => Span::styled("-", styles::muted_style()),
            };
            let dept = format!(
                "{} / {}",
                truncate(&format_optional(&row.department, "-"), 20),
                row.graduation_year
                    .map(|y| y.to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
            // Older report rows carry only updatedAt
            let shipped = row.shipped_date.or(row.updated_at);
            let table_row = Row::new(vec![
                Cell::from(truncate(&row.full_name(), 28)),
                Cell::from(dept),
                Cell::from(status_span),
                Cell::from(format_optional(&row.tracking_number, "-")),
                Cell::from(format_date(&shipped)),
            ]);
            if i == app.report_cursor {
                table_row.style(styles::selected_style())
            } else {
                table_row
            }
        })
        .collect();

    let table = Table::new(
        rows,
        [
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
            .title(format!(
                " Shipments ({}) ",
                report.total_shipments
            )),
    );

    frame.render_widget(table, chunks[2]);
}

fn render_summary_line(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        " x: export excel   s: export shipping list   m: export members",
        styles::muted_style(),
    )];

    if app.exporting {
        spans.push(Span::styled("   exporting...", styles::search_style()));
    }

    if let Some(stats) = app.report.as_ref().and_then(|r| r.statistics) {
        spans.push(Span::styled(
            format!(
                "   awaiting {} / transit {} / delivered {}",
                stats.awaiting_shipment, stats.in_transit, stats.delivered
            ),
            styles::muted_style(),
        ));
        if let Some(days) = stats.average_delivery_days {
            spans.push(Span::styled(
                format!("   avg {:.1}d", days),
                styles::muted_style(),
            ));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

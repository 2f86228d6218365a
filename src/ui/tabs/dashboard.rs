//! Dashboard tab: aggregate shipping counts.

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::models::ShippingStatus;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(7), // stat tiles
        Constraint::Min(1),    // hint
    ])
    .split(area);

    let Some(stats) = app.stats else {
        let text = if app.stats_loading {
            "Loading statistics..."
        } else {
            "Press r to load shipping statistics"
        };
        super::render_placeholder(frame, chunks[0], text, styles::muted_style());
        return;
    };

    let tiles = Layout::horizontal([
        Constraint::Ratio(1, 4),
        Constraint::Ratio(1, 4),
        Constraint::Ratio(1, 4),
        Constraint::Ratio(1, 4),
    ])
    .split(chunks[0]);

    render_tile(
        frame,
        tiles[0],
        "Awaiting shipment",
        stats.awaiting_shipment,
        styles::shipping_status_style(ShippingStatus::AwaitingShipment),
    );
    render_tile(
        frame,
        tiles[1],
        "In transit",
        stats.in_transit,
        styles::shipping_status_style(ShippingStatus::InTransit),
    );
    render_tile(
        frame,
        tiles[2],
        "Delivered",
        stats.delivered,
        styles::shipping_status_style(ShippingStatus::Delivered),
    );
    render_tile(frame, tiles[3], "Total", stats.total(), styles::title_style());

    let mut hint_lines = vec![Line::from(Span::styled(
        " r: refresh statistics",
        styles::muted_style(),
    ))];
    if stats.overdue > 0 {
        hint_lines.insert(
            0,
            Line::from(Span::styled(
                format!(" {} shipments overdue", stats.overdue),
                styles::error_style(),
            )),
        );
    }
    frame.render_widget(Paragraph::new(hint_lines), chunks[1]);
}

fn render_tile(frame: &mut Frame, area: Rect, label: &str, value: u64, style: ratatui::style::Style) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::muted_style());
    let text = vec![
        Line::default(),
        Line::from(Span::styled(value.to_string(), style.add_modifier(ratatui::style::Modifier::BOLD))),
        Line::from(Span::styled(label.to_string(), styles::muted_style())),
    ];
    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

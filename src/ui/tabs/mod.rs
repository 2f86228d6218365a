//! Tab-specific content rendering.

pub mod alumni;
pub mod dashboard;
pub mod manage;
pub mod queue;
pub mod reports;
pub mod tracker;

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::Filters;
use crate::ui::styles;

/// Render the one-line filter summary shown above each table
pub fn render_filter_bar(frame: &mut Frame, filters: &Filters, area: Rect, searching: bool) {
    let mut spans = vec![Span::styled("Search: ", styles::muted_style())];
    if filters.search.is_empty() && !searching {
        spans.push(Span::styled("(/ to search)", styles::muted_style()));
    } else {
        spans.push(Span::styled(filters.search.clone(), styles::search_style()));
        if searching {
            spans.push(Span::styled("▏", styles::search_style()));
        }
    }

    if let Some(status) = filters.shipping_status {
        spans.push(Span::styled("  status: ", styles::muted_style()));
        spans.push(Span::styled(status.to_string(), styles::shipping_status_style(status)));
    }
    if let Some(status) = filters.member_status {
        spans.push(Span::styled("  status: ", styles::muted_style()));
        spans.push(Span::styled(status.to_string(), styles::member_status_style(status)));
    }
    if !filters.department.is_empty() {
        spans.push(Span::styled("  dept: ", styles::muted_style()));
        spans.push(Span::raw(filters.department.clone()));
    }
    if !filters.graduation_year.is_empty() {
        spans.push(Span::styled("  year: ", styles::muted_style()));
        spans.push(Span::raw(filters.graduation_year.clone()));
    }

    spans.push(Span::styled(
        format!("  page {}/{}", filters.page, filters.total_pages.max(1)),
        styles::muted_style(),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render a centered loading or empty-state line inside a bordered block
pub fn render_placeholder(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::muted_style());
    let paragraph = Paragraph::new(Line::from(Span::styled(text, style)))
        .block(block)
        .alignment(ratatui::layout::Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Empty-state message: distinguishes "no matches for these filters"
/// from "nothing here at all" so the admin never stares at a blank table
pub fn empty_state_text(filters: &Filters, nothing_text: &'static str) -> &'static str {
    let filtered = !filters.search.is_empty()
        || !filters.department.is_empty()
        || !filters.graduation_year.is_empty()
        || filters.member_status.is_some();
    if filtered {
        "No records matched the current filters"
    } else {
        nothing_text
    }
}

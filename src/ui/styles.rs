use ratatui::style::{Color, Modifier, Style};

use crate::models::{MemberStatus, ShippingStatus};
use crate::toast::ToastKind;

// Color palette
pub const PRIMARY: Color = Color::Rgb(64, 128, 192);
pub const SECONDARY: Color = Color::Rgb(96, 160, 96);
pub const ACCENT: Color = Color::Rgb(192, 160, 64);
pub const ERROR: Color = Color::Rgb(192, 64, 64);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const HIGHLIGHT: Color = Color::Rgb(48, 48, 64);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default()
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn success_style() -> Style {
    Style::default().fg(SECONDARY)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(PRIMARY)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(Color::White)
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn search_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(32, 32, 40)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default()
        .fg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}

/// Color coding for the shipping lifecycle: yellow while waiting, blue
/// in transit, green delivered.
pub fn shipping_status_style(status: ShippingStatus) -> Style {
    match status {
        ShippingStatus::AwaitingShipment => Style::default().fg(ACCENT),
        ShippingStatus::InTransit => Style::default().fg(PRIMARY),
        ShippingStatus::Delivered => Style::default().fg(SECONDARY),
    }
}

pub fn member_status_style(status: MemberStatus) -> Style {
    match status {
        MemberStatus::Pending => Style::default().fg(ACCENT),
        MemberStatus::Approved => Style::default().fg(SECONDARY),
        MemberStatus::Rejected => Style::default().fg(ERROR),
    }
}

pub fn toast_style(kind: ToastKind) -> Style {
    match kind {
        ToastKind::Info => Style::default().fg(PRIMARY),
        ToastKind::Success => Style::default().fg(SECONDARY),
        ToastKind::Error => Style::default().fg(ERROR).add_modifier(Modifier::BOLD),
    }
}

//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes and actions.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{
    App, AppState, EditField, LoginFocus, Tab, MAX_PASSWORD_LENGTH, MAX_TEXT_INPUT_LENGTH,
    MAX_USERNAME_LENGTH,
};
use crate::models::{MemberStatus, ShippingStatus};

use super::render::LABEL_TYPE_OPTIONS;

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::LoggingIn => return handle_login_input(app, key).await,
        AppState::Searching => {
            handle_search_input(app, key);
            return Ok(false);
        }
        AppState::EditingShipping => {
            handle_edit_input(app, key);
            return Ok(false);
        }
        AppState::ConfirmingBulk => {
            handle_bulk_input(app, key);
            return Ok(false);
        }
        AppState::ChoosingLabelType => {
            handle_label_type_input(app, key);
            return Ok(false);
        }
        AppState::ChoosingBatch => {
            handle_batch_input(app, key);
            return Ok(false);
        }
        AppState::ViewingNotifications => {
            handle_notifications_input(app, key);
            return Ok(false);
        }
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::Normal | AppState::Quitting => {}
    }

    // Normal mode
    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,

        // Tab switching
        KeyCode::Char('1') => app.switch_tab(Tab::Queue),
        KeyCode::Char('2') => app.switch_tab(Tab::Manage),
        KeyCode::Char('3') => app.switch_tab(Tab::Tracker),
        KeyCode::Char('4') => app.switch_tab(Tab::Dashboard),
        KeyCode::Char('5') => app.switch_tab(Tab::Alumni),
        KeyCode::Char('6') => app.switch_tab(Tab::Reports),
        KeyCode::Tab => {
            let next = app.current_tab.next();
            app.switch_tab(next);
        }
        KeyCode::BackTab => {
            let prev = app.current_tab.prev();
            app.switch_tab(prev);
        }

        // Cursor movement
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1),
        KeyCode::PageDown => app.move_cursor(10),
        KeyCode::PageUp => app.move_cursor(-10),

        // Pagination
        KeyCode::Right | KeyCode::Char('l') => app.change_page(1),
        KeyCode::Left | KeyCode::Char('h') => app.change_page(-1),

        // Filters
        KeyCode::Char('/') => app.state = AppState::Searching,
        KeyCode::Char('f') => cycle_status_filter(app),
        KeyCode::Char('F') => {
            if let Some(filters) = app.active_filters_mut() {
                filters.clear();
            }
        }

        // Selection
        KeyCode::Char(' ') => app.toggle_current_row(),
        KeyCode::Char('a') => app.toggle_all_rows(),
        KeyCode::Char('c') => {
            match app.current_tab {
                Tab::Queue => app.queue_selection.clear(),
                Tab::Manage => app.manage_selection.clear(),
                _ => {}
            }
        }

        // Actions
        KeyCode::Char('e') => {
            if app.current_tab == Tab::Manage {
                app.open_edit_form();
            }
        }
        KeyCode::Char('t') => app.open_bulk_form(ShippingStatus::InTransit),
        KeyCode::Char('d') => app.open_bulk_form(ShippingStatus::Delivered),
        KeyCode::Char('p') => open_label_chooser(app),
        KeyCode::Char('A') => {
            if app.current_tab == Tab::Alumni {
                app.set_member_status(MemberStatus::Approved);
            }
        }
        KeyCode::Char('X') => {
            if app.current_tab == Tab::Alumni {
                app.set_member_status(MemberStatus::Rejected);
            }
        }
        KeyCode::Char('x') => {
            if app.current_tab == Tab::Reports {
                app.download_export("/api/shipping/export/excel", "shipping-report");
            }
        }
        KeyCode::Char('s') => {
            if app.current_tab == Tab::Reports {
                app.download_export("/api/shipping/export/shipping-list", "shipping-list");
            }
        }
        KeyCode::Char('m') => {
            if app.current_tab == Tab::Reports {
                app.download_export("/api/alumni/export/all-members-excel", "all-members");
            }
        }

        KeyCode::Char('r') => app.refresh_current_view(),
        KeyCode::Char('N') => {
            app.state = AppState::ViewingNotifications;
            app.poll_notifications();
        }
        KeyCode::Char('L') => app.logout(),
        KeyCode::Enter => {
            if app.current_tab == Tab::Tracker {
                app.run_tracker_search();
            }
        }
        _ => {}
    }

    Ok(false)
}

/// Bulk actions and printing only exist where a selection does
fn open_label_chooser(app: &mut App) {
    if !matches!(app.current_tab, Tab::Queue | Tab::Manage) {
        return;
    }
    let empty = match app.current_tab {
        Tab::Queue => app.queue_selection.is_empty(),
        Tab::Manage => app.manage_selection.is_empty(),
        _ => true,
    };
    if empty {
        app.toasts.push(
            "Select at least one record first",
            crate::toast::ToastKind::Error,
        );
        return;
    }
    app.label_type_cursor = 0;
    app.state = AppState::ChoosingLabelType;
}

/// Cycle the active view's status filter through its options
fn cycle_status_filter(app: &mut App) {
    let tab = app.current_tab;
    let Some(filters) = app.active_filters_mut() else {
        return;
    };
    match tab {
        Tab::Manage => {
            filters.shipping_status = match filters.shipping_status {
                None => Some(ShippingStatus::AwaitingShipment),
                Some(ShippingStatus::AwaitingShipment) => Some(ShippingStatus::InTransit),
                Some(ShippingStatus::InTransit) => Some(ShippingStatus::Delivered),
                Some(ShippingStatus::Delivered) => None,
            };
            filters.mark_dirty();
        }
        Tab::Alumni => {
            filters.member_status = match filters.member_status {
                None => Some(MemberStatus::Pending),
                Some(MemberStatus::Pending) => Some(MemberStatus::Approved),
                Some(MemberStatus::Approved) => Some(MemberStatus::Rejected),
                Some(MemberStatus::Rejected) => None,
            };
            filters.mark_dirty();
        }
        Tab::Reports => {
            filters.shipping_status = match filters.shipping_status {
                None => Some(ShippingStatus::AwaitingShipment),
                Some(ShippingStatus::AwaitingShipment) => Some(ShippingStatus::InTransit),
                Some(ShippingStatus::InTransit) => Some(ShippingStatus::Delivered),
                Some(ShippingStatus::Delivered) => None,
            };
            filters.mark_dirty();
        }
        _ => {}
    }
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            if app.is_authenticated() {
                app.state = AppState::Normal;
            } else {
                // Nothing to fall back to without a session
                return Ok(true);
            }
        }
        KeyCode::Tab | KeyCode::Down => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => {
                let _ = app.attempt_login().await;
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if app.login_username.chars().count() < MAX_USERNAME_LENGTH {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if app.login_password.chars().count() < MAX_PASSWORD_LENGTH {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

/// Search edits feed the active view's debounced filter; the tracker
/// fetches on Enter instead (its search round-trips two endpoints).
fn handle_search_input(app: &mut App, key: KeyEvent) {
    let is_tracker = app.current_tab == Tab::Tracker;
    match key.code {
        KeyCode::Esc => app.state = AppState::Normal,
        KeyCode::Enter => {
            app.state = AppState::Normal;
            if is_tracker {
                app.run_tracker_search();
            }
        }
        KeyCode::Backspace => {
            if let Some(filters) = app.active_filters_mut() {
                filters.search.pop();
                if !is_tracker {
                    filters.mark_dirty();
                }
            }
        }
        KeyCode::Char(c) => {
            if let Some(filters) = app.active_filters_mut() {
                if filters.search.chars().count() < MAX_TEXT_INPUT_LENGTH {
                    filters.search.push(c);
                    if !is_tracker {
                        filters.mark_dirty();
                    }
                }
            }
        }
        _ => {}
    }
}

fn handle_edit_input(app: &mut App, key: KeyEvent) {
    if app.updating {
        // One mutation per submit; ignore input until the server answers
        return;
    }
    let Some(form) = app.edit_form.as_mut() else {
        app.state = AppState::Normal;
        return;
    };

    match key.code {
        KeyCode::Esc => {
            app.edit_form = None;
            app.state = AppState::Normal;
        }
        KeyCode::Tab | KeyCode::Down => form.focus = form.focus.next(),
        KeyCode::Enter => app.submit_single_update(),
        KeyCode::Left | KeyCode::Right if form.focus == EditField::Status => {
            form.status = match (form.status, key.code) {
                (ShippingStatus::AwaitingShipment, KeyCode::Right) => ShippingStatus::InTransit,
                (ShippingStatus::InTransit, KeyCode::Right) => ShippingStatus::Delivered,
                (ShippingStatus::Delivered, KeyCode::Right) => ShippingStatus::AwaitingShipment,
                (ShippingStatus::AwaitingShipment, _) => ShippingStatus::Delivered,
                (ShippingStatus::InTransit, _) => ShippingStatus::AwaitingShipment,
                (ShippingStatus::Delivered, _) => ShippingStatus::InTransit,
            };
        }
        KeyCode::Char(' ') if form.focus == EditField::Correction => {
            form.correction = !form.correction;
        }
        KeyCode::Backspace => match form.focus {
            EditField::Tracking => {
                form.tracking_number.pop();
            }
            EditField::Notes => {
                form.notes.pop();
            }
            _ => {}
        },
        KeyCode::Char(c) => match form.focus {
            EditField::Tracking => {
                if form.tracking_number.chars().count() < MAX_TEXT_INPUT_LENGTH {
                    form.tracking_number.push(c);
                }
            }
            EditField::Notes => {
                if form.notes.chars().count() < MAX_TEXT_INPUT_LENGTH {
                    form.notes.push(c);
                }
            }
            _ => {}
        },
        _ => {}
    }
}

fn handle_bulk_input(app: &mut App, key: KeyEvent) {
    if app.bulk_updating {
        return;
    }
    match key.code {
        KeyCode::Esc => {
            app.bulk_form = None;
            app.state = AppState::Normal;
        }
        KeyCode::Enter => app.submit_bulk_update(),
        KeyCode::Backspace => {
            if let Some(form) = app.bulk_form.as_mut() {
                form.notes.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(form) = app.bulk_form.as_mut() {
                if form.notes.chars().count() < MAX_TEXT_INPUT_LENGTH {
                    form.notes.push(c);
                }
            }
        }
        _ => {}
    }
}

fn handle_label_type_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.state = AppState::Normal,
        KeyCode::Down | KeyCode::Char('j') => {
            app.label_type_cursor = (app.label_type_cursor + 1) % LABEL_TYPE_OPTIONS.len();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.label_type_cursor =
                (app.label_type_cursor + LABEL_TYPE_OPTIONS.len() - 1) % LABEL_TYPE_OPTIONS.len();
        }
        KeyCode::Enter => {
            let label_type = LABEL_TYPE_OPTIONS[app.label_type_cursor];
            app.request_print(label_type);
        }
        _ => {}
    }
}

fn handle_batch_input(app: &mut App, key: KeyEvent) {
    let Some(chooser) = app.batch_chooser.as_mut() else {
        app.state = AppState::Normal;
        return;
    };
    let options = chooser.option_count();

    match key.code {
        KeyCode::Esc => {
            app.batch_chooser = None;
            app.state = AppState::Normal;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            chooser.selected = (chooser.selected + 1) % options;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            chooser.selected = (chooser.selected + options - 1) % options;
        }
        KeyCode::Enter => {
            let selected = chooser.selected;
            if selected == 0 {
                app.print_all_batches();
            } else {
                app.print_one_batch(selected);
            }
        }
        _ => {}
    }
}

fn handle_notifications_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('N') | KeyCode::Char('q') => {
            app.state = AppState::Normal;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if !app.notifications.is_empty() {
                app.notification_cursor =
                    (app.notification_cursor + 1).min(app.notifications.len() - 1);
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.notification_cursor = app.notification_cursor.saturating_sub(1);
        }
        KeyCode::Char('r') | KeyCode::Enter => app.mark_notification_read(),
        KeyCode::Char('a') => app.mark_all_notifications_read(),
        _ => {}
    }
}

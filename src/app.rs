//! Application state management for cardtrack.
//!
//! This module contains the core `App` struct that owns all application
//! state: the admin session, per-view filter and selection state, the
//! toast queue, and the channel that background network tasks report
//! back on. Every user action maps to at most one spawned request; the
//! triggering control stays disabled (via a pending flag) until the
//! result arrives.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::client::{AlumniListQuery, ShippingListQuery};
use crate::api::ApiClient;
use crate::auth::{CredentialStore, Session, SessionData};
use crate::config::Config;
use crate::labels::{self, LabelType, SheetOutcome};
use crate::models::{
    AlumniRecord, DetailedReport, MemberStatus, Notification, ShippingStatistics, ShippingStatus,
};
use crate::selection::SelectionSet;
use crate::toast::{ToastKind, ToastQueue};
use crate::utils::contains_ignore_case;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Filter edits settle for this long before the re-fetch fires
const FILTER_DEBOUNCE: Duration = Duration::from_millis(500);

/// Interval between notification polls
const NOTIFICATION_POLL: Duration = Duration::from_secs(30);

/// Page size for the shipping queue view
const QUEUE_PAGE_SIZE: u32 = 10;

/// Page size for the shipping manager view
const MANAGE_PAGE_SIZE: u32 = 50;

/// Result cap for tracker searches
const TRACKER_LIMIT: u32 = 50;

/// Page size for the detailed report view
const REPORT_PAGE_SIZE: u32 = 20;

/// Result cap for the statistics fallback computation
const STATS_FALLBACK_LIMIT: u32 = 1000;

/// Maximum length for username input
pub const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for free-text inputs (tracking number, notes, search)
pub const MAX_TEXT_INPUT_LENGTH: usize = 200;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Queue,
    Manage,
    Tracker,
    Dashboard,
    Alumni,
    Reports,
}

impl Tab {
    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Queue => "Queue",
            Tab::Manage => "Shipping",
            Tab::Tracker => "Tracker",
            Tab::Dashboard => "Dashboard",
            Tab::Alumni => "Alumni",
            Tab::Reports => "Reports",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Queue => Tab::Manage,
            Tab::Manage => Tab::Tracker,
            Tab::Tracker => Tab::Dashboard,
            Tab::Dashboard => Tab::Alumni,
            Tab::Alumni => Tab::Reports,
            Tab::Reports => Tab::Queue,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Queue => Tab::Reports,
            Tab::Manage => Tab::Queue,
            Tab::Tracker => Tab::Manage,
            Tab::Dashboard => Tab::Tracker,
            Tab::Alumni => Tab::Dashboard,
            Tab::Reports => Tab::Alumni,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    LoggingIn,
    EditingShipping,
    ConfirmingBulk,
    ChoosingLabelType,
    ChoosingBatch,
    ViewingNotifications,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

/// Field focus inside the shipping status editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Status,
    Tracking,
    Notes,
    Correction,
}

impl EditField {
    pub fn next(&self) -> Self {
        match self {
            EditField::Status => EditField::Tracking,
            EditField::Tracking => EditField::Notes,
            EditField::Notes => EditField::Correction,
            EditField::Correction => EditField::Status,
        }
    }
}

/// State of the single-record shipping status editor
#[derive(Debug, Clone)]
pub struct EditForm {
    pub record_id: String,
    pub record_name: String,
    /// Server-confirmed status at the time the editor opened
    pub original_status: ShippingStatus,
    pub status: ShippingStatus,
    pub tracking_number: String,
    pub notes: String,
    /// Permits backward transitions (manual correction)
    pub correction: bool,
    pub focus: EditField,
}

/// State of the bulk update confirmation dialog
#[derive(Debug, Clone)]
pub struct BulkForm {
    pub status: ShippingStatus,
    pub notes: String,
    pub count: usize,
}

/// Batch chooser shown when a 4-up print run spans several sheets.
/// Option 0 is "print all"; option i (1-based) is sheet i alone.
#[derive(Debug, Clone)]
pub struct BatchChooser {
    pub batches: Vec<Vec<String>>,
    pub selected: usize,
}

impl BatchChooser {
    pub fn option_count(&self) -> usize {
        self.batches.len() + 1
    }
}

/// Per-view filter and pagination state. Views own their filters
/// independently; a change resets to page 1 and arms the debounce.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    pub search: String,
    pub shipping_status: Option<ShippingStatus>,
    pub member_status: Option<MemberStatus>,
    pub department: String,
    pub graduation_year: String,
    pub page: u32,
    pub total_pages: u32,
    dirty_since: Option<Instant>,
}

impl Filters {
    pub fn new() -> Self {
        Self {
            page: 1,
            total_pages: 1,
            ..Default::default()
        }
    }

    /// Record a filter edit: back to page 1, re-fetch after the debounce
    pub fn mark_dirty(&mut self) {
        self.page = 1;
        self.dirty_since = Some(Instant::now());
    }

    /// Page changes re-fetch immediately (no debounce, no page reset)
    pub fn set_page(&mut self, page: u32) {
        self.page = page.clamp(1, self.total_pages.max(1));
    }

    /// True once the debounce interval has elapsed since the last edit;
    /// clears the dirty marker.
    fn take_due(&mut self) -> bool {
        if let Some(since) = self.dirty_since {
            if since.elapsed() >= FILTER_DEBOUNCE {
                self.dirty_since = None;
                return true;
            }
        }
        false
    }

    pub fn clear(&mut self) {
        let total_pages = self.total_pages;
        *self = Filters::new();
        self.total_pages = total_pages;
        self.mark_dirty();
    }

    fn to_shipping_query(&self, limit: u32) -> ShippingListQuery {
        ShippingListQuery {
            page: self.page,
            limit,
            shipping_status: self.shipping_status,
            search: self.search.clone(),
            department: self.department.clone(),
            graduation_year: self.graduation_year.clone(),
        }
    }

    fn to_alumni_query(&self, limit: u32) -> AlumniListQuery {
        AlumniListQuery {
            page: self.page,
            limit,
            search: self.search.clone(),
            status: self.member_status,
            department: self.department.clone(),
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results from spawned network tasks, delivered over an MPSC channel
/// and drained once per event-loop pass.
pub enum TaskResult {
    QueuePage { rows: Vec<AlumniRecord>, total_pages: u32 },
    ManagePage { rows: Vec<AlumniRecord>, total_pages: u32 },
    TrackerResults { rows: Vec<AlumniRecord> },
    AlumniPage { rows: Vec<AlumniRecord>, total_pages: u32 },
    Statistics(ShippingStatistics),
    Report(DetailedReport),
    Notifications { items: Vec<Notification>, unread: u64 },
    /// Single-record update confirmed; carries the record as the server
    /// returned it
    SingleUpdated(AlumniRecord),
    SingleUpdateFailed(String),
    BulkUpdated { count: u64 },
    BulkUpdateFailed(String),
    /// One sheet of a multi-sheet print run finished (either way)
    Sheet(SheetOutcome),
    PrintRunDone { total: usize },
    /// A single-document print (no partitioning) was spooled and opened
    DocumentReady { path: PathBuf },
    PrintFailed(String),
    ExportDone { path: PathBuf },
    ExportFailed(String),
    /// A view fetch failed; the view keeps its previous rows
    FetchFailed { tab: Tab, message: String },
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub session: Session,
    pub api: ApiClient,
    data_dir: PathBuf,

    // UI state
    pub state: AppState,
    pub current_tab: Tab,
    pub toasts: ToastQueue,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Queue view (awaiting shipment)
    pub queue_rows: Vec<AlumniRecord>,
    pub queue_filters: Filters,
    pub queue_selection: SelectionSet,
    pub queue_cursor: usize,
    pub queue_loading: bool,

    // Shipping manager view (any shipping status, single + bulk edits)
    pub manage_rows: Vec<AlumniRecord>,
    pub manage_filters: Filters,
    pub manage_selection: SelectionSet,
    pub manage_cursor: usize,
    pub manage_loading: bool,

    // Tracker view (read-only search)
    pub tracker_rows: Vec<AlumniRecord>,
    pub tracker_filters: Filters,
    pub tracker_cursor: usize,
    pub tracker_loading: bool,
    pub tracker_searched: bool,

    // Dashboard view
    pub stats: Option<ShippingStatistics>,
    pub stats_loading: bool,

    // Alumni management view
    pub alumni_rows: Vec<AlumniRecord>,
    pub alumni_filters: Filters,
    pub alumni_cursor: usize,
    pub alumni_loading: bool,

    // Reports view
    pub report: Option<DetailedReport>,
    pub report_filters: Filters,
    pub report_cursor: usize,
    pub report_loading: bool,

    // Notifications
    pub notifications: Vec<Notification>,
    pub unread_count: u64,
    pub notification_cursor: usize,
    last_notification_poll: Option<Instant>,

    // Modal state
    pub edit_form: Option<EditForm>,
    pub bulk_form: Option<BulkForm>,
    pub batch_chooser: Option<BatchChooser>,
    pub label_type_cursor: usize,

    // Pending-request flags; each disables its triggering control
    pub updating: bool,
    pub bulk_updating: bool,
    pub printing: bool,
    pub exporting: bool,

    // Background task channel
    task_rx: Option<mpsc::Receiver<TaskResult>>,
    task_tx: mpsc::Sender<TaskResult>,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let data_dir = config.data_dir().unwrap_or_else(|_| PathBuf::from("./cardtrack-data"));

        let mut session = Session::new(data_dir.clone());
        let load_result = session.load();
        debug!(?load_result, has_data = session.data.is_some(), "Session loaded");

        let mut api = ApiClient::new(config.api_url())?;
        if let Some(ref data) = session.data {
            if !data.is_expired() {
                api.set_token(data.token.clone());
            }
        }

        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_username = std::env::var("CARDTRACK_USERNAME")
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();
        let login_password = std::env::var("CARDTRACK_PASSWORD").unwrap_or_default();

        let mut queue_filters = Filters::new();
        // The queue view is pinned to records still waiting to ship
        queue_filters.shipping_status = Some(ShippingStatus::AwaitingShipment);

        Ok(Self {
            config,
            session,
            api,
            data_dir,

            state: AppState::Normal,
            current_tab: Tab::Queue,
            toasts: ToastQueue::new(),

            login_username,
            login_password,
            login_focus: LoginFocus::Username,
            login_error: None,

            queue_rows: Vec::new(),
            queue_filters,
            queue_selection: SelectionSet::new(),
            queue_cursor: 0,
            queue_loading: false,

            manage_rows: Vec::new(),
            manage_filters: Filters::new(),
            manage_selection: SelectionSet::new(),
            manage_cursor: 0,
            manage_loading: false,

            tracker_rows: Vec::new(),
            tracker_filters: Filters::new(),
            tracker_cursor: 0,
            tracker_loading: false,
            tracker_searched: false,

            stats: None,
            stats_loading: false,

            alumni_rows: Vec::new(),
            alumni_filters: Filters::new(),
            alumni_cursor: 0,
            alumni_loading: false,

            report: None,
            report_filters: Filters::new(),
            report_cursor: 0,
            report_loading: false,

            notifications: Vec::new(),
            unread_count: 0,
            notification_cursor: 0,
            last_notification_poll: None,

            edit_form: None,
            bulk_form: None,
            batch_chooser: None,
            label_type_cursor: 0,

            updating: false,
            bulk_updating: false,
            printing: false,
            exporting: false,

            task_rx: Some(task_rx),
            task_tx,
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.session.is_valid()
    }

    /// Show the login overlay
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
        self.login_error = None;

        if self.login_password.is_empty() && CredentialStore::has_credentials(&self.login_username) {
            if let Ok(password) = CredentialStore::get_password(&self.login_username) {
                self.login_password = password;
            }
        }
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<()> {
        let username = self.login_username.clone();
        let password = self.login_password.clone();

        if username.is_empty() || password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return Err(anyhow::anyhow!("Username and password required"));
        }

        self.login_error = None;

        match self.api.login(&username, &password).await {
            Ok(session_data) => {
                if let Err(e) = CredentialStore::store(&username, &password) {
                    warn!(error = %e, "Failed to store credentials");
                }

                self.config.last_username = Some(username);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.api.set_token(session_data.token.clone());
                self.session.update(session_data);
                if let Err(e) = self.session.save() {
                    warn!(error = %e, "Failed to save session");
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                info!("Login successful");

                self.refresh_current_view();
                self.poll_notifications();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                let text = e.to_string();
                let user_message = if text.contains("Unauthorized") || text.contains("401") {
                    "Invalid username or password".to_string()
                } else if text.to_lowercase().contains("network")
                    || text.to_lowercase().contains("connect")
                {
                    "Unable to reach the backend. Check that it is running.".to_string()
                } else if text.to_lowercase().contains("timeout") {
                    "Connection timed out. Please try again.".to_string()
                } else {
                    format!("Login failed: {}", e)
                };
                self.login_error = Some(user_message);
                Err(e)
            }
        }
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear session");
        }
        self.start_login();
    }

    // =========================================================================
    // View fetching
    // =========================================================================

    /// Switch tabs. Every switch re-fetches - views hold no cache worth
    /// trusting across navigation.
    pub fn switch_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
        self.refresh_current_view();
    }

    /// Fetch the current tab's data
    pub fn refresh_current_view(&mut self) {
        match self.current_tab {
            Tab::Queue => self.fetch_queue(),
            Tab::Manage => self.fetch_manage(),
            Tab::Tracker => {
                // Tracker fetches on demand (Enter in the search box)
            }
            Tab::Dashboard => self.fetch_statistics(),
            Tab::Alumni => self.fetch_alumni(),
            Tab::Reports => self.fetch_report(),
        }
    }

    fn fetch_queue(&mut self) {
        if self.queue_loading {
            return;
        }
        self.queue_loading = true;

        let api = self.api.clone();
        let query = self.queue_filters.to_shipping_query(QUEUE_PAGE_SIZE);
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            let result = match api.fetch_shipping_list(&query).await {
                Ok(page) => TaskResult::QueuePage {
                    rows: page.data,
                    total_pages: page.total_pages,
                },
                Err(e) => TaskResult::FetchFailed {
                    tab: Tab::Queue,
                    message: format!("{:#}", e),
                },
            };
            Self::send_result(&tx, result).await;
        });
    }

    fn fetch_manage(&mut self) {
        if self.manage_loading {
            return;
        }
        self.manage_loading = true;

        let api = self.api.clone();
        let query = self.manage_filters.to_shipping_query(MANAGE_PAGE_SIZE);
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            let result = match api.fetch_shipping_list(&query).await {
                Ok(page) => TaskResult::ManagePage {
                    rows: page.data,
                    total_pages: page.total_pages,
                },
                Err(e) => TaskResult::FetchFailed {
                    tab: Tab::Manage,
                    message: format!("{:#}", e),
                },
            };
            Self::send_result(&tx, result).await;
        });
    }

    /// Run a tracker search. Falls back from the shipping-list endpoint
    /// to the general roster (filtered client-side to shippable records)
    /// when the first pass finds nothing.
    pub fn run_tracker_search(&mut self) {
        if self.tracker_loading {
            return;
        }
        let search = self.tracker_filters.search.trim().to_string();
        if search.is_empty() {
            self.toasts
                .push("Enter a name, ID card, or tracking number", ToastKind::Info);
            return;
        }

        self.tracker_loading = true;
        self.tracker_searched = true;

        let api = self.api.clone();
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            let query = ShippingListQuery {
                limit: TRACKER_LIMIT,
                search: search.clone(),
                ..Default::default()
            };

            let mut rows = match api.fetch_shipping_list(&query).await {
                Ok(page) => page.data,
                Err(e) => {
                    Self::send_result(
                        &tx,
                        TaskResult::FetchFailed {
                            tab: Tab::Tracker,
                            message: format!("{:#}", e),
                        },
                    )
                    .await;
                    return;
                }
            };

            if rows.is_empty() {
                let fallback = AlumniListQuery {
                    page: 1,
                    limit: 100,
                    search: search.clone(),
                    ..Default::default()
                };
                if let Ok(page) = api.fetch_alumni(&fallback).await {
                    rows = page
                        .data
                        .into_iter()
                        .filter(|r| r.is_shippable())
                        .filter(|r| {
                            contains_ignore_case(&r.full_name(), &search)
                                || r.id_card.as_deref().is_some_and(|c| c.contains(&search))
                                || r.phone.as_deref().is_some_and(|p| p.contains(&search))
                                || r.tracking_number
                                    .as_deref()
                                    .is_some_and(|t| contains_ignore_case(t, &search))
                        })
                        .collect();
                }
            }

            Self::send_result(&tx, TaskResult::TrackerResults { rows }).await;
        });
    }

    fn fetch_statistics(&mut self) {
        if self.stats_loading {
            return;
        }
        self.stats_loading = true;

        let api = self.api.clone();
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            match api.fetch_shipping_statistics().await {
                Ok(stats) => Self::send_result(&tx, TaskResult::Statistics(stats)).await,
                Err(e) => {
                    // The statistics endpoint has been flaky across backend
                    // versions; recompute from the per-status lists instead.
                    debug!(error = %e, "Statistics endpoint failed, computing fallback");
                    match Self::compute_statistics_fallback(&api).await {
                        Ok(stats) => Self::send_result(&tx, TaskResult::Statistics(stats)).await,
                        Err(e) => {
                            Self::send_result(
                                &tx,
                                TaskResult::FetchFailed {
                                    tab: Tab::Dashboard,
                                    message: format!("{:#}", e),
                                },
                            )
                            .await
                        }
                    }
                }
            }
        });
    }

    async fn compute_statistics_fallback(api: &ApiClient) -> Result<ShippingStatistics> {
        let query_for = |status: ShippingStatus| ShippingListQuery {
            limit: STATS_FALLBACK_LIMIT,
            shipping_status: Some(status),
            ..Default::default()
        };

        let awaiting_query = query_for(ShippingStatus::AwaitingShipment);
        let transit_query = query_for(ShippingStatus::InTransit);
        let delivered_query = query_for(ShippingStatus::Delivered);

        let (awaiting, transit, delivered) = tokio::join!(
            api.fetch_shipping_list(&awaiting_query),
            api.fetch_shipping_list(&transit_query),
            api.fetch_shipping_list(&delivered_query),
        );

        let count = |page: Result<crate::models::AlumniPage>| -> Result<u64> {
            let page = page?;
            Ok(page.total.unwrap_or(page.data.len() as u64))
        };

        Ok(ShippingStatistics {
            awaiting_shipment: count(awaiting)?,
            in_transit: count(transit)?,
            delivered: count(delivered)?,
            overdue: 0,
        })
    }

    fn fetch_alumni(&mut self) {
        if self.alumni_loading {
            return;
        }
        self.alumni_loading = true;

        let api = self.api.clone();
        let query = self.alumni_filters.to_alumni_query(QUEUE_PAGE_SIZE);
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            let result = match api.fetch_alumni(&query).await {
                Ok(page) => TaskResult::AlumniPage {
                    rows: page.data,
                    total_pages: page.total_pages,
                },
                Err(e) => TaskResult::FetchFailed {
                    tab: Tab::Alumni,
                    message: format!("{:#}", e),
                },
            };
            Self::send_result(&tx, result).await;
        });
    }

    fn fetch_report(&mut self) {
        if self.report_loading {
            return;
        }
        self.report_loading = true;

        let api = self.api.clone();
        let query = self.report_filters.to_shipping_query(REPORT_PAGE_SIZE);
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            let result = match api.fetch_detailed_report(&query).await {
                Ok(report) => TaskResult::Report(report),
                Err(e) => TaskResult::FetchFailed {
                    tab: Tab::Reports,
                    message: format!("{:#}", e),
                },
            };
            Self::send_result(&tx, result).await;
        });
    }

    // =========================================================================
    // Shipping status editor (single record)
    // =========================================================================

    /// Open the editor for the record under the cursor in the manager view
    pub fn open_edit_form(&mut self) {
        let Some(record) = self.manage_rows.get(self.manage_cursor) else {
            return;
        };
        self.edit_form = Some(EditForm {
            record_id: record.id.clone(),
            record_name: record.full_name(),
            original_status: record.shipping_status_or_default(),
            status: record.shipping_status_or_default(),
            tracking_number: record.tracking_number.clone().unwrap_or_default(),
            notes: String::new(),
            correction: false,
            focus: EditField::Status,
        });
        self.state = AppState::EditingShipping;
    }

    /// Submit the editor. Exactly one mutation per submit; the form stays
    /// open (and the flag set) until the server answers.
    pub fn submit_single_update(&mut self) {
        if self.updating {
            return;
        }
        let Some(form) = self.edit_form.clone() else {
            return;
        };

        if !form.original_status.can_transition_to(form.status, form.correction) {
            self.toasts.push(
                format!(
                    "{} → {} is a backward transition; enable correction mode to allow it",
                    form.original_status, form.status
                ),
                ToastKind::Error,
            );
            return;
        }

        self.updating = true;

        let api = self.api.clone();
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            let result = match api
                .update_shipping(&form.record_id, form.status, &form.tracking_number, &form.notes)
                .await
            {
                Ok(record) => TaskResult::SingleUpdated(record),
                Err(e) => TaskResult::SingleUpdateFailed(format!("{:#}", e)),
            };
            Self::send_result(&tx, result).await;
        });
    }

    // =========================================================================
    // Bulk status updater
    // =========================================================================

    /// Selection set belonging to the active tab, if it has one
    fn active_selection(&mut self) -> Option<&mut SelectionSet> {
        match self.current_tab {
            Tab::Queue => Some(&mut self.queue_selection),
            Tab::Manage => Some(&mut self.manage_selection),
            _ => None,
        }
    }

    /// Open the bulk confirmation dialog for the given target status.
    /// An empty selection is rejected here, before any network call.
    pub fn open_bulk_form(&mut self, status: ShippingStatus) {
        let count = match self.active_selection() {
            Some(sel) => sel.len(),
            None => return,
        };
        if count == 0 {
            self.toasts
                .push("Select at least one record first", ToastKind::Error);
            return;
        }
        self.bulk_form = Some(BulkForm {
            status,
            notes: String::new(),
            count,
        });
        self.state = AppState::ConfirmingBulk;
    }

    /// Submit the bulk update: one request, no retries, treated as
    /// all-or-nothing.
    pub fn submit_bulk_update(&mut self) {
        if self.bulk_updating {
            return;
        }
        let Some(form) = self.bulk_form.clone() else {
            return;
        };
        let ids = match self.active_selection() {
            Some(sel) if !sel.is_empty() => sel.to_vec(),
            _ => {
                self.toasts
                    .push("Select at least one record first", ToastKind::Error);
                return;
            }
        };

        self.bulk_updating = true;

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let submitted = ids.len();

        tokio::spawn(async move {
            let result = match api.bulk_update_shipping(&ids, form.status, &form.notes).await {
                Ok(summary) => TaskResult::BulkUpdated {
                    count: summary.count_or(submitted),
                },
                Err(e) => TaskResult::BulkUpdateFailed(format!("{:#}", e)),
            };
            Self::send_result(&tx, result).await;
        });
    }

    // =========================================================================
    // Label printing
    // =========================================================================

    /// Entry point from the label-type chooser. Routes a 4-up selection
    /// larger than one sheet through the batch chooser; everything else
    /// prints as one document.
    pub fn request_print(&mut self, label_type: LabelType) {
        let ids = match self.active_selection() {
            Some(sel) => sel.to_vec(),
            None => return,
        };
        if ids.is_empty() {
            self.toasts
                .push("Select at least one record first", ToastKind::Error);
            return;
        }

        if label_type == LabelType::FourUp {
            let batches = labels::partition_batches(&ids);
            if batches.len() > 1 {
                self.batch_chooser = Some(BatchChooser {
                    batches,
                    selected: 0,
                });
                self.state = AppState::ChoosingBatch;
                return;
            }
        }

        self.state = AppState::Normal;
        self.print_document(ids, label_type);
    }

    /// Fetch one label document (no partitioning), spool it, open it
    fn print_document(&mut self, ids: Vec<String>, label_type: LabelType) {
        if self.printing {
            return;
        }
        self.printing = true;

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let data_dir = self.data_dir.clone();

        tokio::spawn(async move {
            let result = async {
                let html = labels::render_selection(&api, &ids, label_type).await?;
                let path = labels::spool_document(&data_dir, label_type.as_str(), &html)?;
                labels::open_viewer(&path)?;
                Ok::<_, anyhow::Error>(path)
            }
            .await;

            let result = match result {
                Ok(path) => TaskResult::DocumentReady { path },
                Err(e) => TaskResult::PrintFailed(format!("{:#}", e)),
            };
            Self::send_result(&tx, result).await;
        });
    }

    /// Print every sheet of the pending batch run, staggered so each
    /// viewer launch lands before the next starts. Sheets report
    /// independently; a failure does not stop the run.
    pub fn print_all_batches(&mut self) {
        let Some(chooser) = self.batch_chooser.take() else {
            return;
        };
        self.state = AppState::Normal;
        if self.printing {
            return;
        }
        self.printing = true;

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let data_dir = self.data_dir.clone();
        let batches = chooser.batches;

        tokio::spawn(async move {
            let total = batches.len();
            for (i, batch) in batches.into_iter().enumerate() {
                if i > 0 {
                    tokio::time::sleep(labels::SHEET_STAGGER).await;
                }
                let outcome = labels::print_sheet(&api, &batch, &data_dir, i + 1, total).await;
                Self::send_result(&tx, TaskResult::Sheet(outcome)).await;
            }
            Self::send_result(&tx, TaskResult::PrintRunDone { total }).await;
        });
    }

    /// Print one chosen sheet from the batch chooser (1-based index)
    pub fn print_one_batch(&mut self, index: usize) {
        let Some(chooser) = self.batch_chooser.as_ref() else {
            return;
        };
        let Some(batch) = chooser.batches.get(index.saturating_sub(1)).cloned() else {
            return;
        };
        self.batch_chooser = None;
        self.state = AppState::Normal;
        self.print_document(batch, LabelType::FourUp);
    }

    // =========================================================================
    // Alumni management (approve / reject)
    // =========================================================================

    pub fn set_member_status(&mut self, status: MemberStatus) {
        if self.updating {
            return;
        }
        let Some(record) = self.alumni_rows.get(self.alumni_cursor) else {
            return;
        };
        self.updating = true;

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let id = record.id.clone();

        tokio::spawn(async move {
            let result = match api.update_member_status(&id, status).await {
                Ok(()) => match api.fetch_alumni_detail(&id).await {
                    Ok(record) => TaskResult::SingleUpdated(record),
                    Err(e) => TaskResult::SingleUpdateFailed(format!("{:#}", e)),
                },
                Err(e) => TaskResult::SingleUpdateFailed(format!("{:#}", e)),
            };
            Self::send_result(&tx, result).await;
        });
    }

    // =========================================================================
    // Reports and exports
    // =========================================================================

    /// Download one of the spreadsheet exports into the data directory
    pub fn download_export(&mut self, endpoint: &'static str, file_stem: &'static str) {
        if self.exporting {
            return;
        }
        self.exporting = true;

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let query = self.report_filters.to_shipping_query(0);
        let data_dir = self.data_dir.clone();

        tokio::spawn(async move {
            let result = async {
                let bytes = api.download_export(endpoint, &query).await?;
                let dir = data_dir.join("exports");
                std::fs::create_dir_all(&dir)?;
                let stamp = chrono::Utc::now().format("%Y-%m-%d");
                let path = dir.join(format!("{}-{}.xlsx", file_stem, stamp));
                std::fs::write(&path, bytes)?;
                Ok::<_, anyhow::Error>(path)
            }
            .await;

            let result = match result {
                Ok(path) => TaskResult::ExportDone { path },
                Err(e) => TaskResult::ExportFailed(format!("{:#}", e)),
            };
            Self::send_result(&tx, result).await;
        });
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    pub fn poll_notifications(&mut self) {
        self.last_notification_poll = Some(Instant::now());

        let api = self.api.clone();
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            match api.fetch_notifications().await {
                Ok(resp) => {
                    Self::send_result(
                        &tx,
                        TaskResult::Notifications {
                            items: resp.data,
                            unread: resp.unread_count,
                        },
                    )
                    .await
                }
                Err(e) => {
                    // Polling failures stay quiet; the next tick retries
                    debug!(error = %e, "Notification poll failed");
                }
            }
        });
    }

    pub fn mark_notification_read(&mut self) {
        let Some(notification) = self.notifications.get(self.notification_cursor) else {
            return;
        };
        let api = self.api.clone();
        let id = notification.id.clone();
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = api.mark_notification_read(&id).await {
                warn!(error = %e, "Failed to mark notification read");
            }
            match api.fetch_notifications().await {
                Ok(resp) => {
                    Self::send_result(
                        &tx,
                        TaskResult::Notifications {
                            items: resp.data,
                            unread: resp.unread_count,
                        },
                    )
                    .await
                }
                Err(e) => debug!(error = %e, "Notification refresh failed"),
            }
        });
    }

    pub fn mark_all_notifications_read(&mut self) {
        let api = self.api.clone();
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = api.mark_all_notifications_read().await {
                warn!(error = %e, "Failed to mark all notifications read");
            }
            match api.fetch_notifications().await {
                Ok(resp) => {
                    Self::send_result(
                        &tx,
                        TaskResult::Notifications {
                            items: resp.data,
                            unread: resp.unread_count,
                        },
                    )
                    .await
                }
                Err(e) => debug!(error = %e, "Notification refresh failed"),
            }
        });
    }

    // =========================================================================
    // Event-loop integration
    // =========================================================================

    /// Per-tick housekeeping: expire toasts, fire due debounced
    /// re-fetches, poll notifications on schedule.
    pub fn tick(&mut self) {
        self.toasts.prune();

        if self.queue_filters.take_due() {
            self.fetch_queue();
        }
        if self.manage_filters.take_due() {
            self.fetch_manage();
        }
        if self.alumni_filters.take_due() {
            self.fetch_alumni();
        }
        if self.report_filters.take_due() {
            self.fetch_report();
        }

        let poll_due = self
            .last_notification_poll
            .map(|t| t.elapsed() >= NOTIFICATION_POLL)
            .unwrap_or(true);
        if poll_due && self.is_authenticated() {
            self.poll_notifications();
        }
    }

    /// Helper to send task results, logging channel errors
    async fn send_result(tx: &mpsc::Sender<TaskResult>, result: TaskResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send task result - channel closed");
        }
    }

    /// Drain and apply completed background tasks
    pub fn check_background_tasks(&mut self) {
        let results: Vec<TaskResult> = {
            if let Some(ref mut rx) = self.task_rx {
                let mut results = Vec::new();
                while let Ok(result) = rx.try_recv() {
                    results.push(result);
                }
                results
            } else {
                Vec::new()
            }
        };

        for result in results {
            self.process_task_result(result);
        }
    }

    fn process_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::QueuePage { rows, total_pages } => {
                self.queue_loading = false;
                self.queue_filters.total_pages = total_pages.max(1);
                self.queue_cursor = self.queue_cursor.min(rows.len().saturating_sub(1));
                self.queue_rows = rows;
            }
            TaskResult::ManagePage { rows, total_pages } => {
                self.manage_loading = false;
                self.manage_filters.total_pages = total_pages.max(1);
                self.manage_cursor = self.manage_cursor.min(rows.len().saturating_sub(1));
                self.manage_rows = rows;
            }
            TaskResult::TrackerResults { rows } => {
                self.tracker_loading = false;
                self.tracker_cursor = 0;
                if rows.is_empty() {
                    self.toasts
                        .push("No shipping records matched the search", ToastKind::Info);
                }
                self.tracker_rows = rows;
            }
            TaskResult::AlumniPage { rows, total_pages } => {
                self.alumni_loading = false;
                self.alumni_filters.total_pages = total_pages.max(1);
                self.alumni_cursor = self.alumni_cursor.min(rows.len().saturating_sub(1));
                self.alumni_rows = rows;
            }
            TaskResult::Statistics(stats) => {
                self.stats_loading = false;
                self.stats = Some(stats);
            }
            TaskResult::Report(report) => {
                self.report_loading = false;
                self.report_cursor = self
                    .report_cursor
                    .min(report.shipments.len().saturating_sub(1));
                self.report = Some(report);
            }
            TaskResult::Notifications { items, unread } => {
                self.notification_cursor = self
                    .notification_cursor
                    .min(items.len().saturating_sub(1));
                self.notifications = items;
                self.unread_count = unread;
            }
            TaskResult::SingleUpdated(record) => {
                self.updating = false;
                self.edit_form = None;
                if self.state == AppState::EditingShipping {
                    self.state = AppState::Normal;
                }
                self.apply_updated_record(record);
                self.toasts.push("Saved", ToastKind::Success);
                self.refresh_current_view();
            }
            TaskResult::SingleUpdateFailed(message) => {
                self.updating = false;
                // The form stays open with the admin's input; nothing was
                // applied locally, so there is nothing to roll back
                self.toasts.push(message, ToastKind::Error);
            }
            TaskResult::BulkUpdated { count } => {
                self.bulk_updating = false;
                self.bulk_form = None;
                if self.state == AppState::ConfirmingBulk {
                    self.state = AppState::Normal;
                }
                if let Some(sel) = self.active_selection() {
                    sel.clear();
                }
                self.toasts
                    .push(format!("Updated {} records", count), ToastKind::Success);
                self.refresh_current_view();
            }
            TaskResult::BulkUpdateFailed(message) => {
                self.bulk_updating = false;
                self.toasts.push(message, ToastKind::Error);
            }
            TaskResult::Sheet(outcome) => match outcome.result {
                Ok(path) => {
                    self.toasts.push(
                        format!(
                            "Sheet {}/{} opened ({})",
                            outcome.index,
                            outcome.total,
                            path.display()
                        ),
                        ToastKind::Success,
                    );
                }
                Err(message) => {
                    self.toasts.push(message, ToastKind::Error);
                }
            },
            TaskResult::PrintRunDone { total } => {
                self.printing = false;
                self.toasts
                    .push(format!("Print run finished ({} sheets)", total), ToastKind::Info);
                if let Some(sel) = self.active_selection() {
                    sel.clear();
                }
            }
            TaskResult::DocumentReady { path } => {
                self.printing = false;
                self.toasts.push(
                    format!("Label document opened ({})", path.display()),
                    ToastKind::Success,
                );
            }
            TaskResult::PrintFailed(message) => {
                self.printing = false;
                self.toasts.push(message, ToastKind::Error);
            }
            TaskResult::ExportDone { path } => {
                self.exporting = false;
                self.toasts.push(
                    format!("Export saved to {}", path.display()),
                    ToastKind::Success,
                );
            }
            TaskResult::ExportFailed(message) => {
                self.exporting = false;
                self.toasts.push(message, ToastKind::Error);
            }
            TaskResult::FetchFailed { tab, message } => {
                match tab {
                    Tab::Queue => self.queue_loading = false,
                    Tab::Manage => self.manage_loading = false,
                    Tab::Tracker => self.tracker_loading = false,
                    Tab::Dashboard => self.stats_loading = false,
                    Tab::Alumni => self.alumni_loading = false,
                    Tab::Reports => self.report_loading = false,
                }
                self.toasts.push(message, ToastKind::Error);
            }
        }
    }

    /// Replace the updated record wherever a view is holding it. The
    /// displayed state is exactly what the server confirmed.
    fn apply_updated_record(&mut self, record: AlumniRecord) {
        for rows in [
            &mut self.queue_rows,
            &mut self.manage_rows,
            &mut self.tracker_rows,
            &mut self.alumni_rows,
        ] {
            if let Some(existing) = rows.iter_mut().find(|r| r.id == record.id) {
                *existing = record.clone();
            }
        }
    }

    // =========================================================================
    // Cursor and filter helpers for input handling
    // =========================================================================

    /// Rows of the active tab's table
    pub fn active_row_count(&self) -> usize {
        match self.current_tab {
            Tab::Queue => self.queue_rows.len(),
            Tab::Manage => self.manage_rows.len(),
            Tab::Tracker => self.tracker_rows.len(),
            Tab::Dashboard => 0,
            Tab::Alumni => self.alumni_rows.len(),
            Tab::Reports => self.report.as_ref().map(|r| r.shipments.len()).unwrap_or(0),
        }
    }

    pub fn active_cursor_mut(&mut self) -> Option<&mut usize> {
        match self.current_tab {
            Tab::Queue => Some(&mut self.queue_cursor),
            Tab::Manage => Some(&mut self.manage_cursor),
            Tab::Tracker => Some(&mut self.tracker_cursor),
            Tab::Dashboard => None,
            Tab::Alumni => Some(&mut self.alumni_cursor),
            Tab::Reports => Some(&mut self.report_cursor),
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let count = self.active_row_count();
        if count == 0 {
            return;
        }
        if let Some(cursor) = self.active_cursor_mut() {
            let next = cursor.saturating_add_signed(delta);
            *cursor = next.min(count - 1);
        }
    }

    /// Filters of the active tab, if it has any
    pub fn active_filters_mut(&mut self) -> Option<&mut Filters> {
        match self.current_tab {
            Tab::Queue => Some(&mut self.queue_filters),
            Tab::Manage => Some(&mut self.manage_filters),
            Tab::Tracker => Some(&mut self.tracker_filters),
            Tab::Dashboard => None,
            Tab::Alumni => Some(&mut self.alumni_filters),
            Tab::Reports => Some(&mut self.report_filters),
        }
    }

    /// Page forward/backward in the active view and re-fetch immediately
    pub fn change_page(&mut self, delta: i32) {
        let Some(filters) = self.active_filters_mut() else {
            return;
        };
        let new_page = filters.page.saturating_add_signed(delta).max(1);
        if new_page == filters.page {
            return;
        }
        filters.set_page(new_page);
        self.refresh_current_view();
    }

    /// Toggle the row under the cursor in the active selection
    pub fn toggle_current_row(&mut self) {
        let (id, tab) = match self.current_tab {
            Tab::Queue => (
                self.queue_rows.get(self.queue_cursor).map(|r| r.id.clone()),
                Tab::Queue,
            ),
            Tab::Manage => (
                self.manage_rows.get(self.manage_cursor).map(|r| r.id.clone()),
                Tab::Manage,
            ),
            _ => return,
        };
        let Some(id) = id else { return };
        match tab {
            Tab::Queue => {
                self.queue_selection.toggle(&id);
            }
            Tab::Manage => {
                self.manage_selection.toggle(&id);
            }
            _ => {}
        }
    }

    /// Header checkbox: select or clear the whole visible page
    pub fn toggle_all_rows(&mut self) {
        match self.current_tab {
            Tab::Queue => {
                let ids: Vec<&str> = self.queue_rows.iter().map(|r| r.id.as_str()).collect();
                self.queue_selection.toggle_all(ids);
            }
            Tab::Manage => {
                let ids: Vec<&str> = self.manage_rows.iter().map(|r| r.id.as_str()).collect();
                self.manage_selection.toggle_all(ids);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_change_resets_to_first_page() {
        let mut filters = Filters::new();
        filters.total_pages = 7;
        filters.set_page(5);
        assert_eq!(filters.page, 5);

        filters.search.push_str("สมชาย");
        filters.mark_dirty();
        assert_eq!(filters.page, 1);
    }

    #[test]
    fn test_set_page_clamps_to_server_total() {
        let mut filters = Filters::new();
        filters.total_pages = 3;
        filters.set_page(99);
        assert_eq!(filters.page, 3);
        filters.set_page(0);
        assert_eq!(filters.page, 1);
    }

    #[test]
    fn test_clear_keeps_nothing_but_page_count() {
        let mut filters = Filters::new();
        filters.total_pages = 4;
        filters.search = "x".to_string();
        filters.department = "การบัญชี".to_string();
        filters.shipping_status = Some(ShippingStatus::Delivered);
        filters.clear();
        assert!(filters.search.is_empty());
        assert!(filters.department.is_empty());
        assert!(filters.shipping_status.is_none());
        assert_eq!(filters.page, 1);
    }

    #[test]
    fn test_tab_cycle_is_complete() {
        let mut tab = Tab::Queue;
        for _ in 0..6 {
            tab = tab.next();
        }
        assert_eq!(tab, Tab::Queue);
        assert_eq!(Tab::Queue.prev(), Tab::Reports);
    }

    #[test]
    fn test_batch_chooser_offers_print_all_plus_each_sheet() {
        let chooser = BatchChooser {
            batches: vec![vec!["a".into(); 4], vec!["b".into(); 4], vec!["c".into(); 2]],
            selected: 0,
        };
        assert_eq!(chooser.option_count(), 4);
    }
}

//! Data models for alumni association entities.
//!
//! This module contains the data structures exchanged with the backend:
//!
//! - `AlumniRecord` and its status enums: registration, delivery, shipping
//! - `ShippingHistoryEntry`: server-appended audit trail of shipping changes
//! - Paged list responses and shipping statistics
//! - `Notification`: admin notification feed items
//! - Report types for the detailed shipping report

pub mod alumni;
pub mod notification;
pub mod report;

pub use alumni::{
    AlumniPage, AlumniRecord, BulkShippingSummary, DeliveryOption, MemberStatus,
    ShippingHistoryEntry, ShippingStatistics, ShippingStatus,
};
pub use notification::{Notification, NotificationsResponse};
pub use report::{DetailedReport, ReportStatistics, ShipmentRow};

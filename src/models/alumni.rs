use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registration status of an alumni record, set by admin review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Pending,
    Approved,
    Rejected,
}

impl MemberStatus {
    /// Wire spelling, as sent in query strings and request bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Pending => "pending",
            MemberStatus::Approved => "approved",
            MemberStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberStatus::Pending => write!(f, "Pending"),
            MemberStatus::Approved => write!(f, "Approved"),
            MemberStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

/// How the member chose to receive their membership card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOption {
    Pickup,
    Mail,
}

impl std::fmt::Display for DeliveryOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryOption::Pickup => write!(f, "Pickup"),
            DeliveryOption::Mail => write!(f, "Mail"),
        }
    }
}

/// Physical delivery lifecycle of a mailed membership card.
///
/// The nominal lifecycle is awaiting_shipment -> in_transit -> delivered.
/// Moving backward is a manual correction and requires the editor's
/// explicit correction mode; `can_transition_to` is the single guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingStatus {
    AwaitingShipment,
    InTransit,
    Delivered,
}

impl ShippingStatus {
    /// Wire spelling, as sent in query strings and request bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingStatus::AwaitingShipment => "awaiting_shipment",
            ShippingStatus::InTransit => "in_transit",
            ShippingStatus::Delivered => "delivered",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            ShippingStatus::AwaitingShipment => 0,
            ShippingStatus::InTransit => 1,
            ShippingStatus::Delivered => 2,
        }
    }

    /// Transition guard: forward (or same-status resubmit, e.g. to attach
    /// a tracking number) is always allowed; backward only in correction
    /// mode.
    pub fn can_transition_to(&self, target: ShippingStatus, correction: bool) -> bool {
        correction || target.rank() >= self.rank()
    }
}

impl std::fmt::Display for ShippingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShippingStatus::AwaitingShipment => write!(f, "Awaiting shipment"),
            ShippingStatus::InTransit => write!(f, "In transit"),
            ShippingStatus::Delivered => write!(f, "Delivered"),
        }
    }
}

/// One entry of the server-maintained shipping audit trail. Read-only
/// from the client's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingHistoryEntry {
    pub status: ShippingStatus,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlumniRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub id_card: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub graduation_year: Option<i32>,
    pub status: MemberStatus,
    #[serde(default)]
    pub delivery_option: Option<DeliveryOption>,
    #[serde(default)]
    pub shipping_status: Option<ShippingStatus>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub shipped_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub shipping_history: Vec<ShippingHistoryEntry>,
}

impl AlumniRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Shipping fields are only meaningful for approved records that chose
    /// mail delivery; everything else stays out of the shipping views.
    pub fn is_shippable(&self) -> bool {
        self.status == MemberStatus::Approved
            && self.delivery_option == Some(DeliveryOption::Mail)
    }

    /// Effective shipping status; records fresh from approval may not have
    /// the field set yet and count as awaiting shipment.
    pub fn shipping_status_or_default(&self) -> ShippingStatus {
        self.shipping_status.unwrap_or(ShippingStatus::AwaitingShipment)
    }
}

/// Paged list envelope returned by the alumni and shipping-list endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlumniPage {
    #[serde(default)]
    pub data: Vec<AlumniRecord>,
    #[serde(default = "default_total_pages")]
    pub total_pages: u32,
    #[serde(default)]
    pub total: Option<u64>,
}

fn default_total_pages() -> u32 {
    1
}

/// Aggregate counts by shipping status from `/alumni/shipping-statistics`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingStatistics {
    #[serde(default, alias = "pending")]
    pub awaiting_shipment: u64,
    #[serde(default, alias = "shipping")]
    pub in_transit: u64,
    #[serde(default)]
    pub delivered: u64,
    #[serde(default)]
    pub overdue: u64,
}

impl ShippingStatistics {
    pub fn total(&self) -> u64 {
        self.awaiting_shipment + self.in_transit + self.delivered
    }

    /// Parse the statistics endpoint's response, which has shipped in
    /// several shapes over backend versions: a bare object, a
    /// `{data: ...}` wrapper, or an array of `{status, count}` rows.
    pub fn from_response(value: &serde_json::Value) -> Option<Self> {
        let data = value.get("data").unwrap_or(value);

        if let Some(rows) = data.as_array() {
            let mut stats = ShippingStatistics::default();
            for row in rows {
                let count = row.get("count").and_then(|c| c.as_u64()).unwrap_or(1);
                match row.get("status").and_then(|s| s.as_str()) {
                    Some("awaiting_shipment") => stats.awaiting_shipment += count,
                    Some("in_transit") => stats.in_transit += count,
                    Some("delivered") => stats.delivered += count,
                    _ => {}
                }
            }
            return Some(stats);
        }

        serde_json::from_value(data.clone()).ok()
    }
}

/// Summary returned by the bulk shipping endpoint. Backends have been
/// inconsistent about the count field name, so accept the known variants
/// and let the caller fall back to the submitted count.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkShippingSummary {
    #[serde(default, alias = "modifiedCount", alias = "updated")]
    pub updated_count: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl BulkShippingSummary {
    pub fn count_or(&self, fallback: usize) -> u64 {
        self.updated_count.unwrap_or(fallback as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipping_status_wire_spelling() {
        assert_eq!(
            serde_json::to_string(&ShippingStatus::AwaitingShipment).unwrap(),
            "\"awaiting_shipment\""
        );
        assert_eq!(
            serde_json::to_string(&ShippingStatus::InTransit).unwrap(),
            "\"in_transit\""
        );
        let parsed: ShippingStatus = serde_json::from_str("\"delivered\"").unwrap();
        assert_eq!(parsed, ShippingStatus::Delivered);
    }

    #[test]
    fn test_transition_guard_forward_only() {
        let delivered = ShippingStatus::Delivered;
        assert!(!delivered.can_transition_to(ShippingStatus::AwaitingShipment, false));
        assert!(delivered.can_transition_to(ShippingStatus::AwaitingShipment, true));
        // Same-status resubmit (tracking number attachment) is always fine
        assert!(delivered.can_transition_to(ShippingStatus::Delivered, false));
        // Skipping forward is a forward transition
        assert!(ShippingStatus::AwaitingShipment.can_transition_to(ShippingStatus::Delivered, false));
    }

    #[test]
    fn test_parse_alumni_record() {
        let json = r#"{
            "_id": "66f2a91be8d4c2001f3a7b10",
            "firstName": "สมชาย",
            "lastName": "ใจดี",
            "idCard": "1409901234567",
            "address": "99/1 ถ.โพศรี ต.หมากแข้ง อ.เมือง จ.อุดรธานี 41000",
            "phone": "0812345678",
            "department": "สาขาวิชาการบัญชี",
            "graduationYear": 2560,
            "status": "approved",
            "deliveryOption": "mail",
            "shippingStatus": "in_transit",
            "trackingNumber": "EMS123456789TH",
            "updatedAt": "2025-06-01T09:30:00Z",
            "shippingHistory": [
                {"status": "awaiting_shipment", "updatedAt": "2025-05-28T08:00:00Z"},
                {"status": "in_transit", "trackingNumber": "EMS123456789TH", "updatedAt": "2025-06-01T09:30:00Z"}
            ]
        }"#;

        let record: AlumniRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "66f2a91be8d4c2001f3a7b10");
        assert_eq!(record.full_name(), "สมชาย ใจดี");
        assert!(record.is_shippable());
        assert_eq!(record.shipping_status, Some(ShippingStatus::InTransit));
        assert_eq!(record.tracking_number.as_deref(), Some("EMS123456789TH"));
        assert_eq!(record.shipping_history.len(), 2);
        assert_eq!(
            record.shipping_history[0].status,
            ShippingStatus::AwaitingShipment
        );
    }

    #[test]
    fn test_pickup_record_is_not_shippable() {
        let json = r#"{
            "id": "abc123",
            "firstName": "สมหญิง",
            "lastName": "รักเรียน",
            "status": "approved",
            "deliveryOption": "pickup"
        }"#;
        let record: AlumniRecord = serde_json::from_str(json).unwrap();
        assert!(!record.is_shippable());
        assert_eq!(
            record.shipping_status_or_default(),
            ShippingStatus::AwaitingShipment
        );
    }

    #[test]
    fn test_parse_statistics_object_form() {
        let value: serde_json::Value = serde_json::from_str(
            r#"{"success": true, "data": {"awaitingShipment": 12, "inTransit": 5, "delivered": 40, "overdue": 2}}"#,
        )
        .unwrap();
        let stats = ShippingStatistics::from_response(&value).unwrap();
        assert_eq!(stats.awaiting_shipment, 12);
        assert_eq!(stats.in_transit, 5);
        assert_eq!(stats.delivered, 40);
        assert_eq!(stats.total(), 57);
    }

    #[test]
    fn test_parse_statistics_array_form() {
        let value: serde_json::Value = serde_json::from_str(
            r#"{"data": [
                {"status": "awaiting_shipment", "count": 7},
                {"status": "delivered", "count": 3},
                {"status": "in_transit"}
            ]}"#,
        )
        .unwrap();
        let stats = ShippingStatistics::from_response(&value).unwrap();
        assert_eq!(stats.awaiting_shipment, 7);
        assert_eq!(stats.delivered, 3);
        assert_eq!(stats.in_transit, 1);
    }

    #[test]
    fn test_bulk_summary_count_fallback() {
        let summary: BulkShippingSummary =
            serde_json::from_str(r#"{"message": "ok"}"#).unwrap();
        assert_eq!(summary.count_or(9), 9);

        let summary: BulkShippingSummary =
            serde_json::from_str(r#"{"modifiedCount": 4}"#).unwrap();
        assert_eq!(summary.count_or(9), 4);
    }
}

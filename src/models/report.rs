// Allow dead code: report rows carry the endpoint's full field set
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::ShippingStatus;

/// One row of the detailed shipping report.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRow {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub graduation_year: Option<i32>,
    #[serde(default)]
    pub shipping_status: Option<ShippingStatus>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub shipped_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ShipmentRow {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Aggregates the report endpoint computes server-side.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStatistics {
    #[serde(default)]
    pub awaiting_shipment: u64,
    #[serde(default)]
    pub in_transit: u64,
    #[serde(default)]
    pub delivered: u64,
    #[serde(default)]
    pub average_delivery_days: Option<f64>,
}

/// Envelope of `GET /api/shipping/reports/detailed`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedReport {
    #[serde(default)]
    pub shipments: Vec<ShipmentRow>,
    #[serde(default)]
    pub statistics: Option<ReportStatistics>,
    #[serde(default)]
    pub total_shipments: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_detailed_report() {
        let json = r#"{
            "shipments": [
                {"_id": "a1", "firstName": "วรรณา", "lastName": "ศรีสุข",
                 "shippingStatus": "delivered", "trackingNumber": "RT111222333TH",
                 "shippedDate": "2025-05-20T02:00:00Z"}
            ],
            "statistics": {"awaitingShipment": 4, "inTransit": 2, "delivered": 11, "averageDeliveryDays": 2.5},
            "totalShipments": 17
        }"#;
        let report: DetailedReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.total_shipments, 17);
        assert_eq!(report.shipments.len(), 1);
        assert_eq!(report.shipments[0].full_name(), "วรรณา ศรีสุข");
        let stats = report.statistics.unwrap();
        assert_eq!(stats.delivered, 11);
        assert_eq!(stats.average_delivery_days, Some(2.5));
    }
}

//! API client for the alumni association REST backend.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests: roster and shipping-list pages, shipping statistics, single
//! and bulk shipping mutations, server-rendered label documents, report
//! data, and spreadsheet exports.

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::auth::SessionData;
use crate::labels::LabelType;
use crate::models::{
    AlumniPage, AlumniRecord, BulkShippingSummary, DetailedReport, MemberStatus,
    NotificationsResponse, ShippingStatistics, ShippingStatus,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow report generation while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(default)]
    user: Option<LoginUser>,
}

#[derive(Debug, Deserialize)]
struct LoginUser {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Filters for the shipping-list and report endpoints.
#[derive(Debug, Clone, Default)]
pub struct ShippingListQuery {
    pub page: u32,
    pub limit: u32,
    pub shipping_status: Option<ShippingStatus>,
    pub search: String,
    pub department: String,
    pub graduation_year: String,
}

impl ShippingListQuery {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if self.page > 0 {
            pairs.push(("page", self.page.to_string()));
        }
        if self.limit > 0 {
            pairs.push(("limit", self.limit.to_string()));
        }
        if let Some(status) = self.shipping_status {
            pairs.push(("shippingStatus", status.as_str().to_string()));
        }
        if !self.search.trim().is_empty() {
            pairs.push(("search", self.search.trim().to_string()));
        }
        if !self.department.is_empty() {
            pairs.push(("department", self.department.clone()));
        }
        if !self.graduation_year.is_empty() {
            pairs.push(("graduationYear", self.graduation_year.clone()));
        }
        pairs
    }
}

/// Filters for the general alumni roster endpoint.
#[derive(Debug, Clone, Default)]
pub struct AlumniListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: String,
    pub status: Option<MemberStatus>,
    pub department: String,
}

impl AlumniListQuery {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.max(1).to_string()),
            ("limit", self.limit.max(1).to_string()),
        ];
        if !self.search.trim().is_empty() {
            pairs.push(("search", self.search.trim().to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if !self.department.is_empty() {
            pairs.push(("department", self.department.clone()));
        }
        pairs
    }
}

/// API client for the alumni backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client against the given base URL
    pub fn new(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Authenticate against the admin login endpoint and return session data
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionData> {
        let url = self.url("/api/auth/login");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await
            .context("Failed to send login request")?;

        let response = Self::check_response(response).await?;
        let login: LoginResponse = response.json().await.context("Failed to parse login response")?;

        let display_name = login.user.as_ref().and_then(|u| {
            u.name
                .clone()
                .or_else(|| u.username.clone())
                .filter(|s| !s.is_empty())
        });

        Ok(SessionData {
            token: login.token,
            username: username.to_string(),
            display_name,
            created_at: Utc::now(),
        })
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(&self, url: &str, body: &B) -> Result<T> {
        let response = self
            .client
            .post(url)
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send POST request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    // ===== Roster and shipping lists =====

    /// Fetch a page of the general alumni roster
    pub async fn fetch_alumni(&self, query: &AlumniListQuery) -> Result<AlumniPage> {
        let url = reqwest::Url::parse_with_params(&self.url("/api/alumni"), query.query_pairs())
            .context("Failed to build alumni list URL")?;
        self.get_json(url.as_str()).await
    }

    /// Fetch a page of shipping-eligible records (mail + approved, filtered
    /// server-side)
    pub async fn fetch_shipping_list(&self, query: &ShippingListQuery) -> Result<AlumniPage> {
        let url = reqwest::Url::parse_with_params(
            &self.url("/api/alumni/shipping-list"),
            query.query_pairs(),
        )
        .context("Failed to build shipping list URL")?;
        self.get_json(url.as_str()).await
    }

    /// Fetch one record by id. The endpoint wraps the record in `{data: ...}`
    /// on newer backends and returns it bare on older ones.
    pub async fn fetch_alumni_detail(&self, id: &str) -> Result<AlumniRecord> {
        let url = self.url(&format!("/api/alumni/{}", id));

        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let text = response.text().await?;
        Self::parse_record(&text)
    }

    /// Fetch aggregate shipping counts. The response shape has drifted
    /// across backend versions, so parse tolerantly.
    pub async fn fetch_shipping_statistics(&self) -> Result<ShippingStatistics> {
        let url = self.url("/api/alumni/shipping-statistics");
        let value: serde_json::Value = self.get_json(&url).await?;

        ShippingStatistics::from_response(&value)
            .ok_or_else(|| ApiError::InvalidResponse("Unrecognized statistics format".to_string()).into())
    }

    // ===== Mutations =====

    /// Update one record's shipping status/tracking number, returning the
    /// updated record as the server confirmed it.
    pub async fn update_shipping(
        &self,
        id: &str,
        status: ShippingStatus,
        tracking_number: &str,
        notes: &str,
    ) -> Result<AlumniRecord> {
        let url = self.url(&format!("/api/alumni/{}/shipping", id));
        let body = serde_json::json!({
            "shippingStatus": status,
            "trackingNumber": tracking_number.trim(),
            "notes": notes.trim(),
        });

        let response = self
            .client
            .patch(&url)
            .headers(self.auth_headers()?)
            .json(&body)
            .send()
            .await
            .context("Failed to send shipping update")?;

        let response = Self::check_response(response).await?;
        let text = response.text().await?;
        debug!(id, status = status.as_str(), "Shipping update accepted");
        Self::parse_record(&text)
    }

    /// Apply one shipping status to many records in a single request
    pub async fn bulk_update_shipping(
        &self,
        ids: &[String],
        status: ShippingStatus,
        notes: &str,
    ) -> Result<BulkShippingSummary> {
        let url = self.url("/api/alumni/bulk-shipping");
        let body = serde_json::json!({
            "alumniIds": ids,
            "shippingStatus": status,
            "notes": notes.trim(),
        });
        self.post_json(&url, &body).await
    }

    /// Approve or reject a registration
    pub async fn update_member_status(&self, id: &str, status: MemberStatus) -> Result<()> {
        let url = self.url(&format!("/api/alumni/{}/status", id));
        let response = self
            .client
            .put(&url)
            .headers(self.auth_headers()?)
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await
            .context("Failed to send status update")?;

        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Label documents (server-rendered HTML) =====

    /// Fetch a single-record label document of the given type
    pub async fn fetch_label(&self, label_type: LabelType, id: &str) -> Result<String> {
        let path = match label_type {
            LabelType::Minimal => format!("/api/shipping/labels/minimal/{}?format=html", id),
            LabelType::Single => format!("/api/shipping/labels/single/{}?format=html", id),
            // A one-member sheet is still a 4-up layout
            LabelType::FourUp => {
                let ids = vec![id.to_string()];
                return self.fetch_label_sheet(&ids).await;
            }
        };
        self.get_html(&self.url(&path)).await
    }

    /// Fetch one 4-up sheet for up to four records
    pub async fn fetch_label_sheet(&self, ids: &[String]) -> Result<String> {
        let ids = &ids[..ids.len().min(crate::labels::SHEET_SIZE)];
        let url = self.url("/api/shipping/labels/4up?format=html");

        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .json(&serde_json::json!({ "alumniIds": ids }))
            .send()
            .await
            .context("Failed to request label sheet")?;

        let response = Self::check_response(response).await?;
        Ok(response.text().await?)
    }

    /// Fetch one document containing labels for many records (minimal or
    /// single type; no client-side pagination)
    pub async fn fetch_labels_bulk(&self, ids: &[String], label_type: LabelType) -> Result<String> {
        let url = self.url("/api/shipping/labels/bulk");

        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .json(&serde_json::json!({
                "alumniIds": ids,
                "format": "html",
                "type": label_type.as_str(),
            }))
            .send()
            .await
            .context("Failed to request bulk labels")?;

        let response = Self::check_response(response).await?;
        Ok(response.text().await?)
    }

    async fn get_html(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;
        Ok(response.text().await?)
    }

    // ===== Reports and exports =====

    /// Fetch the detailed shipping report
    pub async fn fetch_detailed_report(&self, query: &ShippingListQuery) -> Result<DetailedReport> {
        let url = reqwest::Url::parse_with_params(
            &self.url("/api/shipping/reports/detailed"),
            query.query_pairs(),
        )
        .context("Failed to build report URL")?;

        // The report arrives under a `data` wrapper
        #[derive(Deserialize)]
        struct Wrapper {
            #[serde(default)]
            data: DetailedReport,
        }

        let value: serde_json::Value = self.get_json(url.as_str()).await?;
        if value.get("data").is_some() {
            let wrapper: Wrapper = serde_json::from_value(value)
                .context("Failed to parse detailed report")?;
            Ok(wrapper.data)
        } else {
            serde_json::from_value(value).context("Failed to parse detailed report")
        }
    }

    /// Download a spreadsheet export from one of the export endpoints.
    /// `path` is an absolute API path such as `/api/shipping/export/excel`.
    pub async fn download_export(
        &self,
        path: &str,
        query: &ShippingListQuery,
    ) -> Result<Vec<u8>> {
        let url = reqwest::Url::parse_with_params(&self.url(path), query.query_pairs())
            .context("Failed to build export URL")?;

        let response = self
            .client
            .get(url.as_str())
            .headers(self.auth_headers()?)
            .send()
            .await
            .context("Failed to send export request")?;

        let response = Self::check_response(response).await?;
        let bytes = response.bytes().await.context("Failed to read export body")?;
        Ok(bytes.to_vec())
    }

    // ===== Notifications =====

    pub async fn fetch_notifications(&self) -> Result<NotificationsResponse> {
        self.get_json(&self.url("/api/notifications")).await
    }

    pub async fn mark_notification_read(&self, id: &str) -> Result<()> {
        let url = self.url(&format!("/api/notifications/{}/read", id));
        let response = self
            .client
            .patch(&url)
            .headers(self.auth_headers()?)
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }

    pub async fn mark_all_notifications_read(&self) -> Result<()> {
        let url = self.url("/api/notifications/mark-all-read");
        let response = self
            .client
            .patch(&url)
            .headers(self.auth_headers()?)
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }

    pub async fn delete_notification(&self, id: &str) -> Result<()> {
        let url = self.url(&format!("/api/notifications/{}", id));
        let response = self
            .client
            .delete(&url)
            .headers(self.auth_headers()?)
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }

    /// Parse a record that may arrive bare or under a `{data: ...}` wrapper
    fn parse_record(text: &str) -> Result<AlumniRecord> {
        if let Ok(record) = serde_json::from_str::<AlumniRecord>(text) {
            return Ok(record);
        }

        #[derive(Deserialize)]
        struct Wrapper {
            data: AlumniRecord,
        }

        let wrapper: Wrapper = serde_json::from_str(text)
            .context("Failed to parse alumni record response")?;
        Ok(wrapper.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_bare_and_wrapped() {
        let bare = r#"{"_id": "a1", "firstName": "สมชาย", "lastName": "ใจดี", "status": "approved"}"#;
        let record = ApiClient::parse_record(bare).unwrap();
        assert_eq!(record.id, "a1");

        let wrapped = format!(r#"{{"success": true, "data": {}}}"#, bare);
        let record = ApiClient::parse_record(&wrapped).unwrap();
        assert_eq!(record.first_name, "สมชาย");
    }

    #[test]
    fn test_shipping_query_pairs_skip_empty_filters() {
        let query = ShippingListQuery {
            page: 2,
            limit: 10,
            shipping_status: Some(ShippingStatus::AwaitingShipment),
            search: "  ".to_string(),
            department: String::new(),
            graduation_year: "2560".to_string(),
        };
        let pairs = query.query_pairs();
        assert!(pairs.contains(&("page", "2".to_string())));
        assert!(pairs.contains(&("shippingStatus", "awaiting_shipment".to_string())));
        assert!(pairs.contains(&("graduationYear", "2560".to_string())));
        assert!(!pairs.iter().any(|(k, _)| *k == "search"));
        assert!(!pairs.iter().any(|(k, _)| *k == "department"));
    }

    #[test]
    fn test_alumni_query_defaults_to_first_page() {
        let query = AlumniListQuery {
            search: "สมชาย".to_string(),
            ..Default::default()
        };
        let pairs = query.query_pairs();
        assert!(pairs.contains(&("page", "1".to_string())));
        assert!(pairs.contains(&("search", "สมชาย".to_string())));
    }
}

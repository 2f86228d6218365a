use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One admin notification (new registration, payment proof, etc.).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, alias = "isRead")]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Title when present, otherwise the first line of the message.
    pub fn headline(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => self.message.lines().next().unwrap_or(""),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsResponse {
    #[serde(default)]
    pub data: Vec<Notification>,
    #[serde(default)]
    pub unread_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_notifications_response() {
        let json = r#"{
            "data": [
                {"_id": "n1", "title": "สมัครสมาชิกใหม่", "message": "มีผู้สมัครรออนุมัติ", "type": "registration", "isRead": false},
                {"_id": "n2", "message": "หลักฐานการโอนเงินใหม่", "read": true}
            ],
            "unreadCount": 1
        }"#;
        let parsed: NotificationsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.data.len(), 2);
        assert_eq!(parsed.unread_count, 1);
        assert_eq!(parsed.data[0].headline(), "สมัครสมาชิกใหม่");
        assert!(!parsed.data[0].read);
        assert_eq!(parsed.data[1].headline(), "หลักฐานการโอนเงินใหม่");
        assert!(parsed.data[1].read);
    }
}

//! Database models for relay records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text message successfully handed to Z-API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    /// Unique database ID
    pub id: i64,
    /// Destination phone number
    pub phone: String,
    /// Message body
    pub message: String,
    /// When this record was created
    pub created_at: DateTime<Utc>,
}

/// Image message successfully handed to Z-API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentImage {
    pub id: i64,
    pub phone: String,
    /// Image URL or base64 data URI, forwarded untouched
    pub image: String,
    pub caption: String,
    pub view_once: bool,
    pub created_at: DateTime<Utc>,
}

/// Inbound webhook body stored verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedWebhook {
    pub id: i64,
    /// Compact JSON serialization of the received body
    pub raw_payload: String,
    pub received_at: DateTime<Utc>,
}

/// Delivery status reported by Z-API for one instance
///
/// Z-API does not guarantee any of the body fields, so all of them are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStatus {
    pub id: i64,
    /// Instance ID taken from the callback path
    pub instance: String,
    pub message_id: Option<String>,
    pub status: Option<String>,
    pub phone: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// Status fields as received, before insertion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewDeliveryStatus {
    pub message_id: Option<String>,
    pub status: Option<String>,
    pub phone: Option<String>,
}

/// Result of a webhook cleanup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeOutcome {
    /// ID of the surviving (most recent) webhook record
    pub kept_id: i64,
    /// Number of records deleted
    pub deleted: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sent_message_serializes_camel_case() {
        let msg = SentMessage {
            id: 7,
            phone: "5511999999999".to_string(),
            message: "Olá".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        };

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["phone"], "5511999999999");
        assert_eq!(json["createdAt"], "2025-03-01T12:00:00Z");
    }

    #[test]
    fn test_sent_image_view_once_field_name() {
        let img = SentImage {
            id: 1,
            phone: "5511".to_string(),
            image: "https://example.com/a.png".to_string(),
            caption: "cap".to_string(),
            view_once: true,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&img).unwrap();
        assert_eq!(json["viewOnce"], true);
        assert!(json.get("view_once").is_none());
    }

    #[test]
    fn test_delivery_status_missing_fields_are_null() {
        let status = DeliveryStatus {
            id: 1,
            instance: "abc".to_string(),
            message_id: None,
            status: Some("READ".to_string()),
            phone: None,
            received_at: Utc::now(),
        };

        let json = serde_json::to_value(&status).unwrap();
        assert!(json["messageId"].is_null());
        assert_eq!(json["status"], "READ");
    }
}

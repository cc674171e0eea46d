//! Storage module for relay records
//!
//! Provides SQLite-based local storage for:
//! - Sent text and image messages
//! - Raw inbound webhooks
//! - Delivery status callbacks

mod models;
mod sqlite;

pub use models::{
    DeliveryStatus, NewDeliveryStatus, PurgeOutcome, ReceivedWebhook, SentImage, SentMessage,
};
pub use sqlite::{MessageStore, StorageError, StorageResult};

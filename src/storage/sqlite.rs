//! SQLite-based relay storage implementation

use std::path::Path;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, params, types::Type};
use tracing::{debug, error, info};

use super::models::{
    DeliveryStatus, NewDeliveryStatus, PurgeOutcome, ReceivedWebhook, SentImage, SentMessage,
};

/// Relay storage error type
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// SQLite-based record store
///
/// Four independent tables, one per record kind. A single connection sits
/// behind a mutex, so every method runs to completion before the next starts.
pub struct MessageStore {
    conn: Mutex<Connection>,
}

impl MessageStore {
    /// Create or open a store at the given path
    pub fn new<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("Opening relay store at {:?}", path);

        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Create a store backed by a private in-memory database
    pub fn in_memory() -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StorageResult<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize database schema
    fn initialize_schema(&self) -> StorageResult<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;

             CREATE TABLE IF NOT EXISTS sent_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                phone TEXT NOT NULL,
                message TEXT NOT NULL,
                created_at TEXT NOT NULL
             );

             CREATE TABLE IF NOT EXISTS sent_images (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                phone TEXT NOT NULL,
                image TEXT NOT NULL,
                caption TEXT NOT NULL,
                view_once INTEGER NOT NULL,
                created_at TEXT NOT NULL
             );

             CREATE TABLE IF NOT EXISTS received_webhooks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                raw_payload TEXT NOT NULL,
                received_at TEXT NOT NULL
             );

             CREATE INDEX IF NOT EXISTS idx_received_webhooks_time
             ON received_webhooks(received_at DESC);

             CREATE TABLE IF NOT EXISTS delivery_statuses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                instance TEXT NOT NULL,
                message_id TEXT,
                status TEXT,
                phone TEXT,
                received_at TEXT NOT NULL
             );",
        )?;

        debug!("Relay store schema initialized");
        Ok(())
    }

    // =========================================================================
    // Sent messages
    // =========================================================================

    /// Record a text message that Z-API accepted
    pub fn save_sent_message(&self, phone: &str, message: &str) -> StorageResult<SentMessage> {
        let conn = self.conn.lock();
        let created_at = now();

        conn.execute(
            "INSERT INTO sent_messages (phone, message, created_at) VALUES (?1, ?2, ?3)",
            params![phone, message, format_timestamp(&created_at)],
        )
        .inspect_err(|e| error!("Failed to save sent message to {}: {}", phone, e))?;

        let id = conn.last_insert_rowid();
        debug!("Saved sent message {} to {}", id, phone);

        Ok(SentMessage {
            id,
            phone: phone.to_string(),
            message: message.to_string(),
            created_at,
        })
    }

    /// All sent text messages, newest first
    pub fn list_sent_messages(&self) -> StorageResult<Vec<SentMessage>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, phone, message, created_at FROM sent_messages ORDER BY id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(SentMessage {
                id: row.get(0)?,
                phone: row.get(1)?,
                message: row.get(2)?,
                created_at: timestamp_column(row, 3)?,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Record an image message that Z-API accepted
    pub fn save_sent_image(
        &self,
        phone: &str,
        image: &str,
        caption: &str,
        view_once: bool,
    ) -> StorageResult<SentImage> {
        let conn = self.conn.lock();
        let created_at = now();

        conn.execute(
            "INSERT INTO sent_images (phone, image, caption, view_once, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![phone, image, caption, view_once, format_timestamp(&created_at)],
        )
        .inspect_err(|e| error!("Failed to save sent image to {}: {}", phone, e))?;

        let id = conn.last_insert_rowid();
        debug!("Saved sent image {} to {}", id, phone);

        Ok(SentImage {
            id,
            phone: phone.to_string(),
            image: image.to_string(),
            caption: caption.to_string(),
            view_once,
            created_at,
        })
    }

    /// All sent images, newest first
    ///
    /// Inspection accessor: no route lists images, but operators and the
    /// integration tests read them back through this.
    pub fn list_sent_images(&self) -> StorageResult<Vec<SentImage>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, phone, image, caption, view_once, created_at
             FROM sent_images ORDER BY id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(SentImage {
                id: row.get(0)?,
                phone: row.get(1)?,
                image: row.get(2)?,
                caption: row.get(3)?,
                view_once: row.get(4)?,
                created_at: timestamp_column(row, 5)?,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // =========================================================================
    // Inbound webhooks
    // =========================================================================

    /// Store a raw webhook payload
    pub fn save_received_webhook(
        &self,
        raw_payload: &str,
        received_at: DateTime<Utc>,
    ) -> StorageResult<ReceivedWebhook> {
        let conn = self.conn.lock();
        let received_at = received_at.trunc_subsecs(6);

        conn.execute(
            "INSERT INTO received_webhooks (raw_payload, received_at) VALUES (?1, ?2)",
            params![raw_payload, format_timestamp(&received_at)],
        )
        .inspect_err(|e| error!("Failed to save received webhook: {}", e))?;

        let id = conn.last_insert_rowid();
        debug!("Saved received webhook {} ({} bytes)", id, raw_payload.len());

        Ok(ReceivedWebhook {
            id,
            raw_payload: raw_payload.to_string(),
            received_at,
        })
    }

    /// All stored webhooks in insertion order
    ///
    /// Inspection accessor: webhooks are only written and purged over HTTP.
    pub fn list_received_webhooks(&self) -> StorageResult<Vec<ReceivedWebhook>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, raw_payload, received_at FROM received_webhooks ORDER BY id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(ReceivedWebhook {
                id: row.get(0)?,
                raw_payload: row.get(1)?,
                received_at: timestamp_column(row, 2)?,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Delete every webhook except the most recently received one
    ///
    /// Returns `None` when there is nothing stored. Lookup and delete share one
    /// transaction and the connection lock, so a webhook inserted concurrently
    /// is either the survivor or arrives after the purge.
    pub fn purge_received_webhooks(&self) -> StorageResult<Option<PurgeOutcome>> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let latest: Option<i64> = tx
            .query_row(
                "SELECT id FROM received_webhooks
                 ORDER BY received_at DESC, id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let Some(kept_id) = latest else {
            debug!("No received webhooks to purge");
            return Ok(None);
        };

        let deleted = tx.execute(
            "DELETE FROM received_webhooks WHERE id <> ?1",
            params![kept_id],
        )?;
        tx.commit()?;

        info!("Purged {} received webhooks, kept {}", deleted, kept_id);
        Ok(Some(PurgeOutcome { kept_id, deleted }))
    }

    // =========================================================================
    // Delivery statuses
    // =========================================================================

    /// Store a delivery status callback for `instance`
    pub fn save_delivery_status(
        &self,
        instance: &str,
        status: &NewDeliveryStatus,
    ) -> StorageResult<DeliveryStatus> {
        let conn = self.conn.lock();
        let received_at = now();

        conn.execute(
            "INSERT INTO delivery_statuses (instance, message_id, status, phone, received_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                instance,
                status.message_id,
                status.status,
                status.phone,
                format_timestamp(&received_at),
            ],
        )
        .inspect_err(|e| error!("Failed to save delivery status for {}: {}", instance, e))?;

        let id = conn.last_insert_rowid();
        debug!(
            "Saved delivery status {} for instance {} ({:?})",
            id, instance, status.status
        );

        Ok(DeliveryStatus {
            id,
            instance: instance.to_string(),
            message_id: status.message_id.clone(),
            status: status.status.clone(),
            phone: status.phone.clone(),
            received_at,
        })
    }

    /// All delivery statuses in insertion order
    pub fn list_delivery_statuses(&self) -> StorageResult<Vec<DeliveryStatus>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, instance, message_id, status, phone, received_at
             FROM delivery_statuses ORDER BY id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(DeliveryStatus {
                id: row.get(0)?,
                instance: row.get(1)?,
                message_id: row.get(2)?,
                status: row.get(3)?,
                phone: row.get(4)?,
                received_at: timestamp_column(row, 5)?,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

/// Current time at the precision the store keeps
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

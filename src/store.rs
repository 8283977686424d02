//! Durable persistence of queued messages and their lifecycle state.
//!
//! `Message` is the only persisted entity. [`MessageStore`] is a trait so the
//! scheduler and demultiplexer can run against either the real `sqlx`-backed
//! [`MySqlMessageStore`] or the in-memory fake used by the scenario tests in
//! `tests/scheduler.rs` / `tests/demux.rs`.

use std::future::Future;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use sqlx::MySqlPool;
use sqlx::Row;

use crate::error::GatewayError;

/// Lifecycle state of a queued message. Transitions form the graph
/// `new -> sent -> delivered`, `new -> errored`, `errored -> sent -> delivered`,
/// and `errored -> errored` while under the retry limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    New,
    Sent,
    Delivered,
    Errored,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::New => "new",
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Errored => "errored",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(MessageStatus::New),
            "sent" => Some(MessageStatus::Sent),
            "delivered" => Some(MessageStatus::Delivered),
            "errored" => Some(MessageStatus::Errored),
            _ => None,
        }
    }
}

/// Maximum submission attempts before a message is considered terminally failed.
pub const MAX_TRY: i32 = 3;

/// How long an `errored` message waits before it becomes eligible for retry.
pub fn retry_backoff() -> Duration {
    Duration::minutes(30)
}

/// The persisted entity — the only row type the gateway stores.
///
/// JSON visibility mirrors the original ORM model's tags: internal
/// bookkeeping (id, timestamps, tryCount) stays off the wire; the fields a
/// caller of `/unsentMessages` or `/dayReport` actually needs are exposed.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Message {
    #[serde(skip)]
    pub id: i64,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub from: String,
    pub phone: String,
    pub text: String,
    pub status: MessageStatus,
    #[serde(skip)]
    pub try_count: i32,
    #[serde(rename = "messageId")]
    pub message_id: String,
    #[serde(rename = "lastError")]
    pub last_error: String,
}

impl Message {
    /// True when this row is due for a drain pass: newly queued, or errored
    /// and past the retry backoff with attempts remaining.
    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            MessageStatus::New => true,
            MessageStatus::Errored => {
                self.try_count < MAX_TRY && self.updated_at < now - retry_backoff()
            }
            _ => false,
        }
    }

    /// True when this row has exhausted its retries and will never be
    /// selected again.
    pub fn is_terminal_error(&self) -> bool {
        self.status == MessageStatus::Errored && self.try_count >= MAX_TRY
    }
}

/// The store's logical operations: insert, select a batch eligible for
/// submission, select terminal failures, correlate a delivery receipt back
/// to its message, persist mutations, and list a day's messages by status.
pub trait MessageStore: Send + Sync {
    fn insert(
        &self,
        from: &str,
        phone: &str,
        text: &str,
    ) -> impl Future<Output = Result<i64, GatewayError>> + Send;

    fn select_eligible(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Message>, GatewayError>> + Send;

    fn select_terminal_errors(
        &self,
    ) -> impl Future<Output = Result<Vec<Message>, GatewayError>> + Send;

    fn find_sent_by_message_id(
        &self,
        message_id: &str,
    ) -> impl Future<Output = Result<Option<Message>, GatewayError>> + Send;

    fn save(&self, message: &Message) -> impl Future<Output = Result<(), GatewayError>> + Send;

    fn select_for_day(
        &self,
        day: DateTime<Utc>,
        status: MessageStatus,
    ) -> impl Future<Output = Result<Vec<Message>, GatewayError>> + Send;
}

/// Idempotent bootstrap statement run at startup in place of a full migration
/// framework: creates the table if it doesn't already exist.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
  id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
  created_at DATETIME(3) NOT NULL,
  updated_at DATETIME(3) NOT NULL,
  deleted_at DATETIME(3) NULL,
  from_addr VARCHAR(32) NOT NULL,
  phone VARCHAR(12) NOT NULL,
  text TEXT NOT NULL,
  status ENUM('new','sent','delivered','errored') NOT NULL DEFAULT 'new',
  try_count INT NOT NULL DEFAULT 0,
  message_id VARCHAR(32) NOT NULL DEFAULT '',
  last_error TEXT NOT NULL DEFAULT '',
  INDEX idx_phone (phone),
  INDEX idx_status (status),
  INDEX idx_message_id (message_id)
)
"#;

/// `sqlx`-backed store against a MySQL schema.
#[derive(Clone)]
pub struct MySqlMessageStore {
    pool: MySqlPool,
}

impl MySqlMessageStore {
    pub async fn connect(dsn: &str) -> Result<Self, GatewayError> {
        let pool = MySqlPool::connect(dsn).await?;
        sqlx::query(SCHEMA_SQL).execute(&pool).await?;
        Ok(Self { pool })
    }

    fn row_to_message(row: &sqlx::mysql::MySqlRow) -> Result<Message, GatewayError> {
        let status_str: String = row.try_get("status")?;
        let status = MessageStatus::parse(&status_str).ok_or_else(|| {
            GatewayError::Database(sqlx::Error::Decode(
                format!("unknown status {status_str}").into(),
            ))
        })?;
        Ok(Message {
            id: row.try_get::<u64, _>("id")? as i64,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
            from: row.try_get("from_addr")?,
            phone: row.try_get("phone")?,
            text: row.try_get("text")?,
            status,
            try_count: row.try_get("try_count")?,
            message_id: row.try_get("message_id")?,
            last_error: row.try_get("last_error")?,
        })
    }
}

impl MessageStore for MySqlMessageStore {
    async fn insert(&self, from: &str, phone: &str, text: &str) -> Result<i64, GatewayError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO messages (created_at, updated_at, from_addr, phone, text, status, try_count, message_id, last_error) \
             VALUES (?, ?, ?, ?, ?, 'new', 0, '', '')",
        )
        .bind(now)
        .bind(now)
        .bind(from)
        .bind(phone)
        .bind(text)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_id() as i64)
    }

    async fn select_eligible(&self, limit: u32) -> Result<Vec<Message>, GatewayError> {
        let backoff_before = Utc::now() - retry_backoff();
        let rows = sqlx::query(
            "SELECT * FROM messages WHERE deleted_at IS NULL AND \
             (status = 'new' OR (status = 'errored' AND updated_at < ? AND try_count < ?)) \
             ORDER BY id ASC LIMIT ?",
        )
        .bind(backoff_before)
        .bind(MAX_TRY)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_message).collect()
    }

    async fn select_terminal_errors(&self) -> Result<Vec<Message>, GatewayError> {
        let rows = sqlx::query(
            "SELECT * FROM messages WHERE deleted_at IS NULL AND status = 'errored' AND try_count >= ? \
             ORDER BY id ASC",
        )
        .bind(MAX_TRY)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_message).collect()
    }

    async fn find_sent_by_message_id(
        &self,
        message_id: &str,
    ) -> Result<Option<Message>, GatewayError> {
        let row = sqlx::query(
            "SELECT * FROM messages WHERE deleted_at IS NULL AND message_id = ? AND status = 'sent' LIMIT 1",
        )
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(Self::row_to_message).transpose()
    }

    async fn save(&self, message: &Message) -> Result<(), GatewayError> {
        sqlx::query(
            "UPDATE messages SET updated_at = ?, status = ?, try_count = ?, message_id = ?, last_error = ? \
             WHERE id = ?",
        )
        .bind(Utc::now())
        .bind(message.status.as_str())
        .bind(message.try_count)
        .bind(&message.message_id)
        .bind(&message.last_error)
        .bind(message.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn select_for_day(
        &self,
        day: DateTime<Utc>,
        status: MessageStatus,
    ) -> Result<Vec<Message>, GatewayError> {
        let end = day + Duration::hours(24);
        let rows = if status == MessageStatus::New {
            // "queued" bucket: new, or errored-but-still-retryable.
            sqlx::query(
                "SELECT * FROM messages WHERE deleted_at IS NULL AND created_at >= ? AND created_at < ? \
                 AND (status = 'new' OR (status = 'errored' AND try_count < ?)) ORDER BY id ASC",
            )
            .bind(day)
            .bind(end)
            .bind(MAX_TRY)
            .fetch_all(&self.pool)
            .await?
        } else if status == MessageStatus::Errored {
            sqlx::query(
                "SELECT * FROM messages WHERE deleted_at IS NULL AND created_at >= ? AND created_at < ? \
                 AND status = 'errored' AND try_count >= ? ORDER BY id ASC",
            )
            .bind(day)
            .bind(end)
            .bind(MAX_TRY)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(
                "SELECT * FROM messages WHERE deleted_at IS NULL AND created_at >= ? AND created_at < ? \
                 AND status = ? ORDER BY id ASC",
            )
            .bind(day)
            .bind(end)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?
        };
        rows.iter().map(Self::row_to_message).collect()
    }
}

/// In-memory fake used by the scheduler/demux scenario tests so they run
/// without a reachable MySQL instance.
#[derive(Default)]
pub struct InMemoryMessageStore {
    rows: Mutex<Vec<Message>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test helper: snapshot all rows, newest-last.
    pub fn all(&self) -> Vec<Message> {
        self.rows.lock().unwrap().clone()
    }
}

impl MessageStore for InMemoryMessageStore {
    async fn insert(&self, from: &str, phone: &str, text: &str) -> Result<i64, GatewayError> {
        let mut rows = self.rows.lock().unwrap();
        let now = Utc::now();
        let id = rows.len() as i64 + 1;
        rows.push(Message {
            id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            from: from.to_string(),
            phone: phone.to_string(),
            text: text.to_string(),
            status: MessageStatus::New,
            try_count: 0,
            message_id: String::new(),
            last_error: String::new(),
        });
        Ok(id)
    }

    async fn select_eligible(&self, limit: u32) -> Result<Vec<Message>, GatewayError> {
        let rows = self.rows.lock().unwrap();
        let now = Utc::now();
        Ok(rows
            .iter()
            .filter(|m| m.deleted_at.is_none() && m.is_eligible(now))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn select_terminal_errors(&self) -> Result<Vec<Message>, GatewayError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|m| m.deleted_at.is_none() && m.is_terminal_error())
            .cloned()
            .collect())
    }

    async fn find_sent_by_message_id(
        &self,
        message_id: &str,
    ) -> Result<Option<Message>, GatewayError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|m| {
                m.deleted_at.is_none()
                    && m.message_id == message_id
                    && m.status == MessageStatus::Sent
            })
            .cloned())
    }

    async fn save(&self, message: &Message) -> Result<(), GatewayError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(slot) = rows.iter_mut().find(|m| m.id == message.id) {
            slot.status = message.status;
            slot.try_count = message.try_count;
            slot.message_id = message.message_id.clone();
            slot.last_error = message.last_error.clone();
            slot.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn select_for_day(
        &self,
        day: DateTime<Utc>,
        status: MessageStatus,
    ) -> Result<Vec<Message>, GatewayError> {
        let end = day + Duration::hours(24);
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|m| {
                m.deleted_at.is_none() && m.created_at >= day && m.created_at < end && {
                    match status {
                        MessageStatus::New => {
                            m.status == MessageStatus::New
                                || (m.status == MessageStatus::Errored && m.try_count < MAX_TRY)
                        }
                        MessageStatus::Errored => m.is_terminal_error(),
                        other => m.status == other,
                    }
                }
            })
            .cloned()
            .collect())
    }
}

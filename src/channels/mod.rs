//! Mail transport edge — fetching alert messages and sending the digest.
//!
//! Everything in here is pure I/O; the pipeline never blocks on it. The
//! traits are the seam the core is tested against, and the one concrete
//! implementation speaks IMAP/SMTP.

pub mod email;

pub use email::{EmailChannelConfig, ImapAlertSource, SmtpDigestSender};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ChannelError;

/// One unread alert message fetched from the mail service, HTML body
/// already decoded.
#[derive(Debug, Clone)]
pub struct AlertMessage {
    /// Transport-native message identifier (used to flag it read later).
    pub id: String,
    /// Raw subject header, if one was present.
    pub subject: Option<String>,
    /// Decoded HTML body.
    pub html: String,
    /// When the message was received.
    pub received_at: DateTime<Utc>,
}

/// Source of unread alert messages — pure I/O, no digest logic.
#[async_trait]
pub trait AlertSource: Send + Sync {
    /// Source name for logging (e.g. "imap").
    fn name(&self) -> &str;

    /// Fetch all unread alert messages, oldest first.
    async fn fetch_unread(&self) -> Result<Vec<AlertMessage>, ChannelError>;

    /// Mark the given messages as read so the next run skips them.
    ///
    /// Called only after a digest was composed (and, if configured,
    /// sent) — never during fetching.
    async fn mark_read(&self, messages: &[AlertMessage]) -> Result<(), ChannelError>;
}

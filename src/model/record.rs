//! Message-board record persisted for each board submission.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// One public message-board entry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BoardRecord {
    /// Hex SHA-256 of the raw message, stable across redeliveries.
    pub id: String,
    /// Rendered nickname (the default sentinel when none was extracted).
    pub nickname: String,
    pub subject: String,
    /// Sanitized, bounded body snippet.
    pub content: String,
    pub received_at: DateTime<Utc>,
}

impl BoardRecord {
    pub fn new(
        raw: &[u8],
        nickname: impl Into<String>,
        subject: impl Into<String>,
        content: impl Into<String>,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: message_digest(raw),
            nickname: nickname.into(),
            subject: subject.into(),
            content: content.into(),
            received_at,
        }
    }
}

/// Hex-encoded SHA-256 of a raw message.
pub fn message_digest(raw: &[u8]) -> String {
    format!("{:x}", Sha256::digest(raw))
}

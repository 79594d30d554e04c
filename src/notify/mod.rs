//! Owner notifications: message formatting and local notifier backends.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use tracing::info;

use crate::config::NotifyConfig;
use crate::error::{MailboardError, Result};
use crate::handler::Notifier;
use crate::ingest::sanitize::truncate_chars;
use crate::ingest::Ingested;
use crate::model::envelope::InboundMail;

const RULE: &str = "--------------------------";

/// Format the notification text for one handled email.
pub fn format_notification(
    mail: &InboundMail,
    ingested: &Ingested,
    config: &NotifyConfig,
    nickname: &str,
) -> String {
    let classification = &ingested.classification;
    let mut text = format!("[{}] New email received\n{RULE}\n", config.site_name);
    text.push_str(&format!("From:     {}\n", mail.sender));
    text.push_str(&format!("To:       {}\n", mail.recipient));
    text.push_str(&format!("Subject:  {}\n", mail.subject));
    if classification.category.is_board() {
        text.push_str(&format!("Category: {} (by {nickname})\n", classification.category));
    } else {
        text.push_str(&format!("Category: {}\n", classification.category));
    }
    text.push_str(RULE);
    text.push('\n');

    let preview = truncate_chars(&ingested.clean_content, config.preview_chars);
    if !preview.is_empty() {
        text.push_str(preview);
        if preview.len() < ingested.clean_content.len() {
            text.push('…');
        }
        text.push('\n');
    }
    text.push_str("An automatic reply has been sent to the sender.");
    text
}

/// Emits notifications as `tracing` events.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) -> Result<()> {
        info!(target: "mailboard::notify", "{message}");
        Ok(())
    }
}

/// Appends notifications to a text file, separated by blank lines.
#[derive(Debug, Clone)]
pub struct FileNotifier {
    path: PathBuf,
}

impl FileNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Notifier for FileNotifier {
    fn notify(&self, message: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| MailboardError::Notify(format!("{}: {e}", parent.display())))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| MailboardError::Notify(format!("{}: {e}", self.path.display())))?;
        writeln!(file, "{message}\n")
            .map_err(|e| MailboardError::Notify(format!("{}: {e}", self.path.display())))?;
        Ok(())
    }
}

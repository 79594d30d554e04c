//! Automatic replies: template selection by category and an outbox sender
//! that writes each reply as an `.eml` file.

use std::path::PathBuf;

use chrono::Utc;
use tracing::debug;

use crate::config::ReplyConfig;
use crate::error::{MailboardError, Result};
use crate::handler::ReplySender;
use crate::model::classification::Classification;
use crate::model::envelope::{EmailAddress, InboundMail};

/// A composed reply, ready to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub from: String,
    pub to: EmailAddress,
    pub subject: String,
    pub html_body: String,
}

/// Compose the reply for a handled email, picking the template by category.
pub fn compose_reply(
    mail: &InboundMail,
    classification: &Classification,
    config: &ReplyConfig,
    nickname: &str,
) -> Reply {
    let template = if classification.category.is_board() {
        &config.board_template
    } else {
        &config.mail_template
    };

    Reply {
        from: config.from_address.clone(),
        to: mail.sender.clone(),
        subject: format!("{}{}", config.subject_prefix, mail.subject),
        html_body: render_template(template, nickname, &mail.subject),
    }
}

/// Substitute `{nickname}` and `{subject}`, HTML-escaping both values.
pub fn render_template(template: &str, nickname: &str, subject: &str) -> String {
    template
        .replace("{nickname}", &html_escape::encode_text(nickname))
        .replace("{subject}", &html_escape::encode_text(subject))
}

/// Writes replies as `.eml` files into an outbox directory for a relay to pick up.
#[derive(Debug, Clone)]
pub struct OutboxReplySender {
    dir: PathBuf,
}

impl OutboxReplySender {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ReplySender for OutboxReplySender {
    fn send(&self, reply: &Reply) -> Result<()> {
        if reply.to.address.is_empty() {
            return Err(MailboardError::Reply("reply has no recipient".into()));
        }

        std::fs::create_dir_all(&self.dir).map_err(|e| MailboardError::io(&self.dir, e))?;

        let now = Utc::now();
        let filename = format!(
            "{}_{}.eml",
            now.format("%Y%m%d_%H%M%S_%f"),
            sanitize_filename_part(&reply.to.address, 60)
        );
        let path = self.dir.join(filename);

        let message = format!(
            "From: {}\r\nTo: {}\r\nSubject: {}\r\nDate: {}\r\nMIME-Version: 1.0\r\n\
Content-Type: text/html; charset=utf-8\r\nContent-Transfer-Encoding: 8bit\r\n\r\n{}\r\n",
            reply.from,
            reply.to,
            reply.subject,
            now.to_rfc2822(),
            reply.html_body
        );
        std::fs::write(&path, message).map_err(|e| MailboardError::io(&path, e))?;

        debug!(path = %path.display(), to = %reply.to, "Queued reply");
        Ok(())
    }
}

/// Replace characters that are unsafe in filenames with `_` and truncate to `max_len`.
fn sanitize_filename_part(s: &str, max_len: usize) -> String {
    let sanitized: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '.' | '_' | '@') {
                c
            } else {
                '_'
            }
        })
        .take(max_len)
        .collect();

    if sanitized.is_empty() {
        "unknown".to_string()
    } else {
        sanitized
    }
}

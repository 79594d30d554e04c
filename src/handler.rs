//! Inbound email handler: runs the ingestion pipeline, then hands the result
//! to the persistence, notification and reply collaborators.
//!
//! Collaborator failures are logged and reported, never propagated. A reply
//! is attempted for every message regardless of what happened before it.

use chrono::Utc;
use tracing::{info, warn};

use crate::config::{Config, IngestConfig, NotifyConfig, ReplyConfig};
use crate::error::Result;
use crate::ingest::{self, Ingested};
use crate::model::envelope::InboundMail;
use crate::model::record::BoardRecord;
use crate::notify::format_notification;
use crate::reply::{compose_reply, Reply};

/// Appends board records.
pub trait BoardStore {
    fn append(&self, record: &BoardRecord) -> Result<()>;
}

/// Delivers a text notification to the site owner.
pub trait Notifier {
    fn notify(&self, message: &str) -> Result<()>;
}

/// Dispatches a reply email to the sender.
pub trait ReplySender {
    fn send(&self, reply: &Reply) -> Result<()>;
}

impl<T: BoardStore + ?Sized> BoardStore for Box<T> {
    fn append(&self, record: &BoardRecord) -> Result<()> {
        (**self).append(record)
    }
}

impl<T: Notifier + ?Sized> Notifier for Box<T> {
    fn notify(&self, message: &str) -> Result<()> {
        (**self).notify(message)
    }
}

impl<T: ReplySender + ?Sized> ReplySender for Box<T> {
    fn send(&self, reply: &Reply) -> Result<()> {
        (**self).send(reply)
    }
}

impl<T: BoardStore + ?Sized> BoardStore for &T {
    fn append(&self, record: &BoardRecord) -> Result<()> {
        (**self).append(record)
    }
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn notify(&self, message: &str) -> Result<()> {
        (**self).notify(message)
    }
}

impl<T: ReplySender + ?Sized> ReplySender for &T {
    fn send(&self, reply: &Reply) -> Result<()> {
        (**self).send(reply)
    }
}

/// What happened to one collaborator call.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "error")]
pub enum Outcome {
    Delivered,
    /// Not attempted (e.g. persistence for ordinary mail).
    Skipped,
    Failed(String),
}

impl Outcome {
    fn from_result(what: &str, result: Result<()>) -> Self {
        match result {
            Ok(()) => Self::Delivered,
            Err(e) => {
                warn!(collaborator = what, error = %e, "Collaborator failed, continuing");
                Self::Failed(e.to_string())
            }
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Result of handling one inbound email.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HandleReport {
    pub ingested: Ingested,
    pub stored: Outcome,
    pub notified: Outcome,
    pub replied: Outcome,
}

/// Handles inbound emails with explicitly injected collaborators.
pub struct InboundHandler<S, N, R> {
    ingest: IngestConfig,
    notify: NotifyConfig,
    reply: ReplyConfig,
    store: S,
    notifier: N,
    replier: R,
}

impl<S: BoardStore, N: Notifier, R: ReplySender> InboundHandler<S, N, R> {
    pub fn new(config: &Config, store: S, notifier: N, replier: R) -> Self {
        Self {
            ingest: config.ingest.clone(),
            notify: config.notify.clone(),
            reply: config.reply.clone(),
            store,
            notifier,
            replier,
        }
    }

    /// Process one inbound email end to end. Never fails.
    pub fn handle(&self, mail: &InboundMail) -> HandleReport {
        let ingested = ingest::process(&mail.raw, &mail.subject, &self.ingest);
        let nickname = ingested
            .classification
            .display_nickname(&self.ingest.default_nickname);

        let stored = if ingested.classification.category.is_board() {
            let record = BoardRecord::new(
                &mail.raw,
                nickname,
                mail.subject.as_str(),
                ingested.clean_content.as_str(),
                Utc::now(),
            );
            Outcome::from_result("store", self.store.append(&record))
        } else {
            Outcome::Skipped
        };

        let message = format_notification(mail, &ingested, &self.notify, nickname);
        let notified = Outcome::from_result("notify", self.notifier.notify(&message));

        let reply = compose_reply(mail, &ingested.classification, &self.reply, nickname);
        let replied = Outcome::from_result("reply", self.replier.send(&reply));

        info!(
            sender = %mail.sender,
            category = %ingested.classification.category,
            stored = ?stored,
            notified = notified.is_delivered(),
            replied = replied.is_delivered(),
            "Handled inbound email"
        );

        HandleReport {
            ingested,
            stored,
            notified,
            replied,
        }
    }
}

//! The ingestion pipeline: extract the body, sanitize it, classify the subject.
//!
//! Everything here is pure computation over in-memory values. It never fails
//! and keeps no state between calls.

pub mod classify;
pub mod sanitize;

use tracing::debug;

use crate::config::IngestConfig;
use crate::model::body::DecodedBody;
use crate::model::classification::Classification;
use crate::parser::mime::{self, Extraction};

/// Output of the sanitize-and-classify stage.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SanitizedMessage {
    pub clean_content: String,
    pub classification: Classification,
}

/// Output of the full pipeline for one raw message.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Ingested {
    pub extraction: Extraction,
    pub clean_content: String,
    pub classification: Classification,
}

impl Ingested {
    pub fn body(&self) -> &DecodedBody {
        &self.extraction.body
    }
}

/// Sanitize decoded body text and classify the subject line.
pub fn sanitize_and_classify(
    decoded_text: &str,
    subject: &str,
    config: &IngestConfig,
) -> SanitizedMessage {
    SanitizedMessage {
        clean_content: sanitize::sanitize(decoded_text, config.max_content_chars),
        classification: classify::classify(subject, &config.board_marker),
    }
}

/// Run extraction, sanitization and classification on a raw message.
pub fn process(raw: &[u8], subject: &str, config: &IngestConfig) -> Ingested {
    let extraction = mime::extract(raw);
    let sanitized = sanitize_and_classify(&extraction.text(), subject, config);

    debug!(
        category = %sanitized.classification.category,
        degraded = extraction.body.is_degraded(),
        content_chars = sanitized.clean_content.chars().count(),
        "Processed message"
    );

    Ingested {
        extraction,
        clean_content: sanitized.clean_content,
        classification: sanitized.classification,
    }
}

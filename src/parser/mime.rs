//! MIME body extraction: a line-oriented part scanner, body-part selection
//! with a blank-line fallback, and decoding into a [`DecodedBody`].

use tracing::{debug, warn};

use crate::model::body::DecodedBody;
use crate::model::part::{MimePart, MimePartDescriptor};
use crate::parser::decode::decode_part;
use crate::parser::header::{declares_text_plain, find_blank_line};

/// Scanner position within the current part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    InHeaders,
    InBody,
}

/// Splits message text into `(headers, payload)` records.
///
/// The top-level header block is part 0. A blank line ends a header block;
/// any line starting with `--` closes the current part and opens the next one.
#[derive(Debug)]
pub struct PartScanner {
    state: ScanState,
    current: MimePart,
    parts: Vec<MimePart>,
}

impl Default for PartScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl PartScanner {
    pub fn new() -> Self {
        Self {
            state: ScanState::InHeaders,
            current: MimePart::default(),
            parts: Vec::new(),
        }
    }

    /// Feed one line, including its line terminator if any.
    pub fn feed_line(&mut self, line: &str) {
        let content = line.trim_end_matches(['\r', '\n']);

        if content.starts_with("--") {
            self.close_part();
            return;
        }

        match self.state {
            ScanState::InHeaders if content.is_empty() => {
                self.current.has_separator = true;
                self.state = ScanState::InBody;
            }
            ScanState::InHeaders => {
                if !self.current.headers.is_empty() {
                    self.current.headers.push('\n');
                }
                self.current.headers.push_str(content);
            }
            ScanState::InBody => self.current.payload.push_str(line),
        }
    }

    /// Flush the last part and return every part in scan order.
    pub fn finish(mut self) -> Vec<MimePart> {
        self.close_part();
        self.parts
    }

    fn close_part(&mut self) {
        let mut part = std::mem::take(&mut self.current);
        // The line break before a boundary belongs to the boundary.
        if let Some(stripped) = part.payload.strip_suffix('\n') {
            let len = stripped.strip_suffix('\r').unwrap_or(stripped).len();
            part.payload.truncate(len);
        }
        self.parts.push(part);
        self.state = ScanState::InHeaders;
    }
}

/// Scan `text` into its parts.
pub fn scan_parts(text: &str) -> Vec<MimePart> {
    let mut scanner = PartScanner::new();
    for line in text.split_inclusive('\n') {
        scanner.feed_line(line);
    }
    scanner.finish()
}

/// Pick the body part: the first part with a separator whose headers
/// declare `text/plain`, else everything after the first blank line.
pub fn select_body_part(text: &str) -> MimePartDescriptor {
    let selected = scan_parts(text)
        .into_iter()
        .enumerate()
        .find(|(_, part)| part.has_separator && declares_text_plain(&part.headers));

    match selected {
        Some((index, part)) => {
            let descriptor = MimePartDescriptor::from_part(index, &part);
            debug!(
                part = index,
                encoding = %descriptor.transfer_encoding,
                charset = %descriptor.charset,
                "Selected text/plain part"
            );
            descriptor
        }
        None => {
            let payload = find_blank_line(text)
                .map(|(_, body_start)| text[body_start..].to_string())
                .unwrap_or_default();
            debug!(len = payload.len(), "No text/plain part, using fallback body");
            MimePartDescriptor::fallback(payload)
        }
    }
}

/// The selected part and its decoded body.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Extraction {
    pub part: MimePartDescriptor,
    pub body: DecodedBody,
}

impl Extraction {
    /// Body text handed downstream (diagnostic string when degraded).
    pub fn text(&self) -> String {
        self.body.text()
    }
}

/// Extract the plain-text body from a raw message. Never fails.
///
/// The raw bytes are read as UTF-8 (lossily) before scanning. Only base64 and
/// quoted-printable payloads go through the declared charset, so an
/// identity-encoded 8bit part in another charset comes out with U+FFFD in
/// place of its non-UTF-8 bytes.
pub fn extract(raw: &[u8]) -> Extraction {
    let raw = raw.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(raw);
    let text = String::from_utf8_lossy(raw);

    let part = select_body_part(&text);
    let body = DecodedBody::from(decode_part(&part));
    if let DecodedBody::Degraded(reason) = &body {
        warn!(
            encoding = %part.transfer_encoding,
            charset = %part.charset,
            reason = %reason,
            "Body decoding failed, continuing with diagnostic"
        );
    }

    Extraction { part, body }
}

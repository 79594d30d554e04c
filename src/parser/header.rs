//! Header block handling: unfolding, lookup, and envelope extraction.
//!
//! RFC 2047 encoded-words are left as-is.

use std::path::Path;

use crate::error::{MailboardError, Result};
use crate::model::envelope::{EmailAddress, InboundMail};

/// Subject used when a message carries none.
pub const NO_SUBJECT: &str = "(no subject)";

/// Unfold headers: join continuation lines (starting with space or tab) with the previous header.
///
/// Returns a list of `(lowercase_name, raw_value)` pairs.
pub fn unfold_headers(text: &str) -> Vec<(String, String)> {
    let mut result: Vec<(String, String)> = Vec::new();

    for line in text.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(last) = result.last_mut() {
                last.1.push(' ');
                last.1.push_str(line.trim());
            }
        } else if let Some(colon_pos) = line.find(':') {
            let name = line[..colon_pos].trim().to_ascii_lowercase();
            let value = line[colon_pos + 1..].trim().to_string();
            result.push((name, value));
        }
    }

    result
}

/// Get the first value for a header name (`name` must be lowercase).
pub fn get_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// `true` if the block's `Content-Type` media type is `text/plain`.
pub fn declares_text_plain(header_block: &str) -> bool {
    let headers = unfold_headers(header_block);
    get_header(&headers, "content-type")
        .map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or("")
                .trim()
                .eq_ignore_ascii_case("text/plain")
        })
        .unwrap_or(false)
}

/// Byte offsets `(header_end, body_start)` of the first blank line (LF or CRLF).
pub fn find_blank_line(text: &str) -> Option<(usize, usize)> {
    let lf = text.find("\n\n").map(|pos| (pos, pos + 2));
    let crlf = text.find("\r\n\r\n").map(|pos| (pos, pos + 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

/// Read a raw message file.
pub fn read_raw(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MailboardError::FileNotFound(path.to_path_buf())
        } else {
            MailboardError::io(path, e)
        }
    })
}

/// Build an [`InboundMail`] from a raw message, reading `From`, `To` and
/// `Subject` from its top-level header block.
pub fn inbound_from_raw(raw: Vec<u8>) -> InboundMail {
    let text = String::from_utf8_lossy(&raw);
    let header_text = match find_blank_line(&text) {
        Some((end, _)) => &text[..end],
        None => &text[..],
    };
    let headers = unfold_headers(header_text);

    let sender = EmailAddress::parse_first(get_header(&headers, "from").unwrap_or_default());
    let recipient = EmailAddress::parse_first(get_header(&headers, "to").unwrap_or_default());
    let subject = get_header(&headers, "subject")
        .filter(|s| !s.is_empty())
        .unwrap_or(NO_SUBJECT)
        .to_string();

    InboundMail {
        sender,
        recipient,
        subject,
        raw,
    }
}

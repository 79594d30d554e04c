//! MIME part records produced by the scanner and the descriptor of the
//! part selected as the message body.

use std::fmt;

/// Content-Transfer-Encoding of the selected part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransferEncoding {
    /// No transformation (`7bit`, `8bit`, `binary`, or undeclared).
    #[default]
    Identity,
    /// RFC 2045 Base64.
    Base64,
    /// RFC 2045 quoted-printable.
    QuotedPrintable,
}

impl TransferEncoding {
    /// Detect the encoding from a raw header block (case-insensitive substring match).
    pub fn detect(header_block: &str) -> Self {
        let lower = header_block.to_ascii_lowercase();
        if lower.contains("base64") {
            Self::Base64
        } else if lower.contains("quoted-printable") {
            Self::QuotedPrintable
        } else {
            Self::Identity
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identity => "identity",
            Self::Base64 => "base64",
            Self::QuotedPrintable => "quoted-printable",
        };
        f.write_str(name)
    }
}

/// Labels that all resolve to the GBK family.
const GBK_FAMILY: &[&str] = &["gb18030", "gb2312", "gbk", "cp936"];

/// Character set used to turn decoded bytes into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Utf8,
    Gbk,
    /// Any other label `encoding_rs` knows about.
    Label(&'static encoding_rs::Encoding),
}

impl Charset {
    /// Detect the charset from a raw header block.
    ///
    /// GBK-family tokens win anywhere in the block. Otherwise the `charset=`
    /// parameter is resolved through `encoding_rs`; unknown labels fall back to UTF-8.
    pub fn detect(header_block: &str) -> Self {
        let lower = header_block.to_ascii_lowercase();
        if GBK_FAMILY.iter().any(|token| lower.contains(token)) {
            return Self::Gbk;
        }

        let Some(label) = charset_param(&lower) else {
            return Self::Utf8;
        };

        match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(encoding) if encoding == encoding_rs::UTF_8 => Self::Utf8,
            Some(encoding) => Self::Label(encoding),
            None => {
                tracing::debug!(charset = label, "Unknown charset label, using UTF-8");
                Self::Utf8
            }
        }
    }

    /// The `encoding_rs` encoding backing this charset.
    pub fn encoding(&self) -> &'static encoding_rs::Encoding {
        match self {
            Self::Utf8 => encoding_rs::UTF_8,
            Self::Gbk => encoding_rs::GBK,
            Self::Label(encoding) => *encoding,
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => f.write_str("utf-8"),
            Self::Gbk => f.write_str("gbk"),
            Self::Label(encoding) => f.write_str(&encoding.name().to_ascii_lowercase()),
        }
    }
}

impl serde::Serialize for Charset {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Extract the value of the first `charset=` parameter from a lowercased block.
fn charset_param(lower: &str) -> Option<String> {
    let start = lower.find("charset=")? + "charset=".len();
    let value: String = lower[start..]
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
        .collect();
    (!value.is_empty()).then_some(value)
}

/// One `(headers, payload)` record emitted by the part scanner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MimePart {
    /// Raw header block, lines joined with `\n`.
    pub headers: String,
    /// Everything between the blank-line separator and the next boundary line.
    pub payload: String,
    /// Whether a blank line closed the header block.
    pub has_separator: bool,
}

/// Where the selected payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "index")]
pub enum PartSource {
    /// A scanned part declaring `text/plain` (index in scan order, 0 = top-level headers).
    Part(usize),
    /// Everything after the first blank line.
    Fallback,
}

/// The part selected as "the" body, with everything needed to decode it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MimePartDescriptor {
    pub transfer_encoding: TransferEncoding,
    pub charset: Charset,
    pub raw_payload: String,
    pub source: PartSource,
}

impl MimePartDescriptor {
    /// Build a descriptor for a scanned part, inspecting its header block.
    pub fn from_part(index: usize, part: &MimePart) -> Self {
        Self {
            transfer_encoding: TransferEncoding::detect(&part.headers),
            charset: Charset::detect(&part.headers),
            raw_payload: part.payload.clone(),
            source: PartSource::Part(index),
        }
    }

    /// Build the fallback descriptor: identity encoding, default charset.
    pub fn fallback(raw_payload: String) -> Self {
        Self {
            transfer_encoding: TransferEncoding::Identity,
            charset: Charset::Utf8,
            raw_payload,
            source: PartSource::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_transfer_encoding() {
        assert_eq!(
            TransferEncoding::detect("Content-Transfer-Encoding: BASE64"),
            TransferEncoding::Base64
        );
        assert_eq!(
            TransferEncoding::detect("Content-Transfer-Encoding: Quoted-Printable"),
            TransferEncoding::QuotedPrintable
        );
        assert_eq!(
            TransferEncoding::detect("Content-Transfer-Encoding: 8bit"),
            TransferEncoding::Identity
        );
    }

    #[test]
    fn test_detect_gbk_family() {
        assert_eq!(Charset::detect("Content-Type: text/plain; charset=GB2312"), Charset::Gbk);
        assert_eq!(Charset::detect("Content-Type: text/plain; charset=\"gbk\""), Charset::Gbk);
        assert_eq!(Charset::detect("Content-Type: text/plain; charset=gb18030"), Charset::Gbk);
    }

    #[test]
    fn test_detect_other_labels() {
        assert_eq!(
            Charset::detect("Content-Type: text/plain; charset=\"ISO-8859-1\""),
            Charset::Label(encoding_rs::WINDOWS_1252)
        );
        assert_eq!(Charset::detect("Content-Type: text/plain; charset=utf-8"), Charset::Utf8);
        assert_eq!(Charset::detect("Content-Type: text/plain; charset=x-klingon"), Charset::Utf8);
        assert_eq!(Charset::detect("Content-Type: text/plain"), Charset::Utf8);
    }

    #[test]
    fn test_charset_display() {
        assert_eq!(Charset::Gbk.to_string(), "gbk");
        assert_eq!(Charset::Utf8.to_string(), "utf-8");
        assert_eq!(Charset::Label(encoding_rs::SHIFT_JIS).to_string(), "shift_jis");
    }
}

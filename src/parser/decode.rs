//! Transfer-encoding and charset decoding for the selected body part.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use quoted_printable::ParseMode;
use tracing::debug;

use crate::error::{MailboardError, Result};
use crate::model::part::{Charset, MimePartDescriptor, TransferEncoding};

/// Standard alphabet, padding optional: mail clients routinely drop it.
const MIME_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decode a descriptor's payload according to its transfer-encoding and charset.
pub fn decode_part(part: &MimePartDescriptor) -> Result<String> {
    match part.transfer_encoding {
        TransferEncoding::Identity => Ok(part.raw_payload.clone()),
        TransferEncoding::Base64 => {
            let bytes = decode_base64(&part.raw_payload)?;
            Ok(decode_charset(&bytes, part.charset))
        }
        TransferEncoding::QuotedPrintable => {
            let bytes = decode_quoted_printable(&part.raw_payload)?;
            Ok(decode_charset(&bytes, part.charset))
        }
    }
}

/// Strip all whitespace and decode standard Base64.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(MIME_BASE64.decode(compact.as_bytes())?)
}

/// Decode quoted-printable: drop soft line breaks, resolve `=XX` escapes.
///
/// Decoding is line by line so hard line breaks keep their original form.
/// Sequences that are not valid escapes pass through as literal text.
pub fn decode_quoted_printable(payload: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(payload.len());

    for line in payload.split_inclusive('\n') {
        let content = line.trim_end_matches(['\r', '\n']);
        let decoded = quoted_printable::decode(content.as_bytes(), ParseMode::Robust)
            .map_err(|e| MailboardError::QuotedPrintable(e.to_string()))?;
        out.extend_from_slice(&decoded);

        // Soft line break: '=' [transport padding] (LF | CRLF | end of input)
        if !content.trim_end().ends_with('=') {
            out.extend_from_slice(line[content.len()..].as_bytes());
        }
    }

    Ok(out)
}

/// Decode bytes as text in the given charset.
///
/// Malformed sequences are replaced with U+FFFD so the readable rest of the
/// body survives.
pub fn decode_charset(bytes: &[u8], charset: Charset) -> String {
    let (text, had_errors) = charset.encoding().decode_without_bom_handling(bytes);
    if had_errors {
        debug!(%charset, "Malformed byte sequence replaced during charset decoding");
    }
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::part::PartSource;

    fn descriptor(encoding: TransferEncoding, charset: Charset, payload: &str) -> MimePartDescriptor {
        MimePartDescriptor {
            transfer_encoding: encoding,
            charset,
            raw_payload: payload.to_string(),
            source: PartSource::Part(1),
        }
    }

    #[test]
    fn test_base64_with_line_breaks() {
        let bytes = decode_base64("SGVs\r\nbG8g\n d29y bGQ=\n").unwrap();
        assert_eq!(bytes, b"Hello world");
    }

    #[test]
    fn test_base64_without_padding() {
        assert_eq!(decode_base64("SGk").unwrap(), b"Hi");
    }

    #[test]
    fn test_base64_invalid_symbol() {
        let err = decode_base64("!!!!").unwrap_err();
        assert!(matches!(err, MailboardError::Base64(_)));
        assert!(err.to_string().starts_with("invalid base64 payload"));
    }

    #[test]
    fn test_quoted_printable_escapes() {
        assert_eq!(decode_quoted_printable("na=C3=AFve").unwrap(), "naïve".as_bytes());
        assert_eq!(decode_quoted_printable("a=3Db").unwrap(), b"a=b");
    }

    #[test]
    fn test_quoted_printable_soft_breaks() {
        assert_eq!(decode_quoted_printable("long=\nline").unwrap(), b"longline");
        assert_eq!(decode_quoted_printable("long=\r\nline").unwrap(), b"longline");
        assert_eq!(decode_quoted_printable("pad=  \nded").unwrap(), b"padded");
        assert_eq!(decode_quoted_printable("trailing=").unwrap(), b"trailing");
    }

    #[test]
    fn test_quoted_printable_hard_breaks_kept() {
        assert_eq!(decode_quoted_printable("one\ntwo").unwrap(), b"one\ntwo");
        assert_eq!(decode_quoted_printable("one\r\ntwo\n").unwrap(), b"one\r\ntwo\n");
    }

    #[test]
    fn test_quoted_printable_invalid_escape_is_literal() {
        assert_eq!(decode_quoted_printable("bad=ZZescape").unwrap(), b"bad=ZZescape");
    }

    #[test]
    fn test_quoted_printable_bare_equals_in_prose() {
        let bytes = decode_quoted_printable("When x = 5 the caf=C3=A9 test works").unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "When x = 5 the café test works");
    }

    #[test]
    fn test_decode_gbk() {
        // "你好" in GBK
        assert_eq!(decode_charset(&[0xC4, 0xE3, 0xBA, 0xC3], Charset::Gbk), "你好");
    }

    #[test]
    fn test_decode_invalid_utf8_is_replaced() {
        assert_eq!(decode_charset(b"hello \xFF", Charset::Utf8), "hello \u{FFFD}");
    }

    #[test]
    fn test_decode_part_base64_with_stray_byte() {
        // "Hello world" followed by 0xFF
        let part = descriptor(TransferEncoding::Base64, Charset::Utf8, "SGVsbG8gd29ybGT/");
        assert_eq!(decode_part(&part).unwrap(), "Hello world\u{FFFD}");
    }

    #[test]
    fn test_decode_part_identity_is_untouched() {
        let part = descriptor(TransferEncoding::Identity, Charset::Utf8, "=C3 stays");
        assert_eq!(decode_part(&part).unwrap(), "=C3 stays");
    }

    #[test]
    fn test_decode_part_base64_gbk() {
        // "你好" in GBK, base64-encoded
        let part = descriptor(TransferEncoding::Base64, Charset::Gbk, "xOO6ww==");
        assert_eq!(decode_part(&part).unwrap(), "你好");
    }

    #[test]
    fn test_decode_part_qp_latin1() {
        let part = descriptor(
            TransferEncoding::QuotedPrintable,
            Charset::Label(encoding_rs::WINDOWS_1252),
            "caf=E9",
        );
        assert_eq!(decode_part(&part).unwrap(), "café");
    }
}

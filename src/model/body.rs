//! Outcome of decoding the selected body part.

/// Prefix rendered in front of the diagnostic when decoding degraded.
pub const PARSE_FAILED_PREFIX: &str = "parse failed: ";

/// Decoded body text, or a diagnostic when decoding failed.
///
/// Callers match on the variant; the diagnostic is only turned into the
/// `"parse failed: …"` display string by [`DecodedBody::text`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "value")]
pub enum DecodedBody {
    /// The payload decoded cleanly.
    Decoded(String),
    /// Decoding failed; carries the error message.
    Degraded(String),
}

impl DecodedBody {
    /// `true` if decoding failed and the body is a diagnostic.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    /// The text handed downstream: the decoded body, or the rendered diagnostic.
    pub fn text(&self) -> String {
        match self {
            Self::Decoded(text) => text.clone(),
            Self::Degraded(reason) => format!("{PARSE_FAILED_PREFIX}{reason}"),
        }
    }
}

impl<E: std::fmt::Display> From<Result<String, E>> for DecodedBody {
    fn from(result: Result<String, E>) -> Self {
        match result {
            Ok(text) => Self::Decoded(text),
            Err(e) => Self::Degraded(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_text_has_prefix() {
        let body = DecodedBody::Degraded("bad byte".into());
        assert!(body.is_degraded());
        assert_eq!(body.text(), "parse failed: bad byte");
    }

    #[test]
    fn test_from_result() {
        let ok: Result<String, std::fmt::Error> = Ok("hi".into());
        assert_eq!(DecodedBody::from(ok), DecodedBody::Decoded("hi".into()));
        let err: Result<String, std::fmt::Error> = Err(std::fmt::Error);
        assert!(DecodedBody::from(err).is_degraded());
    }
}

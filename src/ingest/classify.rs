//! Subject-line classification and nickname extraction.

use crate::model::classification::{Category, Classification};

/// Classify a subject line.
///
/// A subject containing `marker` is a board submission. Its nickname is the
/// first `[...]` group that directly follows any occurrence of the marker,
/// optionally after whitespace.
pub fn classify(subject: &str, marker: &str) -> Classification {
    if marker.is_empty() || !subject.contains(marker) {
        return Classification {
            category: Category::OrdinaryMail,
            nickname: None,
        };
    }

    let nickname = subject
        .match_indices(marker)
        .find_map(|(pos, _)| bracketed_prefix(subject[pos + marker.len()..].trim_start()));
    Classification {
        category: Category::BoardSubmission,
        nickname,
    }
}

/// The trimmed content of a leading `[...]` group, if it is non-empty.
fn bracketed_prefix(text: &str) -> Option<String> {
    let inner = text.strip_prefix('[')?;
    let close = inner.find(']')?;
    let name = inner[..close].trim();
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "[+]";

    #[test]
    fn test_board_submission_with_nickname() {
        let c = classify("[+] [Kira] hello", MARKER);
        assert_eq!(c.category, Category::BoardSubmission);
        assert_eq!(c.nickname.as_deref(), Some("Kira"));
    }

    #[test]
    fn test_nickname_directly_after_marker() {
        let c = classify("Re: [+][Nyan Cat]hi", MARKER);
        assert_eq!(c.nickname.as_deref(), Some("Nyan Cat"));
    }

    #[test]
    fn test_ordinary_mail() {
        let c = classify("Hello there", MARKER);
        assert_eq!(c.category, Category::OrdinaryMail);
        assert_eq!(c.nickname, None);
        assert_eq!(c.display_nickname("anonymous"), "anonymous");
    }

    #[test]
    fn test_marker_without_bracket() {
        let c = classify("[+] hi", MARKER);
        assert_eq!(c.category, Category::BoardSubmission);
        assert_eq!(c.nickname, None);
    }

    #[test]
    fn test_bracket_not_following_marker() {
        let c = classify("[+] hi [Kira]", MARKER);
        assert_eq!(c.nickname, None);
    }

    #[test]
    fn test_nickname_after_later_marker() {
        let c = classify("[+] re: [+] [Kira] hi", MARKER);
        assert_eq!(c.category, Category::BoardSubmission);
        assert_eq!(c.nickname.as_deref(), Some("Kira"));
    }

    #[test]
    fn test_first_bracketed_marker_wins() {
        let c = classify("[+][Ann] and [+] [Bob]", MARKER);
        assert_eq!(c.nickname.as_deref(), Some("Ann"));
    }

    #[test]
    fn test_empty_or_unclosed_bracket() {
        assert_eq!(classify("[+] [] hi", MARKER).nickname, None);
        assert_eq!(classify("[+] [  ] hi", MARKER).nickname, None);
        assert_eq!(classify("[+] [Kira hi", MARKER).nickname, None);
    }

    #[test]
    fn test_custom_marker() {
        let c = classify("#board [Kira] hi", "#board");
        assert!(c.category.is_board());
        assert_eq!(c.nickname.as_deref(), Some("Kira"));
    }

    #[test]
    fn test_empty_marker_never_matches() {
        assert_eq!(classify("anything", "").category, Category::OrdinaryMail);
    }
}

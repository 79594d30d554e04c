//! Turn a decoded body into a bounded plaintext snippet.
//!
//! Passes run in order, each on the output of the previous one:
//! tags, header remnants, boundary lines, truncation, trim.

/// Header names whose remnants are cut from the body, lowercase.
const HEADER_REMNANTS: &[&str] = &[
    "content-type:",
    "content-transfer-encoding:",
    "content-disposition:",
    "content-id:",
    "content-description:",
    "mime-version:",
];

/// Run every sanitization pass and bound the result to `max_chars` characters.
pub fn sanitize(decoded: &str, max_chars: usize) -> String {
    let text = strip_tags(decoded);
    let text = strip_header_remnants(&text);
    let text = strip_boundary_lines(&text);
    truncate_chars(&text, max_chars).trim().to_string()
}

/// Remove every `<...>` substring. An unclosed `<` is kept literally.
pub fn strip_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut remaining = text;

    while let Some(open) = remaining.find('<') {
        let Some(close) = remaining[open..].find('>') else {
            break;
        };
        result.push_str(&remaining[..open]);
        remaining = &remaining[open + close + 1..];
    }
    result.push_str(remaining);
    result
}

/// Cut from each recognized header name (case-insensitive) to the end of its line.
pub fn strip_header_remnants(text: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let lower = text.to_ascii_lowercase();
    let mut result = String::with_capacity(text.len());
    let mut pos = 0;

    while let Some(start) = HEADER_REMNANTS
        .iter()
        .filter_map(|name| lower[pos..].find(*name))
        .min()
        .map(|i| pos + i)
    {
        result.push_str(&text[pos..start]);
        pos = text[start..].find('\n').map_or(text.len(), |nl| start + nl);
    }
    result.push_str(&text[pos..]);
    result
}

/// Drop lines whose first non-blank characters are `--`.
pub fn strip_boundary_lines(text: &str) -> String {
    text.split_inclusive('\n')
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect()
}

/// The first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_pos, _)) => &text[..byte_pos],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(strip_tags("a < b"), "a < b");
        assert_eq!(strip_tags("<br/>x<"), "x<");
    }

    #[test]
    fn test_strip_header_remnants_mid_line() {
        let text = "Hi Content-Type: text/html\nnext line";
        assert_eq!(strip_header_remnants(text), "Hi \nnext line");
    }

    #[test]
    fn test_strip_header_remnants_case_insensitive() {
        let text = "CONTENT-TRANSFER-ENCODING: 7bit\nMime-Version: 1.0\nbody";
        assert_eq!(strip_header_remnants(text), "\n\nbody");
    }

    #[test]
    fn test_strip_header_remnants_keeps_non_ascii() {
        let text = "héllo content-id: <x>\nwörld";
        assert_eq!(strip_header_remnants(text), "héllo \nwörld");
    }

    #[test]
    fn test_strip_boundary_lines() {
        let text = "keep\n--boundary123\n  --indented\nalso keep";
        assert_eq!(strip_boundary_lines(text), "keep\nalso keep");
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }

    #[test]
    fn test_sanitize_full() {
        let text = "<b>Hi</b> Content-Type: text/html\n--boundary123";
        assert_eq!(sanitize(text, 500), "Hi");
    }

    #[test]
    fn test_sanitize_truncates_before_trim() {
        let text = format!("   {}", "x".repeat(600));
        let clean = sanitize(&text, 500);
        assert_eq!(clean.chars().count(), 497);
    }
}

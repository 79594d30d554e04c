//! Envelope of an inbound email: sender, recipient, subject and raw bytes.

use std::fmt;

/// A parsed email address.
///
/// - `"Kira <kira@example.com>"` → `display_name = "Kira"`, `address = "kira@example.com"`
/// - `"kira@example.com"` → `display_name = ""`
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EmailAddress {
    pub display_name: String,
    pub address: String,
}

impl EmailAddress {
    /// Parse `Name <addr>`, `<addr>` or a bare address. Anything else is kept
    /// verbatim as the address.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let (Some(open), Some(close)) = (trimmed.rfind('<'), trimmed.rfind('>')) {
            if close > open {
                let name = trimmed[..open].trim().trim_matches('"').trim();
                return Self {
                    display_name: name.to_string(),
                    address: trimmed[open + 1..close].trim().to_string(),
                };
            }
        }

        Self {
            display_name: String::new(),
            address: trimmed.to_string(),
        }
    }

    /// Parse the first address of a comma-separated header value.
    ///
    /// Commas inside quotes or angle brackets do not split.
    pub fn parse_first(raw: &str) -> Self {
        let mut in_quotes = false;
        let mut in_angle = false;
        for (i, ch) in raw.char_indices() {
            match ch {
                '"' => in_quotes = !in_quotes,
                '<' if !in_quotes => in_angle = true,
                '>' if !in_quotes => in_angle = false,
                ',' if !in_quotes && !in_angle => return Self::parse(&raw[..i]),
                _ => {}
            }
        }
        Self::parse(raw)
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.display_name.is_empty() {
            f.write_str(&self.address)
        } else {
            write!(f, "{} <{}>", self.display_name, self.address)
        }
    }
}

/// One received email, as handed to the inbound handler.
#[derive(Debug, Clone)]
pub struct InboundMail {
    pub sender: EmailAddress,
    pub recipient: EmailAddress,
    pub subject: String,
    pub raw: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_and_address() {
        let addr = EmailAddress::parse("Kira <kira@example.com>");
        assert_eq!(addr.display_name, "Kira");
        assert_eq!(addr.address, "kira@example.com");
        assert_eq!(addr.to_string(), "Kira <kira@example.com>");
    }

    #[test]
    fn test_parse_quoted_name() {
        let addr = EmailAddress::parse("\"Doe, Jane\" <jane@example.com>");
        assert_eq!(addr.display_name, "Doe, Jane");
        assert_eq!(addr.address, "jane@example.com");
    }

    #[test]
    fn test_parse_bare() {
        let addr = EmailAddress::parse("  someone@example.com ");
        assert_eq!(addr.display_name, "");
        assert_eq!(addr.to_string(), "someone@example.com");
    }

    #[test]
    fn test_parse_first_skips_quoted_comma() {
        let addr = EmailAddress::parse_first("\"Doe, Jane\" <jane@example.com>, bob@example.com");
        assert_eq!(addr.address, "jane@example.com");
        let addr = EmailAddress::parse_first("a@example.com, b@example.com");
        assert_eq!(addr.address, "a@example.com");
    }
}

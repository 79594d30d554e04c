//! Message category and the nickname extracted from the subject line.

use std::fmt;

/// Display name used when no nickname could be extracted.
pub const DEFAULT_NICKNAME: &str = "anonymous";

/// Whether an email is meant for the public message board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    BoardSubmission,
    OrdinaryMail,
}

impl Category {
    pub fn is_board(&self) -> bool {
        matches!(self, Self::BoardSubmission)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoardSubmission => f.write_str("board submission"),
            Self::OrdinaryMail => f.write_str("ordinary mail"),
        }
    }
}

/// Result of inspecting a subject line.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Classification {
    pub category: Category,
    /// `None` when the subject carried no `[nickname]` group.
    pub nickname: Option<String>,
}

impl Classification {
    /// The nickname to show, falling back to `default`.
    pub fn display_nickname<'a>(&'a self, default: &'a str) -> &'a str {
        self.nickname.as_deref().unwrap_or(default)
    }
}

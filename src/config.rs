//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MAILBOARD_CONFIG` (environment variable)
//! 2. `~/.config/mailboard/config.toml` (Linux/macOS)
//!    `%APPDATA%\mailboard\config.toml` (Windows)
//! 3. Built-in defaults
//!
//! The ingestion pipeline only reads [`IngestConfig`]. The other sections
//! are handed to the collaborators that need them.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::MailboardError;
use crate::model::classification::DEFAULT_NICKNAME;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Body extraction and classification.
    pub ingest: IngestConfig,
    /// Board record persistence.
    pub store: StoreConfig,
    /// Owner notifications.
    pub notify: NotifyConfig,
    /// Automatic replies to senders.
    pub reply: ReplyConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Override data directory for the board store and outbox.
    pub data_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Body extraction and classification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Maximum characters kept from the sanitized body (counted before trimming).
    pub max_content_chars: usize,
    /// Subject substring marking a message-board submission.
    pub board_marker: String,
    /// Nickname shown when the subject carries none.
    pub default_nickname: String,
}

/// Board record persistence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON-lines file holding board records (default: `<data_dir>/board.jsonl`).
    pub board_path: Option<PathBuf>,
}

/// Owner notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Site name shown in the notification title.
    pub site_name: String,
    /// Append notifications to this file instead of the log.
    pub log_path: Option<PathBuf>,
    /// Characters of the sanitized body included as a preview.
    pub preview_chars: usize,
}

/// Automatic reply settings.
///
/// Templates accept `{nickname}` and `{subject}` placeholders; both values
/// are HTML-escaped before interpolation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyConfig {
    /// `From` address of replies.
    pub from_address: String,
    /// Directory receiving outgoing `.eml` replies (default: `<data_dir>/outbox`).
    pub outbox_dir: Option<PathBuf>,
    /// Prefix prepended to the original subject.
    pub subject_prefix: String,
    /// HTML body for board submissions.
    pub board_template: String,
    /// HTML body for ordinary mail.
    pub mail_template: String,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            data_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_content_chars: 500,
            board_marker: "[+]".to_string(),
            default_nickname: DEFAULT_NICKNAME.to_string(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            site_name: "mailboard".to_string(),
            log_path: None,
            preview_chars: 120,
        }
    }
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            from_address: "noreply@localhost".to_string(),
            outbox_dir: None,
            subject_prefix: "Re: ".to_string(),
            board_template: "<p>Hi {nickname},</p>\
<p>Your message <b>{subject}</b> has been posted to the message board. Thanks for stopping by!</p>"
                .to_string(),
            mail_template: "<p>Hello,</p>\
<p>Thanks for your email <b>{subject}</b>. It has been received and I will get back to you soon.</p>"
                .to_string(),
        }
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Save configuration to the standard location.
pub fn save_config(config: &Config) -> anyhow::Result<()> {
    let path = config_file_path().ok_or_else(|| {
        MailboardError::Config("could not determine config file path".to_string())
    })?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MAILBOARD_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("mailboard").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailboard")
}

/// Return the data directory for the board store and outbox.
pub fn data_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.data_dir {
        return dir.clone();
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailboard")
}

/// Return the board store path.
pub fn board_path(config: &Config) -> PathBuf {
    config
        .store
        .board_path
        .clone()
        .unwrap_or_else(|| data_dir(config).join("board.jsonl"))
}

/// Return the reply outbox directory.
pub fn outbox_dir(config: &Config) -> PathBuf {
    config
        .reply
        .outbox_dir
        .clone()
        .unwrap_or_else(|| data_dir(config).join("outbox"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.ingest.max_content_chars, 500);
        assert_eq!(cfg.ingest.board_marker, "[+]");
        assert_eq!(cfg.ingest.default_nickname, "anonymous");
        assert_eq!(cfg.general.log_level, "warn");
        assert!(cfg.reply.board_template.contains("{nickname}"));
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.ingest, cfg.ingest);
        assert_eq!(parsed.reply.mail_template, cfg.reply.mail_template);
        assert_eq!(parsed.notify.preview_chars, cfg.notify.preview_chars);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r##"
[ingest]
board_marker = "#board"

[notify]
site_name = "example.com"
"##;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.ingest.board_marker, "#board");
        assert_eq!(cfg.notify.site_name, "example.com");
        assert_eq!(cfg.ingest.max_content_chars, 500);
        assert_eq!(cfg.reply.subject_prefix, "Re: ");
    }

    #[test]
    fn test_paths_follow_data_dir() {
        let mut cfg = Config::default();
        cfg.general.data_dir = Some(PathBuf::from("/tmp/mb"));
        assert_eq!(board_path(&cfg), PathBuf::from("/tmp/mb/board.jsonl"));
        assert_eq!(outbox_dir(&cfg), PathBuf::from("/tmp/mb/outbox"));

        cfg.store.board_path = Some(PathBuf::from("/srv/board.jsonl"));
        assert_eq!(board_path(&cfg), PathBuf::from("/srv/board.jsonl"));
    }
}

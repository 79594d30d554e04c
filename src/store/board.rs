//! Append-only JSON-lines store for message-board records.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{MailboardError, Result};
use crate::handler::BoardStore;
use crate::model::record::BoardRecord;

/// Board records stored one JSON object per line.
#[derive(Debug, Clone)]
pub struct JsonlBoardStore {
    path: PathBuf,
}

impl JsonlBoardStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record in insertion order.
    ///
    /// A missing file is an empty board. Lines that fail to parse are skipped.
    pub fn list(&self) -> Result<Vec<BoardRecord>> {
        let file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(MailboardError::io(&self.path, e)),
        };

        let mut records = Vec::new();
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| MailboardError::io(&self.path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<BoardRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        line = line_no + 1,
                        error = %e,
                        "Skipping unparseable board record"
                    );
                }
            }
        }
        Ok(records)
    }
}

impl BoardStore for JsonlBoardStore {
    fn append(&self, record: &BoardRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| MailboardError::io(parent, e))?;
        }

        let line = serde_json::to_string(record).map_err(|e| MailboardError::Store(e.to_string()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| MailboardError::io(&self.path, e))?;
        writeln!(file, "{line}").map_err(|e| MailboardError::io(&self.path, e))?;

        debug!(path = %self.path.display(), id = %record.id, "Appended board record");
        Ok(())
    }
}

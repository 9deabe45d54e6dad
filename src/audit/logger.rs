//! Append-only audit log writer
//!
//! Each entry is one JSON line. A line that fails to parse (for example a
//! write cut short by a crash) is skipped with a warning instead of making
//! the whole log unreadable.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use tracing::warn;

use crate::error::{DompetError, DompetResult};

use super::entry::AuditEntry;

/// Writes audit entries to a JSONL file
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    pub fn log(&self, entry: &AuditEntry) -> DompetResult<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| DompetError::Io(format!("Failed to open audit log: {}", e)))?;
        file.write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| DompetError::Io(format!("Failed to write audit entry: {}", e)))
    }

    /// Non-empty lines with their 1-based line numbers
    fn lines(&self) -> DompetResult<Vec<(usize, String)>> {
        let file = match File::open(&self.log_path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DompetError::Io(format!("Failed to open audit log: {}", e))),
        };

        let mut lines = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                DompetError::Io(format!("Failed to read audit log line {}: {}", index + 1, e))
            })?;
            if !line.trim().is_empty() {
                lines.push((index + 1, line));
            }
        }
        Ok(lines)
    }

    /// Read every entry, oldest first
    pub fn read_all(&self) -> DompetResult<Vec<AuditEntry>> {
        Ok(self
            .lines()?
            .into_iter()
            .filter_map(|(number, line)| match serde_json::from_str(&line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(line = number, error = %e, "skipping unreadable audit entry");
                    None
                }
            })
            .collect())
    }

    /// The last `count` entries, oldest first
    pub fn read_recent(&self, count: usize) -> DompetResult<Vec<AuditEntry>> {
        let mut entries = self.read_all()?;
        let start = entries.len().saturating_sub(count);
        Ok(entries.split_off(start))
    }

    pub fn entry_count(&self) -> DompetResult<usize> {
        Ok(self.read_all()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::{EntityType, Operation};
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_logger() -> (AuditLogger, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let logger = AuditLogger::new(temp_dir.path().join("audit.log"));
        (logger, temp_dir)
    }

    #[test]
    fn test_log_and_read() {
        let (logger, _temp) = create_test_logger();
        let entry = AuditEntry::create(
            EntityType::Transaction,
            "txn-12345678",
            None,
            &json!({"amount": 5000000}),
        );

        logger.log(&entry).unwrap();

        let entries = logger.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, Operation::Create);
        assert_eq!(entries[0].entity_type, EntityType::Transaction);
    }

    #[test]
    fn test_read_recent() {
        let (logger, _temp) = create_test_logger();

        for i in 0..10 {
            let entry = AuditEntry::create(
                EntityType::Bill,
                format!("bill-{}", i),
                None,
                &json!({"index": i}),
            );
            logger.log(&entry).unwrap();
        }

        assert_eq!(logger.entry_count().unwrap(), 10);

        let recent = logger.read_recent(3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].entity_id, "bill-7");
        assert_eq!(recent[2].entity_id, "bill-9");
    }

    #[test]
    fn test_empty_log() {
        let (logger, _temp) = create_test_logger();

        assert_eq!(logger.entry_count().unwrap(), 0);
        assert!(logger.read_all().unwrap().is_empty());
        assert!(logger.read_recent(5).unwrap().is_empty());
    }

    #[test]
    fn test_skips_truncated_line() {
        let (logger, temp) = create_test_logger();
        logger
            .log(&AuditEntry::create(EntityType::Budget, "bud-1", None, &json!({})))
            .unwrap();
        let mut file = OpenOptions::new()
            .append(true)
            .open(temp.path().join("audit.log"))
            .unwrap();
        file.write_all(b"{\"timestamp\":").unwrap();

        assert_eq!(logger.read_all().unwrap().len(), 1);
        assert_eq!(logger.entry_count().unwrap(), 1);
    }

    #[test]
    fn test_reopen_reads_existing_entries() {
        let (logger, temp) = create_test_logger();
        logger
            .log(&AuditEntry::delete(EntityType::Goal, "goal-1", None, &json!({})))
            .unwrap();

        let reopened = AuditLogger::new(temp.path().join("audit.log"));
        let entries = reopened.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, Operation::Delete);
    }
}

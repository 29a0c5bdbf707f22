//! Append-only audit trail.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{Local, NaiveDateTime};

use crate::order_store::StoreError;

/// Destination for audit entries.
pub trait AuditSink: Send + Sync {
    fn write_entry(&self, message: &str) -> Result<(), StoreError>;
}

/// `<timestamp> : <message>`
pub fn format_entry(at: NaiveDateTime, message: &str) -> String {
    format!("{} : {message}", at.format("%Y-%m-%dT%H:%M:%S%.3f"))
}

/// Audit log file; one line per entry, appended.
#[derive(Debug, Clone)]
pub struct FileAuditLog {
    path: PathBuf,
}

impl FileAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AuditSink for FileAuditLog {
    fn write_entry(&self, message: &str) -> Result<(), StoreError> {
        let context = || format!("writing audit entry to {}", self.path.display());
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::persistence(context(), e))?;
        }

        let mut line = format_entry(Local::now().naive_local(), message);
        line.push('\n');
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()))
            .map_err(|e| StoreError::persistence(context(), e))
    }
}

/// Collects entries in memory (tests/dev).
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: Mutex<Vec<String>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl AuditSink for InMemoryAuditLog {
    fn write_entry(&self, message: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?
            .push(message.to_string());
        Ok(())
    }
}

impl<A> AuditSink for std::sync::Arc<A>
where
    A: AuditSink + ?Sized,
{
    fn write_entry(&self, message: &str) -> Result<(), StoreError> {
        (**self).write_entry(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TempDir;
    use chrono::NaiveDate;

    #[test]
    fn entry_format_is_timestamp_colon_message() {
        let at = NaiveDate::from_ymd_opt(2050, 1, 1)
            .unwrap()
            .and_hms_milli_opt(9, 30, 0, 250)
            .unwrap();
        assert_eq!(
            format_entry(at, "All order data exported."),
            "2050-01-01T09:30:00.250 : All order data exported."
        );
    }

    #[test]
    fn file_log_appends_lines() {
        let tmp = TempDir::new();
        let log = FileAuditLog::new(tmp.path().join("AuditLog/audit.txt"));

        log.write_entry("first").unwrap();
        log.write_entry("second").unwrap();

        let contents = std::fs::read_to_string(tmp.path().join("AuditLog/audit.txt")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" : first"));
        assert!(lines[1].ends_with(" : second"));
    }
}

//! EventLog: ordered, append-only record of one import
//!
//! Every step of an import appends a human-readable message tagged with a
//! severity. The log is the only detailed account an import gives back to its
//! caller; the outcome itself is a single boolean.
//!
//! Appends are mirrored to `tracing` under `fieldsnap::log` so a subscriber
//! sees the same narrative.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Progress and skips
    Info,
    /// A value was written
    Success,
    /// Something failed
    Error,
}

impl Severity {
    /// Lowercase name (`info`, `success`, `error`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One appended message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Severity
    #[serde(rename = "type")]
    pub severity: Severity,
    /// Message text
    pub message: String,
    /// When the entry was appended
    pub timestamp: DateTime<Utc>,
}

/// Ordered sequence of log entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    entries: Vec<LogEntry>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message
    pub fn log(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Error => warn!(target: "fieldsnap::log", severity = %severity, "{}", message),
            _ => info!(target: "fieldsnap::log", severity = %severity, "{}", message),
        }
        self.entries.push(LogEntry {
            severity,
            message,
            timestamp: Utc::now(),
        });
    }

    /// Append an info message
    pub fn info(&mut self, message: impl Into<String>) {
        self.log(Severity::Info, message);
    }

    /// Append a success message
    pub fn success(&mut self, message: impl Into<String>) {
        self.log(Severity::Success, message);
    }

    /// Append an error message
    pub fn error(&mut self, message: impl Into<String>) {
        self.log(Severity::Error, message);
    }

    /// Entries in append order
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Consume the log, returning its entries
    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was logged
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Messages in append order
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.message.as_str())
    }

    /// Number of entries with the given severity
    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .iter()
            .filter(|e| e.severity == severity)
            .count()
    }

    /// True if any message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.messages().any(|m| m.contains(needle))
    }

    /// Plain-text download form: one `"<time> <type> <message>"` line per entry
    pub fn format_plain(&self) -> String {
        self.entries
            .iter()
            .map(|e| {
                format!(
                    "{} {} {}\n",
                    e.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
                    e.severity,
                    e.message
                )
            })
            .collect()
    }

    /// Terminal form: `"[INFO] <time>: <message>"` per entry
    pub fn render_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| {
                format!(
                    "[{}] {}: {}",
                    e.severity.as_str().to_uppercase(),
                    e.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    e.message
                )
            })
            .collect()
    }
}

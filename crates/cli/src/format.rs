//! Event log and summary formatting.
//!
//! Two modes:
//! - **Human** (default): `[INFO] 2024-01-01 12:00:00: message`, one per line
//! - **JSON** (`--json`): one `{type, message, timestamp}` object per line

use fieldsnap_engine::{EventLog, ImportOutcome};

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Format an event log.
pub fn format_log(log: &EventLog, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => log
            .entries()
            .iter()
            .map(|entry| {
                serde_json::to_string(entry)
                    .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
            })
            .collect::<Vec<_>>()
            .join("\n"),
        OutputMode::Human => log.render_lines().join("\n"),
    }
}

/// One-line result of an import.
pub fn format_import_summary(outcome: &ImportOutcome, event_logging: bool) -> String {
    if outcome.success {
        "Import completed successfully".to_string()
    } else if event_logging {
        "Import failed. View the event log for more details.".to_string()
    } else {
        "Import failed. Enable event_logging in fieldsnap.toml for more details.".to_string()
    }
}

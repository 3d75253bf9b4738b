//! Snapshot engine for fieldsnap
//!
//! This crate implements the export / import pipeline on top of the core
//! collaborator traits:
//! - Importer: applies a snapshot document, aborting on the first failure
//! - Rollback: replays prior values when an import aborts
//! - Exporter: builds a snapshot document for a selection of owners
//! - Normalizer: shapes composite values and decides emptiness
//! - EventLog: ordered, human-readable account of an import
//! - Hooks: filters and observers around every step
//! - SnapshotConfig: `fieldsnap.toml`
//!
//! Nothing here holds state between calls. Every import owns its own log and
//! rollback buffer.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod access;
pub mod config;
pub mod event_log;
pub mod exporter;
pub mod hooks;
pub mod importer;
pub mod normalizer;
pub mod rollback;

pub use config::{ExportConfig, SnapshotConfig, CONFIG_FILE_NAME};
pub use event_log::{EventLog, LogEntry, Severity};
pub use exporter::{export_filename, ExportSelection, Exporter};
pub use hooks::{FieldContext, Hooks};
pub use importer::{ImportOutcome, ImportRun, ImportStats, Importer};
pub use normalizer::{is_empty, Normalizer, DEFAULT_SHAPING_TYPES};
pub use rollback::{rollback, RollbackBuffer, RollbackEntry, RollbackSummary};

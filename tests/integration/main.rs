//! Integration Tests
//!
//! End-to-end tests of the snapshot pipeline against the in-memory site:
//! - Import: per-owner routines, skips, abort rule
//! - Rollback: replay after an abort, idempotence, partial failure
//! - Export: selection, shaping, export → import round trip
//! - Hooks: filters and observers around the pipeline
//! - Properties: emptiness and rollback invariants under proptest

#[path = "../common/mod.rs"]
mod common;

mod export;
mod hooks;
mod import;
mod properties;
mod rollback;

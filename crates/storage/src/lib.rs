//! Storage layer for fieldsnap
//!
//! This crate implements the in-memory site used by the CLI and the tests:
//! - MemorySite: field values, definitions, entities and content index
//!   behind `parking_lot` locks, loadable from a JSON fixture
//! - WriteFault: injected genuine or spurious write failures
//! - WriteRecord: journal of every write the site observed

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod faults;
pub mod site;

pub use faults::{WriteFault, WriteRecord};
pub use site::{CommentRecord, MemorySite, PostRecord, SiteData, UserRecord};

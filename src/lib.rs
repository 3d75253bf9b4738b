//! fieldsnap - snapshot export and import of custom-field values
//!
//! fieldsnap moves custom-field values (for posts, terms, users, comments and
//! site options) between sites as a JSON snapshot document, and imports such
//! a document with best-effort rollback.
//!
//! # Quick Start
//!
//! ```ignore
//! use fieldsnap::{Hooks, Importer, MemorySite};
//!
//! let site = MemorySite::load("site.json".as_ref())?;
//! let hooks = Hooks::new();
//!
//! let outcome = Importer::for_site(&site, &hooks).import(&snapshot_json, true);
//! for line in outcome.log.render_lines() {
//!     println!("{}", line);
//! }
//! ```
//!
//! # Architecture
//!
//! - `fieldsnap-core`: values, owners, field definitions, the document format
//!   and the collaborator traits a site implements
//! - `fieldsnap-engine`: importer, rollback, exporter, normalizer, hooks
//! - `fieldsnap-storage`: an in-memory site used by the CLI and tests

pub use fieldsnap_core::*;
pub use fieldsnap_engine::*;
pub use fieldsnap_storage::{
    CommentRecord, MemorySite, PostRecord, SiteData, UserRecord, WriteFault, WriteRecord,
};

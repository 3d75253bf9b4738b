//! Write fault injection and the write journal
//!
//! Real field stores report write failures unreliably. The in-memory site can
//! be told to reproduce both sides of that ambiguity for a given slot:
//!
//! - `Reject`: the write is dropped and reported as `false` (genuine failure)
//! - `Spurious`: the write is applied but still reported as `false`
//!
//! Every write that reaches the site is appended to the journal, whatever its
//! outcome, so tests can assert on exactly which writes happened.

use fieldsnap_core::Value;

/// Injected behaviour for writes to one (field, owner) slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFault {
    /// Drop the write and report `false`
    Reject,
    /// Apply the write but report `false`
    Spurious,
}

/// A write observed by the site
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRecord {
    /// Field name
    pub field: String,
    /// Owner address (`OwnerRef` display form)
    pub owner: String,
    /// Value that was written
    pub value: Value,
    /// Whether the value actually landed in the store
    pub applied: bool,
    /// What the write call returned
    pub reported: bool,
}

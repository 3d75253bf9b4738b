//! Rollback buffer and compensating replay
//!
//! Before an import touches a slot it records the slot's prior value. If the
//! import fails, replaying the buffer writes those prior values back.
//!
//! Replay is best effort: each entry succeeds or fails on its own, failures
//! are logged and reported to hooks, and the replay always runs to the end.
//!
//! A slot can be buffered more than once when a document lists the same
//! owner twice. Only the first record carries the value from before the
//! import, so later records for a slot already handled are skipped. This
//! also makes a replay idempotent: a second pass finds every slot already at
//! its prior value and writes nothing.

use crate::access::{describe_slot, FieldAccess};
use crate::event_log::EventLog;
use crate::hooks::{FieldContext, Hooks};
use crate::normalizer::Normalizer;
use fieldsnap_core::{FieldDefinition, FieldDefinitions, FieldStore, OwnerRef, Value};
use std::collections::HashSet;
use tracing::{debug, info};

/// Prior value of one slot, recorded before it was written
#[derive(Debug, Clone, PartialEq)]
pub struct RollbackEntry {
    /// Group the field was imported from
    pub group_key: String,
    /// Field name
    pub field_name: String,
    /// Owner of the slot
    pub owner: OwnerRef,
    /// Post type or taxonomy bucket the owner was listed under
    pub bucket: Option<String>,
    /// Value before the import (`Null` when absent)
    pub prior: Value,
}

impl RollbackEntry {
    fn context<'a>(&'a self, definition: Option<&'a FieldDefinition>) -> FieldContext<'a> {
        FieldContext {
            kind: self.owner.kind(),
            group_key: &self.group_key,
            field_name: &self.field_name,
            owner: &self.owner,
            bucket: self.bucket.as_deref(),
            definition,
        }
    }

    /// Rollback messages name a post by its post type
    fn describe(&self) -> String {
        match (&self.owner, self.bucket.as_deref()) {
            (OwnerRef::Post { id }, Some(post_type)) => {
                format!("field \"{}\" for {} ID {}", self.field_name, post_type, id)
            }
            _ => describe_slot(&self.field_name, &self.owner, self.bucket.as_deref()),
        }
    }
}

/// Prior values of one import, in the order they were recorded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollbackBuffer {
    entries: Vec<RollbackEntry>,
}

impl RollbackBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn record(&mut self, entry: RollbackEntry) {
        self.entries.push(entry);
    }

    /// Entries in recording order
    pub fn entries(&self) -> &[RollbackEntry] {
        &self.entries
    }

    /// Iterate entries in recording order
    pub fn iter(&self) -> impl Iterator<Item = &RollbackEntry> {
        self.entries.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First recorded prior value for a slot
    pub fn prior(&self, field: &str, owner: &OwnerRef) -> Option<&Value> {
        self.entries
            .iter()
            .find(|e| e.field_name == field && &e.owner == owner)
            .map(|e| &e.prior)
    }
}

/// Counts from one replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollbackSummary {
    /// Slots written back to their prior value
    pub restored: usize,
    /// Slots already at their prior value
    pub unchanged: usize,
    /// Slots whose compensating write failed
    pub failed: usize,
    /// Later records for a slot already handled
    pub superseded: usize,
}

impl RollbackSummary {
    /// True if every slot ended at its prior value
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Replay `buffer`, writing every prior value back
pub fn rollback(
    buffer: &RollbackBuffer,
    store: &dyn FieldStore,
    definitions: &dyn FieldDefinitions,
    hooks: &Hooks,
    log: &mut EventLog,
) -> RollbackSummary {
    let access = FieldAccess::new(store, definitions, Normalizer::new(hooks));
    replay(buffer, &access, hooks, log)
}

pub(crate) fn replay(
    buffer: &RollbackBuffer,
    access: &FieldAccess<'_>,
    hooks: &Hooks,
    log: &mut EventLog,
) -> RollbackSummary {
    hooks.notify_before_rollback(buffer);
    info!(target: "fieldsnap::rollback", entries = buffer.len(), "Replaying rollback buffer");

    let mut summary = RollbackSummary::default();
    let mut handled: HashSet<(&str, &OwnerRef)> = HashSet::new();

    for entry in buffer.iter() {
        if !handled.insert((entry.field_name.as_str(), &entry.owner)) {
            debug!(
                target: "fieldsnap::rollback",
                field = %entry.field_name,
                owner = %entry.owner,
                "Slot already restored; skipping later record"
            );
            summary.superseded += 1;
            continue;
        }

        let definition = access.definition(&entry.field_name, &entry.owner);
        let current = access.current(&entry.field_name, &entry.owner, definition.as_ref());
        if current == entry.prior {
            summary.unchanged += 1;
            continue;
        }

        let ctx = entry.context(definition.as_ref());
        let restored = access.write_corroborated(
            &entry.field_name,
            &entry.owner,
            definition.as_ref(),
            &entry.prior,
            &current,
        );
        if restored {
            log.info(format!("Rolled back {}.", entry.describe()));
            summary.restored += 1;
            hooks.notify_rollback_complete(&ctx, &entry.prior);
        } else {
            log.error(format!("Failed to rollback {}.", entry.describe()));
            summary.failed += 1;
            hooks.notify_rollback_failed(&ctx, &entry.prior, &current);
        }
    }

    info!(
        target: "fieldsnap::rollback",
        restored = summary.restored,
        unchanged = summary.unchanged,
        failed = summary.failed,
        superseded = summary.superseded,
        "Rollback finished"
    );
    hooks.notify_after_rollback(&summary);
    summary
}

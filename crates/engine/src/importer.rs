//! Importer: applies a snapshot document to a site
//!
//! ## Flow
//!
//! Groups and fields are visited in document order. Each field entry is
//! dispatched per sub-mapping in a fixed order (post types, taxonomies,
//! options, users, comments), and every owner inside goes through the same
//! slot pipeline:
//!
//! 1. validate the owner id
//! 2. check the owner exists (posts, users) and is editable (posts)
//! 3. read the current value and record it in the rollback buffer
//! 4. run the import filters
//! 5. skip if unchanged, otherwise write (corroborating a `false` report)
//!
//! ## Abort rule
//!
//! The first hard failure stops the whole import. Nothing after it is
//! attempted. With rollback enabled, the buffer is then replayed to put every
//! slot touched so far back to its prior value.
//!
//! Hard failures travel as `ImportAbort` through `?`; at the API boundary they
//! become a boolean and the event log.

use crate::access::{describe_slot, sentence, FieldAccess};
use crate::event_log::EventLog;
use crate::hooks::{FieldContext, Hooks};
use crate::normalizer::Normalizer;
use crate::rollback::{replay, RollbackBuffer, RollbackEntry, RollbackSummary};
use fieldsnap_core::{
    parse_owner_id, EntityAccess, FieldDefinitions, FieldEntry, FieldStore, OwnerKind, OwnerRef,
    OwnerValues, SnapshotDocument, Value,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Counters from one import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// Slots written
    pub written: usize,
    /// Slots skipped because the value was unchanged
    pub skipped: usize,
    /// Slots recorded in the rollback buffer
    pub buffered: usize,
    /// Slots restored by rollback
    pub rolled_back: usize,
    /// Compensating writes that failed
    pub rollback_failures: usize,
}

/// Result of an import
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// True if every slot was written or skipped
    pub success: bool,
    /// Everything that happened, in order
    pub log: EventLog,
    /// Counters
    pub stats: ImportStats,
    /// Replay summary, when a rollback ran
    pub rollback: Option<RollbackSummary>,
}

/// Hard failure that stops an import
#[derive(Debug, Error)]
enum ImportAbort {
    #[error("invalid {kind} id {raw:?}")]
    InvalidOwnerId { kind: OwnerKind, raw: String },

    #[error("{owner} does not exist")]
    OwnerMissing { owner: OwnerRef },

    #[error("post {id} is not editable")]
    PermissionDenied { id: u64 },

    #[error("write to field {field:?} at {owner} failed")]
    WriteFailed { field: String, owner: OwnerRef },
}

/// One (group, field, bucket) coordinate of an incoming value
#[derive(Debug, Clone, Copy)]
struct Target<'d> {
    group_key: &'d str,
    field_name: &'d str,
    bucket: Option<&'d str>,
}

/// Applies snapshot documents through the site collaborators
#[derive(Clone, Copy)]
pub struct Importer<'a> {
    store: &'a dyn FieldStore,
    definitions: &'a dyn FieldDefinitions,
    entities: &'a dyn EntityAccess,
    hooks: &'a Hooks,
}

impl<'a> Importer<'a> {
    /// Create an importer from separate collaborators
    pub fn new(
        store: &'a dyn FieldStore,
        definitions: &'a dyn FieldDefinitions,
        entities: &'a dyn EntityAccess,
        hooks: &'a Hooks,
    ) -> Self {
        Self {
            store,
            definitions,
            entities,
            hooks,
        }
    }

    /// Create an importer over a site that provides every collaborator
    pub fn for_site<S>(site: &'a S, hooks: &'a Hooks) -> Self
    where
        S: FieldStore + FieldDefinitions + EntityAccess,
    {
        Self::new(site, site, site, hooks)
    }

    /// Start a run whose buffer and log can be inspected before finishing
    pub fn begin(&self) -> ImportRun<'a> {
        ImportRun {
            slots: FieldAccess::new(self.store, self.definitions, Normalizer::new(self.hooks)),
            entities: self.entities,
            hooks: self.hooks,
            log: EventLog::new(),
            buffer: RollbackBuffer::new(),
            stats: ImportStats::default(),
            rollback: None,
            success: false,
        }
    }

    /// Parse and import a JSON document
    pub fn import(&self, json: &str, rollback_enabled: bool) -> ImportOutcome {
        let mut run = self.begin();
        run.import_json(json, rollback_enabled);
        run.finish()
    }

    /// Import an already parsed document
    pub fn import_document(
        &self,
        document: &SnapshotDocument,
        rollback_enabled: bool,
    ) -> ImportOutcome {
        let mut run = self.begin();
        run.import_document(document, rollback_enabled);
        run.finish()
    }
}

/// State of one import call
///
/// The rollback buffer lives exactly as long as the run; `finish` drops it.
pub struct ImportRun<'a> {
    slots: FieldAccess<'a>,
    entities: &'a dyn EntityAccess,
    hooks: &'a Hooks,
    log: EventLog,
    buffer: RollbackBuffer,
    stats: ImportStats,
    rollback: Option<RollbackSummary>,
    success: bool,
}

impl<'a> ImportRun<'a> {
    /// Prior values recorded so far
    pub fn buffer(&self) -> &RollbackBuffer {
        &self.buffer
    }

    /// Log so far
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Counters so far
    pub fn stats(&self) -> &ImportStats {
        &self.stats
    }

    /// Parse `json` and import it
    ///
    /// A document that does not parse is logged and fails without touching
    /// the store.
    pub fn import_json(&mut self, json: &str, rollback_enabled: bool) -> bool {
        match SnapshotDocument::from_json(json) {
            Ok(document) => self.import_document(&document, rollback_enabled),
            Err(e) => {
                warn!(target: "fieldsnap::import", error = %e, "Rejected import document");
                if e.is_syntax() {
                    self.log.error("Invalid JSON data");
                } else {
                    self.log.error("Import failed: Invalid data format.");
                }
                self.success = false;
                false
            }
        }
    }

    /// Import a parsed document
    pub fn import_document(&mut self, document: &SnapshotDocument, rollback_enabled: bool) -> bool {
        info!(
            target: "fieldsnap::import",
            groups = document.len(),
            rollback_enabled,
            "Import started"
        );
        self.hooks.notify_import_started(document);

        let result = self.import_groups(document);
        if let Err(abort) = &result {
            warn!(target: "fieldsnap::import", reason = %abort, "Import aborted");
            if rollback_enabled {
                let summary = replay(&self.buffer, &self.slots, self.hooks, &mut self.log);
                self.stats.rolled_back += summary.restored;
                self.stats.rollback_failures += summary.failed;
                self.rollback = Some(summary);
                self.log.error("Changes rolled back due to import failure.");
            }
        }

        self.success = result.is_ok();
        if self.success {
            self.log.success("Import process finished. Status: Success");
        } else {
            self.log.error("Import process finished. Status: Failed");
        }
        info!(
            target: "fieldsnap::import",
            success = self.success,
            written = self.stats.written,
            skipped = self.stats.skipped,
            "Import finished"
        );
        self.hooks.notify_import_finished(self.success);
        self.success
    }

    /// Close the run, discarding the rollback buffer
    pub fn finish(self) -> ImportOutcome {
        ImportOutcome {
            success: self.success,
            log: self.log,
            stats: self.stats,
            rollback: self.rollback,
        }
    }

    fn import_groups(&mut self, document: &SnapshotDocument) -> Result<(), ImportAbort> {
        for (group_key, fields) in document.groups() {
            self.log.info(format!("Importing group: \"{}\"", group_key));
            if fields.is_empty() {
                self.log.info("No fields to import, skipping update.");
                continue;
            }
            for (field_name, entry) in fields {
                if entry.is_empty() {
                    self.log.info(format!(
                        "No data to import for field \"{}\", skipping.",
                        field_name
                    ));
                    continue;
                }
                self.import_entry(group_key, field_name, entry)?;
            }
        }
        Ok(())
    }

    fn import_entry(
        &mut self,
        group_key: &str,
        field_name: &str,
        entry: &FieldEntry,
    ) -> Result<(), ImportAbort> {
        let target = |bucket| Target {
            group_key,
            field_name,
            bucket,
        };

        if let Some(post_types) = &entry.post_types {
            for (post_type, posts) in post_types {
                self.import_posts(target(Some(post_type.as_str())), posts)?;
            }
        }
        if let Some(taxonomies) = &entry.taxonomies {
            for (taxonomy, terms) in taxonomies {
                self.import_terms(target(Some(taxonomy.as_str())), terms)?;
            }
        }
        if let Some(value) = &entry.options {
            self.import_slot(target(None), OwnerRef::Option, value)?;
        }
        if let Some(users) = &entry.users {
            self.import_users(target(None), users)?;
        }
        if let Some(comments) = &entry.comments {
            for (post_type, comments) in comments {
                self.import_comments(target(Some(post_type.as_str())), comments)?;
            }
        }
        Ok(())
    }

    fn import_posts(&mut self, target: Target<'_>, posts: &OwnerValues) -> Result<(), ImportAbort> {
        for (raw_id, value) in posts {
            let id = self.owner_id(OwnerKind::Post, raw_id, &target)?;
            if !self.entities.post_exists(id) {
                self.log.error(format!(
                    "Post with ID {} does not exist. Cannot update field \"{}\"",
                    id, target.field_name
                ));
                return Err(ImportAbort::OwnerMissing {
                    owner: OwnerRef::post(id),
                });
            }
            if !self.entities.can_edit_post(id) {
                self.log.error(format!(
                    "Permission denied for post ID {}. Cannot edit field \"{}\"",
                    id, target.field_name
                ));
                return Err(ImportAbort::PermissionDenied { id });
            }
            self.import_slot(target, OwnerRef::post(id), value)?;
        }
        Ok(())
    }

    fn import_terms(&mut self, target: Target<'_>, terms: &OwnerValues) -> Result<(), ImportAbort> {
        let taxonomy = target.bucket.unwrap_or_default();
        for (raw_id, value) in terms {
            let id = self.owner_id(OwnerKind::Taxonomy, raw_id, &target)?;
            self.import_slot(target, OwnerRef::term(taxonomy, id), value)?;
        }
        Ok(())
    }

    fn import_users(&mut self, target: Target<'_>, users: &OwnerValues) -> Result<(), ImportAbort> {
        for (raw_id, value) in users {
            let id = self.owner_id(OwnerKind::User, raw_id, &target)?;
            if !self.entities.user_exists(id) {
                self.log.error(format!(
                    "User with ID {} does not exist. Cannot update field \"{}\"",
                    id, target.field_name
                ));
                return Err(ImportAbort::OwnerMissing {
                    owner: OwnerRef::user(id),
                });
            }
            self.import_slot(target, OwnerRef::user(id), value)?;
        }
        Ok(())
    }

    fn import_comments(
        &mut self,
        target: Target<'_>,
        comments: &OwnerValues,
    ) -> Result<(), ImportAbort> {
        for (raw_id, value) in comments {
            let id = self.owner_id(OwnerKind::Comment, raw_id, &target)?;
            self.import_slot(target, OwnerRef::comment(id), value)?;
        }
        Ok(())
    }

    fn owner_id(
        &mut self,
        kind: OwnerKind,
        raw: &str,
        target: &Target<'_>,
    ) -> Result<u64, ImportAbort> {
        parse_owner_id(raw).map_err(|_| {
            let Target {
                group_key,
                field_name,
                bucket,
            } = *target;
            let bucket = bucket.unwrap_or_default();
            self.log.error(match kind {
                OwnerKind::Taxonomy => format!(
                    "Invalid term ID \"{}\" for field \"{}\" in taxonomy \"{}\" in group \"{}\"",
                    raw, field_name, bucket, group_key
                ),
                OwnerKind::Comment => format!(
                    "Invalid comment ID \"{}\" for field \"{}\" in group \"{}\" for post type \"{}\"",
                    raw, field_name, group_key, bucket
                ),
                _ => format!(
                    "Invalid {} ID \"{}\" for field \"{}\" in group \"{}\"",
                    kind, raw, field_name, group_key
                ),
            });
            ImportAbort::InvalidOwnerId {
                kind,
                raw: raw.to_string(),
            }
        })
    }

    fn import_slot(
        &mut self,
        target: Target<'_>,
        owner: OwnerRef,
        incoming: &Value,
    ) -> Result<(), ImportAbort> {
        let field = target.field_name;
        let definition = self.slots.definition(field, &owner);
        let existing = self.slots.current(field, &owner, definition.as_ref());

        self.buffer.record(RollbackEntry {
            group_key: target.group_key.to_string(),
            field_name: field.to_string(),
            owner: owner.clone(),
            bucket: target.bucket.map(str::to_string),
            prior: existing.clone(),
        });
        self.stats.buffered += 1;

        let ctx = FieldContext {
            kind: owner.kind(),
            group_key: target.group_key,
            field_name: field,
            owner: &owner,
            bucket: target.bucket,
            definition: definition.as_ref(),
        };
        let value = self
            .hooks
            .filter_import_value(incoming.clone(), &existing, &ctx);
        let subject = describe_slot(field, &owner, target.bucket);

        if value == existing {
            self.log.info(format!(
                "{} has the same value. Skipping update.",
                sentence(&subject)
            ));
            self.stats.skipped += 1;
            return Ok(());
        }

        let written =
            self.slots
                .write_corroborated(field, &owner, definition.as_ref(), &value, &existing);
        if !written {
            self.log.error(format!("Failed to update {}.", subject));
            self.hooks.notify_field_failed(&ctx, &value, &existing);
            return Err(ImportAbort::WriteFailed {
                field: field.to_string(),
                owner,
            });
        }

        debug!(target: "fieldsnap::import", field, owner = %owner, "Field written");
        self.log.success(format!("Successfully updated {}.", subject));
        self.stats.written += 1;
        self.hooks.notify_field_imported(&ctx, &value);
        Ok(())
    }
}

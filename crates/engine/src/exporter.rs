//! Exporter: builds a snapshot document from a site
//!
//! The mirror image of the importer. For every selected group, each declared
//! field is read for every selected owner. Values are shaped against the
//! field's definition, passed through the export filters, and dropped when
//! empty; empty sub-mappings, fields and groups are dropped after them, so
//! the document only carries data.

use crate::access::FieldAccess;
use crate::hooks::{FieldContext, Hooks};
use crate::normalizer::{is_empty, Normalizer};
use chrono::NaiveDate;
use fieldsnap_core::{
    BucketedValues, ContentIndex, Error, FieldBucket, FieldDefinition, FieldDefinitions,
    FieldEntry, FieldStore, OwnerRef, OwnerValues, Result, SnapshotDocument, Value,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Which owners to export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSelection {
    /// Field group keys
    pub groups: Vec<String>,
    /// Post type → selected post ids
    #[serde(default)]
    pub post_types: IndexMap<String, Vec<u64>>,
    /// Taxonomy → selected term ids
    #[serde(default)]
    pub taxonomies: IndexMap<String, Vec<u64>>,
    /// Export option values
    #[serde(default)]
    pub options: bool,
    /// Export approved comments of the selected post types
    #[serde(default)]
    pub comments: bool,
    /// Export users with any of these roles
    #[serde(default)]
    pub user_roles: Vec<String>,
    /// Export these users
    #[serde(default)]
    pub user_ids: Vec<u64>,
}

impl ExportSelection {
    /// Select the given groups and nothing else
    pub fn groups<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            groups: groups.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Add posts of one type
    pub fn with_posts(mut self, post_type: impl Into<String>, ids: Vec<u64>) -> Self {
        self.post_types.insert(post_type.into(), ids);
        self
    }

    /// Add terms of one taxonomy
    pub fn with_terms(mut self, taxonomy: impl Into<String>, ids: Vec<u64>) -> Self {
        self.taxonomies.insert(taxonomy.into(), ids);
        self
    }

    /// Include option values
    pub fn with_options(mut self) -> Self {
        self.options = true;
        self
    }

    /// Include approved comments
    pub fn with_comments(mut self) -> Self {
        self.comments = true;
        self
    }

    /// Include users by role and by id
    pub fn with_users(mut self, roles: Vec<String>, ids: Vec<u64>) -> Self {
        self.user_roles = roles;
        self.user_ids = ids;
        self
    }

    /// Check the selection is complete enough to export
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` listing every problem, one per line.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.groups.is_empty() {
            errors.push("Please select at least one Field Group.".to_string());
        }
        for (post_type, ids) in &self.post_types {
            if ids.is_empty() {
                errors.push(format!(
                    "Please select at least one post ID for post type: {}",
                    post_type
                ));
            }
        }
        if self.comments && self.post_types.is_empty() {
            errors.push("Please select at least one Post Type when exporting Comments.".to_string());
        }
        for (taxonomy, ids) in &self.taxonomies {
            if ids.is_empty() {
                errors.push(format!(
                    "Please select at least one term for taxonomy: {}",
                    taxonomy
                ));
            }
        }
        if self.post_types.is_empty()
            && self.taxonomies.is_empty()
            && !self.wants_users()
            && !self.comments
            && !self.options
        {
            errors.push(
                "Please select at least one content type to export (Post Types, Taxonomies, Users, Comments, or Options)."
                    .to_string(),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::invalid_input(errors.join("\n")))
        }
    }

    fn wants_users(&self) -> bool {
        !self.user_roles.is_empty() || !self.user_ids.is_empty()
    }
}

/// Name of an export file written on `date`
pub fn export_filename(prefix: &str, date: NaiveDate) -> String {
    format!("{}-{}.json", prefix, date.format("%Y-%m-%d"))
}

/// Reads selected values out of a site
#[derive(Clone, Copy)]
pub struct Exporter<'a> {
    slots: FieldAccess<'a>,
    definitions: &'a dyn FieldDefinitions,
    content: &'a dyn ContentIndex,
    hooks: &'a Hooks,
}

impl<'a> Exporter<'a> {
    /// Create an exporter from separate collaborators
    pub fn new(
        store: &'a dyn FieldStore,
        definitions: &'a dyn FieldDefinitions,
        content: &'a dyn ContentIndex,
        hooks: &'a Hooks,
    ) -> Self {
        Self {
            slots: FieldAccess::new(store, definitions, Normalizer::new(hooks)),
            definitions,
            content,
            hooks,
        }
    }

    /// Create an exporter over a site that provides every collaborator
    pub fn for_site<S>(site: &'a S, hooks: &'a Hooks) -> Self
    where
        S: FieldStore + FieldDefinitions + ContentIndex,
    {
        Self::new(site, site, site, hooks)
    }

    /// Build a document for `selection`
    pub fn export(&self, selection: &ExportSelection) -> SnapshotDocument {
        self.hooks.notify_export_started(selection);
        let mut document = SnapshotDocument::new();

        for group_key in &selection.groups {
            let Some(group) = self.definitions.field_group(group_key) else {
                debug!(target: "fieldsnap::export", group = %group_key, "Unknown group; skipping");
                continue;
            };

            let mut bucket = FieldBucket::new();
            for definition in &group.fields {
                let entry = self.export_field(group_key, definition, selection);
                if !entry.is_empty() {
                    bucket.insert(definition.name.clone(), entry);
                }
            }
            if !bucket.is_empty() {
                document.insert_group(group_key.clone(), bucket);
            }
        }

        info!(
            target: "fieldsnap::export",
            requested = selection.groups.len(),
            exported = document.len(),
            "Export finished"
        );
        self.hooks.notify_export_finished(selection, &document);
        document
    }

    fn export_field(
        &self,
        group_key: &str,
        definition: &FieldDefinition,
        selection: &ExportSelection,
    ) -> FieldEntry {
        let mut entry = FieldEntry::default();

        let mut post_types = BucketedValues::new();
        for (post_type, ids) in &selection.post_types {
            if ids.is_empty() {
                continue;
            }
            let posts = self.content.posts(post_type, ids);
            let values = self.collect(
                group_key,
                definition,
                Some(post_type.as_str()),
                posts,
                OwnerRef::post,
            );
            if !values.is_empty() {
                post_types.insert(post_type.clone(), values);
            }
        }
        entry.post_types = non_empty(post_types);

        if selection.options {
            entry.options = self.value(group_key, definition, &OwnerRef::Option, None);
        }

        if selection.comments {
            let mut comments = BucketedValues::new();
            for post_type in selection.post_types.keys() {
                let ids = self.content.approved_comments(post_type);
                let values = self.collect(
                    group_key,
                    definition,
                    Some(post_type.as_str()),
                    ids,
                    OwnerRef::comment,
                );
                if !values.is_empty() {
                    comments.insert(post_type.clone(), values);
                }
            }
            entry.comments = non_empty(comments);
        }

        let mut taxonomies = BucketedValues::new();
        for (taxonomy, ids) in &selection.taxonomies {
            let values = self.collect(
                group_key,
                definition,
                Some(taxonomy.as_str()),
                ids.iter().copied(),
                |id| OwnerRef::term(taxonomy.as_str(), id),
            );
            if !values.is_empty() {
                taxonomies.insert(taxonomy.clone(), values);
            }
        }
        entry.taxonomies = non_empty(taxonomies);

        if selection.wants_users() {
            let ids = self.content.users(&selection.user_roles, &selection.user_ids);
            let users = self.collect(group_key, definition, None, ids, OwnerRef::user);
            entry.users = non_empty(users);
        }

        entry
    }

    fn collect<I, F>(
        &self,
        group_key: &str,
        definition: &FieldDefinition,
        bucket: Option<&str>,
        ids: I,
        owner_of: F,
    ) -> OwnerValues
    where
        I: IntoIterator<Item = u64>,
        F: Fn(u64) -> OwnerRef,
    {
        ids.into_iter()
            .filter_map(|id| {
                let owner = owner_of(id);
                self.value(group_key, definition, &owner, bucket)
                    .map(|v| (id.to_string(), v))
            })
            .collect()
    }

    fn value(
        &self,
        group_key: &str,
        definition: &FieldDefinition,
        owner: &OwnerRef,
        bucket: Option<&str>,
    ) -> Option<Value> {
        let shaped = self.slots.normalizer().requires_shaping(Some(definition));
        let raw = self.slots.read(&definition.name, owner, shaped)?;
        if raw.is_null() {
            return None;
        }

        let ctx = FieldContext {
            kind: owner.kind(),
            group_key,
            field_name: &definition.name,
            owner,
            bucket,
            definition: Some(definition),
        };
        let value = self
            .hooks
            .filter_export_value(self.slots.normalizer().shape(definition, &raw), &ctx);
        if is_empty(&value) {
            None
        } else {
            Some(value)
        }
    }
}

fn non_empty<V>(map: IndexMap<String, V>) -> Option<IndexMap<String, V>> {
    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

//! Snapshot document
//!
//! The snapshot document is the JSON wire format shared by export and import:
//!
//! ```json
//! {
//!   "group_abc": {
//!     "color": {
//!       "post_types": { "post": { "5": "red" } },
//!       "taxonomies": { "category": { "3": "blue" } },
//!       "users": { "7": "green" },
//!       "comments": { "post": { "9": "teal" } },
//!       "options": "navy"
//!     }
//!   }
//! }
//! ```
//!
//! Groups and fields keep document order. Owner ids are kept as the raw JSON
//! object keys; turning them into positive integers is the importer's job,
//! because a bad id there is a validation failure of the import, not a parse
//! failure of the document. No version field exists in the format.

use crate::error::{Error, Result};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Owner id (raw document key) → value
pub type OwnerValues = IndexMap<String, Value>;

/// Bucket name (post type or taxonomy) → owner values
pub type BucketedValues = IndexMap<String, OwnerValues>;

/// Field name → field entry
pub type FieldBucket = IndexMap<String, FieldEntry>;

/// Exported data for one field across every selected owner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldEntry {
    /// Post type → post id → value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_types: Option<BucketedValues>,
    /// Taxonomy → term id → value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxonomies: Option<BucketedValues>,
    /// User id → value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<OwnerValues>,
    /// Post type → comment id → value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<BucketedValues>,
    /// Site-wide option value; JSON `null` reads as absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl FieldEntry {
    /// True when no sub-mapping carries a single owner value
    pub fn is_empty(&self) -> bool {
        fn bucketed_empty(b: &Option<BucketedValues>) -> bool {
            b.as_ref()
                .map_or(true, |b| b.values().all(IndexMap::is_empty))
        }

        bucketed_empty(&self.post_types)
            && bucketed_empty(&self.taxonomies)
            && bucketed_empty(&self.comments)
            && self.users.as_ref().map_or(true, IndexMap::is_empty)
            && self.options.is_none()
    }
}

/// Ordered mapping from group key to field bucket
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotDocument {
    groups: IndexMap<String, FieldBucket>,
}

impl SnapshotDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document from its JSON form
    ///
    /// # Errors
    ///
    /// `Error::Serialization` for malformed JSON, `Error::InvalidDocument`
    /// when the JSON is well-formed but not shaped like a document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to compact JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Groups in document order
    pub fn groups(&self) -> impl Iterator<Item = (&String, &FieldBucket)> {
        self.groups.iter()
    }

    /// Look up one group
    pub fn group(&self, key: &str) -> Option<&FieldBucket> {
        self.groups.get(key)
    }

    /// Insert (or replace) a group, keeping its first position
    pub fn insert_group(&mut self, key: impl Into<String>, bucket: FieldBucket) {
        self.groups.insert(key.into(), bucket);
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True when the document has no groups
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Check the document shape before an import
    ///
    /// - group keys and field names are non-empty
    /// - post and user ids are integers (positivity is checked at import)
    /// - term and comment ids are numeric
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDocument` describing the first violation.
    pub fn validate_structure(&self) -> Result<()> {
        for (group_key, fields) in &self.groups {
            if group_key.is_empty() {
                return Err(Error::invalid_document("group key must not be empty"));
            }

            for (field_name, entry) in fields {
                if field_name.is_empty() {
                    return Err(Error::invalid_document(format!(
                        "field name must not be empty in group \"{}\"",
                        group_key
                    )));
                }

                if let Some(post_types) = &entry.post_types {
                    check_bucketed(post_types, is_integer, "post", field_name)?;
                }
                if let Some(taxonomies) = &entry.taxonomies {
                    check_bucketed(taxonomies, is_numeric, "term", field_name)?;
                }
                if let Some(users) = &entry.users {
                    check_ids(users.keys(), is_integer, "user", field_name)?;
                }
                if let Some(comments) = &entry.comments {
                    check_bucketed(comments, is_numeric, "comment", field_name)?;
                }
            }
        }

        Ok(())
    }
}

fn is_integer(raw: &str) -> bool {
    raw.parse::<i64>().is_ok()
}

fn is_numeric(raw: &str) -> bool {
    raw.trim().parse::<f64>().map_or(false, f64::is_finite)
}

fn check_bucketed(
    buckets: &BucketedValues,
    accept: fn(&str) -> bool,
    what: &str,
    field_name: &str,
) -> Result<()> {
    for (bucket, owners) in buckets {
        if bucket.is_empty() {
            return Err(Error::invalid_document(format!(
                "empty bucket name for field \"{}\"",
                field_name
            )));
        }
        check_ids(owners.keys(), accept, what, field_name)?;
    }
    Ok(())
}

fn check_ids<'a>(
    ids: impl Iterator<Item = &'a String>,
    accept: fn(&str) -> bool,
    what: &str,
    field_name: &str,
) -> Result<()> {
    for id in ids {
        if !accept(id) {
            return Err(Error::invalid_document(format!(
                "{} id \"{}\" for field \"{}\" is not numeric",
                what, id, field_name
            )));
        }
    }
    Ok(())
}

//! Collaborator traits
//!
//! The import and export pipelines never talk to a concrete CMS. Everything
//! they need from the outside world goes through these traits, so a site can
//! be backed by an in-memory fixture, a database, or a remote API without
//! touching the pipelines.
//!
//! Execution is single-threaded and synchronous; none of these traits
//! require `Send` or `Sync`.

use crate::field::{FieldDefinition, FieldGroup};
use crate::types::OwnerRef;
use crate::value::Value;

/// Key-value store of field values addressed by (field name, owner)
pub trait FieldStore {
    /// Read the current value of `field` at `owner`
    ///
    /// `shaped` asks for the formatted (nested, sub-field keyed) form of
    /// composite values instead of the raw stored form.
    ///
    /// Returns `None` if nothing is stored.
    fn read(&self, field: &str, owner: &OwnerRef, shaped: bool) -> Option<Value>;

    /// Write `value` for `field` at `owner`
    ///
    /// The result is NOT reliable: `false` may mean the write failed, or that
    /// it was a no-op because the stored value already matched. Callers must
    /// corroborate a `false` by reading the value back.
    fn write(&self, field: &str, value: &Value, owner: &OwnerRef) -> bool;
}

/// Lookup of field definitions and field groups
pub trait FieldDefinitions {
    /// Definition of `field` as it applies at `owner`, if one exists
    fn definition(&self, field: &str, owner: &OwnerRef) -> Option<FieldDefinition>;

    /// Field group registered under `key`
    fn field_group(&self, key: &str) -> Option<FieldGroup>;
}

/// Entity existence and permission checks used by the importer
pub trait EntityAccess {
    /// True if a post with this id exists
    fn post_exists(&self, id: u64) -> bool;

    /// True if the acting principal may edit this post
    fn can_edit_post(&self, id: u64) -> bool;

    /// True if a user with this id exists
    fn user_exists(&self, id: u64) -> bool;
}

/// Content enumeration used by the exporter
pub trait ContentIndex {
    /// Ids of posts of `post_type` among `ids`, in index order
    fn posts(&self, post_type: &str, ids: &[u64]) -> Vec<u64>;

    /// Ids of approved comments on posts of `post_type`
    fn approved_comments(&self, post_type: &str) -> Vec<u64>;

    /// Ids of users holding any of `roles` or listed in `ids`, without
    /// duplicates
    fn users(&self, roles: &[String], ids: &[u64]) -> Vec<u64>;
}

impl<T: FieldStore + ?Sized> FieldStore for &T {
    fn read(&self, field: &str, owner: &OwnerRef, shaped: bool) -> Option<Value> {
        (**self).read(field, owner, shaped)
    }

    fn write(&self, field: &str, value: &Value, owner: &OwnerRef) -> bool {
        (**self).write(field, value, owner)
    }
}

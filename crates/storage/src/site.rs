//! In-memory site
//!
//! `MemorySite` implements every collaborator trait the pipelines need:
//! field values, field definitions, entity checks and content enumeration.
//! It is the backing store of the CLI (loaded from and saved to a JSON site
//! fixture) and of the test suites.
//!
//! # Fixture format
//!
//! ```json
//! {
//!   "posts":    { "5": { "post_type": "post", "editable": true } },
//!   "terms":    { "category": [3, 4] },
//!   "users":    { "7": { "roles": ["editor"] } },
//!   "comments": { "9": { "post_id": 5, "approved": true } },
//!   "field_groups": [ { "key": "g1", "title": "Colors", "fields": [] } ],
//!   "values":   { "5": { "color": "red" }, "option": { "color": "navy" } }
//! }
//! ```
//!
//! Values are keyed by owner address (`OwnerRef` display form) and are kept
//! in their formatted form, so raw and shaped reads return the same value.
//!
//! # Concurrency
//!
//! State sits behind `parking_lot` locks so the site is `Sync`, but nothing
//! here serializes whole imports: two imports against one site interleave
//! freely.

use crate::faults::{WriteFault, WriteRecord};
use fieldsnap_core::{
    ContentIndex, EntityAccess, Error, FieldDefinition, FieldDefinitions, FieldGroup, FieldStore,
    OwnerRef, Result, Value,
};
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use tracing::debug;

/// A post known to the site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    /// Post type name
    pub post_type: String,
    /// Whether the acting principal may edit this post
    #[serde(default = "default_true")]
    pub editable: bool,
}

/// A user known to the site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Role names
    #[serde(default)]
    pub roles: Vec<String>,
}

/// A comment known to the site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    /// Post the comment belongs to
    pub post_id: u64,
    /// Moderation state
    #[serde(default = "default_true")]
    pub approved: bool,
}

fn default_true() -> bool {
    true
}

/// Serializable state of a site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteData {
    /// Posts by id
    #[serde(default)]
    pub posts: BTreeMap<u64, PostRecord>,
    /// Term ids by taxonomy
    #[serde(default)]
    pub terms: BTreeMap<String, Vec<u64>>,
    /// Users by id
    #[serde(default)]
    pub users: BTreeMap<u64, UserRecord>,
    /// Comments by id
    #[serde(default)]
    pub comments: BTreeMap<u64, CommentRecord>,
    /// Registered field groups
    #[serde(default)]
    pub field_groups: Vec<FieldGroup>,
    /// Owner address → field name → value
    #[serde(default)]
    pub values: BTreeMap<String, IndexMap<String, Value>>,
}

/// In-memory implementation of every collaborator trait
#[derive(Debug, Default)]
pub struct MemorySite {
    data: RwLock<SiteData>,
    faults: RwLock<HashMap<(String, String), WriteFault>>,
    journal: Mutex<Vec<WriteRecord>>,
}

impl MemorySite {
    /// Create an empty site
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a site from fixture data
    pub fn from_data(data: SiteData) -> Self {
        Self {
            data: RwLock::new(data),
            ..Self::default()
        }
    }

    /// Parse a site from its JSON fixture form
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or not shaped like a site.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: SiteData = serde_json::from_str(json)?;
        Ok(Self::from_data(data))
    }

    /// Load a site fixture from disk
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save the current state as a pretty-printed fixture
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&*self.data.read())
            .map_err(|e| Error::Serialization(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Snapshot of the current state
    pub fn data(&self) -> SiteData {
        self.data.read().clone()
    }

    // ========== Fixture builders ==========

    /// Register a post
    pub fn add_post(&self, id: u64, post_type: &str) -> &Self {
        self.data.write().posts.insert(
            id,
            PostRecord {
                post_type: post_type.to_string(),
                editable: true,
            },
        );
        self
    }

    /// Revoke edit permission on a post
    pub fn deny_edit(&self, id: u64) -> &Self {
        if let Some(post) = self.data.write().posts.get_mut(&id) {
            post.editable = false;
        }
        self
    }

    /// Register a term
    pub fn add_term(&self, taxonomy: &str, id: u64) -> &Self {
        let mut data = self.data.write();
        let terms = data.terms.entry(taxonomy.to_string()).or_default();
        if !terms.contains(&id) {
            terms.push(id);
        }
        drop(data);
        self
    }

    /// Register a user with roles
    pub fn add_user(&self, id: u64, roles: &[&str]) -> &Self {
        self.data.write().users.insert(
            id,
            UserRecord {
                roles: roles.iter().map(|r| r.to_string()).collect(),
            },
        );
        self
    }

    /// Register a comment on a post
    pub fn add_comment(&self, id: u64, post_id: u64, approved: bool) -> &Self {
        self.data
            .write()
            .comments
            .insert(id, CommentRecord { post_id, approved });
        self
    }

    /// Register a field group
    pub fn register_group(&self, group: FieldGroup) -> &Self {
        let mut data = self.data.write();
        data.field_groups.retain(|g| g.key != group.key);
        data.field_groups.push(group);
        drop(data);
        self
    }

    /// Store a value directly, bypassing faults and the journal
    pub fn set_value(&self, field: &str, owner: &OwnerRef, value: Value) -> &Self {
        self.data
            .write()
            .values
            .entry(owner.to_string())
            .or_default()
            .insert(field.to_string(), value);
        self
    }

    /// Current stored value, bypassing the journal
    pub fn value(&self, field: &str, owner: &OwnerRef) -> Option<Value> {
        self.data
            .read()
            .values
            .get(&owner.to_string())
            .and_then(|fields| fields.get(field))
            .cloned()
    }

    // ========== Fault injection ==========

    /// Make writes to (field, owner) behave as `fault`
    pub fn inject_fault(&self, field: &str, owner: &OwnerRef, fault: WriteFault) -> &Self {
        self.faults
            .write()
            .insert((field.to_string(), owner.to_string()), fault);
        self
    }

    /// Remove an injected fault
    pub fn clear_fault(&self, field: &str, owner: &OwnerRef) -> &Self {
        self.faults
            .write()
            .remove(&(field.to_string(), owner.to_string()));
        self
    }

    /// Every write observed so far
    pub fn journal(&self) -> Vec<WriteRecord> {
        self.journal.lock().clone()
    }

    /// Writes observed for one slot
    pub fn writes_to(&self, field: &str, owner: &OwnerRef) -> Vec<WriteRecord> {
        let address = owner.to_string();
        self.journal
            .lock()
            .iter()
            .filter(|w| w.field == field && w.owner == address)
            .cloned()
            .collect()
    }

    /// Forget every journaled write
    pub fn clear_journal(&self) {
        self.journal.lock().clear();
    }
}

impl FieldStore for MemorySite {
    fn read(&self, field: &str, owner: &OwnerRef, _shaped: bool) -> Option<Value> {
        self.value(field, owner)
    }

    fn write(&self, field: &str, value: &Value, owner: &OwnerRef) -> bool {
        let address = owner.to_string();
        let fault = self
            .faults
            .read()
            .get(&(field.to_string(), address.clone()))
            .copied();

        let (applied, reported) = {
            let mut data = self.data.write();
            let slot = data.values.entry(address.clone()).or_default();
            let changed = slot.get(field).unwrap_or(&Value::Null) != value;
            // Writing null deletes the stored value
            let apply = |slot: &mut IndexMap<String, Value>| {
                if value.is_null() {
                    slot.shift_remove(field);
                } else {
                    slot.insert(field.to_string(), value.clone());
                }
            };
            match fault {
                Some(WriteFault::Reject) => (false, false),
                Some(WriteFault::Spurious) => {
                    apply(slot);
                    (true, false)
                }
                None => {
                    if changed {
                        apply(slot);
                    }
                    (changed, changed)
                }
            }
        };

        debug!(
            target: "fieldsnap::store",
            field,
            owner = %address,
            applied,
            reported,
            "Field write"
        );

        self.journal.lock().push(WriteRecord {
            field: field.to_string(),
            owner: address,
            value: value.clone(),
            applied,
            reported,
        });

        reported
    }
}

impl FieldDefinitions for MemorySite {
    fn definition(&self, field: &str, _owner: &OwnerRef) -> Option<FieldDefinition> {
        self.data
            .read()
            .field_groups
            .iter()
            .find_map(|g| g.field(field).cloned())
    }

    fn field_group(&self, key: &str) -> Option<FieldGroup> {
        self.data
            .read()
            .field_groups
            .iter()
            .find(|g| g.key == key)
            .cloned()
    }
}

impl EntityAccess for MemorySite {
    fn post_exists(&self, id: u64) -> bool {
        self.data.read().posts.contains_key(&id)
    }

    fn can_edit_post(&self, id: u64) -> bool {
        self.data
            .read()
            .posts
            .get(&id)
            .map_or(false, |p| p.editable)
    }

    fn user_exists(&self, id: u64) -> bool {
        self.data.read().users.contains_key(&id)
    }
}

impl ContentIndex for MemorySite {
    fn posts(&self, post_type: &str, ids: &[u64]) -> Vec<u64> {
        self.data
            .read()
            .posts
            .iter()
            .filter(|(id, p)| p.post_type == post_type && ids.contains(*id))
            .map(|(id, _)| *id)
            .collect()
    }

    fn approved_comments(&self, post_type: &str) -> Vec<u64> {
        let data = self.data.read();
        data.comments
            .iter()
            .filter(|(_, c)| c.approved)
            .filter(|(_, c)| {
                data.posts
                    .get(&c.post_id)
                    .map_or(false, |p| p.post_type == post_type)
            })
            .map(|(id, _)| *id)
            .collect()
    }

    fn users(&self, roles: &[String], ids: &[u64]) -> Vec<u64> {
        let data = self.data.read();
        let matched: BTreeSet<u64> = data
            .users
            .iter()
            .filter(|(id, u)| ids.contains(*id) || u.roles.iter().any(|r| roles.contains(r)))
            .map(|(id, _)| *id)
            .collect();
        matched.into_iter().collect()
    }
}

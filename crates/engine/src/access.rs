//! Slot-level reads and writes shared by import, rollback and export
//!
//! A slot is one (field name, owner) pair. Reads pick raw or shaped form from
//! the field's definition at that owner; writes are corroborated because the
//! underlying store may report `false` for a write that actually landed.

use crate::normalizer::Normalizer;
use fieldsnap_core::{FieldDefinition, FieldDefinitions, FieldStore, OwnerRef, Value};
use tracing::debug;

#[derive(Clone, Copy)]
pub(crate) struct FieldAccess<'a> {
    store: &'a dyn FieldStore,
    definitions: &'a dyn FieldDefinitions,
    normalizer: Normalizer<'a>,
}

impl<'a> FieldAccess<'a> {
    pub(crate) fn new(
        store: &'a dyn FieldStore,
        definitions: &'a dyn FieldDefinitions,
        normalizer: Normalizer<'a>,
    ) -> Self {
        Self {
            store,
            definitions,
            normalizer,
        }
    }

    pub(crate) fn normalizer(&self) -> &Normalizer<'a> {
        &self.normalizer
    }

    pub(crate) fn definition(&self, field: &str, owner: &OwnerRef) -> Option<FieldDefinition> {
        self.definitions.definition(field, owner)
    }

    /// Current value of a slot; absent reads as `Null`
    pub(crate) fn current(
        &self,
        field: &str,
        owner: &OwnerRef,
        definition: Option<&FieldDefinition>,
    ) -> Value {
        let shaped = self.normalizer.requires_shaping(definition);
        self.store.read(field, owner, shaped).unwrap_or_default()
    }

    /// Raw read, `None` when nothing is stored
    pub(crate) fn read(&self, field: &str, owner: &OwnerRef, shaped: bool) -> Option<Value> {
        self.store.read(field, owner, shaped)
    }

    /// Write `value`, treating a `false` report as success when the slot moved
    ///
    /// A `false` report is only a genuine failure if a fresh read still
    /// equals `existing`.
    pub(crate) fn write_corroborated(
        &self,
        field: &str,
        owner: &OwnerRef,
        definition: Option<&FieldDefinition>,
        value: &Value,
        existing: &Value,
    ) -> bool {
        if self.store.write(field, value, owner) {
            return true;
        }
        let reread = self.current(field, owner, definition);
        if &reread == existing {
            false
        } else {
            debug!(
                target: "fieldsnap::store",
                field,
                owner = %owner,
                "Write reported failure but the value changed; treating as success"
            );
            true
        }
    }
}

/// Human-readable subject of a slot, e.g. `field "color" for post ID 5`
pub(crate) fn describe_slot(field: &str, owner: &OwnerRef, bucket: Option<&str>) -> String {
    match owner {
        OwnerRef::Post { id } => format!("field \"{}\" for post ID {}", field, id),
        OwnerRef::Term { taxonomy, id } => {
            format!("field \"{}\" for {} term ID {}", field, taxonomy, id)
        }
        OwnerRef::User { id } => format!("field \"{}\" for user ID {}", field, id),
        OwnerRef::Comment { id } => match bucket {
            Some(post_type) => format!(
                "field \"{}\" for comment ID {} in post type \"{}\"",
                field, id, post_type
            ),
            None => format!("field \"{}\" for comment ID {}", field, id),
        },
        OwnerRef::Option => format!("option \"{}\"", field),
    }
}

/// Upper-case the first character
pub(crate) fn sentence(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

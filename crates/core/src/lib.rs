//! Core types and traits for fieldsnap
//!
//! This crate defines the foundational types used throughout the system:
//! - Value: Unified value enum for custom-field values
//! - OwnerKind / OwnerRef: Where a field value lives
//! - FieldDefinition / FieldGroup: Declared field shapes
//! - SnapshotDocument / FieldEntry: The JSON wire format
//! - Error: Error type hierarchy
//! - Traits: Collaborators (FieldStore, FieldDefinitions, EntityAccess, ContentIndex)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod field;
pub mod traits;
pub mod types;
pub mod value;

// Re-export commonly used types and traits
pub use document::{BucketedValues, FieldBucket, FieldEntry, OwnerValues, SnapshotDocument};
pub use error::{Error, Result};
pub use field::{FieldDefinition, FieldGroup, FieldType, LayoutDefinition};
pub use traits::{ContentIndex, EntityAccess, FieldDefinitions, FieldStore};
pub use types::{parse_owner_id, OwnerKind, OwnerRef};
pub use value::{Value, ValueMap, LAYOUT_TAG_KEY};

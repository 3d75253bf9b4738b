//! Field definitions
//!
//! A field definition describes the declared shape of a custom field: its
//! name, its type and, for composite types, the sub-fields (or layouts) it
//! declares. Definitions drive shaping: stored composite values are re-keyed
//! down to the sub-fields that are currently declared.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of a custom field
///
/// Only the composite types carry meaning for fieldsnap; every other type
/// name is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// Non-repeating set of sub-fields
    Group,
    /// Repeating rows of sub-fields
    Repeater,
    /// Repeating rows, each tagged with one of several layouts
    FlexibleContent,
    /// Any scalar or otherwise opaque field type (`text`, `number`, ...)
    Other(String),
}

impl FieldType {
    /// Type name as used in definitions
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Group => "group",
            FieldType::Repeater => "repeater",
            FieldType::FlexibleContent => "flexible_content",
            FieldType::Other(name) => name,
        }
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "group" => FieldType::Group,
            "repeater" => FieldType::Repeater,
            "flexible_content" => FieldType::FlexibleContent,
            _ => FieldType::Other(name),
        }
    }
}

impl From<&str> for FieldType {
    fn from(name: &str) -> Self {
        FieldType::from(name.to_string())
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared shape of a single field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field name (the key values are stored under)
    pub name: String,
    /// Field type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Sub-fields of a group or repeater
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_fields: Vec<FieldDefinition>,
    /// Layouts of a flexible content field
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layouts: Vec<LayoutDefinition>,
}

impl FieldDefinition {
    /// Create a definition without sub-fields or layouts
    pub fn new(name: impl Into<String>, field_type: impl Into<FieldType>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            sub_fields: Vec::new(),
            layouts: Vec::new(),
        }
    }

    /// Attach sub-fields (group / repeater)
    pub fn with_sub_fields(mut self, sub_fields: Vec<FieldDefinition>) -> Self {
        self.sub_fields = sub_fields;
        self
    }

    /// Attach layouts (flexible content)
    pub fn with_layouts(mut self, layouts: Vec<LayoutDefinition>) -> Self {
        self.layouts = layouts;
        self
    }

    /// Find the layout declared under `name`
    pub fn layout(&self, name: &str) -> Option<&LayoutDefinition> {
        self.layouts.iter().find(|l| l.name == name)
    }
}

/// One layout (variant) of a flexible content field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDefinition {
    /// Variant name, matched against the row's layout tag
    pub name: String,
    /// Sub-fields declared for this variant
    #[serde(default)]
    pub sub_fields: Vec<FieldDefinition>,
}

impl LayoutDefinition {
    /// Create a layout
    pub fn new(name: impl Into<String>, sub_fields: Vec<FieldDefinition>) -> Self {
        Self {
            name: name.into(),
            sub_fields,
        }
    }
}

/// A named collection of field definitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGroup {
    /// Group key (the key used in snapshot documents)
    pub key: String,
    /// Human-readable title
    #[serde(default)]
    pub title: String,
    /// Top-level fields, in declaration order
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl FieldGroup {
    /// Find a top-level field by name
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
}

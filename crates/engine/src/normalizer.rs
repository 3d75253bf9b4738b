//! Value shaping
//!
//! Composite fields (group, repeater, flexible content) are stored with
//! whatever keys they had when they were last saved. Shaping re-keys such a
//! value down to the sub-fields its definition currently declares, so that
//! export and comparison see the same canonical form:
//!
//! - unknown keys are dropped
//! - sub-fields whose value is missing or null are dropped
//! - flexible content rows keep their layout tag and use that layout's
//!   sub-fields
//! - a composite that shapes down to nothing becomes `Null`
//!
//! Scalar values pass through untouched.

use crate::hooks::Hooks;
use fieldsnap_core::{FieldDefinition, FieldType, Value, ValueMap, LAYOUT_TAG_KEY};

/// Field types read in shaped form unless a shaping filter says otherwise
pub const DEFAULT_SHAPING_TYPES: [FieldType; 3] =
    [FieldType::Repeater, FieldType::Group, FieldType::FlexibleContent];

/// Is `value` empty?
///
/// Null, the empty string and empty arrays / objects are empty. Every other
/// scalar is present, including `0`, `0.0`, `"0"` and `false`. Containers are
/// empty when every element is empty, at any depth.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Bool(_) | Value::Int(_) | Value::Float(_) => false,
        Value::Array(items) => items.iter().all(is_empty),
        Value::Object(map) => map.values().all(is_empty),
    }
}

/// Shapes values against their field definitions
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'h> {
    hooks: &'h Hooks,
}

impl<'h> Normalizer<'h> {
    /// Create a normalizer that consults `hooks` for the shaping types
    pub fn new(hooks: &'h Hooks) -> Self {
        Self { hooks }
    }

    /// Should a field with this definition be read in shaped form?
    ///
    /// Unknown definitions are read raw.
    pub fn requires_shaping(&self, definition: Option<&FieldDefinition>) -> bool {
        let Some(definition) = definition else {
            return false;
        };
        let types = self
            .hooks
            .filter_shaping_types(DEFAULT_SHAPING_TYPES.to_vec(), definition);
        types.contains(&definition.field_type)
    }

    /// Is `value` empty? See [`is_empty`].
    pub fn is_empty(&self, value: &Value) -> bool {
        is_empty(value)
    }

    /// Shape `raw` against `definition`
    pub fn shape(&self, definition: &FieldDefinition, raw: &Value) -> Value {
        shape_value(definition, raw)
    }
}

fn shape_value(definition: &FieldDefinition, raw: &Value) -> Value {
    let shaped = match definition.field_type {
        FieldType::Group => Value::Object(shape_row(&definition.sub_fields, raw)),
        FieldType::Repeater => shape_rows(raw, |row| {
            Value::Object(shape_row(&definition.sub_fields, row))
        }),
        FieldType::FlexibleContent => shape_rows(raw, |row| shape_layout_row(definition, row)),
        FieldType::Other(_) => return raw.clone(),
    };

    if is_empty(&shaped) {
        Value::Null
    } else {
        shaped
    }
}

/// Shape every row of a repeating value
///
/// Rows arrive either as an array or as an object keyed by row index; the
/// container kind is kept.
fn shape_rows<F>(raw: &Value, shape_one: F) -> Value
where
    F: Fn(&Value) -> Value,
{
    match raw {
        Value::Array(rows) => Value::Array(rows.iter().map(&shape_one).collect()),
        Value::Object(rows) => Value::Object(
            rows.iter()
                .map(|(index, row)| (index.clone(), shape_one(row)))
                .collect(),
        ),
        _ => Value::Array(Vec::new()),
    }
}

/// Keep only the declared sub-fields of one row
fn shape_row(sub_fields: &[FieldDefinition], row: &Value) -> ValueMap {
    let mut out = ValueMap::new();
    let Some(map) = row.as_object() else {
        return out;
    };

    for sub in sub_fields {
        let Some(value) = map.get(&sub.name) else {
            continue;
        };
        // Nested composites that shape to nothing are dropped like nulls
        let shaped = shape_value(sub, value);
        if !shaped.is_null() {
            out.insert(sub.name.clone(), shaped);
        }
    }
    out
}

fn shape_layout_row(definition: &FieldDefinition, row: &Value) -> Value {
    let mut out = ValueMap::new();
    let Some(tag) = row.get(LAYOUT_TAG_KEY) else {
        return Value::Object(out);
    };
    out.insert(LAYOUT_TAG_KEY.to_string(), tag.clone());

    if let Some(layout) = tag.as_str().and_then(|name| definition.layout(name)) {
        out.extend(shape_row(&layout.sub_fields, row));
    }
    Value::Object(out)
}

//! Field-level diff
//!
//! Fields are matched by name. Every bucket keeps the declaration order of
//! the schema it was taken from: added fields follow the new schema, removed
//! and modified fields follow the old one.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{CompatError, Result};
use crate::schema::{Field, Schema};

/// A field retained under the same name whose definition changed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub name: String,
    pub old: Field,
    pub new: Field,
}

impl FieldChange {
    /// Which attributes differ (`type`, `default`, `doc`, `order`)
    pub fn changed_attributes(&self) -> Vec<&'static str> {
        let mut attrs = Vec::new();
        if self.old.field_type != self.new.field_type {
            attrs.push("type");
        }
        if self.old.default != self.new.default {
            attrs.push("default");
        }
        if self.old.doc != self.new.doc {
            attrs.push("doc");
        }
        if self.old.order != self.new.order {
            attrs.push("order");
        }
        attrs
    }
}

/// Set difference between two field collections
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldDiff {
    pub added_with_default: Vec<Field>,
    pub added_without_default: Vec<Field>,
    pub removed_with_default: Vec<Field>,
    pub removed_without_default: Vec<Field>,
    pub modified: Vec<FieldChange>,
}

impl FieldDiff {
    pub fn is_empty(&self) -> bool {
        self.added_count() == 0 && self.removed_count() == 0 && self.modified.is_empty()
    }

    pub fn added_count(&self) -> usize {
        self.added_with_default.len() + self.added_without_default.len()
    }

    pub fn removed_count(&self) -> usize {
        self.removed_with_default.len() + self.removed_without_default.len()
    }

    /// Total number of field changes
    pub fn change_count(&self) -> usize {
        self.added_count() + self.removed_count() + self.modified.len()
    }

    /// Names of all modified fields, in old-schema order
    pub fn modified_names(&self) -> Vec<&str> {
        self.modified.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Compute added, removed and modified fields between two schemas
pub fn diff_fields(old: &Schema, new: &Schema) -> Result<FieldDiff> {
    let old_index = index_fields(old)?;
    let new_index = index_fields(new)?;

    let mut diff = FieldDiff::default();

    for field in &new.fields {
        if !old_index.contains_key(field.name.as_str()) {
            if field.has_default() {
                diff.added_with_default.push(field.clone());
            } else {
                diff.added_without_default.push(field.clone());
            }
        }
    }

    for field in &old.fields {
        match new_index.get(field.name.as_str()) {
            None if field.has_default() => diff.removed_with_default.push(field.clone()),
            None => diff.removed_without_default.push(field.clone()),
            Some(&new_field) if new_field != field => diff.modified.push(FieldChange {
                name: field.name.clone(),
                old: field.clone(),
                new: new_field.clone(),
            }),
            Some(_) => {}
        }
    }

    Ok(diff)
}

fn index_fields(schema: &Schema) -> Result<HashMap<&str, &Field>> {
    let mut index = HashMap::with_capacity(schema.fields.len());
    for field in &schema.fields {
        if index.insert(field.name.as_str(), field).is_some() {
            return Err(CompatError::malformed(format!(
                "duplicate field '{}' in schema '{}'",
                field.name, schema.name
            )));
        }
    }
    Ok(index)
}

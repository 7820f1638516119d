//! Schema diffing
//!
//! Two independent differs run over the same (old, new) pair:
//! - `fields`: set difference over field names, plus in-place modifications
//! - `metadata`: attribute changes on kind, name, namespace and doc
//!
//! Both are pure functions of their inputs.

pub mod fields;
pub mod metadata;

pub use fields::{diff_fields, FieldChange, FieldDiff};
pub use metadata::{diff_metadata, MetadataAttr, MetadataChange, MetadataDiff};

use serde::Serialize;

use crate::error::Result;
use crate::schema::Schema;

/// Field and metadata differences between two schema versions
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaDiff {
    pub fields: FieldDiff,
    pub metadata: MetadataDiff,
}

impl SchemaDiff {
    /// Validate both schemas, then diff fields and metadata
    pub fn between(old: &Schema, new: &Schema) -> Result<Self> {
        old.validate()?;
        new.validate()?;

        let fields = diff_fields(old, new)?;
        let metadata = diff_metadata(old, new);

        tracing::debug!(
            added = fields.added_count(),
            removed = fields.removed_count(),
            modified = fields.modified.len(),
            metadata = metadata.len(),
            "computed schema diff"
        );

        Ok(Self { fields, metadata })
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.metadata.is_empty()
    }
}

//! Metadata-level diff (kind, name, namespace, doc)

use std::fmt;

use serde::Serialize;

use crate::schema::Schema;

/// Non-field schema attributes that are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataAttr {
    Kind,
    Name,
    Namespace,
    Doc,
}

impl MetadataAttr {
    /// Fixed evaluation and reporting order
    pub const ALL: [MetadataAttr; 4] = [
        MetadataAttr::Kind,
        MetadataAttr::Name,
        MetadataAttr::Namespace,
        MetadataAttr::Doc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataAttr::Kind => "kind",
            MetadataAttr::Name => "name",
            MetadataAttr::Namespace => "namespace",
            MetadataAttr::Doc => "doc",
        }
    }

    fn value_of<'a>(&self, schema: &'a Schema) -> Option<&'a str> {
        match self {
            MetadataAttr::Kind => Some(schema.kind.as_str()),
            MetadataAttr::Name => Some(schema.name.as_str()),
            MetadataAttr::Namespace => schema.namespace.as_deref(),
            MetadataAttr::Doc => schema.doc.as_deref(),
        }
    }
}

impl fmt::Display for MetadataAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One changed attribute. `None` means the attribute is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataChange {
    pub attr: MetadataAttr,
    pub old: Option<String>,
    pub new: Option<String>,
}

/// Changed metadata attributes, always in `kind, name, namespace, doc` order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MetadataDiff {
    changes: Vec<MetadataChange>,
}

impl MetadataDiff {
    pub fn get(&self, attr: MetadataAttr) -> Option<&MetadataChange> {
        self.changes.iter().find(|c| c.attr == attr)
    }

    pub fn contains(&self, attr: MetadataAttr) -> bool {
        self.get(attr).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetadataChange> {
        self.changes.iter()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Compare the non-field attributes of two schemas
pub fn diff_metadata(old: &Schema, new: &Schema) -> MetadataDiff {
    let changes = MetadataAttr::ALL
        .into_iter()
        .filter_map(|attr| {
            let (before, after) = (attr.value_of(old), attr.value_of(new));
            (before != after).then(|| MetadataChange {
                attr,
                old: before.map(str::to_string),
                new: after.map(str::to_string),
            })
        })
        .collect();

    MetadataDiff { changes }
}

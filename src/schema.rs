//! Schema model and AVRO source parsing
//!
//! A [`Schema`] is one version of a record definition: its metadata plus an
//! ordered field list. Field identity is by name; order is kept only so that
//! reports list fields the way the source declares them.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CompatError, Result};

/// Sort order declared on a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldOrder {
    Ascending,
    Descending,
    Ignore,
}

impl FieldOrder {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "ascending" => Some(FieldOrder::Ascending),
            "descending" => Some(FieldOrder::Descending),
            "ignore" => Some(FieldOrder::Ignore),
            _ => None,
        }
    }
}

/// A single field of a record schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Unique key within the owning schema
    pub name: String,
    /// Type descriptor, compared structurally
    #[serde(rename = "type")]
    pub field_type: Value,
    /// Declared default; `Some(Value::Null)` is a declared `null` default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<FieldOrder>,
}

impl Field {
    /// Create a field without default, doc or order
    pub fn new(name: impl Into<String>, field_type: Value) -> Self {
        Self {
            name: name.into(),
            field_type,
            default: None,
            doc: None,
            order: None,
        }
    }

    /// Set the default value
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Set the documentation string
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Set the sort order
    pub fn with_order(mut self, order: FieldOrder) -> Self {
        self.order = Some(order);
        self
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Compact rendering of the type descriptor (`"int"`, `["null","string"]`)
    pub fn type_name(&self) -> String {
        match &self.field_type {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn from_json(value: &Value, schema_name: &str) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            CompatError::malformed(format!("field entry in '{}' is not an object", schema_name))
        })?;

        let name = required_str(obj, "name")
            .ok_or_else(|| {
                CompatError::malformed(format!("field in '{}' has no name", schema_name))
            })?
            .to_string();

        let field_type = obj.get("type").cloned().ok_or_else(|| {
            CompatError::malformed(format!("field '{}.{}' has no type", schema_name, name))
        })?;

        let order = match obj.get("order") {
            None => None,
            Some(raw) => Some(raw.as_str().and_then(FieldOrder::parse).ok_or_else(|| {
                CompatError::malformed(format!(
                    "field '{}.{}' has invalid order {}",
                    schema_name, name, raw
                ))
            })?),
        };

        Ok(Self {
            name,
            field_type,
            // key presence, not value: `"default": null` is a real default
            default: obj.get("default").cloned(),
            doc: optional_str(obj, "doc"),
            order,
        })
    }
}

/// One version of a record definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Record type discriminator ("record", "enum", "fixed", ...)
    pub kind: String,
    /// Unqualified name
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Schema {
    /// Build a schema from its parts, enforcing the model invariants
    pub fn new(kind: impl Into<String>, name: impl Into<String>, fields: Vec<Field>) -> Result<Self> {
        let schema = Self {
            kind: kind.into(),
            name: name.into(),
            namespace: None,
            doc: None,
            fields,
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Set the namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the documentation string
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Parse AVRO schema source text (`.avsc` JSON)
    pub fn parse(source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Err(CompatError::malformed("schema source is empty"));
        }

        let value: Value = serde_json::from_str(source)
            .map_err(|e| CompatError::malformed(format!("invalid JSON: {}", e)))?;
        let schema = Self::from_json(&value)?;

        // Structural checks above give precise messages; AVRO catches the rest
        apache_avro::Schema::parse_str(source)
            .map_err(|e| CompatError::malformed(format!("invalid AVRO schema '{}': {}", schema.name, e)))?;

        tracing::debug!(
            name = %schema.full_name(),
            kind = %schema.kind,
            fields = schema.fields.len(),
            "parsed schema"
        );
        Ok(schema)
    }

    /// Read and parse an `.avsc` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        Self::parse(&source).map_err(|e| match e {
            CompatError::MalformedSchema(reason) => {
                CompatError::MalformedSchema(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })
    }

    /// Build the model from an already-decoded JSON schema document
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| CompatError::malformed("top-level schema must be a JSON object"))?;

        let kind = required_str(obj, "type")
            .ok_or_else(|| CompatError::malformed("schema has no 'type'"))?
            .to_string();
        let raw_name = required_str(obj, "name")
            .ok_or_else(|| CompatError::malformed(format!("{} schema has no 'name'", kind)))?;

        // A dotted name is already a full name; any "namespace" key is ignored
        let (name, namespace) = match raw_name.rsplit_once('.') {
            Some((ns, short)) => (short.to_string(), Some(ns.to_string())),
            None => (raw_name.to_string(), optional_str(obj, "namespace")),
        };

        let fields = match obj.get("fields") {
            None => Vec::new(),
            Some(Value::Array(entries)) => entries
                .iter()
                .map(|entry| Field::from_json(entry, &name))
                .collect::<Result<Vec<_>>>()?,
            Some(_) => {
                return Err(CompatError::malformed(format!(
                    "'fields' of '{}' is not an array",
                    name
                )))
            }
        };

        let schema = Self {
            kind,
            name,
            namespace: namespace.filter(|ns| !ns.is_empty()),
            doc: optional_str(obj, "doc"),
            fields,
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Check the model invariants: non-empty kind and name, unique field names
    pub fn validate(&self) -> Result<()> {
        if self.kind.trim().is_empty() {
            return Err(CompatError::malformed("schema kind is empty"));
        }
        if self.name.trim().is_empty() {
            return Err(CompatError::malformed("schema name is empty"));
        }

        let mut seen = HashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(CompatError::malformed(format!(
                    "schema '{}' has a field with an empty name",
                    self.name
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(CompatError::malformed(format!(
                    "duplicate field '{}' in schema '{}'",
                    field.name, self.name
                )));
            }
        }
        Ok(())
    }

    /// Namespace-qualified name
    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.full_name())
    }
}

fn required_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

fn optional_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

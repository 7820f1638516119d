//! AVRO Compatibility Gate
//!
//! Decides whether evolving a record schema from an old version to a new one
//! is safe under a schema-registry compatibility mode, and explains why.
//!
//! ## Pipeline
//!
//! ```text
//! Schema (old) ──┐
//!                ├─► diff_fields ───┐
//! Schema (new) ──┤                  ├─► CompatibilityChecker ─► Report
//!                └─► diff_metadata ─┘          ▲
//!                                              │
//!                         CompatibilityMode ◄──┘ (ModeSource: registry, CLI)
//! ```
//!
//! Everything between parsing and the report is pure: no I/O, no shared
//! state. The only blocking call is the registry lookup in [`registry`].
//!
//! ## Example
//!
//! ```
//! use avro_compat_gate::{check_compatibility, CompatibilityMode, Schema};
//!
//! let old = Schema::parse(r#"{"type": "record", "name": "Order",
//!     "fields": [{"name": "id", "type": "int"}]}"#).unwrap();
//! let new = Schema::parse(r#"{"type": "record", "name": "Order",
//!     "fields": [{"name": "id", "type": "int"},
//!                {"name": "region", "type": "string", "default": "us"}]}"#).unwrap();
//!
//! let report = check_compatibility(&old, &new, CompatibilityMode::Backward).unwrap();
//! assert!(report.compatible);
//! assert_eq!(report.warnings.len(), 1);
//! ```

pub mod compatibility;
pub mod config;
pub mod diff;
pub mod error;
pub mod mode;
pub mod registry;
pub mod report;
pub mod schema;

pub use compatibility::{check_compatibility, CompatibilityChecker};
pub use config::{GateConfig, OutputFormat};
pub use diff::{diff_fields, diff_metadata, FieldDiff, MetadataDiff, SchemaDiff};
pub use error::{CompatError, Result};
pub use mode::CompatibilityMode;
pub use registry::{FixedMode, HttpRegistry, ModeSource, WithFallback};
pub use report::{render, Finding, Report, Rule, Subject};
pub use schema::{Field, FieldOrder, Schema};

//! Schema compatibility checking
//!
//! Applies every rule relevant to the configured mode to a [`SchemaDiff`]
//! and collects all violations. Rules are evaluated in a fixed order:
//! metadata rules first (kind, name, namespace), then field rules
//! (modified, added without default, removed without default, added with
//! default, removed with default). Violations are data, never `Err`.

use crate::diff::{FieldDiff, MetadataAttr, MetadataDiff, SchemaDiff};
use crate::error::Result;
use crate::mode::CompatibilityMode;
use crate::report::{render, Finding, Report, Rule, Subject};
use crate::schema::Schema;

/// Compatibility checker bound to one configured mode
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityChecker {
    mode: CompatibilityMode,
}

impl CompatibilityChecker {
    pub fn new(mode: CompatibilityMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> CompatibilityMode {
        self.mode
    }

    /// Diff two schemas and classify the result
    pub fn check(&self, old: &Schema, new: &Schema) -> Result<Report> {
        let diff = SchemaDiff::between(old, new)?;
        Ok(self.classify(&diff))
    }

    /// Classify an already computed diff
    pub fn classify(&self, diff: &SchemaDiff) -> Report {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        self.metadata_rules(&diff.metadata, &mut errors, &mut warnings);
        self.field_rules(&diff.fields, &mut errors, &mut warnings);

        let report = render(errors, warnings);
        tracing::debug!(mode = %self.mode, summary = %report.summary(), "classified diff");
        report
    }

    fn metadata_rules(
        &self,
        metadata: &MetadataDiff,
        errors: &mut Vec<Finding>,
        warnings: &mut Vec<Finding>,
    ) {
        for change in metadata.iter() {
            let subject = Subject::metadata(change.attr);
            let old = display_value(change.old.as_deref());
            let new = display_value(change.new.as_deref());

            match change.attr {
                MetadataAttr::Kind => errors.push(Finding::new(
                    subject,
                    Rule::KindChanged,
                    format!(
                        "record kind changed from {} to {}; a kind change is incompatible under any mode",
                        old, new
                    ),
                )),
                MetadataAttr::Name if self.mode == CompatibilityMode::None => {
                    warnings.push(Finding::new(
                        subject,
                        Rule::NameChanged,
                        format!(
                            "schema renamed from {} to {}; consider declaring the old name as an alias instead",
                            old, new
                        ),
                    ))
                }
                MetadataAttr::Name => errors.push(Finding::new(
                    subject,
                    Rule::NameChanged,
                    format!(
                        "schema renamed from {} to {}; renaming is only allowed under NONE, use aliases",
                        old, new
                    ),
                )),
                MetadataAttr::Namespace => warnings.push(Finding::new(
                    subject,
                    Rule::NamespaceChanged,
                    format!(
                        "namespace changed from {} to {}; consumers that bind by full name may break",
                        old, new
                    ),
                )),
                MetadataAttr::Doc => {}
            }
        }
    }

    fn field_rules(&self, fields: &FieldDiff, errors: &mut Vec<Finding>, warnings: &mut Vec<Finding>) {
        for change in &fields.modified {
            errors.push(Finding::new(
                Subject::field(&change.name),
                Rule::FieldModified,
                format!(
                    "field modified in place ({} changed); in-place modification is not permitted under any mode",
                    change.changed_attributes().join(", ")
                ),
            ));
        }

        if self.mode.requires_backward() {
            for field in &fields.added_without_default {
                errors.push(Finding::new(
                    Subject::field(&field.name),
                    Rule::FieldAddedWithoutDefault,
                    format!(
                        "field ({}) added without a default; {} readers cannot fill it for data written with the old schema",
                        field.type_name(),
                        self.mode
                    ),
                ));
            }
        }

        if self.mode.requires_forward() {
            for field in &fields.removed_without_default {
                errors.push(Finding::new(
                    Subject::field(&field.name),
                    Rule::FieldRemovedWithoutDefault,
                    format!(
                        "field ({}) removed but had no default; {} requires old readers to still find it in new data",
                        field.type_name(),
                        self.mode
                    ),
                ));
            }
        }

        for field in &fields.added_with_default {
            warnings.push(Finding::new(
                Subject::field(&field.name),
                Rule::FieldAddedWithDefault,
                format!("field ({}) added with a default value", field.type_name()),
            ));
        }

        for field in &fields.removed_with_default {
            warnings.push(Finding::new(
                Subject::field(&field.name),
                Rule::FieldRemovedWithDefault,
                format!("field ({}) removed; it declared a default value", field.type_name()),
            ));
        }
    }
}

/// Check `new` against `old` under `mode`
pub fn check_compatibility(old: &Schema, new: &Schema, mode: CompatibilityMode) -> Result<Report> {
    CompatibilityChecker::new(mode).check(old, new)
}

fn display_value(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("'{}'", v),
        None => "<absent>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;
    use serde_json::json;

    fn record(fields: Vec<Field>) -> Schema {
        Schema::new("record", "Order", fields).unwrap()
    }

    fn rules(findings: &[Finding]) -> Vec<Rule> {
        findings.iter().map(|f| f.rule).collect()
    }

    #[test]
    fn test_identical_schemas_every_mode() {
        let schema = record(vec![
            Field::new("id", json!("int")),
            Field::new("region", json!("string")).with_default(json!("us")),
        ])
        .with_namespace("com.a");

        for mode in CompatibilityMode::ALL {
            let report = check_compatibility(&schema, &schema, mode).unwrap();
            assert!(report.compatible, "{}", mode);
            assert!(report.errors.is_empty());
            assert!(report.warnings.is_empty());
        }
    }

    #[test]
    fn test_added_without_default_by_mode() {
        let old = record(vec![Field::new("id", json!("int"))]);
        let new = record(vec![Field::new("id", json!("int")), Field::new("amount", json!("double"))]);

        for mode in CompatibilityMode::ALL {
            let report = check_compatibility(&old, &new, mode).unwrap();
            assert_eq!(report.compatible, !mode.requires_backward(), "{}", mode);
            assert_eq!(report.has_error_for("amount"), mode.requires_backward(), "{}", mode);
        }
    }

    #[test]
    fn test_removed_without_default_by_mode() {
        let old = record(vec![Field::new("id", json!("int")), Field::new("amount", json!("double"))]);
        let new = record(vec![Field::new("id", json!("int"))]);

        for mode in CompatibilityMode::ALL {
            let report = check_compatibility(&old, &new, mode).unwrap();
            assert_eq!(report.compatible, !mode.requires_forward(), "{}", mode);
            assert_eq!(report.has_error_for("amount"), mode.requires_forward(), "{}", mode);
        }
    }

    #[test]
    fn test_full_reports_both_directions() {
        let old = record(vec![Field::new("id", json!("int")), Field::new("amount", json!("double"))]);
        let new = record(vec![Field::new("id", json!("int")), Field::new("currency", json!("string"))]);

        let report = check_compatibility(&old, &new, CompatibilityMode::Full).unwrap();
        assert_eq!(
            rules(&report.errors),
            vec![Rule::FieldAddedWithoutDefault, Rule::FieldRemovedWithoutDefault]
        );
        assert!(report.has_error_for("currency"));
        assert!(report.has_error_for("amount"));
    }

    #[test]
    fn test_modified_is_error_in_every_mode() {
        let old = record(vec![Field::new("id", json!("int"))]);
        let new = record(vec![Field::new("id", json!("long"))]);

        for mode in CompatibilityMode::ALL {
            let report = check_compatibility(&old, &new, mode).unwrap();
            assert!(!report.compatible, "{}", mode);
            assert_eq!(rules(&report.errors), vec![Rule::FieldModified]);
            assert!(report.errors[0].message.contains("type"));
        }
    }

    #[test]
    fn test_defaulted_changes_only_warn() {
        let old = record(vec![
            Field::new("id", json!("int")),
            Field::new("legacy", json!("string")).with_default(json!("")),
        ]);
        let new = record(vec![
            Field::new("id", json!("int")),
            Field::new("region", json!("string")).with_default(json!("us")),
        ]);

        for mode in CompatibilityMode::ALL {
            let report = check_compatibility(&old, &new, mode).unwrap();
            assert!(report.compatible, "{}", mode);
            assert_eq!(
                rules(&report.warnings),
                vec![Rule::FieldAddedWithDefault, Rule::FieldRemovedWithDefault]
            );
        }
    }

    #[test]
    fn test_kind_change_always_errors() {
        let old = record(vec![]);
        let new = Schema::new("enum", "Order", vec![]).unwrap();

        for mode in CompatibilityMode::ALL {
            let report = check_compatibility(&old, &new, mode).unwrap();
            assert!(!report.compatible, "{}", mode);
            assert_eq!(rules(&report.errors), vec![Rule::KindChanged]);
        }
    }

    #[test]
    fn test_name_change_warns_only_under_none() {
        let old = record(vec![]);
        let new = Schema::new("record", "Purchase", vec![]).unwrap();

        let report = check_compatibility(&old, &new, CompatibilityMode::None).unwrap();
        assert!(report.compatible);
        assert_eq!(rules(&report.warnings), vec![Rule::NameChanged]);
        assert!(report.warnings[0].message.contains("alias"));

        for mode in CompatibilityMode::ALL.into_iter().filter(|m| *m != CompatibilityMode::None) {
            let report = check_compatibility(&old, &new, mode).unwrap();
            assert!(!report.compatible, "{}", mode);
            assert_eq!(rules(&report.errors), vec![Rule::NameChanged]);
        }
    }

    #[test]
    fn test_doc_change_is_silent() {
        let old = record(vec![]).with_doc("v1");
        let new = record(vec![]).with_doc("v2");

        let report = check_compatibility(&old, &new, CompatibilityMode::FullTransitive).unwrap();
        assert!(report.compatible);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_all_violations_collected_in_order() {
        let old = record(vec![
            Field::new("id", json!("int")),
            Field::new("amount", json!("double")),
        ])
        .with_namespace("com.a");
        let new = Schema::new(
            "enum",
            "Order",
            vec![Field::new("id", json!("long")), Field::new("currency", json!("string"))],
        )
        .unwrap()
        .with_namespace("com.b");

        let report = check_compatibility(&old, &new, CompatibilityMode::Full).unwrap();
        assert_eq!(
            rules(&report.errors),
            vec![
                Rule::KindChanged,
                Rule::FieldModified,
                Rule::FieldAddedWithoutDefault,
                Rule::FieldRemovedWithoutDefault,
            ]
        );
        assert_eq!(rules(&report.warnings), vec![Rule::NamespaceChanged]);
    }
}

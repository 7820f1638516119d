//! End-to-end gate tests over AVRO fixtures
//!
//! Each test parses real `.avsc` files and runs the full
//! parse -> diff -> classify -> report pipeline.

use std::path::{Path, PathBuf};

use avro_compat_gate::{
    check_compatibility, CompatError, CompatibilityMode, Report, Rule, Schema, SchemaDiff,
};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn load(name: &str) -> Schema {
    Schema::from_file(fixture(name)).unwrap()
}

fn check(old: &str, new: &str, mode: CompatibilityMode) -> Report {
    check_compatibility(&load(old), &load(new), mode).unwrap()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_added_field_with_default_under_backward() {
    let report = check("order_v1.avsc", "order_v2_region.avsc", CompatibilityMode::Backward);

    assert!(report.compatible);
    assert!(report.errors.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].subject.name(), "region");
    assert_eq!(report.warnings[0].rule, Rule::FieldAddedWithDefault);
}

#[test]
fn test_removed_required_field_under_forward() {
    let report = check("order_v1.avsc", "order_v2_no_amount.avsc", CompatibilityMode::Forward);

    assert!(!report.compatible);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].subject.name(), "amount");
    assert_eq!(report.errors[0].rule, Rule::FieldRemovedWithoutDefault);
}

#[test]
fn test_namespace_change_is_warning_only() {
    let report = check("order_v1.avsc", "order_v2_namespace.avsc", CompatibilityMode::Backward);

    assert!(report.compatible);
    assert!(report.errors.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].rule, Rule::NamespaceChanged);
    assert_eq!(report.warnings[0].subject.name(), "namespace");
}

#[test]
fn test_kind_change_incompatible_under_every_mode() {
    for mode in CompatibilityMode::ALL {
        let report = check("order_v1.avsc", "order_enum.avsc", mode);
        assert!(!report.compatible, "{}", mode);
        assert_eq!(report.errors[0].rule, Rule::KindChanged, "{}", mode);
    }
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_self_comparison_is_clean() {
    let fixtures = [
        "order_v1.avsc",
        "order_v2_region.avsc",
        "order_v2_namespace.avsc",
        "order_enum.avsc",
        "order_v2_retyped.avsc",
    ];

    for name in fixtures {
        let schema = load(name);
        for mode in CompatibilityMode::ALL {
            let report = check_compatibility(&schema, &schema, mode).unwrap();
            assert!(report.compatible, "{} under {}", name, mode);
            assert!(report.errors.is_empty());
            assert!(report.warnings.is_empty());
        }
    }
}

#[test]
fn test_added_without_default_needs_backward_guarantee() {
    for mode in CompatibilityMode::ALL {
        let report = check("order_v1.avsc", "order_v2_currency.avsc", mode);
        let expect_error = matches!(
            mode,
            CompatibilityMode::Backward
                | CompatibilityMode::BackwardTransitive
                | CompatibilityMode::Full
                | CompatibilityMode::FullTransitive
        );

        assert_eq!(report.compatible, !expect_error, "{}", mode);
        assert_eq!(report.has_error_for("currency"), expect_error, "{}", mode);
    }
}

#[test]
fn test_removed_without_default_needs_forward_guarantee() {
    for mode in CompatibilityMode::ALL {
        let report = check("order_v1.avsc", "order_v2_no_amount.avsc", mode);
        let expect_error = matches!(
            mode,
            CompatibilityMode::Forward
                | CompatibilityMode::ForwardTransitive
                | CompatibilityMode::Full
                | CompatibilityMode::FullTransitive
        );

        assert_eq!(report.compatible, !expect_error, "{}", mode);
        assert_eq!(report.has_error_for("amount"), expect_error, "{}", mode);
    }
}

#[test]
fn test_modified_fields_fail_every_mode() {
    for mode in CompatibilityMode::ALL {
        let report = check("order_v1.avsc", "order_v2_retyped.avsc", mode);
        assert!(!report.compatible, "{}", mode);
        assert!(report.has_error_for("id"));
        assert!(report.has_error_for("amount"));
        assert!(report.errors.iter().all(|f| f.rule == Rule::FieldModified));
    }
}

#[test]
fn test_diff_listing() {
    let diff = SchemaDiff::between(&load("order_v1.avsc"), &load("order_v2_retyped.avsc")).unwrap();

    assert!(diff.metadata.is_empty());
    assert_eq!(diff.fields.modified_names(), vec!["id", "amount"]);
    assert_eq!(diff.fields.modified[0].changed_attributes(), vec!["type"]);
    assert_eq!(diff.fields.modified[1].changed_attributes(), vec!["order"]);
}

#[test]
fn test_report_serializes_for_pipelines() {
    let report = check("order_v1.avsc", "order_v2_no_amount.avsc", CompatibilityMode::Full);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["compatible"], false);
    assert_eq!(json["errors"][0]["subject"]["scope"], "field");
    assert_eq!(json["errors"][0]["subject"]["name"], "amount");
    assert_eq!(json["errors"][0]["rule"], "field_removed_without_default");
}

// =============================================================================
// Malformed input
// =============================================================================

#[test]
fn test_duplicate_fields_abort_before_diff() {
    let err = Schema::from_file(fixture("duplicate_fields.avsc")).unwrap_err();
    match err {
        CompatError::MalformedSchema(reason) => {
            assert!(reason.contains("duplicate_fields.avsc"));
            assert!(reason.contains("duplicate field 'id'"));
        }
        other => panic!("Expected MalformedSchema, got {:?}", other),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let err = Schema::from_file(fixture("does_not_exist.avsc")).unwrap_err();
    assert!(matches!(err, CompatError::Io(_)));
}

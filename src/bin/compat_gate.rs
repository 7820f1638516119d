//! Compatibility Gate CLI
//!
//! Checks an AVRO schema change against the compatibility mode of a
//! registry subject, for use as a deployment pipeline gate.
//!
//! Usage:
//!   compat-gate check old.avsc new.avsc --subject orders-value
//!   compat-gate check old.avsc new.avsc --mode FORWARD --format json
//!   compat-gate diff old.avsc new.avsc
//!
//! Exit codes: 0 compatible, 1 incompatible, 2 fatal error.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use avro_compat_gate::diff::{FieldChange, MetadataDiff};
use avro_compat_gate::registry::{self, FixedMode, ModeSource};
use avro_compat_gate::schema::Field;
use avro_compat_gate::{
    CompatibilityChecker, CompatibilityMode, FieldDiff, GateConfig, OutputFormat, Report, Schema,
    SchemaDiff,
};

const EXIT_INCOMPATIBLE: u8 = 1;
const EXIT_FATAL: u8 = 2;

#[derive(Parser)]
#[command(name = "compat-gate")]
#[command(about = "Gate AVRO schema changes on registry compatibility rules")]
struct Cli {
    /// Configuration file (in addition to the default locations)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a schema change against a compatibility mode
    Check {
        /// Currently registered schema (.avsc)
        old: PathBuf,
        /// Proposed schema (.avsc)
        new: PathBuf,
        /// Use this mode instead of asking the registry
        #[arg(short, long)]
        mode: Option<String>,
        /// Registry subject (default from configuration)
        #[arg(short, long)]
        subject: Option<String>,
        /// Registry base URL (default from configuration)
        #[arg(short, long)]
        registry: Option<String>,
        /// Output format (text, json)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// List field and metadata differences without a verdict
    Diff {
        old: PathBuf,
        new: PathBuf,
        /// Output format (text, json)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = GateConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Check {
            old,
            new,
            mode,
            subject,
            registry: registry_url,
            format,
        } => {
            if let Some(subject) = subject {
                config.registry.subject = subject;
            }
            if let Some(url) = registry_url {
                config.registry.url = url;
            }
            let format = output_format(format.as_deref(), &config)?;

            // Parse both schemas before touching the registry
            let old = load_schema(&old)?;
            let new = load_schema(&new)?;

            let source: Box<dyn ModeSource> = match mode {
                Some(raw) => Box::new(FixedMode(raw.parse()?)),
                None => registry::from_config(&config.registry),
            };
            let mode = source.resolve(&config.registry.subject)?;

            let report = CompatibilityChecker::new(mode).check(&old, &new)?;
            match format {
                OutputFormat::Json => {
                    let output = CheckOutput {
                        subject: &config.registry.subject,
                        old: old.full_name(),
                        new: new.full_name(),
                        mode,
                        report: &report,
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Text => print_check_report(&old, &new, mode, &report),
            }

            Ok(if report.compatible {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_INCOMPATIBLE)
            })
        }

        Commands::Diff { old, new, format } => {
            let format = output_format(format.as_deref(), &config)?;
            let old = load_schema(&old)?;
            let new = load_schema(&new)?;
            let diff = SchemaDiff::between(&old, &new)?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&diff)?),
                OutputFormat::Text => print_diff(&diff),
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[derive(Serialize)]
struct CheckOutput<'a> {
    subject: &'a str,
    old: String,
    new: String,
    mode: CompatibilityMode,
    report: &'a Report,
}

fn load_schema(path: &Path) -> anyhow::Result<Schema> {
    Schema::from_file(path).with_context(|| format!("loading schema {}", path.display()))
}

fn output_format(flag: Option<&str>, config: &GateConfig) -> anyhow::Result<OutputFormat> {
    match flag {
        None => Ok(config.report.output_format),
        Some("text") => Ok(OutputFormat::Text),
        Some("json") => Ok(OutputFormat::Json),
        Some(other) => anyhow::bail!("unknown output format '{}' (expected text or json)", other),
    }
}

/// Print human-readable check report
fn print_check_report(old: &Schema, new: &Schema, mode: CompatibilityMode, report: &Report) {
    println!("🔍 Checking compatibility: {} -> {}", old.full_name(), new.full_name());
    println!("   Configured mode: {}\n", mode);

    if !report.errors.is_empty() {
        println!("🔴 ERRORS ({}):", report.errors.len());
        for finding in &report.errors {
            println!("   ❌ {}", finding);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("🟡 WARNINGS ({}):", report.warnings.len());
        for finding in &report.warnings {
            println!("   ⚠️  {}", finding);
        }
        println!();
    }

    if report.compatible {
        println!("✅ Compatible under {}", mode);
    } else {
        println!("❌ Incompatible under {}", mode);
    }
}

/// Print the field and metadata listing
fn print_diff(diff: &SchemaDiff) {
    println!("═══════════════════════════════════════════════════════════════════");
    println!("                        SCHEMA CHANGES                             ");
    println!("═══════════════════════════════════════════════════════════════════\n");

    print_metadata(&diff.metadata);
    print_fields(&diff.fields);

    println!("📊 SUMMARY:");
    println!("   Added:     {}", diff.fields.added_count());
    println!("   Removed:   {}", diff.fields.removed_count());
    println!("   Modified:  {}", diff.fields.modified.len());
    println!("   Metadata:  {}", diff.metadata.len());
    println!("\n   Total field changes: {}", diff.fields.change_count());
}

fn print_metadata(metadata: &MetadataDiff) {
    if metadata.is_empty() {
        return;
    }
    println!("📝 METADATA ({}):", metadata.len());
    for change in metadata.iter() {
        println!(
            "   ~ {}: {} → {}",
            change.attr,
            change.old.as_deref().unwrap_or("<absent>"),
            change.new.as_deref().unwrap_or("<absent>")
        );
    }
    println!();
}

fn print_fields(fields: &FieldDiff) {
    let added: Vec<&Field> = fields
        .added_with_default
        .iter()
        .chain(&fields.added_without_default)
        .collect();
    if !added.is_empty() {
        println!("📗 ADDED FIELDS ({}):", added.len());
        for field in added {
            println!("   + {} ({}){}", field.name, field.type_name(), default_note(field));
        }
        println!();
    }

    let removed: Vec<&Field> = fields
        .removed_with_default
        .iter()
        .chain(&fields.removed_without_default)
        .collect();
    if !removed.is_empty() {
        println!("📕 REMOVED FIELDS ({}):", removed.len());
        for field in removed {
            println!("   - {} ({}){}", field.name, field.type_name(), default_note(field));
        }
        println!();
    }

    if !fields.modified.is_empty() {
        println!("🟠 MODIFIED FIELDS ({}):", fields.modified.len());
        for change in &fields.modified {
            print_modified(change);
        }
        println!();
    }
}

fn print_modified(change: &FieldChange) {
    println!(
        "   ~ {}: {} → {} [{}]",
        change.name,
        change.old.type_name(),
        change.new.type_name(),
        change.changed_attributes().join(", ")
    );
}

fn default_note(field: &Field) -> String {
    match &field.default {
        Some(value) => format!(" (default: {})", value),
        None => " (no default)".to_string(),
    }
}

use std::path::PathBuf;

use clap::Parser;
use reqdoc::{storage::Project, ValidationReport};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Default, Parser)]
#[command(about = "Check the requirement table against the document structure")]
pub struct Validate {
    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Print only errors, to stderr, whatever the output format
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    Summary,
}

impl Validate {
    pub const fn is_quiet(&self) -> bool {
        self.quiet
    }

    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let project = Project::load(root)?;
        let report = project.validate();

        if self.quiet {
            Self::output_errors(&report);
        } else {
            match self.output {
                OutputFormat::Table => Self::output_table(&project, &report),
                OutputFormat::Json => Self::output_json(&project, &report)?,
                OutputFormat::Summary => Self::output_summary(&project, &report),
            }
        }

        if !report.is_valid() {
            std::process::exit(2);
        }

        Ok(())
    }

    fn output_errors(report: &ValidationReport) {
        for error in &report.errors {
            eprintln!("{}", format!("✗ {error}").error());
        }
    }

    fn output_table(project: &Project, report: &ValidationReport) {
        let catalog = project.catalog();
        println!("Validating requirements...\n");

        let structure_warnings = catalog.structure_warnings();
        if structure_warnings.is_empty() {
            println!(
                "✓ Structure:    {} parts and sections",
                catalog.structure().len()
            );
        } else {
            println!(
                "{}",
                format!("! Structure:    {} warnings", structure_warnings.len()).warning()
            );
        }

        let skipped = catalog.skipped();
        if skipped.is_empty() {
            println!(
                "✓ Binding:      {} requirements bound",
                catalog.requirements().len()
            );
        } else {
            println!(
                "{}",
                format!(
                    "! Binding:      {} requirements bound, {} rows skipped",
                    catalog.requirements().len(),
                    skipped.len()
                )
                .warning()
            );
        }

        if report.is_valid() {
            println!("✓ Consistency:  No errors");
        } else {
            println!(
                "{}",
                format!("✗ Consistency:  {} errors", report.errors.len()).error()
            );
        }

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for error in &report.errors {
                println!("  • {}", error.to_string().error());
            }
        }

        let warnings: Vec<String> = structure_warnings
            .iter()
            .map(ToString::to_string)
            .chain(skipped.iter().map(ToString::to_string))
            .chain(report.warnings.iter().map(ToString::to_string))
            .collect();
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for warning in &warnings {
                println!("  • {}", warning.warning());
            }
        }

        if report.is_valid() {
            println!(
                "\n{}",
                format!("Requirements are consistent ({} warnings)", warnings.len()).success()
            );
        } else {
            println!(
                "\n{}",
                format!(
                    "Summary: {} errors, {} warnings",
                    report.errors.len(),
                    warnings.len()
                )
                .error()
            );
            println!(
                "{}",
                "Fix the errors above before running 'reqdoc build'".dim()
            );
        }
    }

    fn output_json(project: &Project, report: &ValidationReport) -> anyhow::Result<()> {
        use serde_json::json;

        let catalog = project.catalog();
        let skipped: Vec<_> = catalog
            .skipped()
            .iter()
            .map(|skip| {
                json!({
                    "row": skip.row,
                    "reason": skip.reason.to_string(),
                })
            })
            .collect();

        let output = json!({
            "status": if report.is_valid() { "valid" } else { "invalid" },
            "structure_warnings": catalog
                .structure_warnings()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            "skipped": skipped,
            "errors": report.errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "warnings": report.warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "summary": {
                "requirements": catalog.requirements().len(),
                "errors": report.errors.len(),
                "warnings": report.warnings.len() + project.load_warnings(),
            }
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_summary(project: &Project, report: &ValidationReport) {
        println!(
            "errors={} warnings={}",
            report.errors.len(),
            report.warnings.len() + project.load_warnings()
        );
    }
}

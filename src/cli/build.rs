use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use reqdoc::{
    storage::{self, BuildError, Changelog, Format, Project},
    ValidationReport,
};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Validate the requirements, then write the AsciiDoc document")]
#[allow(clippy::struct_excessive_bools)]
pub struct Build {
    /// Directory to write the document to (overrides `output_dir`)
    #[arg(long, short, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Prepend a changelog built from git tags
    #[arg(long)]
    changelog: bool,

    /// Also compile a PDF with asciidoctor-pdf
    #[arg(long)]
    pdf: bool,

    /// Also compile HTML with asciidoctor
    #[arg(long)]
    html: bool,

    /// Do not copy the assets directory next to the document
    #[arg(long)]
    no_assets: bool,
}

impl Build {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let project = Project::load(root)?;
        let config = project.config();

        let changelog = if self.changelog || config.changelog {
            Changelog::from_git(project.root())
        } else {
            Changelog::default()
        };

        let built = match project.build(&changelog, self.output_dir.as_deref()) {
            Ok(built) => built,
            Err(BuildError::Invalid(report)) => {
                print_report(&report);
                anyhow::bail!(
                    "Validation failed with {} errors; no document was written",
                    report.errors.len()
                );
            }
            Err(error) => return Err(error.into()),
        };
        print_report(&built.report);
        println!("✓ Wrote {}", built.document.display());

        // attachment paths are relative to the project root, so assets must
        // keep their relative location next to the document
        let assets = project.root().join(&config.assets_dir);
        if !self.no_assets && config.assets_dir.is_relative() && assets.is_dir() {
            let output_dir = built.document.parent().unwrap_or(project.root());
            let copied = storage::copy_assets(&assets, &output_dir.join(&config.assets_dir))
                .with_context(|| format!("Failed to copy {}", assets.display()))?;
            println!("✓ Copied {copied} assets");
        }

        let formats = [(self.pdf, Format::Pdf), (self.html, Format::Html)];
        for (_, format) in formats.into_iter().filter(|(enabled, _)| *enabled) {
            let artifact = storage::compile(&built.document, format)?;
            println!("✓ Wrote {}", artifact.display());
        }

        println!("\n{}", "Build complete".success());
        Ok(())
    }
}

fn print_report(report: &ValidationReport) {
    for warning in &report.warnings {
        eprintln!("{}", format!("! {warning}").warning());
    }
    for error in &report.errors {
        eprintln!("{}", format!("✗ {error}").error());
    }
}

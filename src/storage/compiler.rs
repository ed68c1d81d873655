//! Invocation of the external `AsciiDoc` toolchain.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

/// An output format produced by the `AsciiDoc` toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `asciidoctor-pdf`.
    Pdf,
    /// `asciidoctor`.
    Html,
}

impl Format {
    /// The executable for this format.
    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Pdf => "asciidoctor-pdf",
            Self::Html => "asciidoctor",
        }
    }

    /// Path of the artifact produced from `document`.
    #[must_use]
    pub fn artifact(self, document: &Path) -> PathBuf {
        match self {
            Self::Pdf => document.with_extension("pdf"),
            Self::Html => document.with_extension("html"),
        }
    }
}

/// Errors that can occur when compiling a document.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The compiler could not be started.
    #[error("failed to run {program}; is it installed?")]
    Spawn {
        /// The executable.
        program: &'static str,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The compiler ran but reported failure.
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        /// The executable.
        program: &'static str,
        /// The exit status, as reported by the OS.
        status: String,
        /// Captured standard error.
        stderr: String,
    },
}

/// Compiles `document` into `format`, returning the artifact path.
///
/// Diagrams are rendered through `asciidoctor-diagram`, and remote images are
/// allowed.
///
/// # Errors
///
/// Returns an error if the compiler cannot be started or exits unsuccessfully.
pub fn compile(document: &Path, format: Format) -> Result<PathBuf, CompileError> {
    let program = format.program();
    tracing::info!("Compiling {} with {program}", document.display());

    let output = Command::new(program)
        .args(["-r", "asciidoctor-diagram", "-a", "allow-uri-read"])
        .arg(document)
        .output()
        .map_err(|source| CompileError::Spawn { program, source })?;

    if !output.status.success() {
        return Err(CompileError::Failed {
            program,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(format.artifact(document))
}

//! A project directory on disk.
//!
//! A [`Project`] is a root directory holding an optional `reqdoc.toml`, the
//! structure table and the requirement table. Building a project validates
//! it first and writes nothing unless validation passes.

use std::{
    io,
    path::{Path, PathBuf},
};

use crate::{
    domain::{Catalog, Config, ConfigError},
    render::{Document, RenderError},
    storage::{read_requirements, read_structure, Changelog, LocalFiles, TableError},
    ValidationReport,
};

/// Errors that can occur when loading a [`Project`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// `reqdoc.toml` exists but is unusable.
    #[error("failed to load {}", Config::FILE_NAME)]
    Config(#[from] ConfigError),

    /// The structure table could not be read.
    #[error("failed to load the structure table")]
    Structure(#[source] TableError),

    /// The requirement table could not be read.
    #[error("failed to load the requirement table")]
    Requirements(#[source] TableError),
}

/// Errors that can occur when building a [`Project`].
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Validation reported errors, so no document was written.
    #[error("validation failed with {} errors; no document was written", .0.errors.len())]
    Invalid(ValidationReport),

    /// The document could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The document could not be written.
    #[error("failed to write {path}")]
    Write {
        /// The file or directory being written.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
}

/// The outcome of a successful build.
#[derive(Debug)]
pub struct Built {
    /// Path of the written `AsciiDoc` document.
    pub document: PathBuf,
    /// The validation report; it holds warnings only.
    pub report: ValidationReport,
}

/// A project root with its configuration and loaded tables.
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    config: Config,
    catalog: Catalog,
}

impl Project {
    /// Loads the configuration and both tables found under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or either table cannot be read.
    /// Rows that cannot be bound are not errors; they are kept on the
    /// [`Catalog`].
    pub fn load(root: PathBuf) -> Result<Self, LoadError> {
        let config = Config::load_or_default(&root)?;

        let structure_rows =
            read_structure(&root.join(&config.structure)).map_err(LoadError::Structure)?;
        let requirement_rows =
            read_requirements(&root.join(&config.requirements)).map_err(LoadError::Requirements)?;

        let catalog = Catalog::from_rows(structure_rows, requirement_rows);

        Ok(Self {
            root,
            config,
            catalog,
        })
    }

    /// The project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The structure and its bound requirements.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Number of load-time and bind-time warnings.
    #[must_use]
    pub fn load_warnings(&self) -> usize {
        self.catalog.structure_warnings().len() + self.catalog.skipped().len()
    }

    /// Validates the requirements, resolving attachments against the root.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        self.catalog.validate(
            LocalFiles::new(self.root.clone()),
            self.config.max_nesting_depth,
        )
    }

    /// Validates, renders and writes the document.
    ///
    /// The document is written to `output_dir` when given, otherwise to the
    /// configured output path under the project root.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Invalid`] without touching the filesystem if
    /// validation reports any error. Rendering and write failures are
    /// returned as they occur.
    pub fn build(
        &self,
        changelog: &Changelog,
        output_dir: Option<&Path>,
    ) -> Result<Built, BuildError> {
        let report = self.validate();
        if !report.is_valid() {
            return Err(BuildError::Invalid(report));
        }

        let content = Document::new(&self.catalog, &self.config.title)
            .with_changelog(changelog)
            .render()?;

        let document = output_dir.map_or_else(
            || self.root.join(self.config.output_path()),
            |dir| dir.join(&self.config.output_file),
        );
        if let Some(parent) = document.parent() {
            std::fs::create_dir_all(parent).map_err(|source| BuildError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&document, content).map_err(|source| BuildError::Write {
            path: document.clone(),
            source,
        })?;

        tracing::info!("Wrote {}", document.display());
        Ok(Built { document, report })
    }
}

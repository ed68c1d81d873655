use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::validator::DEFAULT_MAX_NESTING_DEPTH;

/// Configuration for building a requirements document.
///
/// Every path is relative to the project root unless it is absolute.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Versions")]
pub struct Config {
    /// Title of the generated document.
    pub title: String,

    /// The structure table (Parts and Sections).
    pub structure: PathBuf,

    /// The requirement table.
    pub requirements: PathBuf,

    /// Directory the document is written to.
    pub output_dir: PathBuf,

    /// File name of the generated `AsciiDoc` document.
    pub output_file: String,

    /// Directory of attachments, copied next to the document on build.
    pub assets_dir: PathBuf,

    /// Number of id segments above which a nesting warning is raised.
    pub max_nesting_depth: usize,

    /// Whether to prepend a changelog built from git tags.
    pub changelog: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: default_title(),
            structure: default_structure(),
            requirements: default_requirements(),
            output_dir: default_output_dir(),
            output_file: default_output_file(),
            assets_dir: default_assets_dir(),
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            changelog: false,
        }
    }
}

/// Errors that can occur when loading a [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to access config file {path}")]
    Io {
        /// The config file.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The file is not a valid configuration.
    #[error("failed to parse config file {path}")]
    Parse {
        /// The config file.
        path: PathBuf,
        /// The underlying error.
        source: Box<toml::de::Error>,
    },
}

impl Config {
    /// Name of the config file at the project root.
    pub const FILE_NAME: &'static str = "reqdoc.toml";

    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source: Box::new(source),
        })
    }

    /// Loads `reqdoc.toml` from `root`, falling back to defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(Self::FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            tracing::debug!("No {} in {}, using defaults", Self::FILE_NAME, root.display());
            Ok(Self::default())
        }
    }

    /// Path of the generated document.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }
}

fn default_title() -> String {
    "Project Specifications".to_string()
}

fn default_structure() -> PathBuf {
    PathBuf::from("structure.csv")
}

fn default_requirements() -> PathBuf {
    PathBuf::from("requirements.csv")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_output_file() -> String {
    "specs.adoc".to_string()
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

const fn default_max_nesting_depth() -> usize {
    DEFAULT_MAX_NESTING_DEPTH
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_title")]
        title: String,

        #[serde(default = "default_structure")]
        structure: PathBuf,

        #[serde(default = "default_requirements")]
        requirements: PathBuf,

        #[serde(default = "default_output_dir")]
        output_dir: PathBuf,

        #[serde(default = "default_output_file")]
        output_file: String,

        #[serde(default = "default_assets_dir")]
        assets_dir: PathBuf,

        #[serde(default = "default_max_nesting_depth")]
        max_nesting_depth: usize,

        #[serde(default)]
        changelog: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                title,
                structure,
                requirements,
                output_dir,
                output_file,
                assets_dir,
                max_nesting_depth,
                changelog,
            } => Self {
                title,
                structure,
                requirements,
                output_dir,
                output_file,
                assets_dir,
                max_nesting_depth,
                changelog,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\ntitle = \"Payments\"\nrequirements = \"data/reqs.csv\"\nmax_nesting_depth = 4\nchangelog = true\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.title, "Payments");
        assert_eq!(config.requirements, PathBuf::from("data/reqs.csv"));
        assert_eq!(config.structure, PathBuf::from("structure.csv"));
        assert_eq!(config.max_nesting_depth, 4);
        assert!(config.changelog);
    }

    #[test]
    fn version_tag_alone_gives_defaults() {
        let config: Config = toml::from_str("_version = \"1\"\n").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.output_path(), PathBuf::from("build/specs.adoc"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(tmp.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(matches!(error, ConfigError::Io { .. }));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nmax_nesting_depth = \"six\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::Parse { .. }));
    }
}

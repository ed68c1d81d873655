//! A changelog built from the git tags of the project.

use std::{fmt, path::Path, process::Command};

use chrono::NaiveDate;

/// The `git tag` format: version, creation date, and subject, `|` separated.
const TAG_FORMAT: &str = "--format=%(refname:short)|%(creatordate:short)|%(contents:subject)";

/// One released version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    /// Tag name, e.g. `v1.2.0`.
    pub version: String,
    /// Tag creation date.
    pub date: NaiveDate,
    /// First line of the tag message. May be empty for lightweight tags.
    pub subject: String,
}

/// Released versions, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changelog {
    entries: Vec<ChangelogEntry>,
}

impl Changelog {
    /// Reads the tags of the git repository containing `dir`.
    ///
    /// A missing `git` binary, a directory outside any repository, or a
    /// failing command all yield an empty changelog.
    #[must_use]
    pub fn from_git(dir: &Path) -> Self {
        let output = Command::new("git")
            .args(["tag", "-n1", "--sort=-creatordate", TAG_FORMAT])
            .current_dir(dir)
            .output();

        match output {
            Ok(output) if output.status.success() => {
                Self::parse(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                tracing::warn!(
                    "Failed to list git tags: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to run git: {e}");
                Self::default()
            }
        }
    }

    /// Parses `version|date|subject` lines. The subject may itself contain `|`.
    ///
    /// Blank lines, lines with fewer than three fields, and lines with an
    /// unparseable date are skipped.
    #[must_use]
    pub fn parse(listing: &str) -> Self {
        let entries = listing
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let mut fields = line.splitn(3, '|');
                let (Some(version), Some(date), Some(subject)) =
                    (fields.next(), fields.next(), fields.next())
                else {
                    tracing::debug!("Ignoring tag line without three fields: {line}");
                    return None;
                };
                let Ok(date) = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") else {
                    tracing::debug!("Ignoring tag line with unparseable date: {line}");
                    return None;
                };
                Some(ChangelogEntry {
                    version: version.trim().to_string(),
                    date,
                    subject: subject.trim().to_string(),
                })
            })
            .collect();

        Self { entries }
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ChangelogEntry> for Changelog {
    fn from_iter<T: IntoIterator<Item = ChangelogEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Renders the changelog as an `AsciiDoc` table. An empty changelog renders
/// nothing.
impl fmt::Display for Changelog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return Ok(());
        }

        writeln!(f, "[discrete]")?;
        writeln!(f, "== Changelog")?;
        writeln!(f)?;
        writeln!(f, "[cols=\"1,1,3\", options=\"header\"]")?;
        writeln!(f, "|===")?;
        writeln!(f, "| Version | Date | Description")?;
        for entry in &self.entries {
            writeln!(
                f,
                "| {} | {} | {}",
                entry.version,
                entry.date.format("%Y-%m-%d"),
                entry.subject
            )?;
        }
        writeln!(f, "|===")
    }
}

use std::{ffi::OsStr, path::Path};

use non_empty_string::NonEmptyString;
use serde::Deserialize;

/// One raw row of the requirement table.
///
/// Every cell is optional at this stage; the binder decides what is
/// mandatory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RequirementRow {
    /// Dotted requirement id, e.g. `G.1.3`.
    #[serde(default)]
    pub id: Option<String>,
    /// Requirement text.
    #[serde(default)]
    pub description: Option<String>,
    /// Free-form priority label.
    #[serde(default)]
    pub priority: Option<String>,
    /// Id of the parent requirement.
    #[serde(default)]
    pub parent: Option<String>,
    /// Comma separated ids of related requirements.
    #[serde(default, rename = "reference to", alias = "reference_to")]
    pub reference_to: Option<String>,
    /// Semicolon separated `path` or `path|caption` items.
    #[serde(default, rename = "attached files", alias = "attached_files")]
    pub attached_files: Option<String>,
}

impl RequirementRow {
    /// A row with just an id and a description.
    #[must_use]
    pub fn new(id: &str, description: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            description: Some(description.to_string()),
            ..Self::default()
        }
    }

    /// Sets the parent id.
    #[must_use]
    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }
}

/// A requirement bound to its Part and Section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Dotted requirement id, e.g. `G.1.3`. Also the document anchor.
    pub id: String,
    /// Title of the owning Part.
    pub part: String,
    /// Title of the owning Section.
    pub section: String,
    /// Id of the owning Section node, e.g. `G.1`.
    pub section_id: String,
    /// Requirement text.
    pub description: NonEmptyString,
    /// Free-form priority label.
    pub priority: Option<String>,
    /// Id of the parent requirement.
    pub parent: Option<String>,
    /// Ids of related requirements, rendered as cross references.
    pub references: Vec<String>,
    /// Files attached to the requirement.
    pub attachments: Vec<Attachment>,
}

/// Splits a comma separated `reference to` cell into ids.
#[must_use]
pub fn parse_references(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// A file attached to a requirement, with an optional caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Path of the attached file, relative to the project root.
    pub path: String,
    /// Caption shown with the attachment.
    pub caption: Option<String>,
}

impl Attachment {
    /// Parses a semicolon separated list of `path` or `path|caption` items.
    ///
    /// Empty items are ignored.
    #[must_use]
    pub fn parse_list(raw: &str) -> Vec<Self> {
        raw.split(';')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(Self::parse)
            .collect()
    }

    /// An item with nothing before the `|` keeps an empty path, which
    /// validation reports as missing.
    fn parse(item: &str) -> Self {
        let (path, caption) = item
            .split_once('|')
            .map_or((item, None), |(path, caption)| (path, Some(caption.trim())));
        Self {
            path: path.trim().to_string(),
            caption: caption
                .filter(|caption| !caption.is_empty())
                .map(str::to_string),
        }
    }

    /// How the attachment is rendered, chosen by file extension.
    #[must_use]
    pub fn kind(&self) -> AttachmentKind {
        let extension = Path::new(&self.path)
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("puml") => AttachmentKind::Diagram,
            Some("png" | "jpg" | "jpeg" | "svg" | "gif") => AttachmentKind::Image,
            _ => AttachmentKind::Link,
        }
    }
}

/// Rendering form of an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// A `PlantUML` source rendered through the diagram macro.
    Diagram,
    /// A raster or vector image.
    Image,
    /// Anything else, rendered as a plain link.
    Link,
}

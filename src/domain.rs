//! Domain models for structured requirement documents.
//!
//! This module contains the document structure (Parts and Sections), the
//! requirements bound against it, and the rules that keep the two
//! consistent.

pub mod binder;
pub mod catalog;
pub mod hierarchy;

/// Dotted identifier syntax.
pub mod id;

/// Requirement rows and bound requirements.
pub mod requirement;
pub use requirement::{Attachment, AttachmentKind, Requirement, RequirementRow};

pub mod structure;
pub use structure::{NodeKind, Structure, StructureNode, StructureRow, StructureWarning};

pub mod validator;
pub use validator::{FileSystem, ValidationError, ValidationReport, ValidationWarning, Validator};

mod config;
pub use binder::SkipReason;
pub use catalog::{Catalog, Skipped};
pub use config::{Config, ConfigError};
pub use hierarchy::{build_forest, HierarchyError, RequirementNode};
pub use id::{IdError, RequirementId};

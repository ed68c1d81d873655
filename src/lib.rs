//! Structured requirements documents.
//!
//! A document is declared by a structure table of Parts (`G`) and Sections
//! (`G.1`). Requirements from a requirement table are bound to the structure
//! by their dotted ids, validated for consistency, arranged into parent/child
//! forests, and rendered as a single `AsciiDoc` document.

pub mod domain;
pub use domain::{
    Catalog, Config, NodeKind, Requirement, RequirementRow, Structure, StructureNode,
    StructureRow, ValidationError, ValidationReport, ValidationWarning,
};

pub mod render;

/// Tables, files, and external tools.
pub mod storage;

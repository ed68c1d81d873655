//! Cross-checks between requirement ids, the declared structure, and the
//! filesystem.
//!
//! Validation never stops at the first problem. Every error and warning is
//! collected so that authors can fix a table in one pass.

use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use crate::domain::{
    id::{canonical_number, RequirementId},
    structure::Structure,
    Requirement,
};

/// The filesystem as seen by the validator.
pub trait FileSystem {
    /// Whether `path` resolves to an existing file.
    fn exists(&self, path: &Path) -> bool;
}

/// Default maximum number of id segments before a nesting warning.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 6;

/// A problem that makes the document unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The id does not match `<LETTERS>.<int>(.<int>)*`.
    #[error("Requirement {id}: ID format invalid. Must be <Letters>.<Section>.<ID> (e.g., G.1.1).")]
    Format {
        /// The offending id.
        id: String,
    },

    /// The letter prefix disagrees with the Part the requirement belongs to.
    #[error(
        "Requirement {id}: ID starts with '{actual}' but belongs to '{part}' (expected '{expected}')."
    )]
    PartMismatch {
        /// The offending id.
        id: String,
        /// The prefix found in the id.
        actual: String,
        /// Title of the declared Part.
        part: String,
        /// The declared Part id.
        expected: String,
    },

    /// The section number disagrees with the Section the requirement belongs to.
    #[error(
        "Requirement {id}: ID indicates section {actual} but belongs to section \"{section}\" (expected {expected})."
    )]
    SectionMismatch {
        /// The offending id.
        id: String,
        /// The section number found in the id.
        actual: String,
        /// Title of the declared Section.
        section: String,
        /// The declared Section number.
        expected: String,
    },

    /// The id is not nested below its parent's id.
    #[error(
        "Requirement {id}: ID inconsistent with parent {parent}. Child ID must start with Parent ID."
    )]
    ParentPrefix {
        /// The offending id.
        id: String,
        /// The declared parent id.
        parent: String,
    },

    /// The declared parent is not in the requirement set.
    #[error(
        "Requirement {id}: Parent requirement '{parent}' not found. Top-level requirements should have an empty parent field."
    )]
    ParentMissing {
        /// The offending id.
        id: String,
        /// The declared parent id.
        parent: String,
    },

    /// The id is used by more than one requirement, so its anchor is ambiguous.
    #[error("Requirement {id}: ID is used by {count} requirements. Anchors must be unique.")]
    DuplicateId {
        /// The duplicated id.
        id: String,
        /// How many requirements share the id.
        count: usize,
    },

    /// An attached file does not exist, or its path is empty.
    #[error("Requirement {id}: Attached file '{path}' not found.")]
    AttachmentMissing {
        /// The offending id.
        id: String,
        /// The missing path.
        path: String,
    },

    /// A required Part or Section has no requirements.
    #[error("Missing requirements for required section/part: {title} ({id})")]
    MissingRequired {
        /// The structure node id.
        id: String,
        /// The structure node title.
        title: String,
    },
}

/// An advisory finding; generation proceeds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationWarning {
    /// The id nests deeper than the configured limit.
    #[error("Requirement {id}: Nesting is very deep ({depth} levels). Consider refactoring.")]
    DeepNesting {
        /// The offending id.
        id: String,
        /// Number of id segments.
        depth: usize,
    },
}

/// The outcome of validating a requirement set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Hard failures, in input order followed by coverage failures.
    pub errors: Vec<ValidationError>,
    /// Advisory findings, in input order.
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// `true` if and only if there are no errors.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Lookups derived once from the structure for one validation run.
#[derive(Debug, Default)]
struct StructureIndex<'a> {
    /// Part title → Part id.
    part_ids: HashMap<&'a str, &'a str>,
    /// Part title → (normalised Section title → Section number without
    /// leading zeros).
    section_numbers: HashMap<&'a str, HashMap<String, &'a str>>,
}

impl<'a> StructureIndex<'a> {
    fn new(structure: &'a Structure) -> Self {
        let mut index = Self::default();
        for part in structure.parts() {
            index
                .part_ids
                .entry(part.title.as_str())
                .or_insert(part.id.as_str());

            let sections = index.section_numbers.entry(part.title.as_str()).or_default();
            for section in structure.descendants(part) {
                let number = section
                    .id
                    .split('.')
                    .nth(1)
                    .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
                    .map(canonical_number);
                if let Some(number) = number {
                    sections.entry(normalise(&section.title)).or_insert(number);
                }
            }
        }
        index
    }
}

fn normalise(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Validates bound requirements against a [`Structure`].
#[derive(Debug)]
pub struct Validator<'a, F> {
    structure: &'a Structure,
    files: F,
    max_nesting_depth: usize,
}

impl<'a, F: FileSystem> Validator<'a, F> {
    /// Creates a validator that resolves attachments through `files`.
    #[must_use]
    pub const fn new(structure: &'a Structure, files: F) -> Self {
        Self {
            structure,
            files,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    /// Sets the number of id segments above which a warning is emitted.
    #[must_use]
    pub const fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Runs every check and collects all findings.
    #[must_use]
    pub fn validate(&self, requirements: &[Requirement]) -> ValidationReport {
        let mut report = ValidationReport::default();
        let index = StructureIndex::new(self.structure);

        let mut occurrences: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, requirement) in requirements.iter().enumerate() {
            occurrences.entry(requirement.id.as_str()).or_default().push(i);
        }

        for (i, requirement) in requirements.iter().enumerate() {
            if let Some(parsed) = Self::check_id(requirement, &index, &mut report) {
                self.check_depth(requirement, &parsed, &mut report);
            }
            Self::check_parent_exists(i, requirement, &occurrences, &mut report);
            Self::check_unique(i, requirement, &occurrences, &mut report);
            self.check_attachments(requirement, &mut report);
        }

        self.check_coverage(requirements, &mut report);

        tracing::debug!(
            "Validated {} requirements: {} errors, {} warnings",
            requirements.len(),
            report.errors.len(),
            report.warnings.len()
        );
        report
    }

    /// Syntax first, then agreement with the Part, the Section and the parent.
    ///
    /// Returns the parsed id when the syntax is valid.
    fn check_id(
        requirement: &Requirement,
        index: &StructureIndex,
        report: &mut ValidationReport,
    ) -> Option<RequirementId> {
        let id = &requirement.id;
        let Ok(parsed) = id.parse::<RequirementId>() else {
            report.errors.push(ValidationError::Format { id: id.clone() });
            return None;
        };

        if let Some(&expected) = index.part_ids.get(requirement.part.as_str()) {
            if parsed.part() != expected {
                report.errors.push(ValidationError::PartMismatch {
                    id: id.clone(),
                    actual: parsed.part().to_string(),
                    part: requirement.part.clone(),
                    expected: expected.to_string(),
                });
            }
        }

        let expected_section = index
            .section_numbers
            .get(requirement.part.as_str())
            .and_then(|sections| sections.get(&normalise(&requirement.section)));
        if let Some(&expected) = expected_section {
            if parsed.section() != expected {
                report.errors.push(ValidationError::SectionMismatch {
                    id: id.clone(),
                    actual: parsed.section().to_string(),
                    section: requirement.section.clone(),
                    expected: expected.to_string(),
                });
            }
        }

        if let Some(parent) = &requirement.parent {
            if !id.starts_with(&format!("{parent}.")) {
                report.errors.push(ValidationError::ParentPrefix {
                    id: id.clone(),
                    parent: parent.clone(),
                });
            }
        }

        Some(parsed)
    }

    fn check_depth(
        &self,
        requirement: &Requirement,
        parsed: &RequirementId,
        report: &mut ValidationReport,
    ) {
        let depth = parsed.depth();
        if depth > self.max_nesting_depth {
            report.warnings.push(ValidationWarning::DeepNesting {
                id: requirement.id.clone(),
                depth,
            });
        }
    }

    /// The parent must be some *other* requirement in the full set.
    fn check_parent_exists(
        position: usize,
        requirement: &Requirement,
        occurrences: &HashMap<&str, Vec<usize>>,
        report: &mut ValidationReport,
    ) {
        let Some(parent) = &requirement.parent else {
            return;
        };
        let found = occurrences
            .get(parent.as_str())
            .is_some_and(|positions| positions.iter().any(|&p| p != position));
        if !found {
            report.errors.push(ValidationError::ParentMissing {
                id: requirement.id.clone(),
                parent: parent.clone(),
            });
        }
    }

    /// Reported once per duplicated id, at its second occurrence.
    fn check_unique(
        position: usize,
        requirement: &Requirement,
        occurrences: &HashMap<&str, Vec<usize>>,
        report: &mut ValidationReport,
    ) {
        let Some(positions) = occurrences.get(requirement.id.as_str()) else {
            return;
        };
        if positions.len() > 1 && positions[1] == position {
            report.errors.push(ValidationError::DuplicateId {
                id: requirement.id.clone(),
                count: positions.len(),
            });
        }
    }

    fn check_attachments(&self, requirement: &Requirement, report: &mut ValidationReport) {
        for attachment in &requirement.attachments {
            if attachment.path.is_empty() || !self.files.exists(Path::new(&attachment.path)) {
                report.errors.push(ValidationError::AttachmentMissing {
                    id: requirement.id.clone(),
                    path: attachment.path.clone(),
                });
            }
        }
    }

    /// Every required node must be covered by a requirement id's Part or
    /// two-segment Section prefix.
    fn check_coverage(&self, requirements: &[Requirement], report: &mut ValidationReport) {
        let mut covered: HashSet<String> = HashSet::new();
        for requirement in requirements {
            let segments: Vec<&str> = requirement.id.split('.').collect();
            covered.insert(segments[0].to_string());
            if segments.len() >= 2 {
                covered.insert(segments[..2].join("."));
            }
        }

        for node in self.structure.walk() {
            if node.required && !covered.contains(&node.id) {
                report.errors.push(ValidationError::MissingRequired {
                    id: node.id.clone(),
                    title: node.title.clone(),
                });
            }
        }
    }
}

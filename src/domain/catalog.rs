//! A structure table and the requirements bound against it.

use std::{collections::HashMap, fmt};

use crate::domain::{
    binder::{bind, SkipReason},
    requirement::RequirementRow,
    structure::{Structure, StructureRow, StructureWarning},
    validator::{FileSystem, ValidationReport, Validator},
    Requirement,
};

/// A requirement row that could not be bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    /// 1-based data row number in the requirement table.
    pub row: usize,
    /// Why the row was skipped.
    pub reason: SkipReason,
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Skipping requirement row {}: {}", self.row, self.reason)
    }
}

/// The loaded structure plus every bound requirement, in input order.
///
/// Load-time problems never abort loading. They are kept here so that
/// callers can surface each of them.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    structure: Structure,
    requirements: Vec<Requirement>,
    structure_warnings: Vec<StructureWarning>,
    skipped: Vec<Skipped>,
}

impl Catalog {
    /// Loads the structure, then binds each requirement row against it.
    #[must_use]
    pub fn from_rows(
        structure_rows: impl IntoIterator<Item = StructureRow>,
        requirement_rows: impl IntoIterator<Item = RequirementRow>,
    ) -> Self {
        let (structure, structure_warnings) = Structure::from_rows(structure_rows);
        for warning in &structure_warnings {
            tracing::warn!("{warning}");
        }

        let mut requirements = Vec::new();
        let mut skipped = Vec::new();
        for (i, row) in requirement_rows.into_iter().enumerate() {
            match bind(row, &structure) {
                Ok(requirement) => requirements.push(requirement),
                Err(reason) => {
                    let skip = Skipped { row: i + 1, reason };
                    tracing::warn!("{skip}");
                    skipped.push(skip);
                }
            }
        }

        tracing::info!(
            "Bound {} requirements against {} structure nodes ({} skipped)",
            requirements.len(),
            structure.len(),
            skipped.len()
        );

        Self {
            structure,
            requirements,
            structure_warnings,
            skipped,
        }
    }

    /// The declared structure.
    #[must_use]
    pub const fn structure(&self) -> &Structure {
        &self.structure
    }

    /// Bound requirements, in input order.
    #[must_use]
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Problems found while loading the structure table.
    #[must_use]
    pub fn structure_warnings(&self) -> &[StructureWarning] {
        &self.structure_warnings
    }

    /// Requirement rows that could not be bound.
    #[must_use]
    pub fn skipped(&self) -> &[Skipped] {
        &self.skipped
    }

    /// Requirements grouped by Section id, each group in input order.
    #[must_use]
    pub fn by_section(&self) -> HashMap<&str, Vec<&Requirement>> {
        let mut groups: HashMap<&str, Vec<&Requirement>> = HashMap::new();
        for requirement in &self.requirements {
            groups
                .entry(requirement.section_id.as_str())
                .or_default()
                .push(requirement);
        }
        groups
    }

    /// Validates every bound requirement.
    #[must_use]
    pub fn validate<F: FileSystem>(&self, files: F, max_nesting_depth: usize) -> ValidationReport {
        Validator::new(&self.structure, files)
            .with_max_nesting_depth(max_nesting_depth)
            .validate(&self.requirements)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    struct NoFiles;

    impl FileSystem for NoFiles {
        fn exists(&self, _path: &Path) -> bool {
            false
        }
    }

    fn structure_rows() -> Vec<StructureRow> {
        vec![
            StructureRow::part("G", "Goals"),
            StructureRow::section("G.1", "Context").required(),
        ]
    }

    #[test]
    fn binds_and_validates() {
        let catalog = Catalog::from_rows(structure_rows(), vec![RequirementRow::new("G.1.1", "x")]);
        assert_eq!(catalog.requirements().len(), 1);
        assert_eq!(catalog.requirements()[0].part, "Goals");
        assert_eq!(catalog.requirements()[0].section, "Context");
        assert!(catalog.validate(NoFiles, 6).is_valid());
    }

    #[test]
    fn empty_requirement_table_fails_required_section() {
        let catalog = Catalog::from_rows(structure_rows(), Vec::new());
        let report = catalog.validate(NoFiles, 6);
        assert!(!report.is_valid());
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].to_string().contains("G.1"));
    }

    #[test]
    fn unresolvable_rows_are_kept_as_skips() {
        let catalog = Catalog::from_rows(
            structure_rows(),
            vec![
                RequirementRow::new("G.2.1", "x"),
                RequirementRow::new("G.1.1", "y"),
            ],
        );
        assert_eq!(catalog.requirements().len(), 1);
        assert_eq!(
            catalog.skipped(),
            &[Skipped {
                row: 1,
                reason: SkipReason::UnknownSection {
                    id: "G.2.1".to_string(),
                    section: "G.2".to_string(),
                },
            }]
        );
        assert_eq!(
            catalog.skipped()[0].to_string(),
            "Skipping requirement row 1: ID 'G.2.1': section 'G.2' is not declared in the structure"
        );
    }

    #[test]
    fn grouping_by_section_preserves_order() {
        let (rows, reqs) = (
            vec![
                StructureRow::part("S", "System"),
                StructureRow::section("S.1", "Components"),
                StructureRow::section("S.2", "Functionality"),
            ],
            vec![
                RequirementRow::new("S.2.1", "a"),
                RequirementRow::new("S.1.1", "b"),
                RequirementRow::new("S.2.2", "c"),
            ],
        );
        let catalog = Catalog::from_rows(rows, reqs);
        let groups = catalog.by_section();
        let ids: Vec<_> = groups["S.2"]
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["S.2.1", "S.2.2"]);
        assert_eq!(groups["S.1"].len(), 1);
    }
}

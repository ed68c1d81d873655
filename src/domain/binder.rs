//! Binding of raw requirement rows to the declared structure.
//!
//! A requirement never names its Part or Section directly; both are inferred
//! from its dotted id. The Section is the longest declared Section prefix of
//! the id, so ids may nest arbitrarily deep below their Section.

use non_empty_string::NonEmptyString;

use crate::domain::{
    requirement::{parse_references, Attachment, RequirementRow},
    structure::{NodeKind, Structure, StructureNode},
    Requirement,
};

/// Why a requirement row could not be bound.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    /// The row lacks an id or a description.
    #[error("missing id or description (id: '{id}')")]
    MissingField {
        /// The id cell, possibly empty.
        id: String,
    },

    /// The id has a single segment and cannot address a Section.
    #[error("ID '{id}' must address at least a part and a section")]
    TooShort {
        /// The offending id.
        id: String,
    },

    /// The first segment is not a declared Part.
    #[error("ID '{id}': part '{part}' is not declared in the structure")]
    UnknownPart {
        /// The offending id.
        id: String,
        /// The unresolved Part id.
        part: String,
    },

    /// No prefix of the id is a declared Section.
    #[error("ID '{id}': section '{section}' is not declared in the structure")]
    UnknownSection {
        /// The offending id.
        id: String,
        /// The unresolved two-segment Section id.
        section: String,
    },
}

/// Binds one row to its Part and Section.
///
/// # Errors
///
/// Returns a [`SkipReason`] if the row is incomplete or its id does not
/// resolve against `structure`.
pub fn bind(row: RequirementRow, structure: &Structure) -> Result<Requirement, SkipReason> {
    let (Some(id), Some(description)) = (non_blank(row.id.clone()), non_blank(row.description))
    else {
        return Err(SkipReason::MissingField {
            id: row.id.unwrap_or_default(),
        });
    };
    let Ok(description) = NonEmptyString::new(description) else {
        return Err(SkipReason::MissingField { id });
    };

    let segments: Vec<&str> = id.split('.').collect();
    if segments.len() < 2 {
        return Err(SkipReason::TooShort { id });
    }

    let Some(part) = structure
        .get(segments[0])
        .filter(|node| node.kind == NodeKind::Part)
    else {
        return Err(SkipReason::UnknownPart {
            part: segments[0].to_string(),
            id,
        });
    };

    let Some(section) = resolve_section(&segments, structure) else {
        return Err(SkipReason::UnknownSection {
            section: segments[..2].join("."),
            id,
        });
    };

    tracing::debug!("Bound {id} to {} / {}", part.id, section.id);

    Ok(Requirement {
        part: part.title.clone(),
        section: section.title.clone(),
        section_id: section.id.clone(),
        description,
        priority: non_blank(row.priority),
        parent: non_blank(row.parent),
        references: row
            .reference_to
            .as_deref()
            .map(parse_references)
            .unwrap_or_default(),
        attachments: row
            .attached_files
            .as_deref()
            .map(Attachment::parse_list)
            .unwrap_or_default(),
        id,
    })
}

/// Finds the longest declared Section prefix of the id, excluding the full id.
fn resolve_section<'a>(segments: &[&str], structure: &'a Structure) -> Option<&'a StructureNode> {
    (1..segments.len()).rev().find_map(|len| {
        structure
            .get(&segments[..len].join("."))
            .filter(|node| node.kind == NodeKind::Section)
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::structure::StructureRow;

    fn structure() -> Structure {
        let (structure, _) = Structure::from_rows(vec![
            StructureRow::part("G", "Goals"),
            StructureRow::section("G.1", "Context"),
            StructureRow::section("G.1.2", "Stakeholders"),
            StructureRow::part("S", "System"),
            StructureRow::section("S.1", "Components"),
        ]);
        structure
    }

    #[test]
    fn infers_part_and_section_from_id() {
        let requirement = bind(RequirementRow::new("G.1.1", "x"), &structure()).unwrap();
        assert_eq!(requirement.part, "Goals");
        assert_eq!(requirement.section, "Context");
        assert_eq!(requirement.section_id, "G.1");
        assert_eq!(requirement.description.as_str(), "x");
    }

    #[test_case("G.1.1", "G.1"; "direct child")]
    #[test_case("G.1.3.4.5", "G.1"; "deep below section")]
    #[test_case("G.1.2.1", "G.1.2"; "nested section wins")]
    #[test_case("G.1.2.7.1", "G.1.2"; "deep below nested section")]
    #[test_case("S.1.9", "S.1"; "other part")]
    fn longest_declared_section_prefix(id: &str, section_id: &str) {
        let requirement = bind(RequirementRow::new(id, "x"), &structure()).unwrap();
        assert_eq!(requirement.section_id, section_id);
    }

    #[test]
    fn id_equal_to_a_section_is_not_its_own_section() {
        // G.1.2 is declared, but the section is searched among strict prefixes
        let requirement = bind(RequirementRow::new("G.1.2", "x"), &structure()).unwrap();
        assert_eq!(requirement.section_id, "G.1");
    }

    #[test]
    fn unknown_section_names_two_segment_id() {
        let error = bind(RequirementRow::new("G.2.1", "x"), &structure()).unwrap_err();
        assert_eq!(
            error,
            SkipReason::UnknownSection {
                id: "G.2.1".to_string(),
                section: "G.2".to_string(),
            }
        );
    }

    #[test]
    fn unknown_part_is_skipped() {
        let error = bind(RequirementRow::new("Z.1.1", "x"), &structure()).unwrap_err();
        assert!(matches!(error, SkipReason::UnknownPart { part, .. } if part == "Z"));
    }

    #[test]
    fn section_cannot_stand_in_for_part() {
        let (structure, _) = Structure::from_rows(vec![StructureRow::section("G", "Odd")]);
        let error = bind(RequirementRow::new("G.1", "x"), &structure).unwrap_err();
        assert!(matches!(error, SkipReason::UnknownPart { .. }));
    }

    #[test_case(None, Some("x"); "missing id")]
    #[test_case(Some("G.1.1"), None; "missing description")]
    #[test_case(Some("  "), Some("x"); "blank id")]
    #[test_case(Some("G.1.1"), Some(" "); "blank description")]
    fn incomplete_rows_are_skipped(id: Option<&str>, description: Option<&str>) {
        let row = RequirementRow {
            id: id.map(str::to_string),
            description: description.map(str::to_string),
            ..RequirementRow::default()
        };
        assert!(matches!(
            bind(row, &structure()),
            Err(SkipReason::MissingField { .. })
        ));
    }

    #[test]
    fn single_segment_id_is_too_short() {
        let error = bind(RequirementRow::new("G", "x"), &structure()).unwrap_err();
        assert_eq!(
            error,
            SkipReason::TooShort {
                id: "G".to_string()
            }
        );
    }

    #[test]
    fn optional_columns_are_parsed() {
        let row = RequirementRow {
            priority: Some("Must".to_string()),
            parent: Some("".to_string()),
            reference_to: Some("S.1.1, G.1.2".to_string()),
            attached_files: Some("assets/a.puml|Flow".to_string()),
            ..RequirementRow::new("G.1.1", "x")
        };
        let requirement = bind(row, &structure()).unwrap();
        assert_eq!(requirement.priority.as_deref(), Some("Must"));
        assert_eq!(requirement.parent, None);
        assert_eq!(requirement.references, vec!["S.1.1", "G.1.2"]);
        assert_eq!(requirement.attachments.len(), 1);
        assert_eq!(requirement.attachments[0].caption.as_deref(), Some("Flow"));
    }
}

use std::{collections::HashMap, fmt::Write};

use rayon::prelude::*;

use crate::{
    domain::{build_forest, Catalog, HierarchyError, Requirement, Structure, StructureNode},
    render::{SectionBody, MAX_HEADING_DEPTH},
    storage::Changelog,
};

/// Heading level of a Part.
const PART_LEVEL: usize = 2;

/// Errors that can occur when rendering a document.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The requirements of a Section could not be arranged into a forest.
    #[error("cannot render section {section}")]
    Hierarchy {
        /// The Section id.
        section: String,
        /// The underlying error.
        source: HierarchyError,
    },
}

/// A complete `AsciiDoc` document for a catalog.
#[derive(Debug, Clone, Copy)]
pub struct Document<'c> {
    catalog: &'c Catalog,
    title: &'c str,
    changelog: Option<&'c Changelog>,
}

impl<'c> Document<'c> {
    /// A document titled `title` covering every Part of `catalog`.
    #[must_use]
    pub const fn new(catalog: &'c Catalog, title: &'c str) -> Self {
        Self {
            catalog,
            title,
            changelog: None,
        }
    }

    /// Places `changelog` between the header and the first Part.
    #[must_use]
    pub const fn with_changelog(mut self, changelog: &'c Changelog) -> Self {
        self.changelog = Some(changelog);
        self
    }

    /// Renders the document.
    ///
    /// Parts appear in declaration order, each followed by a page break.
    /// Sections nest one heading level per structural level, and each
    /// Section's requirements start one level below the Section heading.
    ///
    /// # Errors
    ///
    /// Returns an error if the requirements of any Section form a parent
    /// cycle.
    pub fn render(&self) -> Result<String, RenderError> {
        let mut out = format!("= {}\n:toc: left\n:toclevels: 2\n\n", self.title);

        if let Some(changelog) = self.changelog.filter(|changelog| !changelog.is_empty()) {
            let _ = writeln!(out, "{changelog}");
        }

        let structure = self.catalog.structure();
        let groups = self.catalog.by_section();

        for part in structure.parts() {
            let _ = writeln!(out, "{} {}\n", "=".repeat(PART_LEVEL), part.title);

            let sections: Vec<&StructureNode> = structure.children(part).collect();
            let rendered = sections
                .par_iter()
                .map(|section| render_section(structure, &groups, section, PART_LEVEL + 1))
                .collect::<Result<Vec<_>, _>>()?;
            for section in rendered {
                out.push_str(&section);
            }

            out.push_str("<<<\n\n");
        }

        Ok(out)
    }
}

fn render_section(
    structure: &Structure,
    groups: &HashMap<&str, Vec<&Requirement>>,
    section: &StructureNode,
    level: usize,
) -> Result<String, RenderError> {
    let mut out = format!(
        "{} {} {}\n\n",
        "=".repeat(level.min(MAX_HEADING_DEPTH)),
        section.id,
        section.title
    );

    let requirements = groups
        .get(section.id.as_str())
        .map(Vec::as_slice)
        .unwrap_or_default();
    if !requirements.is_empty() {
        let forest = build_forest(requirements).map_err(|source| RenderError::Hierarchy {
            section: section.id.clone(),
            source,
        })?;
        let _ = write!(out, "{}", SectionBody::new(&forest, level + 1));
    }

    let subsections: Vec<&StructureNode> = structure.children(section).collect();
    if subsections.is_empty() {
        if requirements.is_empty() {
            out.push_str("_No requirements for this section._\n\n");
        }
    } else {
        for subsection in subsections {
            out.push_str(&render_section(structure, groups, subsection, level + 1)?);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        domain::{RequirementRow, StructureRow},
        storage::ChangelogEntry,
    };

    fn catalog(requirements: Vec<RequirementRow>) -> Catalog {
        Catalog::from_rows(
            vec![
                StructureRow::part("G", "Goals"),
                StructureRow::section("G.1", "Context"),
                StructureRow::section("G.1.2", "Stakeholders"),
                StructureRow::section("G.2", "Objectives"),
                StructureRow::part("S", "System"),
                StructureRow::section("S.1", "Components"),
            ],
            requirements,
        )
    }

    #[test]
    fn full_document_layout() {
        let catalog = catalog(vec![
            RequirementRow::new("S.1.1", "a"),
            RequirementRow::new("S.1.1.1", "b").with_parent("S.1.1"),
        ]);
        let output = Document::new(&catalog, "Specs").render().unwrap();

        assert!(output.starts_with("= Specs\n:toc: left\n:toclevels: 2\n\n== Goals\n\n"));
        assert!(output.contains("=== G.1 Context\n\n==== G.1.2 Stakeholders\n\n"));
        assert_eq!(output.matches("_No requirements for this section._").count(), 2);
        assert!(output.contains("=== S.1 Components\n\n[[S.1.1]]\n[discrete]\n==== S.1.1\n"));
        assert!(output.contains("===== S.1.1.1\n"));
        assert_eq!(output.matches("<<<\n").count(), 2);

        let goals = output.find("== Goals").unwrap();
        let system = output.find("== System").unwrap();
        assert!(goals < system);
    }

    #[test]
    fn sections_keep_declared_order() {
        let catalog = catalog(vec![
            RequirementRow::new("G.2.1", "late"),
            RequirementRow::new("G.1.1", "early"),
        ]);
        let output = Document::new(&catalog, "Specs").render().unwrap();

        let context = output.find("=== G.1 Context").unwrap();
        let objectives = output.find("=== G.2 Objectives").unwrap();
        assert!(context < objectives);
        assert!(output.find("early").unwrap() < output.find("late").unwrap());
    }

    #[test]
    fn nested_section_requirements_render_deeper() {
        let catalog = catalog(vec![RequirementRow::new("G.1.2.1", "who")]);
        let output = Document::new(&catalog, "Specs").render().unwrap();
        assert!(output.contains("==== G.1.2 Stakeholders\n\n[[G.1.2.1]]\n[discrete]\n===== G.1.2.1\n"));
    }

    #[test]
    fn changelog_follows_header() {
        let catalog = catalog(Vec::new());
        let changelog: Changelog = [ChangelogEntry {
            version: "v1.0.0".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            subject: "First release".to_string(),
        }]
        .into_iter()
        .collect();

        let output = Document::new(&catalog, "Specs")
            .with_changelog(&changelog)
            .render()
            .unwrap();
        assert!(output.starts_with(
            "= Specs\n:toc: left\n:toclevels: 2\n\n[discrete]\n== Changelog\n"
        ));
        assert!(output.contains("|===\n\n== Goals"));
    }

    #[test]
    fn empty_changelog_is_omitted() {
        let catalog = catalog(Vec::new());
        let changelog = Changelog::default();
        let output = Document::new(&catalog, "Specs")
            .with_changelog(&changelog)
            .render()
            .unwrap();
        assert!(!output.contains("Changelog"));
    }

    #[test]
    fn rendering_twice_is_identical() {
        let catalog = catalog(vec![
            RequirementRow::new("G.1.1", "a"),
            RequirementRow::new("G.1.1.1", "b").with_parent("G.1.1"),
            RequirementRow::new("S.1.1", "c"),
        ]);
        let document = Document::new(&catalog, "Specs");
        assert_eq!(document.render().unwrap(), document.render().unwrap());
    }

    #[test]
    fn deep_structure_headings_are_capped() {
        let catalog = Catalog::from_rows(
            vec![
                StructureRow::part("G", "Goals"),
                StructureRow::section("G.1", "One"),
                StructureRow::section("G.1.1", "Two"),
                StructureRow::section("G.1.1.1", "Three"),
                StructureRow::section("G.1.1.1.1", "Four"),
                StructureRow::section("G.1.1.1.1.1", "Five"),
            ],
            vec![RequirementRow::new("G.1.1.1.1.1.1", "deep")],
        );
        let output = Document::new(&catalog, "Specs").render().unwrap();

        assert!(output.contains("\n===== G.1.1.1 Three\n"));
        assert!(output.contains("\n====== G.1.1.1.1 Four\n"));
        assert!(output.contains("\n====== G.1.1.1.1.1 Five\n"));
        assert!(output.contains("\n====== G.1.1.1.1.1.1\n"));
        assert!(!output.contains("======="));
    }

    #[test]
    fn parent_cycle_fails() {
        let catalog = catalog(vec![
            RequirementRow::new("S.1.1", "a").with_parent("S.1.2"),
            RequirementRow::new("S.1.2", "b").with_parent("S.1.1"),
        ]);
        let error = Document::new(&catalog, "Specs").render().unwrap_err();
        assert!(matches!(error, RenderError::Hierarchy { section, .. } if section == "S.1"));
    }
}

//! `AsciiDoc` rendering of one requirement forest.

use std::fmt;

use crate::{
    domain::{
        requirement::{Attachment, AttachmentKind},
        RequirementNode,
    },
    render::MAX_HEADING_DEPTH,
};

/// A requirement forest rendered at a fixed starting heading depth.
///
/// Rendering is pure: the same forest and depth always produce the same text.
#[derive(Debug, Clone, Copy)]
pub struct SectionBody<'f, 'a> {
    forest: &'f [RequirementNode<'a>],
    depth: usize,
}

impl<'f, 'a> SectionBody<'f, 'a> {
    /// Renders `forest` with its roots at heading depth `depth`.
    ///
    /// A depth of zero is treated as one.
    #[must_use]
    pub fn new(forest: &'f [RequirementNode<'a>], depth: usize) -> Self {
        Self {
            forest,
            depth: depth.max(1),
        }
    }
}

impl fmt::Display for SectionBody<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.forest {
            write_node(f, node, self.depth, 0)?;
            f.write_str("'''\n\n")?;
        }
        Ok(())
    }
}

/// Writes `node` at heading depth `depth`, then its children one level deeper.
///
/// `nesting` counts the ancestors of `node` within the forest; it sizes the
/// delimiter of the children block so nested blocks never close each other.
fn write_node(
    f: &mut fmt::Formatter<'_>,
    node: &RequirementNode<'_>,
    depth: usize,
    nesting: usize,
) -> fmt::Result {
    let requirement = node.requirement;
    let id = &requirement.id;

    writeln!(f, "[[{id}]]")?;
    writeln!(f, "[discrete]")?;
    writeln!(f, "{} {id}", "=".repeat(depth.min(MAX_HEADING_DEPTH)))?;
    writeln!(f)?;

    if let Some(priority) = &requirement.priority {
        write!(f, "[.priority]#{priority}# ")?;
    }
    writeln!(f, "{}", requirement.description)?;
    writeln!(f)?;

    if !requirement.references.is_empty() {
        let links: Vec<String> = requirement
            .references
            .iter()
            .map(|reference| format!("<<{reference}>>"))
            .collect();
        writeln!(f, "*References*: {}", links.join(", "))?;
        writeln!(f)?;
    }

    for (n, attachment) in requirement.attachments.iter().enumerate() {
        write_attachment(f, id, n + 1, attachment)?;
    }

    if !node.children.is_empty() {
        let delimiter = "=".repeat(4 + nesting);
        writeln!(f, "[.req-children]")?;
        writeln!(f, "{delimiter}")?;
        for child in &node.children {
            write_node(f, child, depth + 1, nesting + 1)?;
        }
        writeln!(f, "{delimiter}")?;
        writeln!(f)?;
    }

    Ok(())
}

/// Writes the block for the `n`th (1-based) attachment of requirement `id`.
fn write_attachment(
    f: &mut fmt::Formatter<'_>,
    id: &str,
    n: usize,
    attachment: &Attachment,
) -> fmt::Result {
    let path = &attachment.path;
    let kind = attachment.kind();

    if kind == AttachmentKind::Link {
        let text = attachment.caption.as_deref().unwrap_or("Attached File");
        writeln!(f, "link:{path}[{text}]")?;
        return writeln!(f);
    }

    writeln!(f, "[.text-center]")?;
    let caption = attachment
        .caption
        .as_deref()
        .map_or_else(|| format!("Visual for {id}"), str::to_string);
    writeln!(f, ".{caption}")?;
    if kind == AttachmentKind::Diagram {
        writeln!(
            f,
            "plantuml::{path}[format=svg, target=diagram-{id}-{n}, align=center]"
        )?;
    } else {
        writeln!(f, "image::{path}[{id} Image, align=center]")?;
    }
    writeln!(f)
}

#[cfg(test)]
mod tests {
    use non_empty_string::NonEmptyString;

    use super::*;
    use crate::domain::{build_forest, Requirement};

    fn requirement(id: &str, parent: Option<&str>, description: &str) -> Requirement {
        Requirement {
            id: id.to_string(),
            part: "System".to_string(),
            section: "Components".to_string(),
            section_id: "S.1".to_string(),
            description: NonEmptyString::new(description.to_string()).unwrap(),
            priority: None,
            parent: parent.map(str::to_string),
            references: Vec::new(),
            attachments: Vec::new(),
        }
    }

    fn render(reqs: &[Requirement], depth: usize) -> String {
        let scope: Vec<_> = reqs.iter().collect();
        let forest = build_forest(&scope).unwrap();
        SectionBody::new(&forest, depth).to_string()
    }

    #[test]
    fn child_is_one_level_deeper() {
        let reqs = [
            requirement("S.1.1", None, "a"),
            requirement("S.1.1.1", Some("S.1.1"), "b"),
        ];

        let expected = "\
[[S.1.1]]
[discrete]
==== S.1.1

a

[.req-children]
====
[[S.1.1.1]]
[discrete]
===== S.1.1.1

b

====

'''

";
        assert_eq!(render(&reqs, 4), expected);
    }

    #[test]
    fn nested_blocks_use_longer_delimiters() {
        let reqs = [
            requirement("S.1.1", None, "a"),
            requirement("S.1.1.1", Some("S.1.1"), "b"),
            requirement("S.1.1.1.1", Some("S.1.1.1"), "c"),
        ];
        let output = render(&reqs, 2);

        assert!(output.contains("== S.1.1\n"));
        assert!(output.contains("=== S.1.1.1\n"));
        assert!(output.contains("==== S.1.1.1.1\n"));
        assert!(output.contains("\n====\n"));
        assert!(output.contains("\n=====\n"));
        // only the top-level item is followed by a break
        assert_eq!(output.matches("'''").count(), 1);
    }

    #[test]
    fn priority_references_and_attachments() {
        let mut req = requirement("G.1.1", None, "Users can log in");
        req.priority = Some("Must".to_string());
        req.references = vec!["S.1.1".to_string(), "S.2.3".to_string()];
        req.attachments = Attachment::parse_list(
            "assets/login.puml|Login flow; assets/seq.puml; assets/ui.png; assets/manual.pdf",
        );

        let output = render(&[req], 4);

        assert!(output.contains("[.priority]#Must# Users can log in\n"));
        assert!(output.contains("*References*: <<S.1.1>>, <<S.2.3>>\n"));
        assert!(output.contains(
            ".Login flow\nplantuml::assets/login.puml[format=svg, target=diagram-G.1.1-1, align=center]\n"
        ));
        assert!(output.contains(
            ".Visual for G.1.1\nplantuml::assets/seq.puml[format=svg, target=diagram-G.1.1-2, align=center]\n"
        ));
        assert!(output.contains("image::assets/ui.png[G.1.1 Image, align=center]\n"));
        assert!(output.contains("link:assets/manual.pdf[Attached File]\n"));
    }

    #[test]
    fn heading_depth_is_capped() {
        let ids = ["S.1.1", "S.1.1.1", "S.1.1.1.1", "S.1.1.1.1.1", "S.1.1.1.1.1.1"];
        let reqs: Vec<_> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| requirement(id, i.checked_sub(1).map(|p| ids[p]), "x"))
            .collect();

        let output = render(&reqs, 4);

        assert!(output.contains("\n==== S.1.1\n"));
        assert!(output.contains("\n===== S.1.1.1\n"));
        assert!(output.contains("\n====== S.1.1.1.1\n"));
        assert!(output.contains("\n====== S.1.1.1.1.1\n"));
        assert!(output.contains("\n====== S.1.1.1.1.1.1\n"));
        assert!(!output.contains("======= S."));
        // children blocks keep nesting past the heading cap
        assert!(output.contains("\n=======\n"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let mut req = requirement("G.1.1", None, "x");
        req.attachments = Attachment::parse_list("a.puml; b.puml");
        let reqs = [req, requirement("G.1.1.1", Some("G.1.1"), "y")];

        assert_eq!(render(&reqs, 4), render(&reqs, 4));
    }

    #[test]
    fn empty_forest_renders_nothing() {
        assert_eq!(SectionBody::new(&[], 4).to_string(), "");
    }

    #[test]
    fn anchors_precede_headings() {
        let output = render(&[requirement("S.1.1", None, "a")], 1);
        assert!(output.starts_with("[[S.1.1]]\n[discrete]\n= S.1.1\n"));
    }
}

use std::{collections::HashMap, path::PathBuf};

use clap::Parser;
use reqdoc::{storage::Project, NodeKind, Structure, StructureNode};
use serde::Serialize;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Show the document structure with requirement counts")]
pub struct Tree {
    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// A structure node with the number of requirements bound below it.
#[derive(Debug, Serialize)]
struct CountedNode<'a> {
    id: &'a str,
    kind: &'static str,
    title: &'a str,
    required: bool,
    /// Requirements bound directly to this node.
    requirements: usize,
    /// Requirements bound to this node or any node below it.
    total: usize,
    children: Vec<CountedNode<'a>>,
}

impl<'a> CountedNode<'a> {
    fn new(structure: &'a Structure, node: &'a StructureNode, counts: &HashMap<&str, usize>) -> Self {
        let children: Vec<_> = structure
            .children(node)
            .map(|child| Self::new(structure, child, counts))
            .collect();
        let requirements = counts.get(node.id.as_str()).copied().unwrap_or_default();
        let total = requirements + children.iter().map(|child| child.total).sum::<usize>();

        Self {
            id: &node.id,
            kind: match node.kind {
                NodeKind::Part => "part",
                NodeKind::Section => "section",
            },
            title: &node.title,
            required: node.required,
            requirements,
            total,
            children,
        }
    }

    fn print(&self, indent: usize) {
        let line = format!(
            "{}{} {}  ({})",
            "  ".repeat(indent),
            self.id,
            self.title,
            self.total
        );
        if self.required && self.total == 0 {
            println!("{}  {}", line.warning(), "required, empty".warning());
        } else if self.total == 0 {
            println!("{}", line.dim());
        } else {
            println!("{line}");
        }

        for child in &self.children {
            child.print(indent + 1);
        }
    }
}

impl Tree {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let project = Project::load(root)?;
        let catalog = project.catalog();
        let structure = catalog.structure();

        let counts: HashMap<&str, usize> = catalog
            .by_section()
            .into_iter()
            .map(|(section, requirements)| (section, requirements.len()))
            .collect();

        let parts: Vec<_> = structure
            .parts()
            .map(|part| CountedNode::new(structure, part, &counts))
            .collect();
        let orphans: Vec<_> = structure
            .orphans()
            .map(|orphan| CountedNode::new(structure, orphan, &counts))
            .collect();

        match self.output {
            OutputFormat::Table => {
                for part in &parts {
                    part.print(0);
                }
                if !orphans.is_empty() {
                    println!("\n{}", "Not in the document (no parent):".warning());
                    for orphan in &orphans {
                        orphan.print(1);
                    }
                }
            }
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "parts": parts,
                    "orphans": orphans,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }

        Ok(())
    }
}

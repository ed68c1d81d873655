//! Parent/child forests of requirements.
//!
//! A forest is always built for one rendering scope (one Section). A parent
//! outside the scope does not exist as far as the forest is concerned, so
//! its children become roots of the scope.

use std::collections::HashMap;

use petgraph::{algo::tarjan_scc, graphmap::DiGraphMap};

use crate::domain::Requirement;

/// A requirement with its children, borrowed from the requirement set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementNode<'a> {
    /// The requirement itself.
    pub requirement: &'a Requirement,
    /// Direct children, in input order.
    pub children: Vec<RequirementNode<'a>>,
}

impl RequirementNode<'_> {
    /// Number of requirements in this subtree, including this one.
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(Self::len).sum::<usize>()
    }

    /// Always `false`: a node contains at least its own requirement.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

/// Errors that can occur when building a forest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    /// A parent chain leads back to where it started.
    #[error("parent references form a cycle: {}", .members.join(" → "))]
    Cycle {
        /// Ids of the requirements in the cycle, in input order.
        members: Vec<String>,
    },
}

/// Builds the forest of `scope`, preserving input order at every level.
///
/// # Errors
///
/// Returns [`HierarchyError::Cycle`] if parent references within the scope
/// form a cycle (including a requirement that is its own parent).
pub fn build_forest<'a>(scope: &[&'a Requirement]) -> Result<Vec<RequirementNode<'a>>, HierarchyError> {
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(scope.len());
    for (i, requirement) in scope.iter().enumerate() {
        positions.entry(requirement.id.as_str()).or_insert(i);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); scope.len()];
    let mut roots = Vec::new();
    let mut graph: DiGraphMap<usize, ()> = DiGraphMap::with_capacity(scope.len(), scope.len());

    for (i, requirement) in scope.iter().enumerate() {
        graph.add_node(i);
        let parent = requirement
            .parent
            .as_deref()
            .and_then(|parent| positions.get(parent).copied());
        let Some(parent) = parent else {
            roots.push(i);
            continue;
        };
        children[parent].push(i);
        graph.add_edge(i, parent, ());
    }

    check_acyclic(&graph, scope)?;

    Ok(roots
        .into_iter()
        .map(|root| assemble(root, scope, &children))
        .collect())
}

fn check_acyclic(graph: &DiGraphMap<usize, ()>, scope: &[&Requirement]) -> Result<(), HierarchyError> {
    let cycle = tarjan_scc(graph)
        .into_iter()
        .find(|component| component.len() > 1 || graph.contains_edge(component[0], component[0]));

    cycle.map_or(Ok(()), |mut members| {
        members.sort_unstable();
        Err(HierarchyError::Cycle {
            members: members.into_iter().map(|i| scope[i].id.clone()).collect(),
        })
    })
}

fn assemble<'a>(index: usize, scope: &[&'a Requirement], children: &[Vec<usize>]) -> RequirementNode<'a> {
    RequirementNode {
        requirement: scope[index],
        children: children[index]
            .iter()
            .map(|&child| assemble(child, scope, children))
            .collect(),
    }
}

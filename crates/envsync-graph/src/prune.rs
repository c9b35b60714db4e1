use std::collections::BTreeSet;

use tracing::debug;

use crate::graph::DependencyGraph;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrunePlan {
    /// Installed packages reachable from the keep roots.
    pub kept: BTreeSet<String>,
    /// Installed packages nothing kept depends on, sorted by name.
    pub removal: Vec<String>,
    /// Members of `removal` that no other installed package depends on.
    pub removal_roots: Vec<String>,
}

impl PrunePlan {
    pub fn is_empty(&self) -> bool {
        self.removal.is_empty()
    }
}

/// Every installed package reachable from `roots` along "depends on" edges,
/// roots included. Roots that are not installed contribute nothing.
pub fn reachable_from<'a, I>(graph: &DependencyGraph, roots: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut stack: Vec<&str> = roots
        .into_iter()
        .filter_map(|root| graph.node(root).map(|node| node.record.name.as_str()))
        .collect();

    while let Some(next) = stack.pop() {
        if !visited.insert(next) {
            continue;
        }
        stack.extend(
            graph
                .dependencies(next)
                .filter(|dep| graph.contains(dep) && !visited.contains(dep)),
        );
    }

    visited.into_iter().map(ToOwned::to_owned).collect()
}

pub fn compute_removal_set(graph: &DependencyGraph, roots: &BTreeSet<String>) -> BTreeSet<String> {
    let kept = reachable_from(graph, roots.iter().map(String::as_str));
    unreachable_nodes(graph, &kept)
}

fn unreachable_nodes(graph: &DependencyGraph, kept: &BTreeSet<String>) -> BTreeSet<String> {
    graph
        .node_names()
        .filter(|name| !kept.contains(*name))
        .map(ToOwned::to_owned)
        .collect()
}

/// Removal candidates with no incoming edge from any other installed package.
pub fn removal_roots(graph: &DependencyGraph, removal: &BTreeSet<String>) -> Vec<String> {
    let in_degree = graph.in_degrees();
    removal
        .iter()
        .filter(|name| in_degree.get(name.as_str()).copied().unwrap_or(0) == 0)
        .cloned()
        .collect()
}

pub fn plan_prune(graph: &DependencyGraph, roots: &BTreeSet<String>) -> PrunePlan {
    let kept = reachable_from(graph, roots.iter().map(String::as_str));
    let removal = unreachable_nodes(graph, &kept);
    let removal_roots = removal_roots(graph, &removal);

    debug!(
        roots = roots.len(),
        kept = kept.len(),
        removal = removal.len(),
        removal_roots = removal_roots.len(),
        "computed prune plan"
    );

    PrunePlan {
        kept,
        removal: removal.into_iter().collect(),
        removal_roots,
    }
}

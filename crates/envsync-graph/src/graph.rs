use std::collections::{BTreeMap, BTreeSet};

use envsync_core::{PackageKey, PackageRecord};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("malformed dependency spec '{spec}' in installed package '{package}'")]
    MalformedDependency { package: String, spec: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageNode {
    pub key: PackageKey,
    pub record: PackageRecord,
    pub is_editable_install: bool,
}

/// Installed packages keyed by name with "depends on" edges.
///
/// Edges may point at names that have no node; those targets are never
/// removal candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    nodes: BTreeMap<String, PackageNode>,
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    pub fn node(&self, name: &str) -> Option<&PackageNode> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn dependencies(&self, name: &str) -> impl Iterator<Item = &str> {
        self.edges
            .get(name)
            .into_iter()
            .flat_map(|targets| targets.iter().map(String::as_str))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Names of nodes that list `name` as a dependency, excluding `name` itself.
    pub fn dependents(&self, name: &str) -> impl Iterator<Item = &str> + '_ {
        let target = name.to_string();
        self.edges
            .iter()
            .filter(move |(source, targets)| **source != target && targets.contains(&target))
            .map(|(source, _)| source.as_str())
    }

    pub fn editable_installs(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.is_editable_install)
            .map(|(name, _)| name.as_str())
    }

    pub(crate) fn in_degrees(&self) -> BTreeMap<&str, usize> {
        let mut in_degree: BTreeMap<&str, usize> =
            self.nodes.keys().map(|name| (name.as_str(), 0)).collect();
        for (source, targets) in &self.edges {
            for target in targets {
                if target == source {
                    continue;
                }
                if let Some(degree) = in_degree.get_mut(target.as_str()) {
                    *degree += 1;
                }
            }
        }
        in_degree
    }
}

pub fn build_graph(
    installed: &BTreeMap<PackageKey, PackageRecord>,
) -> Result<DependencyGraph, GraphError> {
    let mut graph = DependencyGraph::default();

    for (key, record) in installed {
        let mut targets = BTreeSet::new();
        for spec in &record.depends {
            let name = dependency_name(spec).ok_or_else(|| GraphError::MalformedDependency {
                package: record.name.clone(),
                spec: spec.clone(),
            })?;
            targets.insert(name.to_string());
        }

        match graph.nodes.get_mut(&record.name) {
            Some(existing) => {
                warn!(
                    package = %record.name,
                    kept_key = %existing.key,
                    duplicate_key = %key,
                    "installed package index lists the same package twice"
                );
                existing.is_editable_install |= record.is_editable_install;
            }
            None => {
                graph.nodes.insert(
                    record.name.clone(),
                    PackageNode {
                        key: key.clone(),
                        record: record.clone(),
                        is_editable_install: record.is_editable_install,
                    },
                );
            }
        }
        graph
            .edges
            .entry(record.name.clone())
            .or_default()
            .extend(targets);
    }

    debug!(
        nodes = graph.len(),
        edges = graph.edge_count(),
        "built installed package dependency graph"
    );
    Ok(graph)
}

/// Bare package name of a `"<name> <constraint>?"` dependency entry.
pub fn dependency_name(spec: &str) -> Option<&str> {
    let name = spec.split(' ').next()?;
    if name.trim().is_empty() || name.len() != name.trim().len() {
        return None;
    }
    Some(name)
}

mod graph;
mod prune;
mod roots;

pub use graph::{build_graph, dependency_name, DependencyGraph, GraphError, PackageNode};
pub use prune::{compute_removal_set, plan_prune, reachable_from, removal_roots, PrunePlan};
pub use roots::collect_keep_roots;

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;

use crate::graph::DependencyGraph;

/// Names that must survive a prune: manifest dependencies, protected system
/// packages and every editable install present in `graph`.
pub fn collect_keep_roots<'a, M, P>(
    graph: &'a DependencyGraph,
    manifest_names: M,
    protected: P,
) -> BTreeSet<String>
where
    M: IntoIterator<Item = &'a str>,
    P: IntoIterator<Item = &'a str>,
{
    manifest_names
        .into_iter()
        .chain(protected)
        .chain(graph.editable_installs())
        .map(ToOwned::to_owned)
        .collect()
}

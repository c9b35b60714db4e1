use std::collections::{BTreeMap, BTreeSet};

use envsync_core::{PackageKey, PackageRecord, DEVELOP_CHANNEL};

use super::*;

fn record(name: &str, depends: &[&str]) -> PackageRecord {
    PackageRecord::new(
        name,
        "https://conda.anaconda.org/conda-forge/linux-64",
        depends.iter().map(|dep| dep.to_string()).collect(),
    )
}

fn index(records: Vec<PackageRecord>) -> BTreeMap<PackageKey, PackageRecord> {
    records
        .into_iter()
        .map(|record| (format!("{}-1.0-0", record.name), record))
        .collect()
}

fn graph_of(edges: &[(&str, &[&str])]) -> DependencyGraph {
    let records = edges
        .iter()
        .map(|(name, deps)| record(name, deps))
        .collect();
    build_graph(&index(records)).expect("graph should build")
}

fn names(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn assert_partition(graph: &DependencyGraph, roots: &BTreeSet<String>) {
    let reachable = reachable_from(graph, roots.iter().map(String::as_str));
    let removal = compute_removal_set(graph, roots);
    assert!(reachable.is_disjoint(&removal));
    let union: BTreeSet<String> = reachable.union(&removal).cloned().collect();
    let all: BTreeSet<String> = graph.node_names().map(ToOwned::to_owned).collect();
    assert_eq!(union, all);
}

#[test]
fn build_graph_strips_constraints_from_dependency_names() {
    let graph = graph_of(&[
        ("numpy", &["python >=3.11,<3.12.0a0", "libblas >=3.9.0,<4.0a0"]),
        ("python", &[]),
        ("libblas", &[]),
    ]);

    let deps = graph.dependencies("numpy").collect::<Vec<_>>();
    assert_eq!(deps, vec!["libblas", "python"]);
    assert_eq!(graph.len(), 3);
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(
        graph.node("numpy").map(|node| node.key.as_str()),
        Some("numpy-1.0-0")
    );
}

#[test]
fn build_graph_keeps_dangling_edges_without_nodes() {
    let graph = graph_of(&[("app", &["missing-lib 1.0"])]);
    assert!(!graph.contains("missing-lib"));
    assert_eq!(graph.dependencies("app").collect::<Vec<_>>(), vec!["missing-lib"]);
    assert_eq!(graph.len(), 1);
}

#[test]
fn build_graph_rejects_blank_dependency_entries() {
    let installed = index(vec![record("app", &["python", " leading-space"])]);
    let err = build_graph(&installed).expect_err("malformed dependency must fail");
    assert_eq!(
        err,
        GraphError::MalformedDependency {
            package: "app".to_string(),
            spec: " leading-space".to_string(),
        }
    );

    let empty = index(vec![record("app", &[""])]);
    assert!(build_graph(&empty).is_err());
}

#[test]
fn build_graph_is_independent_of_input_order() {
    let forward = graph_of(&[("a", &["b"]), ("b", &["c"]), ("c", &[])]);

    let mut reversed = BTreeMap::new();
    reversed.insert("z-c".to_string(), record("c", &[]));
    reversed.insert("y-b".to_string(), record("b", &["c"]));
    reversed.insert("x-a".to_string(), record("a", &["b"]));
    let reversed = build_graph(&reversed).expect("graph should build");

    assert_eq!(
        forward.node_names().collect::<Vec<_>>(),
        reversed.node_names().collect::<Vec<_>>()
    );
    for name in ["a", "b", "c"] {
        assert_eq!(
            forward.dependencies(name).collect::<Vec<_>>(),
            reversed.dependencies(name).collect::<Vec<_>>()
        );
    }
}

#[test]
fn build_graph_merges_duplicate_names() {
    let mut installed = BTreeMap::new();
    installed.insert("tool-1.0-0".to_string(), record("tool", &["a"]));
    installed.insert(
        "tool-1.1-0".to_string(),
        PackageRecord::new("tool", DEVELOP_CHANNEL, vec!["b".to_string()]),
    );
    let graph = build_graph(&installed).expect("graph should build");

    let node = graph.node("tool").expect("node must exist");
    assert_eq!(node.key, "tool-1.0-0");
    assert!(node.is_editable_install);
    assert_eq!(graph.dependencies("tool").collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn prune_keeps_transitive_dependencies_of_roots() {
    let graph = graph_of(&[("A", &["B"]), ("B", &["C"]), ("C", &[]), ("D", &["C"])]);
    let roots = names(&["A"]);

    let plan = plan_prune(&graph, &roots);
    assert_eq!(plan.kept, names(&["A", "B", "C"]));
    assert_eq!(plan.removal, vec!["D"]);
    assert_eq!(plan.removal_roots, vec!["D"]);
    assert_partition(&graph, &roots);
}

#[test]
fn prune_removes_unreachable_cycle_entirely() {
    let graph = graph_of(&[("A", &["B"]), ("B", &["A"])]);
    let roots = BTreeSet::new();

    let plan = plan_prune(&graph, &roots);
    assert_eq!(plan.removal, vec!["A", "B"]);
    assert!(plan.removal_roots.is_empty());
    assert_partition(&graph, &roots);
}

#[test]
fn prune_keeps_cycle_reachable_through_any_member() {
    let graph = graph_of(&[("app", &["x"]), ("x", &["y"]), ("y", &["z"]), ("z", &["x"])]);
    let roots = names(&["app"]);

    let removal = compute_removal_set(&graph, &roots);
    assert!(removal.is_empty());
}

#[test]
fn prune_handles_self_dependency() {
    let graph = graph_of(&[("loop", &["loop"]), ("kept", &["kept"])]);
    let roots = names(&["kept"]);

    let plan = plan_prune(&graph, &roots);
    assert_eq!(plan.removal, vec!["loop"]);
    assert_eq!(plan.removal_roots, vec!["loop"]);
}

#[test]
fn prune_ignores_roots_that_are_not_installed() {
    let graph = graph_of(&[("a", &[]), ("b", &[])]);
    let roots = names(&["a", "not-installed"]);

    let plan = plan_prune(&graph, &roots);
    assert_eq!(plan.kept, names(&["a"]));
    assert_eq!(plan.removal, vec!["b"]);
}

#[test]
fn prune_never_removes_roots() {
    let graph = graph_of(&[
        ("python", &["openssl"]),
        ("openssl", &["ca-certificates"]),
        ("ca-certificates", &[]),
        ("leftover", &["python"]),
        ("pip", &["python"]),
    ]);
    let roots = names(&["pip", "ca-certificates"]);

    let removal = compute_removal_set(&graph, &roots);
    assert!(removal.is_disjoint(&roots));
    assert_eq!(removal, names(&["leftover"]));
}

#[test]
fn prune_is_idempotent_and_sorted() {
    let graph = graph_of(&[
        ("zeta", &[]),
        ("alpha", &["zeta"]),
        ("mid", &[]),
        ("keep", &[]),
    ]);
    let roots = names(&["keep"]);

    let first = plan_prune(&graph, &roots);
    let second = plan_prune(&graph, &roots);
    assert_eq!(first, second);
    assert_eq!(first.removal, vec!["alpha", "mid", "zeta"]);
    assert_eq!(first.removal_roots, vec!["alpha", "mid"]);
}

#[test]
fn removal_roots_have_no_dependents_outside_removal() {
    let graph = graph_of(&[
        ("root", &["shared"]),
        ("orphan-top", &["orphan-mid", "shared"]),
        ("orphan-mid", &["orphan-leaf"]),
        ("orphan-leaf", &[]),
        ("shared", &[]),
    ]);
    let roots = names(&["root"]);

    let plan = plan_prune(&graph, &roots);
    assert_eq!(plan.removal, vec!["orphan-leaf", "orphan-mid", "orphan-top"]);
    assert_eq!(plan.removal_roots, vec!["orphan-top"]);

    let removal: BTreeSet<String> = plan.removal.iter().cloned().collect();
    for name in &plan.removal_roots {
        assert!(graph
            .dependents(name)
            .all(|dependent| removal.contains(dependent)));
    }
}

#[test]
fn deep_dependency_chain_does_not_overflow() {
    let depth = 50_000;
    let mut installed = BTreeMap::new();
    for i in 0..depth {
        let depends = if i + 1 < depth {
            vec![format!("pkg-{}", i + 1)]
        } else {
            Vec::new()
        };
        let name = format!("pkg-{i}");
        installed.insert(name.clone(), PackageRecord::new(name, "conda-forge", depends));
    }
    let graph = build_graph(&installed).expect("graph should build");

    let removal = compute_removal_set(&graph, &names(&["pkg-0"]));
    assert!(removal.is_empty());
}

#[test]
fn keep_roots_include_manifest_protected_and_editable_installs() {
    let mut installed = index(vec![record("python", &[]), record("numpy", &["python"])]);
    installed.insert(
        "mylib-0.1-dev".to_string(),
        PackageRecord::new("mylib", DEVELOP_CHANNEL, vec!["numpy".to_string()]),
    );
    let graph = build_graph(&installed).expect("graph should build");

    let roots = collect_keep_roots(&graph, ["python"], ["conda"]);
    assert_eq!(roots, names(&["conda", "mylib", "python"]));

    let plan = plan_prune(&graph, &roots);
    assert!(plan.is_empty());
}

#[test]
fn dependency_name_takes_text_before_first_space() {
    assert_eq!(dependency_name("python >=3.11"), Some("python"));
    assert_eq!(dependency_name("libgcc-ng >=12 *_cuda"), Some("libgcc-ng"));
    assert_eq!(dependency_name("zlib"), Some("zlib"));
    assert_eq!(dependency_name(""), None);
    assert_eq!(dependency_name(" zlib"), None);
}

//! Reduction of a recipe graph to the nodes of a desired set of categories.
//!
//! Removing an undesired node connects each of its predecessors to each of its successors, so
//! that a retained node reaches another retained node in the reduced graph exactly when it did
//! through removed nodes in the original. Removing a node touches only its own edges, which
//! makes the pass independent of the order in which nodes are visited.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::graph::{DanglingReference, NodeId, RecipeGraph, REDUCED_RELATION};
use crate::lang::{normalize_category, Category};

/// Named category sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Actions, tools and foods.
    Fat,
    /// Actions only.
    Action,
}

impl Preset {
    pub fn name(self) -> &'static str {
        match self {
            Preset::Fat => "fat",
            Preset::Action => "action",
        }
    }

    pub fn desired(self) -> Desired {
        match self {
            Preset::Fat => Desired::new(vec![Category::Action, Category::Tool, Category::Food]),
            Preset::Action => Desired::new(vec![Category::Action]),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fat" => Ok(Preset::Fat),
            "action" => Ok(Preset::Action),
            _ => Err(format!("unknown preset `{}` (expected `fat` or `action`)", s)),
        }
    }
}

/// Set of categories to keep, held in normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Desired(BTreeSet<Category>);

impl Desired {
    pub fn new<I: IntoIterator<Item = Category>>(categories: I) -> Self {
        Desired(
            categories
                .into_iter()
                .map(|c| normalize_category(&c))
                .collect(),
        )
    }

    /// Builds a set from tag labels such as `A`, `Ac`, `F`.
    pub fn from_labels<I, S>(labels: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let categories = labels
            .into_iter()
            .map(|label| label.as_ref().trim().parse::<Category>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Desired::new(categories))
    }

    pub fn contains(&self, category: &Category) -> bool {
        self.0.contains(&normalize_category(category))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.0.iter()
    }

    pub fn is_subset(&self, other: &Desired) -> bool {
        self.0.is_subset(&other.0)
    }
}

impl From<Preset> for Desired {
    fn from(preset: Preset) -> Desired {
        preset.desired()
    }
}

/// Summary of one reduction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reduction {
    pub removed: usize,
    pub kept: usize,
    pub added_edges: usize,
}

/// Reduces `graph` in place to the spans whose normalized category is in `desired`.
pub fn reduce(graph: &mut RecipeGraph, desired: &Desired) -> Reduction {
    let snapshot = graph.span_ids();
    reduce_in_order(graph, desired, &snapshot)
}

/// Same as [`reduce`], visiting the span ids of `order` first.
///
/// Spans missing from `order` are visited afterwards in id order; repeated ids and ids that
/// are not spans are skipped.
pub fn reduce_in_order(graph: &mut RecipeGraph, desired: &Desired, order: &[usize]) -> Reduction {
    let mut listed = BTreeSet::new();
    let mut visit: Vec<usize> = order.iter().cloned().filter(|&id| listed.insert(id)).collect();
    visit.extend(graph.span_ids().into_iter().filter(|id| !listed.contains(id)));

    let mut summary = Reduction::default();
    for id in visit {
        let category = match graph.span(id) {
            Some(span) => normalize_category(span.category()),
            None => continue,
        };
        if desired.contains(&category) {
            graph.set_category(id, category);
            summary.kept += 1;
        } else {
            summary.added_edges += bypass(graph, NodeId::Span(id));
            graph.remove_span(id);
            summary.removed += 1;
        }
    }
    graph.relabel_edges(REDUCED_RELATION);
    summary
}

/// Connects every predecessor of `node` to every successor of `node`.
///
/// Predecessors routed to the terminal node inherit the dangling references of `node`.
fn bypass(graph: &mut RecipeGraph, node: NodeId) -> usize {
    let predecessors: Vec<NodeId> = graph
        .dependents_of(node)
        .into_iter()
        .filter(|&p| p != node)
        .collect();
    let successors: Vec<NodeId> = graph
        .heads_of(node)
        .into_iter()
        .map(|(head, _)| head)
        .filter(|&s| s != node)
        .collect();
    let mut added = 0;
    for &p in &predecessors {
        for &s in &successors {
            if graph.add_edge(p, s, REDUCED_RELATION) {
                added += 1;
            }
        }
    }

    let inherited: Vec<usize> = match node.span_id() {
        Some(id) if successors.contains(&NodeId::End) => {
            graph.dangling_of(id).map(|r| r.head).collect()
        }
        _ => vec![],
    };
    for child in predecessors.iter().filter_map(|p| p.span_id()) {
        for &head in &inherited {
            graph.push_dangling(DanglingReference {
                child,
                head,
                relation: REDUCED_RELATION.to_string(),
            });
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use rand::seq::SliceRandom;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::graph::Span;

    /// Builds a graph of single-token spans from `(id, label)` and `(child, head)` pairs.
    fn graph_of(nodes: &[(usize, &str)], edges: &[(usize, usize)]) -> RecipeGraph {
        let mut graph = RecipeGraph::new("test");
        for &(id, label) in nodes {
            let category = Category::from_label(label);
            graph.add_span(Span::new(id, "w".to_string(), category, "test".to_string()));
        }
        for &(child, head) in edges {
            let head = if head == 0 { NodeId::End } else { NodeId::Span(head) };
            graph.add_edge(NodeId::Span(child), head, "t");
        }
        graph
    }

    fn edge_set(graph: &RecipeGraph) -> BTreeSet<(NodeId, NodeId)> {
        graph.edges().map(|(c, h, _)| (c, h)).collect()
    }

    /// Retained pairs connected by a path whose inner nodes are all removed.
    fn expected_edges(graph: &RecipeGraph, desired: &Desired) -> BTreeSet<(NodeId, NodeId)> {
        let keep = |n: NodeId| match n {
            NodeId::End => true,
            NodeId::Span(id) => desired.contains(graph.span(id).unwrap().category()),
        };
        let mut expected = BTreeSet::new();
        for start in graph.span_ids().into_iter().map(NodeId::Span).filter(|&n| keep(n)) {
            let mut stack = vec![start];
            let mut seen = BTreeSet::new();
            while let Some(node) = stack.pop() {
                for (head, _) in graph.heads_of(node) {
                    if keep(head) {
                        expected.insert((start, head));
                    } else if seen.insert(head) {
                        stack.push(head);
                    }
                }
            }
        }
        expected
    }

    fn fixture() -> RecipeGraph {
        // branched, cyclic and disconnected
        graph_of(
            &[
                (1, "Ac"),
                (2, "F"),
                (3, "T"),
                (4, "D"),
                (5, "F"),
                (6, "Q"),
                (7, "Af"),
                (8, "Sf"),
                (9, "St"),
                (10, "At"),
                (11, "F"),
                (12, "Ac2"),
            ],
            &[
                (2, 1),
                (3, 1),
                (4, 1),
                (1, 6),
                (6, 7),
                (5, 8),
                (8, 9),
                (9, 8),
                (9, 10),
                (10, 0),
                (11, 4),
                (4, 11),
                (12, 0),
                (7, 12),
            ],
        )
    }

    #[test]
    fn test_reduction_preserves_reachability() {
        for preset in &[Preset::Fat, Preset::Action] {
            let desired = preset.desired();
            let original = fixture();
            let expected = expected_edges(&original, &desired);
            let mut graph = original.clone();
            reduce(&mut graph, &desired);
            assert_eq!(edge_set(&graph), expected, "preset: {}", preset);
        }
    }

    #[test]
    fn test_visitation_order_is_irrelevant() {
        let desired = Preset::Action.desired();
        let mut reference = fixture();
        reduce(&mut reference, &desired);
        let reference_edges = edge_set(&reference);

        let mut rng = StdRng::seed_from_u64(42);
        let mut order = fixture().span_ids();
        for _ in 0..50 {
            order.shuffle(&mut rng);
            let mut graph = fixture();
            reduce_in_order(&mut graph, &desired, &order);
            assert_eq!(edge_set(&graph), reference_edges, "order: {:?}", order);
            assert_eq!(graph.span_ids(), reference.span_ids());
        }
    }

    #[test]
    fn test_monotonic_shrink() {
        let original = fixture();
        for preset in &[Preset::Fat, Preset::Action] {
            let desired = preset.desired();
            let expected = original
                .spans()
                .filter(|span| desired.contains(span.category()))
                .count();
            let mut graph = original.clone();
            let summary = reduce(&mut graph, &desired);
            assert!(graph.node_count() <= original.node_count());
            assert_eq!(graph.span_count(), expected);
            assert_eq!(graph.node_count(), expected + 1);
            assert_eq!(summary.kept, expected);
            assert_eq!(summary.removed, original.span_count() - expected);
        }
    }

    #[test]
    fn test_no_orphan_references() {
        let mut graph = fixture();
        reduce(&mut graph, &Preset::Action.desired());
        for (child, head, relation) in graph.edges() {
            assert!(graph.contains(child));
            assert!(graph.contains(head));
            assert_eq!(relation, REDUCED_RELATION);
        }
        assert!(graph.contains(NodeId::End));
    }

    #[test]
    fn test_kept_categories_are_normalized() {
        let mut graph = fixture();
        reduce(&mut graph, &Preset::Fat.desired());
        for span in graph.spans() {
            assert!(
                [Category::Action, Category::Food, Category::Tool].contains(span.category()),
                "span {} has category {}",
                span.id(),
                span.category()
            );
        }
        assert_eq!(graph.span(12).unwrap().category(), &Category::Action);
    }

    #[test]
    fn test_progressive_equals_direct() {
        let mut progressive = fixture();
        reduce(&mut progressive, &Preset::Fat.desired());
        reduce(&mut progressive, &Preset::Action.desired());
        let mut direct = fixture();
        reduce(&mut direct, &Preset::Action.desired());
        assert_eq!(edge_set(&progressive), edge_set(&direct));
        assert_eq!(progressive.span_ids(), direct.span_ids());
    }

    #[test]
    fn test_chain_through_removed_nodes() {
        // food -> tool -> action
        let mut graph = graph_of(&[(5, "F"), (6, "T"), (7, "Ac")], &[(5, 6), (6, 7)]);
        reduce(&mut graph, &Preset::Action.desired());
        assert_eq!(graph.span_ids(), vec![7]);
        assert_eq!(graph.edge_count(), 0);

        // action -> food -> tool -> action keeps the path
        let mut graph = graph_of(
            &[(1, "Ac"), (2, "F"), (3, "T"), (4, "At")],
            &[(1, 2), (2, 3), (3, 4)],
        );
        let summary = reduce(&mut graph, &Preset::Action.desired());
        assert_eq!(graph.span_ids(), vec![1, 4]);
        assert!(graph.has_edge(NodeId::Span(1), NodeId::Span(4)));
        assert_eq!(graph.edge_count(), 1);
        assert!(summary.added_edges >= 1);
    }

    #[test]
    fn test_removed_node_reroutes_to_end() {
        let mut graph = graph_of(&[(1, "Ac"), (2, "F")], &[(1, 2), (2, 0)]);
        reduce(&mut graph, &Preset::Action.desired());
        assert!(graph.has_edge(NodeId::Span(1), NodeId::End));
    }

    #[test]
    fn test_dangling_references_follow_reroute() {
        // 3 -> 2 -> 1 -> End, where 1 declared heads 7 and 9 that are no spans
        let mut graph = graph_of(&[(1, "F"), (2, "T"), (3, "Ac")], &[(3, 2), (2, 1), (1, 0)]);
        for &head in &[7, 9] {
            graph.push_dangling(DanglingReference {
                child: 1,
                head,
                relation: "t".to_string(),
            });
        }
        reduce_in_order(&mut graph, &Preset::Action.desired(), &[1, 2]);
        assert!(graph.has_edge(NodeId::Span(3), NodeId::End));
        let heads: Vec<(usize, usize, &str)> = graph
            .dangling()
            .iter()
            .map(|r| (r.child, r.head, r.relation.as_str()))
            .collect();
        assert_eq!(heads, vec![(3, 7, "edge"), (3, 9, "edge")]);

        let mut graph = graph_of(&[(1, "F"), (2, "T"), (3, "Ac")], &[(3, 2), (2, 1), (1, 0)]);
        graph.push_dangling(DanglingReference {
            child: 1,
            head: 7,
            relation: "t".to_string(),
        });
        reduce_in_order(&mut graph, &Preset::Action.desired(), &[2, 1]);
        assert_eq!(graph.dangling().len(), 1);
        assert_eq!(graph.dangling()[0].child, 3);
        assert_eq!(graph.dangling()[0].head, 7);
    }

    #[test]
    fn test_desired_from_labels() {
        let desired = Desired::from_labels(vec!["Ac", "F"]).unwrap();
        assert!(desired.contains(&Category::ToolAction));
        assert!(desired.contains(&Category::Food));
        assert!(!desired.contains(&Category::Tool));
        assert!(Desired::from_labels(vec!["O"]).is_err());
        assert!(Preset::Action.desired().is_subset(&Preset::Fat.desired()));
        assert_eq!("fat".parse::<Preset>(), Ok(Preset::Fat));
        assert!("full".parse::<Preset>().is_err());
    }
}

//! In-memory recipe graph.
//!
//! A [`RecipeGraph`] owns an adjacency structure over span nodes plus a terminal node, a table
//! of span attributes keyed by representative token id, and the per-token sidecar needed to
//! write every input line back out.

use std::collections::BTreeMap;

use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;

use crate::lang::{Category, Token};

pub use self::builder::Loader;
pub use self::check::{check, check_str, Diagnostic};
pub use self::reduce::{reduce, reduce_in_order, Desired, Preset, Reduction};
pub use self::serialize::{serialize, serialize_action_tags, write_graph};

pub mod builder;
pub mod check;
pub mod reduce;
pub mod serialize;

/// Relation carried by every edge once a graph has been reduced.
pub static REDUCED_RELATION: &str = "edge";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeId {
    /// A span, identified by the id of its first token.
    Span(usize),
    /// Synthetic sink for edges whose declared head is not a span.
    End,
}

impl NodeId {
    pub fn span_id(self) -> Option<usize> {
        match self {
            NodeId::Span(id) => Some(id),
            NodeId::End => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    id: usize,
    token_ids: Vec<usize>,
    text: String,
    category: Category,
    origin: String,
}

impl Span {
    pub fn new<S: Into<String>>(id: usize, text: S, category: Category, origin: S) -> Self {
        Span {
            id,
            token_ids: vec![id],
            text: text.into(),
            category,
            origin: origin.into(),
        }
    }

    pub(crate) fn push(&mut self, token_id: usize, form: &str) {
        self.token_ids.push(token_id);
        self.text.push(' ');
        self.text.push_str(form);
    }

    /// Representative id: the id of the first token.
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn token_ids(&self) -> &[usize] {
        &self.token_ids
    }

    /// Token forms joined by single spaces.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn len(&self) -> usize {
        self.token_ids.len()
    }
}

/// An edge declared towards an id that never became a span.
///
/// Each reference stands behind an edge `child -> End`; the declared head is what gets written
/// back out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub child: usize,
    pub head: usize,
    pub relation: String,
}

#[derive(Debug, Clone)]
pub struct RecipeGraph {
    origin: String,
    tokens: Vec<Token>,
    spans: BTreeMap<usize, Span>,
    edges: DiGraphMap<NodeId, String>,
    dangling: Vec<DanglingReference>,
}

impl RecipeGraph {
    pub fn new<S: Into<String>>(origin: S) -> Self {
        let mut edges = DiGraphMap::new();
        edges.add_node(NodeId::End);
        RecipeGraph {
            origin: origin.into(),
            tokens: vec![],
            spans: BTreeMap::new(),
            edges,
            dangling: vec![],
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Every token of the recipe in input order, including those outside any span.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.spans.values()
    }

    pub fn span(&self, id: usize) -> Option<&Span> {
        self.spans.get(&id)
    }

    pub fn span_ids(&self) -> Vec<usize> {
        self.spans.keys().cloned().collect()
    }

    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    /// Spans plus the terminal node.
    pub fn node_count(&self) -> usize {
        self.edges.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.edge_count()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.edges.contains_node(node)
    }

    pub fn has_edge(&self, child: NodeId, head: NodeId) -> bool {
        self.edges.contains_edge(child, head)
    }

    pub fn relation(&self, child: NodeId, head: NodeId) -> Option<&str> {
        self.edges.edge_weight(child, head).map(|s| s.as_str())
    }

    /// All edges as `(child, head, relation)`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, &str)> {
        self.edges
            .all_edges()
            .map(|(child, head, relation)| (child, head, relation.as_str()))
    }

    /// Heads of `node` with their relations, in insertion order.
    pub fn heads_of(&self, node: NodeId) -> Vec<(NodeId, &str)> {
        if !self.edges.contains_node(node) {
            return vec![];
        }
        self.edges
            .edges(node)
            .map(|(_, head, relation)| (head, relation.as_str()))
            .collect()
    }

    pub fn dependents_of(&self, node: NodeId) -> Vec<NodeId> {
        if !self.edges.contains_node(node) {
            return vec![];
        }
        self.edges
            .neighbors_directed(node, Direction::Incoming)
            .collect()
    }

    pub fn dangling(&self) -> &[DanglingReference] {
        &self.dangling
    }

    /// Dangling references declared on the span `child`.
    pub fn dangling_of(&self, child: usize) -> impl Iterator<Item = &DanglingReference> {
        self.dangling.iter().filter(move |r| r.child == child)
    }

    pub(crate) fn push_token(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub(crate) fn add_span(&mut self, span: Span) {
        self.edges.add_node(NodeId::Span(span.id()));
        self.spans.insert(span.id(), span);
    }

    /// Adds `child -> head` unless the pair is already connected; returns whether it was added.
    pub(crate) fn add_edge<S: Into<String>>(
        &mut self,
        child: NodeId,
        head: NodeId,
        relation: S,
    ) -> bool {
        if self.edges.contains_edge(child, head) {
            return false;
        }
        self.edges.add_edge(child, head, relation.into());
        true
    }

    /// Removes a span together with every edge incident to it and its dangling references.
    pub(crate) fn remove_span(&mut self, id: usize) -> Option<Span> {
        self.edges.remove_node(NodeId::Span(id));
        self.dangling.retain(|r| r.child != id);
        self.spans.remove(&id)
    }

    pub(crate) fn set_category(&mut self, id: usize, category: Category) {
        if let Some(span) = self.spans.get_mut(&id) {
            span.category = category;
        }
    }

    pub(crate) fn relabel_edges(&mut self, relation: &str) {
        for (_, _, weight) in self.edges.all_edges_mut() {
            *weight = relation.to_string();
        }
        for reference in &mut self.dangling {
            reference.relation = relation.to_string();
        }
    }

    /// Records `reference` unless its child already has one towards the same head; returns
    /// whether it was added.
    pub(crate) fn push_dangling(&mut self, reference: DanglingReference) -> bool {
        let known = self
            .dangling
            .iter()
            .any(|r| r.child == reference.child && r.head == reference.head);
        if known {
            return false;
        }
        self.dangling.push(reference);
        true
    }
}

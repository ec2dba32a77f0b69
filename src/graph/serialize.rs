use std::collections::HashMap;
use std::path::Path;

use crate::dataset::conll::{render_dependency_list, render_line, ROOT_RELATION};
use crate::graph::{NodeId, RecipeGraph, Span};
use crate::io;
use crate::lang::{normalize_category, project_actions, Position, Tag, Tokenized};

/// Renders one ten-column line per token of `graph`.
///
/// Structural columns are only filled on the first token of a span. When a span has several
/// heads, the primary one is whichever the adjacency yields first; the others become the
/// secondary-dependency list. An edge into the terminal node is written as the heads of the
/// dangling references standing behind it.
pub fn serialize(graph: &RecipeGraph) -> Vec<String> {
    serialize_with(graph, |tag| tag)
}

/// Like [`serialize`], keeping only action spans in the tag column.
///
/// Every other span is written as untagged tokens.
pub fn serialize_action_tags(graph: &RecipeGraph) -> Vec<String> {
    serialize_with(graph, |tag| project_actions(&tag))
}

fn serialize_with<F>(graph: &RecipeGraph, project: F) -> Vec<String>
where
    F: Fn(Tag) -> Tag,
{
    let mut positions: HashMap<usize, (&Span, usize)> = HashMap::new();
    for span in graph.spans() {
        for (index, &token_id) in span.token_ids().iter().enumerate() {
            positions.insert(token_id, (span, index));
        }
    }

    graph
        .tokens()
        .iter()
        .map(|token| {
            let (span, index) = match positions.get(&token.id()) {
                Some(&position) => position,
                None => return render_line(token, &Tag::Outside, 0, ROOT_RELATION, "_"),
            };
            let position = if index == 0 {
                Position::Begin
            } else {
                Position::Inside
            };
            let tag = project(Tag::Span(position, normalize_category(span.category())));
            if tag == Tag::Outside || position == Position::Inside {
                return render_line(token, &tag, 0, ROOT_RELATION, "_");
            }
            let mut heads = heads_of(graph, span.id()).into_iter();
            match heads.next() {
                Some((head, relation)) => {
                    let rest: Vec<(usize, &str)> = heads.collect();
                    render_line(token, &tag, head, relation, &render_dependency_list(&rest))
                }
                None => render_line(token, &tag, 0, ROOT_RELATION, "_"),
            }
        })
        .collect()
}

/// Span heads in adjacency order, with the terminal node expanded into its dangling heads.
fn heads_of(graph: &RecipeGraph, id: usize) -> Vec<(usize, &str)> {
    let mut heads = vec![];
    for (head, relation) in graph.heads_of(NodeId::Span(id)) {
        match head {
            NodeId::Span(head) => heads.push((head, relation)),
            NodeId::End => heads.extend(
                graph
                    .dangling_of(id)
                    .map(|r| (r.head, r.relation.as_str())),
            ),
        }
    }
    heads
}

/// Serializes `graph` to `path`, creating parent directories as needed.
pub fn write_graph<P: AsRef<Path>>(graph: &RecipeGraph, path: P) -> std::io::Result<()> {
    io::write_lines(path, serialize(graph))
}

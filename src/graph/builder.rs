use std::collections::BTreeSet;

use slog::Logger;

use crate::dataset::conll::Row;
use crate::error::{Error, ParseError, Result};
use crate::graph::{DanglingReference, NodeId, RecipeGraph, Span};
use crate::lang::{Position, Tag};

/// Builds a [`RecipeGraph`] from the token rows of one recipe.
#[derive(Debug)]
pub struct Loader {
    logger: Logger,
}

impl Default for Loader {
    fn default() -> Self {
        Loader::with_logger(Logger::root(slog::Discard, o!()))
    }
}

impl Loader {
    pub fn new() -> Self {
        Loader::default()
    }

    pub fn with_logger(logger: Logger) -> Self {
        Loader { logger }
    }

    /// Groups numbered rows into spans and collects the edges declared on their first tokens.
    ///
    /// Token ids must count up from 1 without gaps. An inside token extends the open span
    /// whatever its category and its edges are ignored; one without an open span starts a span
    /// that declares no edges. Edges towards an id that is not a span's first token are
    /// rerouted to the terminal node and kept as dangling references on the graph.
    pub fn build<'r, I, S>(&self, rows: I, origin: S) -> Result<RecipeGraph>
    where
        I: IntoIterator<Item = &'r (usize, Row)>,
        S: Into<String>,
    {
        let mut graph = RecipeGraph::new(origin);
        let origin = graph.origin().to_string();
        let mut open: Option<Span> = None;
        let mut declared: Vec<(usize, usize, String)> = vec![];

        for (expected, &(line, ref row)) in (1..).zip(rows) {
            if row.id != expected {
                return Err(Error::at_line(
                    line,
                    ParseError::MalformedLine(format!(
                        "expected token id {}, found {}",
                        expected, row.id
                    )),
                ));
            }
            graph.push_token(row.to_token());
            let (position, category) = match row.tag {
                Tag::Outside => {
                    if let Some(span) = open.take() {
                        graph.add_span(span);
                    }
                    if row.head != 0 {
                        debug!(self.logger, "ignoring head of untagged token";
                               "origin" => &origin, "id" => row.id, "head" => row.head);
                    }
                    continue;
                }
                Tag::Span(position, ref category) => (position, category),
            };

            if position == Position::Inside {
                if open.is_none() {
                    warn!(self.logger, "inside token without an open span, opening a new one";
                          "origin" => &origin, "id" => row.id, "tag" => row.tag.to_string());
                    open = Some(Span::new(
                        row.id,
                        row.form.clone(),
                        category.clone(),
                        origin.clone(),
                    ));
                } else if let Some(span) = open.as_mut() {
                    if span.category() != category {
                        warn!(self.logger, "inside token continues a span of another category";
                              "origin" => &origin, "id" => row.id, "tag" => row.tag.to_string(),
                              "span" => span.id(), "category" => span.category().to_string());
                    }
                    span.push(row.id, &row.form);
                }
                if !row.edges().is_empty() {
                    debug!(self.logger, "ignoring edges of inside token";
                           "origin" => &origin, "id" => row.id);
                }
                continue;
            }

            if let Some(span) = open.take() {
                graph.add_span(span);
            }
            open = Some(Span::new(
                row.id,
                row.form.clone(),
                category.clone(),
                origin.clone(),
            ));
            for (head, relation) in row.edges() {
                declared.push((row.id, head, relation.to_string()));
            }
        }
        if let Some(span) = open.take() {
            graph.add_span(span);
        }

        let span_ids: BTreeSet<usize> = graph.span_ids().into_iter().collect();
        for (child, head, relation) in declared {
            if span_ids.contains(&head) {
                graph.add_edge(NodeId::Span(child), NodeId::Span(head), relation);
            } else {
                warn!(self.logger, "edge points to a token that is not a span, rerouting to end";
                      "origin" => &origin, "child" => child, "head" => head);
                graph.add_edge(NodeId::Span(child), NodeId::End, relation.clone());
                graph.push_dangling(DanglingReference {
                    child,
                    head,
                    relation,
                });
            }
        }
        Ok(graph)
    }
}

//! Consistency checks over the raw rows of an annotated recipe.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::dataset::conll::{read_rows, Row};
use crate::error::Result;
use crate::lang::{Position, Tag};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A span that neither has a head nor is the head of another span.
    DisconnectedNode { id: usize, text: String },
    /// An untagged token that declares a head.
    OutsideWithHead { id: usize, text: String, head: usize },
    /// A head id that is not the first token of a span.
    EdgeToNonSpan {
        child: usize,
        head: usize,
        head_is_tagged: bool,
    },
}

/// Runs every check over the rows of one recipe.
///
/// Spans are delimited as the loader does; only edges declared on begin tokens are considered.
pub fn check<'r, I: IntoIterator<Item = &'r Row>>(rows: I) -> Vec<Diagnostic> {
    let rows: Vec<&Row> = rows.into_iter().collect();
    let mut first_tokens: BTreeMap<usize, &str> = BTreeMap::new();
    let mut tagged: BTreeSet<usize> = BTreeSet::new();
    let mut has_head: BTreeSet<usize> = BTreeSet::new();
    let mut is_head: BTreeSet<usize> = BTreeSet::new();
    let mut diagnostics = vec![];

    let mut open = false;
    for row in &rows {
        match row.tag {
            Tag::Outside => {
                open = false;
                if row.head != 0 {
                    diagnostics.push(Diagnostic::OutsideWithHead {
                        id: row.id,
                        text: row.form.clone(),
                        head: row.head,
                    });
                }
            }
            Tag::Span(position, _) => {
                tagged.insert(row.id);
                if position == Position::Begin || !open {
                    first_tokens.insert(row.id, &row.form);
                }
                if position == Position::Begin {
                    for (head, _) in row.edges() {
                        has_head.insert(row.id);
                        is_head.insert(head);
                    }
                }
                open = true;
            }
        }
    }

    for row in &rows {
        if row.tag.position() != Some(Position::Begin) {
            continue;
        }
        for (head, _) in row.edges() {
            if !first_tokens.contains_key(&head) {
                diagnostics.push(Diagnostic::EdgeToNonSpan {
                    child: row.id,
                    head,
                    head_is_tagged: tagged.contains(&head),
                });
            }
        }
    }

    for (&id, &text) in &first_tokens {
        if !has_head.contains(&id) && !is_head.contains(&id) {
            diagnostics.push(Diagnostic::DisconnectedNode {
                id,
                text: text.to_string(),
            });
        }
    }
    diagnostics
}

/// Parses `contents` and checks the resulting rows.
pub fn check_str(contents: &str) -> Result<Vec<Diagnostic>> {
    let rows = read_rows(&mut contents.as_bytes())?;
    Ok(check(rows.iter().map(|(_, row)| row)))
}

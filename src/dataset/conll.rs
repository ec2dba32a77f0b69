use std::io as std_io;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, ParseError};
use crate::io as mod_io;
use crate::lang::{Tag, Token};

static CONLL_FIELD_DELIMITER: char = '\t';
static CONLL_EMPTY_FIELD: &str = "_";
static CONLL_NUM_FIELDS: usize = 10;
static DEPS_PAIR_DELIMITER: char = '|';
static DEPS_LABEL_DELIMITER: char = ':';
static DEPS_LIST_OPEN: char = '[';
pub static ROOT_RELATION: &str = "root";

// one `(id, 'label')` item at the start of the remaining input, with its trailing separator.
static DEPS_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*\(\s*(\d+)\s*,\s*(?:'([^']*)'|"([^"]*)")\s*\)\s*(,|$)"#)
        .expect("valid dependency item pattern")
});

/// One token line of the tabular graph format.
///
/// `ID TEXT LEMMA UPOS TAG FEATS HEAD RELATION SECONDARY_DEPS MISC`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: usize,
    pub form: String,
    pub upos: String,
    pub tag: Tag,
    pub head: usize,
    pub relation: String,
    pub deps: Vec<(usize, String)>,
    pub misc: String,
}

impl Row {
    /// Primary edge followed by the secondary edges, one per head, without root edges.
    pub fn edges(&self) -> Vec<(usize, &str)> {
        let mut edges: Vec<(usize, &str)> = Vec::with_capacity(1 + self.deps.len());
        let primary = (self.head, self.relation.as_str());
        let secondary = self.deps.iter().map(|&(head, ref label)| (head, label.as_str()));
        for (head, label) in Some(primary).into_iter().chain(secondary) {
            if head != 0 && edges.iter().all(|&(h, _)| h != head) {
                edges.push((head, label));
            }
        }
        edges
    }

    pub fn to_token(&self) -> Token {
        Token::new(
            self.id,
            self.form.clone(),
            self.upos.clone(),
            self.misc.clone(),
        )
    }
}

#[inline]
fn parse_usize_field(field: &str, name: &str) -> Result<usize, ParseError> {
    field
        .parse::<usize>()
        .map_err(|e| ParseError::MalformedLine(format!("{} `{}`: {}", name, field, e)))
}

impl mod_io::FromLine for Row {
    type Err = ParseError;

    fn from_line(line: &str) -> Result<Row, Self::Err> {
        let line = line.trim_end_matches(|c| c == '\n' || c == '\r');
        let cols: Vec<&str> = line.split(CONLL_FIELD_DELIMITER).collect();
        if cols.len() != CONLL_NUM_FIELDS {
            return Err(ParseError::MalformedLine(format!(
                "expected {} fields, found {}",
                CONLL_NUM_FIELDS,
                cols.len()
            )));
        }
        Ok(Row {
            id: parse_usize_field(cols[0], "id")?,
            form: cols[1].to_string(),
            upos: cols[3].to_string(),
            tag: Tag::parse(cols[4])?,
            head: parse_usize_field(cols[6], "head")?,
            relation: cols[7].to_string(),
            deps: parse_dependency_list(cols[8])?,
            misc: cols[9].to_string(),
        })
    }
}

/// Parses the secondary-dependency column.
///
/// Accepts `_`, a bracketed list such as `[(29,'t'),(34,'d')]`, or the pipe-separated
/// `29:t|34:d` variant emitted by some graph parsers.
pub fn parse_dependency_list(field: &str) -> Result<Vec<(usize, String)>, ParseError> {
    let malformed = || ParseError::MalformedDependencyList(field.to_string());
    let value = field.trim();
    if value == CONLL_EMPTY_FIELD {
        return Ok(vec![]);
    }
    if value.starts_with(DEPS_LIST_OPEN) {
        let inner = value
            .strip_prefix(DEPS_LIST_OPEN)
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(malformed)?;
        let mut deps = vec![];
        let mut rest = inner;
        while !rest.trim().is_empty() {
            let caps = DEPS_ITEM.captures(rest).ok_or_else(malformed)?;
            let head = caps[1].parse::<usize>().map_err(|_| malformed())?;
            let label = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().to_string())
                .ok_or_else(malformed)?;
            deps.push((head, label));
            let consumed = caps.get(0).map_or(0, |m| m.end());
            rest = &rest[consumed..];
            // a trailing separator must be followed by another item
            if !caps[4].is_empty() && rest.trim().is_empty() {
                return Err(malformed());
            }
        }
        return Ok(deps);
    }
    value
        .split(DEPS_PAIR_DELIMITER)
        .map(|pair| {
            let mut parts = pair.splitn(2, DEPS_LABEL_DELIMITER);
            match (parts.next(), parts.next()) {
                (Some(head), Some(label)) if !label.is_empty() => head
                    .trim()
                    .parse::<usize>()
                    .map(|head| (head, label.to_string()))
                    .map_err(|_| malformed()),
                _ => Err(malformed()),
            }
        })
        .collect()
}

/// Renders `_` or `[(id,'label'),...]` without whitespace.
pub fn render_dependency_list<S: AsRef<str>>(deps: &[(usize, S)]) -> String {
    if deps.is_empty() {
        return CONLL_EMPTY_FIELD.to_string();
    }
    let items = deps
        .iter()
        .map(|&(head, ref label)| format!("({},'{}')", head, label.as_ref()))
        .collect::<Vec<String>>();
    format!("[{}]", items.join(","))
}

/// Renders one full output line.
pub fn render_line(
    token: &Token,
    tag: &Tag,
    head: usize,
    relation: &str,
    deps: &str,
) -> String {
    use crate::lang::Tokenized;

    [
        token.id().to_string().as_str(),
        token.form(),
        CONLL_EMPTY_FIELD,
        token.postag(),
        tag.to_string().as_str(),
        CONLL_EMPTY_FIELD,
        head.to_string().as_str(),
        relation,
        deps,
        token.misc(),
    ]
    .join("\t")
}

/// Reads every token row, skipping blank lines and `#` comments.
///
/// Each row is paired with its 1-based line number.
pub fn read_rows<R: std_io::BufRead>(reader: &mut R) -> Result<Vec<(usize, Row)>, Error> {
    use crate::io::FromLine;

    let mut rows = vec![];
    let mut line = String::new();
    let mut lineno = 0;
    loop {
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                lineno += 1;
                let line_trimmed = line.trim();
                if !line_trimmed.is_empty() && !line_trimmed.starts_with('#') {
                    let row = Row::from_line(&line).map_err(|e| Error::at_line(lineno, e))?;
                    rows.push((lineno, row));
                }
            }
            Err(ref e) if e.kind() == std_io::ErrorKind::Interrupted => {}
            Err(e) => return Err(Error::Io(e)),
        }
        line.clear();
    }
    Ok(rows)
}

#![allow(dead_code)]

use std::collections::BTreeSet;

use recipegraph::dataset::conll::Row;
use recipegraph::io::FromLine;

/// Joins the whitespace-separated columns of every non-empty line with tabs.
pub fn tabular(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.split_whitespace().collect::<Vec<&str>>().join("\t") + "\n")
        .collect()
}

pub fn tabular_lines(text: &str) -> Vec<String> {
    tabular(text).lines().map(str::to_string).collect()
}

/// A recipe annotated with four-way position markers and action subtypes.
pub static RECIPE: &str = r#"
1   Preheat  _  VERB   U-Ac   _  0  root  _          _
2   the      _  DET    O      _  0  root  _          _
3   oven     _  NOUN   U-T    _  1  d     _          _
4   to       _  ADP    O      _  0  root  _          _
5   350F     _  NUM    U-St   _  1  o     _          _
6   .        _  PUNCT  O      _  0  root  _          SpaceAfter=No
7   Mix      _  VERB   U-Ac2  _  0  root  _          _
8   ice      _  NOUN   B-F    _  7  t     _          _
9   cream    _  NOUN   L-F    _  0  root  _          _
10  and      _  CCONJ  O      _  0  root  _          _
11  sugar    _  NOUN   U-F    _  7  t     [(1,'o')]  _
12  in       _  ADP    O      _  0  root  _          _
13  a        _  DET    O      _  0  root  _          _
14  bowl     _  NOUN   U-T    _  7  d     _          _
"#;

/// [`RECIPE`] with positions and categories canonicalized.
pub static RECIPE_CANONICAL: &str = r#"
1   Preheat  _  VERB   B-A   _  0  root  _          _
2   the      _  DET    O     _  0  root  _          _
3   oven     _  NOUN   B-T   _  1  d     _          _
4   to       _  ADP    O     _  0  root  _          _
5   350F     _  NUM    B-St  _  1  o     _          _
6   .        _  PUNCT  O     _  0  root  _          SpaceAfter=No
7   Mix      _  VERB   B-A   _  0  root  _          _
8   ice      _  NOUN   B-F   _  7  t     _          _
9   cream    _  NOUN   I-F   _  0  root  _          _
10  and      _  CCONJ  O     _  0  root  _          _
11  sugar    _  NOUN   B-F   _  7  t     [(1,'o')]  _
12  in       _  ADP    O     _  0  root  _          _
13  a        _  DET    O     _  0  root  _          _
14  bowl     _  NOUN   B-T   _  7  d     _          _
"#;

/// [`RECIPE`] reduced to actions, foods and tools.
pub static RECIPE_FAT: &str = r#"
1   Preheat  _  VERB   B-A  _  0  root  _             _
2   the      _  DET    O    _  0  root  _             _
3   oven     _  NOUN   B-T  _  1  edge  _             _
4   to       _  ADP    O    _  0  root  _             _
5   350F     _  NUM    O    _  0  root  _             _
6   .        _  PUNCT  O    _  0  root  _             SpaceAfter=No
7   Mix      _  VERB   B-A  _  0  root  _             _
8   ice      _  NOUN   B-F  _  7  edge  _             _
9   cream    _  NOUN   I-F  _  0  root  _             _
10  and      _  CCONJ  O    _  0  root  _             _
11  sugar    _  NOUN   B-F  _  7  edge  [(1,'edge')]  _
12  in       _  ADP    O    _  0  root  _             _
13  a        _  DET    O    _  0  root  _             _
14  bowl     _  NOUN   B-T  _  7  edge  _             _
"#;

/// [`RECIPE`] reduced to actions.
pub static RECIPE_ACTION: &str = r#"
1   Preheat  _  VERB   B-A  _  0  root  _  _
2   the      _  DET    O    _  0  root  _  _
3   oven     _  NOUN   O    _  0  root  _  _
4   to       _  ADP    O    _  0  root  _  _
5   350F     _  NUM    O    _  0  root  _  _
6   .        _  PUNCT  O    _  0  root  _  SpaceAfter=No
7   Mix      _  VERB   B-A  _  0  root  _  _
8   ice      _  NOUN   O    _  0  root  _  _
9   cream    _  NOUN   O    _  0  root  _  _
10  and      _  CCONJ  O    _  0  root  _  _
11  sugar    _  NOUN   O    _  0  root  _  _
12  in       _  ADP    O    _  0  root  _  _
13  a        _  DET    O    _  0  root  _  _
14  bowl     _  NOUN   O    _  0  root  _  _
"#;

pub static PREHEAT: &str = r#"
1  Preheat  _  VERB  B-Ac  _  0  root  _  _
2  oven     _  NOUN  B-F   _  1  t     _  _
3  to       _  ADP   O     _  0  root  _  _
4  350F     _  NUM   B-T   _  1  o     _  _
"#;

pub static CHAIN: &str = r#"
1  First   _  ADV   O     _  0  root  _  _
2  ,       _  PUNCT O     _  0  root  _  _
3  let     _  VERB  O     _  0  root  _  _
4  the     _  DET   O     _  0  root  _  _
5  butter  _  NOUN  B-F   _  6  t     _  _
6  pan     _  NOUN  B-T   _  7  d     _  _
7  melt    _  VERB  B-Ac  _  0  root  _  _
"#;

/// Heads on tokens that are not the first of a span.
pub static INSIDE_HEADS: &str = r#"
1  Pour   _  VERB  B-Ac  _  0  root  _          _
2  green  _  ADJ   B-F   _  1  t     _          _
3  tea    _  NOUN  I-F   _  0  root  _          _
4  into   _  ADP   O     _  0  root  _          _
5  cups   _  NOUN  B-T   _  3  d     [(4,'x')]  _
"#;

/// Columns of a serialized line with the edges held as a set.
#[derive(Debug, PartialEq, Eq)]
pub struct Canonical {
    pub id: usize,
    pub form: String,
    pub upos: String,
    pub tag: String,
    pub edges: BTreeSet<(usize, String)>,
    pub misc: String,
}

pub fn canonical(line: &str) -> Canonical {
    let row = Row::from_line(line).unwrap();
    Canonical {
        id: row.id,
        form: row.form.clone(),
        upos: row.upos.clone(),
        tag: row.tag.to_string(),
        edges: row
            .edges()
            .into_iter()
            .map(|(head, relation)| (head, relation.to_string()))
            .collect(),
        misc: row.misc.clone(),
    }
}

/// Compares serialized lines, ignoring which of several heads became the primary one.
pub fn assert_same_lines<S1: AsRef<str>, S2: AsRef<str>>(actual: &[S1], expected: &[S2]) {
    assert_eq!(actual.len(), expected.len(), "number of lines");
    for (a, e) in actual.iter().zip(expected) {
        assert_eq!(canonical(a.as_ref()), canonical(e.as_ref()), "line `{}`", a.as_ref());
    }
}

use std::fmt;

use crate::lang::Tokenized;

/// Per-line sidecar of a recipe: kept for every token whether or not it belongs to a span.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    id: usize,
    form: String,
    postag: String,
    misc: String,
}

impl Token {
    pub fn new<S: Into<String>>(id: usize, form: S, postag: S, misc: S) -> Self {
        Token {
            id,
            form: form.into(),
            postag: postag.into(),
            misc: misc.into(),
        }
    }

    pub fn misc(&self) -> &str {
        &self.misc
    }
}

impl Tokenized for Token {
    fn id(&self) -> usize {
        self.id
    }

    fn form(&self) -> &str {
        &self.form
    }

    fn postag(&self) -> &str {
        &self.postag
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "id: {}, form: {}", self.id, self.form)
    }
}

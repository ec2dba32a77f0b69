use std::path::Path;

use crate::error::Result;
use crate::graph::{Loader, RecipeGraph};
use crate::io;

pub mod conll;

/// Loads a recipe graph from a file; the origin is the file stem.
pub fn load<P: AsRef<Path>>(path: P) -> Result<RecipeGraph> {
    load_with(path, &Loader::new())
}

pub fn load_with<P: AsRef<Path>>(path: P, loader: &Loader) -> Result<RecipeGraph> {
    let path = path.as_ref();
    let mut reader = io::open(path)?;
    let rows = conll::read_rows(&mut reader)?;
    loader.build(&rows, origin_of(path))
}

pub fn load_str<S: Into<String>>(contents: &str, origin: S) -> Result<RecipeGraph> {
    let rows = conll::read_rows(&mut contents.as_bytes())?;
    Loader::new().build(&rows, origin)
}

/// Recipe name of a graph file: its file name without extension.
pub fn origin_of<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

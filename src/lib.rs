#[macro_use]
extern crate slog;

pub mod app;
pub mod dataset;
pub mod error;
pub mod graph;
pub mod io;
pub mod lang;
pub mod logging;
pub mod utils;

pub use crate::dataset::{load, load_str};
pub use crate::error::{Error, ParseError, Result};
pub use crate::graph::{reduce, serialize, write_graph, Desired, Preset, RecipeGraph};

//! Batch reduction of recipe files.
//!
//! Every job loads one input once and writes one output per stage. A job either writes all of
//! its outputs or none of them; a failing job is logged and the batch moves on.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use slog::Logger;

use crate::dataset;
use crate::error::Error;
use crate::graph::{self, Desired, Preset, RecipeGraph};
use crate::io;

/// One rendition of a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// The graph as loaded, with categories and tags canonicalized.
    Full,
    /// The loaded graph with every non-action span untagged, for tagger training data.
    ActionTags,
    Preset(Preset),
    Custom(Desired),
}

impl Stage {
    /// Directory name of the stage below the output root.
    pub fn name(&self) -> &str {
        match *self {
            Stage::Full => "full",
            Stage::ActionTags => "action-tags",
            Stage::Preset(preset) => preset.name(),
            Stage::Custom(_) => "custom",
        }
    }

    /// Renders `graph` for this stage, reducing a copy when needed.
    pub fn render(&self, graph: &RecipeGraph, logger: &Logger) -> Vec<String> {
        let desired = match *self {
            Stage::Full => return graph::serialize(graph),
            Stage::ActionTags => return graph::serialize_action_tags(graph),
            Stage::Preset(preset) => preset.desired(),
            Stage::Custom(ref desired) => desired.clone(),
        };
        let mut reduced = graph.clone();
        let summary = graph::reduce(&mut reduced, &desired);
        debug!(logger, "reduced graph"; "stage" => self.name(), "kept" => summary.kept,
               "removed" => summary.removed, "added_edges" => summary.added_edges);
        graph::serialize(&reduced)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Stage::Full),
            "action-tags" => Ok(Stage::ActionTags),
            _ => s.parse::<Preset>().map(Stage::Preset).map_err(|_| {
                format!(
                    "unknown stage `{}` (expected `full`, `fat`, `action` or `action-tags`)",
                    s
                )
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Job {
    pub input: PathBuf,
    pub outputs: Vec<(Stage, PathBuf)>,
}

impl Job {
    pub fn new<P: Into<PathBuf>>(input: P) -> Self {
        Job {
            input: input.into(),
            outputs: vec![],
        }
    }

    pub fn output<P: Into<PathBuf>>(mut self, stage: Stage, path: P) -> Self {
        self.outputs.push((stage, path.into()));
        self
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// `1` when there was at least one job and none of them succeeded.
    pub fn exit_code(&self) -> i32 {
        if self.total() > 0 && self.succeeded.is_empty() {
            1
        } else {
            0
        }
    }
}

/// Runs every job in order.
pub fn run(jobs: &[Job], logger: &Logger) -> BatchReport {
    let mut report = BatchReport::default();
    for job in jobs {
        let logger = logger.new(o!("input" => job.input.display().to_string()));
        match run_job(job, &logger) {
            Ok(()) => {
                info!(logger, "done"; "outputs" => job.outputs.len());
                report.succeeded.push(job.input.clone());
            }
            Err(e) => {
                error!(logger, "failed: {}", e);
                report.failed.push((job.input.clone(), e.to_string()));
            }
        }
    }
    info!(logger, "batch finished";
          "succeeded" => report.succeeded.len(), "failed" => report.failed.len());
    report
}

fn run_job(job: &Job, logger: &Logger) -> Result<(), Error> {
    let loader = graph::Loader::with_logger(logger.clone());
    let graph = dataset::load_with(&job.input, &loader)?;
    debug!(logger, "loaded graph"; "spans" => graph.span_count(), "edges" => graph.edge_count());

    // render every stage before touching the filesystem
    let rendered: Vec<(&PathBuf, Vec<String>)> = job
        .outputs
        .iter()
        .map(|(stage, path)| (path, stage.render(&graph, logger)))
        .collect();
    for (path, lines) in rendered {
        io::write_lines(path, lines)?;
    }
    Ok(())
}

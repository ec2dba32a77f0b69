#[macro_use]
extern crate slog;

use std::error::Error;
use std::path::{Path, PathBuf};

use structopt::StructOpt;

use recipegraph::app::batch::{self, Job, Stage};
use recipegraph::app::{App, CommonArgs, Context};
use recipegraph::graph::{self, Desired};
use recipegraph::utils::path::mirror;

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(StructOpt, Debug)]
#[structopt(name = "recipegraph", about = "Reduce annotated recipe graphs")]
enum Command {
    /// Write reduced renditions of every recipe below INPUT_DIR
    #[structopt(name = "reduce")]
    Reduce {
        #[structopt(flatten)]
        common: CommonArgs,

        /// Directory searched recursively for recipe files
        #[structopt(name = "INPUT_DIR", parse(from_os_str))]
        input_dir: PathBuf,

        /// Root of the output tree; each stage gets its own subdirectory
        #[structopt(short = "o", long = "out-dir", parse(from_os_str))]
        out_dir: PathBuf,

        /// Stages to write: full, fat, action or action-tags
        #[structopt(short = "s", long = "stage")]
        stages: Vec<Stage>,

        /// Extra `custom` stage keeping these comma-separated labels, e.g. `A,F`
        #[structopt(short = "k", long = "keep")]
        keep: Option<String>,

        /// Extension of the recipe files
        #[structopt(long = "ext", default_value = "conllu")]
        ext: String,
    },
    /// Print annotation problems of every recipe below INPUT_DIR as JSON lines
    #[structopt(name = "check")]
    Check {
        #[structopt(flatten)]
        common: CommonArgs,

        #[structopt(name = "INPUT_DIR", parse(from_os_str))]
        input_dir: PathBuf,

        #[structopt(long = "ext", default_value = "conllu")]
        ext: String,
    },
}

impl Command {
    fn common(&self) -> CommonArgs {
        match *self {
            Command::Reduce { ref common, .. } | Command::Check { ref common, .. } => {
                common.clone()
            }
        }
    }
}

fn main() {
    let command = Command::from_args();
    let code = App::from_config(command.common())
        .main(move |context| execute(command, context))
        .run();
    std::process::exit(code);
}

fn execute(command: Command, context: Context) -> Result<(), BoxError> {
    match command {
        Command::Reduce {
            input_dir,
            out_dir,
            stages,
            keep,
            ext,
            ..
        } => {
            let mut stages = if stages.is_empty() {
                vec![Stage::Preset(graph::Preset::Fat), Stage::Preset(graph::Preset::Action)]
            } else {
                stages
            };
            if let Some(keep) = keep {
                let desired = Desired::from_labels(keep.split(',').filter(|s| !s.trim().is_empty()))?;
                stages.push(Stage::Custom(desired));
            }
            reduce_all(&input_dir, &out_dir, &stages, &ext, &context)
        }
        Command::Check { input_dir, ext, .. } => check_all(&input_dir, &ext, &context),
    }
}

fn discover(input_dir: &Path, ext: &str) -> Result<Vec<PathBuf>, BoxError> {
    let pattern = input_dir.join("**").join(format!("*.{}", ext));
    let pattern = pattern
        .to_str()
        .ok_or_else(|| format!("non UTF-8 path: {}", input_dir.display()))?;
    let mut paths = vec![];
    for entry in glob::glob(pattern)? {
        let path = entry?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn reduce_all(
    input_dir: &Path,
    out_dir: &Path,
    stages: &[Stage],
    ext: &str,
    context: &Context,
) -> Result<(), BoxError> {
    let inputs = discover(input_dir, ext)?;
    info!(context.logger, "found {} recipe files", inputs.len(); "dir" => input_dir.display().to_string());

    let mut jobs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let mut job = Job::new(input.clone());
        for stage in stages {
            let path = mirror(input_dir, &input, out_dir.join(stage.name()))
                .ok_or_else(|| format!("{} is outside {}", input.display(), input_dir.display()))?;
            job = job.output(stage.clone(), path);
        }
        jobs.push(job);
    }

    let report = batch::run(&jobs, &context.logger);
    if report.exit_code() != 0 {
        return Err(format!("all {} recipe files failed", report.total()).into());
    }
    Ok(())
}

fn check_all(input_dir: &Path, ext: &str, context: &Context) -> Result<(), BoxError> {
    for input in discover(input_dir, ext)? {
        let contents = std::fs::read_to_string(&input)?;
        let diagnostics = match graph::check_str(&contents) {
            Ok(diagnostics) => diagnostics,
            Err(e) => {
                error!(context.logger, "failed: {}", e; "input" => input.display().to_string());
                continue;
            }
        };
        for diagnostic in diagnostics {
            let mut value = serde_json::to_value(&diagnostic)?;
            value["file"] = serde_json::Value::String(input.display().to_string());
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}

use std::env;
use std::error::Error;
use std::fmt;

use chrono::{DateTime, Local};
use slog::Logger;
use structopt::StructOpt;

use crate::logging::{AppLogger, Config as LogConfig, Level};

pub mod batch;

#[derive(Debug)]
struct AppError {
    code: i32,
    error: Box<dyn Error + Send + Sync>,
}

impl AppError {
    pub fn new<E>(code: i32, error: E) -> AppError
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        AppError {
            code,
            error: error.into(),
        }
    }

    pub fn code(&self) -> i32 {
        self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (code: {})", self.error, self.code)
    }
}

/// Handed to the main function of an [`App`].
#[derive(Debug)]
pub struct Context {
    pub logger: Logger,
    pub accessid: String,
    pub accesstime: DateTime<Local>,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub logging: LogConfig,
}

type MainFn = Box<dyn FnOnce(Context) -> Result<(), Box<dyn Error + Send + Sync>>>;

/// Runs a main function with a configured logger and turns its result into an exit code.
pub struct App {
    config: Config,
    main_fn: Option<MainFn>,
}

impl App {
    pub fn new() -> Self {
        App::from_config(Config::default())
    }

    pub fn from_config<C: Into<Config>>(config: C) -> Self {
        App {
            config: config.into(),
            main_fn: None,
        }
    }

    pub fn main<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Context) -> Result<(), Box<dyn Error + Send + Sync>> + 'static,
    {
        self.main_fn = Some(Box::new(f));
        self
    }

    /// Returns the process exit code.
    pub fn run(mut self) -> i32 {
        let main_fn = match self.main_fn.take() {
            Some(f) => f,
            None => {
                eprintln!("`main` must be called before running");
                return 1;
            }
        };
        // the async drains flush when the logger is dropped at the end of this scope
        let logger = match AppLogger::new(self.config.logging.clone()) {
            Ok(logger) => logger,
            Err(e) => {
                eprintln!("{}", e);
                return 1;
            }
        };
        let context = Context {
            logger: logger.create(),
            accessid: logger.accessid().to_string(),
            accesstime: *logger.accesstime(),
        };
        debug!(
            logger.get_inner(),
            "args: {}",
            env::args().collect::<Vec<String>>().join(" ")
        );
        debug!(logger.get_inner(), "{:?}", self.config);

        let code = match main_fn(context).map_err(|e| AppError::new(1, e)) {
            Ok(()) => 0,
            Err(e) => {
                error!(logger.get_inner(), "{}", e);
                e.code()
            }
        };
        debug!(logger.get_inner(), "application finished (code: {})", code);
        code
    }
}

impl Default for App {
    fn default() -> Self {
        App::new()
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("App").field("config", &self.config).finish()
    }
}

/// Flags shared by every subcommand.
#[derive(StructOpt, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Activate debug mode
    #[structopt(short = "d", long = "debug")]
    pub debug: bool,

    /// Verbose mode (-v, -vv, etc.)
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    pub verbose: u8,

    /// Also write the log to a dated file in this directory
    #[structopt(long = "logdir")]
    pub logdir: Option<String>,
}

impl From<CommonArgs> for Config {
    fn from(c: CommonArgs) -> Config {
        let mut logging = LogConfig::default();
        logging.verbosity = match (c.debug, c.verbose) {
            (true, _) | (_, 2..=u8::MAX) => Level::Trace,
            (false, 1) => Level::Debug,
            (false, _) => Level::Info,
        };
        if let Some(dir) = c.logdir {
            logging.level = Level::Debug;
            logging.logdir = dir;
            logging.mkdir = true;
        }
        Config { logging }
    }
}

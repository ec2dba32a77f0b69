use std::fmt;
use std::fs::{File, OpenOptions};
use std::io as std_io;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use chrono::prelude::*;
pub use slog::FilterLevel as Level;
use slog::{
    Discard, Drain, Duplicate, Fuse, Level as LogLevel, LevelFilter, Logger, OwnedKV,
    SendSyncRefUnwindSafeKV,
};
use slog_async::Async;
use slog_term::{CompactFormat, Decorator, FullFormat, PlainDecorator, TermDecorator};
use thiserror::Error;

pub use self::app::AppLogger;

mod app;

#[derive(Debug)]
pub enum Stream {
    StdOut,
    StdErr,
    File(File),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Full,
    Compact,
}

type FilteredDrain = LevelFilter<Fuse<Async>>;

#[derive(Debug)]
pub struct LoggerBuilder {
    stream: Stream,
    level: Level,
    format: Format,
}

impl LoggerBuilder {
    pub fn new(stream: Stream) -> Self {
        LoggerBuilder {
            stream,
            level: Level::Debug,
            format: Format::Full,
        }
    }

    pub fn level(mut self, l: Level) -> Self {
        self.level = l;
        self
    }

    pub fn format(mut self, f: Format) -> Self {
        self.format = f;
        self
    }

    pub fn build<T>(self, values: OwnedKV<T>) -> Result<Logger, Error>
    where
        T: SendSyncRefUnwindSafeKV + 'static,
    {
        Ok(match self.build_drain()? {
            Some(drain) => Logger::root(drain.fuse(), values),
            None => Logger::root(Discard, values),
        })
    }

    fn build_drain(&self) -> Result<Option<FilteredDrain>, Error> {
        let level = match level_of(self.level) {
            Some(level) => level,
            None => return Ok(None),
        };
        let drain = match self.stream {
            Stream::StdOut => {
                self.build_drain_from_decorator(TermDecorator::new().stdout().build(), level)
            }
            Stream::StdErr => {
                self.build_drain_from_decorator(TermDecorator::new().stderr().build(), level)
            }
            Stream::File(ref f) => {
                self.build_drain_from_decorator(PlainDecorator::new(f.try_clone()?), level)
            }
            Stream::Null => return Ok(None),
        };
        Ok(Some(drain))
    }

    fn build_drain_from_decorator<D: Decorator + Send + 'static>(
        &self,
        decorator: D,
        level: LogLevel,
    ) -> FilteredDrain {
        let drain = match self.format {
            Format::Compact => {
                let drain = CompactFormat::new(decorator).use_local_timestamp().build();
                Async::new(drain.fuse()).build()
            }
            Format::Full => {
                let drain = FullFormat::new(decorator).use_local_timestamp().build();
                Async::new(drain.fuse()).build()
            }
        };
        LevelFilter::new(drain.fuse(), level)
    }

    /// Builds a logger writing to the streams of both builders.
    pub fn build_with<T>(self, other: LoggerBuilder, values: OwnedKV<T>) -> Result<Logger, Error>
    where
        T: SendSyncRefUnwindSafeKV + 'static,
    {
        Ok(match (self.build_drain()?, other.build_drain()?) {
            (Some(d1), Some(d2)) => Logger::root(Duplicate::new(d1, d2).fuse(), values),
            (Some(d1), None) => Logger::root(d1.fuse(), values),
            (None, Some(d2)) => Logger::root(d2.fuse(), values),
            (None, None) => Logger::root(Discard, values),
        })
    }
}

fn level_of(level: Level) -> Option<LogLevel> {
    match level {
        Level::Off => None,
        _ => LogLevel::from_usize(level.as_usize()),
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid option: {0}")]
    InvalidOption(String),
    #[error(transparent)]
    Io(#[from] std_io::Error),
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Level of the log file; `Off` disables the file.
    pub level: Level,
    /// Level of the terminal stream.
    pub verbosity: Level,
    pub logdir: String,
    pub mkdir: bool,
    /// strftime pattern for the file name.
    pub filename: String,
    /// `w` truncate, `a` append, `n` numbered new file.
    pub filemode: char,
    pub fileprefix: Option<String>,
    pub filesuffix: Option<String>,
    pub format: Format,
    pub use_stderr: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            level: Level::Off,
            verbosity: Level::Info,
            logdir: "./".to_string(),
            mkdir: false,
            filename: "%Y%m%d.log".to_string(),
            filemode: 'a',
            fileprefix: None,
            filesuffix: None,
            format: Format::Compact,
            use_stderr: true,
        }
    }
}

pub fn create_logger<C: Into<Config>>(config: C) -> Result<Logger, Error> {
    create_logger_with_kv_and_time(config, o!(), Local::now()).map(|(logger, _)| logger)
}

/// Builds the terminal and file loggers; returns the log file path when one is opened.
pub fn create_logger_with_kv_and_time<C: Into<Config>, T, Tz: TimeZone>(
    config: C,
    values: OwnedKV<T>,
    datetime: DateTime<Tz>,
) -> Result<(Logger, Option<PathBuf>), Error>
where
    T: SendSyncRefUnwindSafeKV + 'static,
    Tz::Offset: fmt::Display,
{
    let c = config.into();
    let (fstream, filepath) = match c.level {
        Level::Off => (Stream::Null, None),
        _ => {
            let mut options = OpenOptions::new();
            options.create(true).write(true);
            let mut enable_numbering = false;
            match c.filemode {
                'w' => {
                    options.truncate(true);
                }
                'a' => {
                    options.append(true);
                }
                'n' => {
                    options.truncate(true);
                    enable_numbering = true;
                }
                mode => {
                    return Err(Error::InvalidOption(format!("filemode `{}`", mode)));
                }
            }
            let path = resolve_filepath(
                &c.logdir,
                &c.filename,
                c.fileprefix.as_deref(),
                c.filesuffix.as_deref(),
                datetime,
                c.mkdir,
                enable_numbering,
            )?;
            let file = options.open(&path)?;
            (Stream::File(file), Some(path))
        }
    };

    let vstream = if c.use_stderr {
        Stream::StdErr
    } else {
        Stream::StdOut
    };
    let logger = LoggerBuilder::new(vstream)
        .level(c.verbosity)
        .format(c.format)
        .build_with(
            LoggerBuilder::new(fstream).level(c.level).format(c.format),
            values,
        )?;
    Ok((logger, filepath))
}

fn resolve_filepath<P1: AsRef<Path>, P2: AsRef<Path>, Tz: TimeZone>(
    dir: P1,
    filename: P2,
    prefix: Option<&str>,
    suffix: Option<&str>,
    time: DateTime<Tz>,
    mkdir: bool,
    numbering: bool,
) -> Result<PathBuf, std_io::Error>
where
    Tz::Offset: fmt::Display,
{
    let dir = crate::utils::path::expandtilde(dir);
    if dir.is_dir() {
        // pass
    } else if mkdir {
        crate::io::ensure_dir(&dir)?;
    } else {
        return Err(std_io::Error::new(
            std_io::ErrorKind::NotFound,
            format!("`{}` is not a directory", dir.display()),
        ));
    }

    let filename = filename.as_ref();
    if filename.to_string_lossy().contains(MAIN_SEPARATOR) {
        return Err(std_io::Error::new(
            std_io::ErrorKind::InvalidInput,
            "filename must not contain the separator",
        ));
    }

    let stem = filename
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| std_io::Error::new(std_io::ErrorKind::InvalidInput, "invalid filename"))?;
    let stem = format!(
        "{}{}{}",
        prefix.unwrap_or(""),
        time.format(stem),
        suffix.unwrap_or("")
    );
    let ext = filename
        .extension()
        .map(|s| format!(".{}", s.to_string_lossy()))
        .unwrap_or_default();

    if numbering {
        let mut number = 0;
        loop {
            let path = dir.join(format!("{}-{}{}", stem, number, ext));
            if !path.exists() {
                return Ok(path);
            }
            number += 1;
        }
    } else {
        Ok(dir.join(format!("{}{}", stem, ext)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_filepath() {
        let dir = tempfile::tempdir().unwrap();
        let time = Utc.with_ymd_and_hms(2023, 1, 31, 12, 0, 0).unwrap();
        let path = resolve_filepath(
            dir.path(),
            "%Y%m%d.log",
            Some("reduce-"),
            None,
            time,
            false,
            false,
        )
        .unwrap();
        assert_eq!(path, dir.path().join("reduce-20230131.log"));

        File::create(dir.path().join("20230131-0.log")).unwrap();
        let path =
            resolve_filepath(dir.path(), "%Y%m%d.log", None, None, time, false, true).unwrap();
        assert_eq!(path, dir.path().join("20230131-1.log"));
    }

    #[test]
    fn test_resolve_filepath_errors() {
        let dir = tempfile::tempdir().unwrap();
        let time = Utc.with_ymd_and_hms(2023, 1, 31, 12, 0, 0).unwrap();
        let missing = dir.path().join("missing");
        assert!(resolve_filepath(&missing, "x.log", None, None, time, false, false).is_err());
        assert!(resolve_filepath(&missing, "x.log", None, None, time, true, false).is_ok());
        assert!(missing.is_dir());
        let nested = format!("a{}b.log", MAIN_SEPARATOR);
        assert!(resolve_filepath(dir.path(), nested, None, None, time, false, false).is_err());
    }

    #[test]
    fn test_file_logger() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            level: Level::Debug,
            verbosity: Level::Off,
            logdir: dir.path().to_string_lossy().into_owned(),
            filename: "test.log".to_string(),
            filemode: 'w',
            ..Config::default()
        };
        let (logger, path) = create_logger_with_kv_and_time(config, o!(), Local::now()).unwrap();
        info!(logger, "written");
        drop(logger);
        assert_eq!(path, Some(dir.path().join("test.log")));
    }

    #[test]
    fn test_invalid_filemode() {
        let config = Config {
            level: Level::Info,
            filemode: 'x',
            ..Config::default()
        };
        assert!(matches!(
            create_logger(config),
            Err(Error::InvalidOption(_))
        ));
    }
}

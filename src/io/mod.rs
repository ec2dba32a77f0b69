use std::error;
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::Path;

use tempfile::NamedTempFile;

pub trait FromLine: Sized {
    type Err: Into<Box<dyn error::Error + Send + Sync>>;

    fn from_line(line: &str) -> Result<Self, Self::Err>;
}

pub fn open<P: AsRef<Path>>(path: P) -> io::Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

/// Creates `dir` and its parents; a directory that already exists counts as success.
pub fn ensure_dir<P: AsRef<Path>>(dir: P) -> io::Result<()> {
    let dir = dir.as_ref();
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(ref e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}

/// Writes `lines` to `path` through a temporary file in the same directory.
///
/// The target only appears once every line has been written and flushed.
pub fn write_lines<P, I, S>(path: P, lines: I) -> io::Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir(dir)?;
    let mut tmpfile = NamedTempFile::new_in(dir)?;
    {
        let mut writer = io::BufWriter::new(tmpfile.as_file_mut());
        for line in lines {
            writer.write_all(line.as_ref().as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
    }
    tmpfile.persist(path).map_err(|e| e.error)?;
    Ok(())
}

use std::env;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Expands a leading `~` to `$HOME`. `~user` forms are returned unchanged.
pub fn expandtilde<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    let path_str = match path.to_str() {
        Some(s) if s.starts_with('~') => s,
        _ => return path.to_path_buf(),
    };
    let i = path_str.find(MAIN_SEPARATOR).unwrap_or_else(|| path_str.len());
    if i != 1 {
        return path.to_path_buf();
    }
    match env::var_os("HOME") {
        Some(home) => {
            let mut home = PathBuf::from(home);
            if i < path_str.len() - 1 {
                home.push(&path_str[i + 1..]);
            }
            home
        }
        None => path.to_path_buf(),
    }
}

/// Maps `input`, located below `root`, to the same relative location below `out_dir`.
///
/// Returns `None` when `input` is not inside `root`.
pub fn mirror<P1, P2, P3>(root: P1, input: P2, out_dir: P3) -> Option<PathBuf>
where
    P1: AsRef<Path>,
    P2: AsRef<Path>,
    P3: AsRef<Path>,
{
    input
        .as_ref()
        .strip_prefix(root.as_ref())
        .ok()
        .filter(|relative| !relative.as_os_str().is_empty())
        .map(|relative| out_dir.as_ref().join(relative))
}

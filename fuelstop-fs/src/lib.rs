//! Capability-scoped file helpers shared by the Fuelstop crates.
//!
//! Paths arrive from the command line as UTF-8 strings. Each helper opens the
//! containing directory with ambient authority once and then works relative
//! to that handle.
#![forbid(unsafe_code)]

use std::io::{self, Write};
use std::path::Component;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// A directory handle paired with the name of an entry inside it.
#[derive(Debug)]
pub struct DirEntryTarget {
    /// Directory containing the entry.
    pub dir: fs_utf8::Dir,
    /// Final path component.
    pub file_name: String,
}

/// Open the parent directory of `path` and return it with the file name.
pub fn split_target(path: &Utf8Path) -> io::Result<DirEntryTarget> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok(DirEntryTarget { dir, file_name })
}

/// Open an existing file for reading.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Whether `path` exists and is a regular file.
///
/// Missing parents surface as `NotFound` errors rather than `false`.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let target = split_target(path)?;
    target
        .dir
        .metadata(target.file_name.as_str())
        .map(|meta| meta.is_file())
}

/// Create (or truncate) `path`, creating missing parent directories first.
pub fn create_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    ensure_parent_dir(path)?;
    let target = split_target(path)?;
    target.dir.create(target.file_name.as_str())
}

/// Replace the contents of `path` with `contents`.
pub fn write_utf8_file(path: &Utf8Path, contents: &str) -> io::Result<()> {
    let mut file = create_utf8_file(path)?;
    file.write_all(contents.as_bytes())?;
    file.flush()
}

/// Create the parent directory chain of `path` if it is missing.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (root, relative) = anchor_path(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    root.create_dir_all(&relative)
}

/// Split `path` into an ambient anchor directory and the remainder below it.
///
/// Absolute paths are anchored at their root (or Windows prefix); relative
/// paths at the current directory.
fn anchor_path(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_path = path.as_std_path();
    let anchor = match std_path.components().next() {
        Some(Component::Prefix(prefix)) => {
            let prefix = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            Utf8PathBuf::from(prefix).join(std::path::MAIN_SEPARATOR.to_string())
        }
        Some(Component::RootDir) => Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string()),
        _ => Utf8PathBuf::from("."),
    };

    let relative = if anchor == Utf8Path::new(".") {
        path.to_path_buf()
    } else {
        path.strip_prefix(&anchor)
            .map_err(|_| io::Error::other(format!("failed to strip {anchor} from {path}")))?
            .to_path_buf()
    };
    let dir = fs_utf8::Dir::open_ambient_dir(&anchor, ambient_authority())?;
    Ok((dir, relative))
}

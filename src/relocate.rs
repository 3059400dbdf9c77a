//! Moving dropped files into the target directory.
//!
//! The destination keeps the source's file name. On a collision `_1`, `_2`, …
//! is inserted before the extension until a free name is found. The check
//! and the move are not atomic: a concurrent writer can take the chosen name
//! in between, in which case the move replaces that file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::RelocationError;

/// Move `source` into `into`, returning the destination path.
pub fn relocate(source: &Path, into: &Path) -> Result<PathBuf, RelocationError> {
    if !source.exists() {
        return Err(RelocationError::MissingSource(source.to_path_buf()));
    }
    let file_name = source
        .file_name()
        .ok_or_else(|| RelocationError::InvalidSource(source.to_path_buf()))?;

    fs::create_dir_all(into).map_err(|e| RelocationError::CreateDirectory {
        path: into.to_path_buf(),
        source: e,
    })?;

    let natural = into.join(file_name);
    if is_same_file(source, &natural) {
        debug!(path = %source.display(), "File already in target directory");
        return Ok(natural);
    }

    let destination = unique_destination(into, &file_name.to_string_lossy());
    move_file(source, &destination).map_err(|e| RelocationError::Move {
        from: source.to_path_buf(),
        to: destination.clone(),
        source: e,
    })?;

    info!(
        from = %source.display(),
        to = %destination.display(),
        "Relocated dropped file"
    );
    Ok(destination)
}

/// First unused path for `file_name` inside `dir`.
pub fn unique_destination(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !is_taken(&candidate) {
        return candidate;
    }
    let (stem, extension) = split_extension(file_name);
    (1u64..)
        .map(|n| dir.join(format!("{stem}_{n}{extension}")))
        .find(|p| !is_taken(p))
        .unwrap_or(candidate)
}

/// Any directory entry counts, including a symlink whose target is gone.
fn is_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Splits `name` into stem and extension (with its dot).
///
/// A leading dot does not start an extension, so `.env` has none.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if i > 0 => name.split_at(i),
        _ => (name, ""),
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Rename, falling back to copy + delete across filesystems.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if fs::symlink_metadata(from).is_err() {
                return Err(rename_err);
            }
            warn!(error = %rename_err, "Rename failed, copying instead");
            copy_then_remove(from, to)
        }
    }
}

/// Copies `from` to `to` (recursively for directories), then deletes `from`.
///
/// `to` must not exist. A failed copy leaves no partial `to` behind. If
/// deleting a file source fails the copy is removed again; a directory copy
/// is always kept.
fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    if is_taken(to) {
        return Err(io::Error::from(io::ErrorKind::AlreadyExists));
    }
    if let Err(e) = copy_entry(from, to) {
        remove_entry(to);
        return Err(e);
    }
    let is_dir = fs::symlink_metadata(from)?.is_dir();
    let removed = if is_dir {
        fs::remove_dir_all(from)
    } else {
        fs::remove_file(from)
    };
    if let Err(e) = removed {
        if !is_dir {
            remove_entry(to);
        }
        return Err(e);
    }
    Ok(())
}

fn copy_entry(from: &Path, to: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(from)?;
    let file_type = metadata.file_type();

    if file_type.is_symlink() {
        return copy_symlink(from, to);
    }

    if file_type.is_dir() {
        fs::create_dir(to)?;
        for entry in fs::read_dir(from)? {
            let entry = entry?;
            copy_entry(&entry.path(), &to.join(entry.file_name()))?;
        }
        fs::set_permissions(to, metadata.permissions())
    } else {
        fs::copy(from, to).map(|_| ())
    }
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(from)?, to)
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to).map(|_| ())
}

/// Best-effort removal of whatever sits at `path`.
fn remove_entry(path: &Path) {
    let Ok(metadata) = fs::symlink_metadata(path) else {
        return;
    };
    let removed = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    if let Err(e) = removed {
        warn!(path = %path.display(), error = %e, "Could not clean up partial copy");
    }
}

//! Placement of a single ingest file: delete it, skip it, or move it into the
//! content-addressed destination tree.

use crate::category::{Category, Classification, Classifier, extension};
use crate::error::{Error, Result};
use crate::hash::{Algorithm, Digest};
use crate::index::SeenDigestIndex;
use crate::layout::DestinationLayout;
use log::warn;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// One ingest file on its way through placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path of the file in the ingest tree.
    pub path: PathBuf,
    /// Text after the last `.` of the name, case preserved.
    pub extension: Option<String>,
    /// Outcome of classification.
    pub classification: Classification,
}

impl FileRecord {
    /// Classify `path` and capture its extension.
    pub fn new(path: impl Into<PathBuf>, classifier: &Classifier) -> Self {
        let path = path.into();
        let classification = classifier.classify(&path);
        let extension = extension(&path).map(str::to_string);
        Self {
            path,
            extension,
            classification,
        }
    }

    /// File name the content will carry in the destination: `{digest}.{ext}`.
    pub fn stored_name(&self, digest: &Digest) -> String {
        match &self.extension {
            Some(ext) => format!("{}.{}", digest, ext),
            None => digest.to_hex(),
        }
    }
}

/// Why a file was deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteReason {
    /// OS metadata file.
    Sentinel,
    /// Content already resident in the destination.
    Duplicate(Digest),
}

/// Why a file was left where it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Extension not in the category table.
    UnknownCategory,
    /// The file could not be read for hashing.
    HashFailed(String),
}

/// Terminal state of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Moved into the destination tree.
    Placed {
        category: Category,
        digest: Digest,
        destination: PathBuf,
    },
    /// Removed from the ingest tree.
    Deleted(DeleteReason),
    /// Left untouched.
    Skipped(SkipReason),
}

/// Place one file.
///
/// Sentinels are deleted before any hashing. A digest already in `index` means
/// the file is a duplicate and is deleted. Otherwise the digest is claimed in
/// `index` before anything moves, so a later copy of the same content within
/// this run is always treated as a duplicate, even if this move fails.
///
/// A file that cannot be hashed is never deleted.
pub fn place(
    record: &FileRecord,
    algorithm: Algorithm,
    index: &mut SeenDigestIndex,
    layout: &mut DestinationLayout,
) -> Result<Outcome> {
    let category = match record.classification {
        Classification::Sentinel => {
            fs::remove_file(&record.path)
                .map_err(|e| Error::placement(&record.path, "delete", e.to_string()))?;
            return Ok(Outcome::Deleted(DeleteReason::Sentinel));
        }
        Classification::Unknown => return Ok(Outcome::Skipped(SkipReason::UnknownCategory)),
        Classification::Known(category) => category,
    };

    let digest = match Digest::of_file(&record.path, algorithm) {
        Ok(digest) => digest,
        Err(e) => return Ok(Outcome::Skipped(SkipReason::HashFailed(e.to_string()))),
    };

    if index.contains(&digest) {
        fs::remove_file(&record.path)
            .map_err(|e| Error::placement(&record.path, "delete", e.to_string()))?;
        return Ok(Outcome::Deleted(DeleteReason::Duplicate(digest)));
    }

    index.insert(digest);

    let dest_dir = layout.ensure_category_dir(category)?;
    let destination = move_into(&record.path, &record.stored_name(&digest), &dest_dir)?;

    Ok(Outcome::Placed {
        category,
        digest,
        destination,
    })
}

/// Rename `source` to `name` in its own directory, then move it into `dest_dir`.
///
/// Never overwrites. On failure the file stays wherever it last got to.
fn move_into(source: &Path, name: &str, dest_dir: &Path) -> Result<PathBuf> {
    let parent = source
        .parent()
        .ok_or_else(|| Error::placement(source, "sanitize", "path has no parent directory"))?;

    let staged = parent.join(name);
    if staged != source {
        if staged.symlink_metadata().is_ok() {
            return Err(Error::placement(
                source,
                "sanitize",
                format!("{} already exists", staged.display()),
            ));
        }
        fs::rename(source, &staged)
            .map_err(|e| Error::placement(source, "sanitize", e.to_string()))?;
    }

    let target = dest_dir.join(name);
    if target.symlink_metadata().is_ok() {
        return Err(Error::placement(
            &staged,
            "move",
            format!("{} already exists", target.display()),
        ));
    }

    match fs::rename(&staged, &target) {
        Ok(()) => Ok(target),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            copy_then_remove(&staged, dest_dir, &target)?;
            Ok(target)
        }
        Err(e) => Err(Error::placement(&staged, "move", e.to_string())),
    }
}

/// Cross-filesystem move: copy through a temp file in `dest_dir`, check the
/// length, publish under `target` without clobbering, then drop the source.
fn copy_then_remove(source: &Path, dest_dir: &Path, target: &Path) -> Result<()> {
    let copy_err = |e: io::Error| Error::placement(source, "copy", e.to_string());

    let mut input = fs::File::open(source).map_err(copy_err)?;
    let expected = input.metadata().map_err(copy_err)?.len();

    let mut temp_file = tempfile::NamedTempFile::new_in(dest_dir).map_err(copy_err)?;
    let copied = io::copy(&mut input, temp_file.as_file_mut()).map_err(copy_err)?;
    temp_file.as_file().sync_all().map_err(copy_err)?;

    if copied != expected {
        return Err(Error::placement(
            source,
            "copy",
            format!("short copy: {} of {} bytes", copied, expected),
        ));
    }

    temp_file
        .persist_noclobber(target)
        .map_err(|e| copy_err(e.error))?;

    if let Err(e) = fs::remove_file(source) {
        warn!(
            "Copied {} to {} but could not remove the source: {}",
            source.display(),
            target.display(),
            e
        );
    }
    Ok(())
}

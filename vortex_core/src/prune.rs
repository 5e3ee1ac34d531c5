//! Removal of directories emptied by placement.

use crate::category::Classifier;
use crate::error::{Error, Result};
use log::info;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What happened to a directory handed to the pruner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneOutcome {
    /// Removed, along with this many sentinel files inside it.
    Removed { sentinels_deleted: usize },
    /// Still holds something other than sentinels.
    NotEmpty,
    /// Protected root, left in place.
    Protected,
}

/// Deletes directories that hold nothing but sentinel files.
#[derive(Debug, Clone)]
pub struct Pruner {
    classifier: Classifier,
    protected: Vec<PathBuf>,
}

impl Pruner {
    /// Create a pruner that never removes any of `protected`.
    pub fn new(classifier: Classifier, protected: Vec<PathBuf>) -> Self {
        Self {
            classifier,
            protected,
        }
    }

    /// Whether `dir` is one of the protected roots.
    pub fn is_protected(&self, dir: &Path) -> bool {
        self.protected.iter().any(|p| p == dir)
    }

    /// Remove `dir` if it is empty apart from sentinel files.
    ///
    /// A symlinked directory is unlinked, never emptied; its target is left
    /// untouched. Protected directories are never removed.
    pub fn prune_if_empty(&self, dir: &Path) -> Result<PruneOutcome> {
        if self.is_protected(dir) {
            return Ok(PruneOutcome::Protected);
        }

        let sentinels = match self.sentinel_entries(dir)? {
            Some(sentinels) => sentinels,
            None => return Ok(PruneOutcome::NotEmpty),
        };

        let is_link = fs::symlink_metadata(dir)
            .map_err(|e| Error::prune(dir, e))?
            .file_type()
            .is_symlink();
        if is_link {
            remove_dir_link(dir).map_err(|e| Error::prune(dir, e))?;
            return Ok(PruneOutcome::Removed {
                sentinels_deleted: 0,
            });
        }

        for sentinel in &sentinels {
            fs::remove_file(sentinel).map_err(|e| Error::prune(dir, e))?;
            info!("Deleted sentinel file: {}", sentinel.display());
        }
        fs::remove_dir(dir).map_err(|e| Error::prune(dir, e))?;

        Ok(PruneOutcome::Removed {
            sentinels_deleted: sentinels.len(),
        })
    }

    /// Sentinel files in `dir`, or `None` if anything else is present.
    fn sentinel_entries(&self, dir: &Path) -> Result<Option<Vec<PathBuf>>> {
        let mut sentinels = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| Error::prune(dir, e))? {
            let entry = entry.map_err(|e| Error::prune(dir, e))?;
            let is_dir = entry
                .file_type()
                .map_err(|e| Error::prune(dir, e))?
                .is_dir();
            let is_sentinel = entry
                .file_name()
                .to_str()
                .is_some_and(|n| self.classifier.is_sentinel_name(n));

            if is_sentinel && !is_dir {
                sentinels.push(entry.path());
            } else {
                return Ok(None);
            }
        }
        Ok(Some(sentinels))
    }
}

/// Remove a symbolic link that points at a directory.
#[cfg(windows)]
fn remove_dir_link(path: &Path) -> io::Result<()> {
    // Directory symlinks and junctions are directory entries on Windows
    fs::remove_dir(path)
}

/// Remove a symbolic link that points at a directory.
#[cfg(not(windows))]
fn remove_dir_link(path: &Path) -> io::Result<()> {
    fs::remove_file(path)
}

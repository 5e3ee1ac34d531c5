//! Seen-digest index built from the destination tree.

use crate::category::Classifier;
use crate::error::{Error, Result};
use crate::hash::{Algorithm, Digest};
use log::{debug, info, trace, warn};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Counters gathered while scanning the destination tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexSummary {
    /// Regular files hashed and inserted.
    pub files_hashed: usize,
    /// Files that could not be hashed and were skipped.
    pub hash_failures: usize,
    /// Sentinel files deleted from the destination.
    pub sentinels_deleted: usize,
    /// Files whose content was already indexed from another resident file.
    pub resident_duplicates: usize,
    /// Entries the walk could not read, such as locked subdirectories.
    pub unreadable_entries: usize,
}

/// Set of digests whose content is already resident in the destination.
///
/// Only grows during a run. Insertion is reserved to placement.
#[derive(Debug, Default)]
pub struct SeenDigestIndex {
    digests: HashSet<Digest>,
    summary: IndexSummary,
}

impl SeenDigestIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `root` recursively and hash every regular file under it.
    ///
    /// Symbolic links are neither hashed nor followed. Sentinel files are
    /// deleted on sight. A file that cannot be hashed is logged and skipped;
    /// an unreadable `root` is fatal.
    pub fn build(root: &Path, algorithm: Algorithm, classifier: &Classifier) -> Result<Self> {
        fs::read_dir(root).map_err(|e| Error::directory_unreadable(root, e))?;

        let mut index = Self::new();

        let walker = ignore::WalkBuilder::new(root)
            .standard_filters(false) // Every file counts, hidden or ignored
            .follow_links(false)
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable destination entry: {}", e);
                    index.summary.unreadable_entries += 1;
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let is_file = entry.file_type().is_some_and(|t| t.is_file());
            if !is_file {
                continue;
            }

            let path = entry.path();
            if classifier.is_sentinel(path) {
                match fs::remove_file(path) {
                    Ok(()) => {
                        info!("Deleted sentinel file: {}", path.display());
                        index.summary.sentinels_deleted += 1;
                    }
                    Err(e) => warn!("Failed to delete sentinel file {}: {}", path.display(), e),
                }
                continue;
            }

            match Digest::of_file(path, algorithm) {
                Ok(digest) => {
                    trace!("Indexed {} {}", digest, path.display());
                    index.summary.files_hashed += 1;
                    if !index.digests.insert(digest) {
                        warn!(
                            "Destination already holds content {}: {}",
                            digest,
                            path.display()
                        );
                        index.summary.resident_duplicates += 1;
                    }
                }
                Err(e) => {
                    warn!("Error hashing file {}: {}", path.display(), e);
                    index.summary.hash_failures += 1;
                }
            }
        }

        debug!(
            "Indexed {} digests under {}",
            index.digests.len(),
            root.display()
        );
        Ok(index)
    }

    /// Whether content with this digest is already resident.
    pub fn contains(&self, digest: &Digest) -> bool {
        self.digests.contains(digest)
    }

    /// Claim a digest. Returns `false` if it was already present.
    pub(crate) fn insert(&mut self, digest: Digest) -> bool {
        self.digests.insert(digest)
    }

    /// Number of distinct digests.
    pub fn len(&self) -> usize {
        self.digests.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    /// Counters from the initial scan.
    pub fn summary(&self) -> IndexSummary {
        self.summary
    }
}

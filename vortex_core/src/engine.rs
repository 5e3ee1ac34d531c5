//! Top-level orchestration: index the destination, then sort the ingest tree.

use crate::category::Classifier;
use crate::error::{Error, Result};
use crate::hash::Algorithm;
use crate::index::SeenDigestIndex;
use crate::layout::DestinationLayout;
use crate::prune::Pruner;
use crate::walk::Traversal;
use log::{debug, info};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Settings for one run.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Digest algorithm used for both the index and new placements.
    pub algorithm: Algorithm,
    /// Extension table plus sentinel names.
    pub classifier: Classifier,
    /// Leave the ingest root in place even when it ends up empty.
    pub keep_ingest_root: bool,
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Distinct digests found in the destination before the run.
    pub indexed: usize,
    /// Files moved into the destination.
    pub placed: usize,
    /// Files deleted because their content was already resident.
    pub duplicates_deleted: usize,
    /// Sentinel files deleted, in ingest or destination.
    pub sentinels_deleted: usize,
    /// Files left in place because their type is not recognized.
    pub unknown_skipped: usize,
    /// Symbolic links and special files left in place.
    pub other_skipped: usize,
    /// Files left in place because they could not be hashed.
    pub hash_failures: usize,
    /// Recoverable errors: unreadable entries, directory creation, move,
    /// copy, prune.
    pub errors: usize,
    /// Directories removed after being emptied.
    pub directories_pruned: usize,
}

/// Owns the seen-digest index and destination layout for one invocation.
#[derive(Debug)]
pub struct Engine {
    options: Options,
    index: SeenDigestIndex,
    layout: DestinationLayout,
    report: RunReport,
}

impl Engine {
    /// Prepare the destination root and index everything already in it.
    ///
    /// A missing destination root is created. An existing but unreadable one
    /// is fatal.
    pub fn open<P: AsRef<Path>>(destination: P, options: Options) -> Result<Self> {
        let destination = destination.as_ref();

        fs::create_dir_all(destination).map_err(|e| Error::directory_unreadable(destination, e))?;
        let root = fs::canonicalize(destination)
            .map_err(|e| Error::directory_unreadable(destination, e))?;

        let index = SeenDigestIndex::build(&root, options.algorithm, &options.classifier)?;
        let summary = index.summary();
        info!(
            "Indexed {} files ({} distinct, {} resident duplicates) under {}",
            summary.files_hashed,
            index.len(),
            summary.resident_duplicates,
            root.display()
        );
        debug!("Sentinel names: {}", options.classifier.sentinels().join(", "));

        let report = RunReport {
            indexed: index.len(),
            sentinels_deleted: summary.sentinels_deleted,
            hash_failures: summary.hash_failures,
            errors: summary.unreadable_entries,
            ..RunReport::default()
        };

        Ok(Self {
            options,
            index,
            layout: DestinationLayout::new(root),
            report,
        })
    }

    /// Sort everything under `ingest` into the destination.
    ///
    /// Per-file problems are counted in the report and do not stop the walk.
    pub fn run<P: AsRef<Path>>(&mut self, ingest: P) -> Result<RunReport> {
        let ingest = ingest.as_ref();
        let root = fs::canonicalize(ingest).map_err(|e| Error::directory_unreadable(ingest, e))?;
        fs::read_dir(&root).map_err(|e| Error::directory_unreadable(&root, e))?;
        check_roots(&root, self.layout.root())?;

        let mut protected = vec![self.layout.root().to_path_buf()];
        if self.options.keep_ingest_root {
            protected.push(root.clone());
        }
        let pruner = Pruner::new(self.options.classifier.clone(), protected);

        debug!(
            "Sorting {} into {}",
            root.display(),
            self.layout.root().display()
        );
        Traversal::new(
            &self.options,
            &mut self.index,
            &mut self.layout,
            pruner,
            &mut self.report,
        )
        .visit_dir(&root);

        Ok(self.report.clone())
    }

    /// The seen-digest index.
    pub fn index(&self) -> &SeenDigestIndex {
        &self.index
    }

    /// Counters so far.
    pub fn report(&self) -> &RunReport {
        &self.report
    }
}

/// Refuse an ingest root that is, or lies inside, the destination root.
///
/// Every file there is already indexed and would be deleted as its own
/// duplicate. Both paths must be canonical.
pub fn check_roots(ingest: &Path, destination: &Path) -> Result<()> {
    if ingest.starts_with(destination) {
        return Err(Error::invalid_argument(format!(
            "ingest root {} is inside destination root {}",
            ingest.display(),
            destination.display()
        )));
    }
    Ok(())
}

/// Index `destination`, then sort `ingest` into it.
pub fn run(ingest: &Path, destination: &Path, options: Options) -> Result<RunReport> {
    // Fail on a bad ingest root before touching the destination
    let ingest_root =
        fs::canonicalize(ingest).map_err(|e| Error::directory_unreadable(ingest, e))?;
    if let Ok(dest_root) = fs::canonicalize(destination) {
        check_roots(&ingest_root, &dest_root)?;
    }

    let mut engine = Engine::open(destination, options)?;
    engine.run(ingest_root)
}

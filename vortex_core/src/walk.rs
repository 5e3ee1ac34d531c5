//! Depth-first walk of the ingest tree.

use crate::engine::{Options, RunReport};
use crate::index::SeenDigestIndex;
use crate::layout::DestinationLayout;
use crate::place::{DeleteReason, FileRecord, Outcome, SkipReason, place};
use crate::prune::{PruneOutcome, Pruner};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// State for one pass over the ingest tree.
pub(crate) struct Traversal<'a> {
    options: &'a Options,
    index: &'a mut SeenDigestIndex,
    layout: &'a mut DestinationLayout,
    pruner: Pruner,
    report: &'a mut RunReport,
}

impl<'a> Traversal<'a> {
    pub(crate) fn new(
        options: &'a Options,
        index: &'a mut SeenDigestIndex,
        layout: &'a mut DestinationLayout,
        pruner: Pruner,
        report: &'a mut RunReport,
    ) -> Self {
        Self {
            options,
            index,
            layout,
            pruner,
            report,
        }
    }

    /// Visit `dir`: files first get classified and placed, subdirectories are
    /// walked, and once every child is handled `dir` itself may be pruned.
    ///
    /// Symbolic links are never followed. The destination root is never
    /// entered even when it sits inside the ingest tree.
    pub(crate) fn visit_dir(&mut self, dir: &Path) {
        let mut children = match read_children(dir) {
            Ok(children) => children,
            Err(e) => {
                warn!("Error opening directory {}: {}", dir.display(), e);
                self.report.errors += 1;
                return;
            }
        };
        children.sort();

        for child in children {
            let file_type = match fs::symlink_metadata(&child) {
                Ok(meta) => meta.file_type(),
                Err(e) => {
                    warn!("Error reading {}: {}", child.display(), e);
                    self.report.errors += 1;
                    continue;
                }
            };

            if file_type.is_dir() {
                if self.layout.is_root(&child) {
                    debug!("Not descending into destination root {}", child.display());
                    continue;
                }
                self.visit_dir(&child);
            } else if file_type.is_file() {
                self.visit_file(&child);
            } else if file_type.is_symlink() && child.is_dir() {
                self.prune(&child);
            } else {
                warn!("Skipping non-regular file: {}", child.display());
                self.report.other_skipped += 1;
            }
        }

        self.prune(dir);
    }

    fn visit_file(&mut self, path: &Path) {
        let record = FileRecord::new(path, &self.options.classifier);

        match place(&record, self.options.algorithm, self.index, self.layout) {
            Ok(Outcome::Placed {
                category,
                destination,
                ..
            }) => {
                info!(
                    "Placed {} ({}) -> {}",
                    path.display(),
                    category.label(),
                    destination.display()
                );
                self.report.placed += 1;
            }
            Ok(Outcome::Deleted(DeleteReason::Sentinel)) => {
                info!("Deleted sentinel file: {}", path.display());
                self.report.sentinels_deleted += 1;
            }
            Ok(Outcome::Deleted(DeleteReason::Duplicate(digest))) => {
                info!("Deleted duplicate {} ({})", path.display(), digest);
                self.report.duplicates_deleted += 1;
            }
            Ok(Outcome::Skipped(SkipReason::HashFailed(reason))) => {
                warn!("Error hashing file {}: {}", path.display(), reason);
                self.report.hash_failures += 1;
            }
            Ok(Outcome::Skipped(SkipReason::UnknownCategory)) => {
                warn!("Unknown file type, leaving in place: {}", path.display());
                self.report.unknown_skipped += 1;
            }
            Err(e) => {
                warn!("{}", e);
                self.report.errors += 1;
            }
        }
    }

    fn prune(&mut self, dir: &Path) {
        match self.pruner.prune_if_empty(dir) {
            Ok(PruneOutcome::Removed { sentinels_deleted }) => {
                info!("Deleted empty directory: {}", dir.display());
                self.report.directories_pruned += 1;
                self.report.sentinels_deleted += sentinels_deleted;
            }
            Ok(PruneOutcome::NotEmpty | PruneOutcome::Protected) => {}
            Err(e) => {
                warn!("{}", e);
                self.report.errors += 1;
            }
        }
    }
}

fn read_children(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Classifier;
    use crate::hash::{Algorithm, Digest};
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        ingest: PathBuf,
        dest: PathBuf,
        options: Options,
    }

    impl Fixture {
        fn new() -> Self {
            let temp_dir = TempDir::new().unwrap();
            let ingest = temp_dir.path().join("ingest");
            let dest = temp_dir.path().join("dest");
            fs::create_dir_all(&ingest).unwrap();
            fs::create_dir_all(&dest).unwrap();
            Self {
                _temp_dir: temp_dir,
                ingest,
                dest,
                options: Options::default(),
            }
        }

        fn write(&self, rel: &str, content: &[u8]) -> PathBuf {
            let path = self.ingest.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
            path
        }

        fn run(&self, protected: Vec<PathBuf>) -> RunReport {
            let mut index = SeenDigestIndex::new();
            let mut layout = DestinationLayout::new(&self.dest);
            let mut report = RunReport::default();
            let pruner = Pruner::new(Classifier::default(), protected);
            Traversal::new(&self.options, &mut index, &mut layout, pruner, &mut report)
                .visit_dir(&self.ingest);
            report
        }
    }

    #[test]
    fn test_nested_files_are_placed_and_dirs_pruned() {
        let fx = Fixture::new();
        fx.write("a/b/c/deep.pdf", b"%PDF-deep");
        fx.write("a/top.png", b"\x89PNG");

        let report = fx.run(vec![fx.dest.clone()]);

        assert_eq!(report.placed, 2);
        assert_eq!(report.directories_pruned, 4);
        assert!(!fx.ingest.exists());
        let pdf = Digest::of_bytes(b"%PDF-deep", Algorithm::Sha256);
        assert!(fx.dest.join("document-pdf").join(format!("{pdf}.pdf")).exists());
    }

    #[test]
    fn test_unknown_file_keeps_its_directory() {
        let fx = Fixture::new();
        let notes = fx.write("keep/notes", b"???");
        fx.write("gone/desktop.ini", b"meta");

        let report = fx.run(vec![fx.dest.clone()]);

        assert_eq!(report.unknown_skipped, 1);
        assert_eq!(report.sentinels_deleted, 1);
        assert!(notes.exists());
        assert!(!fx.ingest.join("gone").exists());
        assert!(fx.ingest.exists());
    }

    #[test]
    fn test_protected_ingest_root_survives() {
        let fx = Fixture::new();
        fx.write("x.txt", b"x");

        let report = fx.run(vec![fx.dest.clone(), fx.ingest.clone()]);

        assert_eq!(report.placed, 1);
        assert_eq!(report.directories_pruned, 0);
        assert!(fx.ingest.is_dir());
    }

    #[test]
    fn test_nested_destination_is_not_entered() {
        let fx = Fixture::new();
        let inner_dest = fx.ingest.join("sorted");
        let resident = inner_dest.join("document-text/already.txt");
        fs::create_dir_all(resident.parent().unwrap()).unwrap();
        fs::write(&resident, b"resident").unwrap();
        fx.write("new.txt", b"new");

        let mut index = SeenDigestIndex::new();
        let mut layout = DestinationLayout::new(&inner_dest);
        let mut report = RunReport::default();
        let pruner = Pruner::new(Classifier::default(), vec![inner_dest.clone()]);
        Traversal::new(&fx.options, &mut index, &mut layout, pruner, &mut report)
            .visit_dir(&fx.ingest);

        assert_eq!(report.placed, 1);
        assert!(resident.exists());
        assert!(fx.ingest.exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_symlinks_are_not_followed() {
        let fx = Fixture::new();
        let outside = fx._temp_dir.path().join("outside");
        fs::create_dir_all(&outside).unwrap();
        fs::write(outside.join("precious.txt"), b"precious").unwrap();
        std::os::unix::fs::symlink(&outside, fx.ingest.join("dirlink")).unwrap();
        std::os::unix::fs::symlink(outside.join("precious.txt"), fx.ingest.join("filelink.txt"))
            .unwrap();

        let report = fx.run(vec![fx.dest.clone()]);

        assert_eq!(report.placed, 0);
        assert_eq!(report.other_skipped, 1);
        assert!(outside.join("precious.txt").exists());
        assert!(fs::symlink_metadata(fx.ingest.join("dirlink")).is_ok());
    }
}

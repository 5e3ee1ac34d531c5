//! Destination root and its per-category subdirectories.

use crate::category::Category;
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Destination root plus the category directories created so far.
#[derive(Debug)]
pub struct DestinationLayout {
    root: PathBuf,
    created: HashSet<Category>,
}

impl DestinationLayout {
    /// Create a layout rooted at `root`. Nothing is touched on disk.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            created: HashSet::new(),
        }
    }

    /// Get the destination root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a category directory, whether or not it exists yet.
    ///
    /// Returns: `{root}/{category-dir-name}`
    pub fn category_path(&self, category: Category) -> PathBuf {
        self.root.join(category.dir_name())
    }

    /// Create the category directory (and any missing parents) if needed.
    ///
    /// Once created the directory is remembered and later calls do no I/O.
    pub fn ensure_category_dir(&mut self, category: Category) -> Result<PathBuf> {
        let dir = self.category_path(category);
        if self.created.contains(&category) {
            return Ok(dir);
        }

        // Fails if any component exists as a non-directory
        fs::create_dir_all(&dir).map_err(|e| Error::directory_create(&dir, e))?;

        self.created.insert(category);
        Ok(dir)
    }

    /// Whether `path` is the destination root itself.
    pub fn is_root(&self, path: &Path) -> bool {
        path == self.root
    }
}

//! Deterministic file system walker with scoped ignore rules.
//!
//! Traverses a directory tree depth first, sorted by file name, so
//! repeated walks over an unchanged tree visit files in the same
//! order. Each directory's ignore file is loaded when the walk enters
//! it and released when the walk leaves its subtree. Excluded
//! directories are never opened. Walk errors (permission denied,
//! etc.) are logged and skipped.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::core::error::{BriefError, Result};
use crate::core::pipeline::filter::{IgnoreChain, PathFilter};

/// A file selected by the walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    /// Full path on disk
    pub path: PathBuf,

    /// Path relative to the walk root (the result key)
    pub relative: PathBuf,
}

/// Files selected by one walk, in walk order
#[derive(Debug, Clone, Default)]
pub struct WalkOutcome {
    pub files: Vec<WalkedFile>,

    /// Entries excluded by ignore rules, filters or the size limit
    pub ignored: usize,
}

/// File system walker driven by a [`PathFilter`]
#[derive(Debug, Clone)]
pub struct FileWalker {
    filter: PathFilter,

    /// Maximum file size in bytes (skip larger files)
    max_file_size_bytes: u64,
}

impl FileWalker {
    /// Create a new file walker
    ///
    /// # Arguments
    ///
    /// * `filter` - Ignore and extension rules
    /// * `max_file_size_mb` - Maximum file size in megabytes
    pub fn new(filter: PathFilter, max_file_size_mb: usize) -> Self {
        Self {
            filter,
            max_file_size_bytes: (max_file_size_mb as u64) * 1024 * 1024,
        }
    }

    /// Collect all eligible files under `root`
    ///
    /// # Returns
    ///
    /// The selected files in walk order, or `InvalidPath` if `root`
    /// is not a directory
    pub fn collect_files(&self, root: &Path) -> Result<WalkOutcome> {
        if !root.is_dir() {
            return Err(BriefError::InvalidPath(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let mut chain = IgnoreChain::new();
        chain.push(0, self.filter.builtin_spec());

        let mut ignored = 0usize;
        let mut files = Vec::new();

        let walk = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| self.admit(e, root, &mut chain, &mut ignored));

        let mut too_large = 0usize;
        for entry in walk {
            match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }

                    let path = entry.path();

                    // Check file size
                    if let Ok(metadata) = entry.metadata() {
                        if metadata.len() > self.max_file_size_bytes {
                            tracing::debug!(
                                "Skipping large file: {:?} ({} bytes)",
                                path,
                                metadata.len()
                            );
                            too_large += 1;
                            continue;
                        }
                    }

                    files.push(WalkedFile {
                        path: path.to_path_buf(),
                        relative: relative_to(path, root),
                    });
                }
                Err(e) => {
                    tracing::warn!("Walk error: {}", e);
                    // Continue walking despite errors
                }
            }
        }

        Ok(WalkOutcome {
            files,
            ignored: ignored + too_large,
        })
    }

    /// Decide whether an entry is yielded (and, for directories,
    /// descended into). Maintains the ignore chain as a side effect.
    fn admit(
        &self,
        entry: &DirEntry,
        root: &Path,
        chain: &mut IgnoreChain,
        ignored: &mut usize,
    ) -> bool {
        let depth = entry.depth();
        chain.enter(depth);

        let is_dir = entry.file_type().is_dir();

        // Never filter the root directory
        if depth == 0 {
            if is_dir {
                chain.push(1, self.filter.load_spec(root, Path::new("")));
            }
            return true;
        }

        let relative = relative_to(entry.path(), root);

        if is_dir {
            if !self.filter.includes_dir(chain, &relative) {
                tracing::debug!("Skipping ignored directory: {:?}", relative);
                *ignored += 1;
                return false;
            }
            chain.push(depth + 1, self.filter.load_spec(entry.path(), &relative));
            return true;
        }

        if !self.filter.includes_file(chain, &relative) {
            tracing::debug!("Skipping ignored file: {:?}", relative);
            *ignored += 1;
            return false;
        }

        true
    }
}

fn relative_to(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

use anyhow::{bail, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collects the Rust source files of a project.
///
/// Directories named `target` and hidden directories are never entered.
/// Files are returned in a stable order (sorted by path) so that schemas are
/// synthesized in the same order on every run.
///
/// # Example
///
/// ```no_run
/// use schema_from_source::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let root = FileScanner::source_root(&PathBuf::from("./my-project"));
/// let result = FileScanner::new(root).scan().unwrap();
/// println!("{} source files", result.rust_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Files found under a scanned directory.
#[derive(Debug)]
pub struct ScanResult {
    /// Every `.rs` file, sorted by path
    pub rust_files: Vec<PathBuf>,
    /// Entries that could not be read
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// The directory module paths are computed from: `<project>/src` when
    /// it exists, the project directory itself otherwise.
    ///
    /// # Arguments
    ///
    /// * `project` - The crate directory
    pub fn source_root(project: &Path) -> PathBuf {
        let src = project.join("src");
        if src.is_dir() {
            src
        } else {
            project.to_path_buf()
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Walk the tree below the root and collect `.rs` files.
    ///
    /// Unreadable entries are logged and reported in
    /// [`ScanResult::warnings`]; the walk goes on.
    ///
    /// # Returns
    ///
    /// A [`ScanResult`] with the files sorted by path.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not a directory.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.is_dir() {
            bail!("Not a directory: {}", self.root_path.display());
        }

        let mut rust_files = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                !name.starts_with('.') && name != "target"
            });

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "rs")
                    {
                        rust_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        rust_files.sort();
        debug!(
            "Found {} Rust files under {}",
            rust_files.len(),
            self.root_path.display()
        );
        Ok(ScanResult {
            rust_files,
            warnings,
        })
    }
}

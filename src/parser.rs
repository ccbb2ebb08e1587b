use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Parses Rust source files with `syn`.
///
/// # Example
///
/// ```no_run
/// use schema_from_source::parser::AstParser;
/// use std::path::Path;
///
/// let parsed = AstParser::parse_file(Path::new("src/models.rs")).unwrap();
/// println!("{} items", parsed.syntax_tree.items.len());
/// ```
pub struct AstParser;

/// A parsed source file.
#[derive(Debug)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub syntax_tree: syn::File,
}

impl AstParser {
    /// Read and parse one file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to a `.rs` file
    ///
    /// # Returns
    ///
    /// The file's syntax tree together with its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid Rust.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        Self::parse_source(path, &content)
    }

    /// Parse source text that was read from `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Where `content` came from, kept for module paths and messages
    /// * `content` - Rust source text
    ///
    /// # Errors
    ///
    /// Returns an error if `content` is not valid Rust.
    pub fn parse_source(path: &Path, content: &str) -> Result<ParsedFile> {
        let syntax_tree = syn::parse_file(content)
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;
        Ok(ParsedFile {
            path: path.to_path_buf(),
            syntax_tree,
        })
    }

    /// Parse every file, keeping the files that parse.
    ///
    /// A file that fails to parse is logged and left out, so one broken file
    /// does not hide the declarations of the others.
    ///
    /// # Returns
    ///
    /// The parsed files, in the order of `paths`.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<ParsedFile> {
        let parsed: Vec<ParsedFile> = paths
            .iter()
            .filter_map(|path| match Self::parse_file(path) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!("Skipping {}: {:#}", path.display(), e);
                    None
                }
            })
            .collect();

        debug!(
            "Parsed {} of {} files",
            parsed.len(),
            paths.len()
        );
        parsed
    }
}

use anyhow::{bail, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// What a pass reads its declarations from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    /// A directory of Rust sources
    SourceTree(PathBuf),
    /// A YAML or JSON declaration model
    ModelFile(PathBuf),
}

impl InputKind {
    /// Classifies an input path: directories are source trees, `.yaml`/`.yml`/`.json`
    /// files are declaration models.
    pub fn detect(path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Ok(InputKind::SourceTree(path.to_path_buf()));
        }
        if !path.exists() {
            bail!("Input path does not exist: {}", path.display());
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml" | "json") => Ok(InputKind::ModelFile(path.to_path_buf())),
            _ => bail!(
                "Input must be a project directory or a .yaml/.yml/.json declaration model: {}",
                path.display()
            ),
        }
    }
}

/// Collects the Rust source files of a project.
///
/// The scanner walks the project directory recursively, in file-name order, so the
/// declarations it feeds into a pass always come out in the same order. The `target`
/// directory and hidden directories (those starting with `.`) are skipped.
///
/// # Example
///
/// ```no_run
/// use route_compass::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-service"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} Rust files", result.rust_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Source files found by a [`FileScanner`].
#[derive(Debug)]
pub struct ScanResult {
    /// Paths of all discovered `.rs` files
    pub rust_files: Vec<PathBuf>,
    /// Paths that could not be visited
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a scanner for the given project directory.
    ///
    /// # Arguments
    ///
    /// * `root_path` - Project root; module paths of collected declarations are later
    ///   derived relative to it
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Walks the project and collects every `.rs` file.
    ///
    /// Entries that cannot be visited (permissions, broken links) do not stop the walk;
    /// each is logged and recorded in [`ScanResult::warnings`].
    ///
    /// # Returns
    ///
    /// The discovered files, sorted by path component, and any warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if the root path is not a directory.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.is_dir() {
            bail!("Project path is not a directory: {}", self.root_path.display());
        }

        let mut result = ScanResult {
            rust_files: Vec::new(),
            warnings: Vec::new(),
        };

        let walker = WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_ignored(e));

        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() && is_rust_file(entry.path()) => {
                    result.rust_files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    result.warnings.push(warning);
                }
            }
        }

        debug!(
            "Found {} Rust files under {}",
            result.rust_files.len(),
            self.root_path.display()
        );
        Ok(result)
    }
}

fn is_ignored(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || (entry.file_type().is_dir() && name == "target")
}

fn is_rust_file(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("rs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn file_names(result: &ScanResult) -> Vec<String> {
        result
            .rust_files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_scan_finds_nested_rust_files_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src/api")).unwrap();
        fs::write(root.join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(root.join("src/api/users.rs"), "pub struct Users;").unwrap();
        fs::write(root.join("README.md"), "# readme").unwrap();

        let result = FileScanner::new(root.to_path_buf()).scan().unwrap();

        assert_eq!(file_names(&result), vec!["users.rs", "main.rs"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_skips_target_and_hidden_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("target/debug")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("target/debug/build.rs"), "fn main() {}").unwrap();
        fs::write(root.join(".git/hook.rs"), "fn main() {}").unwrap();
        fs::write(root.join("lib.rs"), "").unwrap();

        let result = FileScanner::new(root.to_path_buf()).scan().unwrap();

        assert_eq!(file_names(&result), vec!["lib.rs"]);
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileScanner::new(temp_dir.path().to_path_buf()).scan().unwrap();
        assert!(result.rust_files.is_empty());
    }

    #[test]
    fn test_scan_rejects_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        let err = FileScanner::new(missing).scan().unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_detect_input_kind() {
        let temp_dir = TempDir::new().unwrap();
        let model = temp_dir.path().join("tree.yml");
        let other = temp_dir.path().join("tree.txt");
        fs::write(&model, "classes: []").unwrap();
        fs::write(&other, "").unwrap();

        assert_eq!(
            InputKind::detect(temp_dir.path()).unwrap(),
            InputKind::SourceTree(temp_dir.path().to_path_buf())
        );
        assert_eq!(InputKind::detect(&model).unwrap(), InputKind::ModelFile(model.clone()));
        assert!(InputKind::detect(&other).is_err());
        assert!(InputKind::detect(&temp_dir.path().join("missing")).is_err());
    }
}

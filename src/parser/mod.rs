//! Go source parsing.
//!
//! tree-sitter-go produces the concrete syntax tree, [`go`] lowers it into
//! the closed [`syntax`] model, and [`constraint`] decides which files take
//! part for the target platform.

pub mod constraint;
pub mod go;
pub mod syntax;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub use constraint::Platform;
pub use syntax::SourceFile;

use crate::error::{GodepError, Result};

/// Parse one Go source file.
pub fn parse_file(path: &Path, source: &str) -> Result<SourceFile> {
    go::lower_file(path, source)
}

/// The files of one package found in a directory.
#[derive(Debug, Clone)]
pub struct ParsedPackage {
    pub dir: PathBuf,
    pub name: String,
    pub files: Vec<SourceFile>,
}

/// Outcome of parsing a directory.
#[derive(Debug, Clone, Default)]
pub struct DirParse {
    pub packages: Vec<ParsedPackage>,
    /// Files that failed to read or parse, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

/// Parse the `.go` files of a directory and group them by package.
///
/// Files excluded for the platform contribute nothing. Files that fail to
/// parse are reported in [`DirParse::failed`] and skipped. `_test`
/// packages are dropped, as is `main` when it shares the directory with
/// another package.
pub fn parse_dir(dir: &Path, platform: &Platform) -> Result<DirParse> {
    let entries = fs::read_dir(dir).map_err(|e| GodepError::io(dir, e))?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|ft| ft.is_file()))
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "go"))
        .collect();
    paths.sort();

    let mut result = DirParse::default();
    let mut by_package: BTreeMap<String, Vec<SourceFile>> = BTreeMap::new();

    for path in paths {
        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "unreadable source file skipped");
                result.failed.push((path, e.to_string()));
                continue;
            }
        };
        let file = match parse_file(&path, &source) {
            Ok(file) => file,
            Err(e) => {
                warn!(error = %e, "source file skipped");
                result.failed.push((path, e.to_string()));
                continue;
            }
        };
        if !platform.includes(&path, file.build_constraint.as_deref()) {
            debug!(file = %path.display(), "excluded by build constraints");
            continue;
        }
        by_package.entry(file.package.clone()).or_default().push(file);
    }

    let count = by_package.len();
    result.packages = by_package
        .into_iter()
        .filter(|(name, _)| !name.ends_with("_test") && !(count > 1 && name == "main"))
        .map(|(name, files)| ParsedPackage {
            dir: dir.to_path_buf(),
            name,
            files,
        })
        .collect();

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, source: &str) {
        fs::write(dir.join(name), source).unwrap();
    }

    #[test]
    fn test_parse_dir_groups_and_filters() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        write(dir, "a.go", "package app\n\nfunc A() {}\n");
        write(dir, "b.go", "package app\n\nfunc B() {}\n");
        write(dir, "a_test.go", "package app_test\n\nfunc TestA() {}\n");
        write(dir, "gen.go", "//go:build ignore\n\npackage main\n\nfunc main() {}\n");
        write(dir, "z_windows.go", "package app\n\nfunc W() {}\n");
        write(dir, "notes.txt", "not go");

        let parsed = parse_dir(dir, &Platform::new("linux", "amd64")).unwrap();
        assert_eq!(parsed.packages.len(), 1);
        assert_eq!(parsed.packages[0].name, "app");
        assert_eq!(parsed.packages[0].files.len(), 2);
        assert!(parsed.failed.is_empty());
    }

    #[test]
    fn test_main_dropped_beside_library() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "lib.go", "package lib\n");
        write(tmp.path(), "tool.go", "package main\n\nfunc main() {}\n");

        let parsed = parse_dir(tmp.path(), &Platform::new("linux", "amd64")).unwrap();
        let names: Vec<_> = parsed.packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["lib"]);
    }

    #[test]
    fn test_lone_main_kept() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "main.go", "package main\n\nfunc main() {}\n");

        let parsed = parse_dir(tmp.path(), &Platform::new("linux", "amd64")).unwrap();
        assert_eq!(parsed.packages.len(), 1);
        assert_eq!(parsed.packages[0].name, "main");
    }

    #[test]
    fn test_broken_file_skipped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "ok.go", "package app\n\nfunc Ok() {}\n");
        write(tmp.path(), "bad.go", "package app\n\nfunc {{{\n");

        let parsed = parse_dir(tmp.path(), &Platform::new("linux", "amd64")).unwrap();
        assert_eq!(parsed.packages[0].files.len(), 1);
        assert_eq!(parsed.failed.len(), 1);
        assert!(parsed.failed[0].0.ends_with("bad.go"));
    }

    #[test]
    fn test_missing_dir_is_io_error() {
        let result = parse_dir(Path::new("/definitely/not/here"), &Platform::new("linux", "amd64"));
        assert!(matches!(result, Err(GodepError::Io { .. })));
    }
}

//! Module loader: walks the analyzed root and fills the symbol tables.
//!
//! Package directories are parsed in parallel; extraction then runs
//! sequentially in sorted directory order so the trees never depend on
//! thread scheduling.

use ignore::WalkBuilder;
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{GodepError, Result};
use crate::locate::{strip_version, subdir, versioned_dir, Roots};
use crate::parser::{parse_dir, DirParse, Platform};
use crate::symbols::{Extractor, SymbolTables};

/// Counts from one load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub dirs: usize,
    pub packages: usize,
    pub files: usize,
    /// Files or directories that could not be read or parsed.
    pub failed: usize,
}

impl fmt::Display for LoadStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loaded {} directories ({} packages, {} files, {} failed)",
            self.dirs, self.packages, self.files, self.failed
        )
    }
}

pub struct Loader<'a> {
    roots: &'a Roots,
    platform: &'a Platform,
    skip_dirs: &'a [String],
}

impl<'a> Loader<'a> {
    pub fn new(roots: &'a Roots, platform: &'a Platform, skip_dirs: &'a [String]) -> Self {
        Self {
            roots,
            platform,
            skip_dirs,
        }
    }

    /// Walk `root`, parse its package directories and extract them into
    /// `tables`. A walk failure aborts the load.
    pub fn load(&self, root: &Path, tables: &mut SymbolTables) -> Result<LoadStats> {
        let root = if subdir(&self.roots.imports, root).is_some() {
            versioned_dir(&self.roots.imports, root)
        } else {
            root.to_path_buf()
        };

        let dirs: Vec<PathBuf> = self
            .package_dirs(&root)?
            .into_iter()
            .filter(|dir| !self.skipped(dir))
            .collect();
        debug!(root = %root.display(), dirs = dirs.len(), "parsing package directories");

        let parsed: Vec<(PathBuf, Result<DirParse>)> = dirs
            .par_iter()
            .map(|dir| (dir.clone(), parse_dir(dir, self.platform)))
            .collect();

        let mut stats = LoadStats::default();
        let mut extractor = Extractor::new(tables, self.roots, self.skip_dirs);
        for (dir, result) in parsed {
            let parse = match result {
                Ok(parse) => parse,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "directory skipped");
                    stats.failed += 1;
                    continue;
                }
            };
            stats.failed += parse.failed.len();
            if parse.packages.is_empty() {
                continue;
            }

            let location = strip_version(&dir);
            if extractor.extract_dir(&location, &parse.packages) {
                stats.dirs += 1;
                stats.packages += parse.packages.len();
                stats.files += parse.packages.iter().map(|p| p.files.len()).sum::<usize>();
            }
        }

        info!(
            root = %root.display(),
            dirs = stats.dirs,
            packages = stats.packages,
            files = stats.files,
            failed = stats.failed,
            "module loaded"
        );
        Ok(stats)
    }

    /// Every directory under `root` (itself included) in sorted order,
    /// pruning hidden directories and the configured skip names.
    fn package_dirs(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let skip = self.skip_dirs.to_vec();
        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .hidden(true)
            .follow_links(false)
            .filter_entry(move |entry| {
                entry.depth() == 0
                    || !entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| skip.iter().any(|s| s == name))
            })
            .build();

        let mut dirs = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|source| GodepError::Walk {
                root: root.to_path_buf(),
                path: error_path(&source).unwrap_or_else(|| root.to_path_buf()),
                source,
            })?;
            if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                dirs.push(entry.into_path());
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    /// Whether a directory's module-relative path has a skipped segment.
    fn skipped(&self, dir: &Path) -> bool {
        let Some(rel) = subdir(&self.roots.module_dir, &strip_version(dir)) else {
            return false;
        };
        rel.components().any(|component| {
            let name = component.as_os_str().to_string_lossy();
            self.skip_dirs.iter().any(|s| *s == name)
        })
    }
}

/// The path an `ignore` walk error refers to, if it names one.
fn error_path(error: &ignore::Error) -> Option<PathBuf> {
    match error {
        ignore::Error::WithPath { path, .. } => Some(path.clone()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &Path, source: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, source).unwrap();
    }

    fn skip() -> Vec<String> {
        vec!["internal".to_string(), "testdata".to_string()]
    }

    fn linux() -> Platform {
        Platform::new("linux", "amd64")
    }

    #[test]
    fn test_load_module_tree() {
        let tmp = TempDir::new().unwrap();
        let module = tmp.path().join("work/m");
        write(&module.join("go.mod"), "module example.com/m\n");
        write(&module.join("m.go"), "package m\n\nfunc Root() {}\n");
        write(&module.join("app/app.go"), "package app\n\ntype App struct{}\n");
        write(&module.join("app/app_test.go"), "package app\n\nfunc TestX() {}\n");
        write(&module.join("internal/secret/s.go"), "package secret\n\nfunc S() {}\n");
        write(&module.join("testdata/bad.go"), "package bad\n\nfunc {{{\n");
        write(&module.join(".hidden/h.go"), "package h\n\nfunc H() {}\n");
        fs::create_dir_all(module.join("docs")).unwrap();

        let roots = Roots::discover(&module, tmp.path().join("std"), tmp.path().join("mod")).unwrap();
        let platform = linux();
        let skip = skip();
        let mut tables = SymbolTables::new();
        let stats = Loader::new(&roots, &platform, &skip)
            .load(&module, &mut tables)
            .unwrap();

        assert_eq!(stats.dirs, 2);
        assert_eq!(stats.packages, 2);
        assert_eq!(stats.files, 2);
        assert_eq!(stats.failed, 0);
        assert_eq!(tables.definitions.keys(), vec!["app.App", "m.Root"]);
        assert_eq!(
            tables.definitions.get("app.App").unwrap().keys(),
            vec![module.join("app").to_string_lossy().as_ref()]
        );
    }

    #[test]
    fn test_broken_file_counts_as_failed() {
        let tmp = TempDir::new().unwrap();
        let module = tmp.path().join("m");
        write(&module.join("go.mod"), "module example.com/m\n");
        write(&module.join("ok.go"), "package m\n\nfunc Ok() {}\n");
        write(&module.join("bad.go"), "package m\n\nfunc {{{\n");

        let roots = Roots::discover(&module, tmp.path().join("std"), tmp.path().join("mod")).unwrap();
        let platform = linux();
        let skip = skip();
        let mut tables = SymbolTables::new();
        let stats = Loader::new(&roots, &platform, &skip)
            .load(&module, &mut tables)
            .unwrap();

        assert_eq!(stats.failed, 1);
        assert!(tables.definitions.contains("m.Ok"));
    }

    #[test]
    fn test_versioned_root_in_module_cache() {
        let tmp = TempDir::new().unwrap();
        let imports = tmp.path().join("mod");
        let pinned = imports.join("github.com/x/y@v1.4.0");
        write(&pinned.join("go.mod"), "module github.com/x/y\n");
        write(&pinned.join("y.go"), "package y\n\nfunc Do() {}\n");

        let roots = Roots::discover(&pinned, tmp.path().join("std"), imports.clone()).unwrap();
        let platform = linux();
        let skip = skip();
        let mut tables = SymbolTables::new();
        Loader::new(&roots, &platform, &skip)
            .load(&imports.join("github.com/x/y"), &mut tables)
            .unwrap();

        let unversioned = imports.join("github.com/x/y");
        assert_eq!(
            tables.definitions.get("y.Do").unwrap().keys(),
            vec![unversioned.to_string_lossy().as_ref()]
        );
    }

    #[test]
    fn test_missing_root_is_walk_error() {
        let tmp = TempDir::new().unwrap();
        let roots = Roots {
            std: tmp.path().join("std"),
            imports: tmp.path().join("mod"),
            module_path: "example.com/m".to_string(),
            module_dir: tmp.path().join("gone"),
        };
        let platform = linux();
        let skip = skip();
        let mut tables = SymbolTables::new();
        let result = Loader::new(&roots, &platform, &skip).load(&tmp.path().join("gone"), &mut tables);

        assert!(matches!(result, Err(GodepError::Walk { .. })));
    }
}

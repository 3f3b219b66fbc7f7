//! Locating modules and packages on disk.
//!
//! Maps import paths to source directories across the three roots (module,
//! standard library, module cache), finds the enclosing module from its
//! `go.mod`, and normalises the versioned directory names of the module
//! cache.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{GodepError, Result};

/// Import path used for the standard library when it is the analyzed module.
pub const STD_MODULE: &str = "std";

/// Pseudo-package for cgo; never resolved.
pub const CGO_PACKAGE: &str = "C";

/// The three source roots of an analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    /// Standard library sources (`$GOROOT/src`).
    pub std: PathBuf,
    /// Module cache (`$GOMODCACHE`).
    pub imports: PathBuf,
    /// Import path of the analyzed module.
    pub module_path: String,
    /// Directory of the analyzed module, without any `@version` suffix.
    pub module_dir: PathBuf,
}

impl Roots {
    /// Find the module enclosing `dir`. When `dir` is the standard library
    /// root itself, the whole standard library is the module.
    pub fn discover(dir: &Path, std: PathBuf, imports: PathBuf) -> Result<Self> {
        if dir == std.as_path() {
            return Ok(Self {
                module_path: STD_MODULE.to_string(),
                module_dir: std.clone(),
                std,
                imports,
            });
        }

        let (module_path, module_dir) =
            find_module(dir)?.ok_or_else(|| GodepError::ModuleUnresolved {
                dir: dir.to_path_buf(),
            })?;

        Ok(Self {
            std,
            imports,
            module_path,
            module_dir: strip_version(&module_dir),
        })
    }

    /// Whether the whole standard library is being analyzed.
    pub fn is_std_mode(&self) -> bool {
        self.module_dir == self.std
    }

    /// Whether a directory lies inside the analyzed module.
    pub fn in_module(&self, dir: &Path) -> bool {
        subdir(&self.module_dir, dir).is_some()
    }

    /// Local directory for an import path: the module first, then the
    /// standard library, defaulting to the module cache.
    pub fn locate(&self, import_path: &str) -> PathBuf {
        if import_path == self.module_path {
            return self.module_dir.clone();
        }
        if let Some(rel) = import_path
            .strip_prefix(self.module_path.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
        {
            return self.module_dir.join(rel);
        }
        let std = self.std.join(import_path);
        if std.is_dir() {
            return std;
        }
        self.imports.join(import_path)
    }
}

/// `target` relative to `base`, or `None` when `target` is not under `base`.
pub fn subdir(base: &Path, target: &Path) -> Option<PathBuf> {
    target.strip_prefix(base).ok().map(Path::to_path_buf)
}

/// Walk upward from `dir` to the nearest `go.mod` and read its module path.
pub fn find_module(dir: &Path) -> Result<Option<(String, PathBuf)>> {
    for ancestor in dir.ancestors() {
        let gomod = ancestor.join("go.mod");
        if !gomod.is_file() {
            continue;
        }
        let text = fs::read_to_string(&gomod).map_err(|e| GodepError::io(&gomod, e))?;
        return Ok(module_directive(&text).map(|path| (path, ancestor.to_path_buf())));
    }
    Ok(None)
}

/// The module path declared by a `go.mod` file.
pub fn module_directive(gomod: &str) -> Option<String> {
    gomod.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or_default().trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with([' ', '\t']) {
            return None;
        }
        let path = rest.trim().trim_matches(|c| c == '"' || c == '`');
        (!path.is_empty()).then(|| path.to_string())
    })
}

/// Remove `@version` suffixes from path elements:
/// `.../x/y@v1.2.3/sub` becomes `.../x/y/sub`.
pub fn strip_version(path: &Path) -> PathBuf {
    path.components()
        .map(|component| match component {
            Component::Normal(name) => {
                let name = name.to_string_lossy();
                match name.split_once('@') {
                    Some((base, _)) => PathBuf::from(base),
                    None => PathBuf::from(name.as_ref()),
                }
            }
            other => PathBuf::from(other.as_os_str()),
        })
        .collect()
}

/// Physical directory in the module cache for an unversioned path under
/// `imports`, choosing the greatest `name@version` directory present at the
/// nearest level that has one. Paths that already carry a version, or have
/// no versioned ancestor, are returned unchanged.
pub fn versioned_dir(imports: &Path, path: &Path) -> PathBuf {
    let Some(rel) = subdir(imports, path) else {
        return path.to_path_buf();
    };
    if rel.to_string_lossy().contains('@') {
        return path.to_path_buf();
    }

    let mut current = path.to_path_buf();
    let mut rest = PathBuf::new();
    while let (Some(parent), Some(base)) = (current.parent(), current.file_name()) {
        if parent == imports || !parent.starts_with(imports) {
            break;
        }
        let base = base.to_string_lossy().into_owned();
        if let Ok(entries) = fs::read_dir(parent) {
            let latest = entries
                .filter_map(|entry| entry.ok())
                .filter_map(|entry| {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    let (stem, version) = name.split_once('@')?;
                    (stem == base).then(|| version.to_string())
                })
                .max();
            if let Some(version) = latest {
                let found = parent.join(format!("{base}@{version}"));
                return if rest.as_os_str().is_empty() {
                    found
                } else {
                    found.join(&rest)
                };
            }
        }
        rest = if rest.as_os_str().is_empty() {
            PathBuf::from(&base)
        } else {
            Path::new(&base).join(&rest)
        };
        current = parent.to_path_buf();
    }

    path.to_path_buf()
}

/// Package name implied by an import path: the last element cut at its
/// first `.`, skipping a trailing `vN` major-version element.
pub fn package_name(import_path: &str) -> String {
    let mut elements = import_path.rsplit('/');
    let last = elements.next().unwrap_or_default();
    let base = if is_major_version(last) {
        elements.next().unwrap_or(last)
    } else {
        last
    };
    base.split('.').next().unwrap_or(base).to_string()
}

fn is_major_version(element: &str) -> bool {
    element
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Whether any element of a slash-separated path is in `skip`.
pub fn has_skipped_element(path: &str, skip: &[String]) -> bool {
    path.split('/').any(|element| skip.iter().any(|s| s == element))
}

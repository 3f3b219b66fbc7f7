//! Configuration for an analysis run.
//!
//! Values come from built-in defaults, then an optional TOML file, then the
//! Go environment variables, then command-line flags, each layer overriding
//! the previous one.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::error::{GodepError, Result};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "godep.toml";

/// Directory names never walked or imported.
pub const DEFAULT_SKIP_DIRS: [&str; 2] = ["internal", "testdata"];

/// Graph renderer invoked for SVG output.
pub const DEFAULT_RENDERER: &str = "dot";

const FALLBACK_GOROOT: &str = "/usr/local/go";

/// Settings as written in the config file; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    std_root: Option<PathBuf>,
    import_root: Option<PathBuf>,
    goos: Option<String>,
    goarch: Option<String>,
    skip_dirs: Option<Vec<String>>,
    renderer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GodepConfig {
    /// Standard library sources (`$GOROOT/src`).
    pub std_root: PathBuf,
    /// Module cache.
    pub import_root: PathBuf,
    pub goos: String,
    pub goarch: String,
    pub skip_dirs: Vec<String>,
    pub renderer: String,
}

impl GodepConfig {
    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] in `cwd` when it
    /// exists, then apply the process environment.
    pub fn load(path: Option<&Path>, cwd: &Path) -> Result<Self> {
        let file = match path {
            Some(path) => read_file(path)?,
            None => {
                let default = cwd.join(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    read_file(&default)?
                } else {
                    FileConfig::default()
                }
            }
        };
        Ok(Self::resolve(file, &process_env))
    }

    /// Layer the environment over the file settings and fill the rest
    /// with defaults.
    fn resolve(file: FileConfig, env: &dyn Fn(&str) -> Option<String>) -> Self {
        let std_root = env("GOROOT")
            .map(|goroot| PathBuf::from(goroot).join("src"))
            .or(file.std_root)
            .unwrap_or_else(default_std_root);

        let import_root = env("GOMODCACHE")
            .map(PathBuf::from)
            .or_else(|| {
                env("GOPATH").and_then(|gopath| {
                    env::split_paths(&gopath)
                        .next()
                        .map(|first| first.join("pkg").join("mod"))
                })
            })
            .or(file.import_root)
            .unwrap_or_else(default_import_root);

        Self {
            std_root,
            import_root,
            goos: env("GOOS").or(file.goos).unwrap_or_else(host_goos),
            goarch: env("GOARCH").or(file.goarch).unwrap_or_else(host_goarch),
            skip_dirs: file
                .skip_dirs
                .unwrap_or_else(|| DEFAULT_SKIP_DIRS.iter().map(|s| s.to_string()).collect()),
            renderer: file.renderer.unwrap_or_else(|| DEFAULT_RENDERER.to_string()),
        }
    }

    /// Apply command-line platform overrides.
    pub fn with_platform(mut self, goos: Option<String>, goarch: Option<String>) -> Self {
        if let Some(goos) = goos {
            self.goos = goos;
        }
        if let Some(goarch) = goarch {
            self.goarch = goarch;
        }
        self
    }
}

fn read_file(path: &Path) -> Result<FileConfig> {
    let text = fs::read_to_string(path).map_err(|e| GodepError::io(path, e))?;
    let file = toml::from_str(&text).map_err(|source| GodepError::Config {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(config = %path.display(), "config file loaded");
    Ok(file)
}

fn process_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

/// `$GOROOT/src` as reported by the Go tool, or the usual install location.
fn default_std_root() -> PathBuf {
    let goroot = Command::new("go")
        .args(["env", "GOROOT"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|goroot| !goroot.is_empty())
        .unwrap_or_else(|| FALLBACK_GOROOT.to_string());
    PathBuf::from(goroot).join("src")
}

fn default_import_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join("go")
        .join("pkg")
        .join("mod")
}

/// Host OS under its GOOS name.
fn host_goos() -> String {
    match env::consts::OS {
        "macos" => "darwin",
        os => os,
    }
    .to_string()
}

/// Host architecture under its GOARCH name.
fn host_goarch() -> String {
    match env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "loongarch64" => "loong64",
        "powerpc64" => "ppc64",
        arch => arch,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_environment_roots() {
        let env = env_of(&[
            ("GOROOT", "/opt/go"),
            ("GOPATH", "/home/u/go"),
            ("GOOS", "linux"),
            ("GOARCH", "arm64"),
        ]);
        let config = GodepConfig::resolve(FileConfig::default(), &env);

        assert_eq!(config.std_root, PathBuf::from("/opt/go/src"));
        assert_eq!(config.import_root, PathBuf::from("/home/u/go/pkg/mod"));
        assert_eq!(config.goarch, "arm64");
        assert_eq!(config.skip_dirs, vec!["internal", "testdata"]);
        assert_eq!(config.renderer, "dot");
    }

    #[test]
    fn test_gomodcache_wins_over_gopath() {
        let env = env_of(&[
            ("GOROOT", "/opt/go"),
            ("GOMODCACHE", "/cache"),
            ("GOPATH", "/home/u/go"),
        ]);
        let config = GodepConfig::resolve(FileConfig::default(), &env);
        assert_eq!(config.import_root, PathBuf::from("/cache"));
    }

    #[test]
    fn test_environment_overrides_file() {
        let file: FileConfig = toml::from_str(
            r#"
std_root = "/file/go/src"
import_root = "/file/mod"
goos = "windows"
skip_dirs = ["testdata"]
renderer = "/usr/bin/dot"
"#,
        )
        .unwrap();
        let env = env_of(&[("GOOS", "linux"), ("GOARCH", "amd64")]);
        let config = GodepConfig::resolve(file, &env);

        assert_eq!(config.std_root, PathBuf::from("/file/go/src"));
        assert_eq!(config.import_root, PathBuf::from("/file/mod"));
        assert_eq!(config.goos, "linux");
        assert_eq!(config.skip_dirs, vec!["testdata"]);
        assert_eq!(config.renderer, "/usr/bin/dot");
    }

    #[test]
    fn test_cli_platform_overrides() {
        let env = env_of(&[("GOROOT", "/opt/go"), ("GOOS", "linux"), ("GOARCH", "amd64")]);
        let config = GodepConfig::resolve(FileConfig::default(), &env)
            .with_platform(Some("darwin".to_string()), None);
        assert_eq!(config.goos, "darwin");
        assert_eq!(config.goarch, "amd64");
    }

    #[test]
    fn test_default_file_in_cwd() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(DEFAULT_CONFIG_FILE),
            "renderer = \"neato\"\nstd_root = \"/x/src\"\n",
        )
        .unwrap();
        let file = read_file(&tmp.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(file.renderer.as_deref(), Some("neato"));
        assert_eq!(file.std_root, Some(PathBuf::from("/x/src")));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        fs::write(&path, "renderer = [\n").unwrap();
        assert!(matches!(
            GodepConfig::load(Some(&path), tmp.path()),
            Err(GodepError::Config { .. })
        ));

        fs::write(&path, "colour = \"red\"\n").unwrap();
        assert!(matches!(
            GodepConfig::load(Some(&path), tmp.path()),
            Err(GodepError::Config { .. })
        ));
    }

    #[test]
    fn test_missing_explicit_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            GodepConfig::load(Some(&tmp.path().join("nope.toml")), tmp.path()),
            Err(GodepError::Io { .. })
        ));
    }
}

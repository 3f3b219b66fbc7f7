//! Directory classification into graph categories.

use std::path::{Component, Path};

use super::types::Category;
use crate::locate::{subdir, Roots};

/// Where a directory lands in the node graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub category: Category,
    /// Top-level cluster name: `std`, `import`, `vendor` or the module path.
    pub tag: String,
    /// Category-relative package path, empty for the category root itself.
    pub package: String,
}

impl Placement {
    /// Package path as rendered: the tag when the directory is the root.
    pub fn label(&self) -> &str {
        if self.package.is_empty() {
            &self.tag
        } else {
            &self.package
        }
    }

    /// Node key `"<tag>: <package>"`.
    pub fn node(&self) -> String {
        format!("{}: {}", self.tag, self.label())
    }

    /// Cluster keys for each proper prefix of the package path, outermost
    /// first, paired with the prefix itself.
    pub fn prefixes(&self) -> Vec<(String, String)> {
        let segments: Vec<&str> = self.package.split('/').filter(|s| !s.is_empty()).collect();
        (1..segments.len())
            .map(|n| {
                let prefix = segments[..n].join("/");
                (format!("{}: {}", self.tag, prefix), prefix)
            })
            .collect()
    }
}

/// Maps directories to categories, testing the standard library first,
/// then the module cache, then the module.
#[derive(Debug, Clone)]
pub struct Classifier<'a> {
    roots: &'a Roots,
}

impl<'a> Classifier<'a> {
    pub fn new(roots: &'a Roots) -> Self {
        Self { roots }
    }

    /// Top-level cluster name for a category.
    pub fn tag(&self, category: Category) -> &str {
        match category {
            Category::Standard => "std",
            Category::Module => &self.roots.module_path,
            Category::Imported => "import",
            Category::Vendored => "vendor",
        }
    }

    /// Categories rendered as top-level clusters. The module cluster is
    /// omitted when the standard library itself is analyzed.
    pub fn categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|&c| c != Category::Module || !self.roots.is_std_mode())
            .collect()
    }

    /// Classify a directory, or `None` when it lies under no known root.
    pub fn classify(&self, dir: &str) -> Option<Placement> {
        let path = Path::new(dir);
        let candidates = [
            (Category::Standard, &self.roots.std),
            (Category::Imported, &self.roots.imports),
            (Category::Module, &self.roots.module_dir),
        ];

        for (category, root) in candidates {
            if category == Category::Module && self.roots.is_std_mode() {
                continue;
            }
            let Some(rel) = subdir(root, path) else {
                continue;
            };
            // A module inside the cache resolves as the module.
            if category == Category::Imported && self.roots.in_module(path) {
                continue;
            }

            let package = slash_path(&rel);
            let vendored = package
                .strip_prefix("vendor/")
                .or_else(|| package.split_once("/vendor/").map(|(_, rest)| rest))
                .map(str::to_string);
            let (category, package) = match vendored {
                Some(vendored) => (Category::Vendored, vendored),
                None => (category, package),
            };
            return Some(Placement {
                category,
                tag: self.tag(category).to_string(),
                package,
            });
        }
        None
    }
}

fn slash_path(rel: &Path) -> String {
    rel.components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn roots(module_dir: &str) -> Roots {
        Roots {
            std: PathBuf::from("/go/src"),
            imports: PathBuf::from("/gopath/pkg/mod"),
            module_path: "example.com/m".to_string(),
            module_dir: PathBuf::from(module_dir),
        }
    }

    #[test]
    fn test_classify_each_root() {
        let roots = roots("/work/m");
        let classifier = Classifier::new(&roots);

        let std = classifier.classify("/go/src/io/fs").unwrap();
        assert_eq!(std.category, Category::Standard);
        assert_eq!(std.node(), "std: io/fs");

        let imported = classifier.classify("/gopath/pkg/mod/github.com/x/y").unwrap();
        assert_eq!(imported.category, Category::Imported);
        assert_eq!(imported.node(), "import: github.com/x/y");

        let module = classifier.classify("/work/m/app").unwrap();
        assert_eq!(module.category, Category::Module);
        assert_eq!(module.node(), "example.com/m: app");

        assert!(classifier.classify("/elsewhere").is_none());
    }

    #[test]
    fn test_module_root_labelled_by_tag() {
        let roots = roots("/work/m");
        let root = Classifier::new(&roots).classify("/work/m").unwrap();
        assert_eq!(root.package, "");
        assert_eq!(root.node(), "example.com/m: example.com/m");
    }

    #[test]
    fn test_vendor_segment_reclassifies() {
        let roots = roots("/work/m");
        let classifier = Classifier::new(&roots);

        let vendored = classifier
            .classify("/work/m/vendor/golang.org/x/text")
            .unwrap();
        assert_eq!(vendored.category, Category::Vendored);
        assert_eq!(vendored.node(), "vendor: golang.org/x/text");

        let std_vendored = classifier
            .classify("/go/src/vendor/golang.org/x/net/dns")
            .unwrap();
        assert_eq!(std_vendored.category, Category::Vendored);
        assert_eq!(std_vendored.package, "golang.org/x/net/dns");

        let nested = classifier.classify("/work/m/third/vendor/a/b").unwrap();
        assert_eq!(nested.node(), "vendor: a/b");
    }

    #[test]
    fn test_vendor_above_root_is_ignored() {
        let roots = roots("/srv/vendor/src/m");
        let classifier = Classifier::new(&roots);

        let module = classifier.classify("/srv/vendor/src/m/app").unwrap();
        assert_eq!(module.category, Category::Module);
        assert_eq!(module.node(), "example.com/m: app");
    }

    #[test]
    fn test_module_in_cache_is_module() {
        let roots = roots("/gopath/pkg/mod/github.com/x/y");
        let classifier = Classifier::new(&roots);

        let own = classifier
            .classify("/gopath/pkg/mod/github.com/x/y/sub")
            .unwrap();
        assert_eq!(own.category, Category::Module);
        assert_eq!(own.package, "sub");

        let other = classifier.classify("/gopath/pkg/mod/github.com/z").unwrap();
        assert_eq!(other.category, Category::Imported);
    }

    #[test]
    fn test_std_mode_has_no_module_category() {
        let mut roots = roots("/go/src");
        roots.module_path = "std".to_string();
        let classifier = Classifier::new(&roots);

        assert_eq!(
            classifier.classify("/go/src/net/http").unwrap().category,
            Category::Standard
        );
        assert!(!classifier.categories().contains(&Category::Module));
    }

    #[test]
    fn test_prefixes() {
        let placement = Placement {
            category: Category::Imported,
            tag: "import".to_string(),
            package: "golang.org/x/net".to_string(),
        };
        assert_eq!(
            placement.prefixes(),
            vec![
                ("import: golang.org".to_string(), "golang.org".to_string()),
                ("import: golang.org/x".to_string(), "golang.org/x".to_string()),
            ]
        );
        assert_eq!(placement.label(), "golang.org/x/net");
    }
}

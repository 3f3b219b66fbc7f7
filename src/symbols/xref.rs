//! Cross-referencing: rewrites raw references into resolved edges.
//!
//! Before: `References[pkg.X]` holds the directories that use `pkg.X`.
//! After: `References[pkg.X][referencer]` holds the directories that
//! define it, or the import directories of its package when it is not
//! defined by anything extracted. Only referencers inside the module
//! survive.

use std::path::Path;
use tracing::info;

use super::SymbolTables;
use crate::locate::Roots;
use crate::tree::SymbolTree;

/// Resolve every reference key in place. Returns the number of
/// referencer → target edges written.
pub fn resolve_references(tables: &mut SymbolTables, roots: &Roots) -> usize {
    let keys: Vec<String> = tables
        .references
        .keys()
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut edges = 0;

    for key in keys {
        let Some(raw) = tables.references.remove(&key) else {
            continue;
        };
        let referencers: Vec<&str> = raw
            .keys()
            .into_iter()
            .filter(|dir| roots.in_module(Path::new(dir)))
            .collect();
        if referencers.is_empty() {
            continue;
        }

        let targets = targets(tables, roots, &key);
        let mut resolved = SymbolTree::new();
        for referencer in referencers {
            let entry = resolved.subtree(referencer);
            for target in &targets {
                entry.insert([target.as_str()]);
                edges += 1;
            }
        }
        tables.references.set(key, resolved);
    }

    info!(
        symbols = tables.references.len(),
        edges, "references resolved"
    );
    edges
}

/// Defining directories of `key`, else the out-of-module import
/// directories of its package.
fn targets(tables: &SymbolTables, roots: &Roots, key: &str) -> Vec<String> {
    if let Some(definers) = tables.definitions.get(key) {
        return definers.keys().into_iter().map(str::to_string).collect();
    }
    let package = key.split_once('.').map_or(key, |(package, _)| package);
    tables
        .imports
        .get(package)
        .map(|dirs| {
            dirs.keys()
                .into_iter()
                .filter(|dir| !roots.in_module(Path::new(dir)))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

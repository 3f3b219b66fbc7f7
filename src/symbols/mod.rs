//! The symbol database of an analysis run.
//!
//! [`SymbolTables`] owns the eight trees and is handed, phase by phase, to
//! the extractor, the cross-referencer and the satisfaction engine. The
//! graph builder then reads the resolved references.

pub mod extract;
pub mod satisfy;
pub mod xref;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};

use crate::tree::SymbolTree;

pub use extract::Extractor;
pub use satisfy::{typesets, SatisfactionReport};
pub use xref::resolve_references;

/// The trees of the symbol database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TreeKind {
    /// Package name → directories providing it.
    Imports,
    /// Interface → method signatures (embedded names before expansion).
    Interfaces,
    /// Type → member descriptors.
    Types,
    /// Value → initializer texts.
    Values,
    /// Function → `Name(signature)`.
    Functions,
    /// Symbol → defining directories.
    Definitions,
    /// Symbol → referencing directories, then referencer → definers.
    References,
    /// Interface → implementing types.
    Implements,
}

impl TreeKind {
    pub const ALL: [TreeKind; 8] = [
        TreeKind::Imports,
        TreeKind::Interfaces,
        TreeKind::Types,
        TreeKind::Values,
        TreeKind::Functions,
        TreeKind::Definitions,
        TreeKind::References,
        TreeKind::Implements,
    ];
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeKind::Imports => write!(f, "IMPORTS"),
            TreeKind::Interfaces => write!(f, "INTERFACES"),
            TreeKind::Types => write!(f, "TYPES"),
            TreeKind::Values => write!(f, "VALUES"),
            TreeKind::Functions => write!(f, "FUNCTIONS"),
            TreeKind::Definitions => write!(f, "DEFINITIONS"),
            TreeKind::References => write!(f, "REFERENCES"),
            TreeKind::Implements => write!(f, "IMPLEMENTS"),
        }
    }
}

/// All trees of one analysis run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SymbolTables {
    pub imports: SymbolTree,
    pub interfaces: SymbolTree,
    pub types: SymbolTree,
    pub values: SymbolTree,
    pub functions: SymbolTree,
    pub definitions: SymbolTree,
    pub references: SymbolTree,
    pub implements: SymbolTree,
}

impl SymbolTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self, kind: TreeKind) -> &SymbolTree {
        match kind {
            TreeKind::Imports => &self.imports,
            TreeKind::Interfaces => &self.interfaces,
            TreeKind::Types => &self.types,
            TreeKind::Values => &self.values,
            TreeKind::Functions => &self.functions,
            TreeKind::Definitions => &self.definitions,
            TreeKind::References => &self.references,
            TreeKind::Implements => &self.implements,
        }
    }

    /// Top-level key counts per tree.
    pub fn counts(&self) -> BTreeMap<TreeKind, usize> {
        TreeKind::ALL
            .iter()
            .map(|&kind| (kind, self.tree(kind).len()))
            .collect()
    }

    /// Write every tree as a `==== NAME ====` block, one line per node,
    /// indented with a tab per level.
    pub fn report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for kind in TreeKind::ALL {
            writeln!(out, "==== {kind} ====")?;
            let mut result = Ok(());
            self.tree(kind).traverse(|depth, key| {
                if result.is_ok() {
                    result = writeln!(out, "{}{}", "\t".repeat(depth), key);
                }
            });
            result?;
        }
        Ok(())
    }

    /// Write all trees as one JSON object keyed by tree name.
    pub fn report_json<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let trees: BTreeMap<String, &SymbolTree> = TreeKind::ALL
            .iter()
            .map(|&kind| (kind.to_string(), self.tree(kind)))
            .collect();
        serde_json::to_writer_pretty(&mut *out, &trees)?;
        writeln!(out)
    }
}

//! # godep
//!
//! Package dependency node graph for a Go module.
//!
//! godep reads the Go sources of a module, records which exported types,
//! interfaces, functions and values each package defines and uses, and
//! draws how the module's packages depend on the standard library, on each
//! other and on imported modules.
//!
//! ## Key Features
//!
//! - **Symbol trees**: imports, interfaces, types, values, functions,
//!   definitions, references and interface implementations
//! - **Structural typing**: which types satisfy which interfaces
//! - **Deterministic output**: identical input gives byte-identical DOT
//! - **Nested clusters**: one cluster per package path segment
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use godep::{analyze, GodepConfig};
//! use std::path::Path;
//!
//! let config = GodepConfig::load(None, Path::new(".")).unwrap();
//! let analysis = analyze(Path::new("."), &config).unwrap();
//!
//! // Graphviz DOT text of the package graph
//! println!("{}", analysis.graph.to_dot());
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod loader;
pub mod locate;
pub mod parser;
pub mod render;
pub mod symbols;
pub mod tree;

use std::path::Path;
use tracing::info;

// Re-exports for convenience
pub use config::GodepConfig;
pub use error::{GodepError, Result};

pub use graph::{Category, GraphStats, NodeGraph};
pub use loader::{LoadStats, Loader};
pub use locate::Roots;
pub use parser::{parse_file, Platform, SourceFile};
pub use symbols::{resolve_references, typesets, SatisfactionReport, SymbolTables, TreeKind};
pub use tree::{canonical_cmp, SymbolTree};

/// Everything produced by one analysis run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub roots: Roots,
    pub tables: SymbolTables,
    pub load: LoadStats,
    /// Referencer → target edges written by the cross-referencer.
    pub resolved: usize,
    pub satisfaction: SatisfactionReport,
    pub graph: NodeGraph,
}

/// Analyze the module enclosing `root`: extract, cross-reference, compute
/// interface satisfaction and build the node graph, in that order.
pub fn analyze(root: &Path, config: &GodepConfig) -> Result<Analysis> {
    let root = locate::versioned_dir(&config.import_root, root);
    let roots = Roots::discover(&root, config.std_root.clone(), config.import_root.clone())?;
    info!(
        module = %roots.module_path,
        dir = %roots.module_dir.display(),
        "module resolved"
    );

    let platform = Platform::new(&config.goos, &config.goarch);
    let mut tables = SymbolTables::new();
    let load = Loader::new(&roots, &platform, &config.skip_dirs).load(&root, &mut tables)?;
    let resolved = resolve_references(&mut tables, &roots);
    let satisfaction = typesets(&mut tables);
    let graph = NodeGraph::build(&tables.references, &roots);
    info!(
        symbols = ?tables.counts(),
        resolved,
        implements = satisfaction.pairs,
        "analysis complete"
    );

    Ok(Analysis {
        roots,
        tables,
        load,
        resolved,
        satisfaction,
        graph,
    })
}

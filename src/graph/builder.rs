//! Graph builder: turns resolved references into the package node graph.
//!
//! Each referencer → target directory pair is classified, both package
//! nodes are placed in the layout, and one oriented edge statement is
//! recorded. Edges that loop on one node, or that touch no module package,
//! are left out.

use tracing::{debug, info};

use super::classify::{Classifier, Placement};
use super::layout::Layout;
use super::render;
use super::types::{Category, Endpoint, OrientedEdge};
use crate::locate::Roots;
use crate::tree::SymbolTree;

/// The package node graph of one module.
#[derive(Debug, Clone)]
pub struct NodeGraph {
    module_path: String,
    /// Top-level cluster tags in render order.
    tags: Vec<String>,
    layout: Layout,
    edges: SymbolTree,
}

/// Counts from building a node graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub packages: usize,
    pub edges: usize,
}

impl NodeGraph {
    /// Build from resolved references (symbol → referencer → targets).
    pub fn build(references: &SymbolTree, roots: &Roots) -> Self {
        let classifier = Classifier::new(roots);
        let categories = classifier.categories();
        let tags: Vec<String> = categories
            .iter()
            .map(|&category| classifier.tag(category).to_string())
            .collect();
        let layout = Layout::new(
            categories
                .iter()
                .copied()
                .zip(tags.iter().map(String::as_str)),
        );

        let mut graph = Self {
            module_path: roots.module_path.clone(),
            tags,
            layout,
            edges: SymbolTree::new(),
        };
        let std_mode = roots.is_std_mode();

        for (_, referencers) in references.entries() {
            for (referencer, targets) in referencers.entries() {
                let Some(r) = classifier.classify(referencer) else {
                    debug!(dir = referencer, "referencer outside known roots");
                    continue;
                };
                let Some(r_leaf) = graph.layout.place(&r) else {
                    continue;
                };

                for target in targets.keys() {
                    let Some(d) = classifier.classify(target) else {
                        debug!(dir = target, "target outside known roots");
                        continue;
                    };
                    let Some(d_leaf) = graph.layout.place(&d) else {
                        continue;
                    };
                    let (r_node, d_node) = (r.node(), d.node());
                    if r_node == d_node || (!std_mode && !touches_module(&r, &d)) {
                        continue;
                    }

                    for leaf in [r_leaf, d_leaf] {
                        graph.layout.tooltip(leaf, &r_node);
                        graph.layout.tooltip(leaf, &d_node);
                    }
                    let edge = OrientedEdge::between(
                        &Endpoint::new(r.category.order(), r_node),
                        &Endpoint::new(d.category.order(), d_node),
                    );
                    graph.edges.insert([render::edge(&edge)]);
                }
            }
        }

        let stats = graph.stats();
        info!(
            packages = stats.packages,
            edges = stats.edges,
            "node graph built"
        );
        graph
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            packages: self.layout.package_count(),
            edges: self.edges.len(),
        }
    }

    /// Serialize as DOT: header, clusters and nodes, cluster ordering
    /// edges, reference edges.
    pub fn to_dot(&self) -> String {
        let mut dot = render::header(&self.module_path);
        self.layout.render_into(&mut dot);
        for pair in self.tags.windows(2) {
            dot.push_str(&render::ordering_edge(&pair[0], &pair[1]));
        }
        self.edges.traverse(|_, edge| dot.push_str(edge));
        dot.push_str("\n}\n");
        dot
    }
}

fn touches_module(r: &Placement, d: &Placement) -> bool {
    r.category == Category::Module || d.category == Category::Module
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn roots() -> Roots {
        Roots {
            std: PathBuf::from("/go/src"),
            imports: PathBuf::from("/mod"),
            module_path: "example.com/m".to_string(),
            module_dir: PathBuf::from("/work/m"),
        }
    }

    fn references(edges: &[(&str, &str)]) -> SymbolTree {
        let mut tree = SymbolTree::new();
        for (i, (r, d)) in edges.iter().enumerate() {
            tree.insert([format!("p.S{i}"), r.to_string(), d.to_string()]);
        }
        tree
    }

    fn edge_lines(dot: &str) -> Vec<&str> {
        dot.lines()
            .filter(|line| line.contains(" -> ") && !line.contains("style=invis"))
            .collect()
    }

    #[test]
    fn test_single_edge_module_to_standard() {
        let refs = references(&[("/work/m/app", "/go/src/fmt")]);
        let graph = NodeGraph::build(&refs, &roots());
        let dot = graph.to_dot();

        assert_eq!(graph.stats(), GraphStats { packages: 2, edges: 1 });
        assert_eq!(edge_lines(&dot).len(), 1);
        assert!(dot.contains("\"std: fmt\" -> \"example.com/m: app\" [tailport=e headport=w dir=back"));
        assert!(dot.ends_with("\n}\n"));
    }

    #[test]
    fn test_self_loop_and_external_edges_skipped() {
        let refs = references(&[
            ("/work/m/app", "/work/m/app"),
            ("/mod/github.com/x/y", "/go/src/io"),
        ]);
        let graph = NodeGraph::build(&refs, &roots());
        assert_eq!(graph.stats().edges, 0);
    }

    #[test]
    fn test_duplicate_pairs_collapse() {
        let refs = references(&[
            ("/work/m/app", "/go/src/fmt"),
            ("/work/m/app", "/go/src/fmt"),
            ("/work/m/app", "/go/src/fmt"),
        ]);
        assert_eq!(NodeGraph::build(&refs, &roots()).stats().edges, 1);
    }

    #[test]
    fn test_std_mode_keeps_standard_edges() {
        let mut roots = roots();
        roots.module_dir = roots.std.clone();
        roots.module_path = "std".to_string();
        let refs = references(&[("/go/src/net/http", "/go/src/io")]);
        let graph = NodeGraph::build(&refs, &roots);
        let dot = graph.to_dot();

        assert_eq!(graph.stats().edges, 1);
        assert!(dot.contains("\"std: io\" -> \"std: net/http\" [tailport=w headport=w dir=back"));
        assert!(!dot.contains("subgraph \"example.com/m\""));
    }

    #[test]
    fn test_ordering_edges_chain_top_clusters() {
        let graph = NodeGraph::build(&SymbolTree::new(), &roots());
        let dot = graph.to_dot();

        let chain = concat!(
            "\n\"std anchor\" -> \"example.com/m anchor\" [style=invis]",
            "\n\"example.com/m anchor\" -> \"import anchor\" [style=invis]",
            "\n\"import anchor\" -> \"vendor anchor\" [style=invis]",
        );
        assert!(dot.contains(chain));
    }

    #[test]
    fn test_build_is_deterministic() {
        let refs = references(&[
            ("/work/m/app", "/go/src/fmt"),
            ("/work/m/app", "/mod/github.com/x/y/z"),
            ("/work/m/cmd/tool", "/work/m/app"),
            ("/work/m/cmd/tool", "/go/src/io/fs"),
            ("/work/m/cmd/tool", "/go/src/io"),
        ]);
        let a = NodeGraph::build(&refs, &roots()).to_dot();
        let b = NodeGraph::build(&refs, &roots()).to_dot();
        assert_eq!(a, b);
    }
}

//! Nested cluster/node layout of the rendered graph.
//!
//! Statements live in a petgraph arena with parent → child edges, so a
//! package node can be moved under a cluster created after it without
//! copying. Rendering walks the arena depth-first in canonical order and
//! concatenates each statement without its sort byte; the close sentinels
//! sort last among their siblings, which closes every cluster and node
//! right after its last child.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction::Outgoing;
use std::collections::HashMap;

use super::classify::Placement;
use super::render;
use super::types::Category;
use crate::tree::canonical_cmp;

#[derive(Debug, Clone)]
pub struct Layout {
    arena: DiGraph<String, ()>,
    root: NodeIndex,
    /// Child of a parent by statement text.
    children: HashMap<(NodeIndex, String), NodeIndex>,
    /// Top-level cluster of each category.
    tops: HashMap<Category, NodeIndex>,
    /// Inner clusters by `"<tag>: <prefix>"`.
    clusters: HashMap<String, NodeIndex>,
    /// Package nodes by `"<tag>: <package>"`.
    leaves: HashMap<String, NodeIndex>,
}

impl Layout {
    /// Layout with one top-level cluster (and its anchor) per category.
    pub fn new<'t>(categories: impl IntoIterator<Item = (Category, &'t str)>) -> Self {
        let mut arena = DiGraph::new();
        let root = arena.add_node(String::new());
        let mut layout = Self {
            arena,
            root,
            children: HashMap::new(),
            tops: HashMap::new(),
            clusters: HashMap::new(),
            leaves: HashMap::new(),
        };

        for (category, tag) in categories {
            let top = layout.child(root, render::top_cluster(category, tag));
            layout.child(top, render::anchor(tag));
            layout.child(top, render::CLUSTER_CLOSE.to_string());
            layout.tops.insert(category, top);
        }
        layout
    }

    /// Get or create the child of `parent` with the given statement.
    fn child(&mut self, parent: NodeIndex, statement: String) -> NodeIndex {
        if let Some(&index) = self.children.get(&(parent, statement.clone())) {
            return index;
        }
        let index = self.arena.add_node(statement.clone());
        self.arena.add_edge(parent, index, ());
        self.children.insert((parent, statement), index);
        index
    }

    /// Move `node` from `from` to `to`.
    fn relocate(&mut self, node: NodeIndex, from: NodeIndex, to: NodeIndex) {
        if let Some(edge) = self.arena.find_edge(from, node) {
            self.arena.remove_edge(edge);
        }
        let statement = self.arena[node].clone();
        self.children.remove(&(from, statement.clone()));
        self.arena.add_edge(to, node, ());
        self.children.insert((to, statement), node);
    }

    /// Add the clusters and the package node for a placement, returning
    /// the package node. `None` when the category has no top-level cluster.
    pub fn place(&mut self, placement: &Placement) -> Option<NodeIndex> {
        let mut parent = *self.tops.get(&placement.category)?;

        for (key, prefix) in placement.prefixes() {
            let cluster = match self.clusters.get(&key) {
                Some(&cluster) => cluster,
                None => {
                    let cluster = self.child(parent, render::inner_cluster(&key, &prefix));
                    self.child(cluster, render::CLUSTER_CLOSE.to_string());
                    self.clusters.insert(key.clone(), cluster);
                    // A package node placed earlier at this path now has
                    // sub-packages: it moves into the new cluster.
                    if let Some(&leaf) = self.leaves.get(&key) {
                        self.relocate(leaf, parent, cluster);
                    }
                    cluster
                }
            };
            parent = cluster;
        }

        let node = placement.node();
        if let Some(&leaf) = self.leaves.get(&node) {
            return Some(leaf);
        }
        // The package already has sub-packages: place it in their cluster.
        if let Some(&cluster) = self.clusters.get(&node) {
            parent = cluster;
        }
        let leaf = self.child(parent, render::node(&node, placement.label()));
        self.child(leaf, render::NODE_CLOSE.to_string());
        self.leaves.insert(node, leaf);
        Some(leaf)
    }

    /// Add a tooltip line naming `node` to a package node.
    pub fn tooltip(&mut self, leaf: NodeIndex, node: &str) {
        self.child(leaf, render::tooltip(node));
    }

    pub fn package_count(&self) -> usize {
        self.leaves.len()
    }

    /// Append every statement in canonical depth-first order.
    pub fn render_into(&self, out: &mut String) {
        let mut stack = self.sorted_children(self.root);
        stack.reverse();
        while let Some(index) = stack.pop() {
            out.push_str(render::strip_sort(&self.arena[index]));
            let mut children = self.sorted_children(index);
            children.reverse();
            stack.extend(children);
        }
    }

    fn sorted_children(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self.arena.neighbors_directed(index, Outgoing).collect();
        children.sort_by(|&a, &b| canonical_cmp(&self.arena[a], &self.arena[b]));
        children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(category: Category, tag: &str, package: &str) -> Placement {
        Placement {
            category,
            tag: tag.to_string(),
            package: package.to_string(),
        }
    }

    fn layout() -> Layout {
        Layout::new([
            (Category::Standard, "std"),
            (Category::Module, "example.com/m"),
            (Category::Imported, "import"),
        ])
    }

    fn render(layout: &Layout) -> String {
        let mut out = String::new();
        layout.render_into(&mut out);
        out
    }

    fn balanced(text: &str) -> bool {
        let mut depth: i64 = 0;
        for c in text.chars() {
            match c {
                '{' | '[' => depth += 1,
                '}' | ']' => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return false;
            }
        }
        depth == 0
    }

    #[test]
    fn test_top_clusters_in_category_order() {
        let text = render(&layout());
        let std = text.find("subgraph \"std\"").unwrap();
        let module = text.find("subgraph \"example.com/m\"").unwrap();
        let import = text.find("subgraph \"import\"").unwrap();
        assert!(std < module && module < import);
        assert!(balanced(&text));
    }

    #[test]
    fn test_place_is_idempotent() {
        let mut layout = layout();
        let p = placement(Category::Standard, "std", "io");
        let first = layout.place(&p).unwrap();
        let second = layout.place(&p).unwrap();
        assert_eq!(first, second);
        assert_eq!(layout.package_count(), 1);
    }

    #[test]
    fn test_leaf_moves_into_later_cluster() {
        let mut layout = layout();
        let io = layout.place(&placement(Category::Standard, "std", "io")).unwrap();
        layout.place(&placement(Category::Standard, "std", "io/fs")).unwrap();

        let text = render(&layout);
        let cluster = text.find("subgraph \"std: io\"").unwrap();
        let io_node = text.find("\n\"std: io\" [").unwrap();
        let fs_node = text.find("\n\"std: io/fs\" [").unwrap();
        let close = cluster + text[cluster..].find("\n}").unwrap();
        assert!(cluster < io_node && io_node < close);
        assert!(cluster < fs_node && fs_node < close);
        assert!(balanced(&text));
        assert_eq!(layout.place(&placement(Category::Standard, "std", "io")), Some(io));
    }

    #[test]
    fn test_leaf_joins_existing_cluster() {
        let mut layout = layout();
        layout.place(&placement(Category::Standard, "std", "io/fs")).unwrap();
        layout.place(&placement(Category::Standard, "std", "io")).unwrap();

        let text = render(&layout);
        let cluster = text.find("subgraph \"std: io\"").unwrap();
        let io_node = text.find("\n\"std: io\" [").unwrap();
        let close = cluster + text[cluster..].find("\n}").unwrap();
        assert!(cluster < io_node && io_node < close);
        assert!(balanced(&text));
    }

    #[test]
    fn test_tooltips_close_node() {
        let mut layout = layout();
        let leaf = layout.place(&placement(Category::Module, "example.com/m", "app")).unwrap();
        layout.tooltip(leaf, "std: fmt");
        layout.tooltip(leaf, "example.com/m: app");
        layout.tooltip(leaf, "std: fmt");

        let text = render(&layout);
        assert!(text.contains(
            "tooltip=\"example.com/m: app\\nstd: fmt\\n\"]"
        ));
    }

    #[test]
    fn test_same_path_in_two_categories_stays_apart() {
        let mut layout = layout();
        let a = layout.place(&placement(Category::Standard, "std", "x/y")).unwrap();
        let b = layout.place(&placement(Category::Imported, "import", "x/y")).unwrap();
        assert_ne!(a, b);

        let text = render(&layout);
        assert!(text.contains("subgraph \"std: x\""));
        assert!(text.contains("subgraph \"import: x\""));
    }

    #[test]
    fn test_missing_category_places_nothing() {
        let mut layout = Layout::new([(Category::Standard, "std")]);
        assert!(layout.place(&placement(Category::Vendored, "vendor", "a")).is_none());
        assert_eq!(layout.package_count(), 0);
        assert!(!render(&layout).contains("vendor"));
    }
}

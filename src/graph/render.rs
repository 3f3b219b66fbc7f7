//! DOT statement templates and node colours.
//!
//! Every statement starts with one sort byte that is dropped on output:
//! `0x00` for inner clusters and anchors, the category order for top-level
//! clusters, a space for nodes and tooltip lines, and `0x7F` for the close
//! sentinels. Canonical order of these keys is therefore output order.

use sha2::{Digest, Sha256};

use super::types::{Category, OrientedEdge};

/// Close sentinel of a cluster.
pub const CLUSTER_CLOSE: &str = "\x7F\n}";

/// Close sentinel of a node's tooltip and attributes.
pub const NODE_CLOSE: &str = "\x7F\"]";

/// HSV colours that read well on both light and dark backgrounds.
const COLORS: [&str; 10] = [
    "0.0 0.5 0.80",
    "0.1 0.5 0.75",
    "0.2 0.5 0.7 ",
    "0.3 0.5 0.75",
    "0.4 0.5 0.75",
    "0.5 0.5 0.75",
    "0.6 0.5 0.9 ",
    "0.7 0.5 1.0",
    "0.8 0.5 0.9",
    "0.9 0.5 0.85",
];

/// Colour for a label, stable across runs.
pub fn color(label: &str) -> &'static str {
    let digest = Sha256::digest(label.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    let index = u64::from_be_bytes(bytes) % COLORS.len() as u64;
    COLORS[index as usize]
}

/// Double-quoted DOT string.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Graph header for the module.
pub fn header(module_path: &str) -> String {
    format!(
        r#"digraph {} {{
  label="\G"
  labelloc=t
  fontname="sans-serif"
  fontsize=14.0
  fontcolor=lightgrey
  bgcolor=black
  rankdir=LR
  newrank=true
  compound=true
  ordering=out
  nodesep=0.05
  ranksep=8
  node [shape=rect style="filled" height=0.3 width=1.5 margin="0.2,0.0" fontname="sans-serif" fontsize=11.0]
  edge [penwidth=2.0]"#,
        quote(&format!("Module \"{module_path}\" Packages Nodegraph"))
    )
}

/// Opening statement of a cluster.
pub fn subgraph(sort: u8, id: &str, bgcolor: &str, label: &str, rank: &str) -> String {
    format!(
        "{}\nsubgraph {} {{ cluster=true fontcolor=black bgcolor={} label={} {}",
        char::from(sort),
        quote(id),
        quote(bgcolor),
        quote(label),
        rank
    )
}

/// Opening statement of a top-level category cluster.
pub fn top_cluster(category: Category, tag: &str) -> String {
    let label = match category {
        Category::Standard => "Go Standard Packages",
        Category::Module => tag,
        Category::Imported => "Imported Packages",
        Category::Vendored => "Vendored Packages",
    };
    subgraph(category.order(), tag, "lightgrey", label, category.rank())
}

/// Opening statement of an inner cluster for a package path prefix.
pub fn inner_cluster(key: &str, prefix: &str) -> String {
    subgraph(0x00, key, color(prefix), prefix, "rank=same")
}

/// Opening statement of a package node; its tooltip lines and
/// [`NODE_CLOSE`] follow as children.
pub fn node(key: &str, label: &str) -> String {
    format!(
        " \n{} [fillcolor={} label={} tooltip=\"",
        quote(key),
        quote(color(key)),
        quote(label)
    )
}

/// One tooltip line naming a node at either end of an edge.
pub fn tooltip(node: &str) -> String {
    format!(" {node}\\n")
}

/// Identifier of the invisible anchor node of a top-level cluster.
pub fn anchor_id(tag: &str) -> String {
    format!("{tag} anchor")
}

/// Invisible anchor node; sorts first inside its cluster.
pub fn anchor(tag: &str) -> String {
    format!(
        "\x00\n{} [style=invis shape=point label=\"\"]",
        quote(&anchor_id(tag))
    )
}

/// Invisible edge that keeps two top-level clusters in order.
pub fn ordering_edge(from: &str, to: &str) -> String {
    format!(
        "\n{} -> {} [style=invis]",
        quote(&anchor_id(from)),
        quote(&anchor_id(to))
    )
}

/// Edge statement; the gradient runs from the head's colour to the tail's.
pub fn edge(edge: &OrientedEdge) -> String {
    format!(
        "\n{} -> {} [{} dir={} color={} tooltip=\"{}\\n{}\"]",
        quote(&edge.tail),
        quote(&edge.head),
        edge.ports(),
        edge.direction,
        quote(&format!("{};0.5:{}", color(&edge.head), color(&edge.tail))),
        edge.tail,
        edge.head
    )
}

/// Drop the leading sort byte of a statement.
pub fn strip_sort(statement: &str) -> &str {
    statement.get(1..).unwrap_or_default()
}

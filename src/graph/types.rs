//! Core types for the package node graph.
//!
//! Categories of source directories, edge ports and directions, and the
//! oriented edge computed from two classified endpoints.

use serde::Serialize;
use std::fmt;

/// The source domain a directory belongs to.
///
/// The derived order is the render order of the top-level clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// The Go standard library (`$GOROOT/src`).
    Standard,
    /// The analyzed module.
    Module,
    /// A dependency in the module cache.
    Imported,
    /// Code under a `vendor/` directory.
    Vendored,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Standard,
        Category::Module,
        Category::Imported,
        Category::Vendored,
    ];

    /// Fixed order index used for cluster placement, edge direction and ports.
    pub fn order(self) -> u8 {
        match self {
            Category::Standard => 0x01,
            Category::Module => 0x02,
            Category::Imported => 0x03,
            Category::Vendored => 0x04,
        }
    }

    /// `rank` attribute of the top-level cluster.
    pub fn rank(self) -> &'static str {
        match self {
            Category::Standard => "rank=source",
            Category::Module => "rank=same",
            Category::Imported | Category::Vendored => "rank=sink",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Standard => write!(f, "standard"),
            Category::Module => write!(f, "module"),
            Category::Imported => write!(f, "imported"),
            Category::Vendored => write!(f, "vendored"),
        }
    }
}

/// Side of a node an edge attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    East,
    West,
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Port::East => write!(f, "e"),
            Port::West => write!(f, "w"),
        }
    }
}

/// Arrow direction of a rendered edge relative to tail → head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The referencer is the tail.
    Forward,
    /// The referencer is the head; the arrow points back at the tail.
    Back,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Back => write!(f, "back"),
        }
    }
}

/// One side of a reference edge: category order and node key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub order: u8,
    pub node: String,
}

impl Endpoint {
    pub fn new(order: u8, node: impl Into<String>) -> Self {
        Self {
            order,
            node: node.into(),
        }
    }
}

/// A reference edge oriented for rendering: the tail is always the side
/// with the lower category order, or the lower node key on a tie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrientedEdge {
    pub tail: String,
    pub head: String,
    pub direction: Direction,
    pub tail_port: Port,
    pub head_port: Port,
}

impl OrientedEdge {
    /// Orient the edge from referencer `r` to definer `d`.
    pub fn between(r: &Endpoint, d: &Endpoint) -> Self {
        let (tail_port, head_port) = if r.order == 1 && d.order == 1 {
            (Port::West, Port::West)
        } else if r.order == d.order {
            (Port::East, Port::East)
        } else {
            (Port::East, Port::West)
        };

        let forward = r.order < d.order || (r.order == d.order && r.node < d.node);
        let (tail, head, direction) = if forward {
            (&r.node, &d.node, Direction::Forward)
        } else {
            (&d.node, &r.node, Direction::Back)
        };

        Self {
            tail: tail.clone(),
            head: head.clone(),
            direction,
            tail_port,
            head_port,
        }
    }

    /// `tailport=.. headport=..` attribute pair.
    pub fn ports(&self) -> String {
        format!("tailport={} headport={}", self.tail_port, self.head_port)
    }
}

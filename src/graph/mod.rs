//! Package node graph: classification, nested layout and DOT output.
//!
//! Directories are sorted into the standard library, the module, the
//! module cache and vendored code, nested into one cluster per package
//! path segment, and joined by the resolved reference edges.

pub mod builder;
pub mod classify;
pub mod layout;
pub mod render;
pub mod types;

pub use builder::{GraphStats, NodeGraph};
pub use classify::{Classifier, Placement};
pub use layout::Layout;
pub use types::{Category, Direction, Endpoint, OrientedEdge, Port};

//! Ordered symbol tree.
//!
//! A recursive map from string keys to child trees, with no payload: leaves
//! are empty trees. The same structure serves as a set (key presence), a
//! multi-map (key → child keys) and a nested namespace.
//!
//! Storage order is irrelevant. Every read goes through [`canonical_cmp`],
//! which compares keys with the `*`, `(` and `)` markers trimmed from both
//! ends and breaks ties on the untrimmed key, so `T`, `*T` and `(T)` sit next
//! to each other. The empty key is reserved and never listed.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Characters trimmed from both ends of a key before comparison.
const MARKERS: &[char] = &['*', '(', ')'];

/// Compare two keys in canonical order.
pub fn canonical_cmp(a: &str, b: &str) -> Ordering {
    a.trim_matches(MARKERS)
        .cmp(b.trim_matches(MARKERS))
        .then_with(|| a.cmp(b))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTree {
    children: BTreeMap<String, SymbolTree>,
}

impl SymbolTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a path of keys, creating intermediate nodes as needed.
    /// Inserting a path that already exists changes nothing.
    pub fn insert<I, S>(&mut self, path: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut node = self;
        for key in path {
            node = node.children.entry(key.into()).or_default();
        }
    }

    /// Child tree for `key`, created empty if absent.
    pub fn subtree(&mut self, key: &str) -> &mut SymbolTree {
        self.children.entry(key.to_string()).or_default()
    }

    /// Child tree for `key` without creating it.
    pub fn get(&self, key: &str) -> Option<&SymbolTree> {
        self.children.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        !key.is_empty() && self.children.contains_key(key)
    }

    /// Remove `key` and hand back its subtree.
    pub fn remove(&mut self, key: &str) -> Option<SymbolTree> {
        self.children.remove(key)
    }

    /// Replace (or add) the subtree under `key`.
    pub fn set(&mut self, key: impl Into<String>, tree: SymbolTree) {
        self.children.insert(key.into(), tree);
    }

    /// Keys at this level in canonical order, excluding the empty key.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .children
            .keys()
            .map(String::as_str)
            .filter(|key| !key.is_empty())
            .collect();
        keys.sort_by(|a, b| canonical_cmp(a, b));
        keys
    }

    /// `(key, subtree)` pairs at this level in canonical order.
    pub fn entries(&self) -> Vec<(&str, &SymbolTree)> {
        self.keys()
            .into_iter()
            .filter_map(|key| self.children.get(key).map(|tree| (key, tree)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.children.keys().filter(|key| !key.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pre-order walk in canonical order, calling `f(depth, key)` on every
    /// node before descending into it.
    pub fn traverse<F>(&self, mut f: F)
    where
        F: FnMut(usize, &str),
    {
        self.traverse_from(0, &mut f);
    }

    fn traverse_from<F>(&self, depth: usize, f: &mut F)
    where
        F: FnMut(usize, &str),
    {
        for (key, child) in self.entries() {
            f(depth, key);
            child.traverse_from(depth + 1, f);
        }
    }
}

/// Serializes as nested objects in canonical key order.
impl Serialize for SymbolTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.entries();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, child) in entries {
            map.serialize_entry(key, child)?;
        }
        map.end()
    }
}

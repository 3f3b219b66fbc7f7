//! Structural interface satisfaction.
//!
//! Embedded interfaces are expanded into their methods, then a type
//! implements an interface when its descriptors include every method of
//! the expanded set. Matching is by exact descriptor text.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

use super::SymbolTables;
use crate::tree::SymbolTree;

/// Outcome of [`typesets`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SatisfactionReport {
    /// Embedding cycles found, each as the chain of interfaces ending with
    /// the one that closes the cycle.
    pub cycles: Vec<Vec<String>>,
    /// Interface → type pairs written to Implements.
    pub pairs: usize,
}

/// Members without a parameter list are embedded interface names.
fn is_method(member: &str) -> bool {
    member.contains('(')
}

struct Expansion<'a> {
    interfaces: &'a SymbolTree,
    done: BTreeMap<String, BTreeSet<String>>,
    stack: Vec<String>,
    cycles: Vec<Vec<String>>,
}

impl Expansion<'_> {
    fn methods(&mut self, name: &str) -> BTreeSet<String> {
        if let Some(methods) = self.done.get(name) {
            return methods.clone();
        }
        if let Some(pos) = self.stack.iter().position(|open| open == name) {
            let mut cycle = self.stack[pos..].to_vec();
            cycle.push(name.to_string());
            warn!(cycle = %cycle.join(" -> "), "embedding cycle dropped");
            self.cycles.push(cycle);
            return BTreeSet::new();
        }

        let Some(members) = self.interfaces.get(name) else {
            return BTreeSet::new();
        };
        self.stack.push(name.to_string());
        let mut methods = BTreeSet::new();
        for member in members.keys() {
            if is_method(member) {
                methods.insert(member.to_string());
            } else {
                methods.extend(self.methods(member));
            }
        }
        self.stack.pop();

        self.done.insert(name.to_string(), methods.clone());
        methods
    }
}

/// Expand embedded interfaces in place and compute Implements.
pub fn typesets(tables: &mut SymbolTables) -> SatisfactionReport {
    let mut expansion = Expansion {
        interfaces: &tables.interfaces,
        done: BTreeMap::new(),
        stack: Vec::new(),
        cycles: Vec::new(),
    };
    let names: Vec<String> = tables
        .interfaces
        .keys()
        .into_iter()
        .map(str::to_string)
        .collect();
    let expanded: Vec<(String, BTreeSet<String>)> = names
        .into_iter()
        .map(|name| {
            let methods = expansion.methods(&name);
            (name, methods)
        })
        .collect();
    let cycles = expansion.cycles;

    for (name, methods) in &expanded {
        let mut tree = SymbolTree::new();
        for method in methods {
            tree.insert([method.as_str()]);
        }
        tables.interfaces.set(name.clone(), tree);
    }

    let mut pairs = 0;
    for (ty, descriptors) in tables.types.entries() {
        for (interface, methods) in &expanded {
            if methods.iter().all(|method| descriptors.contains(method)) {
                tables.implements.insert([interface.as_str(), ty]);
                pairs += 1;
            }
        }
    }

    info!(
        interfaces = expanded.len(),
        pairs,
        cycles = cycles.len(),
        "interface satisfaction computed"
    );
    SatisfactionReport { cycles, pairs }
}

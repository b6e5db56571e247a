// src/core/call_graph/call_resolver.rs
use std::collections::HashMap;
use indexmap::IndexMap;
use serde::{Serialize, Deserialize};
use tracing::debug;

use super::{CallEdge, CallType, CodeNode};

/// A call expression found in a function or method body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    /// Bare callee name: the identifier of `f()` or the attribute of `obj.m()`
    pub callee: String,
    pub line: usize,
}

/// Name-only call resolution.
///
/// A call resolves to the first node, in file-then-declaration order, whose
/// name equals the callee. Scope and receiver types are never consulted.
pub struct CallResolver {
    first_by_name: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolutionStats {
    pub call_sites: usize,
    pub resolved: usize,
    pub unresolved: usize,
}

impl CallResolver {
    /// Index `nodes` in their iteration order.
    pub fn new(nodes: &IndexMap<String, CodeNode>) -> Self {
        let mut first_by_name = HashMap::new();
        for node in nodes.values() {
            first_by_name.entry(node.name.clone()).or_insert_with(|| node.id.clone());
        }
        Self { first_by_name }
    }

    pub fn resolve_name(&self, callee: &str) -> Option<&str> {
        self.first_by_name.get(callee).map(String::as_str)
    }

    /// Resolve every call site and wire both ends of each resulting edge.
    ///
    /// One edge per distinct (source, target) pair, carrying the line of the
    /// first call site. Unmatched calls leave no trace.
    pub fn resolve(
        &self,
        nodes: &mut IndexMap<String, CodeNode>,
        call_sites: &IndexMap<String, Vec<CallSite>>,
    ) -> (Vec<CallEdge>, ResolutionStats) {
        let mut edges = Vec::new();
        let mut stats = ResolutionStats::default();

        for (source_id, sites) in call_sites {
            if !nodes.get(source_id).map_or(false, |n| n.kind.is_callable()) {
                continue;
            }

            for site in sites {
                stats.call_sites += 1;
                let Some(target_id) = self.resolve_name(&site.callee) else {
                    stats.unresolved += 1;
                    continue;
                };
                stats.resolved += 1;
                let target_id = target_id.to_string();

                let is_new = match nodes.get_mut(source_id) {
                    Some(source) => source.calls.insert(target_id.clone()),
                    None => false,
                };
                if !is_new {
                    continue;
                }

                if let Some(target) = nodes.get_mut(&target_id) {
                    target.called_by.insert(source_id.clone());
                }

                debug!("{} -> {} (line {})", source_id, target_id, site.line);
                edges.push(CallEdge {
                    source: source_id.clone(),
                    target: target_id,
                    call_type: CallType::Direct,
                    line: Some(site.line),
                });
            }
        }

        (edges, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use crate::core::call_graph::{Location, NodeKind};

    fn node(file: &str, qualified: &str, name: &str, kind: NodeKind) -> CodeNode {
        let file = PathBuf::from(file);
        CodeNode::new(
            CodeNode::make_id(&file, qualified),
            name,
            kind,
            Location { file, start_line: 1, end_line: 1 },
        )
    }

    fn index(nodes: Vec<CodeNode>) -> IndexMap<String, CodeNode> {
        nodes.into_iter().map(|n| (n.id.clone(), n)).collect()
    }

    fn sites(entries: Vec<(&str, Vec<(&str, usize)>)>) -> IndexMap<String, Vec<CallSite>> {
        entries
            .into_iter()
            .map(|(id, calls)| {
                let calls = calls
                    .into_iter()
                    .map(|(callee, line)| CallSite { callee: callee.to_string(), line })
                    .collect();
                (id.to_string(), calls)
            })
            .collect()
    }

    #[test]
    fn test_first_match_wins_across_files() {
        let mut nodes = index(vec![
            node("a.py", "main", "main", NodeKind::Function),
            node("a.py", "save", "save", NodeKind::Function),
            node("b.py", "Store.save", "save", NodeKind::Method { class_name: "Store".into() }),
        ]);
        let resolver = CallResolver::new(&nodes);
        assert_eq!(resolver.resolve_name("save"), Some("a.py::save"));

        let (edges, stats) = resolver.resolve(&mut nodes, &sites(vec![("a.py::main", vec![("save", 4)])]));
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].target, "a.py::save");
        assert_eq!(edges[0].line, Some(4));
        assert_eq!(stats.resolved, 1);
        assert!(nodes["b.py::Store.save"].called_by.is_empty());
    }

    #[test]
    fn test_relationship_sets_are_symmetric() {
        let mut nodes = index(vec![
            node("a.py", "main", "main", NodeKind::Function),
            node("a.py", "load", "load", NodeKind::Function),
            node("a.py", "parse", "parse", NodeKind::Function),
        ]);
        let resolver = CallResolver::new(&nodes);
        let call_sites = sites(vec![
            ("a.py::main", vec![("load", 2), ("parse", 3)]),
            ("a.py::load", vec![("parse", 7)]),
        ]);
        let (edges, _) = resolver.resolve(&mut nodes, &call_sites);

        assert_eq!(edges.len(), 3);
        for edge in &edges {
            assert!(nodes[&edge.source].calls.contains(&edge.target));
            assert!(nodes[&edge.target].called_by.contains(&edge.source));
        }
        assert_eq!(nodes["a.py::parse"].called_by.len(), 2);
    }

    #[test]
    fn test_unresolved_and_repeated_calls() {
        let mut nodes = index(vec![
            node("a.py", "main", "main", NodeKind::Function),
            node("a.py", "helper", "helper", NodeKind::Function),
        ]);
        let resolver = CallResolver::new(&nodes);
        let call_sites = sites(vec![("a.py::main", vec![("print", 2), ("helper", 3), ("helper", 9)])]);
        let (edges, stats) = resolver.resolve(&mut nodes, &call_sites);

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].line, Some(3));
        assert_eq!(stats.call_sites, 3);
        assert_eq!(stats.unresolved, 1);
        assert_eq!(nodes["a.py::main"].calls.len(), 1);
    }

    #[test]
    fn test_class_names_resolve_like_any_other_node() {
        let mut nodes = index(vec![
            node("a.py", "main", "main", NodeKind::Function),
            node("a.py", "Flask", "Flask", NodeKind::Class { method_count: 2 }),
        ]);
        let resolver = CallResolver::new(&nodes);
        let (edges, _) = resolver.resolve(&mut nodes, &sites(vec![("a.py::main", vec![("Flask", 5)])]));
        assert_eq!(edges[0].target, "a.py::Flask");
    }
}

// src/core/call_graph/call_graph.rs
use indexmap::IndexMap;
use serde::{Serialize, Deserialize};

use super::CodeNode;

/// Bound used for the graph-wide `max_depth` metric.
pub const METRIC_DEPTH_BOUND: usize = 64;

/// Edge in the call graph representing a resolved call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEdge {
    /// Calling node id
    pub source: String,
    /// Called node id
    pub target: String,
    pub call_type: CallType,
    /// Line of the first call site for this source/target pair
    pub line: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    Direct,
    Indirect,
    Polymorphic,
}

/// Complete call graph for one analysis run.
///
/// The graph owns its nodes and is read-only once built. `total_nodes`,
/// `total_edges` and `max_depth` are computed in [`CallGraph::new`] and
/// stored as-is, including across serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallGraph {
    nodes: IndexMap<String, CodeNode>,
    edges: Vec<CallEdge>,
    entry_points: Vec<String>,
    total_nodes: usize,
    total_edges: usize,
    max_depth: usize,
}

/// One pending step of the chain walk; owns the path that led to it.
struct Frame {
    node_id: String,
    path: Vec<String>,
}

impl CallGraph {
    pub fn new(nodes: IndexMap<String, CodeNode>, edges: Vec<CallEdge>, entry_points: Vec<String>) -> Self {
        let mut graph = Self {
            total_nodes: nodes.len(),
            total_edges: edges.len(),
            nodes,
            edges,
            entry_points,
            max_depth: 0,
        };
        graph.max_depth = graph.compute_max_depth();
        graph
    }

    pub fn nodes(&self) -> &IndexMap<String, CodeNode> {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&CodeNode> {
        self.nodes.get(id)
    }

    pub fn edges(&self) -> &[CallEdge] {
        &self.edges
    }

    pub fn entry_points(&self) -> &[String] {
        &self.entry_points
    }

    pub fn total_nodes(&self) -> usize {
        self.total_nodes
    }

    pub fn total_edges(&self) -> usize {
        self.total_edges
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes this node calls, in resolution order
    pub fn callees(&self, id: &str) -> Vec<&CodeNode> {
        self.nodes
            .get(id)
            .map(|node| node.calls.iter().filter_map(|c| self.nodes.get(c)).collect())
            .unwrap_or_default()
    }

    /// Nodes calling this node
    pub fn callers(&self, id: &str) -> Vec<&CodeNode> {
        self.nodes
            .get(id)
            .map(|node| node.called_by.iter().filter_map(|c| self.nodes.get(c)).collect())
            .unwrap_or_default()
    }

    /// Enumerate call chains starting at `entry`.
    ///
    /// A path never repeats a node, but sibling branches may revisit one.
    /// A path is recorded when its last node sits at depth `max_depth` or has
    /// no outgoing calls. A branch whose callees are all already on the path
    /// is dropped. Chains come out in depth-first discovery order and are not
    /// deduplicated.
    pub fn chains(&self, entry: &str, max_depth: usize) -> Vec<Vec<String>> {
        if !self.nodes.contains_key(entry) {
            return Vec::new();
        }

        let mut chains = Vec::new();
        let mut stack = vec![Frame {
            node_id: entry.to_string(),
            path: vec![entry.to_string()],
        }];

        while let Some(frame) = stack.pop() {
            let Some(node) = self.nodes.get(&frame.node_id) else {
                continue;
            };

            let depth = frame.path.len() - 1;
            if depth >= max_depth || node.calls.is_empty() {
                chains.push(frame.path);
                continue;
            }

            // Reverse push so the first callee is expanded first
            for callee in node.calls.iter().rev() {
                if !self.nodes.contains_key(callee) || frame.path.contains(callee) {
                    continue;
                }
                let mut path = frame.path.clone();
                path.push(callee.clone());
                stack.push(Frame {
                    node_id: callee.clone(),
                    path,
                });
            }
        }

        chains
    }

    /// Every dangling edge endpoint, one message each
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for edge in &self.edges {
            if !self.nodes.contains_key(&edge.source) {
                errors.push(format!("Edge source not in nodes: {}", edge.source));
            }
            if !self.nodes.contains_key(&edge.target) {
                errors.push(format!("Edge target not in nodes: {}", edge.target));
            }
        }
        errors
    }

    /// GraphViz rendering, for debugging only
    pub fn to_dot(&self) -> String {
        let mut lines = vec![
            "digraph CallGraph {".to_string(),
            "  rankdir=LR;".to_string(),
            "  node [shape=box, style=rounded];".to_string(),
        ];

        for (id, node) in &self.nodes {
            let fill = if self.entry_points.contains(id) {
                ", fillcolor=lightgreen, style=filled"
            } else {
                ""
            };
            lines.push(format!(
                "  \"{}\" [label=\"{}\", tooltip=\"{}\"{}];",
                escape_dot(id),
                escape_dot(&node.display_name()),
                node.kind.label(),
                fill
            ));
        }

        for edge in &self.edges {
            let style = match edge.call_type {
                CallType::Direct => "solid",
                CallType::Indirect | CallType::Polymorphic => "dashed",
            };
            lines.push(format!(
                "  \"{}\" -> \"{}\" [style={}];",
                escape_dot(&edge.source),
                escape_dot(&edge.target),
                style
            ));
        }

        lines.push("}".to_string());
        lines.join("\n")
    }

    /// Deepest step reachable from any entry point.
    ///
    /// A call back into the current path or to an unknown id still counts as
    /// one step, so `a -> b -> a` has depth 2.
    fn compute_max_depth(&self) -> usize {
        let mut max_depth = 0;
        for entry in &self.entry_points {
            if !self.nodes.contains_key(entry) {
                continue;
            }

            let mut stack = vec![vec![entry.clone()]];
            while let Some(path) = stack.pop() {
                let depth = path.len() - 1;
                max_depth = max_depth.max(depth);
                if depth >= METRIC_DEPTH_BOUND {
                    continue;
                }

                let Some(node) = self.nodes.get(&path[depth]) else {
                    continue;
                };
                for callee in &node.calls {
                    if !self.nodes.contains_key(callee) || path.contains(callee) {
                        max_depth = max_depth.max(depth + 1);
                        continue;
                    }
                    let mut next = path.clone();
                    next.push(callee.clone());
                    stack.push(next);
                }
            }
        }
        max_depth
    }
}

fn escape_dot(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

// src/core/call_graph/entry_point_detector.rs
use indexmap::IndexMap;

use super::CodeNode;

/// Flags roots of execution by name and decorator text.
///
/// Matching is plain substring search over the decorator text, so it is
/// broad: `@cache.get_or_set` counts as an HTTP verb just like `@app.get`.
pub struct EntryPointDetector {
    /// Reserved name of the program entry function
    root_name: String,
    /// Lowercase tokens searched for in decorator text
    decorator_keywords: Vec<String>,
}

impl EntryPointDetector {
    pub fn new() -> Self {
        Self {
            root_name: "main".to_string(),
            decorator_keywords: [
                // Flask routes: @app.route
                "route",
                // Click commands: @click.command
                "command",
                // FastAPI style verbs: @app.get, @router.post
                "get",
                "post",
                "put",
                "delete",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }

    pub fn is_entry_point(&self, node: &CodeNode) -> bool {
        if node.name == self.root_name {
            return true;
        }

        node.decorators.iter().any(|decorator| {
            let lowered = decorator.to_lowercase();
            self.decorator_keywords.iter().any(|keyword| lowered.contains(keyword.as_str()))
        })
    }

    /// Entry point ids in node order, each listed once
    pub fn detect_entry_points(&self, nodes: &IndexMap<String, CodeNode>) -> Vec<String> {
        nodes
            .values()
            .filter(|node| self.is_entry_point(node))
            .map(|node| node.id.clone())
            .collect()
    }
}

impl Default for EntryPointDetector {
    fn default() -> Self {
        Self::new()
    }
}

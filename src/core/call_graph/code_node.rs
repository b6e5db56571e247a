// src/core/call_graph/code_node.rs
use std::path::PathBuf;
use indexmap::IndexSet;
use serde::{Serialize, Deserialize};

/// Function/method parameter as written in the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Annotation text, unparsed
    pub type_hint: Option<String>,
    /// Default value text, unparsed
    pub default_value: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_hint: None,
            default_value: None,
        }
    }
}

/// Where a node lives in the source tree (1-based, inclusive lines)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
}

/// What kind of entity a node is. Each variant carries only its own fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    Function,
    Method { class_name: String },
    Class { method_count: usize },
}

impl NodeKind {
    pub fn is_callable(&self) -> bool {
        !matches!(self, NodeKind::Class { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Function => "function",
            NodeKind::Method { .. } => "method",
            NodeKind::Class { .. } => "class",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFlags {
    pub exported: bool,
    pub is_async: bool,
    pub is_generator: bool,
}

/// One extracted function, method or class.
///
/// Created by a language analyzer, enriched by the call resolver
/// (`calls`/`called_by`), and frozen once handed to a [`super::CallGraph`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeNode {
    /// `<file name>::<name>` or `<file name>::<Class>.<method>`
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub location: Location,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
    /// Decorator expressions without the leading `@`
    pub decorators: Vec<String>,
    pub docstring: Option<String>,
    pub flags: NodeFlags,
    pub complexity: u32,
    pub loc: usize,
    /// Ids of nodes this node calls
    pub calls: IndexSet<String>,
    /// Ids of nodes calling this node
    pub called_by: IndexSet<String>,
    /// Imported modules referenced from the body
    pub depends_on: IndexSet<String>,
}

impl CodeNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: NodeKind, location: Location) -> Self {
        let loc = location.end_line.saturating_sub(location.start_line) + 1;
        let name = name.into();
        Self {
            id: id.into(),
            flags: NodeFlags {
                exported: !name.starts_with('_'),
                ..NodeFlags::default()
            },
            name,
            kind,
            location,
            parameters: Vec::new(),
            return_type: None,
            decorators: Vec::new(),
            docstring: None,
            complexity: 1,
            loc,
            calls: IndexSet::new(),
            called_by: IndexSet::new(),
            depends_on: IndexSet::new(),
        }
    }

    /// Build the node id used throughout a run.
    ///
    /// Only the file's base name takes part, so same-named files in different
    /// directories collide; the analyzer keeps the first and warns.
    pub fn make_id(file: &std::path::Path, qualified_name: &str) -> String {
        let base = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        format!("{}::{}", base, qualified_name)
    }

    pub fn is_documented(&self) -> bool {
        self.docstring.as_deref().map_or(false, |d| !d.trim().is_empty())
    }

    /// Short human-readable name, `Class.method` for methods
    pub fn display_name(&self) -> String {
        match &self.kind {
            NodeKind::Method { class_name } => format!("{}.{}", class_name, self.name),
            _ => self.name.clone(),
        }
    }
}

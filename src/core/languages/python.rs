// src/core/languages/python.rs
use std::collections::HashMap;
use std::path::Path;
use regex::Regex;
use tree_sitter::{Node, Parser};

use crate::error::{QuestError, Result};
use crate::core::call_graph::{CallSite, CodeNode, Location, NodeKind, Parameter};
use crate::core::complexity::{file_complexity, PYTHON_RULES};
use super::{for_each_descendant, ExtractedFile, Language, LanguageAnalyzer};

/// Python-specific analyzer using Tree-sitter
pub struct PythonAnalyzer {
    parser: Parser,
    /// Splits a string literal into prefix, opening quote and the rest
    string_literal_regex: Regex,
}

/// Per-file facts shared by every node extracted from that file
struct FileContext<'a> {
    path: &'a Path,
    source: &'a str,
    complexity: u32,
    /// Bound name -> imported module path
    imports: HashMap<String, String>,
}

impl PythonAnalyzer {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let python_language = tree_sitter_python::language();
        parser.set_language(&python_language)
            .map_err(|e| QuestError::Config(format!("Failed to set Python language: {}", e)))?;

        Ok(Self {
            parser,
            string_literal_regex: Regex::new(r#"(?s)^([rRuUbBfF]*)("""|'''|"|')(.*)$"#)?,
        })
    }
}

impl LanguageAnalyzer for PythonAnalyzer {
    fn extract(&mut self, content: &str, file_path: &Path) -> Result<ExtractedFile> {
        let tree = self.parser.parse(content, None)
            .ok_or_else(|| QuestError::parse(file_path, "Failed to parse Python code"))?;

        let root = tree.root_node();
        if root.has_error() {
            let line = first_error_line(root).unwrap_or(1);
            return Err(QuestError::parse(file_path, format!("invalid syntax near line {}", line)));
        }

        let ctx = FileContext {
            path: file_path,
            source: content,
            complexity: file_complexity(root, &PYTHON_RULES),
            imports: collect_imports(root, content),
        };

        let mut file = ExtractedFile::default();
        self.extract_python_items(root, &ctx, &mut file);
        Ok(file)
    }

    fn file_extensions(&self) -> &[&str] {
        &["py"]
    }

    fn language(&self) -> Language {
        Language::Python
    }
}

impl PythonAnalyzer {
    /// Extract module-level functions and classes, looking through
    /// module-level compound statements but never into definition bodies.
    fn extract_python_items(&self, node: Node, ctx: &FileContext, file: &mut ExtractedFile) {
        let mut cursor = node.walk();

        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "function_definition" => self.push_function(child, Vec::new(), ctx, file),
                "class_definition" => self.push_class(child, Vec::new(), ctx, file),
                "decorated_definition" => {
                    let decorators = self.decorators(child, ctx.source);
                    match child.child_by_field_name("definition") {
                        Some(def) if def.kind() == "function_definition" => {
                            self.push_function(def, decorators, ctx, file)
                        }
                        Some(def) if def.kind() == "class_definition" => {
                            self.push_class(def, decorators, ctx, file)
                        }
                        _ => {}
                    }
                }
                _ => {
                    // if __name__ == "__main__": blocks, try/except imports, ...
                    self.extract_python_items(child, ctx, file);
                }
            }
        }
    }

    fn push_function(&self, def: Node, decorators: Vec<String>, ctx: &FileContext, file: &mut ExtractedFile) {
        let Some(name) = self.name_of(def, ctx.source) else {
            return;
        };
        let (node, sites) = self.build_callable(def, &name, &name, NodeKind::Function, decorators, ctx);
        file.call_sites.insert(node.id.clone(), sites);
        file.nodes.push(node);
    }

    /// Push the class node followed by one node per method in its body.
    fn push_class(&self, def: Node, decorators: Vec<String>, ctx: &FileContext, file: &mut ExtractedFile) {
        let Some(class_name) = self.name_of(def, ctx.source) else {
            return;
        };

        let mut methods = Vec::new();
        if let Some(body) = def.child_by_field_name("body") {
            let mut cursor = body.walk();
            for child in body.named_children(&mut cursor) {
                match child.kind() {
                    "function_definition" => methods.push((child, Vec::new())),
                    "decorated_definition" => {
                        if let Some(inner) = child.child_by_field_name("definition") {
                            if inner.kind() == "function_definition" {
                                methods.push((inner, self.decorators(child, ctx.source)));
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        let mut class_node = CodeNode::new(
            CodeNode::make_id(ctx.path, &class_name),
            class_name.clone(),
            NodeKind::Class { method_count: methods.len() },
            self.location(def, ctx.path),
        );
        class_node.decorators = decorators;
        class_node.docstring = self.docstring(def, ctx.source);
        class_node.complexity = (methods.len() as u32).max(1);
        file.nodes.push(class_node);

        for (method_def, method_decorators) in methods {
            let Some(method_name) = self.name_of(method_def, ctx.source) else {
                continue;
            };
            let qualified = format!("{}.{}", class_name, method_name);
            let kind = NodeKind::Method { class_name: class_name.clone() };
            let (node, sites) = self.build_callable(method_def, &method_name, &qualified, kind, method_decorators, ctx);
            file.call_sites.insert(node.id.clone(), sites);
            file.nodes.push(node);
        }
    }

    fn build_callable(
        &self,
        def: Node,
        name: &str,
        qualified: &str,
        kind: NodeKind,
        decorators: Vec<String>,
        ctx: &FileContext,
    ) -> (CodeNode, Vec<CallSite>) {
        let mut node = CodeNode::new(
            CodeNode::make_id(ctx.path, qualified),
            name,
            kind,
            self.location(def, ctx.path),
        );
        node.parameters = def.child_by_field_name("parameters")
            .map(|params| self.parameters(params, ctx.source))
            .unwrap_or_default();
        node.return_type = def.child_by_field_name("return_type")
            .map(|ret| self.node_text(ret, ctx.source));
        node.decorators = decorators;
        node.docstring = self.docstring(def, ctx.source);
        node.flags.is_async = def.child(0).map_or(false, |first| first.kind() == "async");
        node.complexity = ctx.complexity;

        let mut sites = Vec::new();
        if let Some(body) = def.child_by_field_name("body") {
            for_each_descendant(body, |descendant| match descendant.kind() {
                "call" => {
                    if let Some(callee) = self.callee_name(descendant, ctx.source) {
                        sites.push(CallSite {
                            callee,
                            line: descendant.start_position().row + 1,
                        });
                    }
                }
                "yield" => node.flags.is_generator = true,
                "identifier" if !is_member_name(descendant) => {
                    let text = &ctx.source[descendant.byte_range()];
                    if let Some(module) = ctx.imports.get(text) {
                        node.depends_on.insert(module.clone());
                    }
                }
                _ => {}
            });
        }

        (node, sites)
    }

    /// `f(...)` gives `f`, `obj.m(...)` gives `m`; any other callee shape gives nothing.
    fn callee_name(&self, call: Node, source: &str) -> Option<String> {
        let function = call.child_by_field_name("function")?;
        match function.kind() {
            "identifier" => Some(self.node_text(function, source)),
            "attribute" => function
                .child_by_field_name("attribute")
                .map(|attr| self.node_text(attr, source)),
            _ => None,
        }
    }

    /// Positional parameters up to the first `*`, `*args` or `**kwargs`.
    fn parameters(&self, params: Node, source: &str) -> Vec<Parameter> {
        let mut parameters = Vec::new();
        let mut cursor = params.walk();

        for child in params.named_children(&mut cursor) {
            let parameter = match child.kind() {
                "identifier" => Parameter::new(self.node_text(child, source)),
                "typed_parameter" => {
                    // `*args: int` is a typed splat, which ends the positional run
                    let Some(name) = child.named_child(0).filter(|n| n.kind() == "identifier") else {
                        break;
                    };
                    Parameter {
                        name: self.node_text(name, source),
                        type_hint: child.child_by_field_name("type").map(|t| self.node_text(t, source)),
                        default_value: None,
                    }
                }
                "default_parameter" | "typed_default_parameter" => {
                    let Some(name) = child.child_by_field_name("name") else {
                        continue;
                    };
                    Parameter {
                        name: self.node_text(name, source),
                        type_hint: child.child_by_field_name("type").map(|t| self.node_text(t, source)),
                        default_value: child.child_by_field_name("value").map(|v| self.node_text(v, source)),
                    }
                }
                "positional_separator" | "comment" => continue,
                _ => break,
            };
            parameters.push(parameter);
        }

        parameters
    }

    fn decorators(&self, decorated: Node, source: &str) -> Vec<String> {
        let mut cursor = decorated.walk();
        decorated
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "decorator")
            .map(|decorator| {
                self.node_text(decorator, source)
                    .trim_start_matches('@')
                    .trim()
                    .to_string()
            })
            .collect()
    }

    /// Docstring of a function or class: the leading string statement of its body
    fn docstring(&self, def: Node, source: &str) -> Option<String> {
        let body = def.child_by_field_name("body")?;
        let mut cursor = body.walk();
        let first = body
            .named_children(&mut cursor)
            .find(|child| child.kind() != "comment")?;
        if first.kind() != "expression_statement" {
            return None;
        }
        let literal = first.named_child(0).filter(|n| n.kind() == "string")?;
        clean_docstring(&self.string_literal_regex, &self.node_text(literal, source))
    }

    fn name_of(&self, def: Node, source: &str) -> Option<String> {
        def.child_by_field_name("name").map(|n| self.node_text(n, source))
    }

    fn location(&self, def: Node, path: &Path) -> Location {
        Location {
            file: path.to_path_buf(),
            start_line: def.start_position().row + 1,
            end_line: def.end_position().row + 1,
        }
    }

    /// Extract text content of a node
    fn node_text(&self, node: Node, source: &str) -> String {
        source[node.byte_range()].to_string()
    }
}

/// Map every name bound by an import to the module path it refers to.
///
/// `import a.b` binds `a`, `import a.b as c` binds `c`, and
/// `from x import y as z` binds `z` to `x.y`. The first binding of a name wins.
fn collect_imports(root: Node, source: &str) -> HashMap<String, String> {
    let mut imports = HashMap::new();
    let text = |n: Node| source[n.byte_range()].to_string();

    for_each_descendant(root, |node| match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            for name in node.children_by_field_name("name", &mut cursor) {
                let (module, binding) = match name.kind() {
                    "aliased_import" => {
                        let module = name.child_by_field_name("name").map(text).unwrap_or_default();
                        let alias = name.child_by_field_name("alias").map(text).unwrap_or_default();
                        (module, alias)
                    }
                    _ => {
                        let module = text(name);
                        let head = module.split('.').next().unwrap_or_default().to_string();
                        (module, head)
                    }
                };
                if !binding.is_empty() {
                    imports.entry(binding).or_insert(module);
                }
            }
        }
        "import_from_statement" => {
            let base = node.child_by_field_name("module_name").map(text).unwrap_or_default();
            let mut cursor = node.walk();
            for name in node.children_by_field_name("name", &mut cursor) {
                let (imported, binding) = match name.kind() {
                    "aliased_import" => (
                        name.child_by_field_name("name").map(text).unwrap_or_default(),
                        name.child_by_field_name("alias").map(text).unwrap_or_default(),
                    ),
                    _ => (text(name), text(name)),
                };
                if binding.is_empty() {
                    continue;
                }
                let module = if base.ends_with('.') {
                    format!("{}{}", base, imported)
                } else {
                    format!("{}.{}", base, imported)
                };
                imports.entry(binding).or_insert(module);
            }
        }
        _ => {}
    });

    imports
}

/// `x` in `obj.x` or `f(x=1)`: a member or keyword, not a reference to a binding
fn is_member_name(identifier: Node) -> bool {
    let Some(parent) = identifier.parent() else {
        return false;
    };
    let field = match parent.kind() {
        "attribute" => "attribute",
        "keyword_argument" => "name",
        _ => return false,
    };
    parent.child_by_field_name(field).map_or(false, |child| child.id() == identifier.id())
}

fn first_error_line(root: Node) -> Option<usize> {
    let mut line = None;
    for_each_descendant(root, |node| {
        if line.is_none() && (node.is_error() || node.is_missing()) {
            line = Some(node.start_position().row + 1);
        }
    });
    line
}

/// Strip quotes and prefix, then dedent the way `inspect.cleandoc` does.
/// Byte strings and f-strings are not docstrings.
fn clean_docstring(string_literal_regex: &Regex, literal: &str) -> Option<String> {
    let caps = string_literal_regex.captures(literal)?;
    let prefix = caps.get(1).map_or("", |m| m.as_str());
    if prefix.contains(['b', 'B', 'f', 'F']) {
        return None;
    }
    let quote = caps.get(2)?.as_str();
    let body = caps.get(3)?.as_str();
    let body = body.strip_suffix(quote).unwrap_or(body);

    let lines: Vec<&str> = body.lines().collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<String> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line.trim_start().to_string()
            } else {
                line.get(indent..).unwrap_or("").trim_end().to_string()
            }
        })
        .collect();

    while cleaned.first().map_or(false, |l| l.trim().is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().map_or(false, |l| l.trim().is_empty()) {
        cleaned.pop();
    }

    let doc = cleaned.join("\n");
    if doc.trim().is_empty() {
        None
    } else {
        Some(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const APP: &str = r#"
import os.path
import json as j
from flask import request, Response as Resp

def helper(a, b: int, c=3, d: str = "x", *args, e=1, **kwargs) -> bool:
    """Check things.

    Second paragraph.
    """
    return os.path.exists(a) and j.loads(b)

async def fetch():
    yield request.get()

@app.route("/")
@login_required
def index():
    # leading comment
    "Serve the index."
    data = helper(1, 2)
    return Resp(Store().save(data))

class Store:
    """Persists things."""

    def __init__(self):
        self.items = []

    @staticmethod
    def save(item):
        return item

if __name__ == "__main__":
    def main():
        index()
"#;

    fn extract(source: &str) -> ExtractedFile {
        let mut analyzer = PythonAnalyzer::new().unwrap();
        analyzer.extract(source, &PathBuf::from("proj/app.py")).unwrap()
    }

    fn node<'a>(file: &'a ExtractedFile, id: &str) -> &'a CodeNode {
        file.nodes.iter().find(|n| n.id == id).unwrap_or_else(|| panic!("missing node {}", id))
    }

    #[test]
    fn test_nodes_in_declaration_order() {
        let file = extract(APP);
        let ids: Vec<&str> = file.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec![
            "app.py::helper",
            "app.py::fetch",
            "app.py::index",
            "app.py::Store",
            "app.py::Store.__init__",
            "app.py::Store.save",
            "app.py::main",
        ]);
    }

    #[test]
    fn test_parameters_stop_at_splat() {
        let file = extract(APP);
        let helper = node(&file, "app.py::helper");
        let names: Vec<&str> = helper.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
        assert_eq!(helper.parameters[1].type_hint.as_deref(), Some("int"));
        assert_eq!(helper.parameters[2].default_value.as_deref(), Some("3"));
        assert_eq!(helper.parameters[3].type_hint.as_deref(), Some("str"));
        assert_eq!(helper.parameters[3].default_value.as_deref(), Some("\"x\""));
        assert_eq!(helper.return_type.as_deref(), Some("bool"));
    }

    #[test]
    fn test_docstrings_are_dedented() {
        let file = extract(APP);
        assert_eq!(
            node(&file, "app.py::helper").docstring.as_deref(),
            Some("Check things.\n\nSecond paragraph.")
        );
        assert_eq!(node(&file, "app.py::index").docstring.as_deref(), Some("Serve the index."));
        assert_eq!(node(&file, "app.py::Store").docstring.as_deref(), Some("Persists things."));
        assert_eq!(node(&file, "app.py::fetch").docstring, None);
    }

    #[test]
    fn test_flags_and_decorators() {
        let file = extract(APP);
        let fetch = node(&file, "app.py::fetch");
        assert!(fetch.flags.is_async);
        assert!(fetch.flags.is_generator);

        let index = node(&file, "app.py::index");
        assert_eq!(index.decorators, vec!["app.route(\"/\")", "login_required"]);
        assert!(!index.flags.is_async);

        let init = node(&file, "app.py::Store.__init__");
        assert!(!init.flags.exported);
        assert_eq!(init.kind, NodeKind::Method { class_name: "Store".into() });

        let save = node(&file, "app.py::Store.save");
        assert_eq!(save.decorators, vec!["staticmethod"]);
    }

    #[test]
    fn test_class_complexity_is_method_count() {
        let file = extract(APP);
        let store = node(&file, "app.py::Store");
        assert_eq!(store.kind, NodeKind::Class { method_count: 2 });
        assert_eq!(store.complexity, 2);
    }

    #[test]
    fn test_functions_share_file_complexity() {
        let file = extract(APP);
        // 1 + `and` + `if __name__`
        for id in ["app.py::helper", "app.py::fetch", "app.py::index", "app.py::Store.save"] {
            assert_eq!(node(&file, id).complexity, 3, "{}", id);
        }
    }

    #[test]
    fn test_call_sites_use_bare_names() {
        let file = extract(APP);
        let callees: Vec<&str> = file.call_sites["app.py::index"].iter().map(|s| s.callee.as_str()).collect();
        assert_eq!(callees, vec!["helper", "Resp", "save", "Store"]);
        assert!(file.call_sites["app.py::index"].iter().all(|s| s.line > 1));
        // decorator calls are not part of the body
        assert!(!callees.contains(&"route"));
        assert!(!file.call_sites.contains_key("app.py::Store"));
    }

    #[test]
    fn test_depends_on_tracks_referenced_imports() {
        let file = extract(APP);
        let helper = node(&file, "app.py::helper");
        let deps: Vec<&str> = helper.depends_on.iter().map(String::as_str).collect();
        assert_eq!(deps, vec!["os.path", "json"]);

        let index = node(&file, "app.py::index");
        assert!(index.depends_on.contains("flask.Response"));
        let fetch = node(&file, "app.py::fetch");
        assert!(fetch.depends_on.contains("flask.request"));
    }

    #[test]
    fn test_depends_on_ignores_member_and_keyword_names() {
        let file = extract("import json\n\nclass Cache:\n    def dump(self):\n        return self.json\n\ndef emit(out):\n    out.write(json=1)\n\ndef load(raw):\n    return json.loads(raw)\n");
        assert!(node(&file, "app.py::Cache.dump").depends_on.is_empty());
        assert!(node(&file, "app.py::emit").depends_on.is_empty());
        assert!(node(&file, "app.py::load").depends_on.contains("json"));
    }

    #[test]
    fn test_invalid_syntax_is_a_parse_error() {
        let mut analyzer = PythonAnalyzer::new().unwrap();
        let err = analyzer
            .extract("def ok():\n    pass\n\ndef broken(:\n    pass\n", &PathBuf::from("bad.py"))
            .unwrap_err();
        match err {
            QuestError::Parse { path, message } => {
                assert_eq!(path, PathBuf::from("bad.py"));
                assert!(message.contains("invalid syntax"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_clean_docstring_variants() {
        let re = PythonAnalyzer::new().unwrap().string_literal_regex;
        assert_eq!(clean_docstring(&re, "'''x'''").as_deref(), Some("x"));
        assert_eq!(clean_docstring(&re, "r\"raw\\d\"").as_deref(), Some("raw\\d"));
        assert_eq!(clean_docstring(&re, "\"\"\"\n   \"\"\""), None);
        assert_eq!(clean_docstring(&re, "b\"bytes\""), None);
    }
}

// src/core/languages/mod.rs
//! Language-specific analyzers
//!
//! Each language gets its own module implementing [`LanguageAnalyzer`]. The
//! rest of the pipeline only sees [`ExtractedFile`]s, so it stays language
//! agnostic. Analyzers are built on demand through [`analyzer_for`].

mod python;

pub use python::PythonAnalyzer;

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tree_sitter::Node;

use crate::error::{QuestError, Result};
use super::call_graph::{CallSite, CodeNode};

/// Source languages the pipeline knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Golang,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Golang => "golang",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = QuestError;

    fn from_str(tag: &str) -> Result<Self> {
        match tag.trim().to_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "golang" | "go" => Ok(Language::Golang),
            other => Err(QuestError::UnsupportedLanguage(other.to_string())),
        }
    }
}

/// Everything one source file contributes to the call graph
#[derive(Debug, Clone, Default)]
pub struct ExtractedFile {
    /// Nodes in declaration order
    pub nodes: Vec<CodeNode>,
    /// Call sites per function/method id, in body order
    pub call_sites: IndexMap<String, Vec<CallSite>>,
}

/// Trait that all language analyzers must implement
pub trait LanguageAnalyzer {
    /// Parse one file into nodes and raw call sites.
    ///
    /// Fails with [`QuestError::Parse`] when the file is not valid source.
    fn extract(&mut self, content: &str, file_path: &Path) -> Result<ExtractedFile>;

    /// Get the file extensions this analyzer handles (without the dot)
    fn file_extensions(&self) -> &[&str];

    fn language(&self) -> Language;
}

/// Build the analyzer for `language`.
///
/// Languages without an analyzer fail here, before any file is read.
pub fn analyzer_for(language: Language) -> Result<Box<dyn LanguageAnalyzer>> {
    match language {
        Language::Python => Ok(Box::new(PythonAnalyzer::new()?)),
        Language::Golang => Err(QuestError::UnsupportedLanguage(format!(
            "{} (no analyzer available)",
            language
        ))),
    }
}

/// Pre-order walk over `root` and all of its descendants.
pub(crate) fn for_each_descendant<'tree>(root: Node<'tree>, mut visit: impl FnMut(Node<'tree>)) {
    let mut cursor = root.walk();
    loop {
        visit(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_tags() {
        assert_eq!("python".parse::<Language>().unwrap(), Language::Python);
        assert_eq!(" PY ".parse::<Language>().unwrap(), Language::Python);
        assert_eq!("go".parse::<Language>().unwrap(), Language::Golang);
        assert!(matches!("cobol".parse::<Language>(), Err(QuestError::UnsupportedLanguage(_))));
    }

    #[test]
    fn test_factory_builds_python_and_rejects_golang() {
        let analyzer = analyzer_for(Language::Python).unwrap();
        assert_eq!(analyzer.language(), Language::Python);
        assert_eq!(analyzer.file_extensions(), &["py"]);

        assert!(matches!(analyzer_for(Language::Golang), Err(QuestError::UnsupportedLanguage(_))));
    }
}

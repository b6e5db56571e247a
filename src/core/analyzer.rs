// src/core/analyzer.rs
use std::path::Path;
use std::time::Instant;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::error::{QuestError, Result};
use super::call_graph::{CallGraph, CallResolver, CallSite, CodeNode, EntryPointDetector};
use super::languages::{analyzer_for, Language};
use super::parser::CodeParser;

/// Outcome of one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub project_id: String,
    pub language: Language,
    pub call_graph: CallGraph,
    pub analyzed_at: DateTime<Utc>,
    /// Wall-clock seconds spent in the pipeline
    pub analysis_time: f64,
    /// Files parsed successfully
    pub files_analyzed: usize,
    /// Files skipped because they could not be read or parsed
    pub files_failed: usize,
    pub lines_of_code: usize,
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Runs discovery, extraction, resolution and graph construction for one project
pub struct ProjectAnalyzer {
    config: AnalysisConfig,
}

impl ProjectAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Analyze every source file under `root`.
    ///
    /// Per-file failures become warnings. A run with no source files, no
    /// nodes or no entry points fails as a whole.
    pub fn analyze<P: AsRef<Path>>(&self, project_id: &str, root: P) -> Result<AnalysisResult> {
        let root = root.as_ref();
        let started = Instant::now();

        let language: Language = self.config.language.parse()?;
        let mut analyzer = analyzer_for(language)?;
        let parser = CodeParser::new(&self.config, analyzer.file_extensions());

        info!("🔍 Analyzing {} project at {}", language, root.display());
        let files = parser.discover(root)?;
        if files.is_empty() {
            return Err(QuestError::Analysis(format!(
                "No {} source files found in {}",
                language,
                root.display()
            )));
        }

        let mut warnings = Vec::new();
        let mut nodes: IndexMap<String, CodeNode> = IndexMap::new();
        let mut call_sites: IndexMap<String, Vec<CallSite>> = IndexMap::new();
        let mut files_analyzed = 0;
        let mut files_failed = 0;
        let mut lines_of_code = 0;

        for path in &files {
            let extracted = parser
                .read_file(path)
                .and_then(|source| analyzer.extract(&source.content, &source.path));

            let extracted = match extracted {
                Ok(extracted) => extracted,
                Err(e) => {
                    warn!("⚠️  Skipping {}: {}", path.display(), e);
                    warnings.push(format!("Failed to analyze {}: {}", path.display(), e));
                    files_failed += 1;
                    continue;
                }
            };

            debug!("📄 {}: {} nodes", path.display(), extracted.nodes.len());
            files_analyzed += 1;
            lines_of_code += extracted.nodes.iter().map(|node| node.loc).sum::<usize>();

            let mut sites = extracted.call_sites;
            for node in extracted.nodes {
                if nodes.contains_key(&node.id) {
                    warn!("Duplicate node id {} in {}", node.id, path.display());
                    warnings.push(format!(
                        "Duplicate node id {} in {} (keeping the first definition)",
                        node.id,
                        path.display()
                    ));
                    continue;
                }
                if let Some(node_sites) = sites.shift_remove(&node.id) {
                    call_sites.insert(node.id.clone(), node_sites);
                }
                nodes.insert(node.id.clone(), node);
            }
        }

        if nodes.is_empty() {
            return Err(QuestError::Analysis("No code nodes found".to_string()));
        }

        let resolver = CallResolver::new(&nodes);
        let (edges, stats) = resolver.resolve(&mut nodes, &call_sites);
        info!(
            "🔗 Resolved {}/{} call sites into {} edges",
            stats.resolved,
            stats.call_sites,
            edges.len()
        );

        let entry_points = EntryPointDetector::new().detect_entry_points(&nodes);
        if entry_points.is_empty() {
            return Err(QuestError::Analysis("No entry points identified".to_string()));
        }

        let call_graph = CallGraph::new(nodes, edges, entry_points);
        if call_graph.is_empty() {
            return Err(QuestError::Analysis("Call graph is empty".to_string()));
        }

        let errors = call_graph.validate();
        let result = AnalysisResult {
            project_id: project_id.to_string(),
            language,
            analyzed_at: Utc::now(),
            analysis_time: started.elapsed().as_secs_f64(),
            files_analyzed,
            files_failed,
            lines_of_code,
            is_valid: errors.is_empty(),
            errors,
            warnings,
            call_graph,
        };

        info!(
            "✅ Analysis complete: {} nodes, {} edges, {} entry points, max depth {}",
            result.call_graph.total_nodes(),
            result.call_graph.total_edges(),
            result.call_graph.entry_points().len(),
            result.call_graph.max_depth()
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    fn analyzer() -> ProjectAnalyzer {
        ProjectAnalyzer::new(&AnalysisConfig::default())
    }

    #[test]
    fn test_one_broken_file_out_of_ten() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("app.py")
            .write_str("import os\n\ndef main():\n    step_0()\n")
            .unwrap();
        for i in 0..8 {
            temp.child(format!("step_{}.py", i))
                .write_str(&format!("def step_{}():\n    return {}\n", i, i))
                .unwrap();
        }
        temp.child("zz_broken.py").write_str("def broken(:\n    pass\n").unwrap();

        let result = analyzer().analyze("demo", temp.path()).unwrap();
        assert_eq!(result.files_analyzed, 9);
        assert_eq!(result.files_failed, 1);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("zz_broken.py"));
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert_eq!(result.call_graph.entry_points(), &["app.py::main".to_string()]);
        assert_eq!(result.call_graph.total_edges(), 1);
        // counted per node, so imports and blank lines are left out
        assert_eq!(result.lines_of_code, 2 + 8 * 2);
    }

    #[test]
    fn test_duplicate_basenames_keep_first() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a/util.py").write_str("def main():\n    pass\n").unwrap();
        temp.child("b/util.py").write_str("def main():\n    pass\n").unwrap();

        let result = analyzer().analyze("dupes", temp.path()).unwrap();
        assert_eq!(result.call_graph.total_nodes(), 1);
        let kept = result.call_graph.node("util.py::main").unwrap();
        assert!(kept.location.file.starts_with(temp.path().join("a")));
        assert!(result.warnings.iter().any(|w| w.contains("Duplicate node id")));
    }

    #[test]
    fn test_no_source_files() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("notes.txt").write_str("nothing here").unwrap();

        let err = analyzer().analyze("empty", temp.path()).unwrap_err();
        assert!(matches!(err, QuestError::Analysis(_)));
    }

    #[test]
    fn test_no_nodes() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("constants.py").write_str("X = 1\n").unwrap();

        let err = analyzer().analyze("consts", temp.path()).unwrap_err();
        assert!(err.to_string().contains("No code nodes found"));
    }

    #[test]
    fn test_no_entry_points() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("lib.py").write_str("def helper():\n    pass\n").unwrap();

        let err = analyzer().analyze("lib", temp.path()).unwrap_err();
        assert!(err.to_string().contains("No entry points identified"));
    }

    #[test]
    fn test_golang_fails_before_discovery() {
        let mut config = AnalysisConfig::default();
        config.language = "golang".to_string();

        // the directory does not exist; the language check must fire first
        let err = ProjectAnalyzer::new(&config)
            .analyze("go", "/definitely/not/here")
            .unwrap_err();
        assert!(matches!(err, QuestError::UnsupportedLanguage(_)));
    }

    #[test]
    fn test_result_round_trips_through_json() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("app.py")
            .write_str("@app.route('/')\ndef index():\n    return render()\n\ndef render():\n    return 1\n")
            .unwrap();

        let result = analyzer().analyze("web", temp.path()).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        let back: AnalysisResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.project_id, "web");
        assert_eq!(back.language, Language::Python);
        assert_eq!(back.call_graph.entry_points(), result.call_graph.entry_points());
        assert_eq!(back.call_graph.edges(), result.call_graph.edges());
    }
}

// src/core/engine.rs
use std::path::{Path, PathBuf};
use anyhow::Result;
use tracing::{info, warn, debug};

use crate::config::Config;
use crate::error::QuestError;
use super::{render_levels_markdown, AnalysisResult, Level, LevelGenerator, ProjectAnalyzer};

const CONFIG_FILE: &str = "codequest.toml";
const ANALYSIS_FILE: &str = "analysis.json";
const GRAPH_FILE: &str = "call_graph.dot";
const LEVELS_JSON_FILE: &str = "levels.json";
const LEVELS_MARKDOWN_FILE: &str = "levels.md";

/// Main orchestration engine: runs the analysis pipeline and writes its outputs
pub struct Engine {
    config: Config,
}

impl Engine {
    pub async fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;
        debug!("Loaded configuration: {:?}", config);
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Write a default configuration file into `path` (or the current directory)
    pub async fn init(&self, path: Option<PathBuf>, force: bool) -> Result<()> {
        let target_dir = match path {
            Some(path) => path,
            None => std::env::current_dir()?,
        };
        info!("Initializing codequest in: {}", target_dir.display());

        tokio::fs::create_dir_all(&target_dir).await?;
        let config_path = target_dir.join(CONFIG_FILE);
        if config_path.exists() && !force {
            return Err(QuestError::Config(format!(
                "{} already exists (use --force to overwrite)",
                config_path.display()
            ))
            .into());
        }

        let mut config = Config::default();
        if let Some(name) = target_dir.file_name().and_then(|n| n.to_str()) {
            config.project.name = name.to_string();
        }
        config.save(&config_path)?;

        info!("✅ Wrote {}", config_path.display());
        Ok(())
    }

    /// Analyze the source tree and write `analysis.json` (and optionally the DOT graph)
    pub async fn analyze(&self, source: Option<PathBuf>, output: Option<PathBuf>, dot: bool) -> Result<()> {
        let output_dir = self.output_dir(output);
        let result = self.run_analysis(source.as_deref())?;

        tokio::fs::create_dir_all(&output_dir).await?;
        let analysis_path = output_dir.join(ANALYSIS_FILE);
        tokio::fs::write(&analysis_path, serde_json::to_string_pretty(&result)?).await?;
        info!("📄 Analysis written to {}", analysis_path.display());

        if dot {
            let graph_path = output_dir.join(GRAPH_FILE);
            tokio::fs::write(&graph_path, result.call_graph.to_dot()).await?;
            info!("📈 Call graph written to {}", graph_path.display());
        }

        Ok(())
    }

    /// Analyze, generate levels and write them as JSON or Markdown
    pub async fn levels(
        &self,
        source: Option<PathBuf>,
        output: Option<PathBuf>,
        format: &str,
        learner: bool,
    ) -> Result<()> {
        let output_dir = self.output_dir(output);
        let result = self.run_analysis(source.as_deref())?;
        let mut levels = self.generate_levels(&result);

        if learner {
            info!("🔒 Stripping answers for learner output");
            levels = levels.iter().map(Level::redacted).collect();
        }

        let (file_name, content) = match format {
            "json" => (LEVELS_JSON_FILE, serde_json::to_string_pretty(&levels)?),
            "markdown" | "md" => (
                LEVELS_MARKDOWN_FILE,
                render_levels_markdown(&result.project_id, result.language.as_str(), &levels)?,
            ),
            _ => return Err(QuestError::Config(format!("Unsupported format: {}", format)).into()),
        };

        tokio::fs::create_dir_all(&output_dir).await?;
        let levels_path = output_dir.join(file_name);
        tokio::fs::write(&levels_path, content).await?;
        let points: u32 = levels.iter().map(Level::total_points).sum();
        info!(
            "🎉 {} levels ({} points) written to {}",
            levels.len(),
            points,
            levels_path.display()
        );

        Ok(())
    }

    /// Write the DOT export to `output`, or print it when no path is given
    pub async fn graph(&self, source: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
        let result = self.run_analysis(source.as_deref())?;
        let dot = result.call_graph.to_dot();

        match output {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&path, dot).await?;
                info!("📈 Call graph written to {}", path.display());
            }
            None => println!("{}", dot),
        }

        Ok(())
    }

    /// Run the analysis pipeline and report its warnings
    pub fn run_analysis(&self, source: Option<&Path>) -> Result<AnalysisResult> {
        let source_dir = source.unwrap_or(self.config.project.source_dir.as_path());

        info!("🔍 Starting analysis of {}", source_dir.display());
        let analyzer = ProjectAnalyzer::new(&self.config.analysis);
        let result = analyzer
            .analyze(&self.config.project.name, source_dir)
            .map_err(|e| anyhow::anyhow!("Analysis failed: {}", e))?;

        info!("📊 Analysis summary:");
        info!("  - {} files analyzed ({} failed)", result.files_analyzed, result.files_failed);
        info!("  - {} lines of code", result.lines_of_code);
        info!("  - {} nodes, {} edges", result.call_graph.total_nodes(), result.call_graph.total_edges());
        info!("  - {} entry points, max depth {}", result.call_graph.entry_points().len(), result.call_graph.max_depth());

        for warning in &result.warnings {
            warn!("⚠️  {}", warning);
        }
        if !result.is_valid {
            warn!("❌ Call graph validation failed:");
            for error in &result.errors {
                warn!("  - {}", error);
            }
        }

        Ok(result)
    }

    pub fn generate_levels(&self, result: &AnalysisResult) -> Vec<Level> {
        LevelGenerator::new(&result.call_graph, &self.config.generation).generate_levels()
    }

    fn output_dir(&self, output: Option<PathBuf>) -> PathBuf {
        output.unwrap_or_else(|| self.config.project.output_dir.clone())
    }
}

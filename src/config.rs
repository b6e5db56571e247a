use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{QuestError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Source discovery and parsing settings
    pub analysis: AnalysisConfig,

    /// Level generation settings
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name, used as the project id when none is given
    pub name: String,

    /// Source directory to analyze
    pub source_dir: PathBuf,

    /// Directory that receives analysis and level output
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Language tag (python, golang)
    pub language: String,

    /// Maximum file size to parse (in bytes)
    pub max_file_size: usize,

    /// Extra glob patterns to skip during discovery
    pub ignore_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Number of levels to keep after ranking
    pub max_levels: usize,

    /// Depth bound used when enumerating candidate chains
    pub chain_depth: usize,

    /// Shortest chain worth turning into a level
    pub min_chain_length: usize,

    /// Fan-in seeds used when entry points yield no chains
    pub seed_count: usize,

    /// Maximum number of source lines copied into a level snippet
    pub snippet_max_lines: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_levels: 10,
            chain_depth: 5,
            min_chain_length: 2,
            seed_count: 5,
            snippet_max_lines: 40,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            language: "python".to_string(),
            max_file_size: 1024 * 1024, // 1MB
            ignore_patterns: vec![
                "target/".to_string(),
                "node_modules/".to_string(),
                ".git/".to_string(),
                "__pycache__/".to_string(),
                ".venv/".to_string(),
            ],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: ProjectConfig {
                name: "Unnamed Project".to_string(),
                source_dir: PathBuf::from("."),
                output_dir: PathBuf::from("codequest-out"),
            },
            analysis: AnalysisConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| QuestError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| QuestError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                // Try common config file locations
                let candidates = [
                    "Codequest.toml",
                    "codequest.toml",
                    ".codequest.toml",
                ];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }
}

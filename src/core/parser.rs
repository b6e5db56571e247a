use std::path::{Path, PathBuf};
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::{QuestError, Result};

/// A discovered source file, decoded and ready for extraction
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
}

/// Walks a project tree and loads the files a language analyzer handles
pub struct CodeParser {
    config: AnalysisConfig,
    extensions: Vec<String>,
}

impl CodeParser {
    pub fn new(config: &AnalysisConfig, extensions: &[&str]) -> Self {
        Self {
            config: config.clone(),
            extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
        }
    }

    /// Source files under `dir`, sorted by path.
    ///
    /// Respects `.gitignore` and the configured ignore patterns.
    pub fn discover<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(QuestError::FileSystem(format!(
                "Source directory not found: {}",
                dir.display()
            )));
        }

        let mut overrides = OverrideBuilder::new(dir);
        for pattern in &self.config.ignore_patterns {
            let glob = format!("!{}", pattern.trim_end_matches('/'));
            overrides.add(&glob)
                .map_err(|e| QuestError::Config(format!("Invalid ignore pattern '{}': {}", pattern, e)))?;
        }
        let overrides = overrides.build()
            .map_err(|e| QuestError::Config(e.to_string()))?;

        let walker = WalkBuilder::new(dir)
            .hidden(false)
            .git_ignore(true)
            .require_git(false)
            .overrides(overrides)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| QuestError::FileSystem(e.to_string()))?;
            let path = entry.path();

            if path.is_file() && self.should_parse_file(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        debug!("Discovered {} source files under {}", files.len(), dir.display());
        Ok(files)
    }

    /// Read one file, decoding as UTF-8 with a Latin-1 fallback
    pub fn read_file<P: AsRef<Path>>(&self, file_path: P) -> Result<SourceFile> {
        let path = file_path.as_ref();
        let bytes = std::fs::read(path)?;

        if bytes.len() > self.config.max_file_size {
            return Err(QuestError::parse(
                path,
                format!("file exceeds maximum size limit ({} bytes)", self.config.max_file_size),
            ));
        }

        Ok(SourceFile {
            path: path.to_path_buf(),
            content: decode_source(path, bytes),
        })
    }

    fn should_parse_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| self.extensions.iter().any(|known| known == ext))
    }
}

/// UTF-8 with a Latin-1 fallback
pub(crate) fn decode_source(path: &Path, bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            debug!("{} is not UTF-8, decoding as Latin-1", path.display());
            err.into_bytes().iter().map(|&b| b as char).collect()
        }
    }
}

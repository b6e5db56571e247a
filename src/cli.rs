use clap::{Parser, Subcommand};
use std::path::PathBuf;
use anyhow::Result;

use codequest::core::Engine;

#[derive(Parser)]
#[command(name = "codequest")]
#[command(about = "Turn a codebase into a call graph and a ranked path of learning levels")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default codequest.toml
    Init {
        /// Target directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Build the call graph and write analysis.json
    Analyze {
        /// Source directory to analyze
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write call_graph.dot
        #[arg(long)]
        dot: bool,
    },

    /// Generate learning levels from the call graph
    Levels {
        /// Source directory to analyze
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (json, markdown)
        #[arg(long, default_value = "json")]
        format: String,

        /// Strip challenge answers for learner-facing output
        #[arg(long)]
        learner: bool,
    },

    /// Export the call graph in GraphViz DOT format
    Graph {
        /// Source directory to analyze
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Output file (prints to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn execute(self, engine: Engine) -> Result<()> {
        match self.command {
            Commands::Init { path, force } => {
                engine.init(path, force).await
            }
            Commands::Analyze { source, output, dot } => {
                engine.analyze(source, output, dot).await
            }
            Commands::Levels { source, output, format, learner } => {
                engine.levels(source, output, &format, learner).await
            }
            Commands::Graph { source, output } => {
                engine.graph(source, output).await
            }
        }
    }
}

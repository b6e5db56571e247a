// src/core/mod.rs
mod engine;
mod parser;
mod analyzer;
mod complexity;
mod report;

// Call graph model, resolution and traversal
pub mod call_graph;

// Language-specific analyzers
pub mod languages;

// Level generation
pub mod levels;

pub use parser::{CodeParser, SourceFile};
pub use analyzer::{AnalysisResult, ProjectAnalyzer};
pub use complexity::{file_complexity, ComplexityRules, PYTHON_RULES};
pub use report::render_levels_markdown;

pub use call_graph::{
    CallGraph, CallEdge, CallType, CodeNode, NodeKind, NodeFlags, Location, Parameter,
    CallResolver, CallSite, EntryPointDetector,
};
pub use languages::{analyzer_for, ExtractedFile, Language, LanguageAnalyzer};
pub use levels::{Challenge, ChallengeType, Difficulty, Level, LevelGenerator};

// Export the main engine
pub use engine::Engine;

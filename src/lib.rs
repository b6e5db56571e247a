//! codequest: call graphs and learning levels from source trees.
//!
//! [`core::ProjectAnalyzer`] turns a directory into an
//! [`core::AnalysisResult`] holding the [`core::CallGraph`];
//! [`core::LevelGenerator`] ranks its call chains into levels.

pub mod config;
pub mod core;
pub mod error;

pub use config::Config;
pub use error::{QuestError, Result};

// src/core/levels/generator.rs
use std::cmp::Ordering;
use tracing::{debug, info};

use crate::config::GenerationConfig;
use crate::core::call_graph::{CallGraph, CodeNode};
use crate::core::parser::decode_source;
use super::challenges::{generate_challenge, node_name, select_challenge_types};
use super::scoring::{chain_importance, classify_difficulty};
use super::{Challenge, Difficulty, Level};

/// Minutes budgeted per challenge
const MINUTES_PER_CHALLENGE: u32 = 3;
const MAX_OBJECTIVES: usize = 3;

/// A candidate chain with its importance score
#[derive(Debug, Clone, PartialEq)]
pub struct RankedChain {
    pub score: f64,
    pub chain: Vec<String>,
}

/// Turns a finished call graph into an ordered list of levels.
///
/// Everything except the snippet read is a pure function of the graph and
/// the generation settings.
pub struct LevelGenerator<'g> {
    graph: &'g CallGraph,
    config: GenerationConfig,
}

impl<'g> LevelGenerator<'g> {
    pub fn new(graph: &'g CallGraph, config: &GenerationConfig) -> Self {
        Self {
            graph,
            config: config.clone(),
        }
    }

    /// Rank chains and build one level per top chain
    pub fn generate_levels(&self) -> Vec<Level> {
        info!("🎯 Generating up to {} levels", self.config.max_levels);

        let ranked = self.identify_core_chains();
        let levels: Vec<Level> = ranked
            .into_iter()
            .take(self.config.max_levels)
            .enumerate()
            .map(|(i, ranked)| {
                let difficulty = self.calculate_difficulty(&ranked.chain);
                let challenges = self.generate_challenges(&ranked.chain, difficulty);
                debug!(
                    "Level {} ({:.1}): {} [{}]",
                    i + 1,
                    ranked.score,
                    ranked.chain.join(" -> "),
                    difficulty
                );
                self.create_level(i + 1, ranked.chain, difficulty, challenges)
            })
            .collect();

        info!("✅ Generated {} levels", levels.len());
        levels
    }

    /// All candidate chains, most important first.
    ///
    /// Candidates are the chains from every entry point; when none is long
    /// enough, the nodes with the most callers seed the search instead.
    pub fn identify_core_chains(&self) -> Vec<RankedChain> {
        let mut ranked = self.rank_from(self.graph.entry_points().iter().map(String::as_str));

        if ranked.is_empty() {
            let seeds = self.fan_in_seeds();
            debug!("No entry point chains, seeding from {} most-called nodes", seeds.len());
            ranked = self.rank_from(seeds.iter().map(|node| node.id.as_str()));
        }

        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        ranked
    }

    pub fn calculate_difficulty(&self, chain: &[String]) -> Difficulty {
        classify_difficulty(self.graph, chain)
    }

    pub fn generate_challenges(&self, chain: &[String], difficulty: Difficulty) -> Vec<Challenge> {
        select_challenge_types(self.graph, chain, difficulty)
            .into_iter()
            .filter_map(|challenge_type| generate_challenge(self.graph, challenge_type, chain))
            .collect()
    }

    fn rank_from<'a>(&self, starts: impl Iterator<Item = &'a str>) -> Vec<RankedChain> {
        let mut ranked = Vec::new();
        for start in starts {
            for chain in self.graph.chains(start, self.config.chain_depth) {
                if chain.len() < self.config.min_chain_length {
                    continue;
                }
                ranked.push(RankedChain {
                    score: chain_importance(self.graph, &chain),
                    chain,
                });
            }
        }
        ranked
    }

    /// Nodes with the most callers; ties keep node order
    fn fan_in_seeds(&self) -> Vec<&CodeNode> {
        let mut nodes: Vec<&CodeNode> = self.graph.nodes().values().collect();
        nodes.sort_by(|a, b| b.called_by.len().cmp(&a.called_by.len()));
        nodes.truncate(self.config.seed_count);
        nodes
    }

    fn create_level(&self, number: usize, chain: Vec<String>, difficulty: Difficulty, challenges: Vec<Challenge>) -> Level {
        let entry_id = chain.first().cloned().unwrap_or_default();
        let entry = self.graph.node(&entry_id);

        let name = match entry {
            Some(node) => format!("Understanding {}", node.name),
            None => format!("Code Analysis Challenge ({})", difficulty),
        };

        Level {
            id: format!("level_{}", number),
            name,
            description: self.describe(&chain),
            difficulty,
            code_snippet: self.code_snippet(entry),
            objectives: self.objectives(&chain),
            xp_reward: difficulty.xp_reward(),
            estimated_time: challenges.len() as u32 * MINUTES_PER_CHALLENGE,
            prerequisites: if number > 1 {
                vec![format!("level_{}", number - 1)]
            } else {
                Vec::new()
            },
            entry_function: entry_id,
            call_chain: chain,
            challenges,
        }
    }

    fn describe(&self, chain: &[String]) -> String {
        match (chain.first(), chain.last()) {
            (Some(first), Some(last)) => format!(
                "Learn how {} works and trace its execution to {}",
                node_name(self.graph, first),
                node_name(self.graph, last)
            ),
            _ => "Analyze this code and understand its behavior".to_string(),
        }
    }

    fn objectives(&self, chain: &[String]) -> Vec<String> {
        let mut objectives = Vec::new();

        if let (Some(first), Some(last)) = (chain.first(), chain.last()) {
            objectives.push(format!(
                "Trace execution from {} to {}",
                node_name(self.graph, first),
                node_name(self.graph, last)
            ));
        }

        for node in chain.iter().take(3).filter_map(|id| self.graph.node(id)) {
            if let Some(decorator) = node.decorators.first() {
                objectives.push(format!("Understand {} pattern", decorator));
            }
            if node.flags.is_async {
                objectives.push("Master async/await pattern".to_string());
            }
            if node.flags.is_generator {
                objectives.push("Understand generator/yield pattern".to_string());
            }
        }

        objectives.truncate(MAX_OBJECTIVES);
        objectives
    }

    /// Source lines of the entry node, capped at `snippet_max_lines`
    fn code_snippet(&self, entry: Option<&CodeNode>) -> String {
        let Some(node) = entry else {
            return "# Source unavailable".to_string();
        };

        let source = match std::fs::read(&node.location.file) {
            Ok(bytes) => decode_source(&node.location.file, bytes),
            Err(e) => {
                debug!("Cannot read snippet for {}: {}", node.id, e);
                return format!("# Source for {} is unavailable", node.display_name());
            }
        };

        let start = node.location.start_line.saturating_sub(1);
        let len = node.loc.min(self.config.snippet_max_lines);
        let lines: Vec<&str> = source.lines().skip(start).take(len).collect();

        if lines.is_empty() {
            return format!("# Source for {} is unavailable", node.display_name());
        }

        let mut snippet = lines.join("\n");
        if node.loc > len {
            snippet.push_str("\n    # ...");
        }
        snippet
    }
}

// src/core/levels/scoring.rs
//! Chain importance and difficulty.
//!
//! Both scores are pure functions of the chain and the node data in the
//! graph. Ids missing from the graph contribute nothing but still count
//! toward the chain length.

use crate::core::call_graph::{CallGraph, CodeNode};
use super::Difficulty;

/// Weight of the first chain position; each later one decays by 0.7
const PROXIMITY_WEIGHT: f64 = 40.0;
const PROXIMITY_DECAY: f64 = 0.7;
const FREQUENCY_CAP: f64 = 30.0;
const COMPLEXITY_CAP: f64 = 20.0;
const DOCS_WEIGHT: f64 = 10.0;

/// Importance of a chain: proximity + call frequency + complexity + docs.
pub fn chain_importance(graph: &CallGraph, chain: &[String]) -> f64 {
    if chain.is_empty() {
        return 0.0;
    }
    let len = chain.len() as f64;
    let nodes = known_nodes(graph, chain);

    let proximity: f64 = (0..chain.len())
        .map(|i| PROXIMITY_WEIGHT * PROXIMITY_DECAY.powi(i as i32))
        .sum();

    let total_called_by: usize = nodes.iter().map(|n| n.called_by.len()).sum();
    let frequency = (total_called_by as f64 / len * 5.0).min(FREQUENCY_CAP);

    let total_complexity: u32 = nodes.iter().map(|n| n.complexity).sum();
    let complexity = (total_complexity as f64 / len).min(COMPLEXITY_CAP);

    let documented = nodes.iter().filter(|n| n.is_documented()).count();
    let docs = documented as f64 / len * DOCS_WEIGHT;

    proximity + frequency + complexity + docs
}

/// Raw 0-100 difficulty score of a chain
pub fn difficulty_score(graph: &CallGraph, chain: &[String]) -> f64 {
    let nodes = known_nodes(graph, chain);

    let length = (chain.len() as f64 * 4.0).min(20.0);
    let complexity = (average_complexity(graph, chain) * 2.0).min(30.0);

    let abstraction: usize = nodes
        .iter()
        .map(|n| {
            n.decorators.len() * 3
                + if n.flags.is_async { 5 } else { 0 }
                + if n.flags.is_generator { 5 } else { 0 }
        })
        .sum();
    let abstraction = (abstraction as f64).min(25.0);

    let dependencies: usize = nodes.iter().map(|n| n.depends_on.len()).sum();
    let dependencies = (dependencies as f64 * 2.0).min(25.0);

    length + complexity + abstraction + dependencies
}

pub fn classify_difficulty(graph: &CallGraph, chain: &[String]) -> Difficulty {
    Difficulty::from_score(difficulty_score(graph, chain))
}

/// Mean complexity over the chain ids present in the graph
pub fn average_complexity(graph: &CallGraph, chain: &[String]) -> f64 {
    let nodes = known_nodes(graph, chain);
    if nodes.is_empty() {
        return 0.0;
    }
    nodes.iter().map(|n| n.complexity as f64).sum::<f64>() / nodes.len() as f64
}

fn known_nodes<'g>(graph: &'g CallGraph, chain: &[String]) -> Vec<&'g CodeNode> {
    chain.iter().filter_map(|id| graph.node(id)).collect()
}

// src/core/levels/challenges.rs
use crate::core::call_graph::{CallGraph, CodeNode};
use super::scoring::average_complexity;
use super::{Challenge, ChallengeAnswer, ChallengeQuestion, ChallengeType, Difficulty};

/// Upper bound on challenges per level
pub const MAX_CHALLENGES: usize = 5;

const DESCRIPTION_DISTRACTORS: [&str; 3] = ["Parses input", "Validates data", "Formats output"];
const ARCHITECTURE_OPTIONS: [&str; 4] = ["Decorator", "Factory", "Observer", "Strategy"];

/// Pick challenge types for a chain, in a fixed order.
pub fn select_challenge_types(graph: &CallGraph, chain: &[String], difficulty: Difficulty) -> Vec<ChallengeType> {
    let mut types = vec![ChallengeType::MultipleChoice];

    if chain.len() >= 3 {
        types.push(ChallengeType::CodeTracing);
    }

    let has_decorators = chain
        .iter()
        .filter_map(|id| graph.node(id))
        .any(|node| !node.decorators.is_empty());

    if has_decorators || difficulty >= Difficulty::Intermediate {
        types.push(ChallengeType::FillBlank);
    }
    if difficulty >= Difficulty::Intermediate {
        types.push(ChallengeType::CodeCompletion);
    }
    if average_complexity(graph, chain) > 10.0 {
        types.push(ChallengeType::Debugging);
    }
    if difficulty >= Difficulty::Advanced {
        types.push(ChallengeType::Architecture);
    }

    types.truncate(MAX_CHALLENGES);
    types
}

/// Fill the template for `challenge_type`.
///
/// Returns `None` when the template needs the entry node and the graph does
/// not have it.
pub fn generate_challenge(graph: &CallGraph, challenge_type: ChallengeType, chain: &[String]) -> Option<Challenge> {
    let entry_id = chain.first()?;
    let entry = graph.node(entry_id);

    let (question, answer, hints) = match challenge_type {
        ChallengeType::MultipleChoice => multiple_choice(entry?),
        ChallengeType::CodeTracing => {
            let first = node_name(graph, entry_id);
            let last = chain.last().map(|id| node_name(graph, id)).unwrap_or_default();
            (
                ChallengeQuestion::CodeTracing {
                    prompt: format!("Trace the execution flow from {} to {}", first, last),
                    steps: chain.len(),
                },
                ChallengeAnswer::CodeTracing {
                    chain: chain.iter().map(|id| node_name(graph, id)).collect(),
                },
                vec![format!("Start with {}", first)],
            )
        }
        ChallengeType::FillBlank => {
            let node = entry?;
            (
                ChallengeQuestion::FillBlank {
                    prompt: format!("Complete the decorator for {}", node.name),
                    template: format!("@____\ndef {}():", node.name),
                },
                ChallengeAnswer::FillBlank {
                    fill: node.decorators.first().cloned().unwrap_or_else(|| "decorator".to_string()),
                },
                vec!["Check the decorators used in this function".to_string()],
            )
        }
        ChallengeType::CodeCompletion => (
            ChallengeQuestion::CodeCompletion {
                prompt: "Complete the function implementation".to_string(),
                template: "def function():\n    # TODO: implement".to_string(),
            },
            ChallengeAnswer::CodeCompletion { code: "pass".to_string() },
            vec!["Think about the function's purpose".to_string()],
        ),
        ChallengeType::Debugging => (
            ChallengeQuestion::Debugging {
                prompt: "Find and fix the bug in this code".to_string(),
                buggy_code: "def func():\n    return None".to_string(),
            },
            ChallengeAnswer::Debugging { fixed_code: "def func():\n    return True".to_string() },
            vec!["Check the return type".to_string()],
        ),
        ChallengeType::Architecture => (
            ChallengeQuestion::Architecture {
                prompt: "What design pattern is used here?".to_string(),
                options: ARCHITECTURE_OPTIONS.iter().map(|o| o.to_string()).collect(),
            },
            ChallengeAnswer::Architecture { pattern: "Decorator".to_string() },
            vec!["Look at how functions are wrapped".to_string()],
        ),
    };

    Some(Challenge {
        id: format!("{}_{}", challenge_type.id_prefix(), entry_id),
        challenge_type,
        question,
        answer: Some(answer),
        hints,
        points: challenge_type.points(),
    })
}

/// Documented nodes get a "what does it do" question, the rest a parameter count question.
fn multiple_choice(node: &CodeNode) -> (ChallengeQuestion, ChallengeAnswer, Vec<String>) {
    let (prompt, correct, options) = match node.docstring.as_deref().filter(|_| node.is_documented()) {
        Some(docstring) => {
            let correct = first_sentence(docstring);
            let mut options: Vec<String> = DESCRIPTION_DISTRACTORS.iter().map(|d| d.to_string()).collect();
            options.push(correct.clone());
            options.sort();
            options.dedup();
            (format!("What does the function {}() do?", node.name), correct, options)
        }
        None => {
            let count = node.parameters.len();
            let options = [count.checked_sub(1), Some(count), Some(count + 1), Some(count + 2)]
                .into_iter()
                .flatten()
                .map(|c| c.to_string())
                .collect::<Vec<String>>();
            (format!("How many parameters does {}() accept?", node.name), count.to_string(), options)
        }
    };

    (
        ChallengeQuestion::MultipleChoice { prompt, options },
        ChallengeAnswer::MultipleChoice { correct },
        vec![format!("Check the function signature at line {}", node.location.start_line)],
    )
}

/// Text before the first period, trimmed
fn first_sentence(docstring: &str) -> String {
    let sentence = docstring.split('.').next().unwrap_or(docstring).trim();
    if sentence.is_empty() {
        docstring.trim().to_string()
    } else {
        sentence.to_string()
    }
}

/// Node name for an id, falling back to the part after `::`
pub(crate) fn node_name(graph: &CallGraph, id: &str) -> String {
    match graph.node(id) {
        Some(node) => node.name.clone(),
        None => id.rsplit("::").next().unwrap_or(id).to_string(),
    }
}

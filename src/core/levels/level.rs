// src/core/levels/level.rs
use std::fmt;
use serde::{Serialize, Deserialize};

/// Ordinal difficulty tier of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Tutorial = 1,
    Basic = 2,
    Intermediate = 3,
    Advanced = 4,
    Expert = 5,
}

impl Difficulty {
    /// Map a 0-100 difficulty score onto a tier
    pub fn from_score(score: f64) -> Self {
        if score < 20.0 {
            Difficulty::Tutorial
        } else if score < 40.0 {
            Difficulty::Basic
        } else if score < 60.0 {
            Difficulty::Intermediate
        } else if score < 80.0 {
            Difficulty::Advanced
        } else {
            Difficulty::Expert
        }
    }

    pub fn xp_reward(&self) -> u32 {
        match self {
            Difficulty::Tutorial => 50,
            Difficulty::Basic => 100,
            Difficulty::Intermediate => 150,
            Difficulty::Advanced => 200,
            Difficulty::Expert => 300,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Tutorial => "Tutorial",
            Difficulty::Basic => "Basic",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
            Difficulty::Expert => "Expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeType {
    MultipleChoice,
    CodeTracing,
    FillBlank,
    CodeCompletion,
    Debugging,
    Architecture,
}

impl ChallengeType {
    pub fn points(&self) -> u32 {
        match self {
            ChallengeType::MultipleChoice => 10,
            ChallengeType::CodeTracing => 15,
            ChallengeType::FillBlank => 12,
            ChallengeType::CodeCompletion => 20,
            ChallengeType::Debugging => 15,
            ChallengeType::Architecture => 15,
        }
    }

    /// Prefix of challenge ids of this type
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ChallengeType::MultipleChoice => "mc",
            ChallengeType::CodeTracing => "trace",
            ChallengeType::FillBlank => "fill",
            ChallengeType::CodeCompletion => "complete",
            ChallengeType::Debugging => "debug",
            ChallengeType::Architecture => "arch",
        }
    }
}

/// What the learner is shown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChallengeQuestion {
    MultipleChoice { prompt: String, options: Vec<String> },
    CodeTracing { prompt: String, steps: usize },
    FillBlank { prompt: String, template: String },
    CodeCompletion { prompt: String, template: String },
    Debugging { prompt: String, buggy_code: String },
    Architecture { prompt: String, options: Vec<String> },
}

impl ChallengeQuestion {
    pub fn prompt(&self) -> &str {
        match self {
            ChallengeQuestion::MultipleChoice { prompt, .. }
            | ChallengeQuestion::CodeTracing { prompt, .. }
            | ChallengeQuestion::FillBlank { prompt, .. }
            | ChallengeQuestion::CodeCompletion { prompt, .. }
            | ChallengeQuestion::Debugging { prompt, .. }
            | ChallengeQuestion::Architecture { prompt, .. } => prompt,
        }
    }
}

/// The expected answer. Never part of a learner-facing payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChallengeAnswer {
    MultipleChoice { correct: String },
    CodeTracing { chain: Vec<String> },
    FillBlank { fill: String },
    CodeCompletion { code: String },
    Debugging { fixed_code: String },
    Architecture { pattern: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    #[serde(rename = "type")]
    pub challenge_type: ChallengeType,
    pub question: ChallengeQuestion,
    /// `None` once redacted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<ChallengeAnswer>,
    pub hints: Vec<String>,
    pub points: u32,
}

impl Challenge {
    /// Copy of this challenge with the answer removed
    pub fn redacted(&self) -> Challenge {
        Challenge {
            answer: None,
            ..self.clone()
        }
    }

    pub fn is_redacted(&self) -> bool {
        self.answer.is_none()
    }
}

/// A generated learning level built around one call chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// `level_<n>`, numbered from 1 in rank order
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    /// Node id the chain starts from
    pub entry_function: String,
    pub call_chain: Vec<String>,
    pub code_snippet: String,
    pub challenges: Vec<Challenge>,
    /// At most three
    pub objectives: Vec<String>,
    pub xp_reward: u32,
    /// Minutes
    pub estimated_time: u32,
    /// Previous level id; empty for the first level
    pub prerequisites: Vec<String>,
}

impl Level {
    /// Learner-facing copy: every challenge answer stripped
    pub fn redacted(&self) -> Level {
        Level {
            challenges: self.challenges.iter().map(Challenge::redacted).collect(),
            ..self.clone()
        }
    }

    pub fn total_points(&self) -> u32 {
        self.challenges.iter().map(|c| c.points).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn challenge() -> Challenge {
        Challenge {
            id: "trace_app.py::main".to_string(),
            challenge_type: ChallengeType::CodeTracing,
            question: ChallengeQuestion::CodeTracing {
                prompt: "Trace the execution flow from main to save".to_string(),
                steps: 2,
            },
            answer: Some(ChallengeAnswer::CodeTracing {
                chain: vec!["main".to_string(), "save".to_string()],
            }),
            hints: vec!["Start with main".to_string()],
            points: ChallengeType::CodeTracing.points(),
        }
    }

    #[test]
    fn test_difficulty_thresholds() {
        assert_eq!(Difficulty::from_score(0.0), Difficulty::Tutorial);
        assert_eq!(Difficulty::from_score(19.9), Difficulty::Tutorial);
        assert_eq!(Difficulty::from_score(20.0), Difficulty::Basic);
        assert_eq!(Difficulty::from_score(59.5), Difficulty::Intermediate);
        assert_eq!(Difficulty::from_score(79.0), Difficulty::Advanced);
        assert_eq!(Difficulty::from_score(80.0), Difficulty::Expert);
        assert!(Difficulty::Basic < Difficulty::Intermediate);
        assert_eq!(Difficulty::Expert.xp_reward(), 300);
    }

    #[test]
    fn test_redacted_challenge_has_no_answer_in_json() {
        let redacted = challenge().redacted();
        assert!(redacted.is_redacted());

        let json = serde_json::to_value(&redacted).unwrap();
        assert!(json.get("answer").is_none());
        assert_eq!(json["type"], "code_tracing");
        assert_eq!(json["question"]["kind"], "code_tracing");
        assert_eq!(json["question"]["steps"], 2);
    }

    #[test]
    fn test_level_redaction_keeps_everything_else() {
        let level = Level {
            id: "level_1".to_string(),
            name: "Understanding main".to_string(),
            description: "Learn how main works and trace its execution to save".to_string(),
            difficulty: Difficulty::Basic,
            entry_function: "app.py::main".to_string(),
            call_chain: vec!["app.py::main".to_string(), "app.py::save".to_string()],
            code_snippet: "def main():\n    save()".to_string(),
            challenges: vec![challenge()],
            objectives: vec!["Trace execution from main to save".to_string()],
            xp_reward: Difficulty::Basic.xp_reward(),
            estimated_time: 3,
            prerequisites: Vec::new(),
        };

        let redacted = level.redacted();
        assert!(redacted.challenges.iter().all(Challenge::is_redacted));
        assert_eq!(redacted.call_chain, level.call_chain);
        assert_eq!(redacted.total_points(), 15);
        assert!(!level.challenges[0].is_redacted());
    }

    #[test]
    fn test_challenge_round_trip() {
        let original = challenge();
        let json = serde_json::to_string(&original).unwrap();
        let back: Challenge = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }
}

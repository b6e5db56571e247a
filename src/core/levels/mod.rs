// src/core/levels/mod.rs
//! Learning level generation.
//!
//! Chains from the call graph are ranked by [`scoring::chain_importance`],
//! classified into a [`Difficulty`] tier, given a set of challenges and
//! assembled into numbered [`Level`]s by the [`LevelGenerator`].

mod level;
mod challenges;
mod generator;
pub mod scoring;

pub use level::{Challenge, ChallengeAnswer, ChallengeQuestion, ChallengeType, Difficulty, Level};
pub use challenges::{generate_challenge, select_challenge_types, MAX_CHALLENGES};
pub use generator::{LevelGenerator, RankedChain};

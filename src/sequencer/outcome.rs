//! Run outcome draw and terminal results

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::messages::failure_message;

/// Source of the uniform draw in `[0, 1)` that decides a run's outcome
pub trait OutcomeSource: Send {
    fn draw(&mut self) -> f64;
}

/// Draws from a random number generator.
///
/// Uses the thread-local generator unless seeded.
pub struct RandomSource {
    rng: Option<StdRng>,
}

impl RandomSource {
    pub fn new() -> Self {
        Self { rng: None }
    }

    /// Reproducible draws for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Some(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl OutcomeSource for RandomSource {
    fn draw(&mut self) -> f64 {
        match self.rng.as_mut() {
            Some(rng) => rng.gen::<f64>(),
            None => rand::thread_rng().gen::<f64>(),
        }
    }
}

/// Always returns the same value
#[derive(Debug, Clone, Copy)]
pub struct FixedDraw(pub f64);

impl OutcomeSource for FixedDraw {
    fn draw(&mut self) -> f64 {
        self.0
    }
}

/// Outcome forced by configuration, bypassing the draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForcedOutcome {
    Success,
    Failure,
}

/// Whether the run will succeed, decided once before any step executes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    should_succeed: bool,
}

impl RunOutcome {
    /// Decide the outcome: `draw < probability` succeeds
    pub fn decide(
        success_probability: f64,
        forced: Option<ForcedOutcome>,
        source: &mut dyn OutcomeSource,
    ) -> Self {
        let should_succeed = match forced {
            Some(ForcedOutcome::Success) => true,
            Some(ForcedOutcome::Failure) => false,
            None => source.draw() < success_probability,
        };
        Self { should_succeed }
    }

    pub fn should_succeed(&self) -> bool {
        self.should_succeed
    }
}

/// The single result reported at the end of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum TerminalResult {
    Success,
    Failure {
        at_step_index: usize,
        title: String,
        reason: String,
        detail: String,
    },
}

impl TerminalResult {
    /// Failure result carrying the message for `at_step_index`
    pub fn failure_at(at_step_index: usize) -> Self {
        let message = failure_message(at_step_index);
        TerminalResult::Failure {
            at_step_index,
            title: message.title.to_string(),
            reason: message.reason.to_string(),
            detail: message.detail.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TerminalResult::Success)
    }
}

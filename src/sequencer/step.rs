//! Step entity and its per-run state machine

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::SequencerError;

/// State of a single step within a run.
///
/// Legal transitions:
/// - `Pending` -> `Processing`
/// - `Processing` -> `Completed`
/// - `Processing` -> `Failed`
/// - `Pending` -> `Failed` (steps after the failure point)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl StepState {
    /// Status badge text shown next to a step
    pub fn badge(&self) -> &'static str {
        match self {
            StepState::Pending => "Pending",
            StepState::Processing => "Processing",
            StepState::Completed => "Completed",
            StepState::Failed => "Failed",
        }
    }

    /// Whether the step has reached its final state for the run
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepState::Completed | StepState::Failed)
    }

    /// Check whether moving from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: StepState) -> bool {
        matches!(
            (self, next),
            (StepState::Pending, StepState::Processing)
                | (StepState::Processing, StepState::Completed)
                | (StepState::Processing, StepState::Failed)
                | (StepState::Pending, StepState::Failed)
        )
    }
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepState::Pending => "pending",
            StepState::Processing => "processing",
            StepState::Completed => "completed",
            StepState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One named stage of the simulated process
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub index: usize,
    pub label: String,
    pub state: StepState,
}

impl Step {
    pub fn new(index: usize, label: impl Into<String>) -> Self {
        Self {
            index,
            label: label.into(),
            state: StepState::Pending,
        }
    }

    /// Move the step to `next`, returning the previous state.
    pub fn transition(&mut self, next: StepState) -> Result<StepState, SequencerError> {
        if !self.state.can_transition_to(next) {
            return Err(SequencerError::InvalidTransition {
                index: self.index,
                from: self.state,
                to: next,
            });
        }
        let previous = self.state;
        self.state = next;
        Ok(previous)
    }
}

/// Build the ordered step collection from display labels
pub fn steps_from_labels<I, S>(labels: I) -> Vec<Step>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    labels
        .into_iter()
        .enumerate()
        .map(|(index, label)| Step::new(index, label))
        .collect()
}

/// Progress after step `index` of `total` has started, as a percentage
pub fn progress_percent(index: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (index as f64 + 1.0) / total as f64 * 100.0
}

//! Sequencer error types

use thiserror::Error;

use super::step::StepState;

/// Technical faults raised by the sequencer.
///
/// A simulated payment failure is not an error: it is reported as
/// [`super::TerminalResult::Failure`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequencerError {
    #[error("failed to initialize sequencer: {0}")]
    Initialization(String),

    #[error("run is already in progress")]
    AlreadyRunning,

    #[error("run has already completed")]
    AlreadyCompleted,

    #[error("run was cancelled")]
    Cancelled,

    #[error("step {index} cannot move from {from} to {to}")]
    InvalidTransition {
        index: usize,
        from: StepState,
        to: StepState,
    },
}

impl SequencerError {
    /// Create an initialization error
    pub fn initialization(message: impl Into<String>) -> Self {
        SequencerError::Initialization(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = SequencerError::initialization("no steps configured");
        assert_eq!(
            err.to_string(),
            "failed to initialize sequencer: no steps configured"
        );

        let err = SequencerError::InvalidTransition {
            index: 1,
            from: StepState::Completed,
            to: StepState::Processing,
        };
        assert_eq!(
            err.to_string(),
            "step 1 cannot move from completed to processing"
        );
    }
}

//! Simulated payment-processing step sequencer.
//!
//! A run walks an ordered list of steps through
//! `Pending -> Processing -> Completed | Failed`, pausing between
//! transitions, and ends with one terminal result. Whether the run succeeds
//! is decided once up front; a failing run fails at a configured step and
//! marks every later step failed.

mod clock;
mod engine;
mod error;
mod events;
mod messages;
mod outcome;
mod step;

pub use clock::{Clock, InstantClock, TokioClock};
pub use engine::{
    RunSummary, SequencerBuilder, SequencerSettings, StepSequencer, DEFAULT_FAILURE_STEP_INDEX,
    DEFAULT_RESULT_DELAY, DEFAULT_STEP_DURATION, DEFAULT_SUCCESS_PROBABILITY,
};
pub use error::SequencerError;
pub use events::{RenderSurface, SequencerEvent};
pub use messages::{
    failure_message, FailureMessage, UNEXPECTED_ERROR_REASON, UNEXPECTED_ERROR_TITLE,
};
pub use outcome::{FixedDraw, ForcedOutcome, OutcomeSource, RandomSource, RunOutcome, TerminalResult};
pub use step::{progress_percent, steps_from_labels, Step, StepState};

//! Payment sequencer - simulated multi-step payment processing
//!
//! Drives an ordered list of processing steps through a per-step state
//! machine, emits step, progress and result events to a rendering surface,
//! and reports one terminal success or failure per run.

pub mod config;
pub mod format;
pub mod logging;
pub mod render;
pub mod sequencer;

pub use sequencer::{
    RenderSurface, RunSummary, SequencerError, SequencerEvent, SequencerSettings, Step,
    StepSequencer, StepState, TerminalResult,
};

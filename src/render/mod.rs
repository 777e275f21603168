//! Rendering surfaces for sequencer events.
//!
//! - `TerminalSurface`: human-readable step lines, progress bar, result card
//! - `JsonLinesSurface`: one JSON object per event
//! - `RecordingSurface`: keeps events in memory

mod json;
mod recording;
mod terminal;

pub use json::JsonLinesSurface;
pub use recording::RecordingSurface;
pub use terminal::{glyph_for_state, progress_bar, render_event, TerminalSurface};

//! Human-readable rendering of a run to a terminal.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::sequencer::{RenderSurface, SequencerEvent, StepState, TerminalResult};

/// Width of the progress bar in cells
const PROGRESS_CELLS: usize = 20;

/// Glyph shown before a step line
pub fn glyph_for_state(state: StepState) -> &'static str {
    match state {
        StepState::Pending => "·",
        StepState::Processing => "…",
        StepState::Completed => "✓",
        StepState::Failed => "✗",
    }
}

/// Render a progress bar like `[#####---------------]  25%`
pub fn progress_bar(percent: u32) -> String {
    let percent = percent.min(100);
    let filled = percent as usize * PROGRESS_CELLS / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(PROGRESS_CELLS - filled),
        percent
    )
}

/// Text for one event, without trailing newline
pub fn render_event(event: &SequencerEvent) -> String {
    match event {
        SequencerEvent::StepStateChanged { label, to, .. } => {
            format!("  {} {:<32} {}", glyph_for_state(*to), label, to.badge())
        }
        SequencerEvent::ProgressChanged { percent, .. } => {
            format!("  {}", progress_bar(*percent))
        }
        SequencerEvent::RunFinished(TerminalResult::Success) => {
            "\nPayment Successful\nYour payment has been processed successfully.".to_string()
        }
        SequencerEvent::RunFinished(TerminalResult::Failure { title, detail, .. }) => {
            format!("\n{title}\n{detail}")
        }
        SequencerEvent::InitializationFailed { title, reason } => {
            format!("\n{title}\n{reason}")
        }
    }
}

/// Writes rendered events line by line
pub struct TerminalSurface<W: Write + Send> {
    out: Mutex<W>,
}

impl TerminalSurface<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<W: Write + Send> RenderSurface for TerminalSurface<W> {
    fn name(&self) -> &str {
        "terminal"
    }

    fn on_event(&self, event: &SequencerEvent) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        if let Err(e) = writeln!(out, "{}", render_event(event)).and_then(|()| out.flush()) {
            tracing::warn!(error = %e, "Failed to write to terminal");
        }
    }
}

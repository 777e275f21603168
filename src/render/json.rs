//! JSON Lines rendering: one serialized event per line.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::sequencer::{RenderSurface, SequencerEvent};

pub struct JsonLinesSurface<W: Write + Send> {
    out: Mutex<W>,
}

impl JsonLinesSurface<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonLinesSurface<W> {
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

impl<W: Write + Send> RenderSurface for JsonLinesSurface<W> {
    fn name(&self) -> &str {
        "json"
    }

    fn on_event(&self, event: &SequencerEvent) {
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(event = %event.event_type(), error = %e, "Failed to serialize event");
                return;
            }
        };
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
            tracing::warn!(error = %e, "Failed to write event");
        }
    }
}

//! In-memory surface that keeps every event it receives.

use std::sync::Mutex;

use crate::sequencer::{RenderSurface, SequencerEvent};

/// Records events for inspection by tests and embedding hosts
#[derive(Debug)]
pub struct RecordingSurface {
    events: Mutex<Vec<SequencerEvent>>,
    available: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            available: true,
        }
    }

    /// A surface that reports itself unavailable at initialization
    pub fn unavailable() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            available: false,
        }
    }

    /// All events received so far, in order
    pub fn events(&self) -> Vec<SequencerEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Rounded percentages of every progress event
    pub fn progress_values(&self) -> Vec<u32> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SequencerEvent::ProgressChanged { percent, .. } => Some(percent),
                _ => None,
            })
            .collect()
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for RecordingSurface {
    fn name(&self) -> &str {
        "recording"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn on_event(&self, event: &SequencerEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let surface = RecordingSurface::new();
        surface.on_event(&SequencerEvent::ProgressChanged {
            percent: 33,
            exact: 33.3,
        });
        surface.on_event(&SequencerEvent::ProgressChanged {
            percent: 67,
            exact: 66.7,
        });

        assert_eq!(surface.events().len(), 2);
        assert_eq!(surface.progress_values(), vec![33, 67]);
    }

    #[test]
    fn test_unavailable() {
        assert!(RecordingSurface::new().is_available());
        assert!(!RecordingSurface::unavailable().is_available());
    }
}

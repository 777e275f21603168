//! Events emitted by the sequencer and the rendering surface trait.

use serde::Serialize;

use super::outcome::TerminalResult;
use super::step::StepState;

/// Observable side effects of a run, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum SequencerEvent {
    /// A step moved from one state to another
    #[serde(rename = "step.state_changed")]
    StepStateChanged {
        index: usize,
        label: String,
        from: StepState,
        to: StepState,
    },

    /// Progress indicator update, emitted when a step starts processing
    #[serde(rename = "progress.changed")]
    ProgressChanged { percent: u32, exact: f64 },

    /// The run reached its single terminal result
    #[serde(rename = "run.finished")]
    RunFinished(TerminalResult),

    /// The sequencer could not start; rendered as a generic error view
    #[serde(rename = "run.initialization_failed")]
    InitializationFailed { title: String, reason: String },
}

impl SequencerEvent {
    /// Get the event type string (e.g., "step.state_changed")
    pub fn event_type(&self) -> &'static str {
        match self {
            SequencerEvent::StepStateChanged { .. } => "step.state_changed",
            SequencerEvent::ProgressChanged { .. } => "progress.changed",
            SequencerEvent::RunFinished(_) => "run.finished",
            SequencerEvent::InitializationFailed { .. } => "run.initialization_failed",
        }
    }

    /// Whether this event ends the event stream
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SequencerEvent::RunFinished(_) | SequencerEvent::InitializationFailed { .. }
        )
    }
}

/// Receiver of sequencer events.
///
/// Implementations own all presentation. The sequencer never inspects what
/// a surface does with an event.
pub trait RenderSurface: Send + Sync {
    /// Surface name (for logging)
    fn name(&self) -> &str;

    /// Whether the surface can render. Checked once at initialization.
    fn is_available(&self) -> bool {
        true
    }

    fn on_event(&self, event: &SequencerEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type() {
        let event = SequencerEvent::ProgressChanged {
            percent: 25,
            exact: 25.0,
        };
        assert_eq!(event.event_type(), "progress.changed");
        assert!(!event.is_terminal());
        assert!(SequencerEvent::RunFinished(TerminalResult::Success).is_terminal());
    }

    #[test]
    fn test_serialize_step_event() {
        let event = SequencerEvent::StepStateChanged {
            index: 0,
            label: "Validating payment details".into(),
            from: StepState::Pending,
            to: StepState::Processing,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "step.state_changed");
        assert_eq!(json["data"]["from"], "pending");
        assert_eq!(json["data"]["to"], "processing");
    }

    #[test]
    fn test_serialize_failure_result() {
        let event = SequencerEvent::RunFinished(TerminalResult::failure_at(1));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "run.finished");
        assert_eq!(json["data"]["result"], "failure");
        assert_eq!(json["data"]["at_step_index"], 1);
        assert_eq!(json["data"]["title"], "Security Check Failed");
    }
}

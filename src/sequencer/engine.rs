//! Step sequencer: drives the ordered steps of one simulated payment run.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::clock::{Clock, TokioClock};
use super::error::SequencerError;
use super::events::{RenderSurface, SequencerEvent};
use super::messages::{UNEXPECTED_ERROR_REASON, UNEXPECTED_ERROR_TITLE};
use super::outcome::{ForcedOutcome, OutcomeSource, RandomSource, RunOutcome, TerminalResult};
use super::step::{progress_percent, Step, StepState};

/// Default simulated work per step (2 seconds)
pub const DEFAULT_STEP_DURATION: Duration = Duration::from_millis(2000);

/// Default pause between the last step and the result (1 second)
pub const DEFAULT_RESULT_DELAY: Duration = Duration::from_millis(1000);

/// Default success rate of a simulated run
pub const DEFAULT_SUCCESS_PROBABILITY: f64 = 0.85;

/// Default step at which a failing run fails
pub const DEFAULT_FAILURE_STEP_INDEX: usize = 2;

/// Per-run parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SequencerSettings {
    pub step_duration: Duration,
    pub result_delay: Duration,
    pub success_probability: f64,
    pub failure_step_index: usize,
    /// Skip the draw and use this outcome
    pub forced_outcome: Option<ForcedOutcome>,
}

impl Default for SequencerSettings {
    fn default() -> Self {
        Self {
            step_duration: DEFAULT_STEP_DURATION,
            result_delay: DEFAULT_RESULT_DELAY,
            success_probability: DEFAULT_SUCCESS_PROBABILITY,
            failure_step_index: DEFAULT_FAILURE_STEP_INDEX,
            forced_outcome: None,
        }
    }
}

/// Final state of a completed run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub should_succeed: bool,
    pub result: TerminalResult,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// Collaborators for a sequencer, gathered before initialization
pub struct SequencerBuilder {
    surface: Arc<dyn RenderSurface>,
    clock: Arc<dyn Clock>,
    outcome_source: Box<dyn OutcomeSource>,
}

impl SequencerBuilder {
    /// Replace the real-timer clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the random outcome draw
    pub fn with_outcome_source(mut self, source: impl OutcomeSource + 'static) -> Self {
        self.outcome_source = Box::new(source);
        self
    }

    /// Validate inputs and create the sequencer.
    ///
    /// Fails without starting anything if the surface is unavailable, the
    /// step list is empty or malformed, or the probability is not in
    /// `[0, 1]`. When the surface is available the failure is also rendered
    /// as the generic error view.
    pub fn initialize(
        self,
        steps: Vec<Step>,
        settings: SequencerSettings,
    ) -> Result<StepSequencer, SequencerError> {
        if !self.surface.is_available() {
            let err = SequencerError::initialization(format!(
                "rendering surface '{}' is unavailable",
                self.surface.name()
            ));
            error!(surface = %self.surface.name(), error = %err, "Sequencer initialization failed");
            return Err(err);
        }

        if let Err(err) = validate(&steps, &settings) {
            error!(error = %err, "Sequencer initialization failed");
            self.surface.on_event(&SequencerEvent::InitializationFailed {
                title: UNEXPECTED_ERROR_TITLE.to_string(),
                reason: UNEXPECTED_ERROR_REASON.to_string(),
            });
            return Err(err);
        }

        let last_index = steps.len() - 1;
        let failure_point = if settings.failure_step_index > last_index {
            warn!(
                configured = settings.failure_step_index,
                clamped = last_index,
                "Failure step index is past the last step, clamping"
            );
            last_index
        } else {
            settings.failure_step_index
        };

        let (cancel_tx, _) = watch::channel(false);
        let sequencer = StepSequencer {
            run_id: Uuid::new_v4(),
            settings,
            failure_point,
            steps: Mutex::new(steps),
            phase: Mutex::new(Phase::Idle),
            surface: self.surface,
            clock: self.clock,
            outcome_source: Mutex::new(self.outcome_source),
            cancel_tx,
        };

        info!(
            run_id = %sequencer.run_id,
            steps = sequencer.step_count(),
            failure_point,
            "Sequencer initialized"
        );
        Ok(sequencer)
    }
}

fn validate(steps: &[Step], settings: &SequencerSettings) -> Result<(), SequencerError> {
    if steps.is_empty() {
        return Err(SequencerError::initialization("no steps to process"));
    }

    for (position, step) in steps.iter().enumerate() {
        if step.index != position {
            return Err(SequencerError::initialization(format!(
                "step '{}' has index {} at position {}",
                step.label, step.index, position
            )));
        }
        if step.state != StepState::Pending {
            return Err(SequencerError::initialization(format!(
                "step '{}' is {} instead of pending",
                step.label, step.state
            )));
        }
    }

    let p = settings.success_probability;
    if !(0.0..=1.0).contains(&p) {
        return Err(SequencerError::initialization(format!(
            "success probability {p} is outside [0, 1]"
        )));
    }

    Ok(())
}

/// Executes a fixed ordered list of steps with simulated latency and
/// reports exactly one terminal result.
///
/// One instance drives one run. After the run finishes or is cancelled,
/// further `run()` calls are rejected.
pub struct StepSequencer {
    run_id: Uuid,
    settings: SequencerSettings,
    failure_point: usize,
    steps: Mutex<Vec<Step>>,
    phase: Mutex<Phase>,
    surface: Arc<dyn RenderSurface>,
    clock: Arc<dyn Clock>,
    outcome_source: Mutex<Box<dyn OutcomeSource>>,
    cancel_tx: watch::Sender<bool>,
}

impl StepSequencer {
    /// Start building a sequencer that renders to `surface`.
    ///
    /// Defaults to real timers and a random draw.
    pub fn builder(surface: Arc<dyn RenderSurface>) -> SequencerBuilder {
        SequencerBuilder {
            surface,
            clock: Arc::new(TokioClock),
            outcome_source: Box::new(RandomSource::new()),
        }
    }

    /// Shorthand for `builder(surface).initialize(steps, settings)`
    pub fn initialize(
        surface: Arc<dyn RenderSurface>,
        steps: Vec<Step>,
        settings: SequencerSettings,
    ) -> Result<Self, SequencerError> {
        Self::builder(surface).initialize(steps, settings)
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn settings(&self) -> &SequencerSettings {
        &self.settings
    }

    /// Step index where a failing run fails, after clamping
    pub fn failure_point(&self) -> usize {
        self.failure_point
    }

    pub fn step_count(&self) -> usize {
        lock(&self.steps).len()
    }

    /// Snapshot of every step's current state
    pub fn steps(&self) -> Vec<Step> {
        lock(&self.steps).clone()
    }

    pub fn is_running(&self) -> bool {
        *lock(&self.phase) == Phase::Running
    }

    /// Whether the run has completed or been cancelled
    pub fn is_finished(&self) -> bool {
        matches!(*lock(&self.phase), Phase::Completed | Phase::Cancelled)
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    /// Execute the run to its terminal result.
    ///
    /// Calls made while a run is in progress, after it completed, or after
    /// cancellation are rejected with no side effects.
    #[instrument(skip(self), fields(run_id = %self.run_id))]
    pub async fn run(&self) -> Result<RunSummary, SequencerError> {
        self.begin()?;

        match self.execute().await {
            Ok(summary) => Ok(summary),
            Err(err) => {
                if err != SequencerError::Cancelled {
                    error!(error = %err, "Run aborted");
                }
                self.settle(Phase::Completed);
                Err(err)
            }
        }
    }

    /// Run on a background task
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<Result<RunSummary, SequencerError>> {
        let sequencer = Arc::clone(self);
        tokio::spawn(async move { sequencer.run().await })
    }

    /// Stop the run: the pending pause is abandoned and nothing further is
    /// emitted. No-op once the run has completed.
    pub fn cancel(&self) {
        {
            let mut phase = lock(&self.phase);
            match *phase {
                Phase::Completed | Phase::Cancelled => return,
                Phase::Idle | Phase::Running => *phase = Phase::Cancelled,
            }
        }
        self.cancel_tx.send_replace(true);
        info!(run_id = %self.run_id, "Run cancelled");
    }

    fn begin(&self) -> Result<(), SequencerError> {
        let mut phase = lock(&self.phase);
        match *phase {
            Phase::Idle => {
                *phase = Phase::Running;
                Ok(())
            }
            Phase::Running => Err(SequencerError::AlreadyRunning),
            Phase::Completed => Err(SequencerError::AlreadyCompleted),
            Phase::Cancelled => Err(SequencerError::Cancelled),
        }
    }

    /// Move out of `Running`, unless a cancel got there first
    fn settle(&self, to: Phase) -> bool {
        let mut phase = lock(&self.phase);
        if *phase == Phase::Running {
            *phase = to;
            true
        } else {
            false
        }
    }

    async fn execute(&self) -> Result<RunSummary, SequencerError> {
        let outcome = {
            let mut source = lock(&self.outcome_source);
            RunOutcome::decide(
                self.settings.success_probability,
                self.settings.forced_outcome,
                &mut **source,
            )
        };
        info!(should_succeed = outcome.should_succeed(), "Run outcome decided");

        let total = self.step_count();
        let mut failed_at = None;

        for index in 0..total {
            self.transition(index, StepState::Processing)?;
            self.emit_progress(index, total);

            self.pause(self.settings.step_duration).await?;

            if !outcome.should_succeed() && index == self.failure_point {
                self.transition(index, StepState::Failed)?;
                for later in (index + 1)..total {
                    self.transition(later, StepState::Failed)?;
                }
                failed_at = Some(index);
                break;
            }

            self.transition(index, StepState::Completed)?;
        }

        self.pause(self.settings.result_delay).await?;

        let result = if outcome.should_succeed() {
            TerminalResult::Success
        } else {
            TerminalResult::failure_at(failed_at.unwrap_or(self.failure_point))
        };

        if !self.settle(Phase::Completed) {
            return Err(SequencerError::Cancelled);
        }

        info!(success = result.is_success(), "Run finished");
        self.emit(SequencerEvent::RunFinished(result.clone()));

        Ok(RunSummary {
            run_id: self.run_id,
            should_succeed: outcome.should_succeed(),
            result,
            steps: self.steps(),
        })
    }

    fn transition(&self, index: usize, to: StepState) -> Result<(), SequencerError> {
        if self.is_cancelled() {
            return Err(SequencerError::Cancelled);
        }

        let (label, from) = {
            let mut steps = lock(&self.steps);
            let step = steps
                .get_mut(index)
                .ok_or_else(|| SequencerError::InvalidTransition {
                    index,
                    from: StepState::Pending,
                    to,
                })?;
            let from = step.transition(to)?;
            (step.label.clone(), from)
        };

        debug!(step = index, %from, %to, "Step transition");
        self.emit(SequencerEvent::StepStateChanged {
            index,
            label,
            from,
            to,
        });
        Ok(())
    }

    fn emit_progress(&self, index: usize, total: usize) {
        let exact = progress_percent(index, total);
        self.emit(SequencerEvent::ProgressChanged {
            percent: exact.round() as u32,
            exact,
        });
    }

    fn emit(&self, event: SequencerEvent) {
        if self.is_cancelled() {
            return;
        }
        self.surface.on_event(&event);
    }

    async fn pause(&self, duration: Duration) -> Result<(), SequencerError> {
        let cancel_rx = self.cancel_tx.subscribe();
        if self.is_cancelled() {
            return Err(SequencerError::Cancelled);
        }

        tokio::select! {
            () = self.clock.sleep(duration) => {}
            () = cancelled(cancel_rx) => return Err(SequencerError::Cancelled),
        }

        if self.is_cancelled() {
            return Err(SequencerError::Cancelled);
        }
        Ok(())
    }
}

/// Resolves once the cancel flag is raised
async fn cancelled(mut rx: watch::Receiver<bool>) {
    loop {
        let raised = *rx.borrow_and_update();
        if raised {
            return;
        }
        if rx.changed().await.is_err() {
            // Sender dropped with the sequencer: nothing can cancel anymore.
            std::future::pending::<()>().await;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

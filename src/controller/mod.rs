// SPDX-License-Identifier: GPL-3.0-only

//! Capture controller
//!
//! Two states, Idle and Running. Every transition sets the pipeline state and
//! swaps the enabled [`ControlSet`]; the set is derived from the state alone.
//!
//! | State   | Enabled controls                               |
//! |---------|------------------------------------------------|
//! | Idle    | BtnRecord, BtnTime, ComboFPS, BtnSettings      |
//! | Running | BtnStop                                        |

mod controls;

pub use controls::{Control, ControlSet};

use crate::errors::PipelineError;
use crate::pipelines::{PipelineFault, PipelineState};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Something whose state the controller can drive
pub trait PipelineControl {
    fn set_state(&self, state: PipelineState) -> Result<(), PipelineError>;
}

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    /// Pipeline playing; `recording` when started from BtnRecord
    Running { recording: bool },
}

impl ControllerState {
    pub fn is_running(&self) -> bool {
        matches!(self, ControllerState::Running { .. })
    }

    /// Controls enabled in this state
    pub fn controls(&self) -> ControlSet {
        match self {
            ControllerState::Idle => ControlSet::idle(),
            ControllerState::Running { .. } => ControlSet::running(),
        }
    }
}

/// Outcome of a control event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// Not valid in the current state, nothing changed
    Ignored,
}

/// What the event loop driving the controller should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Quit,
}

pub struct Controller<P: PipelineControl> {
    pipeline: P,
    state: ControllerState,
    controls: ControlSet,
    /// Start of the current run
    started_at: Option<Instant>,
    /// Run time of finished runs since the last reset
    accumulated: Duration,
    fps_selection: Option<usize>,
    last_error: Option<PipelineFault>,
    shut_down: bool,
}

impl<P: PipelineControl> Controller<P> {
    /// Take ownership of a pipeline in the NULL state
    pub fn new(pipeline: P) -> Self {
        let state = ControllerState::default();
        Self {
            pipeline,
            state,
            controls: state.controls(),
            started_at: None,
            accumulated: Duration::ZERO,
            fps_selection: None,
            last_error: None,
            shut_down: false,
        }
    }

    /// Start previewing (onPlay)
    pub fn on_play(&mut self) -> Result<Transition, PipelineError> {
        self.start(false)
    }

    /// Start capturing (onRecord)
    ///
    /// Same pipeline effect as [`Self::on_play`]; frames are written to disk
    /// either way.
    pub fn on_record(&mut self) -> Result<Transition, PipelineError> {
        self.start(true)
    }

    /// Stop capturing (onStop)
    ///
    /// The controller returns to Idle even when the pipeline refuses the
    /// NULL state; the error is still returned.
    pub fn on_stop(&mut self) -> Result<Transition, PipelineError> {
        if self.shut_down || !self.state.is_running() {
            debug!(state = ?self.state, "Ignoring stop");
            return Ok(Transition::Ignored);
        }

        info!("Stopping capture");
        let result = self.pipeline.set_state(PipelineState::Null);
        self.enter_idle();
        result.map(|_| Transition::Applied)
    }

    /// End-of-stream: stop for good and tell the driver to quit
    pub fn on_shutdown(&mut self) -> LoopControl {
        if self.shut_down {
            return LoopControl::Quit;
        }

        info!("End of stream, shutting down");
        if let Err(e) = self.pipeline.set_state(PipelineState::Null) {
            error!(error = %e, "Failed to stop pipeline on shutdown");
        }
        self.enter_idle();
        self.shut_down = true;
        LoopControl::Quit
    }

    /// A runtime error was reported on the bus
    pub fn on_pipeline_error(&mut self, fault: &PipelineFault) -> Transition {
        error!(%fault, debug = ?fault.debug, "Pipeline error");
        self.last_error = Some(fault.clone());

        if self.shut_down || !self.state.is_running() {
            return Transition::Ignored;
        }

        if let Err(e) = self.pipeline.set_state(PipelineState::Null) {
            error!(error = %e, "Failed to stop pipeline after error");
        }
        self.enter_idle();
        Transition::Applied
    }

    /// Frame rate selector changed (onFpsSelect)
    ///
    /// Only remembered; the capture rate is whatever the source negotiates.
    pub fn on_fps_select(&mut self, index: usize) -> Transition {
        if self.shut_down || !self.controls.is_enabled(Control::Fps) {
            return Transition::Ignored;
        }

        info!(index, "Frame rate selection changed");
        self.fps_selection = Some(index);
        Transition::Applied
    }

    /// Clear the run time shown on BtnTime (onTimeReset)
    pub fn on_time_reset(&mut self) -> Transition {
        if self.shut_down || !self.controls.is_enabled(Control::Time) {
            return Transition::Ignored;
        }

        debug!("Run time reset");
        self.accumulated = Duration::ZERO;
        Transition::Applied
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn controls(&self) -> ControlSet {
        self.controls
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn fps_selection(&self) -> Option<usize> {
        self.fps_selection
    }

    pub fn last_error(&self) -> Option<&PipelineFault> {
        self.last_error.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    /// Total run time since the last reset, including the current run
    pub fn elapsed(&self) -> Duration {
        self.accumulated + self.started_at.map(|t| t.elapsed()).unwrap_or_default()
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    fn start(&mut self, recording: bool) -> Result<Transition, PipelineError> {
        if self.shut_down || self.state.is_running() {
            debug!(state = ?self.state, recording, "Ignoring start");
            return Ok(Transition::Ignored);
        }

        info!(recording, "Starting capture");
        if let Err(e) = self.pipeline.set_state(PipelineState::Playing) {
            error!(error = %e, "Failed to start pipeline");
            if let Err(reset) = self.pipeline.set_state(PipelineState::Null) {
                warn!(error = %reset, "Failed to reset pipeline after start failure");
            }
            return Err(e);
        }

        self.state = ControllerState::Running { recording };
        self.controls = self.state.controls();
        self.started_at = Some(Instant::now());
        self.last_error = None;
        Ok(Transition::Applied)
    }

    fn enter_idle(&mut self) {
        if let Some(started) = self.started_at.take() {
            self.accumulated += started.elapsed();
        }
        self.state = ControllerState::Idle;
        self.controls = self.state.controls();
    }
}

impl<P: PipelineControl> Drop for Controller<P> {
    fn drop(&mut self) {
        if self.shut_down {
            return;
        }
        debug!("Controller dropped, releasing pipeline");
        if let Err(e) = self.pipeline.set_state(PipelineState::Null) {
            warn!(error = %e, "Failed to release pipeline");
        }
    }
}

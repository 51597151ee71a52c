//! Workflow state machine, advanced by the orchestrator and by stage banners
//! found in the streamed tool output.

use std::fmt;

use vivflow_runner::RunResult;
use vivflow_tcl::{RunStep, WorkflowKind, PROGRAMMED_LINE, PROGRAMMING_BANNER, SIMULATION_BANNER};

/// A stage executed inside the external tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Logic synthesis.
    Synthesis,
    /// Place and route.
    Implementation,
    /// Bitstream generation.
    Bitstream,
    /// Device programming.
    Programming,
    /// Behavioral simulation.
    Simulation,
}

impl From<RunStep> for Stage {
    fn from(step: RunStep) -> Self {
        match step {
            RunStep::Synthesis => Stage::Synthesis,
            RunStep::Implementation => Stage::Implementation,
            RunStep::Bitstream => Stage::Bitstream,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Synthesis => write!(f, "synthesis"),
            Stage::Implementation => write!(f, "implementation"),
            Stage::Bitstream => write!(f, "bitstream"),
            Stage::Programming => write!(f, "programming"),
            Stage::Simulation => write!(f, "simulation"),
        }
    }
}

/// Where a workflow currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkflowState {
    /// Nothing done yet.
    Start,
    /// Sources discovered and classified.
    Classified,
    /// Required inputs present and module names extracted.
    Validated,
    /// Control script written.
    ScriptBuilt,
    /// The tool is executing a stage.
    Running(Stage),
    /// The tool reported a stage as complete.
    Completed(Stage),
    /// The interactive device manager was launched.
    ProgrammingLaunched,
    /// Finished successfully.
    Done,
    /// Finished unsuccessfully; the stage is known when the tool got that far.
    Failed(Option<Stage>),
}

impl WorkflowState {
    /// Whether no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkflowState::Done | WorkflowState::Failed(_))
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::Start => write!(f, "start"),
            WorkflowState::Classified => write!(f, "classified"),
            WorkflowState::Validated => write!(f, "validated"),
            WorkflowState::ScriptBuilt => write!(f, "script-built"),
            WorkflowState::Running(stage) => write!(f, "{stage}-running"),
            WorkflowState::Completed(stage) => write!(f, "{stage}-done"),
            WorkflowState::ProgrammingLaunched => write!(f, "programming-launched"),
            WorkflowState::Done => write!(f, "done"),
            WorkflowState::Failed(Some(stage)) => write!(f, "{stage}-failed"),
            WorkflowState::Failed(None) => write!(f, "failed"),
        }
    }
}

/// Tracks one workflow's state.
#[derive(Debug)]
pub struct StageTracker {
    kind: WorkflowKind,
    state: WorkflowState,
}

impl StageTracker {
    /// A tracker in [`WorkflowState::Start`].
    pub fn new(kind: WorkflowKind) -> Self {
        Self {
            kind,
            state: WorkflowState::Start,
        }
    }

    /// The current state.
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Moves to `next`. Terminal states are never left.
    pub fn advance(&mut self, next: WorkflowState) {
        if self.state.is_terminal() {
            log::debug!("ignoring {next} after terminal state {}", self.state);
            return;
        }
        log::debug!("{} workflow: {} -> {next}", self.kind, self.state);
        self.state = next;
    }

    /// Interprets one line of tool output. Returns the stage that just started,
    /// if the line is a stage banner.
    pub fn observe(&mut self, line: &str) -> Option<Stage> {
        let line = line.trim();
        let started = stage_started_by(line);
        if let Some(stage) = started {
            self.advance(WorkflowState::Running(stage));
        } else if let Some(stage) = stage_completed_by(line) {
            self.advance(WorkflowState::Completed(stage));
        }
        started
    }

    /// Settles the state from the outcome of the batch run.
    pub fn finish(&mut self, result: &RunResult) -> WorkflowState {
        if result.succeeded {
            if let WorkflowState::Running(stage) = self.state {
                self.advance(WorkflowState::Completed(stage));
            }
            self.advance(WorkflowState::Done);
        } else {
            let stage = match self.state {
                WorkflowState::Running(stage) => Some(stage),
                _ => None,
            };
            self.advance(WorkflowState::Failed(stage));
        }
        self.state
    }

    /// Fails the workflow before the tool produced a result.
    pub fn fail(&mut self) {
        self.advance(WorkflowState::Failed(None));
    }

    /// The stage that failed, if the workflow failed while one was running.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self.state {
            WorkflowState::Failed(stage) => stage,
            _ => None,
        }
    }
}

fn stage_started_by(line: &str) -> Option<Stage> {
    if let Some(step) = RunStep::ALL.into_iter().find(|s| s.banner() == line) {
        return Some(step.into());
    }
    match line {
        PROGRAMMING_BANNER => Some(Stage::Programming),
        SIMULATION_BANNER => Some(Stage::Simulation),
        _ => None,
    }
}

fn stage_completed_by(line: &str) -> Option<Stage> {
    if let Some(step) = RunStep::ALL.into_iter().find(|s| s.success_line() == line) {
        return Some(step.into());
    }
    (line == PROGRAMMED_LINE).then_some(Stage::Programming)
}

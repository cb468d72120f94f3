use std::path::PathBuf;

use crate::{ActionError, ActionKind};

/// What a successful action produced.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskResult {
    /// Decoded JSON body.
    Json(serde_json::Value),
    /// Binary body saved by the downloader.
    Downloaded {
        filename: String,
        size_bytes: u64,
        location: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum TaskState {
    #[default]
    Idle,
    Running {
        kind: ActionKind,
    },
    Succeeded {
        kind: ActionKind,
        result: TaskResult,
    },
    Failed {
        kind: ActionKind,
        message: String,
    },
}

impl TaskState {
    pub fn is_idle(&self) -> bool {
        matches!(self, TaskState::Idle)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Succeeded { .. } | TaskState::Failed { .. })
    }

    pub fn kind(&self) -> Option<ActionKind> {
        match self {
            TaskState::Idle => None,
            TaskState::Running { kind }
            | TaskState::Succeeded { kind, .. }
            | TaskState::Failed { kind, .. } => Some(*kind),
        }
    }

    /// One-line status for the screen.
    pub fn describe(&self) -> String {
        match self {
            TaskState::Idle => "idle".to_string(),
            TaskState::Running { kind } => format!("{kind} running"),
            TaskState::Succeeded { kind, .. } => format!("{kind} succeeded"),
            TaskState::Failed { kind, message } => format!("{kind} failed: {message}"),
        }
    }
}

/// Single-flight state machine behind the orchestrator.
///
/// `Idle -> Running -> Succeeded | Failed -> Idle`; the last step happens
/// only through [`TaskTracker::acknowledge`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskTracker {
    state: TaskState,
}

impl TaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TaskState {
        &self.state
    }

    /// True iff nothing is running or waiting to be acknowledged, whatever `kind` is.
    pub fn can_start(&self, _kind: ActionKind) -> bool {
        self.state.is_idle()
    }

    pub fn begin(&mut self, kind: ActionKind) -> Result<(), ActionError> {
        if !self.can_start(kind) {
            return Err(ActionError::ConflictingAction {
                active: self.state.describe(),
            });
        }
        self.state = TaskState::Running { kind };
        Ok(())
    }

    /// Records the terminal state of the running `kind`.
    ///
    /// Returns false and leaves the state untouched if `kind` is not the
    /// action currently running.
    pub fn finish(&mut self, kind: ActionKind, outcome: &Result<TaskResult, ActionError>) -> bool {
        if self.state != (TaskState::Running { kind }) {
            return false;
        }
        self.state = match outcome {
            Ok(result) => TaskState::Succeeded {
                kind,
                result: result.clone(),
            },
            Err(err) => TaskState::Failed {
                kind,
                message: err.user_message(kind),
            },
        };
        true
    }

    /// Fails the running `kind` when its action was abandoned before finishing.
    ///
    /// Returns false if `kind` is not the action currently running.
    pub fn interrupt(&mut self, kind: ActionKind) -> bool {
        if self.state != (TaskState::Running { kind }) {
            return false;
        }
        self.state = TaskState::Failed {
            kind,
            message: format!("{kind} was interrupted."),
        };
        true
    }

    /// Returns a terminal state to `Idle`. No effect while idle or running.
    pub fn acknowledge(&mut self) -> bool {
        if self.state.is_terminal() {
            self.state = TaskState::Idle;
            true
        } else {
            false
        }
    }
}

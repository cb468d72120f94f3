//! CV match core: file intake, action planning and task state. No IO.
mod action;
mod config;
mod entry;
mod error;
mod intake;
mod request;
mod task;
mod view_model;

pub use action::{ActionKind, ActionRequest, JobDraft};
pub use config::{CapacityPolicy, IntakeLimits, ScreenProfile, MIB};
pub use entry::{size_label, FileCandidate, FileEntry, FileHandle};
pub use error::{ActionError, IntakeError, RemoteError};
pub use intake::{FileIntake, RejectReason, Rejection, ValidationOutcome};
pub use request::{FilePart, HttpMethod, OutboundRequest, ResponseShape};
pub use task::{TaskResult, TaskState, TaskTracker};
pub use view_model::{ActionButton, EntryRow, ScreenViewModel};

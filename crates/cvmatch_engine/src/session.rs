use std::io;
use std::path::Path;

use cvmatch_core::{
    ActionError, ActionKind, ActionRequest, FileCandidate, FileEntry, FileHandle, FileIntake,
    IntakeError, ScreenProfile, ScreenViewModel, TaskResult, TaskState, ValidationOutcome,
};
use cvmatch_logging::{cvm_debug, cvm_info, cvm_warn, set_screen};

use crate::orchestrator::TaskOrchestrator;

/// Builds a candidate for a file on disk; content is read only when sent.
pub fn candidate_from_path(path: &Path) -> io::Result<FileCandidate> {
    let meta = std::fs::metadata(path)?;
    if !meta.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a regular file", path.display()),
        ));
    }
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(FileCandidate::new(
        name,
        meta.len(),
        FileHandle::Path(path.to_path_buf()),
    ))
}

/// One mounted screen: its selection plus its orchestrator.
///
/// Created on screen entry and dropped on exit; nothing outlives it.
/// Log lines carry the screen id even when `submit` resumes on another
/// thread. Dropping the session restores the thread label it replaced.
pub struct ScreenSession {
    profile: ScreenProfile,
    intake: FileIntake,
    orchestrator: TaskOrchestrator,
    outer_screen: Option<&'static str>,
}

impl ScreenSession {
    pub fn enter(profile: ScreenProfile, orchestrator: TaskOrchestrator) -> Self {
        let outer_screen = set_screen(Some(profile.id));
        cvm_info!(screen = profile.id; "entered screen {}", profile.title);
        let intake = FileIntake::new(profile.limits.clone());
        let orchestrator = orchestrator.with_screen(profile.id);
        Self {
            profile,
            intake,
            orchestrator,
            outer_screen,
        }
    }

    pub fn profile(&self) -> &ScreenProfile {
        &self.profile
    }

    pub fn selection(&self) -> &[FileEntry] {
        self.intake.entries()
    }

    pub fn add_candidates(&mut self, candidates: Vec<FileCandidate>) -> ValidationOutcome {
        let offered = candidates.len();
        let outcome = self.intake.add_candidates(candidates);
        cvm_info!(
            screen = self.profile.id;
            "intake: {} offered, {} accepted, selection now {}",
            offered,
            outcome.accepted.len(),
            self.intake.len()
        );
        for message in outcome.messages() {
            cvm_warn!(screen = self.profile.id; "intake rejected {}", message);
        }
        outcome
    }

    pub fn remove_entry(&mut self, index: usize) -> Result<FileEntry, IntakeError> {
        let removed = self.intake.remove_entry(index)?;
        cvm_debug!(screen = self.profile.id; "removed {} from selection", removed.name());
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.intake.clear();
        cvm_debug!(screen = self.profile.id; "selection cleared");
    }

    pub fn can_start(&self, kind: ActionKind) -> bool {
        self.orchestrator.can_start(kind)
    }

    /// Runs `request` on the current selection if this screen offers it.
    pub async fn submit(&self, request: ActionRequest) -> Result<TaskResult, ActionError> {
        let kind = request.kind();
        if !self.profile.offers(kind) {
            let err = ActionError::ValidationFailed(format!(
                "{} is not available on the {} screen.",
                kind, self.profile.title
            ));
            cvm_warn!(screen = self.profile.id; "{}", err);
            return Err(err);
        }
        let snapshot = self.intake.snapshot();
        self.orchestrator.start(request, &snapshot).await
    }

    pub fn state(&self) -> TaskState {
        self.orchestrator.state()
    }

    pub fn acknowledge(&self) -> bool {
        self.orchestrator.acknowledge()
    }

    pub fn view(&self) -> ScreenViewModel {
        ScreenViewModel::build(&self.profile, &self.intake, &self.orchestrator.state())
    }
}

impl Drop for ScreenSession {
    fn drop(&mut self) {
        cvm_info!(screen = self.profile.id; "left screen {}", self.profile.title);
        set_screen(self.outer_screen);
    }
}

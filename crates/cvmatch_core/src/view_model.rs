use crate::entry::size_label;
use crate::{ActionKind, FileIntake, ScreenProfile, TaskState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRow {
    pub index: usize,
    pub name: String,
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub kind: ActionKind,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenViewModel {
    pub title: String,
    pub entries: Vec<EntryRow>,
    /// `Selected Files (n/max)`.
    pub counter: String,
    pub status: String,
    pub busy: bool,
    pub actions: Vec<ActionButton>,
}

impl ScreenViewModel {
    pub fn build(profile: &ScreenProfile, intake: &FileIntake, state: &TaskState) -> Self {
        let entries = intake
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| EntryRow {
                index,
                name: entry.name().to_string(),
                size: size_label(entry.size_bytes()),
            })
            .collect();

        let has_files = !intake.is_empty();
        let actions = profile
            .actions
            .iter()
            .map(|&kind| ActionButton {
                kind,
                enabled: state.is_idle() && (has_files || !kind.requires_files()),
            })
            .collect();

        Self {
            title: profile.title.to_string(),
            entries,
            counter: format!(
                "Selected Files ({}/{})",
                intake.len(),
                intake.limits().max_entries
            ),
            status: state.describe(),
            busy: matches!(state, TaskState::Running { .. }),
            actions,
        }
    }

    pub fn is_enabled(&self, kind: ActionKind) -> bool {
        self.actions
            .iter()
            .any(|button| button.kind == kind && button.enabled)
    }
}

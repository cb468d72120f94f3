use crate::ActionKind;

pub const MIB: u64 = 1024 * 1024;

/// What happens when a batch would push the selection past `max_entries`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapacityPolicy {
    /// Reject the whole batch with a single capacity reason.
    #[default]
    RejectBatch,
    /// Accept valid candidates until the selection is full; report the rest.
    Truncate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeLimits {
    accepted_extensions: Vec<String>,
    pub max_entry_bytes: u64,
    pub max_entries: usize,
    pub capacity_policy: CapacityPolicy,
}

impl IntakeLimits {
    pub fn new<I, S>(accepted_extensions: I, max_entry_bytes: u64, max_entries: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut extensions: Vec<String> = Vec::new();
        for ext in accepted_extensions {
            let normalized = normalize_extension(ext.as_ref());
            if !normalized.is_empty() && !extensions.contains(&normalized) {
                extensions.push(normalized);
            }
        }
        Self {
            accepted_extensions: extensions,
            max_entry_bytes,
            max_entries,
            capacity_policy: CapacityPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CapacityPolicy) -> Self {
        self.capacity_policy = policy;
        self
    }

    /// Normalized (lower-case, no leading dot) extensions in configuration order.
    pub fn accepted_extensions(&self) -> &[String] {
        &self.accepted_extensions
    }

    pub fn accepts_extension(&self, extension: &str) -> bool {
        let normalized = normalize_extension(extension);
        self.accepted_extensions.iter().any(|ext| *ext == normalized)
    }

    /// `.pdf, .docx, .txt` as shown to users.
    pub fn accepted_list(&self) -> String {
        self.accepted_extensions
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub(crate) fn normalize_extension(raw: &str) -> String {
    raw.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// Per-screen parameters: intake limits plus the actions the screen offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenProfile {
    pub id: &'static str,
    pub title: &'static str,
    pub limits: IntakeLimits,
    pub actions: Vec<ActionKind>,
}

impl ScreenProfile {
    pub fn cv_parser() -> Self {
        Self {
            id: "cv-parser",
            title: "CV Parser",
            limits: IntakeLimits::new(["pdf", "docx", "txt"], 10 * MIB, 20),
            actions: vec![ActionKind::ParseJson, ActionKind::ParseExcel],
        }
    }

    pub fn matching() -> Self {
        Self {
            id: "matching",
            title: "Match Resumes",
            limits: IntakeLimits::new(["pdf", "docx", "txt"], 10 * MIB, 50),
            actions: vec![
                ActionKind::Match,
                ActionKind::BatchMatch,
                ActionKind::ExportMatches,
                ActionKind::ListJobs,
            ],
        }
    }

    pub fn job_manager() -> Self {
        Self {
            id: "job-manager",
            title: "Jobs Manager",
            limits: IntakeLimits::new(["pdf", "docx", "txt"], 5 * MIB, 1),
            actions: vec![ActionKind::CreateJob, ActionKind::ListJobs, ActionKind::GetJob],
        }
    }

    /// The single-page uploader: PDF/DOCX only, surplus files are dropped.
    pub fn basic_uploader() -> Self {
        Self {
            id: "basic-uploader",
            title: "Upload Resumes",
            limits: IntakeLimits::new([".pdf", ".docx"], 10 * MIB, 10)
                .with_policy(CapacityPolicy::Truncate),
            actions: vec![ActionKind::ParseJson, ActionKind::ParseExcel],
        }
    }

    pub fn offers(&self, kind: ActionKind) -> bool {
        self.actions.contains(&kind)
    }
}

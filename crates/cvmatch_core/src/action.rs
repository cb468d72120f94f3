use std::fmt;

use crate::{ActionError, FileEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    ParseJson,
    ParseExcel,
    CreateJob,
    ListJobs,
    GetJob,
    Match,
    BatchMatch,
    ExportMatches,
}

impl ActionKind {
    pub fn label(self) -> &'static str {
        match self {
            ActionKind::ParseJson => "parse",
            ActionKind::ParseExcel => "parse-excel",
            ActionKind::CreateJob => "create-job",
            ActionKind::ListJobs => "list-jobs",
            ActionKind::GetJob => "get-job",
            ActionKind::Match => "match",
            ActionKind::BatchMatch => "batch-match",
            ActionKind::ExportMatches => "export-matches",
        }
    }

    /// Whether the action is meaningless without at least one selected file.
    pub fn requires_files(self) -> bool {
        matches!(
            self,
            ActionKind::ParseJson
                | ActionKind::ParseExcel
                | ActionKind::Match
                | ActionKind::BatchMatch
                | ActionKind::ExportMatches
        )
    }

    /// Binary kinds hand their payload to a downloader instead of decoding it.
    pub fn produces_download(self) -> bool {
        matches!(self, ActionKind::ParseExcel | ActionKind::ExportMatches)
    }

    /// Message used when the service gives no `detail`.
    pub fn fallback_error(self) -> &'static str {
        match self {
            ActionKind::ParseJson => "An error occurred while uploading the CVs.",
            ActionKind::ParseExcel => "An error occurred while generating the Excel file.",
            ActionKind::CreateJob => "Failed to create job description.",
            ActionKind::ListJobs => "Could not load job descriptions.",
            ActionKind::GetJob => "Could not load the job description.",
            ActionKind::Match | ActionKind::BatchMatch => "An error occurred while matching the CVs.",
            ActionKind::ExportMatches => "An error occurred while exporting the results.",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Form fields for a new job description. Empty strings count as absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobDraft {
    pub title: String,
    pub company: Option<String>,
    pub description: Option<String>,
    pub required_skills: Option<String>,
    pub preferred_skills: Option<String>,
    pub education_requirements: Option<String>,
    pub experience_requirements: Option<String>,
}

impl JobDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn has_description(&self) -> bool {
        present(&self.description).is_some()
    }
}

pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// One action invocation together with its non-file parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    ParseJson,
    ParseExcel,
    CreateJob(JobDraft),
    ListJobs,
    GetJob { job_id: String },
    Match { job_id: String },
    BatchMatch { job_ids: Vec<String> },
    ExportMatches { job_id: String },
}

impl ActionRequest {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionRequest::ParseJson => ActionKind::ParseJson,
            ActionRequest::ParseExcel => ActionKind::ParseExcel,
            ActionRequest::CreateJob(_) => ActionKind::CreateJob,
            ActionRequest::ListJobs => ActionKind::ListJobs,
            ActionRequest::GetJob { .. } => ActionKind::GetJob,
            ActionRequest::Match { .. } => ActionKind::Match,
            ActionRequest::BatchMatch { .. } => ActionKind::BatchMatch,
            ActionRequest::ExportMatches { .. } => ActionKind::ExportMatches,
        }
    }

    /// Checks the preconditions that must hold before any request is sent.
    pub fn validate(&self, selection: &[FileEntry]) -> Result<(), ActionError> {
        match self {
            ActionRequest::Match { job_id } | ActionRequest::ExportMatches { job_id } => {
                require(!job_id.trim().is_empty(), NO_JOB_SELECTED)?;
                require(!selection.is_empty(), "Please select at least one CV to match.")
            }
            ActionRequest::BatchMatch { job_ids } => {
                require(
                    job_ids.iter().any(|id| !id.trim().is_empty()),
                    NO_JOB_SELECTED,
                )?;
                require(!selection.is_empty(), "Please select at least one CV to match.")
            }
            ActionRequest::ParseJson | ActionRequest::ParseExcel => require(
                !selection.is_empty(),
                "Please select at least one resume file.",
            ),
            ActionRequest::CreateJob(draft) => {
                require(!draft.title.trim().is_empty(), "Please enter a job title.")?;
                require(
                    draft.has_description() || !selection.is_empty(),
                    "Please either enter a job description or upload a file.",
                )?;
                require(
                    selection.len() <= 1,
                    "Job creation accepts a single description file.",
                )
            }
            ActionRequest::GetJob { job_id } => {
                require(!job_id.trim().is_empty(), "Please select a job description.")
            }
            ActionRequest::ListJobs => Ok(()),
        }
    }
}

const NO_JOB_SELECTED: &str = "Please select a job description to match against.";

fn require(condition: bool, message: &str) -> Result<(), ActionError> {
    if condition {
        Ok(())
    } else {
        Err(ActionError::ValidationFailed(message.to_string()))
    }
}

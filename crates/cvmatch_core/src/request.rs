use crate::action::present;
use crate::{ActionKind, ActionRequest, FileEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// How a successful response body is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Json,
    Spreadsheet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: &'static str,
    pub entry: FileEntry,
}

/// The single outbound call an action maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub kind: ActionKind,
    pub method: HttpMethod,
    /// Path segments below the service base url, unescaped.
    pub path: Vec<String>,
    /// Text form fields in the order they are sent.
    pub fields: Vec<(&'static str, String)>,
    pub files: Vec<FilePart>,
    pub response: ResponseShape,
}

impl OutboundRequest {
    pub fn plan(request: &ActionRequest, selection: &[FileEntry]) -> Self {
        let kind = request.kind();
        let files = |field: &'static str| -> Vec<FilePart> {
            selection
                .iter()
                .map(|entry| FilePart {
                    field,
                    entry: entry.clone(),
                })
                .collect()
        };

        let (method, path, fields, parts) = match request {
            ActionRequest::ParseJson => (
                HttpMethod::Post,
                vec!["upload".to_string()],
                vec![("format", "json".to_string())],
                files("files"),
            ),
            ActionRequest::ParseExcel => (
                HttpMethod::Post,
                vec!["upload".to_string()],
                vec![("format", "excel".to_string())],
                files("files"),
            ),
            ActionRequest::CreateJob(draft) => {
                let mut fields = vec![("title", draft.title.trim().to_string())];
                let optional = [
                    ("company", &draft.company),
                    ("description", &draft.description),
                    ("required_skills", &draft.required_skills),
                    ("preferred_skills", &draft.preferred_skills),
                    ("education_requirements", &draft.education_requirements),
                    ("experience_requirements", &draft.experience_requirements),
                ];
                for (name, value) in optional {
                    if let Some(value) = present(value) {
                        fields.push((name, value.to_string()));
                    }
                }
                let mut parts = files("file");
                parts.truncate(1);
                (HttpMethod::Post, vec!["job".to_string()], fields, parts)
            }
            ActionRequest::ListJobs => (
                HttpMethod::Get,
                vec!["jobs".to_string()],
                Vec::new(),
                Vec::new(),
            ),
            ActionRequest::GetJob { job_id } => (
                HttpMethod::Get,
                vec!["job".to_string(), job_id.trim().to_string()],
                Vec::new(),
                Vec::new(),
            ),
            ActionRequest::Match { job_id } => (
                HttpMethod::Post,
                vec!["match".to_string()],
                vec![("job_id", job_id.trim().to_string())],
                files("files"),
            ),
            ActionRequest::BatchMatch { job_ids } => {
                let joined = job_ids
                    .iter()
                    .map(|id| id.trim())
                    .filter(|id| !id.is_empty())
                    .collect::<Vec<_>>()
                    .join(",");
                (
                    HttpMethod::Post,
                    vec!["batch-match".to_string()],
                    vec![("job_ids", joined)],
                    files("files"),
                )
            }
            ActionRequest::ExportMatches { job_id } => (
                HttpMethod::Post,
                vec!["export-matches".to_string(), job_id.trim().to_string()],
                Vec::new(),
                files("files"),
            ),
        };

        let response = if kind.produces_download() {
            ResponseShape::Spreadsheet
        } else {
            ResponseShape::Json
        };

        Self {
            kind,
            method,
            path,
            fields,
            files: parts,
            response,
        }
    }

    /// `POST /export-matches/42`, for logs.
    pub fn describe(&self) -> String {
        let method = match self.method {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        };
        format!("{method} /{}", self.path.join("/"))
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value.as_str())
    }
}

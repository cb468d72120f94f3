//! Turns a terminal task state into printable lines.

use cvmatch_core::{size_label, ActionKind, TaskResult, TaskState};
use cvmatch_engine::{decode_result, BatchMatches, JobDescription, MatchScore, ParsedResume};
use serde::de::DeserializeOwned;

pub fn render(state: &TaskState) -> Vec<String> {
    match state {
        TaskState::Idle => vec!["Nothing ran.".to_string()],
        TaskState::Running { kind } => vec![format!("{kind} still running.")],
        TaskState::Failed { kind, message } => vec![format!("{kind} failed: {message}")],
        TaskState::Succeeded { kind, result } => render_result(*kind, result),
    }
}

fn render_result(kind: ActionKind, result: &TaskResult) -> Vec<String> {
    if let TaskResult::Downloaded {
        filename,
        size_bytes,
        location,
    } = result
    {
        return vec![format!(
            "Saved {filename} ({}) to {}",
            size_label(*size_bytes),
            location.display()
        )];
    }

    let lines = match kind {
        ActionKind::ParseJson => typed(result, |resumes: Vec<ParsedResume>| {
            resumes.iter().map(resume_line).collect()
        }),
        ActionKind::CreateJob => typed(result, |job: JobDescription| {
            vec![format!("Created {}", job_line(&job))]
        }),
        ActionKind::GetJob => typed(result, |job: JobDescription| job_detail(&job)),
        ActionKind::ListJobs => typed(result, |jobs: Vec<JobDescription>| {
            if jobs.is_empty() {
                vec!["No job descriptions yet.".to_string()]
            } else {
                jobs.iter().map(job_line).collect()
            }
        }),
        ActionKind::Match => typed(result, |scores: Vec<MatchScore>| ranking(scores)),
        ActionKind::BatchMatch => typed(result, |batches: BatchMatches| {
            batches
                .into_iter()
                .flat_map(|(job_id, scores)| {
                    std::iter::once(format!("Job {job_id}:"))
                        .chain(ranking(scores).into_iter().map(|line| format!("  {line}")))
                })
                .collect()
        }),
        ActionKind::ParseExcel | ActionKind::ExportMatches => None,
    };

    lines.unwrap_or_else(|| raw_json(result))
}

fn typed<T, F>(result: &TaskResult, render: F) -> Option<Vec<String>>
where
    T: DeserializeOwned,
    F: FnOnce(T) -> Vec<String>,
{
    decode_result::<T>(result)?.ok().map(render)
}

fn raw_json(result: &TaskResult) -> Vec<String> {
    match result {
        TaskResult::Json(value) => serde_json::to_string_pretty(value)
            .unwrap_or_else(|_| value.to_string())
            .lines()
            .map(ToOwned::to_owned)
            .collect(),
        TaskResult::Downloaded { filename, .. } => vec![format!("Saved {filename}")],
    }
}

fn resume_line(resume: &ParsedResume) -> String {
    let name = resume.name.as_deref().unwrap_or("(no name)");
    let email = resume.email.as_deref().unwrap_or("-");
    format!(
        "{}: {name} <{email}>, {} skills",
        resume.file_name,
        resume.skills.len()
    )
}

fn job_line(job: &JobDescription) -> String {
    match &job.company {
        Some(company) => format!("{}  {} ({company})", job.id, job.title),
        None => format!("{}  {}", job.id, job.title),
    }
}

fn job_detail(job: &JobDescription) -> Vec<String> {
    let mut lines = vec![job_line(job)];
    if !job.required_skills.is_empty() {
        lines.push(format!("Required: {}", job.required_skills.join(", ")));
    }
    if !job.preferred_skills.is_empty() {
        lines.push(format!("Preferred: {}", job.preferred_skills.join(", ")));
    }
    if !job.description.is_empty() {
        lines.push(job.description.clone());
    }
    lines
}

fn ranking(mut scores: Vec<MatchScore>) -> Vec<String> {
    scores.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));
    scores
        .iter()
        .map(|score| {
            let name = if score.resume_name.is_empty() {
                &score.resume_id
            } else {
                &score.resume_name
            };
            format!("{:>5.1}%  {name}", score.overall_score)
        })
        .collect()
}

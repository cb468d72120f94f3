use chrono::NaiveDate;
use cvmatch_core::ActionRequest;

/// Download name for binary actions, `None` for actions that return JSON.
///
/// `parsed_cvs_YYYY-MM-DD.xlsx` and `job_matches_{job}_YYYY-MM-DD.xlsx`.
pub fn download_filename(request: &ActionRequest, date: NaiveDate) -> Option<String> {
    let date = date.format("%Y-%m-%d");
    match request {
        ActionRequest::ParseExcel => Some(format!("parsed_cvs_{date}.xlsx")),
        ActionRequest::ExportMatches { job_id } => Some(format!(
            "job_matches_{}_{date}.xlsx",
            sanitize_component(job_id)
        )),
        _ => None,
    }
}

/// Makes a job id safe to embed in a filename on any platform.
fn sanitize_component(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]);
    if cleaned.is_empty() {
        return "job".to_string();
    }

    // Collapse runs of underscores.
    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }
    if compacted.chars().count() > 64 {
        compacted = compacted.chars().take(64).collect();
    }
    compacted
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ' ' | '\0'..='\u{1F}'
    )
}

//! Runs one command as a single visit to its screen.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use cvmatch_core::{FileCandidate, TaskState};
use cvmatch_engine::{
    candidate_from_path, DirectoryDownloader, ReqwestTransport, ScreenSession, TaskOrchestrator,
};
use cvmatch_logging::{cvm_info, cvm_warn};

use crate::cli::Command;
use crate::config::AppConfig;
use crate::report;

/// Returns `Ok(true)` when the action succeeded.
pub async fn run(command: Command, config: &AppConfig) -> anyhow::Result<bool> {
    let transport = ReqwestTransport::new(config.transport_settings())
        .context("could not set up the HTTP client")?;
    let downloader = DirectoryDownloader::new(config.download_dir.clone());
    let orchestrator = TaskOrchestrator::new(Arc::new(transport), Arc::new(downloader));
    let mut session = ScreenSession::enter(command.profile(), orchestrator);

    let (candidates, unreadable) = load_candidates(&command.files());
    let mut problems = unreadable;
    let outcome = session.add_candidates(candidates);
    problems.extend(outcome.messages());
    for problem in &problems {
        eprintln!("{problem}");
    }

    let view = session.view();
    cvm_info!("{}: {}", view.title, view.counter);
    for row in &view.entries {
        println!("{:>3}. {} ({})", row.index + 1, row.name, row.size);
    }

    let request = command.request();
    let kind = request.kind();
    if let Err(err) = session.submit(request).await {
        // Refusals never reach the tracker, so there is no terminal state to show.
        if session.state() == TaskState::Idle {
            eprintln!("{}", err.user_message(kind));
            return Ok(false);
        }
    }

    let state = session.state();
    for line in report::render(&state) {
        println!("{line}");
    }
    let succeeded = matches!(state, TaskState::Succeeded { .. });
    session.acknowledge();
    Ok(succeeded)
}

fn load_candidates(paths: &[PathBuf]) -> (Vec<FileCandidate>, Vec<String>) {
    let mut candidates = Vec::with_capacity(paths.len());
    let mut problems = Vec::new();
    for path in paths {
        match candidate_from_path(path) {
            Ok(candidate) => candidates.push(candidate),
            Err(err) => {
                cvm_warn!("Skipping {:?}: {}", path, err);
                problems.push(format!("{}: could not read file ({err})", display_name(path)));
            }
        }
    }
    (candidates, problems)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use bytes::Bytes;
use chrono::NaiveDate;
use cvmatch_core::{
    ActionError, ActionKind, ActionRequest, FileCandidate, FileEntry, FileIntake, IntakeLimits,
    OutboundRequest, RemoteError, TaskResult, TaskState, MIB,
};
use cvmatch_engine::{
    decode_result, DirectoryDownloader, DownloadError, Downloader, MatchScore, ReqwestTransport,
    TaskOrchestrator, Transport, TransportSettings,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::Notify;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ALL_KINDS: [ActionKind; 8] = [
    ActionKind::ParseJson,
    ActionKind::ParseExcel,
    ActionKind::CreateJob,
    ActionKind::ListJobs,
    ActionKind::GetJob,
    ActionKind::Match,
    ActionKind::BatchMatch,
    ActionKind::ExportMatches,
];

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(cvmatch_logging::initialize_for_tests);
}

fn selection(names: &[&str]) -> Vec<FileEntry> {
    let mut intake = FileIntake::new(IntakeLimits::new(["pdf", "docx", "txt"], 10 * MIB, 10));
    let candidates = names
        .iter()
        .map(|name| FileCandidate::from_bytes(*name, b"content".to_vec()))
        .collect();
    assert!(intake.add_candidates(candidates).is_clean());
    intake.snapshot()
}

fn match_request() -> ActionRequest {
    ActionRequest::Match {
        job_id: "42".to_string(),
    }
}

/// Counts calls and answers with a fixed result, optionally waiting for a gate.
struct ScriptedTransport {
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
    reply: Result<Bytes, RemoteError>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn replying(reply: Result<Bytes, RemoteError>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            gate: None,
            reply,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn gated(gate: Arc<Notify>, body: &'static str) -> Self {
        Self {
            gate: Some(gate),
            ..Self::replying(Ok(Bytes::from_static(body.as_bytes())))
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<Bytes, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request.describe());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.reply.clone()
    }
}

#[derive(Default)]
struct MemoryDownloader {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl Downloader for MemoryDownloader {
    fn deliver(&self, filename: &str, payload: &[u8]) -> Result<PathBuf, DownloadError> {
        self.saved
            .lock()
            .unwrap()
            .push((filename.to_string(), payload.to_vec()));
        Ok(PathBuf::from(filename))
    }
}

fn orchestrator(transport: Arc<dyn Transport>) -> TaskOrchestrator {
    TaskOrchestrator::new(transport, Arc::new(MemoryDownloader::default()))
}

fn fixed_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
}

#[tokio::test]
async fn match_against_service_succeeds() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/match"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "resume_id": "r1", "resume_name": "r1.pdf", "overall_score": 87 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(TransportSettings {
        base_url: server.uri(),
        ..TransportSettings::default()
    })
    .unwrap();
    let orchestrator = orchestrator(Arc::new(transport));
    assert_eq!(orchestrator.state(), TaskState::Idle);

    let result = orchestrator
        .start(match_request(), &selection(&["r1.pdf"]))
        .await
        .expect("match ok");

    let scores: Vec<MatchScore> = decode_result(&result).unwrap().unwrap();
    assert_eq!(scores[0].resume_id, "r1");
    assert_eq!(scores[0].overall_score, 87.0);
    assert_eq!(
        orchestrator.state(),
        TaskState::Succeeded {
            kind: ActionKind::Match,
            result,
        }
    );

    assert!(orchestrator.acknowledge());
    assert_eq!(orchestrator.state(), TaskState::Idle);
}

#[tokio::test]
async fn service_error_detail_becomes_failure_message() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/match"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "detail": "job not found" })))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(TransportSettings {
        base_url: server.uri(),
        ..TransportSettings::default()
    })
    .unwrap();
    let orchestrator = orchestrator(Arc::new(transport));

    let err = orchestrator
        .start(match_request(), &selection(&["r1.pdf"]))
        .await
        .unwrap_err();

    assert!(matches!(err, ActionError::Remote(RemoteError { status: Some(500), .. })));
    assert_eq!(
        orchestrator.state(),
        TaskState::Failed {
            kind: ActionKind::Match,
            message: "job not found".to_string(),
        }
    );
    assert!(orchestrator.acknowledge());
    assert!(orchestrator.can_start(ActionKind::Match));
}

#[tokio::test]
async fn no_other_action_can_start_while_one_runs() {
    init_logging();
    let gate = Arc::new(Notify::new());
    let transport = Arc::new(ScriptedTransport::gated(gate.clone(), "[]"));
    let orchestrator = Arc::new(orchestrator(transport.clone()));

    let running = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            let files = selection(&["r1.pdf"]);
            orchestrator.start(match_request(), &files).await
        })
    };

    while transport.calls() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(
        orchestrator.state(),
        TaskState::Running {
            kind: ActionKind::Match
        }
    );
    assert!(ALL_KINDS.iter().all(|&kind| !orchestrator.can_start(kind)));

    let err = orchestrator
        .start(ActionRequest::ListJobs, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::ConflictingAction { .. }));
    assert_eq!(transport.calls(), 1);

    gate.notify_one();
    let result = running.await.unwrap().expect("match ok");
    assert_eq!(result, TaskResult::Json(json!([])));

    // Terminal state still blocks until acknowledged.
    assert!(!orchestrator.can_start(ActionKind::ListJobs));
    orchestrator.acknowledge();
    assert!(ALL_KINDS.iter().all(|&kind| orchestrator.can_start(kind)));
}

#[tokio::test]
async fn abandoned_start_can_be_acknowledged() {
    init_logging();
    // The gate is never opened, so the request never answers.
    let transport = Arc::new(ScriptedTransport::gated(Arc::new(Notify::new()), "[]"));
    let orchestrator = orchestrator(transport.clone());

    let elapsed = tokio::time::timeout(
        Duration::from_millis(50),
        orchestrator.start(ActionRequest::ListJobs, &[]),
    )
    .await;

    assert!(elapsed.is_err());
    assert_eq!(transport.calls(), 1);
    assert_eq!(
        orchestrator.state(),
        TaskState::Failed {
            kind: ActionKind::ListJobs,
            message: "list-jobs was interrupted.".to_string(),
        }
    );
    assert!(orchestrator.acknowledge());
    assert_eq!(orchestrator.state(), TaskState::Idle);
    assert!(ALL_KINDS.iter().all(|&kind| orchestrator.can_start(kind)));
}

#[test]
fn screen_label_travels_with_the_orchestrator() {
    let orchestrator = orchestrator(Arc::new(ScriptedTransport::replying(Ok(Bytes::new()))));
    cvmatch_logging::set_screen(Some("cv-parser"));
    assert_eq!(orchestrator.screen(), "cv-parser");

    let orchestrator = orchestrator.with_screen("matching");
    cvmatch_logging::set_screen(None);
    assert_eq!(orchestrator.screen(), "matching");
}

#[tokio::test]
async fn unacknowledged_result_refuses_next_start_without_calling() {
    let transport = Arc::new(ScriptedTransport::replying(Ok(Bytes::from_static(b"[]"))));
    let orchestrator = orchestrator(transport.clone());

    orchestrator.start(ActionRequest::ListJobs, &[]).await.unwrap();
    let err = orchestrator
        .start(ActionRequest::ListJobs, &[])
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ActionError::ConflictingAction {
            active: "list-jobs succeeded".to_string()
        }
    );
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn empty_selection_fails_validation_without_network() {
    let transport = Arc::new(ScriptedTransport::replying(Ok(Bytes::from_static(b"[]"))));
    let orchestrator = orchestrator(transport.clone());

    let err = orchestrator
        .start(ActionRequest::ParseJson, &[])
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ActionError::ValidationFailed("Please select at least one resume file.".to_string())
    );
    assert_eq!(transport.calls(), 0);
    assert_eq!(orchestrator.state(), TaskState::Idle);
}

#[tokio::test]
async fn unparsable_json_is_a_generic_failure() {
    let transport = Arc::new(ScriptedTransport::replying(Ok(Bytes::from_static(
        b"<html>not json</html>",
    ))));
    let orchestrator = orchestrator(transport);

    let err = orchestrator
        .start(ActionRequest::ListJobs, &[])
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ActionError::MalformedResponse {
            kind: ActionKind::ListJobs
        }
    );
    assert_eq!(
        orchestrator.state(),
        TaskState::Failed {
            kind: ActionKind::ListJobs,
            message: "Could not load job descriptions.".to_string(),
        }
    );
}

#[tokio::test]
async fn network_failure_without_detail_uses_fallback() {
    let transport = Arc::new(ScriptedTransport::replying(Err(RemoteError::network(
        "connection refused",
    ))));
    let orchestrator = orchestrator(transport);

    orchestrator
        .start(match_request(), &selection(&["r1.pdf"]))
        .await
        .unwrap_err();

    assert_eq!(
        orchestrator.state(),
        TaskState::Failed {
            kind: ActionKind::Match,
            message: "An error occurred while matching the CVs.".to_string(),
        }
    );
}

#[tokio::test]
async fn export_hands_spreadsheet_to_downloader() {
    init_logging();
    let transport = Arc::new(ScriptedTransport::replying(Ok(Bytes::from_static(
        b"PK\x03\x04sheet",
    ))));
    let downloader = Arc::new(MemoryDownloader::default());
    let orchestrator = TaskOrchestrator::new(transport.clone(), downloader.clone())
        .with_date_source(Arc::new(fixed_day));

    let result = orchestrator
        .start(
            ActionRequest::ExportMatches {
                job_id: "42".to_string(),
            },
            &selection(&["r1.pdf", "r2.docx"]),
        )
        .await
        .expect("export ok");

    assert_eq!(
        result,
        TaskResult::Downloaded {
            filename: "job_matches_42_2024-05-17.xlsx".to_string(),
            size_bytes: 9,
            location: PathBuf::from("job_matches_42_2024-05-17.xlsx"),
        }
    );
    let saved = downloader.saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].1, b"PK\x03\x04sheet".to_vec());
    assert_eq!(
        transport.seen.lock().unwrap().clone(),
        vec!["POST /export-matches/42".to_string()]
    );
}

#[tokio::test]
async fn parse_excel_is_saved_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(ScriptedTransport::replying(Ok(Bytes::from_static(b"xlsx"))));
    let orchestrator = TaskOrchestrator::new(
        transport,
        Arc::new(DirectoryDownloader::new(dir.path().join("downloads"))),
    )
    .with_date_source(Arc::new(fixed_day));

    let result = orchestrator
        .start(ActionRequest::ParseExcel, &selection(&["a.pdf"]))
        .await
        .expect("parse ok");

    let TaskResult::Downloaded { location, .. } = result else {
        panic!("expected a download");
    };
    assert_eq!(
        location,
        dir.path().join("downloads").join("parsed_cvs_2024-05-17.xlsx")
    );
    assert_eq!(std::fs::read(&location).unwrap(), b"xlsx");
}

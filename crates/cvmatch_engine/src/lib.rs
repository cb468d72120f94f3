//! CV match engine: service transport, downloads and action orchestration.
mod download;
mod filename;
mod models;
mod orchestrator;
mod session;
mod transport;

pub use download::{ensure_download_dir, DirectoryDownloader, DownloadError, Downloader};
pub use filename::download_filename;
pub use models::{decode_result, BatchMatches, JobDescription, MatchScore, ParsedResume};
pub use orchestrator::{DateSource, TaskOrchestrator};
pub use session::{candidate_from_path, ScreenSession};
pub use transport::{ReqwestTransport, Transport, TransportError, TransportSettings};

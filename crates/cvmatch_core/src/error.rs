use thiserror::Error;

use crate::ActionKind;

/// Failure reported by the transport boundary.
///
/// `status` is `None` when no HTTP response was received at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", remote_summary(.status, .detail, .cause))]
pub struct RemoteError {
    pub status: Option<u16>,
    /// The service's structured `detail` field, when the body carried one.
    pub detail: Option<String>,
    pub cause: String,
}

impl RemoteError {
    pub fn network(cause: impl Into<String>) -> Self {
        Self {
            status: None,
            detail: None,
            cause: cause.into(),
        }
    }

    pub fn status(status: u16, detail: Option<String>) -> Self {
        Self {
            status: Some(status),
            detail,
            cause: format!("http status {status}"),
        }
    }
}

fn remote_summary(status: &Option<u16>, detail: &Option<String>, cause: &str) -> String {
    match (detail, status) {
        (Some(detail), Some(status)) => format!("{detail} (http status {status})"),
        (Some(detail), None) => detail.clone(),
        (None, _) => cause.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("{0}")]
    ValidationFailed(String),
    #[error("cannot start while {active}")]
    ConflictingAction { active: String },
    #[error("remote error: {0}")]
    Remote(RemoteError),
    #[error("malformed response for {kind}")]
    MalformedResponse { kind: ActionKind },
    #[error("download failed: {0}")]
    Delivery(String),
}

impl ActionError {
    /// Text shown to the user for a failed `kind`.
    pub fn user_message(&self, kind: ActionKind) -> String {
        match self {
            ActionError::ValidationFailed(message) | ActionError::Delivery(message) => {
                message.clone()
            }
            ActionError::ConflictingAction { .. } => self.to_string(),
            ActionError::Remote(RemoteError {
                detail: Some(detail),
                ..
            }) => detail.clone(),
            ActionError::Remote(_) | ActionError::MalformedResponse { .. } => {
                kind.fallback_error().to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error("index {index} out of range for selection of {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

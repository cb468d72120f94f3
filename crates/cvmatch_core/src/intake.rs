use std::fmt;

use crate::config::{CapacityPolicy, IntakeLimits, MIB};
use crate::entry::{FileCandidate, FileEntry};
use crate::IntakeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    InvalidType { accepted: String },
    TooLarge { max_bytes: u64 },
    CapacityExceeded { max_entries: usize },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::InvalidType { accepted } => {
                write!(f, "Invalid file type. Accepted types: {accepted}")
            }
            RejectReason::TooLarge { max_bytes } => {
                write!(f, "File too large. Maximum size is {}.", megabytes(*max_bytes))
            }
            RejectReason::CapacityExceeded { max_entries } => {
                write!(f, "Cannot upload more than {max_entries} files.")
            }
        }
    }
}

fn megabytes(bytes: u64) -> String {
    if bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{:.2}MB", bytes as f64 / MIB as f64)
    }
}

/// A refused candidate. `candidate` is `None` for a batch-wide refusal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub candidate: Option<FileCandidate>,
    pub reason: RejectReason,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.candidate {
            Some(candidate) => write!(f, "{}: {}", candidate.name, self.reason),
            None => write!(f, "{}", self.reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationOutcome {
    pub accepted: Vec<FileEntry>,
    pub rejected: Vec<Rejection>,
}

impl ValidationOutcome {
    /// One human-readable line per rejection, for toasts or logs.
    pub fn messages(&self) -> Vec<String> {
        self.rejected.iter().map(ToString::to_string).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Owns the ordered file selection of one screen.
///
/// Every entry satisfies the limits it was admitted under, and the selection
/// never holds more than `max_entries` files. Names may repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIntake {
    limits: IntakeLimits,
    entries: Vec<FileEntry>,
}

impl FileIntake {
    pub fn new(limits: IntakeLimits) -> Self {
        Self {
            limits,
            entries: Vec::new(),
        }
    }

    pub fn limits(&self) -> &IntakeLimits {
        &self.limits
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// Validates a batch and appends the accepted files in arrival order.
    pub fn add_candidates(&mut self, candidates: Vec<FileCandidate>) -> ValidationOutcome {
        let max_entries = self.limits.max_entries;
        let mut outcome = ValidationOutcome::default();

        if self.limits.capacity_policy == CapacityPolicy::RejectBatch
            && self.entries.len().saturating_add(candidates.len()) > max_entries
        {
            outcome.rejected.push(Rejection {
                candidate: None,
                reason: RejectReason::CapacityExceeded { max_entries },
            });
            return outcome;
        }

        let mut room = max_entries.saturating_sub(self.entries.len());
        for candidate in candidates {
            match self.check(&candidate) {
                Err(reason) => outcome.rejected.push(Rejection {
                    candidate: Some(candidate),
                    reason,
                }),
                Ok(_) if room == 0 => outcome.rejected.push(Rejection {
                    candidate: Some(candidate),
                    reason: RejectReason::CapacityExceeded { max_entries },
                }),
                Ok(extension) => {
                    room -= 1;
                    outcome
                        .accepted
                        .push(FileEntry::from_candidate(candidate, extension));
                }
            }
        }

        // Appended in one step so no reader sees half a batch.
        self.entries.extend(outcome.accepted.iter().cloned());
        outcome
    }

    // Extension first, then size; the first failing check wins.
    fn check(&self, candidate: &FileCandidate) -> Result<String, RejectReason> {
        let extension = candidate.extension();
        if !self.limits.accepts_extension(&extension) {
            return Err(RejectReason::InvalidType {
                accepted: self.limits.accepted_list(),
            });
        }
        if candidate.size_bytes > self.limits.max_entry_bytes {
            return Err(RejectReason::TooLarge {
                max_bytes: self.limits.max_entry_bytes,
            });
        }
        Ok(extension)
    }

    /// Removes entry `index`; later entries shift down by one.
    pub fn remove_entry(&mut self, index: usize) -> Result<FileEntry, IntakeError> {
        if index >= self.entries.len() {
            return Err(IntakeError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Read-only copy of the selection for an action.
    pub fn snapshot(&self) -> Vec<FileEntry> {
        self.entries.clone()
    }
}

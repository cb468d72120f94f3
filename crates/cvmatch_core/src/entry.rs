use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;

/// Opaque reference to file content; read only by the transport.
#[derive(Clone, PartialEq, Eq)]
pub enum FileHandle {
    Memory(Bytes),
    Path(PathBuf),
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileHandle::Memory(bytes) => write!(f, "Memory({} bytes)", bytes.len()),
            FileHandle::Path(path) => write!(f, "Path({})", path.display()),
        }
    }
}

/// A raw file offered by drag-and-drop or browsing, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    pub size_bytes: u64,
    pub handle: FileHandle,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, size_bytes: u64, handle: FileHandle) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            handle,
        }
    }

    pub fn from_bytes(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let content = content.into();
        Self::new(name, content.len() as u64, FileHandle::Memory(content))
    }

    /// Lower-cased text after the last dot; empty when the name has none.
    pub fn extension(&self) -> String {
        extension_of(&self.name)
    }
}

pub(crate) fn extension_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => String::new(),
    }
}

/// One validated file in a selection. Only `FileIntake` creates these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    name: String,
    size_bytes: u64,
    extension: String,
    handle: FileHandle,
}

impl FileEntry {
    pub(crate) fn from_candidate(candidate: FileCandidate, extension: String) -> Self {
        Self {
            name: candidate.name,
            size_bytes: candidate.size_bytes,
            extension,
            handle: candidate.handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn handle(&self) -> &FileHandle {
        &self.handle
    }
}

/// `2.00 MB` style label used by the selection list.
pub fn size_label(size_bytes: u64) -> String {
    format!("{:.2} MB", size_bytes as f64 / crate::MIB as f64)
}

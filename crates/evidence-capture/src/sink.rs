use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write attachment {name}: {source}")]
    Io {
        name: String,
        source: std::io::Error,
    },
}

/// Where published evidence lands: a report backend, a directory, a test
/// buffer. Implementations receive fully redacted bytes.
pub trait EvidenceSink: Send + Sync {
    fn add_attachment(&self, name: &str, mime: &str, bytes: &[u8]) -> Result<(), SinkError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// In-memory sink for tests and embedding callers.
#[derive(Default)]
pub struct MemorySink {
    attachments: Mutex<Vec<Attachment>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attachments(&self) -> Vec<Attachment> {
        self.attachments.lock().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.attachments
            .lock()
            .iter()
            .map(|a| a.name.clone())
            .collect()
    }
}

impl EvidenceSink for MemorySink {
    fn add_attachment(&self, name: &str, mime: &str, bytes: &[u8]) -> Result<(), SinkError> {
        self.attachments.lock().push(Attachment {
            name: name.to_string(),
            mime: mime.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}

/// Sink that writes each attachment as a file under one directory.
pub struct FsSink {
    dir: PathBuf,
}

impl FsSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Attachment names come from labels that may contain selectors;
    /// flatten anything path-hostile before using them as file names.
    fn file_name(name: &str) -> String {
        name.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c
                } else {
                    '-'
                }
            })
            .collect()
    }
}

impl EvidenceSink for FsSink {
    fn add_attachment(&self, name: &str, _mime: &str, bytes: &[u8]) -> Result<(), SinkError> {
        let io_err = |source| SinkError::Io {
            name: name.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        fs::write(self.dir.join(Self::file_name(name)), bytes).map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_records_in_publish_order() {
        let sink = MemorySink::new();
        sink.add_attachment("a.png", "image/png", b"png").unwrap();
        sink.add_attachment("b.html", "text/html", b"<html>").unwrap();

        assert_eq!(sink.names(), vec!["a.png", "b.html"]);
        assert_eq!(sink.attachments()[1].bytes, b"<html>");
    }

    #[test]
    fn fs_sink_writes_sanitized_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsSink::new(dir.path().join("evidence"));

        sink.add_attachment("click css:#submit-screenshot.png", "image/png", b"png")
            .unwrap();

        let written = sink.dir().join("click-css--submit-screenshot.png");
        assert_eq!(fs::read(written).unwrap(), b"png");
    }
}

//! Artifact output.

use dashmap::DashSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// File extension of written artifacts
pub const ARTIFACT_EXTENSION: &str = "board";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("output '{0}' is already being written")]
    Busy(String),

    #[error("'{0}' is not a usable output name")]
    InvalidName(String),

    #[error("failed to write '{name}': {source}")]
    Io { name: String, source: io::Error },
}

/// Destination for finished artifacts.
pub trait ArtifactSink: Send + Sync {
    /// Store `content` under `name`, replacing any previous artifact.
    fn write(&self, name: &str, content: &str) -> Result<(), SinkError>;
}

/// Writes each artifact to `<dir>/<name>.board`.
///
/// Content is written to a temporary file next to the destination and
/// renamed into place, so readers see either the old or the new artifact.
pub struct FileSink {
    dir: PathBuf,
    in_flight: DashSet<String>,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            in_flight: DashSet::new(),
        }
    }

    /// Final path of the artifact called `name`
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{ARTIFACT_EXTENSION}"))
    }

    fn write_atomic(&self, name: &str, content: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let tmp = self.dir.join(format!(".{name}.{}.tmp", Uuid::new_v4()));
        let result = write_file(&tmp, content).and_then(|()| fs::rename(&tmp, self.path_for(name)));
        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result
    }
}

fn write_file(path: &Path, content: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(|c: char| c == '/' || c == '\\')
        && !name.chars().any(char::is_control)
}

impl ArtifactSink for FileSink {
    fn write(&self, name: &str, content: &str) -> Result<(), SinkError> {
        if !is_valid_name(name) {
            return Err(SinkError::InvalidName(name.to_string()));
        }
        if !self.in_flight.insert(name.to_string()) {
            return Err(SinkError::Busy(name.to_string()));
        }

        let result = self.write_atomic(name, content);
        self.in_flight.remove(name);

        result.map_err(|source| SinkError::Io {
            name: name.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("out"));

        sink.write("Standard", "version = 1;\n").unwrap();

        let written = fs::read_to_string(sink.path_for("Standard")).unwrap();
        assert_eq!(written, "version = 1;\n");
    }

    #[test]
    fn test_write_replaces_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path());

        sink.write("Standard", "first").unwrap();
        sink.write("Standard", "second").unwrap();

        assert_eq!(fs::read_to_string(sink.path_for("Standard")).unwrap(), "second");
        let files: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_busy_name_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path());

        sink.in_flight.insert("Standard".to_string());
        assert!(matches!(
            sink.write("Standard", "x"),
            Err(SinkError::Busy(name)) if name == "Standard"
        ));

        // Other names are unaffected
        sink.write("Large", "x").unwrap();
    }

    #[test]
    fn test_path_like_names_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path());

        for name in ["", "../escape", "a/b", ".hidden", "tab\tname"] {
            assert!(matches!(
                sink.write(name, "x"),
                Err(SinkError::InvalidName(_))
            ));
        }
    }

    #[test]
    fn test_io_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();

        let sink = FileSink::new(&blocker);
        assert!(matches!(
            sink.write("Standard", "x"),
            Err(SinkError::Io { .. })
        ));
        assert!(sink.in_flight.is_empty());
    }
}

//! Generation pipeline: definition file in, artifact out, one board at a time.

use crate::registry::Registry;
use crate::report::{BoardOutcome, BoardReport, RunReport, Stage};
use crate::sink::{ArtifactSink, SinkError};
use board_core::{decode_definition, ArtifactEmitter, DefinitionError, ValidationError};
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// Why a single board could not be generated
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Decode(DefinitionError),

    #[error(transparent)]
    Validate(#[from] ValidationError),

    #[error(transparent)]
    Write(#[from] SinkError),
}

impl BoardError {
    pub fn stage(&self) -> Stage {
        match self {
            BoardError::Read { .. } => Stage::Read,
            BoardError::Decode(_) => Stage::Decode,
            BoardError::Validate(_) => Stage::Validate,
            BoardError::Write(_) => Stage::Write,
        }
    }
}

/// Generate one board and hand its artifact to `sink`.
///
/// Returns the artifact size in bytes.
pub fn generate_board(
    name: &str,
    input: &Path,
    emitter: &ArtifactEmitter,
    sink: &dyn ArtifactSink,
) -> Result<usize, BoardError> {
    let bytes = std::fs::read(input).map_err(|source| BoardError::Read {
        path: input.to_path_buf(),
        source,
    })?;

    let descriptor = decode_definition(&bytes)
        .map_err(BoardError::Decode)?
        .build()?;
    debug!(
        board = name,
        land = descriptor.land_tile_count(),
        water = descriptor.water_tile_count(),
        "Board validated"
    );

    let artifact = emitter.render(&descriptor, name)?;
    sink.write(name, &artifact)?;
    Ok(artifact.len())
}

/// Generate every registered board concurrently.
///
/// Boards share nothing but the sink, so each runs as its own blocking task.
/// A failing board is logged and recorded; the others carry on.
pub async fn run(registry: &Registry, sink: Arc<dyn ArtifactSink>) -> RunReport {
    let emitter = Arc::new(ArtifactEmitter::new());
    let mut pending: BTreeSet<String> = BTreeSet::new();
    let mut tasks = JoinSet::new();

    for (name, path) in registry.iter() {
        let name = name.to_string();
        let path = path.to_path_buf();
        let sink = Arc::clone(&sink);
        let emitter = Arc::clone(&emitter);

        pending.insert(name.clone());
        tasks.spawn_blocking(move || {
            let result = generate_board(&name, &path, &emitter, sink.as_ref());
            (name, result)
        });
    }

    let mut boards = Vec::with_capacity(pending.len());
    while let Some(joined) = tasks.join_next().await {
        let (name, result) = match joined {
            Ok(done) => done,
            Err(e) => {
                error!("Generation task failed: {}", e);
                continue;
            }
        };
        pending.remove(&name);

        let outcome = match result {
            Ok(bytes) => {
                info!(board = %name, bytes, "Artifact written");
                BoardOutcome::Written { bytes }
            }
            Err(e) => {
                error!(board = %name, stage = ?e.stage(), "Generation failed: {}", e);
                BoardOutcome::Failed {
                    stage: e.stage(),
                    error: e.to_string(),
                }
            }
        };
        boards.push(BoardReport { name, outcome });
    }

    // Whatever is left never reported back
    for name in pending {
        boards.push(BoardReport {
            name,
            outcome: BoardOutcome::Failed {
                stage: Stage::Internal,
                error: "generation task did not complete".to_string(),
            },
        });
    }

    RunReport::new(boards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashmap::DashMap;
    use std::fs;

    const STANDARD: &str = r#"{
        "name": "Standard",
        "title": "Standard",
        "lowResourceNumber": 3,
        "highResourceNumber": 4,
        "landGrid": [{"x": 0, "y": 0}, {"x": 1, "y": 0}],
        "landGridProbabilities": [5, 9],
        "landGridResources": ["WOOD", null],
        "landGridWhitelists": [null, "A"],
        "landResourceWhitelists": {"A": ["WOOD", "BRICK"]}
    }"#;

    /// Keeps artifacts in memory; refuses names listed in `reject`
    #[derive(Default)]
    struct MemorySink {
        written: DashMap<String, String>,
        reject: Vec<String>,
    }

    impl ArtifactSink for MemorySink {
        fn write(&self, name: &str, content: &str) -> Result<(), SinkError> {
            if self.reject.iter().any(|r| r == name) {
                return Err(SinkError::Io {
                    name: name.to_string(),
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
                });
            }
            self.written.insert(name.to_string(), content.to_string());
            Ok(())
        }
    }

    fn registry_with(files: &[(&str, &str)]) -> (tempfile::TempDir, Registry) {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = Registry::new();
        for (name, json) in files {
            let path = dir.path().join(format!("{name}.json"));
            fs::write(&path, json).unwrap();
            registry.insert(*name, path);
        }
        (dir, registry)
    }

    #[test]
    fn test_generate_board_writes_loadable_artifact() {
        let (_dir, registry) = registry_with(&[("Standard", STANDARD)]);
        let (name, path) = registry.iter().next().unwrap();
        let sink = MemorySink::default();

        let bytes = generate_board(name, path, &ArtifactEmitter::new(), &sink).unwrap();

        let artifact = sink.written.get("Standard").unwrap().clone();
        assert_eq!(artifact.len(), bytes);
        let loaded = board_core::load(&artifact).unwrap();
        assert_eq!(loaded.artifact_name, "Standard");
        assert_eq!(loaded.descriptor.land_tile_count(), 2);
    }

    #[test]
    fn test_missing_file_is_read_stage() {
        let sink = MemorySink::default();
        let err = generate_board(
            "Ghost",
            Path::new("/definitely/not/here.json"),
            &ArtifactEmitter::new(),
            &sink,
        )
        .unwrap_err();
        assert_eq!(err.stage(), Stage::Read);
    }

    #[tokio::test]
    async fn test_failures_do_not_block_other_boards() {
        let broken = STANDARD.replace("[5, 9]", "[5]");
        let (_dir, registry) = registry_with(&[
            ("Standard", STANDARD),
            ("Broken", broken.as_str()),
            ("Garbage", "not json"),
            ("Locked", STANDARD),
        ]);
        let sink = Arc::new(MemorySink {
            reject: vec!["Locked".to_string()],
            ..Default::default()
        });

        let report = run(&registry, sink.clone()).await;

        assert_eq!(report.boards.len(), 4);
        assert_eq!(report.written(), 1);
        assert!(sink.written.contains_key("Standard"));

        let stage_of = |name: &str| {
            report
                .boards
                .iter()
                .find(|b| b.name == name)
                .map(|b| b.outcome.clone())
        };
        assert!(matches!(
            stage_of("Broken"),
            Some(BoardOutcome::Failed { stage: Stage::Validate, .. })
        ));
        assert!(matches!(
            stage_of("Garbage"),
            Some(BoardOutcome::Failed { stage: Stage::Decode, .. })
        ));
        assert!(matches!(
            stage_of("Locked"),
            Some(BoardOutcome::Failed { stage: Stage::Write, .. })
        ));
    }

    #[tokio::test]
    async fn test_run_is_idempotent() {
        let (_dir, registry) = registry_with(&[("Standard", STANDARD)]);
        let out = tempfile::tempdir().unwrap();
        let sink = Arc::new(crate::sink::FileSink::new(out.path()));

        let first = run(&registry, sink.clone()).await;
        let before = fs::read_to_string(sink.path_for("Standard")).unwrap();
        let second = run(&registry, sink.clone()).await;
        let after = fs::read_to_string(sink.path_for("Standard")).unwrap();

        assert!(first.is_success() && second.is_success());
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let report = run(&Registry::new(), Arc::new(MemorySink::default())).await;
        assert!(report.boards.is_empty());
        assert!(report.is_success());
    }
}

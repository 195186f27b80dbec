//! Per-board outcomes of a generation run.

use serde::{Deserialize, Serialize};

/// Pipeline step a board failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Read,
    Decode,
    Validate,
    Write,
    /// The generation task itself died
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BoardOutcome {
    Written { bytes: usize },
    Failed { stage: Stage, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardReport {
    pub name: String,
    #[serde(flatten)]
    pub outcome: BoardOutcome,
}

/// Outcome of every board in a run, sorted by board name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub boards: Vec<BoardReport>,
}

impl RunReport {
    pub fn new(mut boards: Vec<BoardReport>) -> Self {
        boards.sort_by(|a, b| a.name.cmp(&b.name));
        Self { boards }
    }

    pub fn written(&self) -> usize {
        self.boards
            .iter()
            .filter(|b| matches!(b.outcome, BoardOutcome::Written { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.boards.len() - self.written()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

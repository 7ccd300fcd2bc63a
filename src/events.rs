//! JSON event-stream shape for `--format json`, mirroring
//! `examples/jopamo-txed/src/events.rs`'s `RunStart`/`File`/`RunEnd`
//! triple but over document operations instead of file edits.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    RunStart(RunStart),
    Operation(OperationEvent),
    RunEnd(RunEnd),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStart {
    pub schema_version: String,
    pub tool_version: String,
    pub command: String,
    pub source: String,
    pub mode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationEvent {
    Parsed {
        node_count: usize,
    },
    Resolved {
        resolved: usize,
        unresolved: Vec<String>,
    },
    Printed {
        bytes: usize,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEnd {
    pub has_errors: bool,
    pub exit_code: i32,
    pub duration_ms: u64,
}

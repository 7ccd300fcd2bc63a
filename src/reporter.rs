//! Collects the outcome of a CLI run and renders it either as
//! human-readable text or as the `events::Event` JSON stream, the same
//! split `examples/jopamo-txed/src/reporter.rs`'s `Report` makes
//! between `print_human`/`print_json`.

use crate::events::{Event, OperationEvent, RunEnd, RunStart};

pub struct Report {
    pub command: String,
    pub source: String,
    pub mode: String,
    pub operations: Vec<OperationEvent>,
    pub has_errors: bool,
    pub duration_ms: u64,
}

impl Report {
    pub fn new(command: impl Into<String>, source: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            source: source.into(),
            mode: mode.into(),
            operations: Vec::new(),
            has_errors: false,
            duration_ms: 0,
        }
    }

    pub fn push(&mut self, event: OperationEvent) {
        if matches!(event, OperationEvent::Error { .. }) {
            self.has_errors = true;
        }
        self.operations.push(event);
    }

    pub fn exit_code(&self) -> i32 {
        if self.has_errors {
            1
        } else {
            0
        }
    }

    pub fn print_human(&self) {
        for op in &self.operations {
            match op {
                OperationEvent::Parsed { node_count } => {
                    println!("parsed {node_count} nodes from {}", self.source);
                }
                OperationEvent::Resolved { resolved, unresolved } => {
                    println!("resolved {resolved} path(s)");
                    for path in unresolved {
                        eprintln!("  unresolved: {path}");
                    }
                }
                OperationEvent::Printed { bytes } => {
                    println!("wrote {bytes} bytes");
                }
                OperationEvent::Error { message } => {
                    eprintln!("error: {message}");
                }
            }
        }
    }

    pub fn print_json(&self, tool_version: &str) {
        let start = RunStart {
            schema_version: "1".into(),
            tool_version: tool_version.into(),
            command: self.command.clone(),
            source: self.source.clone(),
            mode: self.mode.clone(),
        };
        println!("{}", serde_json::to_string(&Event::RunStart(start)).unwrap());
        for op in &self.operations {
            println!("{}", serde_json::to_string(&Event::Operation(op.clone())).unwrap());
        }
        let end = RunEnd {
            has_errors: self.has_errors,
            exit_code: self.exit_code(),
            duration_ms: self.duration_ms,
        };
        println!("{}", serde_json::to_string(&Event::RunEnd(end)).unwrap());
    }
}

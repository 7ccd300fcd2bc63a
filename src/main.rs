mod cli;
mod events;
mod reporter;

use std::io::Read;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, GetArgs, OutputFormat, PrintArgs, RematerializeArgs, ResolveArgs, SourceArgs};
use docjson::{resolve_paths, CastAccess, Document, Mode, PrinterOptions};
use events::OperationEvent;
use reporter::Report;

const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let exit_code = match Cli::parse() {
        Cli::Schema => print_schema(),
        Cli::Print(args) => print_cmd(args),
        Cli::Get(args) => get_cmd(args),
        Cli::Resolve(args) => resolve_cmd(args),
        Cli::Rematerialize(args) => rematerialize_cmd(args),
    };
    std::process::exit(exit_code);
}

fn print_schema() -> i32 {
    let schema = schemars::schema_for!(PrinterOptions);
    match serde_json::to_string_pretty(&schema) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}

fn read_source(args: &SourceArgs) -> std::io::Result<String> {
    if args.input.as_os_str() == "-" {
        if atty::is(atty::Stream::Stdin) {
            eprintln!("reading from stdin (pass a file path instead of `-` to skip this)...");
        }
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(&args.input)
    }
}

fn source_label(args: &SourceArgs) -> String {
    if args.input.as_os_str() == "-" {
        "<stdin>".to_string()
    } else {
        args.input.display().to_string()
    }
}

fn mode_of(args: &SourceArgs) -> Mode {
    if args.full_mode {
        Mode::Full
    } else {
        Mode::Quick
    }
}

fn parse_document(args: &SourceArgs, report: &mut Report) -> Option<Document> {
    let text = match read_source(args) {
        Ok(text) => text,
        Err(err) => {
            report.push(OperationEvent::Error {
                message: err.to_string(),
            });
            return None;
        }
    };
    match Document::from_string(text, mode_of(args)) {
        Ok(doc) => {
            report.push(OperationEvent::Parsed {
                node_count: doc.node_count(),
            });
            Some(doc)
        }
        Err(err) => {
            report.push(OperationEvent::Error {
                message: err.to_string(),
            });
            None
        }
    }
}

fn finish(args_format: OutputFormat, mut report: Report, start: Instant) -> i32 {
    report.duration_ms = start.elapsed().as_millis() as u64;
    match args_format {
        OutputFormat::Human => report.print_human(),
        OutputFormat::Json => report.print_json(TOOL_VERSION),
    }
    report.exit_code()
}

fn print_cmd(args: PrintArgs) -> i32 {
    let start = Instant::now();
    let mut report = Report::new("print", source_label(&args.source), format!("{:?}", mode_of(&args.source)));
    let Some(doc) = parse_document(&args.source, &mut report) else {
        return finish(args.source.format, report, start);
    };

    let mut options = if args.pretty {
        PrinterOptions::pretty()
    } else {
        PrinterOptions::compact()
    };
    options.layout.json = args.json_layout;
    options.layout.flatten = args.flatten;

    match doc.to_string_with(&options) {
        Ok(text) => {
            report.push(OperationEvent::Printed { bytes: text.len() });
            if args.source.format == OutputFormat::Human {
                println!("{text}");
            }
        }
        Err(err) => report.push(OperationEvent::Error {
            message: err.to_string(),
        }),
    }
    finish(args.source.format, report, start)
}

fn get_cmd(args: GetArgs) -> i32 {
    let start = Instant::now();
    let mut report = Report::new("get", source_label(&args.source), format!("{:?}", mode_of(&args.source)));
    let Some(doc) = parse_document(&args.source, &mut report) else {
        return finish(args.source.format, report, start);
    };

    match doc.get(&args.path) {
        Ok(id) => match CastAccess::<String>::get_cast(&doc, id).or_else(|_| doc.to_string_from(id, &PrinterOptions::compact())) {
            Ok(text) => {
                if args.source.format == OutputFormat::Human {
                    println!("{text}");
                }
                report.push(OperationEvent::Printed { bytes: text.len() });
            }
            Err(err) => report.push(OperationEvent::Error {
                message: err.to_string(),
            }),
        },
        Err(err) => report.push(OperationEvent::Error {
            message: err.to_string(),
        }),
    }
    finish(args.source.format, report, start)
}

fn resolve_cmd(args: ResolveArgs) -> i32 {
    let start = Instant::now();
    let mut report = Report::new(
        "resolve",
        source_label(&args.source),
        format!("{:?}", mode_of(&args.source)),
    );
    let Some(mut doc) = parse_document(&args.source, &mut report) else {
        return finish(args.source.format, report, start);
    };

    let outcome = match resolve_paths(&mut doc, args.strict) {
        Ok(outcome) => outcome,
        Err(err) => {
            report.push(OperationEvent::Error {
                message: err.to_string(),
            });
            return finish(args.source.format, report, start);
        }
    };
    report.push(OperationEvent::Resolved {
        resolved: outcome.resolved,
        unresolved: outcome.unresolved,
    });

    match doc.to_string_with(&PrinterOptions::pretty()) {
        Ok(text) => {
            if args.source.format == OutputFormat::Human {
                println!("{text}");
            }
            report.push(OperationEvent::Printed { bytes: text.len() });
        }
        Err(err) => report.push(OperationEvent::Error {
            message: err.to_string(),
        }),
    }
    finish(args.source.format, report, start)
}

fn rematerialize_cmd(args: RematerializeArgs) -> i32 {
    let start = Instant::now();
    let mut report = Report::new(
        "rematerialize",
        source_label(&args.source),
        format!("{:?}", mode_of(&args.source)),
    );
    let Some(mut doc) = parse_document(&args.source, &mut report) else {
        return finish(args.source.format, report, start);
    };

    let before = doc.to_string_with(&PrinterOptions::pretty()).unwrap_or_default();

    if let Err(err) = doc.rematerialize(&PrinterOptions::pretty()) {
        report.push(OperationEvent::Error {
            message: err.to_string(),
        });
        return finish(args.source.format, report, start);
    }

    match doc.to_string_with(&PrinterOptions::pretty()) {
        Ok(text) => {
            if args.show_diff && args.source.format == OutputFormat::Human {
                let diff = similar::TextDiff::from_lines(&before, &text);
                for change in diff.iter_all_changes() {
                    let sign = match change.tag() {
                        similar::ChangeTag::Delete => "-",
                        similar::ChangeTag::Insert => "+",
                        similar::ChangeTag::Equal => " ",
                    };
                    print!("{sign}{change}");
                }
            } else if args.source.format == OutputFormat::Human {
                println!("{text}");
            }
            report.push(OperationEvent::Printed { bytes: text.len() });
        }
        Err(err) => report.push(OperationEvent::Error {
            message: err.to_string(),
        }),
    }
    finish(args.source.format, report, start)
}

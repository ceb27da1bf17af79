use crate::errors::DbError;
use crate::exec::Executor;
use crate::utils::json::{document_to_json, json_to_document};
use std::io::Write;

use super::command::Command;

mod built {
    include!(concat!(env!("OUT_DIR"), "/compiled_features.rs"));
}

/// Cargo features this binary was compiled with.
#[must_use]
pub fn compiled_features() -> &'static [&'static str] {
    built::COMPILED_FEATURES
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputMode {
    Plain,
    Json,
}

pub fn run(exec: &Executor, cmd: Command, out: &mut impl Write) -> Result<(), DbError> {
    run_with_format(exec, cmd, OutputMode::Plain, out)
}

pub fn run_with_format(exec: &Executor, cmd: Command, mode: OutputMode, out: &mut impl Write) -> Result<(), DbError> {
    match cmd {
        Command::Insert { ns, json } => {
            let doc = json_to_document(&json)?;
            let handle = exec.storage().insert(&ns, &doc)?;
            log::info!(target: crate::telemetry::AUDIT_TARGET, "insert ns={ns} record={handle}");
            match mode {
                OutputMode::Json => writeln!(out, "{}", serde_json::json!({"inserted": handle.0}))?,
                OutputMode::Plain => writeln!(out, "inserted={handle}")?,
            }
        }
        Command::Find { ns, filter_json, limit } => {
            let pattern = json_to_document(filter_json.as_deref().unwrap_or("{}"))?;
            let reply = exec.run_query(&ns, limit, &pattern)?;
            // NDJSON in both modes.
            for doc in reply.documents() {
                writeln!(out, "{}", document_to_json(&doc?)?)?;
            }
        }
        Command::Delete { ns, filter_json, just_one } => {
            let pattern = json_to_document(&filter_json)?;
            let n = exec.delete_objects(&ns, &pattern, just_one)?;
            match mode {
                OutputMode::Json => writeln!(out, "{}", serde_json::json!({"deleted": n}))?,
                OutputMode::Plain => writeln!(out, "deleted={n}")?,
            }
        }
        Command::Update { ns, filter_json, doc_json, upsert } => {
            let pattern = json_to_document(&filter_json)?;
            let doc = json_to_document(&doc_json)?;
            let outcome = exec.update_objects(&ns, &doc, &pattern, upsert)?;
            match mode {
                OutputMode::Json => writeln!(out, "{}", serde_json::json!({"outcome": outcome.as_str()}))?,
                OutputMode::Plain => writeln!(out, "outcome={}", outcome.as_str())?,
            }
        }
        Command::List => {
            let storage = exec.storage();
            let mut names = storage.namespaces()?;
            names.sort();
            for ns in names {
                let n = storage.count(&ns)?;
                match mode {
                    OutputMode::Json => writeln!(out, "{}", serde_json::json!({"ns": ns, "count": n}))?,
                    OutputMode::Plain => writeln!(out, "{ns} {n}")?,
                }
            }
        }
        Command::Info => {
            let features = compiled_features();
            match mode {
                OutputMode::Json => {
                    let report = serde_json::json!({
                        "package_name": env!("CARGO_PKG_NAME"),
                        "package_version": env!("CARGO_PKG_VERSION"),
                        "compiled_features": features,
                        "reserved_prefix": exec.reserved_prefix(),
                    });
                    writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
                }
                OutputMode::Plain => {
                    writeln!(out, "{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))?;
                    writeln!(out, "features={}", features.join(","))?;
                    writeln!(out, "reserved_prefix={}", exec.reserved_prefix())?;
                }
            }
        }
    }
    Ok(())
}

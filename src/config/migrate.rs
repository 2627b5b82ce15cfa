//! Config schema migrations

use serde_json::{Map, Value};

use super::path;
use crate::version::{extract_version, parse_build_number};

/// Key holding the schema version marker.
pub const VERSION_KEY: &str = "__version__";

/// One version-to-version upgrade step.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub from: u32,
    pub to: u32,
    pub description: &'static str,
    pub apply: fn(&mut Map<String, Value>) -> Result<(), String>,
}

/// Read the version marker. Older files stored it as a string; a missing marker is version 0.
pub fn stored_version(doc: &Map<String, Value>) -> Option<u32> {
    match doc.get(VERSION_KEY) {
        None | Some(Value::Null) => Some(0),
        Some(Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Some(Value::String(s)) if s.is_empty() => Some(0),
        Some(Value::String(s)) => s.parse().ok(),
        Some(_) => None,
    }
}

/// Ordered chain of steps from `from` to `to`, or the version the chain got stuck at.
pub(crate) fn plan(migrations: &[Migration], from: u32, to: u32) -> Result<Vec<Migration>, u32> {
    let mut steps = Vec::new();
    let mut current = from;
    while current != to {
        let step = migrations
            .iter()
            .find(|m| m.from == current && m.to > m.from && m.to <= to)
            .ok_or(current)?;
        steps.push(*step);
        current = step.to;
    }
    Ok(steps)
}

// ============================================================================
// Application migrations
// ============================================================================

/// Steps for the application config, oldest first.
pub fn app_migrations() -> Vec<Migration> {
    vec![Migration {
        from: 0,
        to: 1,
        description: "store the installed framework as a build number",
        apply: installed_tag_to_build_number,
    }]
}

/// Version 0 kept the installed release as a raw tag string under
/// `ref.installed_rf_version`; version 1 keeps the numeric build under
/// `ref.installed_version`.
fn installed_tag_to_build_number(doc: &mut Map<String, Value>) -> Result<(), String> {
    let legacy = doc
        .get_mut("ref")
        .and_then(Value::as_object_mut)
        .and_then(|r| r.remove("installed_rf_version"));

    let build = match legacy {
        Some(Value::String(raw)) => legacy_build_number(&raw),
        Some(Value::Number(n)) => n.as_u64(),
        _ => None,
    };

    path::insert(doc, "ref.installed_version", build.map_or(Value::Null, Value::from))
        .map_err(|e| e.to_string())
}

/// Accepts either a bare build number or a full `nightly-01090-<hash>` tag.
fn legacy_build_number(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    parse_build_number(raw).or_else(|| extract_version(raw).ok())
}

use serde_json::{Value, json};

use crate::config::SimulationInput;
use crate::model::{BIN_CAPACITY, TOLERANCE};
use crate::trace::Trace;

/// Schema version of the exported trace document. Bump on breaking changes.
pub const SCHEMA_VERSION: &str = "1";

/// Serialize a run as a JSON document `{ meta, items, events }`.
/// `items` are listed in input order so a renderer can resolve `item_original_index`.
pub fn to_json(input: &SimulationInput, trace: &Trace) -> Value {
    let items: Vec<Value> = input
        .items()
        .iter()
        .map(|it| json!({"index": it.index, "size": it.size}))
        .collect();
    json!({
        "meta": {
            "schema_version": SCHEMA_VERSION,
            "app": "binpack-sim",
            "version": env!("CARGO_PKG_VERSION"),
            "algorithm": input.algorithm(),
            "capacity": BIN_CAPACITY,
            "tolerance": TOLERANCE,
            "complete": trace.is_complete(),
        },
        "items": items,
        "events": trace,
    })
}

/// One compact JSON object per event, newline separated (no trailing newline).
pub fn to_json_lines(trace: &Trace) -> serde_json::Result<String> {
    let lines = trace
        .iter()
        .map(serde_json::to_string)
        .collect::<serde_json::Result<Vec<_>>>()?;
    Ok(lines.join("\n"))
}

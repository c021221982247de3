//! Loading and validation of `--data` payloads.
//!
//! `--data` accepts inline JSON, `@path` to read a file, or `-` for stdin.
//! All parsing happens before any request is sent, so malformed payloads
//! never reach the network.

use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::client::{CliError, CliResult};

/// Load a single-object payload for `create` and `update`.
pub(crate) fn load_payload(data: &str) -> CliResult<Value> {
    let raw = read_source(data)?;
    serde_json::from_str(&raw)
        .map_err(|err| CliError::validation(format!("payload is not valid JSON: {err}")))
}

/// Load an array payload for `bulk-update` and `bulk-delete`.
///
/// NetBox bulk endpoints take a JSON array in which every element names its
/// target via a numeric `id`; both constraints are checked here.
pub(crate) fn load_bulk_payload(data: &str) -> CliResult<Vec<Value>> {
    let payload = load_payload(data)?;
    let Value::Array(items) = payload else {
        return Err(CliError::validation(
            "bulk payload must be a JSON array of objects",
        ));
    };
    for (index, item) in items.iter().enumerate() {
        let id = item.get("id").and_then(Value::as_u64);
        if id.is_none() {
            return Err(CliError::validation(format!(
                "bulk payload element {index} is missing a numeric 'id'"
            )));
        }
    }
    Ok(items)
}

fn read_source(data: &str) -> CliResult<String> {
    if data == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .map_err(|err| CliError::validation(format!("failed to read stdin: {err}")))?;
        return Ok(raw);
    }
    if let Some(path) = data.strip_prefix('@') {
        let path = Path::new(path);
        return std::fs::read_to_string(path).map_err(|err| {
            CliError::validation(format!(
                "failed to read payload file '{}': {err}",
                path.display()
            ))
        });
    }
    Ok(data.to_string())
}

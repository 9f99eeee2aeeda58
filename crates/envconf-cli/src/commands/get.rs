//! Get command implementation

use serde_json::Value;

use crate::builder::Runtime;
use crate::error::Result;

/// Resolve one value and print it as pretty JSON.
///
/// The default is parsed as JSON when possible, so `--default 30` falls
/// back to a number and `--default thirty` to a string.
pub fn run_get(
    runtime: &Runtime,
    category: &str,
    section: Option<&str>,
    key: Option<&str>,
    default: Option<&str>,
) -> Result<()> {
    let default = default
        .map(|raw| serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())));
    let value = runtime.registry.get(category, section, key, default)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

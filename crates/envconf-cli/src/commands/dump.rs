//! Dump command implementation

use crate::builder::Runtime;
use crate::error::Result;

/// Print resolved configuration as `path = value` lines.
pub fn run_dump(runtime: &Runtime, category: Option<&str>) -> Result<()> {
    let flat = runtime.registry.to_flat_map(category)?;
    for (path, value) in &flat {
        println!("{path} = {value}");
    }
    Ok(())
}

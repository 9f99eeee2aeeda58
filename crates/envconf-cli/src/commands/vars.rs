//! Vars command implementation

use envconf_vars::VarRegistry;

use crate::error::Result;

/// Print the declaration listing or the resolved values.
pub fn run_vars(vars: &VarRegistry, usage: bool) -> Result<()> {
    if usage {
        println!("{}", vars.usage());
    } else {
        println!("{}", vars.dump());
    }
    Ok(())
}

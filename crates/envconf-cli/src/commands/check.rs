//! Check command implementation

use colored::Colorize;

use crate::builder::Runtime;
use crate::error::Result;

/// Report the served environment and discovered categories.
///
/// The served environment differs from the requested one when the
/// requested branch does not exist and a fallback was committed.
pub fn run_check(runtime: &Runtime) -> Result<()> {
    let env_id = runtime.registry.env_id();
    match runtime.registry.committed_env() {
        Some(committed) if committed != env_id => {
            println!(
                "{} environment {} (serving {})",
                "OK".green().bold(),
                env_id.cyan(),
                committed.cyan()
            );
        }
        Some(_) => {
            println!("{} environment {}", "OK".green().bold(), env_id.cyan());
        }
        None => {
            println!(
                "{} no configuration loader injected",
                "!".yellow().bold()
            );
        }
    }

    let categories = runtime.registry.categories();
    if categories.is_empty() {
        println!("no categories discovered");
    } else {
        println!("categories:");
        for category in categories {
            println!("   {} {}", "-".dimmed(), category);
        }
    }
    Ok(())
}

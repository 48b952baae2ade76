//! Workflow rules command.
use crate::cli::RulesArgs;
use crate::rules::ruleset_stub;
use anyhow::{Context, Result};
use std::fs;

/// Print or write the built-in default ruleset as a customization stub.
pub fn run_rules(args: &RulesArgs) -> Result<i32> {
    let stub = ruleset_stub();
    match &args.out {
        Some(path) => {
            fs::write(path, format!("{stub}\n"))
                .with_context(|| format!("write {}", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{stub}"),
    }
    Ok(0)
}

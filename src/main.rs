//! plint: frontmatter validation and quality scoring for Markdown prompt
//! libraries.
use clap::Parser;
use std::process;

mod classify;
mod cli;
mod corpus;
mod interrupt;
mod pipeline;
mod report;
mod rules;
mod score;
mod util;
mod validate;
mod variables;
mod workflow;

fn main() {
    init_tracing();
    interrupt::install();
    let args = cli::RootArgs::parse();
    let result = match &args.command {
        cli::Command::Validate(args) => workflow::run_validate(args),
        cli::Command::Evaluate(args) => workflow::run_evaluate(args),
        cli::Command::Audit(args) => workflow::run_audit(args),
        cli::Command::Rules(args) => workflow::run_rules(args),
    };
    match result {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            process::exit(2);
        }
    }
}

/// Route tracing to stderr, honoring `RUST_LOG` with a quiet default.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

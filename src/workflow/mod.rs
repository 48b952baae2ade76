//! Workflow orchestration for the lint commands.
//!
//! Each command is a small run function over the shared corpus pipeline so
//! the CLI stays thin and exit-code policy lives in one place.
mod audit;
mod context;
mod evaluate;
mod rules;
mod validate;

pub(crate) use audit::run_audit;
pub(crate) use context::{build_scorer, collect_audit, LintContext};
pub(crate) use evaluate::run_evaluate;
pub(crate) use rules::run_rules;
pub(crate) use validate::run_validate;

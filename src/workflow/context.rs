use crate::corpus::ensure_library_root;
use crate::pipeline::{self, PipelineItem, PipelineOptions};
use crate::report::{AuditBuilder, AuditReport};
use crate::rules::{self, CompiledRuleSet};
use crate::score::lm::resolve_lm_command;
use crate::score::{CriterionScorer, HeuristicScorer, LmScorer};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Resolved library root plus the compiled ruleset every stage consults.
pub(crate) struct LintContext {
    pub(crate) root: PathBuf,
    pub(crate) ruleset: CompiledRuleSet,
}

impl LintContext {
    pub(crate) fn load(library: &Path, rules_flag: Option<&Path>) -> Result<Self> {
        let root = ensure_library_root(library)?;
        let (ruleset, source) = rules::resolve_ruleset(rules_flag, &root)?;
        tracing::debug!(source = source.as_str(), "resolved ruleset");
        let ruleset = ruleset.compile()?;
        Ok(Self { root, ruleset })
    }
}

/// Pick the scorer for a run: an LM command from the flag or environment
/// when present, heuristics otherwise.
pub(crate) fn build_scorer(lm_flag: Option<&str>) -> Box<dyn CriterionScorer> {
    match resolve_lm_command(lm_flag) {
        Some(command) => {
            tracing::info!(command = command.as_str(), "using lm scorer");
            Box::new(LmScorer::new(command))
        }
        None => Box::new(HeuristicScorer::default()),
    }
}

/// Run the pipeline over the whole library and fold every item into a
/// finalized audit. Interruption still yields an audit, marked partial.
pub(crate) fn collect_audit(
    ctx: &LintContext,
    jobs: Option<usize>,
    scorer: &dyn CriterionScorer,
) -> Result<AuditReport> {
    let mut builder = AuditBuilder::new(&ctx.root, ctx.ruleset.rules().rubric.clone());
    let options = PipelineOptions {
        root: &ctx.root,
        folder: None,
        jobs,
    };
    let outcome = pipeline::run(options, &ctx.ruleset, scorer, |item| match item {
        PipelineItem::Document(record) => builder.absorb_record(&record),
        PipelineItem::LoadFailure(error) => builder.absorb_load_error(error),
    })?;
    if outcome.interrupted || outcome.files_processed < outcome.files_total {
        builder.mark_partial();
    }
    builder.finalize(ctx.ruleset.rules())
}

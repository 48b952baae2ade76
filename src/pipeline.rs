//! Scoped worker pool that drives a corpus through every check.
//!
//! Workers claim files from a shared atomic index over the sorted file
//! list and send immutable items over a channel to the single consumer on
//! the calling thread. Aggregation downstream is commutative, so item
//! arrival order does not matter. A SIGINT stops workers from claiming
//! new files; items already in flight still arrive.
use crate::corpus::{loader, LoadError};
use crate::interrupt;
use crate::report::DocumentRecord;
use crate::rules::CompiledRuleSet;
use crate::score::{self, CriterionScorer};
use crate::{classify, validate, variables};
use anyhow::Result;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

/// Default cap on worker count when `--jobs` is not given.
const MAX_DEFAULT_WORKERS: usize = 8;

/// One unit of pipeline output.
#[derive(Debug)]
pub enum PipelineItem {
    Document(Box<DocumentRecord>),
    LoadFailure(LoadError),
}

/// What to process and with how many workers.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions<'a> {
    pub root: &'a Path,
    pub folder: Option<&'a str>,
    pub jobs: Option<usize>,
}

/// Coverage summary for one pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOutcome {
    pub files_total: usize,
    pub files_processed: usize,
    /// True when SIGINT cut the run short.
    pub interrupted: bool,
}

/// Run discovery and the worker pool, feeding every item to `observe` on
/// the calling thread.
pub fn run<F>(
    options: PipelineOptions<'_>,
    ruleset: &CompiledRuleSet,
    scorer: &dyn CriterionScorer,
    mut observe: F,
) -> Result<PipelineOutcome>
where
    F: FnMut(PipelineItem),
{
    let corpus = loader::discover_documents(options.root, options.folder)?;
    for error in corpus.load_errors {
        observe(PipelineItem::LoadFailure(error));
    }

    let files = corpus.files;
    let files_total = files.len();
    if files.is_empty() {
        return Ok(PipelineOutcome {
            files_total,
            files_processed: 0,
            interrupted: interrupt::interrupted(),
        });
    }

    let jobs = worker_count(files_total, options.jobs);
    tracing::debug!(jobs, files = files_total, "starting pipeline");

    let next = AtomicUsize::new(0);
    let (sender, receiver) = mpsc::channel::<PipelineItem>();
    let files_processed = thread::scope(|scope| {
        for _ in 0..jobs {
            let sender = sender.clone();
            let files = &files;
            let next = &next;
            scope.spawn(move || loop {
                if interrupt::interrupted() {
                    break;
                }
                let index = next.fetch_add(1, Ordering::SeqCst);
                let Some(path) = files.get(index) else {
                    break;
                };
                let item = process_file(options.root, path, ruleset, scorer);
                if sender.send(item).is_err() {
                    break;
                }
            });
        }
        drop(sender);

        let mut count = 0usize;
        for item in receiver {
            observe(item);
            count += 1;
        }
        count
    });

    Ok(PipelineOutcome {
        files_total,
        files_processed,
        interrupted: interrupt::interrupted(),
    })
}

/// Load, validate, classify, extract, and score one file.
fn process_file(
    root: &Path,
    path: &Path,
    ruleset: &CompiledRuleSet,
    scorer: &dyn CriterionScorer,
) -> PipelineItem {
    let document = match loader::load_document(root, path) {
        Ok(document) => document,
        Err(error) => {
            tracing::warn!(path = %error.path, message = %error.message, "skipping unreadable file");
            return PipelineItem::LoadFailure(error);
        }
    };
    let validation = validate::validate_document(&document, ruleset);
    let findings = classify::classify_document(&document);
    let variables = variables::extract_variables(&document);
    let score = score::score_document(scorer, &document, &variables, ruleset.rules());
    PipelineItem::Document(Box::new(DocumentRecord {
        document,
        validation,
        findings,
        variables,
        score,
    }))
}

fn worker_count(files: usize, jobs: Option<usize>) -> usize {
    let default = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        .min(MAX_DEFAULT_WORKERS);
    jobs.unwrap_or(default).clamp(1, files.max(1))
}

//! Aggregation of rows and failures over a set of result files.
//!
//! Every file is handled on its own: it either contributes one or more rows
//! or exactly one failure entry. Nothing here sorts or deduplicates; rows
//! keep file order, then molecule order within a file.

use std::sync::Arc;
use std::time::Instant;

use dockscore_common::{DockscoreError, Result};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument};

use crate::discovery::CandidateFile;
use crate::extract::{extract, Extraction, FailureEntry};
use crate::parser::MoleculeParser;
use crate::projector::{project, MalformedPolicy, Row};

/// Everything collected in one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregation {
    pub rows: Vec<Row>,
    pub failures: Vec<FailureEntry>,
}

impl Aggregation {
    fn push(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Rows(rows) => self.rows.extend(rows),
            FileOutcome::Failed(entry) => self.failures.push(entry),
        }
    }
}

/// Result of one file, complete before it is accumulated.
#[derive(Debug)]
enum FileOutcome {
    Rows(Vec<Row>),
    Failed(FailureEntry),
}

fn process_file(
    parser: &dyn MoleculeParser,
    file: &CandidateFile,
    policy: MalformedPolicy,
) -> Result<FileOutcome> {
    match extract(parser, file) {
        Extraction::Failed(entry) => Ok(FileOutcome::Failed(entry)),
        Extraction::Parsed(mols) => {
            let rows = mols
                .iter()
                .map(|mol| project(mol.as_ref(), &file.ligand, policy))
                .collect::<Result<Vec<_>>>()?;
            debug!(ligand = %file.ligand, n_rows = rows.len(), "Projected molecules");
            Ok(FileOutcome::Rows(rows))
        }
    }
}

/// Drives extraction and projection over discovered files.
pub struct Aggregator {
    parser: Arc<dyn MoleculeParser>,
    policy: MalformedPolicy,
}

impl Aggregator {
    pub fn new(parser: Arc<dyn MoleculeParser>) -> Self {
        Self {
            parser,
            policy: MalformedPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: MalformedPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> MalformedPolicy {
        self.policy
    }

    /// Process files one at a time in the given order.
    #[instrument(skip_all, fields(n_files = files.len()))]
    pub fn run(&self, files: &[CandidateFile]) -> Result<Aggregation> {
        let t0 = Instant::now();
        let mut agg = Aggregation::default();

        for file in files {
            agg.push(process_file(self.parser.as_ref(), file, self.policy)?);
        }

        info!(
            n_rows = agg.rows.len(),
            n_failures = agg.failures.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Aggregation complete"
        );
        Ok(agg)
    }

    /// Process files on the blocking pool with at most `workers` in flight.
    ///
    /// Outcomes are put back in input order before accumulation, so the
    /// result is identical to [`Aggregator::run`] over the same files. With
    /// `MalformedPolicy::Abort` the error reported is the one from the
    /// earliest failing file.
    pub async fn run_concurrent(&self, files: Vec<CandidateFile>, workers: usize) -> Result<Aggregation> {
        if workers <= 1 {
            return self.run(&files);
        }

        let t0 = Instant::now();
        let n_files = files.len();
        info!(n_files, workers, "Starting concurrent aggregation");

        let permits = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();

        for (idx, file) in files.into_iter().enumerate() {
            let permit = Arc::clone(&permits)
                .acquire_owned()
                .await
                .map_err(|e| DockscoreError::Worker(e.to_string()))?;
            let parser = Arc::clone(&self.parser);
            let policy = self.policy;

            tasks.spawn_blocking(move || {
                let _permit = permit;
                (idx, process_file(parser.as_ref(), &file, policy))
            });
        }

        let mut outcomes: Vec<Option<Result<FileOutcome>>> = (0..n_files).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            let (idx, outcome) = joined.map_err(|e| DockscoreError::Worker(e.to_string()))?;
            outcomes[idx] = Some(outcome);
        }

        let mut agg = Aggregation::default();
        for outcome in outcomes.into_iter().flatten() {
            agg.push(outcome?);
        }

        info!(
            n_rows = agg.rows.len(),
            n_failures = agg.failures.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Aggregation complete"
        );
        Ok(agg)
    }
}

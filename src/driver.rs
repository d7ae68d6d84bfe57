//! Sequential batch driver shared by the sweep and list variants.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::engine::NotebookEngine;
use crate::error::{BatchError, Result};
use crate::report::Reporter;
use crate::runner::execute_item;
use crate::work::Batch;

#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Fail-fast when true; otherwise keep going and collect failures.
    pub stop_on_error: bool,
    pub suppress_diagnostics: bool,
    /// Working directory handed to the engine.
    pub cwd: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedItem {
    pub index: usize,
    pub label: String,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub total_elapsed: Duration,
    pub item_count: usize,
    pub item_elapsed: Vec<Duration>,
    pub failures: Vec<FailedItem>,
}

impl RunSummary {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turns collected failures into an error so callers exit non-zero.
    pub fn ensure_complete(self) -> Result<Self> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(BatchError::Incomplete {
                failed: self.failures.len(),
                total: self.item_count,
            })
        }
    }
}

pub struct BatchDriver<'a> {
    engine: &'a dyn NotebookEngine,
    options: DriverOptions,
}

impl<'a> BatchDriver<'a> {
    pub fn new(engine: &'a dyn NotebookEngine, options: DriverOptions) -> Self {
        Self { engine, options }
    }

    /// Executes every item strictly in order, one at a time.
    ///
    /// In fail-fast mode the first failure is returned as
    /// [`BatchError::ItemFailed`] and no summary is printed.
    pub async fn run<W: Write>(
        &self,
        batch: &Batch,
        reporter: &mut Reporter<W>,
    ) -> Result<RunSummary> {
        let started_at = Local::now();
        reporter.banner(batch, &started_at)?;

        let total = batch.len();
        let mut total_elapsed = Duration::ZERO;
        let mut item_elapsed = Vec::with_capacity(total);
        let mut failures = Vec::new();

        if total == 0 {
            reporter.nothing_to_run()?;
        }

        for (offset, item) in batch.items.iter().enumerate() {
            let index = offset + 1;
            reporter.item_header(index, total, &item.source_name())?;

            let result = execute_item(
                self.engine,
                item,
                &self.options.cwd,
                self.options.suppress_diagnostics,
            )
            .await;
            total_elapsed += result.elapsed;
            item_elapsed.push(result.elapsed);

            match result.error {
                None => reporter.item_succeeded(&item.label, result.elapsed, &Local::now())?,
                Some(err) => {
                    reporter.item_failed(&item.label, result.elapsed, &err)?;
                    if self.options.stop_on_error {
                        tracing::debug!("stopping after item {index}/{total}");
                        return Err(BatchError::ItemFailed {
                            index,
                            total,
                            label: item.label.clone(),
                            source: err,
                        });
                    }
                    failures.push(FailedItem {
                        index,
                        label: item.label.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        let summary = RunSummary {
            started_at,
            finished_at: Local::now(),
            total_elapsed,
            item_count: total,
            item_elapsed,
            failures,
        };
        reporter.summary(&summary)?;
        Ok(summary)
    }
}

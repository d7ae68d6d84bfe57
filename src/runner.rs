use std::path::Path;
use std::time::{Duration, Instant};

use crate::engine::{EngineError, ExecutionRequest, NotebookEngine};
use crate::quiet::quietly;
use crate::work::WorkItem;

/// Outcome of one engine call
#[derive(Debug)]
pub struct ExecutionResult {
    pub success: bool,
    pub elapsed: Duration,
    pub error: Option<EngineError>,
}

/// Runs one work item to completion and times it.
///
/// Diagnostics are suppressed for the duration of the engine call when
/// `quiet` is set. Whether a failure stops the batch is the driver's call.
pub async fn execute_item(
    engine: &dyn NotebookEngine,
    item: &WorkItem,
    cwd: &Path,
    quiet: bool,
) -> ExecutionResult {
    let request = ExecutionRequest {
        input_path: item.input_path.clone(),
        output_path: item.output_path.clone(),
        parameters: item.parameters.clone(),
        cwd: cwd.to_path_buf(),
    };

    let start = Instant::now();
    let outcome = quietly(quiet, engine.execute(&request)).await;
    let elapsed = start.elapsed();
    tracing::debug!("{} finished in {:?}", item.label, elapsed);

    match outcome {
        Ok(()) => ExecutionResult {
            success: true,
            elapsed,
            error: None,
        },
        Err(err) => ExecutionResult {
            success: false,
            elapsed,
            error: Some(err),
        },
    }
}

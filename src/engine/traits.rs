use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// One notebook execution handed to an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub parameters: BTreeMap<String, Value>,
    pub cwd: PathBuf,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine executable `{program}` not found")]
    NotFound { program: String },
    #[error("spawn error: {0}")]
    Spawn(String),
    #[error("engine exit {status}: {detail}")]
    Failed { status: String, detail: String },
    #[error("parameter error: {0}")]
    Parameters(String),
}

/// Opaque capability: run the notebook at `input_path` with `parameters`,
/// writing the executed copy to `output_path`.
#[async_trait]
pub trait NotebookEngine: Send + Sync {
    async fn execute(&self, request: &ExecutionRequest) -> Result<(), EngineError>;
}

//! Papermill CLI engine
//! papermill INPUT OUTPUT --kernel K --cwd DIR [--parameters_yaml PARAMS] <output flags>

use std::collections::BTreeMap;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use crate::config::EngineConfig;
use crate::engine::traits::{EngineError, ExecutionRequest, NotebookEngine};

const DEFAULT_PROGRAM: &str = "papermill";
const STDERR_TAIL_BYTES: usize = 500;
/// Raw stderr retained while the child runs; trimmed to `STDERR_TAIL_BYTES` after.
const STDERR_KEEP_BYTES: usize = 4096;
const READ_CHUNK_BYTES: usize = 8192;

#[derive(Debug, Clone)]
pub struct PapermillEngine {
    program: String,
    kernel: String,
    log_output: bool,
    progress_bar: bool,
    request_save_on_cell_execute: bool,
    env: BTreeMap<String, String>,
}

impl PapermillEngine {
    pub fn new(kernel: impl Into<String>) -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            kernel: kernel.into(),
            log_output: false,
            progress_bar: false,
            request_save_on_cell_execute: true,
            env: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            program: config.program.clone(),
            kernel: config.kernel.clone(),
            log_output: config.log_output,
            progress_bar: config.progress_bar,
            request_save_on_cell_execute: config.request_save_on_cell_execute,
            env: config.env.clone(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Builds the child command without spawning it.
    pub fn build_command(&self, request: &ExecutionRequest) -> Result<Command, EngineError> {
        let mut cmd = Command::new(&self.program);
        cmd.kill_on_drop(true)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.envs(&self.env);

        cmd.arg(&request.input_path).arg(&request.output_path);
        cmd.arg("--kernel").arg(&self.kernel);
        cmd.arg("--cwd").arg(&request.cwd);

        // JSON is valid YAML, so typed values survive the trip into the notebook
        if !request.parameters.is_empty() {
            let document = serde_json::to_string(&request.parameters)
                .map_err(|e| EngineError::Parameters(e.to_string()))?;
            cmd.arg("--parameters_yaml").arg(document);
        }

        cmd.arg(if self.log_output {
            "--log-output"
        } else {
            "--no-log-output"
        });
        cmd.arg(if self.progress_bar {
            "--progress-bar"
        } else {
            "--no-progress-bar"
        });
        cmd.arg(if self.request_save_on_cell_execute {
            "--request-save-on-cell-execute"
        } else {
            "--no-request-save-on-cell-execute"
        });

        Ok(cmd)
    }
}

#[async_trait]
impl NotebookEngine for PapermillEngine {
    async fn execute(&self, request: &ExecutionRequest) -> Result<(), EngineError> {
        let mut cmd = self.build_command(request)?;
        tracing::debug!(
            "papermill {} -> {} ({} parameters)",
            request.input_path.display(),
            request.output_path.display(),
            request.parameters.len()
        );

        let mut child = cmd
            .spawn()
            .map_err(|err| map_spawn_err(&self.program, err))?;

        // Only stderr is piped, so draining it to EOF before waiting cannot stall the child
        let tail = match child.stderr.take() {
            Some(stderr) => read_tail(stderr, STDERR_KEEP_BYTES)
                .await
                .map_err(|e| EngineError::Spawn(format!("reading engine stderr: {e}")))?,
            None => Vec::new(),
        };
        let status = child
            .wait()
            .await
            .map_err(|e| EngineError::Spawn(format!("waiting for engine: {e}")))?;

        if status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&tail);
        Err(EngineError::Failed {
            status: status.to_string(),
            detail: tail_snippet(stderr.trim(), STDERR_TAIL_BYTES),
        })
    }
}

/// Reads `reader` to EOF, holding on to at most the last `keep` bytes.
async fn read_tail<R: AsyncRead + Unpin>(mut reader: R, keep: usize) -> std::io::Result<Vec<u8>> {
    let mut tail = Vec::with_capacity(keep);
    let mut chunk = vec![0u8; READ_CHUNK_BYTES];
    loop {
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            return Ok(tail);
        }
        tail.extend_from_slice(&chunk[..read]);
        if tail.len() > keep {
            let excess = tail.len() - keep;
            tail.drain(..excess);
        }
    }
}

fn map_spawn_err(program: &str, err: std::io::Error) -> EngineError {
    if err.kind() == std::io::ErrorKind::NotFound {
        EngineError::NotFound {
            program: program.to_string(),
        }
    } else {
        EngineError::Spawn(err.to_string())
    }
}

/// Keeps the end of the text, where tracebacks put the actual exception.
fn tail_snippet(input: &str, max: usize) -> String {
    if input.len() <= max {
        return input.to_string();
    }
    let mut start = input.len() - max;
    while !input.is_char_boundary(start) {
        start += 1;
    }
    format!("...{}", &input[start..])
}

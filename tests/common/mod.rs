//! Scripted stand-in for the external notebook engine

use std::collections::BTreeSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use nb_batch::engine::{EngineError, ExecutionRequest, NotebookEngine};
use nb_batch::report::Reporter;

#[derive(Default)]
pub struct ScriptedEngine {
    calls: Mutex<Vec<ExecutionRequest>>,
    fail_on: BTreeSet<usize>,
    delay: Duration,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the n-th call (1-based).
    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on.insert(call);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<ExecutionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotebookEngine for ScriptedEngine {
    async fn execute(&self, request: &ExecutionRequest) -> Result<(), EngineError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request.clone());
            calls.len()
        };
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail_on.contains(&call) {
            return Err(EngineError::Failed {
                status: "exit status: 1".to_string(),
                detail: format!("PapermillExecutionError in call {call}"),
            });
        }
        Ok(())
    }
}

pub fn buffer_reporter(show_progress: bool) -> Reporter<Vec<u8>> {
    Reporter::new(Vec::new(), show_progress, 40)
}

pub fn output_of(reporter: Reporter<Vec<u8>>) -> String {
    String::from_utf8(reporter.into_inner()).unwrap()
}

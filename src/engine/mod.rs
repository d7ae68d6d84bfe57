pub mod papermill;
pub mod traits;

pub use papermill::PapermillEngine;
pub use traits::{EngineError, ExecutionRequest, NotebookEngine};

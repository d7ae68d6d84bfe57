use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::driver::DriverOptions;
use crate::progress::DEFAULT_BAR_LENGTH;
use crate::work::Batch;

pub const DEFAULT_CONFIG_FILE: &str = "nb_batch.toml";
const MAX_BAR_LENGTH: usize = 200;

/// Main configuration structure loaded from nb_batch.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub run: RunConfig,
    pub sweep: SweepConfig,
    pub list: ListConfig,
}

/// External engine invocation settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub program: String,
    pub kernel: String,
    pub log_output: bool,
    pub progress_bar: bool,
    pub request_save_on_cell_execute: bool,
    /// Discard engine diagnostics instead of interleaving them with progress output
    pub suppress_diagnostics: bool,
    /// Extra variables set on the engine process only
    pub env: BTreeMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        // Silence TensorFlow's C++ logging and oneDNN notices inside the kernel
        let env = BTreeMap::from([
            ("TF_CPP_MIN_LOG_LEVEL".to_string(), "3".to_string()),
            ("TF_ENABLE_ONEDNN_OPTS".to_string(), "0".to_string()),
        ]);
        Self {
            program: "papermill".to_string(),
            kernel: "air-pollution".to_string(),
            log_output: false,
            progress_bar: false,
            request_save_on_cell_execute: true,
            suppress_diagnostics: true,
            env,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Sweep,
    List,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub mode: RunMode,
    pub project_dir: PathBuf,
    pub stop_on_error: bool,
    pub show_progress: bool,
    pub bar_length: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Sweep,
            project_dir: PathBuf::from("."),
            stop_on_error: true,
            show_progress: true,
            bar_length: DEFAULT_BAR_LENGTH,
        }
    }
}

/// Parameter-sweep variant: one notebook, one parameter, many values
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub notebook: String,
    pub parameter: String,
    pub values: Vec<Value>,
    pub other_parameters: BTreeMap<String, Value>,
}

/// Notebook-list variant: each notebook executed in place
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    pub notebooks: Vec<String>,
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses NB_BATCH_CONFIG environment variable or defaults to "nb_batch.toml"
    pub fn load() -> anyhow::Result<Self> {
        let config_path =
            std::env::var("NB_BATCH_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(Path::new(&config_path))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let mut config = if let Ok(content) = std::fs::read_to_string(path) {
            Self::parse(&content)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());

        // Relative project dirs are anchored next to the config file
        let anchor = match path.parent() {
            Some(parent) if path.exists() && !parent.as_os_str().is_empty() => {
                parent.to_path_buf()
            }
            _ => std::env::current_dir()?,
        };
        config.resolve_project_dir(&anchor);

        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Env-first overrides; `lookup` is `std::env::var` outside of tests.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(kernel) = lookup("NB_BATCH_KERNEL") {
            tracing::debug!("NB_BATCH_KERNEL env override applied");
            self.engine.kernel = kernel;
        }
        if let Some(program) = lookup("NB_BATCH_ENGINE") {
            tracing::debug!("NB_BATCH_ENGINE env override applied");
            self.engine.program = program;
        }
        if let Some(dir) = lookup("NB_BATCH_PROJECT_DIR") {
            tracing::debug!("NB_BATCH_PROJECT_DIR env override applied");
            self.run.project_dir = PathBuf::from(dir);
        }
        if let Some(stop) = lookup("NB_BATCH_STOP_ON_ERROR") {
            self.run.stop_on_error = stop == "1" || stop.eq_ignore_ascii_case("true");
        }
    }

    pub fn resolve_project_dir(&mut self, anchor: &Path) {
        if self.run.project_dir.is_relative() {
            self.run.project_dir = anchor.join(&self.run.project_dir);
        }
    }

    /// Work items for the configured mode, rooted at the project directory.
    pub fn batch(&self) -> crate::error::Result<Batch> {
        let dir = &self.run.project_dir;
        match self.run.mode {
            RunMode::Sweep => Batch::sweep(
                dir,
                &self.sweep.notebook,
                &self.sweep.parameter,
                &self.sweep.values,
                &self.sweep.other_parameters,
            ),
            RunMode::List => Batch::list(dir, &self.list.notebooks),
        }
    }

    pub fn driver_options(&self) -> DriverOptions {
        DriverOptions {
            stop_on_error: self.run.stop_on_error,
            suppress_diagnostics: self.engine.suppress_diagnostics,
            cwd: self.run.project_dir.clone(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.engine.program.trim().is_empty() {
            anyhow::bail!("engine.program cannot be empty");
        }
        if self.engine.kernel.trim().is_empty() {
            anyhow::bail!("engine.kernel cannot be empty");
        }
        if !(1..=MAX_BAR_LENGTH).contains(&self.run.bar_length) {
            anyhow::bail!("run.bar_length must be between 1 and {}", MAX_BAR_LENGTH);
        }
        Ok(())
    }
}

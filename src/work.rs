//! Work items for the two batch variants and the artifact naming rules.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{BatchError, Result};

pub const NOTEBOOK_EXTENSION: &str = ".ipynb";

/// One scheduled notebook execution
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItem {
    pub label: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub parameters: BTreeMap<String, Value>,
}

impl WorkItem {
    pub fn is_in_place(&self) -> bool {
        self.input_path == self.output_path
    }

    /// File name of the notebook being executed, shown in the item header.
    /// Sweeps share one source, so this differs from `label` there.
    pub fn source_name(&self) -> String {
        self.input_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.label.clone())
    }
}

/// Which axis a batch iterates over; drives the opening banner.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchKind {
    Sweep {
        notebook: String,
        parameter: String,
        values: Vec<Value>,
    },
    List,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub kind: BatchKind,
    pub items: Vec<WorkItem>,
}

impl Batch {
    /// Fixed notebook, one parameter varied across `values`.
    pub fn sweep(
        project_dir: &Path,
        notebook: &str,
        parameter: &str,
        values: &[Value],
        other_parameters: &BTreeMap<String, Value>,
    ) -> Result<Self> {
        if notebook.trim().is_empty() {
            return Err(BatchError::Config {
                message: "sweep notebook cannot be empty".into(),
            });
        }
        if parameter.trim().is_empty() {
            return Err(BatchError::Config {
                message: "sweep parameter name cannot be empty".into(),
            });
        }
        Ok(Self {
            kind: BatchKind::Sweep {
                notebook: notebook_file_name(notebook),
                parameter: parameter.to_string(),
                values: values.to_vec(),
            },
            items: sweep_items(project_dir, notebook, parameter, values, other_parameters),
        })
    }

    /// Each notebook executed once, overwritten in place.
    pub fn list(project_dir: &Path, notebooks: &[String]) -> Result<Self> {
        if let Some(pos) = notebooks.iter().position(|n| n.trim().is_empty()) {
            return Err(BatchError::Config {
                message: format!("notebook entry {} is blank", pos + 1),
            });
        }
        Ok(Self {
            kind: BatchKind::List,
            items: list_items(project_dir, notebooks),
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Appends `.ipynb` unless the name already carries it.
///
/// Names like `gaussian0.1` have a dot in them, so this never goes through
/// `Path::file_stem`.
pub fn notebook_file_name(name: &str) -> String {
    if name.ends_with(NOTEBOOK_EXTENSION) {
        name.to_string()
    } else {
        format!("{name}{NOTEBOOK_EXTENSION}")
    }
}

fn base_name(name: &str) -> &str {
    name.strip_suffix(NOTEBOOK_EXTENSION).unwrap_or(name)
}

/// Strings render bare; everything else in its JSON text form.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `{base}_{parameter}_{value}.ipynb`
pub fn output_file_name(base: &str, parameter: &str, value: &Value) -> String {
    format!(
        "{}_{}_{}{}",
        base_name(base),
        parameter,
        render_value(value),
        NOTEBOOK_EXTENSION
    )
}

pub fn sweep_items(
    project_dir: &Path,
    notebook: &str,
    parameter: &str,
    values: &[Value],
    other_parameters: &BTreeMap<String, Value>,
) -> Vec<WorkItem> {
    let input_path = project_dir.join(notebook_file_name(notebook));
    values
        .iter()
        .map(|value| {
            let file_name = output_file_name(notebook, parameter, value);
            let mut parameters = other_parameters.clone();
            parameters.insert(parameter.to_string(), value.clone());
            WorkItem {
                output_path: project_dir.join(&file_name),
                label: file_name,
                input_path: input_path.clone(),
                parameters,
            }
        })
        .collect()
}

pub fn list_items(project_dir: &Path, notebooks: &[String]) -> Vec<WorkItem> {
    notebooks
        .iter()
        .map(|name| {
            let file_name = notebook_file_name(name.trim());
            let path = project_dir.join(&file_name);
            WorkItem {
                label: file_name,
                input_path: path.clone(),
                output_path: path,
                parameters: BTreeMap::new(),
            }
        })
        .collect()
}

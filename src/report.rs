//! Console protocol: banner, per-item headers, outcomes and the closing summary.

use std::io::{self, Write};
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::driver::RunSummary;
use crate::progress::render_progress;
use crate::work::{Batch, BatchKind, render_value};

const RULE_WIDTH: usize = 60;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const CLOCK_FORMAT: &str = "%H:%M:%S";

pub struct Reporter<W: Write> {
    out: W,
    show_progress: bool,
    bar_length: usize,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, show_progress: bool, bar_length: usize) -> Self {
        Self {
            out,
            show_progress,
            bar_length,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn banner(&mut self, batch: &Batch, started: &DateTime<Local>) -> io::Result<()> {
        writeln!(self.out, "🚀 Starting Notebook Processing")?;
        writeln!(self.out, "📅 Start Time : {}", started.format(TIMESTAMP_FORMAT))?;
        match &batch.kind {
            BatchKind::Sweep {
                notebook,
                parameter,
                values,
            } => {
                let rendered: Vec<String> = values.iter().map(render_value).collect();
                writeln!(self.out, "📄 Operation : {notebook}")?;
                writeln!(
                    self.out,
                    "🔧 Try Parameter : {}=[{}]",
                    parameter,
                    rendered.join(", ")
                )?;
            }
            BatchKind::List => {
                writeln!(self.out, "📊 Total Notebooks: {}", batch.len())?;
            }
        }
        writeln!(self.out)?;
        self.out.flush()
    }

    /// Header plus the bar for items completed so far (`index - 1`).
    pub fn item_header(&mut self, index: usize, total: usize, label: &str) -> io::Result<()> {
        if !self.show_progress {
            return Ok(());
        }
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(self.out, "\n{rule}")?;
        writeln!(self.out, "[{index}/{total}] Processing: {label}")?;
        writeln!(self.out, "{rule}")?;
        writeln!(
            self.out,
            "{}",
            render_progress(index - 1, total, self.bar_length)
        )?;
        self.out.flush()
    }

    pub fn item_succeeded(
        &mut self,
        label: &str,
        elapsed: Duration,
        at: &DateTime<Local>,
    ) -> io::Result<()> {
        writeln!(
            self.out,
            "✅ Success: {} ({:.1}s) [{}]",
            label,
            elapsed.as_secs_f64(),
            at.format(CLOCK_FORMAT)
        )?;
        self.out.flush()
    }

    pub fn item_failed(
        &mut self,
        label: &str,
        elapsed: Duration,
        error: &dyn std::fmt::Display,
    ) -> io::Result<()> {
        writeln!(
            self.out,
            "❌ Failed: {} ({:.1}s): {}",
            label,
            elapsed.as_secs_f64(),
            error
        )?;
        self.out.flush()
    }

    pub fn nothing_to_run(&mut self) -> io::Result<()> {
        writeln!(self.out, "⚠️ No work items configured; nothing to run")
    }

    pub fn summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        if self.show_progress && summary.item_count > 0 {
            writeln!(
                self.out,
                "{}",
                render_progress(summary.item_count, summary.item_count, self.bar_length)
            )?;
        }
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(self.out, "\n{rule}")?;
        writeln!(
            self.out,
            "⏱️ Total Time: {:.1}s",
            summary.total_elapsed.as_secs_f64()
        )?;
        writeln!(
            self.out,
            "📅 End Time: {}",
            summary.finished_at.format(TIMESTAMP_FORMAT)
        )?;
        if !summary.failures.is_empty() {
            writeln!(
                self.out,
                "❌ Failures: {}/{}",
                summary.failures.len(),
                summary.item_count
            )?;
            for failure in &summary.failures {
                writeln!(
                    self.out,
                    "   - [{}] {}: {}",
                    failure.index, failure.label, failure.error
                )?;
            }
        }
        writeln!(self.out, "{rule}")?;
        self.out.flush()
    }
}

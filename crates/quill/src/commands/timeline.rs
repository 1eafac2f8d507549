//! `quill timeline` command implementation.

use std::path::PathBuf;

use clap::Args;
use quill_site::{Timeline, render_timeline};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the timeline command.
#[derive(Args)]
pub(crate) struct TimelineArgs {
    /// TOML file with `[[entries]]` tables.
    file: PathBuf,

    /// Section title (default: "Timeline").
    #[arg(short, long)]
    title: Option<String>,
}

impl TimelineArgs {
    /// Execute the timeline command.
    ///
    /// # Errors
    ///
    /// Returns an error if the data file cannot be read or parsed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let timeline = Timeline::load(&self.file)?;
        tracing::info!(entries = timeline.entries.len(), "Loaded timeline");

        match render_timeline(&timeline.entries, self.title.as_deref()) {
            Some(html) => output.emit(&html)?,
            None => output.warning(&format!("No entries in {}", self.file.display())),
        }
        Ok(())
    }
}

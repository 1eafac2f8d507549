//! `quill toc` command implementation.

use std::path::PathBuf;

use clap::Args;
use quill_config::{CliSettings, Config};
use quill_site::{load_post, render_toc};

use super::pipeline_from_config;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the toc command.
#[derive(Args)]
pub(crate) struct TocArgs {
    /// Markdown file to extract headings from.
    file: PathBuf,

    /// Path to configuration file (default: auto-discover quill.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl TocArgs {
    /// Execute the toc command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the file cannot be rendered.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), Some(&CliSettings::default()))?;
        let pipeline = pipeline_from_config(&config);

        let post = load_post(&self.file, pipeline.resolver())?;
        let rendered = pipeline
            .render(&post.content)
            .map_err(|source| CliError::Render {
                path: self.file.clone(),
                source,
            })?;

        match render_toc(&rendered.headings) {
            Some(toc) => output.emit(&toc)?,
            None => output.warning(&format!("No headings in {}", self.file.display())),
        }
        Ok(())
    }
}

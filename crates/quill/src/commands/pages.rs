//! `quill pages` command implementation.

use std::path::PathBuf;

use clap::Args;
use quill_config::{CliSettings, Config};
use quill_site::{Page, load_pages};

use super::site_banner;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the pages command.
#[derive(Args)]
pub(crate) struct PagesArgs {
    /// Path to configuration file (default: auto-discover quill.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content directory (overrides config); pages are read from its `pages/`.
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Emit JSON instead of a table.
    #[arg(long)]
    json: bool,
}

impl PagesArgs {
    /// Execute the pages command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or a page cannot be loaded.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let pages = load_pages(&config.content_resolved.pages_dir())?;

        if self.json {
            output.emit(&serde_json::to_string_pretty(&pages)?)?;
            return Ok(());
        }

        output.info(&site_banner(&config.site));
        if pages.is_empty() {
            output.warning("No pages found");
        }
        for page in &pages {
            output.emit(&format_row(page))?;
        }
        Ok(())
    }
}

fn format_row(page: &Page) -> String {
    format!(
        "{}\t{}\t{}",
        page.slug,
        page.meta.title.as_deref().unwrap_or("(untitled)"),
        page.meta.last_updated.as_deref().unwrap_or("-")
    )
}

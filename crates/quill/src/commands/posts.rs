//! `quill posts` command implementation.

use std::path::PathBuf;

use clap::Args;
use quill_config::{CliSettings, Config};
use quill_renderer::AssetResolver;
use quill_site::{Post, TagIndex, load_posts};

use super::site_banner;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the posts command.
#[derive(Args)]
pub(crate) struct PostsArgs {
    /// Path to configuration file (default: auto-discover quill.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Only list posts with this tag (case-insensitive).
    #[arg(short, long)]
    tag: Option<String>,

    /// List tags with post counts instead of posts.
    #[arg(long, conflicts_with = "tag")]
    tags: bool,

    /// Emit JSON instead of a table.
    #[arg(long)]
    json: bool,
}

impl PostsArgs {
    /// Execute the posts command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or a post cannot be loaded.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let resolver = AssetResolver::new(&config.assets.base_url);
        let posts = load_posts(&config.content_resolved.source_dir, &resolver)?;
        let index = TagIndex::from_posts(&posts);

        if self.tags {
            for (tag, count) in index.tags() {
                output.emit(&format!("{tag}\t{count}"))?;
            }
            return Ok(());
        }

        let selected = match &self.tag {
            Some(tag) => select_tagged(&posts, &index, tag),
            None => posts.iter().collect(),
        };

        if self.json {
            output.emit(&serde_json::to_string_pretty(&selected)?)?;
            return Ok(());
        }

        output.info(&site_banner(&config.site));
        if selected.is_empty() {
            output.warning("No posts found");
        } else {
            for post in &selected {
                output.emit(&format_row(post))?;
            }
        }
        Ok(())
    }
}

fn select_tagged<'a>(posts: &'a [Post], index: &TagIndex, tag: &str) -> Vec<&'a Post> {
    let slugs = index.posts_for(tag);
    posts
        .iter()
        .filter(|post| slugs.contains(&post.slug))
        .collect()
}

fn format_row(post: &Post) -> String {
    let mut row = format!(
        "{}\t{}\t{}",
        post.meta.date.as_deref().unwrap_or("-"),
        post.slug,
        post.meta.title.as_deref().unwrap_or("(untitled)")
    );
    if !post.meta.tags.is_empty() {
        row.push_str("\t[");
        row.push_str(&post.meta.tags.join(", "));
        row.push(']');
    }
    row
}

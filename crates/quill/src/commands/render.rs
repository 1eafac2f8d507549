//! `quill render` command implementation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::Args;
use quill_config::{CliSettings, Config};
use quill_renderer::{Heading, Pipeline};
use quill_site::{PostMeta, load_post};
use rayon::prelude::*;
use serde::Serialize;

use super::pipeline_from_config;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown files to render.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Path to configuration file (default: auto-discover quill.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL for relative asset references (overrides config).
    #[arg(long, env = "QUILL_BASE_URL")]
    base_url: Option<String>,

    /// Maximum block nesting depth (overrides config).
    #[arg(long)]
    max_nesting: Option<usize>,

    /// Write `<stem>.html` (or `.json`) files into this directory instead of stdout.
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Emit JSON with post metadata, HTML and headings.
    #[arg(long)]
    json: bool,
}

/// A rendered post as emitted with `--json`.
#[derive(Serialize)]
struct RenderedPost<'a> {
    slug: &'a str,
    #[serde(flatten)]
    meta: &'a PostMeta,
    html: String,
    headings: Vec<Heading>,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, a file cannot be read or
    /// rendered, or output cannot be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        if self.out_dir.is_none() && self.files.len() > 1 {
            return Err(CliError::Validation(
                "rendering several files requires --out-dir".to_owned(),
            ));
        }

        let extension = if self.json { "json" } else { "html" };
        let targets = self
            .out_dir
            .as_deref()
            .map(|out_dir| plan_outputs(out_dir, &self.files, extension))
            .transpose()?;

        let cli_settings = CliSettings {
            base_url: self.base_url.clone(),
            max_nesting: self.max_nesting,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let pipeline = pipeline_from_config(&config);

        let rendered = self
            .files
            .par_iter()
            .map(|path| render_file(&pipeline, path, self.json))
            .collect::<Result<Vec<_>, CliError>>()?;

        let (Some(out_dir), Some(targets)) = (&self.out_dir, targets) else {
            for (_, content) in &rendered {
                output.emit(content)?;
            }
            return Ok(());
        };

        std::fs::create_dir_all(out_dir)?;
        output.info(&format!("Writing to {}", out_dir.display()));
        for ((path, content), target) in rendered.iter().zip(&targets) {
            std::fs::write(target, content)?;
            output.detail(&format!("  {} -> {}", path.display(), target.display()));
        }
        output.success(&format!("Rendered {} file(s)", rendered.len()));

        Ok(())
    }
}

/// Render one post to HTML or JSON.
fn render_file<'p>(
    pipeline: &Pipeline,
    path: &'p Path,
    json: bool,
) -> Result<(&'p Path, String), CliError> {
    let post = load_post(path, pipeline.resolver())?;
    let rendered = pipeline
        .render(&post.content)
        .map_err(|source| CliError::Render {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(
        path = %path.display(),
        headings = rendered.headings.len(),
        "Rendered post"
    );

    let content = if json {
        serde_json::to_string_pretty(&RenderedPost {
            slug: &post.slug,
            meta: &post.meta,
            html: rendered.html,
            headings: rendered.headings,
        })?
    } else {
        rendered.html
    };
    Ok((path, content))
}

/// Output file for `source`: its stem with `extension`, inside `out_dir`.
fn output_path(out_dir: &Path, source: &Path, extension: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map_or_else(|| "index".into(), |stem| stem.to_string_lossy());
    out_dir.join(format!("{stem}.{extension}"))
}

/// Output file for each source, in order.
///
/// Sources that would write the same file (`a/post.md` and `b/post.md`) are
/// rejected before anything is rendered.
fn plan_outputs(
    out_dir: &Path,
    sources: &[PathBuf],
    extension: &str,
) -> Result<Vec<PathBuf>, CliError> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    sources
        .iter()
        .map(|source| {
            let target = output_path(out_dir, source, extension);
            if let Some(previous) = claimed.insert(target.clone(), source) {
                return Err(CliError::Validation(format!(
                    "{} and {} both render to {}",
                    previous.display(),
                    source.display(),
                    target.display()
                )));
            }
            Ok(target)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quill_renderer::AssetResolver;

    use super::*;

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("out"), Path::new("content/hello-world.md"), "html"),
            PathBuf::from("out/hello-world.html")
        );
        assert_eq!(
            output_path(Path::new("out"), Path::new("notes"), "json"),
            PathBuf::from("out/notes.json")
        );
    }

    #[test]
    fn test_plan_outputs() {
        let sources = vec![PathBuf::from("posts/one.md"), PathBuf::from("two.md")];
        assert_eq!(
            plan_outputs(Path::new("out"), &sources, "html").unwrap(),
            vec![PathBuf::from("out/one.html"), PathBuf::from("out/two.html")]
        );
    }

    #[test]
    fn test_plan_outputs_rejects_same_stem() {
        let sources = vec![PathBuf::from("a/post.md"), PathBuf::from("b/post.md")];
        let err = plan_outputs(Path::new("out"), &sources, "json").unwrap_err();
        assert!(matches!(err, CliError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "a/post.md and b/post.md both render to out/post.json"
        );
    }

    #[test]
    fn test_render_file_html() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("post.md");
        std::fs::write(&path, "---\ntitle: Post\n---\n## Hello\n").unwrap();

        let pipeline = Pipeline::new(AssetResolver::new("/assets/"));
        let (_, html) = render_file(&pipeline, &path, false).unwrap();
        assert_eq!(html, r#"<h2 id="hello">Hello</h2>"#);
    }

    #[test]
    fn test_render_file_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("post.md");
        std::fs::write(
            &path,
            "---\ntitle: Post\ntags: a, b\nfeatured: cover.png\n---\n## Hello\n",
        )
        .unwrap();

        let pipeline = Pipeline::new(AssetResolver::new("/assets/"));
        let (_, json) = render_file(&pipeline, &path, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["slug"], "post");
        assert_eq!(value["title"], "Post");
        assert_eq!(value["featured"], "/assets/cover.png");
        assert_eq!(value["tags"], serde_json::json!(["a", "b"]));
        assert_eq!(value["headings"][0]["id"], "hello");
    }

    #[test]
    fn test_render_file_missing() {
        let pipeline = Pipeline::default();
        let err = render_file(&pipeline, Path::new("/nonexistent/post.md"), false).unwrap_err();
        assert!(err.to_string().starts_with("Source file not found"));
    }
}

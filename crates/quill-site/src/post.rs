//! Blog posts and standalone pages.
//!
//! Posts live as `*.md` files directly in the content directory; pages live
//! in its `pages/` subdirectory. The file name without `.md` is the slug.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use quill_renderer::AssetResolver;
use serde::Serialize;

use crate::error::SiteError;
use crate::front_matter::{FrontMatter, RawTags, scalar_to_string};

/// Post metadata derived from front matter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PostMeta {
    pub title: Option<String>,
    pub date: Option<String>,
    pub excerpt: Option<String>,
    /// Resolved featured image URL.
    pub featured: Option<String>,
    /// Trimmed, non-empty, unique tags in authoring order.
    pub tags: Vec<String>,
}

impl PostMeta {
    /// Build post metadata, resolving the featured image through `resolver`.
    #[must_use]
    pub fn from_front_matter(front_matter: FrontMatter, resolver: &AssetResolver) -> Self {
        Self {
            featured: resolver.resolve(front_matter.featured.as_deref()),
            tags: front_matter
                .tags
                .as_ref()
                .map(normalize_tags)
                .unwrap_or_default(),
            title: front_matter.title,
            date: front_matter.date,
            excerpt: front_matter.excerpt,
        }
    }
}

/// A blog post with its markdown body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Post {
    pub slug: String,
    #[serde(flatten)]
    pub meta: PostMeta,
    /// Markdown body without front matter.
    pub content: String,
}

/// Standalone page metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub title: Option<String>,
    #[serde(rename = "lastUpdated")]
    pub last_updated: Option<String>,
}

impl From<FrontMatter> for PageMeta {
    fn from(front_matter: FrontMatter) -> Self {
        Self {
            title: front_matter.title,
            last_updated: front_matter.last_updated,
        }
    }
}

/// A standalone page (about, uses, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page {
    pub slug: String,
    #[serde(flatten)]
    pub meta: PageMeta,
    pub content: String,
}

/// Normalize authored tags.
///
/// Lists keep their scalar items in string form; a single string is split on
/// commas. Either way tags are trimmed, empty ones dropped and duplicates
/// removed keeping the first occurrence.
#[must_use]
pub fn normalize_tags(raw: &RawTags) -> Vec<String> {
    let candidates: Vec<String> = match raw {
        RawTags::List(items) => items.iter().filter_map(scalar_to_string).collect(),
        RawTags::Csv(value) => value.split(',').map(str::to_owned).collect(),
        RawTags::Other(_) => return Vec::new(),
    };

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .map(|tag| tag.trim().to_owned())
        .filter(|tag| !tag.is_empty() && seen.insert(tag.clone()))
        .collect()
}

/// Order posts newest first.
///
/// Dates compare as strings; posts without a date sort last. The sort is
/// stable, so posts sharing a date keep their input order.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.meta.date.cmp(&a.meta.date));
}

/// Load one post from a markdown file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its front matter is invalid.
pub fn load_post(path: &Path, resolver: &AssetResolver) -> Result<Post, SiteError> {
    let (front_matter, content) = read_content(path)?;
    Ok(Post {
        slug: slug_from_path(path),
        meta: PostMeta::from_front_matter(front_matter, resolver),
        content,
    })
}

/// Load every post in `dir`, newest first.
///
/// Only regular `*.md` files directly inside `dir` are posts; subdirectories
/// such as `pages/` are skipped.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed or any post fails to
/// load.
pub fn load_posts(dir: &Path, resolver: &AssetResolver) -> Result<Vec<Post>, SiteError> {
    let entries = fs::read_dir(dir).map_err(|e| SiteError::io(dir, e))?;

    let mut posts = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| SiteError::io(dir, e))?.path();
        if path.is_file() && is_markdown(&path) {
            posts.push(load_post(&path, resolver)?);
        }
    }

    sort_newest_first(&mut posts);
    tracing::debug!(dir = %dir.display(), count = posts.len(), "Loaded posts");
    Ok(posts)
}

/// Load one page from a markdown file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its front matter is invalid.
pub fn load_page(path: &Path) -> Result<Page, SiteError> {
    let (front_matter, content) = read_content(path)?;
    Ok(Page {
        slug: slug_from_path(path),
        meta: PageMeta::from(front_matter),
        content,
    })
}

/// Load every markdown page in `dir`, ordered by slug.
///
/// A missing directory means the site has no pages.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed or a page fails to load.
pub fn load_pages(dir: &Path) -> Result<Vec<Page>, SiteError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(SiteError::io(dir, e)),
    };

    let mut pages = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| SiteError::io(dir, e))?.path();
        if path.is_file() && is_markdown(&path) {
            pages.push(load_page(&path)?);
        }
    }

    pages.sort_by(|a, b| a.slug.cmp(&b.slug));
    tracing::debug!(dir = %dir.display(), count = pages.len(), "Loaded pages");
    Ok(pages)
}

fn read_content(path: &Path) -> Result<(FrontMatter, String), SiteError> {
    let source = fs::read_to_string(path).map_err(|e| SiteError::io(path, e))?;
    let (front_matter, body) =
        FrontMatter::parse(&source).map_err(|source| SiteError::FrontMatter {
            path: path.to_path_buf(),
            source,
        })?;
    Ok((front_matter, body.to_owned()))
}

fn slug_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

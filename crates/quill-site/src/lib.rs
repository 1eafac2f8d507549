//! Blog content for Quill.
//!
//! Loads posts and pages from a content directory, indexes tags, reads
//! timeline data and renders the small HTML components blog pages share
//! (table of contents, tag list, timeline).
//!
//! # Example
//!
//! ```
//! use quill_renderer::AssetResolver;
//! use quill_site::{FrontMatter, PostMeta, render_tag_list};
//!
//! let (front_matter, body) =
//!     FrontMatter::parse("---\ntags: rust, web, rust\nfeatured: cover.png\n---\nHello").unwrap();
//! let meta = PostMeta::from_front_matter(front_matter, &AssetResolver::new("/assets/"));
//!
//! assert_eq!(body, "Hello");
//! assert_eq!(meta.tags, ["rust", "web"]);
//! assert_eq!(meta.featured.as_deref(), Some("/assets/cover.png"));
//! assert!(render_tag_list(&meta.tags, Some("Rust"), None).unwrap().contains("aria-current"));
//! ```

mod components;
mod error;
mod front_matter;
mod post;
mod tags;
mod timeline;

pub use components::{
    DEFAULT_TIMELINE_TITLE, TOC_TITLE, render_tag_list, render_timeline, render_toc,
};
pub use error::{FrontMatterError, SiteError, TimelineError};
pub use front_matter::{FrontMatter, RawTags, split_front_matter};
pub use post::{
    Page, PageMeta, Post, PostMeta, load_page, load_pages, load_post, load_posts,
    normalize_tags, sort_newest_first,
};
pub use tags::{TagIndex, tag_href, tags_match};
pub use timeline::{Timeline, TimelineEntry};

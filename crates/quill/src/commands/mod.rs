//! CLI command implementations.

pub(crate) mod pages;
pub(crate) mod posts;
pub(crate) mod render;
pub(crate) mod timeline;
pub(crate) mod toc;

pub(crate) use pages::PagesArgs;
pub(crate) use posts::PostsArgs;
pub(crate) use render::RenderArgs;
pub(crate) use timeline::TimelineArgs;
pub(crate) use toc::TocArgs;

use quill_config::{Config, SiteConfig};
use quill_renderer::{AssetResolver, Pipeline};

/// Build the rendering pipeline described by the configuration.
pub(crate) fn pipeline_from_config(config: &Config) -> Pipeline {
    Pipeline::new(AssetResolver::new(&config.assets.base_url))
        .with_max_nesting(config.content_resolved.max_nesting)
}

/// One-line site heading printed above listings.
pub(crate) fn site_banner(site: &SiteConfig) -> String {
    let description = site.description.trim();
    if description.is_empty() {
        site.name.clone()
    } else {
        format!("{} - {description}", site.name)
    }
}

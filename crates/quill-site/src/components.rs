//! HTML fragments shared by blog pages.
//!
//! Each component renders to `None` when there is nothing to show, so callers
//! can skip the surrounding markup entirely.

use quill_renderer::{Element, Heading, Node, node_to_html};

use crate::tags::{tag_href, tags_match};
use crate::timeline::TimelineEntry;

/// Heading of the table of contents.
pub const TOC_TITLE: &str = "Contents";

/// Heading of a timeline rendered without an explicit title.
pub const DEFAULT_TIMELINE_TITLE: &str = "Timeline";

/// Render the table of contents for a post.
///
/// Each entry is indented by its depth below `h2` via a `toc-level-N` class.
#[must_use]
pub fn render_toc(headings: &[Heading]) -> Option<String> {
    if headings.is_empty() {
        return None;
    }

    let mut list = Element::new("ul");
    for heading in headings {
        let depth = heading.level.saturating_sub(2);
        let link = Element::new("a")
            .with_attr("href", format!("#{}", heading.id))
            .with_text(heading.text.as_str());
        list.children.push(
            Element::new("li")
                .with_attr("class", format!("toc-level-{depth}"))
                .with_child(link)
                .into(),
        );
    }

    let nav = Element::new("nav")
        .with_attr("class", "toc")
        .with_attr("aria-label", TOC_TITLE)
        .with_child(
            Element::new("h3")
                .with_attr("class", "toc-title")
                .with_text(TOC_TITLE),
        )
        .with_child(list);
    Some(render(nav))
}

/// Render links to tag pages.
///
/// The tag matching `active` (case-insensitively) is marked with an
/// `is-active` class and `aria-current="true"`. `class` is appended to the
/// container's classes.
#[must_use]
pub fn render_tag_list(
    tags: &[String],
    active: Option<&str>,
    class: Option<&str>,
) -> Option<String> {
    if tags.is_empty() {
        return None;
    }

    let container_class = match class {
        Some(extra) if !extra.trim().is_empty() => format!("tag-list {}", extra.trim()),
        _ => "tag-list".to_owned(),
    };
    let mut container = Element::new("div").with_attr("class", container_class);

    for tag in tags {
        let is_active = active.is_some_and(|active| tags_match(tag, active));
        let mut link = Element::new("a")
            .with_attr("href", tag_href(tag))
            .with_attr("class", if is_active { "tag is-active" } else { "tag" });
        if is_active {
            link.attrs.set("aria-current", "true");
        }
        container.children.push(link.with_text(tag.as_str()).into());
    }

    Some(render(container))
}

/// Render a titled timeline.
#[must_use]
pub fn render_timeline(entries: &[TimelineEntry], title: Option<&str>) -> Option<String> {
    if entries.is_empty() {
        return None;
    }

    let mut list = Element::new("ol").with_attr("class", "timeline-entries");
    for entry in entries {
        list.children.push(timeline_item(entry).into());
    }

    let section = Element::new("section")
        .with_attr("class", "timeline")
        .with_child(
            Element::new("span")
                .with_attr("class", "timeline-title")
                .with_text(title.unwrap_or(DEFAULT_TIMELINE_TITLE)),
        )
        .with_child(list);
    Some(render(section))
}

fn timeline_item(entry: &TimelineEntry) -> Element {
    let year = Element::new("span")
        .with_attr("class", "timeline-year")
        .with_text(entry.year.as_str());
    let mut badges = Element::new("div")
        .with_attr("class", "timeline-badges")
        .with_child(year);
    if let Some(category) = non_empty(entry.category.as_deref()) {
        badges = badges.with_child(
            Element::new("span")
                .with_attr("class", "timeline-category")
                .with_text(category),
        );
    }

    let mut item = Element::new("li")
        .with_child(badges)
        .with_child(Element::new("h3").with_text(entry.place.as_str()));
    if let Some(role) = non_empty(entry.role.as_deref()) {
        item = item.with_child(
            Element::new("p")
                .with_attr("class", "timeline-role")
                .with_text(role),
        );
    }
    if let Some(detail) = non_empty(entry.detail.as_deref()) {
        item = item.with_child(
            Element::new("p")
                .with_attr("class", "timeline-detail")
                .with_text(detail),
        );
    }
    item
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn render(element: Element) -> String {
    node_to_html(&Node::Element(element))
}

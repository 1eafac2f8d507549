//! Heading anchors and table of contents extraction.

use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;

use crate::tree::{Document, Element};

/// Heading levels that appear in the table of contents.
pub const TOC_LEVELS: RangeInclusive<u8> = 2..=4;

/// Slug used when a heading has no sluggable characters.
const FALLBACK_SLUG: &str = "section";

/// Heading descriptor for the table of contents.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Heading {
    /// Anchor id, unique within the document.
    pub id: String,
    /// Heading text content.
    pub text: String,
    /// Heading level (1-6).
    pub level: u8,
}

/// Give every heading a unique `id` and collect table of contents entries.
///
/// Ids already present on headings (from `{#custom-id}` attributes) are kept
/// and reserved before any slug is generated, so a generated slug never takes
/// an explicit anchor. Returned descriptors cover [`TOC_LEVELS`] only, in
/// document order.
pub fn anchor_headings(document: &mut Document) -> Vec<Heading> {
    let mut anchors = HeadingAnchors::default();
    document.for_each_element_mut(|element| {
        if heading_level(&element.tag).is_some()
            && let Some(id) = element.attr("id")
        {
            anchors.reserve(id);
        }
    });

    let mut headings = Vec::new();
    document.for_each_element_mut(|element| {
        let Some(level) = heading_level(&element.tag) else {
            return;
        };
        let text = element.text_content().trim().to_owned();
        let id = anchors.assign(element, &text);
        element.attrs.set("id", id.clone());
        if TOC_LEVELS.contains(&level) {
            headings.push(Heading { id, text, level });
        }
    });
    headings
}

/// Tracks ids handed out within a document.
#[derive(Default)]
struct HeadingAnchors {
    /// Explicit ids found on headings, not yet claimed.
    reserved: HashSet<String>,
    /// Every id handed out so far.
    used: HashSet<String>,
    /// Last suffix tried per base slug.
    counts: HashMap<String, usize>,
}

impl HeadingAnchors {
    fn reserve(&mut self, id: &str) {
        self.reserved.insert(id.to_owned());
    }

    fn assign(&mut self, element: &Element, text: &str) -> String {
        if let Some(existing) = element.attr("id").filter(|id| !id.is_empty()) {
            if self.reserved.remove(existing) {
                self.used.insert(existing.to_owned());
                return existing.to_owned();
            }
            return self.unique(existing);
        }
        self.unique(&slugify(text))
    }

    fn unique(&mut self, base: &str) -> String {
        if !self.is_taken(base) {
            self.used.insert(base.to_owned());
            return base.to_owned();
        }
        let count = self.counts.entry(base.to_owned()).or_default();
        loop {
            *count += 1;
            let candidate = format!("{base}-{count}");
            if !self.used.contains(&candidate) && !self.reserved.contains(&candidate) {
                self.used.insert(candidate.clone());
                return candidate;
            }
        }
    }

    fn is_taken(&self, id: &str) -> bool {
        self.used.contains(id) || self.reserved.contains(id)
    }
}

/// Numeric level for `h1`..`h6` tags.
#[must_use]
pub fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Convert heading text to an anchor slug.
///
/// Lowercases, turns whitespace runs into a single `-`, and strips everything
/// outside `[a-z0-9_-]`. Falls back to `section` when nothing is left.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_whitespace = false;

    for c in text.trim().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                result.push('-');
                in_whitespace = true;
            }
            continue;
        }
        in_whitespace = false;
        for lower in c.to_lowercase() {
            if lower.is_ascii_alphanumeric() || lower == '_' || lower == '-' {
                result.push(lower);
            }
        }
    }

    if result.is_empty() {
        FALLBACK_SLUG.to_owned()
    } else {
        result
    }
}

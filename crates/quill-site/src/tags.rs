//! Tag index and tag page links.

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::post::Post;

/// Characters left unescaped in a URL path segment built from a tag.
const TAG_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Link to the page listing posts with `tag`.
#[must_use]
pub fn tag_href(tag: &str) -> String {
    format!("/tags/{}", utf8_percent_encode(tag, TAG_ENCODE_SET))
}

/// Check whether two tags name the same tag.
#[must_use]
pub fn tags_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Tags mapped to the slugs of posts carrying them.
///
/// Tags that differ only in case share an entry; the first spelling seen is
/// kept for display.
#[derive(Clone, Debug, Default)]
pub struct TagIndex {
    entries: BTreeMap<String, TagEntry>,
}

#[derive(Clone, Debug)]
struct TagEntry {
    name: String,
    slugs: Vec<String>,
}

impl TagIndex {
    /// Index posts in the given order.
    #[must_use]
    pub fn from_posts(posts: &[Post]) -> Self {
        let mut index = Self::default();
        for post in posts {
            for tag in &post.meta.tags {
                index.insert(tag, &post.slug);
            }
        }
        index
    }

    fn insert(&mut self, tag: &str, slug: &str) {
        let entry = self
            .entries
            .entry(tag.to_lowercase())
            .or_insert_with(|| TagEntry {
                name: tag.to_owned(),
                slugs: Vec::new(),
            });
        if !entry.slugs.iter().any(|s| s == slug) {
            entry.slugs.push(slug.to_owned());
        }
    }

    /// Slugs of posts tagged `tag`, case-insensitively.
    #[must_use]
    pub fn posts_for(&self, tag: &str) -> &[String] {
        self.entries
            .get(&tag.to_lowercase())
            .map(|entry| entry.slugs.as_slice())
            .unwrap_or_default()
    }

    /// All tags with their post counts, sorted case-insensitively.
    pub fn tags(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries
            .values()
            .map(|entry| (entry.name.as_str(), entry.slugs.len()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

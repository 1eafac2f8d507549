//! Content asset URL resolution.
//!
//! Posts reference images and other assets relative to the content
//! directory (`./img.png`, `diagrams/flow.svg`). [`AssetResolver`] maps those
//! references onto the location the assets are served from.

use std::sync::LazyLock;

use regex::Regex;

/// URL scheme prefix (`https:`, `data:`, `mailto:`, ...).
static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*:").expect("invalid scheme regex"));

/// Resolves content-relative asset references to servable URLs.
///
/// Resolution is a pure function of the configured base and the input:
/// references that are already absolute pass through untouched, relative
/// ones are joined to the base. Because the base itself is always absolute
/// or site-rooted, resolving an already resolved URL returns it unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetResolver {
    base_url: String,
}

impl AssetResolver {
    /// Create a resolver for the given base location.
    ///
    /// The base is normalized to end with `/`. A base that is neither an
    /// absolute URL nor site-rooted is treated as site-rooted.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let trimmed = base_url.trim();
        let mut base = if is_absolute(trimmed) {
            trimmed.to_owned()
        } else {
            format!("/{trimmed}")
        };
        if !base.ends_with('/') {
            base.push('/');
        }
        Self { base_url: base }
    }

    /// Normalized base location.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve an asset reference.
    ///
    /// Returns `None` for absent or blank input. References that need no
    /// resolving come back exactly as given, surrounding whitespace included.
    #[must_use]
    pub fn resolve(&self, reference: Option<&str>) -> Option<String> {
        let original = reference?;
        let reference = original.trim();
        if reference.is_empty() {
            return None;
        }
        if is_absolute(reference) {
            return Some(original.to_owned());
        }

        let split_at = reference.find(['?', '#']).unwrap_or(reference.len());
        let (path, suffix) = reference.split_at(split_at);

        let mut segments: Vec<&str> = Vec::new();
        for component in path.split('/') {
            match component {
                "" | "." => {}
                ".." => {
                    // Never climb above the base
                    segments.pop();
                }
                _ => segments.push(component),
            }
        }

        Some(format!("{}{}{suffix}", self.base_url, segments.join("/")))
    }
}

impl Default for AssetResolver {
    fn default() -> Self {
        Self::new("/")
    }
}

/// Site-rooted, protocol-relative, fragment-only, or carrying a URL scheme.
fn is_absolute(reference: &str) -> bool {
    reference.starts_with('/') || reference.starts_with('#') || SCHEME_RE.is_match(reference)
}

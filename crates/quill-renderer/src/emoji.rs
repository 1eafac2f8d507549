//! Emoji shortcode substitution (`:tada:` → 🎉).

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::math::MATH_ATTR;
use crate::tree::{Document, Node};

static SHORTCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([a-zA-Z0-9_+\-]+):").expect("invalid shortcode regex"));

/// Elements whose text is never touched.
const SKIPPED_ELEMENTS: &[&str] = &["code", "pre"];

/// Replace known shortcodes in all text outside code and math.
pub fn replace_emoji(document: &mut Document) {
    replace_in_nodes(&mut document.children);
}

fn replace_in_nodes(nodes: &mut [Node]) {
    for node in nodes {
        match node {
            Node::Text(text) => {
                if let Cow::Owned(replaced) = replace_shortcodes(text) {
                    *text = replaced;
                }
            }
            Node::Element(element) => {
                if SKIPPED_ELEMENTS.contains(&element.tag.as_str())
                    || element.attr(MATH_ATTR).is_some()
                {
                    continue;
                }
                replace_in_nodes(&mut element.children);
            }
        }
    }
}

/// Replace shortcodes in a string. Unknown shortcodes are kept as written.
#[must_use]
pub fn replace_shortcodes(text: &str) -> Cow<'_, str> {
    if !text.contains(':') {
        return Cow::Borrowed(text);
    }
    SHORTCODE_RE.replace_all(text, |caps: &Captures<'_>| {
        emojis::get_by_shortcode(&caps[1])
            .map_or_else(|| caps[0].to_owned(), |emoji| emoji.as_str().to_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::to_html;
    use crate::tree::Element;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_known_shortcode() {
        assert_eq!(replace_shortcodes("Ship it :rocket:"), "Ship it \u{1f680}");
        assert_eq!(replace_shortcodes(":+1:"), "\u{1f44d}");
    }

    #[test]
    fn test_unknown_shortcode_kept() {
        assert_eq!(replace_shortcodes(":not_an_emoji_at_all:"), ":not_an_emoji_at_all:");
        assert_eq!(replace_shortcodes("at 10:30:45"), "at 10:30:45");
    }

    #[test]
    fn test_no_colon_is_borrowed() {
        assert!(matches!(replace_shortcodes("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_code_and_math_skipped() {
        let mut document = Document::new(vec![
            Element::new("p")
                .with_text(":rocket: ")
                .with_child(Element::new("code").with_text(":rocket:"))
                .with_child(
                    Element::new("span")
                        .with_attr(MATH_ATTR, "inline")
                        .with_text(":rocket:"),
                )
                .into(),
            Element::new("pre")
                .with_child(Element::new("code").with_text(":rocket:"))
                .into(),
        ]);
        replace_emoji(&mut document);
        assert_eq!(
            to_html(&document),
            "<p>\u{1f680} <code>:rocket:</code><span data-math=\"inline\">:rocket:</span></p>\
             <pre><code>:rocket:</code></pre>"
        );
    }
}

//! YAML front matter at the top of content files.
//!
//! A content file may start with a block delimited by `---` lines:
//!
//! ```text
//! ---
//! title: Hello
//! date: 2024-05-01
//! tags: [rust, web]
//! ---
//! Body markdown...
//! ```
//!
//! Unknown keys are ignored. Scalar values that YAML reads as numbers or
//! booleans (`date: 2024`, `tags: [2024, true]`) are kept as their string
//! form.

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

use crate::error::FrontMatterError;

/// Front matter fields understood by posts and pages.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct FrontMatter {
    #[serde(default, deserialize_with = "scalar_string")]
    pub title: Option<String>,
    /// Publication date, compared lexically (ISO-8601 sorts correctly).
    #[serde(default, deserialize_with = "scalar_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub excerpt: Option<String>,
    /// Featured image reference, resolved like inline images.
    #[serde(default, deserialize_with = "scalar_string")]
    pub featured: Option<String>,
    #[serde(default)]
    pub tags: Option<RawTags>,
    /// Last edit date of a standalone page.
    #[serde(default, rename = "lastUpdated", deserialize_with = "scalar_string")]
    pub last_updated: Option<String>,
}

/// Tags as written by the author.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawTags {
    /// `tags: [a, b]` or a block sequence.
    List(Vec<Value>),
    /// `tags: "a, b"`.
    Csv(String),
    /// Anything else; yields no tags.
    Other(Value),
}

impl FrontMatter {
    /// Parse front matter from the YAML between the delimiters.
    ///
    /// Empty content yields the default (all fields unset).
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or is not a mapping.
    pub fn from_yaml(content: &str) -> Result<Self, FrontMatterError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(trimmed).map_err(|e| FrontMatterError(format!("Invalid YAML: {e}")))
    }

    /// Split a content file and parse its front matter.
    ///
    /// Files without front matter get the default and their full text as body.
    ///
    /// # Errors
    ///
    /// Returns an error if a front matter block is present but invalid.
    pub fn parse(source: &str) -> Result<(Self, &str), FrontMatterError> {
        match split_front_matter(source) {
            (Some(yaml), body) => Ok((Self::from_yaml(yaml)?, body)),
            (None, body) => Ok((Self::default(), body)),
        }
    }
}

/// Split `source` into its front matter block (without delimiters) and body.
///
/// The opening `---` must be the very first line. If no closing `---` line
/// follows, the whole source is treated as body.
#[must_use]
pub fn split_front_matter(source: &str) -> (Option<&str>, &str) {
    let Some(rest) = source.strip_prefix("---") else {
        return (None, source);
    };
    let Some(rest) = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
    else {
        return (None, source);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, source)
}

/// String form of a YAML scalar. Collections and null have none.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_to_string))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_split_front_matter() {
        let (yaml, body) = split_front_matter("---\ntitle: Hi\n---\n# Body\n");
        assert_eq!(yaml, Some("title: Hi\n"));
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn test_split_front_matter_crlf() {
        let (yaml, body) = split_front_matter("---\r\ntitle: Hi\r\n---\r\nBody");
        assert_eq!(yaml, Some("title: Hi\r\n"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_split_front_matter_empty_block() {
        assert_eq!(split_front_matter("---\n---\nBody"), (Some(""), "Body"));
    }

    #[test]
    fn test_split_without_front_matter() {
        assert_eq!(split_front_matter("# Title\n"), (None, "# Title\n"));
        assert_eq!(split_front_matter("----\n"), (None, "----\n"));
    }

    #[test]
    fn test_split_unclosed_front_matter() {
        let source = "---\ntitle: Hi\n\nBody";
        assert_eq!(split_front_matter(source), (None, source));
    }

    #[test]
    fn test_from_yaml_fields() {
        let fm = FrontMatter::from_yaml(
            "title: Hello\ndate: 2024-05-01\nexcerpt: Short\nfeatured: ./cover.png\nextra: 1",
        )
        .unwrap();

        assert_eq!(fm.title.as_deref(), Some("Hello"));
        assert_eq!(fm.date.as_deref(), Some("2024-05-01"));
        assert_eq!(fm.excerpt.as_deref(), Some("Short"));
        assert_eq!(fm.featured.as_deref(), Some("./cover.png"));
        assert_eq!(fm.tags, None);
    }

    #[test]
    fn test_from_yaml_numeric_scalars() {
        let fm = FrontMatter::from_yaml("title: 1984\ndate: 2024").unwrap();
        assert_eq!(fm.title.as_deref(), Some("1984"));
        assert_eq!(fm.date.as_deref(), Some("2024"));
    }

    #[test]
    fn test_from_yaml_tag_shapes() {
        let list = FrontMatter::from_yaml("tags: [rust, 2024]").unwrap();
        assert!(matches!(list.tags, Some(RawTags::List(ref items)) if items.len() == 2));

        let csv = FrontMatter::from_yaml("tags: rust, web").unwrap();
        assert_eq!(csv.tags, Some(RawTags::Csv("rust, web".to_owned())));

        let other = FrontMatter::from_yaml("tags:\n  a: b").unwrap();
        assert!(matches!(other.tags, Some(RawTags::Other(_))));
    }

    #[test]
    fn test_from_yaml_last_updated() {
        let fm = FrontMatter::from_yaml("title: About\nlastUpdated: 2024-02-03").unwrap();
        assert_eq!(fm.last_updated.as_deref(), Some("2024-02-03"));
    }

    #[test]
    fn test_from_yaml_empty() {
        assert_eq!(FrontMatter::from_yaml("  \n").unwrap(), FrontMatter::default());
    }

    #[test]
    fn test_from_yaml_invalid() {
        let err = FrontMatter::from_yaml("title: [unclosed").unwrap_err();
        assert!(err.to_string().starts_with("Invalid YAML:"));
    }

    #[test]
    fn test_parse_returns_body() {
        let (fm, body) = FrontMatter::parse("---\ntitle: Hi\n---\nText").unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hi"));
        assert_eq!(body, "Text");
    }
}

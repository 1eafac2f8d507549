//! Syntax highlighting of code blocks.
//!
//! [`SyntaxHighlighter`] finds `<pre><code class="language-…">` blocks, labels
//! the `pre` with a `data-language` badge and replaces the code text with
//! token spans:
//!
//! ```html
//! <pre data-language="JS"><code class="language-js"><span class="token storage type js">const</span> …</code></pre>
//! ```
//!
//! Tokenization goes through the [`Tokenizer`] trait; [`SyntectTokenizer`] is
//! the default implementation.

mod grammar;
mod language;

pub use grammar::SyntectTokenizer;
pub use language::{IGNORED_LANGUAGES, canonical_language, is_ignored, language_label};

use crate::tree::{Document, Element, Node};

/// Class prefix declaring a code block language.
const LANGUAGE_PREFIX: &str = "language-";

/// A classified fragment of source code.
///
/// Concatenating the text of all tokens returned for a code block yields
/// the code block text exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// Unclassified text.
    Plain(String),
    /// Classified span; its content may itself contain tokens.
    Classified {
        kind: String,
        aliases: Vec<String>,
        content: Vec<Token>,
    },
}

impl Token {
    /// Source text covered by this token.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Plain(text) => out.push_str(text),
            Self::Classified { content, .. } => {
                for token in content {
                    token.collect_text(out);
                }
            }
        }
    }
}

/// Error from a [`Tokenizer`].
#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    #[error("no grammar for language '{0}'")]
    UnknownLanguage(String),

    #[error("tokenizer failed: {0}")]
    Tokenize(String),
}

/// Splits source code into classified tokens.
pub trait Tokenizer: Send + Sync {
    /// Check whether a grammar is registered for the language.
    fn has_grammar(&self, language: &str) -> bool;

    /// Tokenize code with the language's grammar.
    fn tokenize(&self, language: &str, code: &str) -> Result<Vec<Token>, HighlightError>;
}

/// Highlights code blocks in a document.
pub struct SyntaxHighlighter<'t> {
    tokenizer: &'t dyn Tokenizer,
}

impl<'t> SyntaxHighlighter<'t> {
    #[must_use]
    pub fn new(tokenizer: &'t dyn Tokenizer) -> Self {
        Self { tokenizer }
    }

    /// Highlight every eligible code block in place.
    pub fn highlight(&self, document: &mut Document) {
        self.visit(&mut document.children);
    }

    fn visit(&self, nodes: &mut [Node]) {
        for node in nodes {
            let Node::Element(element) = node else {
                continue;
            };
            if element.tag == "pre" {
                self.highlight_block(element);
            } else {
                self.visit(&mut element.children);
            }
        }
    }

    fn highlight_block(&self, pre: &mut Element) {
        let Some(code_index) = pre.children.iter().position(|child| child.is_element("code"))
        else {
            return;
        };
        let Some(language) = pre.children[code_index]
            .as_element()
            .and_then(declared_language)
        else {
            return;
        };
        if is_ignored(&language) {
            return;
        }

        pre.attrs.set("data-language", language_label(&language));

        let canonical = canonical_language(&language);
        let Some(grammar) = [canonical, language.as_str()]
            .into_iter()
            .find(|name| self.tokenizer.has_grammar(name))
        else {
            tracing::debug!(language = %language, "No grammar registered, skipping highlighting");
            return;
        };

        let Some(code) = pre.children[code_index].as_element_mut() else {
            return;
        };
        let source = code.text_content();
        match self.tokenizer.tokenize(grammar, &source) {
            Ok(tokens) => code.children = tokens_to_nodes(tokens),
            Err(e) => {
                tracing::debug!(language = %language, error = %e, "Highlighting failed");
            }
        }
    }
}

/// Lowercased language from the first `language-*` class.
fn declared_language(code: &Element) -> Option<String> {
    code.class_names()
        .find_map(|class| class.strip_prefix(LANGUAGE_PREFIX))
        .filter(|language| !language.is_empty())
        .map(str::to_lowercase)
}

/// Convert tokens to tree nodes.
///
/// Plain text becomes text nodes (adjacent ones merged); classified tokens
/// become `span.token` elements. Tokens without text are dropped.
#[must_use]
pub fn tokens_to_nodes(tokens: Vec<Token>) -> Vec<Node> {
    let mut nodes: Vec<Node> = Vec::with_capacity(tokens.len());
    for token in tokens {
        match token {
            Token::Plain(text) => {
                if text.is_empty() {
                    continue;
                }
                if let Some(Node::Text(last)) = nodes.last_mut() {
                    last.push_str(&text);
                } else {
                    nodes.push(Node::Text(text));
                }
            }
            Token::Classified {
                kind,
                aliases,
                content,
            } => {
                let children = tokens_to_nodes(content);
                if children.is_empty() {
                    continue;
                }
                let mut classes = Vec::with_capacity(aliases.len() + 2);
                classes.push("token");
                classes.push(kind.as_str());
                classes.extend(aliases.iter().map(String::as_str));
                nodes.push(
                    Element {
                        tag: "span".to_owned(),
                        children,
                        ..Element::default()
                    }
                    .with_attr("class", classes.join(" "))
                    .into(),
                );
            }
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::to_html;
    use pretty_assertions::assert_eq;

    /// Splits on spaces; words become `word` tokens.
    struct WordTokenizer;

    impl Tokenizer for WordTokenizer {
        fn has_grammar(&self, language: &str) -> bool {
            language == "words"
        }

        fn tokenize(&self, _language: &str, code: &str) -> Result<Vec<Token>, HighlightError> {
            Ok(code
                .split_inclusive(' ')
                .flat_map(|part| {
                    let word = part.trim_end_matches(' ');
                    let mut tokens = vec![Token::Classified {
                        kind: "word".to_owned(),
                        aliases: vec![],
                        content: vec![Token::Plain(word.to_owned())],
                    }];
                    if word.len() < part.len() {
                        tokens.push(Token::Plain(part[word.len()..].to_owned()));
                    }
                    tokens
                })
                .collect())
        }
    }

    struct BrokenTokenizer;

    impl Tokenizer for BrokenTokenizer {
        fn has_grammar(&self, _language: &str) -> bool {
            true
        }

        fn tokenize(&self, _language: &str, _code: &str) -> Result<Vec<Token>, HighlightError> {
            Err(HighlightError::Tokenize("boom".to_owned()))
        }
    }

    fn code_block(language: Option<&str>, code: &str) -> Document {
        let mut element = Element::new("code");
        if let Some(language) = language {
            element.attrs.set("class", format!("language-{language}"));
        }
        Document::new(vec![
            Element::new("pre")
                .with_child(element.with_text(code))
                .into(),
        ])
    }

    fn highlight(tokenizer: &dyn Tokenizer, mut document: Document) -> String {
        SyntaxHighlighter::new(tokenizer).highlight(&mut document);
        to_html(&document)
    }

    #[test]
    fn test_tokens_replace_code_text() {
        let html = highlight(&WordTokenizer, code_block(Some("Words"), "a b"));
        assert_eq!(
            html,
            "<pre data-language=\"WORDS\"><code class=\"language-Words\">\
             <span class=\"token word\">a</span> <span class=\"token word\">b</span>\
             </code></pre>"
        );
    }

    #[test]
    fn test_no_language_untouched() {
        let html = highlight(&WordTokenizer, code_block(None, "a b"));
        assert_eq!(html, "<pre><code>a b</code></pre>");
    }

    #[test]
    fn test_ignored_language_untouched() {
        let html = highlight(&WordTokenizer, code_block(Some("text"), "a <b>"));
        assert_eq!(
            html,
            "<pre><code class=\"language-text\">a &lt;b&gt;</code></pre>"
        );
    }

    #[test]
    fn test_unknown_grammar_gets_label_only() {
        let html = highlight(&WordTokenizer, code_block(Some("js"), "const a = 1;"));
        assert_eq!(
            html,
            "<pre data-language=\"JS\"><code class=\"language-js\">const a = 1;</code></pre>"
        );
    }

    #[test]
    fn test_tokenizer_failure_gets_label_only() {
        let html = highlight(&BrokenTokenizer, code_block(Some("cs"), "var x;"));
        assert_eq!(
            html,
            "<pre data-language=\"C#\"><code class=\"language-cs\">var x;</code></pre>"
        );
    }

    #[test]
    fn test_tokens_to_nodes_nesting_and_aliases() {
        let tokens = vec![
            Token::Plain("a".to_owned()),
            Token::Plain("b".to_owned()),
            Token::Classified {
                kind: "string".to_owned(),
                aliases: vec!["quoted".to_owned()],
                content: vec![
                    Token::Plain("\"".to_owned()),
                    Token::Classified {
                        kind: "escape".to_owned(),
                        aliases: vec![],
                        content: vec![Token::Plain("\\n".to_owned())],
                    },
                    Token::Plain("\"".to_owned()),
                ],
            },
            Token::Classified {
                kind: "empty".to_owned(),
                aliases: vec![],
                content: vec![],
            },
        ];
        let document = Document::new(tokens_to_nodes(tokens));
        assert_eq!(
            to_html(&document),
            "ab<span class=\"token string quoted\">&quot;\
             <span class=\"token escape\">\\n</span>&quot;</span>"
        );
    }

    #[test]
    fn test_token_text() {
        let token = Token::Classified {
            kind: "k".to_owned(),
            aliases: vec![],
            content: vec![Token::Plain("x".to_owned()), Token::Plain("y".to_owned())],
        };
        assert_eq!(token.text(), "xy");
    }
}

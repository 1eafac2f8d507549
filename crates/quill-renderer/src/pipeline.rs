//! The Markdown → HTML pipeline.

use pulldown_cmark::{Options, Parser, TextMergeStream};

use crate::assets::AssetResolver;
use crate::builder::TreeBuilder;
use crate::emoji::replace_emoji;
use crate::error::RenderError;
use crate::figure::FigureRewriter;
use crate::gfm::AutolinkLiterals;
use crate::headings::{Heading, anchor_headings};
use crate::highlight::{SyntaxHighlighter, SyntectTokenizer, Tokenizer};
use crate::html::to_html;
use crate::math::{MathMlRenderer, MathRenderer, render_math};
use crate::tree::Document;

/// Default limit on nested block and inline elements.
pub const DEFAULT_MAX_NESTING: usize = 128;

/// Result of rendering a document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderedDocument {
    /// HTML fragment for the page body.
    pub html: String,
    /// Table of contents entries (levels 2-4) in document order.
    pub headings: Vec<Heading>,
}

/// Renders Markdown to HTML.
///
/// Holds only immutable configuration, so one pipeline can render any
/// number of documents, including from several threads at once. Output is a
/// pure function of the input text and the configuration.
///
/// # Example
///
/// ```
/// use quill_renderer::{AssetResolver, Pipeline};
///
/// let pipeline = Pipeline::new(AssetResolver::new("/assets/"));
/// let rendered = pipeline.render("## Hello\n\nHi :wave: ![Cat](cat.png)").unwrap();
///
/// assert!(rendered.html.contains(r#"<h2 id="hello">Hello</h2>"#));
/// assert!(rendered.html.contains("Hi \u{1f44b}"));
/// assert!(rendered.html.contains(r#"src="/assets/cat.png""#));
/// assert_eq!(rendered.headings[0].id, "hello");
/// ```
pub struct Pipeline {
    resolver: AssetResolver,
    tokenizer: Box<dyn Tokenizer>,
    math: Box<dyn MathRenderer>,
    max_nesting: usize,
}

impl Pipeline {
    /// Create a pipeline with syntect highlighting and MathML output.
    #[must_use]
    pub fn new(resolver: AssetResolver) -> Self {
        Self {
            resolver,
            tokenizer: Box::new(SyntectTokenizer),
            math: Box::new(MathMlRenderer),
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }

    /// Use a different tokenizer for code blocks.
    #[must_use]
    pub fn with_tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    /// Use a different math renderer.
    #[must_use]
    pub fn with_math_renderer(mut self, renderer: impl MathRenderer + 'static) -> Self {
        self.math = Box::new(renderer);
        self
    }

    /// Set the nesting limit.
    #[must_use]
    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    #[must_use]
    pub fn resolver(&self) -> &AssetResolver {
        &self.resolver
    }

    /// Parse Markdown into a document tree.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NestingTooDeep`] when the document nests deeper
    /// than the configured limit.
    pub fn parse(&self, markdown: &str) -> Result<Document, RenderError> {
        let parser = Parser::new_ext(markdown, Self::options());
        let events = AutolinkLiterals::new(TextMergeStream::new(parser));
        TreeBuilder::new(self.max_nesting).build(events)
    }

    /// Run the rewriting passes over a parsed document.
    ///
    /// Returns the table of contents entries.
    pub fn transform(&self, document: &mut Document) -> Vec<Heading> {
        replace_emoji(document);
        FigureRewriter::new(&self.resolver).rewrite(document);
        SyntaxHighlighter::new(self.tokenizer.as_ref()).highlight(document);
        render_math(document, self.math.as_ref());
        anchor_headings(document)
    }

    /// Render Markdown to HTML.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the document cannot be converted at all.
    /// Malformed fragments (math, unknown code languages) degrade in place
    /// and never fail the render.
    pub fn render(&self, markdown: &str) -> Result<RenderedDocument, RenderError> {
        let mut document = self.parse(markdown)?;
        let headings = self.transform(&mut document);
        Ok(RenderedDocument {
            html: to_html(&document),
            headings,
        })
    }

    fn options() -> Options {
        Options::ENABLE_MATH
            | Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(AssetResolver::default())
    }
}

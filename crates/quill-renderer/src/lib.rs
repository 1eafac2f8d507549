//! Markdown to HTML rendering for Quill.
//!
//! This crate turns blog post Markdown into an HTML fragment and a table of
//! contents. Rendering is a fixed chain of passes over an owned document
//! tree:
//!
//! 1. Parse with pulldown-cmark (math, tables, strikethrough, task lists,
//!    footnotes, heading attributes) and link bare URLs ([`gfm`])
//! 2. Build the [`Document`] tree ([`TreeBuilder`])
//! 3. Replace emoji shortcodes ([`emoji`])
//! 4. Resolve image sources and wrap captioned images in figures
//!    ([`FigureRewriter`])
//! 5. Highlight code blocks ([`SyntaxHighlighter`])
//! 6. Render TeX to MathML ([`math`])
//! 7. Anchor headings and collect the table of contents ([`anchor_headings`])
//! 8. Serialize to HTML ([`to_html`])
//!
//! [`Pipeline`] runs all of them.
//!
//! # Example
//!
//! ```
//! use quill_renderer::{AssetResolver, Pipeline};
//!
//! let pipeline = Pipeline::new(AssetResolver::new("/assets/"));
//! let rendered = pipeline
//!     .render(r#"![Alt](./img.png "Caption text")"#)
//!     .unwrap();
//!
//! assert!(rendered.html.starts_with(r#"<figure><img src="/assets/img.png" alt="Alt""#));
//! assert!(rendered.html.ends_with("<figcaption>Caption text</figcaption></figure>"));
//! ```

mod assets;
mod builder;
pub mod emoji;
mod error;
mod figure;
pub mod gfm;
mod headings;
pub mod highlight;
mod html;
pub mod math;
mod pipeline;
mod state;
mod tree;
mod util;
mod xml;

pub use assets::AssetResolver;
pub use builder::TreeBuilder;
pub use error::RenderError;
pub use figure::FigureRewriter;
pub use headings::{Heading, TOC_LEVELS, anchor_headings, heading_level, slugify};
pub use highlight::{SyntaxHighlighter, SyntectTokenizer, Token, Tokenizer};
pub use html::{escape_html, node_to_html, to_html};
pub use math::{MathDisplay, MathMlRenderer, MathRenderer};
pub use pipeline::{DEFAULT_MAX_NESTING, Pipeline, RenderedDocument};
pub use tree::{Attributes, Document, Element, Node};
pub use xml::{MarkupError, parse_fragment};

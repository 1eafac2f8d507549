//! Math rendering.
//!
//! [`TreeBuilder`](crate::builder::TreeBuilder) leaves TeX source in elements
//! marked with a `data-math` attribute. [`render_math`] replaces their content
//! with MathML produced by a [`MathRenderer`]; fragments that fail to render
//! fall back to their literal source, delimiters included.

use latex2mathml::{DisplayStyle, latex_to_mathml};

use crate::tree::{Document, Node};
use crate::xml::{MarkupError, parse_fragment};

/// Attribute marking an element whose text is TeX source.
pub const MATH_ATTR: &str = "data-math";

/// Inline (`$…$`) or display (`$$…$$`) math.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MathDisplay {
    Inline,
    Display,
}

impl MathDisplay {
    /// Value of the `data-math` attribute.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Display => "display",
        }
    }

    /// Class list of the wrapping element.
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::Inline => "math math-inline",
            Self::Display => "math math-display",
        }
    }

    /// Markdown delimiter used for literal fallback text.
    #[must_use]
    pub fn delimiter(self) -> &'static str {
        match self {
            Self::Inline => "$",
            Self::Display => "$$",
        }
    }

    /// Parse a `data-math` attribute value.
    #[must_use]
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "inline" => Some(Self::Inline),
            "display" => Some(Self::Display),
            _ => None,
        }
    }
}

/// Error rendering a math fragment.
#[derive(Debug, thiserror::Error)]
pub enum MathError {
    #[error("invalid TeX: {0}")]
    Tex(String),

    #[error("invalid math markup: {0}")]
    Markup(#[from] MarkupError),
}

/// Converts TeX source to markup.
pub trait MathRenderer: Send + Sync {
    /// Render TeX to a serialized markup fragment.
    fn render(&self, tex: &str, display: MathDisplay) -> Result<String, MathError>;
}

/// Renders TeX to MathML with `latex2mathml`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MathMlRenderer;

impl MathRenderer for MathMlRenderer {
    fn render(&self, tex: &str, display: MathDisplay) -> Result<String, MathError> {
        let style = match display {
            MathDisplay::Inline => DisplayStyle::Inline,
            MathDisplay::Display => DisplayStyle::Block,
        };
        latex_to_mathml(tex, style).map_err(|e| MathError::Tex(e.to_string()))
    }
}

/// Render every math element in the document.
pub fn render_math(document: &mut Document, renderer: &dyn MathRenderer) {
    render_nodes(&mut document.children, renderer);
}

fn render_nodes(nodes: &mut [Node], renderer: &dyn MathRenderer) {
    for node in nodes.iter_mut() {
        let Node::Element(element) = node else {
            continue;
        };
        let Some(display) = element.attr(MATH_ATTR).and_then(MathDisplay::from_attr) else {
            render_nodes(&mut element.children, renderer);
            continue;
        };

        let tex = element.text_content();
        match render_fragment(renderer, &tex, display) {
            Ok(children) => {
                element.children = children;
                element.attrs.remove(MATH_ATTR);
            }
            Err(e) => {
                tracing::debug!(error = %e, tex = %tex, "Math fragment left as text");
                let delimiter = display.delimiter();
                *node = Node::text(format!("{delimiter}{tex}{delimiter}"));
            }
        }
    }
}

fn render_fragment(
    renderer: &dyn MathRenderer,
    tex: &str,
    display: MathDisplay,
) -> Result<Vec<Node>, MathError> {
    let markup = renderer.render(tex, display)?;
    Ok(parse_fragment(&markup)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::to_html;
    use crate::tree::Element;
    use pretty_assertions::assert_eq;

    struct Fixed(&'static str);

    impl MathRenderer for Fixed {
        fn render(&self, _tex: &str, _display: MathDisplay) -> Result<String, MathError> {
            Ok(self.0.to_owned())
        }
    }

    struct Failing;

    impl MathRenderer for Failing {
        fn render(&self, tex: &str, _display: MathDisplay) -> Result<String, MathError> {
            Err(MathError::Tex(format!("cannot parse {tex}")))
        }
    }

    fn math_span(tex: &str, display: MathDisplay) -> Node {
        Element::new("span")
            .with_attr("class", display.class())
            .with_attr(MATH_ATTR, display.as_str())
            .with_text(tex)
            .into()
    }

    fn paragraph_with(math: Node) -> Document {
        Document::new(vec![
            Element::new("p")
                .with_text("see ")
                .with_child(math)
                .into(),
        ])
    }

    #[test]
    fn test_rendered_markup_replaces_source() {
        let mut document = paragraph_with(math_span("x", MathDisplay::Inline));
        render_math(&mut document, &Fixed("<math><mi>x</mi></math>"));
        assert_eq!(
            to_html(&document),
            r#"<p>see <span class="math math-inline"><math><mi>x</mi></math></span></p>"#
        );
    }

    #[test]
    fn test_renderer_error_falls_back_to_literal() {
        let mut document = paragraph_with(math_span(r"\frac{", MathDisplay::Display));
        render_math(&mut document, &Failing);
        assert_eq!(to_html(&document), r"<p>see $$\frac{$$</p>");
    }

    #[test]
    fn test_malformed_markup_falls_back_to_literal() {
        let mut document = paragraph_with(math_span("a<b", MathDisplay::Inline));
        render_math(&mut document, &Fixed("<math><mi>a</mi>"));
        assert_eq!(to_html(&document), "<p>see $a&lt;b$</p>");
    }

    #[test]
    fn test_unmarked_elements_untouched() {
        let mut document = Document::new(vec![
            Element::new("span").with_attr("class", "math").with_text("x").into(),
        ]);
        let before = document.clone();
        render_math(&mut document, &Failing);
        assert_eq!(document, before);
    }

    #[test]
    fn test_mathml_renderer() {
        let markup = MathMlRenderer.render("x^2", MathDisplay::Inline).unwrap();
        assert!(markup.starts_with("<math"));
        assert!(markup.contains("<msup>"));

        let nodes = parse_fragment(&markup).unwrap();
        assert!(nodes[0].is_element("math"));
        assert!(nodes[0].text_content().contains('x'));
    }
}

//! Image source resolution and figure wrapping.

use crate::assets::AssetResolver;
use crate::tree::{Document, Element, Node};

/// Rewrites image sources and wraps captioned images in `<figure>`.
///
/// A paragraph whose only meaningful child is an image (directly or as the
/// only content of a link) and whose image has a non-blank `title` becomes:
///
/// ```html
/// <figure><img src="…" alt="…" title="Caption"><figcaption>Caption</figcaption></figure>
/// ```
///
/// Every other image only has its `src` passed through the resolver.
pub struct FigureRewriter<'r> {
    resolver: &'r AssetResolver,
}

impl<'r> FigureRewriter<'r> {
    #[must_use]
    pub fn new(resolver: &'r AssetResolver) -> Self {
        Self { resolver }
    }

    /// Rewrite the document in place.
    pub fn rewrite(&self, document: &mut Document) {
        self.visit_children(&mut document.children);
    }

    fn visit_children(&self, nodes: &mut [Node]) {
        for index in 0..nodes.len() {
            self.visit(nodes, index);
        }
    }

    fn visit(&self, siblings: &mut [Node], index: usize) {
        if let Some(caption) = figure_caption(&siblings[index]) {
            let paragraph = std::mem::replace(&mut siblings[index], Node::text(""));
            if let Some(figure) = into_figure(paragraph, caption) {
                siblings[index] = figure.into();
            }
        }

        let Node::Element(element) = &mut siblings[index] else {
            return;
        };
        if element.tag == "img" {
            self.resolve_src(element);
        }
        self.visit_children(&mut element.children);
    }

    fn resolve_src(&self, image: &mut Element) {
        if let Some(resolved) = self.resolver.resolve(image.attr("src")) {
            image.attrs.set("src", resolved);
        }
    }
}

/// Caption for a paragraph that qualifies for figure wrapping.
fn figure_caption(node: &Node) -> Option<String> {
    let paragraph = node.as_element().filter(|el| el.tag == "p")?;
    let wrapper = paragraph.sole_meaningful_child()?.as_element()?;
    let image = match wrapper.tag.as_str() {
        "img" => wrapper,
        "a" => wrapper
            .sole_meaningful_child()?
            .as_element()
            .filter(|el| el.tag == "img")?,
        _ => return None,
    };
    let caption = image.attr("title")?.trim();
    (!caption.is_empty()).then(|| caption.to_owned())
}

fn into_figure(paragraph: Node, caption: String) -> Option<Element> {
    let Node::Element(paragraph) = paragraph else {
        return None;
    };
    let wrapper = paragraph
        .children
        .into_iter()
        .find(|child| !child.is_whitespace_text())?;
    Some(
        Element::new("figure")
            .with_child(wrapper)
            .with_child(Element::new("figcaption").with_text(caption)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::to_html;
    use pretty_assertions::assert_eq;

    fn image(src: &str, title: Option<&str>) -> Element {
        let mut img = Element::new("img").with_attr("src", src).with_attr("alt", "Alt");
        if let Some(title) = title {
            img.attrs.set("title", title);
        }
        img
    }

    fn paragraph(children: Vec<Node>) -> Node {
        Element {
            tag: "p".to_owned(),
            children,
            ..Element::default()
        }
        .into()
    }

    fn rewrite(mut document: Document) -> String {
        let resolver = AssetResolver::new("/assets/");
        FigureRewriter::new(&resolver).rewrite(&mut document);
        to_html(&document)
    }

    #[test]
    fn test_captioned_image_becomes_figure() {
        let document = Document::new(vec![paragraph(vec![
            image("./img.png", Some("  Caption text ")).into(),
        ])]);
        assert_eq!(
            rewrite(document),
            "<figure><img src=\"/assets/img.png\" alt=\"Alt\" title=\"  Caption text \">\
             <figcaption>Caption text</figcaption></figure>"
        );
    }

    #[test]
    fn test_linked_image_becomes_figure() {
        let link = Element::new("a")
            .with_attr("href", "https://example.com")
            .with_text(" ")
            .with_child(image("img.png", Some("Linked")));
        let document = Document::new(vec![paragraph(vec![
            Node::text("\n"),
            link.into(),
            Node::text("  "),
        ])]);
        assert_eq!(
            rewrite(document),
            "<figure><a href=\"https://example.com\"> \
             <img src=\"/assets/img.png\" alt=\"Alt\" title=\"Linked\"></a>\
             <figcaption>Linked</figcaption></figure>"
        );
    }

    #[test]
    fn test_blank_title_only_resolves() {
        let document = Document::new(vec![paragraph(vec![
            image("img.png", Some("   ")).into(),
        ])]);
        assert_eq!(
            rewrite(document),
            r#"<p><img src="/assets/img.png" alt="Alt" title="   "></p>"#
        );
    }

    #[test]
    fn test_image_with_text_is_not_wrapped() {
        let document = Document::new(vec![paragraph(vec![
            Node::text("See "),
            image("img.png", Some("Caption")).into(),
        ])]);
        let html = rewrite(document);
        assert!(html.starts_with("<p>See <img src=\"/assets/img.png\""));
        assert!(!html.contains("<figure>"));
    }

    #[test]
    fn test_image_outside_paragraph() {
        let document = Document::new(vec![
            Element::new("li")
                .with_child(image("nested/img.png", Some("Caption")))
                .into(),
        ]);
        assert_eq!(
            rewrite(document),
            r#"<li><img src="/assets/nested/img.png" alt="Alt" title="Caption"></li>"#
        );
    }

    #[test]
    fn test_missing_src_is_noop() {
        let document = Document::new(vec![paragraph(vec![
            Element::new("img").with_attr("alt", "x").into(),
        ])]);
        assert_eq!(rewrite(document), r#"<p><img alt="x"></p>"#);
    }

    #[test]
    fn test_external_src_unchanged() {
        let document = Document::new(vec![paragraph(vec![
            image("https://cdn.example.com/a.png", Some("Remote")).into(),
        ])]);
        assert!(rewrite(document).contains(r#"src="https://cdn.example.com/a.png""#));
    }
}

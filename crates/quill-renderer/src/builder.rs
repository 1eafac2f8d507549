//! Conversion of pulldown-cmark events into the document tree.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Tag, TagEnd};

use crate::error::RenderError;
use crate::math::{MATH_ATTR, MathDisplay};
use crate::state::{
    CodeBlockState, FootnoteState, ImageState, TableState,
};
use crate::tree::{Document, Element, Node};
use crate::util::{fence_language, heading_level_to_num};

/// Fence language that is treated as display math.
const MATH_FENCE: &str = "math";

/// Elements laid out as blocks; siblings are separated by a newline.
const BLOCK_ELEMENTS: &[&str] = &[
    "blockquote", "dd", "div", "dl", "dt", "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr",
    "li", "ol", "p", "pre", "section", "table", "tbody", "td", "th", "thead", "tr", "ul",
];

/// Elements whose block children are separated by newlines. The empty tag is
/// the document root.
const BLOCK_CONTAINERS: &[&str] = &[
    "", "blockquote", "dd", "dl", "li", "ol", "section", "table", "tbody", "thead", "tr", "ul",
];

/// Builds a [`Document`] from a markdown event stream.
///
/// Raw HTML is dropped and YAML metadata blocks are skipped. Everything else
/// maps onto plain HTML elements; math is kept as marked-up TeX for a later
/// pass to render.
pub struct TreeBuilder {
    /// Open elements. Index 0 is the document root.
    stack: Vec<Element>,
    /// Code block rendering state.
    code: CodeBlockState,
    /// Table rendering state.
    table: TableState,
    /// Image alt text capture state.
    image: ImageState,
    /// Footnote numbering and collected definitions.
    footnotes: FootnoteState,
    /// Labels of footnote definitions currently open.
    open_footnotes: Vec<String>,
    /// Whether we're inside a YAML metadata block.
    in_metadata: bool,
    /// Maximum number of simultaneously open elements.
    max_depth: usize,
}

impl TreeBuilder {
    /// Create a builder that rejects documents nested deeper than `max_depth`.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            stack: vec![Element::new("")],
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            footnotes: FootnoteState::default(),
            open_footnotes: Vec::new(),
            in_metadata: false,
            max_depth,
        }
    }

    /// Consume markdown events and return the document tree.
    pub fn build<'a, I>(mut self, events: I) -> Result<Document, RenderError>
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event)?;
        }
        self.finish()
    }

    fn process_event(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        if self.in_metadata {
            if matches!(event, Event::End(TagEnd::MetadataBlock(_))) {
                self.in_metadata = false;
            }
            return Ok(());
        }

        match event {
            Event::Start(tag) => self.start_tag(tag)?,
            Event::End(tag) => self.end_tag(tag)?,
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::InlineMath(tex) => self.math(&tex, MathDisplay::Inline, false),
            Event::DisplayMath(tex) => self.math(&tex, MathDisplay::Display, false),
            Event::Html(html) | Event::InlineHtml(html) => {
                tracing::debug!(html = %html.trim(), "Dropping raw HTML");
            }
            Event::FootnoteReference(label) => self.footnote_reference(&label),
            Event::SoftBreak => self.text("\n"),
            Event::HardBreak => {
                if self.image.is_active() {
                    self.image.push_str(" ");
                } else {
                    self.append(Element::new("br").into());
                    self.append(Node::text("\n"));
                }
            }
            Event::Rule => self.append(Element::new("hr").into()),
            Event::TaskListMarker(checked) => self.task_list_marker(checked),
        }
        Ok(())
    }

    #[allow(clippy::too_many_lines)]
    fn start_tag(&mut self, tag: Tag<'_>) -> Result<(), RenderError> {
        if self.image.is_active() {
            // Only nesting matters inside an image description
            if let Tag::Image {
                dest_url, title, ..
            } = tag
            {
                self.image.start(&dest_url, &title);
            }
            return Ok(());
        }

        match tag {
            Tag::Paragraph => self.open(Element::new("p"))?,
            Tag::Heading {
                level,
                id,
                classes,
                attrs,
            } => {
                let mut heading = Element::new(format!("h{}", heading_level_to_num(level)));
                if let Some(id) = id {
                    heading.attrs.set("id", id.to_string());
                }
                if !classes.is_empty() {
                    let classes: Vec<&str> = classes.iter().map(CowStr::as_ref).collect();
                    heading.attrs.set("class", classes.join(" "));
                }
                for (name, value) in attrs {
                    heading
                        .attrs
                        .set(name.to_string(), value.map(|v| v.to_string()).unwrap_or_default());
                }
                self.open(heading)?;
            }
            Tag::BlockQuote(_) => self.open(Element::new("blockquote"))?,
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => fence_language(&info),
                    CodeBlockKind::Indented => None,
                };
                self.code.start(language);
            }
            Tag::HtmlBlock => {}
            Tag::List(start) => {
                let list = match start {
                    Some(1) => Element::new("ol"),
                    Some(n) => Element::new("ol").with_attr("start", n.to_string()),
                    None => Element::new("ul"),
                };
                self.open(list)?;
            }
            Tag::Item => self.open(Element::new("li"))?,
            Tag::FootnoteDefinition(label) => {
                let id = self.footnotes.definition_id(&label);
                self.open(Element::new("li").with_attr("id", id))?;
                self.open_footnotes.push(label.to_string());
            }
            Tag::DefinitionList => self.open(Element::new("dl"))?,
            Tag::DefinitionListTitle => self.open(Element::new("dt"))?,
            Tag::DefinitionListDefinition => self.open(Element::new("dd"))?,
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.open(Element::new("table"))?;
            }
            Tag::TableHead => {
                self.table.start_head();
                self.open(Element::new("thead"))?;
                self.open(Element::new("tr"))?;
            }
            Tag::TableRow => {
                self.table.start_row();
                if self.current_tag() == "table" {
                    self.open(Element::new("tbody"))?;
                }
                self.open(Element::new("tr"))?;
            }
            Tag::TableCell => {
                let mut cell = Element::new(if self.table.is_in_head() { "th" } else { "td" });
                if let Some(style) = self.table.current_alignment_style() {
                    cell.attrs.set("style", style);
                }
                self.open(cell)?;
            }
            Tag::Emphasis => self.open(Element::new("em"))?,
            Tag::Strong => self.open(Element::new("strong"))?,
            Tag::Strikethrough => self.open(Element::new("del"))?,
            Tag::Superscript => self.open(Element::new("sup"))?,
            Tag::Subscript => self.open(Element::new("sub"))?,
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut link = Element::new("a").with_attr("href", dest_url.to_string());
                if !title.is_empty() {
                    link.attrs.set("title", title.to_string());
                }
                self.open(link)?;
            }
            Tag::Image {
                dest_url, title, ..
            } => self.image.start(&dest_url, &title),
            Tag::MetadataBlock(_) => self.in_metadata = true,
        }
        Ok(())
    }

    fn end_tag(&mut self, tag: TagEnd) -> Result<(), RenderError> {
        if self.image.is_active() {
            if tag == TagEnd::Image {
                self.end_image();
            }
            return Ok(());
        }

        match tag {
            TagEnd::CodeBlock => self.end_code_block(),
            TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) | TagEnd::Image => {}
            TagEnd::FootnoteDefinition => self.end_footnote_definition()?,
            TagEnd::Table => {
                if self.current_tag() == "tbody" {
                    self.close("table body")?;
                }
                self.close("table")?;
            }
            TagEnd::TableHead => {
                self.close("table head row")?;
                self.close("table head")?;
                self.table.end_head();
            }
            TagEnd::TableCell => {
                self.close("table cell")?;
                self.table.next_cell();
            }
            TagEnd::Paragraph => self.close("paragraph")?,
            TagEnd::Heading(_) => self.close("heading")?,
            TagEnd::BlockQuote(_) => self.close("blockquote")?,
            TagEnd::List(_) => self.close("list")?,
            TagEnd::Item => self.close("list item")?,
            TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition => self.close("definition list")?,
            TagEnd::TableRow => self.close("table row")?,
            TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Superscript
            | TagEnd::Subscript
            | TagEnd::Link => self.close("inline")?,
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        // Priority: code > image > normal text
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else {
            self.append(Node::text(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
        } else {
            self.append(Element::new("code").with_text(code).into());
        }
    }

    fn math(&mut self, tex: &str, display: MathDisplay, block: bool) {
        if self.image.is_active() {
            self.image.push_str(tex);
            return;
        }
        let element = Element::new(if block { "div" } else { "span" })
            .with_attr("class", display.class())
            .with_attr(MATH_ATTR, display.as_str())
            .with_text(tex);
        self.append(element.into());
    }

    fn end_image(&mut self) {
        let Some((src, title, alt)) = self.image.end() else {
            return;
        };
        let mut image = Element::new("img").with_attr("src", src).with_attr("alt", alt);
        if !title.is_empty() {
            image.attrs.set("title", title);
        }
        self.append(image.into());
    }

    fn end_code_block(&mut self) {
        let (language, content) = self.code.end();
        if language.as_deref() == Some(MATH_FENCE) {
            self.math(content.trim_end(), MathDisplay::Display, true);
            return;
        }

        let mut code = Element::new("code");
        if let Some(language) = language {
            code.attrs.set("class", format!("language-{language}"));
        }
        let pre = Element::new("pre").with_child(code.with_text(content));
        self.append(pre.into());
    }

    fn task_list_marker(&mut self, checked: bool) {
        let mut input = Element::new("input")
            .with_attr("type", "checkbox")
            .with_attr("disabled", "");
        if checked {
            input.attrs.set("checked", "");
        }

        if let Some(index) = self.stack.iter().rposition(|el| el.tag == "li") {
            add_class(&mut self.stack[index], "task-list-item");
            if index > 0 {
                add_class(&mut self.stack[index - 1], "contains-task-list");
            }
        }

        self.append(input.into());
        self.append(Node::text(" "));
    }

    fn footnote_reference(&mut self, label: &str) {
        if self.image.is_active() {
            self.image.push_str(label);
            return;
        }
        let (number, id) = self.footnotes.reference(label);
        let target = self.footnotes.definition_id(label);
        let link = Element::new("a")
            .with_attr("href", format!("#{target}"))
            .with_attr("id", id)
            .with_attr("class", "footnote-ref")
            .with_text(number.to_string());
        self.append(Element::new("sup").with_child(link).into());
    }

    fn end_footnote_definition(&mut self) -> Result<(), RenderError> {
        let mut item = self.pop("footnote definition")?;
        let label = self.open_footnotes.pop().unwrap_or_default();

        let backref = Element::new("a")
            .with_attr("href", format!("#{}", self.footnotes.reference_id(&label)))
            .with_attr("class", "footnote-backref")
            .with_text("\u{21a9}");
        let target = item
            .children
            .iter_mut()
            .rev()
            .find_map(|child| child.as_element_mut().filter(|el| el.tag == "p"));
        match target {
            Some(paragraph) => {
                paragraph.children.push(Node::text(" "));
                paragraph.children.push(backref.into());
            }
            None => item.children.push(backref.into()),
        }

        self.footnotes.define(label, item);
        Ok(())
    }

    fn finish(mut self) -> Result<Document, RenderError> {
        while self.stack.len() > 1 {
            self.close("end of document")?;
        }

        let definitions = self.footnotes.take_ordered();
        if !definitions.is_empty() {
            let mut list = Element::new("ol");
            for item in definitions {
                list.children.push(Node::text("\n"));
                list.children.push(item.into());
            }
            list.children.push(Node::text("\n"));
            let section = Element::new("section")
                .with_attr("class", "footnotes")
                .with_text("\n")
                .with_child(list)
                .with_text("\n");
            self.append(section.into());
        }

        let root = self.stack.pop().unwrap_or_default();
        Ok(Document::new(root.children))
    }

    fn current_tag(&self) -> &str {
        self.stack.last().map_or("", |el| el.tag.as_str())
    }

    fn open(&mut self, element: Element) -> Result<(), RenderError> {
        if self.stack.len() > self.max_depth {
            tracing::warn!(limit = self.max_depth, "Markdown nesting limit exceeded");
            return Err(RenderError::NestingTooDeep {
                limit: self.max_depth,
            });
        }
        self.stack.push(element);
        Ok(())
    }

    fn pop(&mut self, context: &'static str) -> Result<Element, RenderError> {
        if self.stack.len() <= 1 {
            return Err(RenderError::Unbalanced { context });
        }
        let mut element = self.stack.pop().ok_or(RenderError::Unbalanced { context })?;
        if BLOCK_CONTAINERS.contains(&element.tag.as_str())
            && element.children.iter().any(is_block)
        {
            push_text(&mut element, "\n");
        }
        Ok(element)
    }

    fn close(&mut self, context: &'static str) -> Result<(), RenderError> {
        let element = self.pop(context)?;
        if element.tag == "tbody" && element.children.is_empty() {
            return Ok(());
        }
        self.append(element.into());
        Ok(())
    }

    fn append(&mut self, node: Node) {
        let is_root = self.stack.len() == 1;
        let Some(parent) = self.stack.last_mut() else {
            return;
        };

        if is_block(&node)
            && BLOCK_CONTAINERS.contains(&parent.tag.as_str())
            && (!is_root || !parent.children.is_empty())
        {
            push_text(parent, "\n");
        }

        match node {
            Node::Text(text) => push_text(parent, &text),
            element @ Node::Element(_) => parent.children.push(element),
        }
    }
}

/// Append text, merging with a trailing text node.
fn push_text(parent: &mut Element, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Text(last)) = parent.children.last_mut() {
        last.push_str(text);
    } else {
        parent.children.push(Node::text(text));
    }
}

fn is_block(node: &Node) -> bool {
    node.as_element()
        .is_some_and(|el| BLOCK_ELEMENTS.contains(&el.tag.as_str()))
}

fn add_class(element: &mut Element, class: &str) {
    if element.has_class(class) {
        return;
    }
    let classes = match element.attr("class") {
        Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
        _ => class.to_owned(),
    };
    element.attrs.set("class", classes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::to_html;
    use pretty_assertions::assert_eq;
    use pulldown_cmark::{Options, Parser};

    fn build(markdown: &str) -> Document {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_MATH
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS;
        TreeBuilder::new(64)
            .build(Parser::new_ext(markdown, options))
            .unwrap()
    }

    fn render(markdown: &str) -> String {
        to_html(&build(markdown))
    }

    #[test]
    fn test_basic_paragraph() {
        assert_eq!(render("Hello, world!"), "<p>Hello, world!</p>");
    }

    #[test]
    fn test_blocks_separated_by_newlines() {
        assert_eq!(
            render("# Title\n\nSome *text*."),
            "<h1>Title</h1>\n<p>Some <em>text</em>.</p>"
        );
    }

    #[test]
    fn test_heading_attributes() {
        assert_eq!(
            render("## Install {#setup .wide}"),
            r#"<h2 id="setup" class="wide">Install</h2>"#
        );
    }

    #[test]
    fn test_tight_list() {
        assert_eq!(
            render("- one\n- two"),
            "<ul>\n<li>one</li>\n<li>two</li>\n</ul>"
        );
    }

    #[test]
    fn test_ordered_list_start() {
        assert!(render("3. three\n4. four").starts_with(r#"<ol start="3">"#));
    }

    #[test]
    fn test_code_block_language_class() {
        assert_eq!(
            render("```rust title=main.rs\nfn main() {}\n```"),
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>"
        );
    }

    #[test]
    fn test_indented_code_block_has_no_language() {
        assert_eq!(render("    let x = 1;"), "<pre><code>let x = 1;\n</code></pre>");
    }

    #[test]
    fn test_image_alt_is_flattened() {
        assert_eq!(
            render(r#"![An *important* `diagram`](a.png "Title")"#),
            r#"<p><img src="a.png" alt="An important diagram" title="Title"></p>"#
        );
    }

    #[test]
    fn test_link_with_title() {
        assert_eq!(
            render(r#"[docs](https://example.com "Docs")"#),
            r#"<p><a href="https://example.com" title="Docs">docs</a></p>"#
        );
    }

    #[test]
    fn test_table_with_alignment() {
        let html = render("| a | b |\n|:--|--:|\n| 1 | 2 |");
        assert_eq!(
            html,
            "<table>\n<thead>\n<tr>\n<th style=\"text-align:left\">a</th>\n\
             <th style=\"text-align:right\">b</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n\
             <td style=\"text-align:left\">1</td>\n<td style=\"text-align:right\">2</td>\n\
             </tr>\n</tbody>\n</table>"
        );
    }

    #[test]
    fn test_table_without_body_rows() {
        let html = render("| a |\n|---|");
        assert!(html.contains("<thead>"));
        assert!(!html.contains("<tbody>"));
    }

    #[test]
    fn test_strikethrough_uses_del() {
        assert_eq!(render("~~gone~~"), "<p><del>gone</del></p>");
    }

    #[test]
    fn test_task_list() {
        let html = render("- [x] done\n- [ ] todo");
        assert!(html.contains(r#"<ul class="contains-task-list">"#));
        assert!(html.contains(
            r#"<li class="task-list-item"><input type="checkbox" disabled checked> done</li>"#
        ));
        assert!(html.contains(
            r#"<li class="task-list-item"><input type="checkbox" disabled> todo</li>"#
        ));
    }

    #[test]
    fn test_raw_html_is_dropped() {
        let html = render("<div>raw</div>\n\ntext <b>bold</b>");
        assert!(!html.contains("<div>"));
        assert!(!html.contains("<b>"));
        assert!(html.contains("text"));
    }

    #[test]
    fn test_metadata_block_is_skipped() {
        let html = render("---\ntitle: Hello\n---\n\nBody");
        assert_eq!(html, "<p>Body</p>");
    }

    #[test]
    fn test_inline_math_marked() {
        let html = render("Energy $E = mc^2$ here");
        assert_eq!(
            html,
            r#"<p>Energy <span class="math math-inline" data-math="inline">E = mc^2</span> here</p>"#
        );
    }

    #[test]
    fn test_math_fence_is_display_math() {
        let html = render("```math\nx^2\n```");
        assert_eq!(
            html,
            r#"<div class="math math-display" data-math="display">x^2</div>"#
        );
    }

    #[test]
    fn test_footnotes() {
        let html = render("Text[^note].\n\n[^note]: The note.");
        assert!(html.contains(
            "<sup><a href=\"#fn-note\" id=\"fnref-note\" class=\"footnote-ref\">1</a></sup>"
        ));
        assert!(html.contains(r#"<section class="footnotes">"#));
        assert!(html.contains(r#"<li id="fn-note">"#));
        assert!(html.contains(
            "The note. <a href=\"#fnref-note\" class=\"footnote-backref\">\u{21a9}</a></p>"
        ));
    }

    #[test]
    fn test_footnote_labels_with_same_slug() {
        let html = render("A[^a.b] B[^ab].\n\n[^a.b]: First.\n\n[^ab]: Second.");
        assert!(html.contains("<a href=\"#fn-ab\" id=\"fnref-ab\" class=\"footnote-ref\">1</a>"));
        assert!(html.contains("<a href=\"#fn-ab-1\" id=\"fnref-ab-1\" class=\"footnote-ref\">2</a>"));
        assert!(html.contains(r#"<li id="fn-ab">"#));
        assert!(html.contains(r#"<li id="fn-ab-1">"#));
        assert!(html.contains("Second. <a href=\"#fnref-ab-1\" class=\"footnote-backref\">"));
    }

    #[test]
    fn test_hard_break() {
        assert_eq!(render("a  \nb"), "<p>a<br>\nb</p>");
    }

    #[test]
    fn test_nesting_limit() {
        let markdown = ">".repeat(100) + " deep";
        let options = Options::empty();
        let result = TreeBuilder::new(16).build(Parser::new_ext(&markdown, options));
        assert!(matches!(
            result,
            Err(RenderError::NestingTooDeep { limit: 16 })
        ));
    }
}

//! Parsing of generated markup fragments into tree nodes.
//!
//! Math renderers return serialized MathML. Splicing it in as an opaque
//! string would break the tree model, so the fragment is parsed back into
//! [`Node`]s with quick-xml.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::tree::{Element, Node};

/// Error parsing a markup fragment.
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    #[error("unclosed element <{0}>")]
    Unclosed(String),

    #[error("unexpected closing tag")]
    UnexpectedEnd,
}

/// Parse a well-formed XML fragment into a sequence of nodes.
///
/// Comments, processing instructions and declarations are discarded. Entity
/// references are decoded into text.
pub fn parse_fragment(markup: &str) -> Result<Vec<Node>, MarkupError> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().trim_text(false);

    // Index 0 collects top-level nodes
    let mut stack: Vec<Element> = vec![Element::default()];

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(start_element(&reader, &e)),
            Event::Empty(e) => {
                let element = start_element(&reader, &e);
                append(&mut stack, element.into());
            }
            Event::End(_) => {
                if stack.len() <= 1 {
                    return Err(MarkupError::UnexpectedEnd);
                }
                if let Some(element) = stack.pop() {
                    append(&mut stack, element.into());
                }
            }
            Event::Text(e) => {
                let text = reader.decoder().decode(&e)?;
                append_text(&mut stack, &text);
            }
            Event::GeneralRef(e) => {
                let entity = reader.decoder().decode(&e)?;
                append_text(&mut stack, &decode_entity(&entity));
            }
            Event::CData(e) => {
                append_text(&mut stack, &String::from_utf8_lossy(&e));
            }
            Event::Eof => break,
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }

    if stack.len() > 1 {
        let tag = stack.pop().map(|el| el.tag).unwrap_or_default();
        return Err(MarkupError::Unclosed(tag));
    }
    Ok(stack.pop().map(|root| root.children).unwrap_or_default())
}

fn start_element(reader: &Reader<&[u8]>, e: &BytesStart) -> Element {
    let name = e.name();
    let tag = lossy(reader.decoder().decode(name.as_ref()), name.as_ref());
    let mut element = Element::new(tag);
    for attr in e.attributes().flatten() {
        let key = lossy(reader.decoder().decode(attr.key.as_ref()), attr.key.as_ref());
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            Cow::into_owned,
        );
        element.attrs.set(key, value);
    }
    element
}

fn lossy<E>(decoded: Result<Cow<'_, str>, E>, raw: &[u8]) -> String {
    decoded.map_or_else(
        |_| String::from_utf8_lossy(raw).into_owned(),
        Cow::into_owned,
    )
}

fn append(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn append_text(stack: &mut [Element], text: &str) {
    let Some(parent) = stack.last_mut() else {
        return;
    };
    if let Some(Node::Text(last)) = parent.children.last_mut() {
        last.push_str(text);
    } else {
        parent.children.push(Node::text(text));
    }
}

/// Decode an XML entity reference (without `&` and `;`).
fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        s if s.starts_with('#') => {
            let code = match s.strip_prefix("#x").or_else(|| s.strip_prefix("#X")) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => s[1..].parse::<u32>().ok(),
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        _ => format!("&{entity};"),
    }
}

//! Owned document tree produced from markdown events.
//!
//! Every rewriting pass works on this representation. Nodes own their
//! children, so a pass that needs to replace a node receives the parent's
//! child vector and an index instead of a back-reference.

/// A single node of the document tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Text leaf. Never has children.
    Text(String),
    /// Element with a tag name, attributes and (possibly empty) children.
    Element(Element),
}

impl Node {
    /// Create a text node.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Create an element node without attributes or children.
    pub fn element(tag: impl Into<String>) -> Self {
        Self::Element(Element::new(tag))
    }

    /// Borrow the element if this node is one.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) => None,
        }
    }

    /// Mutably borrow the element if this node is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) => None,
        }
    }

    /// Check whether this node is an element with the given tag.
    #[must_use]
    pub fn is_element(&self, tag: &str) -> bool {
        self.as_element().is_some_and(|element| element.tag == tag)
    }

    /// Check whether this node is a text node containing only whitespace.
    #[must_use]
    pub fn is_whitespace_text(&self) -> bool {
        matches!(self, Self::Text(value) if value.trim().is_empty())
    }

    /// Concatenated text of this node and all of its descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(value) => out.push_str(value),
            Self::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// An element node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name (`p`, `img`, `span`, ...).
    pub tag: String,
    /// Attributes in insertion order.
    pub attrs: Attributes,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Attributes::default(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.set(name, value);
        self
    }

    /// Builder-style child append.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Builder-style text child append.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Get an attribute value.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name)
    }

    /// Iterate over the whitespace-separated entries of the `class` attribute.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    /// Check for a class name.
    #[must_use]
    pub fn has_class(&self, name: &str) -> bool {
        self.class_names().any(|class| class == name)
    }

    /// Children that are not whitespace-only text.
    pub fn meaningful_children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(|child| !child.is_whitespace_text())
    }

    /// The only meaningful child, if there is exactly one.
    #[must_use]
    pub fn sole_meaningful_child(&self) -> Option<&Node> {
        let mut meaningful = self.meaningful_children();
        let first = meaningful.next()?;
        meaningful.next().is_none().then_some(first)
    }

    /// Concatenated text of all descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }
}

/// Insertion-ordered attribute map.
///
/// Attribute order is part of the serialized output, so a hash map would make
/// rendering nondeterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// Get a value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set a value, replacing an existing one in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Remove a value, returning it.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.0.iter().position(|(key, _)| key == name)?;
        Some(self.0.remove(index).1)
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Root of a parsed document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    /// Top-level nodes in document order.
    pub children: Vec<Node>,
}

impl Document {
    #[must_use]
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Visit every element depth-first, parents before children.
    pub fn for_each_element_mut(&mut self, mut f: impl FnMut(&mut Element)) {
        fn walk(nodes: &mut [Node], f: &mut dyn FnMut(&mut Element)) {
            for node in nodes {
                if let Node::Element(element) = node {
                    f(element);
                    walk(&mut element.children, f);
                }
            }
        }
        walk(&mut self.children, &mut f);
    }

    /// Concatenated text of the whole document.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }
}

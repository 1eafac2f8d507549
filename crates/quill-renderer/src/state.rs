//! State structs for markdown event processing.
//!
//! These track context while [`TreeBuilder`](crate::builder::TreeBuilder)
//! turns pulldown-cmark events into the document tree.

use std::collections::{HashMap, HashSet};

use pulldown_cmark::Alignment;

use crate::headings::slugify;
use crate::tree::Element;

/// Text of the code block currently being collected.
#[derive(Default)]
pub struct CodeBlockState {
    open: Option<OpenCodeBlock>,
}

struct OpenCodeBlock {
    language: Option<String>,
    text: String,
}

impl CodeBlockState {
    /// Open a block. `language` is the raw fence info language, if any.
    pub fn start(&mut self, language: Option<String>) {
        self.open = Some(OpenCodeBlock {
            language,
            text: String::new(),
        });
    }

    /// Close the block, yielding its language and collected text.
    pub fn end(&mut self) -> (Option<String>, String) {
        self.open
            .take()
            .map(|block| (block.language, block.text))
            .unwrap_or_default()
    }

    pub fn is_active(&self) -> bool {
        self.open.is_some()
    }

    pub fn push_str(&mut self, text: &str) {
        if let Some(block) = &mut self.open {
            block.text.push_str(text);
        }
    }
}

/// Column bookkeeping for the table currently being built.
#[derive(Default)]
pub struct TableState {
    alignments: Vec<Alignment>,
    header: bool,
    column: usize,
}

impl TableState {
    pub fn start(&mut self, alignments: Vec<Alignment>) {
        *self = Self {
            alignments,
            ..Self::default()
        };
    }

    pub fn start_head(&mut self) {
        self.header = true;
        self.column = 0;
    }

    pub fn end_head(&mut self) {
        self.header = false;
    }

    pub fn start_row(&mut self) {
        self.column = 0;
    }

    pub fn next_cell(&mut self) {
        self.column += 1;
    }

    /// Cells in the header row render as `th`.
    pub fn is_in_head(&self) -> bool {
        self.header
    }

    /// Inline style for the current cell, if the column is aligned.
    pub fn current_alignment_style(&self) -> Option<&'static str> {
        let alignment = self.alignments.get(self.column)?;
        match alignment {
            Alignment::Left => Some("text-align:left"),
            Alignment::Center => Some("text-align:center"),
            Alignment::Right => Some("text-align:right"),
            Alignment::None => None,
        }
    }
}

/// Alt text collection for the image being parsed.
///
/// Image descriptions may contain inline markup and even nested images;
/// everything inside is flattened into the alt text.
#[derive(Default)]
pub struct ImageState {
    depth: usize,
    alt_text: String,
    /// Source and title of the outermost image.
    pending: Option<(String, String)>,
}

impl ImageState {
    /// Start capturing an image. Nested images only contribute alt text.
    pub fn start(&mut self, src: &str, title: &str) {
        if self.depth == 0 {
            self.alt_text.clear();
            self.pending = Some((src.to_owned(), title.to_owned()));
        }
        self.depth += 1;
    }

    /// End an image. Returns `(src, title, alt)` when the outermost one closes.
    pub fn end(&mut self) -> Option<(String, String, String)> {
        self.depth = self.depth.saturating_sub(1);
        if self.depth > 0 {
            return None;
        }
        let (src, title) = self.pending.take()?;
        Some((src, title, std::mem::take(&mut self.alt_text)))
    }

    pub fn is_active(&self) -> bool {
        self.depth > 0
    }

    pub fn push_str(&mut self, text: &str) {
        self.alt_text += text;
    }
}

/// State for GFM footnotes.
#[derive(Default)]
pub struct FootnoteState {
    /// Footnote number by label, assigned on first reference.
    numbers: HashMap<String, usize>,
    /// How many times each label has been referenced.
    reference_counts: HashMap<String, usize>,
    /// Anchor slug by label, unique across labels.
    slugs: HashMap<String, String>,
    used_slugs: HashSet<String>,
    /// Completed definitions in source order.
    definitions: Vec<(String, Element)>,
}

impl FootnoteState {
    /// Register a reference. Returns `(number, reference id)`.
    pub fn reference(&mut self, label: &str) -> (usize, String) {
        let next = self.numbers.len() + 1;
        let number = *self.numbers.entry(label.to_owned()).or_insert(next);
        let count = self.reference_counts.entry(label.to_owned()).or_default();
        *count += 1;
        let count = *count;
        let first = self.reference_id(label);
        let id = match count {
            1 => first,
            n => format!("{first}-{n}"),
        };
        (number, id)
    }

    /// Anchor id of the definition of `label`.
    pub fn definition_id(&mut self, label: &str) -> String {
        format!("fn-{}", self.slug(label))
    }

    /// Anchor id of the first reference to `label`.
    pub fn reference_id(&mut self, label: &str) -> String {
        format!("fnref-{}", self.slug(label))
    }

    /// Slug of `label`, suffixed when another label already slugifies the
    /// same way (`a b` and `a-b`).
    fn slug(&mut self, label: &str) -> &str {
        if !self.slugs.contains_key(label) {
            let base = slugify(label);
            let mut slug = base.clone();
            let mut suffix = 1;
            while self.used_slugs.contains(&slug) {
                slug = format!("{base}-{suffix}");
                suffix += 1;
            }
            self.used_slugs.insert(slug.clone());
            self.slugs.insert(label.to_owned(), slug);
        }
        self.slugs.get(label).map_or("", String::as_str)
    }

    /// Store a completed definition.
    pub fn define(&mut self, label: String, item: Element) {
        self.definitions.push((label, item));
    }

    /// Take definitions ordered by reference number; unreferenced ones last.
    pub fn take_ordered(&mut self) -> Vec<Element> {
        let mut definitions = std::mem::take(&mut self.definitions);
        definitions.sort_by_key(|(label, _)| {
            self.numbers.get(label).copied().unwrap_or(usize::MAX)
        });
        definitions.into_iter().map(|(_, item)| item).collect()
    }
}

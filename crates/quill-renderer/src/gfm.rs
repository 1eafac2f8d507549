//! GFM extensions not covered by pulldown-cmark.

use std::collections::VecDeque;
use std::sync::LazyLock;

use pulldown_cmark::{CowStr, Event, LinkType, Tag, TagEnd};
use regex::Regex;

static AUTOLINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:https?://|www\.)[^\s<]+").expect("invalid autolink regex")
});

/// Characters stripped from the end of a literal autolink.
const TRAILING_PUNCTUATION: &[char] = &['?', '!', '.', ',', ':', '*', '_', '~', '\'', '"', ';'];

/// Characters allowed directly before a literal autolink.
const LEADING_DELIMITERS: &[char] = &['*', '_', '~', '('];

/// Event adapter that turns bare URLs in text into links.
///
/// Recognizes `http://`, `https://` and `www.` prefixes outside links, images,
/// code blocks and raw HTML. `www.` links get an `http://` destination.
pub struct AutolinkLiterals<'a, I> {
    inner: I,
    pending: VecDeque<Event<'a>>,
    /// Depth of constructs whose text must not be linked.
    suppressed: usize,
}

impl<'a, I> AutolinkLiterals<'a, I>
where
    I: Iterator<Item = Event<'a>>,
{
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            pending: VecDeque::new(),
            suppressed: 0,
        }
    }
}

impl<'a, I> Iterator for AutolinkLiterals<'a, I>
where
    I: Iterator<Item = Event<'a>>,
{
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }

        let event = self.inner.next()?;
        match &event {
            Event::Start(
                Tag::Link { .. }
                | Tag::Image { .. }
                | Tag::CodeBlock(_)
                | Tag::HtmlBlock
                | Tag::MetadataBlock(_),
            ) => self.suppressed += 1,
            Event::End(
                TagEnd::Link
                | TagEnd::Image
                | TagEnd::CodeBlock
                | TagEnd::HtmlBlock
                | TagEnd::MetadataBlock(_),
            ) => self.suppressed = self.suppressed.saturating_sub(1),
            Event::Text(text) if self.suppressed == 0 => {
                if let Some(events) = split_autolinks(text) {
                    self.pending.extend(events);
                    return self.pending.pop_front();
                }
            }
            _ => {}
        }
        Some(event)
    }
}

/// Split text into text and link events. `None` when there is nothing to link.
fn split_autolinks<'a>(text: &str) -> Option<Vec<Event<'a>>> {
    let mut events = Vec::new();
    let mut last = 0;

    for m in AUTOLINK_RE.find_iter(text) {
        let preceding = text[..m.start()].chars().next_back();
        if preceding.is_some_and(|c| !c.is_whitespace() && !LEADING_DELIMITERS.contains(&c)) {
            continue;
        }

        let url = trim_url(m.as_str());
        let is_www = url.len() >= 4 && url[..4].eq_ignore_ascii_case("www.");
        let prefix_len = if is_www { 4 } else { url.find("://").map_or(0, |i| i + 3) };
        if url.len() <= prefix_len {
            continue;
        }

        if m.start() > last {
            events.push(Event::Text(CowStr::from(text[last..m.start()].to_owned())));
        }
        let dest = if is_www {
            format!("http://{url}")
        } else {
            url.to_owned()
        };
        events.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(dest),
            title: CowStr::from(""),
            id: CowStr::from(""),
        }));
        events.push(Event::Text(CowStr::from(url.to_owned())));
        events.push(Event::End(TagEnd::Link));
        last = m.start() + url.len();
    }

    if events.is_empty() {
        return None;
    }
    if last < text.len() {
        events.push(Event::Text(CowStr::from(text[last..].to_owned())));
    }
    Some(events)
}

/// Strip trailing punctuation and unbalanced closing parentheses.
fn trim_url(url: &str) -> &str {
    let mut end = url.len();
    loop {
        let candidate = &url[..end];
        let Some(last) = candidate.chars().next_back() else {
            break;
        };
        if TRAILING_PUNCTUATION.contains(&last) {
            end -= last.len_utf8();
        } else if last == ')' && candidate.matches(')').count() > candidate.matches('(').count() {
            end -= 1;
        } else {
            break;
        }
    }
    &url[..end]
}

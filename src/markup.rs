//! Nested-list markup loader
//!
//! Reads `<ul>`/`<li>` markup into an outline of items. Only `ul`, `li` and
//! `span` are structural; every other tag is transparent and its text still
//! counts towards the enclosing item's label.

use crate::error::{AriaTreeError, Result};

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "wbr",
];

/// One `<li>` of the source markup together with its nested items.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutlineItem {
    pub label: String,
    pub dom_id: Option<String>,
    /// True when the item owns a nested list, even an empty one.
    pub has_group: bool,
    pub children: Vec<OutlineItem>,
}

impl OutlineItem {
    /// Create an item without a nested list
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Create an item owning a nested list with the given children
    pub fn group(label: impl Into<String>, children: Vec<OutlineItem>) -> Self {
        Self {
            label: label.into(),
            dom_id: None,
            has_group: true,
            children,
        }
    }

    /// Number of items in this subtree, including this one
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(OutlineItem::count).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Close {
        name: String,
    },
    Text(&'a str),
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn next_token(&mut self) -> Result<Option<(usize, Token<'a>)>> {
        loop {
            let rest = &self.src[self.pos..];
            if rest.is_empty() {
                return Ok(None);
            }
            let start = self.pos;

            if !rest.starts_with('<') {
                let len = rest.find('<').unwrap_or(rest.len());
                self.pos += len;
                return Ok(Some((start, Token::Text(&rest[..len]))));
            }

            if rest.starts_with("<!--") {
                let end = rest[4..]
                    .find("-->")
                    .ok_or_else(|| AriaTreeError::markup(start, "unterminated comment"))?;
                self.pos += 4 + end + 3;
                continue;
            }

            let end = find_tag_end(rest)
                .ok_or_else(|| AriaTreeError::markup(start, "unterminated tag"))?;
            self.pos += end + 1;
            let inner = &rest[1..end];

            // Declarations and processing instructions carry no structure
            if inner.starts_with('!') || inner.starts_with('?') {
                continue;
            }

            if let Some(name) = inner.strip_prefix('/') {
                let name = name.trim_start();
                let name_end = name
                    .find(|c: char| c.is_whitespace())
                    .unwrap_or(name.len());
                return Ok(Some((
                    start,
                    Token::Close {
                        name: name[..name_end].to_ascii_lowercase(),
                    },
                )));
            }

            let trimmed = inner.trim_end();
            let (body, self_closing) = match trimmed.strip_suffix('/') {
                Some(body) => (body, true),
                None => (trimmed, false),
            };
            let name_end = body
                .find(|c: char| c.is_whitespace())
                .unwrap_or(body.len());
            let name = body[..name_end].to_ascii_lowercase();
            if name.is_empty() {
                return Err(AriaTreeError::markup(start, "tag without a name"));
            }

            return Ok(Some((
                start,
                Token::Open {
                    name,
                    attrs: parse_attributes(&body[name_end..]),
                    self_closing,
                },
            )));
        }
    }
}

/// Index of the `>` closing the tag at the start of `s`, skipping quoted values.
fn find_tag_end(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices().skip(1) {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return Some(i),
            None => {}
        }
    }
    None
}

fn parse_attributes(s: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut chars = s.char_indices().peekable();

    loop {
        while chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
        let Some(&(start, _)) = chars.peek() else {
            break;
        };

        let mut end = s.len();
        while let Some(&(i, c)) = chars.peek() {
            if c.is_whitespace() || c == '=' {
                end = i;
                break;
            }
            chars.next();
        }
        let name = s[start..end].to_ascii_lowercase();

        while chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
        let mut value = String::new();
        if chars.next_if(|&(_, c)| c == '=').is_some() {
            while chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
            match chars.peek().copied() {
                Some((i, q)) if q == '"' || q == '\'' => {
                    chars.next();
                    let value_start = i + q.len_utf8();
                    let mut value_end = s.len();
                    for (j, c) in chars.by_ref() {
                        if c == q {
                            value_end = j;
                            break;
                        }
                    }
                    value = decode_entities(&s[value_start..value_end]);
                }
                Some((i, _)) => {
                    let mut value_end = s.len();
                    while let Some(&(j, c)) = chars.peek() {
                        if c.is_whitespace() {
                            value_end = j;
                            break;
                        }
                        chars.next();
                    }
                    value = decode_entities(&s[i..value_end]);
                }
                None => {}
            }
        }

        if !name.is_empty() {
            attrs.push((name, value));
        }
    }

    attrs
}

/// Decode the handful of entities that show up in list labels.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').and_then(|semi| {
            let entity = &rest[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, semi))
        });

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenTag {
    List,
    Item,
    Span { counted: bool },
}

impl OpenTag {
    fn name(&self) -> &'static str {
        match self {
            OpenTag::List => "ul",
            OpenTag::Item => "li",
            OpenTag::Span { .. } => "span",
        }
    }
}

#[derive(Debug, Default)]
struct PendingItem {
    dom_id: Option<String>,
    text: String,
    span_text: String,
    span_depth: usize,
    group_depth: usize,
    has_group: bool,
    children: Vec<OutlineItem>,
}

impl PendingItem {
    fn finish(self) -> OutlineItem {
        let span_label = collapse_whitespace(&self.span_text);
        let label = if span_label.is_empty() {
            collapse_whitespace(&self.text)
        } else {
            span_label
        };

        OutlineItem {
            label,
            dom_id: self.dom_id,
            has_group: self.has_group,
            children: self.children,
        }
    }
}

/// Parse nested-list markup into its top-level items.
///
/// Items are returned in document order. A wrapping container such as a
/// `<div>` is allowed around the outermost list.
pub fn parse(markup: &str) -> Result<Vec<OutlineItem>> {
    let mut roots = Vec::new();
    let mut pending: Vec<PendingItem> = Vec::new();
    let mut open: Vec<(OpenTag, usize)> = Vec::new();
    let mut lexer = Lexer::new(markup);

    while let Some((offset, token)) = lexer.next_token()? {
        match token {
            Token::Open {
                name,
                attrs,
                self_closing,
            } => {
                if self_closing || VOID_TAGS.contains(&name.as_str()) {
                    continue;
                }
                match name.as_str() {
                    "ul" => {
                        if let Some(item) = pending.last_mut() {
                            if item.group_depth == 0 {
                                item.has_group = true;
                            }
                            item.group_depth += 1;
                        }
                        open.push((OpenTag::List, offset));
                    }
                    "li" => {
                        let dom_id = attrs
                            .into_iter()
                            .find(|(key, _)| key == "id")
                            .map(|(_, value)| value);
                        pending.push(PendingItem {
                            dom_id,
                            ..PendingItem::default()
                        });
                        open.push((OpenTag::Item, offset));
                    }
                    "span" => {
                        let counted = match pending.last_mut() {
                            Some(item) if item.group_depth == 0 => {
                                item.span_depth += 1;
                                true
                            }
                            _ => false,
                        };
                        open.push((OpenTag::Span { counted }, offset));
                    }
                    _ => {}
                }
            }
            Token::Close { name } => {
                if !matches!(name.as_str(), "ul" | "li" | "span") {
                    continue;
                }
                let (tag, _) = match open.pop() {
                    Some((tag, _)) if tag.name() == name => (tag, offset),
                    Some((tag, _)) => {
                        return Err(AriaTreeError::markup(
                            offset,
                            format!("</{}> does not match open <{}>", name, tag.name()),
                        ))
                    }
                    None => {
                        return Err(AriaTreeError::markup(
                            offset,
                            format!("unexpected </{}>", name),
                        ))
                    }
                };

                match tag {
                    OpenTag::List => {
                        if let Some(item) = pending.last_mut() {
                            item.group_depth = item.group_depth.saturating_sub(1);
                        }
                    }
                    OpenTag::Item => {
                        if let Some(item) = pending.pop() {
                            let finished = item.finish();
                            match pending.last_mut() {
                                Some(parent) => parent.children.push(finished),
                                None => roots.push(finished),
                            }
                        }
                    }
                    OpenTag::Span { counted } => {
                        if counted {
                            if let Some(item) = pending.last_mut() {
                                item.span_depth = item.span_depth.saturating_sub(1);
                            }
                        }
                    }
                }
            }
            Token::Text(text) => {
                if let Some(item) = pending.last_mut() {
                    if item.group_depth == 0 {
                        let decoded = decode_entities(text);
                        if item.span_depth > 0 {
                            item.span_text.push_str(&decoded);
                        }
                        item.text.push_str(&decoded);
                    }
                }
            }
        }
    }

    if let Some((tag, offset)) = open.last() {
        return Err(AriaTreeError::markup(
            *offset,
            format!("<{}> is never closed", tag.name()),
        ));
    }

    log::debug!("Markup: parsed {} top-level items", roots.len());
    Ok(roots)
}

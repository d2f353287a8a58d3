//! Owned markup tree for host pages and exercise fragments.
//!
//! Markup is read as XHTML: every element must be closed (`<br/>`, not
//! `<br>`), and only the five XML entities plus numeric character references
//! are understood.

use std::borrow::Cow;

use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use thiserror::Error;

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: [&str; 6] = ["br", "hr", "img", "input", "link", "meta"];

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MarkupError {
    #[error("malformed markup at byte {position}: {source}")]
    Syntax {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
    #[error("cannot decode markup at byte {position}: {message}")]
    Decode { position: u64, message: String },
    #[error("unexpected closing tag at byte {position}")]
    UnexpectedEnd { position: u64 },
    #[error("element <{name}> is never closed")]
    Unclosed { name: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Node {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(&escape(text.as_str())),
            Node::Element(el) => el.write_html(out),
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

impl Element {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(Node::Text(text.into()))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Sets `name`, overwriting an existing value in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name, value)),
        }
    }

    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Drops every child and installs `children` in their place.
    pub fn replace_children(&mut self, children: Vec<Node>) {
        self.children = children;
    }

    /// Replaces all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![Node::Text(text.into())];
    }

    /// Concatenated text of all descendants.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }
        if self.children.is_empty() && VOID_ELEMENTS.contains(&self.name.as_str()) {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            child.write_html(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(&el.children, out),
        }
    }
}

/// Serializes a node list back to markup.
#[must_use]
pub fn to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.write_html(&mut out);
    }
    out
}

/// Child-index path from a node list down to one element.
pub type NodePath = Vec<usize>;

/// Paths of every element matching `matches`, in document order.
///
/// Elements named in `opaque` are still tested but never descended into,
/// which keeps inert `<template>` content out of page-level queries.
#[must_use]
pub fn find_paths(
    nodes: &[Node],
    opaque: &str,
    matches: &dyn Fn(&Element) -> bool,
) -> Vec<NodePath> {
    let mut found = Vec::new();
    let mut prefix = Vec::new();
    walk_paths(nodes, opaque, matches, &mut prefix, &mut found);
    found
}

fn walk_paths(
    nodes: &[Node],
    opaque: &str,
    matches: &dyn Fn(&Element) -> bool,
    prefix: &mut NodePath,
    found: &mut Vec<NodePath>,
) {
    for (index, node) in nodes.iter().enumerate() {
        let Node::Element(el) = node else {
            continue;
        };
        prefix.push(index);
        if matches(el) {
            found.push(prefix.clone());
        }
        if el.name != opaque {
            walk_paths(&el.children, opaque, matches, prefix, found);
        }
        prefix.pop();
    }
}

#[must_use]
pub fn element_at<'a>(nodes: &'a [Node], path: &[usize]) -> Option<&'a Element> {
    let (first, rest) = path.split_first()?;
    let el = nodes.get(*first)?.as_element()?;
    if rest.is_empty() {
        Some(el)
    } else {
        element_at(&el.children, rest)
    }
}

pub fn element_at_mut<'a>(nodes: &'a mut [Node], path: &[usize]) -> Option<&'a mut Element> {
    let (first, rest) = path.split_first()?;
    let Node::Element(el) = nodes.get_mut(*first)? else {
        return None;
    };
    if rest.is_empty() {
        Some(el)
    } else {
        element_at_mut(&mut el.children, rest)
    }
}

/// Calls `visit` on every element in pre-order.
///
/// Children are visited after `visit` returns, so they reflect whatever the
/// callback installed.
pub fn for_each_element_mut(nodes: &mut [Node], visit: &mut dyn FnMut(&mut Element)) {
    for node in nodes {
        if let Node::Element(el) = node {
            visit(el);
            for_each_element_mut(&mut el.children, visit);
        }
    }
}

/// Parses a markup string into its top-level nodes.
///
/// # Errors
///
/// Returns `MarkupError` for malformed markup, undecodable text or entities,
/// and unbalanced tags.
pub fn parse(markup: &str) -> Result<Vec<Node>, MarkupError> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().trim_text(false);
    let mut stack: Vec<Element> = Vec::new();
    let mut roots: Vec<Node> = Vec::new();

    loop {
        let position = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(element_from_start(&reader, &start, position)?),
            Ok(Event::Empty(start)) => {
                let el = element_from_start(&reader, &start, position)?;
                append(&mut stack, &mut roots, Node::Element(el));
            }
            Ok(Event::End(_)) => {
                let el = stack.pop().ok_or(MarkupError::UnexpectedEnd { position })?;
                append(&mut stack, &mut roots, Node::Element(el));
            }
            Ok(Event::Text(text)) => {
                let text = text.decode().map_err(|err| MarkupError::Decode {
                    position,
                    message: err.to_string(),
                })?;
                append_text(&mut stack, &mut roots, &text);
            }
            Ok(Event::CData(data)) => {
                let text = decode(&reader, &data, position)?;
                append_text(&mut stack, &mut roots, &text);
            }
            Ok(Event::GeneralRef(entity)) => {
                let name = entity.decode().map_err(|err| MarkupError::Decode {
                    position,
                    message: err.to_string(),
                })?;
                let raw = format!("&{name};");
                let text = unescape_text(&raw, position)?;
                append_text(&mut stack, &mut roots, &text);
            }
            Ok(Event::Eof) => break,
            // Comments, declarations, processing instructions, doctype.
            Ok(_) => {}
            Err(source) => {
                return Err(MarkupError::Syntax {
                    position: reader.error_position(),
                    source,
                });
            }
        }
    }

    if let Some(open) = stack.pop() {
        return Err(MarkupError::Unclosed { name: open.name });
    }
    Ok(roots)
}

fn element_from_start(
    reader: &Reader<&[u8]>,
    start: &BytesStart<'_>,
    position: u64,
) -> Result<Element, MarkupError> {
    let name = decode(reader, start.name().as_ref(), position)?.to_ascii_lowercase();
    let mut el = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|err| MarkupError::Decode {
            position,
            message: err.to_string(),
        })?;
        let key = decode(reader, attr.key.as_ref(), position)?.to_ascii_lowercase();
        let raw = decode(reader, &attr.value, position)?;
        let value = unescape_text(&raw, position)?;
        el.attrs.push((key, value.into_owned()));
    }
    Ok(el)
}

fn decode<'b>(
    reader: &Reader<&[u8]>,
    raw: &'b [u8],
    position: u64,
) -> Result<Cow<'b, str>, MarkupError> {
    reader.decoder().decode(raw).map_err(|err| MarkupError::Decode {
        position,
        message: err.to_string(),
    })
}

fn unescape_text(raw: &str, position: u64) -> Result<Cow<'_, str>, MarkupError> {
    unescape(raw).map_err(|err| MarkupError::Decode {
        position,
        message: err.to_string(),
    })
}

fn append(stack: &mut [Element], roots: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

// Entity references arrive as separate events; merge them into the
// neighbouring text node.
fn append_text(stack: &mut [Element], roots: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    let siblings = match stack.last_mut() {
        Some(parent) => &mut parent.children,
        None => roots,
    };
    if let Some(Node::Text(last)) = siblings.last_mut() {
        last.push_str(text);
    } else {
        siblings.push(Node::Text(text.to_string()));
    }
}

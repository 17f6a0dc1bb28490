//! Minimal owned XML tree over quick-xml events.
//!
//! Keeps every text node, whitespace included, because the Burcat phase
//! heuristic counts child nodes.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::IoError;

// =============================================================================
// Tree
// =============================================================================

#[derive(Debug)]
enum NodeKind {
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    children: Vec<usize>,
}

/// A parsed document. Dropping it frees the whole tree.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: usize,
}

impl Document {
    pub fn parse_file(path: &Path) -> Result<Self, IoError> {
        let xml = std::fs::read_to_string(path).map_err(|e| IoError::io(path, e))?;
        Self::parse_str(&xml).map_err(|msg| IoError::xml(path, msg))
    }

    pub fn parse_str(xml: &str) -> Result<Self, String> {
        let mut reader = Reader::from_str(xml);
        let mut nodes: Vec<Node> = Vec::new();
        let mut stack: Vec<usize> = Vec::new();
        let mut root: Option<usize> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| format!("at byte {}: {e}", reader.buffer_position()))?;
            match event {
                Event::Start(ref e) => {
                    let id = push_element(&mut nodes, e);
                    attach(&mut nodes, &stack, &mut root, id)?;
                    stack.push(id);
                }
                Event::Empty(ref e) => {
                    let id = push_element(&mut nodes, e);
                    attach(&mut nodes, &stack, &mut root, id)?;
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(ref e) => {
                    let raw = String::from_utf8_lossy(e.as_ref());
                    push_text(&mut nodes, &stack, &unescape_xml(&raw))?;
                }
                Event::CData(ref e) => {
                    push_text(&mut nodes, &stack, &String::from_utf8_lossy(e.as_ref()))?;
                }
                Event::GeneralRef(ref e) => {
                    let name = String::from_utf8_lossy(e.as_ref());
                    push_text(&mut nodes, &stack, &resolve_entity(&name))?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(&open) = stack.last() {
            return Err(format!(
                "unexpected end of document: <{}> is not closed",
                element_name(&nodes[open])
            ));
        }
        let root = root.ok_or_else(|| "document has no root element".to_string())?;
        Ok(Self { nodes, root })
    }

    pub fn root(&self) -> Element<'_> {
        Element {
            doc: self,
            id: self.root,
        }
    }
}

fn push_element(nodes: &mut Vec<Node>, e: &BytesStart<'_>) -> usize {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
    let attributes = e
        .attributes()
        .flatten()
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
            let value = unescape_xml(&String::from_utf8_lossy(&attr.value));
            (key, value)
        })
        .collect();
    nodes.push(Node {
        kind: NodeKind::Element { name, attributes },
        children: Vec::new(),
    });
    nodes.len() - 1
}

fn attach(
    nodes: &mut [Node],
    stack: &[usize],
    root: &mut Option<usize>,
    id: usize,
) -> Result<(), String> {
    match stack.last() {
        Some(&parent) => nodes[parent].children.push(id),
        None if root.is_none() => *root = Some(id),
        None => return Err("document has more than one root element".into()),
    }
    Ok(())
}

/// Append text to the open element, merging with a preceding text node.
fn push_text(nodes: &mut Vec<Node>, stack: &[usize], text: &str) -> Result<(), String> {
    let Some(&parent) = stack.last() else {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(format!("text outside the root element: {:?}", text.trim()));
    };

    if let Some(&last) = nodes[parent].children.last() {
        if let NodeKind::Text(ref mut existing) = nodes[last].kind {
            existing.push_str(text);
            return Ok(());
        }
    }

    nodes.push(Node {
        kind: NodeKind::Text(text.to_string()),
        children: Vec::new(),
    });
    let id = nodes.len() - 1;
    nodes[parent].children.push(id);
    Ok(())
}

fn element_name(node: &Node) -> &str {
    match &node.kind {
        NodeKind::Element { name, .. } => name,
        NodeKind::Text(_) => "#text",
    }
}

// =============================================================================
// Entities
// =============================================================================

/// Unescape the 5 predefined XML entities: &amp; &lt; &gt; &quot; &apos;
fn unescape_xml(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Resolve a general reference by name (`amp`, `#38`, `#x26`).
/// Unknown entities are kept verbatim.
fn resolve_entity(name: &str) -> String {
    let resolved = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => name
            .strip_prefix("#x")
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .or_else(|| name.strip_prefix('#').and_then(|dec| dec.parse().ok()))
            .and_then(char::from_u32),
    };
    match resolved {
        Some(c) => c.to_string(),
        None => format!("&{name};"),
    }
}

// =============================================================================
// Navigation
// =============================================================================

/// Borrowed view of one element.
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    doc: &'a Document,
    id: usize,
}

impl<'a> Element<'a> {
    fn node(&self) -> &'a Node {
        &self.doc.nodes[self.id]
    }

    pub fn name(&self) -> &'a str {
        element_name(self.node())
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        match &self.node().kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    /// Number of child nodes of any kind, text included.
    pub fn child_count(&self) -> usize {
        self.node().children.len()
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        self.node()
            .children
            .iter()
            .filter_map(|&c| match &self.doc.nodes[c].kind {
                NodeKind::Text(t) => Some(t.as_str()),
                NodeKind::Element { .. } => None,
            })
            .collect()
    }

    /// Every descendant element called `name`, in document order. Excludes self.
    pub fn descendants(&self, name: &'a str) -> Descendants<'a> {
        let mut stack: Vec<usize> = self.node().children.clone();
        stack.reverse();
        Descendants {
            doc: self.doc,
            stack,
            name,
        }
    }

    /// First descendant element called `name`.
    pub fn first(&self, name: &'a str) -> Option<Element<'a>> {
        self.descendants(name).next()
    }
}

/// Pre-order walk yielding elements with a given name.
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<usize>,
    name: &'a str,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = Element<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            let node = &self.doc.nodes[id];
            self.stack.extend(node.children.iter().rev());
            if let NodeKind::Element { name, .. } = &node.kind {
                if name == self.name {
                    return Some(Element { doc: self.doc, id });
                }
            }
        }
        None
    }
}

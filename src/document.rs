//! Typed HTML document tree.
//!
//! Parsing is delegated to `scraper`; the parsed tree is converted into an
//! owned [`Node`] tree so the extractor and composer work against explicit
//! query and construction operations instead of raw selector plumbing.
//! Serialization back to markup and plain-text flattening both live here,
//! so every structural assumption about the alert layout is checked in one
//! place.

use scraper::Html;

/// A single node in the owned document tree.
///
/// Comments, doctypes, and processing instructions are dropped during
/// conversion; only elements and text survive. Whitespace-only text nodes
/// are kept — they count as siblings when slicing entry windows, exactly
/// as they appear in the source markup.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element node: tag name, attributes in source order, children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Tags that never have closing markup.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
    "source", "track", "wbr",
];

/// Tags whose text is invisible in a rendered message.
const HIDDEN_ELEMENTS: &[&str] = &["head", "script", "style", "title"];

/// Tags that end a line when flattening to plain text.
const BLOCK_ELEMENTS: &[&str] = &[
    "div", "p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "table",
];

impl Element {
    /// Create an empty element.
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// First descendant element with the given tag, depth-first.
    pub fn first_descendant(&self, tag: &str) -> Option<&Element> {
        for child in &self.children {
            if let Node::Element(el) = child {
                if el.tag == tag {
                    return Some(el);
                }
                if let Some(found) = el.first_descendant(tag) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Whether any descendant element has the given tag.
    pub fn has_descendant(&self, tag: &str) -> bool {
        self.first_descendant(tag).is_some()
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(el) => out.push_str(&el.text()),
            }
        }
        out
    }
}

impl Node {
    /// Build a `<div><b>text</b></div>` block, as used for the subjects line.
    pub fn bold_block(text: &str) -> Node {
        let mut bold = Element::new("b");
        bold.children.push(Node::Text(text.to_string()));
        let mut block = Element::new("div");
        block.children.push(Node::Element(bold));
        Node::Element(block)
    }

    /// Build a `<br>` separator.
    pub fn line_break() -> Node {
        Node::Element(Element::new("br"))
    }

    /// The element behind this node, if it is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    /// Whether this node is an element with the given tag.
    pub fn is_element(&self, tag: &str) -> bool {
        self.as_element().is_some_and(|el| el.tag == tag)
    }

    /// First descendant element with the given tag, depth-first.
    pub fn first_descendant(&self, tag: &str) -> Option<&Element> {
        self.as_element().and_then(|el| el.first_descendant(tag))
    }

    /// Whether any descendant element has the given tag.
    pub fn has_descendant(&self, tag: &str) -> bool {
        self.first_descendant(tag).is_some()
    }

    /// Serialize this node to HTML markup.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_html(self, &mut out);
        out
    }
}

/// An owned HTML document.
///
/// The root is always the `<html>` element; the html5ever tree builder
/// behind `scraper` guarantees one exists even for malformed input, so
/// parsing cannot fail. Absent structure shows up later as a missing
/// content container.
#[derive(Debug, Clone)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Parse an HTML string into an owned document tree.
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let root = match convert(*parsed.root_element()) {
            Some(Node::Element(el)) => el,
            _ => Element::new("html"),
        };
        Self { root }
    }

    /// The content container: the first `div` under `body`.
    ///
    /// All alert entries live as direct children of this node, and the
    /// composed digest is appended under it.
    pub fn content_container(&self) -> Option<&Element> {
        self.root
            .first_descendant("body")
            .and_then(|body| body.first_descendant("div"))
    }

    /// Mutable access to the content container.
    pub fn content_container_mut(&mut self) -> Option<&mut Element> {
        let body = first_descendant_mut(&mut self.root, "body")?;
        first_descendant_mut(body, "div")
    }

    /// Serialize the whole document to HTML markup.
    pub fn serialize(&self) -> String {
        Node::Element(self.root.clone()).to_html()
    }

    /// Flatten all visible text into a plain-text rendering.
    ///
    /// Block-level elements and `<br>` end a line; head/script/style
    /// content is skipped.
    pub fn visible_text(&self) -> String {
        let mut out = String::new();
        flatten_text(&self.root, &mut out);
        let trimmed: Vec<&str> = out.lines().map(str::trim_end).collect();
        let mut text = trimmed.join("\n");
        while text.ends_with('\n') {
            text.pop();
        }
        text.trim_start_matches('\n').to_string()
    }
}

/// Convert one `scraper` node (and its subtree) into an owned node.
fn convert(node: ego_tree::NodeRef<'_, scraper::Node>) -> Option<Node> {
    match node.value() {
        scraper::Node::Element(el) => {
            let tag = el.name().to_string();
            let attrs = el
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            let children = node.children().filter_map(convert).collect();
            Some(Node::Element(Element {
                tag,
                attrs,
                children,
            }))
        }
        scraper::Node::Text(t) => Some(Node::Text(t.text.to_string())),
        _ => None,
    }
}

/// Depth-first mutable search for the first descendant with a tag.
fn first_descendant_mut<'a>(el: &'a mut Element, tag: &str) -> Option<&'a mut Element> {
    for child in &mut el.children {
        if let Node::Element(inner) = child {
            if inner.tag == tag {
                return Some(inner);
            }
            if let Some(found) = first_descendant_mut(inner, tag) {
                return Some(found);
            }
        }
    }
    None
}

fn write_html(node: &Node, out: &mut String) {
    match node {
        Node::Text(t) => out.push_str(&escape_text(t)),
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                return;
            }
            for child in &el.children {
                write_html(child, out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}

fn flatten_text(el: &Element, out: &mut String) {
    if HIDDEN_ELEMENTS.contains(&el.tag.as_str()) {
        return;
    }
    if el.tag == "br" {
        out.push('\n');
        return;
    }
    for child in &el.children {
        match child {
            Node::Text(t) => out.push_str(t),
            Node::Element(inner) => flatten_text(inner, out),
        }
    }
    if BLOCK_ELEMENTS.contains(&el.tag.as_str()) && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

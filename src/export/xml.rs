//! Minimal XML tree and writer
//!
//! Exporters build an `XmlElement` tree and hand it to `XmlWriter`, keeping
//! element ordering decisions separate from text rendering.

use std::fmt::{self, Write as _};
use std::io::Write;

use crate::error::{LedgerError, LedgerResult};

const INDENT: &str = "  ";

/// A node in an XML tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An XML element with ordered children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Create an element holding a single text node
    pub fn text_element(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name).with_text(text)
    }

    /// Append a child element
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.push(child);
        self
    }

    /// Append a text node
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Append a child element in place
    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Element name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Child elements in order, skipping text
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// First direct child element with the given name
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        self.child_elements().find(|e| e.name == name)
    }

    /// All direct child elements with the given name
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.child_elements().filter(move |e| e.name == name)
    }

    /// Concatenated text of the direct text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Text of the first direct child with the given name
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.find(name).map(XmlElement::text)
    }

    fn write_indented(&self, out: &mut impl fmt::Write, depth: usize) -> fmt::Result {
        let pad = INDENT.repeat(depth);
        write!(out, "{}<{}", pad, self.name)?;

        if self.children.is_empty() {
            return writeln!(out, "/>");
        }

        let text_only = self
            .children
            .iter()
            .all(|node| matches!(node, XmlNode::Text(_)));
        if text_only {
            return writeln!(out, ">{}</{}>", escape(&self.text()), self.name);
        }

        writeln!(out, ">")?;
        for node in &self.children {
            match node {
                XmlNode::Element(child) => child.write_indented(out, depth + 1)?,
                XmlNode::Text(text) => writeln!(out, "{}{}{}", pad, INDENT, escape(text))?,
            }
        }
        writeln!(out, "{}</{}>", pad, self.name)
    }
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

/// Escape the five XML special characters
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Writes XML trees, declarations and processing instructions to a byte sink
pub struct XmlWriter<W: Write> {
    inner: W,
}

impl<W: Write> XmlWriter<W> {
    /// Wrap a writer
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Write the standard XML declaration
    pub fn write_declaration(&mut self) -> LedgerResult<()> {
        self.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n")
    }

    /// Write a processing instruction such as `<?OFX ...?>`
    pub fn write_processing_instruction(&mut self, target: &str, data: &str) -> LedgerResult<()> {
        let mut line = String::new();
        writeln!(line, "<?{} {}?>", target, data)
            .map_err(|e| LedgerError::Export(e.to_string()))?;
        self.write_str(&line)
    }

    /// Write an element tree, indented with two spaces
    pub fn write_element(&mut self, element: &XmlElement) -> LedgerResult<()> {
        self.write_str(&element.to_string())
    }

    /// Flush and return the wrapped writer
    pub fn into_inner(mut self) -> LedgerResult<W> {
        self.inner
            .flush()
            .map_err(|e| LedgerError::Export(format!("Failed to flush XML output: {}", e)))?;
        Ok(self.inner)
    }

    fn write_str(&mut self, s: &str) -> LedgerResult<()> {
        self.inner
            .write_all(s.as_bytes())
            .map_err(|e| LedgerError::Export(format!("Failed to write XML output: {}", e)))
    }
}

//! Lightweight XML document model
//!
//! Parsed with `quick-xml`'s pull reader into an owned element tree. Only
//! well-formed documents with a single root element are accepted.

use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Reasons a body could not be parsed as an XML document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlParseError {
    #[error("XML syntax error: {0}")]
    Syntax(String),

    #[error("Body is not valid UTF-8")]
    InvalidUtf8,

    #[error("Document has no root element")]
    NoRoot,

    #[error("Document has more than one root element")]
    MultipleRoots,

    #[error("Text content outside the root element")]
    TextOutsideRoot,

    #[error("Element <{0}> is never closed")]
    Unclosed(String),

    #[error("Expected </{expected}>, found </{found}>")]
    MismatchedEnd { expected: String, found: String },

    #[error("Unknown entity reference '&{0};'")]
    UnknownEntity(String),

    #[error("Elements nested deeper than {0} levels")]
    TooDeep(usize),
}

/// Maximum element nesting accepted by [`XmlDocument::parse`]
pub const MAX_DEPTH: usize = 256;

/// A parsed XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    pub root: XmlElement,
}

/// Element node with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

impl XmlDocument {
    /// Parse a complete document
    pub fn parse(input: &str) -> Result<Self, XmlParseError> {
        let mut reader = Reader::from_str(input);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event().map_err(syntax)? {
                Event::Start(start) => {
                    check_depth(&stack)?;
                    stack.push(element_from(&start)?);
                }
                Event::Empty(start) => {
                    check_depth(&stack)?;
                    let element = element_from(&start)?;
                    close_element(element, &mut stack, &mut root)?;
                }
                Event::End(end) => {
                    let found = utf8(end.name().as_ref())?.to_string();
                    let element = stack.pop().ok_or_else(|| {
                        XmlParseError::Syntax(format!("unexpected </{}>", found))
                    })?;
                    if element.name != found {
                        return Err(XmlParseError::MismatchedEnd {
                            expected: element.name,
                            found,
                        });
                    }
                    close_element(element, &mut stack, &mut root)?;
                }
                Event::Text(text) => {
                    let text = text.decode().map_err(syntax)?;
                    push_text(&text, &mut stack)?;
                }
                Event::CData(cdata) => {
                    let text = cdata.decode().map_err(syntax)?;
                    push_text(&text, &mut stack)?;
                }
                Event::GeneralRef(reference) => {
                    let name = reference.decode().map_err(syntax)?;
                    let resolved = match reference.resolve_char_ref().map_err(syntax)? {
                        Some(ch) => ch.to_string(),
                        None => resolve_predefined_entity(&name)
                            .ok_or_else(|| XmlParseError::UnknownEntity(name.to_string()))?
                            .to_string(),
                    };
                    push_text(&resolved, &mut stack)?;
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctype
                _ => {}
            }
        }

        if let Some(open) = stack.pop() {
            return Err(XmlParseError::Unclosed(open.name));
        }
        root.map(|root| Self { root }).ok_or(XmlParseError::NoRoot)
    }

    /// Parse raw bytes, requiring UTF-8
    pub fn parse_bytes(input: &[u8]) -> Result<Self, XmlParseError> {
        let input = std::str::from_utf8(input).map_err(|_| XmlParseError::InvalidUtf8)?;
        Self::parse(input)
    }
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Get an attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// First child element with the given name
    pub fn child<'a>(&'a self, name: &str) -> Option<&'a XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    /// All child elements with the given name
    pub fn children_named(&self, name: &str) -> Vec<&XmlElement> {
        self.elements().filter(|e| e.name == name).collect()
    }

    /// All child elements
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// Concatenated text of this element and its descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(element: &XmlElement, out: &mut String) {
    for node in &element.children {
        match node {
            XmlNode::Text(t) => out.push_str(t),
            XmlNode::Element(e) => collect_text(e, out),
        }
    }
}

// Tree depth is bounded so recursive drop, clone and text() stay shallow
fn check_depth(stack: &[XmlElement]) -> Result<(), XmlParseError> {
    if stack.len() >= MAX_DEPTH {
        return Err(XmlParseError::TooDeep(MAX_DEPTH));
    }
    Ok(())
}

fn syntax<E: std::fmt::Display>(err: E) -> XmlParseError {
    XmlParseError::Syntax(err.to_string())
}

fn utf8(bytes: &[u8]) -> Result<&str, XmlParseError> {
    std::str::from_utf8(bytes).map_err(|_| XmlParseError::InvalidUtf8)
}

fn element_from(start: &BytesStart<'_>) -> Result<XmlElement, XmlParseError> {
    let mut element = XmlElement::new(utf8(start.name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr.map_err(syntax)?;
        let key = utf8(attr.key.as_ref())?.to_string();
        let value = unescape(utf8(&attr.value)?).map_err(syntax)?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn close_element(
    element: XmlElement,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
) -> Result<(), XmlParseError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Element(element));
            Ok(())
        }
        None if root.is_some() => Err(XmlParseError::MultipleRoots),
        None => {
            *root = Some(element);
            Ok(())
        }
    }
}

fn push_text(text: &str, stack: &mut [XmlElement]) -> Result<(), XmlParseError> {
    let Some(parent) = stack.last_mut() else {
        return if text.trim().is_empty() {
            Ok(())
        } else {
            Err(XmlParseError::TextOutsideRoot)
        };
    };

    // Entity references arrive as separate events; merge adjacent text
    if let Some(XmlNode::Text(previous)) = parent.children.last_mut() {
        previous.push_str(text);
    } else if !text.trim().is_empty() {
        parent.children.push(XmlNode::Text(text.to_string()));
    }
    Ok(())
}

//! Minimal XML element tree used by the metadata parsers.
//!
//! Repository metadata documents are small, so they are materialized into a
//! tree of named elements before typed field extraction. Repeated children
//! land in a plain `Vec`, so a document carrying a single element and one
//! carrying a list go through the same access path.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A parsed XML element: name, attributes, child elements, and trimmed text.
#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub name: String,
    pub attributes: HashMap<String, String>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    /// Parse a document into its root element.
    ///
    /// Errors are plain reason strings; callers wrap them with the document
    /// context.
    pub fn parse(xml: &[u8]) -> Result<Element, String> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(start)) => {
                    stack.push(Self::from_start(&start)?);
                }
                Ok(Event::Empty(start)) => {
                    let element = Self::from_start(&start)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None if root.is_none() => root = Some(element),
                        None => return Err("multiple root elements".to_string()),
                    }
                }
                Ok(Event::Text(text)) => {
                    if let Some(element) = stack.last_mut() {
                        let unescaped = text.unescape().map_err(|e| e.to_string())?;
                        let trimmed = unescaped.trim();
                        if !trimmed.is_empty() {
                            element.text.push_str(trimmed);
                        }
                    }
                }
                Ok(Event::CData(cdata)) => {
                    if let Some(element) = stack.last_mut() {
                        let raw = cdata.into_inner();
                        let value = String::from_utf8_lossy(&raw);
                        let trimmed = value.trim();
                        if !trimmed.is_empty() {
                            element.text.push_str(trimmed);
                        }
                    }
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| "unbalanced closing tag".to_string())?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None if root.is_none() => root = Some(element),
                        None => return Err("multiple root elements".to_string()),
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(e.to_string()),
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err("unexpected end of document".to_string());
        }

        root.ok_or_else(|| "document has no root element".to_string())
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Element, String> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = HashMap::new();

        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| e.to_string())?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|e| e.to_string())?
                .into_owned();
            attributes.insert(key, value);
        }

        Ok(Element {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    /// All child elements with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// First child element with the given name, or a missing-field reason.
    pub fn require_child(&self, name: &str) -> Result<&Element, String> {
        self.children
            .iter()
            .find(|child| child.name == name)
            .ok_or_else(|| format!("missing field `{}` in <{}>", name, self.name))
    }

    /// Text content of a required child element.
    pub fn require_child_text(&self, name: &str) -> Result<&str, String> {
        let child = self.require_child(name)?;
        if child.text.is_empty() {
            return Err(format!("empty field `{}` in <{}>", name, self.name));
        }
        Ok(&child.text)
    }

    /// Value of a required attribute on this element.
    pub fn require_attr(&self, name: &str) -> Result<&str, String> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| format!("missing attribute `{}` on <{}>", name, self.name))
    }
}

//! XML document handling.
//!
//! # Data Flow
//! ```text
//! XML text (RPC response, backend document, bus event)
//!     → parse() builds an Element tree (quick-xml pull reader)
//!     → Element::to_json() for documents returned to clients
//!     → rpc::codec walks the tree for methodResponse decoding
//! ```
//!
//! # Design Decisions
//! - Attributes are ignored; the orchestrator encodes everything as elements
//! - CDATA and text are merged into a single text value per element
//! - Repeated sibling names become JSON arrays, single ones stay objects

use quick_xml::events::Event;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::Reader;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors produced while reading an XML document.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("malformed XML: {0}")]
    Malformed(String),

    #[error("unexpected closing tag </{0}>")]
    UnbalancedTag(String),

    #[error("document has no root element")]
    Empty,

    #[error("unknown entity &{0};")]
    UnknownEntity(String),
}

/// One XML element with its children and accumulated text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Walk a slash separated path of child names, e.g. `TEMPLATE/FIREEDGE`.
    pub fn find(&self, path: &str) -> Option<&Element> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(self, |el, name| el.child(name))
    }

    /// Trimmed text of a descendant, if present and non-empty.
    pub fn find_text(&self, path: &str) -> Option<&str> {
        self.find(path)
            .map(|el| el.text.trim())
            .filter(|t| !t.is_empty())
    }

    /// Direct children with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Convert to JSON keyed by the element name: `<A><B>1</B></A>` becomes
    /// `{"A": {"B": "1"}}`.
    pub fn to_json(&self) -> Value {
        let mut root = Map::new();
        root.insert(self.name.clone(), self.body_to_json());
        Value::Object(root)
    }

    fn body_to_json(&self) -> Value {
        if self.children.is_empty() {
            return Value::String(self.text.trim().to_string());
        }

        let mut map = Map::new();
        for child in &self.children {
            let value = child.body_to_json();
            match map.get_mut(&child.name) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    map.insert(child.name.clone(), value);
                }
            }
        }
        Value::Object(map)
    }
}

/// Parse a document and return its root element.
pub fn parse(input: &str) -> Result<Element, XmlError> {
    // Text is not trimmed by the reader: entity references arrive as
    // separate events and trimming would eat the spaces around them.
    let mut reader = Reader::from_str(input);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| XmlError::Malformed(e.to_string()))?;

        match event {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                stack.push(Element::new(name));
            }
            Event::Empty(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                attach(&mut stack, &mut root, Element::new(name))?;
            }
            Event::End(end) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                let element = stack.pop().ok_or_else(|| XmlError::UnbalancedTag(name.clone()))?;
                if element.name != name {
                    return Err(XmlError::UnbalancedTag(name));
                }
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let raw = String::from_utf8_lossy(text.as_ref());
                    let decoded = unescape(&raw).map_err(|e| XmlError::Malformed(e.to_string()))?;
                    current.text.push_str(&decoded);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(data.as_ref()));
                }
            }
            Event::GeneralRef(reference) => {
                if let Some(current) = stack.last_mut() {
                    let name = String::from_utf8_lossy(reference.as_ref()).into_owned();
                    current.text.push_str(&resolve_reference(&name)?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Malformed(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or(XmlError::Empty)
}

/// Parse and convert in one step.
pub fn to_json(input: &str) -> Result<Value, XmlError> {
    parse(input).map(|root| root.to_json())
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(XmlError::Malformed("multiple root elements".into())),
    }
    Ok(())
}

fn resolve_reference(name: &str) -> Result<String, XmlError> {
    if let Some(code) = name.strip_prefix('#') {
        let parsed = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        return parsed
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| XmlError::UnknownEntity(name.to_string()));
    }
    resolve_predefined_entity(name)
        .map(str::to_string)
        .ok_or_else(|| XmlError::UnknownEntity(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_document_to_json() {
        let doc = "<HOST><ID>5</ID><NAME>node-1</NAME><TEMPLATE><CPU>4</CPU></TEMPLATE></HOST>";
        assert_eq!(
            to_json(doc).unwrap(),
            json!({"HOST": {"ID": "5", "NAME": "node-1", "TEMPLATE": {"CPU": "4"}}})
        );
    }

    #[test]
    fn test_repeated_siblings_become_array() {
        let doc = "<POOL><VM><ID>1</ID></VM><VM><ID>2</ID></VM><VM><ID>3</ID></VM></POOL>";
        assert_eq!(
            to_json(doc).unwrap(),
            json!({"POOL": {"VM": [{"ID": "1"}, {"ID": "2"}, {"ID": "3"}]}})
        );
    }

    #[test]
    fn test_cdata_entities_and_empty_elements() {
        let doc = "<USER><NAME><![CDATA[oneadmin]]></NAME><NOTE>a &amp; b &#65;</NOTE><EMPTY/></USER>";
        let root = parse(doc).unwrap();
        assert_eq!(root.find_text("NAME"), Some("oneadmin"));
        assert_eq!(root.find_text("NOTE"), Some("a & b A"));
        assert!(root.child("EMPTY").is_some());
        assert_eq!(root.find_text("EMPTY"), None);
    }

    #[test]
    fn test_find_path() {
        let doc = "<USER><TEMPLATE><FIREEDGE><SECRET>abc</SECRET></FIREEDGE></TEMPLATE></USER>";
        let root = parse(doc).unwrap();
        assert_eq!(root.find_text("TEMPLATE/FIREEDGE/SECRET"), Some("abc"));
        assert!(root.find("TEMPLATE/SUNSTONE").is_none());
    }

    #[test]
    fn test_malformed_documents() {
        assert!(parse("").is_err());
        assert!(parse("<A><B></A>").is_err());
        assert!(parse("<A>").is_err());
        assert!(parse("not xml at all").is_err());
    }
}

//! A minimal owned element tree with resolved namespaces.
//!
//! The weather document is small (a few dozen stations), so building the whole
//! tree up front keeps the lookups below close to the XPath-like queries the
//! format is usually described with.

use crate::weather::error::GmlError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

pub(crate) const GML_NS: &str = "http://www.opengis.net/gml/3.2";
pub(crate) const OMSO_NS: &str = "http://inspire.ec.europa.eu/schemas/omso/3.0";
pub(crate) const SWE_NS: &str = "http://www.opengis.net/swe/1.0/gml32";

#[derive(Debug, Clone, Default)]
pub(crate) struct Element {
    pub namespace: Option<String>,
    pub name: String,
    attributes: Vec<(String, String)>,
    /// Concatenated character data of the direct text children.
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn open(ns: ResolveResult, start: &BytesStart) -> Result<Self, GmlError> {
        let namespace = match ns {
            ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
            _ => None,
        };
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }

        Ok(Element {
            namespace,
            name,
            attributes,
            text: String::new(),
            children: Vec::new(),
        })
    }

    pub fn is(&self, ns: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(ns)
    }

    /// Attribute value by local name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First direct child with the given name.
    pub fn child(&self, ns: &str, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.is(ns, name))
    }

    /// First descendant (not self) in document order.
    pub fn find(&self, ns: &str, name: &str) -> Option<&Element> {
        for child in &self.children {
            if child.is(ns, name) {
                return Some(child);
            }
            if let Some(found) = child.find(ns, name) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants (not self) in document order.
    pub fn find_all<'a>(&'a self, ns: &str, name: &str) -> Vec<&'a Element> {
        let mut out = Vec::new();
        self.collect(ns, name, &mut out);
        out
    }

    fn collect<'a>(&'a self, ns: &str, name: &str, out: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.is(ns, name) {
                out.push(child);
            }
            child.collect(ns, name, out);
        }
    }
}

/// Parses `xml` into its root element.
pub(crate) fn parse(xml: &str) -> Result<Element, GmlError> {
    let mut reader = NsReader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_resolved_event()? {
            (ns, Event::Start(e)) => stack.push(Element::open(ns, &e)?),
            (ns, Event::Empty(e)) => {
                let element = Element::open(ns, &e)?;
                attach(&mut stack, &mut root, element)?;
            }
            (_, Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or(GmlError::Document("closing tag without opening tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            (_, Event::Text(t)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&t.unescape()?);
                }
            }
            (_, Event::CData(c)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            (_, Event::Eof) => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(GmlError::Document("unclosed element at end of input"));
    }
    root.ok_or(GmlError::Document("no root element"))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), GmlError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(GmlError::Document("more than one root element")),
    }
    Ok(())
}

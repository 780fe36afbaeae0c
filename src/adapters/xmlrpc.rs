// Copyright (c) 2025 - Cowboy AI, Inc.
//! Minimal XML-RPC Codec
//!
//! Just enough of XML-RPC to talk to OpenNebula: encode a `methodCall` with
//! string and integer parameters, and decode a `methodResponse` into its
//! values or fault. Documents are read into a small element tree first.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::errors::{InventoryError, InventoryResult};

/// Element with its text and child elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    fn from_start(start: &BytesStart<'_>) -> Self {
        Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            ..Self::default()
        }
    }

    /// First child with the given element name
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given element name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the first child with the given name
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    /// Follow a chain of child names
    pub fn path(&self, names: &[&str]) -> Option<&XmlNode> {
        names.iter().try_fold(self, |node, name| node.child(name))
    }
}

/// Parse a document into its root element
pub fn parse_tree(xml: &str) -> InventoryResult<XmlNode> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(XmlNode::from_start(&start)),
            Event::Empty(start) => attach(&mut stack, &mut root, XmlNode::from_start(&start)),
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    let text = text
                        .unescape()
                        .map_err(|e| InventoryError::MalformedResponse(e.to_string()))?;
                    top.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                let node = stack.pop().ok_or_else(|| {
                    InventoryError::MalformedResponse("unbalanced end tag".to_string())
                })?;
                attach(&mut stack, &mut root, node);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(InventoryError::MalformedResponse(
            "document ended inside an element".to_string(),
        ));
    }
    root.ok_or_else(|| InventoryError::MalformedResponse("empty document".to_string()))
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}

/// A method call parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param<'a> {
    Str(&'a str),
    Int(i32),
}

/// Encode a `methodCall` document
pub fn method_call(method: &str, params: &[Param<'_>]) -> String {
    let mut body = String::from("<?xml version=\"1.0\"?>\n<methodCall><methodName>");
    body.push_str(&escape(method));
    body.push_str("</methodName><params>");
    for param in params {
        body.push_str("<param><value>");
        match param {
            Param::Str(s) => {
                body.push_str("<string>");
                body.push_str(&escape(*s));
                body.push_str("</string>");
            }
            Param::Int(i) => body.push_str(&format!("<i4>{}</i4>", i)),
        }
        body.push_str("</value></param>");
    }
    body.push_str("</params></methodCall>");
    body
}

/// Scalar text of a `<value>`, with or without a type element
pub fn value_text(value: &XmlNode) -> &str {
    value
        .children
        .first()
        .map(|typed| typed.text.as_str())
        .unwrap_or(value.text.as_str())
}

/// Decode a `methodResponse`
///
/// Returns the `<value>` elements of the result array. A `<fault>` reply is
/// reported as [`InventoryError::SourceUnavailable`].
pub fn method_response(xml: &str) -> InventoryResult<Vec<XmlNode>> {
    let root = parse_tree(xml)?;
    if root.name != "methodResponse" {
        return Err(InventoryError::MalformedResponse(format!(
            "expected methodResponse, found {}",
            root.name
        )));
    }

    if let Some(fault) = root.child("fault") {
        let message = fault
            .path(&["value", "struct"])
            .into_iter()
            .flat_map(|s| s.children_named("member"))
            .find(|member| member.child_text("name") == Some("faultString"))
            .and_then(|member| member.child("value"))
            .map(value_text)
            .unwrap_or("unknown fault");
        return Err(InventoryError::SourceUnavailable(format!(
            "XML-RPC fault: {}",
            message
        )));
    }

    let data = root
        .path(&["params", "param", "value", "array", "data"])
        .ok_or_else(|| InventoryError::MalformedResponse("missing result array".to_string()))?;
    Ok(data.children_named("value").cloned().collect())
}

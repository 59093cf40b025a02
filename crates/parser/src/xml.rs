//! XML loading: text to [`Element`] tree.

use crate::dom::{Element, Node};
use crate::error::ParseError;
use tracing::trace;

/// Parse XML text and return its root element.
///
/// Only elements, attributes and text survive the conversion; comments
/// and processing instructions are dropped.
pub fn load_document(text: &str) -> Result<Element, ParseError> {
    let document = roxmltree::Document::parse(text).map_err(|e| ParseError::MalformedXml {
        message: e.to_string(),
    })?;
    let root = convert(document.root_element());
    trace!(root = %root.name, "loaded XML document");
    Ok(root)
}

fn convert(node: roxmltree::Node<'_, '_>) -> Element {
    let mut element = Element::new(node.tag_name().name());
    element.attributes = node
        .attributes()
        .map(|attr| (attr.name().to_string(), attr.value().to_string()))
        .collect();

    for child in node.children() {
        if child.is_element() {
            element.children.push(Node::Element(convert(child)));
        } else if child.is_text() {
            if let Some(text) = child.text() {
                element.children.push(Node::Text(text.to_string()));
            }
        }
    }

    element
}

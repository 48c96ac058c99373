//! HTML parsing and manipulation using html5ever
//!
//! Provides utilities for:
//! - Parsing XHTML content files into a DOM tree
//! - Querying elements, attributes, and text content
//! - Mutating the tree (insert, append, remove)
//! - Serializing back to markup

use std::cell::RefCell;
use std::default::Default;
use std::rc::Rc;

use html5ever::parse_document;
use html5ever::serialize::{SerializeOpts, serialize};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{Attribute, LocalName, ParseOpts, QualName, namespace_url, ns};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};

/// Parse HTML content into a DOM tree
pub(crate) fn parse_html(html: &str) -> RcDom {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: false,
            ..Default::default()
        },
        ..Default::default()
    };

    parse_document(RcDom::default(), opts)
        .from_utf8()
        .one(html.as_bytes())
}

/// Serialize a DOM tree back to an HTML string
pub(crate) fn serialize_html(dom: &RcDom) -> String {
    let mut bytes = Vec::new();
    let document: SerializableHandle = dom.document.clone().into();

    serialize(&mut bytes, &document, SerializeOpts::default()).expect("serialization failed");

    String::from_utf8(bytes).unwrap_or_default()
}

/// Find elements by local name in a DOM tree
pub(crate) fn find_elements_by_name(handle: &Handle, name: &str) -> Vec<Handle> {
    let mut results = Vec::new();
    find_elements_recursive(handle, name, &mut results);
    results
}

fn find_elements_recursive(handle: &Handle, name: &str, results: &mut Vec<Handle>) {
    if let NodeData::Element { name: ref qname, .. } = handle.data {
        if qname.local.as_ref() == name {
            results.push(handle.clone());
        }
    }

    for child in handle.children.borrow().iter() {
        find_elements_recursive(child, name, results);
    }
}

/// Get the first element with the given local name
pub(crate) fn find_first_element(handle: &Handle, name: &str) -> Option<Handle> {
    if let NodeData::Element { name: ref qname, .. } = handle.data {
        if qname.local.as_ref() == name {
            return Some(handle.clone());
        }
    }

    for child in handle.children.borrow().iter() {
        if let Some(found) = find_first_element(child, name) {
            return Some(found);
        }
    }

    None
}

/// Tag name of an element node, or None for text/comment/document nodes
pub(crate) fn element_name(handle: &Handle) -> Option<&str> {
    match handle.data {
        NodeData::Element { ref name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// Get text content from a node (ignoring tags)
pub(crate) fn get_text_content(handle: &Handle) -> String {
    let mut text = String::new();
    get_text_recursive(handle, &mut text);
    text
}

fn get_text_recursive(handle: &Handle, text: &mut String) {
    match handle.data {
        NodeData::Text { ref contents } => {
            text.push_str(&contents.borrow());
        }
        NodeData::Element { .. } => {
            for child in handle.children.borrow().iter() {
                get_text_recursive(child, text);
            }
        }
        _ => {}
    }
}

/// Get an attribute value from an element
pub(crate) fn get_attribute(handle: &Handle, attr_name: &str) -> Option<String> {
    if let NodeData::Element { ref attrs, .. } = handle.data {
        for attr in attrs.borrow().iter() {
            if attr.name.local.as_ref() == attr_name {
                return Some(attr.value.to_string());
            }
        }
    }
    None
}

/// Set an attribute on an element
pub(crate) fn set_attribute(handle: &Handle, attr_name: &str, value: &str) {
    if let NodeData::Element { ref attrs, .. } = handle.data {
        let mut attrs_mut = attrs.borrow_mut();

        // Check if attribute exists
        for attr in attrs_mut.iter_mut() {
            if attr.name.local.as_ref() == attr_name {
                attr.value = value.into();
                return;
            }
        }

        // Add new attribute
        attrs_mut.push(Attribute {
            name: QualName::new(None, ns!(), attr_name.into()),
            value: value.into(),
        });
    }
}

/// Create a detached element node with the given attributes
pub(crate) fn create_element(name: &str, attrs: &[(&str, &str)]) -> Handle {
    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), LocalName::from(name)),
        attrs: RefCell::new(
            attrs
                .iter()
                .map(|&(key, value)| Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(key)),
                    value: value.into(),
                })
                .collect(),
        ),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

/// Create a detached text node
pub(crate) fn create_text(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from(text)),
    })
}

/// Append a node as the last child of a parent
pub(crate) fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// Insert a node into a parent's child list, directly before a reference child
pub(crate) fn insert_before(parent: &Handle, reference: &Handle, node: Handle) {
    let mut children = parent.children.borrow_mut();
    let index = children
        .iter()
        .position(|child| Rc::ptr_eq(child, reference))
        .unwrap_or(children.len());
    node.parent.set(Some(Rc::downgrade(parent)));
    children.insert(index, node);
}

/// Remove a node from a parent's child list
pub(crate) fn remove_child(parent: &Handle, child: &Handle) {
    parent
        .children
        .borrow_mut()
        .retain(|c| !Rc::ptr_eq(c, child));
    child.parent.set(None);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize() {
        let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
        let dom = parse_html(html);
        let output = serialize_html(&dom);
        assert!(output.contains("<p>Hello</p>"));
    }

    #[test]
    fn test_get_text_content() {
        let html = "<p>Hello <strong>World</strong></p>";
        let dom = parse_html(html);
        let p = find_first_element(&dom.document, "p").unwrap();
        let text = get_text_content(&p);
        assert_eq!(text.trim(), "Hello World");
    }

    #[test]
    fn test_set_attribute_overwrites_without_duplicating() {
        let dom = parse_html(r#"<html><body><style type="text/plain"></style></body></html>"#);
        let style = find_first_element(&dom.document, "style").unwrap();

        set_attribute(&style, "type", "text/css");
        assert_eq!(get_attribute(&style, "type").as_deref(), Some("text/css"));

        let output = serialize_html(&dom);
        assert_eq!(output.matches("type=").count(), 1);
    }

    #[test]
    fn test_insert_before_and_remove_child() {
        let dom = parse_html("<html><body><p>one</p></body></html>");
        let body = find_first_element(&dom.document, "body").unwrap();
        let p = find_first_element(&dom.document, "p").unwrap();

        let div = create_element("div", &[("class", "lead")]);
        insert_before(&body, &p, div);
        remove_child(&body, &p);

        let output = serialize_html(&dom);
        assert!(output.contains(r#"<div class="lead"></div>"#));
        assert!(!output.contains("<p>"));
    }

    #[test]
    fn test_create_element_attribute_order() {
        let span = create_element("span", &[("class", "koboSpan"), ("id", "kobo.1.1")]);
        append_child(&span, create_text("text"));

        assert_eq!(element_name(&span).unwrap(), "span");
        assert_eq!(get_attribute(&span, "class").as_deref(), Some("koboSpan"));
        assert_eq!(get_attribute(&span, "id").as_deref(), Some("kobo.1.1"));
        assert_eq!(get_text_content(&span), "text");
    }
}

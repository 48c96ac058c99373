//! Cleanup of authoring-tool and DRM artifacts.
//!
//! Every rule here is independent of the others and idempotent, so the
//! pass can run on already-cleaned markup without further changes.

use std::rc::Rc;

use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::html::{
    element_name, find_elements_by_name, get_attribute, get_text_content, set_attribute,
};

/// Strip markup left behind by DRM and word-processing tools.
pub fn clean_html(dom: &RcDom) {
    // Adobe DRM resource markers
    remove_matching(&dom.document, &|node| {
        element_name(node) == Some("meta")
            && get_attribute(node, "name").as_deref() == Some("Adept.expected.resource")
    });

    // Empty MS Office <o:p> paragraphs
    remove_matching(&dom.document, &|node| {
        element_name(node) == Some("o:p") && get_text_content(node).trim().is_empty()
    });

    // Empty headings
    remove_matching(&dom.document, &|node| {
        matches!(
            element_name(node),
            Some("h1" | "h2" | "h3" | "h4" | "h5" | "h6")
        ) && get_text_content(node).trim().is_empty()
    });

    // MS Office smart-tag elements, whatever their content
    remove_matching(&dom.document, &|node| {
        element_name(node).is_some_and(|name| name.starts_with("st1:"))
    });

    // Force empty <p> elements open so readers that mis-render the
    // self-closing form get an explicit start/end pair.
    for p in find_elements_by_name(&dom.document, "p") {
        let has_element_child = p
            .children
            .borrow()
            .iter()
            .any(|child| matches!(child.data, NodeData::Element { .. }));
        if !has_element_child && get_text_content(&p).trim().is_empty() {
            p.children.borrow_mut().clear();
        }
    }

    for style in find_elements_by_name(&dom.document, "style") {
        set_attribute(&style, "type", "text/css");
    }
}

/// Remove every descendant matching the predicate, with the subtree below
/// each survivor re-scanned after its siblings are dropped.
fn remove_matching(handle: &Handle, predicate: &dyn Fn(&Handle) -> bool) {
    let doomed: Vec<Handle> = handle
        .children
        .borrow()
        .iter()
        .filter(|child| predicate(child))
        .cloned()
        .collect();

    for node in doomed {
        handle.children.borrow_mut().retain(|c| !Rc::ptr_eq(c, &node));
    }

    let remaining: Vec<Handle> = handle.children.borrow().iter().cloned().collect();
    for child in remaining {
        remove_matching(&child, predicate);
    }
}

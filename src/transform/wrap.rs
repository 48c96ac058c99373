//! Body wrapper divs for Kobo column layout.

use log::debug;
use markup5ever_rcdom::{Handle, RcDom};

use crate::html::{append_child, create_element, find_elements_by_name, find_first_element};

/// Wrap the body's children in the two nested kobo container divs.
///
/// Documents that use divs as paragraph substitutes (more divs than ps)
/// are left alone, since the extra containers would change the effective
/// paragraph structure of the book.
pub fn add_divs(dom: &RcDom) {
    let div_count = find_elements_by_name(&dom.document, "div").len();
    let p_count = find_elements_by_name(&dom.document, "p").len();
    if div_count > p_count {
        debug!("document has more divs than paragraphs, skipping kobo divs");
        return;
    }

    let Some(body) = find_first_element(&dom.document, "body") else {
        return;
    };

    let children: Vec<Handle> = body.children.borrow().iter().cloned().collect();
    if children.is_empty() {
        return;
    }

    let inner = create_element("div", &[("class", "book-inner")]);
    for child in children {
        append_child(&inner, child);
    }

    let columns = create_element("div", &[("class", "book-columns")]);
    append_child(&columns, inner);

    body.children.borrow_mut().clear();
    append_child(&body, columns);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::{parse_html, serialize_html};

    #[test]
    fn test_wraps_body_children_in_nested_divs() {
        let dom = parse_html("<html><body><p>One</p><p>Two</p></body></html>");
        add_divs(&dom);

        let output = serialize_html(&dom);
        assert!(output.contains(
            r#"<body><div class="book-columns"><div class="book-inner"><p>One</p><p>Two</p></div></div></body>"#
        ));
    }

    #[test]
    fn test_skips_div_heavy_documents() {
        let dom = parse_html("<html><body><div>One</div><div>Two</div><p>Three</p></body></html>");
        add_divs(&dom);

        let output = serialize_html(&dom);
        assert!(!output.contains("book-columns"));
        assert!(!output.contains("book-inner"));
        assert!(output.contains("<body><div>One</div>"));
    }

    #[test]
    fn test_equal_div_and_p_counts_still_wrap() {
        let dom = parse_html("<html><body><div>One</div><p>Two</p></body></html>");
        add_divs(&dom);

        let output = serialize_html(&dom);
        assert!(output.contains("book-columns"));
    }

    #[test]
    fn test_empty_body_is_untouched() {
        let dom = parse_html("<html><body></body></html>");
        add_divs(&dom);

        let output = serialize_html(&dom);
        assert!(output.contains("<body></body>"));
    }
}

//! Kobo stylesheet injection.

use markup5ever_rcdom::RcDom;

use crate::error::{Error, Result};
use crate::html::{append_child, create_element, create_text, find_first_element};

const KOBO_STYLE_RULE: &str = "div#book-inner{margin-top: 0;margin-bottom: 0;}";

/// Append the kobo layout rule as the last element of `<head>`.
pub fn add_kobo_styles(dom: &RcDom) -> Result<()> {
    let head = find_first_element(&dom.document, "head")
        .ok_or_else(|| Error::Validation("could not append kobo styles".to_string()))?;

    let style = create_element("style", &[("type", "text/css")]);
    append_child(&style, create_text(KOBO_STYLE_RULE));

    let before = head.children.borrow().len();
    append_child(&head, style);
    let after = head.children.borrow().len();
    if after != before + 1 {
        return Err(Error::Validation("could not append kobo styles".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::{parse_html, serialize_html};

    #[test]
    fn test_appends_style_to_head() {
        let dom = parse_html("<html><head><title>t</title></head><body></body></html>");
        add_kobo_styles(&dom).unwrap();

        let output = serialize_html(&dom);
        assert!(output.contains(
            r#"<style type="text/css">div#book-inner{margin-top: 0;margin-bottom: 0;}</style></head>"#
        ));
    }

    #[test]
    fn test_fails_without_head() {
        let dom = RcDom::default();
        let err = add_kobo_styles(&dom).unwrap_err();
        assert!(err.to_string().contains("kobo styles"));
    }
}

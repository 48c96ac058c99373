//! Literal fixups applied to the serialized markup.
//!
//! These run on text, not the tree, and strictly after serialization:
//! the dash replacements damage comment delimiters, and the repairs here
//! depend on the exact byte forms the serializer emits.

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Apply the post-serialization fixups in their required order.
pub fn fix_markup(markup: &str, smarten_punctuation: bool) -> String {
    let mut out = markup.to_string();

    if smarten_punctuation {
        smarten_dashes(&mut out);
    }

    // Drop decoder artifacts
    out = out.replace('\u{fffd}', "");

    restore_xml_declaration(&mut out);

    out
}

/// Replace dash runs with dash entities, then repair the comment
/// delimiters the second replacement breaks.
///
/// Triple dashes map to the en dash and double dashes to the em dash.
fn smarten_dashes(markup: &mut String) {
    // TODO: smart quotes
    *markup = markup.replace("---", " &#x2013; ");
    *markup = markup.replace("--", " &#x2014; ");

    // "<!--" and "-->" both contain a double dash, so comments come out of
    // the replacement above mangled. Put them back.
    *markup = markup.replace("<! &#x2014; ", "<!-- ");
    *markup = markup.replace(" &#x2014; >", " -->");
}

/// The HTML parser demotes a leading `<?xml ...?>` declaration to a
/// comment. Restore the declaration, in whichever of the two spacings
/// the earlier fixups left it.
fn restore_xml_declaration(markup: &mut String) {
    *markup = markup.replacen(
        r#"<!-- ?xml version="1.0" encoding="utf-8"? -->"#,
        XML_DECLARATION,
        1,
    );
    *markup = markup.replacen(
        r#"<!--?xml version="1.0" encoding="utf-8"?-->"#,
        XML_DECLARATION,
        1,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_entities() {
        let out = fix_markup("Wait --- really -- no.", true);
        assert_eq!(out, "Wait  &#x2013;  really  &#x2014;  no.");
    }

    #[test]
    fn test_comment_delimiters_are_repaired() {
        // The double-dash replacement hits "<!--" and "-->" too; the
        // repair step reopens them with a single space on each side.
        let out = fix_markup("<!--note-->", true);
        assert_eq!(out, "<!-- note -->");
    }

    #[test]
    fn test_smartening_can_be_disabled() {
        let out = fix_markup("a -- b", false);
        assert_eq!(out, "a -- b");
    }

    #[test]
    fn test_strips_replacement_characters() {
        let out = fix_markup("bro\u{fffd}ken", true);
        assert_eq!(out, "broken");
    }

    #[test]
    fn test_restores_declaration_after_smartening() {
        let out = fix_markup(r#"<!--?xml version="1.0" encoding="utf-8"?--><html></html>"#, true);
        assert_eq!(out, r#"<?xml version="1.0" encoding="utf-8"?><html></html>"#);
    }

    #[test]
    fn test_restores_declaration_only_once() {
        let input = r#"<!--?xml version="1.0" encoding="utf-8"?--><!--?xml version="1.0" encoding="utf-8"?-->"#;
        let out = fix_markup(input, false);
        assert_eq!(
            out,
            r#"<?xml version="1.0" encoding="utf-8"?><!--?xml version="1.0" encoding="utf-8"?-->"#
        );
    }
}

//! Sentence segmentation and span insertion.
//!
//! Kobo readers track reading position and paint per-sentence highlights
//! through numbered `<span class="koboSpan" id="kobo.P.S">` markers. This
//! pass splits every text node under `<body>` into sentence fragments and
//! wraps each fragment in such a span, numbering paragraphs (P) and
//! segments within a paragraph (S) in document order.

use std::sync::LazyLock;

use log::debug;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use regex_lite::Regex;

use crate::html::{
    append_child, create_element, create_text, element_name, find_elements_by_name,
    find_first_element, get_attribute, insert_before, remove_child,
};

/// Matches the shortest run of text ending in sentence punctuation, an
/// optional closing quote or ellipsis, and any trailing whitespace.
static SENTENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?ms).*?[.!?:]['"”’“…]?\s*"#).unwrap());

/// Paragraph/segment numbering threaded through the traversal.
struct SpanCounters {
    paragraph: usize,
    segment: usize,
}

/// Wrap every sentence fragment under `<body>` in a numbered kobo span.
///
/// A document that already carries `koboSpan` markers is left untouched,
/// so running the transform twice never produces a second generation of
/// spans.
pub fn add_spans(dom: &RcDom) {
    let already_processed = find_elements_by_name(&dom.document, "span")
        .iter()
        .any(|span| {
            get_attribute(span, "class").is_some_and(|class| class.contains("koboSpan"))
        });
    if already_processed {
        debug!("content already contains kobo spans, skipping segmentation");
        return;
    }

    let mut counters = SpanCounters {
        paragraph: 0,
        segment: 0,
    };

    if let Some(body) = find_first_element(&dom.document, "body") {
        visit_element(&body, &mut counters);
    }
}

/// Depth-first descent over a snapshot of each element's children, so
/// span insertion and text removal cannot desynchronize iteration.
fn visit_element(element: &Handle, counters: &mut SpanCounters) {
    match element_name(element) {
        // Images are opaque leaves.
        Some("img") => return,
        // Block boundaries restart segment numbering.
        Some("p") | Some("ol") | Some("ul") => {
            counters.segment = 0;
            counters.paragraph += 1;
        }
        _ => {}
    }

    let children: Vec<Handle> = element.children.borrow().iter().cloned().collect();
    for child in children {
        match child.data {
            NodeData::Text { .. } => segment_text(&child, element, counters),
            NodeData::Element { .. } => visit_element(&child, counters),
            _ => {}
        }
    }
}

/// Replace one text node with spans wrapping its sentence fragments.
fn segment_text(text_node: &Handle, parent: &Handle, counters: &mut SpanCounters) {
    // Preformatted text keeps its exact markup. Only the immediate parent
    // is inspected; text nested deeper inside a <pre> subtree is still
    // segmented.
    if element_name(parent) == Some("pre") {
        return;
    }

    let text = match text_node.data {
        NodeData::Text { ref contents } => contents.borrow().to_string(),
        _ => return,
    };

    counters.segment += 1;

    for fragment in split_sentences(&text) {
        if !fragment.trim().is_empty() {
            let span = create_span(counters.paragraph, counters.segment, fragment);
            insert_before(parent, text_node, span);
            counters.segment += 1;
        }
    }

    remove_child(parent, text_node);
}

fn create_span(paragraph: usize, segment: usize, text: &str) -> Handle {
    let span = create_element(
        "span",
        &[("class", "koboSpan"), ("id", &format!("kobo.{paragraph}.{segment}"))],
    );
    append_child(&span, create_text(text));
    span
}

/// Partition text into sentence fragments without losing a single byte.
///
/// Runs the text not covered by a boundary match (before the first match,
/// between matches, after the last) are kept as their own fragments, so
/// concatenating the result always reproduces the input exactly.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut last_end = 0;

    for m in SENTENCE_RE.find_iter(text) {
        if m.start() > last_end {
            fragments.push(&text[last_end..m.start()]);
        }
        fragments.push(m.as_str());
        last_end = m.end();
    }
    if last_end < text.len() {
        fragments.push(&text[last_end..]);
    }

    fragments
}

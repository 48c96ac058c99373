//! OPF package document normalization.
//!
//! Kobo firmware finds the cover through an EPUB3-style
//! `properties="cover-image"` manifest entry, which EPUB2 packages and
//! calibre output don't carry. This pass adds the property, strips
//! calibre bookkeeping metadata, and re-serializes the package with
//! stable indentation. It never builds a tree: one streaming pass
//! collects cover ids, a second rewrites events into an indenting
//! writer.

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Error, Result};

/// Normalize an OPF package document.
///
/// Elements the rules target but the document lacks are simply skipped;
/// only malformed XML is an error.
pub fn normalize_manifest(opf: &str) -> Result<String> {
    let opf = strip_bom(opf);
    let cover_ids = collect_cover_ids(opf)?;
    rewrite(opf, &cover_ids)
}

/// Strip a UTF-8 BOM if present.
fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// Collect the target ids named by `<meta name="cover" content="..."/>`
/// entries. A missing or empty content attribute falls back to the
/// conventional id "cover".
fn collect_cover_ids(opf: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(opf);
    reader.config_mut().trim_text(true);

    let mut ids = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                if local_name(e.name().as_ref()) == b"meta"
                    && attr_value(&e, b"name").as_deref() == Some("cover")
                {
                    let id = attr_value(&e, b"content")
                        .filter(|content| !content.is_empty())
                        .unwrap_or_else(|| "cover".to_string());
                    ids.push(id);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(ids)
}

/// Re-emit the document with four-space indentation, dropping calibre
/// artifacts and marking cover items along the way.
fn rewrite(opf: &str, cover_ids: &[String]) -> Result<String> {
    let mut reader = Reader::from_str(opf);
    reader.config_mut().trim_text(true);

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if is_calibre_artifact(&e) {
                    reader.read_to_end(e.name())?;
                } else if has_cover_id(&e, cover_ids) {
                    writer.write_event(Event::Start(mark_as_cover(&e)))?;
                } else {
                    writer.write_event(Event::Start(e))?;
                }
            }
            Event::Empty(e) => {
                if is_calibre_artifact(&e) {
                    continue;
                }
                if has_cover_id(&e, cover_ids) {
                    writer.write_event(Event::Empty(mark_as_cover(&e)))?;
                } else {
                    writer.write_event(Event::Empty(e))?;
                }
            }
            Event::Eof => break,
            event => writer.write_event(event)?,
        }
    }

    String::from_utf8(writer.into_inner()).map_err(Error::from)
}

/// Calibre leaves a conversion timestamp and a "book producer"
/// contributor behind; neither belongs in the shipped package.
fn is_calibre_artifact(e: &BytesStart) -> bool {
    match local_name(e.name().as_ref()) {
        b"meta" => attr_value(e, b"name").as_deref() == Some("calibre:timestamp"),
        b"contributor" => attr_value(e, b"role").as_deref() == Some("bkp"),
        _ => false,
    }
}

/// Any element carrying a cover id gets the property, not just manifest
/// items.
fn has_cover_id(e: &BytesStart, cover_ids: &[String]) -> bool {
    attr_value(e, b"id").is_some_and(|id| cover_ids.iter().any(|cover| *cover == id))
}

/// Copy of the element with its properties attribute set to
/// "cover-image", replacing any prior value.
fn mark_as_cover(e: &BytesStart) -> BytesStart<'static> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut marked = BytesStart::new(name);
    for attr in e.attributes().flatten() {
        if local_name(attr.key.as_ref()) != b"properties" {
            marked.push_attribute(attr);
        }
    }
    marked.push_attribute(("properties", "cover-image"));
    marked
}

/// Value of the attribute with the given local name.
fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if local_name(attr.key.as_ref()) == key {
            return Some(String::from_utf8_lossy(&attr.value).into_owned());
        }
    }
    None
}

/// Extract local name from a namespaced XML name (e.g., "dc:contributor"
/// -> "contributor").
fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

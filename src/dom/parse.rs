//! Markup import.
//!
//! `scraper` (html5ever underneath) does the tolerant HTML parsing; its
//! read-only tree is then copied into the mutable [`Document`] arena.
//! Comments, doctypes and processing instructions are dropped.

use scraper::{ElementRef, Html, Node};
use tracing::debug;

use super::{Document, NodeId};

impl Document {
    /// Parse a full page. Missing `html`/`head`/`body` are synthesized the
    /// way a browser would.
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        if !parsed.errors.is_empty() {
            debug!(count = parsed.errors.len(), "markup parse recovered from errors");
        }
        let mut doc = Document::empty();
        let root = doc.root();
        import_element(&mut doc, root, parsed.root_element());
        doc
    }
}

/// Parse `html` as a fragment and append its nodes under `parent`.
pub(crate) fn import_fragment(doc: &mut Document, parent: NodeId, html: &str) {
    let fragment = Html::parse_fragment(html);
    // The fragment parser wraps its content in a synthetic <html> element.
    import_children(doc, parent, fragment.root_element());
}

fn import_element(doc: &mut Document, parent: NodeId, el: ElementRef<'_>) {
    let id = doc.create_element(el.value().name());
    for (name, value) in el.value().attrs() {
        doc.set_attr(id, name, value);
    }
    doc.append_child(parent, id);
    import_children(doc, id, el);

    match doc.tag(id) {
        Some("input") => {
            let value = doc.attr(id, "value").unwrap_or_default().to_string();
            doc.set_value(id, &value);
        }
        Some("textarea") => {
            let value = doc.text_content(id);
            doc.set_value(id, &value);
        }
        Some("select") => doc.sync_select_value(id),
        _ => {}
    }
}

fn import_children(doc: &mut Document, parent: NodeId, el: ElementRef<'_>) {
    for child in el.children() {
        match child.value() {
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    import_element(doc, parent, child_el);
                }
            }
            Node::Text(text) => {
                let id = doc.create_text(&text.text);
                doc.append_child(parent, id);
            }
            _ => {}
        }
    }
}

//! In-memory document the page controller runs against.
//!
//! The document is an arena of nodes addressed by [`NodeId`]. Ids are never
//! reused: removing a node only detaches it, so a handler holding a stale id
//! can still ask about it (`is_connected` is then `false`) without risk of
//! touching some other element.
//!
//! # Submodules
//!
//! - [`selector`]: the CSS subset used to locate elements
//! - [`parse`]: markup import via `scraper`

pub mod parse;
pub mod selector;

use itertools::Itertools;
use std::fmt::Write as _;

pub use selector::Selector;

/// Handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Element name, attributes and the live form value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub(crate) tag: String,
    pub(crate) attrs: Vec<(String, String)>,
    /// Current value of a form control. Kept apart from the `value`
    /// attribute the same way a browser keeps the property apart.
    pub(crate) value: String,
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            value: String::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((name.to_ascii_lowercase(), value.to_string())),
        }
    }

    fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    fn set_classes<'a>(&mut self, mut classes: impl Iterator<Item = &'a str>) {
        let joined = classes.join(" ");
        if joined.is_empty() {
            self.remove_attr("class");
        } else {
            self.set_attr("class", &joined);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeKind {
    Root,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Arena-backed document tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty `html > (head, body)` skeleton.
    pub fn new() -> Self {
        let mut doc = Self::empty();
        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.append_child(doc.root(), html);
        doc.append_child(html, head);
        doc.append_child(html, body);
        doc
    }

    pub(crate) fn empty() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The document node itself; parent of `html`.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Element data for `id`, or `None` for text nodes, the root and unknown ids.
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.node(id).map(|n| &n.kind) {
            Some(NodeKind::Element(el)) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match self.nodes.get_mut(id.0).map(|n| &mut n.kind) {
            Some(NodeKind::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    /// `None` for the root and for detached nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Child nodes in document order, text nodes included.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    // --- construction ---

    /// Create a detached element. Attach it with [`Document::append_child`].
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(ElementData::new(tag)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first. Refuses to create a cycle.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.node(parent).is_none() || self.node(child).is_none() || self.contains(child, parent)
        {
            return;
        }
        self.remove(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Detach `id` from its parent. No-op for detached nodes and the root.
    pub fn remove(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        self.nodes[parent.0].children.retain(|c| *c != id);
        self.nodes[id.0].parent = None;
    }

    fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    // --- tree queries ---

    /// Whether `id` is reachable from the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root() {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Inclusive containment, as `Node.contains` in the DOM.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// Element descendants of `scope` in document order, `scope` excluded.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.is_element(id) {
                out.push(id);
            }
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// First element in document order matching `selector`.
    ///
    /// # Arguments
    ///
    /// * `selector` - A parsed [`Selector`]
    ///
    /// # Returns
    ///
    /// The matching node, or `None` when nothing on the page matches.
    pub fn query_selector(&self, selector: &Selector) -> Option<NodeId> {
        self.query_selector_within(self.root(), selector)
    }

    /// Every element matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.query_selector_all_within(self.root(), selector)
    }

    /// Like [`Document::query_selector`], limited to descendants of `scope`.
    pub fn query_selector_within(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|id| selector.matches(self, *id))
    }

    pub fn query_selector_all_within(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| selector.matches(self, *id))
            .collect()
    }

    /// Nearest inclusive ancestor matching `selector`.
    pub fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(n) = current {
            if selector.matches(self, n) {
                return Some(n);
            }
            current = self.parent(n);
        }
        None
    }

    /// First connected element whose `id` attribute equals `element_id`.
    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|id| self.attr(*id, "id") == Some(element_id))
    }

    fn first_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|id| self.tag(*id) == Some(tag))
    }

    pub fn head(&self) -> Option<NodeId> {
        self.first_by_tag("head")
    }

    pub fn body(&self) -> Option<NodeId> {
        self.first_by_tag("body")
    }

    // --- attributes and classes ---

    /// Attribute value, matched case-insensitively on the name.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attr(name))
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Set or replace an attribute. Ignored for non-elements.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(id) {
            el.set_attr(name, value);
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.element_mut(id) {
            el.remove_attr(name);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_class(class))
    }

    /// Add `class` unless it is already present.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(el) = self.element_mut(id) {
            let current: Vec<String> = el.classes().map(str::to_string).collect();
            el.set_classes(
                current
                    .iter()
                    .map(String::as_str)
                    .chain(std::iter::once(class))
                    .unique(),
            );
        }
    }

    /// Remove every occurrence of `class`; drops the attribute when empty.
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(el) = self.element_mut(id) {
            if !el.has_class(class) {
                return;
            }
            let kept: Vec<String> = el
                .classes()
                .filter(|c| *c != class)
                .map(str::to_string)
                .collect();
            el.set_classes(kept.iter().map(String::as_str));
        }
    }

    /// Flip `class` and report whether it is now present.
    pub fn toggle_class(&mut self, id: NodeId, class: &str) -> bool {
        if self.has_class(id, class) {
            self.remove_class(id, class);
            false
        } else {
            self.add_class(id, class);
            self.has_class(id, class)
        }
    }

    // --- form state ---

    /// Current value of a form control (not its `value` attribute).
    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.value.as_str())
    }

    /// Set a control's current value. Attributes are left untouched.
    pub fn set_value(&mut self, id: NodeId, value: &str) {
        if let Some(el) = self.element_mut(id) {
            el.value = value.to_string();
        }
    }

    /// Whether the `disabled` attribute is present.
    pub fn is_disabled(&self, id: NodeId) -> bool {
        self.has_attr(id, "disabled")
    }

    pub fn set_disabled(&mut self, id: NodeId, disabled: bool) {
        if disabled {
            self.set_attr(id, "disabled", "");
        } else {
            self.remove_attr(id, "disabled");
        }
    }

    /// The `type` a browser reports for buttons and inputs. A `<button>`
    /// without a type attribute is a submit button.
    pub fn control_type(&self, id: NodeId) -> Option<String> {
        let el = self.element(id)?;
        match el.tag.as_str() {
            "button" => Some(
                el.attr("type")
                    .map(str::to_ascii_lowercase)
                    .unwrap_or_else(|| "submit".to_string()),
            ),
            "input" => Some(
                el.attr("type")
                    .map(str::to_ascii_lowercase)
                    .unwrap_or_else(|| "text".to_string()),
            ),
            _ => None,
        }
    }

    pub fn is_submit_control(&self, id: NodeId) -> bool {
        matches!(self.tag(id), Some("button") | Some("input"))
            && self.control_type(id).as_deref() == Some("submit")
    }

    /// Name/value pairs a browser would send for `form`.
    pub fn form_data(&self, form: NodeId) -> Vec<(String, String)> {
        let mut fields = Vec::new();
        for id in self.descendants(form) {
            let Some(el) = self.element(id) else {
                continue;
            };
            let Some(name) = el.attr("name").filter(|n| !n.is_empty()) else {
                continue;
            };
            if el.attr("disabled").is_some() {
                continue;
            }
            match el.tag.as_str() {
                "input" => {
                    let kind = self.control_type(id).unwrap_or_default();
                    match kind.as_str() {
                        "submit" | "button" | "reset" | "file" | "image" => continue,
                        "checkbox" | "radio" if el.attr("checked").is_none() => continue,
                        "checkbox" | "radio" if el.attr("value").is_none() => {
                            fields.push((name.to_string(), "on".to_string()));
                            continue;
                        }
                        _ => {}
                    }
                    fields.push((name.to_string(), el.value.clone()));
                }
                "select" | "textarea" => fields.push((name.to_string(), el.value.clone())),
                _ => {}
            }
        }
        fields
    }

    /// Recompute a `<select>`'s value from its options: the first
    /// `selected` option, else the first option.
    pub(crate) fn sync_select_value(&mut self, select: NodeId) {
        let options: Vec<NodeId> = self
            .descendants(select)
            .into_iter()
            .filter(|id| self.tag(*id) == Some("option"))
            .collect();
        let chosen = options
            .iter()
            .find(|id| self.has_attr(**id, "selected"))
            .or(options.first())
            .copied();
        let value = chosen
            .map(|option| match self.attr(option, "value") {
                Some(v) => v.to_string(),
                None => self.text_content(option).trim().to_string(),
            })
            .unwrap_or_default();
        self.set_value(select, &value);
    }

    // --- content ---

    /// Concatenated text of `id` and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.node(id).map(|n| &n.kind) {
            Some(NodeKind::Text(t)) => out.push_str(t),
            Some(_) => {
                for child in self.children(id) {
                    self.collect_text(*child, out);
                }
            }
            None => {}
        }
    }

    /// Serialized markup of `id`'s children.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            self.serialize(*child, &mut out);
        }
        out
    }

    /// Replace `id`'s children with the nodes parsed from `html`.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) {
        if !self.is_element(id) {
            return;
        }
        self.clear_children(id);
        parse::import_fragment(self, id, html);
    }

    fn serialize(&self, id: NodeId, out: &mut String) {
        match self.node(id).map(|n| &n.kind) {
            Some(NodeKind::Text(t)) => out.push_str(&escape_text(t)),
            Some(NodeKind::Element(el)) => {
                out.push('<');
                out.push_str(&el.tag);
                for (k, v) in &el.attrs {
                    if v.is_empty() {
                        let _ = write!(out, " {k}");
                    } else {
                        let _ = write!(out, " {k}=\"{}\"", escape_attr(v));
                    }
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                    return;
                }
                for child in self.children(id) {
                    self.serialize(*child, out);
                }
                let _ = write!(out, "</{}>", el.tag);
            }
            Some(NodeKind::Root) => {
                for child in self.children(id) {
                    self.serialize(*child, out);
                }
            }
            None => {}
        }
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(s: &str) -> Selector {
        Selector::parse(s).unwrap()
    }

    #[test]
    fn test_new_document_has_head_and_body() {
        let doc = Document::new();
        let head = doc.head().unwrap();
        let body = doc.body().unwrap();
        assert_eq!(doc.parent(head), doc.parent(body));
        assert!(doc.is_connected(body));
    }

    #[test]
    fn test_append_and_remove() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let div = doc.create_element("div");
        assert!(!doc.is_connected(div));

        doc.append_child(body, div);
        assert!(doc.is_connected(div));
        assert!(doc.contains(body, div));
        assert!(doc.contains(div, div));

        doc.remove(div);
        assert!(!doc.is_connected(div));
        assert!(doc.children(body).is_empty());
        // Removing twice is harmless.
        doc.remove(div);
    }

    #[test]
    fn test_append_refuses_cycles() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let outer = doc.create_element("div");
        let inner = doc.create_element("span");
        doc.append_child(body, outer);
        doc.append_child(outer, inner);
        doc.append_child(inner, outer);
        assert_eq!(doc.parent(outer), Some(body));
    }

    #[test]
    fn test_class_list_operations() {
        let mut doc = Document::new();
        let nav = doc.create_element("nav");
        doc.set_attr(nav, "class", "nav  main");

        doc.add_class(nav, "active");
        doc.add_class(nav, "active");
        assert_eq!(doc.attr(nav, "class"), Some("nav main active"));

        assert!(!doc.toggle_class(nav, "active"));
        assert!(doc.toggle_class(nav, "active"));

        doc.remove_class(nav, "nav");
        doc.remove_class(nav, "main");
        doc.remove_class(nav, "active");
        assert_eq!(doc.attr(nav, "class"), None);
    }

    #[test]
    fn test_select_value_and_form_data() {
        let doc = Document::parse(
            r#"<form class="f">
                <input type="hidden" name="action" value="refresh">
                <select name="category">
                    <option value="">All</option>
                    <option value="2" selected>Sports</option>
                </select>
                <select name="location"><option>London</option></select>
                <input type="checkbox" name="breaking" checked>
                <input type="checkbox" name="archived" value="yes">
                <input type="text" name="skip" disabled value="x">
                <textarea name="note">hello</textarea>
                <button type="submit" name="go">Go</button>
            </form>"#,
        );
        let form = doc.query_selector(&sel("form.f")).unwrap();
        let fields = doc.form_data(form);
        assert_eq!(
            fields,
            vec![
                ("action".to_string(), "refresh".to_string()),
                ("category".to_string(), "2".to_string()),
                ("location".to_string(), "London".to_string()),
                ("breaking".to_string(), "on".to_string()),
                ("note".to_string(), "hello".to_string()),
            ]
        );
    }

    #[test]
    fn test_inner_html_replaces_children() {
        let mut doc = Document::parse(r#"<button class="btn"><i class="fas fa-sync"></i> Refresh</button>"#);
        let btn = doc.query_selector(&sel(".btn")).unwrap();
        let original = doc.inner_html(btn);
        assert_eq!(original, r#"<i class="fas fa-sync"></i> Refresh"#);

        doc.set_inner_html(btn, r#"<div class="loading"></div> Loading..."#);
        assert_eq!(doc.text_content(btn), " Loading...");
        assert!(doc.query_selector(&sel(".btn .loading")).is_some());
        assert!(doc.query_selector(&sel(".btn i")).is_none());

        doc.set_inner_html(btn, &original);
        assert_eq!(doc.inner_html(btn), original);
    }

    #[test]
    fn test_text_is_escaped_when_serialized() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let span = doc.create_element("span");
        let text = doc.create_text("<b>&</b>");
        doc.append_child(body, span);
        doc.append_child(span, text);
        assert_eq!(doc.inner_html(span), "&lt;b&gt;&amp;&lt;/b&gt;");
    }

    #[test]
    fn test_closest_and_control_type() {
        let doc = Document::parse(
            r#"<form id="f"><div><button class="b1">A</button><button type="button" class="b2">B</button></div><input type="SUBMIT" class="i1"></form>"#,
        );
        let b1 = doc.query_selector(&sel(".b1")).unwrap();
        let b2 = doc.query_selector(&sel(".b2")).unwrap();
        let i1 = doc.query_selector(&sel(".i1")).unwrap();
        let form = doc.get_element_by_id("f").unwrap();

        assert_eq!(doc.closest(b1, &sel("form")), Some(form));
        assert!(doc.is_submit_control(b1));
        assert!(!doc.is_submit_control(b2));
        assert!(doc.is_submit_control(i1));
        assert_eq!(doc.control_type(form), None);
    }
}

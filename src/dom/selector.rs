//! A small CSS selector matcher for the in-memory [`Document`].
//!
//! Supports the subset the page markup conventions rely on:
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `tag`, `*` | element type |
//! | `#id` | id attribute |
//! | `.class` | class list membership |
//! | `[attr]` | attribute present |
//! | `[attr="v"]` | exact value |
//! | `[attr*="v"]` / `[attr^="v"]` / `[attr$="v"]` | substring / prefix / suffix |
//! | `a b` | descendant combinator |
//!
//! Child/sibling combinators, pseudo-classes and selector lists are rejected
//! with [`SelectorError::Unsupported`].

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Document, ElementData, NodeId};
use crate::error::SelectorError;

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?:(?P<ws>\s+)|(?P<tag>[A-Za-z][\w-]*|\*)|#(?P<id>[\w-]+)|\.(?P<class>[\w-]+)|\[\s*(?P<attr>[\w-]+)\s*(?:(?P<op>[*^$]?=)\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^\]\s"']+))\s*)?\])"#,
    )
    .expect("selector token regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Contains(String),
    Prefix(String),
    Suffix(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    op: AttrOp,
}

impl AttrMatch {
    fn matches(&self, el: &ElementData) -> bool {
        let Some(value) = el.attr(&self.name) else {
            return false;
        };
        match &self.op {
            AttrOp::Exists => true,
            AttrOp::Equals(v) => value == v,
            AttrOp::Contains(v) => !v.is_empty() && value.contains(v.as_str()),
            AttrOp::Prefix(v) => !v.is_empty() && value.starts_with(v.as_str()),
            AttrOp::Suffix(v) => !v.is_empty() && value.ends_with(v.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }

    fn matches(&self, el: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if tag != "*" && !tag.eq_ignore_ascii_case(&el.tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|a| a.matches(el))
    }
}

/// A parsed selector: compounds joined by descendant combinators, stored
/// left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    compounds: Vec<Compound>,
}

impl Selector {
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        let trimmed = selector.trim();
        if trimmed.is_empty() {
            return Err(SelectorError::Empty);
        }

        let mut compounds = Vec::new();
        let mut current = Compound::default();
        let mut pos = 0;

        while pos < trimmed.len() {
            let rest = &trimmed[pos..];
            let caps = TOKEN.captures(rest).ok_or_else(|| SelectorError::Unsupported {
                selector: trimmed.to_string(),
                position: pos,
            })?;
            let whole = caps.get(0).map(|m| m.end()).unwrap_or(0);

            if caps.name("ws").is_some() {
                if !current.is_empty() {
                    compounds.push(std::mem::take(&mut current));
                }
            } else if let Some(tag) = caps.name("tag") {
                // A type selector may only open a compound.
                if !current.is_empty() {
                    return Err(SelectorError::Unsupported {
                        selector: trimmed.to_string(),
                        position: pos,
                    });
                }
                current.tag = Some(tag.as_str().to_ascii_lowercase());
            } else if let Some(id) = caps.name("id") {
                current.id = Some(id.as_str().to_string());
            } else if let Some(class) = caps.name("class") {
                current.classes.push(class.as_str().to_string());
            } else if let Some(attr) = caps.name("attr") {
                let value = caps
                    .name("dq")
                    .or_else(|| caps.name("sq"))
                    .or_else(|| caps.name("bare"))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                let op = match caps.name("op").map(|m| m.as_str()) {
                    None => AttrOp::Exists,
                    Some("=") => AttrOp::Equals(value),
                    Some("*=") => AttrOp::Contains(value),
                    Some("^=") => AttrOp::Prefix(value),
                    Some(_) => AttrOp::Suffix(value),
                };
                current.attrs.push(AttrMatch {
                    name: attr.as_str().to_ascii_lowercase(),
                    op,
                });
            }
            pos += whole;
        }
        if !current.is_empty() {
            compounds.push(current);
        }

        Ok(Self {
            source: trimmed.to_string(),
            compounds,
        })
    }

    /// Whether `node` matches. Text nodes and the document root never match.
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some((last, rest)) = self.compounds.split_last() else {
            return false;
        };
        match doc.element(node) {
            Some(el) if last.matches(el) => {}
            _ => return false,
        }

        let mut ancestor = doc.parent(node);
        for compound in rest.iter().rev() {
            loop {
                let Some(candidate) = ancestor else {
                    return false;
                };
                ancestor = doc.parent(candidate);
                if doc.element(candidate).is_some_and(|el| compound.matches(el)) {
                    break;
                }
            }
        }
        true
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::parse(
            r#"<html><body>
                <form class="filter-form" action="/news">
                    <select class="filter-select" name="category"></select>
                </form>
                <form action="/news?action=search" id="search">
                    <input name="keyword" type="text">
                </form>
                <div class="outer"><p class="inner note">x</p></div>
            </body></html>"#,
        )
    }

    #[test]
    fn test_parse_rejects_empty_and_unsupported() {
        assert_eq!(Selector::parse("   "), Err(SelectorError::Empty));
        assert!(matches!(
            Selector::parse("div > p"),
            Err(SelectorError::Unsupported { position: 4, .. })
        ));
        assert!(Selector::parse("a:hover").is_err());
        assert!(Selector::parse(".a, .b").is_err());
        assert!(Selector::parse(".a div").is_ok());
    }

    #[test]
    fn test_type_selector_must_lead_compound() {
        assert!(Selector::parse(".btn button").is_ok());
        assert!(Selector::parse(".btnbutton").is_ok());
        assert!(Selector::parse("[type]button").is_err());
    }

    #[test]
    fn test_attribute_operators() {
        let doc = doc();
        let search = Selector::parse(r#"form[action*="search"]"#).unwrap();
        let found = doc.query_selector(&search).unwrap();
        assert_eq!(doc.attr(found, "id"), Some("search"));

        let prefix = Selector::parse("form[action^='/news?']").unwrap();
        assert_eq!(doc.query_selector(&prefix), Some(found));

        let suffix = Selector::parse("form[action$=search]").unwrap();
        assert_eq!(doc.query_selector(&suffix), Some(found));

        let empty_contains = Selector::parse(r#"form[action*=""]"#).unwrap();
        assert_eq!(doc.query_selector(&empty_contains), None);

        let keyword = Selector::parse(r#"input[name="keyword"]"#).unwrap();
        assert!(doc.query_selector(&keyword).is_some());
    }

    #[test]
    fn test_descendant_combinator() {
        let doc = doc();
        let nested = Selector::parse(".filter-form .filter-select").unwrap();
        assert_eq!(doc.query_selector_all(&nested).len(), 1);

        let wrong_scope = Selector::parse("#search .filter-select").unwrap();
        assert!(doc.query_selector_all(&wrong_scope).is_empty());

        let deep = Selector::parse("body div p.inner.note").unwrap();
        assert_eq!(doc.query_selector_all(&deep).len(), 1);
    }

    #[test]
    fn test_tag_match_is_case_insensitive() {
        let doc = doc();
        let upper = Selector::parse("FORM").unwrap();
        assert_eq!(doc.query_selector_all(&upper).len(), 2);
        assert_eq!(upper.to_string(), "FORM");
    }
}

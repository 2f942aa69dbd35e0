//! Compiled path selectors.
//!
//! Selectors cover the subset of path syntax the extraction schemas use:
//! child (`/`) and descendant (`//`) steps over namespace-prefixed names, an
//! optional `[@pfx:attr="value"]` attribute predicate per step, a terminal
//! `text()` or `@pfx:attr`, and top-level `|` alternation. Prefixes resolve
//! against the fixed bindings in [`crate::ns`]; an unknown prefix fails at
//! compile time, before any record is processed.

use crate::error::SchemaError;
use crate::ns;
use crate::tree::Element;

/// A compiled selector: one or more alternative paths evaluated in order.
#[derive(Debug, Clone)]
pub struct Selector {
    source: String,
    alternatives: Vec<Path>,
}

#[derive(Debug, Clone)]
struct Path {
    steps: Vec<Step>,
    target: Target,
}

#[derive(Debug, Clone)]
struct Step {
    axis: Axis,
    ns: &'static str,
    local: String,
    predicate: Option<AttrTest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone)]
enum Target {
    /// The matched elements themselves (recursion roots, presence tests).
    Element,
    /// Direct text children of the matched elements.
    Text,
    /// A namespace-qualified attribute of the matched elements.
    Attribute { ns: &'static str, local: String },
}

#[derive(Debug, Clone)]
struct AttrTest {
    ns: &'static str,
    local: String,
    value: String,
}

/// One match produced by a selector.
#[derive(Debug)]
pub enum Matched<'a> {
    Element(&'a Element),
    Value(String),
}

impl Selector {
    /// Compile a selector string. Fails fast on unknown prefixes or malformed
    /// syntax.
    pub fn compile(source: &str) -> Result<Selector, SchemaError> {
        let alternatives = source
            .split('|')
            .map(|p| parse_path(p.trim(), source))
            .collect::<Result<Vec<_>, _>>()?;
        if alternatives.is_empty() {
            return Err(SchemaError::EmptySelector(source.to_string()));
        }
        Ok(Selector {
            source: source.to_string(),
            alternatives,
        })
    }

    /// The selector string this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against `scope`, returning matches in document order
    /// (alternatives concatenated in declaration order).
    pub fn select<'a>(&self, scope: &'a Element) -> Vec<Matched<'a>> {
        let mut out = Vec::new();
        for path in &self.alternatives {
            path.select(scope, &mut out);
        }
        out
    }

    /// Matched element references only; text and attribute matches are not
    /// produced by element-targeted selectors so this is lossless for
    /// recursion fields.
    pub fn select_elements<'a>(&self, scope: &'a Element) -> Vec<&'a Element> {
        self.select(scope)
            .into_iter()
            .filter_map(|m| match m {
                Matched::Element(e) => Some(e),
                Matched::Value(_) => None,
            })
            .collect()
    }

    /// Matched text/attribute values only.
    pub fn select_values(&self, scope: &Element) -> Vec<String> {
        self.select(scope)
            .into_iter()
            .filter_map(|m| match m {
                Matched::Value(v) => Some(v),
                Matched::Element(_) => None,
            })
            .collect()
    }
}

impl Path {
    fn select<'a>(&self, scope: &'a Element, out: &mut Vec<Matched<'a>>) {
        let mut current: Vec<&'a Element> = vec![scope];
        for step in &self.steps {
            let mut next = Vec::new();
            for el in current {
                match step.axis {
                    Axis::Child => {
                        for child in el.child_elements() {
                            if step.matches(child) {
                                next.push(child);
                            }
                        }
                    }
                    Axis::Descendant => {
                        for desc in el.descendants() {
                            if step.matches(desc) {
                                next.push(desc);
                            }
                        }
                    }
                }
            }
            current = next;
        }
        for el in current {
            match &self.target {
                Target::Element => out.push(Matched::Element(el)),
                Target::Text => {
                    for text in el.text_nodes() {
                        out.push(Matched::Value(text.to_string()));
                    }
                }
                Target::Attribute { ns, local } => {
                    if let Some(v) = el.attribute(Some(ns), local) {
                        out.push(Matched::Value(v.to_string()));
                    }
                }
            }
        }
    }
}

impl Step {
    fn matches(&self, el: &Element) -> bool {
        if !el.is_named(self.ns, &self.local) {
            return false;
        }
        match &self.predicate {
            None => true,
            Some(test) => el.attribute(Some(test.ns), &test.local) == Some(test.value.as_str()),
        }
    }
}

fn parse_path(path: &str, source: &str) -> Result<Path, SchemaError> {
    let mut rest = path.strip_prefix('.').unwrap_or(path);
    let mut steps = Vec::new();
    let mut target = Target::Element;

    while !rest.is_empty() {
        let axis = if let Some(r) = rest.strip_prefix("//") {
            rest = r;
            Axis::Descendant
        } else if let Some(r) = rest.strip_prefix('/') {
            rest = r;
            Axis::Child
        } else {
            return Err(SchemaError::EmptyStep(source.to_string()));
        };

        let end = rest.find('/').unwrap_or(rest.len());
        let segment = &rest[..end];
        rest = &rest[end..];

        if segment.is_empty() {
            return Err(SchemaError::EmptyStep(source.to_string()));
        }

        if segment == "text()" {
            if !rest.is_empty() {
                return Err(SchemaError::EmptyStep(source.to_string()));
            }
            target = Target::Text;
        } else if let Some(attr) = segment.strip_prefix('@') {
            if !rest.is_empty() {
                return Err(SchemaError::BadAttribute(source.to_string()));
            }
            let (ns, local) = parse_qname(attr, source)
                .map_err(|_| SchemaError::BadAttribute(source.to_string()))?;
            target = Target::Attribute { ns, local };
        } else {
            steps.push(parse_step(axis, segment, source)?);
        }
    }

    if steps.is_empty() {
        return Err(SchemaError::EmptySelector(source.to_string()));
    }
    Ok(Path { steps, target })
}

fn parse_step(axis: Axis, segment: &str, source: &str) -> Result<Step, SchemaError> {
    let (name_part, predicate) = match segment.find('[') {
        Some(open) => {
            let close = segment
                .rfind(']')
                .ok_or_else(|| SchemaError::BadPredicate(source.to_string()))?;
            if close <= open {
                return Err(SchemaError::BadPredicate(source.to_string()));
            }
            let pred = parse_predicate(&segment[open + 1..close], source)?;
            (&segment[..open], Some(pred))
        }
        None => (segment, None),
    };

    let (ns, local) = parse_qname(name_part, source)?;
    Ok(Step {
        axis,
        ns,
        local,
        predicate,
    })
}

fn parse_predicate(body: &str, source: &str) -> Result<AttrTest, SchemaError> {
    let body = body
        .strip_prefix('@')
        .ok_or_else(|| SchemaError::BadPredicate(source.to_string()))?;
    let eq = body
        .find('=')
        .ok_or_else(|| SchemaError::BadPredicate(source.to_string()))?;
    let (ns, local) = parse_qname(&body[..eq], source)?;
    let raw = body[eq + 1..].trim();
    let value = raw
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| raw.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .ok_or_else(|| SchemaError::BadPredicate(source.to_string()))?;
    Ok(AttrTest {
        ns,
        local,
        value: value.to_string(),
    })
}

fn parse_qname(name: &str, source: &str) -> Result<(&'static str, String), SchemaError> {
    let (prefix, local) = name.split_once(':').ok_or_else(|| SchemaError::UnknownPrefix {
        prefix: String::new(),
        selector: source.to_string(),
    })?;
    let ns = ns::resolve_prefix(prefix).ok_or_else(|| SchemaError::UnknownPrefix {
        prefix: prefix.to_string(),
        selector: source.to_string(),
    })?;
    Ok((ns, local.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Attribute, Node};

    fn el(ns: &str, local: &str) -> Element {
        Element::new(Some(ns.to_string()), local.to_string())
    }

    fn text_el(ns_uri: &str, local: &str, text: &str) -> Element {
        let mut e = el(ns_uri, local);
        e.children.push(Node::Text(text.to_string()));
        e
    }

    fn sample_record() -> Element {
        let mut bag = el(ns::TMK, "TrademarkBag");
        let mut tm = el(ns::TMK, "Trademark");
        let mut app = el(ns::COM, "ApplicationNumber");
        app.children.push(Node::Element(text_el(
            ns::COM,
            "ST13ApplicationNumber",
            "CA5000012340101",
        )));
        tm.children.push(Node::Element(app));

        let mut desc = text_el(ns::CATMK, "TrademarkClassDescription", "Word mark");
        desc.attributes.push(Attribute {
            ns: Some(ns::COM.to_string()),
            local: "languageCode".to_string(),
            value: "en".to_string(),
        });
        tm.children.push(Node::Element(desc));

        let mut desc_fr = text_el(ns::CATMK, "TrademarkClassDescription", "Marque verbale");
        desc_fr.attributes.push(Attribute {
            ns: Some(ns::COM.to_string()),
            local: "languageCode".to_string(),
            value: "fr".to_string(),
        });
        tm.children.push(Node::Element(desc_fr));

        bag.children.push(Node::Element(tm));
        bag
    }

    #[test]
    fn descendant_path_finds_text() {
        let record = sample_record();
        let sel = Selector::compile(
            ".//tmk:Trademark/com:ApplicationNumber/com:ST13ApplicationNumber/text()",
        )
        .unwrap();
        assert_eq!(sel.select_values(&record), vec!["CA5000012340101"]);
    }

    #[test]
    fn attribute_predicate_filters() {
        let record = sample_record();
        let sel =
            Selector::compile(".//catmk:TrademarkClassDescription[@com:languageCode=\"en\"]/text()")
                .unwrap();
        assert_eq!(sel.select_values(&record), vec!["Word mark"]);
    }

    #[test]
    fn element_target_returns_elements() {
        let record = sample_record();
        let sel = Selector::compile(".//com:ApplicationNumber").unwrap();
        assert_eq!(sel.select_elements(&record).len(), 1);
    }

    #[test]
    fn alternation_concatenates_matches() {
        let record = sample_record();
        let sel = Selector::compile(
            ".//com:ST13ApplicationNumber/text()|.//catmk:TrademarkClassDescription/text()",
        )
        .unwrap();
        assert_eq!(sel.select_values(&record).len(), 3);
    }

    #[test]
    fn unknown_prefix_fails_compilation() {
        let err = Selector::compile(".//xyz:Thing/text()").unwrap_err();
        assert!(matches!(err, SchemaError::UnknownPrefix { .. }));
    }

    #[test]
    fn malformed_predicate_fails_compilation() {
        let err = Selector::compile(".//tmk:Thing[@com:code=en]").unwrap_err();
        assert!(matches!(err, SchemaError::BadPredicate(_)));
    }

    #[test]
    fn no_match_is_empty_not_error() {
        let record = sample_record();
        let sel = Selector::compile(".//tmk:NoSuchElement/text()").unwrap();
        assert!(sel.select_values(&record).is_empty());
    }
}

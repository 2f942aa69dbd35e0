//! In-memory subtree of one compound record.
//!
//! The record source materializes exactly one of these at a time; dropping it
//! releases the whole subtree. A live-element gauge instruments reclamation so
//! tests can assert that peak retained nodes track record size, not file size.

use std::sync::atomic::{AtomicUsize, Ordering};

static LIVE_ELEMENTS: AtomicUsize = AtomicUsize::new(0);

/// Number of [`Element`] nodes currently alive in the process.
pub fn live_element_count() -> usize {
    LIVE_ELEMENTS.load(Ordering::Relaxed)
}

/// A namespace-resolved attribute.
#[derive(Debug)]
pub struct Attribute {
    /// Namespace URI the attribute's prefix resolved to, if any. Unprefixed
    /// attributes carry no namespace.
    pub ns: Option<String>,
    pub local: String,
    pub value: String,
}

/// A child node: nested element or a run of character data.
#[derive(Debug)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// One XML element with its name resolved to a (namespace, local) pair.
#[derive(Debug)]
pub struct Element {
    pub ns: Option<String>,
    pub local: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(ns: Option<String>, local: String) -> Self {
        LIVE_ELEMENTS.fetch_add(1, Ordering::Relaxed);
        Element {
            ns,
            local,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// True when the element's resolved name equals (ns, local).
    pub fn is_named(&self, ns: &str, local: &str) -> bool {
        self.local == local && self.ns.as_deref() == Some(ns)
    }

    /// Direct child elements, in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Direct text children, in document order.
    pub fn text_nodes(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(|n| match n {
            Node::Text(t) => Some(t.as_str()),
            Node::Element(_) => None,
        })
    }

    /// Value of a namespace-qualified attribute, if present.
    pub fn attribute(&self, ns: Option<&str>, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.local == local && a.ns.as_deref() == ns)
            .map(|a| a.value.as_str())
    }

    /// All descendant elements in document (pre-order) order, excluding self.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.child_elements().rev_collect(),
        }
    }
}

impl Drop for Element {
    fn drop(&mut self) {
        LIVE_ELEMENTS.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Pre-order traversal over descendant elements.
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        // Push children reversed so the leftmost child is visited first.
        for child in next.child_elements().rev_collect() {
            self.stack.push(child);
        }
        Some(next)
    }
}

trait RevCollect<'a> {
    fn rev_collect(self) -> Vec<&'a Element>;
}

impl<'a, I: Iterator<Item = &'a Element>> RevCollect<'a> for I {
    fn rev_collect(self) -> Vec<&'a Element> {
        let mut v: Vec<&'a Element> = self.collect();
        v.reverse();
        v
    }
}

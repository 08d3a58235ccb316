//! Parsed XML response documents and field extraction
//!
//! Two lookup contracts are offered. The lenient accessors
//! ([`Document::text`], [`Node::text_at`]) never fail and return an empty
//! string when any step of the path is missing. The strict accessors
//! ([`Node::require`], [`Node::require_attr`]) return a [`DocumentError`]
//! naming what was absent.

use std::io::Write;

use xmltree::{Element, EmitterConfig, XMLNode};

use crate::error::DocumentError;

/// A parsed XML response from the management API
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Parse a response body
    ///
    /// # Errors
    /// Returns [`DocumentError::Parse`] if the body is not well-formed XML.
    pub fn parse(body: &[u8]) -> Result<Self, DocumentError> {
        let mut root = Element::parse(body).map_err(|e| DocumentError::Parse(e.to_string()))?;
        strip_whitespace(&mut root);
        Ok(Self { root })
    }

    /// Root element of the document
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        Node {
            element: &self.root,
        }
    }

    /// Resolve a dotted path such as `vm.status.state`
    ///
    /// The first segment may name the root element itself; otherwise every
    /// segment selects the first descendant with that name.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<Node<'_>> {
        let root = self.root();
        let mut segments = path.split('.').filter(|s| !s.is_empty()).peekable();

        let start = match segments.peek() {
            Some(first) if *first == root.name() => {
                segments.next();
                root
            }
            Some(_) => root,
            None => return None,
        };

        segments.try_fold(start, |node, name| node.find(name))
    }

    /// Lenient text lookup: the trimmed text at `path`, or `""` if absent
    #[must_use]
    pub fn text(&self, path: &str) -> String {
        self.lookup(path).map(|n| n.text()).unwrap_or_default()
    }

    /// All elements named `name`, in document order
    ///
    /// Matched elements are not searched for further nested matches.
    #[must_use]
    pub fn find_all(&self, name: &str) -> Vec<Node<'_>> {
        let root = self.root();
        if root.name() == name {
            return vec![root];
        }
        root.find_all(name)
    }

    /// Write the document with indentation
    ///
    /// # Errors
    /// Returns [`DocumentError::Render`] if serialization or the writer fails.
    pub fn write_pretty<W: Write>(&self, writer: W) -> Result<(), DocumentError> {
        let config = EmitterConfig::new().perform_indent(true);
        self.root
            .write_with_config(writer, config)
            .map_err(|e| DocumentError::Render(e.to_string()))
    }
}

/// Borrowed view of one element inside a [`Document`]
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    element: &'a Element,
}

impl<'a> Node<'a> {
    /// Local element name
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.element.name
    }

    /// Trimmed text content, empty when the element has none
    #[must_use]
    pub fn text(&self) -> String {
        self.element
            .get_text()
            .map(|t| t.trim().to_string())
            .unwrap_or_default()
    }

    /// Attribute value, if present
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.attributes.get(name).map(String::as_str)
    }

    /// Direct child elements
    pub fn children(self) -> impl Iterator<Item = Node<'a>> {
        self.element
            .children
            .iter()
            .filter_map(XMLNode::as_element)
            .map(|element| Node { element })
    }

    /// First descendant named `name`, depth-first in document order
    #[must_use]
    pub fn find(&self, name: &str) -> Option<Node<'a>> {
        for child in self.children() {
            if child.name() == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants named `name`, not descending into matches
    #[must_use]
    pub fn find_all(&self, name: &str) -> Vec<Node<'a>> {
        let mut found = Vec::new();
        self.collect(name, &mut found);
        found
    }

    fn collect(&self, name: &str, found: &mut Vec<Node<'a>>) {
        for child in self.children() {
            if child.name() == name {
                found.push(child);
            } else {
                child.collect(name, found);
            }
        }
    }

    /// Resolve a dotted path of descendant names below this node
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<Node<'a>> {
        path.split('.')
            .filter(|s| !s.is_empty())
            .try_fold(*self, |node, name| node.find(name))
    }

    /// Lenient text lookup below this node, `""` when absent
    #[must_use]
    pub fn text_at(&self, path: &str) -> String {
        self.lookup(path).map(|n| n.text()).unwrap_or_default()
    }

    /// Strict path lookup below this node
    ///
    /// # Errors
    /// Returns [`DocumentError::MissingElement`] naming the full path.
    pub fn require(&self, path: &str) -> Result<Node<'a>, DocumentError> {
        self.lookup(path)
            .ok_or_else(|| DocumentError::MissingElement(format!("{}.{path}", self.name())))
    }

    /// Strict attribute lookup
    ///
    /// # Errors
    /// Returns [`DocumentError::MissingAttribute`] if the attribute is absent.
    pub fn require_attr(&self, name: &str) -> Result<&'a str, DocumentError> {
        self.attr(name).ok_or_else(|| DocumentError::MissingAttribute {
            element: self.name().to_string(),
            attribute: name.to_string(),
        })
    }
}

/// Drop whitespace-only text nodes left between elements
fn strip_whitespace(element: &mut Element) {
    element.children.retain(|child| match child {
        XMLNode::Text(text) => !text.trim().is_empty(),
        _ => true,
    });
    for child in &mut element.children {
        if let XMLNode::Element(inner) = child {
            strip_whitespace(inner);
        }
    }
}

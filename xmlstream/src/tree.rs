//! In-memory tree consumed by the streaming writer
//!
//! A `Node` carries a tag name (optionally `{uri}local` qualified), a
//! sorted attribute map, optional text content and ordered children. The
//! writer reads the tree; it never mutates it.

use std::collections::BTreeMap;

/// A scalar attribute or text value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Scalar {
    /// Whether the value counts as absent text content. Empty strings and
    /// null carry no text; numbers and booleans always do.
    pub fn is_empty_text(&self) -> bool {
        match self {
            Scalar::Null => true,
            Scalar::Str(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Scalar::Float(f)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

/// A labeled tree node
///
/// Attributes live in a `BTreeMap`, so keys are unique and iterate in
/// sorted order regardless of insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Tag name, non-empty, possibly `{uri}local` qualified
    pub tag: String,
    /// Attribute map, serialized in sorted key order
    pub attrs: BTreeMap<String, Scalar>,
    /// Optional text content
    pub text: Option<Scalar>,
    /// Ordered children
    pub children: Vec<Node>,
}

impl Node {
    /// Create a node with the given tag and nothing else
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        debug_assert!(!tag.is_empty(), "node tag must be non-empty");
        Node {
            tag,
            attrs: BTreeMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Add or replace an attribute
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Set the text content
    pub fn with_text(mut self, text: impl Into<Scalar>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append a child
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Whether the node carries effective text content
    pub fn has_text(&self) -> bool {
        self.text.as_ref().is_some_and(|t| !t.is_empty_text())
    }
}

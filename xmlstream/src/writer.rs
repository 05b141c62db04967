//! Stream-based XML writer
//!
//! Emits indented, newline-delimited XML directly to a sink as the caller
//! walks a tree, so memory use stays proportional to nesting depth rather
//! than document size. Typical usage:
//!
//! ```
//! use xmlstream::{Node, StreamingXmlWriter};
//!
//! let mut out = Vec::new();
//! let mut writer = StreamingXmlWriter::new(&mut out).with_indent(2);
//! let mut doc = writer.open_document()?;
//! doc.start_tag("catalog", None)?;
//! doc.serialize(&Node::new("entry").with_attr("id", 1i64))?;
//! doc.end_tag("catalog")?;
//! doc.close();
//! # Ok::<(), xmlstream::WriteError>(())
//! ```
//!
//! One writer serves exactly one document, then gets discarded. The writer
//! never seeks, reads or closes the sink.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::Write;
use std::ops::{Deref, DerefMut};

use thiserror::Error;

use crate::encoding::Encoding;
use crate::escape::{escape_text, quote_attr};
use crate::format::scientific_format;
use crate::tree::{Node, Scalar};

/// Map from namespace URI to short output prefix (e.g. `"ns:"`)
pub type NamespaceMap = BTreeMap<String, String>;

/// Attribute map, serialized in sorted key order
pub type AttrMap = BTreeMap<String, Scalar>;

/// Errors surfaced while writing a document
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("failed to write to sink: {0}")]
    Sink(#[from] std::io::Error),
    #[error("mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedTag { expected: String, found: String },
    #[error("closing tag </{0}> without a matching open tag")]
    UnmatchedClose(String),
}

/// Incremental XML writer bound to one sink and one configuration
pub struct StreamingXmlWriter<W: Write> {
    sink: W,
    indent: usize,
    encoding: Encoding,
    nsmap: Option<NamespaceMap>,
    indent_level: usize,
    /// Open tag names, innermost last. Lets `end_tag` fail fast on a
    /// mismatched close instead of emitting corrupt XML.
    open_tags: Vec<String>,
}

impl<W: Write> StreamingXmlWriter<W> {
    /// Create a writer with the defaults: 4-space indent, UTF-8, no
    /// namespace map
    pub fn new(sink: W) -> Self {
        StreamingXmlWriter {
            sink,
            indent: 4,
            encoding: Encoding::Utf8,
            nsmap: None,
            indent_level: 0,
            open_tags: Vec::new(),
        }
    }

    /// Set the number of spaces per nesting level
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Set the output encoding
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set the namespace map used to shorten `{uri}local` tags
    pub fn with_nsmap(mut self, nsmap: NamespaceMap) -> Self {
        self.nsmap = Some(nsmap);
        self
    }

    /// Current nesting depth (0 at the root)
    pub fn indent_level(&self) -> usize {
        self.indent_level
    }

    /// Short form of a possibly `{uri}local` qualified tag. A URI missing
    /// from the map resolves to the empty prefix; without a map the tag
    /// passes through untouched.
    fn shorten<'t>(&self, tag: &'t str) -> Cow<'t, str> {
        if let (Some(nsmap), Some(rest)) = (&self.nsmap, tag.strip_prefix('{')) {
            if let Some((uri, local)) = rest.rsplit_once('}') {
                let prefix = nsmap.get(uri).map(String::as_str).unwrap_or("");
                return Cow::Owned(format!("{prefix}{local}"));
            }
        }
        Cow::Borrowed(tag)
    }

    /// Write one line at the current indent: leading spaces, the trimmed
    /// text, a single newline. The bytes reach the sink immediately; any
    /// real buffering belongs to the sink.
    fn write_line(&mut self, text: &str) -> Result<(), WriteError> {
        let mut line = " ".repeat(self.indent * self.indent_level);
        line.push_str(text.trim());
        line.push('\n');
        self.sink.write_all(&self.encoding.encode(&line))?;
        Ok(())
    }

    /// Write the XML declaration and a blank line, handing back a guard
    /// scoped to the document. Call exactly once, before any other write.
    pub fn open_document(&mut self) -> Result<Document<'_, W>, WriteError> {
        self.write_line(&format!(
            "<?xml version=\"1.0\" encoding=\"{}\"?>",
            self.encoding.name()
        ))?;
        self.write_line("")?;
        Ok(Document { writer: self })
    }

    /// Open an XML tag. With attributes, the tag opens across several
    /// lines: `<name`, one `key="value"` line per attribute in sorted key
    /// order, then `>`. Values pass through scientific formatting and
    /// attribute quoting.
    pub fn start_tag(&mut self, name: &str, attrs: Option<&AttrMap>) -> Result<(), WriteError> {
        if attrs.map_or(true, |a| a.is_empty()) {
            self.write_line(&format!("<{name}>"))?;
        } else if let Some(attrs) = attrs {
            self.write_line(&format!("<{name}"))?;
            for (key, value) in attrs {
                self.write_line(&format!("{key}={}", quote_attr(&scientific_format(value))))?;
            }
            self.write_line(">")?;
        }
        self.open_tags.push(name.to_string());
        self.indent_level += 1;
        Ok(())
    }

    /// Close the innermost open tag. The name must match the tag that
    /// opened this level.
    pub fn end_tag(&mut self, name: &str) -> Result<(), WriteError> {
        match self.open_tags.pop() {
            Some(expected) if expected == name => {}
            Some(expected) => {
                return Err(WriteError::MismatchedTag {
                    expected,
                    found: name.to_string(),
                });
            }
            None => return Err(WriteError::UnmatchedClose(name.to_string())),
        }
        self.indent_level -= 1;
        self.write_line(&format!("</{name}>"))?;
        Ok(())
    }

    /// Write a self-closing element on a single line, attributes in
    /// sorted key order. No change to the nesting level.
    pub fn empty_element(&mut self, name: &str, attrs: &AttrMap) -> Result<(), WriteError> {
        let attr = attrs
            .iter()
            .map(|(key, value)| format!("{key}={}", quote_attr(&scientific_format(value))))
            .collect::<Vec<_>>()
            .join(" ");
        if attr.is_empty() {
            self.write_line(&format!("<{name}/>"))?;
        } else {
            self.write_line(&format!("<{name} {attr}/>"))?;
        }
        Ok(())
    }

    /// Serialize a whole subtree, depth first. A node with no children
    /// and no effective text becomes a self-closing element; otherwise
    /// the tag opens, the text (if any) goes on its own line trimmed and
    /// escaped, the children follow in order, and the tag closes.
    pub fn serialize(&mut self, node: &Node) -> Result<(), WriteError> {
        let tag = self.shorten(&node.tag);
        if node.children.is_empty() && !node.has_text() {
            return self.empty_element(&tag, &node.attrs);
        }
        self.start_tag(&tag, Some(&node.attrs))?;
        if let Some(text) = node.text.as_ref().filter(|t| !t.is_empty_text()) {
            self.write_line(&escape_text(scientific_format(text).trim()))?;
        }
        for child in &node.children {
            self.serialize(child)?;
        }
        self.end_tag(&tag)?;
        Ok(())
    }
}

/// Scope guard for one XML document
///
/// Closing is deliberately a no-op (flushing belongs to the sink), so the
/// guard is always safe to drop, including after a failed write. It
/// dereferences to the writer, so tag and tree operations run through it.
pub struct Document<'a, W: Write> {
    writer: &'a mut StreamingXmlWriter<W>,
}

impl<W: Write> Document<'_, W> {
    /// Close the document. Never fails; present for symmetry with
    /// [`StreamingXmlWriter::open_document`].
    pub fn close(self) {}
}

impl<W: Write> Deref for Document<'_, W> {
    type Target = StreamingXmlWriter<W>;

    fn deref(&self) -> &Self::Target {
        self.writer
    }
}

impl<W: Write> DerefMut for Document<'_, W> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.writer
    }
}

/// Serialize a single node to a string with no XML declaration and no
/// namespace map. Useful for tests and debugging of subtrees.
pub fn render_to_string(node: &Node, indent: usize) -> Result<String, WriteError> {
    let mut out = Vec::new();
    let mut writer = StreamingXmlWriter::new(&mut out).with_indent(indent);
    writer.serialize(node)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_element_with_float_attr() {
        let node = Node::new("a").with_attr("x", 1.5);
        let out = render_to_string(&node, 4).unwrap();
        assert_eq!(out, "<a x=\"1.500000000E+00\"/>\n");
    }

    #[test]
    fn test_empty_element_without_attrs() {
        let out = render_to_string(&Node::new("a"), 4).unwrap();
        assert_eq!(out, "<a/>\n");
    }

    #[test]
    fn test_nested_text_indents_and_level_returns_to_zero() {
        let node = Node::new("root").with_child(Node::new("child").with_text("hi"));
        let mut out = Vec::new();
        let mut writer = StreamingXmlWriter::new(&mut out).with_indent(2);
        writer.serialize(&node).unwrap();
        assert_eq!(writer.indent_level(), 0);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "<root>\n  <child>\n    hi\n  </child>\n</root>\n");
    }

    #[test]
    fn test_text_directly_under_tag() {
        let node = Node::new("root").with_text("hi");
        let out = render_to_string(&node, 2).unwrap();
        assert_eq!(out, "<root>\n  hi\n</root>\n");
    }

    #[test]
    fn test_serialize_is_idempotent() {
        let node = Node::new("root")
            .with_attr("q", 0.25)
            .with_child(Node::new("a").with_text("t & u"))
            .with_child(Node::new("b"));
        let first = render_to_string(&node, 4).unwrap();
        let second = render_to_string(&node, 4).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_attrs_sorted_regardless_of_insertion_order() {
        let node = Node::new("e")
            .with_attr("zeta", 1i64)
            .with_attr("alpha", 2i64)
            .with_attr("mid", 3i64);
        let out = render_to_string(&node, 4).unwrap();
        assert_eq!(out, "<e alpha=\"2\" mid=\"3\" zeta=\"1\"/>\n");
    }

    #[test]
    fn test_multiline_open_tag_with_attrs() {
        let node = Node::new("e")
            .with_attr("b", 2i64)
            .with_attr("a", 1i64)
            .with_text("t");
        let out = render_to_string(&node, 4).unwrap();
        assert_eq!(out, "<e\na=\"1\"\nb=\"2\"\n>\n    t\n</e>\n");
    }

    #[test]
    fn test_text_escaping() {
        let node = Node::new("t").with_text("a < b > c & d");
        let out = render_to_string(&node, 4).unwrap();
        assert!(out.contains("a &lt; b &gt; c &amp; d"));
    }

    #[test]
    fn test_attr_with_double_quote_uses_single_quotes() {
        let node = Node::new("e").with_attr("msg", "say \"hi\"");
        let out = render_to_string(&node, 4).unwrap();
        assert_eq!(out, "<e msg='say \"hi\"'/>\n");
    }

    #[test]
    fn test_namespace_shortening() {
        let mut nsmap = NamespaceMap::new();
        nsmap.insert("http://x".to_string(), "ns:".to_string());
        let node = Node::new("{http://x}foo").with_text("t");
        let mut out = Vec::new();
        let mut writer = StreamingXmlWriter::new(&mut out)
            .with_indent(2)
            .with_nsmap(nsmap);
        writer.serialize(&node).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("<ns:foo>"));
        assert!(text.ends_with("</ns:foo>\n"));
    }

    #[test]
    fn test_unmapped_namespace_uri_drops_to_empty_prefix() {
        let node = Node::new("{http://unknown}foo");
        let mut out = Vec::new();
        let mut writer = StreamingXmlWriter::new(&mut out).with_nsmap(NamespaceMap::new());
        writer.serialize(&node).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "<foo/>\n");
    }

    #[test]
    fn test_qualified_tag_untouched_without_nsmap() {
        let node = Node::new("{http://x}foo");
        let out = render_to_string(&node, 4).unwrap();
        assert_eq!(out, "<{http://x}foo/>\n");
    }

    #[test]
    fn test_mismatched_end_tag_fails_fast() {
        let mut out = Vec::new();
        let mut writer = StreamingXmlWriter::new(&mut out);
        writer.start_tag("a", None).unwrap();
        let err = writer.end_tag("b").unwrap_err();
        assert!(matches!(
            err,
            WriteError::MismatchedTag { expected, found }
                if expected == "a" && found == "b"
        ));
    }

    #[test]
    fn test_unmatched_close_fails_fast() {
        let mut out = Vec::new();
        let mut writer = StreamingXmlWriter::new(&mut out);
        let err = writer.end_tag("a").unwrap_err();
        assert!(matches!(err, WriteError::UnmatchedClose(name) if name == "a"));
    }

    #[test]
    fn test_open_document_writes_declaration_and_blank_line() {
        let mut out = Vec::new();
        let mut writer = StreamingXmlWriter::new(&mut out).with_encoding(Encoding::Latin1);
        let doc = writer.open_document().unwrap();
        doc.close();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<?xml version=\"1.0\" encoding=\"iso-8859-1\"?>\n\n"
        );
    }

    #[test]
    fn test_sink_error_propagates() {
        struct FailingSink;

        impl Write for FailingSink {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = StreamingXmlWriter::new(FailingSink);
        let err = writer.start_tag("a", None).unwrap_err();
        assert!(matches!(err, WriteError::Sink(_)));
    }
}

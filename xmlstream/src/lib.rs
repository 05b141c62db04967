//! xmlstream: streaming XML serialization for labeled node trees
//!
//! This library provides:
//! - A `Node` tree model (tag, sorted attribute map, text, ordered children)
//! - A stream-based writer that emits indented XML with O(depth) memory
//! - Fixed scientific-notation formatting for floating point values
//! - Namespace shortening for `{uri}local` qualified tags

pub mod encoding;
pub mod escape;
pub mod format;
pub mod tree;
pub mod writer;

pub use encoding::Encoding;
pub use escape::{escape_text, quote_attr};
pub use format::{scientific_format, scientific_format_prec};
pub use tree::{Node, Scalar};
pub use writer::{
    render_to_string, AttrMap, Document, NamespaceMap, StreamingXmlWriter, WriteError,
};

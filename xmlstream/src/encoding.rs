//! Output encodings with numeric character reference fallback
//!
//! A character the target encoding cannot represent is written as a
//! numeric character reference (`&#NNNN;`) instead of failing the write.

/// Supported output encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Ascii,
    Latin1,
}

impl Encoding {
    /// Name used in the XML declaration
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Ascii => "us-ascii",
            Encoding::Latin1 => "iso-8859-1",
        }
    }

    /// Encode text, substituting `&#NNNN;` for characters outside the
    /// encoding's repertoire. Never fails.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Encoding::Utf8 => text.as_bytes().to_vec(),
            Encoding::Ascii => encode_single_byte(text, 0x7F),
            Encoding::Latin1 => encode_single_byte(text, 0xFF),
        }
    }
}

/// Single-byte encoding whose code points coincide with Unicode up to
/// `max` (holds for US-ASCII and ISO-8859-1)
fn encode_single_byte(text: &str, max: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let code = ch as u32;
        if code <= max {
            out.push(code as u8);
        } else {
            out.extend_from_slice(format!("&#{code};").as_bytes());
        }
    }
    out
}

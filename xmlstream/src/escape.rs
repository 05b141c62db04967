//! XML escaping for text content and attribute values

/// Escape `&`, `<` and `>` in text content
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Quote an attribute value, picking the quote character that avoids
/// escaping where possible: a value containing `"` but no `'` is wrapped
/// in single quotes; a value containing both is wrapped in double quotes
/// with `"` escaped as `&quot;`; everything else gets double quotes.
pub fn quote_attr(s: &str) -> String {
    let escaped = escape_text(s);
    if escaped.contains('"') {
        if escaped.contains('\'') {
            format!("\"{}\"", escaped.replace('"', "&quot;"))
        } else {
            format!("'{escaped}'")
        }
    } else {
        format!("\"{escaped}\"")
    }
}

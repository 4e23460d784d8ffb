//! URL fragment helpers

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left alone by `encodeURIComponent`
const FRAGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Encode a source reference for use as a shareable URL fragment
///
/// # Examples
/// ```ignore
/// encode_fragment("log/posts/a b.md") // -> "log%2Fposts%2Fa%20b.md"
/// ```
pub fn encode_fragment(source_ref: &str) -> String {
    utf8_percent_encode(source_ref, FRAGMENT).to_string()
}

/// Decode a URL fragment (with or without its leading `#`)
pub fn decode_fragment(fragment: &str) -> String {
    let raw = fragment.strip_prefix('#').unwrap_or(fragment);
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

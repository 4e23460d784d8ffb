//! HTML helper functions

/// Escape HTML special characters
///
/// # Examples
/// ```ignore
/// escape_text("<b>") // -> "&lt;b&gt;"
/// ```
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse the entity encoding produced by markdown renderers for code text
pub fn unescape_text(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text() {
        assert_eq!(
            escape_text(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#039;Jerry&#039;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_text_identity() {
        assert_eq!(escape_text("Signal processing – ü"), "Signal processing – ü");
        assert_eq!(escape_text(""), "");
    }

    #[test]
    fn test_escape_script() {
        let escaped = escape_text("<script>alert(1)</script>");
        assert!(!escaped.contains("<script"));
        assert!(escaped.starts_with("&lt;script&gt;"));
    }

    #[test]
    fn test_unescape_text() {
        assert_eq!(unescape_text("a &amp;&lt; b &#39;c&#039;"), "a &< b 'c'");
        assert_eq!(unescape_text("&amp;lt;"), "&lt;");
    }
}

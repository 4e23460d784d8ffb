//! Syntax highlighting for code blocks

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use thiserror::Error;

use crate::helpers::{escape_text, unescape_text};

/// Class marking a code block that has already been highlighted
pub const HIGHLIGHTED_CLASS: &str = "hljs";

lazy_static! {
    static ref CODE_BLOCK: Regex =
        Regex::new(r#"(?s)<pre><code(?: class="([^"]*)")?>(.*?)</code></pre>"#).unwrap();
    static ref TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
}

/// Highlighted code
#[derive(Debug, Clone)]
pub struct Highlighted {
    /// Inner HTML of the `<code>` element
    pub html: String,
    /// Language the code was highlighted as
    pub language: String,
}

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("highlighting is disabled")]
    Disabled,
    #[error("highlight failed: {0}")]
    Syntect(#[from] syntect::Error),
}

/// Code highlighting capability
pub trait SyntaxHighlighter: Send + Sync {
    /// Highlight `code`, honoring `language` when it is recognized
    fn highlight(&self, code: &str, language: Option<&str>) -> Result<Highlighted, HighlightError>;
}

/// syntect-backed highlighter emitting CSS classes
pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
    auto_detect: bool,
    enable: bool,
}

impl SyntectHighlighter {
    /// Create a highlighter with language auto-detection
    pub fn new() -> Self {
        Self::with_options(true, true)
    }

    /// Create with custom settings
    pub fn with_options(enable: bool, auto_detect: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            auto_detect,
            enable,
        }
    }

    /// Pick a syntax: the declared one, then a guess from the first line,
    /// then plain text
    fn find_syntax(&self, code: &str, language: Option<&str>) -> (&SyntaxReference, String) {
        if let Some(lang) = language.filter(|l| !l.is_empty()) {
            let found = self
                .syntax_set
                .find_syntax_by_token(lang)
                .or_else(|| self.syntax_set.find_syntax_by_extension(lang));
            if let Some(syntax) = found {
                return (syntax, lang.to_lowercase());
            }
            tracing::debug!("Unknown code block language {:?}", lang);
        }

        if self.auto_detect {
            if let Some(syntax) = self.syntax_set.find_syntax_by_first_line(code) {
                return (syntax, syntax.name.to_lowercase().replace(' ', "-"));
            }
        }

        (self.syntax_set.find_syntax_plain_text(), "plaintext".to_string())
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxHighlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: Option<&str>) -> Result<Highlighted, HighlightError> {
        if !self.enable {
            return Err(HighlightError::Disabled);
        }

        let (syntax, language) = self.find_syntax(code, language);
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, ClassStyle::Spaced);
        for line in LinesWithEndings::from(code) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }

        Ok(Highlighted {
            html: generator.finalize(),
            language,
        })
    }
}

/// Stylesheet for the classes emitted by [`SyntectHighlighter`]
pub fn highlight_stylesheet(theme_name: &str) -> anyhow::Result<String> {
    let theme_set = ThemeSet::load_defaults();
    let theme = theme_set
        .themes
        .get(theme_name)
        .or_else(|| theme_set.themes.get("InspiredGitHub"))
        .ok_or_else(|| anyhow::anyhow!("No highlight theme named {:?}", theme_name))?;
    Ok(css_for_theme_with_class_style(theme, ClassStyle::Spaced)?)
}

/// Render one code block, falling back to the escaped source on failure
pub fn code_block_html(
    highlighter: &dyn SyntaxHighlighter,
    code: &str,
    language: Option<&str>,
) -> String {
    match highlighter.highlight(code, language) {
        Ok(highlighted) => format!(
            r#"<pre><code class="{} language-{}">{}</code></pre>"#,
            HIGHLIGHTED_CLASS,
            escape_text(&highlighted.language),
            highlighted.html
        ),
        Err(e) => {
            tracing::debug!("Leaving code block unhighlighted: {}", e);
            let class = language
                .map(|l| format!(r#" class="language-{}""#, escape_text(l)))
                .unwrap_or_default();
            format!("<pre><code{}>{}</code></pre>", class, escape_text(code))
        }
    }
}

/// Highlight `<pre><code>` blocks that did not go through the code block
/// hook, such as raw HTML embedded in a post
pub fn highlight_remaining(html: &str, highlighter: &dyn SyntaxHighlighter) -> String {
    CODE_BLOCK
        .replace_all(html, |caps: &Captures| {
            let class = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            if class.split_whitespace().any(|c| c == HIGHLIGHTED_CLASS) {
                return caps[0].to_string();
            }

            let language = class
                .split_whitespace()
                .find_map(|c| c.strip_prefix("language-"));
            let code = unescape_text(&TAG.replace_all(&caps[2], ""));

            match highlighter.highlight(&code, language) {
                Ok(highlighted) => format!(
                    r#"<pre><code class="{} language-{}">{}</code></pre>"#,
                    HIGHLIGHTED_CLASS,
                    escape_text(&highlighted.language),
                    highlighted.html
                ),
                Err(_) => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_declared_language() {
        let highlighter = SyntectHighlighter::new();
        let highlighted = highlighter.highlight("fn main() {}\n", Some("rust")).unwrap();
        assert_eq!(highlighted.language, "rust");
        assert!(highlighted.html.contains("<span"));
        assert!(highlighted.html.contains("main"));
    }

    #[test]
    fn test_highlight_auto_detects_shebang() {
        let highlighter = SyntectHighlighter::new();
        let highlighted = highlighter
            .highlight("#!/bin/bash\necho hi\n", Some("no-such-language"))
            .unwrap();
        assert_ne!(highlighted.language, "plaintext");
    }

    #[test]
    fn test_highlight_falls_back_to_plain_text() {
        let highlighter = SyntectHighlighter::with_options(true, false);
        let highlighted = highlighter.highlight("a < b\n", None).unwrap();
        assert_eq!(highlighted.language, "plaintext");
        assert!(highlighted.html.contains("&lt;"));
    }

    #[test]
    fn test_code_block_html_marks_highlighted() {
        let highlighter = SyntectHighlighter::new();
        let html = code_block_html(&highlighter, "let x = 1;\n", Some("rust"));
        assert!(html.starts_with(r#"<pre><code class="hljs language-rust">"#));
    }

    #[test]
    fn test_code_block_html_passes_through_on_failure() {
        let highlighter = SyntectHighlighter::with_options(false, false);
        let html = code_block_html(&highlighter, "<b>x</b>\n", Some("html"));
        assert_eq!(
            html,
            "<pre><code class=\"language-html\">&lt;b&gt;x&lt;/b&gt;\n</code></pre>"
        );
    }

    #[test]
    fn test_highlight_remaining_skips_processed_blocks() {
        let highlighter = SyntectHighlighter::new();
        let done = r#"<pre><code class="hljs language-rust"><span>x</span></code></pre>"#;
        assert_eq!(highlight_remaining(done, &highlighter), done);
    }

    #[test]
    fn test_highlight_remaining_processes_raw_blocks() {
        let highlighter = SyntectHighlighter::new();
        let raw = r#"<p>x</p><pre><code class="language-python">print(1 &lt; 2)
</code></pre>"#;
        let html = highlight_remaining(raw, &highlighter);
        assert!(html.starts_with("<p>x</p>"));
        assert!(html.contains(r#"class="hljs language-python""#));
        assert!(html.contains("&lt;"));
    }

    #[test]
    fn test_stylesheet() {
        let css = highlight_stylesheet("InspiredGitHub").unwrap();
        assert!(!css.is_empty());
        assert!(highlight_stylesheet("missing-theme").is_ok());
    }
}

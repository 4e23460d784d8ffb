//! Markdown rendering

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::collections::HashMap;

/// Called for every code block with its text and declared language;
/// returns the HTML that replaces the block
pub type CodeBlockHook<'h> = &'h dyn Fn(&str, Option<&str>) -> String;

/// Markdown to HTML conversion capability
pub trait MarkdownRenderer: Send + Sync {
    /// Render markdown, delegating every code block to `code_block`
    fn render(&self, markdown: &str, code_block: CodeBlockHook<'_>) -> String;
}

/// GitHub-flavored markdown renderer backed by pulldown-cmark
///
/// Single newlines stay soft breaks, headings get anchor ids and no smart
/// punctuation is applied, so source text and entities come out as written.
#[derive(Debug, Clone)]
pub struct PulldownMarkdown {
    options: Options,
    heading_ids: bool,
}

impl PulldownMarkdown {
    /// Create a renderer with GFM extensions and heading ids enabled
    pub fn new() -> Self {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        Self {
            options,
            heading_ids: true,
        }
    }

    /// Toggle automatic heading ids
    pub fn with_heading_ids(mut self, enabled: bool) -> Self {
        self.heading_ids = enabled;
        self
    }
}

impl Default for PulldownMarkdown {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer for PulldownMarkdown {
    fn render(&self, markdown: &str, code_block: CodeBlockHook<'_>) -> String {
        let parser = Parser::new_ext(markdown, self.options);

        let mut events: Vec<Event> = Vec::new();
        let mut slugger = Slugger::default();

        let mut in_code_block = false;
        let mut code_lang: Option<String> = None;
        let mut code_text = String::new();

        // Index of the open heading's start event and its collected text
        let mut heading: Option<(usize, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_text.clear();
                    code_lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(|lang| lang.to_string()),
                        CodeBlockKind::Indented => None,
                    };
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    let html = code_block(&code_text, code_lang.as_deref());
                    events.push(Event::Html(CowStr::from(html)));
                    code_lang = None;
                }
                Event::Text(text) if in_code_block => {
                    code_text.push_str(&text);
                }
                Event::Start(Tag::Heading { .. }) => {
                    heading = Some((events.len(), String::new()));
                    events.push(event);
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((start, text)) = heading.take() {
                        if let Event::Start(Tag::Heading { id, .. }) = &mut events[start] {
                            if let Some(explicit) = id.as_deref() {
                                slugger.reserve(explicit);
                            } else if self.heading_ids {
                                *id = Some(CowStr::from(slugger.slug(&text)));
                            }
                        }
                    }
                    events.push(event);
                }
                Event::Text(ref text) | Event::Code(ref text) if heading.is_some() => {
                    if let Some((_, collected)) = heading.as_mut() {
                        collected.push_str(text);
                    }
                    events.push(event);
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }
}

/// Generates unique heading anchors
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    /// Slug for a heading's text, suffixed `-1`, `-2`, ... on repeats
    pub fn slug(&mut self, text: &str) -> String {
        let base = heading_slug(text);
        let mut slug = base.clone();
        if let Some(&count) = self.seen.get(&base) {
            let mut count = count;
            loop {
                count += 1;
                slug = format!("{}-{}", base, count);
                if !self.seen.contains_key(&slug) {
                    break;
                }
            }
            self.seen.insert(base, count);
        }
        self.seen.insert(slug.clone(), 0);
        slug
    }

    /// Record an explicit id so generated ones avoid it
    pub fn reserve(&mut self, id: &str) {
        self.seen.entry(id.to_string()).or_insert(0);
    }
}

/// Lowercase the text, drop punctuation and turn whitespace into hyphens
pub fn heading_slug(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !is_slug_punctuation(*c))
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

fn is_slug_punctuation(c: char) -> bool {
    matches!(c, '\u{2000}'..='\u{206F}' | '\u{2E00}'..='\u{2E7F}')
        || (c.is_ascii_punctuation() && c != '-' && c != '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(code: &str, lang: Option<&str>) -> String {
        format!(
            "<pre><code data-lang=\"{}\">{}</code></pre>",
            lang.unwrap_or(""),
            code.trim_end()
        )
    }

    #[test]
    fn test_render_basic_markdown() {
        let renderer = PulldownMarkdown::new();
        let html = renderer.render("# Hello World\n\nThis is a test.", &plain);
        assert!(html.contains(r#"<h1 id="hello-world">Hello World</h1>"#));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_soft_breaks_stay_in_paragraph() {
        let renderer = PulldownMarkdown::new();
        let html = renderer.render("first line\nsecond line", &plain);
        assert!(!html.contains("<br"));
        assert!(html.contains("<p>first line\nsecond line</p>"));
    }

    #[test]
    fn test_code_block_goes_through_hook() {
        let renderer = PulldownMarkdown::new();
        let html = renderer.render("```rust ignore\nfn main() {}\n```", &plain);
        assert!(html.contains(r#"<pre><code data-lang="rust">fn main() {}</code></pre>"#));
    }

    #[test]
    fn test_indented_code_block_has_no_language() {
        let renderer = PulldownMarkdown::new();
        let html = renderer.render("para\n\n    let x = 1;\n", &plain);
        assert!(html.contains(r#"data-lang="">let x = 1;"#));
    }

    #[test]
    fn test_gfm_table_and_strikethrough() {
        let renderer = PulldownMarkdown::new();
        let html = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~", &plain);
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn test_no_smart_punctuation() {
        let renderer = PulldownMarkdown::new();
        let html = renderer.render("'quoted' -- dash", &plain);
        assert!(html.contains("quoted"));
        assert!(html.contains("-- dash"));
        assert!(!html.contains('\u{2013}'));
        assert!(!html.contains('\u{2018}'));
    }

    #[test]
    fn test_duplicate_heading_ids() {
        let renderer = PulldownMarkdown::new();
        let html = renderer.render("## Notes\n\n## Notes\n\n## Notes", &plain);
        assert!(html.contains(r#"<h2 id="notes">"#));
        assert!(html.contains(r#"<h2 id="notes-1">"#));
        assert!(html.contains(r#"<h2 id="notes-2">"#));
    }

    #[test]
    fn test_explicit_heading_id_wins() {
        let renderer = PulldownMarkdown::new();
        let html = renderer.render("## Intro {#start}\n\n## Start", &plain);
        assert!(html.contains(r#"<h2 id="start">Intro</h2>"#));
        assert!(html.contains(r#"<h2 id="start-1">Start</h2>"#));
    }

    #[test]
    fn test_heading_ids_disabled() {
        let renderer = PulldownMarkdown::new().with_heading_ids(false);
        let html = renderer.render("# Plain", &plain);
        assert!(html.contains("<h1>Plain</h1>"));
    }

    #[test]
    fn test_heading_slug() {
        assert_eq!(heading_slug("Ideal filters: an overview!"), "ideal-filters-an-overview");
        assert_eq!(heading_slug("  RC low_pass  "), "rc-low_pass");
        assert_eq!(heading_slug("Über `code`"), "über-code");
    }
}

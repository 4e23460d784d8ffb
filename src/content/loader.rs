//! Post loader - fetches a post's markdown and turns it into HTML

use super::highlight::{code_block_html, highlight_remaining};
use super::{
    ContentSource, LoadError, MarkdownRenderer, PulldownMarkdown, SyntaxHighlighter,
    SyntectHighlighter,
};
use crate::catalog::PostDescriptor;
use crate::helpers::encode_fragment;

/// A successfully loaded post
#[derive(Debug, Clone)]
pub struct LoadedPost {
    pub descriptor: PostDescriptor,
    /// Rendered body HTML
    pub html: String,
    /// Shareable URL fragment for this post
    pub fragment: String,
}

/// Fetch + rewrite + render pipeline for single posts
pub struct Loader<S> {
    source: S,
    markdown: Box<dyn MarkdownRenderer>,
    highlighter: Box<dyn SyntaxHighlighter>,
    asset_prefix: String,
}

impl<S: ContentSource> Loader<S> {
    /// Create a loader with the default markdown renderer and highlighter
    pub fn new(source: S) -> Self {
        Self::with_renderers(
            source,
            Box::new(PulldownMarkdown::new()),
            Box::new(SyntectHighlighter::new()),
        )
    }

    /// Create a loader with custom rendering capabilities
    pub fn with_renderers(
        source: S,
        markdown: Box<dyn MarkdownRenderer>,
        highlighter: Box<dyn SyntaxHighlighter>,
    ) -> Self {
        Self {
            source,
            markdown,
            highlighter,
            asset_prefix: "log/".to_string(),
        }
    }

    /// Set the prefix relative asset references are rewritten to
    pub fn with_asset_prefix(mut self, prefix: &str) -> Self {
        self.asset_prefix = prefix.to_string();
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch and render a post
    pub async fn load(&self, descriptor: &PostDescriptor) -> Result<LoadedPost, LoadError> {
        tracing::debug!("Loading {}", descriptor.source_ref);
        let raw = self.source.fetch(&descriptor.source_ref).await?;
        let html = self.render(&raw);
        tracing::info!("Loaded {} ({} bytes)", descriptor.source_ref, raw.len());

        Ok(LoadedPost {
            descriptor: descriptor.clone(),
            html,
            fragment: encode_fragment(&descriptor.source_ref),
        })
    }

    /// Render raw post markdown to HTML
    pub fn render(&self, raw: &str) -> String {
        let markdown = rewrite_asset_paths(raw, &self.asset_prefix);
        let highlighter = self.highlighter.as_ref();
        let hook = |code: &str, lang: Option<&str>| code_block_html(highlighter, code, lang);
        let html = self.markdown.render(&markdown, &hook);
        highlight_remaining(&html, highlighter)
    }
}

/// Point asset links written relative to the post folder at `prefix`
///
/// Only `](./assets/` and `](assets/` are rewritten; absolute and other
/// relative forms stay as they are.
pub fn rewrite_asset_paths(markdown: &str, prefix: &str) -> String {
    let target = format!("]({}assets/", prefix);
    markdown
        .replace("](./assets/", &target)
        .replace("](assets/", &target)
}

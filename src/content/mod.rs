//! Content module - fetching, rewriting and rendering post markdown

mod highlight;
pub mod loader;
mod markdown;
mod source;

pub use highlight::{
    code_block_html, highlight_remaining, highlight_stylesheet, HighlightError, Highlighted,
    SyntaxHighlighter, SyntectHighlighter,
};
pub use loader::{rewrite_asset_paths, LoadedPost, Loader};
pub use markdown::{heading_slug, CodeBlockHook, MarkdownRenderer, PulldownMarkdown, Slugger};
pub use source::{ContentSource, FsSource, HttpSource, LoadError, SiteSource};

//! HTML adapter: places list/detail views into markup

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::{DetailBody, DetailView, ListRow, ListView};
use crate::config::SiteConfig;
use crate::helpers::{current_year, decode_fragment, escape_text};

/// Bytes kept as-is in static page names; `_` is the escape character
const PAGE_NAME: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.');

/// Client script used when a server drives the session
const CLIENT_SCRIPT: &str = r#"
<script>
(function() {
    var list = document.getElementById('postList');
    var meta = document.getElementById('postMeta');
    var content = document.getElementById('postContent');
    var search = document.getElementById('search');
    var searchSeq = 0;

    function apply(data) {
        if (data.query !== undefined && data.query !== null) search.value = data.query;
        if (data.list !== undefined && data.list !== null) list.innerHTML = data.list;
        if (data.meta) meta.innerHTML = data.meta;
        if (data.content) content.innerHTML = data.content;
        if (data.fragment) history.replaceState(null, '', '#' + data.fragment);
    }

    list.addEventListener('click', function(ev) {
        var row = ev.target.closest('li[data-index]');
        if (!row) return;
        ev.preventDefault();
        [].forEach.call(list.children, function(li) {
            li.classList.toggle('active', li === row);
        });
        content.innerHTML = '<p class="muted">Loading…</p>';
        // Select by source, not position: the server's list may be from a
        // different search than the one on screen
        fetch('/api/open?fragment=' + encodeURIComponent(row.dataset.fragment))
            .then(function(res) { return res.json(); })
            .then(apply);
    });

    search.addEventListener('input', function() {
        var seq = ++searchSeq;
        fetch('/api/search?q=' + encodeURIComponent(search.value))
            .then(function(res) { return res.json(); })
            .then(function(data) {
                if (seq === searchSeq) apply(data);
            });
    });

    if (location.hash.length > 1) {
        fetch('/api/open?fragment=' + encodeURIComponent(location.hash.slice(1)))
            .then(function(res) { return res.json(); })
            .then(apply);
    }
})();
</script>
"#;

const STYLE: &str = r#"
<style>
body { font-family: system-ui, sans-serif; margin: 0; color: #222; }
header, footer { padding: 1rem 2rem; }
main { display: grid; grid-template-columns: 20rem 1fr; gap: 2rem; padding: 0 2rem; }
#search { width: 100%; padding: .4rem; box-sizing: border-box; }
#postList { list-style: none; padding: 0; }
#postList li { padding: .5rem; border-radius: 4px; cursor: pointer; }
#postList li a { color: inherit; text-decoration: none; display: block; }
#postList li.active { background: #eef3ff; }
.post-sub { font-size: .85rem; color: #666; display: flex; gap: .4rem; flex-wrap: wrap; }
.tag { background: #f0f0f0; border-radius: 3px; padding: 0 .3rem; }
.muted { color: #888; }
.meta { color: #666; font-size: .9rem; }
pre { overflow-x: auto; padding: .8rem; background: #f8f8f8; }
</style>
"#;

/// How list rows link to their post
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// `#fragment` links handled by the client script
    Fragment,
    /// Links to pre-rendered per-post pages
    StaticPage,
}

/// File name of the pre-rendered page for a post
///
/// Every byte outside `[A-Za-z0-9.-]` becomes `_XX`, so distinct source
/// references never share a page.
pub fn static_page_name(source_ref: &str) -> String {
    let escaped = utf8_percent_encode(source_ref, PAGE_NAME)
        .to_string()
        .replace('%', "_");
    format!("{}.html", escaped)
}

impl ListRow {
    fn href(&self, mode: LinkMode) -> String {
        match mode {
            LinkMode::Fragment => format!("#{}", self.fragment),
            LinkMode::StaticPage => static_page_name(&decode_fragment(&self.fragment)),
        }
    }
}

impl ListView {
    /// Markup for the list's `<li>` items
    pub fn to_html(&self, mode: LinkMode) -> String {
        let mut html = String::new();
        for row in &self.rows {
            let class = if row.active { r#" class="active""# } else { "" };
            let tags: String = row
                .tags
                .iter()
                .map(|t| format!(r#"<span class="tag">{}</span>"#, t))
                .collect();
            html.push_str(&format!(
                r#"<li{} data-index="{}" data-fragment="{}"><a href="{}"><div class="post-title">{}</div><div class="post-sub"><span>{}</span>{}</div></a></li>"#,
                class,
                row.position,
                row.fragment,
                row.href(mode),
                row.title,
                row.date,
                tags
            ));
            html.push('\n');
        }
        html
    }
}

impl DetailView {
    /// Markup for the header
    pub fn meta_html(&self) -> String {
        format!(
            r#"<div><h2>{}</h2></div><div class="meta"><div>{}</div><div>{}</div></div>"#,
            self.title,
            self.date,
            self.tag_line()
        )
    }

    /// Markup for the body region
    pub fn body_html(&self) -> String {
        match &self.body {
            DetailBody::Loading => r#"<p class="muted">Loading…</p>"#.to_string(),
            DetailBody::Content { html } => html.clone(),
            DetailBody::Error { message, hint } => format!(
                r#"<div class="empty"><h2>Couldn’t load the post</h2><p class="muted">{}</p><p class="muted">{}</p></div>"#,
                message,
                escape_text(hint)
            ),
        }
    }
}

/// Everything needed to assemble the full page
pub struct PageContext<'a> {
    pub config: &'a SiteConfig,
    pub list: &'a ListView,
    pub detail: Option<&'a DetailView>,
    pub query: &'a str,
    pub mode: LinkMode,
    /// Path of the highlight stylesheet
    pub stylesheet: &'a str,
}

/// Assemble the complete HTML page
pub fn render_page(ctx: &PageContext<'_>) -> String {
    let config = ctx.config;
    let (meta, content) = match ctx.detail {
        Some(detail) => (detail.meta_html(), detail.body_html()),
        None => (String::new(), String::new()),
    };
    let script = match ctx.mode {
        LinkMode::Fragment => CLIENT_SCRIPT,
        LinkMode::StaticPage => "",
    };
    let search_attrs = match ctx.mode {
        LinkMode::Fragment => "",
        LinkMode::StaticPage => " disabled",
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="generator" content="logpage {version}">
<title>{title}</title>
<link rel="stylesheet" href="{stylesheet}">
{style}
</head>
<body>
<header><h1>{title}</h1><p class="muted">{subtitle}</p></header>
<main>
<aside>
<input id="search" type="search" placeholder="Search posts" value="{query}"{search_attrs}>
<ul id="postList">
{list}</ul>
</aside>
<article>
<div id="postMeta">{meta}</div>
<div id="postContent">{content}</div>
</article>
</main>
<footer class="muted">&copy; <span id="year">{year}</span> {author}</footer>
{script}</body>
</html>
"#,
        lang = escape_text(&config.language),
        version = env!("CARGO_PKG_VERSION"),
        title = escape_text(&config.title),
        subtitle = escape_text(&config.subtitle),
        stylesheet = escape_text(ctx.stylesheet),
        style = STYLE,
        query = escape_text(ctx.query),
        search_attrs = search_attrs,
        list = ctx.list.to_html(ctx.mode),
        meta = meta,
        content = content,
        year = current_year(),
        author = escape_text(&config.author),
        script = script,
    )
}

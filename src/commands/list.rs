//! List site content

use anyhow::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::catalog::{sort_by_date, PostDescriptor};
use crate::helpers::format_date;
use crate::search;
use crate::Site;

/// Print the catalog newest first, optionally filtered by a search query
pub fn run(site: &Site, query: Option<&str>, unlisted: bool, json: bool) -> Result<()> {
    let posts = sort_by_date(search::filter(site.catalog.all(), query.unwrap_or("")));

    if json {
        println!("{}", to_json(&posts)?);
        return Ok(());
    }

    match query {
        Some(q) => println!("Posts matching {:?} ({}):", q, posts.len()),
        None => println!("Posts ({}):", posts.len()),
    }
    for post in &posts {
        let tags = if post.tags.is_empty() {
            String::new()
        } else {
            format!(" #{}", post.tags.join(" #"))
        };
        println!(
            "  {} - {} [{}]{}",
            format_date(&post.date),
            post.title,
            post.source_ref,
            tags
        );
    }

    if unlisted {
        let root = match site.loader()?.source().local_root() {
            Some(root) => root.to_path_buf(),
            None => anyhow::bail!("Unlisted posts can only be found for a local content root"),
        };
        let files = unlisted_posts(site, &root);
        println!("Unlisted markdown files ({}):", files.len());
        for file in files {
            println!("  {}", file.display());
        }
    }

    Ok(())
}

/// Catalog entries as a JSON array, in the `_config.yml` field names
pub fn to_json(posts: &[PostDescriptor]) -> Result<String> {
    Ok(serde_json::to_string_pretty(posts)?)
}

/// Markdown files under the posts directory that no catalog entry points at
pub fn unlisted_posts(site: &Site, content_root: &Path) -> Vec<PathBuf> {
    let listed: HashSet<&str> = site
        .catalog
        .all()
        .iter()
        .map(|p| p.source_ref.trim_start_matches('/'))
        .collect();

    let posts_dir = content_root.join(&site.config.posts_dir);
    let mut files: Vec<PathBuf> = WalkDir::new(&posts_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file() && is_markdown_file(e.path()))
        .filter_map(|e| {
            let relative = e.path().strip_prefix(content_root).ok()?.to_path_buf();
            let key = relative.to_string_lossy().replace('\\', "/");
            (!listed.contains(key.as_str())).then_some(relative)
        })
        .collect();
    files.sort();
    files
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

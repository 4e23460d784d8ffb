//! Create a new post

use anyhow::Result;
use std::fs;

use crate::catalog::PostDescriptor;
use crate::config::SiteConfig;
use crate::helpers::{parse_date, today};
use crate::Site;

/// Create a post file and add it to the catalog in `_config.yml`
///
/// The entry is inserted at the end of the existing `posts:` block so the
/// rest of the file, comments included, is kept. Only when that block can't
/// be found is the whole config rewritten, which drops its comments.
///
/// Returns the new descriptor.
pub fn create_post(
    site: &Site,
    title: &str,
    tags: &[String],
    date: Option<&str>,
) -> Result<PostDescriptor> {
    let date = match date {
        Some(d) if parse_date(d).is_some() => d.to_string(),
        Some(d) => anyhow::bail!("Invalid date {:?}, expected YYYY-MM-DD", d),
        None => today(),
    };

    let filename = format!("{}-{}.md", date, slug::slugify(title));
    let source_ref = format!("{}/{}", site.config.posts_dir.trim_end_matches('/'), filename);

    if site.catalog.find(&source_ref).is_some() {
        anyhow::bail!("Catalog already has a post at {}", source_ref);
    }

    // Posts are written under the local content root; for a remote root
    // they are written next to the config for uploading
    let content_dir = if site.config.is_remote() {
        site.base_dir.clone()
    } else {
        site.base_dir.join(&site.config.content_root)
    };
    let file_path = content_dir.join(&source_ref);
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, format!("Write about {} here.\n", title))?;

    let descriptor = PostDescriptor::new(&source_ref, title, &date).with_tags(tags.iter().cloned());
    let config_path = site.config_path();
    let appended = match fs::read_to_string(&config_path) {
        Ok(text) => append_post_entry(&text, &descriptor, site.config.posts.len())?,
        Err(_) => None,
    };
    match appended {
        Some(text) => fs::write(&config_path, text)?,
        None => {
            tracing::debug!("No editable posts block in {:?}, rewriting it", config_path);
            let mut config = site.config.clone();
            config.posts.push(descriptor.clone());
            config.save(&config_path)?;
        }
    }

    println!("Created: {:?}", file_path);
    Ok(descriptor)
}

/// Insert `descriptor` after the last item of the top-level `posts:` block
///
/// Returns `None` if there is no block list to extend or the edited text
/// would not parse back to `existing + 1` posts.
pub fn append_post_entry(
    text: &str,
    descriptor: &PostDescriptor,
    existing: usize,
) -> Result<Option<String>> {
    let lines: Vec<&str> = text.lines().collect();
    let Some(start) = lines.iter().position(|l| l.trim_end() == "posts:") else {
        return Ok(None);
    };

    let mut end = start + 1;
    let mut indent = None;
    for (i, line) in lines.iter().enumerate().skip(start + 1) {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if !(line.starts_with(' ') || line.starts_with('-')) {
            break;
        }
        if indent.is_none() && trimmed.starts_with('-') {
            indent = Some(line.len() - trimmed.len());
        }
        end = i + 1;
    }
    let pad = " ".repeat(indent.unwrap_or(2));

    let entry = serde_yaml::to_string(&[descriptor])?;
    let mut out: Vec<String> = lines[..end].iter().map(|l| l.to_string()).collect();
    out.extend(entry.lines().map(|l| format!("{}{}", pad, l)));
    out.extend(lines[end..].iter().map(|l| l.to_string()));
    let mut updated = out.join("\n");
    updated.push('\n');

    match serde_yaml::from_str::<SiteConfig>(&updated) {
        Ok(config) if config.posts.len() == existing + 1 => Ok(Some(updated)),
        _ => Ok(None),
    }
}

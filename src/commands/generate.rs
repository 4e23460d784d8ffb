//! Generate static pages

use anyhow::Result;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::content::{ContentSource, Loader};
use crate::render::page::{render_page, static_page_name, LinkMode, PageContext};
use crate::session::Session;
use crate::Site;

const STYLESHEET: &str = "highlight.css";

/// Write `index.html` for the start selection plus one page per post
///
/// Returns the number of pages written.
pub async fn run(site: &Site, fragment: Option<&str>) -> Result<usize> {
    let start = std::time::Instant::now();
    let loader = site.loader()?;

    fs::create_dir_all(&site.public_dir)?;
    fs::write(site.public_dir.join(STYLESHEET), site.stylesheet()?)?;

    // Index page: deep-linked post or the newest one
    let (mut session, ticket) = Session::start(&site.catalog, fragment);
    if let Some(ticket) = ticket {
        let result = loader.load(&ticket.descriptor).await;
        session.complete(&ticket, result);
    }
    write_page(site, &session, "index.html")?;
    let mut written = 1;

    // One page per post, with that post active
    for position in 0..session.entries().len() {
        written += generate_post_page(site, &mut session, &loader, position).await?;
    }

    if let Some(root) = loader.source().local_root() {
        copy_assets(site, root)?;
    }

    tracing::info!(
        "Generated {} pages in {:.2}s",
        written,
        start.elapsed().as_secs_f64()
    );
    Ok(written)
}

async fn generate_post_page<S: ContentSource>(
    site: &Site,
    session: &mut Session,
    loader: &Loader<S>,
    position: usize,
) -> Result<usize> {
    let Some(ticket) = session.select(position) else {
        return Ok(0);
    };
    let result = loader.load(&ticket.descriptor).await;
    if let Err(e) = &result {
        tracing::warn!("{}; writing its error page", e);
    }
    session.complete(&ticket, result);

    // Failed loads still get a page so every list link resolves
    write_page(site, session, &static_page_name(&ticket.descriptor.source_ref))?;
    Ok(1)
}

fn write_page(site: &Site, session: &Session, name: &str) -> Result<()> {
    let list = session.list_view();
    let html = render_page(&PageContext {
        config: &site.config,
        list: &list,
        detail: session.detail(),
        query: "",
        mode: LinkMode::StaticPage,
        stylesheet: STYLESHEET,
    });
    let path = site.public_dir.join(name);
    fs::write(&path, html)?;
    tracing::debug!("Wrote {:?}", path);
    Ok(())
}

/// Copy `<content_root>/<asset_prefix>assets` so rewritten links resolve
fn copy_assets(site: &Site, content_root: &Path) -> Result<()> {
    let relative = format!("{}assets", site.config.asset_prefix);
    let assets_dir = content_root.join(&relative);
    if !assets_dir.is_dir() {
        return Ok(());
    }

    let target_dir = site.public_dir.join(&relative);
    for entry in WalkDir::new(&assets_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        let Ok(rel) = path.strip_prefix(&assets_dir) else {
            continue;
        };
        let dest = target_dir.join(rel);
        if path.is_dir() {
            fs::create_dir_all(&dest)?;
        } else {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
        }
    }
    Ok(())
}

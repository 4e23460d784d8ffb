//! Render a single post to stdout

use anyhow::Result;

use crate::helpers::{decode_fragment, format_date};
use crate::Site;

/// Load the post with the given source reference (or URL fragment) and
/// return its rendered HTML
pub async fn render_post(site: &Site, source_ref: &str) -> Result<String> {
    let wanted = decode_fragment(source_ref);
    let post = site
        .catalog
        .find(&wanted)
        .ok_or_else(|| anyhow::anyhow!("No post with source {:?} in the catalog", wanted))?;

    tracing::info!("{} ({})", post.title, format_date(&post.date));
    let loaded = site.loader()?.load(post).await?;
    Ok(loaded.html)
}

/// Run the show command
pub async fn run(site: &Site, source_ref: &str) -> Result<()> {
    let html = render_post(site, source_ref).await?;
    println!("{}", html);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init::init_site;

    #[tokio::test]
    async fn test_render_post_by_fragment() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();
        let site = Site::new(dir.path()).unwrap();
        let source = site.catalog.all()[0].source_ref.clone();

        let html = render_post(&site, &crate::helpers::encode_fragment(&source))
            .await
            .unwrap();
        assert!(html.contains(r#"<h2 id="images">Images</h2>"#));
        assert!(html.contains("hljs language-rust"));
    }

    #[tokio::test]
    async fn test_render_unknown_post() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();
        assert!(render_post(&site, "nope.md").await.is_err());
    }
}

//! Initialize a new log site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::helpers::today;
use crate::{Site, CONFIG_FILE};

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }

    // Create directory structure
    fs::create_dir_all(target_dir.join("log/posts"))?;
    fs::create_dir_all(target_dir.join("log/assets"))?;

    let date = today();
    let post_file = format!("log/posts/{}-hello-world.md", date);

    let config_content = format!(
        r#"# Log configuration

# Site
title: Log
subtitle: ''
description: ''
author: John Doe
language: en

# Content
## Directory (relative to this file) or http(s) URL the post files live under
content_root: .
## Links to ./assets/... or assets/... inside a post are rewritten to <asset_prefix>assets/...
asset_prefix: log/
posts_dir: log/posts
public_dir: public

# Code highlighting
highlight:
  enable: true
  auto_detect: true
  theme: InspiredGitHub

# Posts (one entry per post)
posts:
  - file: {post_file}
    title: Hello World
    date: "{date}"
    tags: [Meta]
"#
    );
    fs::write(&config_path, config_content)?;

    let sample_post = r#"Welcome to your log! Every post is a plain markdown file listed in `_config.yml`.

## Images

Put images in `log/assets/` and link them relative to the post:

```markdown
![diagram](./assets/diagram.png)
```

## Code

```rust
fn main() {
    println!("Hello, log!");
}
```
"#;
    fs::write(target_dir.join(&post_file), sample_post)?;

    tracing::debug!("Wrote sample post {}", post_file);
    Ok(())
}

/// Run the init command with an existing site
pub fn run(site: &Site) -> Result<()> {
    init_site(&site.base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_site() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();

        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.catalog.len(), 1);
        let post = &site.catalog.all()[0];
        assert!(dir.path().join(&post.source_ref).exists());
        assert!(dir.path().join("log/assets").is_dir());
    }

    #[test]
    fn test_init_refuses_existing_site() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();
        assert!(init_site(dir.path()).is_err());
    }
}

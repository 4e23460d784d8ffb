//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::Site;

/// Remove generated pages
pub fn run(site: &Site) -> Result<()> {
    if site.public_dir.exists() {
        fs::remove_dir_all(&site.public_dir)?;
        tracing::info!("Deleted: {:?}", site.public_dir);
    } else {
        tracing::debug!("Nothing to clean at {:?}", site.public_dir);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_public_dir() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();
        fs::create_dir_all(site.public_dir.join("nested")).unwrap();

        run(&site).unwrap();
        assert!(!site.public_dir.exists());
        // second run is a no-op
        run(&site).unwrap();
    }
}

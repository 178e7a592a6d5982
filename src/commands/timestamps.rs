//! Regenerate the git timestamp file

use anyhow::Result;

use crate::timestamps::GitTimestamps;
use crate::Site;

/// Collect git timestamps for all posts and write them to the timestamp
/// file, returning the number of posts recorded
pub fn run(site: &Site) -> Result<usize> {
    let stamps = GitTimestamps::generate(&site.base_dir, &site.posts_dir)?;

    if stamps.is_empty() {
        tracing::warn!("No markdown files in {:?}, nothing written", site.posts_dir);
        return Ok(0);
    }

    stamps.save(&site.timestamps_file)?;
    tracing::info!(
        "Wrote timestamps for {} posts to {:?}",
        stamps.len(),
        site.timestamps_file
    );
    Ok(stamps.len())
}

//! Post-processing of the build output for static hosting

mod assets;
mod restructure;

pub use assets::{detect_base, detect_base_with, fix_asset_paths};
pub use restructure::{restructure_html, Move};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::SiteError;

/// Fail unless the output directory exists
pub fn ensure_output_dir(dist: &Path) -> Result<(), SiteError> {
    if dist.is_dir() {
        Ok(())
    } else {
        Err(SiteError::MissingOutputDir(dist.to_path_buf()))
    }
}

/// Copy `index.html` to `404.html` so static hosts serve the site shell for
/// unknown paths
pub fn create_404(dist: &Path) -> Result<PathBuf> {
    ensure_output_dir(dist)?;

    let index = dist.join("index.html");
    if !index.is_file() {
        return Err(SiteError::MissingIndex(index).into());
    }

    let not_found = dist.join("404.html");
    fs::copy(&index, &not_found)
        .with_context(|| format!("Failed to copy {:?} to {:?}", index, not_found))?;
    tracing::info!("Created {:?}", not_found);
    Ok(not_found)
}

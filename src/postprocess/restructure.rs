//! Turn `name.html` into `name/index.html`

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::ensure_output_dir;

/// A file moved by [`restructure_html`], paths relative to the output dir
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Move every `name.html` below `dist` to `name/index.html`
///
/// `index.html` files and the root `404.html` stay where they are. A file
/// whose target already exists is left alone with a warning.
pub fn restructure_html(dist: &Path) -> Result<Vec<Move>> {
    ensure_output_dir(dist)?;

    let mut candidates: Vec<PathBuf> = WalkDir::new(dist)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().map_or(false, |ext| ext == "html"))
        .filter(|p| p.file_name().map_or(false, |n| n != "index.html"))
        .filter(|p| p.as_path() != dist.join("404.html"))
        .collect();
    candidates.sort();

    let mut moves = Vec::new();
    for path in candidates {
        let Some(stem) = path.file_stem() else {
            continue;
        };
        let Some(parent) = path.parent() else {
            continue;
        };
        let target_dir = parent.join(stem);
        let target = target_dir.join("index.html");

        let rel_from = relative(dist, &path);
        let rel_to = relative(dist, &target);

        if target.exists() {
            tracing::warn!("Skipping {:?}: {:?} already exists", rel_from, rel_to);
            continue;
        }

        fs::create_dir_all(&target_dir)
            .with_context(|| format!("Failed to create {:?}", target_dir))?;
        fs::rename(&path, &target)
            .with_context(|| format!("Failed to move {:?} to {:?}", path, target))?;
        tracing::debug!("Moved {:?} -> {:?}", rel_from, rel_to);

        moves.push(Move {
            from: rel_from,
            to: rel_to,
        });
    }

    tracing::info!("Restructured {} HTML files", moves.len());
    Ok(moves)
}

fn relative(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

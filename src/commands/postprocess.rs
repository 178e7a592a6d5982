//! Post-process the build output for static hosting

use anyhow::Result;

use crate::postprocess::{
    create_404, detect_base, ensure_output_dir, fix_asset_paths, restructure_html,
};
use crate::Site;

/// Run one post-processing step, or all of them in order
///
/// Targets: `restructure`, `fix-paths`, `404`, `all`.
pub fn run(site: &Site, target: &str) -> Result<()> {
    let dist = &site.public_dir;
    ensure_output_dir(dist)?;

    match target {
        "restructure" => restructure(site)?,
        "fix-paths" | "paths" => fix_paths(site)?,
        "404" => {
            create_404(dist)?;
        }
        "all" => {
            restructure(site)?;
            fix_paths(site)?;
            create_404(dist)?;
        }
        _ => {
            anyhow::bail!(
                "Unknown target: {}. Available: restructure, fix-paths, 404, all",
                target
            );
        }
    }

    Ok(())
}

fn restructure(site: &Site) -> Result<()> {
    let moves = restructure_html(&site.public_dir)?;
    for m in &moves {
        tracing::debug!("Moved {:?} -> {:?}", m.from, m.to);
    }
    tracing::info!("Restructured {} html files", moves.len());
    Ok(())
}

fn fix_paths(site: &Site) -> Result<()> {
    let base = detect_base(&site.public_dir, &site.config.base);
    if base == "/" {
        tracing::info!("Base is /, asset paths left unchanged");
        return Ok(());
    }

    let changed = fix_asset_paths(&site.public_dir, &base)?;
    tracing::info!("Fixed asset paths in {} files for base {}", changed.len(), base);
    Ok(())
}

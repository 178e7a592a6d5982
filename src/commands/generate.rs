//! Generate static files

use anyhow::Result;

use crate::content::PostLoader;
use crate::generator::Generator;
use crate::nav::NavData;
use crate::Site;

/// Render every route into the output directory
pub fn run(site: &Site) -> Result<()> {
    let start = std::time::Instant::now();

    let loader = PostLoader::new(site)?;
    let posts = loader.load_posts()?;
    let nav = NavData::load_or_default(&site.nav_file)?;

    tracing::info!(
        "Loaded {} posts and {} nav links",
        posts.len(),
        nav.link_count()
    );

    let generator = Generator::new(site)?;
    generator.generate(&loader, &posts, &nav)?;

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}

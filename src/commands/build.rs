//! Full build: render then post-process for static hosting

use anyhow::Result;

use crate::commands::{clean, generate, postprocess, timestamps};
use crate::Site;

/// Run the whole pipeline
///
/// With `git_timestamps` the timestamp file is refreshed first so post
/// pages pick up the latest commit dates. The output directory is cleared
/// before rendering, since restructuring never replaces existing pages.
pub fn run(site: &Site, git_timestamps: bool) -> Result<()> {
    let start = std::time::Instant::now();

    if git_timestamps {
        timestamps::run(site)?;
    }

    clean::run(site)?;
    generate::run(site)?;
    postprocess::run(site, "all")?;

    tracing::info!("Built in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_build_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("site.yml"), "base: /newbie-space/\n").unwrap();
        let posts = dir.path().join("content/posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(
            posts.join("hello.md"),
            "---\ndate: 2024-01-05\n---\n\n# Hello\n\nFirst words.\n",
        )
        .unwrap();

        let site = Site::new(dir.path()).unwrap();
        run(&site, false).unwrap();

        let dist = &site.public_dir;
        assert!(dist.join("index.html").is_file());
        assert!(dist.join("404.html").is_file());
        assert!(dist.join("posts/index.html").is_file());
        assert!(dist.join("posts/hello/index.html").is_file());
        assert!(dist.join("projects/index.html").is_file());
        assert!(dist.join("nav/index.html").is_file());
        assert!(!dist.join("posts.html").exists());
        assert!(!dist.join("posts/hello.html").exists());

        let index = fs::read_to_string(dist.join("index.html")).unwrap();
        assert!(index.contains("/newbie-space/assets/css/site.css"));
        assert!(!index.contains("\"/assets/"));
    }

    #[test]
    fn test_rebuild_replaces_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("content/posts");
        fs::create_dir_all(&posts).unwrap();
        let post = posts.join("hello.md");
        fs::write(&post, "---\ndate: 2024-01-05\n---\n\n# Hello\n\nFIRST_VERSION\n").unwrap();

        let site = Site::new(dir.path()).unwrap();
        run(&site, false).unwrap();

        fs::write(&post, "---\ndate: 2024-01-05\n---\n\n# Hello\n\nSECOND_VERSION\n").unwrap();
        run(&site, false).unwrap();

        let page = fs::read_to_string(site.public_dir.join("posts/hello/index.html")).unwrap();
        assert!(page.contains("SECOND_VERSION"));
        assert!(!page.contains("FIRST_VERSION"));
        assert!(!site.public_dir.join("posts/hello.html").exists());
        assert!(!site.public_dir.join("posts.html").exists());
    }
}

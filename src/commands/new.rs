//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::Site;

/// Create `<posts_dir>/<slug>.md` with a dated front matter and the title
/// heading; the slug defaults to the slugified title
pub fn create_post(site: &Site, title: &str, slug: Option<&str>) -> Result<PathBuf> {
    let now = chrono::Local::now();

    let slug = match slug.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => slug::slugify(s),
        None => slug::slugify(title),
    };
    let slug = if slug.is_empty() {
        format!("post-{}", now.format("%Y%m%d%H%M%S"))
    } else {
        slug
    };

    fs::create_dir_all(&site.posts_dir)?;
    let file_path = site.posts_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let content = format!(
        "---\ndate: {}\nauthor: {}\ntags: []\n---\n\n# {}\n\n",
        now.format("%Y-%m-%d"),
        site.config.default_author,
        title.trim()
    );
    fs::write(&file_path, content)?;

    println!("Created: {:?}", file_path);

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FrontMatter;

    #[test]
    fn test_create_post() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();

        let path = create_post(&site, "My First Post", None).unwrap();
        assert!(path.ends_with("content/posts/my-first-post.md"));

        let content = fs::read_to_string(&path).unwrap();
        let (fm, body) = FrontMatter::parse(&content);
        assert!(fm.date().is_some());
        assert_eq!(fm.author(), Some("Newbie Space"));
        assert!(body.contains("# My First Post"));

        assert!(create_post(&site, "My First Post", None).is_err());
    }

    #[test]
    fn test_create_post_with_slug() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();
        let path = create_post(&site, "你好", Some("hello")).unwrap();
        assert!(path.ends_with("hello.md"));
    }
}

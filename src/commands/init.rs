//! Initialize a new site

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const CONFIG_TEMPLATE: &str = r#"# Site
title: Newbie Space
subtitle: ''
description: ''
author: Newbie Space
default_author: Newbie Space
language: zh-CN

# URL
url: http://localhost:4000
## Path prefix when deployed under a sub path, e.g. /newbie-space/
base: /

# Directory
posts_dir: content/posts
static_dir: public
public_dir: dist
nav_file: nav/nav-data.json
timestamps_file: data/git-timestamps.json

# Writing
excerpt_length: 200
recent_posts: 5
highlight:
  line_number: false
  theme: base16-ocean.dark

# Home page
projects: []
"#;

const NAV_TEMPLATE: &str = r#"[
  {
    "name": "dev",
    "title": "开发工具",
    "links": [
      {
        "icon": "github",
        "link": "https://github.com",
        "desc": "Code hosting"
      }
    ]
  }
]
"#;

/// Initialize a new site in the given directory
///
/// Existing files are left untouched.
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir.join("content/posts"))?;
    fs::create_dir_all(target_dir.join("nav"))?;
    fs::create_dir_all(target_dir.join("public/icons"))?;

    let today = chrono::Local::now().format("%Y-%m-%d");
    let sample_post = format!(
        r#"---
date: {}
tags:
  - hello
---

# Hello World

Welcome to your new space. Posts live in `content/posts`, one markdown
file per post; the file name becomes the post URL.

## Writing

Start a post with `newbie-space new "My New Post"` and preview it with
`newbie-space serve`.

::: details Containers
`images`, `timeline` and `details` containers are supported, as are
footnotes[^1].
:::

[^1]: Footnotes show their text on hover.
"#,
        today
    );

    write_if_absent(&target_dir.join(crate::CONFIG_FILE), CONFIG_TEMPLATE)?;
    write_if_absent(&target_dir.join("nav/nav-data.json"), NAV_TEMPLATE)?;
    write_if_absent(
        &target_dir.join("content/posts/hello-world.md"),
        &sample_post,
    )?;

    Ok(())
}

fn write_if_absent(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        tracing::warn!("{:?} already exists, skipped", path);
        return Ok(());
    }
    fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;
    tracing::debug!("Created {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PostLoader;
    use crate::nav::NavData;
    use crate::Site;

    #[test]
    fn test_init_site_is_loadable() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();

        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.config.title, "Newbie Space");
        assert_eq!(site.config.base, "/");

        let posts = PostLoader::new(&site).unwrap().load_posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts.all()[0].title, "Hello World");

        let nav = NavData::load(&site.nav_file).unwrap();
        assert_eq!(nav.link_count(), 1);
    }

    #[test]
    fn test_init_keeps_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("site.yml"), "title: Mine\n").unwrap();
        init_site(dir.path()).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("site.yml")).unwrap(),
            "title: Mine\n"
        );
    }
}

//! List site content

use anyhow::Result;

use crate::content::PostLoader;
use crate::generator::static_routes;
use crate::nav::NavData;
use crate::Site;

/// List site content by type
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    match content_type {
        "post" | "posts" => {
            let posts = PostLoader::new(site)?.load_posts()?;
            println!("Posts ({}):", posts.len());
            for post in posts.all() {
                println!(
                    "  {} - {} [{}] {} min",
                    post.date, post.title, post.slug, post.read_time
                );
            }
        }
        "tag" | "tags" => {
            let posts = PostLoader::new(site)?.load_posts()?;
            let tags = posts.tags();
            println!("Tags ({}):", tags.len());
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        "route" | "routes" => {
            let posts = PostLoader::new(site)?.load_posts()?;
            let routes = static_routes(&posts);
            println!("Routes ({}):", routes.len());
            for route in routes {
                println!("  {}", route);
            }
        }
        "nav" => {
            let nav = NavData::load(&site.nav_file)?;
            println!(
                "Nav ({} categories, {} links):",
                nav.categories().len(),
                nav.link_count()
            );
            for cat in nav.categories() {
                println!("  {} [{}]", cat.title, cat.name);
                for link in &cat.links {
                    println!("    {} - {}", link.link, link.desc);
                }
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, route, nav",
                content_type
            );
        }
    }

    Ok(())
}

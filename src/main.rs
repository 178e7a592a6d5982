//! CLI entry point for newbie-space

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newbie_space::commands;
use newbie_space::Site;

#[derive(Parser)]
#[command(name = "newbie-space")]
#[command(version)]
#[command(about = "Static site builder for a personal homepage, navigation directory and blog", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Deployment base path, e.g. /newbie-space/
    #[arg(short, long, global = true)]
    base: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// File name of the post, without extension
        #[arg(short, long)]
        slug: Option<String>,
    },

    /// Render and post-process the site
    #[command(alias = "b")]
    Build {
        /// Refresh the git timestamp file first
        #[arg(long)]
        git_timestamps: bool,
    },

    /// Render the site without post-processing
    #[command(alias = "g")]
    Generate,

    /// Start a local server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Remove the output directory
    Clean,

    /// List site information
    List {
        /// Type of content to list (post, tag, route, nav)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Regenerate the git timestamp file
    Timestamps,

    /// Manage the navigation directory
    Nav {
        #[command(subcommand)]
        command: NavCommands,
    },

    /// Post-process the output directory
    Postprocess {
        /// Step to run (restructure, fix-paths, 404, all)
        #[arg(default_value = "all")]
        target: String,
    },
}

#[derive(Subcommand)]
enum NavCommands {
    /// Add a link to a category
    Add {
        /// Website URL, https:// is assumed when no scheme is given
        url: String,

        /// Category name, created when missing
        #[arg(long)]
        category: String,

        /// Title for a newly created category
        #[arg(short, long)]
        title: Option<String>,

        /// Link description (defaults to the page description)
        #[arg(long)]
        desc: Option<String>,

        /// Skip looking up the page title and favicon
        #[arg(long)]
        no_fetch: bool,
    },

    /// List categories and links
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "newbie_space=debug,info"
    } else {
        "newbie_space=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    let load_site = |flag: Option<&str>| -> Result<Site> {
        let mut site = Site::new(&base_dir)?;
        let base = site.config.resolve_base(flag);
        site.set_base(&base);
        tracing::debug!("Using base {}", site.config.base);
        Ok(site)
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::New { title, slug } => {
            let site = load_site(cli.base.as_deref())?;
            commands::new::create_post(&site, &title, slug.as_deref())?;
        }

        Commands::Build { git_timestamps } => {
            let site = load_site(cli.base.as_deref())?;
            tracing::info!("Building site with base {}", site.config.base);
            site.build(git_timestamps)?;
            println!("Built successfully into {:?}", site.public_dir);
        }

        Commands::Generate => {
            let site = load_site(cli.base.as_deref())?;
            tracing::info!("Generating static files...");
            site.generate()?;
            println!("Generated successfully!");
        }

        Commands::Serve {
            port,
            ip,
            open,
            r#static,
        } => {
            // Local preview lives at the server root unless asked otherwise
            let mut site = Site::new(&base_dir)?;
            site.set_base(cli.base.as_deref().unwrap_or("/"));

            tracing::info!("Building site...");
            site.build(false)?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            newbie_space::server::start(&site, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            let site = load_site(cli.base.as_deref())?;
            tracing::info!("Cleaning output folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let site = load_site(cli.base.as_deref())?;
            commands::list::run(&site, &r#type)?;
        }

        Commands::Timestamps => {
            let site = load_site(cli.base.as_deref())?;
            let count = commands::timestamps::run(&site)?;
            println!("Recorded timestamps for {} posts", count);
        }

        Commands::Nav { command } => {
            let site = load_site(cli.base.as_deref())?;
            match command {
                NavCommands::Add {
                    url,
                    category,
                    title,
                    desc,
                    no_fetch,
                } => {
                    let opts = commands::nav::AddOptions {
                        url: &url,
                        category: &category,
                        title: title.as_deref(),
                        desc: desc.as_deref(),
                        fetch: !no_fetch,
                    };
                    commands::nav::add(&site, &opts).await?;
                }
                NavCommands::List => commands::nav::list(&site)?,
            }
        }

        Commands::Postprocess { target } => {
            let site = load_site(cli.base.as_deref())?;
            commands::postprocess::run(&site, &target)?;
            println!("Post-processed {:?} ({})", site.public_dir, target);
        }
    }

    Ok(())
}

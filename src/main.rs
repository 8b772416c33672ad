//! CLI entry point for bloggy

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::sync::oneshot;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bloggy::commands::new::Layout;
use bloggy::server::ServerOptions;

#[derive(Parser)]
#[command(name = "bloggy")]
#[command(version)]
#[command(about = "A minimal blogging engine serving markdown posts and pages", long_about = None)]
struct Cli {
    /// Blog folder (defaults to current directory)
    #[arg(short, long, global = true)]
    blog: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a new blog
    Init {
        /// Folder to initialize (defaults to the blog folder)
        folder: Option<PathBuf>,
    },

    /// Create a new post or page
    New {
        /// Layout to use (post, page)
        #[arg(short, long, default_value = "post")]
        layout: String,

        /// Title of the new entry
        title: String,

        /// File name slug (derived from the title by default)
        #[arg(short, long)]
        slug: Option<String>,
    },

    /// Serve the blog
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (overrides config.yaml)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (overrides config.yaml)
        #[arg(short, long)]
        ip: Option<String>,

        /// Reload when posts, pages or templates change
        #[arg(short, long)]
        watch: bool,

        /// Read operator commands (reload, list, help, stop) from stdin
        #[arg(long)]
        interactive: bool,
    },

    /// List blog content
    List {
        /// Type of content to list (posts, pages, skipped)
        #[arg(default_value = "posts")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "bloggy=debug,info"
    } else {
        "bloggy=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.blog {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = match folder {
                Some(folder) if folder.is_absolute() => folder,
                Some(folder) => base_dir.join(folder),
                None => base_dir,
            };
            tracing::info!("Initializing blog in {:?}", target_dir);
            bloggy::commands::init::init_site(&target_dir)?;
            println!("Initialized blog in {:?}", target_dir);
        }

        Commands::New {
            layout,
            title,
            slug,
        } => {
            let blog = bloggy::Blog::new(&base_dir)?;
            let layout = Layout::parse(&layout)?;
            let path = blog.new_post(&title, layout, slug.as_deref())?;
            println!("Created: {:?}", path);
        }

        Commands::Serve {
            port,
            ip,
            watch,
            interactive,
        } => {
            let blog = bloggy::Blog::new(&base_dir)?;
            let engine = blog.engine()?;

            let mut options = ServerOptions::from_engine(&engine);
            if let Some(port) = port {
                options.port = port;
            }
            if let Some(ip) = ip {
                options.address = ip;
            }
            options.watch = watch;

            let stop = if interactive {
                let (stop_tx, stop_rx) = oneshot::channel();
                bloggy::commands::shell::spawn(engine.clone(), stop_tx);
                Some(stop_rx)
            } else {
                None
            };

            bloggy::server::start(engine, options, stop).await?;
        }

        Commands::List { r#type } => {
            let blog = bloggy::Blog::new(&base_dir)?;
            blog.list(&r#type)?;
        }

        Commands::Version => {
            println!("bloggy version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

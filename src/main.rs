//! CLI entry point for logpage

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "logpage")]
#[command(version)]
#[command(about = "A tiny personal log: a post catalog, on-demand markdown and search", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new log site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post and add it to the catalog
    New {
        /// Title of the new post
        title: String,

        /// Comma separated tags
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Publication date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List posts
    List {
        /// Only show posts matching this query
        #[arg(short, long)]
        search: Option<String>,

        /// Also show markdown files missing from the catalog
        #[arg(long)]
        unlisted: bool,

        /// Print the matching catalog entries as JSON
        #[arg(long, conflicts_with = "unlisted")]
        json: bool,
    },

    /// Render one post to stdout
    Show {
        /// Source reference (or URL fragment) of the post
        source: String,
    },

    /// Generate static pages
    #[command(alias = "g")]
    Generate {
        /// Fragment selecting the post shown on the index page
        #[arg(short, long)]
        fragment: Option<String>,
    },

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// Remove generated pages
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "logpage=debug,info"
    } else {
        "logpage=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing log site in {:?}", target_dir);
            logpage::commands::init::init_site(&target_dir)?;
            println!("Initialized log site in {:?}", target_dir);
        }

        Commands::New { title, tags, date } => {
            let site = logpage::Site::new(&base_dir)?;
            tracing::info!("Creating new post: {}", title);
            logpage::commands::new::create_post(&site, &title, &tags, date.as_deref())?;
        }

        Commands::List {
            search,
            unlisted,
            json,
        } => {
            let site = logpage::Site::new(&base_dir)?;
            logpage::commands::list::run(&site, search.as_deref(), unlisted, json)?;
        }

        Commands::Show { source } => {
            let site = logpage::Site::new(&base_dir)?;
            logpage::commands::show::run(&site, &source).await?;
        }

        Commands::Generate { fragment } => {
            let site = logpage::Site::new(&base_dir)?;
            tracing::info!("Generating static pages...");
            let written = logpage::commands::generate::run(&site, fragment.as_deref()).await?;
            println!("Generated {} pages in {:?}", written, site.public_dir);
        }

        Commands::Server { port, ip, open } => {
            let site = logpage::Site::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            logpage::server::start(&site, &ip, port, open).await?;
        }

        Commands::Clean => {
            let site = logpage::Site::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            logpage::commands::clean::run(&site)?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("logpage version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

//! # feed
//!
//! Terminal front end for the livefeed synchronization engine.
//!
//! ## Commands
//!
//! - `login`: Sign in and store the session
//! - `logout`: Clear the stored session
//! - `whoami`: Show the current session
//! - `list`: Print one page of the feed
//! - `show`: Print a record and its comments
//! - `follow`: Watch the feed (or a record's comments) live
//! - `post`: Publish a record (ADMIN)
//! - `comment`: Comment on a record
//!
//! ## Example
//!
//! ```bash
//! # Sign in (prompts for the password)
//! feed login admin
//!
//! # Watch the feed, loading two pages first
//! feed follow --pages 2
//!
//! # In another terminal, publish; it shows up in the follower
//! feed post --title "Release" --content "v2 is out"
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use feed_client::SseTransport;
use feed_types::{ItemId, NewItem};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod app;
mod commands;
mod config;

use app::App;
use commands::{comment, follow, list, login, logout, post, show, whoami};
use config::CliConfig;

/// Terminal front end for a live feed server.
#[derive(Parser, Debug)]
#[command(name = "feed")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory for the stored session and feed.toml
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// API root, overriding feed.toml (e.g. http://localhost:8080/api)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Log client activity to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and store the session
    Login {
        /// Account id
        id: String,

        /// Password (will prompt if not provided)
        #[arg(long, short)]
        password: Option<String>,
    },

    /// Clear the stored session
    Logout,

    /// Show the current session
    Whoami,

    /// Print one page of the feed
    List {
        /// Page index, starting at 0
        #[arg(long, default_value = "0")]
        page: u32,

        /// Records per page (default from feed.toml)
        #[arg(long)]
        size: Option<u32>,
    },

    /// Print a record and its comments
    Show {
        /// Record id
        id: ItemId,
    },

    /// Watch the feed live until interrupted
    Follow {
        /// Pages to load before waiting for new records
        #[arg(long, default_value = "1")]
        pages: u32,

        /// Stop after this many new records
        #[arg(long)]
        count: Option<usize>,

        /// Follow this record's comments instead of the feed
        #[arg(long)]
        comments: Option<ItemId>,
    },

    /// Publish a record
    Post {
        /// Title
        #[arg(long, short)]
        title: String,

        /// Body text
        #[arg(long, short)]
        content: String,

        /// Optional memo
        #[arg(long, short)]
        memo: Option<String>,
    },

    /// Comment on a record
    Comment {
        /// Record id
        id: ItemId,

        /// Comment text
        content: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Determine data directory
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;
    config::set_dir_permissions_0700(&data_dir).await?;

    let config = CliConfig::load(&data_dir)
        .await?
        .feed_config(cli.server.as_deref());
    let app = App::open(config, &data_dir).await?;
    app.watch_session();

    match cli.command {
        Commands::Login { id, password } => {
            login::run(&app, &id, password.as_deref()).await?;
        }
        Commands::Logout => {
            logout::run(&app).await?;
        }
        Commands::Whoami => {
            whoami::run(&app).await?;
        }
        Commands::List { page, size } => {
            list::run(&app, page, size).await?;
        }
        Commands::Show { id } => {
            show::run(&app, id).await?;
        }
        Commands::Follow {
            pages,
            count,
            comments,
        } => {
            let transport =
                SseTransport::new(&app.config).context("Failed to create stream transport")?;
            let options = follow::FollowOptions {
                pages,
                count,
                comments,
            };
            follow::run(&app, Arc::new(transport), options).await?;
        }
        Commands::Post {
            title,
            content,
            memo,
        } => {
            let mut item = NewItem::new(title, content);
            if let Some(memo) = memo {
                item = item.with_memo(memo);
            }
            post::run(&app, item).await?;
        }
        Commands::Comment { id, content } => {
            comment::run(&app, id, &content).await?;
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Get the default data directory for the feed CLI.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "livefeed", "feed")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use cadenza_library::Config;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "cadenza", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the snapshot database (default: ~/.local/share/cadenza/library.db)
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Rebuild the catalog from a directory of track lists
    ///
    /// Reads every `*.json` file under the track-list directory (recursively,
    /// in file-name order). Each file holds one track list: an array of
    /// records with `service`, `uri`, and `metadata` (title, album, artists,
    /// genres, tracknumber, date).
    ///
    /// The catalog is rebuilt from scratch: genres, artists, albums, tracks,
    /// and playable items are deduplicated by identity and linked into a
    /// parent/child graph, the predefined sorted indexes are generated, and
    /// the whole catalog is stored as one snapshot. A failed rebuild leaves
    /// the previous snapshot in place.
    Rebuild {
        /// Directory of JSON track lists (default: from config)
        #[arg(long)]
        tracklists: Option<PathBuf>,
    },
    /// Browse the catalog
    ///
    /// With no reference, lists the predefined indexes. `index:<name>` lists
    /// a stored index; `<type>:<id>` lists the children of an entity
    /// (genre → artists, artist → albums, album → tracks, track → items).
    Browse {
        /// Reference to browse (empty for the index directory)
        #[arg(default_value = "")]
        reference: String,

        /// Path to sort children by, overriding the per-type default
        #[arg(long)]
        sort: Option<String>,

        /// Page size (accepted; full listings are always returned)
        #[arg(long)]
        limit: Option<usize>,

        /// Page offset (accepted; full listings are always returned)
        #[arg(long)]
        offset: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Resolve a path against the catalog
    ///
    /// START is a `<type>:<id>` reference, or `/` for the catalog root.
    /// PATH is a colon-separated path such as `parents:#0:parents:#:name`.
    Resolve {
        /// Where to start (`<type>:<id>` or `/`)
        start: String,

        /// Path to resolve
        path: String,
    },
    /// Show catalog status
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Print a single config value, or the config file if no key is given
    Get {
        /// Config key (snapshot_path, tracklists_dir)
        key: Option<String>,
    },
    /// Show the config file path
    Path,
    /// Create the config file with defaults
    Init,
    /// Print an example config file
    Example,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match cli.snapshot {
        Some(path) => Config::load_with_snapshot_path(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Rebuild { tracklists } => {
            commands::run_rebuild(&config, tracklists).await?;
        }
        Commands::Browse {
            reference,
            sort,
            limit,
            offset,
            json,
        } => {
            let request = commands::BrowseRequest {
                reference,
                sort,
                limit,
                offset,
                json,
            };
            commands::run_browse(&config, request).await?;
        }
        Commands::Resolve { start, path } => {
            commands::run_resolve(&config, &start, &path).await?;
        }
        Commands::Status => {
            commands::show_status(&config).await?;
        }
        Commands::Config { command } => match command {
            ConfigCommand::Show => commands::config::show_config(&config)?,
            ConfigCommand::Get { key } => commands::config::get_config(&config, key)?,
            ConfigCommand::Path => commands::config::show_path()?,
            ConfigCommand::Init => commands::config::init_config()?,
            ConfigCommand::Example => commands::config::show_example()?,
        },
    }

    Ok(())
}

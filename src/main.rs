use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use gallery::cli::{image, inspect, list, sync};
use gallery::config::Config;
use gallery::extract::ExtractorRegistry;
use gallery::gallery::Gallery;
use gallery::query::{ListParams, SortKey, SortOrder};
use gallery::server;

#[derive(Parser)]
#[command(name = "gallery")]
#[command(about = "Personal gallery backend for locally generated images")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "gallery.yaml")]
    config: String,

    /// Override the database path
    #[arg(long)]
    database: Option<String>,

    /// Override the image root
    #[arg(long)]
    images: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API and static file server
    Serve {
        /// Override the bind host
        #[arg(long)]
        host: Option<String>,

        /// Override the bind port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Index images that are not in the database yet
    Sync,

    /// List indexed images
    List {
        /// Case-insensitive substring filter on prompt and negative prompt
        #[arg(short, long)]
        query: Option<String>,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long)]
        limit: Option<u32>,

        /// created_at or rating
        #[arg(long, value_parser = parse_sort_key, default_value = "created_at")]
        sort_by: SortKey,

        /// asc or desc
        #[arg(long, value_parser = parse_sort_order, default_value = "desc")]
        sort_order: SortOrder,
    },

    /// Show one image with its metadata
    Show { id: i64 },

    /// Rate an image from 0 to 5
    Rate {
        id: i64,
        #[arg(allow_negative_numbers = true)]
        rating: i64,
    },

    /// Delete an image file and its database row
    Delete { id: i64 },

    /// Run every metadata extractor against a file and report the results
    Inspect { file: PathBuf },
}

fn parse_sort_key(value: &str) -> Result<SortKey, String> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| format!("unknown sort key '{}' (expected created_at or rating)", value))
}

fn parse_sort_order(value: &str) -> Result<SortOrder, String> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| format!("unknown sort order '{}' (expected asc or desc)", value))
}

fn open_gallery(config: &Config) -> Result<Gallery> {
    Gallery::open(config).context("Failed to open gallery")
}

fn main() -> Result<()> {
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("tracing init failed: {}", e);
    }

    let cli = Cli::parse();

    // Load config
    let mut config = Config::load(&cli.config).unwrap_or_else(|e| {
        warn!(error = %e, "falling back to default configuration");
        Config::default()
    });
    if let Some(database) = cli.database {
        config.database.path = database;
    }
    if let Some(images) = cli.images {
        config.images.root = images;
    }

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let gallery = open_gallery(&config)?;
            actix_web::rt::System::new()
                .block_on(server::run(gallery, &config))
                .context("HTTP server failed")?;
        }
        Commands::Sync => {
            sync::run(&open_gallery(&config)?)?;
        }
        Commands::List {
            query,
            page,
            limit,
            sort_by,
            sort_order,
        } => {
            let params = ListParams {
                query,
                page,
                limit: limit.unwrap_or(config.server.default_page_size),
                sort_by,
                sort_order,
            };
            list::run(&open_gallery(&config)?, params)?;
        }
        Commands::Show { id } => {
            image::show(&open_gallery(&config)?, id)?;
        }
        Commands::Rate { id, rating } => {
            image::rate(&open_gallery(&config)?, id, rating)?;
        }
        Commands::Delete { id } => {
            image::delete(&open_gallery(&config)?, id)?;
        }
        Commands::Inspect { file } => {
            // Works on any file and needs no database
            let registry = ExtractorRegistry::new(&config);
            inspect::run(&registry, &file)?;
        }
    }

    Ok(())
}

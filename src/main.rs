//! az9s - A K9s-inspired terminal UI for browsing Azure tenant resources
//!
//! Drill from subscriptions through resource groups down to individual
//! resources, run remote VM commands, and attach to live serial consoles.

use anyhow::Result;
use az9s::cache::ResourceCache;
use az9s::config::ConfigLoader;
use az9s::provider::{AzCliProvider, ResourceProvider};
use az9s::tui;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

/// az9s - A K9s-inspired terminal UI for browsing Azure tenant resources
#[derive(Parser, Debug)]
#[command(name = "az9s")]
#[command(about = "A K9s-inspired terminal UI for browsing Azure tenant resources", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,

    /// Path to the configuration file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Configuration subcommand
    #[command(subcommand)]
    command: Option<Command>,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
enum ConfigSubcommand {
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
    /// Print the built-in default configuration
    Default,
}

/// Initialize logging based on debug flag
/// Returns the log file path if debug logging is enabled
fn init_logging(debug: bool) -> Option<PathBuf> {
    if !debug {
        // No logging by default (silent operation)
        return None;
    }

    // Write to a temp file so the TUI owns stdout/stderr.
    let log_path = tempfile::Builder::new()
        .prefix("az9s-")
        .suffix(".log")
        .tempfile()
        .map(|f| {
            let path = f.path().to_path_buf();
            // Keep the file alive for the life of the process; the OS
            // temp cleaner reclaims it later.
            std::mem::forget(f);
            path
        })
        .unwrap_or_else(|_| std::env::temp_dir().join(format!("az9s-{}.log", std::process::id())));

    let file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&log_path)
        .expect("Failed to open log file");

    tracing_subscriber::fmt()
        .with_writer(file)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_ansi(false)
        .with_target(true)
        .init();

    Some(log_path)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle config subcommand
    if let Some(Command::Config { subcommand }) = args.command {
        return handle_config_command(subcommand, args.config.as_deref());
    }

    let log_file = init_logging(args.debug);
    if let Some(ref log_path) = log_file {
        eprintln!(
            "Debug logging enabled. Logs written to: {}",
            log_path.display()
        );
    }

    let config = ConfigLoader::load(args.config.as_deref())?;
    tracing::debug!(
        "Configuration loaded: ttl={}s, {} view(s)",
        config.cache.ttl_seconds,
        config.views.len()
    );

    let cache = Arc::new(ResourceCache::new(config.cache.ttl()));
    let _sweeper = cache.spawn_sweeper(config.cache.sweep_interval());

    let provider: Arc<dyn ResourceProvider> = Arc::new(AzCliProvider::new());

    tui::run_tui(config, cache, provider).await
}

/// Handle configuration subcommands
fn handle_config_command(cmd: ConfigSubcommand, path: Option<&std::path::Path>) -> Result<()> {
    match cmd {
        ConfigSubcommand::Path => {
            match ConfigLoader::default_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("(no config directory available on this platform)"),
            }
        }
        ConfigSubcommand::Validate => match ConfigLoader::validate(path) {
            Ok(()) => println!("Configuration is valid"),
            Err(e) => {
                eprintln!("Configuration validation failed: {:#}", e);
                std::process::exit(1);
            }
        },
        ConfigSubcommand::Default => {
            print!("{}", ConfigLoader::DEFAULT_CONFIG);
        }
    }

    Ok(())
}

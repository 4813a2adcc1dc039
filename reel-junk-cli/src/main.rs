//! reel-junk CLI
//!
//! Resolves movie titles to poster artwork and enriches catalog listings.

mod commands;
mod error;
mod spinner;

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use crate::commands::Overrides;
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "reel-junk")]
#[command(about = "Find poster artwork for movie titles", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags accepted by every command.
#[derive(Args, Clone)]
struct GlobalArgs {
    /// Cache file to use instead of the configured one
    #[arg(long, global = true)]
    cache_file: Option<PathBuf>,

    /// Maximum number of titles resolved at once
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Maximum IMDb requests per second (0 disables the limit)
    #[arg(long, global = true)]
    rate_limit: Option<u32>,

    /// Show debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

impl GlobalArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            cache_file: self.cache_file.clone(),
            concurrency: self.concurrency,
            rate_limit: self.rate_limit,
            quiet: self.quiet,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the best poster for one or more titles
    Art {
        /// Titles to resolve
        titles: Vec<String>,

        /// Read titles from a file, one per line
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Attach posters to a catalog listing (TSV: title<TAB>slug)
    Catalog {
        /// Listing file
        file: PathBuf,
    },

    /// Build metadata for a single item
    Meta {
        /// Title to resolve
        title: String,

        /// Page the item was listed on, read for its synopsis
        #[arg(long)]
        page_url: Option<String>,
    },

    /// Manage the resolution cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show entry counts
    Stats,

    /// Remove every cached answer
    Clear,

    /// Print the cache file path
    Path,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show resolved settings and where each came from
    Show,

    /// Print the config file path
    Path,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.global);

    if let Err(e) = run(cli) {
        log::error!(
            "{} {}",
            "\u{2718}".if_supports_color(Stderr, |t| t.red()),
            e,
        );
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let overrides = cli.global.overrides();
    match cli.command {
        Commands::Art { titles, file, json } => {
            commands::art::run_art(&overrides, titles, file, json)
        }
        Commands::Catalog { file } => commands::catalog::run_catalog(&overrides, &file),
        Commands::Meta { title, page_url } => {
            commands::meta::run_meta(&overrides, title, page_url)
        }
        Commands::Cache { action } => match action {
            CacheAction::Stats => commands::cache::run_cache_stats(&overrides),
            CacheAction::Clear => commands::cache::run_cache_clear(&overrides),
            CacheAction::Path => commands::cache::run_cache_path(&overrides),
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(&overrides),
            ConfigAction::Path => {
                commands::config::run_config_path();
                Ok(())
            }
        },
    }
}

/// Messages go to stderr without decoration so stdout stays clean for JSON.
/// `RUST_LOG` takes precedence over `-v` / `-q`.
fn init_logging(global: &GlobalArgs) {
    let level = if global.verbose {
        "info,reel_junk=debug,reel_junk_lib=debug,reel_junk_scraper=debug"
    } else if global.quiet {
        "warn"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

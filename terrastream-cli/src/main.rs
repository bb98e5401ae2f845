//! Terrastream CLI - Command-line interface
//!
//! Thin front end over the terrastream library: warm the disk cache, look up
//! where a resource is stored, run a geocoding search and manage the config
//! and cache directories.

use clap::{Parser, Subcommand};

mod commands;
mod error;
mod runner;

use commands::cache::CacheAction;
use commands::config::ConfigCommands;
use commands::search::SearchArgs;

#[derive(Parser)]
#[command(name = "terrastream")]
#[command(version = terrastream::VERSION)]
#[command(about = "Resource cache and tile streaming tools", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the disk cache location of resource names
    Path {
        /// Resource names (URLs or local paths)
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Download resources into the disk cache
    Fetch {
        /// Resource names (URLs or local paths)
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Run a geocoding search around a position
    Search {
        /// Free-text query
        query: String,

        /// Longitude of the reference position in decimal degrees
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        lon: f64,

        /// Latitude of the reference position in decimal degrees
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        lat: f64,

        /// Print one JSON object per hit
        #[arg(long)]
        json: bool,

        /// Keep raw provider order and duplicates
        #[arg(long)]
        no_filter: bool,
    },

    /// Manage the disk cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Inspect the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    let result = match cli.command {
        Commands::Path { names } => commands::path::run(&names),
        Commands::Fetch { names } => commands::fetch::run(&names, verbose),
        Commands::Search {
            query,
            lon,
            lat,
            json,
            no_filter,
        } => commands::search::run(SearchArgs {
            query,
            lon,
            lat,
            json,
            no_filter,
            verbose,
        }),
        Commands::Cache { action } => commands::cache::run(action),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search_with_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "terrastream",
            "search",
            "Brno",
            "--lon",
            "-16.6",
            "--lat",
            "49.2",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Search {
                query,
                lon,
                lat,
                json,
                no_filter,
            } => {
                assert_eq!(query, "Brno");
                assert_eq!(lon, -16.6);
                assert_eq!(lat, 49.2);
                assert!(json);
                assert!(!no_filter);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_fetch_requires_names() {
        assert!(Cli::try_parse_from(["terrastream", "fetch"]).is_err());
    }

    #[test]
    fn test_global_verbose_after_subcommand() {
        let cli = Cli::try_parse_from(["terrastream", "cache", "stats", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Cache {
                action: CacheAction::Stats
            }
        ));
    }
}

//! Search command - run a geocoding query and print the filtered hits.

use std::sync::Arc;

use terrastream::coord::GeographicConvertor;
use terrastream::log::TracingLogger;
use terrastream::resource::ResourceRegistry;
use terrastream::search::{SearchItem, SearchManager};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the search command.
pub struct SearchArgs {
    pub query: String,
    pub lon: f64,
    pub lat: f64,
    pub json: bool,
    pub no_filter: bool,
    pub verbose: bool,
}

/// Run the search command.
pub fn run(args: SearchArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.verbose)?;
    runner.log_startup("search");
    let config = runner.config();

    let mut search_config = config.search_config();
    if args.no_filter {
        search_config = search_config.with_filtering(false);
    }

    let logger = Arc::new(TracingLogger::new());
    let mut registry = ResourceRegistry::new(
        config.registry_config(),
        runner.network_cache()?,
        Arc::new(terrastream::resource::UnsupportedDecoder),
        logger.clone(),
    );
    let mut searches = SearchManager::new(search_config, Arc::new(GeographicConvertor), logger);

    let task = searches.search(&mut registry, &args.query, [args.lon, args.lat, 0.0]);
    runner.poll_until("search results", || {
        searches.update(&mut registry);
        task.is_done()
    })?;

    if let Some(err) = task.error() {
        return Err(err.into());
    }

    let results = task.results();
    if args.json {
        for item in &results {
            match item.to_json() {
                Ok(line) => println!("{}", line),
                Err(e) => eprintln!("Skipping unserializable hit: {}", e),
            }
        }
    } else if results.is_empty() {
        println!("No results for '{}'", args.query);
    } else {
        for (i, item) in results.iter().enumerate() {
            println!("{:>2}. {}", i + 1, summary(item));
        }
    }
    Ok(())
}

fn summary(item: &SearchItem) -> String {
    let mut line = item.title.clone();
    if line.is_empty() {
        line = item.display_name.clone();
    }
    if !item.region.is_empty() {
        line.push_str(&format!(", {}", item.region));
    }
    if !item.country.is_empty() {
        line.push_str(&format!(", {}", item.country));
    }
    line.push_str(&format!(" [{}]", item.kind));
    if item.distance.is_finite() {
        line.push_str(&format!(" {:.1} km", item.distance / 1000.0));
    }
    line
}

//! Geocoding search.
//!
//! A [`SearchManager`] turns a query into a results URL, loads it through
//! the resource registry at top priority and, once the JSON arrives, parses
//! it into [`SearchItem`]s and runs [`filter_results`] over them.

mod filter;
mod item;
mod parse;
mod task;

pub use filter::{
    derive_labels, filter_results, IMPORTANCE_TOLERANCE, LOW_IMPORTANCE, PROXIMITY_THRESHOLD,
};
pub use item::SearchItem;
pub use parse::{number_or_nan, parse_results};
pub use task::{
    generate_search_url, url_encode, SearchConfig, SearchError, SearchManager, SearchTask,
    QUERY_PLACEHOLDER,
};

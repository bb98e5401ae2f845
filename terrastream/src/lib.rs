//! Terrastream - resource caching and quadtree tile streaming
//!
//! This library streams tiled globe/terrain datasets: a byte cache with
//! bounded concurrent downloads and an on-disk mirror, a registry that runs
//! every typed resource through one lifecycle, and a per-frame quadtree
//! traversal that requests only what the target level of detail needs.
//!
//! # High-Level API
//!
//! For most use cases, the [`map`] module provides a facade:
//!
//! ```ignore
//! use terrastream::map::{MapSession, SessionConfig};
//!
//! let mut session = MapSession::new(config, cache, decoder, convertor, logger);
//! session.set_map_config_path("https://maps.example/mapConfig.json");
//!
//! loop {
//!     let frame = session.tick();
//!     for draw in &frame.draws {
//!         // upload and draw
//!     }
//! }
//! ```

pub mod cache;
pub mod config;
pub mod coord;
pub mod fetch;
pub mod log;
pub mod logging;
pub mod map;
pub mod resource;
pub mod search;
pub mod streamer;
pub mod tile;

/// Version of the Terrastream library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! CLI command implementations.
//!
//! # Command Modules
//!
//! - [`cache`] - Disk cache management (stats, clear)
//! - [`config`] - Configuration inspection (path, show, init)
//! - [`fetch`] - Warm the disk cache through the network transport
//! - [`path`] - Print where a resource is cached
//! - [`search`] - Run a geocoding search

pub mod cache;
pub mod config;
pub mod fetch;
pub mod path;
pub mod search;

//! The per-map facade driven once per frame.

use std::sync::Arc;

use thiserror::Error;

use super::config::{MapConfig, MapConfigError};
use crate::cache::Cache;
use crate::config::{ConfigFile, DEFAULT_PLACEHOLDER_TEXTURE};
use crate::coord::{CoordinateConvertor, Point3, SrsType};
use crate::log::Logger;
use crate::resource::{
    ContentDecoder, ContentKind, RegistryConfig, ResourceRef, ResourceRegistry, ResourceState,
};
use crate::search::{SearchConfig, SearchManager, SearchTask};
use crate::streamer::{DrawUnit, QuadtreeStreamer, TraversalStats};
use crate::tile::TileId;
use crate::{log_error, log_info};

/// Map session errors.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("map configuration is not ready")]
    NotReady,

    #[error(transparent)]
    Config(#[from] MapConfigError),
}

/// Everything a session needs besides its collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub registry: RegistryConfig,
    pub search: SearchConfig,
    pub placeholder_texture: String,
}

impl SessionConfig {
    pub fn from_config_file(file: &ConfigFile) -> Self {
        Self {
            registry: file.registry_config(),
            search: file.search_config(),
            placeholder_texture: file.resources.placeholder_texture.clone(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            registry: RegistryConfig::default(),
            search: SearchConfig::default(),
            placeholder_texture: DEFAULT_PLACEHOLDER_TEXTURE.to_string(),
        }
    }
}

/// What one tick produced.
#[derive(Debug, Clone, Default)]
pub struct FrameOutput {
    pub draws: Vec<DrawUnit>,
    pub stats: TraversalStats,
    pub searches_resolved: usize,
    pub evicted: usize,
}

enum MapConfigState {
    Unset,
    Loading { path: String, _hold: Option<ResourceRef> },
    Ready(MapConfig),
    Failed(String),
}

/// Owns the registry, streamer and searches for one map.
///
/// Call [`tick`](Self::tick) once per frame. The map configuration is
/// loaded like any other resource; until it is ready, ticks only advance
/// downloads and searches.
pub struct MapSession {
    registry: ResourceRegistry,
    streamer: QuadtreeStreamer,
    searches: SearchManager,
    base_search: SearchConfig,
    nav_srs: SrsType,
    map_config: MapConfigState,
    last_stats: TraversalStats,
    logger: Arc<dyn Logger>,
}

impl MapSession {
    pub fn new(
        config: SessionConfig,
        cache: Cache,
        decoder: Arc<dyn ContentDecoder>,
        convertor: Arc<dyn CoordinateConvertor>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            registry: ResourceRegistry::new(config.registry, cache, decoder, Arc::clone(&logger)),
            streamer: QuadtreeStreamer::new(config.placeholder_texture, Arc::clone(&logger)),
            nav_srs: convertor.nav_srs_type(),
            searches: SearchManager::new(config.search.clone(), convertor, Arc::clone(&logger)),
            base_search: config.search,
            map_config: MapConfigState::Unset,
            last_stats: TraversalStats::default(),
            logger,
        }
    }

    /// Start loading the map configuration at `path`, replacing any
    /// previous one.
    pub fn set_map_config_path(&mut self, path: &str) {
        log_info!(self.logger, "Loading map configuration {}", path);
        let handle = self.registry.request(path, ContentKind::Json, f32::INFINITY);
        self.map_config = MapConfigState::Loading {
            path: path.to_string(),
            _hold: self.registry.hold(handle),
        };
        self.searches.set_config(self.base_search.clone());
        self.last_stats = TraversalStats::default();
    }

    /// Advance one frame: downloads, map configuration, streaming of
    /// every surface, searches and eviction.
    pub fn tick(&mut self) -> FrameOutput {
        self.registry.begin_tick();
        self.registry.cache_mut().pump();
        self.update_map_config();

        let mut out = FrameOutput::default();
        if let MapConfigState::Ready(config) = &self.map_config {
            for surface in &config.surfaces {
                let traversal = self.streamer.traverse(&mut self.registry, surface, TileId::ROOT);
                out.draws.extend(traversal.draws);
                out.stats.merge(&traversal.stats);
            }
            self.last_stats = out.stats.clone();
        }

        out.searches_resolved = self.searches.update(&mut self.registry);
        out.evicted = self.registry.collect();
        out
    }

    fn update_map_config(&mut self) {
        let MapConfigState::Loading { path, .. } = &self.map_config else {
            return;
        };
        let path = path.clone();
        let (handle, state) = self.registry.acquire(&path, ContentKind::Json, f32::INFINITY);
        let next = match state {
            ResourceState::Uninitialized | ResourceState::Downloading => return,
            ResourceState::Error => {
                let reason = self
                    .registry
                    .error(handle)
                    .map_or_else(|| "unavailable".to_string(), |e| e.to_string());
                log_error!(self.logger, "Map configuration {} failed: {}", path, reason);
                MapConfigState::Failed(reason)
            }
            ResourceState::Ready => {
                let parsed = match self.registry.json(handle) {
                    Some(doc) => MapConfig::from_json(doc, &path)
                        .and_then(|config| {
                            config.check_navigation_srs(self.nav_srs)?;
                            Ok(config)
                        })
                        .map_err(|e| e.to_string()),
                    None => Err("not a JSON document".to_string()),
                };
                match parsed {
                    Ok(config) => {
                        self.apply_search_options(&config);
                        log_info!(
                            self.logger,
                            "Map configuration ready: {} surfaces",
                            config.surfaces.len()
                        );
                        MapConfigState::Ready(config)
                    }
                    Err(reason) => {
                        log_error!(self.logger, "Map configuration {} invalid: {}", path, reason);
                        MapConfigState::Failed(reason)
                    }
                }
            }
        };
        self.map_config = next;
    }

    fn apply_search_options(&mut self, config: &MapConfig) {
        let url = config
            .search_url
            .clone()
            .unwrap_or_else(|| self.base_search.url_template().to_string());
        let srs = config.search_srs.unwrap_or(self.base_search.srs());
        self.searches.set_config(
            SearchConfig::new(url, srs).with_filtering(self.base_search.filtering()),
        );
    }

    pub fn is_map_config_ready(&self) -> bool {
        matches!(self.map_config, MapConfigState::Ready(_))
    }

    pub fn map_config(&self) -> Option<&MapConfig> {
        match &self.map_config {
            MapConfigState::Ready(config) => Some(config),
            _ => None,
        }
    }

    /// Why the map configuration failed, if it did.
    pub fn map_config_error(&self) -> Option<&str> {
        match &self.map_config {
            MapConfigState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Every resource the last frame needed was ready.
    pub fn is_render_complete(&self) -> bool {
        self.is_map_config_ready() && self.last_stats.is_complete()
    }

    /// Share of the last frame's resources that were ready, 0.0 to 1.0.
    pub fn render_progress(&self) -> f64 {
        if !self.is_map_config_ready() {
            return 0.0;
        }
        let requested = self.last_stats.resources_requested();
        if requested == 0 {
            return 1.0;
        }
        self.last_stats.resources_ready() as f64 / requested as f64
    }

    /// Start a search with the map's search options.
    pub fn search(&mut self, query: &str, point: Point3) -> Result<Arc<SearchTask>, MapError> {
        if !self.is_map_config_ready() {
            return Err(MapError::NotReady);
        }
        Ok(self.searches.search(&mut self.registry, query, point))
    }

    /// Search options currently in effect.
    pub fn search_config(&self) -> &SearchConfig {
        self.searches.config()
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ResourceRegistry {
        &mut self.registry
    }
}

impl std::fmt::Debug for MapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSession")
            .field("map_config_ready", &self.is_map_config_ready())
            .field("registry", &self.registry)
            .finish()
    }
}

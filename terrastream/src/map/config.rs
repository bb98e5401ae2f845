//! Map configuration document.

use serde::Deserialize;
use thiserror::Error;

use crate::coord::{SrsParseError, SrsType};
use crate::streamer::{BoundLayer, SurfaceConfig};
use crate::tile::resolve_url;

/// Map configuration errors.
#[derive(Debug, Error)]
pub enum MapConfigError {
    #[error("malformed map configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("surface '{surface}' references unknown bound layer '{layer}'")]
    UnknownBoundLayer { surface: String, layer: String },

    #[error("invalid reference frame: {0}")]
    Srs(#[from] SrsParseError),

    #[error("map navigates in a {map} frame but the coordinate convertor uses {convertor}")]
    NavigationSrsMismatch { map: SrsType, convertor: SrsType },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    surfaces: Vec<RawSurface>,
    #[serde(default)]
    bound_layers: Vec<RawBoundLayer>,
    #[serde(default)]
    reference_frame: RawReferenceFrame,
    #[serde(default)]
    browser_options: RawBrowserOptions,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSurface {
    id: String,
    lod_range: [u32; 2],
    urls3d: RawUrls,
    #[serde(default)]
    bound_layers: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawUrls {
    meta: String,
    mesh: String,
    texture: String,
}

#[derive(Debug, Deserialize)]
struct RawBoundLayer {
    id: String,
    url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReferenceFrame {
    #[serde(default)]
    meta_binary_order: u32,
    navigation_srs: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBrowserOptions {
    search_url: Option<String>,
    search_srs: Option<String>,
}

/// Parsed map configuration with every URL resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    pub surfaces: Vec<SurfaceConfig>,
    /// Navigation frame declared by the map, if any.
    pub navigation_srs: Option<SrsType>,
    pub search_url: Option<String>,
    pub search_srs: Option<SrsType>,
}

impl MapConfig {
    /// Parse a map configuration loaded from `path`. Relative URLs are
    /// resolved against `path`.
    pub fn from_json(doc: &serde_json::Value, path: &str) -> Result<Self, MapConfigError> {
        let raw = RawConfig::deserialize(doc)?;
        let order = raw.reference_frame.meta_binary_order;

        let layers: Vec<BoundLayer> = raw
            .bound_layers
            .iter()
            .map(|l| BoundLayer::new(&l.id, &resolve_url(&l.url, path)))
            .collect();

        let surfaces = raw
            .surfaces
            .iter()
            .map(|s| {
                let mut surface = SurfaceConfig::new(
                    &s.id,
                    &resolve_url(&s.urls3d.meta, path),
                    &resolve_url(&s.urls3d.mesh, path),
                    &resolve_url(&s.urls3d.texture, path),
                )
                .with_lod_range(s.lod_range[0], s.lod_range[1])
                .with_meta_binary_order(order);
                for id in &s.bound_layers {
                    let layer = layers.iter().find(|l| &l.id == id).ok_or_else(|| {
                        MapConfigError::UnknownBoundLayer {
                            surface: s.id.clone(),
                            layer: id.clone(),
                        }
                    })?;
                    surface = surface.with_bound_layer(layer.clone());
                }
                Ok(surface)
            })
            .collect::<Result<Vec<_>, MapConfigError>>()?;

        let navigation_srs = raw
            .reference_frame
            .navigation_srs
            .as_deref()
            .map(str::parse::<SrsType>)
            .transpose()?;
        let search_srs = raw
            .browser_options
            .search_srs
            .as_deref()
            .map(str::parse::<SrsType>)
            .transpose()?;

        Ok(Self {
            surfaces,
            navigation_srs,
            search_url: raw
                .browser_options
                .search_url
                .map(|url| resolve_url(&url, path)),
            search_srs,
        })
    }

    /// Distances are measured with the convertor's frame type, so a map
    /// declaring a different navigation frame cannot be used with it.
    pub fn check_navigation_srs(&self, convertor: SrsType) -> Result<(), MapConfigError> {
        match self.navigation_srs {
            Some(map) if map != convertor => {
                Err(MapConfigError::NavigationSrsMismatch { map, convertor })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{TileId, UrlVars};
    use serde_json::json;

    fn doc() -> serde_json::Value {
        json!({
            "surfaces": [{
                "id": "terrain",
                "lodRange": [2, 10],
                "urls3d": {
                    "meta": "{lod}-{x}-{y}.meta",
                    "mesh": "https://cdn.example/{lod}-{x}-{y}.mesh",
                    "texture": "//tex.example/{lod}-{x}-{y}-{sub}.jpg"
                },
                "boundLayers": ["ortho"]
            }],
            "boundLayers": [{"id": "ortho", "url": "ortho/{lod}/{x}/{y}.jpg"}],
            "referenceFrame": {"metaBinaryOrder": 5, "navigationSrs": "projected"},
            "browserOptions": {"searchUrl": "https://s.example/?q={value}", "searchSrs": "geographic"}
        })
    }

    #[test]
    fn test_parse_resolves_urls() {
        let config = MapConfig::from_json(&doc(), "https://maps.example/a/mapConfig.json").unwrap();
        let surface = &config.surfaces[0];
        let tile = UrlVars::new(TileId::new(3, 1, 2));

        assert_eq!(surface.target_lod(), 6);
        assert_eq!(surface.meta_binary_order, 5);
        assert_eq!(surface.meta_url.expand(&tile), "https://maps.example/a/3-1-2.meta");
        assert_eq!(surface.mesh_url.expand(&tile), "https://cdn.example/3-1-2.mesh");
        assert_eq!(
            surface.texture_url.expand(&UrlVars::with_sub(TileId::new(3, 1, 2), 1)),
            "https://tex.example/3-1-2-1.jpg"
        );
        assert_eq!(
            surface.bound_layers[0].url.expand(&tile),
            "https://maps.example/a/ortho/3/1/2.jpg"
        );
        assert_eq!(config.navigation_srs, Some(SrsType::Projected));
        assert_eq!(config.search_srs, Some(SrsType::Geographic));
        assert_eq!(config.search_url.as_deref(), Some("https://s.example/?q={value}"));
    }

    #[test]
    fn test_minimal_config_defaults() {
        let doc = json!({"surfaces": []});
        let config = MapConfig::from_json(&doc, "map.json").unwrap();
        assert!(config.surfaces.is_empty());
        assert_eq!(config.navigation_srs, None);
        assert!(config.check_navigation_srs(SrsType::Cartesian).is_ok());
        assert!(config.search_url.is_none());
    }

    #[test]
    fn test_navigation_srs_must_match_convertor() {
        let config = MapConfig::from_json(&doc(), "map.json").unwrap();
        assert!(config.check_navigation_srs(SrsType::Projected).is_ok());

        let err = config.check_navigation_srs(SrsType::Geographic).unwrap_err();
        assert!(matches!(
            err,
            MapConfigError::NavigationSrsMismatch {
                map: SrsType::Projected,
                convertor: SrsType::Geographic,
            }
        ));
        assert!(err.to_string().contains("projected"));
    }

    #[test]
    fn test_unknown_bound_layer() {
        let mut doc = doc();
        doc["boundLayers"] = json!([]);
        let err = MapConfig::from_json(&doc, "map.json").unwrap_err();
        assert!(matches!(err, MapConfigError::UnknownBoundLayer { .. }));
    }

    #[test]
    fn test_missing_surfaces_is_malformed() {
        let err = MapConfig::from_json(&json!({}), "map.json").unwrap_err();
        assert!(matches!(err, MapConfigError::Json(_)));
    }

    #[test]
    fn test_bad_srs() {
        let mut doc = doc();
        doc["browserOptions"]["searchSrs"] = json!("spherical");
        assert!(matches!(
            MapConfig::from_json(&doc, "map.json"),
            Err(MapConfigError::Srs(_))
        ));
    }
}

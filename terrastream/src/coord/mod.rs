//! Reference-frame types and the coordinate-conversion seam.
//!
//! Projection math is an external collaborator; this module only defines
//! what the search and streaming code needs from it: the type of the
//! navigation frame, conversion of search-service positions into that frame
//! and a geodesic distance for geographic frames.

mod distance;
mod srs;

pub use distance::{distance, haversine_distance, EARTH_RADIUS_M};
pub use srs::{SrsParseError, SrsType};

/// A position in some reference frame: `[x, y, z]`, or `[lon, lat, h]` for
/// geographic frames.
pub type Point3 = [f64; 3];

/// Conversions supplied by the host application.
pub trait CoordinateConvertor: Send + Sync {
    /// Type of the navigation frame positions are compared in.
    fn nav_srs_type(&self) -> SrsType;

    /// Convert a position reported by the search service into the
    /// navigation frame.
    fn search_to_nav(&self, point: Point3) -> Point3;

    /// Geodesic distance between two navigation-frame points.
    fn geo_distance(&self, a: Point3, b: Point3) -> f64;
}

/// Convertor for maps whose navigation frame is plain longitude/latitude:
/// search positions pass through unchanged and distances use a spherical
/// Earth.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeographicConvertor;

impl CoordinateConvertor for GeographicConvertor {
    fn nav_srs_type(&self) -> SrsType {
        SrsType::Geographic
    }

    fn search_to_nav(&self, point: Point3) -> Point3 {
        point
    }

    fn geo_distance(&self, a: Point3, b: Point3) -> f64 {
        haversine_distance(a, b)
    }
}

/// Convertor for projected or cartesian navigation frames where search
/// results already share the frame.
#[derive(Debug, Clone, Copy)]
pub struct IdentityConvertor {
    srs: SrsType,
}

impl IdentityConvertor {
    pub fn new(srs: SrsType) -> Self {
        Self { srs }
    }
}

impl CoordinateConvertor for IdentityConvertor {
    fn nav_srs_type(&self) -> SrsType {
        self.srs
    }

    fn search_to_nav(&self, point: Point3) -> Point3 {
        point
    }

    fn geo_distance(&self, a: Point3, b: Point3) -> f64 {
        haversine_distance(a, b)
    }
}

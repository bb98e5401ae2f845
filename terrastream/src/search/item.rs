//! Geocoding hits.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::coord::Point3;

/// One geocoding hit.
///
/// Positions are in the navigation SRS. Unknown numbers are NaN;
/// `importance` is in `[-1, 1]` with `-1` meaning unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchItem {
    pub display_name: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub region: String,
    pub road: String,
    pub city: String,
    pub county: String,
    pub state: String,
    pub house_number: String,
    pub state_district: String,
    pub country: String,
    pub country_code: String,
    #[serde(with = "xyz")]
    pub position: Point3,
    #[serde(with = "nan_as_null")]
    pub radius: f64,
    #[serde(with = "nan_as_null")]
    pub distance: f64,
    pub importance: f64,
}

impl Default for SearchItem {
    fn default() -> Self {
        Self {
            display_name: String::new(),
            title: String::new(),
            kind: String::new(),
            region: String::new(),
            road: String::new(),
            city: String::new(),
            county: String::new(),
            state: String::new(),
            house_number: String::new(),
            state_district: String::new(),
            country: String::new(),
            country_code: String::new(),
            position: [f64::NAN; 3],
            radius: f64::NAN,
            distance: f64::NAN,
            importance: -1.0,
        }
    }
}

impl SearchItem {
    pub fn new(display_name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_position(mut self, position: Point3) -> Self {
        self.position = position;
        self
    }

    pub fn with_importance(mut self, importance: f64) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    /// Hamlets, villages, towns and cities.
    pub fn is_populated_place(&self) -> bool {
        matches!(self.kind.as_str(), "hamlet" | "village" | "town" | "city")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse an item previously produced by [`to_json`](Self::to_json).
    /// Missing fields take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

mod nan_as_null {
    use super::*;

    pub fn serialize<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            s.serialize_none()
        } else {
            s.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
    }
}

mod xyz {
    use super::*;

    #[derive(Serialize, Deserialize)]
    struct Xyz {
        #[serde(with = "super::nan_as_null", default = "nan")]
        x: f64,
        #[serde(with = "super::nan_as_null", default = "nan")]
        y: f64,
        #[serde(with = "super::nan_as_null", default = "nan")]
        z: f64,
    }

    fn nan() -> f64 {
        f64::NAN
    }

    pub fn serialize<S: Serializer>(p: &Point3, s: S) -> Result<S::Ok, S::Error> {
        Xyz {
            x: p[0],
            y: p[1],
            z: p[2],
        }
        .serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Point3, D::Error> {
        let p = Xyz::deserialize(d)?;
        Ok([p.x, p.y, p.z])
    }
}

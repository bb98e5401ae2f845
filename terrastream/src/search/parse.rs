//! Nominatim-style JSON results.

use serde_json::Value;

use super::item::SearchItem;
use crate::coord::{distance, CoordinateConvertor, Point3};

/// Read a number that may arrive as a JSON number or a numeric string.
/// Anything else is NaN.
pub fn number_or_nan(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn text(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Convert a result array into items.
///
/// `lon`/`lat` go through `search_to_nav`; `distance` is measured from
/// `origin`; `radius` is the farthest bounding box corner from the position.
pub fn parse_results(
    doc: &Value,
    origin: Point3,
    convertor: &dyn CoordinateConvertor,
) -> Result<Vec<SearchItem>, String> {
    let hits = doc
        .as_array()
        .ok_or_else(|| "expected a JSON array of results".to_string())?;
    Ok(hits
        .iter()
        .map(|hit| parse_hit(hit, origin, convertor))
        .collect())
}

fn parse_hit(hit: &Value, origin: Point3, convertor: &dyn CoordinateConvertor) -> SearchItem {
    let mut item = SearchItem::new(text(hit, "display_name"), text(hit, "type"));

    if let Some(addr) = hit.get("address").filter(|a| a.is_object()) {
        item.house_number = text(addr, "house_number");
        item.road = text(addr, "road");
        item.city = text(addr, "city");
        item.county = text(addr, "county");
        item.state = text(addr, "state");
        item.state_district = text(addr, "state_district");
        item.country = text(addr, "country");
        item.country_code = text(addr, "country_code");
    }

    let lon = hit.get("lon").map_or(f64::NAN, number_or_nan);
    let lat = hit.get("lat").map_or(f64::NAN, number_or_nan);
    item.position = convertor.search_to_nav([lon, lat, 0.0]);
    item.distance = distance(convertor, origin, item.position);

    // [min lat, max lat, min lon, max lon]
    if let Some(bbox) = hit
        .get("boundingbox")
        .and_then(Value::as_array)
        .filter(|b| b.len() == 4)
    {
        let r: Vec<f64> = bbox.iter().map(number_or_nan).collect();
        let corners = [[r[2], r[0]], [r[2], r[1]], [r[3], r[0]], [r[3], r[1]]];
        item.radius = corners.iter().fold(0.0, |radius: f64, c| {
            let corner = convertor.search_to_nav([c[0], c[1], 0.0]);
            radius.max(distance(convertor, item.position, corner))
        });
    }

    item.importance = match hit.get("importance") {
        None | Some(Value::Null) => -1.0,
        Some(v) => number_or_nan(v),
    };
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{GeographicConvertor, IdentityConvertor, SrsType};
    use serde_json::json;

    #[test]
    fn test_number_or_nan() {
        assert_eq!(number_or_nan(&json!(1.5)), 1.5);
        assert_eq!(number_or_nan(&json!(3)), 3.0);
        assert_eq!(number_or_nan(&json!("-2.25")), -2.25);
        assert!(number_or_nan(&json!("12abc")).is_nan());
        assert!(number_or_nan(&json!(" 1")).is_nan());
        assert!(number_or_nan(&json!(null)).is_nan());
        assert!(number_or_nan(&json!([1])).is_nan());
    }

    #[test]
    fn test_parse_hit_fields() {
        let doc = json!([{
            "display_name": "Brno, South Moravia, Czechia",
            "type": "city",
            "lat": "49.19",
            "lon": "16.60",
            "importance": 0.71,
            "boundingbox": ["49.10", "49.29", "16.42", "16.73"],
            "address": {"city": "Brno", "state": "South Moravia", "country_code": "cz"}
        }]);
        let origin = [16.60, 49.19, 0.0];
        let items = parse_results(&doc, origin, &GeographicConvertor).unwrap();

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.kind, "city");
        assert_eq!(item.city, "Brno");
        assert_eq!(item.country_code, "cz");
        assert_eq!(item.position, [16.60, 49.19, 0.0]);
        assert!(item.distance.abs() < 1e-6);
        assert_eq!(item.importance, 0.71);
        // Half-diagonal of the box is roughly 17 km.
        assert!(item.radius > 10_000.0 && item.radius < 25_000.0);
    }

    #[test]
    fn test_missing_fields() {
        let doc = json!([{"display_name": "X", "importance": "bogus"}, {"display_name": "Y"}]);
        let items =
            parse_results(&doc, [0.0; 3], &IdentityConvertor::new(SrsType::Cartesian)).unwrap();
        assert!(items[0].position[0].is_nan());
        assert!(items[0].distance.is_nan());
        assert!(items[0].radius.is_nan());
        assert!(items[0].importance.is_nan());
        assert_eq!(items[1].importance, -1.0);
    }

    #[test]
    fn test_rejects_non_array() {
        let err = parse_results(&json!({"error": "x"}), [0.0; 3], &GeographicConvertor);
        assert!(err.is_err());
    }
}

//! Post-processing of geocoding hits.

use std::cmp::Ordering;

use super::item::SearchItem;
use crate::coord::{distance, CoordinateConvertor};

/// Hits closer than this (in navigation SRS units) are merged.
pub const PROXIMITY_THRESHOLD: f64 = 1e4;

/// Importance below which nearby-ranked hits are reordered by distance.
pub const LOW_IMPORTANCE: f64 = 0.4;

/// Maximum importance difference for the distance reorder.
pub const IMPORTANCE_TOLERANCE: f64 = 0.06;

/// Dedupe, merge and re-rank raw hits.
///
/// 1. Stable sort by display name, populated places first among equals.
/// 2. Drop repeated display names.
/// 3. Drop hits within [`PROXIMITY_THRESHOLD`] of any earlier survivor.
///    NaN distances never merge.
/// 4. Fill `title` and `region`.
/// 5. Among adjacent low-importance hits of similar importance, the nearer
///    one goes first.
pub fn filter_results(
    mut items: Vec<SearchItem>,
    convertor: &dyn CoordinateConvertor,
) -> Vec<SearchItem> {
    items.sort_by(|a, b| {
        a.display_name
            .cmp(&b.display_name)
            .then_with(|| b.is_populated_place().cmp(&a.is_populated_place()))
    });
    items.dedup_by(|later, earlier| later.display_name == earlier.display_name);

    let mut survivors: Vec<SearchItem> = Vec::with_capacity(items.len());
    for item in items {
        let too_close = survivors
            .iter()
            .any(|s| distance(convertor, s.position, item.position) < PROXIMITY_THRESHOLD);
        if !too_close {
            survivors.push(item);
        }
    }

    for item in &mut survivors {
        derive_labels(item);
    }

    reorder_by_distance(&mut survivors);
    survivors
}

/// `title` is the display name up to its first comma; `region` is county,
/// then state district, then state, cut at the first `" - "`. A title that
/// is just the house number becomes the road name.
pub fn derive_labels(item: &mut SearchItem) {
    item.title = match item.display_name.split_once(',') {
        Some((head, _)) => head.to_string(),
        None => item.display_name.clone(),
    };

    let region = [&item.county, &item.state_district, &item.state]
        .into_iter()
        .find(|s| !s.is_empty())
        .map(String::as_str)
        .unwrap_or("");
    item.region = match region.split_once(" - ") {
        Some((head, _)) => head.to_string(),
        None => region.to_string(),
    };

    if item.title == item.house_number && !item.road.is_empty() {
        item.title = item.road.clone();
    }
}

fn precedes(a: &SearchItem, b: &SearchItem) -> bool {
    a.importance < LOW_IMPORTANCE
        && b.importance < LOW_IMPORTANCE
        && (a.importance - b.importance).abs() < IMPORTANCE_TOLERANCE
        && a.distance.partial_cmp(&b.distance) == Some(Ordering::Less)
}

// `precedes` is not a total order, so this is a stable insertion pass
// rather than `sort_by`.
fn reorder_by_distance(items: &mut [SearchItem]) {
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && precedes(&items[j], &items[j - 1]) {
            items.swap(j, j - 1);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{IdentityConvertor, SrsType};

    fn cartesian() -> IdentityConvertor {
        IdentityConvertor::new(SrsType::Cartesian)
    }

    fn at(name: &str, kind: &str, x: f64) -> SearchItem {
        SearchItem::new(name, kind).with_position([x, 0.0, 0.0])
    }

    #[test]
    fn test_duplicate_name_keeps_populated_place() {
        let items = vec![
            at("Springfield, USA", "building", 0.0),
            at("Springfield, USA", "city", 1e6),
        ];
        let out = filter_results(items, &cartesian());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, "city");
        assert_eq!(out[0].title, "Springfield");
    }

    #[test]
    fn test_close_hits_merge_into_first() {
        let items = vec![at("A", "city", 0.0), at("B", "city", 5000.0)];
        let out = filter_results(items, &cartesian());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].display_name, "A");
    }

    #[test]
    fn test_merge_compares_every_survivor() {
        let items = vec![
            at("A", "city", 0.0),
            at("B", "city", 20_000.0),
            at("C", "city", 5_000.0),
        ];
        let names: Vec<_> = filter_results(items, &cartesian())
            .into_iter()
            .map(|i| i.display_name)
            .collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn test_unknown_positions_never_merge() {
        let items = vec![SearchItem::new("A", "x"), SearchItem::new("B", "x")];
        assert_eq!(filter_results(items, &cartesian()).len(), 2);
    }

    #[test]
    fn test_low_importance_neighbours_ordered_by_distance() {
        let items = vec![
            at("A", "city", 0.0).with_importance(0.2).with_distance(50.0),
            at("B", "city", 1e6).with_importance(0.25).with_distance(10.0),
        ];
        let out = filter_results(items, &cartesian());
        assert_eq!(out[0].display_name, "B");
        assert_eq!(out[1].display_name, "A");
    }

    #[test]
    fn test_important_hits_keep_order() {
        let items = vec![
            at("A", "city", 0.0).with_importance(0.9).with_distance(50.0),
            at("B", "city", 1e6).with_importance(0.88).with_distance(10.0),
        ];
        let out = filter_results(items, &cartesian());
        assert_eq!(out[0].display_name, "A");
    }

    #[test]
    fn test_labels() {
        let mut item = SearchItem::new("12, Main Street, Brno", "house");
        item.house_number = "12".into();
        item.road = "Main Street".into();
        item.state_district = "South Moravia - Brno".into();
        item.state = "Czechia".into();
        derive_labels(&mut item);
        assert_eq!(item.title, "Main Street");
        assert_eq!(item.region, "South Moravia");

        let mut plain = SearchItem::new("Nowhere", "x");
        derive_labels(&mut plain);
        assert_eq!(plain.title, "Nowhere");
        assert_eq!(plain.region, "");
    }
}

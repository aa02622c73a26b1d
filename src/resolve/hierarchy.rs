//! Containment checks over the gazetteer hierarchy.
//!
//! Places link upward through a primary `located_in` edge and any
//! number of secondary `also_located_in` edges. The walk is transitive
//! and depth-bounded: the graph is expected to be acyclic, but a bad
//! data load must not hang the resolver.

use crate::place::{MAX_LEVELS, PlaceId, USA_ID};
use crate::store::{place_or_log, GazetteerStore};

/// Generous bound on how far an ancestor walk may climb. Honest data
/// never exceeds `MAX_LEVELS`; anything deeper is a cycle.
const MAX_WALK_DEPTH: usize = MAX_LEVELS * 4;

/// Does any ancestor of `id` (transitively, through primary and
/// secondary parents) appear in `ancestors`?
pub(crate) fn is_ancestor(store: &dyn GazetteerStore, id: PlaceId, ancestors: &[PlaceId]) -> bool {
    walk(store, id, ancestors, MAX_WALK_DEPTH)
}

fn walk(store: &dyn GazetteerStore, id: PlaceId, ancestors: &[PlaceId], depth: usize) -> bool {
    if depth == 0 {
        tracing::warn!(id, "ancestor walk exceeded depth bound; containment cycle?");
        return false;
    }
    let Some(place) = place_or_log(store, id) else {
        return false;
    };
    if let Some(located_in) = place.located_in() {
        if ancestors.contains(&located_in) || walk(store, located_in, ancestors, depth - 1) {
            return true;
        }
    }
    for &also in &place.also_located_in_ids {
        if ancestors.contains(&also) || walk(store, also, ancestors, depth - 1) {
            return true;
        }
    }
    false
}

/// Keep the children that sit (transitively) under one of `parents`,
/// preserving order.
pub(crate) fn filter_subplaces(
    store: &dyn GazetteerStore,
    children: &[PlaceId],
    parents: &[PlaceId],
) -> Vec<PlaceId> {
    children
        .iter()
        .copied()
        .filter(|&child| is_ancestor(store, child, parents))
        .collect()
}

/// Drop every id that descends from another id in the set. Each id is
/// checked against the whole set, itself included; that is benign
/// because the walk moves strictly upward and never revisits the
/// starting id.
pub(crate) fn remove_children(store: &dyn GazetteerStore, ids: &[PlaceId]) -> Vec<PlaceId> {
    ids.iter()
        .copied()
        .filter(|&id| !is_ancestor(store, id, ids))
        .collect()
}

/// A candidate set may be skipped over only while it holds no country
/// and no US state. Once one of those is locked in, deeper levels must
/// attach beneath it.
pub(crate) fn is_skippable(store: &dyn GazetteerStore, ids: &[PlaceId]) -> bool {
    for &id in ids {
        if let Some(place) = place_or_log(store, id) {
            if place.level == 1 || (place.level == 2 && place.country_id == USA_ID) {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::place::Place;
    use crate::store::InMemoryGazetteer;

    fn place(id: PlaceId, level: u8, located_in_id: PlaceId, also: &[PlaceId]) -> Place {
        Place {
            id,
            name: format!("place-{id}"),
            level,
            located_in_id,
            also_located_in_ids: also.to_vec(),
            country_id: 1,
            ..Place::default()
        }
    }

    fn gazetteer(places: impl IntoIterator<Item = Place>) -> InMemoryGazetteer {
        InMemoryGazetteer::from_places(places, &crate::config::StandardizerConfig::default())
    }

    fn store() -> InMemoryGazetteer {
        // 1 (country) > 2 (state) > 3 (county) > 4 (town, also in 5)
        gazetteer([
            place(1, 1, 0, &[]),
            place(2, 2, 1, &[]),
            place(3, 3, 2, &[]),
            place(4, 4, 3, &[5]),
            place(5, 3, 2, &[]),
        ])
    }

    #[test]
    fn walks_primary_edges_transitively() {
        let s = store();
        assert!(is_ancestor(&s, 4, &[3]));
        assert!(is_ancestor(&s, 4, &[2]));
        assert!(is_ancestor(&s, 4, &[1]));
        assert!(!is_ancestor(&s, 1, &[4]));
        assert!(!is_ancestor(&s, 1, &[1])); // a place is not its own ancestor
    }

    #[test]
    fn walks_secondary_edges() {
        let s = store();
        assert!(is_ancestor(&s, 4, &[5]));
    }

    #[test]
    fn filter_subplaces_preserves_order() {
        let s = store();
        assert_eq!(filter_subplaces(&s, &[4, 3, 1], &[2]), vec![4, 3]);
        assert!(filter_subplaces(&s, &[1], &[2]).is_empty());
    }

    #[test]
    fn remove_children_keeps_only_roots_of_the_set() {
        let s = store();
        assert_eq!(remove_children(&s, &[2, 3, 4]), vec![2]);
        assert_eq!(remove_children(&s, &[3, 5]), vec![3, 5]);
    }

    #[test]
    fn cyclic_data_terminates() {
        // 7 and 8 point at each other
        let s = gazetteer([place(7, 3, 8, &[]), place(8, 3, 7, &[])]);
        assert!(!is_ancestor(&s, 7, &[99]));
        // membership is still observable before the bound trips
        assert!(is_ancestor(&s, 7, &[8]));
    }

    #[test]
    fn skippability_stops_at_countries_and_us_states() {
        let s = gazetteer([
            place(1, 1, 0, &[]),
            Place {
                id: 50,
                name: "Missouri".into(),
                level: 2,
                country_id: USA_ID,
                ..Place::default()
            },
            Place {
                id: 60,
                name: "Hesse".into(),
                level: 2,
                country_id: 70,
                ..Place::default()
            },
        ]);
        assert!(!is_skippable(&s, &[1]));
        assert!(!is_skippable(&s, &[50]));
        assert!(is_skippable(&s, &[60]));
        assert!(!is_skippable(&s, &[60, 50]));
        assert!(is_skippable(&s, &[]));
    }
}

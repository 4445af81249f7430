//! Cities highlighted on the footprints map.

use std::collections::{BTreeSet, HashSet};

use super::portfolio_model::{GeoInfo, PhotoCollection};

/// One lit city, with the collection that put it on the map if any.
#[derive(Debug, Clone, PartialEq)]
pub struct FootprintCity {
    pub geo: GeoInfo,
    pub collection_id: Option<String>,
}

fn city_key(geo: &GeoInfo) -> String {
    format!("{}:{}", geo.continent.as_str(), geo.city)
}

/// Cities implied by collections, followed by manually lit cities.
///
/// A city appears once; the collection entry wins over a manual toggle.
pub fn footprint_cities(
    collections: &[PhotoCollection],
    lit_cities: &[GeoInfo],
) -> Vec<FootprintCity> {
    let mut seen = HashSet::new();
    let mut cities = Vec::new();

    for collection in collections {
        if let Some(geo) = &collection.geo {
            if seen.insert(city_key(geo)) {
                cities.push(FootprintCity {
                    geo: geo.clone(),
                    collection_id: Some(collection.id.clone()),
                });
            }
        }
    }

    for geo in lit_cities {
        if seen.insert(city_key(geo)) {
            cities.push(FootprintCity {
                geo: geo.clone(),
                collection_id: None,
            });
        }
    }

    cities
}

/// Distinct country codes to shade on the map.
pub fn country_codes(collections: &[PhotoCollection], lit_cities: &[GeoInfo]) -> BTreeSet<String> {
    collections
        .iter()
        .filter_map(|c| c.geo.as_ref())
        .chain(lit_cities.iter())
        .map(|geo| geo.country_code.clone())
        .collect()
}
